use corridor_core::config::Config;
use corridor_embed::build_embedder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = build_embedder(&settings.embedding, settings.upstream.policy())?;
    let texts = vec!["elephant migration corridor".to_string(), "land tenure ruling".to_string()];
    let embs = embedder.embed_batch(&texts).await?;
    println!("B={} dim={} model={}", embs.len(), embedder.dim(), embedder.model_id());
    Ok(())
}
