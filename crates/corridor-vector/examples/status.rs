use corridor_core::config::Config;
use corridor_core::traits::VectorIndex;
use corridor_vector::LanceIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let index = LanceIndex::open(settings.index_dir());
    println!("index: {} ({})", index.path().display(), index.health_check().await);
    match index.describe(&settings.data.collection).await? {
        Some(active) => println!(
            "collection {}: generation={} entries={} dim={} model={} built={}",
            settings.data.collection, active.table, active.entries, active.dimension, active.model_id, active.created_at
        ),
        None => println!("collection {}: not indexed", settings.data.collection),
    }
    Ok(())
}
