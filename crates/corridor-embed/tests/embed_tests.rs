use std::time::Duration;

use corridor_core::config::{EmbeddingBackend, EmbeddingSettings};
use corridor_core::traits::EmbeddingProvider;
use corridor_core::types::Availability;
use corridor_core::upstream::UpstreamPolicy;
use corridor_embed::{build_embedder, HashEmbedder, OllamaEmbedder};
use tokio::net::TcpListener;

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[tokio::test]
async fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::new(384);
    let texts = vec!["elephant corridor ruling".to_string(), "elephant corridor ruling".to_string()];
    let embs = embedder.embed_batch(&texts).await.expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 384);
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[tokio::test]
async fn hash_embedder_ignores_case_and_punctuation() {
    let embedder = HashEmbedder::new(128);
    let a = embedder.embed("Land ownership, Narok.").await.unwrap();
    let b = embedder.embed("land ownership narok").await.unwrap();
    assert!((cosine(&a, &b) - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn related_texts_score_higher_than_unrelated() {
    let embedder = HashEmbedder::new(512);
    let query = embedder.embed("court ruling on land ownership").await.unwrap();
    let related = embedder.embed("the court ruling settled land ownership in Narok").await.unwrap();
    let unrelated = embedder.embed("zebra herds graze at dawn").await.unwrap();
    assert!(cosine(&query, &related) > cosine(&query, &unrelated));
}

#[tokio::test]
async fn empty_batch_is_empty() {
    let embedder = HashEmbedder::new(16);
    assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
}

#[test]
fn builder_selects_hash_backend() {
    let settings = EmbeddingSettings { provider: EmbeddingBackend::Hash, dimension: 64, ..EmbeddingSettings::default() };
    let embedder = build_embedder(&settings, UpstreamPolicy::default()).expect("build");
    assert_eq!(embedder.dim(), 64);
    assert_eq!(embedder.model_id(), "hash-xx64-d64");
}

#[test]
fn missing_local_model_is_a_model_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let settings = EmbeddingSettings {
        provider: EmbeddingBackend::Local,
        model_dir: tmp.path().join("absent").display().to_string(),
        ..EmbeddingSettings::default()
    };
    let err = build_embedder(&settings, UpstreamPolicy::default()).err().expect("load must fail");
    assert!(matches!(err, corridor_core::Error::Model(_)));
}

#[tokio::test]
async fn unreachable_ollama_reports_unavailable() {
    let settings = EmbeddingSettings {
        provider: EmbeddingBackend::Ollama,
        base_url: "http://127.0.0.1:9".to_string(),
        ..EmbeddingSettings::default()
    };
    let embedder = build_embedder(&settings, UpstreamPolicy::default()).expect("build");
    assert!(!embedder.health_check().await.is_available());
}

#[tokio::test]
async fn ollama_health_check_is_bounded_by_policy_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let _hold = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(stream);
    });
    let policy = UpstreamPolicy { timeout: Duration::from_millis(100), ..UpstreamPolicy::default() };
    let embedder = OllamaEmbedder::new(&url, "nomic-embed-text", 768, policy);
    let status = tokio::time::timeout(Duration::from_secs(3), embedder.health_check()).await.expect("health check is bounded");
    assert!(matches!(status, Availability::Unavailable(_)), "{status:?}");
}
