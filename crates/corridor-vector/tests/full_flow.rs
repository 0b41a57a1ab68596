use std::collections::BTreeSet;
use std::sync::Arc;

use corridor_core::error::Error;
use corridor_core::traits::VectorIndex;
use corridor_core::types::{CollectionSchema, IndexEntry, Meta, META_PAGE, META_SOURCE};
use corridor_vector::LanceIndex;

fn schema(dim: usize) -> CollectionSchema {
    CollectionSchema { dimension: dim, model_id: "test-model".to_string() }
}

fn unit(dim: usize, axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[axis % dim] = 1.0;
    v
}

fn entry(id: &str, vector: Vec<f32>, text: &str) -> IndexEntry {
    let mut meta = Meta::new();
    meta.insert(META_SOURCE.to_string(), format!("docs/{id}.pdf"));
    meta.insert(META_PAGE.to_string(), "1".to_string());
    IndexEntry { id: id.to_string(), vector, text: text.to_string(), source_metadata: meta, collection: "wildlife".to_string() }
}

#[tokio::test]
async fn stored_vector_is_its_own_nearest_neighbour() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path().join("db"));
    let entries: Vec<IndexEntry> = (0..6).map(|i| entry(&format!("c{i}"), unit(8, i), &format!("chunk {i}"))).collect();
    index.upsert_collection("wildlife", &schema(8), &entries).await?;

    let hits = index.query("wildlife", &unit(8, 3), 4).await?;
    assert_eq!(hits.len(), 4);
    assert_eq!(hits[0].entry.id, "c3");
    assert!((hits[0].score - 1.0).abs() < 1e-4, "self-similarity {}", hits[0].score);
    assert_eq!(hits[0].entry.text, "chunk 3");
    assert_eq!(hits[0].entry.source_ref(), "docs/c3.pdf, page 1");
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    Ok(())
}

#[tokio::test]
async fn k_larger_than_collection_returns_everything() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path());
    let entries = vec![entry("a", unit(4, 0), "a"), entry("b", unit(4, 1), "b")];
    index.upsert_collection("wildlife", &schema(4), &entries).await?;
    assert_eq!(index.query("wildlife", &unit(4, 0), 10).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn equal_scores_keep_insertion_order() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path());
    let same = vec![0.6, 0.8, 0.0];
    let entries = vec![
        entry("first", same.clone(), "one"),
        entry("second", same.clone(), "two"),
        entry("third", same.clone(), "three"),
    ];
    index.upsert_collection("wildlife", &schema(3), &entries).await?;
    let hits = index.query("wildlife", &same, 3).await?;
    let ids: Vec<&str> = hits.iter().map(|h| h.entry.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
    Ok(())
}

#[tokio::test]
async fn wrong_query_dimension_is_rejected() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path());
    index.upsert_collection("wildlife", &schema(4), &[entry("a", unit(4, 0), "a")]).await?;
    let err = index.query("wildlife", &unit(5, 0), 2).await.unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 4, actual: 5 }));
    Ok(())
}

#[tokio::test]
async fn wrong_entry_dimension_is_rejected_before_writing() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path().join("db"));
    let entries = vec![entry("a", unit(4, 0), "a"), entry("b", unit(3, 0), "b")];
    let err = index.upsert_collection("wildlife", &schema(4), &entries).await.unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 4, actual: 3 }));
    assert!(!index.exists("wildlife").await?);
    Ok(())
}

#[tokio::test]
async fn querying_unknown_collection_does_not_create_anything() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("never_built");
    let index = LanceIndex::open(&path);
    let err = index.query("wildlife", &unit(4, 0), 2).await.unwrap_err();
    assert!(matches!(err, Error::CollectionNotFound(ref name) if name == "wildlife"));
    assert!(!path.exists(), "read path must not create the index directory");
    assert!(!index.health_check().await.is_available());
    Ok(())
}

#[tokio::test]
async fn unknown_collection_next_to_a_built_one() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path());
    index.upsert_collection("wildlife", &schema(4), &[entry("a", unit(4, 0), "a")]).await?;
    assert!(index.exists("wildlife").await?);
    assert!(!index.exists("other").await?);
    assert!(matches!(index.query("other", &unit(4, 0), 1).await, Err(Error::CollectionNotFound(_))));
    assert!(index.health_check().await.is_available());
    Ok(())
}

#[tokio::test]
async fn reindexing_replaces_the_collection() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path());
    index.upsert_collection("wildlife", &schema(4), &[entry("old", unit(4, 0), "old text")]).await?;
    index
        .upsert_collection("wildlife", &schema(4), &[entry("new1", unit(4, 1), "new"), entry("new2", unit(4, 2), "new")])
        .await?;
    let hits = index.query("wildlife", &unit(4, 0), 10).await?;
    let ids: Vec<&str> = hits.iter().map(|h| h.entry.id.as_str()).collect();
    assert_eq!(hits.len(), 2);
    assert!(!ids.contains(&"old"));

    let active = index.describe("wildlife").await?.expect("pointer");
    assert_eq!(active.entries, 2);
    assert_eq!(active.model_id, "test-model");
    Ok(())
}

#[tokio::test]
async fn reindexing_may_change_dimension() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path());
    index.upsert_collection("wildlife", &schema(4), &[entry("a", unit(4, 0), "a")]).await?;
    index.upsert_collection("wildlife", &schema(6), &[entry("b", unit(6, 5), "b")]).await?;
    let hits = index.query("wildlife", &unit(6, 5), 1).await?;
    assert_eq!(hits[0].entry.id, "b");
    Ok(())
}

async fn generation_tables(path: &std::path::Path) -> anyhow::Result<Vec<String>> {
    let conn = lancedb::connect(&path.to_string_lossy()).execute().await?;
    let mut names: Vec<String> = conn.table_names().execute().await?.into_iter().filter(|t| t.starts_with("wildlife__g")).collect();
    names.sort();
    Ok(names)
}

#[tokio::test]
async fn old_generations_are_pruned() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path());
    let mut built = Vec::new();
    for i in 0..4 {
        index.upsert_collection("wildlife", &schema(4), &[entry(&format!("e{i}"), unit(4, i), "x")]).await?;
        built.push(index.describe("wildlife").await?.expect("pointer").table);
    }
    let remaining = generation_tables(tmp.path()).await?;
    assert_eq!(remaining, vec![built[2].clone(), built[3].clone()], "active and previous generation are kept");
    let hits = index.query("wildlife", &unit(4, 3), 1).await?;
    assert_eq!(hits[0].entry.id, "e3");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_see_one_whole_generation_during_reindex() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = Arc::new(LanceIndex::open(tmp.path()));
    let old: Vec<IndexEntry> = (0..5).map(|i| entry(&format!("old{i}"), unit(16, i), "old")).collect();
    index.upsert_collection("wildlife", &schema(16), &old).await?;

    let writer = {
        let index = Arc::clone(&index);
        tokio::spawn(async move {
            let fresh: Vec<IndexEntry> = (0..4000).map(|i| entry(&format!("new{i}"), unit(16, i), "new")).collect();
            index.upsert_collection("wildlife", &schema(16), &fresh).await
        })
    };

    let mut last = String::new();
    let mut reads = 0;
    loop {
        let finished = writer.is_finished();
        let hits = index.query("wildlife", &unit(16, 0), 5).await?;
        let texts: BTreeSet<&str> = hits.iter().map(|h| h.entry.text.as_str()).collect();
        assert_eq!(hits.len(), 5, "a generation is never seen partially written");
        assert_eq!(texts.len(), 1, "results mix generations: {texts:?}");
        last = hits[0].entry.text.clone();
        reads += 1;
        if finished {
            break;
        }
    }
    writer.await??;
    assert!(reads >= 1);
    assert_eq!(last, "new", "once the writer returns, readers see the new generation");
    Ok(())
}

#[tokio::test]
async fn empty_collection_yields_no_hits() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path());
    index.upsert_collection("wildlife", &schema(4), &[]).await?;
    assert!(index.exists("wildlife").await?);
    assert!(index.query("wildlife", &unit(4, 0), 3).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn collection_names_are_validated() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let index = LanceIndex::open(tmp.path());
    let err = index.upsert_collection("../escape", &schema(4), &[]).await.unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
    Ok(())
}
