use std::fs;

use corridor_core::config::{Config, EmbeddingBackend, Secret, Settings};
use corridor_core::error::Error;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use tempfile::TempDir;

#[test]
fn defaults_match_the_documented_values() {
    let s = Settings::default();
    assert_eq!(s.chunking.chunk_size, 1000);
    assert_eq!(s.chunking.chunk_overlap, 200);
    assert_eq!(s.retrieval.top_k, 4);
    assert_eq!(s.data.collection, "kenya_wildlife_corpus");
    assert_eq!(s.upstream.max_attempts, 3);
    assert!(s.validate().is_ok());
}

#[test]
fn toml_values_override_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[retrieval]\ntop_k = 6\n[embedding]\nprovider = \"hash\"\ndimension = 64\n",
    )
    .unwrap();
    let settings = Config::load_in(tmp.path()).expect("load").settings().expect("settings");
    assert_eq!(settings.retrieval.top_k, 6);
    assert_eq!(settings.embedding.provider, EmbeddingBackend::Hash);
    assert_eq!(settings.embedding.dimension, 64);
    assert_eq!(settings.chunking.chunk_size, 1000, "untouched keys keep defaults");
}

#[test]
fn overlap_not_smaller_than_size_is_invalid_config() {
    let figment = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::string("[chunking]\nchunk_size = 100\nchunk_overlap = 100\n"));
    let err = Config::from_figment(figment).settings().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn zero_top_k_is_invalid_config() {
    let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string("[retrieval]\ntop_k = 0\n"));
    assert!(matches!(Config::from_figment(figment).settings(), Err(Error::InvalidConfig(_))));
}

#[test]
fn secrets_are_redacted_in_debug_output() {
    let secret = Secret::new("sk-live-123");
    assert_eq!(format!("{secret:?}"), "Secret(***)");
    assert_eq!(secret.expose(), "sk-live-123");
}

#[test]
fn configured_directories_expand_home_and_variables() {
    let Ok(home) = std::env::var("HOME") else { return };
    let mut settings = Settings::default();
    settings.data.index_dir = "~/wildlife_db".to_string();
    settings.data.corpus_dir = "$HOME/docs".to_string();
    assert_eq!(settings.index_dir(), std::path::Path::new(&home).join("wildlife_db"));
    assert_eq!(settings.corpus_dir(), std::path::Path::new(&home).join("docs"));
    assert_eq!(settings.data.collection, "kenya_wildlife_corpus");
}
