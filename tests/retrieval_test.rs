mod helpers;

use std::sync::Arc;

use edutor::config::EdutorConfig;
use edutor::embedding::EmbeddingProvider;
use edutor::error::Error;
use edutor::index::types::ContentClass;
use edutor::index::{IndexSet, SimilarityIndex, SqliteIndex};
use edutor::retrieval::RetrievalGate;
use helpers::{build_test_index, embedding_with_similarity, test_embedding, PhraseEmbedding};
use tempfile::TempDir;

const QUERY: &str = "o que é uma tag <p>?";

fn embedding() -> PhraseEmbedding {
    PhraseEmbedding::default()
        .with(QUERY, test_embedding(0))
        .with("A tag p define um parágrafo.", embedding_with_similarity(0, 0.9))
        .with("Parágrafos agrupam frases.", embedding_with_similarity(0, 0.8))
        .with("O elemento p é de bloco.", embedding_with_similarity(0, 0.76))
        .with("Listas usam ul e li.", embedding_with_similarity(0, 0.74))
        .with("Tabelas usam table.", embedding_with_similarity(0, 0.3))
}

fn open(dir: &std::path::Path, class: ContentClass, embedding: PhraseEmbedding) -> SqliteIndex {
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(embedding);
    SqliteIndex::open(dir, class, provider, "test-model").unwrap()
}

#[test]
fn sqlite_index_scores_match_cosine_similarity() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("text");
    build_test_index(
        &dir,
        ContentClass::Text,
        &embedding(),
        &["Tabelas usam table.", "A tag p define um parágrafo.", "Parágrafos agrupam frases."],
    );

    let index = open(&dir, ContentClass::Text, embedding());
    let hits = index.nearest(QUERY, 3).unwrap();

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].content, "A tag p define um parágrafo.");
    assert!((hits[0].score - 0.9).abs() < 1e-4, "score {}", hits[0].score);
    assert!((hits[1].score - 0.8).abs() < 1e-4, "score {}", hits[1].score);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn gate_keeps_at_most_three_above_threshold() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("text");
    build_test_index(
        &dir,
        ContentClass::Text,
        &embedding(),
        &[
            "A tag p define um parágrafo.",
            "Parágrafos agrupam frases.",
            "O elemento p é de bloco.",
            "Listas usam ul e li.",
            "Tabelas usam table.",
        ],
    );
    let index = open(&dir, ContentClass::Text, embedding());

    let kept = RetrievalGate::default().retrieve(&index, QUERY).unwrap();
    let contents: Vec<&str> = kept.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(
        contents,
        vec![
            "A tag p define um parágrafo.",
            "Parágrafos agrupam frases.",
            "O elemento p é de bloco."
        ]
    );
    assert!(kept.iter().all(|c| c.score >= 0.75));
}

#[test]
fn gate_returns_empty_when_nothing_is_close() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("text");
    build_test_index(
        &dir,
        ContentClass::Text,
        &embedding(),
        &["Listas usam ul e li.", "Tabelas usam table."],
    );
    let index = open(&dir, ContentClass::Text, embedding());

    let kept = RetrievalGate::default().retrieve(&index, QUERY).unwrap();
    assert!(kept.is_empty());
}

#[test]
fn opening_an_index_for_another_class_fails() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("video");
    build_test_index(&dir, ContentClass::Video, &embedding(), &["Tabelas usam table."]);

    let provider: Arc<dyn EmbeddingProvider> = Arc::new(embedding());
    let err = SqliteIndex::open(&dir, ContentClass::Image, provider, "test-model")
        .err()
        .unwrap();
    match err {
        Error::ClassMismatch { expected, found, .. } => {
            assert_eq!(expected, ContentClass::Image);
            assert_eq!(found, "video");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn index_set_loads_configured_dirs_and_reports_missing_ones() {
    let tmp = TempDir::new().unwrap();
    let mut config = EdutorConfig::default();
    config.index.root = tmp.path().to_string_lossy().into_owned();
    config.embedding.model = "test-model".into();

    build_test_index(
        &config.index_dir(ContentClass::Text),
        ContentClass::Text,
        &embedding(),
        &["A tag p define um parágrafo."],
    );

    let set = IndexSet::open(&config, Arc::new(embedding()));
    let text = set.get(ContentClass::Text).unwrap();
    assert_eq!(text.class(), ContentClass::Text);
    // cached after first load
    assert!(Arc::ptr_eq(&text, &set.get(ContentClass::Text).unwrap()));

    let err = set.get(ContentClass::Video).err().unwrap();
    assert!(matches!(err, Error::MissingIndex { class: ContentClass::Video, .. }));
    assert!(!err.is_recoverable());
}
