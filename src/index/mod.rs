//! Similarity indexes, one per [`ContentClass`].
//!
//! [`SimilarityIndex`] is the raw nearest-neighbour query the retrieval gate
//! wraps. [`SqliteIndex`] is the production implementation over an
//! `index.db` written by [`build`]; [`IndexSet`] resolves a content class to
//! its index, loading it on first use and failing with
//! [`Error::MissingIndex`] when the directory was never built.

pub mod build;
pub mod search;
pub mod types;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::Connection;

use crate::db;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use types::{ContentClass, ScoredChunk};

/// Nearest-neighbour search over one content class.
///
/// Implementations are read-only after construction and may be shared across
/// concurrent queries. Calls are blocking; async callers go through
/// `spawn_blocking`.
pub trait SimilarityIndex: Send + Sync {
    fn class(&self) -> ContentClass;

    /// The `k` chunks most similar to `query`, ordered by descending score.
    fn nearest(&self, query: &str, k: usize) -> anyhow::Result<Vec<ScoredChunk>>;
}

/// A similarity index backed by a read-only sqlite-vec database.
pub struct SqliteIndex {
    class: ContentClass,
    conn: Mutex<Connection>,
    embedding: Arc<dyn EmbeddingProvider>,
}

impl SqliteIndex {
    /// Open the index stored in `dir`, checking it was built for `class`.
    pub fn open(
        dir: &Path,
        class: ContentClass,
        embedding: Arc<dyn EmbeddingProvider>,
        expected_model: &str,
    ) -> Result<Self> {
        if !db::index_file(dir).exists() {
            return Err(Error::MissingIndex {
                class,
                path: dir.to_path_buf(),
            });
        }

        let conn = db::open_index(dir)?;
        let stored_class = db::schema::get_meta(&conn, db::schema::META_CONTENT_CLASS)?;
        if stored_class.as_deref() != Some(class.as_str()) {
            return Err(Error::ClassMismatch {
                expected: class,
                found: stored_class.unwrap_or_else(|| "unknown".into()),
                path: dir.to_path_buf(),
            });
        }

        if let Some(model) = db::schema::get_meta(&conn, db::schema::META_EMBEDDING_MODEL)? {
            if model != expected_model {
                tracing::warn!(
                    class = %class,
                    stored = %model,
                    configured = %expected_model,
                    "embedding model changed; rebuild this index with `edutor index build`"
                );
            }
        }

        tracing::info!(class = %class, dir = %dir.display(), "similarity index loaded");
        Ok(Self {
            class,
            conn: Mutex::new(conn),
            embedding,
        })
    }
}

impl SimilarityIndex for SqliteIndex {
    fn class(&self) -> ContentClass {
        self.class
    }

    fn nearest(&self, query: &str, k: usize) -> anyhow::Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedding.embed(query)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("index lock poisoned: {e}"))?;
        search::nearest_chunks(&conn, &query_embedding, k)
            .with_context(|| format!("{} index query failed", self.class))
    }
}

/// Where [`IndexSet`] finds indexes it has not loaded yet.
struct IndexSource {
    dirs: HashMap<ContentClass, PathBuf>,
    embedding: Arc<dyn EmbeddingProvider>,
    model: String,
}

/// The four content-class indexes, loaded lazily and cached.
pub struct IndexSet {
    source: Option<IndexSource>,
    loaded: Mutex<HashMap<ContentClass, Arc<dyn SimilarityIndex>>>,
}

impl IndexSet {
    /// Index set reading from the configured index directories.
    pub fn open(
        config: &crate::config::EdutorConfig,
        embedding: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let dirs = ContentClass::ALL
            .into_iter()
            .map(|class| (class, config.index_dir(class)))
            .collect();
        Self {
            source: Some(IndexSource {
                dirs,
                embedding,
                model: config.embedding.model.clone(),
            }),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Index set over already-built indexes. Classes not supplied resolve to
    /// [`Error::MissingIndex`].
    pub fn from_indexes(indexes: impl IntoIterator<Item = Arc<dyn SimilarityIndex>>) -> Self {
        let loaded = indexes
            .into_iter()
            .map(|index| (index.class(), index))
            .collect();
        Self {
            source: None,
            loaded: Mutex::new(loaded),
        }
    }

    /// Resolve `class` to its index, opening it on first use.
    pub fn get(&self, class: ContentClass) -> Result<Arc<dyn SimilarityIndex>> {
        let mut loaded = self
            .loaded
            .lock()
            .map_err(|e| anyhow::anyhow!("index cache lock poisoned: {e}"))?;

        if let Some(index) = loaded.get(&class) {
            return Ok(Arc::clone(index));
        }

        let Some(source) = &self.source else {
            return Err(Error::MissingIndex {
                class,
                path: PathBuf::from("<not configured>"),
            });
        };
        let dir = source
            .dirs
            .get(&class)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(class.as_str()));

        let index: Arc<dyn SimilarityIndex> = Arc::new(SqliteIndex::open(
            &dir,
            class,
            Arc::clone(&source.embedding),
            &source.model,
        )?);
        loaded.insert(class, Arc::clone(&index));
        Ok(index)
    }
}
