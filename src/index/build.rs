//! Batch index build: prepared text files → sentence-aligned chunks → vectors.
//!
//! [`build_index`] is the entry point used by `edutor index build`. It reads
//! every `.txt`/`.md` file of one content class, splits each file with
//! [`split_chunks`], embeds the chunks in batches and writes a fresh
//! `index.db`. Chunks never overlap.
//!
//! Chunk size is measured in the embedding model's tokens and never exceeds
//! the model's input window, so every stored chunk is embedded whole.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rusqlite::params;
use serde::Serialize;

use super::search::embedding_to_bytes;
use super::types::{Chunk, ContentClass};
use crate::db;
use crate::embedding::EmbeddingProvider;

const EMBED_BATCH: usize = 32;

/// Outcome of one index build.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub class: ContentClass,
    pub sources: usize,
    pub chunks: usize,
    pub path: PathBuf,
}

/// A prepared text document: (file name, full text).
pub type SourceDocument = (String, String);

/// Read the prepared text files of one content class, sorted by name.
pub fn read_sources(source_dir: &Path) -> Result<Vec<SourceDocument>> {
    anyhow::ensure!(
        source_dir.is_dir(),
        "source directory {} does not exist",
        source_dir.display()
    );

    let mut paths: Vec<PathBuf> = std::fs::read_dir(source_dir)
        .with_context(|| format!("failed to list {}", source_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("txt") | Some("md")
                )
        })
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok((name, text))
        })
        .collect()
}

/// Build the index for `class` in `index_dir` from the files in `source_dir`.
pub fn build_index(
    index_dir: &Path,
    class: ContentClass,
    source_dir: &Path,
    chunk_tokens: usize,
    embedding: &dyn EmbeddingProvider,
    model: &str,
    progress: Option<&ProgressBar>,
) -> Result<BuildReport> {
    let documents = read_sources(source_dir)?;
    anyhow::ensure!(
        !documents.is_empty(),
        "no .txt or .md files in {}",
        source_dir.display()
    );
    build_from_documents(index_dir, class, &documents, chunk_tokens, embedding, model, progress)
}

/// Build the index for `class` from in-memory documents.
pub fn build_from_documents(
    index_dir: &Path,
    class: ContentClass,
    documents: &[SourceDocument],
    chunk_tokens: usize,
    embedding: &dyn EmbeddingProvider,
    model: &str,
    progress: Option<&ProgressBar>,
) -> Result<BuildReport> {
    let limit = match embedding.max_tokens() {
        Some(window) if window < chunk_tokens => {
            tracing::info!(
                configured = chunk_tokens,
                window,
                "chunk size clamped to the embedding window"
            );
            window
        }
        _ => chunk_tokens,
    };

    let mut chunks = Vec::new();
    for (source, text) in documents {
        for (offset, content) in split_chunks(text, limit, |s| embedding.count_tokens(s))? {
            chunks.push(Chunk {
                id: uuid::Uuid::now_v7().to_string(),
                source: source.clone(),
                offset,
                content,
            });
        }
    }

    tracing::info!(
        class = %class,
        sources = documents.len(),
        chunks = chunks.len(),
        "chunked sources"
    );
    if let Some(pb) = progress {
        pb.set_length(chunks.len() as u64);
    }

    let mut conn = db::create_index(index_dir, class, model)?;
    let tx = conn.transaction()?;
    let created_at = chrono::Utc::now().to_rfc3339();

    for batch in chunks.chunks(EMBED_BATCH) {
        let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
        let vectors = embedding.embed_batch(&texts)?;
        anyhow::ensure!(
            vectors.len() == batch.len(),
            "embedding provider returned {} vectors for {} chunks",
            vectors.len(),
            batch.len()
        );

        for (chunk, vector) in batch.iter().zip(&vectors) {
            tx.execute(
                "INSERT INTO chunks (id, source, start_offset, content, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![chunk.id, chunk.source, chunk.offset as i64, chunk.content, created_at],
            )?;
            tx.execute(
                "INSERT INTO chunks_vec (id, embedding) VALUES (?1, ?2)",
                params![chunk.id, embedding_to_bytes(vector)],
            )?;
        }

        if let Some(pb) = progress {
            pb.inc(batch.len() as u64);
        }
    }
    tx.commit()?;
    let path = db::publish_index(conn, index_dir)?;

    Ok(BuildReport {
        class,
        sources: documents.len(),
        chunks: chunks.len(),
        path,
    })
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

/// Split `text` into chunks of at most `max_tokens` tokens, cutting at
/// sentence boundaries where possible. `measure` counts the tokens of a piece
/// of text and must be additive over whitespace-separated pieces. Returns
/// `(byte offset, trimmed chunk text)`.
///
/// A sentence longer than `max_tokens` is cut at word boundaries. A single
/// word longer than the limit becomes a chunk of its own.
pub fn split_chunks<F>(text: &str, max_tokens: usize, mut measure: F) -> Result<Vec<(usize, String)>>
where
    F: FnMut(&str) -> Result<usize>,
{
    let max_tokens = max_tokens.max(1);
    let mut chunks = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    let mut tokens = 0;
    let mut pos = 0;

    for sentence in text.split_inclusive(is_sentence_end) {
        let start = pos;
        pos += sentence.len();

        if sentence.trim().is_empty() {
            continue;
        }
        let n = measure(sentence)?;

        if tokens + n > max_tokens {
            if let Some((s, e)) = current.take() {
                push_span(text, s, e, &mut chunks);
            }
            tokens = 0;
        }

        if n > max_tokens {
            for (s, e) in word_windows(sentence, max_tokens, &mut measure)? {
                push_span(text, start + s, start + e, &mut chunks);
            }
            continue;
        }

        current = Some(match current {
            Some((s, _)) => (s, pos),
            None => (start, pos),
        });
        tokens += n;
    }

    if let Some((s, e)) = current {
        push_span(text, s, e, &mut chunks);
    }
    Ok(chunks)
}

fn push_span(text: &str, start: usize, end: usize, out: &mut Vec<(usize, String)>) {
    let span = &text[start..end];
    let trimmed = span.trim();
    if !trimmed.is_empty() {
        let lead = span.len() - span.trim_start().len();
        out.push((start + lead, trimmed.to_string()));
    }
}

/// Byte spans of consecutive word runs in `sentence`, each at most
/// `max_tokens` tokens.
fn word_windows<F>(sentence: &str, max_tokens: usize, measure: &mut F) -> Result<Vec<(usize, usize)>>
where
    F: FnMut(&str) -> Result<usize>,
{
    let base = sentence.as_ptr() as usize;
    let mut windows = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    let mut tokens = 0;

    for word in sentence.split_whitespace() {
        let s = word.as_ptr() as usize - base;
        let e = s + word.len();
        let n = measure(word)?;

        if tokens + n > max_tokens {
            if let Some(span) = current.take() {
                windows.push(span);
            }
            tokens = 0;
        }
        current = Some(match current {
            Some((cs, _)) => (cs, e),
            None => (s, e),
        });
        tokens += n;
    }

    if let Some(span) = current {
        windows.push(span);
    }
    Ok(windows)
}
