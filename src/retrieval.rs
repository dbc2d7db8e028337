//! Retrieval gate: top-K nearest chunks, then a similarity floor.
//!
//! Taking the K nearest first bounds the cost of a query whatever the index
//! size; the floor then drops matches too weak to ground an answer. An empty
//! result is the normal "nothing relevant" outcome, not an error.

use crate::config::RetrievalConfig;
use crate::index::types::ScoredChunk;
use crate::index::SimilarityIndex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalGate {
    pub top_k: usize,
    pub threshold: f64,
}

impl Default for RetrievalGate {
    fn default() -> Self {
        Self {
            top_k: 3,
            threshold: 0.75,
        }
    }
}

impl From<&RetrievalConfig> for RetrievalGate {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            top_k: config.top_k,
            threshold: config.similarity_threshold,
        }
    }
}

impl RetrievalGate {
    /// Relevant chunks for `query`: at most `top_k`, each scoring at least
    /// `threshold`, most similar first.
    pub fn retrieve(
        &self,
        index: &dyn SimilarityIndex,
        query: &str,
    ) -> anyhow::Result<Vec<ScoredChunk>> {
        let candidates = index.nearest(query, self.top_k)?;
        let kept = self.filter(candidates);
        tracing::debug!(
            class = %index.class(),
            kept = kept.len(),
            threshold = self.threshold,
            "retrieval gate applied"
        );
        Ok(kept)
    }

    /// Apply the gate to raw candidates. Indexes are not trusted to honour
    /// `k` or to return sorted results, so both are enforced here.
    pub fn filter(&self, mut candidates: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(self.top_k);
        candidates.retain(|c| c.score >= self.threshold);
        candidates
    }
}
