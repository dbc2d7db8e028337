use anyhow::Result;
use std::sync::Arc;

use crate::config::EdutorConfig;
use crate::index::types::ContentClass;
use crate::index::SqliteIndex;
use crate::retrieval::RetrievalGate;

/// Query one content index from the terminal. With `raw`, print the top-K
/// candidates before the similarity floor is applied.
pub async fn search(config: &EdutorConfig, class: ContentClass, query: &str, raw: bool) -> Result<()> {
    let provider = crate::embedding::create_provider(&config.embedding)?;
    let embedding: Arc<dyn crate::embedding::EmbeddingProvider> = Arc::from(provider);

    let dir = config.index_dir(class);
    let model = config.embedding.model.clone();
    let gate = RetrievalGate::from(&config.retrieval);
    let query_text = query.to_string();

    let results = tokio::task::spawn_blocking(move || -> Result<_> {
        let index = SqliteIndex::open(&dir, class, embedding, &model)?;
        if raw {
            Ok(crate::index::SimilarityIndex::nearest(&index, &query_text, gate.top_k)?)
        } else {
            gate.retrieve(&index, &query_text)
        }
    })
    .await??;

    if results.is_empty() {
        println!(
            "No {class} content scores at least {:.2} for this query.",
            gate.threshold
        );
        return Ok(());
    }

    println!("Found {} {class} chunk(s)\n", results.len());
    for (i, chunk) in results.iter().enumerate() {
        let marker = if chunk.score >= gate.threshold { "" } else { " (below threshold)" };
        println!("  {}. {} (score: {:.4}){marker}", i + 1, chunk.id, chunk.score);
        println!("     {}", super::preview(&chunk.content, 120));
        println!();
    }

    Ok(())
}
