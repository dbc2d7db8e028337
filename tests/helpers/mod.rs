#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use edutor::agent::Agent;
use edutor::config::AgentConfig;
use edutor::embedding::{EmbeddingProvider, EMBEDDING_DIM};
use edutor::index::build::build_from_documents;
use edutor::index::types::{ContentClass, ScoredChunk};
use edutor::index::{IndexSet, SimilarityIndex};
use edutor::llm::{ChatMessage, ChatModel};
use edutor::mailbox::Exchange;
use edutor::retrieval::RetrievalGate;
use edutor::tools::ContentTools;

pub const IMAGE_URL: &str = "https://example.org/Infografico-1.jpg";

/// Generate a deterministic 384-dim embedding with a spike at position `seed`.
/// Distinct seeds are orthogonal.
pub fn test_embedding(seed: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[seed % EMBEDDING_DIM] = 1.0;
    v
}

/// Unit vector whose cosine similarity with `test_embedding(seed)` is `cos`.
pub fn embedding_with_similarity(seed: usize, cos: f32) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[seed % EMBEDDING_DIM] = cos;
    v[(seed + 1) % EMBEDDING_DIM] = (1.0 - cos * cos).max(0.0).sqrt();
    v
}

/// Embedding stub: known phrases map to fixed vectors, anything else to a
/// vector orthogonal to the low seeds.
#[derive(Default)]
pub struct PhraseEmbedding {
    table: HashMap<String, Vec<f32>>,
}

impl PhraseEmbedding {
    pub fn with(mut self, phrase: &str, vector: Vec<f32>) -> Self {
        self.table.insert(phrase.to_string(), vector);
        self
    }
}

impl EmbeddingProvider for PhraseEmbedding {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| test_embedding(EMBEDDING_DIM - 1)))
    }
}

/// Build a real sqlite-vec index of single-sentence documents in `dir`.
pub fn build_test_index(dir: &Path, class: ContentClass, embedding: &PhraseEmbedding, docs: &[&str]) {
    let documents: Vec<(String, String)> = docs
        .iter()
        .enumerate()
        .map(|(i, d)| (format!("doc{i}.txt"), d.to_string()))
        .collect();
    build_from_documents(dir, class, &documents, 256, embedding, "test-model", None).unwrap();
}

/// An index that returns preset candidates, most similar first.
pub struct FixedIndex {
    pub class: ContentClass,
    pub results: Vec<ScoredChunk>,
    pub queries: AtomicUsize,
}

impl FixedIndex {
    pub fn new(class: ContentClass, scored: &[(&str, f64)]) -> Arc<Self> {
        let results = scored
            .iter()
            .enumerate()
            .map(|(i, (content, score))| ScoredChunk {
                id: format!("{class}-{i}"),
                content: content.to_string(),
                score: *score,
            })
            .collect();
        Arc::new(Self {
            class,
            results,
            queries: AtomicUsize::new(0),
        })
    }
}

impl SimilarityIndex for FixedIndex {
    fn class(&self) -> ContentClass {
        self.class
    }

    fn nearest(&self, _query: &str, k: usize) -> anyhow::Result<Vec<ScoredChunk>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let mut results = self.results.clone();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }
}

pub fn as_index(index: &Arc<FixedIndex>) -> Arc<dyn SimilarityIndex> {
    index.clone()
}

/// A chat model that replays canned completions. Once the script runs out
/// the last completion repeats.
pub struct ScriptedModel {
    script: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new<S: AsRef<str>>(script: &[S]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.iter().map(|s| s.as_ref().to_string()).collect()),
            last: Mutex::new(String::new()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Conversations passed to each call, in order.
    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}

pub fn fast_exchange() -> Arc<Exchange> {
    Arc::new(Exchange::in_memory(Duration::from_millis(5)))
}

pub fn tools_over(indexes: Vec<Arc<dyn SimilarityIndex>>, exchange: Arc<Exchange>) -> Arc<ContentTools> {
    Arc::new(ContentTools::new(
        Arc::new(IndexSet::from_indexes(indexes)),
        RetrievalGate::default(),
        exchange,
        IMAGE_URL,
    ))
}

pub fn agent_config(max_iterations: usize) -> AgentConfig {
    AgentConfig {
        max_iterations,
        ..AgentConfig::default()
    }
}

pub fn agent_with(model: Arc<ScriptedModel>, tools: Arc<ContentTools>, max_iterations: usize) -> Agent {
    Agent::new(model, tools, &agent_config(max_iterations))
}

/// A ReAct completion calling `tool` with `input`.
pub fn act(tool: &str, input: &str) -> String {
    format!("Thought: preciso usar uma ferramenta.\nAction: {tool}\nAction Input: {input}")
}

/// A ReAct completion ending the turn with `answer`.
pub fn answer(answer: &str) -> String {
    format!("Thought: já posso responder.\nAnswer: {answer}")
}
