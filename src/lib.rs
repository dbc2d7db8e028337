//! A retrieval-grounded tutoring agent for HTML5 page structure, text
//! formatting, links, lists and tables.
//!
//! A learner talks to the agent through a pair of append-only mailboxes. The
//! agent reasons in a think/act/observe loop, retrieves teaching material
//! from one similarity index per content format, and answers in the
//! learner's preferred format, adapted to their level.
//!
//! | Content class | Source | Used by |
//! |---------------|--------|---------|
//! | **text** | book chapter, prepared as text | `get_content` (text) |
//! | **video** | lesson transcription, linked paragraphs | `get_content` (video) |
//! | **image** | infographic description | `get_content` (image) |
//! | **exercises** | PHP exercise bank | `get_php_exercises` |
//!
//! # Architecture
//!
//! - **Storage**: one SQLite database per content class with
//!   [sqlite-vec](https://github.com/asg017/sqlite-vec) cosine search
//! - **Embeddings**: local ONNX Runtime with all-MiniLM-L6-v2 (384 dimensions)
//! - **Retrieval**: top-3 nearest chunks, kept only at similarity ≥ 0.75
//! - **Reasoning**: ReAct-formatted completions from an OpenAI-compatible model
//! - **Front ends**: terminal chat and an HTTP endpoint, both over the
//!   mailbox exchange
//!
//! # Modules
//!
//! - [`config`]: TOML configuration and environment overrides
//! - [`db`]: index database schema, creation and health checks
//! - [`embedding`]: text-to-vector pipeline
//! - [`index`]: similarity indexes, loading and batch build
//! - [`retrieval`]: the top-K + threshold gate
//! - [`tools`]: the content tools the agent calls
//! - [`mailbox`]: the message exchange between UI and agent
//! - [`llm`]: chat-completion client
//! - [`agent`]: the reasoning loop
//! - [`driver`]: the agent-side turn loop
//! - [`server`]: process wiring and the HTTP front end
//! - [`prepare`]: raw material to indexable text

pub mod agent;
pub mod cli;
pub mod config;
pub mod db;
pub mod driver;
pub mod embedding;
pub mod error;
pub mod index;
pub mod llm;
pub mod mailbox;
pub mod prepare;
pub mod retrieval;
pub mod server;
pub mod tools;
