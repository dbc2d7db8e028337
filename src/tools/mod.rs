//! Content tools callable by the reasoning loop.
//!
//! The tool set is closed: [`ToolCall`] is parsed from the model's
//! `Action` / `Action Input` lines and dispatched by [`ContentTools`]. Tool
//! results are prompt fragments for the model, not data for other code, so
//! a retrieval miss yields an instruction string rather than an error.

pub mod get_content;
pub mod get_php_exercises;
pub mod send_message;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::EdutorConfig;
use crate::error::{Error, Result};
use crate::index::types::{ContentClass, ScoredChunk};
use crate::index::IndexSet;
use crate::mailbox::Exchange;
use crate::retrieval::RetrievalGate;
use get_content::{ContentFormat, GetContentParams};
use get_php_exercises::GetPhpExercisesParams;
use send_message::SendMessageParams;

pub const GET_CONTENT: &str = "get_content";
pub const GET_PHP_EXERCISES: &str = "get_php_exercises";
pub const SEND_MESSAGE: &str = "send_message";

/// Returned when retrieval finds nothing above the similarity floor.
pub const NO_CONTENT_FALLBACK: &str = "Não foi possível encontrar conteúdo. Talvez em outros \
    formatos possa haver conteúdos relacionados à dúvida do usuário. Explique para ele essa possibilidade.";

/// One parsed tool invocation.
#[derive(Debug, Clone)]
pub enum ToolCall {
    GetContent(GetContentParams),
    GetPhpExercises(GetPhpExercisesParams),
    SendMessage(SendMessageParams),
}

impl ToolCall {
    /// Parse a tool name and its JSON argument object.
    ///
    /// Unknown names and argument payloads that do not match the tool's
    /// parameters fail with [`Error::MalformedToolCall`].
    pub fn parse(name: &str, input: &str) -> Result<Self> {
        let args: serde_json::Value = serde_json::from_str(input.trim()).map_err(|e| {
            Error::MalformedToolCall(format!("Action Input não é um JSON válido: {e}"))
        })?;

        match name.trim() {
            GET_CONTENT => parse_args(GET_CONTENT, args).map(ToolCall::GetContent),
            GET_PHP_EXERCISES => parse_args(GET_PHP_EXERCISES, args).map(ToolCall::GetPhpExercises),
            SEND_MESSAGE => parse_args(SEND_MESSAGE, args).map(ToolCall::SendMessage),
            other => Err(Error::MalformedToolCall(format!(
                "a ferramenta '{other}' não existe; use uma de: {}",
                TOOL_NAMES.join(", ")
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::GetContent(_) => GET_CONTENT,
            ToolCall::GetPhpExercises(_) => GET_PHP_EXERCISES,
            ToolCall::SendMessage(_) => SEND_MESSAGE,
        }
    }

    /// Whether this call consults a similarity index.
    pub fn is_retrieval(&self) -> bool {
        !matches!(self, ToolCall::SendMessage(_))
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: serde_json::Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| Error::MalformedToolCall(format!("argumentos inválidos para {tool}: {e}")))
}

pub const TOOL_NAMES: [&str; 3] = [SEND_MESSAGE, GET_CONTENT, GET_PHP_EXERCISES];

/// A tool's result: a single text or a list of texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutput::Text(text) => f.write_str(text),
            ToolOutput::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "[{}] {}", i + 1, item)?;
                }
                Ok(())
            }
        }
    }
}

/// Name, description and JSON Schema of one tool, for the system prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
}

pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: SEND_MESSAGE,
            description: send_message::DESCRIPTION,
            parameters: schema_value(schemars::schema_for!(SendMessageParams)),
        },
        ToolSpec {
            name: GET_CONTENT,
            description: get_content::DESCRIPTION,
            parameters: schema_value(schemars::schema_for!(GetContentParams)),
        },
        ToolSpec {
            name: GET_PHP_EXERCISES,
            description: get_php_exercises::DESCRIPTION,
            parameters: schema_value(schemars::schema_for!(GetPhpExercisesParams)),
        },
    ]
}

fn schema_value(schema: schemars::Schema) -> serde_json::Value {
    serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
}

/// Dispatches [`ToolCall`]s against the content indexes and the exchange.
pub struct ContentTools {
    indexes: Arc<IndexSet>,
    gate: RetrievalGate,
    exchange: Arc<Exchange>,
    image_url: String,
}

impl ContentTools {
    pub fn new(
        indexes: Arc<IndexSet>,
        gate: RetrievalGate,
        exchange: Arc<Exchange>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            indexes,
            gate,
            exchange,
            image_url: image_url.into(),
        }
    }

    pub fn from_config(config: &EdutorConfig, indexes: Arc<IndexSet>, exchange: Arc<Exchange>) -> Self {
        Self::new(
            indexes,
            RetrievalGate::from(&config.retrieval),
            exchange,
            config.media.image_url.clone(),
        )
    }

    pub async fn call(&self, call: ToolCall) -> Result<ToolOutput> {
        tracing::debug!(tool = call.name(), "tool called");
        let output = match call {
            ToolCall::GetContent(p) => ToolOutput::Text(self.get_content(&p.user_message, p.format).await?),
            ToolCall::GetPhpExercises(p) => self.get_php_exercises(&p.user_message).await?,
            ToolCall::SendMessage(p) => ToolOutput::Text(self.send_message(&p.message).await?),
        };
        Ok(output)
    }

    /// Retrieve material in `format` and wrap it in an adaptation directive.
    pub async fn get_content(&self, user_message: &str, format: ContentFormat) -> Result<String> {
        let chunks = self.retrieve(format.class(), user_message).await?;
        tracing::info!(format = ?format, hits = chunks.len(), "get_content");

        if chunks.is_empty() {
            return Ok(NO_CONTENT_FALLBACK.to_string());
        }
        Ok(get_content::directive(format, &chunks, &self.image_url))
    }

    /// Retrieve PHP exercises as-is.
    pub async fn get_php_exercises(&self, user_message: &str) -> Result<ToolOutput> {
        let chunks = self.retrieve(ContentClass::Exercises, user_message).await?;
        tracing::info!(hits = chunks.len(), "get_php_exercises");

        if chunks.is_empty() {
            return Ok(ToolOutput::Text(NO_CONTENT_FALLBACK.to_string()));
        }
        Ok(ToolOutput::List(chunks.into_iter().map(|c| c.content).collect()))
    }

    /// Send `message` to the user and block until they answer.
    pub async fn send_message(&self, message: &str) -> Result<String> {
        tracing::info!(len = message.len(), "send_message");
        let answer = self.exchange.ask_user(message).await?;
        Ok(send_message::with_reminders(&answer))
    }

    async fn retrieve(&self, class: ContentClass, query: &str) -> Result<Vec<ScoredChunk>> {
        let indexes = Arc::clone(&self.indexes);
        let gate = self.gate;
        let query = query.to_string();

        tokio::task::spawn_blocking(move || -> Result<Vec<ScoredChunk>> {
            let index = indexes.get(class)?;
            Ok(gate.retrieve(index.as_ref(), &query)?)
        })
        .await
        .map_err(|e| anyhow::anyhow!("retrieval task failed: {e}"))?
    }
}
