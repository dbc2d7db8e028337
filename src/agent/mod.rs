//! The reasoning loop.
//!
//! Each model call is one iteration. A completion is parsed into a [`Step`]:
//! an action runs one tool and feeds its result back as an `Observation:`,
//! an answer ends the turn. Unparseable output and malformed tool calls are
//! observed too, so the model can correct itself. The iteration cap counts
//! model calls and ends the turn with [`Error::IterationLimit`].

pub mod parse;
pub mod prompt;

use std::sync::Arc;

use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::llm::{ChatMessage, ChatModel};
use crate::tools::{tool_specs, ContentTools, ToolCall};
use parse::{parse_step, Step};

const RETRIEVAL_REQUIRED: &str = "Antes de responder, busque conteúdo com get_content ou \
    get_php_exercises para basear sua resposta.";

pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: Arc<ContentTools>,
    system_prompt: String,
    max_iterations: usize,
    require_retrieval: bool,
    memory: Vec<ChatMessage>,
}

impl Agent {
    pub fn new(model: Arc<dyn ChatModel>, tools: Arc<ContentTools>, config: &AgentConfig) -> Self {
        Self {
            model,
            tools,
            system_prompt: prompt::system_prompt(&tool_specs()),
            max_iterations: config.max_iterations,
            require_retrieval: config.require_retrieval,
            memory: Vec::new(),
        }
    }

    /// Messages exchanged since the last [`reset`](Self::reset).
    pub fn memory(&self) -> &[ChatMessage] {
        &self.memory
    }

    /// Forget the conversation so far.
    pub fn reset(&mut self) {
        self.memory.clear();
    }

    /// Run the loop on one user message until the model answers.
    pub async fn chat(&mut self, message: &str) -> Result<String> {
        self.memory.push(ChatMessage::user(message));
        let mut retrieved = false;

        for iteration in 1..=self.max_iterations {
            let reply = self.complete().await?;
            self.memory.push(ChatMessage::assistant(reply.trim()));

            let observation = match parse_step(&reply) {
                Ok(Step::Answer { thought, answer }) => {
                    log_thought(iteration, thought.as_deref());
                    if self.require_retrieval && !retrieved {
                        tracing::warn!(iteration, "answer without retrieval rejected");
                        RETRIEVAL_REQUIRED.to_string()
                    } else {
                        tracing::info!(iteration, len = answer.len(), "agent answered");
                        return Ok(answer);
                    }
                }
                Ok(Step::Act {
                    thought,
                    action,
                    input,
                }) => {
                    log_thought(iteration, thought.as_deref());
                    match self.act(&action, &input).await {
                        Ok((output, was_retrieval)) => {
                            retrieved |= was_retrieval;
                            output
                        }
                        Err(e) if e.is_recoverable() => {
                            tracing::warn!(iteration, tool = %action, error = %e, "tool call rejected");
                            format!("Erro: {e}")
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(problem) => {
                    tracing::warn!(iteration, %problem, "unparseable model output");
                    format!("Erro de formato: {problem}")
                }
            };

            tracing::debug!(iteration, len = observation.len(), "observation");
            self.memory
                .push(ChatMessage::user(format!("Observation: {observation}")));
        }

        tracing::error!(max = self.max_iterations, "iteration limit reached");
        Err(Error::IterationLimit(self.max_iterations))
    }

    async fn complete(&self) -> Result<String> {
        let mut messages = Vec::with_capacity(self.memory.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.as_str()));
        messages.extend(self.memory.iter().cloned());
        Ok(self.model.complete(&messages).await?)
    }

    /// Run one tool; returns its observation text and whether it retrieved.
    async fn act(&self, action: &str, input: &str) -> Result<(String, bool)> {
        let call = ToolCall::parse(action, input)?;
        let was_retrieval = call.is_retrieval();
        let output = self.tools.call(call).await?;
        Ok((output.to_string(), was_retrieval))
    }
}

fn log_thought(iteration: usize, thought: Option<&str>) {
    if let Some(thought) = thought {
        tracing::info!(iteration, "Thought: {thought}");
    }
}
