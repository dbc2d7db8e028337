//! Agent side of the turn protocol.
//!
//! The driver polls the user mailbox. When it has grown past the agent's
//! cursor, the newest message (plus the system reminders) is handed to the
//! agent, the answer is appended to the assistant mailbox and the agent's
//! working memory is cleared. A failed turn still produces an assistant
//! entry, so the UI never waits on a turn that will not finish.

use std::sync::Arc;

use anyhow::Result;

use crate::agent::Agent;
use crate::mailbox::Exchange;
use crate::tools::send_message::with_reminders;

pub struct TurnDriver {
    exchange: Arc<Exchange>,
    agent: Agent,
    failure_message: String,
}

impl TurnDriver {
    pub fn new(exchange: Arc<Exchange>, agent: Agent, failure_message: impl Into<String>) -> Self {
        Self {
            exchange,
            agent,
            failure_message: failure_message.into(),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Handle at most one turn. Returns whether a user message was answered.
    pub async fn poll_once(&mut self) -> Result<bool> {
        let Some(message) = self.exchange.take_latest_user()? else {
            return Ok(false);
        };
        tracing::info!(cursor = self.exchange.user_cursor(), "turn started");

        let reply = match self.agent.chat(&with_reminders(&message)).await {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                tracing::warn!("agent produced an empty answer");
                self.failure_message.clone()
            }
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                self.failure_message.clone()
            }
        };

        self.agent.reset();
        let len = self.exchange.reply(&reply)?;
        tracing::info!(assistant_len = len, "turn finished");
        Ok(true)
    }

    /// Serve turns forever. Messages already in the user mailbox at startup
    /// are not answered.
    pub async fn run(mut self) -> Result<()> {
        let seen = self.exchange.mark_user_seen()?;
        tracing::info!(
            skipped = seen,
            poll_ms = self.exchange.poll_interval().as_millis() as u64,
            "agent driver started"
        );

        loop {
            tokio::time::sleep(self.exchange.poll_interval()).await;
            if let Err(e) = self.poll_once().await {
                tracing::warn!(error = %e, "mailbox poll failed");
            }
        }
    }
}
