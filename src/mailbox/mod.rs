//! Message exchange between the chat front end and the agent.
//!
//! Two append-only mailboxes carry the conversation: the UI writes to `user`,
//! the agent writes to `assistant`. Neither side is notified of new entries;
//! each polls the other's mailbox length at a fixed interval. Entries are
//! never removed or rewritten, so a length read is a valid cursor.

pub mod file;
pub mod memory;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::EdutorConfig;
pub use file::FileMailbox;
pub use memory::MemoryMailbox;

pub const USER: &str = "user";
pub const ASSISTANT: &str = "assistant";

/// An append-only, ordered list of messages.
pub trait Mailbox: Send + Sync {
    fn name(&self) -> &str;

    /// All messages, oldest first.
    fn read(&self) -> Result<Vec<String>>;

    /// Append one message and return the new length.
    fn append(&self, message: &str) -> Result<usize>;

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    fn latest(&self) -> Result<Option<String>> {
        Ok(self.read()?.pop())
    }
}

/// Both mailboxes plus the agent's read cursor into the user mailbox.
///
/// The cursor is shared by the turn driver and the `send_message` tool, so a
/// user reply consumed mid-turn by the tool is not picked up again as a new
/// turn.
pub struct Exchange {
    user: Arc<dyn Mailbox>,
    assistant: Arc<dyn Mailbox>,
    poll_interval: Duration,
    user_cursor: AtomicUsize,
}

impl Exchange {
    pub fn new(user: Arc<dyn Mailbox>, assistant: Arc<dyn Mailbox>, poll_interval: Duration) -> Self {
        Self {
            user,
            assistant,
            poll_interval,
            user_cursor: AtomicUsize::new(0),
        }
    }

    /// The file-backed exchange under the configured mailbox directory.
    pub fn open(config: &EdutorConfig) -> Result<Self> {
        let user = FileMailbox::create(config.user_mailbox_path(), USER)?;
        let assistant = FileMailbox::create(config.assistant_mailbox_path(), ASSISTANT)?;
        Ok(Self::new(
            Arc::new(user),
            Arc::new(assistant),
            config.poll_interval(),
        ))
    }

    pub fn in_memory(poll_interval: Duration) -> Self {
        Self::new(
            Arc::new(MemoryMailbox::new(USER)),
            Arc::new(MemoryMailbox::new(ASSISTANT)),
            poll_interval,
        )
    }

    pub fn user(&self) -> &dyn Mailbox {
        self.user.as_ref()
    }

    pub fn assistant(&self) -> &dyn Mailbox {
        self.assistant.as_ref()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    // ── UI side ──────────────────────────────────────────────────

    /// Publish a user message and wait for the assistant's reply.
    ///
    /// The assistant baseline is read before the message is appended, so a
    /// reply written immediately after the append is still seen as new.
    pub async fn submit(&self, message: &str) -> Result<String> {
        let baseline = self.assistant.len()?;
        self.user.append(message)?;
        tracing::debug!(baseline, "user message published");

        let replies = wait_for_growth(self.assistant.as_ref(), baseline, self.poll_interval).await?;
        Ok(replies.last().cloned().unwrap_or_default())
    }

    // ── Agent side ───────────────────────────────────────────────

    /// Current position of the agent in the user mailbox.
    pub fn user_cursor(&self) -> usize {
        self.user_cursor.load(Ordering::SeqCst)
    }

    /// Skip everything already in the user mailbox.
    pub fn mark_user_seen(&self) -> Result<usize> {
        let len = self.user.len()?;
        self.user_cursor.store(len, Ordering::SeqCst);
        Ok(len)
    }

    /// The newest user message, if the mailbox grew past the cursor.
    ///
    /// Older unseen messages are skipped: only the latest is returned and the
    /// cursor moves to the end.
    pub fn take_latest_user(&self) -> Result<Option<String>> {
        let messages = self.user.read()?;
        let cursor = self.user_cursor();
        if messages.len() <= cursor {
            return Ok(None);
        }
        if messages.len() > cursor + 1 {
            tracing::debug!(
                skipped = messages.len() - cursor - 1,
                "several user messages arrived; answering the latest"
            );
        }
        self.user_cursor.store(messages.len(), Ordering::SeqCst);
        Ok(messages.last().cloned())
    }

    /// Publish an assistant message mid-turn and wait for the user's answer.
    ///
    /// The user baseline is read before the question is published, so an
    /// answer written immediately after the append is still seen as new.
    pub async fn ask_user(&self, message: &str) -> Result<String> {
        let baseline = self.user.len()?;
        self.assistant.append(message)?;
        tracing::debug!(baseline, "waiting for user reply");

        let messages = wait_for_growth(self.user.as_ref(), baseline, self.poll_interval).await?;
        self.user_cursor.store(messages.len(), Ordering::SeqCst);
        Ok(messages.last().cloned().unwrap_or_default())
    }

    /// Publish a final assistant reply.
    pub fn reply(&self, message: &str) -> Result<usize> {
        self.assistant.append(message)
    }
}

/// Sleep-then-check until `mailbox` holds more than `baseline` entries, then
/// return its full contents.
async fn wait_for_growth(
    mailbox: &dyn Mailbox,
    baseline: usize,
    interval: Duration,
) -> Result<Vec<String>> {
    loop {
        tokio::time::sleep(interval).await;
        let messages = mailbox.read()?;
        if messages.len() > baseline {
            return Ok(messages);
        }
    }
}

/// Successive pieces of `text`, one character each, for simulated streaming.
pub fn reveal(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .map(move |(i, c)| &text[i..i + c.len_utf8()])
}
