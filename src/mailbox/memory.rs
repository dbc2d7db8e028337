use std::sync::RwLock;

use anyhow::Result;

use super::Mailbox;

/// In-process mailbox for single-process setups and tests.
pub struct MemoryMailbox {
    name: String,
    messages: RwLock<Vec<String>>,
}

impl MemoryMailbox {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            messages: RwLock::new(Vec::new()),
        }
    }
}

impl Mailbox for MemoryMailbox {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<Vec<String>> {
        let messages = self
            .messages
            .read()
            .map_err(|e| anyhow::anyhow!("mailbox lock poisoned: {e}"))?;
        Ok(messages.clone())
    }

    fn append(&self, message: &str) -> Result<usize> {
        let mut messages = self
            .messages
            .write()
            .map_err(|e| anyhow::anyhow!("mailbox lock poisoned: {e}"))?;
        messages.push(message.to_string());
        Ok(messages.len())
    }

    fn len(&self) -> Result<usize> {
        let messages = self
            .messages
            .read()
            .map_err(|e| anyhow::anyhow!("mailbox lock poisoned: {e}"))?;
        Ok(messages.len())
    }
}
