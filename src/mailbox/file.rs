//! JSON-file mailbox shared between processes.
//!
//! The file holds one object with a single list field named after the
//! mailbox, e.g. `{"user": ["oi", "o que é uma tag <p>?"]}`. Every append
//! rewrites the whole file through a temp file + rename, so a reader in the
//! other process sees either the old list or the new one, never a torn write.
//! Each mailbox has exactly one writing process.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::Mailbox;

pub struct FileMailbox {
    path: PathBuf,
    field: String,
    write_lock: Mutex<()>,
}

impl FileMailbox {
    /// Open the mailbox at `path`, creating the file (and its directory) with
    /// an empty list if it does not exist yet. Existing messages are kept.
    pub fn create(path: impl Into<PathBuf>, field: &str) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let mailbox = Self {
            path,
            field: field.to_string(),
            write_lock: Mutex::new(()),
        };

        if mailbox.path.exists() {
            tracing::debug!(path = %mailbox.path.display(), "mailbox file already exists");
            // fail early on a file that does not hold this mailbox
            mailbox.read()?;
        } else {
            mailbox.write_all(&[])?;
            tracing::info!(path = %mailbox.path.display(), field, "mailbox file created");
        }
        Ok(mailbox)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, messages: &[String]) -> Result<()> {
        let mut doc = Map::new();
        doc.insert(
            self.field.clone(),
            Value::Array(messages.iter().cloned().map(Value::String).collect()),
        );
        let json = serde_json::to_string_pretty(&Value::Object(doc))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl Mailbox for FileMailbox {
    fn name(&self) -> &str {
        &self.field
    }

    fn read(&self) -> Result<Vec<String>> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read mailbox {}", self.path.display()))?;
        let doc: Value = serde_json::from_str(&contents)
            .with_context(|| format!("mailbox {} is not valid JSON", self.path.display()))?;

        let list = doc
            .get(&self.field)
            .and_then(Value::as_array)
            .with_context(|| {
                format!(
                    "mailbox {} has no \"{}\" list",
                    self.path.display(),
                    self.field
                )
            })?;

        list.iter()
            .map(|v| {
                v.as_str().map(str::to_owned).with_context(|| {
                    format!("mailbox {} holds a non-string entry", self.path.display())
                })
            })
            .collect()
    }

    fn append(&self, message: &str) -> Result<usize> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| anyhow::anyhow!("mailbox lock poisoned: {e}"))?;
        let mut messages = self.read()?;
        messages.push(message.to_string());
        self.write_all(&messages)?;
        Ok(messages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_writes_empty_named_list() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broker").join("user_msgs.json");

        let mailbox = FileMailbox::create(&path, "user").unwrap();
        assert!(path.exists());
        assert_eq!(mailbox.len().unwrap(), 0);

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "user": [] }));
    }

    #[test]
    fn create_keeps_existing_messages() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("assistant_msgs.json");
        std::fs::write(&path, r#"{"assistant": ["Olá!"]}"#).unwrap();

        let mailbox = FileMailbox::create(&path, "assistant").unwrap();
        assert_eq!(mailbox.read().unwrap(), vec!["Olá!".to_string()]);
    }

    #[test]
    fn create_rejects_a_file_for_another_mailbox() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("msgs.json");
        std::fs::write(&path, r#"{"assistant": []}"#).unwrap();

        assert!(FileMailbox::create(&path, "user").is_err());
    }

    #[test]
    fn append_is_visible_to_a_second_handle() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("user_msgs.json");

        let writer = FileMailbox::create(&path, "user").unwrap();
        let reader = FileMailbox::create(&path, "user").unwrap();

        assert_eq!(writer.append("primeira").unwrap(), 1);
        assert_eq!(writer.append("segunda").unwrap(), 2);
        assert_eq!(reader.latest().unwrap().as_deref(), Some("segunda"));
        assert!(!tmp.path().join("user_msgs.json.tmp").exists());
    }
}
