use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::index::types::ContentClass;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EdutorConfig {
    pub server: ServerConfig,
    pub mailbox: MailboxConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MailboxConfig {
    pub dir: String,
    pub user_file: String,
    pub assistant_file: String,
    pub poll_interval_ms: u64,
    pub stream_delay_ms: u64,
}

/// Per-class value table, used for index directory names, source
/// directories and chunk sizes.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PerClass<T> {
    pub text: T,
    pub video: T,
    pub image: T,
    pub exercises: T,
}

impl<T> PerClass<T> {
    pub fn get(&self, class: ContentClass) -> &T {
        match class {
            ContentClass::Text => &self.text,
            ContentClass::Video => &self.video,
            ContentClass::Image => &self.image,
            ContentClass::Exercises => &self.exercises,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IndexConfig {
    pub root: String,
    pub dirs: PerClass<String>,
    pub sources_root: String,
    pub chunk_tokens: PerClass<usize>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub similarity_threshold: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    pub max_iterations: usize,
    pub require_retrieval: bool,
    pub failure_message: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MediaConfig {
    pub image_url: String,
    pub video_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 7860,
            log_level: "info".into(),
        }
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            dir: "./message_broker".into(),
            user_file: "user_msgs.json".into(),
            assistant_file: "assistant_msgs.json".into(),
            poll_interval_ms: 1000,
            stream_delay_ms: 10,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: "./results".into(),
            dirs: PerClass {
                text: "text".into(),
                video: "video".into(),
                image: "image".into(),
                exercises: "exercises".into(),
            },
            sources_root: "./data".into(),
            chunk_tokens: PerClass {
                text: 256,
                video: 256,
                image: 128,
                exercises: 256,
            },
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_edutor_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            similarity_threshold: 0.75,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-3.5-turbo-0125".into(),
            base_url: "https://api.openai.com/v1".into(),
            temperature: 0.0,
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: 120,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            require_retrieval: false,
            failure_message: "Desculpe, não consegui concluir essa resposta. Pode reformular sua dúvida?"
                .into(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image_url: "https://raw.githubusercontent.com/grupo-a/challenge-artificial-intelligence/main/resources/Infografico-1.jpg".into(),
            video_url: "https://youtu.be/w3L27GhWLog".into(),
        }
    }
}

/// Returns `~/.edutor/`
pub fn default_edutor_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".edutor")
}

/// Returns the default config file path: `~/.edutor/config.toml`
pub fn default_config_path() -> PathBuf {
    default_edutor_dir().join("config.toml")
}

impl EdutorConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            EdutorConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (EDUTOR_INDEX_ROOT, EDUTOR_MAILBOX_DIR,
    /// EDUTOR_LOG_LEVEL, EDUTOR_LLM_MODEL, EDUTOR_LLM_BASE_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("EDUTOR_INDEX_ROOT") {
            self.index.root = val;
        }
        if let Ok(val) = std::env::var("EDUTOR_MAILBOX_DIR") {
            self.mailbox.dir = val;
        }
        if let Ok(val) = std::env::var("EDUTOR_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("EDUTOR_LLM_MODEL") {
            self.llm.model = val;
        }
        if let Ok(val) = std::env::var("EDUTOR_LLM_BASE_URL") {
            self.llm.base_url = val;
        }
    }

    /// Directory holding the similarity index for one content class.
    pub fn index_dir(&self, class: ContentClass) -> PathBuf {
        expand_tilde(&self.index.root).join(self.index.dirs.get(class))
    }

    /// Directory holding the prepared text files for one content class.
    pub fn source_dir(&self, class: ContentClass) -> PathBuf {
        expand_tilde(&self.index.sources_root).join(self.index.dirs.get(class))
    }

    pub fn user_mailbox_path(&self) -> PathBuf {
        expand_tilde(&self.mailbox.dir).join(&self.mailbox.user_file)
    }

    pub fn assistant_mailbox_path(&self) -> PathBuf {
        expand_tilde(&self.mailbox.dir).join(&self.mailbox.assistant_file)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.mailbox.poll_interval_ms)
    }

    pub fn stream_delay(&self) -> Duration {
        Duration::from_millis(self.mailbox.stream_delay_ms)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EdutorConfig::default();
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.similarity_threshold, 0.75);
        assert_eq!(config.agent.max_iterations, 1000);
        assert_eq!(config.mailbox.poll_interval_ms, 1000);
        assert_eq!(*config.index.chunk_tokens.get(ContentClass::Image), 128);
        assert!(config.embedding.cache_dir.ends_with("models"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[mailbox]
dir = "/tmp/broker"
poll_interval_ms = 50

[retrieval]
similarity_threshold = 0.8

[index.dirs]
text = "pdf"
video = "video"
image = "imagem"
exercises = "exercicios"
"#;
        let config: EdutorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.mailbox.dir, "/tmp/broker");
        assert_eq!(config.mailbox.poll_interval_ms, 50);
        assert_eq!(config.retrieval.similarity_threshold, 0.8);
        assert_eq!(config.index.dirs.get(ContentClass::Text), "pdf");
        // defaults still apply for unset fields
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.mailbox.user_file, "user_msgs.json");
        assert_eq!(config.llm.model, "gpt-3.5-turbo-0125");
    }

    #[test]
    fn index_dir_joins_root_and_class_dir() {
        let mut config = EdutorConfig::default();
        config.index.root = "/srv/indexes".into();
        assert_eq!(
            config.index_dir(ContentClass::Exercises),
            PathBuf::from("/srv/indexes/exercises")
        );
        assert_eq!(
            config.user_mailbox_path(),
            PathBuf::from("./message_broker/user_msgs.json")
        );
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = EdutorConfig::default();
        std::env::set_var("EDUTOR_INDEX_ROOT", "/tmp/override-index");
        std::env::set_var("EDUTOR_MAILBOX_DIR", "/tmp/override-broker");
        std::env::set_var("EDUTOR_LLM_MODEL", "gpt-4o-mini");

        config.apply_env_overrides();

        assert_eq!(config.index.root, "/tmp/override-index");
        assert_eq!(config.mailbox.dir, "/tmp/override-broker");
        assert_eq!(config.llm.model, "gpt-4o-mini");

        // Clean up
        std::env::remove_var("EDUTOR_INDEX_ROOT");
        std::env::remove_var("EDUTOR_MAILBOX_DIR");
        std::env::remove_var("EDUTOR_LLM_MODEL");
    }
}
