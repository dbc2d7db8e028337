//! Turning raw teaching material into the plain-text files the index build
//! reads.
//!
//! - [`exercises`]: the exercise bank JSON becomes one labelled text block
//!   per exercise.
//! - [`video`]: timestamped transcription segments become paragraphs that
//!   carry a deep link into the lesson video.
//!
//! Transcribing the video and describing the infographic happen outside this
//! crate; their outputs are supplied as files.

pub mod exercises;
pub mod video;

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

/// Remove HTML tags, decode the common entities and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]*>").ok());

    let text = match tag {
        Some(re) => re.replace_all(html, " ").into_owned(),
        None => html.to_string(),
    };
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "prepared text written");
    Ok(())
}
