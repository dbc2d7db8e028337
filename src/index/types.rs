//! Similarity index type definitions.
//!
//! Defines [`ContentClass`] (the four kinds of prepared material, one index
//! each), [`Chunk`] (a stored span of source text) and [`ScoredChunk`]
//! (a chunk returned from a nearest-neighbour query with its similarity).

use serde::{Deserialize, Serialize};

/// The content classes served by the tutor. Each class has its own index,
/// built from that class's prepared text only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentClass {
    /// Book chapter text.
    Text,
    /// Lesson video transcript, with timestamps and deep links baked in.
    Video,
    /// Infographic description.
    Image,
    /// Practice exercise bank.
    Exercises,
}

impl ContentClass {
    pub const ALL: [ContentClass; 4] = [Self::Text, Self::Video, Self::Image, Self::Exercises];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Video => "video",
            Self::Image => "image",
            Self::Exercises => "exercises",
        }
    }
}

impl std::fmt::Display for ContentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "video" => Ok(Self::Video),
            "image" => Ok(Self::Image),
            "exercises" => Ok(Self::Exercises),
            _ => Err(format!("unknown content class: {s}")),
        }
    }
}

/// A contiguous span of prepared text, as stored in an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// UUID v7 primary key.
    pub id: String,
    /// File name the chunk was cut from.
    pub source: String,
    /// Byte offset of the chunk inside its source file.
    pub offset: usize,
    /// The chunk text.
    pub content: String,
}

/// A chunk returned by a nearest-neighbour query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub id: String,
    pub content: String,
    /// Cosine similarity to the query, in `[-1.0, 1.0]`.
    pub score: f64,
}
