use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ChunkId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "ai"),
        }
    }
}

/// One message in the transcript, scoped to the chunk that was active when it was sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub chunk_id: ChunkId,
    pub sent_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(chunk_id: ChunkId, content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, chunk_id, content)
    }

    pub fn assistant(chunk_id: ChunkId, content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, chunk_id, content)
    }

    fn new(role: ChatRole, chunk_id: ChunkId, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            chunk_id,
            sent_at: Utc::now(),
        }
    }
}

/// Everything the chat collaborator needs to answer one question.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub document_id: String,
    pub chunk_id: ChunkId,
    pub chunk_text: String,
    pub question: String,
    /// Transcript as it stood before this question was asked.
    pub history: Vec<ChatTurn>,
}
