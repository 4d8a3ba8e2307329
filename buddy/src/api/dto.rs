//! Wire schemas for the paper backend.
//!
//! Responses are decoded into these records first and only then turned into
//! domain types, so an unexpected shape fails with `BuddyError::Decode`
//! instead of leaking half-parsed data into the viewer.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{BuddyError, Result};
use crate::models::{
    BoundingBox, ChatRequest, ChatRole, Chunk, ChunkId, ClusterId, InterpretedIntent,
    SearchResponse, SearchResult,
};

pub(crate) fn decode<T: DeserializeOwned>(what: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(
            response_len = body.len(),
            response_preview = %body.chars().take(100).collect::<String>(),
            error = %e,
            "Failed to decode {what} response"
        );
        BuddyError::Decode(format!("Unexpected {what} response: {e}"))
    })
}

/// Error body; the backend uses `error` on paper routes and `message` on search routes.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn message_from(body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| body.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Chunks
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ChunksEnvelope {
    chunks: Vec<WireChunk>,
}

#[derive(Debug, Deserialize)]
struct WireChunk {
    id: u32,
    page: u32,
    bbox: [f64; 4],
    text: String,
    cluster_id: i32,
}

impl TryFrom<WireChunk> for Chunk {
    type Error = BuddyError;

    fn try_from(wire: WireChunk) -> Result<Self> {
        let [x0, y0, x1, y1] = wire.bbox;
        let bbox = BoundingBox::new(x0, y0, x1, y1)
            .map_err(|e| BuddyError::Decode(format!("Chunk {}: {e}", wire.id)))?;
        Chunk::new(
            ChunkId(wire.id),
            wire.page,
            bbox,
            wire.text,
            ClusterId(wire.cluster_id),
        )
        .map_err(|e| BuddyError::Decode(e.to_string()))
    }
}

impl ChunksEnvelope {
    /// Source order is kept; it is the reading order.
    pub(crate) fn into_chunks(self) -> Result<Vec<Chunk>> {
        let mut seen = HashSet::with_capacity(self.chunks.len());
        let mut chunks = Vec::with_capacity(self.chunks.len());
        for wire in self.chunks {
            if !seen.insert(wire.id) {
                return Err(BuddyError::Decode(format!(
                    "Duplicate chunk id {} in response",
                    wire.id
                )));
            }
            chunks.push(Chunk::try_from(wire)?);
        }
        Ok(chunks)
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    original_query: String,
    interpreted_intent: Option<InterpretedIntent>,
    results: Vec<WireSearchResult>,
}

/// Years were stored as strings before the metadata migration and as integers after.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireYear {
    Number(i64),
    Text(String),
}

impl WireYear {
    fn into_year(self) -> Option<i32> {
        match self {
            Self::Number(n) => i32::try_from(n).ok(),
            Self::Text(s) => s.trim().get(..4).and_then(|y| y.parse().ok()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireSearchResult {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    authors: Option<String>,
    #[serde(default)]
    year: Option<WireYear>,
    #[serde(default)]
    categories: Option<String>,
    similarity_score: f64,
}

impl TryFrom<WireSearchResult> for SearchResult {
    type Error = BuddyError;

    fn try_from(wire: WireSearchResult) -> Result<Self> {
        if wire.id.trim().is_empty() {
            return Err(BuddyError::Decode("Search result without id".to_string()));
        }
        if !wire.similarity_score.is_finite() {
            return Err(BuddyError::Decode(format!(
                "Search result {} has a non-finite score",
                wire.id
            )));
        }
        let score = wire.similarity_score.clamp(0.0, 1.0);
        if score != wire.similarity_score {
            tracing::debug!(
                id = %wire.id,
                raw = wire.similarity_score,
                "Clamped similarity score into [0, 1]"
            );
        }
        Ok(SearchResult {
            title: wire.title.unwrap_or_else(|| wire.id.clone()),
            id: wire.id,
            abstract_text: wire
                .abstract_text
                .unwrap_or_else(|| "No abstract available".to_string()),
            authors: wire.authors.unwrap_or_default(),
            year: wire.year.and_then(WireYear::into_year),
            categories: wire.categories.unwrap_or_default(),
            similarity_score: score,
        })
    }
}

impl SearchEnvelope {
    pub(crate) fn into_response(self) -> Result<SearchResponse> {
        let interpreted_intent = self
            .interpreted_intent
            .unwrap_or_else(|| InterpretedIntent::Text(self.original_query.clone()));
        let results = self
            .results
            .into_iter()
            .map(SearchResult::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(SearchResponse {
            original_query: self.original_query,
            interpreted_intent,
            results,
        })
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequestBody<'a> {
    chunk_text: &'a str,
    chunk_id: u32,
    question: &'a str,
    arxiv_id: &'a str,
    history: Vec<WireTurn<'a>>,
}

#[derive(Debug, Serialize)]
struct WireTurn<'a> {
    role: ChatRole,
    content: &'a str,
    #[serde(rename = "chunkId")]
    chunk_id: u32,
}

impl<'a> From<&'a ChatRequest> for ChatRequestBody<'a> {
    fn from(request: &'a ChatRequest) -> Self {
        Self {
            chunk_text: &request.chunk_text,
            chunk_id: request.chunk_id.0,
            question: &request.question,
            arxiv_id: &request.document_id,
            history: request
                .history
                .iter()
                .map(|turn| WireTurn {
                    role: turn.role,
                    content: &turn.content,
                    chunk_id: turn.chunk_id.0,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatAnswer {
    pub(crate) answer: String,
}
