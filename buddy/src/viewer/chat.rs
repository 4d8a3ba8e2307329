use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::BuddyError;
use crate::models::{ChatRequest, ChatTurn, Chunk, ChunkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatState {
    Idle,
    Sending,
}

/// Identifies one outstanding chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatTicket {
    generation: u64,
    seq: u64,
    chunk_id: ChunkId,
}

impl ChatTicket {
    pub fn chunk_id(&self) -> ChunkId {
        self.chunk_id
    }
}

/// A send that has been recorded locally and still has to go over the wire.
#[derive(Debug, Clone)]
pub struct PendingChat {
    pub ticket: ChatTicket,
    pub request: ChatRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    Answered,
    Failed,
    /// The ticket belongs to another session or was already completed.
    Discarded,
}

/// Transcript and in-flight bookkeeping for one document view.
///
/// User turns are appended before the request is issued and are never rolled
/// back. Sends are not serialized: a second question may go out while the
/// first is unanswered, and answers are appended in arrival order.
#[derive(Debug, Clone)]
pub struct ChatSession {
    generation: u64,
    document_id: String,
    transcript: Vec<ChatTurn>,
    outstanding: HashMap<u64, usize>,
    failed: HashSet<usize>,
    next_seq: u64,
    last_error: Option<String>,
}

impl ChatSession {
    pub fn new(document_id: impl Into<String>, generation: u64) -> Self {
        Self {
            generation,
            document_id: document_id.into(),
            transcript: Vec::new(),
            outstanding: HashMap::new(),
            failed: HashSet::new(),
            next_seq: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> ChatState {
        if self.outstanding.is_empty() {
            ChatState::Idle
        } else {
            ChatState::Sending
        }
    }

    pub fn is_sending(&self) -> bool {
        self.state() == ChatState::Sending
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn turns_for(&self, chunk_id: ChunkId) -> impl Iterator<Item = &ChatTurn> + '_ {
        self.transcript
            .iter()
            .filter(move |turn| turn.chunk_id == chunk_id)
    }

    /// Whether the user turn at `index` never got an answer because its request failed.
    pub fn turn_failed(&self, index: usize) -> bool {
        self.failed.contains(&index)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Records the question and builds the request for it.
    ///
    /// Blank text or a missing active chunk is a no-op.
    pub fn begin_send(&mut self, text: &str, active: Option<&Chunk>) -> Option<PendingChat> {
        if text.trim().is_empty() {
            return None;
        }
        let chunk = active?;

        if self.is_sending() {
            tracing::warn!(
                outstanding = self.outstanding.len(),
                "Sending while a previous question is unanswered; answers arrive in completion order"
            );
        }

        let history = self.transcript.clone();
        let user_index = self.transcript.len();
        self.transcript.push(ChatTurn::user(chunk.id, text));
        self.last_error = None;

        let seq = self.next_seq;
        self.next_seq += 1;
        self.outstanding.insert(seq, user_index);

        let ticket = ChatTicket {
            generation: self.generation,
            seq,
            chunk_id: chunk.id,
        };
        let request = ChatRequest {
            document_id: self.document_id.clone(),
            chunk_id: chunk.id,
            chunk_text: chunk.text.clone(),
            question: text.to_string(),
            history,
        };

        Some(PendingChat { ticket, request })
    }

    pub fn complete(
        &mut self,
        ticket: ChatTicket,
        result: std::result::Result<String, BuddyError>,
    ) -> ChatOutcome {
        if ticket.generation != self.generation {
            tracing::debug!("Dropping chat answer for a previous document");
            return ChatOutcome::Discarded;
        }
        let Some(user_index) = self.outstanding.remove(&ticket.seq) else {
            return ChatOutcome::Discarded;
        };

        match result {
            Ok(answer) => {
                self.transcript
                    .push(ChatTurn::assistant(ticket.chunk_id, answer));
                ChatOutcome::Answered
            }
            Err(e) => {
                tracing::warn!(chunk_id = %ticket.chunk_id, error = %e, "Chat request failed");
                self.failed.insert(user_index);
                self.last_error = Some(format!("Message failed to send: {e}"));
                ChatOutcome::Failed
            }
        }
    }
}
