use serde::Serialize;

use crate::models::{Chunk, ChunkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Center,
}

/// Ask the list surface to bring the entry for `target` into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollRequest {
    pub target: ChunkId,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

impl ScrollRequest {
    pub fn centered(target: ChunkId) -> Self {
        Self {
            target,
            behavior: ScrollBehavior::Smooth,
            block: ScrollBlock::Center,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionResult {
    /// The chunk was already active.
    Unchanged,
    Changed {
        previous: Option<ChunkId>,
        scroll: ScrollRequest,
    },
}

impl SelectionResult {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Tracks the active chunk and the scroll owed to it.
///
/// The scroll is not performed at selection time: the entry may not be
/// attached yet. The surface reports attachment through
/// [`SelectionController::element_attached`] and receives the request then.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    active: Option<Chunk>,
    pending_scroll: Option<ScrollRequest>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&Chunk> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<ChunkId> {
        self.active.as_ref().map(|chunk| chunk.id)
    }

    pub fn pending_scroll(&self) -> Option<ScrollRequest> {
        self.pending_scroll
    }

    pub fn select(&mut self, chunk: &Chunk) -> SelectionResult {
        let previous = self.active_id();
        if previous == Some(chunk.id) {
            return SelectionResult::Unchanged;
        }

        let scroll = ScrollRequest::centered(chunk.id);
        self.active = Some(chunk.clone());
        self.pending_scroll = Some(scroll);
        tracing::debug!(chunk_id = %chunk.id, page = chunk.page, "Selected chunk");

        SelectionResult::Changed { previous, scroll }
    }

    /// Called by the list surface once the entry for `chunk_id` is in the tree.
    ///
    /// Returns the owed scroll exactly once, and only for the current target.
    pub fn element_attached(&mut self, chunk_id: ChunkId) -> Option<ScrollRequest> {
        match self.pending_scroll {
            Some(request) if request.target == chunk_id => self.pending_scroll.take(),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.pending_scroll = None;
    }
}
