//! Client-side state for reading a paper: chunk geometry, selection, the
//! side panel and the per-chunk chat.

mod chat;
mod color;
mod composer;
mod geometry;
mod mode;
mod registry;
mod selection;

pub use chat::{ChatOutcome, ChatSession, ChatState, ChatTicket, PendingChat};
pub use color::{ClusterPalette, HighlightColor, BASE_ALPHA, BORDER_ALPHA, HOVER_ALPHA};
pub use composer::{
    ApplyOutcome, ChatHeader, FetchTicket, ListEntry, LoadState, Overlay, PaperView,
    CHAT_PREVIEW_GRAPHEMES,
};
pub use geometry::{DisplayRect, GeometryMapper, Point, HIT_GROW, HIT_PAD_LEFT, HIT_PAD_TOP};
pub use mode::{PanelMode, ViewMode};
pub use registry::ChunkRegistry;
pub use selection::{
    ScrollBehavior, ScrollBlock, ScrollRequest, SelectionController, SelectionResult,
};
