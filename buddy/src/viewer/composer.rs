use std::collections::BTreeSet;

use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::ViewerConfig;
use crate::error::{BuddyError, Result};
use crate::models::{Chunk, ChunkId};

use super::chat::{ChatOutcome, ChatSession, ChatTicket, PendingChat};
use super::color::ClusterPalette;
use super::geometry::{DisplayRect, GeometryMapper, Point};
use super::mode::{PanelMode, ViewMode};
use super::registry::ChunkRegistry;
use super::selection::{ScrollRequest, SelectionController, SelectionResult};

/// Graphemes of chunk text shown under the chat header.
pub const CHAT_PREVIEW_GRAPHEMES: usize = 250;

/// Ties a chunk fetch to the document it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    document_id: String,
}

impl FetchTicket {
    pub fn document_id(&self) -> &str {
        &self.document_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// No document opened yet.
    Empty,
    Loading,
    Ready,
    /// The fetch failed; the registry stays empty.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { chunks: usize },
    Failed,
    /// The response was for a document that is no longer displayed.
    Stale,
}

/// A clickable highlight drawn over a rendered page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub chunk_id: ChunkId,
    pub rect: DisplayRect,
    pub palette: ClusterPalette,
    pub active: bool,
}

/// One card in the chunk list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub chunk_id: ChunkId,
    pub label: String,
    pub page_label: String,
    pub text: String,
    pub palette: ClusterPalette,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatHeader {
    pub title: String,
    pub preview: String,
}

/// State of one paper view: the chunks of the open document, the active
/// selection, the chat about it, and the render surface they are drawn on.
#[derive(Debug)]
pub struct PaperView {
    geometry: GeometryMapper,
    document_id: Option<String>,
    generation: u64,
    load_state: LoadState,
    registry: ChunkRegistry,
    selection: SelectionController,
    chat: ChatSession,
    mode: ViewMode,
    mounted_pages: BTreeSet<u32>,
    page_count: Option<u32>,
}

impl PaperView {
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        Ok(Self {
            geometry: GeometryMapper::new(config.native_page_width, config.display_width)?,
            document_id: None,
            generation: 0,
            load_state: LoadState::Empty,
            registry: ChunkRegistry::default(),
            selection: SelectionController::new(),
            chat: ChatSession::new("", 0),
            mode: ViewMode::NoSelection,
            mounted_pages: BTreeSet::new(),
            page_count: None,
        })
    }

    // -----------------------------------------------------------------------
    // Document lifecycle
    // -----------------------------------------------------------------------

    /// Switches to `document_id` and returns the ticket for its chunk fetch.
    ///
    /// Everything tied to the previous document is dropped right away, so
    /// nothing stale is drawn while the new fetch is outstanding.
    pub fn open(&mut self, document_id: &str) -> Result<FetchTicket> {
        let document_id = document_id.trim();
        if document_id.is_empty() {
            return Err(BuddyError::Validation(
                "Document id cannot be empty".to_string(),
            ));
        }

        self.generation += 1;
        self.document_id = Some(document_id.to_string());
        self.load_state = LoadState::Loading;
        self.registry = ChunkRegistry::default();
        self.selection.clear();
        self.chat = ChatSession::new(document_id, self.generation);
        self.mode = self.mode.on_clear();
        self.mounted_pages.clear();
        self.page_count = None;

        tracing::info!(document_id, generation = self.generation, "Opened paper");

        Ok(FetchTicket {
            generation: self.generation,
            document_id: document_id.to_string(),
        })
    }

    pub fn apply_chunks(
        &mut self,
        ticket: &FetchTicket,
        result: std::result::Result<Vec<Chunk>, BuddyError>,
    ) -> ApplyOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                document_id = %ticket.document_id,
                "Discarding chunks for a document that is no longer open"
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(chunks) => {
                let count = chunks.len();
                self.registry = ChunkRegistry::new(chunks);
                self.load_state = LoadState::Ready;
                tracing::info!(document_id = %ticket.document_id, count, "Chunks loaded");
                ApplyOutcome::Applied { chunks: count }
            }
            Err(e) => {
                tracing::warn!(
                    document_id = %ticket.document_id,
                    error = %e,
                    "Failed to load chunks; showing the paper without regions"
                );
                self.registry = ChunkRegistry::default();
                self.load_state = LoadState::Failed;
                ApplyOutcome::Failed
            }
        }
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn registry(&self) -> &ChunkRegistry {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Render surface
    // -----------------------------------------------------------------------

    pub fn set_page_count(&mut self, count: u32) {
        self.page_count = Some(count);
        self.mounted_pages.retain(|page| *page <= count);
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    /// Marks `page` as rendered. Returns `false` for pages outside the document.
    pub fn mount_page(&mut self, page: u32) -> bool {
        if page == 0 || self.page_count.is_some_and(|count| page > count) {
            return false;
        }
        self.mounted_pages.insert(page)
    }

    pub fn unmount_page(&mut self, page: u32) {
        self.mounted_pages.remove(&page);
    }

    pub fn is_mounted(&self, page: u32) -> bool {
        self.mounted_pages.contains(&page)
    }

    pub fn resize(&mut self, display_width: f64) -> Result<()> {
        self.geometry = self.geometry.with_display_width(display_width)?;
        Ok(())
    }

    pub fn geometry(&self) -> &GeometryMapper {
        &self.geometry
    }

    /// Highlights for `page`; empty until the page is mounted.
    pub fn overlays(&self, page: u32) -> Vec<Overlay> {
        if !self.is_mounted(page) {
            return Vec::new();
        }
        let active = self.selection.active_id();
        self.registry
            .by_page(page)
            .map(|chunk| Overlay {
                chunk_id: chunk.id,
                rect: self.geometry.hit_target(&chunk.bbox),
                palette: ClusterPalette::for_cluster(chunk.cluster_id),
                active: active == Some(chunk.id),
            })
            .collect()
    }

    pub fn list_entries(&self) -> Vec<ListEntry> {
        let active = self.selection.active_id();
        self.registry
            .all()
            .iter()
            .map(|chunk| ListEntry {
                chunk_id: chunk.id,
                label: chunk.cluster_label(),
                page_label: format!("Page {}", chunk.page),
                text: chunk.text.clone(),
                palette: ClusterPalette::for_cluster(chunk.cluster_id),
                active: active == Some(chunk.id),
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Resolves a click on a mounted page to a chunk and selects it.
    ///
    /// Returns `None` when the click hits no region.
    pub fn click(&mut self, page: u32, point: Point) -> Option<SelectionResult> {
        if !self.is_mounted(page) {
            return None;
        }
        let chunk = self
            .geometry
            .hit_test(page, point, self.registry.all())?
            .clone();
        Some(self.apply_selection(&chunk))
    }

    /// Selects a chunk from the list surface. `None` if the id is unknown.
    pub fn select(&mut self, chunk_id: ChunkId) -> Option<SelectionResult> {
        let chunk = self.registry.get(chunk_id)?.clone();
        Some(self.apply_selection(&chunk))
    }

    fn apply_selection(&mut self, chunk: &Chunk) -> SelectionResult {
        let result = self.selection.select(chunk);
        if result.is_changed() {
            self.mode = self.mode.on_select();
        }
        result
    }

    pub fn active_chunk(&self) -> Option<&Chunk> {
        self.selection.active()
    }

    /// Attachment callback from the list surface.
    pub fn element_attached(&mut self, chunk_id: ChunkId) -> Option<ScrollRequest> {
        self.selection.element_attached(chunk_id)
    }

    // -----------------------------------------------------------------------
    // Mode
    // -----------------------------------------------------------------------

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn chat_enabled(&self) -> bool {
        self.mode.chat_enabled()
    }

    pub fn set_mode(&mut self, target: PanelMode) -> Result<ViewMode> {
        self.mode = self.mode.request(target)?;
        Ok(self.mode)
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn begin_send(&mut self, text: &str) -> Option<PendingChat> {
        self.chat.begin_send(text, self.selection.active())
    }

    pub fn complete_chat(
        &mut self,
        ticket: ChatTicket,
        result: std::result::Result<String, BuddyError>,
    ) -> ChatOutcome {
        self.chat.complete(ticket, result)
    }

    pub fn chat_header(&self) -> Option<ChatHeader> {
        let chunk = self.selection.active()?;
        Some(ChatHeader {
            title: format!("Chatting about Chunk {}", u64::from(chunk.id.0) + 1),
            preview: preview(&chunk.text, CHAT_PREVIEW_GRAPHEMES),
        })
    }
}

fn preview(text: &str, max_graphemes: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max_graphemes).collect();
    if graphemes.next().is_some() {
        format!("\"{}...\"", head.trim_end())
    } else {
        format!("\"{head}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundingBox, ClusterId};
    use pretty_assertions::assert_eq;

    fn chunk(id: u32, page: u32, bbox: [f64; 4], cluster: i32) -> Chunk {
        let [x0, y0, x1, y1] = bbox;
        Chunk::new(
            ChunkId(id),
            page,
            BoundingBox::new(x0, y0, x1, y1).unwrap(),
            format!("Text of chunk {id}"),
            ClusterId(cluster),
        )
        .unwrap()
    }

    fn view() -> PaperView {
        PaperView::new(&ViewerConfig {
            display_width: 200.0,
            native_page_width: 100.0,
        })
        .unwrap()
    }

    fn loaded_view() -> PaperView {
        let mut view = view();
        let ticket = view.open("d1").unwrap();
        view.apply_chunks(
            &ticket,
            Ok(vec![
                chunk(0, 1, [0.0, 0.0, 100.0, 50.0], 0),
                chunk(1, 1, [0.0, 60.0, 100.0, 110.0], 1),
                chunk(2, 2, [10.0, 10.0, 20.0, 20.0], -1),
            ]),
        );
        view
    }

    #[test]
    fn test_initial_state() {
        let view = view();
        assert_eq!(view.load_state(), LoadState::Empty);
        assert!(view.document_id().is_none());
        assert!(view.active_chunk().is_none());
        assert!(view.chat_header().is_none());
        assert_eq!(view.mode(), ViewMode::NoSelection);
    }

    #[test]
    fn test_open_rejects_blank_id() {
        let mut view = view();
        assert!(view.open("  ").is_err());
        assert_eq!(view.load_state(), LoadState::Empty);
    }

    #[test]
    fn test_overlays_only_for_mounted_pages() {
        let mut view = loaded_view();
        assert!(view.overlays(1).is_empty());

        assert!(view.mount_page(1));
        let overlays = view.overlays(1);
        assert_eq!(overlays.len(), 2);
        assert_eq!(
            overlays[0].rect,
            DisplayRect {
                left: -10.0,
                top: -15.0,
                width: 210.0,
                height: 110.0,
            }
        );
        assert!(view.overlays(2).is_empty());
    }

    #[test]
    fn test_mount_respects_page_count() {
        let mut view = loaded_view();
        view.set_page_count(1);
        assert!(!view.mount_page(2));
        assert!(!view.mount_page(0));
        assert!(view.mount_page(1));
    }

    #[test]
    fn test_resize_recomputes_overlays() {
        let mut view = loaded_view();
        view.mount_page(2);
        assert_eq!(view.overlays(2)[0].rect.width, 30.0);

        view.resize(400.0).unwrap();
        assert_eq!(view.overlays(2)[0].rect.width, 50.0);
        assert!(view.resize(0.0).is_err());
    }

    #[test]
    fn test_click_selects_and_switches_to_list() {
        let mut view = loaded_view();
        view.mount_page(1);

        let result = view.click(1, Point::new(100.0, 200.0)).unwrap();
        assert!(result.is_changed());
        assert_eq!(view.active_chunk().map(|c| c.id), Some(ChunkId(1)));
        assert_eq!(view.mode(), ViewMode::List);
        assert!(view.overlays(1)[1].active);
        assert!(!view.overlays(1)[0].active);

        assert_eq!(
            view.click(1, Point::new(100.0, 200.0)),
            Some(SelectionResult::Unchanged)
        );
        assert!(view.click(1, Point::new(1000.0, 1000.0)).is_none());
        assert!(view.click(2, Point::new(30.0, 30.0)).is_none());
    }

    #[test]
    fn test_reclick_does_not_leave_chat_mode() {
        let mut view = loaded_view();
        view.select(ChunkId(0)).unwrap();
        view.set_mode(PanelMode::Chat).unwrap();

        assert_eq!(view.select(ChunkId(0)), Some(SelectionResult::Unchanged));
        assert_eq!(view.mode(), ViewMode::Chat);
    }

    #[test]
    fn test_chat_mode_needs_selection() {
        let mut view = loaded_view();
        assert!(!view.chat_enabled());
        assert!(view.set_mode(PanelMode::Chat).is_err());

        view.select(ChunkId(2)).unwrap();
        assert!(view.chat_enabled());
        assert_eq!(view.set_mode(PanelMode::Chat).unwrap(), ViewMode::Chat);
    }

    #[test]
    fn test_select_unknown_chunk() {
        let mut view = loaded_view();
        assert!(view.select(ChunkId(42)).is_none());
        assert!(view.active_chunk().is_none());
    }

    #[test]
    fn test_switching_document_clears_everything() {
        let mut view = loaded_view();
        view.mount_page(1);
        view.select(ChunkId(1)).unwrap();
        view.begin_send("Hi").unwrap();

        let ticket = view.open("d2").unwrap();
        assert_eq!(ticket.document_id(), "d2");
        assert_eq!(view.load_state(), LoadState::Loading);
        assert!(view.active_chunk().is_none());
        assert!(view.registry().is_empty());
        assert!(view.chat().transcript().is_empty());
        assert!(!view.is_mounted(1));
        assert_eq!(view.mode(), ViewMode::NoSelection);
        assert_eq!(view.element_attached(ChunkId(1)), None);
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let mut view = view();
        let first = view.open("d1").unwrap();
        let second = view.open("d2").unwrap();

        let outcome = view.apply_chunks(&first, Ok(vec![chunk(0, 1, [0.0, 0.0, 1.0, 1.0], 0)]));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(view.registry().is_empty());
        assert_eq!(view.load_state(), LoadState::Loading);

        let outcome = view.apply_chunks(&second, Ok(vec![]));
        assert_eq!(outcome, ApplyOutcome::Applied { chunks: 0 });
        assert_eq!(view.load_state(), LoadState::Ready);
    }

    #[test]
    fn test_failed_fetch_degrades_to_empty() {
        let mut view = view();
        let ticket = view.open("d1").unwrap();
        let outcome = view.apply_chunks(&ticket, Err(BuddyError::Decode("bad".to_string())));

        assert_eq!(outcome, ApplyOutcome::Failed);
        assert_eq!(view.load_state(), LoadState::Failed);
        assert!(view.registry().is_empty());
        assert!(view.list_entries().is_empty());
    }

    #[test]
    fn test_late_chat_answer_after_navigation_is_dropped() {
        let mut view = loaded_view();
        view.select(ChunkId(0)).unwrap();
        let pending = view.begin_send("Q").unwrap();

        view.open("d2").unwrap();
        let outcome = view.complete_chat(pending.ticket, Ok("late".to_string()));
        assert_eq!(outcome, ChatOutcome::Discarded);
        assert!(view.chat().transcript().is_empty());
    }

    #[test]
    fn test_list_entries_and_header() {
        let mut view = loaded_view();
        view.select(ChunkId(2)).unwrap();

        let entries = view.list_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].label, "Chunk 1");
        assert_eq!(entries[2].label, "Chunk 0");
        assert_eq!(entries[2].page_label, "Page 2");
        assert!(entries[2].active);

        let header = view.chat_header().unwrap();
        assert_eq!(header.title, "Chatting about Chunk 3");
        assert_eq!(header.preview, "\"Text of chunk 2\"");
    }

    #[test]
    fn test_labels_at_largest_ids() {
        let mut view = view();
        let ticket = view.open("d1").unwrap();
        view.apply_chunks(
            &ticket,
            Ok(vec![
                chunk(u32::MAX, 1, [0.0, 0.0, 10.0, 10.0], i32::MAX),
                chunk(0, 1, [0.0, 20.0, 10.0, 30.0], 0),
            ]),
        );

        let entries = view.list_entries();
        assert_eq!(entries[0].label, "Chunk 2147483648");

        view.select(ChunkId(u32::MAX)).unwrap();
        assert_eq!(
            view.chat_header().unwrap().title,
            "Chatting about Chunk 4294967296"
        );
    }

    #[test]
    fn test_preview_truncates_on_grapheme_boundary() {
        let text = "é".repeat(300);
        let shown = preview(&text, CHAT_PREVIEW_GRAPHEMES);
        assert!(shown.ends_with("...\""));
        assert_eq!(shown.trim_matches('"').trim_end_matches("...").chars().count(), 250);
    }
}
