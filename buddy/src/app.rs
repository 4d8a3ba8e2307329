//! Terminal front end: turns reader commands and network completions into
//! state changes on a [`PaperView`] and lines of output.
//!
//! All state lives on the caller's loop. Network work is spawned and reports
//! back through an [`AppEvent`] channel.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use unicode_segmentation::UnicodeSegmentation;

use crate::api::PaperApi;
use crate::commands::{ReaderCommand, HELP};
use crate::config::ViewerConfig;
use crate::error::{BuddyError, Result};
use crate::markdown::render_terminal;
use crate::models::{ChatRole, Chunk, ChunkId};
use crate::search::SearchSession;
use crate::viewer::{
    ApplyOutcome, ChatOutcome, ChatTicket, FetchTicket, ListEntry, PanelMode, PaperView, Point,
    SelectionResult, ViewMode,
};

const LIST_TEXT_GRAPHEMES: usize = 160;

/// Completion of work started by the reader.
#[derive(Debug)]
pub enum AppEvent {
    ChunksLoaded {
        ticket: FetchTicket,
        result: Result<Vec<Chunk>>,
    },
    ChatAnswered {
        ticket: ChatTicket,
        result: Result<String>,
    },
    DocumentSaved {
        path: PathBuf,
        result: Result<usize>,
    },
}

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(Vec<String>),
    Quit,
}

pub struct ReaderApp {
    api: Arc<dyn PaperApi>,
    view: PaperView,
    events: UnboundedSender<AppEvent>,
}

impl ReaderApp {
    pub fn new(
        api: Arc<dyn PaperApi>,
        viewer: &ViewerConfig,
        events: UnboundedSender<AppEvent>,
    ) -> Result<Self> {
        Ok(Self {
            api,
            view: PaperView::new(viewer)?,
            events,
        })
    }

    pub fn view(&self) -> &PaperView {
        &self.view
    }

    /// Switches to a paper and starts fetching its chunks.
    pub fn open(&mut self, document_id: &str) -> Result<Vec<String>> {
        let source = self.api.document_url(document_id)?;
        let ticket = self.view.open(document_id)?;
        let ticket_id = ticket.document_id().to_string();

        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.fetch_chunks(ticket.document_id()).await;
            // The receiver is gone only when the loop has exited.
            let _ = events.send(AppEvent::ChunksLoaded { ticket, result });
        });

        Ok(vec![
            format!("Paper {ticket_id}"),
            format!("Source: {source}"),
            "Loading chunks...".to_string(),
        ])
    }

    pub fn handle_line(&mut self, line: &str) -> Flow {
        match ReaderCommand::parse(line) {
            Ok(Some(command)) => self.handle_command(command),
            Ok(None) => Flow::Continue(Vec::new()),
            Err(e) => Flow::Continue(vec![format!("error: {e}")]),
        }
    }

    pub fn handle_command(&mut self, command: ReaderCommand) -> Flow {
        let result = match command {
            ReaderCommand::Quit => return Flow::Quit,
            ReaderCommand::Help => Ok(HELP.lines().map(str::to_string).collect()),
            ReaderCommand::Chunks => Ok(self.render_list()),
            ReaderCommand::Page(page) => self.show_page(page),
            ReaderCommand::Hide(page) => {
                self.view.unmount_page(page);
                Ok(vec![format!("Page {page} hidden")])
            }
            ReaderCommand::Click { page, x, y } => self.click(page, Point::new(x, y)),
            ReaderCommand::Select(chunk_id) => self.select(chunk_id),
            ReaderCommand::Mode(mode) => self.set_mode(mode),
            ReaderCommand::Ask(question) => self.ask(&question),
            ReaderCommand::History => Ok(self.render_history()),
            ReaderCommand::Width(width) => self
                .view
                .resize(width)
                .map(|_| vec![format!("Display width set to {width}px")]),
            ReaderCommand::Open(document_id) => self.open(&document_id),
            ReaderCommand::Download(path) => self.download(path),
        };

        Flow::Continue(result.unwrap_or_else(|e| vec![format!("error: {e}")]))
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Vec<String> {
        match event {
            AppEvent::ChunksLoaded { ticket, result } => {
                match self.view.apply_chunks(&ticket, result) {
                    ApplyOutcome::Applied { chunks } => {
                        let pages = self.view.registry().pages();
                        if let Some(last) = pages.last() {
                            self.view.set_page_count(*last);
                        }
                        vec![format!(
                            "Loaded {chunks} chunks on {} pages. Type 'page <n>' or 'chunks'.",
                            pages.len()
                        )]
                    }
                    ApplyOutcome::Failed => {
                        vec!["Could not load chunks; the paper has no selectable regions.".to_string()]
                    }
                    ApplyOutcome::Stale => Vec::new(),
                }
            }
            AppEvent::ChatAnswered { ticket, result } => {
                match self.view.complete_chat(ticket, result) {
                    ChatOutcome::Answered => self
                        .view
                        .chat()
                        .transcript()
                        .last()
                        .map(|turn| vec![format!("ai> {}", render_terminal(&turn.content))])
                        .unwrap_or_default(),
                    ChatOutcome::Failed => self
                        .view
                        .chat()
                        .last_error()
                        .map(|e| vec![e.to_string()])
                        .unwrap_or_default(),
                    ChatOutcome::Discarded => Vec::new(),
                }
            }
            AppEvent::DocumentSaved { path, result } => match result {
                Ok(bytes) => vec![format!("Saved {bytes} bytes to {}", path.display())],
                Err(e) => vec![format!("error: could not save paper: {e}")],
            },
        }
    }

    fn show_page(&mut self, page: u32) -> Result<Vec<String>> {
        if !self.view.mount_page(page) && !self.view.is_mounted(page) {
            return Err(BuddyError::Validation(format!(
                "Page {page} is outside the paper"
            )));
        }

        let overlays = self.view.overlays(page);
        let mut lines = vec![format!(
            "Page {page} ({} regions, scale {:.3})",
            overlays.len(),
            self.view.geometry().scale()
        )];
        for overlay in overlays {
            let marker = if overlay.active { '*' } else { ' ' };
            lines.push(format!(
                "{marker} #{:<4} x {:>7.1}..{:<7.1} y {:>7.1}..{:<7.1} {}",
                overlay.chunk_id,
                overlay.rect.left,
                overlay.rect.right(),
                overlay.rect.top,
                overlay.rect.bottom(),
                overlay.palette.base,
            ));
        }
        Ok(lines)
    }

    fn click(&mut self, page: u32, point: Point) -> Result<Vec<String>> {
        if !self.view.is_mounted(page) {
            return Err(BuddyError::Validation(format!(
                "Page {page} is not rendered; use 'page {page}' first"
            )));
        }
        match self.view.click(page, point) {
            Some(result) => Ok(self.describe_selection(result)),
            None => Ok(vec!["No region at that point".to_string()]),
        }
    }

    fn select(&mut self, chunk_id: ChunkId) -> Result<Vec<String>> {
        let result = self
            .view
            .select(chunk_id)
            .ok_or_else(|| BuddyError::NotFound(format!("Chunk {chunk_id} not found")))?;
        Ok(self.describe_selection(result))
    }

    fn describe_selection(&mut self, result: SelectionResult) -> Vec<String> {
        let Some(chunk) = self.view.active_chunk() else {
            return Vec::new();
        };
        let (id, page) = (chunk.id, chunk.page);

        match result {
            SelectionResult::Unchanged => vec![format!("Chunk {id} is already selected")],
            SelectionResult::Changed { .. } => {
                let mut lines = vec![format!("Selected chunk {id} (page {page})")];
                // The list is always attached in the terminal.
                if let Some(scroll) = self.view.element_attached(id) {
                    lines.extend(
                        self.view
                            .list_entries()
                            .iter()
                            .filter(|entry| entry.chunk_id == scroll.target)
                            .map(entry_line),
                    );
                }
                lines
            }
        }
    }

    fn set_mode(&mut self, mode: PanelMode) -> Result<Vec<String>> {
        let mode = self.view.set_mode(mode)?;
        let mut lines = vec![format!("Panel: {}", mode.label())];
        if mode == ViewMode::Chat {
            if let Some(header) = self.view.chat_header() {
                lines.push(header.title);
                lines.push(header.preview);
            }
        }
        Ok(lines)
    }

    fn ask(&mut self, question: &str) -> Result<Vec<String>> {
        if self.view.active_chunk().is_none() {
            return Err(BuddyError::Validation(
                "Select a chunk before asking".to_string(),
            ));
        }
        let Some(pending) = self.view.begin_send(question) else {
            return Ok(Vec::new());
        };

        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        let ticket = pending.ticket;
        tokio::spawn(async move {
            let result = api.chat(&pending.request).await;
            let _ = events.send(AppEvent::ChatAnswered { ticket, result });
        });

        Ok(vec![format!("you> {}", question.trim()), "...".to_string()])
    }

    fn download(&mut self, path: Option<PathBuf>) -> Result<Vec<String>> {
        let document_id = self
            .view
            .document_id()
            .ok_or_else(|| BuddyError::Validation("No paper is open".to_string()))?
            .to_string();
        let path = path.unwrap_or_else(|| {
            PathBuf::from(format!("{}.pdf", document_id.replace('/', "_")))
        });

        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        let target = path.clone();
        tokio::spawn(async move {
            let result = match api.fetch_document(&document_id).await {
                Ok(bytes) => tokio::fs::write(&target, &bytes)
                    .await
                    .map(|_| bytes.len())
                    .map_err(BuddyError::from),
                Err(e) => Err(e),
            };
            let _ = events.send(AppEvent::DocumentSaved {
                path: target,
                result,
            });
        });

        Ok(vec![format!("Downloading to {}...", path.display())])
    }

    fn render_list(&self) -> Vec<String> {
        let entries = self.view.list_entries();
        if entries.is_empty() {
            return vec!["No chunks".to_string()];
        }
        entries.iter().map(entry_line).collect()
    }

    fn render_history(&self) -> Vec<String> {
        let chat = self.view.chat();
        if chat.transcript().is_empty() {
            return vec!["No messages yet".to_string()];
        }
        chat.transcript()
            .iter()
            .enumerate()
            .map(|(index, turn)| match turn.role {
                ChatRole::User if chat.turn_failed(index) => {
                    format!("you> {} (not sent)", turn.content)
                }
                ChatRole::User => format!("you> {}", turn.content),
                ChatRole::Assistant => format!("ai> {}", render_terminal(&turn.content)),
            })
            .collect()
    }
}

fn entry_line(entry: &ListEntry) -> String {
    let marker = if entry.active { '>' } else { ' ' };
    format!(
        "{marker} #{} {} | {} | {}",
        entry.chunk_id,
        entry.label,
        entry.page_label,
        shorten(&entry.text, LIST_TEXT_GRAPHEMES)
    )
}

/// Runs one search and renders the page the way the search view shows it.
pub async fn run_search(api: &dyn PaperApi, query: &str, limit: u32) -> Vec<String> {
    let mut session = SearchSession::new();
    let Some(ticket) = session.begin(query) else {
        return vec!["Enter a query to search".to_string()];
    };
    let result = api.search(ticket.query(), limit).await;
    session.complete(&ticket, result);
    render_search(&session)
}

pub fn render_search(session: &SearchSession) -> Vec<String> {
    if let Some(error) = session.error() {
        return vec![error.to_string()];
    }

    let mut lines = Vec::new();
    if let Some(intent) = session.intent() {
        lines.push(format!("Searching for: {}", intent.summary()));
    }
    if session.results().is_empty() {
        lines.push("No results".to_string());
    }
    for (rank, result) in session.results().iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("{}. {} [{}]", rank + 1, result.title, result.id));
        lines.push(format!("   {}", result.subtitle()));
        if !result.authors.is_empty() {
            lines.push(format!("   {}", result.authors));
        }
        lines.push(format!("   {}", shorten(&result.abstract_text, 300)));
    }
    lines
}

fn shorten(text: &str, max_graphemes: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut graphemes = flat.graphemes(true);
    let head: String = graphemes.by_ref().take(max_graphemes).collect();
    if graphemes.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_flattens_whitespace() {
        assert_eq!(shorten("a\n  b\tc", 10), "a b c");
        assert_eq!(shorten("abcdef", 3), "abc...");
    }
}
