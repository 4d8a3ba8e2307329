use crate::error::BuddyError;
use crate::models::{InterpretedIntent, SearchResponse, SearchResult};

/// Shown inline when a search request fails.
pub const SEARCH_ERROR_MESSAGE: &str = "Error performing search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    query: String,
}

impl SearchTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Loaded { results: usize },
    Failed,
    Stale,
}

/// State of the search page.
///
/// Only the most recent query may update the page. A failed search keeps the
/// previous results on screen next to the error.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    query: String,
    loading: bool,
    results: Vec<SearchResult>,
    intent: Option<InterpretedIntent>,
    error: Option<String>,
    next_seq: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a search. A blank query does nothing.
    pub fn begin(&mut self, query: &str) -> Option<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.next_seq += 1;
        self.query = query.to_string();
        self.loading = true;
        self.error = None;

        Some(SearchTicket {
            seq: self.next_seq,
            query: query.to_string(),
        })
    }

    pub fn complete(
        &mut self,
        ticket: &SearchTicket,
        result: std::result::Result<SearchResponse, BuddyError>,
    ) -> SearchOutcome {
        if ticket.seq != self.next_seq {
            tracing::debug!(query = %ticket.query, "Dropping results for a superseded search");
            return SearchOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(response) => {
                let count = response.results.len();
                self.results = response.results;
                self.intent = Some(response.interpreted_intent);
                tracing::info!(query = %ticket.query, count, "Search completed");
                SearchOutcome::Loaded { results: count }
            }
            Err(e) => {
                tracing::error!(query = %ticket.query, error = %e, "Search failed");
                self.error = Some(SEARCH_ERROR_MESSAGE.to_string());
                SearchOutcome::Failed
            }
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn intent(&self) -> Option<&InterpretedIntent> {
        self.intent.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchIntent;
    use pretty_assertions::assert_eq;

    fn response(ids: &[&str]) -> SearchResponse {
        SearchResponse {
            original_query: "rag".to_string(),
            interpreted_intent: InterpretedIntent::Structured(SearchIntent {
                query_content: "retrieval augmented generation".to_string(),
                ..Default::default()
            }),
            results: ids
                .iter()
                .map(|id| SearchResult {
                    id: id.to_string(),
                    title: format!("Paper {id}"),
                    abstract_text: String::new(),
                    authors: String::new(),
                    year: Some(2023),
                    categories: "cs.CL".to_string(),
                    similarity_score: 0.5,
                })
                .collect(),
        }
    }

    #[test]
    fn test_blank_query_is_noop() {
        let mut session = SearchSession::new();
        assert!(session.begin("   ").is_none());
        assert!(!session.is_loading());
        assert_eq!(session.query(), "");
    }

    #[test]
    fn test_success_replaces_results() {
        let mut session = SearchSession::new();
        let ticket = session.begin(" rag ").unwrap();
        assert_eq!(ticket.query(), "rag");
        assert!(session.is_loading());

        let outcome = session.complete(&ticket, Ok(response(&["a", "b"])));
        assert_eq!(outcome, SearchOutcome::Loaded { results: 2 });
        assert!(!session.is_loading());
        assert_eq!(session.results().len(), 2);
        assert_eq!(
            session.intent().map(|i| i.summary()),
            Some("retrieval augmented generation".to_string())
        );
    }

    #[test]
    fn test_failure_sets_message_and_keeps_results() {
        let mut session = SearchSession::new();
        let ticket = session.begin("rag").unwrap();
        session.complete(&ticket, Ok(response(&["a"])));

        let ticket = session.begin("graphs").unwrap();
        let outcome = session.complete(&ticket, Err(BuddyError::Internal("down".to_string())));

        assert_eq!(outcome, SearchOutcome::Failed);
        assert!(!session.is_loading());
        assert_eq!(session.error(), Some(SEARCH_ERROR_MESSAGE));
        assert_eq!(session.results().len(), 1);

        session.begin("again").unwrap();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_superseded_search_is_discarded() {
        let mut session = SearchSession::new();
        let first = session.begin("first").unwrap();
        let second = session.begin("second").unwrap();

        assert_eq!(
            session.complete(&first, Ok(response(&["old"]))),
            SearchOutcome::Stale
        );
        assert!(session.is_loading());
        assert!(session.results().is_empty());

        session.complete(&second, Ok(response(&["new"])));
        assert_eq!(session.results()[0].id, "new");
    }
}
