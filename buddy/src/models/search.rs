use serde::{Deserialize, Serialize};

/// One paper returned by the search collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub abstract_text: String,
    pub authors: String,
    pub year: Option<i32>,
    pub categories: String,
    /// Similarity in `[0, 1]`.
    pub similarity_score: f64,
}

impl SearchResult {
    pub fn score_label(&self) -> String {
        format!("{:.2}", self.similarity_score)
    }

    /// "2021 | cs.CL cs.AI | Score: 0.87"
    pub fn subtitle(&self) -> String {
        let year = self
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "n.d.".to_string());
        format!(
            "{} | {} | Score: {}",
            year,
            self.categories,
            self.score_label()
        )
    }
}

/// Filters and topic the backend extracted from a free-text query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchIntent {
    #[serde(default)]
    pub query_content: String,
    #[serde(default)]
    pub year_start: Option<i32>,
    #[serde(default)]
    pub year_end: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
}

/// The plain search endpoint echoes the query; the smart one returns a structured intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InterpretedIntent {
    Text(String),
    Structured(SearchIntent),
}

impl InterpretedIntent {
    pub fn summary(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(intent) => {
                let mut parts = vec![intent.query_content.clone()];
                match (intent.year_start, intent.year_end) {
                    (Some(start), Some(end)) => parts.push(format!("years {start}-{end}")),
                    (Some(start), None) => parts.push(format!("since {start}")),
                    (None, Some(end)) => parts.push(format!("before {end}")),
                    (None, None) => {}
                }
                if let Some(category) = &intent.category {
                    parts.push(format!("category {category}"));
                }
                if let Some(author) = &intent.author {
                    parts.push(format!("by {author}"));
                }
                if let Some(sort_by) = &intent.sort_by {
                    parts.push(format!("sorted by {sort_by}"));
                }
                parts.retain(|p| !p.trim().is_empty());
                parts.join(", ")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub original_query: String,
    pub interpreted_intent: InterpretedIntent,
    pub results: Vec<SearchResult>,
}
