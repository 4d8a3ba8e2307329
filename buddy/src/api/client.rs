use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::{
    api::dto::{decode, ChatAnswer, ChatRequestBody, ChunksEnvelope, ErrorBody, SearchEnvelope},
    config::ApiConfig,
    error::{BuddyError, Result},
    models::{ChatRequest, Chunk, SearchResponse},
};

/// The three collaborators the reader depends on.
///
/// The viewer and the terminal front end only see this trait, so tests can
/// stand in a scripted backend without a server.
#[async_trait]
pub trait PaperApi: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> Result<SearchResponse>;
    async fn fetch_chunks(&self, document_id: &str) -> Result<Vec<Chunk>>;
    async fn chat(&self, request: &ChatRequest) -> Result<String>;
    /// Where the renderable document for `document_id` can be fetched.
    fn document_url(&self, document_id: &str) -> Result<String>;
    async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    document_base_url: Url,
    max_retries: u32,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.normalized_base_url()?)?;
        let document_base_url = Url::parse(&config.normalized_document_base_url()?)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BuddyError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            document_base_url,
            max_retries: config.max_retries,
        })
    }

    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| BuddyError::Validation(format!("{base} cannot be a base URL")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, what: &str, url: Url) -> Result<T> {
        let mut last_error: Option<BuddyError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay_ms = 100 * 2_u64.pow(attempt - 1);
                debug!("Retry attempt {} for {} after {}ms", attempt, what, delay_ms);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            match self.get_once(what, url.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    warn!("{} request attempt {} failed (retryable): {}", what, attempt + 1, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| BuddyError::Internal(format!("{what} request failed after retries"))))
    }

    async fn get_once<T: DeserializeOwned>(&self, what: &str, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BuddyError::Api {
                status,
                message: ErrorBody::message_from(&body),
            });
        }

        decode(what, &body)
    }
}

fn validate_document_id(document_id: &str) -> Result<&str> {
    let trimmed = document_id.trim();
    if trimmed.is_empty() {
        return Err(BuddyError::Validation(
            "Document id cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

#[async_trait]
impl PaperApi for ApiClient {
    async fn search(&self, query: &str, limit: u32) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Err(BuddyError::Validation("Query cannot be empty".to_string()));
        }

        let mut url = Self::endpoint(&self.base_url, &["smart_search"])?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("k", &limit.to_string());

        let envelope: SearchEnvelope = self.get_json("search", url).await?;
        envelope.into_response()
    }

    async fn fetch_chunks(&self, document_id: &str) -> Result<Vec<Chunk>> {
        let document_id = validate_document_id(document_id)?;
        let url = Self::endpoint(&self.base_url, &["process_paper_with_coords", document_id])?;

        let envelope: ChunksEnvelope = self.get_json("chunks", url).await?;
        let chunks = envelope.into_chunks()?;
        debug!(document_id, count = chunks.len(), "Fetched chunks");
        Ok(chunks)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        if request.question.trim().is_empty() {
            return Err(BuddyError::Validation("Question cannot be empty".to_string()));
        }

        let url = Self::endpoint(&self.base_url, &["chat_with_chunk"])?;
        debug!(
            chunk_id = %request.chunk_id,
            history_len = request.history.len(),
            "POST {}",
            url
        );

        // No retry: a repeated question would be answered twice.
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(&ChatRequestBody::from(request))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BuddyError::Api {
                status,
                message: ErrorBody::message_from(&body),
            });
        }

        let answer: ChatAnswer = decode("chat", &body)?;
        Ok(answer.answer)
    }

    fn document_url(&self, document_id: &str) -> Result<String> {
        let document_id = validate_document_id(document_id)?;
        Ok(Self::endpoint(&self.document_base_url, &[document_id])?.to_string())
    }

    async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>> {
        let url = self.document_url(document_id)?;
        debug!("Fetching document from {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BuddyError::Api {
                status,
                message: ErrorBody::message_from(&body),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
