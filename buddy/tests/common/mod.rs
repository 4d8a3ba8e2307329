// Common test utilities for integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use serde_json::json;

use buddy::api::PaperApi;
use buddy::config::{ApiConfig, ViewerConfig};
use buddy::models::{
    BoundingBox, ChatRequest, Chunk, ChunkId, ClusterId, InterpretedIntent, SearchResponse,
};
use buddy::{BuddyError, Result};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        document_base_url: "https://arxiv.org/pdf".to_string(),
        timeout_secs: 5,
        max_retries: 1,
        search_limit: 5,
    }
}

/// Native and display widths equal, so display coordinates match page units.
pub fn unscaled_viewer() -> ViewerConfig {
    ViewerConfig {
        display_width: 100.0,
        native_page_width: 100.0,
    }
}

pub fn chunk(id: u32, page: u32, bbox: [f64; 4], text: &str, cluster: i32) -> Chunk {
    let [x0, y0, x1, y1] = bbox;
    Chunk::new(
        ChunkId(id),
        page,
        BoundingBox::new(x0, y0, x1, y1).unwrap(),
        text,
        ClusterId(cluster),
    )
    .unwrap()
}

/// The two-chunk document used across the reader scenarios.
pub fn d1_chunks() -> Vec<Chunk> {
    vec![
        chunk(0, 1, [0.0, 0.0, 100.0, 50.0], "Intro", 0),
        chunk(1, 1, [0.0, 60.0, 100.0, 110.0], "Method", 1),
    ]
}

pub fn d1_chunks_body() -> serde_json::Value {
    json!({
        "chunks": [
            {"id": 0, "page": 1, "bbox": [0, 0, 100, 50], "text": "Intro", "cluster_id": 0},
            {"id": 1, "page": 1, "bbox": [0, 60, 100, 110], "text": "Method", "cluster_id": 1}
        ]
    })
}

/// In-memory backend with canned responses.
#[derive(Default)]
pub struct ScriptedApi {
    /// Documents without an entry fail to load.
    pub chunks: HashMap<String, Vec<Chunk>>,
    /// Answers handed out in order; `Err` simulates a failed request.
    pub answers: Mutex<VecDeque<std::result::Result<String, String>>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub search_results: Option<SearchResponse>,
}

impl ScriptedApi {
    pub fn with_document(mut self, id: &str, chunks: Vec<Chunk>) -> Self {
        self.chunks.insert(id.to_string(), chunks);
        self
    }

    pub fn with_answer(self, answer: std::result::Result<&str, &str>) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string).map_err(str::to_string));
        self
    }

    pub fn with_search_results(mut self, response: SearchResponse) -> Self {
        self.search_results = Some(response);
        self
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaperApi for ScriptedApi {
    async fn search(&self, query: &str, _limit: u32) -> Result<SearchResponse> {
        self.search_results
            .clone()
            .ok_or_else(|| BuddyError::Internal(format!("no results scripted for '{query}'")))
    }

    async fn fetch_chunks(&self, document_id: &str) -> Result<Vec<Chunk>> {
        self.chunks
            .get(document_id)
            .cloned()
            .ok_or_else(|| BuddyError::Decode(format!("no chunks for {document_id}")))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        self.chat_requests.lock().unwrap().push(request.clone());
        match self.answers.lock().unwrap().pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(message)) => Err(BuddyError::Internal(message)),
            None => Err(BuddyError::Internal("no answer scripted".to_string())),
        }
    }

    fn document_url(&self, document_id: &str) -> Result<String> {
        Ok(format!("https://arxiv.org/pdf/{document_id}"))
    }

    async fn fetch_document(&self, _document_id: &str) -> Result<Vec<u8>> {
        Ok(b"%PDF-1.4".to_vec())
    }
}

pub fn text_response(query: &str) -> SearchResponse {
    SearchResponse {
        original_query: query.to_string(),
        interpreted_intent: InterpretedIntent::Text(query.to_string()),
        results: Vec::new(),
    }
}
