use super::VisionService;
use crate::models::UploadedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Upstream { status: u16, body: String },
    Empty,
}

/// Request observed by [`MockVisionClient`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub mime_type: String,
    pub byte_len: usize,
    pub prompt: String,
    pub web_search: bool,
}

/// In-memory [`VisionService`] that replays canned replies in order, cycling.
pub struct MockVisionClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        self.push(MockReply::Text(text.into()))
    }

    pub fn with_upstream_error(self, status: u16, body: impl Into<String>) -> Self {
        self.push(MockReply::Upstream {
            status,
            body: body.into(),
        })
    }

    pub fn with_empty_response(self) -> Self {
        self.push(MockReply::Empty)
    }

    fn push(self, reply: MockReply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push(reply);
        }
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionService for MockVisionClient {
    async fn generate_text(
        &self,
        image: &UploadedImage,
        prompt: &str,
        web_search: bool,
    ) -> Result<String> {
        let count = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| Error::Config("mock call log poisoned".to_string()))?;
            calls.push(RecordedCall {
                mime_type: image.mime_type.clone(),
                byte_len: image.bytes.len(),
                prompt: prompt.to_string(),
                web_search,
            });
            calls.len()
        };

        let reply = {
            let replies = self
                .replies
                .lock()
                .map_err(|_| Error::Config("mock replies poisoned".to_string()))?;
            if replies.is_empty() {
                None
            } else {
                Some(replies[(count - 1) % replies.len()].clone())
            }
        };

        match reply {
            Some(MockReply::Text(text)) => Ok(text.trim().to_string()),
            Some(MockReply::Upstream { status, body }) => {
                Err(Error::UpstreamService { status, body })
            }
            Some(MockReply::Empty) => Err(Error::EmptyModelResponse),
            // Default mock response
            None => Ok(r#"{"name":"Mock Product","searchQuery":"mock product"}"#.to_string()),
        }
    }
}
