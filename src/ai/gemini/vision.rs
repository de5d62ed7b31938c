use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GoogleSearch, InlineData, Part, Tool,
};
use crate::ai::VisionService;
use crate::models::UploadedImage;
use crate::{encoding, normalize, Result};
use async_trait::async_trait;

/// Sends one image plus instruction to Gemini and returns the answer text.
pub struct GeminiVisionClient {
    http: GeminiHttpClient,
}

impl GeminiVisionClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    fn build_request(
        image: &UploadedImage,
        prompt: &str,
        web_search: bool,
    ) -> Result<GenerateContentRequest> {
        let tools = if web_search {
            vec![Tool {
                google_search: GoogleSearch::default(),
            }]
        } else {
            Vec::new()
        };

        Ok(GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: encoding::encode_chunked(&image.bytes)?,
                        },
                    },
                    Part::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
            tools,
        })
    }
}

#[async_trait]
impl VisionService for GeminiVisionClient {
    async fn generate_text(
        &self,
        image: &UploadedImage,
        prompt: &str,
        web_search: bool,
    ) -> Result<String> {
        tracing::debug!(
            "Sending image ({} bytes, {}) to Gemini model {} (web_search={})",
            image.bytes.len(),
            image.mime_type,
            self.model(),
            web_search
        );

        let request = Self::build_request(image, prompt, web_search)?;
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        normalize::extract_text(&response)
    }
}
