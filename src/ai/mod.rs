//! Model service integration
//!
//! Wraps the Gemini `generateContent` API behind [`VisionService`] so the
//! pipeline can be driven by the real client or by [`MockVisionClient`].

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiVisionClient;
pub use mock::MockVisionClient;

use crate::models::UploadedImage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait VisionService: Send + Sync {
    /// Send `image` and `prompt` as one user turn and return the trimmed answer
    /// text. `web_search` asks the model service to ground the answer with search.
    async fn generate_text(
        &self,
        image: &UploadedImage,
        prompt: &str,
        web_search: bool,
    ) -> Result<String>;
}
