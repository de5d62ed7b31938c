//! The identification pipeline: one model call per uploaded image, then
//! parsing and shaping according to the configured [`ResponseMode`].

use crate::ai::VisionService;
use crate::models::{
    CandidateList, ProductCandidate, ProductInfo, ProductLinks, ResponseMode, UploadedImage,
};
use crate::{normalize, prompts, shaper, Error, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Per-endpoint settings that distinguish the three response modes.
#[derive(Debug, Clone)]
pub struct PipelineProfile {
    pub mode: ResponseMode,
    pub prompt: &'static str,
    pub web_search: bool,
}

impl PipelineProfile {
    /// Default profile for `mode`. Candidate and redirect answers need real
    /// listing URLs, so those two ground the model with web search.
    pub fn for_mode(mode: ResponseMode) -> Self {
        Self {
            mode,
            prompt: prompts::for_mode(mode),
            web_search: !matches!(mode, ResponseMode::Identify),
        }
    }
}

/// Fully shaped result of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductOutcome {
    Links(ProductLinks),
    Candidates(CandidateList),
    Redirect(String),
}

pub struct IdentificationPipeline {
    vision: Arc<dyn VisionService>,
    profile: PipelineProfile,
}

impl IdentificationPipeline {
    pub fn new(vision: Arc<dyn VisionService>, profile: PipelineProfile) -> Self {
        Self { vision, profile }
    }

    pub fn mode(&self) -> ResponseMode {
        self.profile.mode
    }

    /// Run the model call and interpret its answer.
    pub async fn run(&self, image: &UploadedImage) -> Result<ProductOutcome> {
        let text = self
            .vision
            .generate_text(image, self.profile.prompt, self.profile.web_search)
            .await?;
        debug!("Model answer ({}): {}", self.profile.mode, text);

        let outcome = interpret(self.profile.mode, &text)?;
        info!("Resolved {} response", self.profile.mode);
        Ok(outcome)
    }
}

/// Parse model answer text and shape it for `mode`.
pub fn interpret(mode: ResponseMode, text: &str) -> Result<ProductOutcome> {
    match mode {
        ResponseMode::Identify => {
            let info: ProductInfo = normalize::parse_json(text)?;
            if info.effective_query().is_empty() {
                tracing::warn!("Model output names no product: {}", text);
                return Err(Error::MalformedModelOutput {
                    raw: text.to_string(),
                });
            }
            info!("Identified product: {}", info.effective_query());
            Ok(ProductOutcome::Links(shaper::product_links(info)))
        }
        ResponseMode::Candidates => {
            let products: Vec<ProductCandidate> = normalize::parse_json(text)?;
            info!("Model returned {} candidate(s)", products.len());
            Ok(ProductOutcome::Candidates(shaper::candidate_list(products)))
        }
        ResponseMode::Redirect => {
            normalize::resolve_amazon_url(text).map(ProductOutcome::Redirect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockVisionClient;
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn image() -> UploadedImage {
        UploadedImage::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg")
    }

    fn pipeline(mock: &Arc<MockVisionClient>, mode: ResponseMode) -> IdentificationPipeline {
        IdentificationPipeline::new(mock.clone(), PipelineProfile::for_mode(mode))
    }

    #[test]
    fn test_profiles_select_search_tool() {
        assert!(!PipelineProfile::for_mode(ResponseMode::Identify).web_search);
        assert!(PipelineProfile::for_mode(ResponseMode::Candidates).web_search);
        assert!(PipelineProfile::for_mode(ResponseMode::Redirect).web_search);
    }

    #[tokio::test]
    async fn test_identify_builds_links() {
        let mock = Arc::new(MockVisionClient::new().with_text_response(
            "{\"name\":\"Culture Pop Strawberry Rhubarb Probiotic Soda\",\"searchQuery\":\"Culture Pop Strawberry Rhubarb Soda\"}",
        ));

        let outcome = pipeline(&mock, ResponseMode::Identify)
            .run(&image())
            .await
            .unwrap();

        match outcome {
            ProductOutcome::Links(links) => {
                assert_eq!(links.product, "Culture Pop Strawberry Rhubarb Probiotic Soda");
                assert!(links
                    .amazon_app_url
                    .starts_with("com.amazon.mobile.shopping://amazon.com/s?k=Culture%20Pop"));
                assert!(links
                    .amazon_web_url
                    .starts_with("https://www.amazon.com/s?k=Culture%20Pop"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, prompts::IDENTIFY);
        assert!(!calls[0].web_search);
    }

    #[tokio::test]
    async fn test_candidates_wraps_array() {
        let mock = Arc::new(
            MockVisionClient::new()
                .with_text_response("```json\n[{\"title\":\"X\",\"url\":\"https://amazon.com/dp/B123\"}]\n```"),
        );

        let outcome = pipeline(&mock, ResponseMode::Candidates)
            .run(&image())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ProductOutcome::Candidates(CandidateList {
                products: vec![ProductCandidate {
                    title: "X".to_string(),
                    url: "https://amazon.com/dp/B123".to_string(),
                }]
            })
        );
        assert!(mock.calls()[0].web_search);
    }

    #[tokio::test]
    async fn test_redirect_extracts_url() {
        let mock =
            Arc::new(MockVisionClient::new().with_text_response("Sure! https://amazon.com/dp/B123"));

        let outcome = pipeline(&mock, ResponseMode::Redirect)
            .run(&image())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ProductOutcome::Redirect("https://amazon.com/dp/B123".to_string())
        );
    }

    #[tokio::test]
    async fn test_redirect_without_amazon_url_fails() {
        let mock = Arc::new(MockVisionClient::new().with_text_response("I don't know"));

        let err = pipeline(&mock, ResponseMode::Redirect)
            .run(&image())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAnAmazonUrl { ref raw } if raw == "I don't know"));
    }

    #[tokio::test]
    async fn test_upstream_error_is_not_parsed() {
        let mock = Arc::new(MockVisionClient::new().with_upstream_error(503, "overloaded"));

        let err = pipeline(&mock, ResponseMode::Identify)
            .run(&image())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamService { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_malformed_identify_output() {
        let mock = Arc::new(MockVisionClient::new().with_text_response("It's a soda can."));

        let err = pipeline(&mock, ResponseMode::Identify)
            .run(&image())
            .await
            .unwrap_err();
        assert_eq!(err.raw(), Some("It's a soda can."));
    }

    #[test]
    fn test_identify_without_name_uses_search_query() {
        let outcome = interpret(ResponseMode::Identify, r#"{"searchQuery":"acme kettle"}"#).unwrap();
        match outcome {
            ProductOutcome::Links(links) => {
                assert_eq!(links.product, "");
                assert_eq!(links.amazon_web_url, "https://www.amazon.com/s?k=acme%20kettle");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_identify_without_name_or_query_is_malformed() {
        let err = interpret(ResponseMode::Identify, r#"{"brand":"Acme"}"#).unwrap_err();
        assert_eq!(err.raw(), Some(r#"{"brand":"Acme"}"#));
    }

    #[tokio::test]
    async fn test_empty_model_response_propagates() {
        let mock = Arc::new(MockVisionClient::new().with_empty_response());

        let err = pipeline(&mock, ResponseMode::Candidates)
            .run(&image())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyModelResponse));
    }
}
