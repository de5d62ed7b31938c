//! Turning model answer text into structured values.
//!
//! The model is asked for a specific shape but is not bound to it, so every
//! step returns [`Result`] and parse failures keep the raw text for the caller.

use crate::ai::gemini::types::GenerateContentResponse;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde::de::DeserializeOwned;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\n?|\n?```").expect("valid fence regex"));

static AMAZON_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s"'<>()\[\]]*amazon[^\s"'<>()\[\]]*"#).expect("valid url regex")
});

/// Trimmed text of the first candidate's first part.
pub fn extract_text(response: &GenerateContentResponse) -> Result<String> {
    response
        .first_text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(Error::EmptyModelResponse)
}

/// Remove markdown ```` ```json ```` / ```` ``` ```` fence markers and trim.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Strip fences and deserialize, keeping the original text on failure.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned).map_err(|e| {
        tracing::warn!("Model output is not the expected JSON ({}): {}", e, text);
        Error::MalformedModelOutput {
            raw: text.to_string(),
        }
    })
}

/// Pick the Amazon URL out of free-form model text.
///
/// The first `http(s)` URL mentioning `amazon` wins; without one the whole
/// trimmed text is used. Either way the result must mention `amazon` and
/// parse as an absolute `http(s)` URL, since it becomes a `Location` header.
pub fn resolve_amazon_url(text: &str) -> Result<String> {
    let candidate = AMAZON_URL
        .find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', '!', '?']))
        .unwrap_or_else(|| text.trim());

    match Url::parse(candidate) {
        Ok(url) if is_amazon_link(&url, candidate) => Ok(String::from(url)),
        _ => {
            tracing::warn!("No Amazon URL in model output: {}", text);
            Err(Error::NotAnAmazonUrl {
                raw: text.to_string(),
            })
        }
    }
}

fn is_amazon_link(url: &Url, candidate: &str) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some()
        && candidate.contains("amazon")
}
