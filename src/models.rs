//! Data models and structures
//!
//! Defines the uploaded image, the product payloads parsed from model output,
//! the shapes returned to callers, and runtime configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Selects prompt, tools, parser and output shape for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// JSON object `{name, searchQuery}` expanded into Amazon links.
    Identify,
    /// JSON array of `{title, url}` candidates.
    Candidates,
    /// A single Amazon URL answered with a redirect.
    Redirect,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Identify => "identify",
            ResponseMode::Candidates => "candidates",
            ResponseMode::Redirect => "redirect",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image bytes received from the caller. Lives for a single request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Model answer for [`ResponseMode::Identify`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductInfo {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "searchQuery", default)]
    pub search_query: Option<String>,
}

impl ProductInfo {
    /// The query used for Amazon links: `searchQuery` unless missing or empty,
    /// else `name`. Used verbatim.
    pub fn effective_query(&self) -> &str {
        self.search_query
            .as_deref()
            .filter(|q| !q.is_empty())
            .unwrap_or(&self.name)
    }
}

/// One shopping candidate for [`ResponseMode::Candidates`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductCandidate {
    pub title: String,
    pub url: String,
}

/// Response body for [`ResponseMode::Identify`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductLinks {
    pub product: String,
    pub search_query: String,
    pub amazon_app_url: String,
    pub amazon_web_url: String,
}

/// Response body for [`ResponseMode::Candidates`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateList {
    pub products: Vec<ProductCandidate>,
}

/// JSON error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub identify_model: String,
    pub candidates_model: String,
    pub redirect_model: String,
    /// `None` leaves the HTTP client's default (no timeout).
    pub gemini_timeout: Option<Duration>,
    /// `None` lifts the request body limit entirely.
    pub max_upload_bytes: Option<usize>,
}

impl Config {
    /// Build a config around an API key with every other setting at its default.
    pub fn new(gemini_api_key: String) -> Self {
        Self {
            gemini_api_key,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            identify_model: DEFAULT_MODEL.to_string(),
            candidates_model: DEFAULT_MODEL.to_string(),
            redirect_model: DEFAULT_MODEL.to_string(),
            gemini_timeout: None,
            max_upload_bytes: None,
        }
    }

    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let model_var =
            |name: &str| std::env::var(name).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            gemini_api_key,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            identify_model: model_var("IDENTIFY_MODEL"),
            candidates_model: model_var("CANDIDATES_MODEL"),
            redirect_model: model_var("REDIRECT_MODEL"),
            gemini_timeout: parse_optional_env::<u64>("GEMINI_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            max_upload_bytes: parse_optional_env::<usize>("MAX_UPLOAD_BYTES")?,
        })
    }

    /// Model ID configured for `mode`.
    pub fn model_for(&self, mode: ResponseMode) -> &str {
        match mode {
            ResponseMode::Identify => &self.identify_model,
            ResponseMode::Candidates => &self.candidates_model,
            ResponseMode::Redirect => &self.redirect_model,
        }
    }
}

fn parse_optional_env<T: std::str::FromStr>(name: &str) -> crate::Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| crate::Error::Config(format!("{} must be a number, got '{}'", name, value))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_product_info_deserialization() {
        let info: ProductInfo = serde_json::from_str(
            r#"{"name":"Culture Pop Strawberry Rhubarb Probiotic Soda","searchQuery":"Culture Pop Strawberry Rhubarb Soda"}"#,
        )
        .unwrap();

        assert_eq!(info.name, "Culture Pop Strawberry Rhubarb Probiotic Soda");
        assert_eq!(info.effective_query(), "Culture Pop Strawberry Rhubarb Soda");
    }

    #[test]
    fn test_effective_query_falls_back_to_name() {
        let missing: ProductInfo = serde_json::from_str(r#"{"name":"Acme Kettle"}"#).unwrap();
        assert_eq!(missing.effective_query(), "Acme Kettle");

        let blank: ProductInfo =
            serde_json::from_str(r#"{"name":"Acme Kettle","searchQuery":""}"#).unwrap();
        assert_eq!(blank.effective_query(), "Acme Kettle");
    }

    #[test]
    fn test_effective_query_is_not_trimmed() {
        let info: ProductInfo =
            serde_json::from_str(r#"{"name":"Acme Kettle","searchQuery":" kettle "}"#).unwrap();
        assert_eq!(info.effective_query(), " kettle ");
    }

    #[test]
    fn test_name_is_optional() {
        let info: ProductInfo = serde_json::from_str(r#"{"searchQuery":"acme kettle"}"#).unwrap();
        assert_eq!(info.name, "");
        assert_eq!(info.effective_query(), "acme kettle");
    }

    #[test]
    fn test_product_links_serialize_camel_case() {
        let links = ProductLinks {
            product: "Kettle".to_string(),
            search_query: "kettle".to_string(),
            amazon_app_url: "com.amazon.mobile.shopping://amazon.com/s?k=kettle".to_string(),
            amazon_web_url: "https://www.amazon.com/s?k=kettle".to_string(),
        };

        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "product": "Kettle",
                "searchQuery": "kettle",
                "amazonAppUrl": "com.amazon.mobile.shopping://amazon.com/s?k=kettle",
                "amazonWebUrl": "https://www.amazon.com/s?k=kettle"
            })
        );
    }

    #[test]
    fn test_error_body_omits_missing_raw() {
        let body = ErrorBody {
            error: "No image provided".to_string(),
            raw: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"No image provided"}"#
        );
    }

    #[test]
    fn test_model_for_mode() {
        let mut config = Config::new("key".to_string());
        config.redirect_model = "gemini-2.5-pro".to_string();

        assert_eq!(config.model_for(ResponseMode::Identify), DEFAULT_MODEL);
        assert_eq!(config.model_for(ResponseMode::Candidates), DEFAULT_MODEL);
        assert_eq!(config.model_for(ResponseMode::Redirect), "gemini-2.5-pro");
    }
}
