use crate::models::DEFAULT_GEMINI_BASE_URL;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Lightweight Gemini REST client. The API key travels as the `key` query parameter.
pub struct GeminiHttpClient {
    pub(crate) client: Client,
    api_key: String,
    model: String,
    pub(crate) base_url: String,
    timeout: Option<Duration>,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-flash`);
    /// a `models/` prefix is stripped.
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_content_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp> {
        let mut builder = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        // The URL carries the API key; keep it out of logs and error messages.
        let response = builder.send().await.map_err(|e| {
            let e = e.without_url();
            tracing::error!("Failed to send request to Gemini: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::UpstreamService {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body = response.text().await?;
        tracing::debug!("Gemini response body: {}", body);
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::UpstreamService {
                status: 200,
                body: format!("Failed to parse Gemini response: {}", e),
            }
        })
    }

    /// Calls Gemini's `generateContent` endpoint.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        self.post_to_url(self.generate_content_url(), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_strips_models_prefix() {
        let client = GeminiHttpClient::new("k".to_string(), "models/gemini-2.5-flash".to_string());
        assert_eq!(client.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_url_embeds_model() {
        let client = GeminiHttpClient::new("k".to_string(), "gemini-2.5-flash".to_string())
            .with_base_url("http://localhost:1234/".to_string());
        assert_eq!(
            client.generate_content_url(),
            "http://localhost:1234/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_sends_key_as_query_param() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "secret-key"))
            .and(header("content-type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(test_support::text_response("ok")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client =
            GeminiHttpClient::new("secret-key".to_string(), "gemini-2.5-flash".to_string())
                .with_base_url(server.uri());

        let response: serde_json::Value = client
            .generate_content(&serde_json::json!({ "contents": [] }))
            .await
            .unwrap();
        assert_eq!(response["candidates"][0]["content"]["parts"][0]["text"], "ok");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = GeminiHttpClient::new("k".to_string(), "gemini-2.5-flash".to_string())
            .with_base_url(server.uri());

        let err = client
            .generate_content::<_, serde_json::Value>(&serde_json::json!({}))
            .await
            .unwrap_err();
        match err {
            Error::UpstreamService { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_envelope_is_upstream_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = GeminiHttpClient::new("k".to_string(), "gemini-2.5-flash".to_string())
            .with_base_url(server.uri());

        let err = client
            .generate_content::<_, serde_json::Value>(&serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamService { .. }));
    }
}
