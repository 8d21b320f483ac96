//! HTTP client wrapper for the Gemini REST API.
//!
//! Construction reads the configured model; `resolve_model` then negotiates a
//! usable one by probing candidates against the model-metadata endpoint and,
//! as a last resort, consulting the backend's own model listing.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::config::get_config;
use crate::gemini::CompletionBackend;
use crate::gemini::classify::{CompletionError, classify_failure};
use crate::gemini::models::{model_candidates, select_fallback_model};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GENERATE_METHOD: &str = "generateContent";

/// Lightweight HTTP client for Gemini model and generation operations.
pub struct GeminiClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
}

impl GeminiClient {
    /// Construct a new client using configuration derived from the environment.
    ///
    /// The configured model is taken at face value here; call
    /// [`GeminiClient::resolve_model`] before serving traffic.
    pub fn new() -> Result<Self, CompletionError> {
        let config = get_config();
        let client = Client::builder().user_agent("gemdrive/0.1").build()?;

        let raw_base = config.gemini_api_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = normalize_base_url(raw_base).map_err(CompletionError::InvalidUrl)?;
        tracing::debug!(url = %base_url, model = %config.gemini_model, "Initialized Gemini HTTP client");

        Ok(Self {
            client,
            base_url,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        })
    }

    /// The model identifier requests are currently sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Negotiate a usable model, starting from the configured preference.
    ///
    /// Candidates are probed in order until one exists and supports
    /// generation; a fallback winner is logged as a warning. When every probe
    /// misses, the backend's model listing decides. Failure here means no
    /// model is usable at all, which is a configuration problem.
    pub async fn resolve_model(&mut self) -> Result<(), CompletionError> {
        let configured = self.model.clone();
        let mut last_error: Option<CompletionError> = None;

        for candidate in model_candidates(&configured) {
            match self.probe_model(&candidate).await {
                Ok(true) => {
                    if candidate == configured {
                        tracing::info!(model = %candidate, "Using configured Gemini model");
                    } else {
                        tracing::warn!(
                            model = %candidate,
                            configured = %configured,
                            "Configured Gemini model unavailable; using fallback"
                        );
                    }
                    self.model = candidate;
                    return Ok(());
                }
                Ok(false) => {
                    tracing::debug!(model = %candidate, "Model not available to this API key");
                }
                Err(error) => {
                    tracing::debug!(model = %candidate, error = %error, "Model probe failed");
                    last_error = Some(error);
                }
            }
        }

        let available = self
            .list_generation_models()
            .await
            .map_err(|error| CompletionError::NoUsableModel {
                detail: error.to_string(),
            })?;
        let names: Vec<String> = available
            .iter()
            .map(|model| model.short_name().to_string())
            .collect();

        match select_fallback_model(&names) {
            Some(model) => {
                tracing::warn!(
                    model = %model,
                    configured = %configured,
                    "Falling back to a model advertised by the backend"
                );
                self.model = model;
                Ok(())
            }
            None => {
                let detail = last_error
                    .map(|error| error.to_string())
                    .unwrap_or_else(|| format!("no models support {GENERATE_METHOD}"));
                Err(CompletionError::NoUsableModel { detail })
            }
        }
    }

    /// List the models available to this API key that support generation.
    pub async fn list_generation_models(&self) -> Result<Vec<ModelInfo>, CompletionError> {
        let response = self.request(Method::GET, "models")?.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = classify_failure(&format!("{status}: {body}"));
            tracing::error!(error = %error, "Failed to list Gemini models");
            return Err(error);
        }

        let payload: ModelListResponse = response.json().await?;
        Ok(payload
            .models
            .into_iter()
            .filter(|model| model.supports_generation())
            .collect())
    }

    /// Submit one prompt to the resolved model and return the generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .request(
                Method::POST,
                &format!("models/{}:{GENERATE_METHOD}", self.model),
            )?
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = classify_failure(&format!("{status}: {body}"));
            tracing::error!(model = %self.model, error = %error, "Gemini request failed");
            return Err(error);
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload.text();
        if text.is_empty() {
            return Err(CompletionError::Backend(
                "the model returned no content".to_string(),
            ));
        }
        Ok(text)
    }

    /// Check whether one model exists and supports generation.
    ///
    /// A 404 means the candidate is simply absent; any other failure is
    /// classified and returned so the caller can record it, move on to the
    /// next candidate, and reuse the last failure as diagnostic detail.
    async fn probe_model(&self, model: &str) -> Result<bool, CompletionError> {
        let response = self
            .request(Method::GET, &format!("models/{model}"))?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(&format!("{status}: {body}")));
        }

        let info: ModelInfo = response.json().await?;
        Ok(info.supports_generation())
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, CompletionError> {
        let url = format_endpoint(&self.base_url, path);
        Ok(self
            .client
            .request(method, url)
            .header("x-goog-api-key", &self.api_key))
    }
}

#[async_trait]
impl CompletionBackend for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        GeminiClient::generate(self, prompt).await
    }
}

/// Model metadata returned by the models endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    /// Fully qualified name, e.g. `models/gemini-flash-latest`.
    pub name: String,
    /// Methods the model serves, e.g. `generateContent`.
    #[serde(rename = "supportedGenerationMethods", default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Name without the `models/` prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    /// Whether the model can serve generation requests.
    pub fn supports_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|method| method == GENERATE_METHOD)
    }
}

#[derive(Deserialize)]
struct ModelListResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .map(|part| part.text.as_str())
            .collect()
    }
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, Method::POST, MockServer};

    fn test_client(server: &MockServer, model: &str) -> GeminiClient {
        GeminiClient {
            client: Client::builder()
                .user_agent("gemdrive-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            api_key: "test-key".to_string(),
            model: model.to_string(),
        }
    }

    #[tokio::test]
    async fn generate_parses_candidate_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/gemini-flash-latest:generateContent")
                    .header("x-goog-api-key", "test-key")
                    .json_body(json!({
                        "contents": [
                            { "parts": [ { "text": "Say hello" } ] }
                        ]
                    }));
                then.status(200).json_body(json!({
                    "candidates": [
                        { "content": { "parts": [ { "text": "Hello from the mock" } ] } }
                    ]
                }));
            })
            .await;

        let client = test_client(&server, "gemini-flash-latest");
        let answer = client.generate("Say hello").await.expect("generation");

        mock.assert();
        assert_eq!(answer, "Hello from the mock");
    }

    #[tokio::test]
    async fn quota_failures_surface_as_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/gemini-flash-latest:generateContent");
                then.status(429).body(
                    r#"{"error": {"code": 429, "message": "Quota exceeded for requests", "status": "RESOURCE_EXHAUSTED"}}"#,
                );
            })
            .await;

        let client = test_client(&server, "gemini-flash-latest");
        let error = client.generate("anything").await.unwrap_err();

        assert!(matches!(error, CompletionError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn empty_completion_is_a_backend_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/gemini-flash-latest:generateContent");
                then.status(200).json_body(json!({ "candidates": [] }));
            })
            .await;

        let client = test_client(&server, "gemini-flash-latest");
        let error = client.generate("anything").await.unwrap_err();

        match error {
            CompletionError::Backend(message) => assert!(message.contains("no content")),
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolve_model_keeps_an_available_configured_model() {
        let server = MockServer::start_async().await;
        let probe = server
            .mock_async(|when, then| {
                when.method(GET).path("/models/gemini-flash-latest");
                then.status(200).json_body(json!({
                    "name": "models/gemini-flash-latest",
                    "supportedGenerationMethods": ["generateContent"]
                }));
            })
            .await;

        let mut client = test_client(&server, "gemini-flash-latest");
        client.resolve_model().await.expect("resolution");

        probe.assert();
        assert_eq!(client.model(), "gemini-flash-latest");
    }

    #[tokio::test]
    async fn resolve_model_falls_back_when_the_configured_model_is_missing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models/gemini-legacy");
                then.status(404).body("model not found");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models/gemini-flash-latest");
                then.status(200).json_body(json!({
                    "name": "models/gemini-flash-latest",
                    "supportedGenerationMethods": ["generateContent"]
                }));
            })
            .await;

        let mut client = test_client(&server, "gemini-legacy");
        client.resolve_model().await.expect("resolution");

        assert_eq!(client.model(), "gemini-flash-latest");
    }

    #[tokio::test]
    async fn resolve_model_continues_past_a_failing_probe() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models/gemini-legacy");
                then.status(500).body("internal error");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models/gemini-flash-latest");
                then.status(200).json_body(json!({
                    "name": "models/gemini-flash-latest",
                    "supportedGenerationMethods": ["generateContent"]
                }));
            })
            .await;

        let mut client = test_client(&server, "gemini-legacy");
        client.resolve_model().await.expect("resolution");

        assert_eq!(client.model(), "gemini-flash-latest");
    }

    #[tokio::test]
    async fn resolve_model_consults_the_backend_listing_as_a_last_resort() {
        let server = MockServer::start_async().await;
        for candidate in model_candidates("gemini-legacy") {
            let path = format!("/models/{candidate}");
            server
                .mock_async(move |when, then| {
                    when.method(GET).path(path);
                    then.status(404).body("model not found");
                })
                .await;
        }
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models");
                then.status(200).json_body(json!({
                    "models": [
                        { "name": "models/chat-bison", "supportedGenerationMethods": ["generateContent"] },
                        { "name": "models/gemini-exp-pro", "supportedGenerationMethods": ["generateContent"] }
                    ]
                }));
            })
            .await;

        let mut client = test_client(&server, "gemini-legacy");
        client.resolve_model().await.expect("resolution");

        assert_eq!(client.model(), "gemini-exp-pro");
    }

    #[tokio::test]
    async fn resolve_model_fails_when_nothing_supports_generation() {
        let server = MockServer::start_async().await;
        for candidate in model_candidates("gemini-legacy") {
            let path = format!("/models/{candidate}");
            server
                .mock_async(move |when, then| {
                    when.method(GET).path(path);
                    then.status(404).body("model not found");
                })
                .await;
        }
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models");
                then.status(200).json_body(json!({
                    "models": [
                        { "name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"] }
                    ]
                }));
            })
            .await;

        let mut client = test_client(&server, "gemini-legacy");
        let error = client.resolve_model().await.unwrap_err();

        assert!(matches!(error, CompletionError::NoUsableModel { .. }));
        assert!(error.to_string().contains("check-models"));
    }

    #[tokio::test]
    async fn listing_filters_models_without_generation_support() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models");
                then.status(200).json_body(json!({
                    "models": [
                        { "name": "models/gemini-flash-latest", "supportedGenerationMethods": ["generateContent", "countTokens"] },
                        { "name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"] }
                    ]
                }));
            })
            .await;

        let client = test_client(&server, "gemini-flash-latest");
        let models = client.list_generation_models().await.expect("listing");

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].short_name(), "gemini-flash-latest");
    }
}
