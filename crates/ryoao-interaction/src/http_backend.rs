//! HttpBackend - REST client for the contract review backend.
//!
//! Talks to `/login`, `/analyze`, `/chat` and `/history`. Error bodies follow
//! the backend's `{"detail": ...}` convention; the detail text is carried in
//! [`BackendError::detail`] so callers can show the server's own explanation.

use async_trait::async_trait;
use reqwest::{Client, Response, multipart};
use ryoao_core::analysis::{AnalysisResult, HistoryEntry, RiskRecord};
use ryoao_core::backend::{AccessToken, AnalysisBackend, AuthBackend, BackendError};
use ryoao_core::document::Document;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the auth and analysis endpoints of one backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a client for `base_url` with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::transport(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await.map_err(|err| {
            BackendError::transport(format!("{endpoint} request failed: {err}"))
        })?;

        let response = check_status(endpoint, response).await?;

        response.json::<T>().await.map_err(|err| {
            BackendError::decode(format!("Failed to parse {endpoint} response: {err}"))
        })
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, BackendError> {
        tracing::debug!(%username, "POST /login");
        let request = self
            .client
            .post(self.url("/login"))
            .json(&LoginRequest { username, password });

        let parsed: LoginResponse = self.send("/login", request).await?;
        Ok(AccessToken(parsed.access_token))
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn analyze(&self, token: &str, document: &Document) -> Result<String, BackendError> {
        tracing::debug!(file = %document.file_name, size = document.len(), "POST /analyze");
        let part = multipart::Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(&document.mime_type)
            .map_err(|err| BackendError::transport(format!("Invalid document MIME type: {err}")))?;
        let form = multipart::Form::new().part("file", part);

        let request = self
            .client
            .post(self.url("/analyze"))
            .bearer_auth(token)
            .multipart(form);

        let parsed: AnalyzeResponse = self.send("/analyze", request).await?;
        Ok(parsed.analysis)
    }

    async fn chat(
        &self,
        token: &str,
        context: &AnalysisResult,
        message: &str,
    ) -> Result<String, BackendError> {
        tracing::debug!(findings = context.len(), "POST /chat");
        let request = self
            .client
            .post(self.url("/chat"))
            .bearer_auth(token)
            .json(&ChatRequest {
                analysis_context: context.records(),
                user_message: message,
            });

        let parsed: ChatResponse = self.send("/chat", request).await?;
        Ok(parsed.response)
    }

    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, BackendError> {
        tracing::debug!("GET /history");
        let request = self.client.get(self.url("/history")).bearer_auth(token);
        self.send("/history", request).await
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    analysis: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    analysis_context: &'a [RiskRecord],
    user_message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

async fn check_status(endpoint: &str, response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body);
    tracing::warn!(%endpoint, status = status.as_u16(), detail = ?detail, "Backend returned an error");

    Err(BackendError::http(
        status.as_u16(),
        detail,
        format!("{endpoint} returned HTTP {status}"),
    ))
}

/// Pulls the human-readable `detail` out of an error body.
///
/// A string detail is used verbatim. Validation errors arrive as a list of
/// objects with a `msg` field; their messages are joined with `; `.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
