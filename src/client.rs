//! Client for the OpenAI Images API generations endpoint.
//! Docs: https://platform.openai.com/docs/api-reference/images

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::constants::{
    CLIENT_VERSION, DEFAULT_API_BASE, GENERATIONS_PATH, MINIMUM_CLIENT_VERSION,
};
use crate::error::{ConfigurationError, RemoteErrorKind, RemoteServiceError};
use crate::models::{GenerationRequest, GenerationResponse};
use crate::version::ensure_supported;

/// Everything needed to build an [`OpenAiClient`].
#[derive(Clone, Debug)]
pub struct ClientSettings {
    /// Bearer token for the API
    pub api_key: String,
    /// API base URL, eg `https://api.openai.com/v1/`
    pub api_base: String,
    /// Version reported by this client, checked against the minimum
    pub client_version: String,
    /// Overall timeout for each HTTP request
    pub timeout: Option<Duration>,
}

impl ClientSettings {
    /// Settings for the public API with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            client_version: CLIENT_VERSION.to_string(),
            timeout: None,
        }
    }
}

// Error envelope returned with non-success statuses.
#[derive(Deserialize, Debug)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: String,
}

/// Wraps the remote generation call.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    generations_url: Url,
}

impl OpenAiClient {
    /// Checks the client version and credential, then builds the HTTP client.
    pub fn new(settings: &ClientSettings) -> Result<Self, ConfigurationError> {
        ensure_supported(&settings.client_version, MINIMUM_CLIENT_VERSION)?;

        let api_key = settings.api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigurationError::MissingApiKey);
        }

        let generations_url = generations_url(&settings.api_base)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            generations_url,
        })
    }

    /// The underlying HTTP client, shared with the image downloader.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Requests `request.count` images. Either every asset comes back or an error does.
    pub async fn generate_images(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, RemoteServiceError> {
        debug!(
            "Requesting {} image(s) from {} at {}",
            request.count, request.model, request.size
        );

        let response = self
            .http
            .post(self.generations_url.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                RemoteServiceError::without_status(RemoteErrorKind::Connection, err.to_string())
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            RemoteServiceError::without_status(RemoteErrorKind::Connection, err.to_string())
        })?;

        if !status.is_success() {
            return Err(RemoteServiceError {
                kind: kind_for_status(status.as_u16()),
                status: Some(status.as_u16()),
                body: error_message(&bytes),
            });
        }

        let parsed: GenerationResponse = match serde_json::from_slice(&bytes) {
            Ok(parsed) => parsed,
            Err(err) => {
                let body = String::from_utf8_lossy(&bytes);
                let message = format!("Failed to parse response JSON ({err}): {body}");
                return Err(invalid_response(status.as_u16(), message));
            }
        };

        let received = parsed.data.len();
        if received != usize::from(request.count) {
            let message = format!("Expected {} image(s), got {received}", request.count);
            return Err(invalid_response(status.as_u16(), message));
        }

        info!("Received {} image(s)", parsed.data.len());
        Ok(parsed)
    }
}

fn generations_url(api_base: &str) -> Result<Url, ConfigurationError> {
    let mut base = Url::parse(api_base)?;
    if base.cannot_be_a_base() {
        return Err(ConfigurationError::InvalidBaseUrl(api_base.to_string()));
    }
    // without the trailing slash, join() would replace the last path segment
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(GENERATIONS_PATH)?)
}

fn invalid_response(status: u16, body: String) -> RemoteServiceError {
    RemoteServiceError {
        kind: RemoteErrorKind::InvalidResponse,
        status: Some(status),
        body,
    }
}

fn kind_for_status(status: u16) -> RemoteErrorKind {
    match status {
        429 => RemoteErrorKind::RateLimited,
        400 => RemoteErrorKind::BadRequest,
        _ => RemoteErrorKind::Status,
    }
}

fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => String::from_utf8_lossy(body).to_string(),
    }
}
