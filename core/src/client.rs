//! Shared request builder and response parser for the access-control API.
//!
//! # Design
//! `ApiClient` holds the base URL and default headers and carries no mutable
//! state between calls. The domain services (`workers()`, `reports()`,
//! `config()`) borrow it and split each operation into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Read responses are wrapped as `{"data": ...}`; the parsers
//! unwrap the envelope and return only the payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::reports::ReportService;
use crate::system::ConfigService;
use crate::workers::WorkerService;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Stateless client bound to one base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    headers: Vec<(String, String)>,
}

impl ApiClient {
    /// Client with default settings for `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: config.default_headers(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn workers(&self) -> WorkerService<'_> {
        WorkerService::new(self)
    }

    pub fn reports(&self) -> ReportService<'_> {
        ReportService::new(self)
    }

    pub fn config(&self) -> ConfigService<'_> {
        ConfigService::new(self)
    }

    /// Absolute URL for `path` with `query` pairs percent-encoded.
    pub(crate) fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let raw = format!("{}{}", self.base_url, path);
        if query.is_empty() {
            return raw;
        }
        match Url::parse(&raw) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
                url.to_string()
            }
            // Relative base URLs cannot be parsed; encode by hand.
            Err(_) => {
                let pairs: Vec<String> = query
                    .iter()
                    .map(|(k, v)| format!("{k}={}", encode_component(v)))
                    .collect();
                format!("{raw}?{}", pairs.join("&"))
            }
        }
    }

    pub(crate) fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        debug!(method = method.as_str(), %url, "built request");
        HttpRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
        }
    }

    pub(crate) fn get(&self, path: &str, query: &[(&str, String)]) -> HttpRequest {
        self.request(HttpMethod::Get, self.url(path, query), None)
    }

    /// POST with no body, used by the action endpoints.
    pub(crate) fn post_empty(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Post, self.url(path, &[]), None)
    }

    pub(crate) fn send_json<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(method, self.url(path, &[]), Some(body)))
    }

    pub(crate) fn delete(&self, path: &str, query: &[(&str, String)]) -> HttpRequest {
        self.request(HttpMethod::Delete, self.url(path, query), None)
    }

    /// Check the status and unwrap `{"data": T}`.
    pub(crate) fn parse_data<T: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<T, ApiError> {
        check_status(&response)?;
        let envelope: Envelope<T> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        Ok(envelope.data)
    }

    /// Check the status and return the body as loose JSON.
    pub(crate) fn parse_raw(&self, response: HttpResponse) -> Result<serde_json::Value, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Check the status and ignore the body.
    pub(crate) fn parse_empty(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant,
/// keeping the server's `message` when the body has one.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());
    warn!(status = response.status, message = ?message, "request failed");
    if response.status == 404 {
        return Err(ApiError::NotFound { message });
    }
    Err(ApiError::Http {
        status: response.status,
        message,
        body: response.body.clone(),
    })
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
