//! Executing built requests.
//!
//! The services never perform I/O. Hosts with their own HTTP stack (the
//! native shell behind the FFI) execute `HttpRequest`s themselves; Rust
//! callers can use `BlockingTransport` (feature `blocking`).
//!
//! There is no retry and no timeout override: a worker registration can
//! legitimately block for the whole enrollment wait, and every failure is
//! final for that user action.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform one round-trip. Non-2xx statuses are returned as data, not
    /// as errors; only failures to get a response at all are `Err`.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;

    /// Execute `request` and hand the response to `parse`.
    fn round_trip<T, F>(&self, request: HttpRequest, parse: F) -> Result<T, ApiError>
    where
        F: FnOnce(HttpResponse) -> Result<T, ApiError>,
        Self: Sized,
    {
        let response = self.execute(&request)?;
        parse(response)
    }
}

#[cfg(feature = "blocking")]
pub use blocking::BlockingTransport;

#[cfg(feature = "blocking")]
mod blocking {
    use tracing::debug;

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// `ureq`-backed transport. Status codes are left for the services to
    /// interpret.
    #[derive(Debug, Clone)]
    pub struct BlockingTransport {
        agent: ureq::Agent,
    }

    impl Default for BlockingTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl BlockingTransport {
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    fn with_headers<B>(
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (key, value) in headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder
    }

    impl Transport for BlockingTransport {
        fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
            let url = req.url.as_str();
            let headers = req.headers.as_slice();
            let result = match (req.method, req.body.as_deref()) {
                (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers).call(),
                (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), headers).call(),
                (HttpMethod::Post, Some(body)) => {
                    with_headers(self.agent.post(url), headers).send(body.as_bytes())
                }
                (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
                (HttpMethod::Put, Some(body)) => {
                    with_headers(self.agent.put(url), headers).send(body.as_bytes())
                }
                (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
            };
            let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            debug!(method = req.method.as_str(), url, status, "response received");

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
