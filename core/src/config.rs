//! Client configuration: base URL and default headers.

use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Header that makes the tunnel in front of the API skip its interstitial
/// warning page.
pub const TUNNEL_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

pub const ENV_BASE_URL: &str = "ACCESS_API_URL";
pub const ENV_SKIP_TUNNEL_WARNING: &str = "ACCESS_API_SKIP_TUNNEL_WARNING";

/// Settings for the shared API client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Absolute URL including the `/api/v1` prefix.
    pub base_url: String,
    pub skip_tunnel_warning: bool,
    /// Extra headers attached to every request after the defaults.
    pub extra_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            skip_tunnel_warning: true,
            extra_headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `ACCESS_API_URL` and
    /// `ACCESS_API_SKIP_TUNNEL_WARNING` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(flag) = lookup(ENV_SKIP_TUNNEL_WARNING) {
            config.skip_tunnel_warning = !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        config
    }

    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        serde_json::from_str(raw).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Headers sent with every request, in order.
    pub fn default_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if self.skip_tunnel_warning {
            headers.push((TUNNEL_WARNING_HEADER.to_string(), "true".to_string()));
        }
        headers.extend(self.extra_headers.iter().cloned());
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_include_tunnel_header() {
        let headers = ClientConfig::default().default_headers();
        assert_eq!(
            headers,
            vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("ngrok-skip-browser-warning".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn env_overrides_base_url_and_flag() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://abc.example.app/api/v1"),
            (ENV_SKIP_TUNNEL_WARNING, "false"),
        ]));
        assert_eq!(config.base_url, "https://abc.example.app/api/v1");
        assert!(!config.skip_tunnel_warning);
        assert_eq!(config.default_headers().len(), 1);
    }

    #[test]
    fn blank_env_url_keeps_default() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_BASE_URL, "  ")]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn json_fills_missing_keys_with_defaults() {
        let config =
            ClientConfig::from_json(r#"{"baseUrl":"http://10.0.0.2:8080/api/v1"}"#).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:8080/api/v1");
        assert!(config.skip_tunnel_warning);
        assert!(config.extra_headers.is_empty());
    }

    #[test]
    fn extra_headers_follow_defaults() {
        let config = ClientConfig::from_json(
            r#"{"skipTunnelWarning":false,"extraHeaders":[["x-device","tablet-1"]]}"#,
        )
        .unwrap();
        assert_eq!(
            config.default_headers()[1],
            ("x-device".to_string(), "tablet-1".to_string())
        );
    }
}
