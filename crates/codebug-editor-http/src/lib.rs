//! `codebug-editor-http` - HTTP implementation of [`codebug_editor::AnalysisService`].
//!
//! Talks to an analysis server exposing:
//!
//! - `POST /api/analyze` with `{"code": ..., "apply_fix": false}`, answering a JSON document
//! - `GET /api/health`, answering `{"status": "ok", ...}`
//!
//! Calls are blocking; [`codebug_editor::AnalysisController`] runs them on worker threads.

use codebug_editor::{AnalysisRequest, AnalysisService, ServiceError};
use serde_json::Value;
use std::time::Duration;

/// Where the analysis server lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL without trailing slash, e.g. `http://127.0.0.1:6060`.
    pub base_url: String,
    /// Transport timeout for a whole request.
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:6060";
/// Default transport timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client for the analysis server.
#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    agent: ureq::Agent,
    config: ServiceConfig,
}

impl HttpAnalysisService {
    /// Client for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(ServiceConfig {
            base_url: base_url.into(),
            ..ServiceConfig::default()
        })
    }

    pub fn with_config(mut config: ServiceConfig) -> Self {
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self { agent, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Liveness probe against `GET /api/health`.
    pub fn health(&self) -> Result<Value, ServiceError> {
        let url = self.url("/api/health");
        tracing::debug!(%url, "checking analysis service health");
        read_response(self.agent.get(&url).call())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }
}

impl Default for HttpAnalysisService {
    fn default() -> Self {
        Self::with_config(ServiceConfig::default())
    }
}

impl AnalysisService for HttpAnalysisService {
    fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ServiceError> {
        let url = self.url("/api/analyze");
        let body = request.to_json().to_string();
        tracing::debug!(%url, bytes = body.len(), "posting analysis request");

        let result = read_response(
            self.agent
                .post(&url)
                .set("Content-Type", "application/json")
                .send_string(&body),
        );
        if let Err(err) = &result {
            tracing::debug!(%url, %err, "analysis request failed");
        }
        result
    }
}

fn read_response(result: Result<ureq::Response, ureq::Error>) -> Result<Value, ServiceError> {
    match result {
        Ok(response) => {
            let status = response.status();
            let body = response
                .into_string()
                .map_err(|e| ServiceError::Transport(format!("failed to read response body: {e}")))?;
            if (200..300).contains(&status) {
                serde_json::from_str(&body)
                    .map_err(|e| ServiceError::Transport(format!("invalid response body: {e}")))
            } else {
                rejected(status, body)
            }
        }
        Err(ureq::Error::Status(status, response)) => {
            let body = response
                .into_string()
                .map_err(|e| ServiceError::Transport(format!("failed to read response body: {e}")))?;
            rejected(status, body)
        }
        Err(ureq::Error::Transport(transport)) => Err(ServiceError::Transport(transport.to_string())),
    }
}

/// Map an error status to [`ServiceError`]. The body is kept as JSON when it parses, as a
/// JSON string otherwise; without a body only the status is known.
fn rejected(status: u16, body: String) -> Result<Value, ServiceError> {
    if body.trim().is_empty() {
        return Err(ServiceError::Transport(format!(
            "Request failed with status code {status}"
        )));
    }
    let body = serde_json::from_str(&body).unwrap_or(Value::String(body));
    Err(ServiceError::Rejected { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:6060");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let service = HttpAnalysisService::new("http://localhost:6060//");
        assert_eq!(service.config().base_url, "http://localhost:6060");
        assert_eq!(service.url("/api/analyze"), "http://localhost:6060/api/analyze");
    }

    #[test]
    fn test_rejected_body_mapping() {
        assert_eq!(
            rejected(400, r#"{"error": "Missing 'code' in request body"}"#.to_string()),
            Err(ServiceError::Rejected {
                status: 400,
                body: json!({ "error": "Missing 'code' in request body" }),
            })
        );
        assert_eq!(
            rejected(502, "Bad Gateway".to_string()),
            Err(ServiceError::Rejected {
                status: 502,
                body: json!("Bad Gateway"),
            })
        );
        assert_eq!(
            rejected(503, "  \n".to_string()),
            Err(ServiceError::Transport(
                "Request failed with status code 503".to_string()
            ))
        );
    }
}
