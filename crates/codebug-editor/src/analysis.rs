//! Request/response contract with the external analysis service.

use crate::text::SourceText;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Body sent to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    /// The code to analyze.
    #[serde(serialize_with = "serialize_source")]
    pub code: SourceText,
    /// Whether the service should also return a fixed version. Always `false` here.
    pub apply_fix: bool,
}

impl AnalysisRequest {
    /// Build the request for `code` (without fix application).
    pub fn new(code: SourceText) -> Self {
        Self {
            code,
            apply_fix: false,
        }
    }

    /// JSON body for transports.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "code": self.code.as_str(),
            "apply_fix": self.apply_fix,
        })
    }
}

fn serialize_source<S: serde::Serializer>(code: &SourceText, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(code.as_str())
}

/// Identity of one submission. Allocated monotonically starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
/// Errors reported by an [`AnalysisService`] implementation.
pub enum ServiceError {
    #[error("{0}")]
    /// No response was received (connection refused, timeout, malformed response, ...).
    Transport(String),

    #[error("analysis service responded with status {status}")]
    /// The service answered with an error body.
    Rejected {
        /// HTTP-like status code.
        status: u16,
        /// The error body, parsed as JSON when possible, otherwise a JSON string.
        body: Value,
    },
}

/// The external analysis service.
///
/// Calls are blocking; the controller runs each one on its own worker thread.
pub trait AnalysisService: Send + Sync {
    /// Analyze `request` and return the service's structured result.
    fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ServiceError>;
}

/// Why an analysis failed, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisFailure {
    /// The service's own error body.
    Service(Value),
    /// Transport-level description (no response body).
    Transport(String),
}

impl From<ServiceError> for AnalysisFailure {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected { body, .. } => Self::Service(body),
            ServiceError::Transport(message) => Self::Transport(message),
        }
    }
}

/// Final result of one analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The service's result.
    Success(Value),
    /// The failure to display.
    Failure(AnalysisFailure),
}

impl From<Result<Value, ServiceError>> for AnalysisOutcome {
    fn from(result: Result<Value, ServiceError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = AnalysisRequest::new(SourceText::from("print(1)"));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "code": "print(1)", "apply_fix": false })
        );
        assert_eq!(request.to_json(), serde_json::to_value(&request).unwrap());
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"code":"print(1)","apply_fix":false}"#
        );
    }

    #[test]
    fn test_failure_conversion() {
        let outcome: AnalysisOutcome = Err(ServiceError::Rejected {
            status: 400,
            body: json!({ "error": "Missing 'code' in request body" }),
        })
        .into();
        assert_eq!(
            outcome,
            AnalysisOutcome::Failure(AnalysisFailure::Service(
                json!({ "error": "Missing 'code' in request body" })
            ))
        );

        let outcome: AnalysisOutcome = Err(ServiceError::Transport("Network Error".into())).into();
        assert_eq!(
            outcome,
            AnalysisOutcome::Failure(AnalysisFailure::Transport("Network Error".into()))
        );
    }
}
