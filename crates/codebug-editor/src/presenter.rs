//! Pure rendering of [`UiState`] into what the result area shows.

use crate::analysis::{AnalysisFailure, AnalysisOutcome};
use crate::controller::UiState;
use crate::text::SourceText;
use serde_json::{Value, json};

/// Shown before any analysis, or after a clear.
pub const EMPTY_NOTICE: &str = "No results yet, analyze some code.";
/// Shown while a request is pending.
pub const BUSY_LABEL: &str = "Analyzing…";
/// Submit trigger label when idle or resolved.
pub const SUBMIT_LABEL: &str = "Analyze code";

/// What the result area displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// No outcome to show.
    Empty {
        /// Empty-state notice.
        notice: &'static str,
    },
    /// A request is pending.
    Busy {
        /// Busy indicator text.
        label: &'static str,
    },
    /// Indented serialization of the service result.
    Success {
        /// Pretty-printed JSON.
        body: String,
    },
    /// Indented serialization of the error.
    Failure {
        /// Pretty-printed JSON.
        body: String,
    },
}

impl Presentation {
    /// The text to display, whatever the variant.
    pub fn text(&self) -> &str {
        match self {
            Self::Empty { notice } => notice,
            Self::Busy { label } => label,
            Self::Success { body } | Self::Failure { body } => body,
        }
    }
}

/// Render `state`.
pub fn present(state: &UiState) -> Presentation {
    match state {
        UiState::Idle => Presentation::Empty {
            notice: EMPTY_NOTICE,
        },
        UiState::Pending { .. } => Presentation::Busy { label: BUSY_LABEL },
        UiState::Resolved { outcome, .. } => match outcome {
            AnalysisOutcome::Success(value) => Presentation::Success {
                body: pretty(value),
            },
            AnalysisOutcome::Failure(failure) => Presentation::Failure {
                body: pretty(&failure_value(failure)),
            },
        },
    }
}

/// The structured error to display. Objects pass through verbatim; anything else is wrapped
/// as `{"error": ...}`.
pub fn failure_value(failure: &AnalysisFailure) -> Value {
    match failure {
        AnalysisFailure::Service(body @ Value::Object(_)) => body.clone(),
        AnalysisFailure::Service(body) => json!({ "error": body }),
        AnalysisFailure::Transport(message) => json!({ "error": message }),
    }
}

/// Whether the submit trigger is enabled: not pending and the text is not blank.
pub fn submit_enabled(state: &UiState, text: &SourceText) -> bool {
    !state.is_pending() && !text.is_blank()
}

/// Label of the submit trigger.
pub fn submit_label(state: &UiState) -> &'static str {
    if state.is_pending() {
        BUSY_LABEL
    } else {
        SUBMIT_LABEL
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
