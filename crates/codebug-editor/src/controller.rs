//! Analysis request lifecycle.
//!
//! ```text
//! Idle ──analyze──▶ Pending ──resolve──▶ Resolved(outcome)
//!  ▲                  │                      │
//!  └──────clear───────┴────────clear─────────┘
//! ```
//!
//! Submissions run on worker threads and report back over a channel. The UI loop calls
//! [`AnalysisController::poll`] to apply completions; only a completion whose [`RequestId`]
//! matches the pending request may change the state, everything else is stale and dropped.

use crate::analysis::{
    AnalysisFailure, AnalysisOutcome, AnalysisRequest, AnalysisService, RequestId, ServiceError,
};
use crate::text::SourceText;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use thiserror::Error;

/// Controller state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiState {
    /// Nothing submitted, or cleared.
    #[default]
    Idle,
    /// Waiting for `request`.
    Pending {
        /// The request in flight.
        request: RequestId,
    },
    /// `request` finished with `outcome`.
    Resolved {
        /// The request that produced `outcome`.
        request: RequestId,
        /// Success or failure.
        outcome: AnalysisOutcome,
    },
}

impl UiState {
    /// Whether a request is pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// The stored outcome, if resolved.
    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        match self {
            Self::Resolved { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
/// Why [`AnalysisController::analyze`] refused a submission.
pub enum SubmitError {
    #[error("request {0} is still pending")]
    /// Another request is in flight.
    Busy(RequestId),

    #[error("nothing to analyze")]
    /// The text is empty or whitespace-only.
    EmptySource,
}

/// A finished service call, tagged with the request it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The request this completion answers.
    pub request: RequestId,
    /// Result of the call.
    pub outcome: AnalysisOutcome,
}

/// Result of one [`AnalysisController::poll`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollSummary {
    /// Completions that changed the state.
    pub applied: usize,
    /// Completions dropped as stale.
    pub stale: usize,
}

impl PollSummary {
    /// Whether anything arrived.
    pub fn is_empty(&self) -> bool {
        self.applied == 0 && self.stale == 0
    }
}

/// Owns the request lifecycle and the only mutable copy of [`UiState`].
pub struct AnalysisController {
    service: Arc<dyn AnalysisService>,
    state: UiState,
    next_id: u64,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl AnalysisController {
    /// Create a controller talking to `service`.
    pub fn new(service: Arc<dyn AnalysisService>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            state: UiState::Idle,
            next_id: 1,
            tx,
            rx,
        }
    }

    /// Current state.
    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Submit `code` for analysis.
    ///
    /// Refused while a request is pending, and for blank text. On success the state is
    /// `Pending` and the service call runs on a worker thread.
    pub fn analyze(&mut self, code: &SourceText) -> Result<RequestId, SubmitError> {
        if let UiState::Pending { request } = self.state {
            tracing::debug!(%request, "analyze ignored, request still pending");
            return Err(SubmitError::Busy(request));
        }
        if code.is_blank() {
            return Err(SubmitError::EmptySource);
        }

        let request = RequestId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.state = UiState::Pending { request };
        tracing::debug!(%request, bytes = code.len(), "analysis submitted");

        let body = AnalysisRequest::new(code.clone());
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("analysis-{}", request.0))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| service.analyze(&body)))
                    .unwrap_or_else(|_| {
                        Err(ServiceError::Transport("analysis service panicked".to_string()))
                    });
                // The controller may be gone; nothing left to notify then.
                let _ = tx.send(Completion {
                    request,
                    outcome: AnalysisOutcome::from(result),
                });
            });

        // Without a worker the request fails through the normal completion path.
        if let Err(err) = spawned {
            tracing::warn!(%request, %err, "failed to start analysis worker");
            let _ = self.tx.send(Completion {
                request,
                outcome: AnalysisOutcome::Failure(AnalysisFailure::Transport(format!(
                    "failed to start analysis: {err}"
                ))),
            });
        }

        Ok(request)
    }

    /// Apply a completion if it answers the pending request. Returns `false` for stale
    /// completions, which leave the state untouched.
    pub fn resolve(&mut self, completion: Completion) -> bool {
        let pending = match self.state {
            UiState::Pending { request } => Some(request),
            _ => None,
        };
        if pending != Some(completion.request) {
            tracing::debug!(request = %completion.request, "dropping stale analysis response");
            return false;
        }

        tracing::debug!(
            request = %completion.request,
            success = matches!(completion.outcome, AnalysisOutcome::Success(_)),
            "analysis resolved"
        );
        self.state = UiState::Resolved {
            request: completion.request,
            outcome: completion.outcome,
        };
        true
    }

    /// Drain finished calls without blocking and apply them.
    pub fn poll(&mut self) -> PollSummary {
        let mut summary = PollSummary::default();
        while let Ok(completion) = self.rx.try_recv() {
            if self.resolve(completion) {
                summary.applied += 1;
            } else {
                summary.stale += 1;
            }
        }
        summary
    }

    /// Reset to `Idle` from any state. An in-flight call keeps running; its response will be
    /// dropped as stale.
    pub fn clear(&mut self) {
        if self.state != UiState::Idle {
            tracing::debug!("analysis state cleared");
        }
        self.state = UiState::Idle;
    }
}
