#![warn(missing_docs)]
//! Codebug Editor - Headless Code-Editing Surface
//!
//! # Overview
//!
//! `codebug-editor` is the headless core of a code-editing surface that submits source text to an
//! external analysis service. It does not draw anything: front-ends paint the raw editable layer
//! and the highlighted overlay from the state exposed here, and render the analysis result from
//! a [`Presentation`].
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ResultPresenter (pure state → display)     │  ← Rendering Data
//! ├─────────────────────────────────────────────┤
//! │  AnalysisController (Idle/Pending/Resolved) │  ← Request Lifecycle
//! ├─────────────────────────────────────────────┤
//! │  CodeEditor (surface + overlay + scroll)    │  ← Public Editing API
//! ├─────────────────────────────────────────────┤
//! │  HighlightOverlay / ScrollSynchronizer      │  ← Derived Layer
//! ├─────────────────────────────────────────────┤
//! │  EditorSurface (SourceText snapshots)       │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use codebug_editor::{CodeEditor, EditCommand, RenderOrigin};
//!
//! let mut editor = CodeEditor::plain("");
//! editor.edit(EditCommand::Insert { text: "if a < b: pass".to_string() });
//!
//! // Without a highlighting engine the overlay is the escaped text.
//! assert_eq!(editor.rendered().markup, "if a &lt; b: pass");
//! assert_eq!(editor.rendered().origin, RenderOrigin::Fallback);
//! ```
//!
//! ## Submitting for analysis
//!
//! ```rust
//! use codebug_editor::{
//!     AnalysisController, AnalysisRequest, AnalysisService, ServiceError, SourceText, UiState,
//! };
//! use serde_json::{Value, json};
//! use std::sync::Arc;
//!
//! struct Echo;
//!
//! impl AnalysisService for Echo {
//!     fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ServiceError> {
//!         Ok(json!({ "length": request.code.len() }))
//!     }
//! }
//!
//! let mut controller = AnalysisController::new(Arc::new(Echo));
//! controller.analyze(&SourceText::from("x = 1")).unwrap();
//! assert!(controller.state().is_pending());
//! // A UI loop would now call `controller.poll()` once per frame.
//! ```
//!
//! # Module Description
//!
//! - [`text`] - Immutable [`SourceText`] snapshots and Unicode width helpers
//! - [`surface`] - The editable text buffer and its cursor
//! - [`overlay`] - Highlighted layer, [`HighlightingEngine`] capability and escaped fallback
//! - [`markup`] - Reading overlay markup back into styled spans
//! - [`scroll`] - Scroll mirroring from the editable layer onto the overlay
//! - [`editor`] - The composite that keeps both layers aligned
//! - [`analysis`] - Analysis service contract
//! - [`controller`] - Request lifecycle state machine
//! - [`presenter`] - State to display rendering

pub mod analysis;
pub mod controller;
pub mod editor;
pub mod markup;
pub mod overlay;
pub mod presenter;
pub mod scroll;
pub mod surface;
pub mod text;

pub use analysis::{
    AnalysisFailure, AnalysisOutcome, AnalysisRequest, AnalysisService, RequestId, ServiceError,
};
pub use controller::{AnalysisController, Completion, PollSummary, SubmitError, UiState};
pub use editor::{CodeEditor, Viewport};
pub use markup::{MarkupLine, MarkupSpan, parse_markup, plain_text};
pub use overlay::{
    EMPTY_PLACEHOLDER, HighlightError, HighlightOverlay, HighlightingEngine, RenderOrigin,
    RenderedOverlay, escape_html,
};
pub use presenter::{
    BUSY_LABEL, EMPTY_NOTICE, Presentation, SUBMIT_LABEL, failure_value, present, submit_enabled,
    submit_label,
};
pub use scroll::{ScrollExtent, ScrollOffset, ScrollSynchronizer};
pub use surface::{
    CursorCommand, EditCommand, EditorSurface, Position, SurfaceChange, SurfaceChangeCallback,
    TAB_WIDTH,
};
pub use text::{SourceText, display_width};
