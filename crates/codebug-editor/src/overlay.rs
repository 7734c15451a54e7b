//! The read-only highlighted layer drawn over the editable text.
//!
//! The overlay never holds text of its own: every [`RenderedOverlay`] is derived from the
//! [`SourceText`] snapshot it was given, either through a pluggable [`HighlightingEngine`] or
//! through the escaped plain-text fallback. Engine failures (including panics) are recovered
//! here and never surface as errors.

use crate::scroll::ScrollOffset;
use crate::text::SourceText;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// What the overlay renders for an empty buffer, so the block keeps one line of height.
pub const EMPTY_PLACEHOLDER: &str = " ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors a [`HighlightingEngine`] may report. The overlay treats all of them the same way.
pub enum HighlightError {
    #[error("highlighting engine is unavailable")]
    /// The engine cannot run right now (missing grammar, not loaded yet, ...).
    Unavailable,

    #[error("highlighting failed: {0}")]
    /// The engine ran and failed.
    Failed(String),
}

/// A capability that turns raw text into highlighted markup.
///
/// The markup must be HTML-like: text content escaped for `&`, `<`, `>`, optionally wrapped in
/// `<span class="...">` elements. [`crate::markup::parse_markup`] reads it back.
pub trait HighlightingEngine: Send {
    /// Short engine name, used for diagnostics.
    fn name(&self) -> &str;

    /// Render `source` as highlighted markup.
    fn highlight(&self, source: &str) -> Result<String, HighlightError>;
}

/// Which path produced a [`RenderedOverlay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOrigin {
    /// The highlighting engine succeeded.
    Engine,
    /// No engine, or the engine failed; the text was escaped verbatim.
    Fallback,
}

/// The overlay's rendered content together with the snapshot it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOverlay {
    /// Rendered markup.
    pub markup: String,
    /// The exact snapshot the markup was derived from.
    pub source: SourceText,
    /// Engine or fallback.
    pub origin: RenderOrigin,
}

/// Escape exactly `&`, `<` and `>`. Quotes and everything else pass through untouched.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The highlighted layer.
pub struct HighlightOverlay {
    engine: Option<Box<dyn HighlightingEngine>>,
    rendered: RenderedOverlay,
    scroll: ScrollOffset,
}

impl HighlightOverlay {
    /// An overlay that always uses the escaped plain-text rendering.
    pub fn plain() -> Self {
        Self::with_engine(None)
    }

    /// An overlay using `engine` when present.
    pub fn with_engine(engine: Option<Box<dyn HighlightingEngine>>) -> Self {
        let source = SourceText::default();
        let rendered = derive(engine.as_deref(), &source);
        Self {
            engine,
            rendered,
            scroll: ScrollOffset::default(),
        }
    }

    /// Swap the engine and re-derive from the current snapshot.
    pub fn set_engine(&mut self, engine: Option<Box<dyn HighlightingEngine>>) {
        self.engine = engine;
        let source = self.rendered.source.clone();
        self.refresh(&source);
    }

    /// Name of the injected engine, if any.
    pub fn engine_name(&self) -> Option<&str> {
        self.engine.as_deref().map(|engine| engine.name())
    }

    /// Re-derive the rendering from `source`. Synchronous; never fails.
    pub fn refresh(&mut self, source: &SourceText) -> &RenderedOverlay {
        self.rendered = derive(self.engine.as_deref(), source);
        &self.rendered
    }

    /// The current rendering.
    pub fn rendered(&self) -> &RenderedOverlay {
        &self.rendered
    }

    /// Overlay scroll offset. Only the scroll synchronizer writes it.
    pub fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    pub(crate) fn set_scroll_offset(&mut self, offset: ScrollOffset) {
        self.scroll = offset;
    }
}

impl Default for HighlightOverlay {
    fn default() -> Self {
        Self::plain()
    }
}

fn derive(engine: Option<&dyn HighlightingEngine>, source: &SourceText) -> RenderedOverlay {
    let input = if source.is_empty() {
        EMPTY_PLACEHOLDER
    } else {
        source.as_str()
    };

    let highlighted = engine.and_then(|engine| {
        let result = panic::catch_unwind(AssertUnwindSafe(|| engine.highlight(input)))
            .unwrap_or_else(|_| Err(HighlightError::Failed("engine panicked".to_string())));
        match result {
            Ok(markup) => Some(markup),
            Err(err) => {
                tracing::debug!(engine = engine.name(), %err, "falling back to plain rendering");
                None
            }
        }
    });

    match highlighted {
        Some(markup) => RenderedOverlay {
            markup,
            source: source.clone(),
            origin: RenderOrigin::Engine,
        },
        None => RenderedOverlay {
            markup: escape_html(input),
            source: source.clone(),
            origin: RenderOrigin::Fallback,
        },
    }
}
