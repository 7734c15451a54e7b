//! The dual-layer editor: raw editable text with a highlighted overlay kept in lockstep.
//!
//! [`CodeEditor`] is the only mutation path for the buffer. Every text change re-derives the
//! overlay before returning, and every change of the editable layer's scroll offset is
//! mirrored onto the overlay through the [`ScrollSynchronizer`], so the two layers can be
//! painted as one surface at any point between calls.

use crate::overlay::{HighlightOverlay, HighlightingEngine, RenderedOverlay};
use crate::scroll::{ScrollExtent, ScrollOffset, ScrollSynchronizer};
use crate::surface::{CursorCommand, EditCommand, EditorSurface, SurfaceChange};
use crate::text::{SourceText, display_width};

/// Visible size of the editing area (rows / display columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Visible columns.
    pub width: usize,
    /// Visible rows.
    pub height: usize,
}

impl Viewport {
    /// Create a viewport.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Editable surface + highlighted overlay + scroll mirroring.
pub struct CodeEditor {
    surface: EditorSurface,
    overlay: HighlightOverlay,
    sync: ScrollSynchronizer,
    scroll: ScrollOffset,
}

impl CodeEditor {
    /// Create an editor over `text` with an optional highlighting engine.
    pub fn new(text: impl Into<SourceText>, engine: Option<Box<dyn HighlightingEngine>>) -> Self {
        let surface = EditorSurface::new(text);
        let mut overlay = HighlightOverlay::with_engine(engine);
        overlay.refresh(surface.text());
        Self {
            surface,
            overlay,
            sync: ScrollSynchronizer::new(),
            scroll: ScrollOffset::default(),
        }
    }

    /// Create an editor that renders the escaped plain text.
    pub fn plain(text: impl Into<SourceText>) -> Self {
        Self::new(text, None)
    }

    /// The raw buffer.
    pub fn text(&self) -> &SourceText {
        self.surface.text()
    }

    /// The editable layer.
    pub fn surface(&self) -> &EditorSurface {
        &self.surface
    }

    /// The highlighted layer.
    pub fn overlay(&self) -> &HighlightOverlay {
        &self.overlay
    }

    /// The overlay's current rendering.
    pub fn rendered(&self) -> &RenderedOverlay {
        self.overlay.rendered()
    }

    /// Replace the highlighting engine.
    pub fn set_engine(&mut self, engine: Option<Box<dyn HighlightingEngine>>) {
        self.overlay.set_engine(engine);
    }

    /// Subscribe to buffer replacements.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SurfaceChange) + Send + 'static,
    {
        self.surface.subscribe(callback);
    }

    /// Replace the buffer and re-derive the overlay.
    pub fn set_text(&mut self, text: impl Into<SourceText>) -> Option<SurfaceChange> {
        let change = self.surface.set_text(text)?;
        self.overlay.refresh(self.surface.text());
        Some(change)
    }

    /// Apply an edit at the cursor and re-derive the overlay.
    pub fn edit(&mut self, command: EditCommand) -> Option<SurfaceChange> {
        let change = self.surface.edit(command)?;
        self.overlay.refresh(self.surface.text());
        Some(change)
    }

    /// Move the cursor.
    pub fn move_cursor(&mut self, command: CursorCommand) -> bool {
        self.surface.move_cursor(command)
    }

    /// Place the cursor at a character index (clamped to the buffer).
    pub fn set_cursor_char(&mut self, char_index: usize) {
        self.surface.set_cursor_char(char_index);
    }

    /// Scroll offset of the editable layer.
    pub fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    /// Number of scroll events mirrored onto the overlay.
    pub fn scroll_events(&self) -> u64 {
        self.sync.events()
    }

    /// Scroll extents of the editable layer for `viewport`.
    ///
    /// Horizontally one extra column is reachable so a cursor after the longest line stays
    /// visible.
    pub fn scroll_extent(&self, viewport: Viewport) -> ScrollExtent {
        let text = self.surface.text();
        let widest = text
            .split('\n')
            .map(|line| display_width(line.strip_suffix('\r').unwrap_or(line)))
            .max()
            .unwrap_or(0);
        ScrollExtent {
            max_top: text.line_count().saturating_sub(viewport.height),
            max_left: (widest + 1).saturating_sub(viewport.width),
        }
    }

    /// Scroll the editable layer (clamped to its extent) and mirror the result.
    pub fn scroll_to(&mut self, offset: ScrollOffset, viewport: Viewport) -> ScrollOffset {
        let offset = self.scroll_extent(viewport).clamp(offset);
        self.apply_scroll(offset);
        offset
    }

    /// Scroll the editable layer by the smallest amount that keeps the cursor inside
    /// `viewport`. Returns `true` when a scroll event was emitted.
    pub fn ensure_cursor_visible(&mut self, viewport: Viewport) -> bool {
        if viewport.width == 0 || viewport.height == 0 {
            return false;
        }

        let cursor = self.surface.cursor_position();
        let mut next = self.scroll_extent(viewport).clamp(self.scroll);

        if cursor.line < next.top {
            next.top = cursor.line;
        } else if cursor.line >= next.top + viewport.height {
            next.top = cursor.line + 1 - viewport.height;
        }
        if cursor.column < next.left {
            next.left = cursor.column;
        } else if cursor.column >= next.left + viewport.width {
            next.left = cursor.column + 1 - viewport.width;
        }

        if next == self.scroll {
            return false;
        }
        self.apply_scroll(next);
        true
    }

    fn apply_scroll(&mut self, offset: ScrollOffset) {
        self.scroll = offset;
        self.sync.on_scroll(offset, &mut self.overlay);
    }
}

impl Default for CodeEditor {
    fn default() -> Self {
        Self::plain("")
    }
}
