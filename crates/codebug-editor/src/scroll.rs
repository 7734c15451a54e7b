//! Scroll mirroring from the editable layer onto the overlay.

use crate::overlay::HighlightOverlay;

/// Scroll offsets of a layer. In a terminal front-end `top` is in rows and `left` is in
/// display columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOffset {
    /// Vertical offset.
    pub top: usize,
    /// Horizontal offset.
    pub left: usize,
}

impl ScrollOffset {
    /// Create an offset pair.
    pub fn new(top: usize, left: usize) -> Self {
        Self { top, left }
    }
}

/// Maximum scroll offsets of the editable layer for a given content and viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollExtent {
    /// Largest valid `top`.
    pub max_top: usize,
    /// Largest valid `left`.
    pub max_left: usize,
}

impl ScrollExtent {
    /// Clamp `offset` into this extent.
    pub fn clamp(&self, offset: ScrollOffset) -> ScrollOffset {
        ScrollOffset {
            top: offset.top.min(self.max_top),
            left: offset.left.min(self.max_left),
        }
    }
}

/// Copies the editable layer's scroll offset onto the overlay, exactly, on every scroll event.
///
/// Mirroring is one-directional; the overlay has no scroll state it could push back.
#[derive(Debug, Default)]
pub struct ScrollSynchronizer {
    events: u64,
}

impl ScrollSynchronizer {
    /// Create a synchronizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a scroll event of the editable layer.
    pub fn on_scroll(&mut self, editable: ScrollOffset, overlay: &mut HighlightOverlay) {
        self.events += 1;
        overlay.set_scroll_offset(editable);
        tracing::trace!(top = editable.top, left = editable.left, "overlay scroll mirrored");
    }

    /// Number of scroll events handled so far.
    pub fn events(&self) -> u64 {
        self.events
    }
}
