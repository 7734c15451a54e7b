//! The editable layer's text buffer.
//!
//! [`EditorSurface`] is the single source of truth for the raw text. Every edit produces a
//! brand-new [`SourceText`] that replaces the previous one wholesale; there is no incremental
//! diffing. Subscribers are told about each replacement through [`SurfaceChange`] records.

use crate::text::{
    SourceText, display_width, line_of_offset, line_range, line_starts, next_grapheme_boundary,
    offset_for_display_column, prev_grapheme_boundary,
};

/// Logical cursor position. `column` is a display column (wide characters count as two).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based display column.
    pub column: usize,
}

impl Position {
    /// Create a position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Text mutations applied at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Insert text at the cursor and move the cursor past it.
    Insert {
        /// Text to insert.
        text: String,
    },
    /// Insert a line break.
    InsertNewline,
    /// Insert spaces up to the next multiple of [`TAB_WIDTH`].
    InsertTab,
    /// Delete the grapheme before the cursor.
    Backspace,
    /// Delete the grapheme after the cursor.
    DeleteForward,
}

/// Cursor movements. None of these change the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorCommand {
    /// One grapheme left (wrapping to the previous line end).
    Left,
    /// One grapheme right (wrapping to the next line start).
    Right,
    /// One line up, keeping the display column where possible.
    Up,
    /// One line down, keeping the display column where possible.
    Down,
    /// Start of the current line.
    LineStart,
    /// End of the current line.
    LineEnd,
    /// Start of the buffer.
    DocumentStart,
    /// End of the buffer.
    DocumentEnd,
}

/// Soft tab width used by [`EditCommand::InsertTab`].
pub const TAB_WIDTH: usize = 4;

/// Record emitted to subscribers after the buffer was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceChange {
    /// Version before the replacement.
    pub old_version: u64,
    /// Version after the replacement.
    pub new_version: u64,
    /// Character count of the new buffer.
    pub char_count: usize,
}

/// Change notification callback.
pub type SurfaceChangeCallback = Box<dyn FnMut(&SurfaceChange) + Send>;

/// The raw editable text buffer plus its cursor.
pub struct EditorSurface {
    text: SourceText,
    /// Byte offset into `text`, always on a grapheme boundary.
    cursor: usize,
    /// Display column remembered across vertical moves.
    preferred_column: Option<usize>,
    version: u64,
    callbacks: Vec<SurfaceChangeCallback>,
}

impl EditorSurface {
    /// Create a surface holding `text`, with the cursor at the start.
    pub fn new(text: impl Into<SourceText>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            preferred_column: None,
            version: 0,
            callbacks: Vec::new(),
        }
    }

    /// Create an empty surface.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// The current buffer.
    pub fn text(&self) -> &SourceText {
        &self.text
    }

    /// Buffer version, incremented on every content change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Subscribe to buffer replacements.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SurfaceChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Replace the whole buffer.
    ///
    /// Returns `None` when `text` equals the current buffer (no version bump, no notification).
    /// The cursor is kept where it was, clamped to the new buffer and snapped back to a
    /// grapheme boundary.
    pub fn set_text(&mut self, text: impl Into<SourceText>) -> Option<SurfaceChange> {
        let text = text.into();
        if text.as_str() == self.text.as_str() {
            return None;
        }

        let mut cursor = self.cursor.min(text.len());
        while !text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        if cursor < text.len() {
            // Snap onto a grapheme boundary in case the old cursor split a cluster.
            let snapped = prev_grapheme_boundary(&text, next_grapheme_boundary(&text, cursor));
            cursor = snapped;
        }

        Some(self.replace(text, cursor))
    }

    /// Apply an edit at the cursor. Returns the change record when the buffer changed.
    pub fn edit(&mut self, command: EditCommand) -> Option<SurfaceChange> {
        let text = self.text.as_str();
        let cursor = self.cursor;

        let (next, next_cursor) = match command {
            EditCommand::Insert { text: inserted } => {
                if inserted.is_empty() {
                    return None;
                }
                splice(text, cursor, cursor, &inserted)
            }
            EditCommand::InsertNewline => splice(text, cursor, cursor, "\n"),
            EditCommand::InsertTab => {
                let column = self.cursor_position().column;
                let spaces = TAB_WIDTH - column % TAB_WIDTH;
                splice(text, cursor, cursor, &" ".repeat(spaces))
            }
            EditCommand::Backspace => {
                if cursor == 0 {
                    return None;
                }
                let start = prev_grapheme_boundary(text, cursor);
                splice(text, start, cursor, "")
            }
            EditCommand::DeleteForward => {
                if cursor >= text.len() {
                    return None;
                }
                let end = next_grapheme_boundary(text, cursor);
                splice(text, cursor, end, "")
            }
        };

        self.preferred_column = None;
        Some(self.replace(SourceText::from(next), next_cursor))
    }

    /// Move the cursor. Returns `true` when the cursor moved.
    pub fn move_cursor(&mut self, command: CursorCommand) -> bool {
        let text = self.text.as_str();
        let starts = line_starts(text);
        let line = line_of_offset(&starts, self.cursor);
        let (line_start, line_end) = line_range(text, &starts, line);

        let target = match command {
            CursorCommand::Left => prev_grapheme_boundary(text, self.cursor),
            CursorCommand::Right => {
                if self.cursor == line_end && line + 1 < starts.len() {
                    starts[line + 1]
                } else {
                    next_grapheme_boundary(text, self.cursor)
                }
            }
            CursorCommand::Up | CursorCommand::Down => {
                let column = self
                    .preferred_column
                    .unwrap_or_else(|| display_width(&text[line_start..self.cursor]));
                let target_line = match command {
                    CursorCommand::Up if line > 0 => line - 1,
                    CursorCommand::Down if line + 1 < starts.len() => line + 1,
                    _ => return false,
                };
                let (start, end) = line_range(text, &starts, target_line);
                let moved = start + offset_for_display_column(&text[start..end], column);
                self.cursor = moved;
                self.preferred_column = Some(column);
                return true;
            }
            CursorCommand::LineStart => line_start,
            CursorCommand::LineEnd => line_end,
            CursorCommand::DocumentStart => 0,
            CursorCommand::DocumentEnd => text.len(),
        };

        self.preferred_column = None;
        if target == self.cursor {
            return false;
        }
        self.cursor = target;
        true
    }

    /// Place the cursor at a character index (clamped to the buffer).
    pub fn set_cursor_char(&mut self, char_index: usize) {
        let offset = self
            .text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(idx, _)| idx);
        self.cursor = offset;
        self.preferred_column = None;
    }

    /// Cursor as a byte offset into [`Self::text`].
    pub fn cursor_offset(&self) -> usize {
        self.cursor
    }

    /// Cursor as a line / display column pair.
    pub fn cursor_position(&self) -> Position {
        let text = self.text.as_str();
        let starts = line_starts(text);
        let line = line_of_offset(&starts, self.cursor);
        let column = display_width(&text[starts[line]..self.cursor]);
        Position::new(line, column)
    }

    fn replace(&mut self, text: SourceText, cursor: usize) -> SurfaceChange {
        let change = SurfaceChange {
            old_version: self.version,
            new_version: self.version + 1,
            char_count: text.chars().count(),
        };
        self.text = text;
        self.cursor = cursor;
        self.version = change.new_version;

        tracing::trace!(
            version = change.new_version,
            chars = change.char_count,
            "surface text replaced"
        );
        for callback in &mut self.callbacks {
            callback(&change);
        }
        change
    }
}

impl Default for EditorSurface {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build `text` with `start..end` replaced by `inserted`; returns the new text and the byte
/// offset right after the inserted part.
fn splice(text: &str, start: usize, end: usize, inserted: &str) -> (String, usize) {
    let mut next = String::with_capacity(text.len() - (end - start) + inserted.len());
    next.push_str(&text[..start]);
    next.push_str(inserted);
    next.push_str(&text[end..]);
    (next, start + inserted.len())
}
