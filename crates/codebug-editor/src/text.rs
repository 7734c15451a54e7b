//! Immutable source text snapshots and the Unicode helpers used for cursor math.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// An immutable snapshot of the editor buffer.
///
/// Edits never mutate a `SourceText` in place; the surface builds a new string and replaces
/// the snapshot wholesale. Cloning is a reference-count bump, so the overlay and the analysis
/// controller can hold the exact snapshot they were derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceText(Arc<str>);

impl SourceText {
    /// Create a snapshot from any string-like value.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    /// The snapshot as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the text is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Number of lines (`N` newlines => `N + 1` lines, so the empty text has one line).
    pub fn line_count(&self) -> usize {
        self.0.split('\n').count()
    }

    /// Whether two snapshots share the same allocation.
    pub fn ptr_eq(&self, other: &SourceText) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for SourceText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SourceText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Byte offsets at which each line starts.
pub(crate) fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
    starts
}

/// Byte range of `line`, excluding its trailing `\n` (and a preceding `\r`).
pub(crate) fn line_range(text: &str, starts: &[usize], line: usize) -> (usize, usize) {
    let start = starts[line];
    let mut end = starts.get(line + 1).map_or(text.len(), |next| next - 1);
    if end > start && text.as_bytes()[end - 1] == b'\r' {
        end -= 1;
    }
    (start, end)
}

/// Line index containing `offset`.
pub(crate) fn line_of_offset(starts: &[usize], offset: usize) -> usize {
    match starts.binary_search(&offset) {
        Ok(line) => line,
        Err(insert_at) => insert_at - 1,
    }
}

/// Display width of a string slice in terminal cells.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Display width of one grapheme cluster. Tabs count as a single cell; front-ends that expand
/// tabs insert spaces instead. Line terminators take no cells.
pub(crate) fn grapheme_width(grapheme: &str) -> usize {
    match grapheme {
        "\t" => 1,
        "\r" | "\n" | "\r\n" => 0,
        _ => UnicodeWidthStr::width(grapheme),
    }
}

/// The grapheme boundary in `line` whose display column is closest to (and not beyond)
/// `column`. Returned as a byte offset relative to `line`.
pub(crate) fn offset_for_display_column(line: &str, column: usize) -> usize {
    let mut x = 0;
    for (idx, grapheme) in line.grapheme_indices(true) {
        let width = grapheme_width(grapheme);
        if x + width > column {
            return idx;
        }
        x += width;
    }
    line.len()
}

/// Byte offset of the grapheme boundary preceding `offset`.
pub(crate) fn prev_grapheme_boundary(text: &str, offset: usize) -> usize {
    text[..offset]
        .grapheme_indices(true)
        .next_back()
        .map_or(0, |(idx, _)| idx)
}

/// Byte offset of the grapheme boundary following `offset`.
pub(crate) fn next_grapheme_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .graphemes(true)
        .next()
        .map_or(text.len(), |g| offset + g.len())
}
