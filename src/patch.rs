use serde::{Deserialize, Serialize};

/// The fundamental history primitive: a reversible span replacement.
///
/// Applying a patch replaces the `old_text.len()` bytes starting at `start`
/// with `new_text`. The inverse replaces `new_text.len()` bytes at `start`
/// with `old_text`. Offsets are UTF-8 byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    /// Byte offset where the replaced run begins
    pub start: usize,
    /// Text present before the edit
    pub old_text: String,
    /// Text present after the edit
    pub new_text: String,
}

impl Patch {
    pub fn new(start: usize, old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            start,
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }

    /// Pure insertion at `start`.
    pub fn insert(start: usize, text: impl Into<String>) -> Self {
        Self::new(start, String::new(), text)
    }

    /// The patch that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            start: self.start,
            old_text: self.new_text.clone(),
            new_text: self.old_text.clone(),
        }
    }

    /// Check whether `text` currently holds `old_text` at `start`.
    ///
    /// Application never verifies; callers that need a before-text check
    /// before recording a patch use this.
    pub fn matches(&self, text: &str) -> bool {
        self.start
            .checked_add(self.old_text.len())
            .and_then(|end| text.get(self.start..end))
            .is_some_and(|current| current == self.old_text)
    }

    /// Apply forward: `old_text` at `start` becomes `new_text`.
    ///
    /// The selection collapses to the offset just past the inserted text.
    pub fn apply<B: TextBuffer + ?Sized>(&self, buffer: &mut B) {
        replace_span(buffer, self.start, self.old_text.len(), &self.new_text);
    }

    /// Apply in reverse: `new_text` at `start` becomes `old_text`.
    ///
    /// The selection collapses to the offset just past the re-inserted text.
    pub fn apply_rev<B: TextBuffer + ?Sized>(&self, buffer: &mut B) {
        replace_span(buffer, self.start, self.new_text.len(), &self.old_text);
    }
}

/// Text plus a selection range, owned by whoever drives the editor.
///
/// Writing the text never moves the selection; patch application sets the
/// selection explicitly afterwards.
pub trait TextBuffer {
    fn text(&self) -> &str;

    fn set_text(&mut self, text: String);

    /// `(start, end)` byte offsets of the selection.
    fn selection(&self) -> (usize, usize);

    fn set_selection(&mut self, start: usize, end: usize);
}

/// Plain in-memory [`TextBuffer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    text: String,
    selection_start: usize,
    selection_end: usize,
}

impl Buffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection_start: 0,
            selection_end: 0,
        }
    }

    pub fn with_selection(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            selection_start: start,
            selection_end: end,
        }
    }
}

impl TextBuffer for Buffer {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }

    fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    fn set_selection(&mut self, start: usize, end: usize) {
        self.selection_start = start;
        self.selection_end = end;
    }
}

/// Replace `remove_len` bytes at `start` with `insert`, then collapse the
/// selection after the insertion.
///
/// Out-of-range offsets clamp to the text end and split code points snap
/// back to the previous char boundary, so this never panics.
fn replace_span<B: TextBuffer + ?Sized>(buffer: &mut B, start: usize, remove_len: usize, insert: &str) {
    let text = buffer.text();
    let start = floor_char_boundary(text, start);
    let end = floor_char_boundary(text, start.saturating_add(remove_len)).max(start);

    let mut next = String::with_capacity(text.len() - (end - start) + insert.len());
    next.push_str(&text[..start]);
    next.push_str(insert);
    next.push_str(&text[end..]);

    buffer.set_text(next);
    let caret = start + insert.len();
    buffer.set_selection(caret, caret);
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
