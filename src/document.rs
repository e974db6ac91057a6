//! A buffer with its history and highlighter wired together.
//!
//! This is the thin orchestration layer: every edit is recorded before it
//! is applied, and highlighting always reads the current selection.

use crate::highlight::{render_tokens, RenderSink, Token, Tokenizer};
use crate::history::{EditHistory, HistoryError};
use crate::patch::{Buffer, Patch, TextBuffer};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct Document {
    buffer: Buffer,
    history: EditHistory,
    tokenizer: Option<Tokenizer>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            buffer: Buffer::new(text),
            history: EditHistory::new(),
            tokenizer: None,
        }
    }

    pub fn with_history(mut self, history: EditHistory) -> Self {
        self.history = history;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn selection(&self) -> (usize, usize) {
        self.buffer.selection()
    }

    /// Move the selection without recording anything.
    pub fn select(&mut self, start: usize, end: usize) {
        self.buffer.set_selection(start, end);
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Record `patch` and apply it to the buffer.
    pub fn edit(&mut self, patch: Patch) {
        patch.apply(&mut self.buffer);
        self.history.add(patch);
    }

    /// Replace the selected text with `text`, as typing or pasting would.
    pub fn replace_selection(&mut self, text: impl Into<String>) {
        let (start, end) = self.normalized_selection();
        let old_text = self.buffer.text()[start..end].to_string();
        self.edit(Patch::new(start, old_text, text));
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.buffer).is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.buffer).is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Import persisted history, discarding it if it does not validate.
    ///
    /// On failure the history is reset and the error is handed back for
    /// reporting; the document stays usable either way.
    pub fn restore_history(&mut self, data: &Value) -> Result<(), HistoryError> {
        self.history.import(data).inspect_err(|error| {
            tracing::debug!(%error, "discarding invalid history");
            self.history.reset();
        })
    }

    /// Tokens for the current text and selection.
    ///
    /// Without a tokenizer the whole text is one unclassified token, so the
    /// tokens always cover the text.
    pub fn highlight(&self) -> Vec<Token<'_>> {
        let text = self.buffer.text();
        match &self.tokenizer {
            Some(tokenizer) => tokenizer.highlight(text, self.buffer.selection()),
            None if text.is_empty() => Vec::new(),
            None => vec![Token::gap(text, 0..text.len())],
        }
    }

    /// Stream the highlighted text into `sink`.
    pub fn render<S: RenderSink + ?Sized>(&self, sink: &mut S) {
        render_tokens(&self.highlight(), sink);
    }

    /// Selection ordered and clamped to char boundaries inside the text.
    fn normalized_selection(&self) -> (usize, usize) {
        let text = self.buffer.text();
        let (a, b) = self.buffer.selection();
        let clamp = |offset: usize| {
            let mut offset = offset.min(text.len());
            while !text.is_char_boundary(offset) {
                offset -= 1;
            }
            offset
        };
        let (a, b) = (clamp(a), clamp(b));
        (a.min(b), a.max(b))
    }
}
