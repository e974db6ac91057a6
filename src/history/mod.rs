//! Bounded undo/redo log of [`Patch`]es.
//!
//! The log is a flat stack with a redo tail: `cursor` separates applied
//! entries (below it) from undone ones (at or above it). Recording a new
//! patch while entries are undone discards them. Once the log grows past
//! its limit the oldest entries silently age out.

mod errors;
mod snapshot;

pub use errors::HistoryError;
pub use snapshot::HistorySnapshot;

use crate::patch::{Patch, TextBuffer};
use serde_json::Value;

/// Default number of patches kept before eviction starts.
pub const DEFAULT_LIMIT: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditHistory {
    cursor: usize,
    entries: Vec<Patch>,
    limit: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditHistory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// Create an empty history keeping at most `limit` patches.
    ///
    /// A limit of zero is raised to one.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            cursor: 0,
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Patch] {
        &self.entries
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Record `patch` as the newest applied entry.
    ///
    /// Drops the redo tail, then evicts from the front while the log is over
    /// its limit, shifting the cursor down by the number evicted.
    pub fn add(&mut self, patch: Patch) {
        self.entries.truncate(self.cursor);
        self.entries.push(patch);
        self.cursor += 1;
        self.evict();
    }

    /// Step back one entry, reverting it in `buffer`.
    ///
    /// Returns the reverted patch, or `None` when nothing is left to undo.
    pub fn undo<B: TextBuffer + ?Sized>(&mut self, buffer: &mut B) -> Option<&Patch> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        let patch = &self.entries[self.cursor];
        patch.apply_rev(buffer);
        Some(patch)
    }

    /// Re-apply the entry at the cursor to `buffer` and step forward.
    ///
    /// Returns the re-applied patch, or `None` when the redo tail is empty.
    pub fn redo<B: TextBuffer + ?Sized>(&mut self, buffer: &mut B) -> Option<&Patch> {
        let patch = self.entries.get(self.cursor)?;
        patch.apply(buffer);
        self.cursor += 1;
        Some(patch)
    }

    pub fn export(&self) -> HistorySnapshot {
        HistorySnapshot {
            cursor: self.cursor,
            entries: self.entries.clone(),
        }
    }

    /// Replace the history with untrusted `data`.
    ///
    /// The data is validated in full first; on error the history is left
    /// exactly as it was. Imported logs longer than the limit lose their
    /// oldest entries just as [`add`](Self::add) would.
    pub fn import(&mut self, data: &Value) -> Result<(), HistoryError> {
        let snapshot = HistorySnapshot::from_value(data)?;
        self.commit(snapshot);
        Ok(())
    }

    /// Parse `json` and [`import`](Self::import) it.
    pub fn import_str(&mut self, json: &str) -> Result<(), HistoryError> {
        let data: Value = serde_json::from_str(json)?;
        self.import(&data)
    }

    /// Replace the history with an already typed snapshot.
    ///
    /// Only the cursor range needs checking here.
    pub fn import_snapshot(&mut self, snapshot: HistorySnapshot) -> Result<(), HistoryError> {
        if snapshot.cursor > snapshot.entries.len() {
            return Err(HistoryError::CursorOutOfRange {
                cursor: snapshot.cursor as f64,
                len: snapshot.entries.len(),
            });
        }
        self.commit(snapshot);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    fn commit(&mut self, snapshot: HistorySnapshot) {
        tracing::debug!(
            cursor = snapshot.cursor,
            entries = snapshot.entries.len(),
            "imported edit history"
        );
        self.cursor = snapshot.cursor;
        self.entries = snapshot.entries;
        self.evict();
    }

    fn evict(&mut self) {
        if self.entries.len() <= self.limit {
            return;
        }
        let excess = self.entries.len() - self.limit;
        self.entries.drain(..excess);
        self.cursor = self.cursor.saturating_sub(excess);
        tracing::trace!(excess, limit = self.limit, "evicted oldest history entries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Buffer;
    use serde_json::json;

    #[test]
    fn test_add_records_patch() {
        let mut history = EditHistory::new();
        history.add(Patch::insert(4, "id"));
        assert_eq!(
            history.export(),
            HistorySnapshot {
                cursor: 1,
                entries: vec![Patch::insert(4, "id")],
            }
        );
    }

    #[test]
    fn test_add_evicts_oldest_entries() {
        let mut history = EditHistory::with_limit(2);
        for start in [4, 13, 20, 10] {
            history.add(Patch::insert(start, "x"));
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.entries()[0].start, 20);
        assert_eq!(history.entries()[1].start, 10);
    }

    #[test]
    fn test_add_discards_redo_tail() {
        let mut buffer = Buffer::new("");
        let mut history = EditHistory::new();
        for (start, text) in [(0, "a"), (1, "b"), (2, "c")] {
            let patch = Patch::insert(start, text);
            patch.apply(&mut buffer);
            history.add(patch);
        }
        history.undo(&mut buffer);
        history.undo(&mut buffer);
        assert_eq!(buffer.text(), "a");

        history.add(Patch::insert(1, "z"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_and_redo_move_selection() {
        let mut buffer = Buffer::new("let x;");
        let mut history = EditHistory::new();
        let patch = Patch::new(4, "x", "value");
        patch.apply(&mut buffer);
        history.add(patch);

        assert!(history.undo(&mut buffer).is_some());
        assert_eq!(buffer.text(), "let x;");
        assert_eq!(buffer.selection(), (5, 5));

        assert!(history.redo(&mut buffer).is_some());
        assert_eq!(buffer.text(), "let value;");
        assert_eq!(buffer.selection(), (9, 9));
    }

    #[test]
    fn test_navigation_past_ends_is_noop() {
        let mut buffer = Buffer::with_selection("abc", 1, 2);
        let mut history = EditHistory::new();
        assert!(history.undo(&mut buffer).is_none());
        assert!(history.redo(&mut buffer).is_none());
        assert_eq!(buffer, Buffer::with_selection("abc", 1, 2));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_import_failure_keeps_state() {
        let mut history = EditHistory::new();
        history.add(Patch::insert(0, "keep"));
        let before = history.export();

        let result = history.import(&json!({
            "cursor": 4,
            "entries": [
                {"start": 0, "oldText": "", "newText": "a"},
                {"start": 1, "oldText": "", "newText": "b"},
                {"start": 2, "oldText": "", "newText": "c"},
            ],
        }));
        assert!(matches!(result, Err(HistoryError::CursorOutOfRange { .. })));
        assert_eq!(history.export(), before);
    }

    #[test]
    fn test_import_str_rejects_malformed_json() {
        let mut history = EditHistory::new();
        assert!(matches!(
            history.import_str("{cursor: 0"),
            Err(HistoryError::Json(_))
        ));
    }

    #[test]
    fn test_import_snapshot_checks_cursor() {
        let mut history = EditHistory::new();
        let snapshot = HistorySnapshot {
            cursor: 2,
            entries: vec![Patch::insert(0, "a")],
        };
        assert!(history.import_snapshot(snapshot).is_err());
        assert!(history.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut history = EditHistory::with_limit(3);
        history.add(Patch::insert(0, "a"));
        history.reset();
        assert_eq!(history.export(), HistorySnapshot::default());
        assert_eq!(history.limit(), 3);
    }

    #[test]
    fn test_import_trims_to_limit() {
        let mut history = EditHistory::with_limit(2);
        history
            .import(&json!({
                "cursor": 1,
                "entries": [
                    {"start": 0, "oldText": "", "newText": "a"},
                    {"start": 1, "oldText": "", "newText": "b"},
                    {"start": 2, "oldText": "", "newText": "c"},
                ],
            }))
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.entries()[0].new_text, "b");
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        let mut history = EditHistory::with_limit(0);
        history.add(Patch::insert(0, "a"));
        history.add(Patch::insert(1, "b"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 1);
    }
}
