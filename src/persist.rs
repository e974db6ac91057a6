//! Saving and loading history files.
//!
//! Writes are atomic (tempfile in the target directory, fsync, rename) so a
//! crash never leaves a half-written history behind.

use crate::history::{EditHistory, HistoryError, HistorySnapshot, DEFAULT_LIMIT};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid history in {path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: HistoryError,
    },
}

/// Serialize `snapshot` as pretty JSON and write it to `path` atomically.
pub fn save_history(path: &Path, snapshot: &HistorySnapshot) -> Result<(), PersistError> {
    let mut json = serde_json::to_vec_pretty(snapshot)?;
    json.push(b'\n');
    atomic_write(path, &json)
}

/// Read `path` and import it into `history`.
///
/// `history` is untouched when the file cannot be read or does not validate.
/// Entries beyond `history`'s limit are evicted as usual; use
/// [`open_history`] to keep every stored entry.
pub fn load_history(path: &Path, history: &mut EditHistory) -> Result<(), PersistError> {
    let snapshot = read_snapshot(path)?;
    history.import_snapshot(snapshot).map_err(|source| PersistError::Import {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), entries = history.len(), "loaded history");
    Ok(())
}

/// Read `path` into a new history whose limit fits every stored entry.
///
/// The limit is [`DEFAULT_LIMIT`] or the stored entry count, whichever is
/// larger, so rewriting the file never drops entries.
pub fn open_history(path: &Path) -> Result<EditHistory, PersistError> {
    let snapshot = read_snapshot(path)?;
    let mut history = EditHistory::with_limit(snapshot.entries.len().max(DEFAULT_LIMIT));
    history.import_snapshot(snapshot).map_err(|source| PersistError::Import {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        entries = history.len(),
        limit = history.limit(),
        "opened history"
    );
    Ok(history)
}

fn read_snapshot(path: &Path) -> Result<HistorySnapshot, PersistError> {
    let contents = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str::<serde_json::Value>(&contents)
        .map_err(HistoryError::from)
        .and_then(|data| HistorySnapshot::from_value(&data))
        .map_err(|source| PersistError::Import {
            path: path.to_path_buf(),
            source,
        })
}

/// Atomic file write: tempfile + fsync + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), PersistError> {
    let io_error = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_error)?;
    temp.write_all(content).map_err(io_error)?;
    temp.as_file().sync_all().map_err(io_error)?;
    temp.persist(path).map_err(|e| io_error(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Patch;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = EditHistory::new();
        history.add(Patch::insert(0, "a"));
        history.add(Patch::new(1, "", "b"));
        save_history(&path, &history.export()).unwrap();

        let mut loaded = EditHistory::new();
        load_history(&path, &mut loaded).unwrap();
        assert_eq!(loaded.export(), history.export());
    }

    #[test]
    fn test_load_invalid_file_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"{"cursor": 3, "entries": []}"#).unwrap();

        let mut history = EditHistory::new();
        history.add(Patch::insert(0, "keep"));
        let before = history.export();

        let err = load_history(&path, &mut history).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Import {
                source: HistoryError::CursorOutOfRange { .. },
                ..
            }
        ));
        assert_eq!(history.export(), before);
    }

    #[test]
    fn test_open_history_keeps_oversized_files_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut big = EditHistory::with_limit(DEFAULT_LIMIT + 10);
        for start in 0..DEFAULT_LIMIT + 10 {
            big.add(Patch::insert(start, "x"));
        }
        save_history(&path, &big.export()).unwrap();

        let opened = open_history(&path).unwrap();
        assert_eq!(opened.len(), DEFAULT_LIMIT + 10);
        assert_eq!(opened.cursor(), DEFAULT_LIMIT + 10);
        assert_eq!(opened.export(), big.export());

        // a default-sized history evicts the oldest entries instead
        let mut trimmed = EditHistory::new();
        load_history(&path, &mut trimmed).unwrap();
        assert_eq!(trimmed.len(), DEFAULT_LIMIT);
        assert_eq!(trimmed.entries()[0].start, 10);
    }

    #[test]
    fn test_open_history_small_file_uses_default_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"{"cursor": 0, "entries": []}"#).unwrap();
        assert_eq!(open_history(&path).unwrap().limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = EditHistory::new();
        let err = load_history(&dir.path().join("absent.json"), &mut history).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }

    #[test]
    fn test_atomic_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, "original").unwrap();
        atomic_write(&path, b"modified").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "modified");
    }
}
