use super::errors::HistoryError;
use crate::patch::Patch;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable copy of a history: `{ "cursor": n, "entries": [...] }`.
///
/// Deserializing goes through [`HistorySnapshot::from_value`], so a
/// snapshot is never built from data that fails validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct HistorySnapshot {
    pub cursor: usize,
    pub entries: Vec<Patch>,
}

impl HistorySnapshot {
    pub fn to_value(&self) -> Value {
        // only integers and strings, which always serialize
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Validate untrusted history data and build a snapshot from it.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// object shape, cursor type, entries type, then each entry in turn
    /// (object shape before fields), and finally the cursor range.
    pub fn from_value(data: &Value) -> Result<Self, HistoryError> {
        let object = data.as_object().ok_or(HistoryError::InvalidData)?;

        let cursor = object
            .get("cursor")
            .filter(|cursor| cursor.is_number())
            .ok_or(HistoryError::InvalidCursorType)?;

        let raw_entries = object
            .get("entries")
            .and_then(Value::as_array)
            .ok_or(HistoryError::InvalidEntries)?;

        let entries = raw_entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        let len = entries.len();
        let in_range = match cursor.as_u64() {
            Some(int) => usize::try_from(int).ok().filter(|int| *int <= len),
            // range is checked before truncation: 2.5 is past a length of 2
            None => cursor
                .as_f64()
                .filter(|float| *float >= 0.0 && *float <= len as f64)
                .map(|float| float.trunc() as usize),
        };
        let cursor = in_range.ok_or_else(|| HistoryError::CursorOutOfRange {
            cursor: cursor.as_f64().unwrap_or(f64::NAN),
            len,
        })?;

        Ok(Self { cursor, entries })
    }
}

impl TryFrom<&Value> for HistorySnapshot {
    type Error = HistoryError;

    fn try_from(data: &Value) -> Result<Self, Self::Error> {
        Self::from_value(data)
    }
}

impl TryFrom<Value> for HistorySnapshot {
    type Error = HistoryError;

    fn try_from(data: Value) -> Result<Self, Self::Error> {
        Self::from_value(&data)
    }
}

/// A non-negative JSON number as an offset, truncating fractions.
///
/// Integers are read exactly; only fractional values go through `f64`.
fn offset(value: &Value) -> Option<usize> {
    match value.as_u64() {
        Some(int) => usize::try_from(int).ok(),
        None => value
            .as_f64()
            .filter(|float| *float >= 0.0)
            .map(|float| float.trunc() as usize),
    }
}

fn parse_entry(index: usize, entry: &Value) -> Result<Patch, HistoryError> {
    let entry = entry
        .as_object()
        .ok_or(HistoryError::InvalidEntry { index })?;

    let field_error = |field| HistoryError::InvalidEntryField { index, field };

    // Offsets are unsigned; a negative start is as unusable as a string one.
    let start = entry
        .get("start")
        .and_then(offset)
        .ok_or_else(|| field_error("start"))?;
    let old_text = entry
        .get("oldText")
        .and_then(Value::as_str)
        .ok_or_else(|| field_error("oldText"))?;
    let new_text = entry
        .get("newText")
        .and_then(Value::as_str)
        .ok_or_else(|| field_error("newText"))?;

    Ok(Patch::new(start, old_text, new_text))
}
