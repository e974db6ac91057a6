//! Patchpad: edit history and highlighting for text editors
//!
//! Two small engines that sit underneath an editor surface:
//!
//! - [`EditHistory`]: a bounded log of reversible [`Patch`]es with undo,
//!   redo, and a validated JSON import/export format.
//! - [`Tokenizer`]: a regex classifier that splits a buffer into
//!   [`Token`]s and flags the bracket pair touching the cursor.
//!
//! # Architecture
//!
//! Every edit is a single primitive, [`Patch`]: replace a run of text at a
//! byte offset. The history only stores patches and the buffer only ever
//! changes through [`Patch::apply`] / [`Patch::apply_rev`], which also
//! collapse the selection after the inserted text. Highlighting is a pure
//! function of text and selection; nothing is cached between passes.
//!
//! # Example
//!
//! ```
//! use patchpad::{BracketRole, ClassificationRule, Document, Patch, Tokenizer};
//!
//! let tokenizer = Tokenizer::new(vec![
//!     ClassificationRule::new(r"\bfn\b", "keyword"),
//!     ClassificationRule::new(r"\(", "paren").with_bracket(BracketRole::opening("parens")),
//!     ClassificationRule::new(r"\)", "paren").with_bracket(BracketRole::closing("parens")),
//! ])?;
//!
//! let mut doc = Document::new("fn main() {}").with_tokenizer(tokenizer);
//! doc.edit(Patch::new(3, "main", "run"));
//! assert_eq!(doc.text(), "fn run() {}");
//!
//! doc.select(6, 6);
//! let selected = doc.highlight().iter().filter(|t| t.selected_bracket).count();
//! assert_eq!(selected, 2);
//!
//! doc.undo();
//! assert_eq!(doc.text(), "fn main() {}");
//! # Ok::<(), patchpad::TokenizerError>(())
//! ```

pub mod config;
pub mod document;
pub mod highlight;
pub mod history;
pub mod logging;
pub mod patch;
pub mod persist;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, HighlightConfig};
pub use document::Document;
pub use highlight::{
    render_tokens, BracketDirection, BracketRole, ClassificationRule, Marker, RenderSink,
    RenderStream, RenderUnit, RuleFlags, Token, Tokenizer, TokenizerError,
};
pub use history::{EditHistory, HistoryError, HistorySnapshot, DEFAULT_LIMIT};
pub use patch::{Buffer, Patch, TextBuffer};
pub use persist::{load_history, open_history, save_history, PersistError};
