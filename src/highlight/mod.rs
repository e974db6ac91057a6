//! Regex tokenizer with cursor-driven bracket pairing.
//!
//! The whole buffer is rescanned on every call; there is no incremental
//! state carried between passes.

mod brackets;
mod errors;
mod render;
mod rule;
mod tokenizer;

pub use errors::TokenizerError;
pub use render::{render_tokens, Marker, RenderSink, RenderStream, RenderUnit};
pub use rule::{BracketDirection, BracketRole, ClassificationRule, RuleFlags};
pub use tokenizer::{Token, Tokenizer};
