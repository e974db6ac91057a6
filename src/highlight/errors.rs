use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("tokenizer needs at least one classification rule")]
    EmptyRuleSet,

    #[error("rule {index} has an empty classification")]
    EmptyClassification { index: usize },

    #[error("rule {index} ('{classification}') has an empty pattern")]
    EmptyPattern { index: usize, classification: String },

    #[error("rule {index} ('{classification}') has an invalid pattern: {source}")]
    InvalidPattern {
        index: usize,
        classification: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown pattern flag '{flag}' in rule {index}")]
    UnknownFlag { index: usize, flag: char },

    #[error("rules cannot be combined into one pattern: {0}")]
    Composite(#[source] regex::Error),
}
