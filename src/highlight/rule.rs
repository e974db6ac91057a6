use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BracketDirection {
    Opening,
    Closing,
}

impl BracketDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            BracketDirection::Opening => "opening",
            BracketDirection::Closing => "closing",
        }
    }
}

/// Membership of a rule in a named bracket group such as `parens`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BracketRole {
    pub group: String,
    pub direction: BracketDirection,
}

impl BracketRole {
    pub fn opening(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            direction: BracketDirection::Opening,
        }
    }

    pub fn closing(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            direction: BracketDirection::Closing,
        }
    }
}

/// Pattern options, written as flag letters in profiles (`"im"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleFlags {
    /// `i`
    pub case_insensitive: bool,
    /// `m`
    pub multi_line: bool,
    /// `s`
    pub dot_matches_new_line: bool,
    /// `x`
    pub ignore_whitespace: bool,
}

impl RuleFlags {
    /// Parse flag letters, returning the first unknown letter on failure.
    ///
    /// `g` is accepted and ignored: matching is always global.
    pub fn parse(letters: &str) -> Result<Self, char> {
        let mut flags = Self::default();
        for letter in letters.chars() {
            match letter {
                'i' => flags.case_insensitive = true,
                'm' => flags.multi_line = true,
                's' => flags.dot_matches_new_line = true,
                'x' => flags.ignore_whitespace = true,
                'g' => {}
                other => return Err(other),
            }
        }
        Ok(flags)
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            case_insensitive: self.case_insensitive || other.case_insensitive,
            multi_line: self.multi_line || other.multi_line,
            dot_matches_new_line: self.dot_matches_new_line || other.dot_matches_new_line,
            ignore_whitespace: self.ignore_whitespace || other.ignore_whitespace,
        }
    }

    pub(crate) fn configure<'b>(&self, builder: &'b mut RegexBuilder) -> &'b mut RegexBuilder {
        builder
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multi_line)
            .dot_matches_new_line(self.dot_matches_new_line)
            .ignore_whitespace(self.ignore_whitespace)
    }
}

/// One entry of a tokenizer's ordered rule list.
///
/// Rule order is the classification tie-break: a piece matching several
/// rules takes the classification of the earliest one, so more specific
/// patterns belong before more general ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub pattern: String,
    pub flags: RuleFlags,
    pub classification: String,
    pub bracket: Option<BracketRole>,
}

impl ClassificationRule {
    pub fn new(pattern: impl Into<String>, classification: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: RuleFlags::default(),
            classification: classification.into(),
            bracket: None,
        }
    }

    pub fn with_flags(mut self, flags: RuleFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_bracket(mut self, bracket: BracketRole) -> Self {
        self.bracket = Some(bracket);
        self
    }
}
