use crate::highlight::{BracketRole, ClassificationRule, RuleFlags, Tokenizer, TokenizerError};
use crate::history::{EditHistory, DEFAULT_LIMIT};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A highlight profile: ordered rules plus optional presentation hints.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct HighlightConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    /// classification -> color name, used by terminal output
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

impl HighlightConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        if self.meta.history_limit == Some(0) {
            issues.push(ValidationIssue::ZeroHistoryLimit);
        }

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.classification.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule: index,
                    field: "classification",
                });
            }
            if rule.pattern.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule: index,
                    field: "pattern",
                });
            }
            if let Err(flag) = RuleFlags::parse(&rule.flags) {
                issues.push(ValidationIssue::UnknownFlag { rule: index, flag });
            }
            if let Some(bracket) = &rule.bracket {
                if bracket.group.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        rule: index,
                        field: "bracket.group",
                    });
                }
            }
        }

        for (classification, color) in &self.colors {
            if colored::Color::from_str(color).is_err() {
                issues.push(ValidationIssue::UnknownColor {
                    classification: classification.clone(),
                    color: color.clone(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn history_limit(&self) -> usize {
        self.meta.history_limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Empty history sized by `meta.history_limit`.
    pub fn new_history(&self) -> EditHistory {
        EditHistory::with_limit(self.history_limit())
    }

    /// Rules in profile order, ready for [`Tokenizer::new`].
    pub fn classification_rules(&self) -> Result<Vec<ClassificationRule>, TokenizerError> {
        self.rules
            .iter()
            .enumerate()
            .map(|(index, definition)| {
                let flags = RuleFlags::parse(&definition.flags)
                    .map_err(|flag| TokenizerError::UnknownFlag { index, flag })?;
                let mut rule = ClassificationRule::new(&definition.pattern, &definition.classification)
                    .with_flags(flags);
                if let Some(bracket) = &definition.bracket {
                    rule = rule.with_bracket(bracket.clone());
                }
                Ok(rule)
            })
            .collect()
    }

    pub fn build_tokenizer(&self) -> Result<Tokenizer, TokenizerError> {
        Tokenizer::new(self.classification_rules()?)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub history_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub classification: String,
    pub pattern: String,
    /// Flag letters: `i`, `m`, `s`, `x` (`g` is accepted and ignored)
    #[serde(default)]
    pub flags: String,
    #[serde(default)]
    pub bracket: Option<BracketRole>,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRuleList,
    ZeroHistoryLimit,
    MissingField { rule: usize, field: &'static str },
    UnknownFlag { rule: usize, flag: char },
    UnknownColor { classification: String, color: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "highlight profile contains no rules"),
            ValidationIssue::ZeroHistoryLimit => write!(f, "meta.history_limit must be positive"),
            ValidationIssue::MissingField { rule, field } => {
                write!(f, "rule {rule} missing required field '{field}'")
            }
            ValidationIssue::UnknownFlag { rule, flag } => {
                write!(f, "rule {rule} has unknown pattern flag '{flag}'")
            }
            ValidationIssue::UnknownColor {
                classification,
                color,
            } => write!(f, "unknown color '{color}' for classification '{classification}'"),
        }
    }
}
