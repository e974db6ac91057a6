use crate::config::schema::{HighlightConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read highlight profile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: not a highlight profile: {source}", origin(.path))]
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("{}: profile '{profile}' is invalid:\n{source}", origin(.path))]
    Validation {
        path: Option<PathBuf>,
        /// `meta.name`, or `unnamed`
        profile: String,
        source: ValidationError,
    },
}

impl ConfigError {
    /// Record the file the profile text came from, unless already known.
    fn located(mut self, file: &Path) -> Self {
        if let ConfigError::Toml { path, .. } | ConfigError::Validation { path, .. } = &mut self {
            path.get_or_insert_with(|| file.to_path_buf());
        }
        self
    }
}

fn origin(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<inline profile>".to_string(),
    }
}

pub fn load_from_str(input: &str) -> Result<HighlightConfig, ConfigError> {
    let config: HighlightConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    if let Err(source) = config.validate() {
        let profile = match config.meta.name.as_str() {
            "" => "unnamed".to_string(),
            name => name.to_string(),
        };
        return Err(ConfigError::Validation {
            path: None,
            profile,
            source,
        });
    }
    tracing::debug!(
        name = %config.meta.name,
        rules = config.rules.len(),
        "loaded highlight profile"
    );
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<HighlightConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.located(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationIssue;
    use crate::highlight::BracketDirection;

    const PROFILE: &str = r#"
[meta]
name = "demo"
history_limit = 50

[[rules]]
classification = "keyword"
pattern = '\b(?:if|then|else)\b'
flags = "i"

[[rules]]
classification = "paren"
pattern = '\('
bracket = { group = "parens", direction = "opening" }

[colors]
keyword = "blue"
"#;

    #[test]
    fn test_load_profile() {
        let config = load_from_str(PROFILE).expect("profile");
        assert_eq!(config.meta.name, "demo");
        assert_eq!(config.history_limit(), 50);
        assert_eq!(config.rules.len(), 2);
        let bracket = config.rules[1].bracket.as_ref().expect("bracket");
        assert_eq!(bracket.group, "parens");
        assert_eq!(bracket.direction, BracketDirection::Opening);
        assert_eq!(config.colors["keyword"], "blue");
    }

    #[test]
    fn test_history_limit_defaults() {
        let config = load_from_str("[[rules]]\nclassification = \"n\"\npattern = '\\d+'\n")
            .expect("profile");
        assert_eq!(config.history_limit(), crate::history::DEFAULT_LIMIT);
    }

    #[test]
    fn test_validation_collects_every_issue() {
        let input = r#"
[meta]
history_limit = 0

[[rules]]
classification = ""
pattern = "a"
flags = "iq"

[colors]
keyword = "chartreuse-ish"
"#;
        match load_from_str(input) {
            Err(ConfigError::Validation { source, .. }) => {
                assert_eq!(
                    source.issues,
                    vec![
                        ValidationIssue::ZeroHistoryLimit,
                        ValidationIssue::MissingField {
                            rule: 0,
                            field: "classification"
                        },
                        ValidationIssue::UnknownFlag { rule: 0, flag: 'q' },
                        ValidationIssue::UnknownColor {
                            classification: "keyword".to_string(),
                            color: "chartreuse-ish".to_string(),
                        },
                    ]
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_profile_is_rejected() {
        assert!(matches!(
            load_from_str(""),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_validation_message_names_profile() {
        let input = "[meta]\nname = \"sparse\"\n";
        let message = load_from_str(input).unwrap_err().to_string();
        assert!(message.starts_with("<inline profile>: profile 'sparse'"), "{message}");
        assert!(message.contains("contains no rules"), "{message}");

        let message = load_from_str("").unwrap_err().to_string();
        assert!(message.contains("profile 'unnamed'"), "{message}");
    }

    #[test]
    fn test_load_from_path_adds_path_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[rules]\n").unwrap();
        let message = load_from_path(&path).unwrap_err().to_string();
        assert!(message.contains("broken.toml"), "{message}");
    }
}
