use super::brackets::BracketMatcher;
use super::errors::TokenizerError;
use super::render::{render_tokens, Marker, RenderSink};
use super::rule::{BracketRole, ClassificationRule, RuleFlags};
use regex::{Captures, Regex, RegexBuilder};
use serde::Serialize;
use std::ops::Range;

/// A contiguous run of highlighted text.
///
/// A full highlight pass yields tokens that partition the input: gaps
/// between rule matches come out as unclassified tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Byte range of `text` in the source
    pub span: Range<usize>,
    pub classification: Option<&'a str>,
    pub bracket: Option<&'a BracketRole>,
    pub selected_bracket: bool,
}

impl<'a> Token<'a> {
    pub(crate) fn gap(source: &'a str, span: Range<usize>) -> Self {
        Self {
            text: &source[span.clone()],
            span,
            classification: None,
            bracket: None,
            selected_bracket: false,
        }
    }

    pub fn marker(&self) -> Option<Marker> {
        self.selected_bracket.then_some(Marker::SelectedBracket)
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: ClassificationRule,
    /// The rule's pattern anchored to a whole piece
    exact: Regex,
    /// Index of the capture group wrapping this rule in the composite
    group: usize,
}

/// Regex-driven classifier over an ordered rule list.
///
/// All rules are compiled into one alternation, each wrapped in its own
/// capture group, with the union of every rule's flags. A highlight pass
/// scans that composite left to right; each match is classified by the
/// first rule, in declaration order, that matches the whole piece.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    composite: Regex,
    rules: Vec<CompiledRule>,
}

impl Tokenizer {
    pub fn new(rules: Vec<ClassificationRule>) -> Result<Self, TokenizerError> {
        if rules.is_empty() {
            return Err(TokenizerError::EmptyRuleSet);
        }

        let flags = rules
            .iter()
            .fold(RuleFlags::default(), |flags, rule| flags.union(rule.flags));
        let mut compiled = Vec::with_capacity(rules.len());
        let mut alternatives = Vec::with_capacity(rules.len());
        let mut group = 1;

        for (index, rule) in rules.into_iter().enumerate() {
            if rule.classification.trim().is_empty() {
                return Err(TokenizerError::EmptyClassification { index });
            }
            if rule.pattern.is_empty() {
                return Err(TokenizerError::EmptyPattern {
                    index,
                    classification: rule.classification,
                });
            }

            let invalid = |source| TokenizerError::InvalidPattern {
                index,
                classification: rule.classification.clone(),
                source,
            };
            // Compile the bare pattern first so an unbalanced `)` cannot
            // hide inside the wrapping groups.
            rule.flags
                .configure(&mut RegexBuilder::new(&rule.pattern))
                .build()
                .map_err(invalid)?;
            let exact = rule
                .flags
                .configure(&mut RegexBuilder::new(&format!(
                    r"\A(?:{}{})\z",
                    rule.pattern,
                    line_end(rule.flags)
                )))
                .build()
                .map_err(invalid)?;

            alternatives.push(format!("({}{})", rule.pattern, line_end(flags)));
            let captures = exact.captures_len();
            compiled.push(CompiledRule { rule, exact, group });
            // the wrapper plus the rule's own groups
            group += captures;
        }

        let composite = flags
            .configure(&mut RegexBuilder::new(&alternatives.join("|")))
            .build()
            .map_err(TokenizerError::Composite)?;

        tracing::debug!(
            rules = compiled.len(),
            groups = composite.captures_len(),
            "compiled tokenizer"
        );

        Ok(Self {
            composite,
            rules: compiled,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &ClassificationRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Split `text` into tokens, flagging the bracket pair at `selection`.
    ///
    /// `selection` is `(start, end)` in bytes. Concatenating the returned
    /// token texts reproduces `text` exactly.
    pub fn highlight<'a>(&'a self, text: &'a str, selection: (usize, usize)) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut brackets = BracketMatcher::new(selection);
        let mut index = 0;

        for captures in self.composite.captures_iter(text) {
            let Some(piece) = captures.get(0) else {
                continue;
            };
            if piece.is_empty() {
                continue;
            }
            if piece.start() > index {
                tokens.push(Token::gap(text, index..piece.start()));
            }

            let span = piece.range();
            let rule = self.classify(piece.as_str(), &captures);
            let position = tokens.len();
            tokens.push(Token {
                text: piece.as_str(),
                span: span.clone(),
                classification: rule.map(|rule| rule.classification.as_str()),
                bracket: rule.and_then(|rule| rule.bracket.as_ref()),
                selected_bracket: false,
            });

            if let Some(role) = rule.and_then(|rule| rule.bracket.as_ref()) {
                if let Some((open, close)) = brackets.visit(role, position, &span) {
                    tokens[open].selected_bracket = true;
                    tokens[close].selected_bracket = true;
                }
            }

            index = piece.end();
        }

        if index < text.len() {
            tokens.push(Token::gap(text, index..text.len()));
        }

        tracing::trace!(
            tokens = tokens.len(),
            unmatched_brackets = brackets.unmatched(),
            "highlight pass"
        );
        tokens
    }

    /// Highlight `text` and stream the result into `sink`.
    pub fn render<S: RenderSink + ?Sized>(&self, text: &str, selection: (usize, usize), sink: &mut S) {
        render_tokens(&self.highlight(text, selection), sink);
    }

    /// First rule matching the whole piece, falling back to the rule whose
    /// alternative produced the match.
    fn classify(&self, piece: &str, captures: &Captures<'_>) -> Option<&ClassificationRule> {
        self.rules
            .iter()
            .find(|compiled| compiled.exact.is_match(piece))
            .or_else(|| {
                self.rules
                    .iter()
                    .find(|compiled| captures.get(compiled.group).is_some())
            })
            .map(|compiled| &compiled.rule)
    }
}

/// Text closing a pattern's last line before a wrapper's closing group.
///
/// In `x` mode a `#` comment runs to the end of the line and would swallow
/// the wrapper; outside it a newline would be a literal.
fn line_end(flags: RuleFlags) -> &'static str {
    if flags.ignore_whitespace {
        "\n"
    } else {
        ""
    }
}
