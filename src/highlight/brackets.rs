use super::rule::{BracketDirection, BracketRole};
use std::collections::HashMap;
use std::ops::Range;

/// An opening bracket waiting for its partner.
#[derive(Debug, Clone, Copy)]
struct OpenBracket {
    token: usize,
    at_cursor: bool,
}

/// Per-pass bracket pairing state, one LIFO stack per group.
///
/// Lives for a single highlight pass. Unbalanced input is tolerated:
/// closings with nothing to pop and openings left on a stack are simply
/// never selected.
#[derive(Debug)]
pub(crate) struct BracketMatcher<'r> {
    selection: (usize, usize),
    stacks: HashMap<&'r str, Vec<OpenBracket>>,
}

impl<'r> BracketMatcher<'r> {
    pub(crate) fn new(selection: (usize, usize)) -> Self {
        Self {
            selection,
            stacks: HashMap::new(),
        }
    }

    /// The selection starts at this token and ends no later than its end.
    fn is_at_cursor(&self, span: &Range<usize>) -> bool {
        let (start, end) = self.selection;
        start == span.start && end <= span.end
    }

    /// Feed the bracket token at position `token` of the output.
    ///
    /// Returns the `(opening, closing)` token positions when a closing
    /// bracket completes a pair that touches the cursor.
    pub(crate) fn visit(
        &mut self,
        role: &'r BracketRole,
        token: usize,
        span: &Range<usize>,
    ) -> Option<(usize, usize)> {
        let at_cursor = self.is_at_cursor(span);
        let stack = self.stacks.entry(role.group.as_str()).or_default();

        match role.direction {
            BracketDirection::Opening => {
                stack.push(OpenBracket { token, at_cursor });
                None
            }
            BracketDirection::Closing => {
                let open = stack.pop()?;
                (open.at_cursor || at_cursor).then_some((open.token, token))
            }
        }
    }

    /// Number of openings still waiting, for pass statistics.
    pub(crate) fn unmatched(&self) -> usize {
        self.stacks.values().map(Vec::len).sum()
    }
}
