//! Access SQL parser using nom.
//!
//! Parses a single Access (Jet) `SELECT` statement into a [`ParseNode`] tree.
//!
//! ```text
//! SELECT IIF(column = 'value', 'true', 'false') FROM table
//! ───┬── ─────────────────┬──────────────────── ─────┬────
//!    │                    │                          └── TableRef
//!    │                    └── SelectItem → ConditionalCall
//!    └── Query
//! ```
//!
//! Parsing is all-or-nothing: the first syntax error aborts with its line and
//! column, and no partial tree is returned.
//!
//! Recursion is bounded by [`Depth`]. Every nested parenthesis, prefix
//! operator, call argument list and binary-operator link costs one level, so
//! neither the parser's stack nor the tree it builds grows past `max_depth`.

mod base;
mod clauses;
mod expressions;


use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError};
use tracing::debug;

use crate::ast::ParseNode;
use crate::error::{ConvertError, ConvertResult};

/// Parser result carrying [`GrammarError`].
pub(crate) type PResult<'a, T> = nom::IResult<&'a str, T, GrammarError<'a>>;

/// Error type threaded through the grammar combinators.
#[derive(Debug)]
pub(crate) enum GrammarError<'a> {
    /// Input did not match at `input`.
    Mismatch {
        input: &'a str,
        expected: Option<&'static str>,
    },
    /// Input matched but built an invalid node, or nested too deep.
    Rejected(Box<ConvertError>),
}

/// Abort the whole parse with `err`; alternatives are not tried.
pub(crate) fn rejected<'a>(err: ConvertError) -> nom::Err<GrammarError<'a>> {
    nom::Err::Failure(GrammarError::Rejected(Box::new(err)))
}

/// Remaining nesting budget of the grammar.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Depth {
    level: usize,
    limit: usize,
}

impl Depth {
    /// The statement itself sits at level 1.
    pub(crate) fn new(limit: usize) -> Self {
        Self { level: 1, limit }
    }

    /// One level deeper; fails without backtracking past the limit.
    pub(crate) fn deeper<'a>(self) -> Result<Depth, nom::Err<GrammarError<'a>>> {
        let level = self.level + 1;
        if level > self.limit {
            return Err(rejected(ConvertError::InputTooDeep {
                depth: level,
                limit: self.limit,
            }));
        }
        Ok(Depth { level, ..self })
    }
}

impl<'a> GrammarError<'a> {
    fn into_convert_error(self, source: &str) -> ConvertError {
        match self {
            GrammarError::Rejected(err) => *err,
            GrammarError::Mismatch { input, expected } => {
                let offset = source.len() - input.len();
                let message = match expected {
                    Some(what) => format!("expected {what}"),
                    None => describe_remaining(input),
                };
                ConvertError::syntax(source, offset, message)
            }
        }
    }
}

fn describe_remaining(input: &str) -> String {
    let rest = input.trim_start();
    if rest.is_empty() {
        return "unexpected end of input".to_string();
    }
    let snippet: String = rest.chars().take(20).collect();
    format!("unexpected input near '{snippet}'")
}

impl<'a> ParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        GrammarError::Mismatch {
            input,
            expected: None,
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    /// Keep whichever alternative got further into the input.
    fn or(self, other: Self) -> Self {
        match (&self, &other) {
            (GrammarError::Rejected(_), _) => self,
            (_, GrammarError::Rejected(_)) => other,
            (
                GrammarError::Mismatch { input: mine, .. },
                GrammarError::Mismatch { input: theirs, .. },
            ) => {
                if theirs.len() < mine.len() {
                    other
                } else {
                    self
                }
            }
        }
    }
}

impl<'a> ContextError<&'a str> for GrammarError<'a> {
    fn add_context(_input: &'a str, ctx: &'static str, other: Self) -> Self {
        match other {
            GrammarError::Mismatch {
                input,
                expected: None,
            } => GrammarError::Mismatch {
                input,
                expected: Some(ctx),
            },
            other => other,
        }
    }
}

impl<'a, E> FromExternalError<&'a str, E> for GrammarError<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, _e: E) -> Self {
        GrammarError::Mismatch {
            input,
            expected: None,
        }
    }
}

/// Parse one Access SQL statement.
///
/// Fails with [`ConvertError::InputTooDeep`] before parsing if parenthesis
/// nesting exceeds `max_depth`, and during parsing once any other nesting
/// (prefix operators, operator chains) does.
pub fn parse(source: &str, max_depth: usize) -> ConvertResult<ParseNode> {
    check_nesting(source, max_depth)?;

    match clauses::parse_statement(source, Depth::new(max_depth)) {
        Ok((_, node)) => {
            debug!(kind = %node.kind(), "parsed statement");
            Ok(node)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.into_convert_error(source)),
        Err(nom::Err::Incomplete(_)) => Err(ConvertError::syntax(
            source,
            source.len(),
            "unexpected end of input",
        )),
    }
}

/// Deepest parenthesis nesting outside string, date and bracket literals
/// and `--` comments.
pub fn nesting_depth(source: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut closing: Option<char> = None;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(end) = closing {
            if c == end {
                closing = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '#' => closing = Some(c),
            '[' => closing = Some(']'),
            '-' if chars.peek() == Some(&'-') => closing = Some('\n'),
            '(' => {
                depth += 1;
                max = max.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

fn check_nesting(source: &str, max_depth: usize) -> ConvertResult<()> {
    let depth = nesting_depth(source);
    if depth > max_depth {
        return Err(ConvertError::InputTooDeep {
            depth,
            limit: max_depth,
        });
    }
    Ok(())
}
