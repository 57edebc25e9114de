//! Error types for accql.

use std::path::PathBuf;

use thiserror::Error;

use crate::ast::NodeKind;

/// The main error type for a conversion.
///
/// Every variant aborts the whole conversion; no partial output is produced.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source text does not conform to the Access SQL grammar.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A recognized node violates its required child arity.
    #[error("Structural error in {node}: {message}")]
    Structural { node: String, message: String },

    /// A reachable node kind has no rewrite rule for the target dialect.
    #[error("Unsupported construct: {kind} has no rewrite rule")]
    Unsupported { kind: NodeKind },

    /// Nesting exceeded the configured bound.
    #[error("Input too deep: nesting depth {depth} exceeds limit {limit}")]
    InputTooDeep { depth: usize, limit: usize },

    /// Source text that parses but has no equivalent in the target.
    #[error("Cannot translate {construct}: {reason}")]
    Untranslatable { construct: String, reason: String },

    /// Failed to read or write a file.
    #[error("IO error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConvertError {
    /// Create a syntax error at the given byte offset of `source`.
    pub fn syntax(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_col(source, offset);
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a structural (arity) error.
    pub fn structural(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            node: node.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(kind: NodeKind) -> Self {
        Self::Unsupported { kind }
    }

    pub fn untranslatable(construct: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Untranslatable {
            construct: construct.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// 1-based line and column of a byte offset.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

/// Result type alias for accql operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvertError::syntax("SELECT", 6, "expected select list");
        assert_eq!(
            err.to_string(),
            "Syntax error at line 1, column 7: expected select list"
        );
    }

    #[test]
    fn test_line_col_multiline() {
        let src = "SELECT a\nFROM t\nWHERE ?";
        let err = ConvertError::syntax(src, src.find('?').unwrap(), "bad token");
        match err {
            ConvertError::Syntax { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_io_display_leaves_cause_to_source_chain() {
        use std::error::Error;

        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ConvertError::io("/tmp/out.sql", cause);
        assert_eq!(err.to_string(), "IO error on /tmp/out.sql");
        assert_eq!(err.source().map(|e| e.to_string()), Some("missing".to_string()));
    }

    #[test]
    fn test_unsupported_display() {
        let err = ConvertError::unsupported(NodeKind::Crosstab);
        assert_eq!(
            err.to_string(),
            "Unsupported construct: Crosstab has no rewrite rule"
        );
    }
}
