//! # accql — Access SQL to PostgreSQL
//!
//! Parses Microsoft Access (Jet) `SELECT` statements and rewrites the
//! Access-only constructs into portable target SQL.
//!
//! ## Quick Example
//!
//! ```
//! let sql = accql::convert("SELECT IIF(column = 'value', 'true', 'false') FROM table").unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT (CASE WHEN column = 'value' THEN 'true' ELSE 'false' END) FROM table"
//! );
//! ```
//!
//! ## Rewrites
//!
//! | Access              | PostgreSQL                               |
//! |---------------------|------------------------------------------|
//! | `IIF(c, t, f)`      | `(CASE WHEN c THEN t ELSE f END)`        |
//! | `a & b`             | `CONCAT(a, b)`                           |
//! | `a \ b`             | `DIV(a, b)`                              |
//! | `x LIKE 'A*'`       | `x LIKE 'A%'`                            |
//! | `Nz(x, 0)`          | `COALESCE(x, 0)`                         |
//! | `#1/31/2024#`       | `DATE '2024-01-31'`                      |
//! | `[Unit Price]`      | `"Unit Price"`                           |
//! | `SELECT TOP 5 ...`  | `SELECT ... LIMIT 5`                     |

pub mod ast;
pub mod config;
pub mod emitter;
pub mod error;
pub mod parser;
pub mod rewriter;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::Config;
    pub use crate::emitter::Emitter;
    pub use crate::error::*;
    pub use crate::rewriter::{Dialect, Rewriter, Rule, rule_for};
    pub use crate::{convert, convert_with, parse};
}

use tracing::debug;

/// Parse Access SQL into a parse tree.
///
/// # Example
///
/// ```
/// use accql::ast::NodeKind;
///
/// let tree = accql::parse("SELECT a FROM t", 64).unwrap();
/// assert_eq!(tree.kind(), NodeKind::Query);
/// ```
pub fn parse(source: &str, max_depth: usize) -> error::ConvertResult<ast::ParseNode> {
    parser::parse(source, max_depth)
}

/// Convert Access SQL to PostgreSQL with the default configuration.
pub fn convert(source: &str) -> error::ConvertResult<String> {
    convert_with(source, &config::Config::default())
}

/// Convert Access SQL using `config` for dialect, depth bound and function map.
pub fn convert_with(source: &str, config: &config::Config) -> error::ConvertResult<String> {
    let tree = parser::parse(source, config.max_depth)?;
    let sql = rewriter::Rewriter::from_config(config).rewrite(&tree)?;
    debug!(bytes = sql.len(), "conversion complete");
    Ok(sql)
}
