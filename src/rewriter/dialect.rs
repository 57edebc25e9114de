use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::sql::mysql::MysqlDialect;
use super::sql::postgres::PostgresDialect;
use super::sql::sqlite::SqliteDialect;
use crate::error::ConvertError;

/// Target-side syntax hooks used by the rewriter.
pub trait TargetDialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Quote an identifier that was bracketed in the source.
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "TRUE".to_string() } else { "FALSE".to_string() }
    }

    /// String concatenation of an `a & b & ...` chain.
    ///
    /// Access `&` treats NULL as an empty string, so the result must not be
    /// NULL just because one operand is.
    fn concat(&self, parts: &[String]) -> String {
        format!("CONCAT({})", parts.join(", "))
    }

    /// Integer division (Access `a \ b`). Operands arrive parenthesized
    /// where the target's operator ranking would regroup them.
    fn int_div(&self, left: &str, right: &str) -> String {
        format!("{} / {}", left, right)
    }

    /// Date literal from an ISO `YYYY-MM-DD` date.
    fn date_literal(&self, iso: &str) -> String {
        format!("DATE '{}'", iso)
    }

    /// Timestamp literal from ISO `YYYY-MM-DD HH:MM:SS`.
    fn timestamp_literal(&self, iso: &str) -> String {
        format!("TIMESTAMP '{}'", iso)
    }

    /// Row limit clause (Access `TOP n`).
    fn limit(&self, n: u64) -> String {
        format!("LIMIT {}", n)
    }

    /// Built-in Access → target function renames, keys upper-case.
    fn function_map(&self) -> &'static [(&'static str, &'static str)];
}

/// Supported target dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "pg", alias = "postgresql")]
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    pub fn generator(&self) -> Box<dyn TargetDialect> {
        match self {
            Dialect::Postgres => Box::new(PostgresDialect),
            Dialect::MySql => Box::new(MysqlDialect),
            Dialect::Sqlite => Box::new(SqliteDialect),
        }
    }
}

impl FromStr for Dialect {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(ConvertError::Config(format!(
                "unknown dialect '{other}' (expected postgres, mysql or sqlite)"
            ))),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.generator().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialect_names() {
        assert_eq!("PG".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert!(matches!(
            "oracle".parse::<Dialect>(),
            Err(ConvertError::Config(_))
        ));
    }

    #[test]
    fn test_display_uses_generator_name() {
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
        assert_eq!(Dialect::MySql.to_string(), "mysql");
    }

    #[test]
    fn test_function_maps_use_uppercase_keys() {
        for dialect in [Dialect::Postgres, Dialect::MySql, Dialect::Sqlite] {
            for (from, _) in dialect.generator().function_map() {
                assert_eq!(*from, from.to_ascii_uppercase());
            }
        }
    }
}
