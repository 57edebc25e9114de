use crate::rewriter::dialect::TargetDialect;

/// SQLite.
pub struct SqliteDialect;

impl TargetDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "1".to_string() } else { "0".to_string() }
    }

    fn concat(&self, parts: &[String]) -> String {
        parts
            .iter()
            .map(|p| format!("COALESCE({}, '')", p))
            .collect::<Vec<_>>()
            .join(" || ")
    }

    fn int_div(&self, left: &str, right: &str) -> String {
        format!("CAST({} / {} AS INTEGER)", left, right)
    }

    // No typed literals; dates are ISO text.
    fn date_literal(&self, iso: &str) -> String {
        format!("'{}'", iso)
    }

    fn timestamp_literal(&self, iso: &str) -> String {
        format!("'{}'", iso)
    }

    fn function_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("NZ", "IFNULL"),
            ("UCASE", "UPPER"),
            ("LCASE", "LOWER"),
            ("LEN", "LENGTH"),
            ("MID", "SUBSTR"),
            ("INSTR", "INSTR"),
        ]
    }
}
