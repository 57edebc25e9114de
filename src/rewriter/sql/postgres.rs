use crate::rewriter::dialect::TargetDialect;

/// PostgreSQL, the default target.
pub struct PostgresDialect;

impl TargetDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn int_div(&self, left: &str, right: &str) -> String {
        format!("DIV({}, {})", left, right)
    }

    fn function_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("NZ", "COALESCE"),
            ("UCASE", "UPPER"),
            ("LCASE", "LOWER"),
            ("LEN", "LENGTH"),
            ("MID", "SUBSTR"),
            ("INSTR", "STRPOS"),
            ("INT", "FLOOR"),
            ("CSTR", "TEXT"),
        ]
    }
}
