use crate::rewriter::dialect::TargetDialect;

/// MySQL / MariaDB.
pub struct MysqlDialect;

impl TargetDialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn concat(&self, parts: &[String]) -> String {
        // CONCAT is NULL if any argument is; CONCAT_WS skips NULLs
        format!("CONCAT_WS('', {})", parts.join(", "))
    }

    fn int_div(&self, left: &str, right: &str) -> String {
        format!("{} DIV {}", left, right)
    }

    fn function_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("NZ", "IFNULL"),
            ("UCASE", "UPPER"),
            ("LCASE", "LOWER"),
            ("LEN", "CHAR_LENGTH"),
            ("MID", "SUBSTRING"),
            ("INT", "FLOOR"),
        ]
    }
}
