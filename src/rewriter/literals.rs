//! Literal translation: strings, `LIKE` patterns and `#date#` values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ConvertError, ConvertResult};

/// Escape character appended to translated patterns that needed escaping.
const LIKE_ESCAPE: char = '!';

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// String literal body in single-quote form.
///
/// Access `"..."` strings become `'...'`: `""` unescapes, `'` doubles.
pub(super) fn string_body(value: &str, quote: char) -> String {
    if quote == '"' {
        value.replace("\"\"", "\"").replace('\'', "''")
    } else {
        value.to_string()
    }
}

/// Translate an Access `LIKE` pattern to a SQL one.
///
/// `*` becomes `%` and `?` becomes `_`. A one-character class such as `[*]`
/// matches that character. Literal `%`, `_` and `!` are escaped, and the
/// pattern then carries `ESCAPE '!'`. The digit wildcard `#` and wider
/// character classes have no portable form and are rejected.
pub(super) fn like_pattern(value: &str, quote: char) -> ConvertResult<String> {
    let body = string_body(value, quote);
    let mut out = String::with_capacity(body.len() + 2);
    let mut escaped = false;
    let mut chars = body.chars();

    let untranslatable = |reason: &str| {
        ConvertError::untranslatable(format!("LIKE pattern '{}'", body), reason)
    };

    while let Some(c) = chars.next() {
        match c {
            '*' => out.push('%'),
            '?' => out.push('_'),
            '#' => return Err(untranslatable("the digit wildcard '#' has no SQL equivalent")),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    class.push(c);
                }
                let mut members = class.chars();
                match (members.next(), members.next(), closed) {
                    (Some(lit), None, true) => escaped |= push_literal(&mut out, lit),
                    _ => {
                        return Err(untranslatable(
                            "character lists have no portable LIKE equivalent",
                        ));
                    }
                }
            }
            other => escaped |= push_literal(&mut out, other),
        }
    }

    if escaped {
        Ok(format!("'{}' ESCAPE '{}'", out, LIKE_ESCAPE))
    } else {
        Ok(format!("'{}'", out))
    }
}

/// Push a character that must match itself. Returns whether it was escaped.
fn push_literal(out: &mut String, c: char) -> bool {
    if matches!(c, '%' | '_' | LIKE_ESCAPE) {
        out.push(LIKE_ESCAPE);
        out.push(c);
        true
    } else {
        out.push(c);
        false
    }
}

/// A parsed `#...#` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AccessDate {
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl AccessDate {
    /// ISO text: `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
    pub(super) fn iso(&self) -> String {
        match self {
            AccessDate::Date(d) => d.format("%Y-%m-%d").to_string(),
            AccessDate::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Parse an Access date literal body: `yyyy-mm-dd` or US-order `m/d/yyyy`,
/// optionally followed by a 24-hour or AM/PM time.
///
/// Impossible calendar dates (`2/31/2024`) and two-digit years are rejected.
pub(super) fn parse_date(raw: &str) -> ConvertResult<AccessDate> {
    let invalid = || {
        ConvertError::structural(
            format!("#{}#", raw),
            "unrecognized date literal (expected #yyyy-mm-dd# or #m/d/yyyy#)",
        )
    };

    let raw = raw.trim();
    let (date_text, time_text) = match raw.split_once(char::is_whitespace) {
        Some((date, time)) => (date, Some(time.trim())),
        None => (raw, None),
    };

    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_text, fmt).ok())
        .filter(|_| four_digit_year(date_text))
        .ok_or_else(invalid)?;

    match time_text {
        None => Ok(AccessDate::Date(date)),
        Some(time_text) => {
            let time = TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(time_text, fmt).ok())
                .ok_or_else(invalid)?;
            Ok(AccessDate::Timestamp(date.and_time(time)))
        }
    }
}

fn four_digit_year(date_text: &str) -> bool {
    let year = if date_text.contains('-') {
        date_text.split('-').next()
    } else {
        date_text.rsplit('/').next()
    };
    year.is_some_and(|y| y.len() == 4)
}
