//! Tokens: whitespace, keywords, identifiers and literals.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending, satisfy},
    combinator::{map, not, opt, recognize, value, verify},
    multi::{many0_count, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};

use super::PResult;
use crate::ast::{IdentPart, Literal, ParseNode};

/// Words that never parse as identifiers.
pub(super) const RESERVED_WORDS: &[&str] = &[
    "select",
    "from",
    "where",
    "and",
    "or",
    "not",
    "as",
    "order",
    "group",
    "by",
    "having",
    "asc",
    "desc",
    "distinct",
    "top",
    "like",
    "is",
    "in",
    "between",
    "inner",
    "outer",
    "join",
    "on",
    "mod",
    "transform",
    "pivot",
    "iif",
    "null",
    "true",
    "false",
];

pub(super) fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word.to_ascii_lowercase().as_str())
}

/// `LEFT` and `RIGHT` stay usable as function names but never as a bare
/// table alias, where they start a join.
fn is_join_side(word: &str) -> bool {
    word.eq_ignore_ascii_case("left") || word.eq_ignore_ascii_case("right")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Skip whitespace and `--` line comments.
pub(super) fn ws(input: &str) -> PResult<'_, ()> {
    value(
        (),
        many0_count(alt((
            multispace1,
            recognize(pair(tag("--"), not_line_ending)),
        ))),
    )(input)
}

/// Case-insensitive keyword that is not a prefix of a longer word.
pub(super) fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input: &'a str| {
        let (input, _) = ws(input)?;
        terminated(tag_no_case(kw), not(satisfy(is_word_char)))(input)
    }
}

/// Punctuation, after optional whitespace.
pub(super) fn symbol<'a>(sym: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input: &'a str| preceded(ws, tag(sym))(input)
}

/// A bare word: letter or underscore, then word characters.
pub(super) fn word(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_word_char),
    ))(input)
}

/// A bare word that is not reserved.
pub(super) fn name(input: &str) -> PResult<'_, &str> {
    verify(word, |w: &str| !is_reserved(w))(input)
}

/// One identifier segment: `name` or `[any name]`.
pub(super) fn ident_part(input: &str) -> PResult<'_, IdentPart> {
    preceded(
        ws,
        alt((
            map(
                delimited(char('['), take_while1(|c: char| c != ']' && c != '\n'), char(']')),
                IdentPart::bracketed,
            ),
            map(name, IdentPart::plain),
        )),
    )(input)
}

/// Table alias: any identifier segment except a join keyword.
pub(super) fn table_alias(input: &str) -> PResult<'_, IdentPart> {
    verify(ident_part, |p: &IdentPart| p.bracketed || !is_join_side(&p.name))(input)
}

pub(super) fn ident_parts(input: &str) -> PResult<'_, Vec<IdentPart>> {
    preceded(ws, separated_list1(char('.'), ident_part))(input)
}

/// Dotted identifier: `t.col`, `[Order Details].[Unit Price]`.
pub(super) fn identifier(input: &str) -> PResult<'_, ParseNode> {
    map(ident_parts, ParseNode::Identifier)(input)
}

/// String, number, date, boolean or NULL literal.
pub(super) fn literal(input: &str) -> PResult<'_, ParseNode> {
    map(
        preceded(
            ws,
            alt((
                single_quoted,
                double_quoted,
                date_literal,
                number,
                value(Literal::Bool(true), keyword("true")),
                value(Literal::Bool(false), keyword("false")),
                value(Literal::Null, keyword("null")),
            )),
        ),
        ParseNode::Literal,
    )(input)
}

/// `'...'` with `''` as an embedded quote; inner text kept verbatim.
fn single_quoted(input: &str) -> PResult<'_, Literal> {
    map(
        delimited(
            char('\''),
            recognize(many0_count(alt((is_not("'"), tag("''"))))),
            char('\''),
        ),
        |s: &str| Literal::String {
            value: s.to_string(),
            quote: '\'',
        },
    )(input)
}

/// `"..."` with `""` as an embedded quote; inner text kept verbatim.
fn double_quoted(input: &str) -> PResult<'_, Literal> {
    map(
        delimited(
            char('"'),
            recognize(many0_count(alt((is_not("\""), tag("\"\""))))),
            char('"'),
        ),
        |s: &str| Literal::String {
            value: s.to_string(),
            quote: '"',
        },
    )(input)
}

fn date_literal(input: &str) -> PResult<'_, Literal> {
    map(
        delimited(char('#'), take_while1(|c: char| c != '#' && c != '\n'), char('#')),
        |s: &str| Literal::Date(s.trim().to_string()),
    )(input)
}

/// Unsigned; a leading `-` is the negation operator.
fn number(input: &str) -> PResult<'_, Literal> {
    map(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |s: &str| Literal::Number(s.to_string()),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_needs_word_boundary() {
        assert!(keyword("or")("order").is_err());
        let (rest, kw) = keyword("or")("  OR b").unwrap();
        assert_eq!(kw, "OR");
        assert_eq!(rest, " b");
    }

    #[test]
    fn test_ws_skips_comments() {
        let (rest, _) = ws("  -- note\n  a").unwrap();
        assert_eq!(rest, "a");
    }

    #[test]
    fn test_reserved_words_are_not_names() {
        assert!(name("FROM").is_err());
        assert!(name("from_date").is_ok());
        // Access tolerates these as column and table names
        assert!(name("column").is_ok());
        assert!(name("table").is_ok());
        assert!(name("Left").is_ok());
    }

    #[test]
    fn test_join_side_is_not_an_alias() {
        assert!(table_alias(" LEFT JOIN u").is_err());
        assert!(table_alias(" [Left]").is_ok());
        assert_eq!(table_alias(" o").unwrap().1, IdentPart::plain("o"));
    }

    #[test]
    fn test_bracketed_identifier() {
        let (_, node) = identifier("[Order Details].[Unit Price]").unwrap();
        assert_eq!(
            node,
            ParseNode::Identifier(vec![
                IdentPart::bracketed("Order Details"),
                IdentPart::bracketed("Unit Price"),
            ])
        );
    }

    #[test]
    fn test_string_with_doubled_quote() {
        let (_, node) = literal("'O''Brien'").unwrap();
        assert_eq!(
            node,
            ParseNode::Literal(Literal::String {
                value: "O''Brien".to_string(),
                quote: '\''
            })
        );
    }

    #[test]
    fn test_empty_string() {
        let (_, node) = literal("''").unwrap();
        assert_eq!(node, ParseNode::string(""));
    }

    #[test]
    fn test_numbers_and_dates() {
        assert_eq!(literal("12.5").unwrap().1, ParseNode::number("12.5"));
        assert!(literal("-1").is_err());
        assert_eq!(
            literal("#1/31/2024#").unwrap().1,
            ParseNode::Literal(Literal::Date("1/31/2024".to_string()))
        );
    }
}
