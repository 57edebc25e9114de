//! Expression grammar.
//!
//! Binary operators are parsed by precedence climbing. Access binding,
//! loosest first:
//! - `OR`
//! - `AND`
//! - `NOT` (prefix)
//! - comparison, `[NOT] LIKE`, `IS [NOT] NULL`, `[NOT] IN`, `[NOT] BETWEEN`
//! - `&`
//! - `+ -`
//! - `MOD`
//! - `\`
//! - `* /`
//! - unary `-`
//!
//! Every operator link and every nested operand costs one [`Depth`] level.

use nom::{
    branch::alt,
    character::complete::char,
    combinator::{map, opt, value},
    error::context,
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};

use super::base::{identifier, keyword, literal, name, symbol, ws};
use super::{Depth, PResult, rejected};
use crate::ast::{ArithOp, CompareOp, LogicalOp, ParseNode};

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_COMPARE: u8 = 4;
const PREC_UNARY: u8 = 10;

/// An operator that may follow a complete operand.
#[derive(Debug, Clone, Copy)]
enum Infix {
    Logical(LogicalOp),
    Compare(CompareOp),
    Arith(ArithOp),
    /// `IS [NOT] NULL`, already fully consumed.
    IsNull { negated: bool },
    In { negated: bool },
    Between { negated: bool },
}

impl Infix {
    fn precedence(self) -> u8 {
        match self {
            Infix::Logical(LogicalOp::Or) => PREC_OR,
            Infix::Logical(LogicalOp::And) => PREC_AND,
            Infix::Compare(_) | Infix::IsNull { .. } | Infix::In { .. } | Infix::Between { .. } => {
                PREC_COMPARE
            }
            Infix::Arith(op) => op.precedence(),
        }
    }
}

/// Parse a full expression.
pub(super) fn parse_expression(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    parse_binary(input, depth, PREC_OR)
}

/// Operand, then every operator binding at least as tight as `min_prec`.
/// Operators of one level associate to the left.
fn parse_binary(input: &str, depth: Depth, min_prec: u8) -> PResult<'_, ParseNode> {
    let (mut input, mut left) = parse_prefix(input, depth)?;
    let mut depth = depth;

    loop {
        let (rest, op) = match parse_infix(input) {
            Ok(found) => found,
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        };
        let prec = op.precedence();
        if prec < min_prec {
            break;
        }
        depth = depth.deeper()?;

        let (rest, node) = match op {
            Infix::Logical(op) => {
                let (rest, right) = parse_binary(rest, depth, prec + 1)?;
                (
                    rest,
                    ParseNode::LogicalExpr {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    },
                )
            }
            Infix::Compare(op) => {
                let (rest, right) =
                    context("right operand", |i| parse_binary(i, depth, prec + 1))(rest)?;
                (rest, ParseNode::comparison(left, op, right))
            }
            Infix::Arith(op) => {
                let (rest, right) = parse_binary(rest, depth, prec + 1)?;
                (
                    rest,
                    ParseNode::ArithmeticExpr {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    },
                )
            }
            Infix::IsNull { negated } => (
                rest,
                ParseNode::IsNull {
                    expr: Box::new(left),
                    negated,
                },
            ),
            Infix::In { negated } => {
                let (rest, list) = delimited(
                    context("value list", symbol("(")),
                    separated_list1(symbol(","), |i| parse_expression(i, depth)),
                    context("closing parenthesis", symbol(")")),
                )(rest)?;
                (
                    rest,
                    ParseNode::InList {
                        expr: Box::new(left),
                        list,
                        negated,
                    },
                )
            }
            Infix::Between { negated } => {
                // Bounds bind tighter than AND so the separator is not read as logic
                let (rest, low) = parse_binary(rest, depth, PREC_COMPARE + 1)?;
                let (rest, _) = context("AND", keyword("and"))(rest)?;
                let (rest, high) = parse_binary(rest, depth, PREC_COMPARE + 1)?;
                (
                    rest,
                    ParseNode::Between {
                        expr: Box::new(left),
                        low: Box::new(low),
                        high: Box::new(high),
                        negated,
                    },
                )
            }
        };
        input = rest;
        left = node;
    }
    Ok((input, left))
}

fn parse_infix(input: &str) -> PResult<'_, Infix> {
    alt((
        value(Infix::Logical(LogicalOp::Or), keyword("or")),
        value(Infix::Logical(LogicalOp::And), keyword("and")),
        map(parse_compare_op, Infix::Compare),
        map(
            preceded(keyword("is"), terminated(opt(keyword("not")), keyword("null"))),
            |not| Infix::IsNull {
                negated: not.is_some(),
            },
        ),
        map(terminated(opt(keyword("not")), keyword("in")), |not| {
            Infix::In {
                negated: not.is_some(),
            }
        }),
        map(terminated(opt(keyword("not")), keyword("between")), |not| {
            Infix::Between {
                negated: not.is_some(),
            }
        }),
        value(Infix::Arith(ArithOp::Concat), symbol("&")),
        value(Infix::Arith(ArithOp::Add), symbol("+")),
        value(Infix::Arith(ArithOp::Sub), symbol("-")),
        value(Infix::Arith(ArithOp::Mul), symbol("*")),
        value(Infix::Arith(ArithOp::Div), symbol("/")),
        value(Infix::Arith(ArithOp::IntDiv), symbol("\\")),
        value(Infix::Arith(ArithOp::Mod), keyword("mod")),
    ))(input)
}

fn parse_compare_op(input: &str) -> PResult<'_, CompareOp> {
    alt((
        value(CompareOp::Ne, symbol("<>")),
        value(CompareOp::Ne, symbol("!=")),
        value(CompareOp::Lte, symbol("<=")),
        value(CompareOp::Gte, symbol(">=")),
        value(CompareOp::Lt, symbol("<")),
        value(CompareOp::Gt, symbol(">")),
        value(CompareOp::Eq, symbol("=")),
        value(CompareOp::NotLike, pair(keyword("not"), keyword("like"))),
        value(CompareOp::Like, keyword("like")),
    ))(input)
}

/// `NOT e`, `-e`, or a primary.
fn parse_prefix(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    let (input, _) = ws(input)?;

    if let Ok((rest, _)) = keyword("not")(input) {
        let depth = depth.deeper()?;
        let (rest, operand) = parse_binary(rest, depth, PREC_NOT + 1)?;
        return Ok((rest, ParseNode::NotExpr(Box::new(operand))));
    }
    if let Ok((rest, _)) = char::<&str, ()>('-')(input) {
        let depth = depth.deeper()?;
        let (rest, operand) = parse_binary(rest, depth, PREC_UNARY)?;
        return Ok((rest, ParseNode::Negate(Box::new(operand))));
    }
    parse_primary(input, depth)
}

fn parse_primary(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    alt((
        |i| parse_grouped(i, depth),
        |i| parse_iif(i, depth),
        |i| parse_function_call(i, depth),
        literal,
        identifier,
    ))(input)
}

fn parse_grouped(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    let (input, _) = char('(')(input)?;
    let depth = depth.deeper()?;
    let (input, inner) = parse_expression(input, depth)?;
    let (input, _) = context("closing parenthesis", symbol(")"))(input)?;
    Ok((input, ParseNode::Grouped(Box::new(inner))))
}

/// Function argument: an expression or `*` (as in `COUNT(*)`).
fn parse_argument(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    alt((value(ParseNode::Star, symbol("*")), |i| {
        parse_expression(i, depth)
    }))(input)
}

fn parse_arguments(input: &str, depth: Depth) -> PResult<'_, Vec<ParseNode>> {
    let (input, _) = symbol("(")(input)?;
    let depth = depth.deeper()?;
    terminated(
        separated_list0(symbol(","), |i| parse_argument(i, depth)),
        context("closing parenthesis", symbol(")")),
    )(input)
}

/// `IIF(...)`; the argument count is checked once the list is parsed.
fn parse_iif(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    let (input, _) = keyword("iif")(input)?;
    let (input, args) = parse_arguments(input, depth)?;
    match ParseNode::conditional(args) {
        Ok(node) => Ok((input, node)),
        Err(err) => Err(rejected(err)),
    }
}

fn parse_function_call(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    let (input, fname) = name(input)?;
    let (input, args) = parse_arguments(input, depth)?;
    Ok((
        input,
        ParseNode::FunctionCall {
            name: fname.to_string(),
            args,
        },
    ))
}
