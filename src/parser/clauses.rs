//! Statement and clause grammar: SELECT lists, FROM with joins, WHERE,
//! GROUP BY, HAVING, ORDER BY and the TRANSFORM/PIVOT crosstab wrapper.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{eof, map, map_res, opt, value},
    error::context,
    multi::separated_list1,
    sequence::{pair, preceded, terminated},
};

use super::base::{ident_part, ident_parts, identifier, keyword, symbol, table_alias, ws};
use super::expressions::parse_expression;
use super::{Depth, PResult};
use crate::ast::{JoinKind, ParseNode, Query, SortOrder};

/// Parse a whole statement: a query or crosstab, optional `;`, then end of input.
pub(super) fn parse_statement(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    let (input, node) = alt((
        |i| parse_crosstab(i, depth),
        map(|i| parse_query(i, depth), |q| ParseNode::Query(Box::new(q))),
    ))(input)?;
    let (input, _) = opt(symbol(";"))(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = context("end of statement", eof)(input)?;
    Ok((input, node))
}

/// `TRANSFORM expr SELECT ... PIVOT expr`
fn parse_crosstab(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    let (input, _) = keyword("transform")(input)?;
    let depth = depth.deeper()?;
    let (input, transform) = parse_expression(input, depth)?;
    let (input, query) = context("SELECT after TRANSFORM", |i| parse_query(i, depth))(input)?;
    let (input, pivot) = preceded(context("PIVOT", keyword("pivot")), |i| {
        parse_expression(i, depth)
    })(input)?;

    Ok((
        input,
        ParseNode::Crosstab {
            transform: Box::new(transform),
            query: Box::new(ParseNode::Query(Box::new(query))),
            pivot: Box::new(pivot),
        },
    ))
}

fn parse_query(input: &str, depth: Depth) -> PResult<'_, Query> {
    let (input, _) = keyword("select")(input)?;
    let (input, distinct) = opt(keyword("distinct"))(input)?;
    let (input, top) = opt(preceded(
        keyword("top"),
        preceded(ws, map_res(digit1, str::parse::<u64>)),
    ))(input)?;
    let (input, items) = context(
        "select list",
        separated_list1(symbol(","), |i| parse_select_item(i, depth)),
    )(input)?;
    let (input, from) = opt(preceded(
        keyword("from"),
        separated_list1(symbol(","), |i| parse_table_ref(i, depth)),
    ))(input)?;
    let (input, where_clause) =
        opt(preceded(keyword("where"), |i| parse_expression(i, depth)))(input)?;
    let (input, group_by) = opt(preceded(
        pair(keyword("group"), keyword("by")),
        separated_list1(symbol(","), |i| parse_expression(i, depth)),
    ))(input)?;
    let (input, having) = opt(preceded(keyword("having"), |i| parse_expression(i, depth)))(input)?;
    let (input, order_by) = opt(preceded(
        pair(keyword("order"), keyword("by")),
        separated_list1(symbol(","), |i| parse_order_item(i, depth)),
    ))(input)?;

    Ok((
        input,
        Query {
            distinct: distinct.is_some(),
            top,
            items,
            from: from.unwrap_or_default(),
            where_clause: where_clause.map(Box::new),
            group_by: group_by.unwrap_or_default(),
            having: having.map(Box::new),
            order_by: order_by.unwrap_or_default(),
        },
    ))
}

/// `*`, `t.*` or `expr [AS alias]`
fn parse_select_item(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    alt((
        value(ParseNode::Star, terminated(symbol("*"), ws)),
        map(terminated(ident_parts, tag(".*")), ParseNode::QualifiedStar),
        map(
            pair(
                |i| parse_expression(i, depth),
                opt(preceded(keyword("as"), ident_part)),
            ),
            |(expr, alias)| ParseNode::SelectItem {
                expr: Box::new(expr),
                alias,
            },
        ),
    ))(input)
}

/// A table, then any `INNER|LEFT|RIGHT JOIN table ON condition` links.
fn parse_table_ref(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    let (mut input, mut left) = parse_table_factor(input, depth)?;
    let mut depth = depth;

    loop {
        let (rest, kind) = match parse_join_kind(input) {
            Ok(found) => found,
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        };
        depth = depth.deeper()?;
        let (rest, right) = context("joined table", |i| parse_table_factor(i, depth))(rest)?;
        let (rest, on) =
            preceded(context("ON", keyword("on")), |i| parse_expression(i, depth))(rest)?;
        input = rest;
        left = ParseNode::Join {
            left: Box::new(left),
            kind,
            right: Box::new(right),
            on: Box::new(on),
        };
    }
    Ok((input, left))
}

fn parse_join_kind(input: &str) -> PResult<'_, JoinKind> {
    terminated(
        alt((
            value(JoinKind::Inner, keyword("inner")),
            value(JoinKind::Left, terminated(keyword("left"), opt(keyword("outer")))),
            value(JoinKind::Right, terminated(keyword("right"), opt(keyword("outer")))),
        )),
        keyword("join"),
    )(input)
}

/// `table [[AS] alias]`, or a parenthesized join as Access writes nested joins.
fn parse_table_factor(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    let (input, _) = ws(input)?;
    if let Ok((rest, _)) = symbol("(")(input) {
        let depth = depth.deeper()?;
        let (rest, inner) = parse_table_ref(rest, depth)?;
        let (rest, _) = context("closing parenthesis", symbol(")"))(rest)?;
        return Ok((rest, ParseNode::Grouped(Box::new(inner))));
    }
    map(
        pair(identifier, opt(preceded(opt(keyword("as")), table_alias))),
        |(name, alias)| ParseNode::TableRef {
            name: Box::new(name),
            alias,
        },
    )(input)
}

fn parse_order_item(input: &str, depth: Depth) -> PResult<'_, ParseNode> {
    map(
        pair(
            |i| parse_expression(i, depth),
            opt(alt((
                value(SortOrder::Asc, keyword("asc")),
                value(SortOrder::Desc, keyword("desc")),
            ))),
        ),
        |(expr, order)| ParseNode::OrderItem {
            expr: Box::new(expr),
            order,
        },
    )(input)
}
