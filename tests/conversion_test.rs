use accql::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_iif_in_select_list() {
    let sql = convert("SELECT IIF(column = 'value', 'true', 'false') FROM table").unwrap();
    assert_eq!(
        sql,
        "SELECT (CASE WHEN column = 'value' THEN 'true' ELSE 'false' END) FROM table"
    );
}

#[test]
fn test_nested_iif() {
    let sql = convert("SELECT IIF(a=1, IIF(b=2, 'x','y'), 'z') FROM t").unwrap();
    assert_eq!(
        sql,
        "SELECT (CASE WHEN a = 1 THEN (CASE WHEN b = 2 THEN 'x' ELSE 'y' END) ELSE 'z' END) FROM t"
    );
}

#[test]
fn test_comparison_with_leading_iif_collapses() {
    let collapsed = convert("SELECT a FROM t WHERE IIF(a > 1, b, c) = 'never'").unwrap();
    assert_eq!(
        collapsed,
        "SELECT a FROM t WHERE (CASE WHEN a > 1 THEN b ELSE c END)"
    );
    assert!(!collapsed.contains("never"));
}

#[test]
fn test_generic_comparison_is_unchanged() {
    assert_eq!(
        convert("SELECT a FROM t WHERE a = b").unwrap(),
        "SELECT a FROM t WHERE a = b"
    );
    // whitespace is normalized, tokens are not
    assert_eq!(
        convert("select   a\n  from t\n where a<>b").unwrap(),
        "SELECT a FROM t WHERE a <> b"
    );
}

#[test]
fn test_iif_in_where_clause() {
    let sql = convert("SELECT * FROM Orders WHERE IIF(Shipped, 1, 0) = 1 AND Total > 10").unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM Orders WHERE (CASE WHEN Shipped THEN 1 ELSE 0 END) AND Total > 10"
    );
}

#[test]
fn test_access_idioms() {
    let sql = convert(
        "SELECT TOP 10 [First Name] & ' ' & [Last Name] AS [Full Name], Nz(Bonus, 0) \
         FROM [Sales Staff] AS s \
         WHERE Hired >= #1/15/2020# AND Active = True \
         ORDER BY [Last Name];",
    )
    .unwrap();
    assert_eq!(
        sql,
        "SELECT CONCAT(\"First Name\", ' ', \"Last Name\") AS \"Full Name\", COALESCE(Bonus, 0) \
         FROM \"Sales Staff\" AS s \
         WHERE Hired >= DATE '2020-01-15' AND Active = TRUE \
         ORDER BY \"Last Name\" LIMIT 10"
    );
}

#[test]
fn test_mysql_target() {
    let config = Config::builder().dialect(Dialect::MySql).build().unwrap();
    let sql = convert_with("SELECT UCase(a) & b FROM [My Table]", &config).unwrap();
    assert_eq!(sql, "SELECT CONCAT_WS('', UPPER(a), b) FROM `My Table`");
}

#[test]
fn test_configured_function_rename() {
    let config = Config::builder().function("CCur", "MONEY").build().unwrap();
    let sql = convert_with("SELECT CCur(price) FROM items", &config).unwrap();
    assert_eq!(sql, "SELECT MONEY(price) FROM items");
}

#[test]
fn test_group_by_having() {
    let sql = convert(
        "SELECT Region, Count(*) AS n FROM Sales GROUP BY Region HAVING Count(*) > 5 ORDER BY Region DESC",
    )
    .unwrap();
    assert_eq!(
        sql,
        "SELECT Region, Count(*) AS n FROM Sales GROUP BY Region HAVING Count(*) > 5 ORDER BY Region DESC"
    );
}

#[test]
fn test_malformed_iif_is_structural() {
    let err = convert("SELECT IIF(a=1, 'x') FROM t").unwrap_err();
    assert!(matches!(err, ConvertError::Structural { .. }), "{err}");
}

#[test]
fn test_crosstab_is_unsupported() {
    let err = convert("TRANSFORM Sum(Amount) SELECT Region FROM Sales GROUP BY Region PIVOT Quarter")
        .unwrap_err();
    match err {
        ConvertError::Unsupported { kind } => assert_eq!(kind, NodeKind::Crosstab),
        other => panic!("expected unsupported construct, got {other}"),
    }
}

#[test]
fn test_syntax_error() {
    let err = convert("SELECT a FROM").unwrap_err();
    assert!(matches!(err, ConvertError::Syntax { line: 1, .. }), "{err}");
}

#[test]
fn test_input_too_deep() {
    let config = Config::builder().max_depth(4).build().unwrap();
    let err = convert_with("SELECT (((((a))))) FROM t", &config).unwrap_err();
    assert!(matches!(err, ConvertError::InputTooDeep { limit: 4, .. }), "{err}");
}

#[test]
fn test_long_and_chain_hits_rewrite_bound() {
    let terms: Vec<String> = (0..40).map(|i| format!("c{i} = {i}")).collect();
    let src = format!("SELECT a FROM t WHERE {}", terms.join(" AND "));

    assert!(convert(&src).is_ok());

    let config = Config::builder().max_depth(16).build().unwrap();
    let err = convert_with(&src, &config).unwrap_err();
    assert!(matches!(err, ConvertError::InputTooDeep { limit: 16, .. }), "{err}");
}

/// Run `f` on a thread with a 2 MiB stack, the common default for spawned threads.
fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn test_deep_parentheses_are_rejected_not_overflowed() {
    let result = on_small_stack(|| {
        let src = format!("SELECT {}a{} FROM t", "(".repeat(256), ")".repeat(256));
        convert(&src)
    });
    assert!(matches!(result, Err(ConvertError::InputTooDeep { .. })), "{result:?}");
}

#[test]
fn test_long_not_chain_is_rejected_not_overflowed() {
    let result = on_small_stack(|| {
        let src = format!("SELECT a FROM t WHERE {}a = 1", "NOT ".repeat(10_000));
        convert(&src)
    });
    assert!(matches!(result, Err(ConvertError::InputTooDeep { .. })), "{result:?}");
}

#[test]
fn test_huge_flat_or_chain_is_rejected_not_overflowed() {
    let result = on_small_stack(|| {
        let terms: Vec<String> = (0..300_000).map(|i| format!("c = {i}")).collect();
        let src = format!("SELECT a FROM t WHERE {}", terms.join(" OR "));
        convert(&src)
    });
    assert!(matches!(result, Err(ConvertError::InputTooDeep { .. })), "{result:?}");
}

#[test]
fn test_parentheses_inside_comments_do_not_count() {
    let src = format!(
        "SELECT a -- don't {}\nFROM t",
        "(".repeat(200)
    );
    assert_eq!(convert(&src).unwrap(), "SELECT a FROM t");
}

#[test]
fn test_access_operator_precedence_is_kept() {
    let mysql = Config::builder().dialect(Dialect::MySql).build().unwrap();
    assert_eq!(
        convert_with("SELECT a \\ b * c FROM t", &mysql).unwrap(),
        "SELECT a DIV (b * c) FROM t"
    );
    assert_eq!(
        convert("SELECT a \\ b * c FROM t").unwrap(),
        "SELECT DIV(a, (b * c)) FROM t"
    );
    assert_eq!(
        convert("SELECT a MOD b * c FROM t").unwrap(),
        "SELECT a % (b * c) FROM t"
    );
    assert_eq!(
        convert("SELECT a & b - c FROM t").unwrap(),
        "SELECT CONCAT(a, b - c) FROM t"
    );
    assert_eq!(
        convert("SELECT a + b * c - d FROM t").unwrap(),
        "SELECT a + b * c - d FROM t"
    );
}

#[test]
fn test_concat_survives_null_operands() {
    let sqlite = Config::builder().dialect(Dialect::Sqlite).build().unwrap();
    assert_eq!(
        convert("SELECT Title & ' ' & Null FROM t").unwrap(),
        "SELECT CONCAT(Title, ' ', NULL) FROM t"
    );
    assert_eq!(
        convert_with("SELECT Title & Suffix FROM t", &sqlite).unwrap(),
        "SELECT COALESCE(Title, '') || COALESCE(Suffix, '') FROM t"
    );
}

#[test]
fn test_like_wildcards_are_translated() {
    assert_eq!(
        convert("SELECT * FROM Staff WHERE Name LIKE 'Sm?th*' AND Code NOT LIKE \"A_*\"").unwrap(),
        "SELECT * FROM Staff WHERE Name LIKE 'Sm_th%' AND Code NOT LIKE 'A!_%' ESCAPE '!'"
    );
    let err = convert("SELECT * FROM Staff WHERE Phone LIKE '###-####'").unwrap_err();
    assert!(matches!(err, ConvertError::Untranslatable { .. }), "{err}");
}

#[test]
fn test_impossible_dates_are_structural() {
    for src in [
        "SELECT a FROM t WHERE d = #2/31/2024#",
        "SELECT a FROM t WHERE d = #2023-02-29#",
    ] {
        let err = convert(src).unwrap_err();
        assert!(matches!(err, ConvertError::Structural { .. }), "{src}: {err}");
    }
    assert_eq!(
        convert("SELECT a FROM t WHERE d = #2/29/2024 2:30 PM#").unwrap(),
        "SELECT a FROM t WHERE d = TIMESTAMP '2024-02-29 14:30:00'"
    );
}

#[test]
fn test_joins_and_predicates() {
    let sql = convert(
        "SELECT o.*, c.[Company Name] \
         FROM Orders AS o INNER JOIN Customers AS c ON o.CustomerID = c.ID \
         WHERE o.ShippedDate IS NULL AND o.Region NOT IN ('EU', 'US') \
         AND o.Total BETWEEN 10 AND -5 * -2",
    )
    .unwrap();
    assert_eq!(
        sql,
        "SELECT o.*, c.\"Company Name\" \
         FROM Orders AS o INNER JOIN Customers AS c ON o.CustomerID = c.ID \
         WHERE o.ShippedDate IS NULL AND o.Region NOT IN ('EU', 'US') \
         AND o.Total BETWEEN 10 AND -5 * -2"
    );

    assert_eq!(
        convert("SELECT * FROM (a LEFT OUTER JOIN b ON a.x = b.x) RIGHT JOIN c ON b.y = c.y").unwrap(),
        "SELECT * FROM (a LEFT JOIN b ON a.x = b.x) RIGHT JOIN c ON b.y = c.y"
    );
}
