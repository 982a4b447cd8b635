// ABOUTME: End-to-end expression tests covering the full FEEL surface

use chrono::{NaiveDate, NaiveTime};
use feel_eval::temporal::{self, DateTimeValue, TimeValue, Zone};
use feel_eval::{evaluate, evaluate_or_null, FeelError, Value};
use indexmap::IndexMap;

fn ctx(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

fn context_value(pairs: &[(&str, Value)]) -> Value {
    Value::Context(ctx(pairs))
}

fn check(cases: &[(&str, IndexMap<String, Value>, Value)]) {
    for (expression, context, expected) in cases {
        let result = evaluate_or_null(expression, context);
        assert_eq!(&result, expected, "expression: {}", expression);
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32, s: u32, zone: Option<Zone>) -> Value {
    Value::Time(TimeValue {
        time: NaiveTime::from_hms_opt(h, m, s).unwrap(),
        zone,
    })
}

fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, zone: Option<Zone>) -> Value {
    Value::DateTime(DateTimeValue {
        datetime: date(y, mo, d).and_time(NaiveTime::from_hms_opt(h, mi, s).unwrap()),
        zone,
    })
}

fn offset(minutes: i32) -> Zone {
    match temporal::parse_zone_offset(&format!(
        "{}{:02}:{:02}",
        if minutes < 0 { '-' } else { '+' },
        minutes.abs() / 60,
        minutes.abs() % 60
    )) {
        Ok(zone) => zone,
        Err(e) => panic!("bad offset fixture: {}", e),
    }
}

#[test]
fn test_null_literal() {
    check(&[("null", ctx(&[]), Value::Null)]);
}

#[test]
fn test_numbers() {
    check(&[
        ("3", ctx(&[]), Value::int(3)),
        ("-4", ctx(&[]), Value::int(-4)),
        ("3.14", ctx(&[]), Value::float(3.14)),
        ("1+2", ctx(&[]), Value::int(3)),
        ("1+2*3", ctx(&[]), Value::int(7)),
        ("2*3+1", ctx(&[]), Value::int(7)),
        ("(1+2)*3", ctx(&[]), Value::int(9)),
        ("2**3", ctx(&[]), Value::int(8)),
        ("7/2", ctx(&[]), Value::float(3.5)),
        (
            "a+b",
            ctx(&[("a", Value::int(1)), ("b", Value::int(2))]),
            Value::int(3),
        ),
    ]);
}

#[test]
fn test_strings() {
    check(&[
        (r#""""#, ctx(&[]), Value::str("")),
        (r#""hello""#, ctx(&[]), Value::str("hello")),
        (r#""order-" + string(123)"#, ctx(&[]), Value::str("order-123")),
        (
            r#""order-" + string(123.1)"#,
            ctx(&[]),
            Value::str("order-123.1"),
        ),
        (r#"starts with("abc", "a")"#, ctx(&[]), Value::Bool(true)),
        (r#"starts with("abc", "b")"#, ctx(&[]), Value::Bool(false)),
        (r#"ends with("cba", "a")"#, ctx(&[]), Value::Bool(true)),
        (r#"ends with("cba", "b")"#, ctx(&[]), Value::Bool(false)),
        (r#"matches("foobar", "^fo*bar")"#, ctx(&[]), Value::Bool(true)),
        (r#"contains("abc", "b")"#, ctx(&[]), Value::Bool(true)),
        (r#"contains("abc", "d")"#, ctx(&[]), Value::Bool(false)),
    ]);
}

#[test]
fn test_booleans_and_comparisons() {
    check(&[
        ("true", ctx(&[]), Value::Bool(true)),
        ("false", ctx(&[]), Value::Bool(false)),
        ("1 = 1", ctx(&[]), Value::Bool(true)),
        ("1 != 1", ctx(&[]), Value::Bool(false)),
        ("2 > 1", ctx(&[]), Value::Bool(true)),
        ("2 < 1", ctx(&[]), Value::Bool(false)),
        ("1 >= 1", ctx(&[]), Value::Bool(true)),
        ("1 <= 1", ctx(&[]), Value::Bool(true)),
        ("5 between 3 and 7", ctx(&[]), Value::Bool(true)),
        ("5 between 3 and 7 and true", ctx(&[]), Value::Bool(true)),
        ("true and false", ctx(&[]), Value::Bool(false)),
        ("false or false", ctx(&[]), Value::Bool(false)),
        ("not(true)", ctx(&[]), Value::Bool(false)),
        ("not(false)", ctx(&[]), Value::Bool(true)),
        ("not(null)", ctx(&[]), Value::Bool(true)),
    ]);
}

#[test]
fn test_lists() {
    check(&[
        ("[]", ctx(&[]), Value::List(vec![])),
        (
            "[1, 2, 3]",
            ctx(&[]),
            Value::List(vec![Value::int(1), Value::int(2), Value::int(3)]),
        ),
        (
            r#"["a", "b"]"#,
            ctx(&[]),
            Value::List(vec![Value::str("a"), Value::str("b")]),
        ),
        (
            r#"[["list"], "of", [["list"]]]"#,
            ctx(&[]),
            Value::List(vec![
                Value::List(vec![Value::str("list")]),
                Value::str("of"),
                Value::List(vec![Value::List(vec![Value::str("list")])]),
            ]),
        ),
        ("[1,2,3,4][-1]", ctx(&[]), Value::int(4)),
        ("[1,2,3,4][-5]", ctx(&[]), Value::Null),
        ("[1,2,3,4][1]", ctx(&[]), Value::int(1)),
        ("[1,2,3,4][5]", ctx(&[]), Value::Null),
        (
            "[1,2,3,4][item > 2]",
            ctx(&[]),
            Value::List(vec![Value::int(3), Value::int(4)]),
        ),
        ("[1,2,3,4][item > 10]", ctx(&[]), Value::List(vec![])),
        (
            "[{x:1, y:2}, {x:2, y:3}][x=1]",
            ctx(&[]),
            Value::List(vec![context_value(&[
                ("x", Value::int(1)),
                ("y", Value::int(2)),
            ])]),
        ),
        (
            "[{x:1, y:2}, {x:2, y:3}, {y:3}][x>1]",
            ctx(&[]),
            Value::List(vec![context_value(&[
                ("x", Value::int(2)),
                ("y", Value::int(3)),
            ])]),
        ),
        // The filter scope sees only the element, not the outer context
        (
            "[{x:1, y:2}, {x:2, y:3}, {y:3}][x>1]",
            ctx(&[("x", Value::int(50))]),
            Value::List(vec![context_value(&[
                ("x", Value::int(2)),
                ("y", Value::int(3)),
            ])]),
        ),
        ("all([true, false])", ctx(&[]), Value::Bool(false)),
        ("all([false, false])", ctx(&[]), Value::Bool(false)),
        ("all([true, true])", ctx(&[]), Value::Bool(true)),
        ("all([])", ctx(&[]), Value::Bool(true)),
        ("any([true, false])", ctx(&[]), Value::Bool(true)),
        ("any([false, false])", ctx(&[]), Value::Bool(false)),
        ("any([true, true])", ctx(&[]), Value::Bool(true)),
        ("any([])", ctx(&[]), Value::Bool(false)),
        ("count([])", ctx(&[]), Value::int(0)),
        ("count([1,2,3,4])", ctx(&[]), Value::int(4)),
        ("list contains([1, 2, 3], 2)", ctx(&[]), Value::Bool(true)),
        ("list contains([1, 2, 3], 5)", ctx(&[]), Value::Bool(false)),
    ]);
}

#[test]
fn test_quantifiers() {
    check(&[
        ("some x in [1,2,3] satisfies x > 2", ctx(&[]), Value::Bool(true)),
        (
            "some x in [4,4,3], y in [2,3,4] satisfies x < y",
            ctx(&[]),
            Value::Bool(true),
        ),
        (
            "some x in [1,2,3], y in [2,3,4], z in [0,0,0] satisfies x > (y+z)",
            ctx(&[]),
            Value::Bool(false),
        ),
        ("every x in [1,2,3] satisfies x > 2", ctx(&[]), Value::Bool(false)),
        (
            "every x in [4,4,3], y in [2,3,4] satisfies x < y",
            ctx(&[]),
            Value::Bool(false),
        ),
        (
            "every x in [4,4,5], y in [2,3,4] satisfies x > y",
            ctx(&[]),
            Value::Bool(true),
        ),
        (
            "every x in [1,2,3], y in [2,3,4], z in [0,0,0] satisfies y > (x+z)",
            ctx(&[]),
            Value::Bool(true),
        ),
        // Unequal source lists fail validation; null in non-raising mode
        (
            "every x in [1,2,3], y in [2,3,4,5] satisfies y > x",
            ctx(&[]),
            Value::Null,
        ),
    ]);
}

#[test]
fn test_quantifier_length_mismatch_raises() {
    let result = evaluate("every x in [1,2,3], y in [2,3,4,5] satisfies y > x", &ctx(&[]));
    assert!(matches!(
        result,
        Err(FeelError::Eval(feel_eval::EvalError::Validation { .. }))
    ));
}

#[test]
fn test_contexts() {
    check(&[
        ("{}", ctx(&[]), context_value(&[])),
        (
            r#"{"a": 1, "b": 2}"#,
            ctx(&[]),
            context_value(&[("a", Value::int(1)), ("b", Value::int(2))]),
        ),
        (r#"{"a": 1, "b": 2}.a"#, ctx(&[]), Value::int(1)),
        // A context literal's members shadow the outer context on access
        (r#"{"a": 1, "b": 2}.a"#, ctx(&[("a", Value::int(4))]), Value::int(1)),
        (r#"{"a": {"c": 3}, "b": 2}.a.c"#, ctx(&[]), Value::int(3)),
        (
            "{a: 1, b: 2}",
            ctx(&[]),
            context_value(&[("a", Value::int(1)), ("b", Value::int(2))]),
        ),
        ("{a: 1, b: 2}.a", ctx(&[]), Value::int(1)),
        ("{a: 1, b: 2}.a", ctx(&[("a", Value::int(2))]), Value::int(1)),
        // Values inside a literal still resolve against the outer context
        ("{a: a, b: 2}.a", ctx(&[("a", Value::int(2))]), Value::int(2)),
        (r#"{a: {"c": 3}, b: 2}.a.c"#, ctx(&[]), Value::int(3)),
        ("{a: {c: 3}, b: 2}.a.c", ctx(&[]), Value::int(3)),
        ("{a: {c: 3}, b: 2}.c", ctx(&[]), Value::Null),
        ("{a: {c: 3}, b: 2}.a.d", ctx(&[]), Value::Null),
        (
            "[{a: 1, b: 2},{a: 2,b: 10}][b<7]",
            ctx(&[]),
            Value::List(vec![context_value(&[
                ("a", Value::int(1)),
                ("b", Value::int(2)),
            ])]),
        ),
    ]);
}

#[test]
fn test_context_literal_round_trip() {
    // Bare-name keys and quoted keys construct equal contexts
    let bare = evaluate("{a: 1, b: 2}", &ctx(&[])).unwrap();
    let quoted = evaluate(r#"{"a": 1, "b": 2}"#, &ctx(&[])).unwrap();
    assert_eq!(bare, quoted);
}

#[test]
fn test_ranges_and_in() {
    check(&[
        ("5 in [1,3,5,7]", ctx(&[]), Value::Bool(true)),
        ("5 in [1..10]", ctx(&[]), Value::Bool(true)),
        ("3 in [1..3]", ctx(&[]), Value::Bool(true)),
        ("5 in [1..3]", ctx(&[]), Value::Bool(false)),
        ("1 in (1..3]", ctx(&[]), Value::Bool(false)),
        ("3 in [1..3)", ctx(&[]), Value::Bool(false)),
        ("2 in (1..3)", ctx(&[]), Value::Bool(true)),
        ("5 in (1..3]", ctx(&[]), Value::Bool(false)),
        ("1.2 in (-1.1..3.2)", ctx(&[]), Value::Bool(true)),
        ("1.2 in (-1.2..1.2)", ctx(&[]), Value::Bool(false)),
        ("-1.3 in (-1.2..1.2)", ctx(&[]), Value::Bool(false)),
        ("1.2 in (-1.1..1.2]", ctx(&[]), Value::Bool(true)),
        ("0 in [-1.1..100)", ctx(&[]), Value::Bool(true)),
        (
            r#"date and time("2023-02-01T00:00:00") in [date and time("2023-01-01T00:00:00")..date and time("2023-03-01T00:00:00")]"#,
            ctx(&[]),
            Value::Bool(true),
        ),
        (
            r#"date and time("2023-03-01T00:00:00") in [date and time("2023-01-01T00:00:00")..date and time("2023-03-01T00:00:00")]"#,
            ctx(&[]),
            Value::Bool(true),
        ),
    ]);
}

#[test]
fn test_temporal_constructors() {
    check(&[
        (
            r#"date("2017-03-10")"#,
            ctx(&[]),
            Value::Date(date(2017, 3, 10)),
        ),
        (r#"time("00:00:00")"#, ctx(&[]), time(0, 0, 0, None)),
        (
            r#"time("00:00:00Z")"#,
            ctx(&[]),
            time(0, 0, 0, Some(Zone::Named(chrono_tz::Tz::UTC))),
        ),
        (
            r#"time("00:00:00@America/Los_Angeles")"#,
            ctx(&[]),
            time(0, 0, 0, Some(Zone::Named(chrono_tz::Tz::America__Los_Angeles))),
        ),
        (
            r#"time("00:00:00+08:00")"#,
            ctx(&[]),
            time(0, 0, 0, Some(offset(480))),
        ),
        (
            r#"time("00:00:00-08:10")"#,
            ctx(&[]),
            time(0, 0, 0, Some(offset(-490))),
        ),
        (
            r#"date and time("2017-03-10T00:00:00")"#,
            ctx(&[]),
            datetime(2017, 3, 10, 0, 0, 0, None),
        ),
        (
            r#"date and time("2017-03-10T00:00:00 +08:00")"#,
            ctx(&[]),
            datetime(2017, 3, 10, 0, 0, 0, Some(offset(480))),
        ),
        (
            r#"date and time("2021-01-01T00:00:00@America/Los_Angeles")"#,
            ctx(&[]),
            datetime(
                2021,
                1,
                1,
                0,
                0,
                0,
                Some(Zone::Named(chrono_tz::Tz::America__Los_Angeles)),
            ),
        ),
        (
            r#"date and time("2022-01-01T00:00:00+08:00") < date and time("2022-01-01T00:00:00Z")"#,
            ctx(&[]),
            Value::Bool(true),
        ),
        ("today()", ctx(&[]), Value::Date(temporal::today())),
        (
            r#"day of week(date("2023-08-21"))"#,
            ctx(&[]),
            Value::str("Monday"),
        ),
        (
            r#"day of week(date and time("2023-08-21T00:00:00"))"#,
            ctx(&[]),
            Value::str("Monday"),
        ),
        (
            r#"month of year(date("2019-09-17"))"#,
            ctx(&[]),
            Value::str("September"),
        ),
    ]);
}

#[test]
fn test_now_is_a_naive_datetime() {
    let result = evaluate("now()", &ctx(&[])).unwrap();
    match result {
        Value::DateTime(dt) => assert!(dt.zone.is_none()),
        other => panic!("expected a date and time, got {:?}", other),
    }
}

#[test]
fn test_range_predicates() {
    check(&[
        ("before(1,10)", ctx(&[]), Value::Bool(true)),
        ("before(10,1)", ctx(&[]), Value::Bool(false)),
        ("before([1..5],10)", ctx(&[]), Value::Bool(true)),
        ("before(1,[2..5])", ctx(&[]), Value::Bool(true)),
        ("before((1..5),5)", ctx(&[]), Value::Bool(true)),
        ("before(2,(2..5])", ctx(&[]), Value::Bool(true)),
        ("before(2,[2..5])", ctx(&[]), Value::Bool(false)),
        ("before([1..5], [6..10])", ctx(&[]), Value::Bool(true)),
        ("before([1..5], [3..10])", ctx(&[]), Value::Bool(false)),
        ("after(12, [2..5])", ctx(&[]), Value::Bool(true)),
        ("after([2..5], 12)", ctx(&[]), Value::Bool(false)),
        ("after([6..10], [1..5])", ctx(&[]), Value::Bool(true)),
        ("after([5..10], [1..5])", ctx(&[]), Value::Bool(false)),
        ("after((5..10], [1..5])", ctx(&[]), Value::Bool(true)),
        ("includes([5..10], 6)", ctx(&[]), Value::Bool(true)),
        ("includes([3..4], 5)", ctx(&[]), Value::Bool(false)),
        ("includes([1..10], [4..6])", ctx(&[]), Value::Bool(true)),
        ("includes([5..8], [1..5])", ctx(&[]), Value::Bool(false)),
        ("includes([1..10], (1..10))", ctx(&[]), Value::Bool(true)),
        ("includes([1..5), [1..5])", ctx(&[]), Value::Bool(false)),
    ]);
}

#[test]
fn test_is_defined_and_get_or_else() {
    check(&[
        ("is defined(1)", ctx(&[]), Value::Bool(true)),
        ("is defined(null)", ctx(&[]), Value::Bool(false)),
        ("is defined(x)", ctx(&[]), Value::Bool(false)),
        ("is defined(x)", ctx(&[("x", Value::int(1))]), Value::Bool(true)),
        ("is defined(x.y)", ctx(&[("x", Value::int(1))]), Value::Bool(false)),
        (r#"get or else(null, "abc")"#, ctx(&[]), Value::str("abc")),
        ("get or else(0, 1)", ctx(&[]), Value::int(0)),
        ("get or else(null, null)", ctx(&[]), Value::Null),
    ]);
}

#[test]
fn test_missing_user_function_yields_null() {
    check(&[("func not exist()", ctx(&[]), Value::Null)]);
}
