// ABOUTME: Parser module turning FEEL source text into AST nodes using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{map, not, opt, peek, recognize, verify},
    multi::{many1, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult, Parser,
};

use crate::ast::{AstNode, BinOp, CallArgs, ListOp, Pair, StrOp, TzInfo, TzKind};
use crate::range::Bound;
use crate::value::Number;

/// Words that can never be names: they terminate or introduce constructs.
const RESERVED_WORDS: &[&str] = &[
    "true", "false", "null", "and", "or", "in", "between", "some", "every", "satisfies",
];

// ============================================================================
// Token Helpers
// ============================================================================

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A punctuation token, skipping leading whitespace
fn tok<'a>(t: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| preceded(multispace0, tag(t)).parse(input)
}

/// A keyword token: the word must end at a word boundary
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| {
        terminated(
            preceded(multispace0, tag(word)),
            not(peek(satisfy(is_ident_char))),
        )
        .parse(input)
    }
}

/// A multi-word keyword phrase, e.g. `date and time` or `starts with`
fn phrase<'a>(words: &'static [&'static str]) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    move |input| {
        let mut rest = input;
        for word in words {
            let (next, _) = keyword(word)(rest)?;
            rest = next;
        }
        Ok((rest, ()))
    }
}

/// An identifier, reserved words included
fn identifier(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        recognize(pair(satisfy(is_ident_start), take_while(is_ident_char))),
    )
    .parse(input)
}

/// An identifier that is not a reserved word
fn name(input: &str) -> IResult<&str, &str> {
    verify(identifier, |s: &&str| !RESERVED_WORDS.contains(s)).parse(input)
}

/// A double-quoted string literal; the quotes are dropped and the content is
/// kept verbatim (no escape processing).
fn string_literal(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
    )
    .parse(input)
}

/// A signed integer token, used for list indexing
fn signed_int(input: &str) -> IResult<&str, i64> {
    let (rest, text) =
        preceded(multispace0, recognize(pair(opt(char('-')), digit1))).parse(input)?;
    match text.parse() {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

/// A signed number literal: integer when lossless, float otherwise
fn number_literal(input: &str) -> IResult<&str, AstNode> {
    let (rest, text) = preceded(
        multispace0,
        recognize((
            opt(char('-')),
            digit1,
            opt(recognize((char('.'), digit1))),
        )),
    )
    .parse(input)?;
    let number = if text.contains('.') {
        Number::Float(text.parse().expect("failed to parse number"))
    } else {
        match text.parse::<i64>() {
            Ok(i) => Number::Int(i),
            Err(_) => Number::Float(text.parse().expect("failed to parse number")),
        }
    };
    Ok((rest, AstNode::Number(number)))
}

// ============================================================================
// Temporal Literals
// ============================================================================

/// Split a zone suffix (`@Area/City`, `Z`, or `±HH:MM`) off a time payload.
fn split_time_zone(payload: &str) -> (String, Option<TzInfo>) {
    if let Some((time, zone)) = payload.split_once('@') {
        return (
            time.trim().to_string(),
            Some(TzInfo {
                kind: TzKind::Name,
                literal: zone.trim().to_string(),
            }),
        );
    }
    if let Some(time) = payload.strip_suffix('Z') {
        return (
            time.trim().to_string(),
            Some(TzInfo {
                kind: TzKind::Name,
                literal: "UTC".to_string(),
            }),
        );
    }
    if let Some(pos) = payload.rfind(['+', '-']) {
        let suffix = &payload[pos..];
        if suffix.len() >= 6 && suffix.as_bytes().get(3) == Some(&b':') {
            return (
                payload[..pos].trim().to_string(),
                Some(TzInfo {
                    kind: TzKind::Offset,
                    literal: suffix.trim().to_string(),
                }),
            );
        }
    }
    (payload.trim().to_string(), None)
}

fn time_node(payload: &str) -> AstNode {
    let (literal, zone) = split_time_zone(payload);
    AstNode::TimeLiteral { literal, zone }
}

fn date_time_node(payload: &str) -> AstNode {
    // A payload without the `T` separator still builds a node; the date
    // parse fails at evaluation time with an invalid-literal error.
    let (date, time) = payload.split_once('T').unwrap_or((payload, ""));
    AstNode::DateTimeLiteral {
        date: AstNode::DateLiteral(date.trim().to_string()).boxed(),
        time: time_node(time).boxed(),
    }
}

fn temporal_builtin(input: &str) -> IResult<&str, AstNode> {
    alt((
        map(
            preceded(phrase(&["date", "and", "time"]), paren_string),
            |payload| date_time_node(payload),
        ),
        map(preceded(phrase(&["date"]), paren_string), |payload| {
            AstNode::DateLiteral(payload.trim().to_string())
        }),
        map(preceded(phrase(&["time"]), paren_string), time_node),
    ))
    .parse(input)
}

/// `( "..." )` — a single string-literal argument
fn paren_string(input: &str) -> IResult<&str, &str> {
    delimited(tok("("), string_literal, tok(")")).parse(input)
}

// ============================================================================
// Built-in Functions
// ============================================================================

/// `( expr )` — a single argument
fn args1(input: &str) -> IResult<&str, AstNode> {
    delimited(tok("("), expression, tok(")")).parse(input)
}

/// `( expr, expr )` — two arguments
fn args2(input: &str) -> IResult<&str, (AstNode, AstNode)> {
    delimited(
        tok("("),
        separated_pair(expression, tok(","), expression),
        tok(")"),
    )
    .parse(input)
}

/// `( )` — no arguments
fn args0(input: &str) -> IResult<&str, ()> {
    map(pair(tok("("), tok(")")), |_| ()).parse(input)
}

fn string_builtin(input: &str) -> IResult<&str, AstNode> {
    let string_op = |op: StrOp| {
        move |(left, right): (AstNode, AstNode)| AstNode::StringOp {
            op,
            left: left.boxed(),
            right: right.boxed(),
        }
    };
    alt((
        map(
            preceded(phrase(&["starts", "with"]), args2),
            string_op(StrOp::StartsWith),
        ),
        map(
            preceded(phrase(&["ends", "with"]), args2),
            string_op(StrOp::EndsWith),
        ),
        map(
            preceded(phrase(&["contains"]), args2),
            string_op(StrOp::Contains),
        ),
        map(
            preceded(phrase(&["matches"]), args2),
            string_op(StrOp::Matches),
        ),
        map(preceded(phrase(&["string"]), args1), |arg| {
            AstNode::ToString(arg.boxed())
        }),
    ))
    .parse(input)
}

fn list_builtin(input: &str) -> IResult<&str, AstNode> {
    alt((
        map(
            preceded(phrase(&["list", "contains"]), args2),
            |(list, item)| AstNode::ListOp {
                op: ListOp::Contains,
                args: vec![list, item],
            },
        ),
        map(preceded(phrase(&["count"]), args1), |list| AstNode::ListOp {
            op: ListOp::Count,
            args: vec![list],
        }),
        map(preceded(phrase(&["all"]), args1), |list| AstNode::ListOp {
            op: ListOp::All,
            args: vec![list],
        }),
        map(preceded(phrase(&["any"]), args1), |list| AstNode::ListOp {
            op: ListOp::Any,
            args: vec![list],
        }),
    ))
    .parse(input)
}

fn range_builtin(input: &str) -> IResult<&str, AstNode> {
    alt((
        map(preceded(phrase(&["before"]), args2), |(left, right)| {
            AstNode::Before {
                left: left.boxed(),
                right: right.boxed(),
            }
        }),
        map(preceded(phrase(&["after"]), args2), |(left, right)| {
            AstNode::After {
                left: left.boxed(),
                right: right.boxed(),
            }
        }),
        map(preceded(phrase(&["includes"]), args2), |(left, right)| {
            AstNode::Includes {
                left: left.boxed(),
                right: right.boxed(),
            }
        }),
    ))
    .parse(input)
}

fn misc_builtin(input: &str) -> IResult<&str, AstNode> {
    alt((
        map(preceded(phrase(&["not"]), args1), |arg| {
            AstNode::Not(arg.boxed())
        }),
        map(preceded(phrase(&["now"]), args0), |_| AstNode::Now),
        map(preceded(phrase(&["today"]), args0), |_| AstNode::Today),
        map(preceded(phrase(&["day", "of", "week"]), args1), |arg| {
            AstNode::DayOfWeek(arg.boxed())
        }),
        map(preceded(phrase(&["month", "of", "year"]), args1), |arg| {
            AstNode::MonthOfYear(arg.boxed())
        }),
        map(preceded(phrase(&["is", "defined"]), args1), |arg| {
            AstNode::IsDefined(arg.boxed())
        }),
        map(
            preceded(phrase(&["get", "or", "else"]), args2),
            |(value, default)| AstNode::GetOrElse {
                value: value.boxed(),
                default: default.boxed(),
            },
        ),
    ))
    .parse(input)
}

fn builtin_call(input: &str) -> IResult<&str, AstNode> {
    alt((
        temporal_builtin,
        string_builtin,
        list_builtin,
        range_builtin,
        misc_builtin,
    ))
    .parse(input)
}

// ============================================================================
// Calls and Variables
// ============================================================================

fn named_args(input: &str) -> IResult<&str, Vec<(String, AstNode)>> {
    separated_list1(
        tok(","),
        separated_pair(map(name, String::from), tok(":"), expression),
    )
    .parse(input)
}

/// A call through one of the two invocation pathways: single-word positional
/// calls resolve against the context, multi-word or named-argument calls
/// resolve against the function registry.
fn call_or_invocation(input: &str) -> IResult<&str, AstNode> {
    let (rest, words) = many1(name).parse(input)?;
    let (rest, _) = tok("(")(rest)?;

    if let Ok((after_args, named)) = named_args(rest) {
        if let Ok((after_close, _)) = tok(")")(after_args) {
            return Ok((
                after_close,
                AstNode::FuncInvocation {
                    name: words.join(" "),
                    args: CallArgs::Named(named),
                },
            ));
        }
    }

    let (rest, args) = separated_list0(tok(","), expression).parse(rest)?;
    let (rest, _) = tok(")")(rest)?;
    let node = if words.len() == 1 {
        AstNode::FunctionCall {
            name: words[0].to_string(),
            args,
        }
    } else {
        AstNode::FuncInvocation {
            name: words.join(" "),
            args: CallArgs::Positional(args),
        }
    };
    Ok((rest, node))
}

fn variable(input: &str) -> IResult<&str, AstNode> {
    map(name, |n| AstNode::Variable(n.to_string())).parse(input)
}

// ============================================================================
// Collections and Ranges
// ============================================================================

fn list_literal(input: &str) -> IResult<&str, AstNode> {
    map(
        delimited(tok("["), separated_list0(tok(","), expression), tok("]")),
        AstNode::List,
    )
    .parse(input)
}

fn pair_rule(input: &str) -> IResult<&str, Pair> {
    let (rest, key) = alt((map(string_literal, String::from), map(name, String::from)))
        .parse(input)?;
    let (rest, _) = tok(":")(rest)?;
    let (rest, value) = expression(rest)?;
    Ok((rest, Pair { key, value }))
}

fn context_literal(input: &str) -> IResult<&str, AstNode> {
    map(
        delimited(tok("{"), separated_list0(tok(","), pair_rule), tok("}")),
        AstNode::Context,
    )
    .parse(input)
}

/// An endpoint of a range literal: a number, a temporal constructor, or a name
fn range_atom(input: &str) -> IResult<&str, AstNode> {
    alt((temporal_builtin, number_literal, variable)).parse(input)
}

fn range_literal(input: &str) -> IResult<&str, AstNode> {
    let (rest, open) = preceded(multispace0, alt((char('['), char('(')))).parse(input)?;
    let (rest, low) = range_atom(rest)?;
    let (rest, _) = tok("..")(rest)?;
    let (rest, high) = range_atom(rest)?;
    let (rest, close) = preceded(multispace0, alt((char(']'), char(')')))).parse(rest)?;
    let low_bound = if open == '[' { Bound::Closed } else { Bound::Open };
    let high_bound = if close == ']' { Bound::Closed } else { Bound::Open };
    Ok((
        rest,
        AstNode::Range {
            low: low.boxed(),
            high: high.boxed(),
            low_bound,
            high_bound,
        },
    ))
}

// ============================================================================
// Quantifiers
// ============================================================================

fn iter_pair(input: &str) -> IResult<&str, (String, AstNode)> {
    let (rest, binding) = name(input)?;
    let (rest, _) = keyword("in")(rest)?;
    let (rest, list) = expression(rest)?;
    Ok((rest, (binding.to_string(), list)))
}

fn quantifier(input: &str) -> IResult<&str, AstNode> {
    let (rest, which) = alt((keyword("some"), keyword("every"))).parse(input)?;
    let (rest, iter_pairs) = separated_list1(tok(","), iter_pair).parse(rest)?;
    let (rest, _) = keyword("satisfies")(rest)?;
    let (rest, predicate) = expression(rest)?;
    let node = if which == "some" {
        AstNode::ListSome {
            iter_pairs,
            predicate: predicate.boxed(),
        }
    } else {
        AstNode::ListEvery {
            iter_pairs,
            predicate: predicate.boxed(),
        }
    };
    Ok((rest, node))
}

// ============================================================================
// Expression Grammar (precedence layers, loosest first: or, and, in,
// comparison/between, + -, * /, **, postfix, primary)
// ============================================================================

fn paren(input: &str) -> IResult<&str, AstNode> {
    delimited(tok("("), expression, tok(")")).parse(input)
}

fn literal_keyword(input: &str) -> IResult<&str, AstNode> {
    alt((
        map(keyword("true"), |_| AstNode::Bool(true)),
        map(keyword("false"), |_| AstNode::Bool(false)),
        map(keyword("null"), |_| AstNode::Null),
    ))
    .parse(input)
}

fn string_node(input: &str) -> IResult<&str, AstNode> {
    map(string_literal, |s| AstNode::Str(s.to_string())).parse(input)
}

fn primary(input: &str) -> IResult<&str, AstNode> {
    alt((
        quantifier,
        builtin_call,
        range_literal,
        paren,
        list_literal,
        context_literal,
        number_literal,
        string_node,
        literal_keyword,
        call_or_invocation,
        variable,
    ))
    .parse(input)
}

enum Trailer {
    Index(i64),
    Filter(AstNode),
    Key(String),
}

fn trailer(input: &str) -> IResult<&str, Trailer> {
    alt((
        map(preceded(tok("."), identifier), |key| {
            Trailer::Key(key.to_string())
        }),
        map(delimited(tok("["), signed_int, tok("]")), Trailer::Index),
        map(delimited(tok("["), expression, tok("]")), Trailer::Filter),
    ))
    .parse(input)
}

/// Postfix trailers: `[int]` list access, `[expr]` list filter, `.key` chains
fn postfix(input: &str) -> IResult<&str, AstNode> {
    let (mut rest, mut node) = primary(input)?;
    while let Ok((next, t)) = trailer(rest) {
        node = match t {
            Trailer::Index(index) => AstNode::ListItem {
                list: node.boxed(),
                index,
            },
            Trailer::Filter(predicate) => AstNode::ListFilter {
                list: node.boxed(),
                predicate: predicate.boxed(),
            },
            // Consecutive `.a.b` accesses collapse into one keyed walk
            Trailer::Key(key) => match node {
                AstNode::ContextItem { expr, mut keys } => {
                    keys.push(key);
                    AstNode::ContextItem { expr, keys }
                }
                other => AstNode::ContextItem {
                    expr: other.boxed(),
                    keys: vec![key],
                },
            },
        };
        rest = next;
    }
    Ok((rest, node))
}

fn power(input: &str) -> IResult<&str, AstNode> {
    let (rest, base) = postfix(input)?;
    match preceded(tok("**"), power).parse(rest) {
        Ok((rest, exponent)) => Ok((
            rest,
            AstNode::Binary {
                op: BinOp::Pow,
                left: base.boxed(),
                right: exponent.boxed(),
            },
        )),
        Err(_) => Ok((rest, base)),
    }
}

fn multiplicative(input: &str) -> IResult<&str, AstNode> {
    let (mut rest, mut node) = power(input)?;
    loop {
        let op = if let Ok((next, _)) = tok("*")(rest) {
            rest = next;
            BinOp::Mul
        } else if let Ok((next, _)) = tok("/")(rest) {
            rest = next;
            BinOp::Div
        } else {
            break;
        };
        let (next, right) = power(rest)?;
        node = AstNode::Binary {
            op,
            left: node.boxed(),
            right: right.boxed(),
        };
        rest = next;
    }
    Ok((rest, node))
}

fn additive(input: &str) -> IResult<&str, AstNode> {
    let (mut rest, mut node) = multiplicative(input)?;
    loop {
        let op = if let Ok((next, _)) = tok("+")(rest) {
            rest = next;
            BinOp::Add
        } else if let Ok((next, _)) = tok("-")(rest) {
            rest = next;
            BinOp::Sub
        } else {
            break;
        };
        let (next, right) = multiplicative(rest)?;
        node = AstNode::Binary {
            op,
            left: node.boxed(),
            right: right.boxed(),
        };
        rest = next;
    }
    Ok((rest, node))
}

/// Comparison operators and `between X and Y`, both non-associative
fn comparison(input: &str) -> IResult<&str, AstNode> {
    let (rest, left) = additive(input)?;

    if let Ok((rest, _)) = keyword("between")(rest) {
        let (rest, low) = additive(rest)?;
        let (rest, _) = keyword("and")(rest)?;
        let (rest, high) = additive(rest)?;
        return Ok((
            rest,
            AstNode::Between {
                value: left.boxed(),
                low: low.boxed(),
                high: high.boxed(),
            },
        ));
    }

    let op_parse = alt((
        tok("<="),
        tok(">="),
        tok("!="),
        tok("="),
        tok("<"),
        tok(">"),
    ))
    .parse(rest);
    match op_parse {
        Ok((rest, op_text)) => {
            let (rest, right) = additive(rest)?;
            let node = match op_text {
                "!=" => AstNode::NotEqual {
                    left: left.boxed(),
                    right: right.boxed(),
                },
                _ => {
                    let op = match op_text {
                        "<=" => BinOp::Le,
                        ">=" => BinOp::Ge,
                        "=" => BinOp::Eq,
                        "<" => BinOp::Lt,
                        _ => BinOp::Gt,
                    };
                    AstNode::Binary {
                        op,
                        left: left.boxed(),
                        right: right.boxed(),
                    }
                }
            };
            Ok((rest, node))
        }
        Err(_) => Ok((rest, left)),
    }
}

fn in_expr(input: &str) -> IResult<&str, AstNode> {
    let (rest, left) = comparison(input)?;
    match keyword("in")(rest) {
        Ok((rest, _)) => {
            let (rest, target) = comparison(rest)?;
            Ok((
                rest,
                AstNode::In {
                    value: left.boxed(),
                    target: target.boxed(),
                },
            ))
        }
        Err(_) => Ok((rest, left)),
    }
}

fn and_expr(input: &str) -> IResult<&str, AstNode> {
    let (mut rest, mut node) = in_expr(input)?;
    while let Ok((next, _)) = keyword("and")(rest) {
        let (next, right) = in_expr(next)?;
        node = AstNode::And {
            left: node.boxed(),
            right: right.boxed(),
        };
        rest = next;
    }
    Ok((rest, node))
}

fn or_expr(input: &str) -> IResult<&str, AstNode> {
    let (mut rest, mut node) = and_expr(input)?;
    while let Ok((next, _)) = keyword("or")(rest) {
        let (next, right) = and_expr(next)?;
        node = AstNode::Or {
            left: node.boxed(),
            right: right.boxed(),
        };
        rest = next;
    }
    Ok((rest, node))
}

pub(crate) fn expression(input: &str) -> IResult<&str, AstNode> {
    or_expr(input)
}

/// Public entry point for parsing a complete FEEL expression
pub fn parse(input: &str) -> Result<AstNode, String> {
    match expression(input) {
        Ok((rest, node)) => {
            if rest.trim().is_empty() {
                Ok(node)
            } else {
                Err(format!("unexpected trailing input: '{}'", rest.trim()))
            }
        }
        Err(e) => Err(format!("{:?}", e)),
    }
}
