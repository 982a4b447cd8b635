// ABOUTME: Evaluator module interpreting FEEL AST nodes against a scope

use crate::ast::{AstNode, BinOp, CallArgs, ListOp, Pair, StrOp, TzInfo, TzKind};
use crate::context::Scope;
use crate::error::EvalError;
use crate::range::{self, RangeValue};
use crate::registry::{Arguments, Registry};
use crate::temporal::{self, DateTimeValue, TimeValue};
use crate::validators;
use crate::value::{compare, values_equal, Number, Value};
use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;
use std::cmp::Ordering;
use std::rc::Rc;

/// Evaluate an AST node against a scope, resolving registered functions
/// through the given registry. Pure except for `now()`/`today()`.
pub fn eval(node: &AstNode, scope: &Rc<Scope>, registry: &Registry) -> Result<Value, EvalError> {
    match node {
        // Literals
        AstNode::Null => Ok(Value::Null),
        AstNode::Number(n) => Ok(Value::Number(*n)),
        AstNode::Str(s) => Ok(Value::Str(s.clone())),
        AstNode::Bool(b) => Ok(Value::Bool(*b)),

        // Collections
        AstNode::List(items) => {
            let values: Result<Vec<Value>, EvalError> =
                items.iter().map(|item| eval(item, scope, registry)).collect();
            Ok(Value::List(values?))
        }
        AstNode::Context(pairs) => {
            let mut members = IndexMap::new();
            for Pair { key, value } in pairs {
                let value = eval(value, scope, registry)?;
                // A repeated key overwrites the earlier member
                members.insert(key.clone(), value);
            }
            Ok(Value::Context(members))
        }

        // Access
        AstNode::Variable(name) => Ok(scope.get(name).cloned().unwrap_or(Value::Null)),
        AstNode::ContextItem { expr, keys } => {
            let mut current = eval(expr, scope, registry)?;
            for key in keys {
                current = match current {
                    Value::Context(mut members) => {
                        members.swap_remove(key).unwrap_or(Value::Null)
                    }
                    _ => return Ok(Value::Null),
                };
            }
            Ok(current)
        }
        AstNode::ListItem { list, index } => {
            let Value::List(items) = eval(list, scope, registry)? else {
                return Ok(Value::Null);
            };
            let len = items.len() as i64;
            if *index == 0 || index.unsigned_abs() > items.len() as u64 {
                return Ok(Value::Null);
            }
            let at = if *index > 0 { index - 1 } else { len + index };
            Ok(items
                .into_iter()
                .nth(at as usize)
                .unwrap_or(Value::Null))
        }
        AstNode::ListFilter { list, predicate } => {
            let Value::List(items) = eval(list, scope, registry)? else {
                return Ok(Value::Null);
            };
            let mut kept = Vec::new();
            for item in items {
                let mut bindings = IndexMap::new();
                bindings.insert("item".to_string(), item.clone());
                if let Value::Context(members) = &item {
                    for (key, value) in members {
                        bindings.insert(key.clone(), value.clone());
                    }
                }
                // The element is the whole visible scope; a failing
                // predicate (e.g. a missing key) just drops the element.
                let element_scope = Scope::root(bindings);
                match eval(predicate, &element_scope, registry) {
                    Ok(value) if value.is_truthy() => kept.push(item),
                    Ok(_) => {}
                    Err(error) => {
                        tracing::debug!(error = %error, "filter predicate failed, element skipped");
                    }
                }
            }
            Ok(Value::List(kept))
        }

        // Quantifiers
        AstNode::ListEvery {
            iter_pairs,
            predicate,
        } => eval_quantifier(iter_pairs, predicate, true, scope, registry),
        AstNode::ListSome {
            iter_pairs,
            predicate,
        } => eval_quantifier(iter_pairs, predicate, false, scope, registry),

        // Arithmetic and comparison
        AstNode::Binary { op, left, right } => {
            let left = eval(left, scope, registry)?;
            let right = eval(right, scope, registry)?;
            validators::binary_operands(&left, &right)?;
            eval_binary(*op, left, right)
        }
        AstNode::NotEqual { left, right } => {
            let left = eval(left, scope, registry)?;
            let right = eval(right, scope, registry)?;
            Ok(Value::Bool(!values_equal(&left, &right)))
        }

        // Boolean connectives, short-circuiting left to right
        AstNode::And { left, right } => {
            if !eval(left, scope, registry)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval(right, scope, registry)?.is_truthy()))
        }
        AstNode::Or { left, right } => {
            if eval(left, scope, registry)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval(right, scope, registry)?.is_truthy()))
        }
        AstNode::Not(expr) => Ok(Value::Bool(!eval(expr, scope, registry)?.is_truthy())),

        // Intervals
        AstNode::Between { value, low, high } => {
            let value = eval(value, scope, registry)?;
            let low = eval(low, scope, registry)?;
            let high = eval(high, scope, registry)?;
            let lower = ordering_of(&low, &value)?;
            let upper = ordering_of(&value, &high)?;
            Ok(Value::Bool(
                lower != Ordering::Greater && upper != Ordering::Greater,
            ))
        }
        AstNode::Range {
            low,
            high,
            low_bound,
            high_bound,
        } => {
            let low = eval(low, scope, registry)?;
            let high = eval(high, scope, registry)?;
            RangeValue::new(low, high, *low_bound, *high_bound).map(Value::Range)
        }
        AstNode::In { value, target } => {
            let value = eval(value, scope, registry)?;
            match eval(target, scope, registry)? {
                Value::Range(range) => range.contains_point(&value).map(Value::Bool),
                Value::List(items) => Ok(Value::Bool(
                    items.iter().any(|item| values_equal(item, &value)),
                )),
                other => Err(EvalError::validation(format!(
                    "in expects a list or range, got {}",
                    other.type_name()
                ))),
            }
        }

        // Temporal constructors
        AstNode::DateLiteral(literal) => temporal::parse_date(literal).map(Value::Date),
        AstNode::TimeLiteral { literal, zone } => eval_time(literal, zone).map(Value::Time),
        AstNode::DateTimeLiteral { date, time } => {
            let date = eval(date, scope, registry)?;
            let time = eval(time, scope, registry)?;
            match (date, time) {
                (Value::Date(date), Value::Time(time)) => Ok(Value::DateTime(DateTimeValue {
                    datetime: date.and_time(time.time),
                    zone: time.zone,
                })),
                _ => Err(EvalError::evaluation("invalid date and time literal")),
            }
        }
        AstNode::Now => Ok(Value::DateTime(temporal::now())),
        AstNode::Today => Ok(Value::Date(temporal::today())),
        AstNode::DayOfWeek(expr) => {
            let date = date_part(&eval(expr, scope, registry)?)?;
            Ok(Value::str(temporal::day_of_week(date)))
        }
        AstNode::MonthOfYear(expr) => {
            let date = date_part(&eval(expr, scope, registry)?)?;
            Ok(Value::str(temporal::month_of_year(date)))
        }

        // Range predicates
        AstNode::Before { left, right } => {
            let left = eval(left, scope, registry)?;
            let right = eval(right, scope, registry)?;
            range::before(&left, &right).map(Value::Bool)
        }
        AstNode::After { left, right } => {
            let left = eval(left, scope, registry)?;
            let right = eval(right, scope, registry)?;
            range::after(&left, &right).map(Value::Bool)
        }
        AstNode::Includes { left, right } => {
            let left = eval(left, scope, registry)?;
            let right = eval(right, scope, registry)?;
            range::includes(&left, &right).map(Value::Bool)
        }

        // Utilities
        AstNode::GetOrElse { value, default } => {
            let value = eval(value, scope, registry)?;
            let default = eval(default, scope, registry)?;
            Ok(if value == Value::Null { default } else { value })
        }
        AstNode::IsDefined(expr) => {
            let value = eval(expr, scope, registry).unwrap_or_else(|error| {
                tracing::debug!(error = %error, "is defined argument failed, treated as null");
                Value::Null
            });
            Ok(Value::Bool(value != Value::Null))
        }
        AstNode::ToString(expr) => {
            let value = eval(expr, scope, registry)?;
            Ok(Value::Str(match value {
                Value::Str(s) => s,
                other => other.to_string(),
            }))
        }

        // String predicates
        AstNode::StringOp { op, left, right } => {
            let left = eval(left, scope, registry)?;
            let right = eval(right, scope, registry)?;
            validators::string_operands(&left, &right)?;
            match (left, right) {
                (Value::Str(left), Value::Str(right)) => eval_string_op(*op, &left, &right),
                (left, right) => Err(EvalError::validation(format!(
                    "string operation expects strings, got {} and {}",
                    left.type_name(),
                    right.type_name()
                ))),
            }
        }

        // List aggregates
        AstNode::ListOp { op, args } => eval_list_op(*op, args, scope, registry),

        // Invocation pathways
        AstNode::FunctionCall { name, args } => {
            let Some(bound) = scope.get(name).cloned() else {
                return Err(EvalError::UnknownFunction(name.clone()));
            };
            let Value::Function(handle) = bound else {
                return Err(EvalError::evaluation(format!(
                    "{:?} is not callable",
                    name
                )));
            };
            let mut values = Vec::new();
            for arg in args {
                values.push(eval(arg, scope, registry)?);
            }
            let Some(binding) = registry.get(&handle) else {
                return Err(EvalError::UnknownFunction(handle));
            };
            binding.call(Arguments::Positional(values))
        }
        AstNode::FuncInvocation { name, args } => {
            let Some(binding) = registry.get(name) else {
                tracing::debug!(name = %name, "function not registered, invocation yields null");
                return Ok(Value::Null);
            };
            let arguments = match args {
                CallArgs::Positional(items) => {
                    let values: Result<Vec<Value>, EvalError> = items
                        .iter()
                        .map(|item| eval(item, scope, registry))
                        .collect();
                    Arguments::Positional(values?)
                }
                CallArgs::Named(pairs) => {
                    let mut named = IndexMap::new();
                    for (key, expr) in pairs {
                        named.insert(key.clone(), eval(expr, scope, registry)?);
                    }
                    Arguments::Named(named)
                }
            };
            binding.call(arguments)
        }
    }
}

fn ordering_of(left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    compare(left, right).ok_or_else(|| {
        EvalError::validation(format!(
            "values are not comparable: {} and {}",
            left.type_name(),
            right.type_name()
        ))
    })
}

fn eval_binary(op: BinOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Eq => Ok(Value::Bool(values_equal(&left, &right))),
        BinOp::Lt => Ok(Value::Bool(ordering_of(&left, &right)? == Ordering::Less)),
        BinOp::Le => Ok(Value::Bool(ordering_of(&left, &right)? != Ordering::Greater)),
        BinOp::Gt => Ok(Value::Bool(ordering_of(&left, &right)? == Ordering::Greater)),
        BinOp::Ge => Ok(Value::Bool(ordering_of(&left, &right)? != Ordering::Less)),
        BinOp::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.add(b)?)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (left, _) => Err(unsupported_operands("+", &left)),
        },
        BinOp::Sub => numeric_op(op, left, right, |a, b| a.sub(b)),
        BinOp::Mul => numeric_op(op, left, right, |a, b| a.mul(b)),
        BinOp::Div => numeric_op(op, left, right, |a, b| a.div(b)),
        BinOp::Pow => numeric_op(op, left, right, |a, b| a.pow(b)),
    }
}

fn numeric_op(
    op: BinOp,
    left: Value,
    right: Value,
    apply: impl Fn(Number, Number) -> Result<Number, EvalError>,
) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply(a, b)?)),
        (left, _) => Err(unsupported_operands(op_symbol(op), &left)),
    }
}

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Pow => "**",
        BinOp::Eq => "=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
    }
}

fn unsupported_operands(symbol: &str, value: &Value) -> EvalError {
    EvalError::evaluation(format!(
        "unsupported operand type {} for {}",
        value.type_name(),
        symbol
    ))
}

fn eval_quantifier(
    iter_pairs: &[(String, AstNode)],
    predicate: &AstNode,
    every: bool,
    scope: &Rc<Scope>,
    registry: &Registry,
) -> Result<Value, EvalError> {
    let mut names = Vec::new();
    let mut lists = Vec::new();
    for (name, expr) in iter_pairs {
        let value = eval(expr, scope, registry)?;
        let Value::List(items) = value else {
            return Err(EvalError::validation(format!(
                "quantifier source {:?} must be a list, got {}",
                name,
                value.type_name()
            )));
        };
        names.push(name.as_str());
        lists.push(items);
    }
    validators::lists_same_length(&lists)?;

    let len = lists.first().map_or(0, Vec::len);
    for i in 0..len {
        let bindings: IndexMap<String, Value> = names
            .iter()
            .zip(&lists)
            .map(|(name, list)| ((*name).to_string(), list[i].clone()))
            .collect();
        let iteration_scope = Scope::child(scope, bindings);
        let result = eval(predicate, &iteration_scope, registry)?;
        if every {
            if result == Value::Bool(false) {
                return Ok(Value::Bool(false));
            }
        } else if result == Value::Bool(true) {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(every))
}

fn eval_time(literal: &str, zone: &Option<TzInfo>) -> Result<TimeValue, EvalError> {
    let time = temporal::parse_time(literal)?;
    let zone = match zone {
        Some(TzInfo {
            kind: TzKind::Name,
            literal,
        }) => Some(temporal::parse_zone_name(literal)?),
        Some(TzInfo {
            kind: TzKind::Offset,
            literal,
        }) => Some(temporal::parse_zone_offset(literal)?),
        None => None,
    };
    Ok(TimeValue { time, zone })
}

fn date_part(value: &Value) -> Result<NaiveDate, EvalError> {
    match value {
        Value::Date(date) => Ok(*date),
        Value::DateTime(datetime) => Ok(datetime.datetime.date()),
        other => Err(EvalError::validation(format!(
            "expected a date or date and time, got {}",
            other.type_name()
        ))),
    }
}

fn eval_string_op(op: StrOp, left: &str, right: &str) -> Result<Value, EvalError> {
    let result = match op {
        StrOp::Contains => left.contains(right),
        StrOp::StartsWith => left.starts_with(right),
        StrOp::EndsWith => left.ends_with(right),
        // Anchored at the start only: a prefix match, not a full match
        StrOp::Matches => {
            let regex = Regex::new(&format!("^(?:{})", right)).map_err(|error| {
                EvalError::evaluation(format!("invalid regular expression: {}", error))
            })?;
            regex.is_match(left)
        }
    };
    Ok(Value::Bool(result))
}

fn eval_list_op(
    op: ListOp,
    args: &[AstNode],
    scope: &Rc<Scope>,
    registry: &Registry,
) -> Result<Value, EvalError> {
    let list = match args.first() {
        Some(expr) => list_arg(eval(expr, scope, registry)?)?,
        None => return Err(EvalError::evaluation("missing list argument")),
    };
    match op {
        ListOp::Contains => {
            let item = match args.get(1) {
                Some(expr) => eval(expr, scope, registry)?,
                None => return Err(EvalError::evaluation("missing item argument")),
            };
            Ok(Value::Bool(
                list.iter().any(|member| values_equal(member, &item)),
            ))
        }
        ListOp::Count => Ok(Value::int(list.len() as i64)),
        ListOp::All => Ok(Value::Bool(list.iter().all(Value::is_truthy))),
        ListOp::Any => Ok(Value::Bool(list.iter().any(Value::is_truthy))),
    }
}

fn list_arg(value: Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(EvalError::validation(format!(
            "expected a list, got {}",
            other.type_name()
        ))),
    }
}
