// ABOUTME: Runtime value model for FEEL expressions

use crate::error::EvalError;
use crate::range::RangeValue;
use crate::temporal::{DateTimeValue, TimeValue};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;

/// A FEEL number: integer-preferring, falling back to floating point.
///
/// Literals parse as `Int` when the text is a lossless integer, otherwise as
/// `Float`. Mixed comparisons treat both variants as ordinary real numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn add(self, other: Number) -> Result<Number, EvalError> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .ok_or_else(|| EvalError::evaluation("integer overflow in addition")),
            _ => Ok(Number::Float(self.as_f64() + other.as_f64())),
        }
    }

    pub fn sub(self, other: Number) -> Result<Number, EvalError> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Number::Int)
                .ok_or_else(|| EvalError::evaluation("integer overflow in subtraction")),
            _ => Ok(Number::Float(self.as_f64() - other.as_f64())),
        }
    }

    pub fn mul(self, other: Number) -> Result<Number, EvalError> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Number::Int)
                .ok_or_else(|| EvalError::evaluation("integer overflow in multiplication")),
            _ => Ok(Number::Float(self.as_f64() * other.as_f64())),
        }
    }

    /// Division always produces a float, as in true division.
    pub fn div(self, other: Number) -> Result<Number, EvalError> {
        if other.as_f64() == 0.0 {
            return Err(EvalError::evaluation("division by zero"));
        }
        Ok(Number::Float(self.as_f64() / other.as_f64()))
    }

    /// Exponentiation. Integer base and non-negative integer exponent stay
    /// integral; anything else goes through floating point.
    pub fn pow(self, other: Number) -> Result<Number, EvalError> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) if b >= 0 => {
                let exp = u32::try_from(b)
                    .map_err(|_| EvalError::evaluation("integer overflow in exponentiation"))?;
                a.checked_pow(exp)
                    .map(Number::Int)
                    .ok_or_else(|| EvalError::evaluation("integer overflow in exponentiation"))
            }
            _ => Ok(Number::Float(self.as_f64().powf(other.as_f64()))),
        }
    }

    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }

    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// The tagged union of FEEL runtime values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(Number),
    Bool(bool),
    Str(String),
    Date(NaiveDate),
    Time(TimeValue),
    DateTime(DateTimeValue),
    List(Vec<Value>),
    /// Ordered key-value mapping; insertion order is observable.
    Context(IndexMap<String, Value>),
    Range(RangeValue),
    /// Opaque handle resolvable through the function registry.
    Function(String),
}

impl Value {
    /// Integer number constructor
    pub fn int(i: i64) -> Value {
        Value::Number(Number::Int(i))
    }

    /// Float number constructor
    pub fn float(f: f64) -> Value {
        Value::Number(Number::Float(f))
    }

    /// String constructor
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "date and time",
            Value::List(_) => "list",
            Value::Context(_) => "context",
            Value::Range(_) => "range",
            Value::Function(_) => "function",
        }
    }

    /// Truthiness: null, false, numeric zero, the empty string, the empty
    /// list, and the empty context are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Context(pairs) => !pairs.is_empty(),
            _ => true,
        }
    }

    /// Whether two values belong to the same type for operand validation.
    /// Integers and floats both count as numbers.
    pub fn same_type(&self, other: &Value) -> bool {
        self.type_name() == other.type_name()
    }
}

/// Order two values when they are mutually comparable. Numbers compare as
/// reals; zoned times and date-times compare through UTC.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.compare(*y),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::Time(x), Value::Time(y)) => x.compare(y),
        (Value::DateTime(x), Value::DateTime(y)) => x.compare(y),
        _ => None,
    }
}

/// Loose equality: never fails, mismatched types are simply unequal.
/// Used by `=` (after operand validation) and `!=` (without).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Number(x), Value::Number(y)) => x.compare(*y) == Some(Ordering::Equal),
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Context(xs), Value::Context(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        (Value::Time(_), Value::Time(_)) | (Value::DateTime(_), Value::DateTime(_)) => {
            compare(a, b) == Some(Ordering::Equal) || a == b
        }
        _ => a == b,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Context(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Range(r) => write!(f, "{}", r),
            Value::Function(name) => write!(f, "#<function {}>", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(format!("{}", Value::int(42)), "42");
        assert_eq!(format!("{}", Value::float(-2.5)), "-2.5");
        assert_eq!(format!("{}", Value::int(0)), "0");
    }

    #[test]
    fn test_list_display_with_nested_lists() {
        let nested = Value::List(vec![
            Value::int(1),
            Value::List(vec![Value::int(2), Value::int(3)]),
        ]);
        assert_eq!(format!("{}", nested), "[1, [2, 3]]");
        assert_eq!(format!("{}", Value::List(vec![])), "[]");
    }

    #[test]
    fn test_context_display_preserves_insertion_order() {
        let mut pairs = IndexMap::new();
        pairs.insert("b".to_string(), Value::int(2));
        pairs.insert("a".to_string(), Value::int(1));
        assert_eq!(format!("{}", Value::Context(pairs)), "{b: 2, a: 1}");
    }

    #[test]
    fn test_mixed_numeric_comparison() {
        assert_eq!(
            Number::Int(1).compare(Number::Float(1.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Number::Int(2).compare(Number::Float(1.5)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_integer_arithmetic_stays_integral() {
        assert_eq!(Number::Int(2).add(Number::Int(3)).unwrap(), Number::Int(5));
        assert_eq!(Number::Int(2).pow(Number::Int(10)).unwrap(), Number::Int(1024));
    }

    #[test]
    fn test_division_is_true_division() {
        assert_eq!(
            Number::Int(7).div(Number::Int(2)).unwrap(),
            Number::Float(3.5)
        );
        assert!(Number::Int(1).div(Number::Int(0)).is_err());
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        assert!(Number::Int(i64::MAX).add(Number::Int(1)).is_err());
        assert!(Number::Int(2).pow(Number::Int(64)).is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::int(0).is_truthy());
        assert!(!Value::str("").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::int(-1).is_truthy());
        assert!(Value::str("x").is_truthy());
    }

    #[test]
    fn test_loose_equality_across_numeric_variants() {
        assert!(values_equal(&Value::int(1), &Value::float(1.0)));
        assert!(!values_equal(&Value::int(1), &Value::str("1")));
        assert!(values_equal(
            &Value::List(vec![Value::int(1)]),
            &Value::List(vec![Value::float(1.0)])
        ));
    }
}
