//! Interval values and the range algebra behind `before`, `after`,
//! `includes`, and `in`.
//!
//! A range has independently open or closed endpoints; the endpoints may be
//! numbers, dates, or date-times, as long as they are mutually comparable.
//! `low <= high` is not enforced: a reversed range simply contains nothing.

use crate::error::EvalError;
use crate::value::{compare, Value};
use std::cmp::Ordering;
use std::fmt;

/// Endpoint kind, taken directly from the syntax: `[`/`]` closed, `(`/`)` open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Open,
    Closed,
}

/// An interval value with independently bounded endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeValue {
    pub low: Box<Value>,
    pub high: Box<Value>,
    pub low_bound: Bound,
    pub high_bound: Bound,
}

impl RangeValue {
    /// Build a range, requiring mutually comparable endpoints.
    pub fn new(
        low: Value,
        high: Value,
        low_bound: Bound,
        high_bound: Bound,
    ) -> Result<RangeValue, EvalError> {
        if compare(&low, &high).is_none() {
            return Err(EvalError::validation(format!(
                "range endpoints must be comparable, got {} and {}",
                low.type_name(),
                high.type_name()
            )));
        }
        Ok(RangeValue {
            low: Box::new(low),
            high: Box::new(high),
            low_bound,
            high_bound,
        })
    }

    /// Point membership, honoring each endpoint's bound kind.
    pub fn contains_point(&self, value: &Value) -> Result<bool, EvalError> {
        let low = compare(value, &self.low).ok_or_else(|| not_comparable(value, &self.low))?;
        let high = compare(value, &self.high).ok_or_else(|| not_comparable(value, &self.high))?;
        let above_low = match self.low_bound {
            Bound::Closed => low != Ordering::Less,
            Bound::Open => low == Ordering::Greater,
        };
        let below_high = match self.high_bound {
            Bound::Closed => high != Ordering::Greater,
            Bound::Open => high == Ordering::Less,
        };
        Ok(above_low && below_high)
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.low_bound == Bound::Closed { '[' } else { '(' };
        let close = if self.high_bound == Bound::Closed { ']' } else { ')' };
        write!(f, "{}{}..{}{}", open, self.low, self.high, close)
    }
}

fn not_comparable(a: &Value, b: &Value) -> EvalError {
    EvalError::validation(format!(
        "values are not comparable: {} and {}",
        a.type_name(),
        b.type_name()
    ))
}

/// `before(a, b)`: does everything in `a` lie strictly before everything in
/// `b`? Point operands stand for themselves; a range contributes its facing
/// endpoint, and an open facing endpoint relaxes the comparison to allow
/// touching.
pub fn before(a: &Value, b: &Value) -> Result<bool, EvalError> {
    let mut allow_touching = false;
    let left = match a {
        Value::Range(r) => {
            if r.high_bound == Bound::Open {
                allow_touching = true;
            }
            &r.high
        }
        other => other,
    };
    let right = match b {
        Value::Range(r) => {
            if r.low_bound == Bound::Open {
                allow_touching = true;
            }
            &r.low
        }
        other => other,
    };
    let ord = compare(left, right).ok_or_else(|| not_comparable(left, right))?;
    Ok(if allow_touching {
        ord != Ordering::Greater
    } else {
        ord == Ordering::Less
    })
}

/// `after(a, b)`: the mirror of [`before`].
pub fn after(a: &Value, b: &Value) -> Result<bool, EvalError> {
    let mut allow_touching = false;
    let left = match a {
        Value::Range(r) => {
            if r.low_bound == Bound::Open {
                allow_touching = true;
            }
            &r.low
        }
        other => other,
    };
    let right = match b {
        Value::Range(r) => {
            if r.high_bound == Bound::Open {
                allow_touching = true;
            }
            &r.high
        }
        other => other,
    };
    let ord = compare(left, right).ok_or_else(|| not_comparable(left, right))?;
    Ok(if allow_touching {
        ord != Ordering::Less
    } else {
        ord == Ordering::Greater
    })
}

/// `includes(a, b)`: `a` must be a range; `b` is a contained point or a
/// contained sub-range. Where `a` is open and `b` closed at the same end,
/// containment must be strict.
pub fn includes(a: &Value, b: &Value) -> Result<bool, EvalError> {
    let range = match a {
        Value::Range(r) => r,
        other => {
            return Err(EvalError::validation(format!(
                "includes expects a range as first operand, got {}",
                other.type_name()
            )))
        }
    };
    match b {
        Value::Range(inner) => {
            let low = compare(&range.low, &inner.low)
                .ok_or_else(|| not_comparable(&range.low, &inner.low))?;
            let high = compare(&range.high, &inner.high)
                .ok_or_else(|| not_comparable(&range.high, &inner.high))?;
            let low_ok = if range.low_bound == Bound::Open && inner.low_bound == Bound::Closed {
                low == Ordering::Less
            } else {
                low != Ordering::Greater
            };
            let high_ok = if range.high_bound == Bound::Open && inner.high_bound == Bound::Closed {
                high == Ordering::Greater
            } else {
                high != Ordering::Less
            };
            Ok(low_ok && high_ok)
        }
        point => range.contains_point(point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(low: i64, high: i64) -> Value {
        Value::Range(
            RangeValue::new(Value::int(low), Value::int(high), Bound::Closed, Bound::Closed)
                .unwrap(),
        )
    }

    fn range(low: i64, high: i64, low_bound: Bound, high_bound: Bound) -> Value {
        Value::Range(RangeValue::new(Value::int(low), Value::int(high), low_bound, high_bound).unwrap())
    }

    #[test]
    fn test_contains_point_respects_bounds() {
        let r = range(1, 3, Bound::Open, Bound::Closed);
        let r = match r {
            Value::Range(r) => r,
            _ => unreachable!(),
        };
        assert!(!r.contains_point(&Value::int(1)).unwrap());
        assert!(r.contains_point(&Value::int(2)).unwrap());
        assert!(r.contains_point(&Value::int(3)).unwrap());
        assert!(!r.contains_point(&Value::int(4)).unwrap());
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let r = match closed(5, 1) {
            Value::Range(r) => r,
            _ => unreachable!(),
        };
        assert!(!r.contains_point(&Value::int(3)).unwrap());
    }

    #[test]
    fn test_before_points_and_ranges() {
        assert!(before(&Value::int(1), &Value::int(10)).unwrap());
        assert!(!before(&Value::int(10), &Value::int(1)).unwrap());
        assert!(before(&closed(1, 5), &Value::int(10)).unwrap());
        assert!(before(&Value::int(1), &closed(2, 5)).unwrap());
        // Open meeting endpoints allow touching.
        assert!(before(&range(1, 5, Bound::Closed, Bound::Open), &Value::int(5)).unwrap());
        assert!(before(&Value::int(2), &range(2, 5, Bound::Open, Bound::Closed)).unwrap());
        assert!(!before(&Value::int(2), &closed(2, 5)).unwrap());
        assert!(before(&closed(1, 5), &closed(6, 10)).unwrap());
        assert!(!before(&closed(1, 5), &closed(3, 10)).unwrap());
    }

    #[test]
    fn test_after_points_and_ranges() {
        assert!(after(&Value::int(12), &closed(2, 5)).unwrap());
        assert!(!after(&closed(2, 5), &Value::int(12)).unwrap());
        assert!(after(&closed(6, 10), &closed(1, 5)).unwrap());
        assert!(!after(&closed(5, 10), &closed(1, 5)).unwrap());
        assert!(after(&range(5, 10, Bound::Open, Bound::Closed), &closed(1, 5)).unwrap());
    }

    #[test]
    fn test_includes() {
        assert!(includes(&closed(5, 10), &Value::int(6)).unwrap());
        assert!(!includes(&closed(3, 4), &Value::int(5)).unwrap());
        assert!(includes(&closed(1, 10), &closed(4, 6)).unwrap());
        assert!(!includes(&closed(5, 8), &closed(1, 5)).unwrap());
        // Closed outer includes its open twin, but not the reverse.
        assert!(includes(&closed(1, 10), &range(1, 10, Bound::Open, Bound::Open)).unwrap());
        assert!(!includes(&range(1, 5, Bound::Closed, Bound::Open), &closed(1, 5)).unwrap());
    }

    #[test]
    fn test_includes_requires_a_range() {
        assert!(includes(&Value::int(1), &Value::int(2)).is_err());
    }

    #[test]
    fn test_incomparable_endpoints_are_rejected() {
        assert!(RangeValue::new(Value::int(1), Value::str("x"), Bound::Closed, Bound::Closed).is_err());
    }
}
