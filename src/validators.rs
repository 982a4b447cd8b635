// ABOUTME: Operand validators shared by the evaluator's typed operations

use crate::error::EvalError;
use crate::value::Value;

/// Both operands of a typed binary operation must share a type.
/// Integers and floats both count as numbers.
pub fn binary_operands(left: &Value, right: &Value) -> Result<(), EvalError> {
    if !left.same_type(right) {
        return Err(EvalError::validation(format!(
            "type of both operands must be the same, got {} and {}",
            left.type_name(),
            right.type_name()
        )));
    }
    Ok(())
}

/// Both operands must be strings (string predicates).
pub fn string_operands(left: &Value, right: &Value) -> Result<(), EvalError> {
    binary_operands(left, right)?;
    if !matches!(left, Value::Str(_)) {
        return Err(EvalError::validation(format!(
            "type of both operands must be string, got {} and {}",
            left.type_name(),
            right.type_name()
        )));
    }
    Ok(())
}

/// Every quantifier source must be a list, and all of them the same length.
pub fn lists_same_length(lists: &[Vec<Value>]) -> Result<(), EvalError> {
    let Some(first) = lists.first() else {
        return Ok(());
    };
    if lists.iter().any(|list| list.len() != first.len()) {
        return Err(EvalError::validation("lists length not equal"));
    }
    Ok(())
}
