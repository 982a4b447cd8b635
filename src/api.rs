// ABOUTME: Public entry points composing the parser, evaluator, and registry

use crate::context::Scope;
use crate::error::FeelError;
use crate::eval;
use crate::parser;
use crate::registry::{self, Registry};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::PoisonError;

/// Evaluate a FEEL expression against a context, resolving registered
/// functions through the process-wide registry. Errors propagate to the
/// caller.
pub fn evaluate(
    expression: &str,
    context: &IndexMap<String, Value>,
) -> Result<Value, FeelError> {
    let registry = registry::global()
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    evaluate_with_registry(expression, context, &registry)
}

/// Evaluate against an explicitly supplied registry instead of the
/// process-wide one.
pub fn evaluate_with_registry(
    expression: &str,
    context: &IndexMap<String, Value>,
    registry: &Registry,
) -> Result<Value, FeelError> {
    let ast = parser::parse(expression).map_err(FeelError::Parse)?;
    let scope = Scope::root(context.clone());
    eval::eval(&ast, &scope, registry).map_err(FeelError::from)
}

/// Non-raising evaluation: any parse or evaluation error is logged and
/// surfaces as null.
pub fn evaluate_or_null(expression: &str, context: &IndexMap<String, Value>) -> Value {
    match evaluate(expression, context) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(expression = %expression, error = %error, "expression evaluation failed");
            Value::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;

    #[test]
    fn test_evaluate_simple_expression() {
        assert_eq!(evaluate("1+2*3", &IndexMap::new()).unwrap(), Value::int(7));
    }

    #[test]
    fn test_evaluate_with_context() {
        let context: IndexMap<String, Value> = [
            ("a".to_string(), Value::int(1)),
            ("b".to_string(), Value::int(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(evaluate("a+b", &context).unwrap(), Value::int(3));
    }

    #[test]
    fn test_parse_errors_are_tagged() {
        assert!(matches!(
            evaluate("1 +", &IndexMap::new()),
            Err(FeelError::Parse(_))
        ));
    }

    #[test]
    fn test_eval_errors_are_tagged() {
        assert!(matches!(
            evaluate("1/0", &IndexMap::new()),
            Err(FeelError::Eval(EvalError::Evaluation { .. }))
        ));
    }

    #[test]
    fn test_evaluate_or_null_swallows_errors() {
        assert_eq!(evaluate_or_null("1/0", &IndexMap::new()), Value::Null);
        assert_eq!(evaluate_or_null("not (", &IndexMap::new()), Value::Null);
        assert_eq!(evaluate_or_null("1+1", &IndexMap::new()), Value::int(2));
    }
}
