// ABOUTME: Pure helpers for macro argument capture and expansion-result lifting (spec §4.5).
// ABOUTME: Macros are ordinary `Value::Macro` bindings in `Environment`, not a separate registry.

use crate::value::Value;

/// Convert a raw (unevaluated) argument expression into the quoted value a
/// macro body sees, per `quote`'s own rule: symbols become `Quoted`, lists
/// become lists of recursively-quoted values, everything else is self-quoting.
pub fn quote_value(expr: &Value) -> Value {
    match expr {
        Value::Symbol(s) => Value::Quoted(Box::new(Value::Symbol(s.clone()))),
        Value::List(items) => Value::List(items.iter().map(quote_value).collect()),
        Value::Bracket(items) => Value::Bracket(items.iter().map(quote_value).collect()),
        other => other.clone(),
    }
}

/// Lift a macro body's *result* value back into an expression to be
/// evaluated at the call site (§4.5's "lift back to expression" step).
/// `Quoted` unwraps to its bare payload; everything else that can appear as
/// a literal expression passes through unchanged.
pub fn lift_to_expr(value: Value) -> Value {
    match value {
        Value::Quoted(inner) => *inner,
        Value::List(items) => Value::List(items.into_iter().map(lift_to_expr).collect()),
        Value::Nil => Value::Symbol("nil".to_string()),
        other => other,
    }
}
