// ABOUTME: The one remaining logic builtin. `and`/`or` are special forms in
// ABOUTME: `eval` now (so they can keep strict per-operand bool-checking); `not`
// ABOUTME: stays an ordinary builtin since it has no short-circuit behavior to lose.

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ONE};
use crate::value::Value;

pub fn builtin_not(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("not", ARITY_ONE, args.len()));
    }
    Ok(Value::Bool(!args[0].as_bool("not")?))
}

pub fn register(env: &EnvRef) {
    env.define("not", Value::BuiltinRef("not", builtin_not));

    crate::help::register_help(crate::help::HelpEntry {
        name: "not".to_string(),
        signature: "(not bool)".to_string(),
        description: "Logical negation. Requires a literal bool argument.".to_string(),
        examples: vec!["(not true) => #f".to_string(), "(not false) => #t".to_string()],
        related: vec!["and".to_string(), "or".to_string()],
        category: "Logic".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_negates_bool() {
        assert_eq!(builtin_not(&[Value::Bool(true)]).unwrap(), Value::Bool(false));
        assert_eq!(builtin_not(&[Value::Bool(false)]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn not_rejects_non_bool() {
        assert!(builtin_not(&[Value::Number(0.0)]).is_err());
    }
}
