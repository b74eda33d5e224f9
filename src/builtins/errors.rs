// ABOUTME: User-raised errors: `(error msg)` always fails evaluation.

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ONE};
use crate::value::Value;

pub fn builtin_error(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("error", ARITY_ONE, args.len()));
    }
    let msg = match &args[0] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Err(EvalError::UserError(msg))
}

pub fn register(env: &EnvRef) {
    env.define("error", Value::BuiltinRef("error", builtin_error));

    crate::help::register_help(crate::help::HelpEntry {
        name: "error".to_string(),
        signature: "(error msg)".to_string(),
        description: "Unconditionally raises msg as a UserError, aborting evaluation.".to_string(),
        examples: vec!["(error \"invalid input\") => raises: invalid input".to_string()],
        related: vec![],
        category: "Error handling".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_always_fails() {
        let err = builtin_error(&[Value::String("bad".into())]).unwrap_err();
        assert_eq!(err, EvalError::UserError("bad".into()));
    }

    #[test]
    fn error_stringifies_non_string_arguments() {
        let err = builtin_error(&[Value::Number(42.0)]).unwrap_err();
        assert_eq!(err, EvalError::UserError("42".into()));
    }
}
