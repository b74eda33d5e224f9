// ABOUTME: Comparison operations: =, <, >, <=, >= (spec §4.2, §9 note 5).
// ABOUTME: The ordering operators are variadic and chain pairwise: (< a b c) is (< a b) and (< b c).

use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::Value;

/// Structural equality for non-numerics; cross `Number`/`BigNumber` equality
/// and `Quoted` identity-by-name are handled by `Value`'s own `PartialEq`.
pub fn builtin_eq(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Ok(Value::Bool(true));
    }
    Ok(Value::Bool(args.windows(2).all(|w| w[0] == w[1])))
}

fn numeric_pairs(args: &[Value], function: &str) -> Result<Vec<(f64, f64)>, EvalError> {
    let mut numbers = Vec::with_capacity(args.len());
    for a in args {
        numbers.push(match a {
            Value::Number(n) => *n,
            Value::BigNumber(b) => {
                use num_traits::ToPrimitive;
                b.to_f64().unwrap_or(f64::INFINITY)
            }
            other => return Err(EvalError::type_error(function, "number", other)),
        });
    }
    Ok(numbers.windows(2).map(|w| (w[0], w[1])).collect())
}

fn chain(args: &[Value], function: &str, cmp: impl Fn(f64, f64) -> bool) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Ok(Value::Bool(true));
    }
    let pairs = numeric_pairs(args, function)?;
    Ok(Value::Bool(pairs.into_iter().all(|(a, b)| cmp(a, b))))
}

pub fn builtin_lt(args: &[Value]) -> Result<Value, EvalError> {
    chain(args, "<", |a, b| a < b)
}

pub fn builtin_gt(args: &[Value]) -> Result<Value, EvalError> {
    chain(args, ">", |a, b| a > b)
}

pub fn builtin_le(args: &[Value]) -> Result<Value, EvalError> {
    chain(args, "<=", |a, b| a <= b)
}

pub fn builtin_ge(args: &[Value]) -> Result<Value, EvalError> {
    chain(args, ">=", |a, b| a >= b)
}

pub fn register(env: &EnvRef) {
    env.define("=", Value::BuiltinRef("=", builtin_eq));
    env.define("<", Value::BuiltinRef("<", builtin_lt));
    env.define(">", Value::BuiltinRef(">", builtin_gt));
    env.define("<=", Value::BuiltinRef("<=", builtin_le));
    env.define(">=", Value::BuiltinRef(">=", builtin_ge));

    crate::help::register_help(crate::help::HelpEntry {
        name: "=".to_string(),
        signature: "(= val...)".to_string(),
        description: "Deep structural equality; chains pairwise across any number of arguments.".to_string(),
        examples: vec!["(= 5 5 5) => #t".to_string(), "(= \"hi\" \"hi\") => #t".to_string()],
        related: vec!["<".to_string(), ">".to_string()],
        category: "Comparison".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "<".to_string(),
        signature: "(< num...)".to_string(),
        description: "Tests that each argument is strictly less than the next.".to_string(),
        examples: vec!["(< 1 2 3) => #t".to_string(), "(< 1 1) => #f".to_string()],
        related: vec![">".to_string(), "<=".to_string()],
        category: "Comparison".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: ">".to_string(),
        signature: "(> num...)".to_string(),
        description: "Tests that each argument is strictly greater than the next.".to_string(),
        examples: vec!["(> 3 2 1) => #t".to_string()],
        related: vec!["<".to_string(), ">=".to_string()],
        category: "Comparison".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "<=".to_string(),
        signature: "(<= num...)".to_string(),
        description: "Tests that each argument is less than or equal to the next.".to_string(),
        examples: vec!["(<= 1 2 2 3) => #t".to_string()],
        related: vec!["<".to_string(), ">=".to_string()],
        category: "Comparison".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: ">=".to_string(),
        signature: "(>= num...)".to_string(),
        description: "Tests that each argument is greater than or equal to the next.".to_string(),
        examples: vec!["(>= 3 2 2 1) => #t".to_string()],
        related: vec![">".to_string(), "<=".to_string()],
        category: "Comparison".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_is_structural_across_numbers_strings_lists() {
        assert_eq!(builtin_eq(&[Value::Number(5.0), Value::Number(5.0)]).unwrap(), Value::Bool(true));
        assert_eq!(
            builtin_eq(&[Value::String("a".into()), Value::String("b".into())]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn lt_chains_pairwise() {
        assert_eq!(builtin_lt(&[Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]).unwrap(), Value::Bool(true));
        assert_eq!(builtin_lt(&[Value::Number(1.0), Value::Number(2.0), Value::Number(1.0)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn zero_or_one_argument_is_trivially_true() {
        assert_eq!(builtin_lt(&[]).unwrap(), Value::Bool(true));
        assert_eq!(builtin_lt(&[Value::Number(1.0)]).unwrap(), Value::Bool(true));
    }
}
