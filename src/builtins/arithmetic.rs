// ABOUTME: The arithmetic engine (spec §4.2): +, -, *, /, % and the Euclidean `mod`.
// ABOUTME: Promotes to BigNumber whenever an operand already is one, or a whole
// ABOUTME: operand's magnitude reaches 10^15, or (for `*`) the running product would.

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_AT_LEAST_ONE, ARITY_TWO};
use crate::value::{ArithOp, Value};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

const PROMOTE_AT: f64 = 1.0e15;

fn is_numeric(v: &Value) -> bool {
    matches!(v, Value::Number(_) | Value::BigNumber(_))
}

fn require_numeric(v: &Value, function: &str) -> Result<(), EvalError> {
    if is_numeric(v) {
        Ok(())
    } else {
        Err(EvalError::type_error(function, "number", v))
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Number(n) => *n,
        Value::BigNumber(b) => b.to_f64().unwrap_or(f64::INFINITY),
        _ => unreachable!("checked by require_numeric"),
    }
}

/// Whole-number magnitude at or beyond the promotion threshold, or already big.
fn is_promotable(v: &Value) -> bool {
    match v {
        Value::BigNumber(_) => true,
        Value::Number(n) => n.fract() == 0.0 && n.abs() >= PROMOTE_AT,
        _ => false,
    }
}

fn as_bigint(v: &Value, function: &str) -> Result<BigInt, EvalError> {
    match v {
        Value::BigNumber(b) => Ok(b.clone()),
        Value::Number(n) => Value::f64_to_bigint(*n)
            .ok_or_else(|| EvalError::domain_error(function, "non-integer value in big arithmetic")),
        other => Err(EvalError::type_error(function, "number", other)),
    }
}

fn normalize_big(n: BigInt) -> Value {
    Value::BigNumber(n)
}

pub fn builtin_add(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("+", ARITY_AT_LEAST_ONE, 0));
    }
    for a in args {
        require_numeric(a, "+")?;
    }
    if args.iter().any(is_promotable) {
        let mut acc = BigInt::from(0);
        for a in args {
            acc += as_bigint(a, "+")?;
        }
        return Ok(normalize_big(acc));
    }
    Ok(Value::Number(args.iter().map(as_f64).sum()))
}

pub fn builtin_sub(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("-", ARITY_AT_LEAST_ONE, 0));
    }
    for a in args {
        require_numeric(a, "-")?;
    }
    if args.len() == 1 {
        return if is_promotable(&args[0]) {
            Ok(normalize_big(-as_bigint(&args[0], "-")?))
        } else {
            Ok(Value::Number(-as_f64(&args[0])))
        };
    }
    if args.iter().any(is_promotable) {
        let mut acc = as_bigint(&args[0], "-")?;
        for a in &args[1..] {
            acc -= as_bigint(a, "-")?;
        }
        return Ok(normalize_big(acc));
    }
    let mut acc = as_f64(&args[0]);
    for a in &args[1..] {
        acc -= as_f64(a);
    }
    Ok(Value::Number(acc))
}

pub fn builtin_mul(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("*", ARITY_AT_LEAST_ONE, 0));
    }
    for a in args {
        require_numeric(a, "*")?;
    }

    let mut running = 1.0f64;
    let mut should_promote = args.iter().any(is_promotable);
    if !should_promote {
        for a in args {
            running *= as_f64(a).abs();
            if running >= PROMOTE_AT {
                should_promote = true;
                break;
            }
        }
    }

    if should_promote {
        let mut acc = BigInt::from(1);
        for a in args {
            acc *= as_bigint(a, "*")?;
        }
        return Ok(normalize_big(acc));
    }

    Ok(Value::Number(args.iter().map(as_f64).product()))
}

pub fn builtin_div(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("/", ARITY_TWO, args.len()));
    }
    require_numeric(&args[0], "/")?;
    require_numeric(&args[1], "/")?;
    let divisor = as_f64(&args[1]);
    if divisor == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    Ok(Value::Number(as_f64(&args[0]) / divisor))
}

/// `%` operates on integers: fractional `Number` operands are truncated
/// toward zero before the remainder is taken.
fn truncated_bigint(v: &Value, function: &str) -> Result<BigInt, EvalError> {
    match v {
        Value::BigNumber(b) => Ok(b.clone()),
        Value::Number(n) => Value::f64_to_bigint(n.trunc())
            .ok_or_else(|| EvalError::domain_error(function, "value too large for big arithmetic")),
        other => Err(EvalError::type_error(function, "number", other)),
    }
}

/// Truncating remainder (Rust's native `%`), distinct from the Euclidean
/// `mod`. Arbitrary-precision like `+`/`-`/`*`: promotes to `BigNumber`
/// whenever either operand already is one or crosses the magnitude threshold.
pub fn builtin_rem(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("%", ARITY_TWO, args.len()));
    }
    require_numeric(&args[0], "%")?;
    require_numeric(&args[1], "%")?;

    if args.iter().any(is_promotable) {
        let divisor = truncated_bigint(&args[1], "%")?;
        if divisor == BigInt::from(0) {
            return Err(EvalError::DivisionByZero);
        }
        let dividend = truncated_bigint(&args[0], "%")?;
        return Ok(normalize_big(dividend % divisor));
    }

    let divisor = as_f64(&args[1]).trunc();
    if divisor == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    Ok(Value::Number(as_f64(&args[0]).trunc() % divisor))
}

/// Euclidean modulo: `0 <= |result| < |y|`, sign follows the divisor.
pub fn builtin_mod(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("mod", ARITY_TWO, args.len()));
    }
    require_numeric(&args[0], "mod")?;
    require_numeric(&args[1], "mod")?;
    let y = as_f64(&args[1]);
    if y == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    let x = as_f64(&args[0]);
    Ok(Value::Number(((x % y) + y) % y))
}

/// `apply` is the entry point called from `eval::call_non_function` for
/// `Value::ArithRef` values seeded into the root environment.
pub fn apply(op: ArithOp, args: &[Value]) -> Result<Value, EvalError> {
    match op {
        ArithOp::Add => builtin_add(args),
        ArithOp::Sub => builtin_sub(args),
        ArithOp::Mul => builtin_mul(args),
        ArithOp::Div => builtin_div(args),
        ArithOp::Mod => builtin_rem(args),
    }
}

pub fn register(env: &EnvRef) {
    env.define("+", Value::ArithRef(ArithOp::Add));
    env.define("-", Value::ArithRef(ArithOp::Sub));
    env.define("*", Value::ArithRef(ArithOp::Mul));
    env.define("/", Value::ArithRef(ArithOp::Div));
    env.define("%", Value::ArithRef(ArithOp::Mod));
    env.define("mod", Value::BuiltinRef("mod", builtin_mod));

    crate::help::register_help(crate::help::HelpEntry {
        name: "+".to_string(),
        signature: "(+ num...)".to_string(),
        description: "Sum of all arguments. Promotes to arbitrary precision once magnitude reaches 10^15.".to_string(),
        examples: vec!["(+ 1 2 3) => 6".to_string(), "(+) => 0 is an error, at least 1 argument is required".to_string()],
        related: vec!["-".to_string(), "*".to_string(), "/".to_string()],
        category: "Arithmetic".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "-".to_string(),
        signature: "(- num...)".to_string(),
        description: "Subtracts subsequent arguments from the first; negates a single argument.".to_string(),
        examples: vec!["(- 10 3 2) => 5".to_string(), "(- 5) => -5".to_string()],
        related: vec!["+".to_string()],
        category: "Arithmetic".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "*".to_string(),
        signature: "(* num...)".to_string(),
        description: "Product of all arguments. Promotes to arbitrary precision if the running product would reach 10^15.".to_string(),
        examples: vec!["(* 2 3 4) => 24".to_string()],
        related: vec!["+".to_string(), "/".to_string()],
        category: "Arithmetic".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "/".to_string(),
        signature: "(/ num num)".to_string(),
        description: "Floating-point division of exactly two arguments.".to_string(),
        examples: vec!["(/ 20 4) => 5".to_string(), "(/ 1 3) => 0.3333333333333333".to_string()],
        related: vec!["*".to_string(), "%".to_string(), "mod".to_string()],
        category: "Arithmetic".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "%".to_string(),
        signature: "(% num num)".to_string(),
        description: "Truncating remainder of exactly two arguments (sign follows the dividend). Operands are truncated toward zero; promotes to arbitrary precision like +/-/*.".to_string(),
        examples: vec!["(% 17 5) => 2".to_string(), "(% -7 3) => -1".to_string(), "(% 7.5 2) => 1".to_string()],
        related: vec!["mod".to_string(), "/".to_string()],
        category: "Arithmetic".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "mod".to_string(),
        signature: "(mod num num)".to_string(),
        description: "Euclidean modulo: result always has the sign of the divisor.".to_string(),
        examples: vec!["(mod -7 3) => 2".to_string(), "(mod 7 -3) => -2".to_string()],
        related: vec!["%".to_string()],
        category: "Arithmetic".to_string(),
    });
}
