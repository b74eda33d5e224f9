// ABOUTME: Console I/O operations: print, println.

use crate::env::EnvRef;
use crate::error::EvalError;
use crate::value::Value;

fn write_args(args: &[Value]) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            print!(" ");
        }
        match arg {
            Value::String(s) => print!("{s}"),
            other => print!("{other}"),
        }
    }
}

pub fn builtin_print(args: &[Value]) -> Result<Value, EvalError> {
    write_args(args);
    Ok(Value::Nil)
}

pub fn builtin_println(args: &[Value]) -> Result<Value, EvalError> {
    write_args(args);
    println!();
    Ok(Value::Nil)
}

pub fn register(env: &EnvRef) {
    env.define("print", Value::BuiltinRef("print", builtin_print));
    env.define("println", Value::BuiltinRef("println", builtin_println));

    crate::help::register_help(crate::help::HelpEntry {
        name: "print".to_string(),
        signature: "(print val...)".to_string(),
        description: "Prints values to stdout without a trailing newline. Returns nil.".to_string(),
        examples: vec!["(print \"hello\") => outputs: hello".to_string()],
        related: vec!["println".to_string()],
        category: "Console I/O".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "println".to_string(),
        signature: "(println val...)".to_string(),
        description: "Prints values to stdout with a trailing newline. Returns nil.".to_string(),
        examples: vec!["(println \"hello\") => outputs: hello\\n".to_string()],
        related: vec!["print".to_string()],
        category: "Console I/O".to_string(),
    });
}
