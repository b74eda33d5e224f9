//! Help system operations: help
//!
//! Functions for accessing documentation and help information.
//!
//! - `help`: Show help for a function or special form
//!
//! Every built-in and special form registers a `HelpEntry` at startup
//! (see each `builtins/*.rs` module's `register`); `;;;` doc comments
//! attach additional documentation to user-defined `def`/`defn`/`defmacro`.

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ZERO_OR_ONE};
use crate::value::Value;

/// Show help information
pub fn builtin_help(args: &[Value]) -> Result<Value, EvalError> {
    use crate::help;

    match args.len() {
        0 => {
            // Show quick reference
            let output = help::format_quick_reference();
            println!("{}", output);
            Ok(Value::Nil)
        }
        1 => {
            // Get help for specific function
            match &args[0] {
                Value::Symbol(name) => {
                    // First try built-in help
                    if let Some(entry) = help::get_help(name) {
                        let output = help::format_help_entry(&entry);
                        println!("{}", output);
                        return Ok(Value::Nil);
                    }

                    // If not found in help registry, it might be a user function
                    // User functions would need to be looked up in environment
                    // For now, just report not found
                    Err(EvalError::runtime_error(
                        "help",
                        format!("no help found for '{}'", name),
                    ))
                }
                _ => Err(EvalError::type_error("help", "symbol", &args[0])),
            }
        }
        _ => Err(EvalError::arity_error(
            "help",
            ARITY_ZERO_OR_ONE,
            args.len(),
        )),
    }
}

/// Register all help system builtins in the environment
pub fn register(env: &EnvRef) {
    env.define("help", Value::BuiltinRef("help", builtin_help));

    // Register help entries
    crate::help::register_help(crate::help::HelpEntry {
        name: "help".to_string(),
        signature: "(help) or (help 'function-name)".to_string(),
        description: "Show help information. With no arguments, displays quick reference.\nWith a function name, shows detailed documentation for that function.".to_string(),
        examples: vec![
            "(help) => shows quick reference".to_string(),
            "(help 'cons) => detailed help for cons".to_string(),
            "(help 'map) => detailed help for map".to_string(),
        ],
        related: vec![],
        category: "Help system".to_string(),
    });
}
