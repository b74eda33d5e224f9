//! # Built-in Functions Module
//!
//! Core built-in functions for the Lisp interpreter, grouped by category:
//! arithmetic, comparison, logic, types, lists, hash maps, strings, JSON,
//! console I/O, sandboxed filesystem I/O, concurrency, errors, and help.

use crate::env::EnvRef;
use crate::error::EvalError;
use crate::sandbox::Sandbox;
use std::sync::{Mutex, OnceLock};

static SANDBOX: OnceLock<Mutex<Option<Sandbox>>> = OnceLock::new();

/// Installs the process-wide sandbox. Called once at startup (spec §12/§13).
pub fn set_sandbox_storage(sandbox: Sandbox) {
    SANDBOX
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap()
        .replace(sandbox);
}

/// Runs `f` against the installed sandbox, erroring if none has been installed.
pub fn with_sandbox<T>(
    function: &str,
    f: impl FnOnce(&Sandbox) -> Result<T, EvalError>,
) -> Result<T, EvalError> {
    let guard = SANDBOX
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap();
    let sandbox = guard
        .as_ref()
        .ok_or_else(|| EvalError::IoError(format!("{function}: sandbox not initialized")))?;
    f(sandbox)
}

/// Reads `path` through the sandbox; used by `(require ...)` as well as `read-file`.
pub fn read_sandboxed(path: &str) -> Result<String, EvalError> {
    with_sandbox("require", |sandbox| {
        sandbox.read_file(path).map_err(|e| EvalError::IoError(e.to_string()))
    })
}

pub mod arithmetic;
pub mod comparison;
pub mod concurrency;
pub mod console;
pub mod errors;
pub mod filesystem;
#[path = "help.rs"]
pub mod help_builtins;
pub mod json;
pub mod lists;
pub mod logic;
pub mod maps;
pub mod strings;
pub mod types;

pub use arithmetic::register as register_arithmetic;
pub use comparison::register as register_comparison;
pub use concurrency::register as register_concurrency;
pub use console::register as register_console;
pub use errors::register as register_errors;
pub use filesystem::register as register_filesystem;
pub use help_builtins::register as register_help;
pub use json::register as register_json;
pub use lists::register as register_lists;
pub use logic::register as register_logic;
pub use maps::register as register_maps;
pub use strings::register as register_strings;
pub use types::register as register_types;

/// Populates a root environment with every built-in category (spec §4/§5/§12).
pub fn register_builtins(env: &EnvRef) {
    crate::help::register_special_forms();
    register_arithmetic(env);
    register_comparison(env);
    register_logic(env);
    register_types(env);
    register_lists(env);
    register_maps(env);
    register_strings(env);
    register_json(env);
    register_console(env);
    register_filesystem(env);
    register_concurrency(env);
    register_errors(env);
    register_help(env);
}
