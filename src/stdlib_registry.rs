// ABOUTME: Root environment construction for the interpreter and its test suite

use crate::env::{Environment, EnvRef};

/// Builds a fresh root environment with every builtin registered (spec §4/§5/§12).
///
/// This is the one place `eval`'s own tests and `main`'s embedding code share
/// to avoid constructing the builtin table by hand in two places.
pub fn new_root_env() -> EnvRef {
    let env = Environment::new_root();
    crate::builtins::register_builtins(&env);
    env
}
