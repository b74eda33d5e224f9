// ABOUTME: Structured error taxonomy for evaluation failures (spec §7/§11).

use crate::value::Value;
use thiserror::Error;

// Arity constant strings, kept to avoid repeated allocation in hot error paths.
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_THREE: &str = "3";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_ZERO_OR_ONE: &str = "0-1";
pub const ARITY_ONE_OR_TWO: &str = "1-2";
pub const ARITY_TWO_OR_THREE: &str = "2-3";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: expected {expected}, got {actual}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("undefined symbol: {0}")]
    UndefinedSymbol(String),

    #[error("undefined module: {0}")]
    UndefinedModule(String),

    #[error("`{symbol}` is not exported by module `{module}`")]
    NotExported { module: String, symbol: String },

    #[error("empty application: ()")]
    EmptyApplication,

    #[error("invalid special form `{form}`: {message}")]
    InvalidSpecialFormShape { form: String, message: String },

    #[error("invalid quoted expression: {0}")]
    InvalidQuotedExpression(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("{function}: {message}")]
    DomainError { function: String, message: String },

    #[error("index {index} out of bounds (length {length})")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("io error: {0}")]
    IoError(String),

    #[error("regex error: {0}")]
    RegexError(String),

    #[error("json error: {0}")]
    JsonError(String),

    #[error("channel closed")]
    ChannelClosed,

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),

    #[error("{0}")]
    UserError(String),

    #[error("value is not callable")]
    NotCallable,

    #[error("{function}: {message}")]
    RuntimeError { function: String, message: String },
}

impl EvalError {
    pub fn type_error(function: &str, expected: &str, actual: &Value) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityMismatch {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn runtime_error(function: &str, message: impl Into<String>) -> Self {
        EvalError::RuntimeError {
            function: function.to_string(),
            message: message.into(),
        }
    }

    pub fn domain_error(function: &str, message: impl Into<String>) -> Self {
        EvalError::DomainError {
            function: function.to_string(),
            message: message.into(),
        }
    }

    /// Decorate an inner error with the macro-expansion context (§7).
    pub fn in_macro(self, name: &str) -> Self {
        EvalError::UserError(format!("error expanding macro {name}: {self}"))
    }

    /// Decorate an inner error with the module-evaluation context (§7).
    pub fn in_module(self, name: &str) -> Self {
        EvalError::UserError(format!("error in module {name}: {self}"))
    }

    /// Decorate an inner error with the file-load context (§7).
    pub fn in_file(self, path: &str) -> Self {
        EvalError::UserError(format!("error in {path}: {self}"))
    }
}
