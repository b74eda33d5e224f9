// ABOUTME: Configuration and constants for the Lisp interpreter
// This module contains version info, welcome messages, and I/O sandbox configuration

use std::path::PathBuf;

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Lisp Interpreter v1.0";
pub const WELCOME_SUBTITLE: &str = "A production-ready Scheme-flavored Lisp in Rust";

// ============================================================================
// I/O Sandboxing Configuration
// ============================================================================

/// Filesystem sandbox configuration
#[derive(Debug, Clone)]
pub struct FsConfig {
    pub allowed_paths: Vec<PathBuf>,
    pub max_file_size: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            // Default allowed paths for file I/O
            allowed_paths: vec![
                PathBuf::from("./data"),
                PathBuf::from("./scripts"),
            ],
            // Default max file size: 10MB
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

pub const BUILTINS_SUMMARY: &str = r#"
Built-in Functions:

Arithmetic:     + - * / % mod
Comparison:     = < > <= >=
Logic:          and or not
Lists:          cons car cdr list length empty? map filter reduce sort ...
Hash maps:      hash-map hash-map-get hash-map-put hash-map-remove ...
Strings:        string-append string-split string-join string-regex-match? ...
Predicates:     number? string? list? nil? symbol? bool? map?
Concurrency:    atom deref swap! go go-wait chan wait-group ...
JSON:           json-parse json-stringify json-stringify-pretty json-path
Console I/O:    print println
Filesystem:     read-file write-file file-exists? file-size list-files
Error:          error
Control:        if do def fn defn quote quasiquote unquote unquote-splicing
Macros:         defmacro
Modules:        module import load require

Type (help 'function-name) for detailed help.
"#;
