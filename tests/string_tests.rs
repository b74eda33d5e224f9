// ABOUTME: End-to-end tests for string operations through parse+eval

use lumisp::env::{Environment, EnvRef};
use lumisp::error::EvalError;
use lumisp::eval::eval;
use lumisp::parser::parse;
use lumisp::value::Value;

fn eval_expr(expr: &str, env: &EnvRef) -> Result<Value, EvalError> {
    eval(parse(expr).expect("valid expression"), env.clone())
}

fn test_env() -> EnvRef {
    let env = Environment::new_root();
    lumisp::builtins::register_builtins(&env);
    env
}

#[test]
fn string_append_concatenates_all_arguments() {
    let env = test_env();
    let result = eval_expr(r#"(string-append "foo" "bar" "baz")"#, &env).unwrap();
    assert_eq!(result, Value::String("foobarbaz".to_string()));
}

#[test]
fn string_split_and_join_round_trip() {
    let env = test_env();
    eval_expr(r#"(def parts (string-split "a,b,c" ","))"#, &env).unwrap();
    let joined = eval_expr(r#"(string-join parts "-")"#, &env).unwrap();
    assert_eq!(joined, Value::String("a-b-c".to_string()));
}

#[test]
fn substring_is_half_open_and_char_indexed() {
    let env = test_env();
    let result = eval_expr(r#"(substring "hello world" 0 5)"#, &env).unwrap();
    assert_eq!(result, Value::String("hello".to_string()));
}

#[test]
fn substring_out_of_bounds_is_an_error() {
    let env = test_env();
    let err = eval_expr(r#"(substring "hi" 0 10)"#, &env).unwrap_err();
    assert!(matches!(err, EvalError::IndexOutOfBounds { .. }));
}

#[test]
fn string_case_and_trim() {
    let env = test_env();
    assert_eq!(
        eval_expr(r#"(string-upper "shout")"#, &env).unwrap(),
        Value::String("SHOUT".to_string())
    );
    assert_eq!(
        eval_expr(r#"(string-lower "WHISPER")"#, &env).unwrap(),
        Value::String("whisper".to_string())
    );
    assert_eq!(
        eval_expr(r#"(string-trim "  padded  ")"#, &env).unwrap(),
        Value::String("padded".to_string())
    );
}

#[test]
fn string_contains_and_ends_with_predicates() {
    let env = test_env();
    assert_eq!(eval_expr(r#"(string-contains? "hello world" "wor")"#, &env).unwrap(), Value::Bool(true));
    assert_eq!(eval_expr(r#"(string-ends-with? "hello.lisp" ".lisp")"#, &env).unwrap(), Value::Bool(true));
    assert_eq!(eval_expr(r#"(string-empty? "")"#, &env).unwrap(), Value::Bool(true));
}

#[test]
fn string_number_conversions_round_trip() {
    let env = test_env();
    assert_eq!(eval_expr(r#"(string->number "42")"#, &env).unwrap(), Value::Number(42.0));
    assert_eq!(eval_expr(r#"(number->string 42)"#, &env).unwrap(), Value::String("42".to_string()));
}

#[test]
fn repeat_builds_n_copies() {
    let env = test_env();
    assert_eq!(
        eval_expr(r#"(repeat "ab" 3)"#, &env).unwrap(),
        Value::String("ababab".to_string())
    );
}

#[test]
fn index_of_finds_first_occurrence_or_negative_one() {
    let env = test_env();
    assert_eq!(eval_expr(r#"(index-of "hello" "l")"#, &env).unwrap(), Value::Number(2.0));
    assert_eq!(eval_expr(r#"(index-of "hello" "z")"#, &env).unwrap(), Value::Number(-1.0));
}
