// ABOUTME: End-to-end tests combining def/fn/defmacro/modules/concurrency/errors

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
fn recursive_defn_computes_factorial() {
    let env = test_env();
    eval_expr(
        "(defn factorial [n] (if (= n 0) 1 (* n (factorial (- n 1)))))",
        &env,
    )
    .unwrap();
    assert_eq!(eval_expr("(factorial 10)", &env).unwrap(), Value::Number(3628800.0));
}

#[test]
fn deep_tail_recursion_does_not_overflow_the_stack() {
    let env = test_env();
    eval_expr(
        "(defn count-to [n acc] (if (= n 0) acc (count-to (- n 1) (+ acc 1))))",
        &env,
    )
    .unwrap();
    assert_eq!(eval_expr("(count-to 200000 0)", &env).unwrap(), Value::Number(200000.0));
}

#[test]
fn closures_capture_their_defining_environment() {
    let env = test_env();
    eval_expr("(defn make-adder [n] (fn [x] (+ x n)))", &env).unwrap();
    eval_expr("(def add5 (make-adder 5))", &env).unwrap();
    assert_eq!(eval_expr("(add5 10)", &env).unwrap(), Value::Number(15.0));
}

#[test]
fn defmacro_unless_expands_and_runs_in_caller_scope() {
    let env = test_env();
    eval_expr("(defmacro unless (c body) (list 'if c 'nil body))", &env).unwrap();
    eval_expr("(def seen false)", &env).unwrap();
    eval_expr("(unless seen (def seen true))", &env).unwrap();
    assert_eq!(eval_expr("seen", &env).unwrap(), Value::Bool(true));
}

#[test]
fn module_export_and_qualified_access_and_import() {
    let env = test_env();
    eval_expr(
        "(module greeter (export hello) (defn hello [name] (string-append \"hi \" name)))",
        &env,
    )
    .unwrap();
    assert_eq!(
        eval_expr(r#"(greeter.hello "world")"#, &env).unwrap(),
        Value::String("hi world".to_string())
    );

    eval_expr("(import greeter)", &env).unwrap();
    assert_eq!(
        eval_expr(r#"(hello "again")"#, &env).unwrap(),
        Value::String("hi again".to_string())
    );
}

#[test]
fn module_missing_export_errors_wrapped_with_module_name() {
    let env = test_env();
    let err = eval_expr("(module broken (export missing) (def present 1))", &env).unwrap_err();
    assert!(err.to_string().contains("broken"));
}

#[test]
fn errors_carry_function_name_and_propagate_through_calls() {
    let env = test_env();
    eval_expr("(defn risky [] (car (list)))", &env).unwrap();
    let err = eval_expr("(risky)", &env).unwrap_err();
    assert!(matches!(err, EvalError::DomainError { .. }));
}

#[test]
fn division_by_zero_is_a_distinct_error_variant() {
    let env = test_env();
    let err = eval_expr("(/ 1 0)", &env).unwrap_err();
    assert!(matches!(err, EvalError::DivisionByZero));
}

#[test]
fn bignumber_arithmetic_promotes_past_f64_precision() {
    let env = test_env();
    let result = eval_expr("(+ 99999999999999999999n 1n)", &env).unwrap();
    match result {
        Value::BigNumber(_) => {}
        other => panic!("expected a BigNumber, got {other:?}"),
    }
}

#[test]
fn concurrency_and_data_structures_compose_in_one_program() {
    let env = test_env();
    eval_expr("(def results (atom (list)))", &env).unwrap();
    eval_expr("(def wg (wait-group))", &env).unwrap();
    eval_expr("(wait-group-add! wg 3)", &env).unwrap();
    for n in [1, 2, 3] {
        eval_expr(
            &format!(
                "(go (do (swap! results (fn [rs] (cons {n} rs))) (wait-group-done! wg)))"
            ),
            &env,
        )
        .unwrap();
    }
    eval_expr("(wait-group-wait! wg)", &env).unwrap();
    let sum = eval_expr("(reduce (fn [acc x] (+ acc x)) 0 (deref results))", &env).unwrap();
    assert_eq!(sum, Value::Number(6.0));
}

#[test]
fn quasiquote_unquote_and_splicing_build_lists() {
    let env = test_env();
    eval_expr("(def x 5)", &env).unwrap();
    assert_eq!(
        eval_expr("`(a ,x c)", &env).unwrap(),
        Value::List(vec![
            Value::Symbol("a".to_string()),
            Value::Number(5.0),
            Value::Symbol("c".to_string()),
        ])
    );
    eval_expr("(def xs (list 1 2 3))", &env).unwrap();
    assert_eq!(
        eval_expr("`(start ,@xs end)", &env).unwrap(),
        Value::List(vec![
            Value::Symbol("start".to_string()),
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
            Value::Symbol("end".to_string()),
        ])
    );
}
