// ABOUTME: End-to-end tests for list, hash-map, and JSON builtins through parse+eval

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
fn cons_car_cdr_build_and_take_apart_lists() {
    let env = test_env();
    assert_eq!(
        eval_expr("(cons 1 (list 2 3))", &env).unwrap(),
        Value::List(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)])
    );
    assert_eq!(eval_expr("(car (list 1 2 3))", &env).unwrap(), Value::Number(1.0));
    assert_eq!(
        eval_expr("(cdr (list 1 2 3))", &env).unwrap(),
        Value::List(vec![Value::Number(2.0), Value::Number(3.0)])
    );
}

#[test]
fn map_filter_reduce_compose_through_fn_values() {
    let env = test_env();
    let doubled = eval_expr("(map (fn [x] (* x 2)) (list 1 2 3))", &env).unwrap();
    assert_eq!(
        doubled,
        Value::List(vec![Value::Number(2.0), Value::Number(4.0), Value::Number(6.0)])
    );
    let evens = eval_expr("(filter (fn [x] (= 0 (% x 2))) (list 1 2 3 4 5 6))", &env).unwrap();
    assert_eq!(
        evens,
        Value::List(vec![Value::Number(2.0), Value::Number(4.0), Value::Number(6.0)])
    );
    let sum = eval_expr("(reduce (fn [acc x] (+ acc x)) 0 (list 1 2 3 4))", &env).unwrap();
    assert_eq!(sum, Value::Number(10.0));
}

#[test]
fn sort_accepts_a_custom_comparator() {
    let env = test_env();
    let result = eval_expr("(sort (list 3 1 2) (fn [a b] (> a b)))", &env).unwrap();
    assert_eq!(
        result,
        Value::List(vec![Value::Number(3.0), Value::Number(2.0), Value::Number(1.0)])
    );
}

#[test]
fn nth_out_of_bounds_is_an_error() {
    let env = test_env();
    let err = eval_expr("(nth (list 1 2) 5)", &env).unwrap_err();
    assert!(matches!(err, EvalError::IndexOutOfBounds { .. }));
}

#[test]
fn flatten_and_distinct_and_partition() {
    let env = test_env();
    assert_eq!(
        eval_expr("(flatten (list 1 (list 2 3) (list (list 4))))", &env).unwrap(),
        Value::List(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0), Value::Number(4.0)])
    );
    assert_eq!(
        eval_expr("(distinct (list 1 1 2 2 3))", &env).unwrap(),
        Value::List(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)])
    );
    let chunks = eval_expr("(partition 2 (list 1 2 3 4 5))", &env).unwrap();
    assert_eq!(
        chunks,
        Value::List(vec![
            Value::List(vec![Value::Number(1.0), Value::Number(2.0)]),
            Value::List(vec![Value::Number(3.0), Value::Number(4.0)]),
            Value::List(vec![Value::Number(5.0)]),
        ])
    );
}

#[test]
fn hash_map_put_and_remove_return_new_maps() {
    let env = test_env();
    eval_expr("(def m (hash-map :a 1 :b 2))", &env).unwrap();
    assert_eq!(eval_expr("(hash-map-get m :a)", &env).unwrap(), Value::Number(1.0));
    assert_eq!(eval_expr("(hash-map-size m)", &env).unwrap(), Value::Number(2.0));

    eval_expr("(def m2 (hash-map-put m :c 3))", &env).unwrap();
    assert_eq!(eval_expr("(hash-map-size m2)", &env).unwrap(), Value::Number(3.0));
    assert_eq!(eval_expr("(hash-map-size m)", &env).unwrap(), Value::Number(2.0));

    eval_expr("(def m3 (hash-map-remove m :a))", &env).unwrap();
    assert_eq!(eval_expr("(hash-map-contains? m3 :a)", &env).unwrap(), Value::Bool(false));
    assert_eq!(eval_expr("(hash-map-contains? m :a)", &env).unwrap(), Value::Bool(true));
}

#[test]
fn hash_map_get_missing_key_without_default_errors() {
    let env = test_env();
    eval_expr("(def m (hash-map))", &env).unwrap();
    let err = eval_expr("(hash-map-get m :missing)", &env).unwrap_err();
    assert!(matches!(err, EvalError::KeyNotFound(_)));
    assert_eq!(eval_expr("(hash-map-get m :missing 42)", &env).unwrap(), Value::Number(42.0));
}

#[test]
fn json_parse_and_stringify_round_trip_through_lisp_values() {
    let env = test_env();
    eval_expr(r#"(def parsed (json-parse "{\"a\": 1, \"b\": [2, 3]}"))"#, &env).unwrap();
    assert_eq!(eval_expr("(hash-map-get parsed \"a\")", &env).unwrap(), Value::Number(1.0));
    let roundtrip = eval_expr("(json-parse (json-stringify parsed))", &env).unwrap();
    assert_eq!(roundtrip, eval_expr("parsed", &env).unwrap());
}

#[test]
fn json_path_walks_nested_maps_and_lists() {
    let env = test_env();
    eval_expr(r#"(def data (json-parse "{\"items\": [10, 20, 30]}"))"#, &env).unwrap();
    assert_eq!(eval_expr(r#"(json-path data "items.1")"#, &env).unwrap(), Value::Number(20.0));
}
