// ABOUTME: Hash-map operations (spec §4.8). Keys are stored via `Value::map_key_string`
// ABOUTME: so a `Keyword` key and a `String` key with the same text never collide.

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ONE, ARITY_TWO};
use crate::value::Value;
use std::collections::HashMap;

fn as_map<'a>(v: &'a Value, function: &str) -> Result<&'a HashMap<String, Value>, EvalError> {
    match v {
        Value::Map(m) => Ok(m),
        other => Err(EvalError::type_error(function, "map", other)),
    }
}

/// `(hash-map k1 v1 k2 v2 ...)`. An odd number of arguments is an error.
pub fn builtin_hash_map(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() % 2 != 0 {
        return Err(EvalError::domain_error("hash-map", "expected an even number of key/value arguments"));
    }
    let mut map = HashMap::new();
    for pair in args.chunks(2) {
        map.insert(pair[0].map_key_string(), pair[1].clone());
    }
    Ok(Value::Map(map))
}

/// `(hash-map-get m key [default])`.
pub fn builtin_hash_map_get(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(EvalError::arity_error("hash-map-get", "2-3", args.len()));
    }
    let map = as_map(&args[0], "hash-map-get")?;
    let key = args[1].map_key_string();
    match map.get(&key) {
        Some(v) => Ok(v.clone()),
        None => {
            if args.len() == 3 {
                Ok(args[2].clone())
            } else {
                Err(EvalError::KeyNotFound(key))
            }
        }
    }
}

/// `(hash-map-put m key val)` returns a NEW map; the input is never mutated.
pub fn builtin_hash_map_put(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 3 {
        return Err(EvalError::arity_error("hash-map-put", "3", args.len()));
    }
    let mut map = as_map(&args[0], "hash-map-put")?.clone();
    map.insert(args[1].map_key_string(), args[2].clone());
    Ok(Value::Map(map))
}

/// `(hash-map-remove m key)` returns a NEW map.
pub fn builtin_hash_map_remove(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("hash-map-remove", ARITY_TWO, args.len()));
    }
    let mut map = as_map(&args[0], "hash-map-remove")?.clone();
    map.remove(&args[1].map_key_string());
    Ok(Value::Map(map))
}

pub fn builtin_hash_map_contains_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("hash-map-contains?", ARITY_TWO, args.len()));
    }
    let map = as_map(&args[0], "hash-map-contains?")?;
    Ok(Value::Bool(map.contains_key(&args[1].map_key_string())))
}

/// Keys come back as the original value forms (`:k` keywords unwrap back to
/// `Value::Keyword`), sorted by their stored string form for determinism.
fn key_to_value(key: &str) -> Value {
    match key.strip_prefix(':') {
        Some(rest) => Value::Keyword(rest.to_string()),
        None => Value::String(key.to_string()),
    }
}

pub fn builtin_hash_map_keys(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("hash-map-keys", ARITY_ONE, args.len()));
    }
    let map = as_map(&args[0], "hash-map-keys")?;
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    Ok(Value::List(keys.into_iter().map(|k| key_to_value(k)).collect()))
}

pub fn builtin_hash_map_values(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("hash-map-values", ARITY_ONE, args.len()));
    }
    let map = as_map(&args[0], "hash-map-values")?;
    let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
    pairs.sort_by_key(|(k, _)| (*k).clone());
    Ok(Value::List(pairs.into_iter().map(|(_, v)| v.clone()).collect()))
}

pub fn builtin_hash_map_size(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("hash-map-size", ARITY_ONE, args.len()));
    }
    Ok(Value::Number(as_map(&args[0], "hash-map-size")?.len() as f64))
}

pub fn builtin_hash_map_empty_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("hash-map-empty?", ARITY_ONE, args.len()));
    }
    Ok(Value::Bool(as_map(&args[0], "hash-map-empty?")?.is_empty()))
}

pub fn register(env: &EnvRef) {
    env.define("hash-map", Value::BuiltinRef("hash-map", builtin_hash_map));
    env.define("hash-map-get", Value::BuiltinRef("hash-map-get", builtin_hash_map_get));
    env.define("hash-map-put", Value::BuiltinRef("hash-map-put", builtin_hash_map_put));
    env.define("hash-map-remove", Value::BuiltinRef("hash-map-remove", builtin_hash_map_remove));
    env.define(
        "hash-map-contains?",
        Value::BuiltinRef("hash-map-contains?", builtin_hash_map_contains_p),
    );
    env.define("hash-map-keys", Value::BuiltinRef("hash-map-keys", builtin_hash_map_keys));
    env.define("hash-map-values", Value::BuiltinRef("hash-map-values", builtin_hash_map_values));
    env.define("hash-map-size", Value::BuiltinRef("hash-map-size", builtin_hash_map_size));
    env.define(
        "hash-map-empty?",
        Value::BuiltinRef("hash-map-empty?", builtin_hash_map_empty_p),
    );

    for (name, sig, desc) in [
        ("hash-map", "(hash-map k1 v1 ...)", "Builds a hash-map from key/value pairs. An odd argument count is an error."),
        ("hash-map-get", "(hash-map-get m k [default])", "Looks up k, returning default (or erroring) if absent."),
        ("hash-map-put", "(hash-map-put m k v)", "Returns a new map with k bound to v; m is unchanged."),
        ("hash-map-remove", "(hash-map-remove m k)", "Returns a new map with k removed; m is unchanged."),
        ("hash-map-contains?", "(hash-map-contains? m k)", "Tests whether k is present in m."),
        ("hash-map-keys", "(hash-map-keys m)", "Returns m's keys as a list, in a deterministic order."),
        ("hash-map-values", "(hash-map-values m)", "Returns m's values as a list, ordered to match hash-map-keys."),
        ("hash-map-size", "(hash-map-size m)", "Returns the number of entries in m."),
        ("hash-map-empty?", "(hash-map-empty? m)", "Tests whether m has no entries."),
    ] {
        crate::help::register_help(crate::help::HelpEntry {
            name: name.to_string(),
            signature: sig.to_string(),
            description: desc.to_string(),
            examples: vec![],
            related: vec![],
            category: "Hash maps".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_remove_never_mutate_the_input_map() {
        let m = builtin_hash_map(&[Value::Keyword("a".into()), Value::Number(1.0)]).unwrap();
        let m2 = builtin_hash_map_put(&[m.clone(), Value::Keyword("b".into()), Value::Number(2.0)]).unwrap();
        assert_eq!(builtin_hash_map_size(&[m.clone()]).unwrap(), Value::Number(1.0));
        assert_eq!(builtin_hash_map_size(&[m2]).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn get_returns_default_or_errors_when_absent() {
        let m = builtin_hash_map(&[]).unwrap();
        assert_eq!(
            builtin_hash_map_get(&[m.clone(), Value::Keyword("x".into()), Value::Nil]).unwrap(),
            Value::Nil
        );
        assert!(builtin_hash_map_get(&[m, Value::Keyword("x".into())]).is_err());
    }

    #[test]
    fn odd_argument_count_is_an_error() {
        assert!(builtin_hash_map(&[Value::Keyword("a".into())]).is_err());
    }

    #[test]
    fn keyword_and_string_keys_with_the_same_text_are_distinct() {
        let m = builtin_hash_map(&[
            Value::Keyword("a".into()),
            Value::Number(1.0),
            Value::String("a".into()),
            Value::Number(2.0),
        ])
        .unwrap();
        assert_eq!(builtin_hash_map_size(&[m]).unwrap(), Value::Number(2.0));
    }
}
