// ABOUTME: JSON bridge (spec §4.8/§10): json-parse, json-stringify, json-stringify-pretty,
// ABOUTME: json-path. Map<->object, List<->array, Number<->number, Keyword->string (strip ':').

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ONE, ARITY_TWO};
use crate::value::Value;
use std::collections::HashMap;

fn value_to_json(value: &Value) -> Result<serde_json::Value, EvalError> {
    match value {
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .ok_or_else(|| EvalError::JsonError(format!("cannot represent {n} as JSON"))),
        Value::BigNumber(n) => Ok(serde_json::Value::String(n.to_string())),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Keyword(k) => Ok(serde_json::Value::String(k.clone())),
        Value::Nil => Ok(serde_json::Value::Null),
        Value::List(items) | Value::Bracket(items) => {
            Ok(serde_json::Value::Array(items.iter().map(value_to_json).collect::<Result<_, _>>()?))
        }
        Value::Map(map) => {
            let mut obj = serde_json::Map::new();
            for (key, val) in map {
                obj.insert(key.clone(), value_to_json(val)?);
            }
            Ok(serde_json::Value::Object(obj))
        }
        other => Err(EvalError::JsonError(format!("cannot encode {} as JSON", other.type_name()))),
    }
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(arr) => Value::List(arr.iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => {
            let mut map = HashMap::new();
            for (key, val) in obj {
                map.insert(key.clone(), json_to_value(val));
            }
            Value::Map(map)
        }
    }
}

fn as_str<'a>(v: &'a Value, function: &str) -> Result<&'a str, EvalError> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(EvalError::type_error(function, "string", other)),
    }
}

pub fn builtin_json_parse(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("json-parse", ARITY_ONE, args.len()));
    }
    let source = as_str(&args[0], "json-parse")?;
    let parsed: serde_json::Value =
        serde_json::from_str(source).map_err(|e| EvalError::JsonError(e.to_string()))?;
    Ok(json_to_value(&parsed))
}

pub fn builtin_json_stringify(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("json-stringify", ARITY_ONE, args.len()));
    }
    let json = value_to_json(&args[0])?;
    serde_json::to_string(&json)
        .map(Value::String)
        .map_err(|e| EvalError::JsonError(e.to_string()))
}

pub fn builtin_json_stringify_pretty(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("json-stringify-pretty", ARITY_ONE, args.len()));
    }
    let json = value_to_json(&args[0])?;
    serde_json::to_string_pretty(&json)
        .map(Value::String)
        .map_err(|e| EvalError::JsonError(e.to_string()))
}

/// `(json-path value "a.b.0.c")`: walk dot-separated segments, treating an
/// all-digit segment as a list index and everything else as a map key.
pub fn builtin_json_path(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("json-path", ARITY_TWO, args.len()));
    }
    let path = as_str(&args[1], "json-path")?;
    let mut current = args[0].clone();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match (segment.parse::<usize>(), &current) {
            (Ok(idx), Value::List(items) | Value::Bracket(items)) => items
                .get(idx)
                .cloned()
                .ok_or(EvalError::IndexOutOfBounds { index: idx as i64, length: items.len() })?,
            (_, Value::Map(map)) => map
                .get(segment)
                .cloned()
                .ok_or_else(|| EvalError::KeyNotFound(segment.to_string()))?,
            _ => return Err(EvalError::type_error("json-path", "map or list", &current)),
        };
    }
    Ok(current)
}

pub fn register(env: &EnvRef) {
    env.define("json-parse", Value::BuiltinRef("json-parse", builtin_json_parse));
    env.define("json-stringify", Value::BuiltinRef("json-stringify", builtin_json_stringify));
    env.define(
        "json-stringify-pretty",
        Value::BuiltinRef("json-stringify-pretty", builtin_json_stringify_pretty),
    );
    env.define("json-path", Value::BuiltinRef("json-path", builtin_json_path));

    for (name, sig, desc) in [
        ("json-parse", "(json-parse s)", "Parses a JSON string into a Lisp value (object->map, array->list, null->nil)."),
        ("json-stringify", "(json-stringify v)", "Encodes v as a compact JSON string. BigNumber values round-trip as JSON strings."),
        ("json-stringify-pretty", "(json-stringify-pretty v)", "Like json-stringify, but indented for readability."),
        ("json-path", "(json-path v \"a.b.0\")", "Walks v via dot-separated segments; digit segments index into lists, others key into maps."),
    ] {
        crate::help::register_help(crate::help::HelpEntry {
            name: name.to_string(),
            signature: sig.to_string(),
            description: desc.to_string(),
            examples: vec![],
            related: vec![],
            category: "JSON".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_objects_and_arrays() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), Value::Number(1.0));
        let v = Value::Map(map);
        let s = builtin_json_stringify(&[v.clone()]).unwrap();
        let back = builtin_json_parse(&[s]).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn json_path_walks_nested_structures() {
        let inner = Value::List(vec![Value::Number(10.0), Value::Number(20.0)]);
        let mut map = HashMap::new();
        map.insert("items".to_string(), inner);
        let v = Value::Map(map);
        let result = builtin_json_path(&[v, Value::String("items.1".into())]).unwrap();
        assert_eq!(result, Value::Number(20.0));
    }

    #[test]
    fn json_path_missing_key_errors() {
        let v = Value::Map(HashMap::new());
        assert!(builtin_json_path(&[v, Value::String("missing".into())]).is_err());
    }

    #[test]
    fn invalid_json_is_a_json_error() {
        let err = builtin_json_parse(&[Value::String("{not json".into())]).unwrap_err();
        assert!(matches!(err, EvalError::JsonError(_)));
    }
}
