// ABOUTME: List operations (spec §4.8). Lists are immutable, zero-indexed,
// ABOUTME: finite, persistent sequences; every operation here returns a new list.

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ONE, ARITY_ONE_OR_TWO, ARITY_TWO};
use crate::value::{number_to_index, Value};

fn as_items(v: &Value, function: &str) -> Result<Vec<Value>, EvalError> {
    match v {
        Value::List(items) => Ok(items.clone()),
        Value::Nil => Ok(Vec::new()),
        other => Err(EvalError::type_error(function, "list", other)),
    }
}

pub fn builtin_list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::List(args.to_vec()))
}

pub fn builtin_cons(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("cons", ARITY_TWO, args.len()));
    }
    let mut result = vec![args[0].clone()];
    result.extend(as_items(&args[1], "cons")?);
    Ok(Value::List(result))
}

pub fn builtin_car(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("car", ARITY_ONE, args.len()));
    }
    let items = as_items(&args[0], "car")?;
    items
        .into_iter()
        .next()
        .ok_or_else(|| EvalError::domain_error("car", "empty list"))
}

pub fn builtin_cdr(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("cdr", ARITY_ONE, args.len()));
    }
    let mut items = as_items(&args[0], "cdr")?;
    if items.is_empty() {
        return Err(EvalError::domain_error("cdr", "empty list"));
    }
    items.remove(0);
    Ok(if items.is_empty() { Value::Nil } else { Value::List(items) })
}

pub fn builtin_length(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("length", ARITY_ONE, args.len()));
    }
    Ok(Value::Number(as_items(&args[0], "length")?.len() as f64))
}

pub fn builtin_empty_q(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("empty?", ARITY_ONE, args.len()));
    }
    Ok(Value::Bool(as_items(&args[0], "empty?")?.is_empty()))
}

pub fn builtin_append(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("append", ARITY_TWO, args.len()));
    }
    let mut a = as_items(&args[0], "append")?;
    a.extend(as_items(&args[1], "append")?);
    Ok(Value::List(a))
}

pub fn builtin_reverse(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("reverse", ARITY_ONE, args.len()));
    }
    let mut items = as_items(&args[0], "reverse")?;
    items.reverse();
    Ok(Value::List(items))
}

pub fn builtin_nth(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("nth", ARITY_TWO, args.len()));
    }
    let items = as_items(&args[0], "nth")?;
    let index = match &args[1] {
        Value::Number(n) => number_to_index(*n, "nth")?,
        other => return Err(EvalError::type_error("nth", "number", other)),
    };
    if index < 0 || index as usize >= items.len() {
        return Err(EvalError::IndexOutOfBounds { index, length: items.len() });
    }
    Ok(items[index as usize].clone())
}

pub fn builtin_last(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("last", ARITY_ONE, args.len()));
    }
    as_items(&args[0], "last")?
        .into_iter()
        .last()
        .ok_or_else(|| EvalError::domain_error("last", "empty list"))
}

pub fn builtin_butlast(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("butlast", ARITY_ONE, args.len()));
    }
    let mut items = as_items(&args[0], "butlast")?;
    items.pop();
    Ok(if items.is_empty() { Value::Nil } else { Value::List(items) })
}

fn flatten_into(v: &Value, out: &mut Vec<Value>) {
    match v {
        Value::List(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Value::Nil => {}
        other => out.push(other.clone()),
    }
}

pub fn builtin_flatten(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("flatten", ARITY_ONE, args.len()));
    }
    let mut out = Vec::new();
    flatten_into(&args[0], &mut out);
    Ok(Value::List(out))
}

pub fn builtin_zip(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Ok(Value::Nil);
    }
    let lists = args
        .iter()
        .map(|v| as_items(v, "zip"))
        .collect::<Result<Vec<_>, _>>()?;
    let shortest = lists.iter().map(|l| l.len()).min().unwrap_or(0);
    let mut rows = Vec::with_capacity(shortest);
    for i in 0..shortest {
        rows.push(Value::List(lists.iter().map(|l| l[i].clone()).collect()));
    }
    Ok(Value::List(rows))
}

/// Default ordering: numeric, then lexicographic string comparison, then
/// fallback comparison of printed form (spec §4.8 "sort (default: ...)").
fn default_cmp(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

pub fn builtin_sort(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 && args.len() != 2 {
        return Err(EvalError::arity_error("sort", ARITY_ONE_OR_TWO, args.len()));
    }
    let mut items = as_items(&args[0], "sort")?;
    if args.len() == 1 {
        items.sort_by(default_cmp);
    } else {
        let comparator = args[1].clone();
        let mut err = None;
        items.sort_by(|a, b| {
            if err.is_some() {
                return std::cmp::Ordering::Equal;
            }
            match crate::eval::apply(&comparator, vec![a.clone(), b.clone()]) {
                Ok(v) => match v.as_bool("sort") {
                    Ok(true) => std::cmp::Ordering::Less,
                    Ok(false) => std::cmp::Ordering::Greater,
                    Err(e) => {
                        err = Some(e);
                        std::cmp::Ordering::Equal
                    }
                },
                Err(e) => {
                    err = Some(e);
                    std::cmp::Ordering::Equal
                }
            }
        });
        if let Some(e) = err {
            return Err(e);
        }
    }
    Ok(Value::List(items))
}

pub fn builtin_distinct(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("distinct", ARITY_ONE, args.len()));
    }
    let items = as_items(&args[0], "distinct")?;
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.to_string()) {
            out.push(item);
        }
    }
    Ok(Value::List(out))
}

pub fn builtin_concat(args: &[Value]) -> Result<Value, EvalError> {
    let mut out = Vec::new();
    for a in args {
        out.extend(as_items(a, "concat")?);
    }
    Ok(Value::List(out))
}

pub fn builtin_partition(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("partition", ARITY_TWO, args.len()));
    }
    let size = match &args[0] {
        Value::Number(n) => number_to_index(*n, "partition")?,
        other => return Err(EvalError::type_error("partition", "number", other)),
    };
    if size <= 0 {
        return Err(EvalError::domain_error("partition", "chunk size must be positive"));
    }
    let size = size as usize;
    let items = as_items(&args[1], "partition")?;
    let chunks = items
        .chunks(size)
        .map(|c| Value::List(c.to_vec()))
        .collect();
    Ok(Value::List(chunks))
}

pub fn builtin_map(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("map", ARITY_TWO, args.len()));
    }
    let func = args[0].clone();
    let items = as_items(&args[1], "map")?;
    let mapped = items
        .into_iter()
        .map(|item| crate::eval::apply(&func, vec![item]))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::List(mapped))
}

pub fn builtin_filter(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("filter", ARITY_TWO, args.len()));
    }
    let func = args[0].clone();
    let items = as_items(&args[1], "filter")?;
    let mut out = Vec::new();
    for item in items {
        let kept = crate::eval::apply(&func, vec![item.clone()])?;
        if kept.is_filter_truthy() {
            out.push(item);
        }
    }
    Ok(Value::List(out))
}

pub fn builtin_reduce(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 3 {
        return Err(EvalError::arity_error("reduce", "3", args.len()));
    }
    let func = args[0].clone();
    let mut acc = args[1].clone();
    for item in as_items(&args[2], "reduce")? {
        acc = crate::eval::apply(&func, vec![acc, item])?;
    }
    Ok(acc)
}

pub fn register(env: &EnvRef) {
    env.define("list", Value::BuiltinRef("list", builtin_list));
    env.define("cons", Value::BuiltinRef("cons", builtin_cons));
    env.define("car", Value::BuiltinRef("car", builtin_car));
    env.define("cdr", Value::BuiltinRef("cdr", builtin_cdr));
    env.define("first", Value::BuiltinRef("first", builtin_car));
    env.define("rest", Value::BuiltinRef("rest", builtin_cdr));
    env.define("length", Value::BuiltinRef("length", builtin_length));
    env.define("empty?", Value::BuiltinRef("empty?", builtin_empty_q));
    env.define("append", Value::BuiltinRef("append", builtin_append));
    env.define("reverse", Value::BuiltinRef("reverse", builtin_reverse));
    env.define("nth", Value::BuiltinRef("nth", builtin_nth));
    env.define("last", Value::BuiltinRef("last", builtin_last));
    env.define("butlast", Value::BuiltinRef("butlast", builtin_butlast));
    env.define("flatten", Value::BuiltinRef("flatten", builtin_flatten));
    env.define("zip", Value::BuiltinRef("zip", builtin_zip));
    env.define("sort", Value::BuiltinRef("sort", builtin_sort));
    env.define("distinct", Value::BuiltinRef("distinct", builtin_distinct));
    env.define("concat", Value::BuiltinRef("concat", builtin_concat));
    env.define("partition", Value::BuiltinRef("partition", builtin_partition));
    env.define("map", Value::BuiltinRef("map", builtin_map));
    env.define("filter", Value::BuiltinRef("filter", builtin_filter));
    env.define("reduce", Value::BuiltinRef("reduce", builtin_reduce));

    for (name, sig, desc) in [
        ("list", "(list val...)", "Creates a list from the given elements."),
        ("cons", "(cons elem list)", "Prepends elem to list, returning a new list."),
        ("car", "(car list)", "First element of list (alias: first)."),
        ("cdr", "(cdr list)", "All but the first element (alias: rest)."),
        ("first", "(first list)", "First element of list (alias: car)."),
        ("rest", "(rest list)", "All but the first element (alias: cdr)."),
        ("length", "(length list)", "Number of elements in list."),
        ("empty?", "(empty? list)", "Tests whether list has zero elements."),
        ("append", "(append list list)", "Concatenates two lists."),
        ("reverse", "(reverse list)", "Reverses list order."),
        ("nth", "(nth list index)", "Zero-indexed element access."),
        ("last", "(last list)", "The final element of list."),
        ("butlast", "(butlast list)", "All but the final element."),
        ("flatten", "(flatten list)", "Recursively flattens nested lists."),
        ("zip", "(zip list...)", "Transposes N lists, truncating to the shortest."),
        ("sort", "(sort list) or (sort list less-than)", "Sorts by default ordering or a custom comparator."),
        ("distinct", "(distinct list)", "Removes duplicates, preserving first occurrence order."),
        ("concat", "(concat list...)", "Concatenates any number of lists."),
        ("partition", "(partition size list)", "Splits list into fixed-size chunks; last chunk may be short."),
        ("map", "(map f list)", "Applies f (arity 1) to every element, collecting results."),
        ("filter", "(filter pred list)", "Keeps elements where pred (arity 1) is loosely truthy."),
        ("reduce", "(reduce f init list)", "Left-folds f (arity 2) over list starting from init."),
    ] {
        crate::help::register_help(crate::help::HelpEntry {
            name: name.to_string(),
            signature: sig.to_string(),
            description: desc.to_string(),
            examples: vec![],
            related: vec![],
            category: "List operations".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    #[test]
    fn cons_prepends_without_mutating_input() {
        let tail = list(vec![Value::Number(2.0)]);
        let result = builtin_cons(&[Value::Number(1.0), tail.clone()]).unwrap();
        assert_eq!(result, list(vec![Value::Number(1.0), Value::Number(2.0)]));
        assert_eq!(tail, list(vec![Value::Number(2.0)]));
    }

    #[test]
    fn car_and_cdr_on_empty_list_error() {
        assert!(builtin_car(&[Value::Nil]).is_err());
        assert!(builtin_cdr(&[Value::Nil]).is_err());
    }

    #[test]
    fn zip_truncates_to_shortest() {
        let a = list(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        let b = list(vec![Value::Number(10.0), Value::Number(20.0)]);
        let result = builtin_zip(&[a, b]).unwrap();
        match result {
            Value::List(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn sort_default_ordering_is_numeric() {
        let items = list(vec![Value::Number(3.0), Value::Number(1.0), Value::Number(2.0)]);
        let sorted = builtin_sort(&[items]).unwrap();
        assert_eq!(
            sorted,
            list(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn partition_final_chunk_may_be_short() {
        let items = list(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        let result = builtin_partition(&[Value::Number(2.0), items]).unwrap();
        match result {
            Value::List(chunks) => {
                assert_eq!(chunks.len(), 2);
                assert_eq!(chunks[1], list(vec![Value::Number(3.0)]));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn distinct_preserves_first_occurrence_order() {
        let items = list(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(1.0)]);
        let result = builtin_distinct(&[items]).unwrap();
        assert_eq!(result, list(vec![Value::Number(1.0), Value::Number(2.0)]));
    }
}
