// ABOUTME: String operations (spec §4.8): splitting/joining, extraction, case and
// ABOUTME: trimming, predicates, numeric conversion, regex, and repetition.

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ONE, ARITY_THREE, ARITY_TWO};
use crate::value::{number_to_index, Value};
use regex::Regex;

fn as_str<'a>(v: &'a Value, function: &str) -> Result<&'a str, EvalError> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(EvalError::type_error(function, "string", other)),
    }
}

pub fn builtin_string_append(args: &[Value]) -> Result<Value, EvalError> {
    let mut out = String::new();
    for a in args {
        out.push_str(as_str(a, "string-append")?);
    }
    Ok(Value::String(out))
}

pub fn builtin_string_length(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("string-length", ARITY_ONE, args.len()));
    }
    Ok(Value::Number(as_str(&args[0], "string-length")?.chars().count() as f64))
}

/// `(substring s start end)`. Half-open, character-indexed range.
pub fn builtin_substring(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 3 {
        return Err(EvalError::arity_error("substring", ARITY_THREE, args.len()));
    }
    let s = as_str(&args[0], "substring")?;
    let start = match &args[1] {
        Value::Number(n) => number_to_index(*n, "substring")?,
        other => return Err(EvalError::type_error("substring", "number", other)),
    };
    let end = match &args[2] {
        Value::Number(n) => number_to_index(*n, "substring")?,
        other => return Err(EvalError::type_error("substring", "number", other)),
    };
    let chars: Vec<char> = s.chars().collect();
    if start < 0 || end < start || end as usize > chars.len() {
        return Err(EvalError::IndexOutOfBounds { index: end, length: chars.len() });
    }
    Ok(Value::String(chars[start as usize..end as usize].iter().collect()))
}

/// `(char-at s i)`. Returns the i-th character as a one-character string.
pub fn builtin_char_at(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("char-at", ARITY_TWO, args.len()));
    }
    let s = as_str(&args[0], "char-at")?;
    let i = match &args[1] {
        Value::Number(n) => number_to_index(*n, "char-at")?,
        other => return Err(EvalError::type_error("char-at", "number", other)),
    };
    let chars: Vec<char> = s.chars().collect();
    if i < 0 || i as usize >= chars.len() {
        return Err(EvalError::IndexOutOfBounds { index: i, length: chars.len() });
    }
    Ok(Value::String(chars[i as usize].to_string()))
}

pub fn builtin_string_trim(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("string-trim", ARITY_ONE, args.len()));
    }
    Ok(Value::String(as_str(&args[0], "string-trim")?.trim().to_string()))
}

pub fn builtin_string_upper(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("string-upper", ARITY_ONE, args.len()));
    }
    Ok(Value::String(as_str(&args[0], "string-upper")?.to_uppercase()))
}

pub fn builtin_string_lower(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("string-lower", ARITY_ONE, args.len()));
    }
    Ok(Value::String(as_str(&args[0], "string-lower")?.to_lowercase()))
}

pub fn builtin_string_split(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("string-split", ARITY_TWO, args.len()));
    }
    let s = as_str(&args[0], "string-split")?;
    let delim = as_str(&args[1], "string-split")?;
    let parts = if delim.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(delim).map(|p| Value::String(p.to_string())).collect()
    };
    Ok(Value::List(parts))
}

pub fn builtin_string_join(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("string-join", ARITY_TWO, args.len()));
    }
    let items = match &args[0] {
        Value::List(items) | Value::Bracket(items) => items,
        other => return Err(EvalError::type_error("string-join", "list", other)),
    };
    let sep = as_str(&args[1], "string-join")?;
    let parts = items
        .iter()
        .map(|v| as_str(v, "string-join").map(|s| s.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::String(parts.join(sep)))
}

/// All occurrences of `from` are replaced, not just the first.
pub fn builtin_string_replace(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 3 {
        return Err(EvalError::arity_error("string-replace", ARITY_THREE, args.len()));
    }
    let s = as_str(&args[0], "string-replace")?;
    let from = as_str(&args[1], "string-replace")?;
    let to = as_str(&args[2], "string-replace")?;
    Ok(Value::String(s.replace(from, to)))
}

pub fn builtin_string_contains_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("string-contains?", ARITY_TWO, args.len()));
    }
    Ok(Value::Bool(
        as_str(&args[0], "string-contains?")?.contains(as_str(&args[1], "string-contains?")?),
    ))
}

pub fn builtin_string_starts_with_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("string-starts-with?", ARITY_TWO, args.len()));
    }
    Ok(Value::Bool(
        as_str(&args[0], "string-starts-with?")?.starts_with(as_str(&args[1], "string-starts-with?")?),
    ))
}

pub fn builtin_string_ends_with_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("string-ends-with?", ARITY_TWO, args.len()));
    }
    Ok(Value::Bool(
        as_str(&args[0], "string-ends-with?")?.ends_with(as_str(&args[1], "string-ends-with?")?),
    ))
}

pub fn builtin_string_empty_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("string-empty?", ARITY_ONE, args.len()));
    }
    Ok(Value::Bool(as_str(&args[0], "string-empty?")?.is_empty()))
}

/// `(index-of s needle)`. Character index, or -1 if absent.
pub fn builtin_index_of(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("index-of", ARITY_TWO, args.len()));
    }
    let s = as_str(&args[0], "index-of")?;
    let needle = as_str(&args[1], "index-of")?;
    match s.find(needle) {
        Some(byte_idx) => Ok(Value::Number(s[..byte_idx].chars().count() as f64)),
        None => Ok(Value::Number(-1.0)),
    }
}

pub fn builtin_string_to_number(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("string->number", ARITY_ONE, args.len()));
    }
    let s = as_str(&args[0], "string->number")?;
    s.trim()
        .parse::<f64>()
        .map(Value::Number)
        .map_err(|_| EvalError::domain_error("string->number", format!("cannot parse '{s}' as a number")))
}

pub fn builtin_number_to_string(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("number->string", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Number(_) | Value::BigNumber(_) => Ok(Value::String(args[0].to_string())),
        other => Err(EvalError::type_error("number->string", "number", other)),
    }
}

pub fn builtin_string_to_list(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("string->list", ARITY_ONE, args.len()));
    }
    Ok(Value::List(
        as_str(&args[0], "string->list")?.chars().map(|c| Value::String(c.to_string())).collect(),
    ))
}

pub fn builtin_list_to_string(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("list->string", ARITY_ONE, args.len()));
    }
    let items = match &args[0] {
        Value::List(items) | Value::Bracket(items) => items,
        other => return Err(EvalError::type_error("list->string", "list", other)),
    };
    let mut out = String::new();
    for item in items {
        out.push_str(as_str(item, "list->string")?);
    }
    Ok(Value::String(out))
}

/// `(repeat s n)`. n must be a non-negative integer.
pub fn builtin_repeat(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("repeat", ARITY_TWO, args.len()));
    }
    let s = as_str(&args[0], "repeat")?;
    let n = match &args[1] {
        Value::Number(n) => number_to_index(*n, "repeat")?,
        other => return Err(EvalError::type_error("repeat", "number", other)),
    };
    if n < 0 {
        return Err(EvalError::domain_error("repeat", "count must be non-negative"));
    }
    Ok(Value::String(s.repeat(n as usize)))
}

fn compile_regex(pattern: &str, function: &str) -> Result<Regex, EvalError> {
    Regex::new(pattern).map_err(|e| EvalError::RegexError(format!("{function}: {e}")))
}

/// `(string-regex-match? s pattern)`. Unanchored match against the default regex flavor.
pub fn builtin_string_regex_match_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("string-regex-match?", ARITY_TWO, args.len()));
    }
    let s = as_str(&args[0], "string-regex-match?")?;
    let pattern = as_str(&args[1], "string-regex-match?")?;
    Ok(Value::Bool(compile_regex(pattern, "string-regex-match?")?.is_match(s)))
}

/// `(string-regex-find-all s pattern)`. Returns every non-overlapping match.
pub fn builtin_string_regex_find_all(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("string-regex-find-all", ARITY_TWO, args.len()));
    }
    let s = as_str(&args[0], "string-regex-find-all")?;
    let pattern = as_str(&args[1], "string-regex-find-all")?;
    let re = compile_regex(pattern, "string-regex-find-all")?;
    Ok(Value::List(re.find_iter(s).map(|m| Value::String(m.as_str().to_string())).collect()))
}

pub fn register(env: &EnvRef) {
    env.define("string-append", Value::BuiltinRef("string-append", builtin_string_append));
    env.define("string-length", Value::BuiltinRef("string-length", builtin_string_length));
    env.define("substring", Value::BuiltinRef("substring", builtin_substring));
    env.define("char-at", Value::BuiltinRef("char-at", builtin_char_at));
    env.define("string-trim", Value::BuiltinRef("string-trim", builtin_string_trim));
    env.define("string-upper", Value::BuiltinRef("string-upper", builtin_string_upper));
    env.define("string-lower", Value::BuiltinRef("string-lower", builtin_string_lower));
    env.define("string-split", Value::BuiltinRef("string-split", builtin_string_split));
    env.define("string-join", Value::BuiltinRef("string-join", builtin_string_join));
    env.define("string-replace", Value::BuiltinRef("string-replace", builtin_string_replace));
    env.define("string-contains?", Value::BuiltinRef("string-contains?", builtin_string_contains_p));
    env.define(
        "string-starts-with?",
        Value::BuiltinRef("string-starts-with?", builtin_string_starts_with_p),
    );
    env.define("string-ends-with?", Value::BuiltinRef("string-ends-with?", builtin_string_ends_with_p));
    env.define("string-empty?", Value::BuiltinRef("string-empty?", builtin_string_empty_p));
    env.define("index-of", Value::BuiltinRef("index-of", builtin_index_of));
    env.define("string->number", Value::BuiltinRef("string->number", builtin_string_to_number));
    env.define("number->string", Value::BuiltinRef("number->string", builtin_number_to_string));
    env.define("string->list", Value::BuiltinRef("string->list", builtin_string_to_list));
    env.define("list->string", Value::BuiltinRef("list->string", builtin_list_to_string));
    env.define("repeat", Value::BuiltinRef("repeat", builtin_repeat));
    env.define(
        "string-regex-match?",
        Value::BuiltinRef("string-regex-match?", builtin_string_regex_match_p),
    );
    env.define(
        "string-regex-find-all",
        Value::BuiltinRef("string-regex-find-all", builtin_string_regex_find_all),
    );

    for (name, sig, desc) in [
        ("string-append", "(string-append s...)", "Concatenates any number of strings."),
        ("string-length", "(string-length s)", "Returns the character count of s."),
        ("substring", "(substring s start end)", "Returns the half-open character range [start, end)."),
        ("char-at", "(char-at s i)", "Returns the i-th character as a one-character string."),
        ("string-trim", "(string-trim s)", "Removes leading and trailing whitespace."),
        ("string-upper", "(string-upper s)", "Converts to uppercase."),
        ("string-lower", "(string-lower s)", "Converts to lowercase."),
        ("string-split", "(string-split s delim)", "Splits s on every occurrence of delim."),
        ("string-join", "(string-join parts sep)", "Joins a list of strings with sep between them."),
        ("string-replace", "(string-replace s from to)", "Replaces every occurrence of from with to."),
        ("string-contains?", "(string-contains? s needle)", "Tests whether s contains needle."),
        ("string-starts-with?", "(string-starts-with? s prefix)", "Tests whether s starts with prefix."),
        ("string-ends-with?", "(string-ends-with? s suffix)", "Tests whether s ends with suffix."),
        ("string-empty?", "(string-empty? s)", "Tests whether s has zero length."),
        ("index-of", "(index-of s needle)", "Returns the character index of needle's first occurrence, or -1."),
        ("string->number", "(string->number s)", "Parses s as a number, erroring if it is not one."),
        ("number->string", "(number->string n)", "Formats a number (or bignumber) as a string."),
        ("string->list", "(string->list s)", "Splits s into a list of one-character strings."),
        ("list->string", "(list->string chars)", "Concatenates a list of strings into one."),
        ("repeat", "(repeat s n)", "Repeats s n times; n must be non-negative."),
        ("string-regex-match?", "(string-regex-match? s pattern)", "Tests for an unanchored regex match anywhere in s."),
        ("string-regex-find-all", "(string-regex-find-all s pattern)", "Returns every non-overlapping regex match in s."),
    ] {
        crate::help::register_help(crate::help::HelpEntry {
            name: name.to_string(),
            signature: sig.to_string(),
            description: desc.to_string(),
            examples: vec![],
            related: vec![],
            category: "Strings".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_is_half_open_and_char_indexed() {
        let s = Value::String("hello".into());
        assert_eq!(
            builtin_substring(&[s, Value::Number(1.0), Value::Number(4.0)]).unwrap(),
            Value::String("ell".into())
        );
    }

    #[test]
    fn index_of_returns_negative_one_when_absent() {
        let s = Value::String("hello".into());
        assert_eq!(builtin_index_of(&[s, Value::String("z".into())]).unwrap(), Value::Number(-1.0));
    }

    #[test]
    fn string_to_number_errors_on_invalid_input_instead_of_returning_an_error_value() {
        assert!(builtin_string_to_number(&[Value::String("not-a-number".into())]).is_err());
    }

    #[test]
    fn repeat_rejects_negative_counts() {
        assert!(builtin_repeat(&[Value::String("ab".into()), Value::Number(-1.0)]).is_err());
    }

    #[test]
    fn regex_find_all_collects_every_match() {
        let s = Value::String("a1 b22 c333".into());
        let pattern = Value::String(r"\d+".into());
        assert_eq!(
            builtin_string_regex_find_all(&[s, pattern]).unwrap(),
            Value::List(vec![
                Value::String("1".into()),
                Value::String("22".into()),
                Value::String("333".into()),
            ])
        );
    }

    #[test]
    fn string_replace_replaces_every_occurrence() {
        let s = Value::String("a-b-c".into());
        assert_eq!(
            builtin_string_replace(&[s, Value::String("-".into()), Value::String("_".into())]).unwrap(),
            Value::String("a_b_c".into())
        );
    }
}
