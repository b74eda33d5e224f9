// ABOUTME: Parser module for parsing Lisp expressions using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{not, opt, peek, recognize, value},
    multi::many0,
    IResult, Parser,
};

use crate::value::Value;
use num_bigint::BigInt;
use std::cell::RefCell;
use std::str::FromStr;

// ============================================================================
// Thread-Local Doc Comment Storage
// ============================================================================

thread_local! {
    /// Holds doc comments (;;;) that precede a top-level expression
    static PENDING_DOCS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Store doc comments to be attached to the next defined function
pub fn set_pending_docs(docs: Vec<String>) {
    PENDING_DOCS.with(|d| *d.borrow_mut() = docs);
}

/// Retrieve and clear pending doc comments
pub fn take_pending_docs() -> Vec<String> {
    PENDING_DOCS.with(|d| std::mem::take(&mut *d.borrow_mut()))
}

// ============================================================================
// Comment Parsers
// ============================================================================

/// Parse a documentation comment (line starting with ;;;)
fn parse_doc_comment(input: &str) -> IResult<&str, String> {
    let (input, _) = tag(";;;")(input)?;
    let (input, text) = take_while(|c| c != '\n')(input)?;
    Ok((input, text.trim().to_string()))
}

/// Parse a regular comment (line starting with ;, but not ;; or ;;;)
fn parse_regular_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = not(peek(char(';'))).parse(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

/// Parse a double semicolon comment (;;, but not ;;;)
fn parse_double_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = tag(";;")(input)?;
    let (input, _) = not(peek(char(';'))).parse(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

/// Skip whitespace and comments
fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((
        value((), multispace1),
        parse_double_comment,
        parse_regular_comment,
        value((), parse_doc_comment.map(|_| ())),
    )))
    .map(|_| ())
    .parse(input)
}

/// Skip whitespace and regular comments, but collect doc comments
fn ws_and_collect_docs(input: &str) -> IResult<&str, Vec<String>> {
    let mut docs = Vec::new();
    let mut input = input;

    loop {
        let start = input;

        if let Ok((rest, _)) = multispace1::<_, nom::error::Error<_>>(input) {
            input = rest;
            continue;
        }

        if let Ok((rest, doc)) = parse_doc_comment(input) {
            docs.push(doc);
            input = rest;
            if let Ok((rest, _)) = char::<_, nom::error::Error<_>>('\n')(input) {
                input = rest;
            }
            continue;
        }

        if let Ok((rest, _)) = parse_double_comment(input) {
            input = rest;
            if let Ok((rest, _)) = char::<_, nom::error::Error<_>>('\n')(input) {
                input = rest;
            }
            continue;
        }

        if let Ok((rest, _)) = parse_regular_comment(input) {
            input = rest;
            if let Ok((rest, _)) = char::<_, nom::error::Error<_>>('\n')(input) {
                input = rest;
            }
            continue;
        }

        if start == input {
            break;
        }
    }

    Ok((input, docs))
}

/// Parse a number (integer or floating point). An integer suffixed with `n`
/// (e.g. `99999999999999999999n`) is parsed directly as a `BigNumber` instead
/// of a lossy `f64`, the one piece of surface syntax this dialect adds beyond
/// its teacher for spec §3's arbitrary-precision integers.
fn parse_number(input: &str) -> IResult<&str, Value> {
    let (input, sign) = opt(char('-')).parse(input)?;
    let (input, int_part) = digit1(input)?;
    let (input, frac_part) = opt(recognize((char('.'), opt(digit1)))).parse(input)?;

    if frac_part.is_none() {
        if let Ok((input, _)) = char::<_, nom::error::Error<_>>('n')(input) {
            let digits = format!("{}{}", sign.map(|_| "-").unwrap_or(""), int_part);
            let big = BigInt::from_str(&digits).expect("validated digit string");
            return Ok((input, Value::BigNumber(big)));
        }
    }

    let num_str = match frac_part {
        Some(frac) => format!("{}{}{}", sign.map(|_| "-").unwrap_or(""), int_part, frac),
        None => format!("{}{}", sign.map(|_| "-").unwrap_or(""), int_part),
    };
    let num: f64 = num_str.parse().expect("validated digit string");
    Ok((input, Value::Number(num)))
}

/// Parse a leading-decimal number: .5, -.5
fn parse_leading_dot_number(input: &str) -> IResult<&str, Value> {
    recognize((opt(char('-')), char('.'), digit1))
        .map(|num_str: &str| {
            let num: f64 = num_str.parse().expect("validated digit string");
            Value::Number(num)
        })
        .parse(input)
}

/// Parse a boolean literal. The canonical input spelling is the bareword
/// `true`/`false` (handled as a self-evaluating symbol in `eval`, matching
/// printed output of `#t`/`#f`); `#t`/`#f` are accepted directly too so the
/// printed form always round-trips back through the reader.
fn parse_bool(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), tag("#t")),
        value(Value::Bool(false), tag("#f")),
    ))
    .parse(input)
}

const SYMBOL_LEAD: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+-*/%<>=!?";
const SYMBOL_REST_EXTRA: [char; 11] = ['-', '_', '?', '!', '<', '>', '=', '+', '*', '/', '%'];

fn is_symbol_rest(c: char) -> bool {
    c.is_alphanumeric() || c == '.' || SYMBOL_REST_EXTRA.contains(&c)
}

/// Parse a symbol, including module-qualified forms like `mymod.greet`
/// (spec §4.9's dotted-access notation; dispatch splits on `.` in `eval`).
fn parse_symbol(input: &str) -> IResult<&str, Value> {
    let (input, first) = one_of(SYMBOL_LEAD)(input)?;
    let (input, rest) =
        take_while1::<_, _, nom::error::Error<_>>(is_symbol_rest)(input).unwrap_or((input, ""));

    let mut symbol = String::new();
    symbol.push(first);
    symbol.push_str(rest);

    Ok((input, Value::Symbol(symbol)))
}

/// Parse a keyword literal: `:name`. Self-evaluating (§3, §4.3 point 2).
fn parse_keyword(input: &str) -> IResult<&str, Value> {
    let (input, _) = char(':')(input)?;
    let (input, name) = take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)?;
    Ok((input, Value::Keyword(name.to_string())))
}

/// Parse a string with escape sequences: \", \\, \n, \t
fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"')(input)?;

    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Value::String(String::new())));
    }

    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\nt"))(input)?;
    let (input, _) = char('"')(input)?;

    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    '\\' => result.push('\\'),
                    '"' => result.push('"'),
                    _ => {
                        result.push('\\');
                        result.push(next);
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    Ok((input, Value::String(result)))
}

/// Parse a quoted expression: 'expr -> (quote expr)
fn parse_quote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((
        input,
        Value::List(vec![Value::Symbol("quote".to_string()), expr]),
    ))
}

/// Parse a quasiquoted expression: `expr -> (quasiquote expr)
fn parse_quasiquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('`')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((
        input,
        Value::List(vec![Value::Symbol("quasiquote".to_string()), expr]),
    ))
}

/// Parse `,expr` (unquote) or `,@expr` (unquote-splicing)
fn parse_unquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char(',')(input)?;

    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('@')(input) {
        let (input, expr) = parse_expr(input)?;
        Ok((
            input,
            Value::List(vec![Value::Symbol("unquote-splicing".to_string()), expr]),
        ))
    } else {
        let (input, expr) = parse_expr(input)?;
        Ok((
            input,
            Value::List(vec![Value::Symbol("unquote".to_string()), expr]),
        ))
    }
}

/// Parse a list: (expr1 expr2 ...). Empty list () becomes Value::Nil.
fn parse_list(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('(')(input)?;
    let (input, _) = ws_and_comments(input)?;

    let mut items = Vec::new();
    let mut remaining = input;

    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(')')(remaining) {
            if items.is_empty() {
                return Ok((rest, Value::Nil));
            }
            return Ok((rest, Value::List(items)));
        }

        let (rest, expr) = parse_expr(remaining)?;
        items.push(expr);

        let (rest, _) = ws_and_comments(rest)?;
        remaining = rest;
    }
}

/// Parse a bracketed parameter/literal list: [expr1 expr2 ...].
/// Unlike `()`, an empty `[]` stays `Bracket(vec![])`, never collapsing to nil.
fn parse_bracket(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('[')(input)?;
    let (input, _) = ws_and_comments(input)?;

    let mut items = Vec::new();
    let mut remaining = input;

    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(']')(remaining) {
            return Ok((rest, Value::Bracket(items)));
        }

        let (rest, expr) = parse_expr(remaining)?;
        items.push(expr);

        let (rest, _) = ws_and_comments(rest)?;
        remaining = rest;
    }
}

/// Main expression parser - tries all alternatives
fn parse_expr(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws_and_comments(input)?;
    alt((
        parse_quote,
        parse_quasiquote,
        parse_unquote,
        parse_list,
        parse_bracket,
        parse_bool,
        parse_keyword,
        parse_number,
        parse_leading_dot_number,
        parse_string,
        parse_symbol,
    ))
    .parse(input)
}

/// Parse a single top-level expression.
///
/// Collects any leading doc comments (;;;) and stores them in thread-local
/// storage so they can be attached to the next `def`/`defn` expression.
pub fn parse(input: &str) -> Result<Value, String> {
    let (input_after_docs, docs) = ws_and_collect_docs(input).unwrap_or((input, Vec::new()));

    if !docs.is_empty() {
        set_pending_docs(docs);
    }

    if input_after_docs.trim().is_empty() {
        return Ok(Value::Nil);
    }

    match parse_expr(input_after_docs) {
        Ok((rest, value)) => {
            let (rest, _) = ws_and_comments(rest).unwrap_or((rest, ()));
            if !rest.is_empty() {
                Err(format!("Parse error: unexpected trailing input: '{}'", rest))
            } else {
                Ok(value)
            }
        }
        Err(e) => Err(format!("Parse error: {:?}", e)),
    }
}

/// Parse every top-level expression in a source file (used by `load`/`require`).
pub fn parse_all(input: &str) -> Result<Vec<Value>, String> {
    let mut remaining = input;
    let mut exprs = Vec::new();

    loop {
        let (rest, _) = ws_and_comments(remaining).unwrap_or((remaining, ()));
        if rest.trim().is_empty() {
            break;
        }
        let (rest, expr) = parse_expr(rest).map_err(|e| format!("Parse error: {:?}", e))?;
        exprs.push(expr);
        remaining = rest;
    }

    Ok(exprs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert!(matches!(parse("42"), Ok(Value::Number(n)) if n == 42.0));
        assert!(matches!(parse("-42"), Ok(Value::Number(n)) if n == -42.0));
        assert!(matches!(parse("0"), Ok(Value::Number(n)) if n == 0.0));
        assert!(matches!(parse("2.5"), Ok(Value::Number(n)) if (n - 2.5).abs() < 0.001));
        assert!(matches!(parse("-2.5"), Ok(Value::Number(n)) if (n + 2.5).abs() < 0.001));
        assert!(matches!(parse(".5"), Ok(Value::Number(n)) if n == 0.5));
        assert!(matches!(parse("-.5"), Ok(Value::Number(n)) if n == -0.5));
        assert!(matches!(parse("42."), Ok(Value::Number(n)) if n == 42.0));
    }

    #[test]
    fn test_parse_bignumber_suffix() {
        match parse("99999999999999999999n") {
            Ok(Value::BigNumber(n)) => assert_eq!(n.to_string(), "99999999999999999999"),
            other => panic!("expected bignumber, got {other:?}"),
        }
        match parse("-5n") {
            Ok(Value::BigNumber(n)) => assert_eq!(n.to_string(), "-5"),
            other => panic!("expected bignumber, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_bool() {
        assert!(matches!(parse("#t"), Ok(Value::Bool(true))));
        assert!(matches!(parse("#f"), Ok(Value::Bool(false))));
    }

    #[test]
    fn test_parse_keyword() {
        assert!(matches!(parse(":name"), Ok(Value::Keyword(k)) if k == "name"));
    }

    #[test]
    fn test_parse_bracket() {
        match parse("[a b]") {
            Ok(Value::Bracket(items)) => assert_eq!(items.len(), 2),
            other => panic!("expected bracket, got {other:?}"),
        }
        assert!(matches!(parse("[]"), Ok(Value::Bracket(items)) if items.is_empty()));
    }

    #[test]
    fn test_parse_qualified_symbol() {
        assert!(matches!(parse("mymod.greet"), Ok(Value::Symbol(s)) if s == "mymod.greet"));
    }

    #[test]
    fn test_parse_symbol() {
        assert!(matches!(parse("x"), Ok(Value::Symbol(s)) if s == "x"));
        assert!(matches!(parse("foo"), Ok(Value::Symbol(s)) if s == "foo"));
        assert!(matches!(parse("foo-bar"), Ok(Value::Symbol(s)) if s == "foo-bar"));
        assert!(matches!(parse("foo_bar"), Ok(Value::Symbol(s)) if s == "foo_bar"));
        assert!(matches!(parse("foo?"), Ok(Value::Symbol(s)) if s == "foo?"));
        assert!(matches!(parse("foo!"), Ok(Value::Symbol(s)) if s == "foo!"));
        assert!(matches!(parse("+"), Ok(Value::Symbol(s)) if s == "+"));
        assert!(matches!(parse("-"), Ok(Value::Symbol(s)) if s == "-"));
        assert!(matches!(parse("*"), Ok(Value::Symbol(s)) if s == "*"));
        assert!(matches!(parse("/"), Ok(Value::Symbol(s)) if s == "/"));
        assert!(matches!(parse("<"), Ok(Value::Symbol(s)) if s == "<"));
        assert!(matches!(parse(">"), Ok(Value::Symbol(s)) if s == ">"));
        assert!(matches!(parse("="), Ok(Value::Symbol(s)) if s == "="));
        assert!(matches!(parse(">="), Ok(Value::Symbol(s)) if s == ">="));
    }

    #[test]
    fn test_parse_string() {
        assert!(matches!(parse(r#""hello""#), Ok(Value::String(s)) if s == "hello"));
        assert!(matches!(parse(r#""hello world""#), Ok(Value::String(s)) if s == "hello world"));
        assert!(matches!(parse(r#""""#), Ok(Value::String(s)) if s.is_empty()));
        assert!(matches!(parse(r#""hello\nworld""#), Ok(Value::String(s)) if s == "hello\nworld"));
        assert!(matches!(parse(r#""hello\tworld""#), Ok(Value::String(s)) if s == "hello\tworld"));
        assert!(matches!(parse(r#""say \"hi\"""#), Ok(Value::String(s)) if s == r#"say "hi""#));
        assert!(matches!(parse(r#""back\\slash""#), Ok(Value::String(s)) if s == r"back\slash"));
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(matches!(parse("()"), Ok(Value::Nil)));
        assert!(matches!(parse("(  )"), Ok(Value::Nil)));
        assert!(matches!(parse("(\n)"), Ok(Value::Nil)));
    }

    #[test]
    fn test_parse_simple_list() {
        match parse("(1 2 3)") {
            Ok(Value::List(items)) => {
                assert_eq!(items.len(), 3);
                assert!(matches!(items[0], Value::Number(n) if n == 1.0));
                assert!(matches!(items[1], Value::Number(n) if n == 2.0));
                assert!(matches!(items[2], Value::Number(n) if n == 3.0));
            }
            _ => panic!("Expected list"),
        }
    }

    #[test]
    fn test_parse_nested_list() {
        match parse("(1 (2 3) 4)") {
            Ok(Value::List(items)) => {
                assert_eq!(items.len(), 3);
                match &items[1] {
                    Value::List(inner) => assert_eq!(inner.len(), 2),
                    _ => panic!("Expected nested list"),
                }
            }
            _ => panic!("Expected list"),
        }
    }

    #[test]
    fn test_parse_quoted() {
        match parse("'x") {
            Ok(Value::List(items)) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(&items[0], Value::Symbol(s) if s == "quote"));
                assert!(matches!(&items[1], Value::Symbol(s) if s == "x"));
            }
            _ => panic!("Expected quoted expression"),
        }
    }

    #[test]
    fn test_parse_quasiquote_and_unquote() {
        match parse("`x") {
            Ok(Value::List(items)) => {
                assert!(matches!(&items[0], Value::Symbol(s) if s == "quasiquote"));
            }
            _ => panic!("Expected quasiquoted expression"),
        }
        match parse(",@x") {
            Ok(Value::List(items)) => {
                assert!(matches!(&items[0], Value::Symbol(s) if s == "unquote-splicing"));
            }
            _ => panic!("Expected unquote-splicing expression"),
        }
    }

    #[test]
    fn test_parse_comments() {
        assert!(matches!(parse("; this is a comment\n42"), Ok(Value::Number(n)) if n == 42.0));
        match parse("(1 2 ; comment\n 3)") {
            Ok(Value::List(items)) => assert_eq!(items.len(), 3),
            _ => panic!("Expected list with comments"),
        }
    }

    #[test]
    fn test_parse_complex_expr() {
        match parse("(defn square [x] (* x x))") {
            Ok(Value::List(items)) => {
                assert_eq!(items.len(), 4);
                assert!(matches!(&items[0], Value::Symbol(s) if s == "defn"));
                assert!(matches!(&items[1], Value::Symbol(s) if s == "square"));
                assert!(matches!(&items[2], Value::Bracket(_)));
            }
            _ => panic!("Expected defn expression"),
        }
    }

    #[test]
    fn test_parse_multiple_top_level_via_parse_all() {
        let exprs = parse_all("1 2 3").unwrap();
        assert_eq!(exprs.len(), 3);
    }

    #[test]
    fn test_parse_error_unclosed_list() {
        assert!(parse("(1 2").is_err());
    }

    #[test]
    fn test_parse_single_parse_rejects_multiple_top_level() {
        assert!(parse("1 2").is_err());
    }
}
