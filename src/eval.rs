// ABOUTME: The tree-walking evaluator: special forms, macro expansion, and the
// ABOUTME: tail-call trampoline (spec §4). Calls at the end of the main `loop`
// ABOUTME: reassign `expr`/`env` and continue instead of recursing, giving
// ABOUTME: O(1) stack growth for self/mutual tail recursion; any subexpression
// ABOUTME: evaluated in a non-tail position is a genuine recursive call to
// ABOUTME: `eval`, which starts its own fresh trampoline for that subtree.

use crate::env::{EnvRef, Environment};
use crate::error::EvalError;
use crate::macros::{lift_to_expr, quote_value};
use crate::value::{FutureCell, LambdaData, ModuleData, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Evaluate `expr` in `env`. The single entry point for both the REPL/script
/// driver and every builtin that needs to call back into user code.
pub fn eval(expr: Value, env: EnvRef) -> Result<Value, EvalError> {
    let mut expr = expr;
    let mut env = env;

    loop {
        match expr {
            Value::Symbol(name) => return resolve_symbol(&name, &env),

            Value::Bracket(items) => {
                let values = items
                    .into_iter()
                    .map(|item| eval(item, env.clone()))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Value::List(values));
            }

            Value::List(items) => {
                if items.is_empty() {
                    return Err(EvalError::EmptyApplication);
                }

                if let Value::Symbol(head) = &items[0] {
                    match head.as_str() {
                        "def" => return eval_def(&items, &env),
                        "fn" => return eval_fn(&items, &env),
                        "defn" => return eval_defn(&items, &env),
                        "defmacro" => return eval_defmacro(&items, &env),
                        "quote" => {
                            check_shape("quote", &items, 2)?;
                            return Ok(quote_value(&items[1]));
                        }
                        "quasiquote" => {
                            check_shape("quasiquote", &items, 2)?;
                            return eval_quasiquote(&items[1], &env, 1);
                        }
                        "unquote" | "unquote-splicing" => {
                            return Err(EvalError::InvalidSpecialFormShape {
                                form: head.clone(),
                                message: "not valid outside quasiquote".to_string(),
                            });
                        }
                        "if" => {
                            expr = eval_if(&items, &env)?;
                            continue;
                        }
                        "do" => {
                            if items.len() == 1 {
                                return Ok(Value::Nil);
                            }
                            for mid in &items[1..items.len() - 1] {
                                eval(mid.clone(), env.clone())?;
                            }
                            expr = items[items.len() - 1].clone();
                            continue;
                        }
                        "and" => return eval_and(&items, &env),
                        "or" => return eval_or(&items, &env),
                        "module" => return eval_module(&items, &env),
                        "import" => return eval_import(&items, &env),
                        "load" => return eval_load(&items, &env),
                        "require" => return eval_require(&items, &env),
                        "go" => return eval_go(&items, &env),
                        _ => {}
                    }
                }

                let func = eval(items[0].clone(), env.clone())?;

                if let Value::Macro(macro_data) = &func {
                    let arg_exprs = &items[1..];
                    let macro_env = bind_macro_params(macro_data, arg_exprs)?;
                    let expanded = eval(macro_data.body.clone(), macro_env)
                        .map_err(|e| e.in_macro(&macro_name(&items[0])))?;
                    expr = lift_to_expr(expanded);
                    continue;
                }

                let args = items[1..]
                    .iter()
                    .map(|a| eval(a.clone(), env.clone()))
                    .collect::<Result<Vec<_>, _>>()?;

                match func {
                    Value::Function(lambda) => {
                        let call_env = bind_params(&lambda, args)?;
                        expr = lambda.body.clone();
                        env = call_env;
                        continue;
                    }
                    other => return call_non_function(&other, args),
                }
            }

            other => return Ok(other),
        }
    }
}

/// Call an already-evaluated function-like value with already-evaluated
/// arguments. Used by higher-order builtins (`map`, `filter`, `reduce`,
/// `swap!`, `go`, ...) that invoke user closures outside the expression
/// trampoline above.
pub fn apply(func: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
    match func {
        Value::Function(lambda) => {
            let call_env = bind_params(lambda, args)?;
            eval(lambda.body.clone(), call_env)
        }
        other => call_non_function(other, args),
    }
}

fn macro_name(head_expr: &Value) -> String {
    match head_expr {
        Value::Symbol(s) => s.clone(),
        other => other.to_string(),
    }
}

fn call_non_function(func: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
    match func {
        Value::BuiltinRef(_, f) => f(&args),
        Value::ArithRef(op) => crate::builtins::arithmetic::apply(*op, &args),
        Value::Keyword(k) => match args.len() {
            1 => map_lookup(&args[0], k, None),
            2 => map_lookup(&args[0], k, Some(args[1].clone())),
            n => Err(EvalError::arity_error(
                &format!(":{k}"),
                crate::error::ARITY_ONE_OR_TWO,
                n,
            )),
        },
        _ => Err(EvalError::NotCallable),
    }
}

fn map_lookup(target: &Value, key: &str, default: Option<Value>) -> Result<Value, EvalError> {
    match target {
        Value::Map(m) => Ok(m
            .get(&format!(":{key}"))
            .cloned()
            .or(default)
            .unwrap_or(Value::Nil)),
        other => Err(EvalError::type_error(&format!(":{key}"), "map", other)),
    }
}

/// Resolve a symbol to a value: `nil`/`true`/`false` are self-evaluating
/// pseudo-symbols (§6 printed form is `nil`/`#t`/`#f`, but the surface
/// reader spells them as barewords); `module.symbol` resolves against the
/// module registry (§4.9); everything else is an ordinary environment lookup.
fn resolve_symbol(name: &str, env: &EnvRef) -> Result<Value, EvalError> {
    match name {
        "nil" => return Ok(Value::Nil),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if let Some(dot) = name.rfind('.') {
        if dot > 0 && dot < name.len() - 1 && env.get(name).is_none() {
            let (module, symbol) = (&name[..dot], &name[dot + 1..]);
            return env.resolve_qualified(module, symbol);
        }
    }

    env.get_or_err(name)
}

fn check_shape(form: &str, items: &[Value], expected_len: usize) -> Result<(), EvalError> {
    if items.len() != expected_len {
        return Err(EvalError::InvalidSpecialFormShape {
            form: form.to_string(),
            message: format!("expected {} argument(s)", expected_len - 1),
        });
    }
    Ok(())
}

fn symbol_name(v: &Value, form: &str) -> Result<String, EvalError> {
    match v {
        Value::Symbol(s) => Ok(s.clone()),
        other => Err(EvalError::InvalidSpecialFormShape {
            form: form.to_string(),
            message: format!("expected a symbol, got {}", other.type_name()),
        }),
    }
}

/// `[p1 p2 ...]` parameter lists, required by `fn`/`defn`.
fn extract_bracket_params(v: &Value, form: &str) -> Result<Vec<String>, EvalError> {
    match v {
        Value::Bracket(items) => items.iter().map(|i| symbol_name(i, form)).collect(),
        other => Err(EvalError::InvalidSpecialFormShape {
            form: form.to_string(),
            message: format!("expected a [param...] list, got {}", other.type_name()),
        }),
    }
}

/// `(p1 p2 ...)` parameter lists, required by `defmacro`. An empty list
/// parses to `Nil` rather than `List(vec![])`, so that shape is accepted too.
fn extract_paren_params(v: &Value, form: &str) -> Result<Vec<String>, EvalError> {
    match v {
        Value::List(items) => items.iter().map(|i| symbol_name(i, form)).collect(),
        Value::Nil => Ok(Vec::new()),
        other => Err(EvalError::InvalidSpecialFormShape {
            form: form.to_string(),
            message: format!("expected a (param...) list, got {}", other.type_name()),
        }),
    }
}

/// Only the last body form is used; earlier forms are a known limitation
/// and are never evaluated (see DESIGN.md — not an implicit `do`).
fn wrap_body(rest: &[Value]) -> Value {
    rest.last().expect("caller guarantees a non-empty body").clone()
}

fn eval_def(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() != 3 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "def".to_string(),
            message: "expected (def name value)".to_string(),
        });
    }
    let name = symbol_name(&items[1], "def")?;
    let value = eval(items[2].clone(), env.clone())?;
    env.define(name, value.clone());
    Ok(value)
}

fn eval_fn(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() < 3 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "fn".to_string(),
            message: "expected (fn [params] body...)".to_string(),
        });
    }
    let params = extract_bracket_params(&items[1], "fn")?;
    let body = wrap_body(&items[2..]);
    Ok(Value::Function(Arc::new(LambdaData {
        params,
        body,
        env: env.clone(),
        docstring: None,
    })))
}

fn eval_defn(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() < 4 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "defn".to_string(),
            message: "expected (defn name [params] body...)".to_string(),
        });
    }
    let name = symbol_name(&items[1], "defn")?;
    let params = extract_bracket_params(&items[2], "defn")?;
    let body = wrap_body(&items[3..]);
    let docs = crate::parser::take_pending_docs();
    let docstring = if docs.is_empty() { None } else { Some(docs.join("\n")) };
    let func = Value::Function(Arc::new(LambdaData {
        params,
        body,
        env: env.clone(),
        docstring,
    }));
    env.define(name, func.clone());
    Ok(func)
}

fn eval_defmacro(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() < 4 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "defmacro".to_string(),
            message: "expected (defmacro name (params) body...)".to_string(),
        });
    }
    let name = symbol_name(&items[1], "defmacro")?;
    let params = extract_paren_params(&items[2], "defmacro")?;
    let body = wrap_body(&items[3..]);
    let mac = Value::Macro(Arc::new(LambdaData {
        params,
        body,
        env: env.clone(),
        docstring: None,
    }));
    env.define(name, mac.clone());
    Ok(mac)
}

const MACRO_VARIADIC_NAMES: [&str; 3] = ["exprs", "expressions", "clauses"];

/// Bind a macro call's raw argument expressions into a child of the macro's
/// closure environment. A single parameter named `exprs`/`expressions`/
/// `clauses` captures every argument (quoted) as one list, regardless of
/// count; otherwise arity must match exactly (§4.5).
fn bind_macro_params(
    macro_data: &Arc<LambdaData>,
    arg_exprs: &[Value],
) -> Result<EnvRef, EvalError> {
    let macro_env = Environment::child(&macro_data.env);

    if macro_data.params.len() == 1
        && MACRO_VARIADIC_NAMES.contains(&macro_data.params[0].as_str())
    {
        let captured = arg_exprs.iter().map(quote_value).collect();
        macro_env.define(macro_data.params[0].clone(), Value::List(captured));
        return Ok(macro_env);
    }

    if macro_data.params.len() != arg_exprs.len() {
        return Err(EvalError::arity_error(
            "macro",
            macro_data.params.len().to_string(),
            arg_exprs.len(),
        ));
    }

    for (param, arg) in macro_data.params.iter().zip(arg_exprs) {
        macro_env.define(param.clone(), quote_value(arg));
    }
    Ok(macro_env)
}

fn bind_params(lambda: &Arc<LambdaData>, args: Vec<Value>) -> Result<EnvRef, EvalError> {
    if lambda.params.len() != args.len() {
        return Err(EvalError::arity_error(
            "function",
            lambda.params.len().to_string(),
            args.len(),
        ));
    }
    let call_env = Environment::child(&lambda.env);
    for (param, arg) in lambda.params.iter().zip(args) {
        call_env.define(param.clone(), arg);
    }
    Ok(call_env)
}

/// Returns the branch expression to continue evaluating in tail position.
fn eval_if(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() != 3 && items.len() != 4 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "if".to_string(),
            message: "expected (if cond then [else])".to_string(),
        });
    }
    let cond = eval(items[1].clone(), env.clone())?;
    let truthy = cond.as_bool("if")?;
    Ok(if truthy {
        items[2].clone()
    } else if items.len() == 4 {
        items[3].clone()
    } else {
        Value::Nil
    })
}

/// `and`/`or` evaluate every operand directly (no loop continuation) so the
/// strict-`Bool` invariant is enforced on every operand, including the last —
/// see DESIGN.md for why these two forms trade tail-call elimination for
/// that guarantee while `if`/`do` keep full O(1) stack behavior.
fn eval_and(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() == 1 {
        return Ok(Value::Bool(true));
    }
    for operand in &items[1..] {
        let v = eval(operand.clone(), env.clone())?;
        if !v.as_bool("and")? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn eval_or(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() == 1 {
        return Ok(Value::Bool(false));
    }
    for operand in &items[1..] {
        let v = eval(operand.clone(), env.clone())?;
        if v.as_bool("or")? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

/// `go` is a special form, not a builtin: its argument is captured
/// unevaluated and handed to a fresh child environment on a spawned OS
/// thread, so `(go expr)` defers `expr`'s evaluation rather than evaluating
/// it in the calling thread first (spec §4.7). A host-level panic inside
/// the task becomes a `ConcurrencyError` on the future instead of
/// unwinding the spawning thread (spec §7).
fn eval_go(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() != 2 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "go".to_string(),
            message: "expected (go expr)".to_string(),
        });
    }
    let body = items[1].clone();
    let task_env = Environment::child(env);
    let future = Arc::new(FutureCell::new());
    let future_for_task = Arc::clone(&future);
    std::thread::spawn(move || {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| eval(body, task_env)))
            .unwrap_or_else(|payload| Err(EvalError::ConcurrencyError(panic_message(payload))));
        future_for_task.resolve(result);
    });
    Ok(Value::Future(future))
}

fn extract_export_clause(v: &Value, module_name: &str) -> Result<Vec<String>, EvalError> {
    match v {
        Value::Nil => Ok(Vec::new()),
        Value::List(items)
            if !items.is_empty() && items[0] == Value::Symbol("export".to_string()) =>
        {
            items[1..].iter().map(|i| symbol_name(i, "export")).collect()
        }
        other => Err(EvalError::InvalidSpecialFormShape {
            form: "module".to_string(),
            message: format!(
                "expected (export ...) clause for module {module_name}, got {}",
                other.type_name()
            ),
        }),
    }
}

fn eval_module(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() < 3 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "module".to_string(),
            message: "expected (module name (export ...) body...)".to_string(),
        });
    }
    let name = symbol_name(&items[1], "module")?;
    let export_names = extract_export_clause(&items[2], &name)?;
    let module_env = Environment::child(env);

    for body_expr in &items[3..] {
        eval(body_expr.clone(), module_env.clone()).map_err(|e| e.in_module(&name))?;
    }

    let mut exports = HashMap::new();
    for export_name in export_names {
        let value = module_env.get(&export_name).ok_or_else(|| {
            EvalError::NotExported {
                module: name.clone(),
                symbol: export_name.clone(),
            }
            .in_module(&name)
        })?;
        exports.insert(export_name, value);
    }

    let module_data = Arc::new(ModuleData {
        name: name.clone(),
        exports,
        env: module_env,
    });
    env.register_module(module_data.clone());
    Ok(Value::Module(module_data))
}

fn eval_import(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() != 2 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "import".to_string(),
            message: "expected (import module-name)".to_string(),
        });
    }
    let name = symbol_name(&items[1], "import")?;
    env.import_module(&name)?;
    Ok(Value::Nil)
}

fn eval_load(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() != 2 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "load".to_string(),
            message: "expected (load path)".to_string(),
        });
    }
    let path = expect_string(eval(items[1].clone(), env.clone())?, "load")?;

    if !env.mark_loaded(&path) {
        return Ok(Value::Bool(true));
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| EvalError::IoError(format!("cannot read {path}: {e}")))?;
    eval_source_file(&contents, &path, env)
}

fn eval_require(items: &[Value], env: &EnvRef) -> Result<Value, EvalError> {
    if items.len() != 2 {
        return Err(EvalError::InvalidSpecialFormShape {
            form: "require".to_string(),
            message: "expected (require path)".to_string(),
        });
    }
    let path = expect_string(eval(items[1].clone(), env.clone())?, "require")?;

    if !env.mark_loaded(&path) {
        return Ok(Value::Bool(true));
    }

    let contents = crate::builtins::read_sandboxed(&path)?;
    eval_source_file(&contents, &path, env)
}

fn eval_source_file(contents: &str, path: &str, env: &EnvRef) -> Result<Value, EvalError> {
    let exprs =
        crate::parser::parse_all(contents).map_err(|e| EvalError::IoError(e).in_file(path))?;
    if exprs.is_empty() {
        return Ok(Value::Bool(true));
    }
    let mut result = Value::Nil;
    for e in exprs {
        result = eval(e, env.clone()).map_err(|err| err.in_file(path))?;
    }
    Ok(result)
}

fn expect_string(v: Value, function: &str) -> Result<String, EvalError> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(EvalError::type_error(function, "string", &other)),
    }
}

/// Quasiquote expansion: builds a (mostly) quoted structure, splicing in
/// `unquote`/`unquote-splicing` escapes. An ambient extra (spec.md never
/// names these forms) kept because the reader already emits them for the
/// backtick/comma surface syntax; see DESIGN.md.
fn eval_quasiquote(expr: &Value, env: &EnvRef, depth: usize) -> Result<Value, EvalError> {
    match expr {
        Value::List(items) if !items.is_empty() => {
            if let Value::Symbol(s) = &items[0] {
                if s == "unquote" && items.len() == 2 {
                    return if depth == 1 {
                        eval(items[1].clone(), env.clone())
                    } else {
                        let inner = eval_quasiquote(&items[1], env, depth - 1)?;
                        Ok(Value::List(vec![
                            Value::Symbol("unquote".to_string()),
                            quote_value(&inner),
                        ]))
                    };
                }
                if s == "quasiquote" && items.len() == 2 {
                    let inner = eval_quasiquote(&items[1], env, depth + 1)?;
                    return Ok(Value::List(vec![
                        Value::Symbol("quasiquote".to_string()),
                        quote_value(&inner),
                    ]));
                }
            }

            let mut result = Vec::new();
            for item in items {
                if depth == 1 {
                    if let Value::List(inner_items) = item {
                        if inner_items.len() == 2 {
                            if let Value::Symbol(s) = &inner_items[0] {
                                if s == "unquote-splicing" {
                                    let spliced = eval(inner_items[1].clone(), env.clone())?;
                                    match spliced {
                                        Value::List(vs) => result.extend(vs),
                                        Value::Nil => {}
                                        other => result.push(other),
                                    }
                                    continue;
                                }
                            }
                        }
                    }
                }
                result.push(eval_quasiquote(item, env, depth)?);
            }
            Ok(Value::List(result))
        }
        Value::Symbol(s) => Ok(Value::Quoted(Box::new(Value::Symbol(s.clone())))),
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(src: &str) -> Result<Value, EvalError> {
        let env = crate::stdlib_registry::new_root_env();
        eval(parse(src).unwrap(), env)
    }

    #[test]
    fn self_evaluating_literals() {
        assert_eq!(run("42").unwrap(), Value::Number(42.0));
        assert_eq!(run("\"hi\"").unwrap(), Value::String("hi".into()));
        assert_eq!(run("nil").unwrap(), Value::Nil);
        assert_eq!(run("true").unwrap(), Value::Bool(true));
        assert_eq!(run("false").unwrap(), Value::Bool(false));
        assert_eq!(run(":k").unwrap(), Value::Keyword("k".into()));
    }

    #[test]
    fn def_returns_and_binds_the_value() {
        assert_eq!(run("(def x 5)").unwrap(), Value::Number(5.0));
        assert_eq!(run("(do (def x 5) x)").unwrap(), Value::Number(5.0));
    }

    #[test]
    fn if_requires_strict_bool_condition() {
        assert_eq!(run("(if true 1 2)").unwrap(), Value::Number(1.0));
        assert_eq!(run("(if false 1 2)").unwrap(), Value::Number(2.0));
        assert!(run("(if 0 1 2)").is_err());
    }

    #[test]
    fn and_or_short_circuit_and_require_bool() {
        assert_eq!(run("(and true true)").unwrap(), Value::Bool(true));
        assert_eq!(run("(and true false)").unwrap(), Value::Bool(false));
        assert_eq!(run("(or false true)").unwrap(), Value::Bool(true));
        assert!(run("(and true 1)").is_err());
    }

    #[test]
    fn defn_and_call() {
        let src = "(do (defn square [x] (* x x)) (square 6))";
        assert_eq!(run(src).unwrap(), Value::Number(36.0));
    }

    #[test]
    fn tco_deep_mutual_recursion_does_not_overflow_stack() {
        let src = "
            (do
              (defn my-even? [n] (if (= n 0) true (my-odd? (- n 1))))
              (defn my-odd? [n] (if (= n 0) false (my-even? (- n 1))))
              (my-even? 200000))
        ";
        assert_eq!(run(src).unwrap(), Value::Bool(true));
    }

    #[test]
    fn defmacro_unless_expands_and_evaluates_in_caller_env() {
        let src = "(do (defmacro unless (c body) (list 'if c 'nil body)) (unless false 42))";
        assert_eq!(run(src).unwrap(), Value::Number(42.0));
    }

    #[test]
    fn defmacro_variadic_exprs_param_collects_all_arguments() {
        let src = "(do (defmacro my-list (exprs) (cons 'list exprs)) (my-list 1 2 3))";
        match run(src).unwrap() {
            Value::List(items) => assert_eq!(items.len(), 3),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn module_export_and_qualified_access() {
        let src = "(do (module greeter (export hello) (def hello \"hi\")) greeter.hello)";
        assert_eq!(run(src).unwrap(), Value::String("hi".into()));
    }

    #[test]
    fn module_missing_export_is_an_error_wrapped_with_module_name() {
        let src = "(module broken (export missing) (def present 1))";
        let err = run(src).unwrap_err();
        assert!(err.to_string().contains("error in module broken"));
    }

    #[test]
    fn import_copies_exports_into_current_frame() {
        let src = "(do (module m (export x) (def x 9)) (import m) x)";
        assert_eq!(run(src).unwrap(), Value::Number(9.0));
    }

    #[test]
    fn go_defers_evaluation_of_its_raw_expr_to_the_spawned_thread() {
        let src = "(go-wait (go (+ 1 2)))";
        assert_eq!(run(src).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn go_does_not_evaluate_its_expr_in_the_calling_thread() {
        let src = "
            (do
              (def c (atom 0))
              (go-wait-all (list
                (go (swap! c (fn [x] (+ x 1))))
                (go (swap! c (fn [x] (+ x 1))))
                (go (swap! c (fn [x] (+ x 1))))))
              (deref c))
        ";
        assert_eq!(run(src).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn defn_with_multiple_body_forms_only_evaluates_the_last() {
        let src = "(do (defn f [] (def x 1) 2) (f))";
        assert_eq!(run(src).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn quasiquote_splices_lists() {
        let src = "(do (def xs (list 2 3)) `(1 ,@xs 4))";
        match run(src).unwrap() {
            Value::List(items) => assert_eq!(items.len(), 4),
            other => panic!("expected list, got {other:?}"),
        }
    }
}
