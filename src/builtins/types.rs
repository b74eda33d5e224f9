// ABOUTME: Type predicates over the full `Value` tagged union (spec §3's value kinds).

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ONE};
use crate::value::Value;

macro_rules! predicate {
    ($fn_name:ident, $name:literal, $pat:pat) => {
        pub fn $fn_name(args: &[Value]) -> Result<Value, EvalError> {
            if args.len() != 1 {
                return Err(EvalError::arity_error($name, ARITY_ONE, args.len()));
            }
            Ok(Value::Bool(matches!(args[0], $pat)))
        }
    };
}

predicate!(builtin_number_p, "number?", Value::Number(_) | Value::BigNumber(_));
predicate!(builtin_bignumber_p, "bignumber?", Value::BigNumber(_));
predicate!(builtin_string_p, "string?", Value::String(_));
predicate!(builtin_list_p, "list?", Value::List(_) | Value::Nil);
predicate!(builtin_nil_p, "nil?", Value::Nil);
predicate!(builtin_symbol_p, "symbol?", Value::Symbol(_));
predicate!(builtin_bool_p, "bool?", Value::Bool(_));
predicate!(builtin_keyword_p, "keyword?", Value::Keyword(_));
predicate!(builtin_map_p, "map?", Value::Map(_));
predicate!(builtin_function_p, "function?", Value::Function(_) | Value::BuiltinRef(..) | Value::ArithRef(_));
predicate!(builtin_macro_p, "macro?", Value::Macro(_));
predicate!(builtin_atom_p, "atom?", Value::Atom(_));
predicate!(builtin_future_p, "future?", Value::Future(_));
predicate!(builtin_channel_p, "channel?", Value::Channel(_));
predicate!(builtin_wait_group_p, "wait-group?", Value::WaitGroup(_));
predicate!(builtin_module_p, "module?", Value::Module(_));

pub fn register(env: &EnvRef) {
    env.define("number?", Value::BuiltinRef("number?", builtin_number_p));
    env.define("bignumber?", Value::BuiltinRef("bignumber?", builtin_bignumber_p));
    env.define("string?", Value::BuiltinRef("string?", builtin_string_p));
    env.define("list?", Value::BuiltinRef("list?", builtin_list_p));
    env.define("nil?", Value::BuiltinRef("nil?", builtin_nil_p));
    env.define("symbol?", Value::BuiltinRef("symbol?", builtin_symbol_p));
    env.define("bool?", Value::BuiltinRef("bool?", builtin_bool_p));
    env.define("keyword?", Value::BuiltinRef("keyword?", builtin_keyword_p));
    env.define("map?", Value::BuiltinRef("map?", builtin_map_p));
    env.define("function?", Value::BuiltinRef("function?", builtin_function_p));
    env.define("macro?", Value::BuiltinRef("macro?", builtin_macro_p));
    env.define("atom?", Value::BuiltinRef("atom?", builtin_atom_p));
    env.define("future?", Value::BuiltinRef("future?", builtin_future_p));
    env.define("channel?", Value::BuiltinRef("channel?", builtin_channel_p));
    env.define("wait-group?", Value::BuiltinRef("wait-group?", builtin_wait_group_p));
    env.define("module?", Value::BuiltinRef("module?", builtin_module_p));

    for (name, desc) in [
        ("number?", "Tests if val is a Number or BigNumber."),
        ("bignumber?", "Tests if val is specifically an arbitrary-precision BigNumber."),
        ("string?", "Tests if val is a string."),
        ("list?", "Tests if val is a list (including nil)."),
        ("nil?", "Tests if val is nil."),
        ("symbol?", "Tests if val is a symbol."),
        ("bool?", "Tests if val is a boolean."),
        ("keyword?", "Tests if val is a :keyword."),
        ("map?", "Tests if val is a hash-map."),
        ("function?", "Tests if val is callable as a function."),
        ("macro?", "Tests if val is a macro binding."),
        ("atom?", "Tests if val is an atom cell."),
        ("future?", "Tests if val is a future returned by go."),
        ("channel?", "Tests if val is a channel."),
        ("wait-group?", "Tests if val is a wait-group."),
        ("module?", "Tests if val is a module value."),
    ] {
        crate::help::register_help(crate::help::HelpEntry {
            name: name.to_string(),
            signature: format!("({name} val)"),
            description: desc.to_string(),
            examples: vec![],
            related: vec![],
            category: "Type predicates".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_p_accepts_both_number_kinds() {
        assert_eq!(builtin_number_p(&[Value::Number(1.0)]).unwrap(), Value::Bool(true));
        assert_eq!(
            builtin_number_p(&[Value::BigNumber(num_bigint::BigInt::from(1))]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(builtin_number_p(&[Value::String("1".into())]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn list_p_accepts_nil_as_the_empty_list() {
        assert_eq!(builtin_list_p(&[Value::Nil]).unwrap(), Value::Bool(true));
        assert_eq!(builtin_list_p(&[Value::List(vec![])]).unwrap(), Value::Bool(true));
    }
}
