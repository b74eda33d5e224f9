// ABOUTME: Concurrency primitives (spec §4.6/§4.7/§5): atoms, `go` tasks backed by
// ABOUTME: real OS threads, FIFO channels, and counting wait-groups.

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ONE, ARITY_TWO, ARITY_ZERO_OR_ONE};
use crate::value::{number_to_index, AtomCell, ChannelCell, Value, WaitGroupCell};
use std::sync::Arc;

pub fn builtin_atom(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("atom", ARITY_ONE, args.len()));
    }
    Ok(Value::Atom(Arc::new(AtomCell::new(args[0].clone()))))
}

pub fn builtin_deref(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("deref", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Atom(cell) => Ok(cell.value.lock().unwrap().clone()),
        other => Err(EvalError::type_error("deref", "atom", other)),
    }
}

pub fn builtin_reset(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("reset!", ARITY_TWO, args.len()));
    }
    match &args[0] {
        Value::Atom(cell) => {
            *cell.value.lock().unwrap() = args[1].clone();
            Ok(args[1].clone())
        }
        other => Err(EvalError::type_error("reset!", "atom", other)),
    }
}

/// Holds the atom's lock across the call to `f`, which serializes concurrent
/// `swap!`s on the same atom rather than retrying on a compare-and-swap race.
pub fn builtin_swap(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("swap!", ARITY_TWO, args.len()));
    }
    match &args[0] {
        Value::Atom(cell) => {
            let mut guard = cell.value.lock().unwrap();
            let new_value = crate::eval::apply(&args[1], vec![guard.clone()])?;
            *guard = new_value.clone();
            Ok(new_value)
        }
        other => Err(EvalError::type_error("swap!", "atom", other)),
    }
}

pub fn builtin_go_wait(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("go-wait", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Future(f) => f.wait(),
        other => Err(EvalError::type_error("go-wait", "future", other)),
    }
}

/// Each argument may be a future or a list of futures; all are waited on in
/// input order and collected into a single flat list. Any error aborts.
pub fn builtin_go_wait_all(args: &[Value]) -> Result<Value, EvalError> {
    let mut results = Vec::new();
    for arg in args {
        match arg {
            Value::Future(f) => results.push(f.wait()?),
            Value::List(items) | Value::Bracket(items) => {
                for item in items {
                    match item {
                        Value::Future(f) => results.push(f.wait()?),
                        other => return Err(EvalError::type_error("go-wait-all", "future", other)),
                    }
                }
            }
            other => return Err(EvalError::type_error("go-wait-all", "future or list of futures", other)),
        }
    }
    Ok(Value::List(results))
}

pub fn builtin_chan(args: &[Value]) -> Result<Value, EvalError> {
    let capacity = match args.len() {
        0 => None,
        1 => match &args[0] {
            Value::Number(n) => Some(number_to_index(*n, "chan")? as usize),
            other => return Err(EvalError::type_error("chan", "number", other)),
        },
        _ => return Err(EvalError::arity_error("chan", ARITY_ZERO_OR_ONE, args.len())),
    };
    Ok(Value::Channel(Arc::new(ChannelCell::new(capacity))))
}

pub fn builtin_chan_send(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("chan-send!", ARITY_TWO, args.len()));
    }
    match &args[0] {
        Value::Channel(c) => {
            c.send(args[1].clone())?;
            Ok(Value::Nil)
        }
        other => Err(EvalError::type_error("chan-send!", "channel", other)),
    }
}

pub fn builtin_chan_recv(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("chan-recv!", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Channel(c) => Ok(c.recv()),
        other => Err(EvalError::type_error("chan-recv!", "channel", other)),
    }
}

pub fn builtin_chan_try_recv(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("chan-try-recv!", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Channel(c) => Ok(c.try_recv()),
        other => Err(EvalError::type_error("chan-try-recv!", "channel", other)),
    }
}

pub fn builtin_chan_close(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("chan-close!", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Channel(c) => {
            c.close();
            Ok(Value::Nil)
        }
        other => Err(EvalError::type_error("chan-close!", "channel", other)),
    }
}

pub fn builtin_chan_closed_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("chan-closed?", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Channel(c) => Ok(Value::Bool(c.is_closed())),
        other => Err(EvalError::type_error("chan-closed?", "channel", other)),
    }
}

pub fn builtin_wait_group(args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity_error("wait-group", "0", args.len()));
    }
    Ok(Value::WaitGroup(Arc::new(WaitGroupCell::new())))
}

pub fn builtin_wait_group_add(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("wait-group-add!", ARITY_TWO, args.len()));
    }
    match (&args[0], &args[1]) {
        (Value::WaitGroup(w), Value::Number(n)) => {
            w.add(number_to_index(*n, "wait-group-add!")?);
            Ok(Value::Nil)
        }
        (Value::WaitGroup(_), other) => Err(EvalError::type_error("wait-group-add!", "number", other)),
        (other, _) => Err(EvalError::type_error("wait-group-add!", "wait-group", other)),
    }
}

pub fn builtin_wait_group_done(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("wait-group-done!", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::WaitGroup(w) => {
            w.add(-1);
            Ok(Value::Nil)
        }
        other => Err(EvalError::type_error("wait-group-done!", "wait-group", other)),
    }
}

pub fn builtin_wait_group_wait(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("wait-group-wait!", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::WaitGroup(w) => {
            w.wait();
            Ok(Value::Nil)
        }
        other => Err(EvalError::type_error("wait-group-wait!", "wait-group", other)),
    }
}

pub fn register(env: &EnvRef) {
    env.define("atom", Value::BuiltinRef("atom", builtin_atom));
    env.define("deref", Value::BuiltinRef("deref", builtin_deref));
    env.define("reset!", Value::BuiltinRef("reset!", builtin_reset));
    env.define("swap!", Value::BuiltinRef("swap!", builtin_swap));
    env.define("go-wait", Value::BuiltinRef("go-wait", builtin_go_wait));
    env.define("go-wait-all", Value::BuiltinRef("go-wait-all", builtin_go_wait_all));
    env.define("chan", Value::BuiltinRef("chan", builtin_chan));
    env.define("chan-send!", Value::BuiltinRef("chan-send!", builtin_chan_send));
    env.define("chan-recv!", Value::BuiltinRef("chan-recv!", builtin_chan_recv));
    env.define("chan-try-recv!", Value::BuiltinRef("chan-try-recv!", builtin_chan_try_recv));
    env.define("chan-close!", Value::BuiltinRef("chan-close!", builtin_chan_close));
    env.define("chan-closed?", Value::BuiltinRef("chan-closed?", builtin_chan_closed_p));
    env.define("wait-group", Value::BuiltinRef("wait-group", builtin_wait_group));
    env.define("wait-group-add!", Value::BuiltinRef("wait-group-add!", builtin_wait_group_add));
    env.define("wait-group-done!", Value::BuiltinRef("wait-group-done!", builtin_wait_group_done));
    env.define("wait-group-wait!", Value::BuiltinRef("wait-group-wait!", builtin_wait_group_wait));

    for (name, sig, desc) in [
        ("atom", "(atom initial)", "Creates a mutable cell holding initial."),
        ("deref", "(deref atom)", "Reads the current value of an atom."),
        ("reset!", "(reset! atom val)", "Unconditionally replaces an atom's value."),
        ("swap!", "(swap! atom f)", "Atomically replaces an atom's value with (f current)."),
        ("go-wait", "(go-wait future)", "Blocks until a future resolves, returning its value or propagating its error."),
        ("go-wait-all", "(go-wait-all futures...)", "Waits on every future (or list of futures), in order, returning a list of results."),
        ("chan", "(chan [capacity])", "Creates a FIFO channel, unbounded or bounded to capacity."),
        ("chan-send!", "(chan-send! ch val)", "Sends val, blocking if the channel is full. Errors if closed."),
        ("chan-recv!", "(chan-recv! ch)", "Receives a value, blocking if empty. Returns nil if closed and empty."),
        ("chan-try-recv!", "(chan-try-recv! ch)", "Non-blocking receive: returns the value, or nil if none is available."),
        ("chan-close!", "(chan-close! ch)", "Closes a channel. Idempotent; unblocks pending receivers with nil."),
        ("chan-closed?", "(chan-closed? ch)", "Tests whether a channel has been closed."),
        ("wait-group", "(wait-group)", "Creates a counting latch starting at zero."),
        ("wait-group-add!", "(wait-group-add! wg n)", "Adds n to the wait-group's counter."),
        ("wait-group-done!", "(wait-group-done! wg)", "Decrements the wait-group's counter by one."),
        ("wait-group-wait!", "(wait-group-wait! wg)", "Blocks until the wait-group's counter reaches zero."),
    ] {
        crate::help::register_help(crate::help::HelpEntry {
            name: name.to_string(),
            signature: sig.to_string(),
            description: desc.to_string(),
            examples: vec![],
            related: vec![],
            category: "Concurrency".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FutureCell;

    #[test]
    fn atom_deref_reset_round_trip() {
        let atom = builtin_atom(&[Value::Number(1.0)]).unwrap();
        assert_eq!(builtin_deref(std::slice::from_ref(&atom)).unwrap(), Value::Number(1.0));
        builtin_reset(&[atom.clone(), Value::Number(2.0)]).unwrap();
        assert_eq!(builtin_deref(&[atom]).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn swap_applies_a_builtin_incrementer() {
        fn inc(args: &[Value]) -> Result<Value, EvalError> {
            match &args[0] {
                Value::Number(n) => Ok(Value::Number(n + 1.0)),
                other => Err(EvalError::type_error("inc", "number", other)),
            }
        }
        let atom = builtin_atom(&[Value::Number(0.0)]).unwrap();
        let f = Value::BuiltinRef("inc", inc);
        builtin_swap(&[atom.clone(), f.clone()]).unwrap();
        builtin_swap(&[atom.clone(), f]).unwrap();
        assert_eq!(builtin_deref(&[atom]).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn channel_is_fifo_and_drains_to_nil_after_close() {
        let ch = builtin_chan(&[Value::Number(2.0)]).unwrap();
        builtin_chan_send(&[ch.clone(), Value::Number(10.0)]).unwrap();
        builtin_chan_send(&[ch.clone(), Value::Number(20.0)]).unwrap();
        builtin_chan_close(&[ch.clone()]).unwrap();
        assert_eq!(builtin_chan_recv(&[ch.clone()]).unwrap(), Value::Number(10.0));
        assert_eq!(builtin_chan_recv(&[ch.clone()]).unwrap(), Value::Number(20.0));
        assert_eq!(builtin_chan_recv(&[ch]).unwrap(), Value::Nil);
    }

    #[test]
    fn go_wait_blocks_until_a_future_resolves() {
        let cell = Arc::new(FutureCell::new());
        cell.resolve(Ok(Value::Number(42.0)));
        let future = Value::Future(cell);
        assert_eq!(builtin_go_wait(&[future]).unwrap(), Value::Number(42.0));
    }

    #[test]
    fn wait_group_add_done_wait_reaches_zero() {
        let wg = builtin_wait_group(&[]).unwrap();
        builtin_wait_group_add(&[wg.clone(), Value::Number(2.0)]).unwrap();
        builtin_wait_group_done(&[wg.clone()]).unwrap();
        builtin_wait_group_done(&[wg.clone()]).unwrap();
        builtin_wait_group_wait(&[wg]).unwrap();
    }
}
