// ABOUTME: Runtime value model — the tagged union shared by expressions and evaluated values.
// ABOUTME: Also hosts the concurrency cell types (Atom/Future/Channel/WaitGroup) that values wrap.

use crate::env::EnvRef;
use crate::error::EvalError;
use num_bigint::BigInt;
use num_traits::FromPrimitive;
use num_traits::Zero;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex};

/// A user-defined function or macro: parameters, body expression, and the
/// environment captured at definition time (the closure rule, §4.3).
#[derive(Debug)]
pub struct LambdaData {
    pub params: Vec<String>,
    pub body: Value,
    pub env: EnvRef,
    pub docstring: Option<String>,
}

/// A registered builtin. `BuiltinFn` is a plain function pointer so the value
/// stays `Copy`/`Send`/`Sync` without any indirection.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

/// The five arithmetic engine operations, kept distinct from ordinary builtins
/// so they can be seeded into the root frame as first-class `ArithRef` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        };
        write!(f, "{s}")
    }
}

/// A module's fixed export table, registered in the root registry under its name.
#[derive(Debug)]
pub struct ModuleData {
    pub name: String,
    pub exports: HashMap<String, Value>,
    #[allow(dead_code)]
    pub env: EnvRef,
}

/// A mutable cell supporting `deref`/`reset!`/`swap!`. `swap!` holds the lock
/// across the user function call, which serializes concurrent updates
/// without needing a separate compare-and-retry loop.
#[derive(Debug)]
pub struct AtomCell {
    pub value: Mutex<Value>,
}

impl AtomCell {
    pub fn new(initial: Value) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }
}

/// Single-assignment result of a `go` task.
#[derive(Debug)]
pub struct FutureCell {
    state: Mutex<FutureState>,
    ready: Condvar,
}

#[derive(Debug)]
enum FutureState {
    Pending,
    Ready(Result<Value, EvalError>),
}

impl FutureCell {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FutureState::Pending),
            ready: Condvar::new(),
        }
    }

    pub fn resolve(&self, result: Result<Value, EvalError>) {
        let mut guard = self.state.lock().unwrap();
        *guard = FutureState::Ready(result);
        self.ready.notify_all();
    }

    /// Block until resolved and return a clone of the stored result.
    pub fn wait(&self) -> Result<Value, EvalError> {
        let mut guard = self.state.lock().unwrap();
        loop {
            match &*guard {
                FutureState::Ready(r) => return r.clone(),
                FutureState::Pending => guard = self.ready.wait(guard).unwrap(),
            }
        }
    }
}

/// A FIFO channel, optionally bounded. `chan()` (no capacity argument) is
/// unbounded; `chan(n)` is bounded to `n` pending items. Close is an explicit,
/// idempotent flag rather than relying on sender-drop, since both ends of the
/// channel live in the same cell and would never disconnect on their own.
#[derive(Debug)]
pub struct ChannelCell {
    state: Mutex<ChannelState>,
    not_empty: Condvar,
    not_full: Condvar,
}

#[derive(Debug)]
struct ChannelState {
    queue: std::collections::VecDeque<Value>,
    capacity: Option<usize>,
    closed: bool,
}

impl ChannelCell {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(ChannelState {
                queue: std::collections::VecDeque::new(),
                capacity,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    pub fn send(&self, value: Value) -> Result<(), EvalError> {
        let mut guard = self.state.lock().unwrap();
        loop {
            if guard.closed {
                return Err(EvalError::ChannelClosed);
            }
            let full = matches!(guard.capacity, Some(cap) if guard.queue.len() >= cap);
            if !full {
                guard.queue.push_back(value);
                self.not_empty.notify_one();
                return Ok(());
            }
            guard = self.not_full.wait(guard).unwrap();
        }
    }

    pub fn recv(&self) -> Value {
        let mut guard = self.state.lock().unwrap();
        loop {
            if let Some(v) = guard.queue.pop_front() {
                self.not_full.notify_one();
                return v;
            }
            if guard.closed {
                return Value::Nil;
            }
            guard = self.not_empty.wait(guard).unwrap();
        }
    }

    pub fn try_recv(&self) -> Value {
        let mut guard = self.state.lock().unwrap();
        match guard.queue.pop_front() {
            Some(v) => {
                self.not_full.notify_one();
                v
            }
            None => Value::Nil,
        }
    }

    pub fn close(&self) {
        let mut guard = self.state.lock().unwrap();
        guard.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

/// A counting latch: `add!`/`done!` adjust the counter, `wait!` blocks until it
/// reaches zero.
#[derive(Debug)]
pub struct WaitGroupCell {
    count: Mutex<i64>,
    zero: Condvar,
}

impl WaitGroupCell {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            zero: Condvar::new(),
        }
    }

    pub fn add(&self, n: i64) {
        let mut guard = self.count.lock().unwrap();
        *guard += n;
        if *guard <= 0 {
            self.zero.notify_all();
        }
    }

    pub fn wait(&self) {
        let mut guard = self.count.lock().unwrap();
        while *guard > 0 {
            guard = self.zero.wait(guard).unwrap();
        }
    }
}

/// The tagged union of expressions (parser output) and values (evaluator
/// output). One type serves both roles: `quote` and macro expansion move
/// data freely between "code" and "value" space because they share a
/// representation.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    BigNumber(BigInt),
    String(String),
    Keyword(String),
    Symbol(String),
    List(Vec<Value>),
    /// Square-bracketed expression. Only meaningful before evaluation: `fn`
    /// and `defn` require their parameter list to be exactly this shape, and
    /// a bare bracket expression evaluates its elements into a `List`.
    Bracket(Vec<Value>),
    Map(HashMap<String, Value>),
    /// A symbol (or any expression) captured unevaluated by `quote`.
    Quoted(Box<Value>),
    Function(Arc<LambdaData>),
    Macro(Arc<LambdaData>),
    BuiltinRef(&'static str, BuiltinFn),
    ArithRef(ArithOp),
    Atom(Arc<AtomCell>),
    Future(Arc<FutureCell>),
    Channel(Arc<ChannelCell>),
    WaitGroup(Arc<WaitGroupCell>),
    Module(Arc<ModuleData>),
}

impl Value {
    /// The looser truthiness rule used by `filter`'s predicate results
    /// (§6, §9 note 3) — distinct from `if`'s strict `Bool`-only rule.
    pub fn is_filter_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::BigNumber(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Nil => false,
            _ => true,
        }
    }

    pub fn as_bool(&self, function: &str) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(EvalError::type_error(function, "bool", other)),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::BigNumber(_) => "bignumber",
            Value::String(_) => "string",
            Value::Keyword(_) => "keyword",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Bracket(_) => "bracket",
            Value::Map(_) => "map",
            Value::Quoted(_) => "quoted",
            Value::Function(_) => "function",
            Value::Macro(_) => "macro",
            Value::BuiltinRef(..) => "builtin",
            Value::ArithRef(_) => "arith",
            Value::Atom(_) => "atom",
            Value::Future(_) => "future",
            Value::Channel(_) => "channel",
            Value::WaitGroup(_) => "wait-group",
            Value::Module(_) => "module",
        }
    }

    /// Normalize a hash-map key per invariant 3: a `Keyword(k)` is stored
    /// under the string `":k"`; any other value keys under its printed form.
    pub fn map_key_string(&self) -> String {
        match self {
            Value::Keyword(k) => format!(":{k}"),
            Value::String(s) => s.clone(),
            other => format!("{other}"),
        }
    }

    /// Convert a whole-number `f64` to `BigInt`, used by the arithmetic
    /// engine's promotion logic and by `Number`/`BigNumber` equality.
    pub fn f64_to_bigint(n: f64) -> Option<BigInt> {
        if n.fract() != 0.0 || !n.is_finite() {
            return None;
        }
        BigInt::from_f64(n)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(a), Bool(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (BigNumber(a), BigNumber(b)) => a == b,
            (Number(a), BigNumber(b)) | (BigNumber(b), Number(a)) => {
                Value::f64_to_bigint(*a).map(|a| &a == b).unwrap_or(false)
            }
            (String(a), String(b)) => a == b,
            (Keyword(a), Keyword(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (List(a), List(b)) | (Bracket(a), Bracket(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Map(a), Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).map(|w| w == v).unwrap_or(false))
            }
            (Quoted(a), Quoted(b)) => a == b,
            (Atom(a), Atom(b)) => Arc::ptr_eq(a, b),
            (Future(a), Future(b)) => Arc::ptr_eq(a, b),
            (Channel(a), Channel(b)) => Arc::ptr_eq(a, b),
            (WaitGroup(a), WaitGroup(b)) => Arc::ptr_eq(a, b),
            (Function(a), Function(b)) => Arc::ptr_eq(a, b),
            (Macro(a), Macro(b)) => Arc::ptr_eq(a, b),
            (Module(a), Module(b)) => Arc::ptr_eq(a, b),
            (BuiltinRef(n1, _), BuiltinRef(n2, _)) => n1 == n2,
            (ArithRef(a), ArithRef(b)) => a == b,
            _ => false,
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1.0e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(true) => write!(f, "#t"),
            Value::Bool(false) => write!(f, "#f"),
            Value::Number(n) => fmt_number(*n, f),
            Value::BigNumber(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Value::Keyword(k) => write!(f, ":{k}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Bracket(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                let mut keys: Vec<_> = m.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, k) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {}", m[*k])?;
                }
                write!(f, "}}")
            }
            Value::Quoted(inner) => write!(f, "{inner}"),
            Value::Function(_) => write!(f, "#<function>"),
            Value::Macro(_) => write!(f, "#<macro>"),
            Value::BuiltinRef(name, _) => write!(f, "#<builtin:{name}>"),
            Value::ArithRef(op) => write!(f, "#<arith:{op}>"),
            Value::Atom(_) => write!(f, "#<atom>"),
            Value::Future(_) => write!(f, "#<future>"),
            Value::Channel(_) => write!(f, "#<channel>"),
            Value::WaitGroup(_) => write!(f, "#<wait-group>"),
            Value::Module(m) => write!(f, "#<module:{}>", m.name),
        }
    }
}

/// Convert a `f64` to `i64` for indexing builtins, rejecting fractional values.
pub fn number_to_index(n: f64, function: &str) -> Result<i64, EvalError> {
    if n.fract() != 0.0 {
        return Err(EvalError::type_error(function, "integer", &Value::Number(n)));
    }
    Ok(n as i64)
}
