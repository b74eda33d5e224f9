// ABOUTME: Lexical environment frames plus the process-wide module registry and loaded-file set.
// ABOUTME: Thread-safe throughout (Arc/Mutex) so closures and tasks spawned by `go` may share frames.

use crate::error::EvalError;
use crate::value::{ModuleData, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub type EnvRef = Arc<Environment>;

/// A frame of bindings with a parent pointer. The module registry and
/// loaded-files set (spec §3 "two secondary maps live on the root frame")
/// are represented as `Arc`-shared handles so every frame, root or child,
/// reaches the same underlying tables without walking the parent chain.
#[derive(Debug)]
pub struct Environment {
    bindings: Mutex<HashMap<String, Value>>,
    parent: Option<EnvRef>,
    modules: Arc<Mutex<HashMap<String, Arc<ModuleData>>>>,
    loaded_files: Arc<Mutex<HashSet<String>>>,
}

impl Environment {
    /// Creates the root environment. Builtins and arithmetic operations are
    /// seeded separately by `register_builtins`/`register_arithmetic`.
    pub fn new_root() -> EnvRef {
        Arc::new(Environment {
            bindings: Mutex::new(HashMap::new()),
            parent: None,
            modules: Arc::new(Mutex::new(HashMap::new())),
            loaded_files: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// Creates a child frame of `parent`, sharing its module registry and
    /// loaded-files set.
    pub fn child(parent: &EnvRef) -> EnvRef {
        Arc::new(Environment {
            bindings: Mutex::new(HashMap::new()),
            parent: Some(Arc::clone(parent)),
            modules: Arc::clone(&parent.modules),
            loaded_files: Arc::clone(&parent.loaded_files),
        })
    }

    /// Defines a binding in THIS frame only (shadows, never mutates a parent).
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.lock().unwrap().insert(name.into(), value);
    }

    /// Looks up a symbol in this frame, then walks the parent chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.lock().unwrap().get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    pub fn get_or_err(&self, name: &str) -> Result<Value, EvalError> {
        self.get(name)
            .ok_or_else(|| EvalError::UndefinedSymbol(name.to_string()))
    }

    /// Registers a module's export table in the process-wide registry.
    pub fn register_module(&self, module: Arc<ModuleData>) {
        self.modules.lock().unwrap().insert(module.name.clone(), module);
    }

    /// Resolves `module.symbol` against the registry.
    pub fn resolve_qualified(&self, module: &str, symbol: &str) -> Result<Value, EvalError> {
        let registry = self.modules.lock().unwrap();
        let m = registry
            .get(module)
            .ok_or_else(|| EvalError::UndefinedModule(module.to_string()))?;
        m.exports.get(symbol).cloned().ok_or_else(|| EvalError::NotExported {
            module: module.to_string(),
            symbol: symbol.to_string(),
        })
    }

    /// Copies every export of `module` into this frame (`import`, §4.9).
    pub fn import_module(&self, module: &str) -> Result<(), EvalError> {
        let registry = self.modules.lock().unwrap();
        let m = registry
            .get(module)
            .ok_or_else(|| EvalError::UndefinedModule(module.to_string()))?;
        let exports = m.exports.clone();
        drop(registry);
        let mut bindings = self.bindings.lock().unwrap();
        for (name, value) in exports {
            bindings.insert(name, value);
        }
        Ok(())
    }

    /// Records `path` as loaded; returns `true` if it was not already loaded
    /// (the caller should only evaluate the file's contents in that case).
    pub fn mark_loaded(&self, path: &str) -> bool {
        self.loaded_files.lock().unwrap().insert(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new_root();
        env.define("x", Value::Number(42.0));
        assert_eq!(env.get("x"), Some(Value::Number(42.0)));
    }

    #[test]
    fn undefined_symbol_is_none() {
        let env = Environment::new_root();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn child_shadows_without_mutating_parent() {
        let parent = Environment::new_root();
        parent.define("x", Value::Number(42.0));

        let child = Environment::child(&parent);
        child.define("x", Value::Number(100.0));

        assert_eq!(child.get("x"), Some(Value::Number(100.0)));
        assert_eq!(parent.get("x"), Some(Value::Number(42.0)));
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::new_root();
        parent.define("x", Value::Number(42.0));
        let child = Environment::child(&parent);
        assert_eq!(child.get("x"), Some(Value::Number(42.0)));
    }

    #[test]
    fn module_registry_is_shared_across_children() {
        let root = Environment::new_root();
        let module_env = Environment::child(&root);
        let mut exports = HashMap::new();
        exports.insert("greet".to_string(), Value::String("hi".into()));
        root.register_module(Arc::new(ModuleData {
            name: "m".into(),
            exports,
            env: module_env,
        }));

        let unrelated_child = Environment::child(&root);
        assert_eq!(
            unrelated_child.resolve_qualified("m", "greet"),
            Ok(Value::String("hi".into()))
        );
    }

    #[test]
    fn loaded_files_are_tracked_once_from_any_frame() {
        let root = Environment::new_root();
        let child = Environment::child(&root);
        assert!(child.mark_loaded("a.lisp"));
        assert!(!root.mark_loaded("a.lisp"));
    }
}
