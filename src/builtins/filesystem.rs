// ABOUTME: Sandboxed filesystem I/O: read-file, write-file, file-exists?, file-size, list-files.
// ABOUTME: Every path is resolved through the process-wide `Sandbox` (cap-std backed, spec §12).

use crate::env::EnvRef;
use crate::error::{EvalError, ARITY_ONE, ARITY_TWO};
use crate::value::Value;

fn as_str<'a>(v: &'a Value, function: &str) -> Result<&'a str, EvalError> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(EvalError::type_error(function, "string", other)),
    }
}

pub fn builtin_read_file(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("read-file", ARITY_ONE, args.len()));
    }
    let path = as_str(&args[0], "read-file")?;
    crate::builtins::read_sandboxed(path).map(Value::String)
}

pub fn builtin_write_file(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("write-file", ARITY_TWO, args.len()));
    }
    let path = as_str(&args[0], "write-file")?;
    let contents = as_str(&args[1], "write-file")?;
    crate::builtins::with_sandbox("write-file", |sandbox| {
        sandbox
            .write_file(path, contents)
            .map(|_| Value::Bool(true))
            .map_err(|e| EvalError::IoError(e.to_string()))
    })
}

pub fn builtin_file_exists_p(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("file-exists?", ARITY_ONE, args.len()));
    }
    let path = as_str(&args[0], "file-exists?")?;
    crate::builtins::with_sandbox("file-exists?", |sandbox| {
        sandbox
            .file_exists(path)
            .map(Value::Bool)
            .map_err(|e| EvalError::IoError(e.to_string()))
    })
}

pub fn builtin_file_size(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("file-size", ARITY_ONE, args.len()));
    }
    let path = as_str(&args[0], "file-size")?;
    crate::builtins::with_sandbox("file-size", |sandbox| {
        sandbox
            .file_size(path)
            .map(|size| Value::Number(size as f64))
            .map_err(|e| EvalError::IoError(e.to_string()))
    })
}

pub fn builtin_list_files(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("list-files", ARITY_ONE, args.len()));
    }
    let dir = as_str(&args[0], "list-files")?;
    crate::builtins::with_sandbox("list-files", |sandbox| {
        sandbox
            .list_files(dir)
            .map(|files| Value::List(files.into_iter().map(Value::String).collect()))
            .map_err(|e| EvalError::IoError(e.to_string()))
    })
}

pub fn register(env: &EnvRef) {
    env.define("read-file", Value::BuiltinRef("read-file", builtin_read_file));
    env.define("write-file", Value::BuiltinRef("write-file", builtin_write_file));
    env.define("file-exists?", Value::BuiltinRef("file-exists?", builtin_file_exists_p));
    env.define("file-size", Value::BuiltinRef("file-size", builtin_file_size));
    env.define("list-files", Value::BuiltinRef("list-files", builtin_list_files));

    for (name, sig, desc) in [
        ("read-file", "(read-file path)", "Reads a file's contents as a string. path is resolved against the sandbox's allowed roots."),
        ("write-file", "(write-file path contents)", "Writes contents to path, creating the file if needed. Returns #t."),
        ("file-exists?", "(file-exists? path)", "Tests whether path exists and is a regular file."),
        ("file-size", "(file-size path)", "Returns path's size in bytes."),
        ("list-files", "(list-files dir)", "Returns the names of the entries in dir (not full paths)."),
    ] {
        crate::help::register_help(crate::help::HelpEntry {
            name: name.to_string(),
            signature: sig.to_string(),
            description: desc.to_string(),
            examples: vec![],
            related: vec![],
            category: "Filesystem I/O".to_string(),
        });
    }
}
