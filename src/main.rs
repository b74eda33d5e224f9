use clap::Parser;
use lumisp::builtins::{register_builtins, set_sandbox_storage};
use lumisp::config::{FsConfig, BUILTINS_SUMMARY, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use lumisp::env::{Environment, EnvRef};
use lumisp::eval::eval;
use lumisp::highlighter::LispHelper;
use lumisp::parser::{parse, parse_all};
use lumisp::sandbox::Sandbox;
use lumisp::value::Value;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;

/// A concurrent Lisp dialect with arbitrary-precision integers, macros, and a sandboxed REPL.
#[derive(Parser, Debug)]
#[command(name = "lumisp")]
#[command(version = VERSION)]
#[command(about = "A sandboxed, concurrent Lisp dialect")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Add an allowed filesystem path (can be repeated)
    #[arg(long = "fs-sandbox", value_name = "PATH", action = clap::ArgAction::Append)]
    fs_paths: Vec<PathBuf>,

    /// Maximum file size in bytes for read-file/write-file
    #[arg(long = "max-file-size", value_name = "BYTES", default_value = "10485760")]
    max_file_size: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let fs_config = build_fs_config(&args);
    let sandbox = Sandbox::new(fs_config).map_err(|e| format!("cannot start sandbox: {e}"))?;
    set_sandbox_storage(sandbox);

    let env = Environment::new_root();
    register_builtins(&env);

    if let Some(script_path) = args.script {
        run_script(&script_path, &env)?;
        return Ok(());
    }

    run_repl(&env)
}

/// Build filesystem sandbox configuration from CLI arguments.
fn build_fs_config(args: &CliArgs) -> FsConfig {
    if args.fs_paths.is_empty() {
        FsConfig {
            max_file_size: args.max_file_size,
            ..Default::default()
        }
    } else {
        FsConfig {
            allowed_paths: args.fs_paths.clone(),
            max_file_size: args.max_file_size,
        }
    }
}

/// Execute every top-level expression in a script file, in order.
fn run_script(path: &PathBuf, env: &EnvRef) -> Result<(), Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {e}", path.display()))?;

    let exprs =
        parse_all(&contents).map_err(|e| format!("parse error in {}: {e}", path.display()))?;

    for expr in exprs {
        eval(expr, env.clone())
            .map_err(|e| format!("error in {}: {e}", path.display()))?;
    }

    Ok(())
}

/// Interactive read-eval-print loop with history and syntax highlighting.
fn run_repl(env: &EnvRef) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl =
        Editor::with_config(config).map_err(|e| format!("failed to initialize REPL: {e}"))?;
    rl.set_helper(Some(LispHelper::new()));

    let history_file = ".lumisp_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");
    println!("{BUILTINS_SUMMARY}");

    loop {
        let readline = rl.readline("lumisp> ");

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                match line.trim() {
                    "(quit)" | "(exit)" => {
                        println!("Goodbye!");
                        break;
                    }
                    "(clear)" => {
                        print!("\x1B[2J\x1B[H");
                        continue;
                    }
                    _ => {}
                }

                match parse(&line) {
                    Ok(expr) => match eval(expr, env.clone()) {
                        Ok(Value::Nil) => {}
                        Ok(result) => println!("=> {result}"),
                        Err(e) => eprintln!("Error: {e}"),
                    },
                    Err(e) => eprintln!("Parse error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}
