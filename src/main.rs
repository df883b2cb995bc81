use std::io::{IsTerminal, Read};
use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use monkey::diagnostic::{self, Diagnostic, ansi::AnsiRenderer};
use tracing_subscriber::{EnvFilter, fmt};

/// Compile expressions to bytecode and run them on a stack machine
#[derive(Parser, Debug)]
#[command(name = "monkey", version)]
struct Args {
    /// Inline source, or a path to a source file (reads stdin when omitted)
    source: Option<String>,

    /// Print an intermediate form instead of running
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Operand stack capacity in slots
    #[arg(long, default_value_t = monkey::vm::STACK_SIZE)]
    stack_size: usize,

    /// Machine-readable output: JSON diagnostics and JSON bytecode
    #[arg(long)]
    json: bool,

    /// Explain an error code, e.g. MK-R003
    #[arg(long, value_name = "CODE")]
    explain: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Emit {
    Ast,
    Bytecode,
}

fn init_logging() {
    // MONKEY_LOG wins over RUST_LOG; default to warnings only.
    let filter = EnvFilter::try_from_env("MONKEY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_source(arg: Option<String>) -> std::io::Result<String> {
    match arg {
        Some(s) if Path::new(&s).is_file() => std::fs::read_to_string(&s),
        Some(s) => Ok(s),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn report(d: &Diagnostic, json: bool) {
    if json {
        eprintln!("{}", diagnostic::json::render(d));
    } else {
        let renderer = AnsiRenderer { use_color: std::io::stderr().is_terminal() };
        eprint!("{}", renderer.render(d));
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, Diagnostic> {
    let text = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    text.map_err(|e| Diagnostic::error(format!("cannot serialize output: {e}")))
}

fn emit(kind: Emit, source: &str, json: bool) -> Result<(), Diagnostic> {
    let failed = |e: monkey::Error| Diagnostic::from(&e).with_source(source);
    match kind {
        Emit::Ast => {
            let program = monkey::parse(source).map_err(failed)?;
            println!("{}", to_json(&program, true)?);
        }
        Emit::Bytecode => {
            let bytecode = monkey::compile(source).map_err(failed)?;
            if json {
                println!("{}", to_json(&bytecode, false)?);
            } else {
                print!("{}", bytecode.instructions);
                println!("constants:");
                for (i, c) in bytecode.constants.iter().enumerate() {
                    println!("{:>6}: {}", i, c);
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    if let Some(code) = &args.explain {
        return match diagnostic::registry::lookup(code) {
            Some(entry) => {
                print!("{}", entry.long);
                ExitCode::SUCCESS
            }
            None => {
                report(&Diagnostic::error(format!("unknown error code '{}'", code)), args.json);
                ExitCode::FAILURE
            }
        };
    }

    let source = match read_source(args.source) {
        Ok(s) => s,
        Err(e) => {
            report(&Diagnostic::error(format!("cannot read source: {}", e)), args.json);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.emit {
        Some(kind) => emit(kind, &source, args.json),
        None => match monkey::eval_with_stack_size(&source, args.stack_size) {
            Ok(value) => {
                if let Some(value) = value {
                    println!("{}", value);
                }
                Ok(())
            }
            Err(e) => Err(Diagnostic::from(&e).with_source(source.as_str())),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(d) => {
            tracing::debug!(error = %d.message, "pipeline failed");
            report(&d, args.json);
            ExitCode::FAILURE
        }
    }
}
