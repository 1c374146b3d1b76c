//! Purpose: `xson` CLI entry point.
//! Role: Binary crate root; parses args, runs one command over the selected backend.
//! Invariants: Command output goes to stdout; errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `to_exit_code`.
//! Invariants: Commands are generic over `Json`; the backend flag only picks the type.
#![allow(clippy::result_large_err)]
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use xson::core::error::{Error, ErrorKind, to_exit_code};
use xson::json::{Compact, Json, Reference};

#[derive(Parser, Debug)]
#[command(
    name = "xson",
    version,
    about = "Inspect JSON documents through interchangeable engines",
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, value_enum, default_value_t = Backend::Reference, global = true)]
    backend: Backend,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Backend {
    /// serde_json tree
    Reference,
    /// simd-json tree
    Compact,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a document and print it back out.
    Fmt {
        file: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Print one value addressed by a dotted path such as `a.b.0`.
    Get {
        file: Option<PathBuf>,
        #[arg(long)]
        path: String,
        #[arg(long = "as", value_enum, default_value_t = Target::Json)]
        target: Target,
        /// Coerce the value instead of requiring its exact kind.
        #[arg(long)]
        lenient: bool,
    },
    /// List the keys of an object, one per line.
    Keys {
        file: Option<PathBuf>,
        #[arg(long)]
        path: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Target {
    Json,
    Bool,
    Int,
    Float,
    String,
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let code = match err.kind() {
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 2,
                    _ => 0,
                };
                return Ok(code);
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `xson --help`."));
            }
        },
    };

    let output = match cli.backend {
        Backend::Reference => execute::<Reference>(cli.command)?,
        Backend::Compact => execute::<Compact>(cli.command)?,
    };
    println!("{output}");
    Ok(0)
}

fn execute<J: Json>(command: Command) -> Result<String, Error> {
    match command {
        Command::Fmt { file, pretty } => {
            let document = load::<J>(file.as_deref())?;
            Ok(document.serialize(pretty))
        }
        Command::Get {
            file,
            path,
            target,
            lenient,
        } => {
            let document = load::<J>(file.as_deref())?;
            render(resolve(&document, &path)?, target, lenient)
        }
        Command::Keys { file, path } => {
            let document = load::<J>(file.as_deref())?;
            let value = match &path {
                Some(path) => resolve(&document, path)?,
                None => &document,
            };
            let keys: Vec<&str> = value.items()?.map(|(key, _)| key).collect();
            Ok(keys.join("\n"))
        }
    }
}

fn load<J: Json>(file: Option<&Path>) -> Result<J, Error> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            buffer
        }
    };
    J::parse(&text)
}

/// Walks a dotted path; numeric segments index arrays, everything else names a member.
fn resolve<'d, J: Json>(document: &'d J, path: &str) -> Result<&'d J, Error> {
    let mut current = document;
    for segment in path.split('.').filter(|segment| !segment.is_empty()) {
        current = match segment.parse::<usize>() {
            Ok(index) if current.is_array() => current.at(index)?,
            _ => current.at(segment)?,
        };
    }
    Ok(current)
}

fn render<J: Json>(value: &J, target: Target, lenient: bool) -> Result<String, Error> {
    let text = match (target, lenient) {
        (Target::Json, _) => value.serialize(false),
        (Target::Bool, false) => value.get_as::<bool>()?.to_string(),
        (Target::Bool, true) => value.coerce::<bool>()?.to_string(),
        (Target::Int, false) => value.get_as::<i64>()?.to_string(),
        (Target::Int, true) => value.coerce::<i64>()?.to_string(),
        (Target::Float, false) => value.get_as::<f64>()?.to_string(),
        (Target::Float, true) => value.coerce::<f64>()?.to_string(),
        (Target::String, false) => value.get_as::<String>()?,
        (Target::String, true) => value.coerce::<String>()?,
    };
    Ok(text)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_error(err: &Error) {
    let value = json!({
        "error": {
            "kind": err.kind().as_str(),
            "message": err.message(),
            "hint": err.hint(),
            "key": err.key(),
            "index": err.index(),
            "line": err.line(),
            "column": err.column(),
        }
    });
    eprintln!("{value}");
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
