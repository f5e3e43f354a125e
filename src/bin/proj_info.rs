//! Reports what the libproj found at runtime supports.
//!
//! Prints one JSON document: where the library was loaded from, the resolved
//! version and how it was determined, per-symbol availability, and the
//! `proj.db` a fresh context would use. With `--capability <symbol>` it instead
//! exits 0 when the symbol is usable and 1 when it is not, for shell checks.

use anyhow::{Context as _, Result, bail};
use projshim::{Capability, CapabilitySnapshot, Context, NativeLibrary};
use serde::Serialize;
use std::env;
use std::sync::Arc;
use tracing::Level;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Report { verbose: bool },
    Capability { symbol: String, verbose: bool },
    Help,
}

fn run() -> Result<()> {
    let command = parse_args(env::args().skip(1))?;
    match command {
        Command::Help => {
            println!("{}", usage());
            Ok(())
        }
        Command::Report { verbose } => {
            init_tracing(verbose);
            let library = NativeLibrary::global().context("loading libproj")?;
            let report = build_report(&library);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Capability { symbol, verbose } => {
            init_tracing(verbose);
            let capability = Capability::from_symbol(&symbol)
                .with_context(|| format!("unknown PROJ capability '{symbol}'"))?;
            let library = NativeLibrary::global().context("loading libproj")?;
            if library.capabilities().is_available(capability) {
                println!("available");
                Ok(())
            } else {
                println!(
                    "unavailable (requires {}, loaded {})",
                    capability.introduced_in(),
                    library.capabilities().version()
                );
                std::process::exit(1);
            }
        }
    }
}

#[derive(Serialize)]
struct Report {
    library: Option<String>,
    #[serde(flatten)]
    capabilities: CapabilitySnapshot,
    database: DatabaseReport,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum DatabaseReport {
    Found { path: String },
    Missing { error: String },
}

fn build_report(library: &Arc<NativeLibrary>) -> Report {
    let database = match Context::new(library).and_then(|ctx| ctx.resolve_database_path()) {
        Ok(path) => DatabaseReport::Found {
            path: path.display().to_string(),
        },
        Err(err) => DatabaseReport::Missing {
            error: err.to_string(),
        },
    };
    Report {
        library: library.path().map(str::to_string),
        capabilities: library.capabilities().snapshot(),
        database,
    }
}

fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut verbose = false;
    let mut symbol = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-v" | "--verbose" => verbose = true,
            "--capability" => {
                let Some(value) = args.next() else {
                    bail!("--capability expects a symbol name\n\n{}", usage());
                };
                symbol = Some(value);
            }
            other => bail!("unexpected argument '{other}'\n\n{}", usage()),
        }
    }
    Ok(match symbol {
        Some(symbol) => Command::Capability { symbol, verbose },
        None => Command::Report { verbose },
    })
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn usage() -> &'static str {
    "usage: proj-info [--verbose] [--capability <symbol>]\n\
     \n\
     Set PROJSHIM_LIBRARY to load a specific libproj."
}
