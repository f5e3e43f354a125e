//! Transforms coordinates read from stdin between two CRS definitions.
//!
//! Input is either a JSON array or newline-delimited JSON. Each item may be a
//! plain array of 2-4 numbers, a serialized `Coordinate` (`{"v": [...]}`), or
//! a named-field object such as `{"lam": 0.1, "phi": 0.2}`. Every result is
//! written to stdout as one `{"v": [...]}` line.

use anyhow::{Context as _, Result, bail};
use projshim::{Context, Coordinate, CoordinateFields, CoordinateOperation, Transformation};
use serde::Deserialize;
use std::env;
use std::io::{self, BufWriter, Read, Write};
use tracing::Level;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Options {
    from: String,
    to: String,
    inverse: bool,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Transform(Options),
    Help,
}

fn run() -> Result<()> {
    let options = match parse_args(env::args().skip(1))? {
        Command::Help => {
            println!("{}", usage());
            return Ok(());
        }
        Command::Transform(options) => options,
    };
    init_tracing(options.verbose);

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading coordinates from stdin")?;
    let coords = parse_coordinates(&input)?;

    let context = Context::with_global_library().context("creating PROJ context")?;
    context.forward_logs_to_tracing().ok();
    let transformation = Transformation::from_definitions(&context, &options.from, &options.to)
        .with_context(|| format!("building transformation {} -> {}", options.from, options.to))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (index, coord) in coords.iter().enumerate() {
        let result = if options.inverse {
            transformation.inverse(coord)
        } else {
            transformation.forward(coord)
        }
        .with_context(|| format!("transforming coordinate {index} ({coord})"))?;
        writeln!(out, "{}", serde_json::to_string(&result)?)?;
    }
    out.flush()?;
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputCoordinate {
    Array(Vec<f64>),
    Coordinate(Coordinate),
    Fields(CoordinateFields),
}

impl InputCoordinate {
    fn into_coordinate(self) -> Result<Coordinate> {
        match self {
            InputCoordinate::Array(values) => {
                if !(2..=4).contains(&values.len()) {
                    bail!("expected 2 to 4 numbers, got {}", values.len());
                }
                let mut v = [0.0; 4];
                v[..values.len()].copy_from_slice(&values);
                Ok(Coordinate::from_array(v))
            }
            InputCoordinate::Coordinate(coord) => Ok(coord),
            InputCoordinate::Fields(fields) => Ok(fields.build()?),
        }
    }
}

fn parse_coordinates(input: &str) -> Result<Vec<Coordinate>> {
    // A whole-document array of items; a bare `[x, y]` or several lines fall
    // through to NDJSON.
    let trimmed = input.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<InputCoordinate>>(trimmed) {
            return items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    item.into_coordinate()
                        .with_context(|| format!("coordinate {index}"))
                })
                .collect();
        }
    }
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let item: InputCoordinate = serde_json::from_str(line)
                .with_context(|| format!("parsing line {}", index + 1))?;
            item.into_coordinate()
                .with_context(|| format!("line {}", index + 1))
        })
        .collect()
}

fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut from = None;
    let mut to = None;
    let mut inverse = false;
    let mut verbose = false;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--inverse" => inverse = true,
            "-v" | "--verbose" => verbose = true,
            "--from" | "--to" => {
                let Some(value) = args.next() else {
                    bail!("{arg} expects a CRS definition\n\n{}", usage());
                };
                if arg == "--from" {
                    from = Some(value);
                } else {
                    to = Some(value);
                }
            }
            other => bail!("unexpected argument '{other}'\n\n{}", usage()),
        }
    }
    let (Some(from), Some(to)) = (from, to) else {
        bail!("both --from and --to are required\n\n{}", usage());
    };
    Ok(Command::Transform(Options {
        from,
        to,
        inverse,
        verbose,
    }))
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

fn usage() -> &'static str {
    "usage: proj-transform --from <crs> --to <crs> [--inverse] [--verbose] < coords\n\
     \n\
     Reads a JSON array or NDJSON of coordinates ([x, y], {\"v\": [...]},\n\
     or named fields) and prints one {\"v\": [...]} line per result."
}
