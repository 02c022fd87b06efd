//! `confconv` CLI — convert configuration files between YAML, TOML and JSON.
//!
//! ## Usage
//!
//! ```sh
//! # YAML file to JSON file
//! confconv config.yaml config.json --input_format yaml --output_format json
//!
//! # TOML on stdin to YAML on stdout
//! cat Cargo.toml | confconv --input_format toml --output_format yaml
//!
//! # Indented JSON, with progress logging
//! confconv -v settings.toml - --input_format toml --output_format json --pretty
//! ```
//!
//! ## Exit codes
//!
//! | code | meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | success                                         |
//! | 2    | `UsageError`: bad or missing flags              |
//! | 3    | `DecodeError`: input malformed or unsupported   |
//! | 4    | `EncodeError`: value not expressible in target  |
//! | 5    | `IOError`: input unreadable, output unwritable  |

use anyhow::{Context, Result};
use clap::builder::{PossibleValue, PossibleValuesParser, TypedValueParser};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use confconv_core::{convert, ConvertError, EncodeOptions, Format};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "confconv",
    version,
    about = "Convert configuration files between YAML, TOML and JSON"
)]
struct Cli {
    /// Input file (reads from stdin if omitted or "-")
    input: Option<PathBuf>,

    /// Output file (writes to stdout if omitted or "-")
    output: Option<PathBuf>,

    /// Format of the input document
    #[arg(
        long = "input_format",
        alias = "input-format",
        ignore_case = true,
        value_parser = format_parser()
    )]
    input_format: Format,

    /// Format of the output document
    #[arg(
        long = "output_format",
        alias = "output-format",
        ignore_case = true,
        value_parser = format_parser()
    )]
    output_format: Format,

    /// Indent JSON output instead of writing it on one line
    #[arg(long)]
    pretty: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Possible values and aliases come from [`Format`]; parsing is its `FromStr`.
fn format_parser() -> impl TypedValueParser<Value = Format> {
    let values = Format::ALL
        .map(|format| PossibleValue::new(format.name()).aliases(format.aliases().iter().copied()));
    PossibleValuesParser::new(values).try_map(|name| name.parse::<Format>())
}

/// Error taxonomy shown on stderr, one exit code per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Usage,
    Decode,
    Encode,
    Io,
}

impl Failure {
    fn label(self) -> &'static str {
        match self {
            Failure::Usage => "UsageError",
            Failure::Decode => "DecodeError",
            Failure::Encode => "EncodeError",
            Failure::Io => "IOError",
        }
    }

    fn exit_code(self) -> i32 {
        match self {
            Failure::Usage => 2,
            Failure::Decode => 3,
            Failure::Encode => 4,
            Failure::Io => 5,
        }
    }

    /// Classify by the innermost typed error in the chain.
    fn classify(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(convert) = cause.downcast_ref::<ConvertError>() {
                return match convert {
                    ConvertError::Decode(_) => Failure::Decode,
                    ConvertError::Encode(_) => Failure::Encode,
                };
            }
            if cause.downcast_ref::<io::Error>().is_some() {
                return Failure::Io;
            }
        }
        Failure::Usage
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures.
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            let rendered = err.render().to_string();
            eprint!(
                "{}: {}",
                Failure::Usage.label(),
                rendered.trim_start_matches("error: ")
            );
            process::exit(Failure::Usage.exit_code());
        }
    };

    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        let failure = Failure::classify(&err);
        tracing::debug!(kind = failure.label(), "conversion failed");
        eprintln!("{}: {:#}", failure.label(), err);
        process::exit(failure.exit_code());
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let from = cli.input_format;
    let to = cli.output_format;
    let input = stdio_or_path(cli.input.as_deref());
    let output = stdio_or_path(cli.output.as_deref());

    if from == to {
        tracing::warn!(
            format = %from,
            "input and output formats are the same; the document is only normalized"
        );
    }

    let bytes = read_input(input)?;
    let options = EncodeOptions {
        pretty_json: cli.pretty,
    };
    let text = convert(&bytes, from, to, options)
        .with_context(|| format!("Failed to convert {} to {}", describe(input), to))?;
    write_output(output, &text)?;

    tracing::info!(
        input = %describe(input),
        output = %describe(output),
        %from,
        %to,
        "converted document"
    );
    Ok(())
}

/// `None` and `-` both mean the standard stream.
fn stdio_or_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| p.as_os_str() != "-")
}

fn describe(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<stdio>".to_string(),
    }
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => write_atomically(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")
        }
    }
}

/// Write to a sibling temporary file and rename it over `path`, so readers
/// never observe a half-written document. The temporary file is removed if
/// anything fails.
fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".{}.tmp", process::id()));
    let tmp_path = path.with_file_name(tmp_name);

    let result = fs::File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(content.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
