//! Binary to generate Rust models and serde codecs from a JSON Schema file.
//!
//! Usage: `json-schema-codegen schema.json -o src/generated`
//!
//! Writes `<OUTPUT>/<namespace>/model.rs` and `<OUTPUT>/<namespace>/Codecs.rs`
//! and prints each written path.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

use json_schema_codegen::{GenerateSettings, NumberKind, generate_from_file};

#[derive(Parser)]
#[command(name = "json-schema-codegen")]
#[command(about = "Generate Rust data models and serde codecs from JSON Schema")]
#[command(version)]
struct Cli {
    /// JSON Schema file to read
    input: PathBuf,

    /// Root directory for generated files
    #[arg(short, long, default_value = "generated")]
    output: PathBuf,

    /// Scope URI for schemas without `$id` (default: the input file's URL)
    #[arg(long)]
    scope: Option<Url>,

    /// Rust type for `number` schemas
    #[arg(long, value_enum, default_value_t = NumberArg::Double)]
    number_kind: NumberArg,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NumberArg {
    /// `f64`
    Double,
    /// `serde_json::Number`
    Decimal,
}

impl From<NumberArg> for NumberKind {
    fn from(arg: NumberArg) -> Self {
        match arg {
            NumberArg::Double => Self::Double,
            NumberArg::Decimal => Self::Decimal,
        }
    }
}

/// `file://` URL of the input, so a schema without `$id` is named after its file.
fn file_scope(input: &Path) -> Option<Url> {
    let absolute: PathBuf = input.canonicalize().ok()?;
    Url::from_file_path(absolute).ok()
}

fn main() {
    let cli: Cli = Cli::parse();

    let level: Level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(level).into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings: GenerateSettings = GenerateSettings {
        number_kind: cli.number_kind.into(),
        default_scope: cli.scope.or_else(|| file_scope(&cli.input)),
    };

    match generate_from_file(&cli.input, &cli.output, &settings) {
        Ok(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
