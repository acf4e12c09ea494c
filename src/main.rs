//! Constraint Charts CLI
//!
//! Usage:
//!   constraint-charts [OPTIONS] [FILE]
//!
//! Options:
//!   -p, --palette <FILE>   Colour palette file (TOML format)
//!   -f, --format <FORMAT>  Output format: text or csv
//!       --header           Start CSV output with a header row
//!       --precision <N>    Digits after the decimal point
//!   -d, --debug            Dump solved pixel geometry to stderr
//!   -h, --help             Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use constraint_charts::{
    run_with_config, telemetry, ChartError, ExportConfig, ExportFormat, Palette, RunConfig,
};

#[derive(Parser)]
#[command(name = "constraint-charts")]
#[command(about = "Solve, edit and export constraint-based charts")]
struct Cli {
    /// Chart description (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Colour palette file (TOML format)
    #[arg(short, long)]
    palette: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Text)]
    format: ExportFormat,

    /// Start CSV output with a header row
    #[arg(long)]
    header: bool,

    /// Digits after the decimal point
    #[arg(long, default_value_t = 4)]
    precision: usize,

    /// Debug mode: dump solved pixel geometry to stderr
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    let _ = telemetry::init_default_tracing();

    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let palette = match &cli.palette {
        Some(path) => match Palette::from_file(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error loading palette '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Palette::default(),
    };

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let config = RunConfig::new()
        .with_palette(palette)
        .with_format(cli.format)
        .with_export(
            ExportConfig::new()
                .with_header(cli.header)
                .with_precision(cli.precision),
        )
        .with_debug(cli.debug);

    match run_with_config(&source, &config) {
        Ok(output) => print!("{}", output),
        Err(ChartError::Description(e)) => {
            let filename = cli
                .input
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<stdin>".to_string());
            eprint!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"Constraint Charts - bar charts, histograms and candlesticks on a constraint solver

USAGE:
    constraint-charts [OPTIONS] [FILE]
    cat chart.toml | constraint-charts --format csv

OPTIONS:
    -p, --palette      Colour palette (TOML file)
    -f, --format       Output format: text (default) or csv
    --header           Start CSV output with a header row
    --precision        Digits after the decimal point (default 4)
    -d, --debug        Dump solved pixel geometry to stderr
    -h, --help         Print help

DESCRIPTION:
    title = "Rainfall"
    width = 20

    [[groups]]
    values = [12.5, 40, 31]
    names = ["jan", "feb", "mar"]

    [[edits]]
    op = "height"
    name = "feb"
    value = 35

Use [[bins]] (low, high, count) for a histogram or [[candles]]
(name, open, close, low, high) for a candlestick chart."#
    );
}
