//! houganshi-md CLI - 方眼紙ExcelをMarkdownに変換するツール

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use houganshi_md::{ConverterBuilder, OutputFormat, SheetSelector, DEFAULT_BASE_FONT_SIZE};

#[derive(Parser)]
#[command(name = "houganshi-md")]
#[command(
    author,
    version,
    about = "Extract document structure from grid-paper style Excel workbooks"
)]
struct Cli {
    /// Input workbook (.xlsx)
    input: PathBuf,

    /// Output directory, one file per sheet (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sheet name to convert (repeatable, default: all sheets)
    #[arg(short, long = "sheet")]
    sheets: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
    format: Format,

    /// Base font size in points used for heading detection
    #[arg(long, default_value_t = DEFAULT_BASE_FONT_SIZE)]
    base_font_size: f64,

    /// Process sheets one at a time instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Increase log verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Markdown => OutputFormat::Markdown,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let selector = if cli.sheets.is_empty() {
        SheetSelector::All
    } else {
        SheetSelector::Names(cli.sheets.clone())
    };

    let converter = ConverterBuilder::new()
        .with_sheet_selector(selector)
        .with_base_font_size(cli.base_font_size)
        .with_output_format(cli.format.into())
        .with_parallel(!cli.sequential)
        .build()
        .context("Invalid options")?;

    let input = File::open(&cli.input)
        .with_context(|| format!("Failed to open '{}'", cli.input.display()))?;

    match &cli.output {
        Some(dir) => {
            let written = converter
                .convert_to_dir(input, dir)
                .with_context(|| format!("Failed to convert '{}'", cli.input.display()))?;
            for path in written {
                println!("{}", path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            converter
                .convert(input, &mut handle)
                .with_context(|| format!("Failed to convert '{}'", cli.input.display()))?;
            handle.flush()?;
        }
    }

    Ok(())
}
