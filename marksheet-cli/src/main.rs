use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use marksheet_core::{Analyzer, AnalyzerConfig, reader, writer};
use std::path::PathBuf;

mod formatter;
mod logger;

#[derive(Parser)]
#[command(name = "marksheet")]
#[command(about = "Pass/fail analysis of semester result workbooks", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the result workbook (xlsx, xlsm, xlsb, xls, ods)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// USL number of the first student to extract
    #[arg(short, long, value_name = "N")]
    initial_usl: u32,

    /// Output file (defaults to Analysis_<FILE> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Analyze without writing the output workbook
    #[arg(long)]
    dry_run: bool,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.verbose, cli.quiet));

    if !reader::is_supported_path(&cli.file) {
        anyhow::bail!(
            "Unsupported file type: {}. Expected one of: {}",
            cli.file.display(),
            reader::SUPPORTED_EXTENSIONS.join(", ")
        );
    }

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        AnalyzerConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("marksheet.toml");
        if default_config_path.exists() {
            AnalyzerConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            AnalyzerConfig::default()
        }
    };
    config.validate().context("Invalid configuration")?;

    let analyzer = Analyzer::with_config(config);
    let analysis = analyzer.analyze_file(&cli.file, cli.initial_usl)?;

    let output_path = if cli.dry_run {
        log::info!("dry run, output workbook not written");
        None
    } else {
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| writer::output_path_for(&cli.file));
        writer::write_workbook(&path, &analysis.tables)?;
        Some(path)
    };

    match cli.format {
        OutputFormat::Human => {
            formatter::print_human(&cli.file, &analysis, output_path.as_deref());
        }
        OutputFormat::Json => {
            formatter::print_json(&cli.file, &analysis, output_path.as_deref())?;
        }
    }

    Ok(())
}
