//! CacaoDash - chocolate ratings dashboard builder
//!
//! A CLI tool that cleans the Flavors of Cacao ratings file and derives
//! the chart descriptions shown on the ratings dashboard.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (unreadable file, missing column, malformed value, bad config)

mod analysis;
mod cleaning;
mod cli;
mod config;
mod error;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cleaning::StaticCountryTable;
use cli::{Args, OutputFormat};
use config::Config;
use models::{Report, ReportMetadata};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // no logging needed
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("CacaoDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Dashboard build failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .cacaodash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the data path, thresholds, and country aliases.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so figures written to stdout stay parseable.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load, clean, aggregate and write the figures.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let resolver = StaticCountryTable::with_aliases(&config.countries.aliases)
        .context("Invalid country alias pattern in config")?;
    debug!("Country table has {} patterns", resolver.len());

    // Loaded once; every chart borrows the same raw rows.
    let data_path = Path::new(&config.general.data_path);
    let raw = cleaning::load_record_set(data_path)
        .with_context(|| format!("Failed to load ratings from {}", data_path.display()))?;
    info!("Loaded {} rows from {}", raw.len(), data_path.display());
    if raw.is_empty() {
        warn!("{} has a header but no rows", data_path.display());
    }

    if args.list_columns {
        return handle_list_columns(&raw);
    }

    let thresholds = analysis::Thresholds::from(&config.thresholds);
    let figures = analysis::return_figures(&raw, &thresholds, &resolver)
        .context("Failed to build dashboard figures")?;

    let report = Report {
        metadata: ReportMetadata {
            data_path: config.general.data_path.clone(),
            generated_at: Utc::now(),
            rows_loaded: raw.len(),
            top_rated_threshold: thresholds.top_rated,
            scatter_threshold: thresholds.scatter,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        figures,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report.figures, config.report.pretty)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, config.report.max_rows),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write figures to {}", path))?;
            if !args.quiet {
                print_summary(&report);
                eprintln!("\n✅ Figures saved to: {}", path);
            }
        }
        None => println!("{}", output),
    }

    Ok(())
}

/// Handle --list-columns: show normalized headers and exit.
fn handle_list_columns(raw: &models::RecordSet) -> Result<()> {
    println!("{} rows, {} columns:", raw.len(), raw.columns.len());
    for column in &raw.columns {
        println!("  {}", column);
    }
    Ok(())
}

fn print_summary(report: &Report) {
    eprintln!("\n📊 Dashboard Summary:");
    eprintln!("   Rows loaded: {}", report.metadata.rows_loaded);
    for figure in &report.figures {
        let points: usize = figure.data.iter().map(|trace| trace.len()).sum();
        eprintln!("   - {}: {} points", figure.layout.title, points);
    }
    eprintln!("   Duration: {:.3}s", report.metadata.duration_seconds);
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
