//! SignalScan CLI — scan a watchlist, export one asset's frame, print config.
//!
//! Commands:
//! - `scan` — fetch, compute indicators, classify, and print the summary table
//! - `export` — write one asset's annotated indicator frame as CSV
//! - `config` — print the default configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use signalscan_core::domain::{Interval, Period};
use signalscan_runner::{
    export_frame_csv, render_summary_table, render_warnings, save_report, RuleKind, ScanConfig,
    Scanner, SourceKind,
};

#[derive(Parser)]
#[command(
    name = "signalscan",
    about = "SignalScan — technical-indicator signals and ATR risk plans for a watchlist"
)]
struct Cli {
    /// Debug-level logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by `scan` and `export`. Flags override the config file.
#[derive(clap::Args)]
struct ScanArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lookback period: 1mo, 3mo, 6mo, 1y, 2y, 5y.
    #[arg(long)]
    period: Option<Period>,

    /// Bar interval: 1d, 1h, 30m.
    #[arg(long)]
    interval: Option<Interval>,

    /// Data source: yahoo, csv, synthetic.
    #[arg(long)]
    source: Option<SourceKind>,

    /// Directory of <SYMBOL>.csv files (csv source).
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Signal rule: crossover or scored.
    #[arg(long)]
    rule: Option<RuleKind>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan symbols and print the summary table.
    Scan {
        /// Symbols to scan (e.g., BTC-USD AAPL). Defaults to the configured universe.
        symbols: Vec<String>,

        #[command(flatten)]
        args: ScanArgs,

        /// Write report.json, summary.txt and per-asset CSV frames here.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export one asset's indicator frame as CSV.
    Export {
        /// Symbol to export.
        symbol: String,

        #[command(flatten)]
        args: ScanArgs,

        /// Output CSV path. Defaults to <SYMBOL>.csv.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan {
            symbols,
            args,
            output,
        } => run_scan(symbols, &args, output.as_deref()),
        Commands::Export {
            symbol,
            args,
            output,
        } => run_export(&symbol, &args, output),
        Commands::Config => {
            let text = ScanConfig::default().to_toml_string()?;
            print!("{text}");
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "signalscan=debug,signalscan_core=debug,signalscan_runner=debug"
    } else {
        "signalscan=info,signalscan_core=info,signalscan_runner=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScanConfig::default(),
    };

    if let Some(period) = args.period {
        config.universe.period = period;
    }
    if let Some(interval) = args.interval {
        config.universe.interval = interval;
    }
    if let Some(source) = args.source {
        config.fetch.source = source;
    }
    if let Some(dir) = &args.csv_dir {
        config.fetch.csv_dir = Some(dir.clone());
    }
    if let Some(rule) = args.rule {
        config.signal.rule = rule;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run_scan(symbols: Vec<String>, args: &ScanArgs, output: Option<&Path>) -> Result<()> {
    let config = load_config(args)?;
    let symbols = if symbols.is_empty() {
        config.universe.symbols.clone()
    } else {
        symbols
    };

    info!(
        assets = symbols.len(),
        period = %config.universe.period,
        interval = %config.universe.interval,
        "starting scan"
    );
    let scanner = Scanner::from_config(config)?;
    let report = scanner.scan(&symbols);

    print!("{}", render_summary_table(&report.summaries));
    eprint!("{}", render_warnings(&report));

    if let Some(dir) = output {
        save_report(&report, dir)?;
        info!(dir = %dir.display(), "report saved");
    }

    Ok(())
}

fn run_export(symbol: &str, args: &ScanArgs, output: Option<PathBuf>) -> Result<()> {
    let config = load_config(args)?;
    let scanner = Scanner::from_config(config)?;
    let report = scanner.scan(&[symbol.to_string()]);

    eprint!("{}", render_warnings(&report));
    let frame = report
        .frame(symbol)
        .with_context(|| format!("no data for {symbol}"))?;

    let path = output.unwrap_or_else(|| PathBuf::from(format!("{symbol}.csv")));
    let csv = export_frame_csv(frame)?;
    std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    info!(rows = frame.rows.len(), path = %path.display(), "frame exported");

    Ok(())
}
