//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::config_validation::{
    parse_date, read_initial_capital, read_top_n, validate_backtest_config,
    validate_data_config,
};
use crate::domain::error::MomtraderError;
use crate::domain::report::{build_report, BacktestReport, RankedAsset};
use crate::domain::universe::{default_symbols, parse_symbols, validate_universe};
use crate::logging::{init_logging, DEFAULT_LOG_LEVEL};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;

#[derive(Parser, Debug)]
#[command(name = "momtrader", about = "Monthly 13612W momentum rotation backtester")]
pub struct Cli {
    /// Log level or tracing filter (overrides [logging] level)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest(BacktestArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List symbols available in the price directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct BacktestArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Price directory (overrides [data] path)
    #[arg(short, long)]
    pub data: Option<PathBuf>,
    #[arg(long)]
    pub top_n: Option<usize>,
    #[arg(long)]
    pub capital: Option<f64>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    let log_level = cli.log_level.as_deref();
    let outcome = match cli.command {
        Command::Backtest(args) => with_config(&args.config, log_level, |adapter| {
            if args.dry_run {
                run_dry_run(adapter, &args)
            } else {
                run_backtest_command(adapter, &args)
            }
        }),
        Command::Validate { config } => with_config(&config, log_level, run_validate),
        Command::Info { config, symbol } => with_config(&config, log_level, |adapter| {
            run_info(adapter, symbol.as_deref())
        }),
        Command::ListSymbols { config } => with_config(&config, log_level, run_list_symbols),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Loads the config file, installs logging, then hands over to `f`.
fn with_config<F>(path: &Path, log_level: Option<&str>, f: F) -> Result<(), MomtraderError>
where
    F: FnOnce(&FileConfigAdapter) -> Result<(), MomtraderError>,
{
    let adapter = load_config(path)?;
    init_logging(&resolve_log_level(log_level, &adapter));
    tracing::info!(config = %path.display(), "config loaded");
    f(&adapter)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MomtraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| MomtraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn resolve_log_level(flag: Option<&str>, config: &dyn ConfigPort) -> String {
    flag.map(str::to_string)
        .or_else(|| config.get_string("logging", "level"))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Builds the run parameters from the config file, with command-line flags
/// taking precedence. A missing end date means `today`.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    args: &BacktestArgs,
    today: NaiveDate,
) -> Result<BacktestConfig, MomtraderError> {
    let start_date = match args.start_date {
        Some(d) => d,
        None => {
            let s = config.get_string("backtest", "start_date").ok_or_else(|| {
                MomtraderError::ConfigMissing {
                    section: "backtest".into(),
                    key: "start_date".into(),
                }
            })?;
            parse_date(&s, "start_date")?
        }
    };
    let end_date = match (args.end_date, config.get_string("backtest", "end_date")) {
        (Some(d), _) => d,
        (None, Some(s)) => parse_date(&s, "end_date")?,
        (None, None) => today,
    };

    let initial_capital = match args.capital {
        Some(c) => c,
        None => read_initial_capital(config)?,
    };
    let top_n = match args.top_n {
        Some(n) => n,
        None => read_top_n(config)?,
    };

    let bt_config = BacktestConfig {
        start_date,
        end_date,
        initial_capital,
        top_n,
    };
    bt_config.validate()?;
    Ok(bt_config)
}

/// Configured symbol list, or the default currency-ETF universe.
pub fn resolve_symbols(config: &dyn ConfigPort) -> Result<Vec<String>, MomtraderError> {
    match config.get_string("backtest", "symbols") {
        Some(s) => parse_symbols(&s).map_err(|e| MomtraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "symbols".into(),
            reason: e.to_string(),
        }),
        None => Ok(default_symbols()),
    }
}

pub fn resolve_data_path(config: &dyn ConfigPort, data_override: Option<&Path>) -> Result<PathBuf, MomtraderError> {
    if let Some(p) = data_override {
        return Ok(p.to_path_buf());
    }
    validate_data_config(config)?;
    config
        .get_string("data", "path")
        .map(PathBuf::from)
        .ok_or_else(|| MomtraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
}

fn run_backtest_command(adapter: &FileConfigAdapter, args: &BacktestArgs) -> Result<(), MomtraderError> {
    let bt_config = build_backtest_config(adapter, args, Local::now().date_naive())?;
    let symbols = resolve_symbols(adapter)?;
    let data_path = resolve_data_path(adapter, args.data.as_deref())?;

    let data_port = CsvPriceAdapter::new(data_path);
    let report = run_backtest_pipeline(&data_port, &symbols, &bt_config)?;

    print!(
        "{}",
        ReportView {
            report: &report,
            initial_capital: bt_config.initial_capital,
        }
    );
    Ok(())
}

/// Universe check, price fetch, backtest and report projection.
pub fn run_backtest_pipeline(
    data_port: &dyn PriceDataPort,
    symbols: &[String],
    bt_config: &BacktestConfig,
) -> Result<BacktestReport, MomtraderError> {
    tracing::info!(count = symbols.len(), "validating universe");
    let validation = validate_universe(data_port, symbols.to_vec())?;

    let table = data_port.fetch_prices(
        &validation.symbols,
        bt_config.start_date,
        bt_config.end_date,
    )?;
    tracing::info!(
        assets = table.assets().len(),
        dates = table.len(),
        first = %table.first_date(),
        last = %table.last_date(),
        "prices loaded"
    );
    if table.assets().len() < bt_config.top_n {
        tracing::warn!(
            assets = table.assets().len(),
            top_n = bt_config.top_n,
            "fewer assets than top_n: every rebalance will be skipped"
        );
    }

    let result = run_backtest(&table, bt_config)?;
    Ok(build_report(&table, &result, bt_config.top_n))
}

fn run_dry_run(adapter: &FileConfigAdapter, args: &BacktestArgs) -> Result<(), MomtraderError> {
    let bt_config = build_backtest_config(adapter, args, Local::now().date_naive())?;
    let symbols = resolve_symbols(adapter)?;
    let data_path = resolve_data_path(adapter, args.data.as_deref())?;

    println!("start_date:      {}", bt_config.start_date);
    println!("end_date:        {}", bt_config.end_date);
    println!("initial_capital: {:.2}", bt_config.initial_capital);
    println!("top_n:           {}", bt_config.top_n);
    println!("symbols:         {}", symbols.join(", "));
    println!("data path:       {}", data_path.display());
    eprintln!("Dry run complete: configuration is valid");
    Ok(())
}

fn run_validate(adapter: &FileConfigAdapter) -> Result<(), MomtraderError> {
    validate_backtest_config(adapter)?;
    validate_data_config(adapter)?;
    eprintln!("Configuration is valid.");
    Ok(())
}

fn run_info(adapter: &FileConfigAdapter, symbol: Option<&str>) -> Result<(), MomtraderError> {
    let symbols = match symbol {
        Some(s) => vec![s.trim().to_uppercase()],
        None => resolve_symbols(adapter)?,
    };
    let data_port = CsvPriceAdapter::new(resolve_data_path(adapter, None)?);

    for s in &symbols {
        match data_port.get_data_range(s) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} prices, {} to {}", s, count, first, last);
            }
            Ok(None) => println!("{}: no data found", s),
            Err(e) => tracing::error!(symbol = %s, error = %e, "data range query failed"),
        }
    }
    Ok(())
}

fn run_list_symbols(adapter: &FileConfigAdapter) -> Result<(), MomtraderError> {
    let data_port = CsvPriceAdapter::new(resolve_data_path(adapter, None)?);
    let symbols = data_port.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    }
    for symbol in &symbols {
        println!("{}", symbol);
    }
    Ok(())
}

/// Plain-text rendering of a [`BacktestReport`] for stdout.
pub struct ReportView<'a> {
    pub report: &'a BacktestReport,
    pub initial_capital: f64,
}

fn write_ranking(f: &mut fmt::Formatter<'_>, ranking: &[RankedAsset]) -> fmt::Result {
    if ranking.is_empty() {
        return writeln!(f, "  (no asset has a momentum score)");
    }
    for r in ranking {
        writeln!(f, "  {:<12} {:>10.4}", r.asset, r.score)?;
    }
    Ok(())
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let m = &report.metrics;

        match &report.initial_momentum {
            Some(initial) => {
                writeln!(f, "=== Initial Momentum ({}) ===", initial.date)?;
                write_ranking(f, &initial.ranking)?;
            }
            None => writeln!(f, "=== Initial Momentum ===\n  (not available)")?,
        }

        writeln!(f, "\n=== Backtest Results ===")?;
        writeln!(f, "Initial Capital:  {:.2}", self.initial_capital)?;
        writeln!(f, "Final Value:      {:.2}", m.final_value)?;
        writeln!(f, "Total Return:     {:.2}%", m.total_return * 100.0)?;
        writeln!(f, "Annualized:       {:.2}%", m.annualized_return * 100.0)?;
        writeln!(f, "Max Drawdown:     -{:.1}%", m.max_drawdown * 100.0)?;
        writeln!(
            f,
            "Rebalances:       {} ({} skipped)",
            m.rebalances, m.skipped_rebalances
        )?;

        writeln!(f, "\n=== Portfolio Value ===")?;
        for point in &report.history {
            writeln!(f, "  {}  {:>14.2}", point.date, point.value)?;
        }

        writeln!(f, "\n=== Latest Momentum ({}) ===", report.as_of)?;
        write_ranking(f, &report.latest_ranking)?;

        writeln!(f, "\n=== Current Portfolio MTD ===")?;
        writeln!(
            f,
            "Overall Portfolio MTD Return: {:.2}%",
            report.portfolio_mtd_pct
        )?;
        match &report.held_assets {
            Some(_) => {
                for a in &report.asset_mtd {
                    writeln!(f, "  {:<12} {:>8.2}%", a.asset, a.return_pct)?;
                }
            }
            None => writeln!(f, "  No valid portfolio composition found.")?,
        }

        writeln!(f, "\n=== Predicted Top Assets for Next Month ===")?;
        write_ranking(f, &report.predicted_next)
    }
}
