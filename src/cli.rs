//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{CsvReportAdapter, write_signal_table};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, UniverseResult};
use crate::domain::config_validation::{WINDOW_KEYS, validate_backtest_config};
use crate::domain::error::MacrossError;
use crate::domain::ledger::LedgerConfig;
use crate::domain::metrics::SymbolSummary;
use crate::domain::series::Series;
use crate::domain::signal::{SignalRules, WindowPair};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ChartPort, ReportPort};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT: &str = "profit_loss.csv";

#[derive(Parser, Debug)]
#[command(name = "macross", about = "Moving-average crossover backtester")]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the backtest over every symbol and write profit/loss
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-separated symbols; defaults to every CSV in the data directory
        #[arg(long)]
        symbols: Option<String>,
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Write one SVG chart per symbol into this directory
        #[arg(long)]
        chart_dir: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the per-row signal table for one symbol as CSV
    Signals {
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// List symbols found in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run {
            config,
            data_dir,
            output,
            symbols,
            jobs,
            chart_dir,
            dry_run,
        } => {
            let opts = RunOptions {
                config,
                data_dir,
                output,
                symbols,
                jobs,
                chart_dir,
            };
            if dry_run {
                run_dry_run(&opts)
            } else {
                run_backtest(&opts).map(|_| ())
            }
        }
        Command::Signals {
            symbol,
            config,
            data_dir,
        } => run_signals(&symbol, config.as_ref(), data_dir.as_ref()),
        Command::ListSymbols { config, data_dir } => {
            run_list_symbols(config.as_ref(), data_dir.as_ref())
        }
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

/// Flags of the `run` subcommand; each overrides its config key.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub symbols: Option<String>,
    pub jobs: Option<usize>,
    pub chart_dir: Option<PathBuf>,
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, MacrossError> {
    match path {
        Some(p) => {
            tracing::info!(path = %p.display(), "loading config");
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn window(config: &dyn ConfigPort, key: &str) -> usize {
    let default = WINDOW_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, d)| *d)
        .unwrap_or(1);
    config.get_int("backtest", key, default).max(1) as usize
}

pub fn build_backtest_config(
    config: &dyn ConfigPort,
    jobs_override: Option<usize>,
) -> Result<BacktestConfig, MacrossError> {
    validate_backtest_config(config)?;

    let rules = SignalRules {
        buy: WindowPair::new(window(config, "buy_fast"), window(config, "buy_slow")),
        sell: WindowPair::new(window(config, "sell_fast"), window(config, "sell_slow")),
        close_buy: WindowPair::new(
            window(config, "close_buy_fast"),
            window(config, "close_buy_slow"),
        ),
        close_sell: WindowPair::new(
            window(config, "close_sell_fast"),
            window(config, "close_sell_slow"),
        ),
    };

    let quantity = config.get_int("backtest", "quantity", LedgerConfig::default().quantity as i64);
    let jobs = match jobs_override {
        Some(j) => j,
        None => config.get_int("backtest", "jobs", 0) as usize,
    };

    Ok(BacktestConfig {
        rules,
        ledger: LedgerConfig {
            quantity: quantity as u32,
        },
        jobs,
    })
}

pub fn resolve_data_dir(data_dir_override: Option<&PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    data_dir_override
        .cloned()
        .or_else(|| config.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn resolve_output(output_override: Option<&PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    output_override
        .cloned()
        .or_else(|| config.get_string("report", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

pub fn resolve_chart_dir(
    chart_dir_override: Option<&PathBuf>,
    config: &dyn ConfigPort,
) -> Option<PathBuf> {
    chart_dir_override
        .cloned()
        .or_else(|| config.get_string("report", "chart_dir").map(PathBuf::from))
}

/// Explicit symbols win over the config list; with neither, every CSV found.
pub fn resolve_symbols(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
    data_port: &dyn DataPort,
) -> Result<Vec<String>, MacrossError> {
    if let Some(list) = symbols_override {
        let symbols: Vec<String> = list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !symbols.is_empty() {
            return Ok(symbols);
        }
    }

    let configured = config.get_list("data", "symbols");
    if !configured.is_empty() {
        return Ok(configured);
    }

    data_port.list_symbols()
}

/// Materialize every series before the core runs. Load failures are kept
/// per symbol so the remaining symbols still run.
pub fn load_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
) -> (Vec<Series>, Vec<(String, MacrossError)>) {
    let mut loaded = Vec::with_capacity(symbols.len());
    let mut failed = Vec::new();
    for symbol in symbols {
        match data_port.fetch_series(symbol) {
            Ok(series) => loaded.push(series),
            Err(e) => failed.push((symbol.clone(), e)),
        }
    }
    (loaded, failed)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    chart: Option<(&dyn ChartPort, &Path)>,
    config: &BacktestConfig,
    symbols: &[String],
    output: &Path,
) -> Result<UniverseResult, MacrossError> {
    if symbols.is_empty() {
        return Err(MacrossError::DataSource {
            reason: "no CSV files found in the data directory".into(),
        });
    }

    // Stage 1: load
    let (series, failed) = load_universe(data_port, symbols);
    tracing::info!(
        loaded = series.len(),
        failed = failed.len(),
        "series loaded"
    );

    // Stage 2: per-symbol pipelines
    tracing::info!(
        symbols = series.len(),
        buy = %config.rules.buy,
        sell = %config.rules.sell,
        quantity = config.ledger.quantity,
        "running backtest"
    );
    let mut result = backtest_engine::run_universe(series, config);
    for (symbol, e) in &failed {
        result.record_failure(symbol.clone(), e);
    }

    // Stage 3: report
    report.write(&result, output)?;

    // Stage 4: charts
    if let Some((chart, dir)) = chart {
        chart.render_all(&result, dir)?;
        tracing::info!(dir = %dir.display(), charts = result.backtests.len(), "charts written");
    }

    Ok(result)
}

fn run_backtest(opts: &RunOptions) -> Result<UniverseResult, MacrossError> {
    let config = load_config(opts.config.as_ref())?;
    let bt_config = build_backtest_config(&config, opts.jobs)?;

    let data_dir = resolve_data_dir(opts.data_dir.as_ref(), &config);
    let data_port = CsvAdapter::new(data_dir);
    let symbols = resolve_symbols(opts.symbols.as_deref(), &config, &data_port)?;
    let output = resolve_output(opts.output.as_ref(), &config);
    let chart_dir = resolve_chart_dir(opts.chart_dir.as_ref(), &config);

    let svg = SvgChartAdapter::new();
    let chart = chart_dir
        .as_deref()
        .map(|dir| (&svg as &dyn ChartPort, dir));

    let result = run_backtest_pipeline(
        &data_port,
        &CsvReportAdapter::new(),
        chart,
        &bt_config,
        &symbols,
        &output,
    )?;

    log_summaries(&result);
    for line in summary_lines(&result) {
        println!("{line}");
    }
    for failure in &result.failures {
        eprintln!("skipped {}: {}", failure.symbol, failure.reason);
    }
    println!(
        "Overall profit/loss for each stock has been calculated and saved to: {}",
        output.display()
    );

    Ok(result)
}

/// One console line per processed symbol, in symbol order.
pub fn summary_lines(result: &UniverseResult) -> Vec<String> {
    result
        .profit_loss
        .iter()
        .map(|(symbol, pnl)| format!("Stock {symbol}: Overall Profit/Loss: {pnl}"))
        .collect()
}

fn log_summaries(result: &UniverseResult) {
    for bt in &result.backtests {
        let summary = SymbolSummary::compute(bt);
        tracing::info!(
            symbol = %summary.symbol,
            trades = summary.total_trades,
            won = summary.trades_won,
            lost = summary.trades_lost,
            win_rate = summary.win_rate,
            holding = summary.holding_at_end,
            "symbol summary"
        );
    }
}

pub fn run_dry_run(opts: &RunOptions) -> Result<(), MacrossError> {
    let config = load_config(opts.config.as_ref())?;
    let bt_config = build_backtest_config(&config, opts.jobs)?;
    tracing::info!("config validated successfully");

    let data_dir = resolve_data_dir(opts.data_dir.as_ref(), &config);
    let data_port = CsvAdapter::new(data_dir.clone());
    let symbols = resolve_symbols(opts.symbols.as_deref(), &config, &data_port)?;

    println!("Rules:");
    println!("  buy:        {} above", bt_config.rules.buy);
    println!("  sell:       {} below", bt_config.rules.sell);
    println!("  close_buy:  {} cross below", bt_config.rules.close_buy);
    println!("  close_sell: {} cross below", bt_config.rules.close_sell);
    println!("  quantity:   {}", bt_config.ledger.quantity);
    println!("\nData: {}", data_dir.display());
    println!("  symbols: {}", symbols.join(", "));
    println!(
        "\nOutput: {}",
        resolve_output(opts.output.as_ref(), &config).display()
    );
    println!("\nDry run complete: configuration is valid");
    Ok(())
}

fn run_signals(
    symbol: &str,
    config_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
) -> Result<(), MacrossError> {
    let config = load_config(config_path)?;
    let bt_config = build_backtest_config(&config, None)?;
    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, &config));

    let series = data_port.fetch_series(symbol)?;
    let backtest = backtest_engine::run_symbol(series, &bt_config)?;
    write_signal_table(&backtest, io::stdout().lock())?;

    tracing::info!(
        symbol,
        rows = backtest.signals.len(),
        pnl = backtest.ledger.total_pnl,
        "signals written"
    );
    Ok(())
}

fn run_list_symbols(
    config_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
) -> Result<(), MacrossError> {
    let config = load_config(config_path)?;
    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, &config));

    let symbols = data_port.list_symbols()?;
    if symbols.is_empty() {
        tracing::warn!(dir = %data_port.base_path().display(), "no CSV files found");
    }
    for symbol in &symbols {
        println!("{symbol}");
    }
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), MacrossError> {
    let config = load_config(Some(config_path))?;
    let bt_config = build_backtest_config(&config, None)?;

    println!("buy:        {}", bt_config.rules.buy);
    println!("sell:       {}", bt_config.rules.sell);
    println!("close_buy:  {}", bt_config.rules.close_buy);
    println!("close_sell: {}", bt_config.rules.close_sell);
    println!("quantity:   {}", bt_config.ledger.quantity);
    println!("\nConfiguration is valid.");
    Ok(())
}
