//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::{
    BacktestConfig, BacktestResult, DEFAULT_LOOKBACK, RunMode, VectorizedBacktester,
    WindowedBacktester,
};
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::TradesimError;
use crate::domain::metrics::DEFAULT_RISK_FREE_RATE;
use crate::domain::strategy::{
    DEFAULT_FAST, DEFAULT_SLOW, SmaCrossover, StrategyKind, WindowedSmaCrossover,
};
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Single-instrument strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// vectorized or windowed
        #[arg(long)]
        mode: Option<RunMode>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List cached tickers for the configured timeframe
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Parsed `[strategy]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub kind: StrategyKind,
    pub name: String,
    pub fast: usize,
    pub slow: usize,
}

/// Everything one backtest invocation needs besides the collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub ticker: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub mode: RunMode,
    pub backtest: BacktestConfig,
    pub strategy: StrategyParams,
}

impl RunRequest {
    /// Parameter combinations that run but cannot trade the way they read.
    pub fn warnings(&self) -> Vec<String> {
        let params = &self.strategy;
        let mut out = Vec::new();
        if params.fast >= params.slow {
            out.push(format!(
                "fast period {} is not shorter than slow period {}",
                params.fast, params.slow
            ));
        }
        if self.mode == RunMode::Windowed && params.slow > self.backtest.lookback {
            out.push(format!(
                "slow period {} exceeds lookback {}, every windowed signal will be HOLD",
                params.slow, self.backtest.lookback
            ));
        }
        out
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            ticker,
            mode,
            output,
        } => run_backtest(&config, ticker.as_deref(), mode, output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::List { config } => run_list(&config),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            (&e).into()
        }
    }
}

fn run_backtest(
    config_path: &PathBuf,
    ticker_override: Option<&str>,
    mode_override: Option<RunMode>,
    output_path: Option<&PathBuf>,
) -> Result<(), TradesimError> {
    log::info!("Loading config from {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    validate_backtest_config(&adapter)?;
    validate_strategy_config(&adapter)?;

    let mut request = build_run_request(&adapter)?;
    if let Some(t) = ticker_override {
        request.ticker = t.trim().to_uppercase();
    }
    if let Some(m) = mode_override {
        request.mode = m;
    }

    let data_port = CsvAdapter::new(PathBuf::from(adapter.require_string("data", "dir")?));
    let result = run_backtest_pipeline(&data_port, &request)?;

    println!("Strategy: {}", result.strategy());
    print!("{}", result.summary());

    let output = output_path
        .cloned()
        .or_else(|| adapter.get_string("report", "path").map(PathBuf::from));
    if let Some(path) = output {
        TextReportAdapter::new().write(&result, &path.display().to_string())?;
        log::info!("Report written to: {}", path.display());
    }
    Ok(())
}

/// Load the series and run the configured simulator.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    request: &RunRequest,
) -> Result<BacktestResult, TradesimError> {
    log::info!(
        "Loading {} ({}) bars",
        request.ticker,
        request.backtest.timeframe
    );
    let series = data_port.fetch_series(
        &request.ticker,
        request.backtest.timeframe,
        request.start,
        request.end,
    )?;

    for warning in request.warnings() {
        log::warn!("{}", warning);
    }

    let params = &request.strategy;
    match request.mode {
        RunMode::Vectorized => {
            let strategy = match params.kind {
                StrategyKind::SmaCrossover => {
                    SmaCrossover::new(params.fast, params.slow).with_name(&params.name)
                }
            };
            VectorizedBacktester::new(&series, request.backtest.clone()).run(&strategy)
        }
        RunMode::Windowed => {
            let strategy = match params.kind {
                StrategyKind::SmaCrossover => {
                    WindowedSmaCrossover::new(params.fast, params.slow).with_name(&params.name)
                }
            };
            WindowedBacktester::new(&series, request.backtest.clone()).run(&strategy)
        }
    }
}

fn run_validate(config_path: &PathBuf) -> Result<(), TradesimError> {
    log::info!("Validating {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    validate_backtest_config(&adapter)?;
    validate_strategy_config(&adapter)?;
    let request = build_run_request(&adapter)?;

    println!("ticker:         {}", request.ticker);
    println!("timeframe:      {}", request.backtest.timeframe);
    println!("mode:           {:?}", request.mode);
    println!("lookback:       {}", request.backtest.lookback);
    println!("risk_free_rate: {}", request.backtest.risk_free_rate);
    println!(
        "strategy:       {} ({}, fast={}, slow={})",
        request.strategy.name, request.strategy.kind, request.strategy.fast, request.strategy.slow
    );
    for warning in request.warnings() {
        log::warn!("{}", warning);
    }
    println!("Configuration is valid.");
    Ok(())
}

fn run_list(config_path: &PathBuf) -> Result<(), TradesimError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let config = build_backtest_config(&adapter)?;
    let data_port = CsvAdapter::new(PathBuf::from(adapter.require_string("data", "dir")?));

    let tickers = data_port.list_tickers(config.timeframe)?;
    if tickers.is_empty() {
        log::info!("No cached series for timeframe {}", config.timeframe);
    }
    for ticker in &tickers {
        println!("{}", ticker);
    }
    Ok(())
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, TradesimError> {
    let timeframe = match adapter.get_string("backtest", "timeframe") {
        Some(raw) => raw.parse::<Timeframe>()?,
        None => Timeframe::default(),
    };
    let lookback = adapter.get_int("backtest", "lookback", DEFAULT_LOOKBACK as i64);
    let lookback = usize::try_from(lookback).map_err(|_| TradesimError::ConfigInvalid {
        section: "backtest".into(),
        key: "lookback".into(),
        reason: "lookback must be non-negative".into(),
    })?;

    Ok(BacktestConfig {
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", DEFAULT_RISK_FREE_RATE),
        lookback,
        timeframe,
    })
}

pub fn build_strategy_params(adapter: &dyn ConfigPort) -> Result<StrategyParams, TradesimError> {
    let kind = match adapter.get_string("strategy", "kind") {
        Some(raw) => raw.parse::<StrategyKind>()?,
        None => StrategyKind::SmaCrossover,
    };
    let name = adapter
        .get_string("strategy", "name")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| kind.to_string());

    let period = |key: &str, default: usize| -> Result<usize, TradesimError> {
        let value = adapter.get_int("strategy", key, default as i64);
        usize::try_from(value).map_err(|_| TradesimError::ConfigInvalid {
            section: "strategy".into(),
            key: key.into(),
            reason: format!("{} must be non-negative", key),
        })
    };

    Ok(StrategyParams {
        kind,
        name,
        fast: period("fast", DEFAULT_FAST)?,
        slow: period("slow", DEFAULT_SLOW)?,
    })
}

fn parse_date(adapter: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, TradesimError> {
    match adapter.get_string("backtest", key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| TradesimError::ConfigInvalid {
                section: "backtest".into(),
                key: key.into(),
                reason: "invalid date format (expected YYYY-MM-DD)".into(),
            }),
    }
}

pub fn build_run_request(adapter: &dyn ConfigPort) -> Result<RunRequest, TradesimError> {
    let mode = match adapter.get_string("backtest", "mode") {
        Some(raw) => raw.parse::<RunMode>()?,
        None => RunMode::default(),
    };

    Ok(RunRequest {
        ticker: adapter.require_string("backtest", "ticker")?.to_uppercase(),
        start: parse_date(adapter, "start_date")?,
        end: parse_date(adapter, "end_date")?,
        mode,
        backtest: build_backtest_config(adapter)?,
        strategy: build_strategy_params(adapter)?,
    })
}
