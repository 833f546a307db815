//! Backtest engine: the vectorized and windowed simulators.
//!
//! Both simulators share one trade lifecycle ([`PositionTracker`]) and differ
//! only in how signals are produced:
//!
//! - [`VectorizedBacktester`] asks the strategy for the whole signal vector
//!   once, then scans every bar.
//! - [`WindowedBacktester`] starts at bar `lookback` and asks the strategy for
//!   one signal per bar, passing the `lookback` bars before it.
//!
//! Either run fails before doing any work on invalid input, and aborts on the
//! first strategy error without producing a partial result.

use super::error::{DegenerateStatistics, StrategyError, TradesimError};
use super::execution::PositionTracker;
use super::metrics::{DEFAULT_RISK_FREE_RATE, Summary};
use super::ohlcv::PriceSeries;
use super::position::{Position, Trade};
use super::strategy::{VectorizedStrategy, WindowedStrategy};
use super::timeframe::Timeframe;

pub const DEFAULT_LOOKBACK: usize = 20;

/// Which simulator drives a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Vectorized,
    Windowed,
}

impl std::str::FromStr for RunMode {
    type Err = TradesimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vectorized" => Ok(RunMode::Vectorized),
            "windowed" => Ok(RunMode::Windowed),
            other => Err(TradesimError::invalid_input(format!(
                "unknown run mode '{}' (expected vectorized or windowed)",
                other
            ))),
        }
    }
}

/// Run parameters. Every value has a default and can be overridden per run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub risk_free_rate: f64,
    pub lookback: usize,
    pub timeframe: Timeframe,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            lookback: DEFAULT_LOOKBACK,
            timeframe: Timeframe::default(),
        }
    }
}

/// Trades closed by one simulation pass plus the position still open when
/// the series ended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLog {
    pub trades: Vec<Trade>,
    pub open_position: Option<Position>,
}

/// Outcome of one successful run. Only built when the summary statistics
/// are defined; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    strategy: String,
    trades: Vec<Trade>,
    open_position: Option<Position>,
    summary: Summary,
}

impl BacktestResult {
    pub fn new(
        strategy: impl Into<String>,
        trade_log: TradeLog,
        config: &BacktestConfig,
    ) -> Result<Self, DegenerateStatistics> {
        let summary = Summary::compute(&trade_log.trades, config.risk_free_rate)?;
        Ok(Self {
            strategy: strategy.into(),
            trades: trade_log.trades,
            open_position: trade_log.open_position,
            summary,
        })
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Position still open when the series ended. It produced no trade and
    /// is not part of the summary.
    pub fn open_position(&self) -> Option<&Position> {
        self.open_position.as_ref()
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

fn finish(
    strategy: &str,
    trade_log: TradeLog,
    config: &BacktestConfig,
) -> Result<BacktestResult, TradesimError> {
    if let Some(pos) = &trade_log.open_position {
        log::warn!(
            "{}: position opened at bar {} still open at series end, discarded",
            strategy,
            pos.entry_index
        );
    }
    let trade_count = trade_log.trades.len();
    let result = BacktestResult::new(strategy, trade_log, config).inspect_err(|e| {
        log::warn!("{}: {} trades, {}", strategy, trade_count, e);
    })?;
    log::info!("{}: {} trades", strategy, trade_count);
    Ok(result)
}

pub struct VectorizedBacktester<'a> {
    series: &'a PriceSeries,
    config: BacktestConfig,
}

impl<'a> VectorizedBacktester<'a> {
    pub fn new(series: &'a PriceSeries, config: BacktestConfig) -> Self {
        Self { series, config }
    }

    /// Run `strategy` and summarize its trades. Undefined statistics abort
    /// the run with `DegenerateStatistics`.
    pub fn run(&self, strategy: &dyn VectorizedStrategy) -> Result<BacktestResult, TradesimError> {
        let trade_log = self.simulate(strategy)?;
        finish(strategy.name(), trade_log, &self.config)
    }

    /// The trade lifecycle alone, without the summary statistics.
    pub fn simulate(&self, strategy: &dyn VectorizedStrategy) -> Result<TradeLog, TradesimError> {
        if self.series.is_empty() {
            return Err(TradesimError::invalid_input("price series is empty"));
        }

        log::info!(
            "vectorized run of {} over {} bars",
            strategy.name(),
            self.series.len()
        );
        let signals = strategy.generate_signals(self.series)?;
        if signals.len() != self.series.len() {
            return Err(StrategyError::new(
                strategy.name(),
                format!(
                    "expected {} signals, got {}",
                    self.series.len(),
                    signals.len()
                ),
            )
            .into());
        }

        let mut tracker = PositionTracker::new();
        for (i, (bar, signal)) in self.series.bars().iter().zip(signals).enumerate() {
            tracker.apply(i, bar.close, signal);
        }

        let (trades, open_position) = tracker.finish();
        Ok(TradeLog {
            trades,
            open_position,
        })
    }
}

pub struct WindowedBacktester<'a> {
    series: &'a PriceSeries,
    config: BacktestConfig,
}

impl<'a> WindowedBacktester<'a> {
    pub fn new(series: &'a PriceSeries, config: BacktestConfig) -> Self {
        Self { series, config }
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.config.lookback = lookback;
        self
    }

    pub fn run(&self, strategy: &dyn WindowedStrategy) -> Result<BacktestResult, TradesimError> {
        let trade_log = self.simulate(strategy)?;
        finish(strategy.name(), trade_log, &self.config)
    }

    pub fn simulate(&self, strategy: &dyn WindowedStrategy) -> Result<TradeLog, TradesimError> {
        let lookback = self.config.lookback;
        if self.series.is_empty() {
            return Err(TradesimError::invalid_input("price series is empty"));
        }
        if lookback >= self.series.len() {
            return Err(TradesimError::invalid_input(format!(
                "lookback {} must be shorter than the series ({} bars)",
                lookback,
                self.series.len()
            )));
        }

        log::info!(
            "windowed run of {} over {} bars, lookback {}",
            strategy.name(),
            self.series.len(),
            lookback
        );
        let bars = self.series.bars();
        let mut tracker = PositionTracker::new();
        for i in lookback..bars.len() {
            let signal = strategy.generate_signal(&bars[i - lookback..i])?;
            tracker.apply(i, bars[i].close, signal);
        }

        let (trades, open_position) = tracker.finish();
        Ok(TradeLog {
            trades,
            open_position,
        })
    }
}
