//! Strategy interfaces and the built-in strategies.
//!
//! A strategy only produces signals; position tracking and trade recording
//! belong to the simulators in [`crate::domain::backtest`]. There are two
//! evaluation models:
//!
//! - [`VectorizedStrategy`] sees the whole series and returns one signal per bar.
//! - [`WindowedStrategy`] sees the trailing window before the current bar and
//!   returns a single signal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::error::{StrategyError, TradesimError};
use super::indicator::{calculate_sma, trailing_sma};
use super::ohlcv::{Bar, PriceSeries};
use super::signal::Signal;

pub const DEFAULT_SMA_NAME: &str = "sma_crossover";
pub const DEFAULT_FAST: usize = 5;
pub const DEFAULT_SLOW: usize = 20;

/// Built-in strategy families selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    SmaCrossover,
}

impl FromStr for StrategyKind {
    type Err = TradesimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sma_crossover" => Ok(StrategyKind::SmaCrossover),
            other => Err(TradesimError::invalid_input(format!(
                "unknown strategy kind '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::SmaCrossover => write!(f, "sma_crossover"),
        }
    }
}

pub trait VectorizedStrategy {
    fn name(&self) -> &str;

    /// One signal per bar, aligned with `series`. Must not depend on any
    /// state carried between calls.
    fn generate_signals(&self, series: &PriceSeries) -> Result<Vec<Signal>, StrategyError>;
}

pub trait WindowedStrategy {
    fn name(&self) -> &str;

    /// Signal for the bar that follows `window`.
    fn generate_signal(&self, window: &[Bar]) -> Result<Signal, StrategyError>;
}

fn crossover(fast: Option<f64>, slow: Option<f64>) -> Signal {
    match (fast, slow) {
        (Some(f), Some(s)) => match f.partial_cmp(&s) {
            Some(Ordering::Greater) => Signal::Buy,
            Some(Ordering::Less) => Signal::Sell,
            _ => Signal::Hold,
        },
        _ => Signal::Hold,
    }
}

/// Fast/slow simple moving average crossover on closing prices.
///
/// `fast >= slow` is accepted as a degenerate parameterization.
#[derive(Debug, Clone, PartialEq)]
pub struct SmaCrossover {
    pub name: String,
    pub fast: usize,
    pub slow: usize,
}

impl SmaCrossover {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self {
            name: DEFAULT_SMA_NAME.to_string(),
            fast,
            slow,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for SmaCrossover {
    fn default() -> Self {
        Self::new(DEFAULT_FAST, DEFAULT_SLOW)
    }
}

impl VectorizedStrategy for SmaCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, series: &PriceSeries) -> Result<Vec<Signal>, StrategyError> {
        let closes = series.closes();
        let fast = calculate_sma(&closes, self.fast);
        let slow = calculate_sma(&closes, self.slow);
        Ok(fast
            .into_iter()
            .zip(slow)
            .map(|(f, s)| crossover(f, s))
            .collect())
    }
}

/// The same crossover rule evaluated on the trailing window only.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedSmaCrossover {
    pub name: String,
    pub fast: usize,
    pub slow: usize,
}

impl WindowedSmaCrossover {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self {
            name: DEFAULT_SMA_NAME.to_string(),
            fast,
            slow,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl WindowedStrategy for WindowedSmaCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signal(&self, window: &[Bar]) -> Result<Signal, StrategyError> {
        let closes: Vec<f64> = window.iter().map(|b| b.close).collect();
        Ok(crossover(
            trailing_sma(&closes, self.fast),
            trailing_sma(&closes, self.slow),
        ))
    }
}

/// Runs a windowed strategy over every window up front so it can be fed to
/// the vectorized simulator. Bars without a full window get `Hold`.
#[derive(Debug, Clone)]
pub struct Precomputed<S> {
    inner: S,
    lookback: usize,
}

impl<S: WindowedStrategy> Precomputed<S> {
    pub fn new(inner: S, lookback: usize) -> Self {
        Self { inner, lookback }
    }
}

impl<S: WindowedStrategy> VectorizedStrategy for Precomputed<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn generate_signals(&self, series: &PriceSeries) -> Result<Vec<Signal>, StrategyError> {
        (0..series.len())
            .map(|i| match series.window(i, self.lookback) {
                Some(window) => self.inner.generate_signal(window),
                None => Ok(Signal::Hold),
            })
            .collect()
    }
}
