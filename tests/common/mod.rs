#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tradesim::domain::error::{StrategyError, TradesimError};
pub use tradesim::domain::ohlcv::{Bar, PriceSeries};
use tradesim::domain::signal::Signal;
use tradesim::domain::strategy::VectorizedStrategy;
use tradesim::domain::timeframe::Timeframe;
use tradesim::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, ticker: &str, series: PriceSeries) -> Self {
        self.data.insert(ticker.to_string(), series);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        ticker: &str,
        timeframe: Timeframe,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, TradesimError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TradesimError::Data {
                reason: reason.clone(),
            });
        }
        let series = self.data.get(ticker).ok_or_else(|| TradesimError::NoData {
            ticker: ticker.to_string(),
            timeframe: timeframe.to_string(),
        })?;
        let bars = series
            .bars()
            .iter()
            .filter(|b| start.is_none_or(|s| b.timestamp.date() >= s))
            .filter(|b| end.is_none_or(|e| b.timestamp.date() <= e))
            .cloned()
            .collect();
        PriceSeries::new(bars)
    }

    fn list_tickers(&self, _timeframe: Timeframe) -> Result<Vec<String>, TradesimError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

/// Emits a fixed signal vector regardless of the series.
pub struct Scripted(pub Vec<Signal>);

impl VectorizedStrategy for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate_signals(&self, _series: &PriceSeries) -> Result<Vec<Signal>, StrategyError> {
        Ok(self.0.clone())
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_bar(day: i64, close: f64) -> Bar {
    Bar {
        timestamp: start_time() + chrono::Duration::days(day),
        open: close,
        high: close + 1.0,
        low: (close - 1.0).max(close / 2.0),
        close,
        volume: 1000.0,
    }
}

pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(i as i64, c))
            .collect(),
    )
    .unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Deterministic zig-zag with drift, long enough for several crossovers.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + 8.0 * (t / 7.0).sin() + 3.0 * (t / 3.0).cos()
        })
        .collect()
}

/// Closes on which SMA(1, 2) buys every up-tick and sells every down-tick,
/// giving round trips of +10, -4, +6, 0, -2.5 in that order. The signed
/// deviation of those pnls keeps a non-zero residue, so the summary is
/// defined.
pub fn tick_closes() -> Vec<f64> {
    vec![
        100.0, 101.0, 112.0, 111.0, // buy 101, sell 111
        112.0, 108.0, // buy 112, sell 108
        109.0, 116.0, 115.0, // buy 109, sell 115
        116.0, 117.0, 116.0, // buy 116, sell 116
        117.0, 114.5, // buy 117, sell 114.5
    ]
}

pub const TICK_PNLS: [f64; 5] = [10.0, -4.0, 6.0, 0.0, -2.5];
