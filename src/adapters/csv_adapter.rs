//! CSV file data adapter.
//!
//! One file per ticker and timeframe, `<dir>/<TICKER>_<timeframe>.csv`, with
//! header `timestamp,open,high,low,close,volume`. Timestamps are either
//! `%Y-%m-%d %H:%M:%S` or a bare `%Y-%m-%d` date.

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::{Bar, PriceSeries};
use crate::domain::timeframe::Timeframe;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str, timeframe: Timeframe) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", ticker, timeframe))
    }

    /// Save `series` so that a later `fetch_series` returns it unchanged.
    pub fn write_series(
        &self,
        ticker: &str,
        timeframe: Timeframe,
        series: &PriceSeries,
    ) -> Result<PathBuf, TradesimError> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.csv_path(ticker, timeframe);
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| TradesimError::Data {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;

        let to_data_err = |e: csv::Error| TradesimError::Data {
            reason: format!("CSV write error: {}", e),
        };
        wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])
            .map_err(to_data_err)?;
        for bar in series.bars() {
            wtr.write_record([
                bar.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ])
            .map_err(to_data_err)?;
        }
        wtr.flush()?;

        log::info!("saved {} bars to {}", series.len(), path.display());
        Ok(path)
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TradesimError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|e| TradesimError::Data {
            reason: format!("invalid timestamp '{}': {}", value, e),
        })
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, TradesimError> {
    record
        .get(index)
        .ok_or_else(|| TradesimError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| TradesimError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        ticker: &str,
        timeframe: Timeframe,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, TradesimError> {
        let path = self.csv_path(ticker, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| {
            log::debug!("failed to read {}: {}", path.display(), e);
            TradesimError::NoData {
                ticker: ticker.to_string(),
                timeframe: timeframe.to_string(),
            }
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TradesimError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp = parse_timestamp(record.get(0).ok_or_else(|| TradesimError::Data {
                reason: "missing timestamp column".into(),
            })?)?;

            let date = timestamp.date();
            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }

            bars.push(Bar {
                timestamp,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        if bars.is_empty() {
            return Err(TradesimError::NoData {
                ticker: ticker.to_string(),
                timeframe: timeframe.to_string(),
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        log::debug!("loaded {} bars from {}", bars.len(), path.display());
        PriceSeries::new(bars)
    }

    fn list_tickers(&self, timeframe: Timeframe) -> Result<Vec<String>, TradesimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TradesimError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", timeframe);
        let mut tickers = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| TradesimError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(ticker) = name_str.strip_suffix(&suffix) {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
