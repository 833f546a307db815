//! Price data port trait.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::timeframe::Timeframe;

/// Source of price series. Implementations hand back series that already
/// satisfy the [`PriceSeries`] invariants.
pub trait DataPort {
    /// Bars for `ticker` between `start` and `end` inclusive; an open bound
    /// means no limit on that side.
    fn fetch_series(
        &self,
        ticker: &str,
        timeframe: Timeframe,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, TradesimError>;

    fn list_tickers(&self, timeframe: Timeframe) -> Result<Vec<String>, TradesimError>;

    /// One series per ticker. Fails on the first ticker that fails.
    fn fetch_many(
        &self,
        tickers: &[String],
        timeframe: Timeframe,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<HashMap<String, PriceSeries>, TradesimError> {
        let mut out = HashMap::with_capacity(tickers.len());
        for ticker in tickers {
            let series = self.fetch_series(ticker, timeframe, start, end)?;
            out.insert(ticker.clone(), series);
        }
        Ok(out)
    }
}
