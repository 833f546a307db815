//! OHLCV bars and the price series they form.

use chrono::NaiveDateTime;

use super::error::TradesimError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    fn check(&self) -> Result<(), String> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (field, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!(
                    "{} at {} must be finite and positive, got {}",
                    field, self.timestamp, value
                ));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(format!(
                "volume at {} must be finite and non-negative, got {}",
                self.timestamp, self.volume
            ));
        }
        Ok(())
    }
}

/// Bars of one instrument in strictly increasing timestamp order.
///
/// The series is read-only once built. Simulators and strategies borrow it;
/// nothing in the engine mutates it. An empty series can be constructed, the
/// simulators reject it as invalid input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, TradesimError> {
        for bar in &bars {
            bar.check().map_err(TradesimError::invalid_input)?;
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(TradesimError::invalid_input(format!(
                "timestamps must be strictly increasing: {} follows {}",
                pair[1].timestamp, pair[0].timestamp
            )));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The `lookback` bars strictly preceding `index`, or `None` when there
    /// are not enough of them.
    pub fn window(&self, index: usize, lookback: usize) -> Option<&[Bar]> {
        if index < lookback || index > self.bars.len() {
            return None;
        }
        Some(&self.bars[index - lookback..index])
    }
}
