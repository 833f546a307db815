//! Single-position state machine shared by both simulators.
//!
//! | state       | signal | effect                         |
//! |-------------|--------|--------------------------------|
//! | no position | BUY    | open at (index, price)         |
//! | position    | SELL   | close, emit a [`Trade`]        |
//! | otherwise   | any    | nothing                        |
//!
//! Fills happen immediately at the observed price, one unit, long only.

use super::position::{Position, Trade};
use super::signal::Signal;

#[derive(Debug, Default)]
pub struct PositionTracker {
    position: Option<Position>,
    trades: Vec<Trade>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Feed one bar's signal. Returns the trade closed on this bar, if any.
    ///
    /// Indices must be fed in increasing order.
    pub fn apply(&mut self, index: usize, price: f64, signal: Signal) -> Option<Trade> {
        match (self.position, signal) {
            (None, Signal::Buy) => {
                log::debug!("enter long at bar {} price {}", index, price);
                self.position = Some(Position {
                    entry_index: index,
                    entry_price: price,
                });
                None
            }
            (Some(pos), Signal::Sell) => {
                let trade = pos.close(index, price);
                log::debug!(
                    "exit long at bar {} price {} (entry bar {}, pnl {})",
                    index,
                    price,
                    trade.entry_index,
                    trade.pnl
                );
                self.position = None;
                self.trades.push(trade);
                Some(trade)
            }
            _ => None,
        }
    }

    /// Closed trades plus whatever position is still open.
    pub fn finish(self) -> (Vec<Trade>, Option<Position>) {
        (self.trades, self.position)
    }
}
