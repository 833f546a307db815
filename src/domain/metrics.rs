//! Summary statistics over a list of closed trades.
//!
//! Trades with pnl > 0 are wins; everything else (including exactly zero)
//! counts on the loss side.
//!
//! `std` is the mean *signed* deviation `sum(pnl - mean) / n`, not a
//! root-mean-square. Reports produced by earlier versions of this engine use
//! that definition, and `sharpe = (mean - risk_free_rate) / std` follows it.
//! Both are per-trade ratios, nothing is annualized.

use std::fmt;

use super::error::DegenerateStatistics;
use super::position::Trade;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub profit: f64,
    pub loss: f64,
    pub pnl: f64,
    pub win_trades: usize,
    pub loss_trades: usize,
    pub total_trades: usize,
    pub win_rate: f64,
    pub mean: f64,
    pub std: f64,
    pub sharpe: f64,
}

impl Summary {
    pub fn compute(trades: &[Trade], risk_free_rate: f64) -> Result<Self, DegenerateStatistics> {
        let mut profit = 0.0_f64;
        let mut loss = 0.0_f64;
        let mut win_trades = 0usize;
        let mut loss_trades = 0usize;

        for trade in trades {
            if trade.is_win() {
                profit += trade.pnl;
                win_trades += 1;
            } else {
                loss += trade.pnl;
                loss_trades += 1;
            }
        }

        let total_trades = win_trades + loss_trades;
        if total_trades == 0 {
            return Err(DegenerateStatistics::NoTrades);
        }

        let pnl = profit + loss;
        let n = total_trades as f64;
        let win_rate = win_trades as f64 / n;
        let mean = pnl / n;
        let std = trades.iter().map(|t| t.pnl - mean).sum::<f64>() / n;

        if std == 0.0 {
            return Err(DegenerateStatistics::ZeroDeviation);
        }
        let sharpe = (mean - risk_free_rate) / std;

        Ok(Summary {
            profit,
            loss,
            pnl,
            win_trades,
            loss_trades,
            total_trades,
            win_rate,
            mean,
            std,
            sharpe,
        })
    }

    /// The labeled record in reporting order.
    pub fn fields(&self) -> [(&'static str, f64); 10] {
        [
            ("profit", self.profit),
            ("loss", self.loss),
            ("pnl", self.pnl),
            ("win_trades", self.win_trades as f64),
            ("loss_trades", self.loss_trades as f64),
            ("total_trades", self.total_trades as f64),
            ("win_rate", self.win_rate),
            ("mean", self.mean),
            ("std", self.std),
            ("sharpe", self.sharpe),
        ]
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.fields() {
            writeln!(f, "{:<14}{:>16.6}", label, value)?;
        }
        Ok(())
    }
}
