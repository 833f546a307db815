//! Plain-text report adapter implementing ReportPort.
//!
//! Layout: header with the strategy name, the summary table, a note on any
//! position left open, then one line per trade.

use crate::domain::backtest::BacktestResult;
use crate::domain::position::{Position, Trade};
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn summary_section(result: &BacktestResult) -> String {
    let mut out = String::from("== Summary ==\n");
    out.push_str(&result.summary().to_string());
    out
}

fn open_position_note(pos: &Position) -> String {
    format!(
        "Open position at end of series: entered bar {} at {:.6} (not counted)\n",
        pos.entry_index, pos.entry_price
    )
}

fn trade_table(trades: &[Trade]) -> String {
    let mut out = format!("== Trades ({}) ==\n", trades.len());
    out.push_str(&format!(
        "{:>6} {:>6} {:>5} {:>14} {:>14} {:>14}\n",
        "entry", "exit", "bars", "entry_price", "exit_price", "pnl"
    ));
    for trade in trades {
        out.push_str(&format!(
            "{:>6} {:>6} {:>5} {:>14.6} {:>14.6} {:>14.6}\n",
            trade.entry_index,
            trade.exit_index,
            trade.bars_held(),
            trade.entry_price,
            trade.exit_price,
            trade.pnl
        ));
    }
    out
}

impl ReportPort for TextReportAdapter {
    fn render(&self, result: &BacktestResult) -> String {
        let mut sections = vec![
            format!("Strategy: {}\n", result.strategy()),
            summary_section(result),
        ];
        if let Some(pos) = result.open_position() {
            sections.push(open_position_note(pos));
        }
        sections.push(trade_table(result.trades()));
        sections.join("\n")
    }
}
