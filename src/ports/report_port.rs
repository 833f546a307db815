//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradesimError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn render(&self, result: &BacktestResult) -> String;

    /// Default implementation: writes [`ReportPort::render`] to `output_path`.
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), TradesimError> {
        std::fs::write(output_path, self.render(result))?;
        Ok(())
    }
}
