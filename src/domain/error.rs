//! Domain error types.

/// Failure raised by a strategy while producing signals.
///
/// Carried through the simulators untouched, so the caller sees exactly
/// what the strategy reported.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("strategy {strategy} failed: {message}")]
pub struct StrategyError {
    pub strategy: String,
    pub message: String,
}

impl StrategyError {
    pub fn new(strategy: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            message: message.into(),
        }
    }
}

/// Why the summary statistics of a trade list are undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DegenerateStatistics {
    #[error("degenerate statistics: no trades (win rate and mean are undefined)")]
    NoTrades,

    #[error("degenerate statistics: zero deviation (sharpe is undefined)")]
    ZeroDeviation,
}

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    DegenerateStatistics(#[from] DegenerateStatistics),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {ticker} ({timeframe})")]
    NoData { ticker: String, timeframe: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesimError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        TradesimError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        let code: u8 = match err {
            TradesimError::Io(_) => 1,
            TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. }
            | TradesimError::ConfigInvalid { .. } => 2,
            TradesimError::Data { .. } | TradesimError::NoData { .. } => 3,
            TradesimError::InvalidInput { .. } => 4,
            TradesimError::Strategy(_) => 5,
            TradesimError::DegenerateStatistics(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}
