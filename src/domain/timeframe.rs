//! Bar timeframe vocabulary shared with data collaborators.

use std::fmt;
use std::str::FromStr;

use super::error::TradesimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Daily => "1d",
            Timeframe::Weekly => "1w",
            Timeframe::Monthly => "1m",
        }
    }
}

impl FromStr for Timeframe {
    type Err = TradesimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Timeframe::Daily),
            "1w" => Ok(Timeframe::Weekly),
            "1m" => Ok(Timeframe::Monthly),
            other => Err(TradesimError::invalid_input(format!(
                "timeframe '{}' not supported",
                other
            ))),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
