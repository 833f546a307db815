//! Technical indicators used by the built-in strategies.

pub mod sma;

pub use sma::{calculate_sma, trailing_sma};
