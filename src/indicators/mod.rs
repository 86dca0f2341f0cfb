// Technical indicators module
// Implements the SMA/EMA snapshot backing the /indicator command

pub mod moving_average;
pub mod set;

pub use moving_average::{calculate_ema, calculate_sma};
pub use set::{compute_indicators, IndicatorSet, DEFAULT_WINDOWS};
