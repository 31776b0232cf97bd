/// Mathematical utilities for the APR indexer
///
/// This crate provides the double-precision concentrated-liquidity helpers
/// used to turn tick-bounded position liquidity into token amounts.
/// Everything here is pure: no state, no I/O.

pub mod tick_math;
pub mod liquidity;

// Re-export commonly used functions
pub use tick_math::*;
pub use liquidity::*;
