//! # Tick Math
//!
//! Conversions between ticks and square-root prices in `f64`.
//! The price at a tick is `1.0001^tick`, so the √-price is `√(1.0001^tick)`.

/// Lowest tick addressable by the pool contracts
pub const MIN_TICK: i32 = -887_272;

/// Highest tick addressable by the pool contracts
pub const MAX_TICK: i32 = 887_272;

/// Geometric step of the tick grid
pub const TICK_BASE: f64 = 1.0001;

/// √-price at `tick`.
///
/// Monotone increasing in `tick` and exactly `1.0` at tick zero. Ticks far
/// outside [`MIN_TICK`, `MAX_TICK`] may saturate to `0.0` or `inf`; callers
/// only divide by this value for positions that are in range.
pub fn tick_to_sqrt_price(tick: i32) -> f64 {
    TICK_BASE.powf(tick as f64).sqrt()
}

/// Strict in-range predicate: `tick_lower < tick_current < tick_upper`.
///
/// A position whose bound sits exactly on the current tick is out of range
/// for APR purposes even though [`crate::get_amounts`] treats the bounds
/// inclusively.
pub fn is_in_range(tick_lower: i32, tick_current: i32, tick_upper: i32) -> bool {
    tick_lower < tick_current && tick_current < tick_upper
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tick_zero_is_unit_price() {
        assert_eq!(tick_to_sqrt_price(0), 1.0);
    }

    #[test]
    fn test_known_ticks() {
        assert_relative_eq!(tick_to_sqrt_price(1000), 1.0512684683767608, max_relative = 1e-12);
        assert_relative_eq!(tick_to_sqrt_price(-1000), 0.9512318024187264, max_relative = 1e-12);
        assert_relative_eq!(tick_to_sqrt_price(887_270), 1.844420629037855e19, max_relative = 1e-10);
        assert_relative_eq!(tick_to_sqrt_price(-887_270), 5.421756752534544e-20, max_relative = 1e-10);
    }

    #[test]
    fn test_bounds_stay_finite() {
        assert!(tick_to_sqrt_price(MAX_TICK).is_finite());
        assert!(tick_to_sqrt_price(MIN_TICK) > 0.0);
    }

    #[test]
    fn test_range_predicate_is_strict() {
        assert!(is_in_range(-10, 0, 10));
        assert!(!is_in_range(0, 0, 10));
        assert!(!is_in_range(-10, 10, 10));
        assert!(!is_in_range(0, 0, 0));
    }
}
