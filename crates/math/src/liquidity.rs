/// Liquidity-to-amount conversions for concentrated-liquidity positions
///
/// The standard amount formulas in √-price space. Results are raw on-chain
/// units; divide by `10^decimals` (see [`TokenAmounts::scaled`]) before
/// pricing them.

use crate::tick_math::tick_to_sqrt_price;

/// Token amounts held by a position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TokenAmounts {
    pub amount0: f64,
    pub amount1: f64,
}

impl TokenAmounts {
    pub fn new(amount0: f64, amount1: f64) -> Self {
        Self { amount0, amount1 }
    }

    /// Convert raw units into whole tokens.
    pub fn scaled(self, decimals0: i32, decimals1: i32) -> Self {
        Self {
            amount0: self.amount0 / decimal_scale(decimals0),
            amount1: self.amount1 / decimal_scale(decimals1),
        }
    }

    /// Value both legs with independent unit prices.
    pub fn value(self, price0: f64, price1: f64) -> f64 {
        self.amount0 * price0 + self.amount1 * price1
    }
}

/// `10^decimals` as `f64`
pub fn decimal_scale(decimals: i32) -> f64 {
    10f64.powi(decimals)
}

/// Amounts of token0 and token1 for `liquidity` over `[tick_lower, tick_upper]`
/// at `tick_current`.
///
/// Assumes `tick_lower < tick_upper`. With `c`, `a`, `b` the √-prices at the
/// current, lower and upper ticks:
/// - `c < a`: all token0, `L * (1/a - 1/b)`
/// - `a <= c <= b`: `L * (1/c - 1/b)` token0 and `L * (c - a)` token1
/// - `c > b`: all token1, `L * (b - a)`
pub fn get_amounts(liquidity: f64, tick_lower: i32, tick_upper: i32, tick_current: i32) -> TokenAmounts {
    let current = tick_to_sqrt_price(tick_current);
    let lower = tick_to_sqrt_price(tick_lower);
    let upper = tick_to_sqrt_price(tick_upper);

    if current < lower {
        TokenAmounts::new(liquidity * (1.0 / lower - 1.0 / upper), 0.0)
    } else if current <= upper {
        TokenAmounts::new(
            liquidity * (1.0 / current - 1.0 / upper),
            liquidity * (current - lower),
        )
    } else {
        TokenAmounts::new(0.0, liquidity * (upper - lower))
    }
}
