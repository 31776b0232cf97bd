//! Liquidity position records

use super::numeric::{lenient_f64, lenient_i32, nullable_string};
use super::{Cursor, Page, UpstreamPool};
use apr_math::{get_amounts, is_in_range, TokenAmounts};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TickRef {
    #[serde(deserialize_with = "lenient_i32")]
    pub tick_idx: i32,
}

/// Position with its containing pool embedded
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub id: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub liquidity: f64,
    pub tick_lower: TickRef,
    pub tick_upper: TickRef,
    pub pool: UpstreamPool,
    #[serde(deserialize_with = "nullable_string")]
    pub owner: String,
}

impl Position {
    /// Strictly in range at `current_tick`
    pub fn is_active_at(&self, current_tick: i32) -> bool {
        is_in_range(self.tick_lower.tick_idx, current_tick, self.tick_upper.tick_idx)
    }

    /// Strictly in range at its own pool's tick
    pub fn is_active(&self) -> bool {
        self.is_active_at(self.pool.tick)
    }

    /// Raw token amounts at `current_tick`
    pub fn amounts_at(&self, current_tick: i32) -> TokenAmounts {
        get_amounts(
            self.liquidity,
            self.tick_lower.tick_idx,
            self.tick_upper.tick_idx,
            current_tick,
        )
    }

    /// Position value in native currency, using its embedded pool snapshot
    pub fn native_value(&self) -> f64 {
        let pool = &self.pool;
        self.amounts_at(pool.tick)
            .scaled(pool.token0.decimals, pool.token1.decimals)
            .value(pool.token0.derived_matic, pool.token1.derived_matic)
    }
}

impl Cursor for Position {
    fn cursor(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PositionsPage {
    pub positions: Vec<Position>,
}

impl Page for PositionsPage {
    type Item = Position;

    fn into_items(self) -> Vec<Position> {
        self.positions
    }
}
