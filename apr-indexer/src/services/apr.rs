//! APR kernel
//!
//! Pure functions over one network snapshot. Pool figures are valued in
//! token0 units through `token0Price`; farming figures are valued in the
//! network's native currency through each token's `derivedMatic`.

use std::borrow::{Borrow, Cow};
use std::collections::HashMap;

use apr_math::decimal_scale;

use super::snapshot::Snapshot;
use crate::models::{EternalFarming, PoolDayData, Position, UpstreamPool, UpstreamToken};

pub const DAYS_PER_YEAR: f64 = 365.0;

/// 60 * 60 * 24 * 365, leap years ignored
pub const SECONDS_PER_YEAR: f64 = 31_536_000.0;

/// Farming last APR reported when no deposited position is in range
pub const INACTIVE_FARMING_APR: f64 = -1.0;

/// Lookups shared by the four kernel passes
#[derive(Debug, Default)]
pub struct SnapshotIndex<'a> {
    day_data_by_pool: HashMap<&'a str, &'a PoolDayData>,
    positions_by_pool: HashMap<&'a str, Vec<&'a Position>>,
    positions_by_farming: HashMap<&'a str, Vec<Cow<'a, Position>>>,
    tokens: HashMap<String, &'a UpstreamToken>,
    missing_positions: usize,
}

impl<'a> SnapshotIndex<'a> {
    pub fn build(snapshot: &'a Snapshot) -> Self {
        let mut index = SnapshotIndex::default();

        // Later day records for the same pool replace earlier ones
        for day in &snapshot.pool_day_datas {
            index.day_data_by_pool.insert(day.pool.id.as_str(), day);
        }

        let mut positions_by_id: HashMap<&str, &Position> = HashMap::with_capacity(snapshot.positions.len());
        for position in &snapshot.positions {
            positions_by_id.insert(position.id.as_str(), position);
            index
                .positions_by_pool
                .entry(position.pool.id.as_str())
                .or_default()
                .push(position);
        }

        for deposit in &snapshot.deposits {
            let position = match positions_by_id.get(deposit.position_id.as_str()) {
                Some(position) => Cow::Borrowed(*position),
                None => {
                    index.missing_positions += 1;
                    Cow::Owned(Position::default())
                }
            };
            index
                .positions_by_farming
                .entry(deposit.eternal_farming.as_str())
                .or_default()
                .push(position);
        }

        for token in &snapshot.tokens {
            index.tokens.insert(token.id.to_lowercase(), token);
        }

        index
    }

    pub fn day_data(&self, pool_id: &str) -> Option<&'a PoolDayData> {
        self.day_data_by_pool.get(pool_id).copied()
    }

    pub fn pool_positions(&self, pool_id: &str) -> &[&'a Position] {
        self.positions_by_pool.get(pool_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Positions deposited into a farming; unknown positions appear zero-valued
    pub fn farming_positions(&self, farming_id: &str) -> &[Cow<'a, Position>] {
        self.positions_by_farming.get(farming_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn token(&self, address: &str) -> Option<&'a UpstreamToken> {
        self.tokens.get(&address.to_lowercase()).copied()
    }

    /// Deposits whose position was not in the analytics position set
    pub fn missing_positions(&self) -> usize {
        self.missing_positions
    }
}

fn each_position<P: Borrow<Position>>(positions: &[P]) -> impl Iterator<Item = &Position> {
    positions.iter().map(<P as Borrow<Position>>::borrow)
}

/// Metric values written back must be finite
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Yesterday's fees in token0 units, or zero without a day record
pub fn pool_fees(pool: &UpstreamPool, day: Option<&PoolDayData>) -> f64 {
    day.map(|day| day.fees_in_token0(pool.token0_price)).unwrap_or(0.0)
}

/// Value of one position at the pool's current tick, in token0 units
pub fn pool_position_tvl(pool: &UpstreamPool, position: &Position) -> f64 {
    let amounts = position
        .amounts_at(pool.tick)
        .scaled(pool.token0.decimals, pool.token1.decimals);
    amounts.amount0 + amounts.amount1 * pool.token0_price
}

/// Total value of the pool's in-range positions, in token0 units
pub fn pool_tvl<P: Borrow<Position>>(pool: &UpstreamPool, positions: &[P]) -> f64 {
    each_position(positions)
        .filter(|position| position.is_active_at(pool.tick))
        .map(|position| pool_position_tvl(pool, position))
        .sum()
}

/// Annualized last-day fee yield over the in-range TVL; zero without TVL
pub fn pool_last_apr<P: Borrow<Position>>(
    pool: &UpstreamPool,
    positions: &[P],
    day: Option<&PoolDayData>,
) -> f64 {
    let tvl = pool_tvl(pool, positions);
    if tvl > 0.0 {
        finite_or_zero(pool_fees(pool, day) * DAYS_PER_YEAR / tvl * 100.0)
    } else {
        0.0
    }
}

/// Best fee APR any single in-range position earned
pub fn pool_max_apr<P: Borrow<Position>>(
    pool: &UpstreamPool,
    positions: &[P],
    day: Option<&PoolDayData>,
) -> f64 {
    let fees = pool_fees(pool, day);
    let mut max_apr = 0.0_f64;

    for position in each_position(positions) {
        if !position.is_active_at(pool.tick) {
            continue;
        }
        let position_tvl = pool_position_tvl(pool, position);
        let position_fees = fees * position.liquidity / pool.liquidity;
        if position_tvl > 0.0 {
            let apr = position_fees * DAYS_PER_YEAR / position_tvl * 100.0;
            if apr > max_apr {
                max_apr = apr;
            }
        }
    }

    finite_or_zero(max_apr)
}

/// Per-second native value of `raw_rate` units of `token`
pub fn native_rate(token: &UpstreamToken, raw_rate: f64) -> f64 {
    raw_rate / decimal_scale(token.decimals) * token.derived_matic
}

/// Combined per-second reward emission in native currency
///
/// Tokens missing from the lookup contribute nothing; the bonus rate is
/// ignored when the bonus token is the zero address.
pub fn reward_rate<'t, F>(farming: &EternalFarming, lookup: F) -> f64
where
    F: Fn(&str) -> Option<&'t UpstreamToken>,
{
    let mut rate = lookup(&farming.reward_token)
        .map(|token| native_rate(token, farming.reward_rate))
        .unwrap_or(0.0);

    if farming.has_bonus_reward() {
        rate += lookup(&farming.bonus_reward_token)
            .map(|token| native_rate(token, farming.bonus_reward_rate))
            .unwrap_or(0.0);
    }

    rate
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarmingLastApr {
    /// `INACTIVE_FARMING_APR` when `tvl` is zero
    pub apr: f64,
    pub tvl: f64,
}

/// Native value of the farming's in-range positions
pub fn farming_active_tvl<P: Borrow<Position>>(positions: &[P]) -> f64 {
    each_position(positions)
        .filter(|position| position.is_active())
        .map(Position::native_value)
        .sum()
}

pub fn farming_last_apr<P: Borrow<Position>>(reward_rate: f64, positions: &[P]) -> FarmingLastApr {
    let tvl = finite_or_zero(farming_active_tvl(positions));
    let apr = if tvl > 0.0 {
        finite_or_zero(reward_rate * SECONDS_PER_YEAR / tvl * 100.0)
    } else {
        INACTIVE_FARMING_APR
    };
    FarmingLastApr { apr, tvl }
}

/// Best reward APR of a single in-range position, sharing rewards by liquidity
pub fn farming_max_apr<P: Borrow<Position>>(reward_rate: f64, positions: &[P]) -> f64 {
    let active_liquidity: f64 = each_position(positions)
        .filter(|position| position.is_active())
        .map(|position| position.liquidity)
        .sum();

    let mut max_apr = 0.0_f64;
    for position in each_position(positions) {
        if !position.is_active() {
            continue;
        }
        let position_tvl = position.native_value();
        if position_tvl > 0.0 && active_liquidity > 0.0 {
            let position_rate = reward_rate * position.liquidity / active_liquidity;
            let apr = position_rate * SECONDS_PER_YEAR / position_tvl * 100.0;
            if apr > max_apr {
                max_apr = apr;
            }
        }
    }

    finite_or_zero(max_apr)
}
