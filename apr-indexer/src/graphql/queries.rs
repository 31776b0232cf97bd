//! Query texts for the six upstream datasets
//!
//! Paginated queries take `$first` and `$id_gt` and return rows ordered by
//! `id` ascending, which is what the keyset loop relies on.

/// Analytics endpoint: pools with their current tick and token metadata
pub const POOLS: &str = r#"
query Pools($first: Int!, $id_gt: ID!) {
  pools(first: $first, orderBy: id, orderDirection: asc, where: { id_gt: $id_gt }) {
    id
    tick
    token0Price
    liquidity
    token0 { id name symbol decimals derivedMatic }
    token1 { id name symbol decimals derivedMatic }
  }
}
"#;

/// Analytics endpoint: positions with their containing pool embedded
pub const POSITIONS: &str = r#"
query Positions($first: Int!, $id_gt: ID!) {
  positions(first: $first, orderBy: id, orderDirection: asc, where: { id_gt: $id_gt }) {
    id
    owner
    liquidity
    tickLower { tickIdx }
    tickUpper { tickIdx }
    pool {
      id
      tick
      token0Price
      liquidity
      token0 { id name symbol decimals derivedMatic }
      token1 { id name symbol decimals derivedMatic }
    }
  }
}
"#;

/// Analytics endpoint: fee totals for a single day
pub const POOL_DAY_DATAS: &str = r#"
query PoolDayDatas($first: Int!, $id_gt: ID!, $date: Int!) {
  poolDayDatas(first: $first, orderBy: id, orderDirection: asc, where: { id_gt: $id_gt, date: $date }) {
    id
    date
    feesToken0
    feesToken1
    pool { id }
  }
}
"#;

/// Analytics endpoint: token metadata for an explicit address list
pub const TOKENS: &str = r#"
query Tokens($addresses: [ID!]!) {
  tokens(where: { id_in: $addresses }) {
    id
    name
    symbol
    decimals
    derivedMatic
  }
}
"#;

/// Farming endpoint: eternal farmings and their reward rates
pub const ETERNAL_FARMINGS: &str = r#"
query EternalFarmings($first: Int!, $id_gt: ID!) {
  eternalFarmings(first: $first, orderBy: id, orderDirection: asc, where: { id_gt: $id_gt }) {
    id
    pool
    rewardToken
    bonusRewardToken
    rewardRate
    bonusRewardRate
  }
}
"#;

/// Farming endpoint: deposits attached to an eternal farming
pub const FARMING_DEPOSITS: &str = r#"
query FarmingDeposits($first: Int!, $id_gt: ID!) {
  deposits(first: $first, orderBy: id, orderDirection: asc, where: { id_gt: $id_gt, eternalFarming_not: null }) {
    id
    eternalFarming
  }
}
"#;
