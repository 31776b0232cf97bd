//! Eternal farming records from the farming indexer

use super::numeric::{lenient_f64, nullable_string};
use super::{Cursor, Page};
use serde::Deserialize;

/// Placeholder address the farming indexer reports for "no bonus token"
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EternalFarming {
    pub id: String,
    #[serde(deserialize_with = "nullable_string")]
    pub reward_token: String,
    #[serde(deserialize_with = "nullable_string")]
    pub bonus_reward_token: String,
    /// Raw reward units emitted per second
    #[serde(deserialize_with = "lenient_f64")]
    pub reward_rate: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub bonus_reward_rate: f64,
    pub pool: String,
}

impl EternalFarming {
    pub fn has_bonus_reward(&self) -> bool {
        !self.bonus_reward_token.is_empty() && !self.bonus_reward_token.eq_ignore_ascii_case(ZERO_ADDRESS)
    }

    /// Reward token addresses that need metadata
    pub fn reward_tokens(&self) -> impl Iterator<Item = &str> {
        let bonus = self.has_bonus_reward().then_some(self.bonus_reward_token.as_str());
        std::iter::once(self.reward_token.as_str())
            .filter(|token| !token.is_empty() && !token.eq_ignore_ascii_case(ZERO_ADDRESS))
            .chain(bonus)
    }
}

impl Cursor for EternalFarming {
    fn cursor(&self) -> &str {
        &self.id
    }
}

/// Position deposited into an eternal farming
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FarmingDeposit {
    /// The deposit's id is the id of the deposited position
    #[serde(rename = "id")]
    pub position_id: String,
    #[serde(deserialize_with = "nullable_string")]
    pub eternal_farming: String,
}

impl Cursor for FarmingDeposit {
    fn cursor(&self) -> &str {
        &self.position_id
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EternalFarmingsPage {
    pub eternal_farmings: Vec<EternalFarming>,
}

impl Page for EternalFarmingsPage {
    type Item = EternalFarming;

    fn into_items(self) -> Vec<EternalFarming> {
        self.eternal_farmings
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DepositsPage {
    pub deposits: Vec<FarmingDeposit>,
}

impl Page for DepositsPage {
    type Item = FarmingDeposit;

    fn into_items(self) -> Vec<FarmingDeposit> {
        self.deposits
    }
}
