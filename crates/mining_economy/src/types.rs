//! Core domain types shared by the economy and the store.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// An equippable tool (a pickaxe) that defines the mining yield range.
///
/// Yields are drawn from the half-open range `[min_yield, max_yield)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
#[serde(default)]
pub struct Tool {
    /// Catalog identifier.
    #[new(into)]
    id: String,
    /// Display name.
    #[new(into)]
    name: String,
    /// Price in gold.
    price: u64,
    /// Inclusive lower bound of the gold yield.
    #[serde(alias = "minGold")]
    min_yield: u64,
    /// Exclusive upper bound of the gold yield.
    #[serde(alias = "maxGold")]
    max_yield: u64,
}

impl Tool {
    /// Identifier of the tool every new account starts with.
    pub const STARTER_ID: &'static str = "rusty_pickaxe";

    /// The free tool equipped on account creation.
    #[instrument]
    pub fn starter() -> Self {
        Self::new(Self::STARTER_ID, "Rusty Pickaxe", 0, 1, 5)
    }

    /// Whether the yield range contains at least one value.
    pub fn has_valid_range(&self) -> bool {
        self.max_yield > self.min_yield
    }
}

/// A diamond-priced upgrade unlocking an economy effect by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
#[serde(default)]
pub struct Upgrade {
    /// Catalog identifier, matched against [`UpgradeEffect`] ids.
    #[new(into)]
    id: String,
    /// Display name.
    #[new(into)]
    name: String,
    /// Shop description.
    #[new(into)]
    description: String,
    /// Price in diamonds.
    price: u64,
}

/// Upgrade ids that carry an effect in the economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeEffect {
    /// Doubles mined gold.
    GoldMultiplier2,
    /// Triples mined gold (takes priority over doubling).
    GoldMultiplier3,
    /// Doubles found diamonds.
    DiamondMultiplier2,
    /// Raises the diamond chance to 5%.
    DiamondChance,
    /// Keeps the mine page refreshing on its own.
    AutoMiner,
}

impl UpgradeEffect {
    /// The upgrade id that unlocks this effect.
    pub fn id(self) -> &'static str {
        match self {
            Self::GoldMultiplier2 => "gold_multiplier_2",
            Self::GoldMultiplier3 => "gold_multiplier_3",
            Self::DiamondMultiplier2 => "diamond_multiplier_2",
            Self::DiamondChance => "diamond_chance",
            Self::AutoMiner => "auto_miner",
        }
    }
}

/// Persisted state for one player.
///
/// A record with an empty `name` is the "not found" sentinel returned by
/// lookups; check it with [`AccountRecord::exists`]. Missing fields decode
/// to their zero values so older stored records stay readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRecord {
    /// Account name, the primary key. Never renamed.
    pub name: String,
    /// Address currently bound to the account; empty when logged out.
    pub address: String,
    /// Gold balance.
    pub gold: u64,
    /// Diamond balance.
    pub diamond: u64,
    /// Persisted but not used by any rule.
    pub health: i64,
    /// The tool used for mining.
    pub equipped_tool: Tool,
    /// Purchased upgrades in purchase order. May contain repeats.
    pub owned_upgrades: Vec<Upgrade>,
}

impl AccountRecord {
    /// Creates a fresh account: no balances, starter tool, bound to `address`.
    #[instrument(skip(name, address))]
    pub fn create(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            equipped_tool: Tool::starter(),
            ..Self::default()
        }
    }

    /// False for the lookup sentinel.
    pub fn exists(&self) -> bool {
        !self.name.is_empty()
    }

    /// True while an address is bound to the account.
    pub fn is_logged_in(&self) -> bool {
        !self.address.is_empty()
    }

    /// Whether `tool` is the one currently equipped.
    pub fn has_tool(&self, tool: &Tool) -> bool {
        self.equipped_tool.id == tool.id
    }

    /// Whether any owned upgrade has the given id.
    pub fn has_upgrade(&self, upgrade_id: &str) -> bool {
        self.owned_upgrades.iter().any(|u| u.id == upgrade_id)
    }

    /// Whether the effect-bearing upgrade is owned.
    pub fn has_effect(&self, effect: UpgradeEffect) -> bool {
        self.has_upgrade(effect.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_does_not_exist() {
        let record = AccountRecord::default();
        assert!(!record.exists());
        assert!(!record.is_logged_in());
    }

    #[test]
    fn created_account_has_starter_tool() {
        let record = AccountRecord::create("alice", "10.0.0.1");
        assert!(record.exists());
        assert!(record.is_logged_in());
        assert_eq!(record.gold, 0);
        assert_eq!(record.diamond, 0);
        assert_eq!(record.equipped_tool, Tool::starter());
        assert!(record.owned_upgrades.is_empty());
    }

    #[test]
    fn missing_fields_decode_to_zero_values() {
        let record: AccountRecord =
            serde_json::from_str(r#"{"name":"bob","gold":7}"#).expect("decode failed");
        assert_eq!(record.name, "bob");
        assert_eq!(record.gold, 7);
        assert_eq!(record.diamond, 0);
        assert_eq!(record.address, "");
        assert_eq!(record.equipped_tool, Tool::default());
        assert!(record.owned_upgrades.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let record: AccountRecord =
            serde_json::from_str(r#"{"name":"carol","mana":3}"#).expect("decode failed");
        assert_eq!(record.name, "carol");
    }

    #[test]
    fn tool_accepts_legacy_yield_keys() {
        let tool: Tool = serde_json::from_str(
            r#"{"id":"iron","name":"Iron Pickaxe","price":50,"minGold":3,"maxGold":9}"#,
        )
        .expect("decode failed");
        assert_eq!(*tool.min_yield(), 3);
        assert_eq!(*tool.max_yield(), 9);
    }
}
