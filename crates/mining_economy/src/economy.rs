//! Multipliers and randomized mining yields.

use derive_getters::Getters;
use derive_more::Display;
use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::{AccountRecord, Tool, UpgradeEffect};

/// Diamond chance without the `diamond_chance` upgrade.
const BASE_DIAMOND_CHANCE: f64 = 0.01;

/// Diamond chance with the `diamond_chance` upgrade.
const BOOSTED_DIAMOND_CHANCE: f64 = 0.05;

/// Gold multiplier from owned upgrades; the higher tier wins.
#[instrument(skip(record), fields(account = %record.name))]
pub fn gold_multiplier(record: &AccountRecord) -> u64 {
    if record.has_effect(UpgradeEffect::GoldMultiplier3) {
        3
    } else if record.has_effect(UpgradeEffect::GoldMultiplier2) {
        2
    } else {
        1
    }
}

/// Diamond multiplier from owned upgrades.
#[instrument(skip(record), fields(account = %record.name))]
pub fn diamond_multiplier(record: &AccountRecord) -> u64 {
    if record.has_effect(UpgradeEffect::DiamondMultiplier2) {
        2
    } else {
        1
    }
}

/// Probability that a single mining action finds diamonds.
#[instrument(skip(record), fields(account = %record.name))]
pub fn diamond_chance(record: &AccountRecord) -> f64 {
    if record.has_effect(UpgradeEffect::DiamondChance) {
        BOOSTED_DIAMOND_CHANCE
    } else {
        BASE_DIAMOND_CHANCE
    }
}

/// Whether the account keeps mining on its own.
pub fn has_auto_miner(record: &AccountRecord) -> bool {
    record.has_effect(UpgradeEffect::AutoMiner)
}

/// Result of one mining action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct MineYield {
    gold: u64,
    diamond: u64,
}

impl MineYield {
    /// Creates a yield.
    pub fn new(gold: u64, diamond: u64) -> Self {
        Self { gold, diamond }
    }

    /// True when diamonds were found.
    pub fn found_diamond(&self) -> bool {
        self.diamond > 0
    }
}

/// Error computing a mining yield.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum EconomyError {
    /// The tool's yield range is empty; the catalog entry is misconfigured.
    #[display("Tool '{}' has an empty yield range [{}, {})", id, min, max)]
    DegenerateYieldRange {
        /// Tool id.
        id: String,
        /// Lower bound.
        min: u64,
        /// Upper bound.
        max: u64,
    },
}

impl std::error::Error for EconomyError {}

/// Computes one mining action for `record` using `tool`.
///
/// Gold is drawn uniformly from `[min_yield, max_yield)` and scaled by
/// [`gold_multiplier`]. Diamonds are found when a uniform draw in `[0, 1)`
/// falls below [`diamond_chance`], yielding [`diamond_multiplier`] diamonds.
///
/// # Errors
///
/// Returns [`EconomyError::DegenerateYieldRange`] if `max_yield <= min_yield`.
#[instrument(skip(record, tool, rng), fields(account = %record.name, tool = %tool.id()))]
pub fn mine_yield<R: Rng + ?Sized>(
    record: &AccountRecord,
    tool: &Tool,
    rng: &mut R,
) -> Result<MineYield, EconomyError> {
    if !tool.has_valid_range() {
        warn!(min = tool.min_yield(), max = tool.max_yield(), "Refusing to mine with empty range");
        return Err(EconomyError::DegenerateYieldRange {
            id: tool.id().clone(),
            min: *tool.min_yield(),
            max: *tool.max_yield(),
        });
    }

    let base = rng.gen_range(*tool.min_yield()..*tool.max_yield());
    let gold = base.saturating_mul(gold_multiplier(record));

    let diamond = if rng.r#gen::<f64>() < diamond_chance(record) {
        diamond_multiplier(record)
    } else {
        0
    };

    debug!(base, gold, diamond, "Mining yield computed");
    Ok(MineYield::new(gold, diamond))
}
