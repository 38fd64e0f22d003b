//! Purchase validation and application.

use derive_more::Display;
use tracing::{info, instrument, warn};

use crate::{AccountRecord, PurchaseTarget};

/// Reason a purchase was refused. The record is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PurchaseError {
    /// Not enough gold for a tool.
    #[display("Not enough gold: need {}, have {}", price, available)]
    InsufficientGold {
        /// Tool price.
        price: u64,
        /// Gold balance.
        available: u64,
    },

    /// Not enough diamonds for an upgrade.
    #[display("Not enough diamonds: need {}, have {}", price, available)]
    InsufficientDiamonds {
        /// Upgrade price.
        price: u64,
        /// Diamond balance.
        available: u64,
    },
}

impl std::error::Error for PurchaseError {}

/// Applies a purchase to a copy of `record`.
///
/// A tool costs gold and replaces the equipped tool; buying the tool already
/// equipped, or a cheaper one, is allowed. An upgrade costs diamonds and is
/// appended to the owned upgrades even when an upgrade with the same id is
/// already owned. Effects are presence-based, so a repeat adds nothing but
/// still costs its price.
///
/// # Errors
///
/// Returns [`PurchaseError`] if the balance does not cover the price.
#[instrument(skip(record, target), fields(account = %record.name, item = %target.name()))]
pub fn apply_purchase(
    record: &AccountRecord,
    target: PurchaseTarget<'_>,
) -> Result<AccountRecord, PurchaseError> {
    let mut updated = record.clone();

    match target {
        PurchaseTarget::Tool(tool) => {
            let price = *tool.price();
            if record.gold < price {
                warn!(price, gold = record.gold, "Insufficient gold");
                return Err(PurchaseError::InsufficientGold {
                    price,
                    available: record.gold,
                });
            }
            updated.gold -= price;
            updated.equipped_tool = tool.clone();
            info!(tool = %tool.id(), price, "Tool purchased");
        }
        PurchaseTarget::Upgrade(upgrade) => {
            let price = *upgrade.price();
            if record.diamond < price {
                warn!(price, diamond = record.diamond, "Insufficient diamonds");
                return Err(PurchaseError::InsufficientDiamonds {
                    price,
                    available: record.diamond,
                });
            }
            updated.diamond -= price;
            updated.owned_upgrades.push(upgrade.clone());
            info!(upgrade = %upgrade.id(), price, "Upgrade purchased");
        }
    }

    Ok(updated)
}
