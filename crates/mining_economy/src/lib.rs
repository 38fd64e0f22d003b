//! Mining economy - pure game logic for the mining game.
//!
//! This crate owns everything that can be computed without touching the
//! store:
//!
//! - **Types**: [`AccountRecord`], [`Tool`], [`Upgrade`]
//! - **Catalog**: the immutable, price-ordered shop with its combined
//!   1-based index space
//! - **Economy**: multipliers and randomized mining yields
//! - **Purchases**: validation and application against an account record
//!
//! Persistence lives in the `mining_game` crate, which feeds stored records
//! through these functions and writes the results back.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod catalog;
mod economy;
mod purchase;
mod types;

pub use catalog::{Catalog, CatalogDocument, CatalogError, PurchaseTarget};
pub use economy::{
    EconomyError, MineYield, diamond_chance, diamond_multiplier, gold_multiplier, has_auto_miner,
    mine_yield,
};
pub use purchase::{PurchaseError, apply_purchase};
pub use types::{AccountRecord, Tool, Upgrade, UpgradeEffect};
