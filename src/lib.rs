//! Mining Game library - a small browser mining game over an embedded store
//!
//! Players log in by name, are recognized afterwards by their network
//! address, mine gold (and occasionally diamonds) with their equipped
//! pickaxe, and spend it in a price-ordered shop.
//!
//! # Architecture
//!
//! - **Economy** (`mining_economy`): multipliers, mining yield, catalog and purchases
//! - **Store**: one SQLite file holding every account record, behind [`AccountRepository`]
//! - **Service**: [`GameService`] composes the repository and the economy into game actions
//! - **Web**: axum routes rendering plain-text pages
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mining_game::{AccountRepository, Catalog, GameService, Store};
//!
//! # fn example() -> anyhow::Result<()> {
//! let store = Arc::new(Store::open("mining_game.db")?);
//! let catalog = Arc::new(Catalog::from_file("shop.json")?);
//! let service = GameService::new(AccountRepository::new(store), catalog);
//!
//! let account = service.login("admin", "127.0.0.1")?;
//! assert_eq!(account.gold, 0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod game_service;
mod web;

// Crate-level exports - Configuration
pub use config::{ConfigError, ENV_PREFIX, GameConfig};

// Crate-level exports - Store
pub use db::{AccountRepository, DbError, MIGRATIONS, Store};

// Crate-level exports - Game actions
pub use game_service::{GameError, GameService, MineOutcome, PurchaseReceipt};

// Crate-level exports - HTTP front-end
pub use web::{ClientAddress, WebError, pages, router};

// Crate-level exports - Economy types
pub use mining_economy::{
    AccountRecord, Catalog, CatalogDocument, CatalogError, EconomyError, MineYield,
    PurchaseError, PurchaseTarget, Tool, Upgrade, UpgradeEffect, apply_purchase,
    diamond_chance, diamond_multiplier, gold_multiplier, has_auto_miner, mine_yield,
};
