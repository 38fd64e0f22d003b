//! Game actions composed from the repository and the economy.

use std::sync::Arc;

use derive_getters::Getters;
use derive_more::Display;
use mining_economy::{
    AccountRecord, Catalog, EconomyError, PurchaseError, apply_purchase, has_auto_miner,
    mine_yield,
};
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::{AccountRepository, DbError};

/// Error from a game action.
#[derive(Debug, Clone, Display)]
pub enum GameError {
    /// Login was attempted without a name.
    #[display("No username provided")]
    MissingUsername,

    /// No account is bound to the caller's address.
    #[display("Not logged in")]
    NotLoggedIn,

    /// The shop index does not name an item.
    #[display("Invalid item number: {}", _0)]
    InvalidItem(usize),

    /// The balance does not cover the price.
    #[display("{}", _0)]
    Purchase(PurchaseError),

    /// The equipped tool cannot be mined with.
    #[display("{}", _0)]
    Economy(EconomyError),

    /// The store failed.
    #[display("{}", _0)]
    Db(DbError),
}

impl std::error::Error for GameError {}

impl From<DbError> for GameError {
    fn from(err: DbError) -> Self {
        Self::Db(err)
    }
}

impl From<PurchaseError> for GameError {
    fn from(err: PurchaseError) -> Self {
        Self::Purchase(err)
    }
}

impl From<EconomyError> for GameError {
    fn from(err: EconomyError) -> Self {
        Self::Economy(err)
    }
}

/// Result of one mining action.
#[derive(Debug, Clone, Getters)]
pub struct MineOutcome {
    /// The account after crediting.
    record: AccountRecord,
    /// Gold mined in this action.
    gold_mined: u64,
    /// Diamonds found in this action.
    diamond_mined: u64,
    /// Whether the account owns the auto miner.
    auto_mine: bool,
}

/// Result of a successful purchase.
#[derive(Debug, Clone, Getters)]
pub struct PurchaseReceipt {
    /// The account after the purchase.
    record: AccountRecord,
    /// Shop index that was bought.
    index: usize,
    /// Display name of the item.
    item_name: String,
}

/// Service layer for game actions.
///
/// Wraps [`AccountRepository`] and the [`Catalog`], resolving the caller by
/// address the way sessions would.
#[derive(Debug, Clone)]
pub struct GameService {
    repository: AccountRepository,
    catalog: Arc<Catalog>,
}

impl GameService {
    /// Creates a new game service.
    #[instrument(skip(repository, catalog), fields(items = catalog.len()))]
    pub fn new(repository: AccountRepository, catalog: Arc<Catalog>) -> Self {
        info!("Creating GameService");
        Self {
            repository,
            catalog,
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &AccountRepository {
        &self.repository
    }

    /// Returns the shop catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The account bound to `address`, or the sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Db`] if the store fails.
    #[instrument(skip(self))]
    pub fn current_account(&self, address: &str) -> Result<AccountRecord, GameError> {
        // An empty address is what logged-out accounts carry.
        if address.is_empty() {
            return Ok(AccountRecord::default());
        }
        Ok(self.repository.get_by_address(address)?)
    }

    /// Logs `name` in from `address`, creating the account on first use.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MissingUsername`] for an empty name, or
    /// [`GameError::Db`] if the store fails.
    #[instrument(skip(self))]
    pub fn login(&self, name: &str, address: &str) -> Result<AccountRecord, GameError> {
        let name = name.trim();
        if name.is_empty() {
            warn!("Login without username");
            return Err(GameError::MissingUsername);
        }
        let record = self.repository.login(name, address)?;
        info!(name = %record.name, "Logged in");
        Ok(record)
    }

    /// Logs out whichever account is bound to `address`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotLoggedIn`] if no account is bound, or
    /// [`GameError::Db`] if the store fails.
    #[instrument(skip(self))]
    pub fn logout(&self, address: &str) -> Result<AccountRecord, GameError> {
        let account = self.current_account(address)?;
        if !account.exists() {
            return Err(GameError::NotLoggedIn);
        }
        let record = self.repository.logout(&account.name)?;
        info!(name = %record.name, "Logged out");
        Ok(record)
    }

    /// Mines once for the account bound to `address`.
    ///
    /// The credit lands in one transaction on the stored balances. The yield
    /// itself is computed from the account as read before that transaction,
    /// so an upgrade bought concurrently applies from the next action on.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotLoggedIn`], [`GameError::Economy`] for a
    /// misconfigured tool, or [`GameError::Db`].
    #[instrument(skip(self, rng))]
    pub fn mine<R: Rng + ?Sized>(
        &self,
        address: &str,
        rng: &mut R,
    ) -> Result<MineOutcome, GameError> {
        let account = self.current_account(address)?;
        if !account.exists() {
            return Err(GameError::NotLoggedIn);
        }

        let mined = mine_yield(&account, &account.equipped_tool, rng)?;
        let record = self
            .repository
            .mine(&account, *mined.gold(), *mined.diamond())?;

        debug!(gold = mined.gold(), diamond = mined.diamond(), "Mined");
        Ok(MineOutcome {
            auto_mine: has_auto_miner(&record),
            gold_mined: *mined.gold(),
            diamond_mined: *mined.diamond(),
            record,
        })
    }

    /// Buys the item at shop `index` for the account bound to `address`.
    ///
    /// Account resolution, balance check and write happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotLoggedIn`], [`GameError::InvalidItem`],
    /// [`GameError::Purchase`] for insufficient funds, or [`GameError::Db`].
    #[instrument(skip(self))]
    pub fn purchase(&self, address: &str, index: usize) -> Result<PurchaseReceipt, GameError> {
        if address.is_empty() {
            return Err(GameError::NotLoggedIn);
        }
        let catalog = &self.catalog;
        self.repository.update_by_address(address, |record| {
            if !record.exists() {
                return Err(GameError::NotLoggedIn);
            }
            let target = catalog.resolve(index).ok_or(GameError::InvalidItem(index))?;
            let updated = apply_purchase(&record, target)?;
            info!(name = %updated.name, item = %target.name(), "Purchase completed");
            let receipt = PurchaseReceipt {
                record: updated.clone(),
                index,
                item_name: target.name().to_string(),
            };
            Ok((updated, receipt))
        })
    }

    /// Accounts with gold, richest first; ties ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Db`] if the store fails.
    #[instrument(skip(self))]
    pub fn scoreboard(&self) -> Result<Vec<AccountRecord>, GameError> {
        let mut scores = self.repository.top_scores()?;
        scores.sort_by(|a, b| b.gold.cmp(&a.gold).then_with(|| a.name.cmp(&b.name)));
        Ok(scores)
    }
}
