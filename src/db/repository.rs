//! Account repository: the domain operations over the record store.

use std::sync::Arc;

use diesel::prelude::*;
use mining_economy::AccountRecord;
use tracing::{debug, info, instrument};

use crate::db::{AccountRow, DbError, NewAccountRow, Store, schema};

/// Repository for account records. The only writer of the store.
///
/// Lookups that miss return the sentinel record (empty name, see
/// [`AccountRecord::exists`]); store failures are always `Err`.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    store: Arc<Store>,
}

impl AccountRepository {
    /// Creates a repository over an open store.
    #[instrument(skip(store), fields(path = %store.path()))]
    pub fn new(store: Arc<Store>) -> Self {
        info!("Creating AccountRepository");
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Gets an account by name, or the sentinel if absent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read or the record is corrupt.
    #[instrument(skip(self))]
    pub fn get_by_name(&self, name: &str) -> Result<AccountRecord, DbError> {
        debug!(name = %name, "Looking up account by name");
        let record = self.store.read(|conn| load(conn, name))?;
        Ok(record.unwrap_or_default())
    }

    /// Gets the account bound to `address`, or the sentinel if none is.
    ///
    /// When several accounts share an address, the one whose name sorts
    /// last wins. The lookup uses the address index, not a scan.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read or the record is corrupt.
    #[instrument(skip(self))]
    pub fn get_by_address(&self, address: &str) -> Result<AccountRecord, DbError> {
        debug!(address = %address, "Looking up account by address");
        let record = self.store.read(|conn| load_by_address(conn, address))?;
        Ok(record.unwrap_or_default())
    }

    /// Binds `address` to the account, creating the account first if needed.
    ///
    /// New accounts start with no gold or diamonds and the starter tool.
    /// Existing accounts only have their address replaced.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read or written.
    #[instrument(skip(self))]
    pub fn login(&self, name: &str, address: &str) -> Result<AccountRecord, DbError> {
        self.update(name, |mut record| {
            if record.exists() {
                debug!(name = %name, "Existing account, updating address");
                record.address = address.to_string();
            } else {
                info!(name = %name, "Creating account on first login");
                record = AccountRecord::create(name, address);
            }
            Ok::<_, DbError>((record.clone(), record))
        })
    }

    /// Clears the account's address. No-op if the account does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read or written.
    #[instrument(skip(self))]
    pub fn logout(&self, name: &str) -> Result<AccountRecord, DbError> {
        self.update(name, |mut record| {
            if record.exists() {
                record.address.clear();
            } else {
                debug!(name = %name, "Logout for unknown account ignored");
            }
            Ok::<_, DbError>((record.clone(), record))
        })
    }

    /// Credits mined gold and diamonds to `record`'s account.
    ///
    /// The deltas are applied to the stored balances inside one write
    /// transaction, so concurrent calls for the same account all land. If
    /// the account is not stored yet, `record` itself is credited and written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if `record` has no name or the store fails.
    #[instrument(skip(self, record), fields(name = %record.name))]
    pub fn mine(
        &self,
        record: &AccountRecord,
        gold_delta: u64,
        diamond_delta: u64,
    ) -> Result<AccountRecord, DbError> {
        self.store.write(|conn| {
            let mut current = load(conn, &record.name)?.unwrap_or_else(|| record.clone());
            current.gold = current.gold.saturating_add(gold_delta);
            current.diamond = current.diamond.saturating_add(diamond_delta);
            persist(conn, &current)?;
            info!(gold = current.gold, diamond = current.diamond, "Mining credited");
            Ok(current)
        })
    }

    /// Overwrites the stored record under `record.name`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if `record` has no name or the write fails.
    #[instrument(skip(self, record), fields(name = %record.name))]
    pub fn save(&self, record: &AccountRecord) -> Result<(), DbError> {
        self.store.write(|conn| persist(conn, record))?;
        debug!("Account saved");
        Ok(())
    }

    /// Every stored account, in ascending name order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read or a record is corrupt.
    #[instrument(skip(self))]
    pub fn list_all(&self) -> Result<Vec<AccountRecord>, DbError> {
        let rows = self.store.read(|conn| {
            schema::users::table
                .order(schema::users::name.asc())
                .select(AccountRow::as_select())
                .load::<AccountRow>(conn)
                .map_err(DbError::from)
        })?;

        let records = rows
            .into_iter()
            .map(AccountRow::decode)
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = records.len(), "Accounts loaded");
        Ok(records)
    }

    /// Accounts holding any gold. Callers sort for presentation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read or a record is corrupt.
    #[instrument(skip(self))]
    pub fn top_scores(&self) -> Result<Vec<AccountRecord>, DbError> {
        let scores: Vec<AccountRecord> = self
            .list_all()?
            .into_iter()
            .filter(|record| record.gold > 0)
            .collect();
        debug!(count = scores.len(), "Top scores collected");
        Ok(scores)
    }

    /// Atomically reads, transforms and writes the account named `name`.
    ///
    /// `f` receives the stored record, or the sentinel if absent, and returns
    /// the record to store plus a value for the caller. A returned sentinel
    /// is not written. If `f` fails nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or a [`DbError`] converted into `E`.
    #[instrument(skip(self, f))]
    pub fn update<T, E>(
        &self,
        name: &str,
        f: impl FnOnce(AccountRecord) -> Result<(AccountRecord, T), E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        self.store.write(|conn| {
            let current = load(conn, name)?.unwrap_or_default();
            apply(conn, current, f)
        })
    }

    /// Like [`AccountRepository::update`], for the account bound to `address`.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or a [`DbError`] converted into `E`.
    #[instrument(skip(self, f))]
    pub fn update_by_address<T, E>(
        &self,
        address: &str,
        f: impl FnOnce(AccountRecord) -> Result<(AccountRecord, T), E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        self.store.write(|conn| {
            let current = load_by_address(conn, address)?.unwrap_or_default();
            apply(conn, current, f)
        })
    }
}

fn load(conn: &mut SqliteConnection, name: &str) -> Result<Option<AccountRecord>, DbError> {
    let row = schema::users::table
        .find(name)
        .select(AccountRow::as_select())
        .first::<AccountRow>(conn)
        .optional()?;
    row.map(AccountRow::decode).transpose()
}

fn load_by_address(
    conn: &mut SqliteConnection,
    address: &str,
) -> Result<Option<AccountRecord>, DbError> {
    let row = schema::users::table
        .filter(schema::users::address.eq(address))
        .order(schema::users::name.desc())
        .select(AccountRow::as_select())
        .first::<AccountRow>(conn)
        .optional()?;
    row.map(AccountRow::decode).transpose()
}

fn persist(conn: &mut SqliteConnection, record: &AccountRecord) -> Result<(), DbError> {
    NewAccountRow::encode(record)?.upsert(conn)
}

fn apply<T, E>(
    conn: &mut SqliteConnection,
    current: AccountRecord,
    f: impl FnOnce(AccountRecord) -> Result<(AccountRecord, T), E>,
) -> Result<T, E>
where
    E: From<DbError>,
{
    let (updated, value) = f(current)?;
    if updated.exists() {
        persist(conn, &updated)?;
    }
    Ok(value)
}
