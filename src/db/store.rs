//! The embedded record store: one SQLite file, one `users` table.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, error, info, instrument};

use crate::db::DbError;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Connection-level settings applied on open.
///
/// The exclusive locking mode keeps other processes out of the file for as
/// long as the store is open.
const PRAGMAS: &str = "PRAGMA locking_mode = EXCLUSIVE; PRAGMA busy_timeout = 2000;";

/// Takes the write lock right away. Under exclusive locking mode it is held
/// until the connection closes, even when no migration had to write.
const ACQUIRE_LOCK: &str = "BEGIN EXCLUSIVE; COMMIT;";

/// Handle to the open store.
///
/// Constructed once at startup and shared by reference. All access goes
/// through a single connection, and every operation runs in its own
/// transaction on it.
pub struct Store {
    path: String,
    conn: Mutex<SqliteConnection>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("path", &self.path).finish()
    }
}

/// Failure inside a write transaction: either the store or the caller.
enum TxError<E> {
    Db(DbError),
    Domain(E),
}

impl<E> From<diesel::result::Error> for TxError<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Db(err.into())
    }
}

impl Store {
    /// Opens (creating if needed) the store at `path` and applies pending
    /// migrations.
    ///
    /// Use `":memory:"` for a throwaway store.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the file cannot be opened, is locked by another
    /// process, or the schema cannot be migrated.
    #[instrument(skip_all)]
    pub fn open(path: impl Into<String>) -> Result<Self, DbError> {
        let path = path.into();
        info!(path = %path, "Opening store");

        let mut conn = SqliteConnection::establish(&path)
            .map_err(|e| DbError::new(format!("Failed to open '{}': {}", path, e)))?;
        conn.batch_execute(PRAGMAS)?;

        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            error!(path = %path, error = %e, "Migration failed");
            DbError::new(format!("Failed to migrate '{}': {}", path, e))
        })?;
        debug!(count = applied.len(), "Migrations applied");

        conn.batch_execute(ACQUIRE_LOCK).map_err(|e| {
            error!(path = %path, error = %e, "Store is in use");
            DbError::new(format!("Failed to lock '{}': {}", path, e))
        })?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the schema cannot be created.
    #[instrument]
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::open(":memory:")
    }

    /// Path the store was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Closes the store, releasing the file lock.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection lock was poisoned.
    #[instrument(skip(self), fields(path = %self.path))]
    pub fn close(self) -> Result<(), DbError> {
        let Self { path, conn } = self;
        let conn = conn
            .into_inner()
            .map_err(|_| DbError::new("Store connection lock poisoned"))?;
        drop(conn);
        info!(path = %path, "Store closed");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, SqliteConnection>, DbError> {
        self.conn
            .lock()
            .map_err(|_| DbError::new("Store connection lock poisoned"))
    }

    /// Runs `f` in a read transaction.
    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let mut conn = self.lock()?;
        conn.transaction(f)
    }

    /// Runs `f` in a write transaction that holds the write lock from its
    /// first statement, so the reads inside `f` cannot go stale before its
    /// writes. Any error rolls the whole transaction back.
    pub(crate) fn write<T, E>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let mut conn = self.lock()?;
        conn.immediate_transaction(|conn| f(conn).map_err(TxError::Domain))
            .map_err(|err| match err {
                TxError::Db(db) => E::from(db),
                TxError::Domain(domain) => domain,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_errors_are_located_in_this_crate() {
        let err: TxError<DbError> = diesel::result::Error::RollbackTransaction.into();
        match err {
            TxError::Db(db) => assert!(db.file.ends_with("store.rs"), "located at {}", db.file),
            TxError::Domain(_) => panic!("expected a store error"),
        }
    }

    #[test]
    fn in_memory_store_opens_and_closes() {
        let store = Store::open_in_memory().expect("open failed");
        assert_eq!(store.path(), ":memory:");
        store.close().expect("close failed");
    }
}
