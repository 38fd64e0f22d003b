//! Row models for the `users` table and their record encoding.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use mining_economy::AccountRecord;
use tracing::{instrument, warn};

use crate::db::{DbError, schema};

/// A stored account row: the key, the indexed address and the JSON record.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::users)]
pub struct AccountRow {
    name: String,
    address: String,
    record: String,
}

impl AccountRow {
    /// Decodes the stored JSON into an [`AccountRecord`].
    ///
    /// The row key is authoritative for the name, and the indexed column for
    /// the address.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored JSON is malformed.
    #[instrument(skip(self), fields(name = %self.name))]
    pub fn decode(self) -> Result<AccountRecord, DbError> {
        let mut record: AccountRecord = serde_json::from_str(&self.record).map_err(|e| {
            warn!(error = %e, "Stored record failed to decode");
            DbError::new(format!("Failed to decode record '{}': {}", self.name, e))
        })?;
        record.name = self.name;
        record.address = self.address;
        Ok(record)
    }
}

/// Insertable form of an account row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::users)]
pub struct NewAccountRow {
    name: String,
    address: String,
    record: String,
    updated_at: NaiveDateTime,
}

impl NewAccountRow {
    /// Encodes a record for writing under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the record has no name or fails to serialize.
    #[instrument(skip(record), fields(name = %record.name))]
    pub fn encode(record: &AccountRecord) -> Result<Self, DbError> {
        if !record.exists() {
            return Err(DbError::new("Refusing to store a record without a name"));
        }
        Ok(Self {
            name: record.name.clone(),
            address: record.address.clone(),
            record: serde_json::to_string(record)?,
            updated_at: Utc::now().naive_utc(),
        })
    }

    /// Inserts the row or overwrites the existing one with the same name.
    ///
    /// `created_at` of an existing row is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the statement fails.
    #[instrument(skip(self, conn), fields(name = %self.name))]
    pub fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), DbError> {
        use schema::users::dsl;

        diesel::insert_into(dsl::users)
            .values(self)
            .on_conflict(dsl::name)
            .do_update()
            .set((
                dsl::address.eq(&self.address),
                dsl::record.eq(&self.record),
                dsl::updated_at.eq(self.updated_at),
            ))
            .execute(conn)?;
        Ok(())
    }
}
