//! Persistence layer for account records.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only
mod store;

pub use error::DbError;
pub(crate) use models::{AccountRow, NewAccountRow};
pub use repository::AccountRepository;
pub use store::{MIGRATIONS, Store};
