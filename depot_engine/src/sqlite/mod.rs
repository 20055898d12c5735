//! SQLite backend for the depot ledger.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
