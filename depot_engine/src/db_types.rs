//! Rows stored by the ledger backends.
use chrono::{DateTime, Utc};
pub use depot_common::Gold;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A ledger account, keyed by the platform identity of its owner (e.g. a Discord user id).
///
/// Accounts are created lazily with a zero balance the first time they are read or credited, and are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub identity: String,
    pub balance: Gold,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
