use depot_common::Gold;
use thiserror::Error;

use crate::db_types::LedgerAccount;

/// Name used for the reserve account in error messages.
pub const RESERVE_ACCOUNT: &str = "the reserve";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{account} has insufficient funds. Available: {available}, requested: {requested}")]
    InsufficientFunds { account: String, available: Gold, requested: Gold },
    #[error("The amount must be positive, not {0}")]
    InvalidAmount(Gold),
    #[error("Cannot transfer funds from an account to itself")]
    SelfTransfer,
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// The `LedgerManagement` trait defines the storage contract for balances.
///
/// There is one account per platform identity plus a single reserve account. Implementations must make each mutation
/// atomic with respect to other mutations of the same account(s); operations on disjoint accounts may run
/// concurrently. No operation other than the ones below may change a balance.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// Returns the balance for `identity`, creating the account with a zero balance if it does not exist yet.
    async fn fetch_balance(&self, identity: &str) -> Result<Gold, LedgerError>;

    async fn fetch_account(&self, identity: &str) -> Result<Option<LedgerAccount>, LedgerError>;

    async fn fetch_reserve_balance(&self) -> Result<Gold, LedgerError>;

    /// Adds `delta` (which may be negative) to the balance of `identity`, without any lower bound check. Returns the
    /// new balance.
    async fn adjust_balance(&self, identity: &str, delta: Gold) -> Result<Gold, LedgerError>;

    /// Moves `amount` from `from` to `to`. Fails with [`LedgerError::InsufficientFunds`] if `from` holds less than
    /// `amount`. The amount is not validated here; callers must ensure it is positive.
    ///
    /// Returns the new balances of `from` and `to`.
    async fn transfer(&self, from: &str, to: &str, amount: Gold) -> Result<(Gold, Gold), LedgerError>;

    /// A positive `amount` moves funds from the reserve to `identity`; a negative one moves funds from `identity` to
    /// the reserve. Fails with [`LedgerError::InsufficientFunds`] if the debited side cannot cover the amount.
    ///
    /// Returns the new balances of `identity` and the reserve.
    async fn reserve_transfer(&self, identity: &str, amount: Gold) -> Result<(Gold, Gold), LedgerError>;
}
