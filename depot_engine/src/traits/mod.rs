//! # Interface contracts of the depot engine.
//!
//! * [`LedgerManagement`] is the storage contract for balances. [`SqliteDatabase`](crate::SqliteDatabase) is the
//!   bundled backend.
//! * [`WorldFeed`] and [`IdentityDirectory`] describe the external, read-only game api consumed by the reconciler.
//! * [`DepositNotifier`] is how the reconciler reaches people on the chat platform.
mod ledger_management;
mod notifier;
mod world;

pub use ledger_management::{LedgerError, LedgerManagement, RESERVE_ACCOUNT};
pub use notifier::{DepositNotifier, NotifierError};
pub use world::{
    BalanceReading,
    IdentityDirectory,
    LinkedIdentity,
    PlayerPosition,
    StableId,
    WorldFeed,
    WorldFeedError,
};
