//! Depot Engine
//!
//! The depot engine keeps the gold ledger for the depot bot and turns chest deposits in the game world into ledger
//! credits.
//!
//! The library is divided into three main sections:
//! 1. The ledger. [`LedgerManagement`] is the storage contract, [`SqliteDatabase`] the bundled backend and
//!    [`LedgerApi`] the facade that chat commands and the reconciler use. You should never need to access the
//!    database directly.
//! 2. Deposit reconciliation ([`mod@reconciler`]). A long-running [`DepositWatcher`] polls the game world through the
//!    [`WorldFeed`] and [`IdentityDirectory`] traits and credits matched deposits.
//! 3. Events. The reconciler publishes a [`events::DepositCreditedEvent`] or a [`events::DepositFailedEvent`] for
//!    every deposit it matches. Hook into them with [`events::EventHooks`].
pub mod db_types;
pub mod events;
mod ledger_api;
pub mod reconciler;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use ledger_api::LedgerApi;
pub use reconciler::{DepositDispatcher, DepositSwitch, DepositWatcher, Geofence, WatcherConfig, WorldPos};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    DepositNotifier,
    IdentityDirectory,
    LedgerError,
    LedgerManagement,
    NotifierError,
    WorldFeed,
    WorldFeedError,
};
