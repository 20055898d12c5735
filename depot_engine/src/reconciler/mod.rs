//! # Deposit reconciliation
//!
//! Players pay the shop by dropping gold into a chest in the shop owner's town. The game does not report who paid
//! whom, so each cycle the [`DepositWatcher`]:
//!
//! 1. records which players are standing inside the town's [`Geofence`] ([`PresenceTracker`]),
//! 2. polls the balances of the receiver and of every present player, diffing them against the previous
//!    [`BalanceSnapshot`],
//! 3. pairs a rise in the receiver's balance with an equal fall in a present player's balance ([`MatchResolver`]),
//! 4. resolves both players to their chat-platform identities ([`IdentityResolver`]), then notifies them and credits
//!    the receiver's ledger account ([`DepositDispatcher`]).
mod dispatcher;
mod geofence;
mod identity;
mod matcher;
mod presence;
mod snapshot;
mod watch_set;
mod watcher;

pub use dispatcher::{DepositDispatcher, DispatchOutcome, DEPOSIT_TITLE};
pub use geofence::{ChunkCell, Geofence, WorldPos, CHUNK_SIZE};
pub use identity::{IdentityError, IdentityResolver, LookupStage, ResolvedParties};
pub use matcher::{DepositMatch, MatchResolver};
pub use presence::{PresenceRecord, PresenceTracker, LIVENESS_WINDOW};
pub use snapshot::{BalanceSnapshot, DepositCandidate};
pub use watch_set::WatchSet;
pub use watcher::{
    CycleReport,
    DepositSwitch,
    DepositWatcher,
    WatcherConfig,
    DEFAULT_PAUSED_POLL_INTERVAL,
    DEFAULT_POLL_INTERVAL,
};
