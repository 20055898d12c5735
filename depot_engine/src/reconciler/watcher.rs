use std::{
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use log::*;
use tokio::sync::Mutex;

use super::{
    BalanceSnapshot,
    DepositCandidate,
    DepositDispatcher,
    DepositMatch,
    DispatchOutcome,
    Geofence,
    MatchResolver,
    PresenceTracker,
    WatchSet,
    WorldPos,
    LIVENESS_WINDOW,
};
use crate::traits::{DepositNotifier, IdentityDirectory, LedgerManagement, WorldFeed};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_PAUSED_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// The administrative on/off switch for deposit matching. Clones share the same flag.
#[derive(Debug, Clone)]
pub struct DepositSwitch(Arc<AtomicBool>);

impl DepositSwitch {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sets the switch and returns its previous state.
    pub fn set(&self, enabled: bool) -> bool {
        self.0.swap(enabled, Ordering::SeqCst)
    }
}

impl Default for DepositSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// In-game name of the account that receives deposits.
    pub receiver: String,
    /// Location of the drop-off chest.
    pub drop_off: WorldPos,
    pub poll_interval: Duration,
    pub paused_poll_interval: Duration,
    pub liveness_window: chrono::Duration,
}

impl WatcherConfig {
    pub fn new<S: Into<String>>(receiver: S, drop_off: WorldPos) -> Self {
        Self {
            receiver: receiver.into(),
            drop_off,
            poll_interval: DEFAULT_POLL_INTERVAL,
            paused_poll_interval: DEFAULT_PAUSED_POLL_INTERVAL,
            liveness_window: LIVENESS_WINDOW,
        }
    }
}

/// A summary of one reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Number of players seen inside the geofence this cycle.
    pub sighted: usize,
    pub watched: usize,
    /// False when the switch was off and the cycle only tracked presence and balances.
    pub matching: bool,
    pub candidates: Vec<DepositCandidate>,
    pub deposit: Option<DepositMatch>,
    pub outcome: Option<DispatchOutcome>,
    pub evicted: Vec<String>,
}

/// The reconciliation task. It owns all presence and balance state, and only ever runs one cycle at a time.
pub struct DepositWatcher<W, B, N> {
    world: W,
    geofence: Geofence,
    presence: PresenceTracker,
    snapshot: BalanceSnapshot,
    matcher: MatchResolver,
    dispatcher: DepositDispatcher<B, N>,
    switch: DepositSwitch,
    poll_interval: Duration,
    paused_poll_interval: Duration,
}

impl<W, B, N> DepositWatcher<W, B, N>
where
    W: WorldFeed + IdentityDirectory,
    B: LedgerManagement,
    N: DepositNotifier,
{
    pub fn new(
        world: W,
        geofence: Geofence,
        config: WatcherConfig,
        dispatcher: DepositDispatcher<B, N>,
        switch: DepositSwitch,
    ) -> Self {
        Self {
            world,
            geofence,
            presence: PresenceTracker::new(config.liveness_window),
            snapshot: BalanceSnapshot::new(),
            matcher: MatchResolver::new(config.receiver, config.drop_off),
            dispatcher,
            switch,
            poll_interval: config.poll_interval,
            paused_poll_interval: config.paused_poll_interval,
        }
    }

    pub fn switch(&self) -> &DepositSwitch {
        &self.switch
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn snapshot(&self) -> &BalanceSnapshot {
        &self.snapshot
    }

    pub fn dispatcher(&self) -> &DepositDispatcher<B, N> {
        &self.dispatcher
    }

    /// Runs a single reconciliation cycle as of `now`.
    ///
    /// Failed fetches count as empty results. The balance baseline is updated whether or not a deposit is found, so a
    /// deposit that could not be credited does not fire again on the next cycle.
    ///
    /// While the switch is off, presence and balances are still tracked and stale records are still purged, but no
    /// deposit is matched. Balance changes seen during a pause are absorbed into the baseline and never credited.
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleReport {
        let matching = self.switch.is_enabled();
        let positions = self.world.player_positions().await.unwrap_or_else(|e| {
            warn!("🗺️ Could not fetch player positions. Assuming nobody is online this cycle. {e}");
            Vec::new()
        });
        let sighted = self.presence.observe(&positions, &self.geofence, now);
        let watch_set = WatchSet::new(self.matcher.receiver(), &self.presence);
        let names = watch_set.names();
        let readings = self.world.player_balances(&names).await.unwrap_or_else(|e| {
            warn!("🗺️ Could not fetch balances for {}. Skipping them this cycle. {e}", names.join(", "));
            Vec::new()
        });
        let readings = readings.into_iter().filter(|r| watch_set.contains(&r.name)).collect::<Vec<_>>();
        let candidates = self.snapshot.apply(&readings);
        let deposit = if matching {
            self.matcher.resolve(&candidates, &self.presence)
        } else {
            if !candidates.is_empty() {
                debug!("🔎️ Deposit matching is paused. Ignoring {} balance change(s)", candidates.len());
            }
            None
        };
        let outcome = match &deposit {
            Some(d) => Some(self.dispatcher.dispatch(&self.world, d).await),
            None => None,
        };
        self.snapshot.retain_watched(&watch_set);
        let evicted = self.presence.purge(now);
        let report = CycleReport { sighted, watched: watch_set.len(), matching, candidates, deposit, outcome, evicted };
        debug!("🔎️ Cycle complete: {report:?}");
        report
    }

    /// Polls forever. Never returns.
    ///
    /// While the switch is off the loop keeps polling at the slower cadence. A cycle that panics is logged and the loop
    /// carries on after the usual delay.
    pub async fn run(&mut self) {
        info!("🔎️ Deposit watcher started for {}", self.matcher.receiver());
        loop {
            if let Err(e) = AssertUnwindSafe(self.run_cycle_at(Utc::now())).catch_unwind().await {
                let msg = e
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| e.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("🔎️ Deposit cycle aborted: {msg}");
            }
            let delay = if self.switch.is_enabled() { self.poll_interval } else { self.paused_poll_interval };
            tokio::time::sleep(delay).await;
        }
    }

    /// Runs [`Self::run`] while holding the watcher's lock, so that a second start waits rather than sharing state.
    pub async fn run_exclusive(watcher: Arc<Mutex<Self>>) {
        let mut guard = watcher.lock().await;
        guard.run().await;
    }
}

#[cfg(test)]
mod test {
    use depot_common::Gold;

    use super::*;
    use crate::{
        events::EventProducers,
        reconciler::{ChunkCell, IdentityError},
        test_utils::{
            fakes::{FakeWorld, RecordingNotifier},
            prepare_env::prepare_test_db,
        },
        traits::PlayerPosition,
        LedgerApi,
        SqliteDatabase,
    };

    type TestWatcher = DepositWatcher<FakeWorld, SqliteDatabase, RecordingNotifier>;

    async fn watcher(world: &FakeWorld, notifier: &RecordingNotifier) -> TestWatcher {
        let ledger = LedgerApi::new(prepare_test_db().await);
        let dispatcher = DepositDispatcher::new(ledger, notifier.clone(), EventProducers::default());
        let fence = Geofence::new((-2..2).flat_map(|x| (-2..2).map(move |z| ChunkCell::new(x, z))));
        let config = WatcherConfig::new("Bob", WorldPos::new(0.0, 0.0));
        DepositWatcher::new(world.clone(), fence, config, dispatcher, DepositSwitch::default())
    }

    fn linked_world() -> FakeWorld {
        let world = FakeWorld::default();
        world.link("Alice", "uuid-a", "alice#1");
        world.link("Bob", "uuid-b", "bob#1");
        world.set_balance("Alice", Gold::from_gold(200));
        world.set_balance("Bob", Gold::from_gold(100));
        world.set_positions(vec![PlayerPosition::new("Alice", 2.0, 0.0)]);
        world
    }

    #[tokio::test]
    async fn alice_deposits_with_bob() {
        let world = linked_world();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(&world, &notifier).await;
        let t0 = Utc::now();
        let first = watcher.run_cycle_at(t0).await;
        assert_eq!(first.sighted, 1);
        assert_eq!(first.watched, 2);
        assert!(first.candidates.is_empty());

        world.set_balance("Alice", Gold::from_gold(150));
        world.set_balance("Bob", Gold::from_gold(150));
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(3)).await;
        assert_eq!(report.deposit, Some(DepositMatch {
            depositor: "Alice".into(),
            receiver: "Bob".into(),
            amount: Gold::from_gold(50)
        }));
        assert!(report.outcome.as_ref().is_some_and(DispatchOutcome::is_credited));
        assert_eq!(watcher.dispatcher().ledger().balance("bob#1").await.unwrap(), Gold::from_gold(50));

        // The same balances again do not credit twice
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(6)).await;
        assert!(report.candidates.is_empty());
        assert!(report.deposit.is_none());
        assert_eq!(watcher.dispatcher().ledger().balance("bob#1").await.unwrap(), Gold::from_gold(50));
    }

    #[tokio::test]
    async fn unresolved_depositor_is_reported_and_not_credited() {
        let world = FakeWorld::default();
        world.link("Bob", "uuid-b", "bob#1");
        world.set_balance("Alice", Gold::from_gold(200));
        world.set_balance("Bob", Gold::from_gold(100));
        world.set_positions(vec![PlayerPosition::new("Alice", 2.0, 0.0)]);
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(&world, &notifier).await;
        let t0 = Utc::now();
        watcher.run_cycle_at(t0).await;
        world.set_balance("Alice", Gold::from_gold(150));
        world.set_balance("Bob", Gold::from_gold(150));
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(3)).await;
        assert!(matches!(
            report.outcome,
            Some(DispatchOutcome::IdentityFailed(IdentityError::Unresolved { ref name, found: 0, .. })) if name == "Alice"
        ));
        assert_eq!(watcher.dispatcher().ledger().balance("bob#1").await.unwrap(), Gold::default());
        assert_eq!(notifier.log_lines(), vec!["❌ Failed to deposit **50.00g** from Alice into Bob's account."]);
        // The baseline moved on, so the same delta does not fire again
        assert_eq!(watcher.snapshot().balance_of("Alice"), Some(Gold::from_gold(150)));
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(6)).await;
        assert!(report.outcome.is_none());
        assert_eq!(notifier.log_lines().len(), 1);
    }

    #[tokio::test]
    async fn feed_failures_degrade_to_empty_results() {
        let world = linked_world();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(&world, &notifier).await;
        let t0 = Utc::now();
        world.fail_positions(true);
        let report = watcher.run_cycle_at(t0).await;
        assert_eq!(report.sighted, 0);
        assert_eq!(report.watched, 1);
        assert_eq!(world.balance_queries(), vec![vec!["Bob".to_string()]]);

        world.fail_positions(false);
        world.fail_balances(true);
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(3)).await;
        assert_eq!(report.sighted, 1);
        assert!(report.candidates.is_empty());
        assert_eq!(watcher.snapshot().balance_of("Alice"), None);
        assert_eq!(watcher.snapshot().balance_of("Bob"), Some(Gold::from_gold(100)));
    }

    #[tokio::test]
    async fn departed_players_are_forgotten() {
        let world = linked_world();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(&world, &notifier).await;
        let t0 = Utc::now();
        watcher.run_cycle_at(t0).await;
        assert_eq!(watcher.snapshot().balance_of("Alice"), Some(Gold::from_gold(200)));
        world.set_positions(vec![]);
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(12)).await;
        assert!(report.evicted.is_empty());
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(13)).await;
        assert_eq!(report.evicted, vec!["Alice".to_string()]);
        // Alice was still watched during the evicting cycle. She drops out of the snapshot on the next one.
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(16)).await;
        assert_eq!(report.watched, 1);
        assert_eq!(watcher.snapshot().balance_of("Alice"), None);
        assert_eq!(watcher.snapshot().balance_of("Bob"), Some(Gold::from_gold(100)));
    }

    #[tokio::test]
    async fn players_outside_the_geofence_are_not_watched() {
        let world = linked_world();
        world.set_positions(vec![PlayerPosition::new("Alice", 500.0, 500.0)]);
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(&world, &notifier).await;
        let report = watcher.run_cycle_at(Utc::now()).await;
        assert_eq!(report.sighted, 0);
        assert_eq!(world.balance_queries(), vec![vec!["Bob".to_string()]]);
    }

    #[tokio::test]
    async fn switch_is_shared_between_clones() {
        let switch = DepositSwitch::default();
        let handle = switch.clone();
        assert!(switch.is_enabled());
        assert!(handle.set(false));
        assert!(!switch.is_enabled());
    }

    #[tokio::test]
    async fn paused_cycles_track_presence_but_credit_nothing() {
        let world = linked_world();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(&world, &notifier).await;
        let t0 = Utc::now();
        watcher.run_cycle_at(t0).await;
        watcher.switch().set(false);

        world.set_positions(vec![PlayerPosition::new("Alice", 5000.0, 5000.0)]);
        world.set_balance("Alice", Gold::from_gold(150));
        world.set_balance("Bob", Gold::from_gold(150));
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(3)).await;
        assert!(!report.matching);
        assert_eq!(report.candidates.len(), 2);
        assert!(report.deposit.is_none());
        assert_eq!(watcher.snapshot().balance_of("Bob"), Some(Gold::from_gold(150)));

        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(13)).await;
        assert_eq!(report.evicted, vec!["Alice".to_string()]);
        assert!(!watcher.presence().is_present("Alice"));

        watcher.switch().set(true);
        let report = watcher.run_cycle_at(t0 + chrono::Duration::seconds(16)).await;
        assert!(report.matching);
        assert_eq!(report.watched, 1);
        assert!(report.candidates.is_empty());
        assert!(report.outcome.is_none());
        assert_eq!(watcher.dispatcher().ledger().balance("bob#1").await.unwrap(), Gold::default());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn paused_watcher_keeps_polling_and_forgets_departed_players() {
        let world = linked_world();
        let notifier = RecordingNotifier::default();
        let ledger = LedgerApi::new(prepare_test_db().await);
        let dispatcher = DepositDispatcher::new(ledger, notifier.clone(), EventProducers::default());
        let fence = Geofence::new((-2..2).flat_map(|x| (-2..2).map(move |z| ChunkCell::new(x, z))));
        let mut config = WatcherConfig::new("Bob", WorldPos::new(0.0, 0.0));
        config.poll_interval = Duration::from_millis(10);
        config.paused_poll_interval = Duration::from_millis(20);
        config.liveness_window = chrono::Duration::milliseconds(100);
        let switch = DepositSwitch::new(true);
        let watcher = DepositWatcher::new(world.clone(), fence, config, dispatcher, switch.clone());
        let watcher = Arc::new(Mutex::new(watcher));
        let task = tokio::spawn(DepositWatcher::run_exclusive(Arc::clone(&watcher)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        // The running loop holds the lock
        assert!(watcher.try_lock().is_err());
        assert!(world.balance_queries().iter().any(|q| q.contains(&"Alice".to_string())));

        switch.set(false);
        world.set_positions(vec![PlayerPosition::new("Alice", 5000.0, 5000.0)]);
        world.set_balance("Alice", Gold::from_gold(150));
        world.set_balance("Bob", Gold::from_gold(150));
        let polls_before_pause = world.balance_queries().len();
        tokio::time::sleep(Duration::from_millis(400)).await;
        let queries = world.balance_queries();
        assert!(queries.len() > polls_before_pause);
        assert_eq!(queries.last(), Some(&vec!["Bob".to_string()]));

        switch.set(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.abort();
        let _ = task.await;
        let watcher = watcher.lock().await;
        assert!(!watcher.presence().is_present("Alice"));
        assert_eq!(watcher.dispatcher().ledger().balance("bob#1").await.unwrap(), Gold::default());
        assert!(notifier.notices().is_empty());
    }
}
