use std::{collections::HashMap, fmt::Debug};

use chrono::{DateTime, Duration, Utc};
use cucumber::World;
use depot_common::Gold;
use depot_engine::{
    events::EventProducers,
    reconciler::{ChunkCell, CycleReport},
    test_utils::{
        fakes::{FakeWorld, RecordingNotifier},
        prepare_env::prepare_test_db,
    },
    traits::PlayerPosition,
    DepositDispatcher,
    DepositSwitch,
    DepositWatcher,
    Geofence,
    LedgerApi,
    SqliteDatabase,
    WatcherConfig,
    WorldPos,
};
use e2e::helpers::stable_id_for;
use log::*;

pub type ScenarioWatcher = DepositWatcher<FakeWorld, SqliteDatabase, RecordingNotifier>;

/// Half-width of the test town, in chunks.
const TOWN_RADIUS: i64 = 4;
pub const POLL_INTERVAL: Duration = Duration::seconds(3);

#[derive(World)]
pub struct DepotWorld {
    /// In-game name of the shop owner.
    pub receiver: String,
    pub game: FakeWorld,
    pub notifier: RecordingNotifier,
    pub watcher: Option<ScenarioWatcher>,
    pub db: Option<SqliteDatabase>,
    /// The scenario's clock. Each poll cycle runs at this time.
    pub now: DateTime<Utc>,
    /// In-game balances, mirrored into the fake game api.
    pub balances: HashMap<String, Gold>,
    pub positions: HashMap<String, WorldPos>,
    /// Discord ids by in-game name.
    pub accounts: HashMap<String, String>,
    pub last_report: Option<CycleReport>,
}

impl Default for DepotWorld {
    fn default() -> Self {
        let _ = env_logger::try_init().ok();
        Self {
            receiver: String::default(),
            game: FakeWorld::default(),
            notifier: RecordingNotifier::default(),
            watcher: None,
            db: None,
            now: Utc::now(),
            balances: HashMap::new(),
            positions: HashMap::new(),
            accounts: HashMap::new(),
            last_report: None,
        }
    }
}

impl Debug for DepotWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepotWorld")
            .field("receiver", &self.receiver)
            .field("now", &self.now)
            .field("balances", &self.balances)
            .field("positions", &self.positions)
            .field("accounts", &self.accounts)
            .field("last_report", &self.last_report)
            .finish()
    }
}

impl DepotWorld {
    /// Opens a fresh ledger and starts watching for deposits to `receiver` at the given chest.
    pub async fn open_shop(&mut self, receiver: &str, chest: WorldPos) {
        let db = prepare_test_db().await;
        debug!("🌍️ Created database: {}", db.url());
        let ledger = LedgerApi::new(db.clone());
        let dispatcher = DepositDispatcher::new(ledger, self.notifier.clone(), EventProducers::default());
        let cells = (-TOWN_RADIUS..TOWN_RADIUS)
            .flat_map(|x| (-TOWN_RADIUS..TOWN_RADIUS).map(move |z| ChunkCell::new(x, z)))
            .collect::<Vec<_>>();
        let config = WatcherConfig::new(receiver, chest);
        let switch = DepositSwitch::default();
        let watcher = DepositWatcher::new(self.game.clone(), Geofence::new(cells), config, dispatcher, switch);
        self.watcher = Some(watcher);
        self.db = Some(db);
        self.receiver = receiver.to_string();
    }

    pub fn watcher(&self) -> &ScenarioWatcher {
        self.watcher.as_ref().expect("The shop has not been opened")
    }

    pub fn ledger(&self) -> LedgerApi<SqliteDatabase> {
        LedgerApi::new(self.db.clone().expect("The shop has not been opened"))
    }

    pub fn take_database(&mut self) -> Option<SqliteDatabase> {
        self.watcher = None;
        self.db.take()
    }

    pub fn link(&mut self, name: &str, discord_id: &str) {
        self.game.link(name, &stable_id_for(name), discord_id);
        self.accounts.insert(name.to_string(), discord_id.to_string());
    }

    pub fn discord_id(&self, name: &str) -> &str {
        self.accounts.get(name).map(String::as_str).unwrap_or_else(|| panic!("{name} has no Discord account"))
    }

    pub fn set_balance(&mut self, name: &str, balance: Gold) {
        self.game.set_balance(name, balance);
        self.balances.insert(name.to_string(), balance);
    }

    pub fn balance(&self, name: &str) -> Gold {
        self.balances.get(name).copied().unwrap_or_default()
    }

    pub fn move_player(&mut self, name: &str, pos: Option<WorldPos>) {
        match pos {
            Some(p) => self.positions.insert(name.to_string(), p),
            None => self.positions.remove(name),
        };
        let online = self.positions.iter().map(|(n, p)| PlayerPosition::new(n.clone(), p.x, p.z)).collect();
        self.game.set_positions(online);
    }

    /// Runs one poll cycle at the current time, then advances the clock by one poll interval.
    pub async fn poll(&mut self) {
        let now = self.now;
        let watcher = self.watcher.as_mut().expect("The shop has not been opened");
        let report = watcher.run_cycle_at(now).await;
        debug!("🌍️ Cycle at {now}: {report:?}");
        self.last_report = Some(report);
        self.now = now + POLL_INTERVAL;
    }

    pub fn last_report(&self) -> &CycleReport {
        self.last_report.as_ref().expect("No poll cycle has run")
    }
}
