//! In-memory stand-ins for the game api and the chat platform, scripted by tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use depot_common::Gold;

use crate::traits::{
    BalanceReading,
    DepositNotifier,
    IdentityDirectory,
    LinkedIdentity,
    NotifierError,
    PlayerPosition,
    StableId,
    WorldFeed,
    WorldFeedError,
};

#[derive(Default)]
struct WorldState {
    positions: Vec<PlayerPosition>,
    balances: HashMap<String, Gold>,
    stable_ids: Vec<StableId>,
    links: Vec<LinkedIdentity>,
    balance_queries: Vec<Vec<String>>,
    fail_positions: bool,
    fail_balances: bool,
    fail_identity_lookups: bool,
}

/// A game world whose players, balances and account links are set directly by the test.
#[derive(Clone, Default)]
pub struct FakeWorld {
    state: Arc<Mutex<WorldState>>,
}

impl FakeWorld {
    fn with_state<T>(&self, f: impl FnOnce(&mut WorldState) -> T) -> T {
        let mut state = self.state.lock().expect("fake world lock poisoned");
        f(&mut state)
    }

    /// Replaces the set of online players.
    pub fn set_positions(&self, positions: Vec<PlayerPosition>) {
        self.with_state(|s| s.positions = positions);
    }

    pub fn set_balance(&self, name: &str, gold: Gold) {
        self.with_state(|s| {
            s.balances.insert(name.to_string(), gold);
        });
    }

    pub fn add_stable_id(&self, name: &str, id: &str) {
        self.with_state(|s| s.stable_ids.push(StableId { name: name.to_string(), id: id.to_string() }));
    }

    pub fn add_link(&self, stable_id: &str, platform_id: &str) {
        self.with_state(|s| {
            s.links.push(LinkedIdentity { stable_id: stable_id.to_string(), platform_id: platform_id.to_string() })
        });
    }

    /// Registers `name` with a stable id and a linked platform identity.
    pub fn link(&self, name: &str, stable_id: &str, platform_id: &str) {
        self.add_stable_id(name, stable_id);
        self.add_link(stable_id, platform_id);
    }

    pub fn fail_positions(&self, fail: bool) {
        self.with_state(|s| s.fail_positions = fail);
    }

    pub fn fail_balances(&self, fail: bool) {
        self.with_state(|s| s.fail_balances = fail);
    }

    pub fn fail_identity_lookups(&self, fail: bool) {
        self.with_state(|s| s.fail_identity_lookups = fail);
    }

    /// The names requested by every balance query so far, oldest first.
    pub fn balance_queries(&self) -> Vec<Vec<String>> {
        self.with_state(|s| s.balance_queries.clone())
    }
}

impl WorldFeed for FakeWorld {
    async fn player_positions(&self) -> Result<Vec<PlayerPosition>, WorldFeedError> {
        self.with_state(|s| match s.fail_positions {
            true => Err(WorldFeedError::Transport("map feed unavailable".into())),
            false => Ok(s.positions.clone()),
        })
    }

    async fn player_balances(&self, names: &[String]) -> Result<Vec<BalanceReading>, WorldFeedError> {
        self.with_state(|s| {
            s.balance_queries.push(names.to_vec());
            if s.fail_balances {
                return Err(WorldFeedError::Parse("not json".into()));
            }
            let readings = names
                .iter()
                .filter_map(|n| s.balances.get(n).map(|b| BalanceReading::new(n.clone(), *b)))
                .collect();
            Ok(readings)
        })
    }
}

impl IdentityDirectory for FakeWorld {
    async fn stable_ids(&self, names: &[String]) -> Result<Vec<StableId>, WorldFeedError> {
        self.with_state(|s| {
            if s.fail_identity_lookups {
                return Err(WorldFeedError::Transport("player lookup unavailable".into()));
            }
            Ok(s.stable_ids.iter().filter(|id| names.contains(&id.name)).cloned().collect())
        })
    }

    async fn linked_identities(&self, stable_ids: &[String]) -> Result<Vec<LinkedIdentity>, WorldFeedError> {
        self.with_state(|s| {
            if s.fail_identity_lookups {
                return Err(WorldFeedError::Transport("link lookup unavailable".into()));
            }
            Ok(s.links.iter().filter(|l| stable_ids.contains(&l.stable_id)).cloned().collect())
        })
    }
}

/// A message captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Direct { user: String, title: String, message: String },
    Log(String),
}

#[derive(Default)]
struct NotifierState {
    notices: Vec<Notice>,
    unreachable: HashSet<String>,
}

/// Records every notice instead of delivering it.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    state: Arc<Mutex<NotifierState>>,
}

impl RecordingNotifier {
    /// Direct messages to `user` fail from now on.
    pub fn make_unreachable(&self, user: &str) {
        let mut state = self.state.lock().expect("notifier lock poisoned");
        state.unreachable.insert(user.to_string());
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.state.lock().expect("notifier lock poisoned").notices.clone()
    }

    pub fn direct_messages_to(&self, user: &str) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Direct { user: u, message, .. } if u == user => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Log(line) => Some(line),
                _ => None,
            })
            .collect()
    }
}

impl DepositNotifier for RecordingNotifier {
    async fn notify_user(&self, user: &str, title: &str, message: &str) -> Result<(), NotifierError> {
        let mut state = self.state.lock().expect("notifier lock poisoned");
        if state.unreachable.contains(user) {
            return Err(NotifierError::UnreachableRecipient(user.to_string()));
        }
        state.notices.push(Notice::Direct {
            user: user.to_string(),
            title: title.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    async fn post_log(&self, message: &str) -> Result<(), NotifierError> {
        let mut state = self.state.lock().expect("notifier lock poisoned");
        state.notices.push(Notice::Log(message.to_string()));
        Ok(())
    }
}
