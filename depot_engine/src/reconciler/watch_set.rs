use std::collections::BTreeSet;

use super::PresenceTracker;

/// The accounts whose balances are polled this cycle: the receiver plus everyone currently present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    names: BTreeSet<String>,
}

impl WatchSet {
    pub fn new(receiver: &str, presence: &PresenceTracker) -> Self {
        let mut names = presence.names().map(String::from).collect::<BTreeSet<String>>();
        names.insert(receiver.to_string());
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// The watched names, in a stable order.
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
