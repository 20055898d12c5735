use std::collections::HashMap;

use depot_common::Gold;
use log::*;
use serde::{Deserialize, Serialize};

use super::WatchSet;
use crate::traits::BalanceReading;

/// A balance change observed for one actor between two consecutive polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositCandidate {
    pub name: String,
    pub delta: Gold,
}

impl DepositCandidate {
    pub fn new<S: Into<String>>(name: S, delta: Gold) -> Self {
        Self { name: name.into(), delta }
    }
}

/// The last balance seen for every watched actor. This is the baseline each new reading is compared against.
#[derive(Debug, Clone, Default)]
pub struct BalanceSnapshot {
    balances: HashMap<String, Gold>,
}

impl BalanceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares each reading with the stored baseline and returns a candidate for every balance that changed. The
    /// baseline is always replaced by the new reading. An actor without a baseline never produces a candidate.
    pub fn apply(&mut self, readings: &[BalanceReading]) -> Vec<DepositCandidate> {
        let mut candidates = Vec::new();
        for reading in readings {
            match self.balances.insert(reading.name.clone(), reading.balance) {
                Some(old) if old != reading.balance => {
                    let delta = reading.balance - old;
                    trace!("{}: {old} -> {} ({delta})", reading.name, reading.balance);
                    candidates.push(DepositCandidate::new(reading.name.clone(), delta));
                },
                Some(_) => {},
                None => trace!("{}: baseline set to {}", reading.name, reading.balance),
            }
        }
        candidates
    }

    /// Drops the baseline of every actor that is no longer watched.
    pub fn retain_watched(&mut self, watch_set: &WatchSet) {
        self.balances.retain(|name, _| watch_set.contains(name));
    }

    pub fn balance_of(&self, name: &str) -> Option<Gold> {
        self.balances.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
