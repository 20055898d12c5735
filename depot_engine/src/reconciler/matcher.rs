use depot_common::Gold;
use log::*;
use serde::{Deserialize, Serialize};

use super::{DepositCandidate, PresenceTracker, WorldPos};

/// A deposit inferred from one poll cycle: `depositor`'s balance fell by exactly the amount `receiver`'s rose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositMatch {
    pub depositor: String,
    pub receiver: String,
    pub amount: Gold,
}

/// Pairs the receiver's balance increase with the depositor who paid it.
#[derive(Debug, Clone)]
pub struct MatchResolver {
    receiver: String,
    drop_off: WorldPos,
}

impl MatchResolver {
    pub fn new<S: Into<String>>(receiver: S, drop_off: WorldPos) -> Self {
        Self { receiver: receiver.into(), drop_off }
    }

    pub fn receiver(&self) -> &str {
        self.receiver.as_str()
    }

    /// Returns the deposit this cycle's candidates describe, if any.
    ///
    /// The receiver must have exactly one positive delta. Every other candidate whose delta is its exact negation is
    /// a possible depositor. A single possibility is selected outright; among several, the one last seen nearest to
    /// the drop-off point wins, and candidates without a known position cannot win.
    pub fn resolve(&self, candidates: &[DepositCandidate], presence: &PresenceTracker) -> Option<DepositMatch> {
        let mut receiver_deltas = candidates.iter().filter(|c| c.name == self.receiver && c.delta.is_positive());
        let amount = match (receiver_deltas.next(), receiver_deltas.next()) {
            (Some(c), None) => c.delta,
            (None, _) => return None,
            (Some(_), Some(_)) => {
                debug!("🔎️ More than one balance change for {}. Skipping this cycle", self.receiver);
                return None;
            },
        };
        let pool = candidates.iter().filter(|c| c.name != self.receiver && c.delta == -amount).collect::<Vec<_>>();
        let depositor = match pool.as_slice() {
            [] => {
                debug!("🔎️ {} received {amount}, but nobody present paid exactly that", self.receiver);
                return None;
            },
            [only] => only,
            several => {
                let names = several.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ");
                debug!("🔎️ {} candidates paid {amount}: {names}. Picking the closest to the drop-off", several.len());
                let nearest = several
                    .iter()
                    .filter_map(|c| presence.position_of(&c.name).map(|p| (c, p.distance_to(&self.drop_off))))
                    .min_by(|(_, a), (_, b)| a.total_cmp(b))
                    .map(|(c, _)| c);
                match nearest {
                    Some(c) => c,
                    None => {
                        debug!("🔎️ None of the candidates has a known position");
                        return None;
                    },
                }
            },
        };
        info!("🔎️ Matched a deposit of {amount} from {} to {}", depositor.name, self.receiver);
        Some(DepositMatch { depositor: depositor.name.clone(), receiver: self.receiver.clone(), amount })
    }
}
