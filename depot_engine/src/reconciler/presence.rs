use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::*;

use super::{Geofence, WorldPos};
use crate::traits::PlayerPosition;

/// How long an actor stays present after they were last seen inside the geofence.
pub const LIVENESS_WINDOW: Duration = Duration::seconds(12);

#[derive(Debug, Clone, PartialEq)]
pub struct PresenceRecord {
    pub name: String,
    pub position: WorldPos,
    pub last_seen: DateTime<Utc>,
}

/// The actors recently seen inside the geofence, with their last known position.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    records: HashMap<String, PresenceRecord>,
    window: Duration,
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new(LIVENESS_WINDOW)
    }
}

impl PresenceTracker {
    pub fn new(window: Duration) -> Self {
        Self { records: HashMap::new(), window }
    }

    /// Records every player in `positions` that stands inside `geofence`. Returns how many were inside.
    pub fn observe(&mut self, positions: &[PlayerPosition], geofence: &Geofence, now: DateTime<Utc>) -> usize {
        let mut inside = 0;
        for player in positions.iter().filter(|p| geofence.contains(&p.position)) {
            inside += 1;
            let record = PresenceRecord { name: player.name.clone(), position: player.position, last_seen: now };
            if self.records.insert(player.name.clone(), record).is_none() {
                debug!("🗺️ {} entered the drop-off area at ({}, {})", player.name, player.position.x, player.position.z);
            }
        }
        inside
    }

    /// Forgets everyone whose last sighting is older than the liveness window. Returns the evicted names.
    pub fn purge(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let window = self.window;
        let expired = self
            .records
            .values()
            .filter(|r| now - r.last_seen > window)
            .map(|r| r.name.clone())
            .collect::<Vec<String>>();
        for name in &expired {
            self.records.remove(name);
            debug!("🗺️ {name} has not been seen in the drop-off area for {}s", window.num_seconds());
        }
        expired
    }

    pub fn get(&self, name: &str) -> Option<&PresenceRecord> {
        self.records.get(name)
    }

    pub fn position_of(&self, name: &str) -> Option<WorldPos> {
        self.records.get(name).map(|r| r.position)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;
    use crate::reconciler::ChunkCell;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn fence() -> Geofence {
        Geofence::new([ChunkCell::new(0, 0)])
    }

    #[test]
    fn only_players_inside_are_recorded() {
        let mut tracker = PresenceTracker::default();
        let seen = tracker.observe(
            &[PlayerPosition::new("Alice", 2.0, 3.0), PlayerPosition::new("Bob", 100.0, 3.0)],
            &fence(),
            t(0),
        );
        assert_eq!(seen, 1);
        assert!(tracker.is_present("Alice"));
        assert!(!tracker.is_present("Bob"));
        assert_eq!(tracker.position_of("Alice"), Some(WorldPos::new(2.0, 3.0)));
    }

    #[test]
    fn sightings_refresh_position_and_time() {
        let mut tracker = PresenceTracker::default();
        tracker.observe(&[PlayerPosition::new("Alice", 2.0, 3.0)], &fence(), t(0));
        tracker.observe(&[PlayerPosition::new("Alice", 5.0, 6.0)], &fence(), t(9));
        let record = tracker.get("Alice").unwrap();
        assert_eq!(record.position, WorldPos::new(5.0, 6.0));
        assert_eq!(record.last_seen, t(9));
        // Leaving the area does not refresh the record
        tracker.observe(&[PlayerPosition::new("Alice", 500.0, 6.0)], &fence(), t(12));
        assert_eq!(tracker.get("Alice").unwrap().last_seen, t(9));
    }

    #[test]
    fn records_expire_after_the_liveness_window() {
        let mut tracker = PresenceTracker::default();
        tracker.observe(&[PlayerPosition::new("Alice", 2.0, 3.0)], &fence(), t(0));
        for secs in [3, 6, 9, 12] {
            assert!(tracker.purge(t(secs)).is_empty());
            assert!(tracker.is_present("Alice"), "Alice should still be present at t={secs}");
        }
        assert_eq!(tracker.purge(t(13)), vec!["Alice".to_string()]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn purge_runs_without_new_data() {
        let mut tracker = PresenceTracker::new(Duration::seconds(5));
        tracker.observe(&[PlayerPosition::new("Alice", 1.0, 1.0), PlayerPosition::new("Bob", 1.0, 1.0)], &fence(), t(0));
        tracker.observe(&[PlayerPosition::new("Bob", 1.0, 1.0)], &fence(), t(4));
        let mut evicted = tracker.purge(t(6));
        evicted.sort();
        assert_eq!(evicted, vec!["Alice".to_string()]);
        assert_eq!(tracker.names().collect::<Vec<_>>(), vec!["Bob"]);
    }
}
