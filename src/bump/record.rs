// {{{ Imports
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::context::paths::HoshifuriPaths;
use crate::context::store;
// }}}

/// How long the listing service locks bumping after a success.
pub fn bump_cooldown() -> Duration {
	Duration::hours(2)
}

// {{{ Record
/// The persisted state of one bump cycle.
///
/// `notified` stays false until the ready-announcement has gone out for
/// `next_instant` at least once; it is never reset except by starting a
/// whole new cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
	pub next_instant: DateTime<Utc>,
	pub notified: bool,
	pub guild_id: u64,
}

impl CycleRecord {
	/// A fresh cycle anchored at the trigger time.
	pub fn begin(trigger: DateTime<Utc>, guild_id: u64) -> Self {
		Self {
			next_instant: trigger + bump_cooldown(),
			notified: false,
			guild_id,
		}
	}

	pub fn is_due(&self, now: DateTime<Utc>) -> bool {
		self.next_instant <= now
	}
}
// }}}
// {{{ Store
pub struct CycleStore {
	path: PathBuf,
}

impl CycleStore {
	pub fn new(paths: &HoshifuriPaths) -> Self {
		Self {
			path: paths.bump_cycle_path(),
		}
	}

	pub fn load(&self) -> Option<CycleRecord> {
		store::read_document(&self.path)
	}

	pub fn save(&self, record: &CycleRecord) {
		store::write_document(&self.path, record);
	}

	/// Flips the persisted `notified` flag after a successful
	/// announcement. A missing record means the cycle was wiped under
	/// us; nothing to flag in that case.
	pub fn mark_notified(&self) {
		if let Some(mut record) = self.load() {
			record.notified = true;
			self.save(&record);
		}
	}
}
// }}}

// {{{ Tests
#[cfg(test)]
mod tests {
	use super::*;

	fn store(dir: &tempfile::TempDir) -> CycleStore {
		CycleStore::new(&HoshifuriPaths::at(dir.path().to_path_buf()))
	}

	fn some_instant() -> DateTime<Utc> {
		"2026-03-01T12:00:00Z".parse().unwrap()
	}

	#[test]
	fn a_fresh_cycle_lands_two_hours_out() {
		let trigger = some_instant();
		let record = CycleRecord::begin(trigger, 77);

		assert_eq!(record.next_instant - trigger, Duration::hours(2));
		assert!(!record.notified);
		assert!(!record.is_due(trigger));
		assert!(record.is_due(trigger + Duration::hours(2)));
	}

	#[test]
	fn records_survive_restarts() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);

		assert_eq!(store.load(), None);

		let record = CycleRecord::begin(some_instant(), 77);
		store.save(&record);
		assert_eq!(store.load(), Some(record));
	}

	#[test]
	fn marking_notified_keeps_the_rest_of_the_record() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);

		let record = CycleRecord::begin(some_instant(), 77);
		store.save(&record);
		store.mark_notified();

		let reloaded = store.load().unwrap();
		assert!(reloaded.notified);
		assert_eq!(reloaded.next_instant, record.next_instant);
		assert_eq!(reloaded.guild_id, 77);
	}

	#[test]
	fn marking_notified_without_a_record_is_a_no_op() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);
		store.mark_notified();
		assert_eq!(store.load(), None);
	}

	#[test]
	fn a_new_trigger_replaces_the_cycle_wholesale() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);

		let mut first = CycleRecord::begin(some_instant(), 77);
		first.notified = true;
		store.save(&first);

		let second = CycleRecord::begin(some_instant() + Duration::hours(5), 77);
		store.save(&second);

		let reloaded = store.load().unwrap();
		assert!(!reloaded.notified);
		assert_eq!(reloaded.next_instant, second.next_instant);
	}
}
// }}}
