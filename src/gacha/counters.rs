// {{{ Imports
use std::path::PathBuf;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::context::paths::HoshifuriPaths;
use crate::context::store;
use crate::gacha::draw::Tally;
use crate::time::jst;
// }}}

// {{{ Counters
/// Lifetime bump-gacha totals for one calendar year (JST).
///
/// `count` is the number of bump triggers so far this year and drives
/// the milestone rules; the per-tier totals feed the cumulative summary
/// posted after every bump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GachaCounters {
	pub count: u64,
	pub common_total: u64,
	pub rare_total: u64,
	pub standard_epic_total: u64,
	pub featured_epic_total: u64,
}

impl GachaCounters {
	pub fn record_session(&mut self, tally: &Tally) {
		self.common_total += u64::from(tally.common);
		self.rare_total += u64::from(tally.rare);
		self.standard_epic_total += u64::from(tally.standard_epic);
		self.featured_epic_total += u64::from(tally.featured_epic);
	}
}
// }}}
// {{{ Store
/// Persistence for one year's counters. The year is baked into the
/// file name, so the epoch rollover needs no migration: a fresh year
/// simply has no document yet.
pub struct CounterStore {
	path: PathBuf,
}

impl CounterStore {
	pub fn for_year(paths: &HoshifuriPaths, year: i32) -> Self {
		Self {
			path: paths.gacha_counters_path(year),
		}
	}

	/// The store for the year `now` falls in, JST.
	pub fn at(paths: &HoshifuriPaths, now: DateTime<Utc>) -> Self {
		Self::for_year(paths, now.with_timezone(&jst()).year())
	}

	pub fn load(&self) -> Option<GachaCounters> {
		store::read_document(&self.path)
	}

	/// Loads this year's counters, also reporting whether the yearly
	/// epoch just rolled over (no document for the year yet) so the
	/// caller can post the continuation message.
	pub fn load_or_reset(&self) -> (GachaCounters, bool) {
		let rolled_over = !self.path.exists();
		(self.load().unwrap_or_default(), rolled_over)
	}

	pub fn save(&self, counters: &GachaCounters) {
		store::write_document(&self.path, counters);
	}
}
// }}}

// }}}
