//! Picks which thread a bump-ready announcement lands in.
//!
//! The community keeps one announcement thread per rough time-of-day
//! slot, with a separate set for weekends and holidays. Routing is a
//! pure lookup over the target instant's JST hour; only the holiday
//! check talks to the outside world.

// {{{ Imports
use std::collections::HashMap;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use crate::context::paths::get_var;
use crate::context::Error;
use crate::time::jst;
// }}}

// {{{ Time slots
/// Starting hours of the announcement slots. The 18 slot runs four
/// hours to cover the evening rush; 22 picks up the remainder of the
/// night.
pub const SLOT_KEYS: [u32; 8] = [0, 3, 6, 9, 12, 15, 18, 22];

/// The slot a JST hour falls into.
pub fn slot_key(hour: u32) -> u32 {
	match hour {
		0..=2 => 0,
		3..=5 => 3,
		6..=8 => 6,
		9..=11 => 9,
		12..=14 => 12,
		15..=17 => 15,
		18..=21 => 18,
		_ => 22,
	}
}
// }}}
// {{{ Router
/// Slot → thread id maps for ordinary days and for holidays.
///
/// Threads are optional wiring: a missing slot simply routes the
/// announcement back to the main bump channel.
#[derive(Clone, Debug, Default)]
pub struct ThreadRouter {
	weekday: HashMap<u32, u64>,
	holiday: HashMap<u32, u64>,
}

impl ThreadRouter {
	/// Reads the `HOSHIFURI_THREAD_{WEEKDAY,HOLIDAY}_<slot>` variables,
	/// skipping any that are unset.
	pub fn from_env() -> Self {
		let read = |kind: &str| {
			SLOT_KEYS
				.iter()
				.filter_map(|slot| {
					let id = get_var(&format!("HOSHIFURI_THREAD_{kind}_{slot}")).ok()?;
					match id.parse() {
						Ok(id) => Some((*slot, id)),
						Err(_) => {
							eprintln!("⚠️ Ignoring non-numeric thread id for {kind} slot {slot}");
							None
						}
					}
				})
				.collect()
		};

		Self {
			weekday: read("WEEKDAY"),
			holiday: read("HOLIDAY"),
		}
	}

	pub fn empty() -> Self {
		Self::default()
	}

	/// The thread an announcement for `target` belongs in.
	pub fn target_thread(&self, target: DateTime<Utc>, holiday: bool) -> Option<u64> {
		let key = slot_key(target.with_timezone(&jst()).hour());
		let map = if holiday { &self.holiday } else { &self.weekday };
		map.get(&key).copied()
	}
}
// }}}
// {{{ Holiday lookup
async fn fetch_holidays(year: i32) -> Result<HashMap<String, String>, Error> {
	let url = format!("https://holidays-jp.github.io/api/v1/{year}/date.json");
	Ok(reqwest::get(&url).await?.json().await?)
}

/// Whether a date counts as a holiday for routing purposes: a weekend,
/// or a Japanese public holiday according to the holidays-jp dataset.
/// Lookup failures degrade to the weekend-only answer.
pub async fn is_holiday(date: DateTime<Utc>) -> bool {
	let local = date.with_timezone(&jst());
	if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
		return true;
	}

	match fetch_holidays(local.year()).await {
		Ok(holidays) => holidays.contains_key(&local.format("%Y-%m-%d").to_string()),
		Err(err) => {
			eprintln!("⚠️ Holiday lookup failed, assuming an ordinary day: {err:?}");
			false
		}
	}
}
// }}}

// }}}
