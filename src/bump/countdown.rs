//! The self-rescheduling bump countdown.
//!
//! A countdown is a chain of one-shot timers rather than a fixed-rate
//! ticker: each tick computes how long until the next display-worthy
//! instant and sleeps exactly that long, so the shown value always
//! lands on round numbers. The chain ends by announcing that bumping
//! is available again and tearing its display message down.

// {{{ Imports
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::bump::record::CycleStore;
use crate::context::Error;
// }}}

// {{{ Tick policy
/// Seconds between display refreshes for a given remaining time.
///
/// The display refreshes fast right after a bump (the minute counter is
/// visibly moving) and right before the deadline, and coasts at a lazy
/// five seconds through the long middle stretch.
pub fn tick_interval(seconds_left: i64) -> i64 {
	if seconds_left > 7140 {
		2
	} else if seconds_left > 3600 {
		5
	} else if seconds_left > 60 {
		5
	} else {
		2
	}
}

/// Milliseconds until the next refresh, snapped to the next interval
/// boundary rather than a fixed cadence.
pub fn next_delay_ms(seconds_left: i64) -> u64 {
	let interval = tick_interval(seconds_left);
	let offset = seconds_left % interval;
	(1000 * if offset == 0 { interval } else { offset }) as u64
}
// }}}
// {{{ Remaining-time formatting
/// Human-readable remaining time, dropping units as the value shrinks.
pub fn format_remaining(seconds_left: i64) -> String {
	let h = seconds_left / 3600;
	let m = (seconds_left % 3600) / 60;
	let s = seconds_left % 60;

	if seconds_left > 3600 {
		format!("{h}h {m}m {s}s")
	} else if seconds_left > 60 {
		format!("{m}m {s}s")
	} else {
		format!("{s}s")
	}
}
// }}}
// {{{ Generations
/// Shared counter invalidating superseded countdown chains.
///
/// Starting a cycle hands out a new [Generation]; every chain checks
/// its own generation at the top of each tick and silently stops once a
/// newer cycle exists. This is the only cancellation mechanism; there
/// is no explicit cancel operation.
#[derive(Clone, Debug, Default)]
pub struct Generations(Arc<AtomicU64>);

impl Generations {
	pub fn begin(&self) -> Generation {
		Generation {
			id: self.0.fetch_add(1, Ordering::SeqCst) + 1,
			current: self.0.clone(),
		}
	}
}

#[derive(Debug)]
pub struct Generation {
	current: Arc<AtomicU64>,
	id: u64,
}

impl Generation {
	pub fn is_stale(&self) -> bool {
		self.current.load(Ordering::SeqCst) != self.id
	}
}
// }}}
// {{{ State machine
/// One countdown bound to a target instant.
///
/// The machine itself performs no side effects: [Countdown::tick]
/// reports what the driver should do. Only text the driver confirms via
/// [Countdown::displayed] counts as shown, so a failed display update
/// gets retried on the next tick instead of being skipped as a
/// duplicate.
#[derive(Debug)]
pub struct Countdown {
	target: DateTime<Utc>,
	last_displayed: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct Tick {
	/// New display text, or [None] when the last displayed text already
	/// matches.
	pub render: Option<String>,
	pub expired: bool,
	pub next_delay_ms: u64,
}

impl Countdown {
	pub fn new(target: DateTime<Utc>) -> Self {
		Self {
			target,
			last_displayed: None,
		}
	}

	pub fn tick(&self, now: DateTime<Utc>) -> Tick {
		let remaining_ms = (self.target - now).num_milliseconds().max(0);
		let seconds_left = remaining_ms / 1000;

		let text = format_remaining(seconds_left);
		let render = if self.last_displayed.as_deref() == Some(text.as_str()) {
			None
		} else {
			Some(text)
		};

		Tick {
			render,
			expired: remaining_ms <= 0,
			next_delay_ms: next_delay_ms(seconds_left),
		}
	}

	/// Record a successfully displayed text.
	pub fn displayed(&mut self, text: String) {
		self.last_displayed = Some(text);
	}
}
// }}}
// {{{ Collaborators
/// The externally-owned display a countdown writes through: one message
/// that gets edited in place, and the final ready-announcement.
pub trait CountdownDisplay {
	/// Rewrite the countdown message with a new remaining-time string.
	async fn update(&mut self, remaining: &str) -> Result<(), Error>;

	/// Announce that bumping is available again.
	async fn announce_ready(&mut self) -> Result<(), Error>;

	/// Tear the countdown message down.
	async fn remove(&mut self) -> Result<(), Error>;
}

/// Time, as the driver sees it. Injectable so tests can run a two-hour
/// countdown in microseconds.
pub trait Timer {
	fn now(&self) -> DateTime<Utc>;
	async fn sleep_ms(&mut self, ms: u64);
}

pub struct TokioTimer;

impl Timer for TokioTimer {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}

	async fn sleep_ms(&mut self, ms: u64) {
		tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
	}
}
// }}}
// {{{ Driver
/// Drives one countdown chain from "now" to expiry.
///
/// Display failures are logged and the chain keeps going; the next
/// tick is the retry. The ready-announcement fires at most once per
/// cycle: the persisted `notified` flag is checked before and written
/// only after a successful send, so a restart right at the boundary
/// cannot double-announce.
pub async fn run_countdown(
	display: &mut impl CountdownDisplay,
	timer: &mut impl Timer,
	store: &CycleStore,
	target: DateTime<Utc>,
	generation: Generation,
) -> Result<(), Error> {
	let mut countdown = Countdown::new(target);

	loop {
		if generation.is_stale() {
			println!("⏱ Countdown superseded by a newer cycle, stopping");
			return Ok(());
		}

		let tick = countdown.tick(timer.now());

		if let Some(text) = tick.render {
			match display.update(&text).await {
				Ok(()) => countdown.displayed(text),
				Err(err) => {
					eprintln!("⚠️ Failed to update the countdown display: {err:?}")
				}
			}
		}

		if tick.expired {
			let already_notified = store.load().map_or(false, |record| record.notified);
			if !already_notified {
				match display.announce_ready().await {
					Ok(()) => store.mark_notified(),
					Err(err) => {
						eprintln!("❗ Failed to send the bump-ready announcement: {err:?}")
					}
				}
			}

			if let Err(err) = display.remove().await {
				eprintln!("⚠️ Failed to remove the countdown display: {err:?}");
			}

			return Ok(());
		}

		timer.sleep_ms(tick.next_delay_ms).await;
	}
}
// }}}

// {{{ Tests
#[cfg(test)]
mod tests {
	use chrono::Duration;

	use super::*;
	use crate::bump::record::CycleRecord;
	use crate::context::paths::HoshifuriPaths;

	// {{{ Mocks
	#[derive(Default)]
	struct MockDisplay {
		updates: Vec<String>,
		announcements: u32,
		removals: u32,
		fail_updates: bool,
	}

	impl CountdownDisplay for MockDisplay {
		async fn update(&mut self, remaining: &str) -> Result<(), Error> {
			if self.fail_updates {
				anyhow::bail!("display unreachable");
			}
			self.updates.push(remaining.to_string());
			Ok(())
		}

		async fn announce_ready(&mut self) -> Result<(), Error> {
			self.announcements += 1;
			Ok(())
		}

		async fn remove(&mut self) -> Result<(), Error> {
			self.removals += 1;
			Ok(())
		}
	}

	/// A clock that jumps forward instantly instead of sleeping.
	struct MockTimer {
		now: DateTime<Utc>,
		slept_ms: Vec<u64>,
	}

	impl MockTimer {
		fn starting_at(now: DateTime<Utc>) -> Self {
			Self {
				now,
				slept_ms: Vec::new(),
			}
		}
	}

	impl Timer for MockTimer {
		fn now(&self) -> DateTime<Utc> {
			self.now
		}

		async fn sleep_ms(&mut self, ms: u64) {
			self.slept_ms.push(ms);
			self.now += Duration::milliseconds(ms as i64);
		}
	}

	fn t0() -> DateTime<Utc> {
		"2026-03-01T12:00:00Z".parse().unwrap()
	}

	fn store(dir: &tempfile::TempDir) -> CycleStore {
		CycleStore::new(&HoshifuriPaths::at(dir.path().to_path_buf()))
	}
	// }}}
	// {{{ Tick policy
	#[test]
	fn intervals_follow_the_remaining_time_brackets() {
		assert_eq!(tick_interval(7200), 2);
		assert_eq!(tick_interval(7141), 2);
		assert_eq!(tick_interval(7140), 5);
		assert_eq!(tick_interval(3601), 5);
		assert_eq!(tick_interval(3600), 5);
		assert_eq!(tick_interval(61), 5);
		assert_eq!(tick_interval(60), 2);
		assert_eq!(tick_interval(1), 2);
	}

	#[test]
	fn delays_snap_to_the_next_interval_boundary() {
		// Exactly two hours out: the fast bracket, already on a
		// boundary.
		assert_eq!(next_delay_ms(7200), 2000);
		assert_eq!(next_delay_ms(7201), 1000);
		// Middle stretch, 3 seconds past a five-second boundary.
		assert_eq!(next_delay_ms(3598), 3000);
		assert_eq!(next_delay_ms(3595), 5000);
		// Final minute runs on twos.
		assert_eq!(next_delay_ms(59), 1000);
		assert_eq!(next_delay_ms(58), 2000);
	}
	// }}}
	// {{{ Formatting
	#[test]
	fn formatting_drops_units_as_time_shrinks() {
		assert_eq!(format_remaining(7200), "2h 0m 0s");
		assert_eq!(format_remaining(3661), "1h 1m 1s");
		// The boundary ticks blip to the smaller unit set with the
		// whole-hour/whole-minute carry dropped.
		assert_eq!(format_remaining(3600), "0m 0s");
		assert_eq!(format_remaining(90), "1m 30s");
		assert_eq!(format_remaining(60), "0s");
		assert_eq!(format_remaining(5), "5s");
		assert_eq!(format_remaining(0), "0s");
	}
	// }}}
	// {{{ State machine
	#[test]
	fn identical_renders_are_skipped() {
		let mut countdown = Countdown::new(t0() + Duration::seconds(90));

		let first = countdown.tick(t0());
		assert_eq!(first.render.as_deref(), Some("1m 30s"));
		countdown.displayed(first.render.unwrap());

		// A second tick within the same displayed second changes
		// nothing.
		let second = countdown.tick(t0() + Duration::milliseconds(300));
		assert_eq!(second.render, None);

		let third = countdown.tick(t0() + Duration::seconds(2));
		assert_eq!(third.render.as_deref(), Some("1m 28s"));
	}

	#[test]
	fn unconfirmed_renders_are_retried() {
		// Until the driver confirms the display call went through, the
		// same text keeps being offered.
		let countdown = Countdown::new(t0() + Duration::seconds(90));

		assert_eq!(countdown.tick(t0()).render.as_deref(), Some("1m 30s"));
		assert_eq!(
			countdown
				.tick(t0() + Duration::milliseconds(300))
				.render
				.as_deref(),
			Some("1m 30s")
		);
	}

	#[test]
	fn passing_the_target_expires_the_machine() {
		let mut countdown = Countdown::new(t0() + Duration::seconds(1));

		assert!(!countdown.tick(t0()).expired);
		assert!(countdown.tick(t0() + Duration::seconds(1)).expired);
		assert!(countdown.tick(t0() + Duration::hours(3)).expired);
	}
	// }}}
	// {{{ Driver
	#[tokio::test]
	async fn a_full_chain_updates_then_announces_once() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);
		let target = t0() + Duration::seconds(10);
		store.save(&CycleRecord {
			next_instant: target,
			notified: false,
			guild_id: 77,
		});

		let mut display = MockDisplay::default();
		let mut timer = MockTimer::starting_at(t0());
		let generations = Generations::default();

		run_countdown(
			&mut display,
			&mut timer,
			&store,
			target,
			generations.begin(),
		)
		.await
		.unwrap();

		assert_eq!(display.first_update(), "10s");
		assert_eq!(display.updates.last().map(String::as_str), Some("0s"));
		assert_eq!(display.announcements, 1);
		assert_eq!(display.removals, 1);
		assert!(store.load().unwrap().notified);

		// Ten seconds out, the chain runs on two-second boundaries.
		assert_eq!(timer.slept_ms, vec![2000, 2000, 2000, 2000, 2000]);
	}

	#[tokio::test]
	async fn resuming_half_an_hour_out_does_not_announce_early() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);
		let target = t0() + Duration::minutes(30);
		store.save(&CycleRecord {
			next_instant: target,
			notified: false,
			guild_id: 77,
		});

		let mut display = MockDisplay::default();
		let mut timer = MockTimer::starting_at(t0());
		let generations = Generations::default();

		run_countdown(
			&mut display,
			&mut timer,
			&store,
			target,
			generations.begin(),
		)
		.await
		.unwrap();

		// The chain ran its full half hour before announcing.
		assert_eq!(display.first_update(), "30m 0s");
		assert_eq!(display.announcements, 1);
		let total_slept: u64 = timer.slept_ms.iter().sum();
		assert_eq!(total_slept, 30 * 60 * 1000);
	}

	#[tokio::test]
	async fn an_already_notified_cycle_only_tears_down() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);
		store.save(&CycleRecord {
			next_instant: t0(),
			notified: true,
			guild_id: 77,
		});

		let mut display = MockDisplay::default();
		let mut timer = MockTimer::starting_at(t0());
		let generations = Generations::default();

		run_countdown(&mut display, &mut timer, &store, t0(), generations.begin())
			.await
			.unwrap();

		assert_eq!(display.announcements, 0);
		assert_eq!(display.removals, 1);
	}

	#[tokio::test]
	async fn superseded_chains_stop_without_touching_the_display() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);

		let generations = Generations::default();
		let stale = generations.begin();
		let _current = generations.begin();

		let mut display = MockDisplay::default();
		let mut timer = MockTimer::starting_at(t0());

		run_countdown(
			&mut display,
			&mut timer,
			&store,
			t0() + Duration::hours(2),
			stale,
		)
		.await
		.unwrap();

		assert!(display.updates.is_empty());
		assert_eq!(display.announcements, 0);
		assert_eq!(display.removals, 0);
	}

	#[tokio::test]
	async fn display_failures_do_not_kill_the_chain() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);
		let target = t0() + Duration::seconds(4);
		store.save(&CycleRecord {
			next_instant: target,
			notified: false,
			guild_id: 77,
		});

		let mut display = MockDisplay {
			fail_updates: true,
			..Default::default()
		};
		let mut timer = MockTimer::starting_at(t0());
		let generations = Generations::default();

		run_countdown(
			&mut display,
			&mut timer,
			&store,
			target,
			generations.begin(),
		)
		.await
		.unwrap();

		// Every update failed, yet the chain still reached expiry and
		// announced.
		assert!(display.updates.is_empty());
		assert_eq!(display.announcements, 1);
	}
	// }}}

	impl MockDisplay {
		fn first_update(&self) -> &str {
			self.updates.first().map(String::as_str).unwrap_or("")
		}
	}
}
// }}}
