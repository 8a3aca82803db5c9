// {{{ Imports
use rand::Rng;

use crate::gacha::tier::{Tier, ODDS};
// }}}

// {{{ Tally
/// Per-tier counts for one draw session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
	pub common: u32,
	pub rare: u32,
	pub standard_epic: u32,
	pub featured_epic: u32,
}

impl Tally {
	pub fn add(&mut self, tier: Tier) {
		match tier {
			Tier::Common => self.common += 1,
			Tier::Rare => self.rare += 1,
			Tier::StandardEpic => self.standard_epic += 1,
			Tier::FeaturedEpic => self.featured_epic += 1,
		}
	}

	pub fn get(&self, tier: Tier) -> u32 {
		match tier {
			Tier::Common => self.common,
			Tier::Rare => self.rare,
			Tier::StandardEpic => self.standard_epic,
			Tier::FeaturedEpic => self.featured_epic,
		}
	}

	pub fn total(&self) -> u32 {
		self.common + self.rare + self.standard_epic + self.featured_epic
	}

	pub fn from_sequence(sequence: &[Tier]) -> Self {
		let mut tally = Self::default();
		for tier in sequence {
			tally.add(*tier);
		}
		tally
	}
}
// }}}
// {{{ Session shape
/// How many draws a single trigger produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLength {
	Single,
	Nine,
	Ten,
}

impl SessionLength {
	pub fn draws(self) -> usize {
		match self {
			SessionLength::Single => 1,
			SessionLength::Nine => 9,
			SessionLength::Ten => 10,
		}
	}
}

/// Milestone overrides for the session's final draw, evaluated by the
/// caller from the lifetime bump counter. A milestone takes precedence
/// over the all-common guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalDrawRule {
	Ordinary,
	/// Every 10th (but not 20th) bump: an epic of some kind, split
	/// 98.8% standard / 1.2% featured.
	GuaranteedEpic,
	/// Every 20th bump: a featured epic, no sampling involved.
	GuaranteedFeatured,
}

impl FinalDrawRule {
	pub fn from_lifetime_count(count: u64) -> Self {
		if count % 20 == 0 {
			FinalDrawRule::GuaranteedFeatured
		} else if count % 10 == 0 {
			FinalDrawRule::GuaranteedEpic
		} else {
			FinalDrawRule::Ordinary
		}
	}
}

/// Everything one trigger produced. Immutable once returned.
#[derive(Debug, Clone)]
pub struct SessionResult {
	pub tally: Tally,
	/// One tier per draw, in draw order.
	pub sequence: Vec<Tier>,
	/// The tier of the session's last draw. The probability calculation
	/// treats that slot differently from the rest, so it is carried
	/// explicitly.
	pub final_draw: Tier,
	/// Whether the all-common guarantee actually rerouted the last draw.
	pub guarantee_triggered: bool,
}

impl SessionResult {
	/// Tally of every draw before the final one.
	pub fn before_final(&self) -> Tally {
		Tally::from_sequence(&self.sequence[..self.sequence.len() - 1])
	}
}
// }}}
// {{{ Drawing
/// One uniform sample over `[0, 100)`, the scale the odds table is
/// written in.
#[inline]
fn sample(rng: &mut impl Rng) -> f64 {
	rng.gen::<f64>() * 100.0
}

/// Draws without any guarantee logic, used for free-form pull counts.
pub fn draw_simple(rng: &mut impl Rng, pulls: usize) -> Vec<Tier> {
	(0..pulls).map(|_| ODDS.classify(sample(rng))).collect()
}

/// Runs one full session under the ordinary final-draw rule.
pub fn draw_session(rng: &mut impl Rng, length: SessionLength) -> SessionResult {
	draw_session_with(rng, length, FinalDrawRule::Ordinary, 0)
}

/// Runs one full session.
///
/// The all-common guarantee only concerns the final draw: when every
/// draw before it landed common (counting `prior_common_streak` draws
/// carried in from outside the session, for single-draw finishes) and
/// no milestone overrides it, the final draw re-samples on the
/// guaranteed branch and cannot land common. Nine-draw sessions have no
/// special final slot.
pub fn draw_session_with(
	rng: &mut impl Rng,
	length: SessionLength,
	rule: FinalDrawRule,
	prior_common_streak: u32,
) -> SessionResult {
	let draws = length.draws();
	let mut sequence = Vec::with_capacity(draws);
	let mut tally = Tally::default();

	for _ in 0..draws - 1 {
		let tier = ODDS.classify(sample(rng));
		tally.add(tier);
		sequence.push(tier);
	}

	let (final_draw, guarantee_triggered) = match rule {
		FinalDrawRule::GuaranteedFeatured => (Tier::FeaturedEpic, false),
		FinalDrawRule::GuaranteedEpic => {
			let tier = if sample(rng) < ODDS.standard_epic_upto {
				Tier::StandardEpic
			} else {
				Tier::FeaturedEpic
			};
			(tier, false)
		}
		FinalDrawRule::Ordinary => {
			let streak_complete = tally.common + prior_common_streak >= 9;
			let pity =
				streak_complete && matches!(length, SessionLength::Ten | SessionLength::Single);

			if pity {
				(ODDS.classify_guaranteed(sample(rng)), true)
			} else {
				(ODDS.classify(sample(rng)), false)
			}
		}
	};

	tally.add(final_draw);
	sequence.push(final_draw);

	SessionResult {
		tally,
		sequence,
		final_draw,
		guarantee_triggered,
	}
}
// }}}

// }}}
