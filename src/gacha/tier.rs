use crate::context::paths::get_var;
use crate::context::Error;

// {{{ Tier
/// One of the four mutually exclusive reward rarities a draw can land on,
/// ordered from most to least likely.
///
/// The two epic tiers differ only in whether the reward comes from the
/// current featured banner or from the standard pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
	Common,
	Rare,
	StandardEpic,
	FeaturedEpic,
}

impl Tier {
	pub const ALL: [Tier; 4] = [
		Tier::Common,
		Tier::Rare,
		Tier::StandardEpic,
		Tier::FeaturedEpic,
	];
}
// }}}
// {{{ Odds table
/// Cumulative cut points over a uniform `[0, 100)` sample.
///
/// This table is the single source of truth for the draw odds: the draw
/// engine classifies samples against it, and the probability calculator
/// derives its per-tier masses from the very same boundaries.
#[derive(Debug, Clone, Copy)]
pub struct DrawOdds {
	pub common_upto: f64,
	pub rare_upto: f64,
	pub standard_epic_upto: f64,
}

/// The live odds: 88.5% common, 8.5% rare, 1.8% standard epic,
/// 1.2% featured epic.
pub const ODDS: DrawOdds = DrawOdds {
	common_upto: 88.5,
	rare_upto: 97.0,
	standard_epic_upto: 98.8,
};

impl DrawOdds {
	/// Classify a uniform sample from `[0, 100)`.
	#[inline]
	pub fn classify(&self, sample: f64) -> Tier {
		if sample < self.common_upto {
			Tier::Common
		} else if sample < self.rare_upto {
			Tier::Rare
		} else if sample < self.standard_epic_upto {
			Tier::StandardEpic
		} else {
			Tier::FeaturedEpic
		}
	}

	/// Classify a fresh sample on the guaranteed final draw of an
	/// all-common session.
	///
	/// The branch deliberately reuses the plain cut points on a full
	/// `[0, 100)` sample instead of renormalizing the three remaining
	/// tiers among themselves: everything below the rare boundary counts
	/// as rare, so a common outcome is structurally impossible. This
	/// mirrors the in-game odds exactly and must not be "fixed" into a
	/// conditional distribution.
	#[inline]
	pub fn classify_guaranteed(&self, sample: f64) -> Tier {
		if sample < self.rare_upto {
			Tier::Rare
		} else if sample < self.standard_epic_upto {
			Tier::StandardEpic
		} else {
			Tier::FeaturedEpic
		}
	}

	/// Per-tier probability mass, derived from the shared cut points.
	#[inline]
	pub fn probability(&self, tier: Tier) -> f64 {
		match tier {
			Tier::Common => self.common_upto / 100.0,
			Tier::Rare => (self.rare_upto - self.common_upto) / 100.0,
			Tier::StandardEpic => (self.standard_epic_upto - self.rare_upto) / 100.0,
			Tier::FeaturedEpic => (100.0 - self.standard_epic_upto) / 100.0,
		}
	}
}
// }}}
// {{{ Display assets
/// The emoji a tier renders as. Injected configuration rather than
/// hard-coded literals, since the ids are per-server assets.
///
/// Both epic tiers share one emoji, matching the in-game presentation
/// where the rarity frame looks identical and only the reward differs.
#[derive(Clone, Debug)]
pub struct TierEmoji {
	common: String,
	rare: String,
	epic: String,
}

impl TierEmoji {
	pub fn from_env() -> Result<Self, Error> {
		Ok(Self {
			common: get_var("HOSHIFURI_EMOJI_COMMON")?,
			rare: get_var("HOSHIFURI_EMOJI_RARE")?,
			epic: get_var("HOSHIFURI_EMOJI_EPIC")?,
		})
	}

	/// Plain-text stand-ins for environments without custom emoji
	/// (the CLI, tests).
	pub fn text_fallback() -> Self {
		Self {
			common: "☆2".to_string(),
			rare: "☆3".to_string(),
			epic: "★4".to_string(),
		}
	}

	pub fn emoji_for(&self, tier: Tier) -> &str {
		match tier {
			Tier::Common => &self.common,
			Tier::Rare => &self.rare,
			Tier::StandardEpic | Tier::FeaturedEpic => &self.epic,
		}
	}
}
// }}}

// {{{ Tests
#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classification_matches_the_cut_points() {
		assert_eq!(ODDS.classify(0.0), Tier::Common);
		assert_eq!(ODDS.classify(88.49), Tier::Common);
		assert_eq!(ODDS.classify(88.5), Tier::Rare);
		assert_eq!(ODDS.classify(96.99), Tier::Rare);
		assert_eq!(ODDS.classify(97.0), Tier::StandardEpic);
		assert_eq!(ODDS.classify(98.79), Tier::StandardEpic);
		assert_eq!(ODDS.classify(98.8), Tier::FeaturedEpic);
		assert_eq!(ODDS.classify(99.99), Tier::FeaturedEpic);
	}

	#[test]
	fn guaranteed_branch_cannot_land_common() {
		assert_eq!(ODDS.classify_guaranteed(0.0), Tier::Rare);
		assert_eq!(ODDS.classify_guaranteed(50.0), Tier::Rare);
		assert_eq!(ODDS.classify_guaranteed(96.99), Tier::Rare);
		assert_eq!(ODDS.classify_guaranteed(97.0), Tier::StandardEpic);
		assert_eq!(ODDS.classify_guaranteed(98.8), Tier::FeaturedEpic);
	}

	#[test]
	fn probabilities_sum_to_one() {
		let total: f64 = Tier::ALL.iter().map(|t| ODDS.probability(*t)).sum();
		assert!((total - 1.0).abs() < 1e-12);
	}

	#[test]
	fn probabilities_match_the_published_rates() {
		assert!((ODDS.probability(Tier::Common) - 0.885).abs() < 1e-12);
		assert!((ODDS.probability(Tier::Rare) - 0.085).abs() < 1e-12);
		assert!((ODDS.probability(Tier::StandardEpic) - 0.018).abs() < 1e-12);
		assert!((ODDS.probability(Tier::FeaturedEpic) - 0.012).abs() < 1e-12);
	}
}
// }}}
