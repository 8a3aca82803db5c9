//! Exact joint probability of a realized 10-draw session.
//!
//! The first nine draws are independent samples over the shared odds
//! table, so their breakdown follows a multinomial distribution. The
//! tenth slot is special: when the first nine all landed common it was
//! drawn on the guaranteed branch, where common is impossible and the
//! other three tiers keep their plain masses.

use crate::gacha::draw::Tally;
use crate::gacha::tier::{Tier, ODDS};

/// Iterative factorial; inputs are bounded by the session length.
fn factorial(n: u32) -> f64 {
	(2..=n).map(f64::from).product()
}

/// Multinomial probability mass of a first-nine breakdown.
fn first_nine_mass(first_nine: Tally) -> f64 {
	debug_assert_eq!(
		first_nine.total(),
		9,
		"a first-nine breakdown must hold exactly nine draws"
	);

	let coefficient = factorial(first_nine.total())
		/ Tier::ALL
			.iter()
			.map(|tier| factorial(first_nine.get(*tier)))
			.product::<f64>();

	let mass: f64 = Tier::ALL
		.iter()
		.map(|tier| ODDS.probability(*tier).powi(first_nine.get(*tier) as i32))
		.product();

	coefficient * mass
}

/// Probability of the observed final draw.
fn final_draw_mass(final_draw: Tier, guarantee_active: bool) -> f64 {
	if guarantee_active && final_draw == Tier::Common {
		// Impossible by construction; reported only on caller bugs.
		return 0.0;
	}

	ODDS.probability(final_draw)
}

/// Joint probability of a whole session: the first-nine breakdown times
/// the final slot.
pub fn session_probability(first_nine: Tally, final_draw: Tier, guarantee_active: bool) -> f64 {
	first_nine_mass(first_nine) * final_draw_mass(final_draw, guarantee_active)
}

/// Fixed 4-decimal percentage rendering. Display fixtures (and the
/// announcement texts users screenshot) rely on this exact precision.
pub fn format_percent(probability: f64) -> String {
	format!("{:.4}", probability * 100.0)
}

// }}}
