//! Exact odds of a given session spread, same math the bot quotes
//! after every 10-pull.

use anyhow::bail;
use hoshifuri::context::Error;
use hoshifuri::gacha::draw::Tally;
use hoshifuri::gacha::probability::{format_percent, session_probability};
use hoshifuri::gacha::tier::Tier;

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum FinalTier {
	Common,
	Rare,
	StandardEpic,
	FeaturedEpic,
}

impl From<FinalTier> for Tier {
	fn from(value: FinalTier) -> Self {
		match value {
			FinalTier::Common => Tier::Common,
			FinalTier::Rare => Tier::Rare,
			FinalTier::StandardEpic => Tier::StandardEpic,
			FinalTier::FeaturedEpic => Tier::FeaturedEpic,
		}
	}
}

#[derive(clap::Args)]
pub struct Args {
	/// Commons among the first nine draws.
	#[arg(long, default_value_t = 0)]
	common: u32,

	/// Rares among the first nine draws.
	#[arg(long, default_value_t = 0)]
	rare: u32,

	/// Standard epics among the first nine draws.
	#[arg(long, default_value_t = 0)]
	standard_epic: u32,

	/// Featured epics among the first nine draws.
	#[arg(long, default_value_t = 0)]
	featured_epic: u32,

	/// What the tenth draw landed on.
	#[arg(long, value_enum)]
	last: FinalTier,
}

pub fn run(args: Args) -> Result<(), Error> {
	let first_nine = Tally {
		common: args.common,
		rare: args.rare,
		standard_epic: args.standard_epic,
		featured_epic: args.featured_epic,
	};

	if first_nine.total() != 9 {
		bail!(
			"the first-nine breakdown must sum to 9 draws, got {}",
			first_nine.total()
		);
	}

	let guarantee_active = first_nine.common == 9;
	let probability = session_probability(first_nine, args.last.into(), guarantee_active);

	if guarantee_active {
		println!("guarantee active: nine commons force a rare-or-better finish");
	}
	println!("{}%", format_percent(probability));

	Ok(())
}
