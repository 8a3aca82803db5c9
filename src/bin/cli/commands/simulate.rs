//! Batch-runs draw sessions offline, for eyeballing whether the
//! empirical rates track the odds table.

use hoshifuri::context::Error;
use hoshifuri::gacha::draw::{self, SessionLength, Tally};
use hoshifuri::gacha::tier::{Tier, ODDS};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(clap::Args)]
pub struct Args {
	/// How many 10-draw sessions to run.
	#[arg(long, default_value_t = 10_000)]
	sessions: u64,

	/// Seed for reproducible runs; omit for a random one.
	#[arg(long)]
	seed: Option<u64>,
}

pub fn run(args: Args) -> Result<(), Error> {
	let mut rng = match args.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_entropy(),
	};

	let mut totals = Tally::default();
	let mut guarantees = 0u64;
	for _ in 0..args.sessions {
		let session = draw::draw_session(&mut rng, SessionLength::Ten);
		for tier in &session.sequence {
			totals.add(*tier);
		}
		if session.guarantee_triggered {
			guarantees += 1;
		}
	}

	let draws = args.sessions * 10;
	println!("{} sessions ({draws} draws)", args.sessions);
	for tier in Tier::ALL {
		let count = totals.get(tier);
		println!(
			"{tier:?}: {count} ({:.3}% empirical, {:.3}% table)",
			100.0 * f64::from(count) / draws as f64,
			100.0 * ODDS.probability(tier),
		);
	}
	println!(
		"guarantee triggered in {guarantees} sessions ({:.3}% of sessions)",
		100.0 * guarantees as f64 / args.sessions as f64
	);

	Ok(())
}
