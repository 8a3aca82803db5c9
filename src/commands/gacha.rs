// {{{ Imports
use poise::serenity_prelude::{Colour, CreateEmbed, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::context::{user_error, Context, Error, TaggedError};
use crate::gacha::draw::{self, SessionLength, Tally};
use crate::gacha::probability::{format_percent, session_probability};
use crate::gacha::tier::{Tier, TierEmoji};

use super::discord::MessageContext;
// }}}

// {{{ Rendering
/// Draws as emoji in draw order, five to a row like the in-game
/// results screen.
pub fn render_rows(sequence: &[Tier], emoji: &TierEmoji) -> String {
	sequence
		.chunks(5)
		.map(|row| render_row(row, emoji))
		.collect::<Vec<_>>()
		.join("\n")
}

/// A single unbroken row of draws.
pub fn render_row(sequence: &[Tier], emoji: &TierEmoji) -> String {
	sequence
		.iter()
		.map(|tier| emoji.emoji_for(*tier))
		.collect::<Vec<_>>()
		.join(" ")
}

/// Draws grouped by tier, commons first. The bump feed sorts its
/// results instead of keeping draw order.
pub fn render_sorted(tally: &Tally, emoji: &TierEmoji) -> String {
	let mut sequence = Vec::with_capacity(tally.total() as usize);
	for tier in Tier::ALL {
		sequence.extend(std::iter::repeat(tier).take(tally.get(tier) as usize));
	}
	render_rows(&sequence, emoji)
}

fn plural(count: u32) -> &'static str {
	if count == 1 {
		""
	} else {
		"s"
	}
}

/// The "something good happened" lines; empty when no epics dropped.
pub fn epic_summary(tally: &Tally) -> Vec<String> {
	let mut lines = Vec::new();
	if tally.standard_epic > 0 {
		lines.push(format!(
			"{} standard epic{} dropped.",
			tally.standard_epic,
			plural(tally.standard_epic)
		));
	}
	if tally.featured_epic > 0 {
		lines.push(format!(
			"{} featured epic{} dropped!",
			tally.featured_epic,
			plural(tally.featured_epic)
		));
	}
	lines
}

/// The quoted per-tier breakdown block used by the 100-pull recap and
/// the bump lifetime totals.
pub fn breakdown_lines(common: u64, rare: u64, standard_epic: u64, featured_epic: u64) -> String {
	format!(
		"> Common.............{common}\n> Rare...............{rare}\n> Epic (standard)....{standard_epic}\n> Epic (featured)....{featured_epic}"
	)
}

fn odds_line(probability: f64) -> String {
	format!(
		"🎲 The odds of this exact spread are about {}%.",
		format_percent(probability)
	)
}
// }}}
// {{{ Implementation
async fn gacha_impl(
	ctx: &mut impl MessageContext,
	rng: &mut impl Rng,
	pulls: u32,
) -> Result<(), TaggedError> {
	if !(1..=100).contains(&pulls) {
		return Err(user_error("Pick between 1 and 100 pulls."));
	}

	match pulls {
		10 => ten_pull(ctx, rng).await,
		100 => hundred_pull(ctx, rng).await,
		_ => simple_pull(ctx, rng, pulls as usize).await,
	}
}

/// A full session: guarantee rule active, odds line included.
async fn ten_pull(ctx: &mut impl MessageContext, rng: &mut impl Rng) -> Result<(), TaggedError> {
	let emoji = ctx.data().emoji.clone();
	let session = draw::draw_session(rng, SessionLength::Ten);

	ctx.reply(&render_rows(&session.sequence, &emoji)).await?;

	let first_nine = session.before_final();
	let probability =
		session_probability(first_nine, session.final_draw, first_nine.common == 9);

	let mut summary = epic_summary(&session.tally);
	summary.push(odds_line(probability));
	ctx.followup(&summary.join("\n")).await?;

	Ok(())
}

/// Free-form pull counts: no guarantee, no odds line.
async fn simple_pull(
	ctx: &mut impl MessageContext,
	rng: &mut impl Rng,
	pulls: usize,
) -> Result<(), TaggedError> {
	let emoji = ctx.data().emoji.clone();
	let sequence = draw::draw_simple(rng, pulls);
	let tally = Tally::from_sequence(&sequence);

	ctx.reply(&render_rows(&sequence, &emoji)).await?;

	let summary = epic_summary(&tally);
	if !summary.is_empty() {
		ctx.followup(&summary.join("\n")).await?;
	}

	Ok(())
}

/// Ten back-to-back sessions, with a recap embed edited into the
/// initial reply once every row is out.
async fn hundred_pull(
	ctx: &mut impl MessageContext,
	rng: &mut impl Rng,
) -> Result<(), TaggedError> {
	let emoji = ctx.data().emoji.clone();

	let thinking = CreateEmbed::default()
		.title("Pulling 100 times...")
		.colour(Colour::DARK_GREY)
		.timestamp(Timestamp::now());
	let mut message = ctx.reply_embed(thinking).await?;

	let mut total = Tally::default();
	let mut rows = Vec::with_capacity(10);
	for _ in 0..10 {
		let session = draw::draw_session(rng, SessionLength::Ten);
		rows.push(render_row(&session.sequence, &emoji));
		for tier in &session.sequence {
			total.add(*tier);
		}
	}

	for row in &rows {
		ctx.followup(row).await?;
	}

	let recap = CreateEmbed::default()
		.title("Pulled 100 times.")
		.description(breakdown_lines(
			u64::from(total.common),
			u64::from(total.rare),
			u64::from(total.standard_epic),
			u64::from(total.featured_epic),
		))
		.colour(Colour::DARK_GREEN)
		.timestamp(Timestamp::now());
	ctx.edit_embed(&mut message, recap).await?;

	Ok(())
}
// }}}
// {{{ Discord wrapper
/// Simulate gacha pulls against the live banner odds.
#[poise::command(slash_command, prefix_command, user_cooldown = 3)]
pub async fn gacha(
	mut ctx: Context<'_>,
	#[description = "How many pulls (10 runs a full session, 100 runs ten of them)"]
	#[min = 1]
	#[max = 100]
	pulls: u32,
) -> Result<(), Error> {
	let mut rng = StdRng::from_entropy();
	let res = gacha_impl(&mut ctx, &mut rng, pulls).await;
	ctx.handle_error(res).await?;

	Ok(())
}
// }}}

// }}}
