// {{{ Imports
use std::sync::Arc;

use chrono::{DateTime, Utc};
use poise::serenity_prelude::{
	ChannelId, Colour, Context as SerenityContext, CreateEmbed, CreateMessage, EditChannel,
	EditMessage, Http, Message, Timestamp,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bump::countdown::{format_remaining, run_countdown, CountdownDisplay, TokioTimer};
use crate::bump::record::{CycleRecord, CycleStore};
use crate::bump::route;
use crate::context::{user_error, BotContext, Context, Error, TaggedError};
use crate::gacha::counters::CounterStore;
use crate::gacha::draw::{self, FinalDrawRule, SessionLength};
use crate::gacha::probability::{format_percent, session_probability};
use crate::time::jst;

use super::discord::MessageContext;
use super::gacha::{breakdown_lines, epic_summary, render_sorted};
// }}}

// {{{ Detection
/// The listing service's application id; bump confirmations come from
/// this account.
pub const DISBOARD_USER_ID: u64 = 302_050_872_383_242_240;

/// Success phrases across every locale the listing service replies in.
const BUMP_SUCCESS_PHRASES: [&str; 8] = [
	"表示順をアップしたよ",
	"Bump done",
	"Bump effectué",
	"Bump fatto",
	"Podbito serwer",
	"Успешно поднято",
	"갱신했어",
	"Patlatma tamamlandı",
];

pub fn is_bump_success(author_id: u64, embed_description: &str) -> bool {
	author_id == DISBOARD_USER_ID
		&& BUMP_SUCCESS_PHRASES
			.iter()
			.any(|phrase| embed_description.contains(phrase))
}
// }}}
// {{{ Channel renaming
/// Names the watched channel toggles between as the cycle progresses.
const RESTING_CHANNEL_NAME: &str = "🕹｜commands";
const READY_CHANNEL_NAME: &str = "🕹｜bump-me";

/// Channels that support renaming. An explicit capability rather than
/// probing the collaborator for methods at runtime.
pub trait RenameChannel {
	async fn rename(&self, name: &str) -> Result<(), Error>;
}

pub struct BotChannel {
	pub http: Arc<Http>,
	pub id: ChannelId,
}

impl RenameChannel for BotChannel {
	async fn rename(&self, name: &str) -> Result<(), Error> {
		self.id
			.edit(&self.http, EditChannel::new().name(name))
			.await?;
		Ok(())
	}
}

/// Renames are cosmetic; failures get logged and life goes on.
async fn rename_quietly(channel: &impl RenameChannel, name: &str) {
	match channel.rename(name).await {
		Ok(()) => println!("✅ Renamed channel to {name:?}"),
		Err(err) => eprintln!("⚠️ Could not rename channel to {name:?}: {err:?}"),
	}
}
// }}}
// {{{ Countdown display
/// The serenity-backed countdown display: one embed in the main bump
/// channel, created on the first tick and edited in place afterwards.
///
/// Creating lazily means the resume-after-restart path needs no special
/// handling: it simply starts without a pre-existing message.
pub struct DiscordCountdownDisplay {
	http: Arc<Http>,
	channel: ChannelId,
	message: Option<Message>,
	title: String,
	target: DateTime<Utc>,
	guild_id: u64,
	/// Resolved once at creation: the routed thread the body links to
	/// and the ready-announcement goes to.
	thread: Option<u64>,
}

impl DiscordCountdownDisplay {
	pub async fn resolve(
		http: Arc<Http>,
		data: &BotContext,
		record: &CycleRecord,
		title: String,
	) -> Self {
		let holiday = route::is_holiday(record.next_instant).await;
		let thread = data.bump.router.target_thread(record.next_instant, holiday);

		Self {
			http,
			channel: ChannelId::new(data.bump.main_channel),
			message: None,
			title,
			target: record.next_instant,
			guild_id: record.guild_id,
			thread,
		}
	}

	fn body(&self, remaining: &str) -> String {
		let local = self.target.with_timezone(&jst());
		let ping_location = match self.thread {
			Some(thread) => format!(
				"[over here](https://discord.com/channels/{}/{})",
				self.guild_id, thread
			),
			None => "right here".to_string(),
		};

		format!(
			"You can bump again at {}.\nI'll post a ping {}.\nTime left: {}",
			local.format("%Y-%m-%d %H:%M:%S"),
			ping_location,
			remaining
		)
	}

	fn countdown_embed(&self, remaining: &str) -> CreateEmbed {
		CreateEmbed::default()
			.title(self.title.clone())
			.description(self.body(remaining))
			.colour(Colour::BLUE)
			.timestamp(Timestamp::now())
	}
}

impl CountdownDisplay for DiscordCountdownDisplay {
	async fn update(&mut self, remaining: &str) -> Result<(), Error> {
		let embed = self.countdown_embed(remaining);
		match &mut self.message {
			Some(message) => {
				message
					.edit(&self.http, EditMessage::new().embed(embed))
					.await?;
			}
			None => {
				let message = self
					.channel
					.send_message(&self.http, CreateMessage::new().embed(embed))
					.await?;
				self.message = Some(message);
			}
		}

		Ok(())
	}

	async fn announce_ready(&mut self) -> Result<(), Error> {
		let target = self.thread.map(ChannelId::new).unwrap_or(self.channel);
		let embed = CreateEmbed::default()
			.title("Bump ready!")
			.description("Use `/bump` to push the server back up the listing.")
			.colour(Colour::DARK_GREEN)
			.timestamp(Timestamp::now());

		target
			.send_message(
				&self.http,
				CreateMessage::new().content("@here").embed(embed),
			)
			.await?;

		rename_quietly(
			&BotChannel {
				http: self.http.clone(),
				id: self.channel,
			},
			READY_CHANNEL_NAME,
		)
		.await;

		Ok(())
	}

	async fn remove(&mut self) -> Result<(), Error> {
		if let Some(message) = self.message.take() {
			message.delete(&self.http).await?;
		}

		Ok(())
	}
}

/// Boots a countdown chain for `record` on a background task.
pub fn start_countdown(http: Arc<Http>, data: &BotContext, record: &CycleRecord, title: String) {
	let generation = data.countdown_generations.begin();
	let store = CycleStore::new(&data.paths);
	let data = data.clone();
	let record = record.clone();

	tokio::spawn(async move {
		let mut display = DiscordCountdownDisplay::resolve(http, &data, &record, title).await;
		let mut timer = TokioTimer;

		if let Err(err) = run_countdown(
			&mut display,
			&mut timer,
			&store,
			record.next_instant,
			generation,
		)
		.await
		{
			eprintln!("❗ Countdown chain died: {err:?}");
		}
	});
}
// }}}
// {{{ Bump success flow
/// Watches the message stream for the listing service's confirmation.
pub async fn on_message(
	ctx: &SerenityContext,
	data: &BotContext,
	message: &Message,
) -> Result<(), Error> {
	if let Some(required) = data.bump.surveil_guild {
		if message.guild_id.map(|id| id.get()) != Some(required) {
			return Ok(());
		}
	}

	let Some(description) = message
		.embeds
		.first()
		.and_then(|embed| embed.description.as_deref())
	else {
		return Ok(());
	};

	if !is_bump_success(message.author.id.get(), description) {
		return Ok(());
	}

	println!("✅ Bump confirmation detected");
	on_bump_success(ctx, data, message).await
}

async fn on_bump_success(
	ctx: &SerenityContext,
	data: &BotContext,
	message: &Message,
) -> Result<(), Error> {
	let now = Utc::now();
	let guild_id = message.guild_id.map(|id| id.get()).unwrap_or_default();

	// Fix the deadline and persist it before anything here can fail.
	let record = CycleRecord::begin(now, guild_id);
	CycleStore::new(&data.paths).save(&record);

	rename_quietly(
		&BotChannel {
			http: ctx.http.clone(),
			id: message.channel_id,
		},
		RESTING_CHANNEL_NAME,
	)
	.await;

	let title = if message.channel_id.get() == data.bump.main_channel {
		"Thanks for the bump!"
	} else {
		"The server got bumped!"
	};
	start_countdown(ctx.http.clone(), data, &record, title.to_string());

	run_bump_gacha(ctx, data, now).await
}

/// The reward half of a bump: counter milestone check, a 10-draw
/// session, its odds, and the running totals post.
async fn run_bump_gacha(
	ctx: &SerenityContext,
	data: &BotContext,
	now: DateTime<Utc>,
) -> Result<(), Error> {
	let channel = ChannelId::new(data.bump.main_channel);
	let counter_store = CounterStore::at(&data.paths, now);

	let (mut counters, rolled_over) = counter_store.load_or_reset();
	if rolled_over {
		channel
			.say(
				&ctx.http,
				"Happy new year! The bump gacha counter starts fresh from here.",
			)
			.await?;
	}

	counters.count += 1;
	let rule = FinalDrawRule::from_lifetime_count(counters.count);
	counter_store.save(&counters);

	let header = format!("Bump gacha #{}", counters.count);
	let header = match rule {
		FinalDrawRule::GuaranteedFeatured => format!("{header}\nA featured epic is guaranteed!"),
		FinalDrawRule::GuaranteedEpic => {
			format!("{header}\nAn epic is guaranteed! (98.8% standard / 1.2% featured)")
		}
		FinalDrawRule::Ordinary => header,
	};
	channel.say(&ctx.http, header).await?;

	let mut rng = StdRng::from_entropy();
	let session = draw::draw_session_with(&mut rng, SessionLength::Ten, rule, 0);

	channel
		.say(&ctx.http, render_sorted(&session.tally, &data.emoji))
		.await?;

	let first_nine = session.before_final();
	let probability =
		session_probability(first_nine, session.final_draw, first_nine.common == 9);
	let mut summary = epic_summary(&session.tally);
	summary.push(format!(
		"🎲 The odds of this exact spread are about {}%.",
		format_percent(probability)
	));
	channel.say(&ctx.http, summary.join("\n")).await?;

	counters.record_session(&session.tally);
	counter_store.save(&counters);

	channel
		.say(
			&ctx.http,
			format!(
				"Bump gacha lifetime totals\n{}",
				breakdown_lines(
					counters.common_total,
					counters.rare_total,
					counters.standard_epic_total,
					counters.featured_epic_total,
				)
			),
		)
		.await?;

	Ok(())
}
// }}}
// {{{ Startup resume
/// Rehydrates an in-flight cycle after a restart: a future deadline
/// resumes its countdown (with a freshly created display), a missed one
/// goes straight to the announcement path.
pub async fn resume_on_startup(ctx: &SerenityContext, data: &BotContext) -> Result<(), Error> {
	let store = CycleStore::new(&data.paths);
	let Some(record) = store.load() else {
		println!("✅ No bump cycle to resume");
		return Ok(());
	};

	if record.notified {
		println!("✅ Last bump cycle already announced, nothing to resume");
		return Ok(());
	}

	let now = Utc::now();
	if record.is_due(now) {
		println!("⏰ Persisted bump deadline already passed, announcing now");
		let mut display = DiscordCountdownDisplay::resolve(
			ctx.http.clone(),
			data,
			&record,
			"Next bump".to_string(),
		)
		.await;

		match display.announce_ready().await {
			Ok(()) => store.mark_notified(),
			Err(err) => eprintln!("❗ Failed to send the catch-up announcement: {err:?}"),
		}
	} else {
		let seconds_left = (record.next_instant - now).num_seconds();
		println!("⏳ Resuming bump countdown with {seconds_left}s left");
		start_countdown(ctx.http.clone(), data, &record, "Next bump".to_string());
	}

	Ok(())
}
// }}}
// {{{ Nextbump command
// {{{ Implementation
async fn nextbump_impl(
	ctx: &mut impl MessageContext,
	now: DateTime<Utc>,
) -> Result<(), TaggedError> {
	let store = CycleStore::new(&ctx.data().paths);
	let Some(record) = store.load() else {
		return Err(user_error(
			"I haven't seen a bump yet, so there's nothing to wait for.",
		));
	};

	if record.is_due(now) {
		ctx.reply("You can bump right now! Go use `/bump`.").await?;
		return Ok(());
	}

	let seconds_left = (record.next_instant - now).num_seconds();
	let local = record.next_instant.with_timezone(&jst());

	let holiday = route::is_holiday(record.next_instant).await;
	let ping_line = match ctx
		.data()
		.bump
		.router
		.target_thread(record.next_instant, holiday)
	{
		Some(thread) => format!(
			"\nI'll ping [over here](https://discord.com/channels/{}/{}).",
			record.guild_id, thread
		),
		None => String::new(),
	};

	ctx.reply(&format!(
		"Next bump at {}, {} to go.{}",
		local.format("%Y-%m-%d %H:%M:%S"),
		format_remaining(seconds_left),
		ping_line
	))
	.await?;

	Ok(())
}
// }}}
// {{{ Tests
#[cfg(test)]
mod tests {
	use chrono::Duration;

	use super::*;
	use crate::commands::discord::mock::MockContext;
	use crate::context::testing::mock_context;
	use crate::context::ErrorKind;

	fn mock() -> (MockContext, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let ctx = MockContext::new(mock_context(dir.path()));
		(ctx, dir)
	}

	fn t0() -> DateTime<Utc> {
		"2026-03-01T12:00:00Z".parse().unwrap()
	}

	#[tokio::test]
	async fn no_cycle_is_a_user_error() {
		let (mut ctx, _guard) = mock();
		let err = nextbump_impl(&mut ctx, t0()).await.unwrap_err();
		assert!(matches!(err.kind, ErrorKind::User));
	}

	#[tokio::test]
	async fn a_due_cycle_says_bump_now() {
		let (mut ctx, _guard) = mock();
		let mut record = CycleRecord::begin(t0(), 77);
		record.next_instant = t0() - Duration::minutes(1);
		CycleStore::new(&ctx.data.paths).save(&record);

		nextbump_impl(&mut ctx, t0()).await.unwrap();
		assert_eq!(ctx.messages, vec![
			"You can bump right now! Go use `/bump`.".to_string()
		]);
	}

	#[tokio::test]
	async fn a_running_cycle_reports_the_remaining_time() {
		let (mut ctx, _guard) = mock();
		CycleStore::new(&ctx.data.paths).save(&CycleRecord::begin(t0(), 77));

		nextbump_impl(&mut ctx, t0()).await.unwrap();
		assert_eq!(ctx.messages.len(), 1);
		// Two hours of cooldown, shown in JST.
		assert!(ctx.messages[0].contains("2026-03-01 23:00:00"));
		assert!(ctx.messages[0].contains("2h 0m 0s to go."));
	}

	#[test]
	fn detection_requires_both_the_author_and_a_known_phrase() {
		assert!(is_bump_success(DISBOARD_USER_ID, "Bump done! :thumbsup:"));
		assert!(is_bump_success(DISBOARD_USER_ID, "表示順をアップしたよ!"));
		// Right phrase, wrong author.
		assert!(!is_bump_success(12345, "Bump done"));
		// Right author, unrelated message.
		assert!(!is_bump_success(DISBOARD_USER_ID, "Try again later"));
	}
}
// }}}
// {{{ Discord wrapper
/// Show how long until the server can be bumped again.
#[poise::command(slash_command, prefix_command, user_cooldown = 1)]
pub async fn nextbump(mut ctx: Context<'_>) -> Result<(), Error> {
	let res = nextbump_impl(&mut ctx, Utc::now()).await;
	ctx.handle_error(res).await?;

	Ok(())
}
// }}}
// }}}
