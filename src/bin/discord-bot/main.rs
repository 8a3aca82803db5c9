use hoshifuri::commands;
use hoshifuri::context::{BotContext, Error};
use hoshifuri::timed;
use poise::serenity_prelude::{self as serenity};
use std::env::var;

// {{{ Error handler
async fn on_error(error: poise::FrameworkError<'_, BotContext, Error>) {
	if let Err(e) = poise::builtins::on_error(error).await {
		println!("Error while handling error: {}", e)
	}
}
// }}}
// {{{ Event handler
async fn event_handler(
	ctx: &serenity::Context,
	event: &serenity::FullEvent,
	_framework: poise::FrameworkContext<'_, BotContext, Error>,
	data: &BotContext,
) -> Result<(), Error> {
	if let serenity::FullEvent::Message { new_message } = event {
		commands::bump::on_message(ctx, data, new_message).await?;
	}

	Ok(())
}
// }}}

#[tokio::main]
async fn main() {
	// {{{ Poise options
	let options = poise::FrameworkOptions {
		commands: vec![
			commands::help(),
			commands::gacha::gacha(),
			commands::bump::nextbump(),
		],
		event_handler: |ctx, event, framework, data| {
			Box::pin(event_handler(ctx, event, framework, data))
		},
		on_error: |error| Box::pin(on_error(error)),
		..Default::default()
	};
	// }}}
	// {{{ Start poise
	let framework = poise::Framework::builder()
		.setup(move |ctx, _ready, framework| {
			Box::pin(async move {
				println!("Logged in as {}", _ready.user.name);
				poise::builtins::register_globally(ctx, &framework.options().commands).await?;

				let data = timed!("create_context", { BotContext::new()? });
				commands::bump::resume_on_startup(ctx, &data).await?;

				Ok(data)
			})
		})
		.options(options)
		.build();

	let token = var("HOSHIFURI_DISCORD_TOKEN").expect("Missing `HOSHIFURI_DISCORD_TOKEN` env var");
	let intents =
		serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

	let client = serenity::ClientBuilder::new(token, intents)
		.framework(framework)
		.await;

	client.unwrap().start().await.unwrap()
	// }}}
}
