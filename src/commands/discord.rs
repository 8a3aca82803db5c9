// {{{ Imports
use poise::serenity_prelude::{CreateEmbed, EditMessage, Message};
use poise::CreateReply;

use crate::context::{BotContext, Error, ErrorKind, TaggedError};
// }}}

// {{{ Trait
/// The slice of the chat platform a command implementation needs.
///
/// Command bodies are generic over this, so tests can run them against
/// [mock::MockContext] without a gateway connection.
pub trait MessageContext {
	/// Get the user context held by the message
	fn data(&self) -> &BotContext;
	fn author_id(&self) -> u64;

	/// Reply to the current message
	async fn reply(&mut self, text: &str) -> Result<(), Error>;

	/// Deliver a free-standing follow-up message.
	async fn followup(&mut self, text: &str) -> Result<(), Error>;

	// {{{ Editable embeds
	type MessageRef;

	/// Reply with an embed, returning a reference the embed can later
	/// be edited through.
	async fn reply_embed(&mut self, embed: CreateEmbed) -> Result<Self::MessageRef, Error>;

	async fn edit_embed(
		&mut self,
		message: &mut Self::MessageRef,
		embed: CreateEmbed,
	) -> Result<(), Error>;
	// }}}

	/// Replies with user-facing errors, propagating internal ones.
	async fn handle_error<T>(&mut self, result: Result<T, TaggedError>) -> Result<Option<T>, Error> {
		match result {
			Ok(value) => Ok(Some(value)),
			Err(tagged) => match tagged.kind {
				ErrorKind::User => {
					self.reply(&tagged.error.to_string()).await?;
					Ok(None)
				}
				ErrorKind::Internal => Err(tagged.error),
			},
		}
	}
}
// }}}
// {{{ Poise implementation
impl<'a> MessageContext for poise::Context<'a, BotContext, Error> {
	type MessageRef = Message;

	fn data(&self) -> &BotContext {
		Self::data(*self)
	}

	fn author_id(&self) -> u64 {
		self.author().id.get()
	}

	async fn reply(&mut self, text: &str) -> Result<(), Error> {
		Self::reply(*self, text).await?;
		Ok(())
	}

	async fn followup(&mut self, text: &str) -> Result<(), Error> {
		Self::say(*self, text).await?;
		Ok(())
	}

	async fn reply_embed(&mut self, embed: CreateEmbed) -> Result<Self::MessageRef, Error> {
		let handle = Self::send(*self, CreateReply::default().embed(embed)).await?;
		Ok(handle.into_message().await?)
	}

	async fn edit_embed(
		&mut self,
		message: &mut Self::MessageRef,
		embed: CreateEmbed,
	) -> Result<(), Error> {
		message
			.edit(self.http(), EditMessage::new().embed(embed))
			.await?;
		Ok(())
	}
}
// }}}
// {{{ Testing context
pub mod mock {
	use super::*;

	/// Records everything a command tried to send.
	pub struct MockContext {
		pub user_id: u64,
		pub data: BotContext,
		pub messages: Vec<String>,
	}

	impl MockContext {
		pub fn new(data: BotContext) -> Self {
			Self {
				data,
				user_id: 666,
				messages: vec![],
			}
		}
	}

	impl MessageContext for MockContext {
		type MessageRef = usize;

		fn author_id(&self) -> u64 {
			self.user_id
		}

		fn data(&self) -> &BotContext {
			&self.data
		}

		async fn reply(&mut self, text: &str) -> Result<(), Error> {
			self.messages.push(text.to_string());
			Ok(())
		}

		async fn followup(&mut self, text: &str) -> Result<(), Error> {
			self.messages.push(text.to_string());
			Ok(())
		}

		async fn reply_embed(&mut self, embed: CreateEmbed) -> Result<Self::MessageRef, Error> {
			self.messages.push(serde_json::to_string(&embed)?);
			Ok(self.messages.len() - 1)
		}

		async fn edit_embed(
			&mut self,
			message: &mut Self::MessageRef,
			embed: CreateEmbed,
		) -> Result<(), Error> {
			self.messages[*message] = serde_json::to_string(&embed)?;
			Ok(())
		}
	}
}
// }}}
