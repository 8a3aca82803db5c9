// {{{ Imports
use crate::bump::countdown::Generations;
use crate::bump::BumpConfig;
use crate::context::paths::HoshifuriPaths;
use crate::gacha::tier::TierEmoji;
// }}}

pub mod paths;
pub mod store;

// {{{ Common types
pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, BotContext, Error>;
// }}}
// {{{ Error handling
#[derive(Debug, Clone, Copy)]
pub enum ErrorKind {
	User,
	Internal,
}

#[derive(Debug)]
pub struct TaggedError {
	pub kind: ErrorKind,
	pub error: Error,
}

impl TaggedError {
	#[inline]
	pub fn new(kind: ErrorKind, error: Error) -> Self {
		Self { kind, error }
	}
}

impl<E: Into<Error>> From<E> for TaggedError {
	fn from(value: E) -> Self {
		Self::new(ErrorKind::Internal, value.into())
	}
}

pub trait TagError {
	fn tag(self, tag: ErrorKind) -> TaggedError;
}

impl TagError for Error {
	fn tag(self, tag: ErrorKind) -> TaggedError {
		TaggedError::new(tag, self)
	}
}

/// Shorthand for building a user-facing [TaggedError] out of a message.
pub fn user_error(message: impl Into<String>) -> TaggedError {
	anyhow::anyhow!(message.into()).tag(ErrorKind::User)
}
// }}}
// {{{ BotContext
/// Custom user data passed to all command functions
#[derive(Clone)]
pub struct BotContext {
	pub paths: HoshifuriPaths,
	pub emoji: TierEmoji,
	pub bump: BumpConfig,

	/// Countdown chains check in here every tick; starting a fresh
	/// cycle bumps the generation and strands every older chain.
	pub countdown_generations: Generations,
}

impl BotContext {
	pub fn new() -> Result<Self, Error> {
		Ok(Self {
			paths: HoshifuriPaths::new()?,
			emoji: TierEmoji::from_env()?,
			bump: BumpConfig::from_env()?,
			countdown_generations: Generations::default(),
		})
	}
}
// }}}
// {{{ Testing helpers
#[cfg(test)]
pub mod testing {
	use super::*;
	use crate::bump::route::ThreadRouter;

	/// A [BotContext] anchored at a throwaway directory, with plain-text
	/// emoji and no thread routing configured.
	pub fn mock_context(dir: &std::path::Path) -> BotContext {
		BotContext {
			paths: HoshifuriPaths::at(dir.to_path_buf()),
			emoji: TierEmoji::text_fallback(),
			bump: BumpConfig {
				main_channel: 1,
				surveil_guild: None,
				router: ThreadRouter::empty(),
			},
			countdown_generations: Generations::default(),
		}
	}
}
// }}}
