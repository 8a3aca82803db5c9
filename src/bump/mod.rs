// {{{ Imports
use crate::bump::route::ThreadRouter;
use crate::context::paths::get_var;
use crate::context::Error;
// }}}

pub mod countdown;
pub mod record;
pub mod route;

/// Static wiring for the bump watcher: which guild to watch, where the
/// countdown lives, and how ready-announcements get routed.
#[derive(Clone, Debug)]
pub struct BumpConfig {
	/// The channel the countdown message is posted in.
	pub main_channel: u64,
	/// When set, bump messages from other guilds are ignored.
	pub surveil_guild: Option<u64>,
	pub router: ThreadRouter,
}

impl BumpConfig {
	pub fn from_env() -> Result<Self, Error> {
		Ok(Self {
			main_channel: get_var("HOSHIFURI_BUMP_CHANNEL")?.parse()?,
			surveil_guild: get_var("HOSHIFURI_BUMP_GUILD")
				.ok()
				.map(|raw| raw.parse())
				.transpose()?,
			router: ThreadRouter::from_env(),
		})
	}
}
