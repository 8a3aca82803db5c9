#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
	Simulate(crate::commands::simulate::Args),
	Probability(crate::commands::probability::Args),
}
