use clap::Parser;
use command::{Cli, Command};
use hoshifuri::context::Error;

mod command;
mod commands;

fn main() -> Result<(), Error> {
	let cli = Cli::parse();
	match cli.command {
		Command::Simulate(args) => {
			commands::simulate::run(args)?;
		}
		Command::Probability(args) => {
			commands::probability::run(args)?;
		}
	}

	Ok(())
}
