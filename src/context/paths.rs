//! This module provides helpers for working with environment
//! variables and paths, together with a struct
//! that keeps track of all the runtime-relevant paths.

use anyhow::Context;
use std::{path::PathBuf, str::FromStr};

/// Wrapper around [std::env::var] which adds [anyhow] context around errors.
pub fn get_var(name: &str) -> anyhow::Result<String> {
	std::env::var(name).with_context(|| format!("Missing ${name} environment variable"))
}

/// Reads an environment variable containing a directory path,
/// creating the directory if it doesn't exist.
pub fn get_env_dir_path(name: &str, default_to: Option<&str>) -> anyhow::Result<PathBuf> {
	let var = get_var(name);
	let var = match default_to {
		None => var?,
		Some(other) => var.or(get_var(other))?,
	};

	let path = PathBuf::from_str(&var).with_context(|| format!("${name} is not a valid path"))?;

	if !path.exists() {
		std::fs::create_dir_all(&path).with_context(|| format!("Could not create ${name}"))?;
	}

	Ok(path)
}

#[derive(Clone, Debug)]
pub struct HoshifuriPaths {
	/// This directory holds the bot's persisted records: the bump
	/// cycle document and the per-year gacha counter documents.
	data_dir: PathBuf,
}

impl HoshifuriPaths {
	/// Gets all the standard paths from the environment,
	/// creating every involved directory in the process.
	pub fn new() -> anyhow::Result<Self> {
		let res = Self {
			data_dir: get_env_dir_path("HOSHIFURI_DATA_DIR", Some("STATE_DIRECTORY"))?,
		};

		Ok(res)
	}

	/// Anchors the path set at an explicit directory instead of the
	/// environment. Used by tests and the offline tooling.
	pub fn at(data_dir: PathBuf) -> Self {
		Self { data_dir }
	}

	pub fn data_dir(&self) -> &PathBuf {
		&self.data_dir
	}

	pub fn bump_cycle_path(&self) -> PathBuf {
		self.data_dir.join("bump_cycle.json")
	}

	pub fn gacha_counters_path(&self, year: i32) -> PathBuf {
		self.data_dir.join(format!("gacha_counters_{year}.json"))
	}
}
