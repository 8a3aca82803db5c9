//! Whole-document JSON persistence.
//!
//! Every persisted record in the bot is a single small JSON document
//! which is read and written in full. A missing or malformed document
//! reads back as [None]: "no prior state" is a perfectly ordinary
//! situation (first run, wiped data dir) and must never surface as an
//! error. Failed writes are logged and swallowed: the in-memory state
//! stays authoritative for the rest of the process lifetime.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::context::Error;
use crate::try_block;

pub fn read_document<T: DeserializeOwned>(path: &Path) -> Option<T> {
	let raw = std::fs::read_to_string(path).ok()?;
	match serde_json::from_str(&raw) {
		Ok(value) => Some(value),
		Err(err) => {
			eprintln!("⚠️ Ignoring malformed document at {path:?}: {err}");
			None
		}
	}
}

pub fn write_document<T: Serialize>(path: &Path, value: &T) {
	let res: Result<(), Error> = try_block! {
		std::fs::write(path, serde_json::to_string_pretty(value)?)?;
	};

	match res {
		Ok(()) => println!("✅ Wrote {path:?}"),
		Err(err) => eprintln!("❗ Failed to write {path:?}: {err:?}"),
	}
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};

	use super::*;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Doc {
		label: String,
		amount: u32,
	}

	#[test]
	fn missing_file_reads_as_no_state() {
		let dir = tempfile::tempdir().unwrap();
		let got: Option<Doc> = read_document(&dir.path().join("nope.json"));
		assert_eq!(got, None);
	}

	#[test]
	fn malformed_document_reads_as_no_state() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("broken.json");
		std::fs::write(&path, "{ not json").unwrap();

		let got: Option<Doc> = read_document(&path);
		assert_eq!(got, None);
	}

	#[test]
	fn documents_survive_a_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("doc.json");
		let doc = Doc {
			label: "next cycle".to_string(),
			amount: 42,
		};

		write_document(&path, &doc);
		assert_eq!(read_document::<Doc>(&path), Some(doc));
	}

	#[test]
	fn writes_replace_the_entire_document() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("doc.json");

		write_document(
			&path,
			&Doc {
				label: "first".to_string(),
				amount: 1,
			},
		);
		write_document(
			&path,
			&Doc {
				label: "second".to_string(),
				amount: 2,
			},
		);

		let got: Doc = read_document(&path).unwrap();
		assert_eq!(got.label, "second");
		assert_eq!(got.amount, 2);
	}
}
