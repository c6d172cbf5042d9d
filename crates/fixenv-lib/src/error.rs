//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("parsing error: {0}")]
	Parse(String),
	#[error("explanation request failed: {0}")]
	Explain(#[from] crate::explain::ExplainError),
	#[error("snapshot failed: {0}")]
	Snapshot(#[from] crate::snapshot::SnapshotError),
	#[error("diff error: {0}")]
	Diff(#[from] crate::fix::diff::DiffError),
	/// There are no conflicts in the input so there is nothing to ask about.
	#[error("no conflicts to explain")]
	NothingToExplain,
	/// The explanation was produced for different input than the one being packaged.
	#[error("explanation was generated for input {explained} but the current input is {current}")]
	StaleExplanation {
		explained: crate::analysis::Fingerprint,
		current: crate::analysis::Fingerprint,
	},
	#[error("configuration directory could not be determined")]
	NoConfigDir,
}
