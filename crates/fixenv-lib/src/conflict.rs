//! Finding packages pinned to more than one version.

use std::collections::HashMap;

use crate::requirements::Pin;

/// A package seen again with a version different to the one it was last pinned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRecord {
	pub name: String,
	pub first_version: String,
	pub later_version: String,
}

impl ConflictRecord {
	pub fn new(name: impl Into<String>, first_version: impl Into<String>, later_version: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			first_version: first_version.into(),
			later_version: later_version.into(),
		}
	}
}

impl std::fmt::Display for ConflictRecord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {} vs {}", self.name, self.first_version, self.later_version)
	}
}

/// Single left to right pass over `pins`.
///
/// Each pin is compared against the most recent version seen for its name, versions are
/// compared as plain strings. A name with versions `v1, v2, v2, v3` gives two records,
/// `(v1, v2)` and `(v2, v3)`.
pub fn detect<'a>(pins: impl IntoIterator<Item = &'a Pin>) -> Vec<ConflictRecord> {
	let mut seen = HashMap::<&str, &str>::new();
	let mut conflicts = Vec::<ConflictRecord>::new();

	for pin in pins {
		if let Some(previous) = seen.insert(&pin.name, &pin.version) {
			if previous != pin.version {
				log::trace!("Conflict on {}: {} then {}", pin.name, previous, pin.version);
				conflicts.push(ConflictRecord::new(&pin.name, previous, &pin.version));
			}
		}
	}

	conflicts
}

/// Human readable description of each conflict, in order.
pub fn describe(conflicts: &[ConflictRecord]) -> Vec<String> {
	conflicts.iter().map(ToString::to_string).collect()
}
