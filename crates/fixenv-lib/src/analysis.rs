//! A single pass over some requirements text.
//!
//! [`Analysis`] holds everything derived from one input, the pins, skipped lines and conflicts.
//! Nothing is updated incrementally, edited input means a new `Analysis`.
//!
//! Explanations are tied to the [`Fingerprint`] of the text they were generated for so an
//! explanation can't end up in a snapshot next to different requirements.

use crate::conflict::ConflictRecord;
use crate::requirements::{LineOutcome, Pin, PinLine};

/// sha256 of the raw input text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
	pub fn of(text: &str) -> Self {
		Self(sha256::digest(text.as_bytes()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		/* the full digest is noise in messages */
		write!(f, "{}", &self.0[..std::cmp::min(12, self.0.len())])
	}
}

/// Free text explanation for the conflicts of one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
	fingerprint: Fingerprint,
	text: String,
}

impl Explanation {
	pub fn new(fingerprint: Fingerprint, text: impl Into<String>) -> Self {
		Self { fingerprint, text: text.into() }
	}

	pub fn fingerprint(&self) -> &Fingerprint {
		&self.fingerprint
	}

	pub fn text(&self) -> &str {
		&self.text
	}
}

#[derive(Debug, Clone)]
pub struct Analysis {
	input: String,
	fingerprint: Fingerprint,
	outcomes: Vec<LineOutcome>,
	conflicts: Vec<ConflictRecord>,
}

impl Analysis {
	pub fn new(input: impl Into<String>) -> Self {
		let input = input.into();
		let fingerprint = Fingerprint::of(&input);
		let outcomes = crate::requirements::parse_lines(&input);
		let conflicts = crate::conflict::detect(outcomes.iter().filter_map(LineOutcome::as_pin_line).map(|p| &p.pin));

		log::debug!("Analysed input {}: {} line(s), {} conflict(s)", fingerprint, outcomes.len(), conflicts.len());

		Self {
			input,
			fingerprint,
			outcomes,
			conflicts,
		}
	}

	/* Fields */

	pub fn input(&self) -> &str {
		&self.input
	}

	pub fn fingerprint(&self) -> &Fingerprint {
		&self.fingerprint
	}

	pub fn outcomes(&self) -> &[LineOutcome] {
		&self.outcomes
	}

	pub fn conflicts(&self) -> &[ConflictRecord] {
		&self.conflicts
	}

	pub fn has_conflicts(&self) -> bool {
		!self.conflicts.is_empty()
	}

	/* Derived */

	pub fn pin_lines(&self) -> impl Iterator<Item = &PinLine> {
		self.outcomes.iter().filter_map(LineOutcome::as_pin_line)
	}

	pub fn pins(&self) -> impl Iterator<Item = &Pin> {
		self.pin_lines().map(|p| &p.pin)
	}

	/// Lines that were not pins, with the reason.
	pub fn skipped(&self) -> impl Iterator<Item = &LineOutcome> {
		self.outcomes.iter().filter(|o| matches!(o, LineOutcome::Skipped { .. }))
	}

	pub fn suggest_fix(&self) -> crate::fix::FixSuggestion {
		let lines: Vec<&str> = self.pin_lines().map(|p| p.text.as_str()).collect();
		crate::fix::suggest(&lines)
	}

	/// Asks `client` to explain the conflicts.
	///
	/// # Errors
	/// - [`NothingToExplain`](crate::Error::NothingToExplain) when there are no conflicts, no request is made.
	/// - [`Explain`](crate::Error::Explain) when the request fails.
	pub async fn explain(&self, client: &crate::explain::ChatClient) -> crate::Result<Explanation> {
		if !self.has_conflicts() {
			return Err(crate::Error::NothingToExplain);
		}
		let text = client.explain(&self.conflicts).await?;
		Ok(Explanation::new(self.fingerprint.clone(), text))
	}

	/// Builds the snapshot archive for this input.
	///
	/// # Errors
	/// - [`StaleExplanation`](crate::Error::StaleExplanation) if `explanation` was made for other input.
	/// - [`Snapshot`](crate::Error::Snapshot) if the archive can't be written.
	pub fn snapshot(&self, explanation: &Explanation) -> crate::Result<Vec<u8>> {
		if explanation.fingerprint() != &self.fingerprint {
			return Err(crate::Error::StaleExplanation {
				explained: explanation.fingerprint().clone(),
				current: self.fingerprint.clone(),
			});
		}
		Ok(crate::snapshot::package(&self.input, explanation.text())?)
	}
}
