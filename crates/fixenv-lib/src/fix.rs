//! Suggested fix preview.
//!
//! The suggestion is a placeholder: every `==` becomes `==latest`, no package index is consulted.
//! The original version text is left in place so `pandas==1.4` becomes `pandas==latest1.4`.

pub mod diff;

use crate::requirements::PIN_SEPARATOR;

pub const SUGGESTED_SEPARATOR: &str = "==latest";
/// Shown instead of an empty diff.
pub const NO_CHANGES: &str = "# No changes suggested";

pub const FROM_LABEL: &str = "original";
pub const TO_LABEL: &str = "suggested";
pub const DIFF_CONTEXT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixSuggestion {
	/// One rewritten line per original line.
	pub new_lines: Vec<String>,
	/// Unified diff from the original lines to `new_lines`, or [`NO_CHANGES`].
	pub diff_text: String,
}

impl FixSuggestion {
	pub fn has_changes(&self) -> bool {
		self.diff_text != NO_CHANGES
	}
}

pub fn suggest_line(line: &str) -> String {
	line.replace(PIN_SEPARATOR, SUGGESTED_SEPARATOR)
}

/// Rewrites each pin line and diffs the result against the input.
pub fn suggest<S: AsRef<str>>(pin_lines: &[S]) -> FixSuggestion {
	let new_lines: Vec<String> = pin_lines.iter().map(|l| suggest_line(l.as_ref())).collect();
	let original: Vec<&str> = pin_lines.iter().map(|l| l.as_ref()).collect();
	let suggested: Vec<&str> = new_lines.iter().map(String::as_str).collect();

	let diff = diff::unified_diff(&original, &suggested, FROM_LABEL, TO_LABEL, DIFF_CONTEXT);
	let diff_text = if diff.is_empty() {
		NO_CHANGES.to_string()
	} else {
		diff.join("\n")
	};

	log::debug!("Suggested fix rewrites {} line(s)", new_lines.len());
	FixSuggestion { new_lines, diff_text }
}
