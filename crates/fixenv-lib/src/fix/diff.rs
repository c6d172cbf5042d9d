//! Line based unified diffs.
//!
//! Diffs are computed with [`similar`] and rendered in the usual `diff -u` layout with `context`
//! unchanged lines around each change. Output lines carry no line terminators.

#[derive(Debug, thiserror::Error)]
pub enum DiffError {
	/// The `---`/`+++` file header is missing.
	#[error("diff is missing its file header")]
	MissingHeader,
	#[error("malformed hunk: {0}")]
	MalformedHunk(String),
	/// A context or removed line doesn't match the text being patched.
	#[error("diff does not apply at line {line_number}")]
	ContextMismatch { line_number: usize },
}

/// Unified diff between two sequences of lines.
///
/// Returns no lines at all when the sequences are equal.
pub fn unified_diff<S: AsRef<str>>(old: &[S], new: &[S], from: &str, to: &str, context: usize) -> Vec<String> {
	let old: Vec<&str> = old.iter().map(|l| l.as_ref()).collect();
	let new: Vec<&str> = new.iter().map(|l| l.as_ref()).collect();

	let diff = similar::TextDiff::from_slices(&old, &new);
	if diff.ops().iter().all(|op| op.tag() == similar::DiffTag::Equal) {
		return Vec::new();
	}

	/* slices have no terminators of their own, similar ends every rendered line with one */
	diff.unified_diff()
		.context_radius(context)
		.missing_newline_hint(false)
		.header(from, to)
		.to_string()
		.lines()
		.map(str::to_string)
		.collect()
}

/// Reads `start[,length]` from a hunk header.
fn parse_range(s: &str) -> Result<(usize, usize), DiffError> {
	let malformed = || DiffError::MalformedHunk(format!("bad range `{}`", s));
	let (start, length) = match s.split_once(',') {
		Some((start, length)) => (start, length.parse::<usize>().map_err(|_| malformed())?),
		None => (s, 1),
	};
	Ok((start.parse::<usize>().map_err(|_| malformed())?, length))
}

/// Parses `@@ -a,b +c,d @@` into the old and new ranges.
fn parse_hunk_header(line: &str) -> Result<((usize, usize), (usize, usize)), DiffError> {
	let malformed = || DiffError::MalformedHunk(line.to_string());
	let inner = line
		.strip_prefix("@@ ")
		.and_then(|l| l.split_once(" @@"))
		.map(|(inner, _)| inner)
		.ok_or_else(malformed)?;
	let (old, new) = inner.split_once(' ').ok_or_else(malformed)?;
	let old = parse_range(old.strip_prefix('-').ok_or_else(malformed)?)?;
	let new = parse_range(new.strip_prefix('+').ok_or_else(malformed)?)?;
	Ok((old, new))
}

/// Applies a unified diff produced by [`unified_diff`] to `original`.
///
/// # Errors
/// - [`DiffError::MissingHeader`] when the diff has hunks but no file header.
/// - [`DiffError::MalformedHunk`] for unreadable hunk headers or line counts that don't add up.
/// - [`DiffError::ContextMismatch`] when `original` isn't the text the diff was made from.
pub fn apply_unified_diff<S: AsRef<str>>(original: &[S], diff: &str) -> Result<Vec<String>, DiffError> {
	let mut result = Vec::<String>::new();
	let mut cursor = 0usize;
	let mut seen_header = false;

	let mut lines = diff.lines().peekable();
	while let Some(line) = lines.next() {
		if line.starts_with("--- ") || line.starts_with("+++ ") {
			seen_header = true;
			continue;
		}
		if !line.starts_with("@@") {
			continue;
		}
		if !seen_header {
			return Err(DiffError::MissingHeader);
		}

		let ((old_start, old_len), (_, new_len)) = parse_hunk_header(line)?;
		/* an empty old range points at the line *before* the insertion */
		let hunk_start = if old_len == 0 { old_start } else { old_start.saturating_sub(1) };
		if hunk_start < cursor || hunk_start > original.len() {
			return Err(DiffError::MalformedHunk(line.to_string()));
		}
		result.extend(original[cursor..hunk_start].iter().map(|l| l.as_ref().to_string()));
		cursor = hunk_start;

		let (mut old_seen, mut new_seen) = (0usize, 0usize);
		while old_seen < old_len || new_seen < new_len {
			let body = lines.next().ok_or_else(|| DiffError::MalformedHunk("hunk ended early".to_string()))?;
			let (marker, text) = body.split_at(body.chars().next().map_or(0, char::len_utf8));
			match marker {
				" " | "-" => {
					if original.get(cursor).map(|l| l.as_ref()) != Some(text) {
						return Err(DiffError::ContextMismatch { line_number: cursor + 1 });
					}
					if marker == " " {
						result.push(text.to_string());
						new_seen += 1;
					}
					old_seen += 1;
					cursor += 1;
				}
				"+" => {
					result.push(text.to_string());
					new_seen += 1;
				}
				"\\" => {}
				_ => return Err(DiffError::MalformedHunk(format!("unexpected line `{}`", body))),
			}
		}
		if old_seen != old_len || new_seen != new_len {
			return Err(DiffError::MalformedHunk(line.to_string()));
		}
	}

	result.extend(original[cursor..].iter().map(|l| l.as_ref().to_string()));
	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lines(s: &str) -> Vec<&str> {
		s.lines().collect()
	}

	#[test]
	fn equal_input_has_no_diff() {
		let a = lines("a\nb\nc");
		assert!(unified_diff(&a, &a, "a", "b", 3).is_empty());
		assert!(unified_diff::<&str>(&[], &[], "a", "b", 3).is_empty());
	}

	#[test]
	fn full_replacement_is_one_hunk() {
		let old = lines("numpy==1.20\nnumpy==1.25");
		let new = lines("numpy==latest1.20\nnumpy==latest1.25");
		assert_eq!(unified_diff(&old, &new, "original", "suggested", 3), vec![
			"--- original",
			"+++ suggested",
			"@@ -1,2 +1,2 @@",
			"-numpy==1.20",
			"-numpy==1.25",
			"+numpy==latest1.20",
			"+numpy==latest1.25",
		]);
	}

	#[test]
	fn single_line_ranges_omit_length() {
		let diff = unified_diff(&["a"], &["b"], "x", "y", 3);
		assert_eq!(diff[2], "@@ -1 +1 @@");
	}

	#[test]
	fn insertion_into_empty() {
		let diff = unified_diff(&[], &["a", "b"], "x", "y", 3);
		assert_eq!(diff[2], "@@ -0,0 +1,2 @@");
	}

	#[test]
	fn distant_changes_make_separate_hunks() {
		let old: Vec<String> = (1..=20).map(|i| i.to_string()).collect();
		let mut new = old.clone();
		new[1] = "two".to_string();
		new[17] = "eighteen".to_string();
		let diff = unified_diff(&old, &new, "x", "y", 3);
		let hunks: Vec<_> = diff.iter().filter(|l| l.starts_with("@@")).collect();
		assert_eq!(hunks, vec!["@@ -1,5 +1,5 @@", "@@ -15,6 +15,6 @@"]);
	}

	#[test]
	fn every_line_changed_is_one_hunk() {
		let old: Vec<String> = (0..2000).map(|i| format!("pkg{}==1.{}", i, i)).collect();
		let new: Vec<String> = old.iter().map(|l| l.replace("==", "==latest")).collect();
		let diff = unified_diff(&old, &new, "original", "suggested", 3);
		assert_eq!(diff.iter().filter(|l| l.starts_with("@@")).collect::<Vec<_>>(), vec!["@@ -1,2000 +1,2000 @@"]);
		assert_eq!(diff.len(), 2 + 1 + 4000);
		assert_eq!(apply_unified_diff(&old, &diff.join("\n")).unwrap(), new);
	}

	#[test]
	fn apply_reverses_diff() {
		let old: Vec<String> = (1..=20).map(|i| format!("line {}", i)).collect();
		let mut new = old.clone();
		new.remove(3);
		new.insert(10, "inserted".to_string());
		new[15] = "changed".to_string();
		new.push("tail".to_string());
		let diff = unified_diff(&old, &new, "old", "new", 3).join("\n");
		assert_eq!(apply_unified_diff(&old, &diff).unwrap(), new);
	}

	#[test]
	fn apply_rejects_wrong_original() {
		let diff = unified_diff(&["a", "b"], &["a", "c"], "x", "y", 3).join("\n");
		assert!(matches!(apply_unified_diff(&["z", "b"], &diff), Err(DiffError::ContextMismatch { line_number: 1 })));
	}

	#[test]
	fn apply_requires_header() {
		assert!(matches!(apply_unified_diff(&["a"], "@@ -1 +1 @@\n-a\n+b"), Err(DiffError::MissingHeader)));
	}

	#[test]
	fn apply_rejects_bad_header() {
		assert!(matches!(apply_unified_diff(&["a"], "--- x\n+++ y\n@@ -one +1 @@\n-a\n+b"), Err(DiffError::MalformedHunk(_))));
	}
}
