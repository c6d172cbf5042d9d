//! Reading version pins out of `requirements.txt` style text.
//!
//! Only lines of the form `<name>==<version>` are considered pins, everything else is skipped.
//! Parsing never fails, skipped lines are reported as [`LineOutcome::Skipped`] so callers can
//! see why a line was ignored.

/// The literal separator between a package name and its pinned version.
pub const PIN_SEPARATOR: &str = "==";

/// A package name bound to an exact version string.
///
/// Neither side is validated or normalized, names are compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pin {
	pub name: String,
	pub version: String,
}

impl Pin {
	pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			version: version.into(),
		}
	}
}

impl std::fmt::Display for Pin {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}{}{}", self.name, PIN_SEPARATOR, self.version)
	}
}

/// The trimmed input line a [`Pin`] was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinLine {
	/// 1-based position in the input.
	pub line_number: usize,
	pub text: String,
	pub pin: Pin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// Empty or whitespace only.
	Blank,
	/// No `==` anywhere in the line.
	NoPinSeparator,
}

impl std::fmt::Display for SkipReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			SkipReason::Blank => write!(f, "blank line"),
			SkipReason::NoPinSeparator => write!(f, "no `{}` pin", PIN_SEPARATOR),
		}
	}
}

/// What happened to a single line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
	Pin(PinLine),
	Skipped {
		line_number: usize,
		text: String,
		reason: SkipReason,
	},
}

impl LineOutcome {
	pub fn as_pin_line(&self) -> Option<&PinLine> {
		match self {
			LineOutcome::Pin(p) => Some(p),
			LineOutcome::Skipped { .. } => None,
		}
	}
}

/// Reads a single trimmed line.
///
/// The line is split on the *first* `==` only so `a==1==2` pins `a` to `1==2`.
pub fn parse_line(line_number: usize, line: &str) -> LineOutcome {
	let text = line.trim();
	if text.is_empty() {
		return LineOutcome::Skipped { line_number, text: text.to_string(), reason: SkipReason::Blank };
	}

	match text.split_once(PIN_SEPARATOR) {
		Some((name, version)) => LineOutcome::Pin(PinLine {
			line_number,
			text: text.to_string(),
			pin: Pin::new(name, version),
		}),
		None => LineOutcome::Skipped { line_number, text: text.to_string(), reason: SkipReason::NoPinSeparator },
	}
}

fn is_line_boundary(c: char) -> bool {
	matches!(c, '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Splits `text` into lines without their terminators.
///
/// Besides `\n`, `\r\n` and a lone `\r`, the vertical tab, form feed, the file/group/record
/// separators, NEL and the Unicode line and paragraph separators all end a line. A terminator at
/// the very end doesn't start another, empty, line.
pub fn split_lines(text: &str) -> Vec<&str> {
	let mut lines = Vec::<&str>::new();
	let mut start = 0usize;
	let mut chars = text.char_indices().peekable();
	while let Some((i, c)) = chars.next() {
		if !is_line_boundary(c) {
			continue;
		}
		lines.push(&text[start..i]);
		start = i + c.len_utf8();
		if c == '\r' && matches!(chars.peek(), Some((_, '\n'))) {
			chars.next();
			start += 1;
		}
	}
	if start < text.len() {
		lines.push(&text[start..]);
	}
	lines
}

/// Classifies every line of `raw_text` in input order.
pub fn parse_lines(raw_text: &str) -> Vec<LineOutcome> {
	split_lines(raw_text)
		.into_iter()
		.enumerate()
		.map(|(i, line)| {
			let outcome = parse_line(i + 1, line);
			if let LineOutcome::Skipped { line_number, reason, .. } = &outcome {
				log::debug!("Skipping line {}: {}", line_number, reason);
			}
			outcome
		})
		.collect()
}

/// Returns only the pin lines of `raw_text`, dropping everything else.
pub fn parse(raw_text: &str) -> Vec<PinLine> {
	parse_lines(raw_text)
		.into_iter()
		.filter_map(|o| match o {
			LineOutcome::Pin(p) => Some(p),
			LineOutcome::Skipped { .. } => None,
		})
		.collect()
}

/// Reads an uploaded requirements file.
///
/// # Errors
/// - [`IO`](crate::Error::IO) when the file can't be read.
/// - [`Parse`](crate::Error::Parse) when the file is not UTF-8.
pub fn read_requirements_file(path: impl AsRef<std::path::Path>) -> crate::Result<String> {
	let path = path.as_ref();
	let bytes = std::fs::read(path)?;
	String::from_utf8(bytes).map_err(|e| crate::Error::Parse(format!("{} is not valid UTF-8: {}", path.display(), e)))
}
