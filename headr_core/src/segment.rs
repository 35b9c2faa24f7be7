use std::sync::LazyLock;

use regex::Match;
use regex::Regex;

use crate::DynamicValues;

/// Text a [`Segment::Name`] renders when it has no default and no previous
/// value. A header still containing it has not been filled in.
pub const NAME_PLACEHOLDER: &str = "{Name}";

const YEAR_PATTERN: &str = "[0-9]{4}";
const YEAR_RANGE_PATTERN: &str = "([0-9]{4})(?:\\s*[-\u{2013}\u{2014}]+\\s*([0-9]{4}))?";
const NAME_PATTERN: &str = ".*?";
const COPYRIGHT_PATTERN: &str = "(?:\\(\\s*c\\s*\\)|\u{a9})";
const LINE_WHITESPACE_PATTERN: &str = "[^\\S\\r\\n]*";
const NEWLINE_PATTERN: &str = "(?:\\r\\n|\\r|\\n)";
const WHITESPACE_PATTERN: &str = "\\s+";

/// Separator rendered between the start and end of a year range.
const EN_DASH: char = '\u{2013}';

/// Finds the parts of a literal that are allowed to drift: spellings of the
/// copyright sign and runs of whitespace.
static LITERAL_DRIFT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new("(?i)(?P<copyright>\\(\\s*c\\s*\\)|\u{a9})|(?P<space>\\s+)")
		.unwrap_or_else(|e| panic!("invalid literal drift pattern: {e}"))
});

/// One unit of a header template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Literal text. Whitespace and copyright sign spelling may drift.
	Text(String),
	/// The current year.
	Year,
	/// A start year, followed by the current year when they differ. The
	/// start year comes from a previous header, so it survives updates.
	YearRange,
	/// A free-form field such as an author name.
	Name { default_name: String },
}

/// A value extracted from a matched header that is carried into the next
/// render of the same segment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(variant_size_differences)]
pub enum SegmentValue {
	StartYear(u32),
	Name(String),
}

/// The outcome of matching a single segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentMatch {
	/// The matched text differs from what this segment would render.
	pub is_inexact: bool,
	/// Invalid data found in the header.
	pub error_messages: Vec<String>,
	/// Data that is behind the current values and could be refreshed.
	pub update_messages: Vec<String>,
	/// Data to reuse when the header is regenerated.
	pub value: Option<SegmentValue>,
}

impl Segment {
	/// Create a name field. A blank default falls back to
	/// [`NAME_PLACEHOLDER`].
	pub fn name(default_name: impl AsRef<str>) -> Self {
		let trimmed = default_name.as_ref().trim();
		let default_name = if trimmed.is_empty() {
			NAME_PLACEHOLDER
		} else {
			trimmed
		};

		Self::Name {
			default_name: default_name.to_string(),
		}
	}

	/// Create a literal text segment.
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	/// Append the rendered text of this segment to `out`.
	///
	/// When `previous` is the result of matching this same segment against
	/// an older header, values the user entered are kept: the start year of
	/// a range and the contents of a name field.
	pub fn render(&self, values: &DynamicValues, out: &mut String, previous: Option<&SegmentMatch>) {
		let previous_value = previous.and_then(|result| result.value.as_ref());

		match self {
			Self::Text(text) => out.push_str(text),
			Self::Year => push_year(out, values.current_year()),
			Self::YearRange => {
				let current_year = values.current_year();
				let start_year = match previous_value {
					Some(SegmentValue::StartYear(start_year)) => (*start_year).min(current_year),
					_ => current_year,
				};
				push_year_range(out, start_year, current_year);
			}
			Self::Name { default_name } => {
				match previous_value {
					Some(SegmentValue::Name(name)) if !name.is_empty() => out.push_str(name),
					_ => out.push_str(default_name),
				}
			}
		}
	}

	/// Append the regular expression matching this segment to `out`.
	pub fn append_pattern(&self, out: &mut String) {
		match self {
			Self::Text(text) => append_text_pattern(text, out),
			Self::Year => out.push_str(YEAR_PATTERN),
			Self::YearRange => out.push_str(YEAR_RANGE_PATTERN),
			Self::Name { .. } => out.push_str(NAME_PATTERN),
		}
	}

	/// Interpret the `length` bytes of `text` starting at `start` that this
	/// segment's pattern matched. `inner` holds the capture groups nested in
	/// this segment's own pattern, in order, skipping groups that did not
	/// participate.
	pub fn interpret(
		&self,
		values: &DynamicValues,
		text: &str,
		start: usize,
		length: usize,
		inner: &[Match<'_>],
	) -> SegmentMatch {
		let matched = &text[start..start + length];

		match self {
			Self::Text(literal) => {
				SegmentMatch {
					is_inexact: differs(literal, matched),
					..SegmentMatch::default()
				}
			}
			Self::Year => interpret_year(values, matched),
			Self::YearRange => interpret_year_range(values, matched, inner),
			Self::Name { .. } => {
				let trimmed = matched.trim();
				let mut result = SegmentMatch {
					is_inexact: trimmed.len() != length,
					value: Some(SegmentValue::Name(trimmed.to_string())),
					..SegmentMatch::default()
				};

				if trimmed.is_empty() || trimmed == NAME_PLACEHOLDER {
					result
						.error_messages
						.push("Name must not be blank.".to_string());
				}

				result
			}
		}
	}
}

fn interpret_year(values: &DynamicValues, matched: &str) -> SegmentMatch {
	let year = parse_year(matched);
	let current_year = values.current_year();
	let mut result = SegmentMatch::default();

	if year > current_year {
		result.error_messages.push(format!(
			"The year {year} is invalid. The current year is {current_year}."
		));
	}

	if year < current_year {
		result
			.update_messages
			.push(format!("The current year is {current_year}."));
	}

	result
}

fn interpret_year_range(values: &DynamicValues, matched: &str, inner: &[Match<'_>]) -> SegmentMatch {
	let Some(start_match) = inner.first() else {
		return SegmentMatch {
			is_inexact: true,
			..SegmentMatch::default()
		};
	};

	let start_year = parse_year(start_match.as_str());
	let end_year = inner
		.get(1)
		.map_or(start_year, |end_match| parse_year(end_match.as_str()));
	let current_year = values.current_year();
	let mut result = SegmentMatch {
		value: Some(SegmentValue::StartYear(start_year)),
		..SegmentMatch::default()
	};

	if end_year < start_year {
		result.error_messages.push(format!(
			"The end year ({end_year}) must be greater than or equal to the start year \
			 ({start_year})."
		));
	}

	if end_year > current_year {
		result.error_messages.push(format!(
			"The year {end_year} is invalid. The current year is {current_year}."
		));
	}

	let mut exact = String::new();
	push_year_range(&mut exact, start_year, end_year);
	result.is_inexact = differs(&exact, matched);

	if end_year < current_year {
		result
			.update_messages
			.push(format!("The current year is {current_year}."));
	}

	result
}

/// Render `start` alone when it equals `end`, otherwise `start–end`.
fn push_year_range(out: &mut String, start_year: u32, end_year: u32) {
	push_year(out, start_year);

	if start_year != end_year {
		out.push(EN_DASH);
		push_year(out, end_year);
	}
}

fn push_year(out: &mut String, year: u32) {
	out.push_str(&year.to_string());
}

/// Parse a run of ASCII digits. The patterns only ever capture four of them.
fn parse_year(digits: &str) -> u32 {
	digits
		.bytes()
		.filter(u8::is_ascii_digit)
		.fold(0, |year, digit| year * 10 + u32::from(digit - b'0'))
}

/// Whether `actual` differs from `expected` in length or, ignoring case, in
/// content.
fn differs(expected: &str, actual: &str) -> bool {
	expected.len() != actual.len() || expected.to_lowercase() != actual.to_lowercase()
}

fn append_text_pattern(text: &str, out: &mut String) {
	let mut last_end = 0;

	for captures in LITERAL_DRIFT.captures_iter(text) {
		let Some(whole) = captures.get(0) else {
			continue;
		};

		out.push_str(&regex::escape(&text[last_end..whole.start()]));

		if captures.name("copyright").is_some() {
			out.push_str(COPYRIGHT_PATTERN);
		} else {
			append_whitespace_pattern(whole.as_str(), whole.end() == text.len(), out);
		}

		last_end = whole.end();
	}

	out.push_str(&regex::escape(&text[last_end..]));
}

/// Whitespace around each line break may be missing or longer, and blank
/// lines after the first line break may be missing. Any other run of
/// whitespace must be present but may differ in length and kind.
///
/// Indentation after the last line break of a run is only matched when more
/// of the literal follows, so a literal that ends with a line break never
/// reaches into the next line.
fn append_whitespace_pattern(run: &str, ends_literal: bool, out: &mut String) {
	let mut rest = run;
	let mut line_breaks = 0_usize;

	while let Some(index) = rest.find(['\r', '\n']) {
		let newline_length = if rest[index..].starts_with("\r\n") {
			2
		} else {
			1
		};

		if line_breaks == 0 {
			out.push_str(LINE_WHITESPACE_PATTERN);
			out.push_str(NEWLINE_PATTERN);
		} else {
			out.push_str("(?:");
			out.push_str(LINE_WHITESPACE_PATTERN);
			out.push_str(NEWLINE_PATTERN);
			out.push_str(")?");
		}

		line_breaks += 1;
		rest = &rest[index + newline_length..];
	}

	if line_breaks == 0 {
		out.push_str(WHITESPACE_PATTERN);
	} else if !rest.is_empty() || !ends_literal {
		out.push_str(LINE_WHITESPACE_PATTERN);
	}
}
