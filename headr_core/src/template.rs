use std::ops::Range;
use std::sync::OnceLock;

use regex::Match;
use regex::Regex;

use crate::DynamicValues;
use crate::HeadrError;
use crate::HeadrResult;
use crate::Segment;
use crate::SegmentMatch;

const SEGMENT_GROUP_PREFIX: &str = "segment";

/// A byte range of a source text holding a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderSpan {
	pub start: usize,
	pub length: usize,
}

impl HeaderSpan {
	pub fn end(&self) -> usize {
		self.start + self.length
	}

	pub fn range(&self) -> Range<usize> {
		self.start..self.end()
	}
}

/// The outcome of matching a header template against a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
	/// Byte offset where the header starts.
	pub start: usize,
	/// Length of the header in bytes.
	pub length: usize,
	/// Whether any segment matched text that differs from its exact
	/// rendering.
	pub is_inexact: bool,
	/// Invalid data found in the header, in segment order.
	pub error_messages: Vec<String>,
	/// Data that could be refreshed, in segment order.
	pub update_messages: Vec<String>,
	/// The result of each segment, in template order.
	pub segments: Vec<SegmentMatch>,
}

impl MatchResult {
	pub fn span(&self) -> HeaderSpan {
		HeaderSpan {
			start: self.start,
			length: self.length,
		}
	}

	/// The header is in place, exact, valid and current.
	pub fn is_clean(&self) -> bool {
		self.start == 0
			&& !self.is_inexact
			&& self.error_messages.is_empty()
			&& self.update_messages.is_empty()
	}
}

/// A regenerated header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
	/// The up to date header text.
	pub text: String,
	/// Where the previous header was found, when there was one to reuse.
	pub previous_span: Option<HeaderSpan>,
}

/// An ordered, immutable sequence of segments describing a file header.
///
/// The composite pattern is compiled on first use and shared by every later
/// match, including matches running concurrently on other threads.
#[derive(Debug, Clone)]
pub struct HeaderTemplate {
	segments: Vec<Segment>,
	compiled: OnceLock<Result<CompiledPattern, String>>,
}

#[derive(Debug, Clone)]
struct CompiledPattern {
	search: Regex,
	anchored: Regex,
	groups: Vec<SegmentGroups>,
}

/// Capture group indices owned by one segment.
#[derive(Debug, Clone)]
struct SegmentGroups {
	index: usize,
	inner: Range<usize>,
}

impl HeaderTemplate {
	/// # Panics
	///
	/// Panics when `segments` is empty.
	pub fn new(segments: Vec<Segment>) -> Self {
		assert!(
			!segments.is_empty(),
			"a header template needs at least one segment"
		);

		Self {
			segments,
			compiled: OnceLock::new(),
		}
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// The composite regular expression used to search for headers.
	pub fn pattern(&self) -> HeadrResult<&str> {
		Ok(self.compiled()?.search.as_str())
	}

	/// Search `text` for the first header matching this template.
	pub fn try_match(
		&self,
		text: &str,
		values: &DynamicValues,
	) -> HeadrResult<Option<MatchResult>> {
		let compiled = self.compiled()?;
		let Some(captures) = compiled.search.captures(text) else {
			return Ok(None);
		};
		let Some(whole) = captures.get(0) else {
			return Ok(None);
		};

		let start = whole.start();
		let mut end = whole.end();
		let mut spans: Vec<Range<usize>> = compiled
			.groups
			.iter()
			.map(|groups| {
				captures
					.get(groups.index)
					.map_or(start..start, |group| group.range())
			})
			.collect();

		// The last segment may have swallowed trailing whitespace that the
		// literal does not contain. Give it back when the shorter header
		// still matches on its own.
		if let (Some(Segment::Text(literal)), Some(last)) = (self.segments.last(), spans.last_mut())
		{
			let excess = last.len().saturating_sub(literal.len());
			let trimmed_end = end - excess;

			if excess > 0
				&& text.is_char_boundary(trimmed_end)
				&& compiled.anchored.is_match(&text[start..trimmed_end])
			{
				last.end -= excess;
				end = trimmed_end;
			}
		}

		let mut result = MatchResult {
			start,
			length: end - start,
			is_inexact: false,
			error_messages: Vec::new(),
			update_messages: Vec::new(),
			segments: Vec::with_capacity(self.segments.len()),
		};

		for ((segment, groups), span) in self.segments.iter().zip(&compiled.groups).zip(&spans) {
			let inner: Vec<Match<'_>> = groups
				.inner
				.clone()
				.filter_map(|index| captures.get(index))
				.collect();
			let segment_match = segment.interpret(values, text, span.start, span.len(), &inner);

			result.is_inexact |= segment_match.is_inexact;
			result
				.error_messages
				.extend(segment_match.error_messages.iter().cloned());
			result
				.update_messages
				.extend(segment_match.update_messages.iter().cloned());
			result.segments.push(segment_match);
		}

		Ok(Some(result))
	}

	/// Render a fresh header from the current values alone.
	pub fn render(&self, values: &DynamicValues) -> String {
		let mut text = String::new();
		for segment in &self.segments {
			segment.render(values, &mut text, None);
		}

		text
	}

	/// Regenerate the header. When `previous` contains a matching header,
	/// the values entered there are kept and its span is returned so the
	/// caller can replace exactly that text.
	pub fn evaluate(
		&self,
		values: &DynamicValues,
		previous: Option<&str>,
	) -> HeadrResult<Evaluation> {
		let previous_match = match previous {
			Some(previous) => self.try_match(previous, values)?,
			None => None,
		};

		let Some(previous_match) = previous_match else {
			return Ok(Evaluation {
				text: self.render(values),
				previous_span: None,
			});
		};

		let mut text = String::new();
		for (segment, segment_match) in self.segments.iter().zip(&previous_match.segments) {
			segment.render(values, &mut text, Some(segment_match));
		}

		Ok(Evaluation {
			text,
			previous_span: Some(previous_match.span()),
		})
	}

	fn compiled(&self) -> HeadrResult<&CompiledPattern> {
		self.compiled
			.get_or_init(|| CompiledPattern::build(&self.segments))
			.as_ref()
			.map_err(|message| HeadrError::Pattern(message.clone()))
	}
}

impl CompiledPattern {
	fn build(segments: &[Segment]) -> Result<Self, String> {
		let mut pattern = String::new();
		for (index, segment) in segments.iter().enumerate() {
			pattern.push_str("(?P<");
			pattern.push_str(&segment_group_name(index));
			pattern.push('>');
			segment.append_pattern(&mut pattern);
			pattern.push(')');
		}

		let search = Regex::new(&format!("(?i){pattern}")).map_err(|e| e.to_string())?;
		let anchored =
			Regex::new(&format!("(?i)\\A(?:{pattern})\\z")).map_err(|e| e.to_string())?;

		let names: Vec<Option<&str>> = search.capture_names().collect();
		let mut indices = Vec::with_capacity(segments.len());
		for index in 0..segments.len() {
			let name = segment_group_name(index);
			let position = names
				.iter()
				.position(|candidate| *candidate == Some(name.as_str()))
				.ok_or_else(|| format!("missing capture group `{name}`"))?;
			indices.push(position);
		}

		// Groups are numbered by their opening parenthesis, so every group
		// between two segment groups belongs to the first of them.
		let groups = indices
			.iter()
			.enumerate()
			.map(|(position, &index)| {
				let next = indices.get(position + 1).copied().unwrap_or(names.len());
				SegmentGroups {
					index,
					inner: index + 1..next,
				}
			})
			.collect();

		tracing::debug!(segments = segments.len(), %pattern, "compiled header pattern");

		Ok(Self {
			search,
			anchored,
			groups,
		})
	}
}

fn segment_group_name(index: usize) -> String {
	format!("{SEGMENT_GROUP_PREFIX}{index}")
}
