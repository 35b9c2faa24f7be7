use serde::Deserialize;
use serde::Serialize;

/// A location in a source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
	/// 1-indexed line number.
	pub line: usize,
	/// 1-indexed column, counted in characters.
	pub column: usize,
	/// Byte offset from the start of the text.
	pub offset: usize,
}

impl Point {
	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}

	/// Locate a byte offset within `text`. Offsets past the end are clamped.
	pub fn from_offset(text: &str, offset: usize) -> Self {
		let mut offset = offset.min(text.len());
		while !text.is_char_boundary(offset) {
			offset -= 1;
		}

		let before = &text[..offset];
		let line_start = before.rfind('\n').map_or(0, |index| index + 1);
		let line = before.matches('\n').count() + 1;
		let column = before[line_start..].chars().count() + 1;

		Self::new(line, column, offset)
	}
}

/// A range in a source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
	pub start: Point,
	pub end: Point,
}

impl Position {
	pub fn from_offsets(text: &str, start: usize, end: usize) -> Self {
		Self {
			start: Point::from_offset(text, start),
			end: Point::from_offset(text, end),
		}
	}
}
