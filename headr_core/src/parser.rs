use std::iter::Peekable;
use std::str::Chars;

use crate::HeaderTemplate;
use crate::Segment;
use crate::TemplateError;

/// Parse header template source into a [`HeaderTemplate`].
///
/// Characters are copied literally except for braces. `{{` and `}}` stand
/// for a literal brace and `{Name}` inserts a special segment, where the name
/// is `Year` or `YearRange` (case-insensitive). When the template does not
/// end with a line break, one is added so headers followed by a newline
/// still match.
pub fn parse_template(source: impl AsRef<str>) -> Result<HeaderTemplate, TemplateError> {
	let mut chars = source.as_ref().chars().peekable();
	let mut segments = Vec::new();
	let mut buffer = String::new();

	while let Some(c) = chars.next() {
		match c {
			'{' => {
				match chars.peek() {
					None => return Err(TemplateError::UnterminatedOpen),
					Some('{') => {
						chars.next();
						buffer.push('{');
					}
					Some(_) => {
						flush_text(&mut buffer, &mut segments);
						segments.push(parse_special_segment(&mut chars)?);
					}
				}
			}
			'}' => {
				if chars.next() != Some('}') {
					return Err(TemplateError::UnescapedClose);
				}
				buffer.push('}');
			}
			_ => buffer.push(c),
		}
	}

	if !buffer.is_empty() {
		terminate_last_line(&mut buffer);
		flush_text(&mut buffer, &mut segments);
	}

	if segments.is_empty() {
		return Err(TemplateError::Empty);
	}

	tracing::debug!(segments = segments.len(), "parsed header template");

	Ok(HeaderTemplate::new(segments))
}

/// Read a special segment name up to its closing brace. The opening brace
/// has already been consumed.
fn parse_special_segment(chars: &mut Peekable<Chars<'_>>) -> Result<Segment, TemplateError> {
	let mut name = String::new();

	for c in chars.by_ref() {
		if c == '}' {
			return if name.eq_ignore_ascii_case("Year") {
				Ok(Segment::Year)
			} else if name.eq_ignore_ascii_case("YearRange") {
				Ok(Segment::YearRange)
			} else {
				Err(TemplateError::UnrecognizedSegment(name))
			};
		}

		name.push(c);
	}

	Err(TemplateError::UnterminatedOpen)
}

fn flush_text(buffer: &mut String, segments: &mut Vec<Segment>) {
	if !buffer.is_empty() {
		segments.push(Segment::Text(std::mem::take(buffer)));
	}
}

/// Append a line break when the text ends part way through a line, reusing
/// the first line break style found in the text.
fn terminate_last_line(buffer: &mut String) {
	if buffer.ends_with(['\n', '\r']) {
		return;
	}

	let newline = match buffer.find(['\n', '\r']) {
		Some(index) if buffer[index..].starts_with("\r\n") => "\r\n",
		Some(index) if buffer[index..].starts_with('\r') => "\r",
		_ => "\n",
	};
	buffer.push_str(newline);
}
