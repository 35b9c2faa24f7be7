use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;

use crate::DynamicValues;
use crate::HeaderSpan;
use crate::HeaderTemplate;
use crate::HeadrError;
use crate::HeadrResult;
use crate::MatchResult;
use crate::Position;
use crate::project::ProjectContext;
use crate::project::make_relative;

/// How a file's header compares to the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStatus {
	/// No header was found.
	Missing,
	/// A header was found and matches the template exactly.
	Exact,
	/// A header was found but its whitespace or copyright sign drifted.
	Inexact,
}

impl fmt::Display for HeaderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Missing => "missing",
			Self::Exact => "exact",
			Self::Inexact => "inexact",
		};
		f.write_str(label)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Error,
	Warning,
}

/// The kind of problem found with a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
	MissingHeader,
	MisplacedHeader,
	IncorrectHeader,
	InvalidHeader { message: String },
	OutdatedHeader { message: String },
}

impl DiagnosticKind {
	pub fn severity(&self) -> Severity {
		match self {
			Self::OutdatedHeader { .. } => Severity::Warning,
			_ => Severity::Error,
		}
	}

	/// A stable identifier, used by machine readable output.
	pub fn code(&self) -> &'static str {
		match self {
			Self::MissingHeader => "headr::missing_header",
			Self::MisplacedHeader => "headr::misplaced_header",
			Self::IncorrectHeader => "headr::incorrect_header",
			Self::InvalidHeader { .. } => "headr::invalid_header",
			Self::OutdatedHeader { .. } => "headr::outdated_header",
		}
	}

	pub fn message(&self) -> String {
		match self {
			Self::MissingHeader => "Missing header.".to_string(),
			Self::MisplacedHeader => "The header must be at the top of the file.".to_string(),
			Self::IncorrectHeader => "The header does not exactly match the template.".to_string(),
			Self::InvalidHeader { message } | Self::OutdatedHeader { message } => message.clone(),
		}
	}
}

/// A problem with the header of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDiagnostic {
	pub kind: DiagnosticKind,
	/// The byte range the problem refers to.
	pub span: HeaderSpan,
	pub position: Position,
}

impl HeaderDiagnostic {
	fn new(kind: DiagnosticKind, content: &str, span: HeaderSpan) -> Self {
		Self {
			kind,
			position: Position::from_offsets(content, span.start, span.end()),
			span,
		}
	}

	pub fn severity(&self) -> Severity {
		self.kind.severity()
	}

	pub fn message(&self) -> String {
		self.kind.message()
	}
}

/// The result of checking one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
	pub path: PathBuf,
	pub status: HeaderStatus,
	/// Where the header was found.
	pub header: Option<HeaderSpan>,
	pub diagnostics: Vec<HeaderDiagnostic>,
}

impl FileReport {
	pub fn has_errors(&self) -> bool {
		self.diagnostics
			.iter()
			.any(|diagnostic| diagnostic.severity() == Severity::Error)
	}

	pub fn has_warnings(&self) -> bool {
		self.diagnostics
			.iter()
			.any(|diagnostic| diagnostic.severity() == Severity::Warning)
	}
}

/// Check the header of a single file's content.
pub fn check_file(
	template: &HeaderTemplate,
	values: &DynamicValues,
	path: &Path,
	content: &str,
) -> HeadrResult<FileReport> {
	let Some(result) = template.try_match(content, values)? else {
		let span = first_non_blank_line(content);
		tracing::trace!(path = %path.display(), "header missing");

		return Ok(FileReport {
			path: path.to_path_buf(),
			status: HeaderStatus::Missing,
			header: None,
			diagnostics: vec![HeaderDiagnostic::new(
				DiagnosticKind::MissingHeader,
				content,
				span,
			)],
		});
	};

	let header = result.span();
	let mut diagnostics = Vec::new();

	if result.start != 0 {
		diagnostics.push(HeaderDiagnostic::new(
			DiagnosticKind::MisplacedHeader,
			content,
			HeaderSpan {
				start: 0,
				length: result.start,
			},
		));
	}

	if result.is_inexact {
		diagnostics.push(HeaderDiagnostic::new(
			DiagnosticKind::IncorrectHeader,
			content,
			header,
		));
	}

	for message in &result.error_messages {
		diagnostics.push(HeaderDiagnostic::new(
			DiagnosticKind::InvalidHeader {
				message: message.clone(),
			},
			content,
			header,
		));
	}

	for message in &result.update_messages {
		diagnostics.push(HeaderDiagnostic::new(
			DiagnosticKind::OutdatedHeader {
				message: message.clone(),
			},
			content,
			header,
		));
	}

	let status = if result.is_inexact {
		HeaderStatus::Inexact
	} else {
		HeaderStatus::Exact
	};

	tracing::trace!(
		path = %path.display(),
		%status,
		start = result.start,
		diagnostics = diagnostics.len(),
		"header checked"
	);

	Ok(FileReport {
		path: path.to_path_buf(),
		status,
		header: Some(header),
		diagnostics,
	})
}

/// The first line holding anything but whitespace, without its line break.
/// Empty content yields an empty span at the start.
fn first_non_blank_line(content: &str) -> HeaderSpan {
	let Some(first) = content.find(|c: char| !c.is_whitespace()) else {
		return HeaderSpan {
			start: 0,
			length: 0,
		};
	};

	let start = content[..first].rfind(['\n', '\r']).map_or(0, |index| index + 1);
	let end = content[first..]
		.find(['\n', '\r'])
		.map_or(content.len(), |index| first + index);

	HeaderSpan {
		start,
		length: end - start,
	}
}

/// Result of checking every file of a project.
#[derive(Debug, Default)]
pub struct CheckResult {
	/// One report per checked file, in path order.
	pub reports: Vec<FileReport>,
	/// Checking is turned off because the template is empty.
	pub disabled: bool,
}

impl CheckResult {
	/// Returns true if no file has an error-severity diagnostic.
	pub fn is_ok(&self) -> bool {
		!self.reports.iter().any(FileReport::has_errors)
	}

	/// Returns true if any header is behind the current values.
	pub fn has_outdated(&self) -> bool {
		self.reports.iter().any(FileReport::has_warnings)
	}

	/// Reports with at least one diagnostic.
	pub fn problems(&self) -> impl Iterator<Item = &FileReport> {
		self.reports
			.iter()
			.filter(|report| !report.diagnostics.is_empty())
	}
}

/// Read the file at `path` and check its header.
pub fn check_path(
	template: &HeaderTemplate,
	values: &DynamicValues,
	path: &Path,
	root: &Path,
	max_file_size: u64,
) -> HeadrResult<FileReport> {
	let content = read_source(path, root, max_file_size)?;
	check_file(template, values, path, &content)
}

/// Check every scanned file of the project in parallel.
pub fn check_project(ctx: &ProjectContext) -> HeadrResult<CheckResult> {
	let Some(source) = &ctx.template else {
		return Ok(CheckResult {
			reports: Vec::new(),
			disabled: true,
		});
	};

	let reports = ctx
		.files
		.par_iter()
		.map(|path| check_path(&source.template, &ctx.values, path, &ctx.root, ctx.max_file_size))
		.collect::<HeadrResult<Vec<_>>>()?;

	tracing::debug!(files = reports.len(), "checked project");

	Ok(CheckResult {
		reports,
		disabled: false,
	})
}

/// How a fix changes a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixKind {
	/// A fresh header is inserted at the start.
	Insert,
	/// A correct header is moved to the start.
	Move,
	/// A header is regenerated and moved to the start.
	UpdateAndMove,
	/// A header at the start is regenerated in place.
	Update,
}

impl fmt::Display for FixKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Insert => "insert header",
			Self::Move => "move header to top",
			Self::UpdateAndMove => "update header and move to top",
			Self::Update => "update header",
		};
		f.write_str(label)
	}
}

/// New content for a file whose header needs fixing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFix {
	pub kind: FixKind,
	pub content: String,
}

/// Compute the content of a file after fixing its header. Returns `None`
/// when the header is already exact, at the start and current.
///
/// Regenerated headers keep the values entered in the previous header, such
/// as the start year of a range.
pub fn fix_content(
	template: &HeaderTemplate,
	values: &DynamicValues,
	content: &str,
) -> HeadrResult<Option<HeaderFix>> {
	let Some(result) = template.try_match(content, values)? else {
		let mut fixed = template.render(values);
		fixed.push_str(content);
		return Ok(Some(HeaderFix {
			kind: FixKind::Insert,
			content: fixed,
		}));
	};

	if result.is_clean() {
		return Ok(None);
	}

	let span = result.span();
	let before = &content[..span.start];
	let after = &content[span.end()..];
	let (kind, header) = if needs_update(&result) {
		let evaluation = template.evaluate(values, Some(content))?;
		let kind = if span.start == 0 {
			FixKind::Update
		} else {
			FixKind::UpdateAndMove
		};
		(kind, evaluation.text)
	} else {
		(FixKind::Move, content[span.range()].to_string())
	};

	let mut fixed = String::with_capacity(content.len() + header.len());
	fixed.push_str(&header);
	fixed.push_str(before);
	fixed.push_str(after);

	if fixed == content {
		return Ok(None);
	}

	Ok(Some(HeaderFix {
		kind,
		content: fixed,
	}))
}

fn needs_update(result: &MatchResult) -> bool {
	result.is_inexact || !result.error_messages.is_empty() || !result.update_messages.is_empty()
}

/// A file whose header was fixed.
#[derive(Debug, Clone)]
pub struct FileUpdate {
	pub path: PathBuf,
	pub kind: FixKind,
	/// The content before the fix.
	pub original: String,
	/// The content after the fix.
	pub content: String,
}

/// Result of updating a project.
#[derive(Debug, Default)]
pub struct UpdateResult {
	/// Files that need changing, in path order.
	pub updated_files: Vec<FileUpdate>,
	/// Checking is turned off because the template is empty.
	pub disabled: bool,
}

impl UpdateResult {
	pub fn updated_count(&self) -> usize {
		self.updated_files.len()
	}
}

/// Compute the fixed content of every file of the project.
pub fn compute_updates(ctx: &ProjectContext) -> HeadrResult<UpdateResult> {
	let Some(source) = &ctx.template else {
		return Ok(UpdateResult {
			updated_files: Vec::new(),
			disabled: true,
		});
	};

	let updated_files = ctx
		.files
		.par_iter()
		.map(|path| -> HeadrResult<Option<FileUpdate>> {
			let original = read_source(path, &ctx.root, ctx.max_file_size)?;
			let fix = fix_content(&source.template, &ctx.values, &original)?;

			Ok(fix.map(|fix| {
				FileUpdate {
					path: path.clone(),
					kind: fix.kind,
					original,
					content: fix.content,
				}
			}))
		})
		.collect::<HeadrResult<Vec<_>>>()?
		.into_iter()
		.flatten()
		.collect::<Vec<_>>();

	tracing::debug!(files = updated_files.len(), "computed header updates");

	Ok(UpdateResult {
		updated_files,
		disabled: false,
	})
}

/// Write the updated contents back to disk.
pub fn write_updates(updates: &UpdateResult) -> HeadrResult<()> {
	for update in &updates.updated_files {
		std::fs::write(&update.path, &update.content)?;
	}
	Ok(())
}

/// Read a source file, rejecting files above `max_file_size` bytes.
/// Read a scanned file, refusing files larger than `max_file_size` bytes.
pub fn read_source(path: &Path, root: &Path, max_file_size: u64) -> HeadrResult<String> {
	let size = std::fs::metadata(path)?.len();
	if size > max_file_size {
		return Err(HeadrError::FileTooLarge {
			path: make_relative(path, root),
			size,
			limit: max_file_size,
		});
	}

	Ok(std::fs::read_to_string(path)?)
}
