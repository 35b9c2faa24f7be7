use miette::Diagnostic;
use thiserror::Error;

/// A syntax error in header template source. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
#[non_exhaustive]
pub enum TemplateError {
	#[error("Unescaped '}}' without opening '{{'")]
	#[diagnostic(
		code(headr::template::unescaped_close),
		help("write `}}}}` for a literal `}}`")
	)]
	UnescapedClose,

	#[error("Unescaped '{{' without closing '}}'")]
	#[diagnostic(
		code(headr::template::unterminated_open),
		help("write `{{{{` for a literal `{{`")
	)]
	UnterminatedOpen,

	#[error("Unrecognized special segment '{0}'")]
	#[diagnostic(
		code(headr::template::unrecognized_segment),
		help("available special segments: {{Year}}, {{YearRange}}")
	)]
	UnrecognizedSegment(String),

	#[error("The header template is empty")]
	#[diagnostic(code(headr::template::empty))]
	Empty,
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum HeadrError {
	#[error(transparent)]
	#[diagnostic(code(headr::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(headr::config_parse),
		help("check that headr.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("invalid current year `{0}`")]
	#[diagnostic(
		code(headr::invalid_year),
		help("the current year must be between 1000 and 9999, inclusive")
	)]
	InvalidYear(i64),

	#[error("no header template found")]
	#[diagnostic(
		code(headr::missing_template),
		help(
			"create a `header.template` file at the project root, set `template` in headr.toml, \
			 or run `headr init`"
		)
	)]
	MissingTemplate,

	#[error("more than one header template found: {}", .paths.join(", "))]
	#[diagnostic(
		code(headr::multiple_templates),
		help("keep a single `*header.template` file or set `template` in headr.toml")
	)]
	MultipleTemplates { paths: Vec<String> },

	#[error("header template `{path}` does not exist")]
	#[diagnostic(code(headr::template_not_found))]
	TemplateNotFound { path: String },

	#[error("error in {path}: {source}")]
	#[diagnostic(code(headr::template_parse))]
	TemplateParse {
		path: String,
		#[source]
		#[diagnostic_source]
		source: TemplateError,
	},

	#[error("failed to compile header pattern: {0}")]
	#[diagnostic(code(headr::pattern))]
	Pattern(String),

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(headr::file_too_large),
		help("increase `max_file_size` in headr.toml or exclude this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(headr::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

pub type HeadrResult<T> = Result<T, HeadrError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
