use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::DynamicValues;
use crate::HeadrError;
use crate::HeadrResult;
use crate::HeaderTemplate;
use crate::config::CONFIG_FILE_CANDIDATES;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::config::HeadrConfig;
use crate::parse_template;

/// Suffix of the file names discovered as header templates.
pub const TEMPLATE_FILE_SUFFIX: &str = "header.template";

/// Name of the template created by `headr init`.
pub const DEFAULT_TEMPLATE_FILE: &str = "header.template";

/// Options for controlling how a project is scanned.
///
/// Use [`ScanOptions::default()`] for sensible defaults or
/// [`ScanOptions::from_config`] to construct from a [`HeadrConfig`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Gitignore-style patterns to exclude from scanning.
	pub exclude_patterns: Vec<String>,
	/// Glob patterns for files checked regardless of their extension.
	pub include_set: GlobSet,
	/// Lowercase extensions of the files to check.
	pub extensions: Vec<String>,
	/// Maximum file size to check in bytes.
	pub max_file_size: u64,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self::from_config(None)
	}
}

impl ScanOptions {
	/// Construct [`ScanOptions`] from a [`HeadrConfig`].
	pub fn from_config(config: Option<&HeadrConfig>) -> Self {
		let exclude_patterns = config
			.map(|c| c.exclude.patterns.clone())
			.unwrap_or_default();
		let include_patterns = config.map(|c| &c.include.patterns[..]).unwrap_or_default();
		let extensions = config.map_or_else(
			|| HeadrConfig::default().extensions(),
			HeadrConfig::extensions,
		);
		let max_file_size = config.map_or(DEFAULT_MAX_FILE_SIZE, |c| c.max_file_size);
		let disable_gitignore = config.is_some_and(|c| c.disable_gitignore);

		Self {
			exclude_patterns,
			include_set: build_glob_set(include_patterns),
			extensions,
			max_file_size,
			disable_gitignore,
		}
	}
}

/// A parsed header template and the file it came from.
#[derive(Debug, Clone)]
pub struct TemplateSource {
	pub path: PathBuf,
	pub template: HeaderTemplate,
}

/// Everything needed to check or update the headers of a project.
#[derive(Debug)]
pub struct ProjectContext {
	/// The project root directory.
	pub root: PathBuf,
	/// The header template. `None` when the template file is empty, which
	/// turns checking off.
	pub template: Option<TemplateSource>,
	/// The values headers are checked against.
	pub values: DynamicValues,
	/// Files that must carry the header, sorted.
	pub files: Vec<PathBuf>,
	/// Files larger than this are rejected.
	pub max_file_size: u64,
}

/// Load the config, resolve the template and scan the files of a project.
/// The current year comes from the config or, failing that, the clock.
pub fn load_project(root: &Path) -> HeadrResult<ProjectContext> {
	load_project_with_values(root, None)
}

/// Like [`load_project`], but `values` takes precedence over the config and
/// the clock.
pub fn load_project_with_values(
	root: &Path,
	values: Option<DynamicValues>,
) -> HeadrResult<ProjectContext> {
	let config = HeadrConfig::load(root)?;
	let values = match values {
		Some(values) => values,
		None => {
			config
				.as_ref()
				.map(HeadrConfig::dynamic_values)
				.transpose()?
				.flatten()
				.unwrap_or_else(DynamicValues::now)
		}
	};
	let template = resolve_template(root, config.as_ref())?;
	let options = ScanOptions::from_config(config.as_ref());
	let mut files = scan_project_with_options(root, &options)?;

	if let Some(source) = &template {
		files.retain(|file| file != &source.path);
	}

	tracing::debug!(
		root = %root.display(),
		files = files.len(),
		year = values.current_year(),
		"loaded project"
	);

	Ok(ProjectContext {
		root: root.to_path_buf(),
		template,
		values,
		files,
		max_file_size: options.max_file_size,
	})
}

/// Find, read and parse the project's header template.
///
/// An explicitly configured template wins. Otherwise exactly one file in the
/// root whose name ends with [`TEMPLATE_FILE_SUFFIX`] must exist. An empty
/// template file yields `Ok(None)`.
pub fn resolve_template(
	root: &Path,
	config: Option<&HeadrConfig>,
) -> HeadrResult<Option<TemplateSource>> {
	let path = match config.and_then(|c| c.template.as_ref()) {
		Some(configured) => {
			let path = root.join(configured);
			if !path.is_file() {
				return Err(HeadrError::TemplateNotFound {
					path: configured.display().to_string(),
				});
			}
			path
		}
		None => discover_template(root)?,
	};

	let source = std::fs::read_to_string(&path)?;
	if source.is_empty() {
		tracing::debug!(path = %path.display(), "header template is empty, checking is off");
		return Ok(None);
	}

	let template = parse_template(&source).map_err(|source| {
		HeadrError::TemplateParse {
			path: make_relative(&path, root),
			source,
		}
	})?;

	Ok(Some(TemplateSource { path, template }))
}

fn discover_template(root: &Path) -> HeadrResult<PathBuf> {
	let mut candidates = Vec::new();
	for entry in std::fs::read_dir(root)? {
		let path = entry?.path();
		if path.is_file() && is_template_file(&path) {
			candidates.push(path);
		}
	}
	candidates.sort();

	match candidates.len() {
		0 => Err(HeadrError::MissingTemplate),
		1 => Ok(candidates.remove(0)),
		_ => {
			Err(HeadrError::MultipleTemplates {
				paths: candidates
					.iter()
					.map(|path| make_relative(path, root))
					.collect(),
			})
		}
	}
}

/// Check if a file name marks a header template.
pub fn is_template_file(path: &Path) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| name.ends_with(TEMPLATE_FILE_SUFFIX))
}

/// Scan a directory for the files that must carry a header.
pub fn scan_project(root: &Path) -> HeadrResult<Vec<PathBuf>> {
	scan_project_with_options(root, &ScanOptions::default())
}

/// Scan a directory with the given [`ScanOptions`].
pub fn scan_project_with_options(root: &Path, options: &ScanOptions) -> HeadrResult<Vec<PathBuf>> {
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};

	let mut walker = Walker {
		options,
		gitignore: &gitignore,
		custom_exclude: &custom_exclude,
		visited_dirs: HashSet::new(),
		files: Vec::new(),
	};
	walker.walk_dir(root, root)?;

	let mut files = walker.files;
	files.retain(|file| !is_template_file(file) && !is_config_file(root, file));
	files.sort();
	files.dedup();

	tracing::debug!(root = %root.display(), files = files.len(), "scanned project");

	Ok(files)
}

struct Walker<'a> {
	options: &'a ScanOptions,
	gitignore: &'a Gitignore,
	custom_exclude: &'a Gitignore,
	visited_dirs: HashSet<PathBuf>,
	files: Vec<PathBuf>,
}

impl Walker<'_> {
	fn walk_dir(&mut self, root: &Path, dir: &Path) -> HeadrResult<()> {
		if !dir.is_dir() {
			return Ok(());
		}

		// Detect symlink cycles by tracking canonical paths.
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !self.visited_dirs.insert(canonical) {
			return Err(HeadrError::SymlinkCycle {
				path: dir.display().to_string(),
			});
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();

			// Skip hidden directories and common build output.
			if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
				if is_ignored_name(name) {
					continue;
				}
			}

			let is_dir = path.is_dir();

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.custom_exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				self.walk_dir(root, &path)?;
			} else if self.is_checked_file(root, &path) {
				self.files.push(path);
			}
		}

		Ok(())
	}

	fn is_checked_file(&self, root: &Path, path: &Path) -> bool {
		let has_extension = path
			.extension()
			.and_then(|e| e.to_str())
			.is_some_and(|extension| {
				self.options
					.extensions
					.iter()
					.any(|checked| checked.eq_ignore_ascii_case(extension))
			});

		has_extension
			|| path
				.strip_prefix(root)
				.is_ok_and(|relative| self.options.include_set.is_match(relative))
	}
}

fn is_ignored_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

fn is_config_file(root: &Path, path: &Path) -> bool {
	CONFIG_FILE_CANDIDATES
		.iter()
		.any(|candidate| root.join(candidate) == path)
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[String]) -> GlobSet {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		if let Ok(glob) = Glob::new(pattern) {
			builder.add(glob);
		}
	}
	builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Build a `Gitignore` matcher from the `[exclude]` patterns in
/// `headr.toml`.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> HeadrResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			HeadrError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| HeadrError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

/// Make a path relative to root for display purposes.
pub fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
