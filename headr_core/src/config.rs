use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DynamicValues;
use crate::HeadrError;
use crate::HeadrResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["headr.toml", ".headr.toml", ".config/headr.toml"];

/// File extensions checked when the config does not list any.
pub const DEFAULT_EXTENSIONS: [&str; 20] = [
	"rs", "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "go", "java", "kt", "swift", "c", "h",
	"cpp", "hpp", "cs", "rb", "php", "scala",
];

/// Configuration loaded from a `headr.toml` file.
///
/// ```toml
/// template = "header.template"
/// current_year = 2024
/// extensions = ["rs", "ts"]
/// max_file_size = 10485760
/// disable_gitignore = false
///
/// [exclude]
/// patterns = ["target/", "vendor/"]
///
/// [include]
/// patterns = ["scripts/**/*.sh"]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadrConfig {
	/// Path to the header template, relative to the project root. When
	/// absent, a single `*header.template` file in the root is used.
	#[serde(default)]
	pub template: Option<PathBuf>,
	/// Year used instead of the wall-clock year. Useful for reproducible
	/// checks.
	#[serde(default)]
	pub current_year: Option<i64>,
	/// Extensions of the source files that must carry the header.
	#[serde(default)]
	pub extensions: Option<Vec<String>>,
	/// Maximum file size in bytes to check. Larger files are an error.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Inclusion configuration: additional glob patterns to check.
	#[serde(default)]
	pub include: IncludeConfig,
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

/// Configuration for excluding files and directories from checking.
///
/// Patterns follow gitignore syntax and are applied on top of any
/// `.gitignore` rules (unless `disable_gitignore` is set).
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Gitignore-style patterns relative to the project root.
	///
	/// Examples: `"build/"`, `"*.generated.rs"`, `"!keep.rs"`.
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Configuration for including additional files in checking.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeConfig {
	/// Glob patterns relative to the project root, checked regardless of
	/// their extension.
	#[serde(default)]
	pub patterns: Vec<String>,
}

impl HeadrConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is none.
	pub fn load(root: &Path) -> HeadrResult<Option<HeadrConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: HeadrConfig =
			toml::from_str(&content).map_err(|e| HeadrError::ConfigParse(e.to_string()))?;

		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// The configured year override, validated.
	pub fn dynamic_values(&self) -> HeadrResult<Option<DynamicValues>> {
		self.current_year
			.map(|year| DynamicValues::try_new(year).ok_or(HeadrError::InvalidYear(year)))
			.transpose()
	}

	/// Extensions to check, lowercased and without leading dots.
	pub fn extensions(&self) -> Vec<String> {
		match &self.extensions {
			Some(extensions) => {
				extensions
					.iter()
					.map(|extension| extension.trim_start_matches('.').to_ascii_lowercase())
					.filter(|extension| !extension.is_empty())
					.collect()
			}
			None => DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
		}
	}
}
