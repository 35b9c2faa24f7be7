use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Keep source file headers correct and current from a single template.",
	long_about = "headr checks that every source file in a project starts with the header \
	              described by a `header.template` file, such as a copyright or license \
	              notice.\n\nSmall drift in whitespace or in the spelling of the copyright sign is \
	              tolerated and reported, and stale years are refreshed while the start year of \
	              a range is kept.\n\nQuick start:\n  headr init    Create a header template\n  \
	              headr check   Verify every file has a current header\n  headr update  Insert \
	              or refresh headers"
)]
pub struct HeadrCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Use this year as the current year instead of the system clock or the
	/// `current_year` set in headr.toml.
	#[arg(long, global = true, value_name = "YYYY")]
	pub year: Option<i64>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize headr in a project by creating a sample header template.
	///
	/// Creates `header.template` and `headr.toml` in the project root. Files
	/// that already exist are left untouched.
	Init,
	/// Check that every source file starts with a correct, current header.
	///
	/// Exits with status 1 when a header is missing, misplaced, inexact or
	/// invalid, and with status 2 when the template or configuration cannot
	/// be loaded. Outdated years are reported but only fail the check with
	/// `--fail-on-outdated`.
	Check {
		/// Show a unified diff between each file's header and the fixed
		/// header.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations that appear inline on PRs.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,

		/// Treat outdated years as failures.
		#[arg(long, default_value_t = false)]
		fail_on_outdated: bool,
	},
	/// Insert missing headers and refresh outdated ones.
	///
	/// Headers that are not at the top of a file are moved there. The start
	/// year of a `{YearRange}` is kept when the header is regenerated.
	Update {
		/// Preview changes without writing files. Prints which files would
		/// be modified and how.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// Print the header rendered for the current year.
	Render,
	/// List every checked file with the status of its header.
	List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each report includes the
	/// file path, header status, and diagnostics with their positions.
	Json,
	/// GitHub Actions annotation format. Emits `::warning` or `::error`
	/// annotations that appear inline on pull request diffs.
	Github,
}
