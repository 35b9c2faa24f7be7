use std::path::PathBuf;
use std::process;

use clap::Parser;
use headr_cli::Commands;
use headr_cli::HeadrCli;
use headr_cli::OutputFormat;
use headr_core::CheckResult;
use headr_core::DynamicValues;
use headr_core::FileReport;
use headr_core::HeadrError;
use headr_core::Severity;
use headr_core::check_path;
use headr_core::check_project;
use headr_core::compute_updates;
use headr_core::fix_content;
use headr_core::read_source;
use headr_core::project::DEFAULT_TEMPLATE_FILE;
use headr_core::project::ProjectContext;
use headr_core::project::is_template_file;
use headr_core::project::load_project_with_values;
use headr_core::project::make_relative;
use headr_core::write_updates;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding the log filter, e.g. `HEADR_LOG=debug`.
const LOG_ENV: &str = "HEADR_LOG";

const SAMPLE_TEMPLATE: &str = "// Copyright (c) {YearRange} Your Name. All rights reserved.\n";

const SAMPLE_CONFIG: &str = "# headr configuration\n\n# Path to the header template, \
                             relative to this file's directory.\n# template = \
                             \"header.template\"\n\n# Extensions of the files that must carry \
                             the header.\n# extensions = [\"rs\", \"ts\", \"py\"]\n\n# \
                             Gitignore-style patterns of files to skip.\n# [exclude]\n# \
                             patterns = [\"vendor/\"]\n";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = HeadrCli::parse();

	// Respect NO_COLOR env var, --no-color flag and terminals without color.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Check {
			diff,
			format,
			fail_on_outdated,
		}) => run_check(&args, diff, format, fail_on_outdated),
		Some(Commands::Update { dry_run }) => run_update(&args, dry_run),
		Some(Commands::Render) => run_render(&args),
		Some(Commands::List) => run_list(&args),
		None => {
			eprintln!("No subcommand specified. Run `headr --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<HeadrError>() {
			Ok(headr_err) => {
				let report: miette::Report = (*headr_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_filter = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

fn resolve_root(args: &HeadrCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load(args: &HeadrCli) -> Result<ProjectContext, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let values = args
		.year
		.map(|year| DynamicValues::try_new(year).ok_or(HeadrError::InvalidYear(year)))
		.transpose()?;

	tracing::debug!(root = %root.display(), year = ?args.year, "loading project");

	Ok(load_project_with_values(&root, values)?)
}

fn run_init(args: &HeadrCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let template_path = root.join(DEFAULT_TEMPLATE_FILE);
	let config_path = root.join("headr.toml");

	let existing_template = std::fs::read_dir(&root)?
		.filter_map(Result::ok)
		.map(|entry| entry.path())
		.find(|path| path.is_file() && is_template_file(path));

	if let Some(existing) = &existing_template {
		println!("Header template already exists: {}", existing.display());
	} else {
		std::fs::write(&template_path, SAMPLE_TEMPLATE)?;
		println!("Created header template: {}", template_path.display());
	}

	if !config_path.exists() {
		std::fs::write(&config_path, SAMPLE_CONFIG)?;
		println!("Created headr.toml");
	}

	if existing_template.is_none() {
		println!();
		println!("Next steps:");
		println!(
			"  1. Edit {} to describe your header",
			template_path.display()
		);
		println!("     {{Year}} is the current year, {{YearRange}} keeps a start year");
		println!("  2. Run `headr check` to find files without the header");
		println!("  3. Run `headr update` to insert and refresh headers");
	}

	Ok(())
}

fn run_check(
	args: &HeadrCli,
	show_diff: bool,
	format: OutputFormat,
	fail_on_outdated: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load(args)?;
	let result = check_project(&ctx)?;

	if result.disabled {
		println!("Header checking is disabled: the header template is empty.");
		return Ok(());
	}

	let failed = !result.is_ok() || (fail_on_outdated && result.has_outdated());

	match format {
		OutputFormat::Json => print_json(&ctx, &result)?,
		OutputFormat::Github => print_github(&ctx, &result),
		OutputFormat::Text => print_text(&ctx, &result, show_diff)?,
	}

	if failed {
		process::exit(1);
	}

	Ok(())
}

fn print_json(ctx: &ProjectContext, result: &CheckResult) -> Result<(), Box<dyn std::error::Error>> {
	let reports: Vec<serde_json::Value> = result
		.problems()
		.map(|report| {
			let diagnostics: Vec<serde_json::Value> = report
				.diagnostics
				.iter()
				.map(|diagnostic| {
					serde_json::json!({
						"code": diagnostic.kind.code(),
						"severity": diagnostic.severity(),
						"message": diagnostic.message(),
						"position": diagnostic.position,
					})
				})
				.collect();

			serde_json::json!({
				"file": make_relative(&report.path, &ctx.root),
				"status": report.status,
				"diagnostics": diagnostics,
			})
		})
		.collect();

	let output = serde_json::json!({
		"ok": result.is_ok(),
		"outdated": result.has_outdated(),
		"checked": result.reports.len(),
		"reports": reports,
	});
	println!("{}", serde_json::to_string(&output)?);

	Ok(())
}

fn print_github(ctx: &ProjectContext, result: &CheckResult) {
	for report in result.problems() {
		let rel = make_relative(&report.path, &ctx.root);
		for diagnostic in &report.diagnostics {
			let level = match diagnostic.severity() {
				Severity::Error => "error",
				Severity::Warning => "warning",
			};
			println!(
				"::{level} file={rel},line={},col={}::{}",
				diagnostic.position.start.line,
				diagnostic.position.start.column,
				diagnostic.message()
			);
		}
	}

	eprintln!("{}", check_summary(result));
}

fn print_text(
	ctx: &ProjectContext,
	result: &CheckResult,
	show_diff: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	if result.problems().next().is_none() {
		println!(
			"Check passed: all {} file(s) have a correct header.",
			result.reports.len()
		);
		return Ok(());
	}

	if result.is_ok() {
		eprintln!("Check passed with warnings.");
	} else {
		eprintln!("Check failed.");
	}

	for report in result.problems() {
		let rel = make_relative(&report.path, &ctx.root);
		eprintln!();
		eprintln!("{}", colored!(rel, bold));

		for diagnostic in &report.diagnostics {
			let label = match diagnostic.severity() {
				Severity::Error => colored!("error:", red),
				Severity::Warning => colored!("warning:", yellow),
			};
			eprintln!(
				"  {}:{} {label} {}",
				diagnostic.position.start.line,
				diagnostic.position.start.column,
				diagnostic.message()
			);
		}

		if show_diff {
			print_report_diff(ctx, report)?;
		}
	}

	eprintln!();
	eprintln!("{}", check_summary(result));

	Ok(())
}

fn print_report_diff(
	ctx: &ProjectContext,
	report: &FileReport,
) -> Result<(), Box<dyn std::error::Error>> {
	let Some(source) = &ctx.template else {
		return Ok(());
	};

	let current = read_source(&report.path, &ctx.root, ctx.max_file_size)?;
	if let Some(fix) = fix_content(&source.template, &ctx.values, &current)? {
		print_diff(&current, &fix.content);
	}

	Ok(())
}

fn check_summary(result: &CheckResult) -> String {
	let errors = result
		.reports
		.iter()
		.filter(|report| report.has_errors())
		.count();
	let outdated = result
		.reports
		.iter()
		.filter(|report| report.has_warnings())
		.count();

	let mut parts = Vec::new();
	if errors > 0 {
		parts.push(format!("{errors} file(s) with header errors"));
	}
	if outdated > 0 {
		parts.push(format!("{outdated} file(s) with outdated headers"));
	}

	let summary = parts.join(", ");
	if errors > 0 {
		format!("{summary}. Run `headr update` to fix them.")
	} else {
		format!("{summary}. Run `headr update` to refresh them.")
	}
}

fn run_update(args: &HeadrCli, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load(args)?;
	let updates = compute_updates(&ctx)?;

	if updates.disabled {
		println!("Header checking is disabled: the header template is empty.");
		return Ok(());
	}

	if updates.updated_count() == 0 {
		println!("All headers are already up to date.");
		return Ok(());
	}

	if dry_run {
		println!(
			"Dry run: would update {} file(s):",
			updates.updated_count()
		);
		for update in &updates.updated_files {
			let rel = make_relative(&update.path, &ctx.root);
			println!("  {rel} ({})", update.kind);

			if args.verbose {
				print_diff(&update.original, &update.content);
			}
		}
	} else {
		write_updates(&updates)?;
		println!(
			"{} {} file(s).",
			colored!("Updated", green),
			updates.updated_count()
		);

		if args.verbose {
			for update in &updates.updated_files {
				let rel = make_relative(&update.path, &ctx.root);
				println!("  {rel} ({})", update.kind);
			}
		}
	}

	Ok(())
}

fn run_render(args: &HeadrCli) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load(args)?;

	match &ctx.template {
		Some(source) => print!("{}", source.template.render(&ctx.values)),
		None => eprintln!("The header template is empty."),
	}

	Ok(())
}

fn run_list(args: &HeadrCli) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load(args)?;

	let Some(source) = &ctx.template else {
		println!("Header checking is disabled: the header template is empty.");
		return Ok(());
	};

	if ctx.files.is_empty() {
		println!("No files to check.");
		return Ok(());
	}

	println!(
		"{} {}",
		colored!("Template:", bold),
		make_relative(&source.path, &ctx.root)
	);

	for path in &ctx.files {
		let report = check_path(&source.template, &ctx.values, path, &ctx.root, ctx.max_file_size)?;
		let status = format!("{:<8}", report.status.to_string());
		let status = if report.has_errors() {
			colored!(status, red)
		} else if report.has_warnings() {
			colored!(status, yellow)
		} else {
			colored!(status, green)
		};
		println!("  {status} {}", make_relative(path, &ctx.root));
	}

	println!("\n{} file(s)", ctx.files.len());

	Ok(())
}

const DIFF_CONTEXT_LINES: usize = 3;

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for (index, group) in diff.grouped_ops(DIFF_CONTEXT_LINES).iter().enumerate() {
		if index > 0 {
			eprintln!("  {}", colored!("...", bold));
		}

		for op in group {
			for change in diff.iter_changes(op) {
				match change.tag() {
					ChangeTag::Delete => {
						eprint!("  {}", colored!(format!("-{change}"), red));
					}
					ChangeTag::Insert => {
						eprint!("  {}", colored!(format!("+{change}"), green));
					}
					ChangeTag::Equal => {
						eprint!("   {change}");
					}
				}

				if change.missing_newline() {
					eprintln!();
				}
			}
		}
	}
}
