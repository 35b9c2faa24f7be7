mod common;

use clap::Parser;
use headr_cli::Commands;
use headr_cli::HeadrCli;
use headr_cli::OutputFormat;
use headr_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

#[test]
fn check_passes_when_headers_are_current() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(
		tmp.path().join("main.rs"),
		"// Copyright (c) 2019\u{2013}2024 Acme\nfn main() {}\n",
	)?;

	common::headr_at(tmp.path(), "check")
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed: all 1 file(s)"));

	Ok(())
}

#[test]
fn check_fails_on_missing_header() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n")?;

	common::headr_at(tmp.path(), "check")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("Check failed."))
		.stderr(predicates::str::contains("main.rs"))
		.stderr(predicates::str::contains("1:1 error: Missing header."));

	Ok(())
}

#[test]
fn check_reports_misplaced_header() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(
		tmp.path().join("main.rs"),
		"#![allow(dead_code)]\n// Copyright (c) 2024 Acme\n",
	)?;

	common::headr_at(tmp.path(), "check")
		.assert()
		.code(1)
		.stderr(predicates::str::contains(
			"The header must be at the top of the file.",
		));

	Ok(())
}

#[test]
fn outdated_header_is_a_warning() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("main.rs"), "// Copyright (c) 2020 Acme\n")?;

	common::headr_at(tmp.path(), "check")
		.assert()
		.success()
		.stderr(predicates::str::contains("Check passed with warnings."))
		.stderr(predicates::str::contains(
			"warning: The current year is 2024.",
		));

	common::headr_at(tmp.path(), "check")
		.arg("--fail-on-outdated")
		.assert()
		.code(1);

	Ok(())
}

#[test]
fn check_future_year_is_an_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("main.rs"), "// Copyright (c) 2030 Acme\n")?;

	common::headr_at(tmp.path(), "check")
		.assert()
		.code(1)
		.stderr(predicates::str::contains(
			"The year 2030 is invalid. The current year is 2024.",
		));

	Ok(())
}

#[test]
fn check_with_diff_shows_fixed_header() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n")?;

	common::headr_at(tmp.path(), "check")
		.arg("--diff")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("+// Copyright (c) 2024 Acme"));

	Ok(())
}

#[test]
fn check_diff_omits_distant_unchanged_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	let body = (1..=20).map(|n| format!("const L{n}: u8 = {n};\n")).collect::<String>();
	std::fs::write(tmp.path().join("main.rs"), body)?;

	common::headr_at(tmp.path(), "check")
		.arg("--diff")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("+// Copyright (c) 2024 Acme"))
		.stderr(predicates::str::contains("const L3: u8 = 3;"))
		.stderr(predicates::str::contains("const L4: u8 = 4;").not())
		.stderr(predicates::str::contains("const L20: u8 = 20;").not());

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("a.rs"), "// Copyright (c) 2024 Acme\n")?;
	std::fs::write(tmp.path().join("b.rs"), "fn b() {}\n")?;

	let output = common::headr_at(tmp.path(), "check")
		.arg("--format")
		.arg("json")
		.output()?;
	assert_eq!(output.status.code(), Some(1));

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["ok"], Value::Bool(false));
	assert_eq!(json["checked"], 2);
	assert_eq!(json["reports"][0]["file"], "b.rs");
	assert_eq!(json["reports"][0]["status"], "missing");
	assert_eq!(
		json["reports"][0]["diagnostics"][0]["code"],
		"headr::missing_header"
	);
	assert_eq!(json["reports"][0]["diagnostics"][0]["severity"], "error");
	assert_eq!(
		json["reports"][0]["diagnostics"][0]["position"]["start"]["line"],
		1
	);

	Ok(())
}

#[test]
fn check_github_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n")?;
	std::fs::write(tmp.path().join("old.rs"), "// Copyright (c) 2022 Acme\n")?;

	common::headr_at(tmp.path(), "check")
		.arg("--format")
		.arg("github")
		.assert()
		.code(1)
		.stdout(predicates::str::contains(
			"::error file=main.rs,line=1,col=1::Missing header.",
		))
		.stdout(predicates::str::contains(
			"::warning file=old.rs,line=1,col=1::The current year is 2024.",
		));

	Ok(())
}

#[test]
fn check_without_template_is_a_configuration_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n")?;

	common::headr_at(tmp.path(), "check")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no header template found"));

	Ok(())
}

#[test]
fn check_with_multiple_templates_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("other.header.template"), common::TEMPLATE)?;

	common::headr_at(tmp.path(), "check")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("more than one header template found"))
		.stderr(predicates::str::contains("other.header.template"));

	Ok(())
}

#[test]
fn check_reports_template_syntax_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), "// {Author}\n")?;

	common::headr_at(tmp.path(), "check")
		.assert()
		.code(2)
		.stderr(predicates::str::contains(
			"Unrecognized special segment 'Author'",
		));

	Ok(())
}

#[test]
fn check_with_empty_template_is_disabled() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), "")?;
	std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n")?;

	common::headr_at(tmp.path(), "check")
		.assert()
		.success()
		.stdout(predicates::str::contains("Header checking is disabled"));

	Ok(())
}

#[test]
fn check_rejects_invalid_year() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;

	common::headr_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.arg("--year")
		.arg("99")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("invalid current year").and(
			predicates::str::contains("99"),
		));

	Ok(())
}

#[test]
fn check_uses_year_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("headr.toml"), "current_year = 2021\n")?;
	std::fs::write(tmp.path().join("main.rs"), "// Copyright (c) 2021 Acme\n")?;

	common::headr_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed"));

	Ok(())
}

#[test]
fn parses_check_arguments() {
	let cli = HeadrCli::parse_from([
		"headr",
		"check",
		"--format",
		"github",
		"--fail-on-outdated",
		"--year",
		"2024",
	]);

	assert_eq!(cli.year, Some(2024));
	assert!(matches!(
		cli.command,
		Some(Commands::Check {
			diff: false,
			format: OutputFormat::Github,
			fail_on_outdated: true,
		})
	));
}
