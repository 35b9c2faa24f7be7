mod common;

use headr_core::AnyEmptyResult;
use predicates::prelude::*;

#[test]
fn render_prints_fresh_header() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;

	common::headr_at(tmp.path(), "render")
		.assert()
		.success()
		.stdout("// Copyright (c) 2024 Acme\n");

	Ok(())
}

#[test]
fn list_shows_header_status() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("a.rs"), "// Copyright (c) 2024 Acme\n")?;
	std::fs::write(tmp.path().join("b.rs"), "fn b() {}\n")?;
	std::fs::write(tmp.path().join("c.rs"), "//   Copyright (c) 2024 Acme\n")?;

	common::headr_at(tmp.path(), "list")
		.assert()
		.success()
		.stdout(predicates::str::contains("Template: header.template"))
		.stdout(predicates::str::contains("exact    a.rs"))
		.stdout(predicates::str::contains("missing  b.rs"))
		.stdout(predicates::str::contains("inexact  c.rs"))
		.stdout(predicates::str::contains("3 file(s)"));

	Ok(())
}

#[test]
fn list_rejects_files_over_size_limit() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("headr.toml"), "max_file_size = 8\n")?;
	std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n")?;

	common::headr_at(tmp.path(), "list")
		.assert()
		.code(2)
		.stdout(predicates::str::contains("main.rs").not());

	Ok(())
}

#[test]
fn verbose_logs_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;

	common::headr_at(tmp.path(), "render")
		.arg("--verbose")
		.assert()
		.success()
		.stderr(predicates::str::contains("parsed header template"));

	Ok(())
}
