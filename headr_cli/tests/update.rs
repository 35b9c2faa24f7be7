mod common;

use headr_core::AnyEmptyResult;

#[test]
fn update_inserts_missing_headers() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n")?;

	common::headr_at(tmp.path(), "update")
		.assert()
		.success()
		.stdout(predicates::str::contains("Updated 1 file(s)."));

	let content = std::fs::read_to_string(tmp.path().join("main.rs"))?;
	assert_eq!(content, "// Copyright (c) 2024 Acme\nfn main() {}\n");

	common::headr_at(tmp.path(), "check").assert().success();

	Ok(())
}

#[test]
fn update_keeps_start_year() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(
		tmp.path().join("lib.rs"),
		"// Copyright (c) 2019 Acme\npub fn lib() {}\n",
	)?;

	common::headr_at(tmp.path(), "update").assert().success();

	let content = std::fs::read_to_string(tmp.path().join("lib.rs"))?;
	assert_eq!(
		content,
		"// Copyright (c) 2019\u{2013}2024 Acme\npub fn lib() {}\n"
	);

	Ok(())
}

#[test]
fn update_moves_header_to_top() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(
		tmp.path().join("lib.rs"),
		"#![no_std]\n// Copyright (c) 2024 Acme\n",
	)?;

	common::headr_at(tmp.path(), "update")
		.arg("--verbose")
		.assert()
		.success()
		.stdout(predicates::str::contains("lib.rs (move header to top)"));

	let content = std::fs::read_to_string(tmp.path().join("lib.rs"))?;
	assert_eq!(content, "// Copyright (c) 2024 Acme\n#![no_std]\n");

	Ok(())
}

#[test]
fn update_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n")?;

	common::headr_at(tmp.path(), "update")
		.arg("--dry-run")
		.assert()
		.success()
		.stdout(predicates::str::contains("Dry run: would update 1 file(s):"))
		.stdout(predicates::str::contains("main.rs (insert header)"));

	let content = std::fs::read_to_string(tmp.path().join("main.rs"))?;
	assert_eq!(content, "fn main() {}\n");

	Ok(())
}

#[test]
fn update_noop_when_current() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(tmp.path().join("main.rs"), "// Copyright (c) 2024 Acme\n")?;

	common::headr_at(tmp.path(), "update")
		.assert()
		.success()
		.stdout(predicates::str::contains("All headers are already up to date."));

	Ok(())
}

#[test]
fn update_skips_excluded_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("header.template"), common::TEMPLATE)?;
	std::fs::write(
		tmp.path().join("headr.toml"),
		"[exclude]\npatterns = [\"generated/\"]\n",
	)?;
	std::fs::create_dir_all(tmp.path().join("generated"))?;
	std::fs::write(tmp.path().join("generated/out.rs"), "fn out() {}\n")?;

	common::headr_at(tmp.path(), "update")
		.assert()
		.success()
		.stdout(predicates::str::contains("All headers are already up to date."));

	let content = std::fs::read_to_string(tmp.path().join("generated/out.rs"))?;
	assert_eq!(content, "fn out() {}\n");

	Ok(())
}
