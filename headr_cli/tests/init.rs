mod common;

use headr_core::AnyEmptyResult;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::headr_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created header template"))
		.stdout(predicates::str::contains("Created headr.toml"));

	let template = std::fs::read_to_string(tmp.path().join("header.template"))?;
	assert!(template.contains("{YearRange}"));
	assert!(tmp.path().join("headr.toml").is_file());

	// The sample config is valid.
	common::headr_at(tmp.path(), "render")
		.assert()
		.success()
		.stdout("// Copyright (c) 2024 Your Name. All rights reserved.\n");

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let template_path = tmp.path().join("license.header.template");
	std::fs::write(&template_path, "existing content")?;

	common::headr_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Header template already exists"));

	assert_eq!(std::fs::read_to_string(&template_path)?, "existing content");
	assert!(!tmp.path().join("header.template").exists());

	Ok(())
}
