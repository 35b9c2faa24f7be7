use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const TEMPLATE: &str = "// Copyright (c) {YearRange} Acme\n";

pub fn headr_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("headr"));
	cmd.env("NO_COLOR", "1").env_remove("HEADR_LOG");
	cmd
}

/// A `headr` command running against `root` with 2024 as the current year.
pub fn headr_at(root: &Path, command: &str) -> Command {
	let mut cmd = headr_cmd();
	cmd.arg(command)
		.arg("--path")
		.arg(root)
		.arg("--year")
		.arg("2024");
	cmd
}
