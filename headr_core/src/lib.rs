//! `headr_core` is the core library for the headr source header checker. It
//! parses header templates, matches them against source files with a single
//! compiled regular expression, and regenerates headers while keeping the
//! values a previous header already carries.
//!
//! ## Processing Pipeline
//!
//! ```text
//! header.template
//!   → Parser (splits the template into literal and special segments)
//!   → HeaderTemplate (compiles one tolerant regex for all segments)
//!   → Project scanner (finds the template and the files to check)
//!   → Engine (matches each file, reports problems, computes fixes)
//! ```
//!
//! ## Template Syntax
//!
//! Text is copied literally. `{{` and `}}` stand for literal braces.
//! `{Year}` is the current year and `{YearRange}` is a start year followed
//! by the current year, such as `2019–2024`. Matching ignores letter case.
//! Headers whose whitespace or copyright sign spelling drifted still match
//! but are reported as inexact.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `headr.toml`.
//! - [`project`]: Template discovery and directory walking.
//!
//! ## Key Types
//!
//! - [`HeaderTemplate`]: An immutable sequence of [`Segment`]s with its
//!   lazily compiled pattern.
//! - [`DynamicValues`]: The current year, supplied by the caller.
//! - [`MatchResult`]: Where a header was found and what is wrong with it.
//! - [`ProjectContext`]: A scanned project ready for checking or updating.
//! - [`CheckResult`]: Per-file reports of header problems.
//! - [`UpdateResult`]: Fixed contents for files whose header needs work.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use headr_core::check_project;
//! use headr_core::compute_updates;
//! use headr_core::project::load_project;
//! use headr_core::write_updates;
//!
//! let ctx = load_project(Path::new(".")).unwrap();
//!
//! let result = check_project(&ctx).unwrap();
//! if !result.is_ok() {
//!     eprintln!("{} file(s) with header problems", result.problems().count());
//! }
//!
//! let updates = compute_updates(&ctx).unwrap();
//! write_updates(&updates).unwrap();
//! ```

pub use config::*;
pub use engine::*;
pub use error::*;
pub use parser::*;
pub use position::*;
pub use project::*;
pub use segment::*;
pub use template::*;
pub use values::*;

pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
mod parser;
mod position;
pub mod project;
mod segment;
mod template;
mod values;
