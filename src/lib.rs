//! media-renamer - sequential renaming of images and videos
//!
//! This library classifies the files of a single folder by extension and
//! renames them to `Image_N` / `Video_N`, with per-category counters that
//! restart at 1 on every run. Renames are planned first, checked for name
//! collisions, then executed one file at a time.

pub mod category;
pub mod cli;
pub mod config;
pub mod output;
pub mod renamer;

pub use category::{Category, CategoryTable};
pub use config::{CompiledFilters, ConfigError, RenamerConfig};
pub use renamer::{RenameError, RenameEvent, RenamePlan, RenameReport, Renamer};

pub use cli::{Args, RunOutcome, run_cli};
