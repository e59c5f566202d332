//! Command-line interface module for media-renamer.
//!
//! This module handles:
//! - Argument parsing
//! - The interactive folder prompt
//! - Dry-run previews
//! - Running the renamer and printing its notifications

use crate::category::Category;
use crate::config::RenamerConfig;
use crate::output::OutputFormatter;
use crate::renamer::{PlanStatus, RenameEvent, RenamePlan, RenameReport, Renamer};
use clap::Parser;
use dialoguer::Input;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Rename the images and videos of a folder to Image_N / Video_N.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "media-renamer", version, about)]
pub struct Args {
    /// Folder to process. Prompted for when omitted.
    pub folder: Option<PathBuf>,

    /// Show what would be renamed without touching any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Number files in directory order instead of sorting them by name.
    #[arg(long)]
    pub unsorted: bool,

    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// How a run ended, when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every planned rename went through (skips included).
    Completed,
    /// At least one rename failed on the filesystem.
    CompletedWithFailures,
    /// Nothing was modified.
    DryRun,
}

/// One line of a dry-run preview.
#[derive(Debug, Serialize)]
struct PreviewEntry<'a> {
    original: &'a str,
    renamed: &'a str,
    category: Category,
    skipped: Option<&'a str>,
}

/// Runs the CLI application.
///
/// Prompts for the folder when `args.folder` is `None`.
///
/// # Examples
///
/// ```no_run
/// use media_renamer::cli::{Args, run_cli};
/// use std::path::PathBuf;
///
/// let args = Args {
///     folder: Some(PathBuf::from("/path/to/photos")),
///     ..Default::default()
/// };
/// match run_cli(&args) {
///     Ok(outcome) => println!("{:?}", outcome),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<RunOutcome, String> {
    let folder = match &args.folder {
        Some(folder) => folder.clone(),
        None => prompt_folder()?,
    };
    run_in_folder(&folder, args)
}

/// Runs the renamer on `folder` with the remaining options of `args`.
pub fn run_in_folder(folder: &Path, args: &Args) -> Result<RunOutcome, String> {
    let config = RenamerConfig::load(args.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let sort = config.renamer.sort_entries && !args.unsorted;
    let renamer = Renamer::from_config(&config)
        .map_err(|e| e.to_string())?
        .sort_entries(sort);

    let plan = renamer.plan(folder).map_err(|e| e.to_string())?;

    if args.dry_run {
        show_dry_run(&plan, args.json)?;
        return Ok(RunOutcome::DryRun);
    }

    let report = if args.json {
        let report = renamer.execute(&plan, |_| {});
        print_json(&report)?;
        report
    } else {
        execute_with_progress(&renamer, &plan)
    };

    if report.has_failures() {
        Ok(RunOutcome::CompletedWithFailures)
    } else {
        Ok(RunOutcome::Completed)
    }
}

/// Asks for the folder path on the terminal.
pub fn prompt_folder() -> Result<PathBuf, String> {
    let path: String = Input::new()
        .with_prompt("Enter the folder path")
        .interact_text()
        .map_err(|e| format!("Could not read folder path: {}", e))?;
    Ok(PathBuf::from(path.trim()))
}

fn execute_with_progress(renamer: &Renamer, plan: &RenamePlan) -> RenameReport {
    OutputFormatter::info(&format!("Renaming files in: {}", plan.folder.display()));

    let pb = OutputFormatter::create_progress_bar(plan.renames.len() as u64);
    let report = renamer.execute(plan, |event| match event {
        RenameEvent::Renamed(record) => {
            pb.suspend(|| OutputFormatter::renamed(record));
            pb.inc(1);
        }
        RenameEvent::Skipped(issue) => {
            pb.suspend(|| OutputFormatter::skipped(issue));
            pb.inc(1);
        }
        RenameEvent::Failed(issue) => {
            pb.suspend(|| OutputFormatter::failed(issue));
            pb.inc(1);
        }
        RenameEvent::Completed(_) => pb.finish_and_clear(),
    });

    OutputFormatter::plain("Renaming process completed.");
    OutputFormatter::summary_table(&report.category_counts(), report.untouched.len());

    if !report.skipped.is_empty() {
        OutputFormatter::warning(&format!(
            "{} file(s) skipped because their new name was already taken.",
            report.skipped.len()
        ));
    }
    if report.has_failures() {
        OutputFormatter::error(&format!(
            "{} file(s) could not be renamed. Please review errors above.",
            report.failed.len()
        ));
    }

    report
}

fn show_dry_run(plan: &RenamePlan, json: bool) -> Result<(), String> {
    if json {
        let preview: Vec<PreviewEntry<'_>> = plan
            .renames
            .iter()
            .map(|r| PreviewEntry {
                original: &r.entry.name,
                renamed: &r.new_name,
                category: r.category,
                skipped: match &r.status {
                    PlanStatus::Conflict(reason) => Some(reason.as_str()),
                    _ => None,
                },
            })
            .collect();
        return print_json(&preview);
    }

    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", plan.folder.display()));

    if plan.is_empty() {
        OutputFormatter::plain("No images or videos found to rename.");
        return Ok(());
    }

    for planned in &plan.renames {
        match &planned.status {
            PlanStatus::Conflict(reason) => OutputFormatter::warning(&format!(
                "Would skip: {} ({})",
                planned.entry.name, reason
            )),
            PlanStatus::Unchanged => OutputFormatter::plain(&format!(
                " - {} (already named)",
                planned.entry.name
            )),
            PlanStatus::Ready => OutputFormatter::plain(&format!(
                " - {} → {}",
                planned.entry.name, planned.new_name
            )),
        }
    }

    OutputFormatter::summary_table(&plan.category_counts(), plan.untouched.len());
    OutputFormatter::success("Dry run complete. No files were modified.");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("JSON serialization failed: {}", e))?;
    println!("{}", json);
    Ok(())
}
