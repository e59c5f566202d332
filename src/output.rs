//! Output formatting and styling module.
//!
//! All user-facing console output goes through [`OutputFormatter`], so the
//! renamer itself only produces data and events.

use crate::category::Category;
use crate::renamer::{EntryIssue, RenameRecord};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use media_renamer::output::OutputFormatter;
    /// OutputFormatter::error("The folder '/tmp/nope' does not exist. Please check the path.");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints the notification for a renamed file.
    pub fn renamed(record: &RenameRecord) {
        if record.original == record.renamed {
            println!("{} {} (already named)", "=".dimmed(), record.renamed);
        } else {
            Self::success(&format!("Renamed: {} -> {}", record.original, record.renamed));
        }
    }

    /// Prints the notification for a file skipped because of a name collision.
    pub fn skipped(issue: &EntryIssue) {
        Self::warning(&format!("Skipped: {} ({})", issue.name, issue.reason));
    }

    /// Prints the notification for a file that could not be renamed.
    pub fn failed(issue: &EntryIssue) {
        Self::error(&format!("Failed: {} ({})", issue.name, issue.reason));
    }

    /// Creates and returns a progress bar for the rename phase.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints a summary table with per-category counts.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use media_renamer::category::Category;
    /// use media_renamer::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert(Category::Image, 15);
    /// counts.insert(Category::Video, 3);
    /// OutputFormatter::summary_table(&counts, 4);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<Category, usize>, untouched: usize) {
        Self::header("SUMMARY");

        let width = "Untouched".len();
        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        let mut total = 0;
        for (category, count) in category_counts {
            total += count;
            println!(
                "{:<width$} | {} {}",
                category.prefix(),
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }
        println!(
            "{:<width$} | {} {}",
            "Untouched",
            untouched.to_string().dimmed(),
            plural(untouched),
            width = width
        );

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Renamed".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = width
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
