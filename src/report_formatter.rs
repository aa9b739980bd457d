use crate::file_processor::{FileOutcome, FileReport, SanitizeReport, TextChange};
use colored::*;
use similar::TextDiff;
use std::io::IsTerminal;
use std::path::Path;

pub struct ReportFormatter;

impl ReportFormatter {
    /// Auto-detect if we should use colors
    pub fn should_use_color() -> bool {
        // Check NO_COLOR env var (https://no-color.org/)
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }

        std::io::stdout().is_terminal()
    }

    /// One line per file followed by a summary
    pub fn format_report(report: &SanitizeReport, dry_run: bool, use_color: bool) -> String {
        let mut output = String::new();

        if dry_run {
            let header = "Dry run: no files were written";
            if use_color {
                output.push_str(&format!("{}\n", header.bold().cyan()));
            } else {
                output.push_str(&format!("{}\n", header));
            }
        }

        for file in &report.files {
            output.push_str(&Self::format_file(file, use_color));
            output.push('\n');
        }

        output.push_str(&Self::format_summary(report, use_color));
        output
    }

    /// Single status line for one file
    pub fn format_file(file: &FileReport, use_color: bool) -> String {
        let path = file.path.display().to_string();

        let (label, detail) = match &file.outcome {
            FileOutcome::Sanitized { lines_removed } => {
                let plural = if *lines_removed == 1 { "" } else { "s" };
                ("sanitized", format!(" ({} line{} removed)", lines_removed, plural))
            }
            FileOutcome::Shredded => ("shredded", String::new()),
            FileOutcome::Copied => ("copied", String::new()),
            FileOutcome::Failed(err) => ("failed", format!(": {}", err)),
        };

        if !use_color {
            return format!("{:<10} {}{}", label, path, detail);
        }

        let padded = format!("{:<10}", label);
        let label = match &file.outcome {
            FileOutcome::Sanitized { .. } => padded.green().bold(),
            FileOutcome::Shredded => padded.yellow().bold(),
            FileOutcome::Copied => padded.dimmed(),
            FileOutcome::Failed(_) => padded.red().bold(),
        };
        format!("{} {}{}", label, path, detail)
    }

    pub fn format_summary(report: &SanitizeReport, use_color: bool) -> String {
        let total = report.files.len();
        let failed = report.failures().count();
        let plural = if total == 1 { "" } else { "s" };

        if use_color {
            let mut parts = vec![
                format!("{} {}", report.sanitized(), "sanitized".green()),
                format!("{} {}", report.shredded(), "shredded".yellow()),
                format!("{} {}", report.copied(), "copied".dimmed()),
            ];
            if failed > 0 {
                parts.push(format!("{} {}", failed, "failed".red().bold()));
            }
            format!(
                "\nTotal: {} file{} ({})\n",
                total.to_string().bold().white(),
                plural,
                parts.join(", ")
            )
        } else {
            let mut summary = format!(
                "\nTotal: {} file{} ({} sanitized, {} shredded, {} copied",
                total,
                plural,
                report.sanitized(),
                report.shredded(),
                report.copied()
            );
            if failed > 0 {
                summary.push_str(&format!(", {} failed", failed));
            }
            summary.push_str(")\n");
            summary
        }
    }

    /// Unified diff between a file's original and sanitized text
    pub fn format_diff(path: &Path, change: &TextChange, context: usize, use_color: bool) -> String {
        if change.before == change.after {
            return String::new();
        }

        let name = path.display().to_string();
        let diff = TextDiff::from_lines(&change.before, &change.after);
        let unified = diff
            .unified_diff()
            .context_radius(context)
            .header(&format!("a/{}", name), &format!("b/{}", name))
            .to_string();

        if !use_color {
            return unified;
        }

        let mut output = String::new();
        for line in unified.split_inclusive('\n') {
            let colored_line = if line.starts_with("+++") || line.starts_with("---") {
                line.bold().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else {
                line.dimmed().to_string()
            };
            output.push_str(&colored_line);
        }
        output
    }
}
