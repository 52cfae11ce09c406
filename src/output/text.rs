//! Text output formatter for human-readable display

use crate::orchestrator::LaunchPlan;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn label(&self, text: &str) -> String {
        let padded = format!("{:<13}", text);
        if self.color {
            padded.dimmed().to_string()
        } else {
            padded
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn list(items: Vec<String>) -> String {
        if items.is_empty() {
            "(none)".to_string()
        } else {
            items.join(", ")
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, plan: &LaunchPlan, writer: &mut dyn Write) -> std::io::Result<()> {
        // Quiet: just the install list, one spec per line
        if self.verbosity == Verbosity::Quiet {
            for spec in plan.missing.iter() {
                writeln!(writer, "{}", spec)?;
            }
            return Ok(());
        }

        let prefix = if self.color {
            "(dry-run)".cyan().to_string()
        } else {
            "(dry-run)".to_string()
        };
        writeln!(
            writer,
            "{} {}",
            prefix,
            self.heading(&plan.script.display().to_string())
        )?;

        let manifest = plan
            .manifest
            .as_ref()
            .map(|(path, _)| path.display().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        writeln!(writer, "  {}{}", self.label("manifest:"), manifest)?;

        let state = if plan.environment_exists {
            "existing"
        } else {
            "new"
        };
        writeln!(
            writer,
            "  {}{} ({}, {})",
            self.label("environment:"),
            plan.environment,
            plan.environment_path.display(),
            state
        )?;

        writeln!(
            writer,
            "  {}{}",
            self.label("imports:"),
            Self::list(plan.imports.iter().map(str::to_string).collect())
        )?;

        if self.verbosity == Verbosity::Verbose {
            writeln!(
                writer,
                "  {}{}",
                self.label("declared:"),
                Self::list(plan.declared.iter().map(ToString::to_string).collect())
            )?;
            writeln!(
                writer,
                "  {}{}",
                self.label("installed:"),
                Self::list(
                    plan.installed
                        .packages()
                        .iter()
                        .map(ToString::to_string)
                        .collect()
                )
            )?;
        }

        if plan.missing.is_empty() {
            let done = "Nothing to install";
            if self.color {
                writeln!(writer, "  {}", done.green())?;
            } else {
                writeln!(writer, "  {}", done)?;
            }
            return Ok(());
        }

        writeln!(
            writer,
            "  {}",
            self.heading(&format!("Would install ({}):", plan.missing.len()))
        )?;
        for spec in plan.missing.iter() {
            writeln!(writer, "    {}", spec)?;
        }

        Ok(())
    }
}
