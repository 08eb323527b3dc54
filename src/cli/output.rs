//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{ConfigHasher, Manifest, ValidationResult};
use crate::engine::{Action, RunReport};
use crate::state::{LockInfo, ProviderState};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Outcome row for table display.
#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "ID")]
    id: String,
}

/// State record row for table display.
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Hash")]
    hash: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the report of an apply, refresh or destroy run.
    #[must_use]
    pub fn format_report(&self, verb: &str, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(verb, report),
        }
    }

    fn format_report_text(verb: &str, report: &RunReport) -> String {
        if report.outcomes.is_empty() {
            return format!("{} Nothing to {verb}.\n", "✓".green());
        }

        let mut output = String::new();
        let rows: Vec<OutcomeRow> = report
            .outcomes
            .iter()
            .map(|o| OutcomeRow {
                action: Self::format_action(o.action),
                address: o.address.clone(),
                id: o.id.as_deref().map_or_else(String::new, |id| Self::truncate(id, 40)),
            })
            .collect();
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        for failed in report.outcomes.iter().filter(|o| o.action == Action::Failed) {
            let _ = writeln!(
                output,
                "\n{} {}: {}",
                "✗".red(),
                failed.address,
                failed.error.as_deref().unwrap_or("unknown error")
            );
        }

        let status = if report.success() {
            format!("{} {verb} complete", "✓".green())
        } else {
            format!("{} {verb} failed", "✗".red())
        };
        let _ = write!(
            output,
            "\n{status}: {} created, {} updated, {} refreshed, {} deleted, {} gone, {} read\n",
            report.count(Action::Create).to_string().green(),
            report.count(Action::Update).to_string().yellow(),
            report.count(Action::Refresh),
            report.count(Action::Delete).to_string().red(),
            report.count(Action::Gone),
            report.count(Action::Read),
        );

        output
    }

    /// Formats datasource results with their attributes.
    #[must_use]
    pub fn format_data(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Json => {
                let by_address: serde_json::Map<String, serde_json::Value> = report
                    .outcomes
                    .iter()
                    .map(|o| {
                        let value = match (&o.attributes, &o.error) {
                            (Some(attributes), _) => serde_json::Value::Object(attributes.clone()),
                            (None, Some(error)) => serde_json::json!({ "error": error }),
                            (None, None) => serde_json::Value::Null,
                        };
                        (o.address.clone(), value)
                    })
                    .collect();
                serde_json::to_string_pretty(&by_address).unwrap_or_default()
            }
            OutputFormat::Text => {
                if report.outcomes.is_empty() {
                    return String::from("No datasources declared.\n");
                }

                let mut output = String::new();
                for outcome in &report.outcomes {
                    let _ = writeln!(output, "\n{}", outcome.address.bold());
                    match (&outcome.attributes, &outcome.error) {
                        (Some(attributes), _) => {
                            let mut keys: Vec<_> = attributes.keys().collect();
                            keys.sort();
                            for key in keys {
                                let _ = writeln!(
                                    output,
                                    "   {key} = {}",
                                    Self::truncate(&attributes[key.as_str()].to_string(), 100)
                                );
                            }
                        }
                        (None, Some(error)) => {
                            let _ = writeln!(output, "   {} {error}", "✗".red());
                        }
                        (None, None) => {}
                    }
                }
                output
            }
        }
    }

    /// Formats a validated manifest summary.
    #[must_use]
    pub fn format_validation(
        &self,
        manifest: &Manifest,
        result: &ValidationResult,
        show_warnings: bool,
    ) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "valid": true,
                "project_id": manifest.provider.project_id,
                "endpoint": manifest.provider.endpoint,
                "resources": manifest.resources.iter().map(|b| b.address()).collect::<Vec<_>>(),
                "data": manifest.data.iter().map(|b| b.address()).collect::<Vec<_>>(),
                "warnings": result.warnings,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("{} Manifest is valid!\n", "✓".green());

                if show_warnings && !result.warnings.is_empty() {
                    let _ = writeln!(output, "\n{} Warnings:", "⚠".yellow());
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }

                let _ = writeln!(output, "\nManifest summary:");
                let _ = writeln!(output, "   Project: {}", manifest.provider.project_id);
                let _ = writeln!(output, "   Endpoint: {}", manifest.provider.endpoint);
                let _ = writeln!(output, "   Resources: {}", manifest.resources.len());
                let _ = writeln!(output, "   Datasources: {}", manifest.data.len());
                output
            }
        }
    }

    /// Formats the recorded state.
    #[must_use]
    pub fn format_state(&self, state: &ProviderState, lock: Option<&LockInfo>) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "state": state,
                "lock": lock,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let hasher = ConfigHasher::new();
                let mut output = String::new();

                let _ = write!(output, "\nState: {}\n\n", state.project_id);
                let _ = writeln!(output, "   Version: {}", state.version);
                let _ = writeln!(output, "   Last updated: {}", state.last_updated);
                let _ = writeln!(output, "   Resources: {}", state.resources.len());
                let _ = writeln!(output, "   Datasources: {}", state.data.len());
                if let Some(lock) = lock {
                    let _ = writeln!(
                        output,
                        "   {} Locked by {} for {} ({}s left)",
                        "⚠".yellow(),
                        lock.holder,
                        lock.operation,
                        lock.remaining_secs()
                    );
                }

                if !state.resources.is_empty() {
                    let rows: Vec<RecordRow> = state
                        .resources
                        .iter()
                        .map(|r| RecordRow {
                            address: r.address(),
                            id: Self::truncate(&r.id, 40),
                            hash: hasher.short_hash(&r.config_hash),
                            updated: r.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                        })
                        .collect();
                    output.push('\n');
                    output.push_str(&Table::new(rows).to_string());
                    output.push('\n');
                }

                output
            }
        }
    }

    /// Formats an action with color.
    fn format_action(action: Action) -> String {
        match action {
            Action::Create => "+create".green().to_string(),
            Action::Update => "~update".yellow().to_string(),
            Action::Refresh => "refresh".dimmed().to_string(),
            Action::Delete => "-delete".red().to_string(),
            Action::Gone => "gone".dimmed().to_string(),
            Action::Read => "read".cyan().to_string(),
            Action::Failed => "failed".red().bold().to_string(),
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{head}...")
        }
    }

    /// Formats a success message.
    #[must_use]
    pub fn success(&self, message: &str) -> String {
        self.message("success", &"✓".green().to_string(), message)
    }

    /// Formats an error message.
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        self.message("error", &"✗".red().to_string(), message)
    }

    /// Formats a warning message.
    #[must_use]
    pub fn warning(&self, message: &str) -> String {
        self.message("warning", &"⚠".yellow().to_string(), message)
    }

    fn message(&self, status: &str, symbol: &str, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": status, "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{symbol} {message}"),
        }
    }
}
