//! Human and machine renderings of a [`ReconciliationReport`].

use std::fmt::Write as _;

use clap::ValueEnum;

use crate::core::delta::{ReconciliationReport, ResourceDiff};
use crate::core::error::{ReconcileError, ReconcileResult};
use crate::core::types::ResourceKind;

const RULE: &str = "==================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Html,
    Json,
    Toon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finding {
    Missing,
    Extra,
    Renamed,
}

impl Finding {
    fn heading(self, kind: ResourceKind, n: usize) -> String {
        let what = kind.plural();
        match (self, kind) {
            (Finding::Missing, _) => format!("missing {n} {what}"),
            (Finding::Extra, ResourceKind::Index) => {
                format!("following {n} {what} should be removed")
            }
            (Finding::Extra, ResourceKind::Alias) => format!("{n} {what} to delete"),
            (Finding::Renamed, _) => format!("{n} {what} should be renamed"),
        }
    }

    fn color(self) -> &'static str {
        match self {
            Finding::Missing => "red",
            Finding::Extra | Finding::Renamed => "blue",
        }
    }
}

fn findings(diff: &ResourceDiff) -> Vec<(Finding, Vec<String>)> {
    let mut out = Vec::new();
    if !diff.missing.is_empty() {
        out.push((Finding::Missing, diff.missing.clone()));
    }
    if !diff.extra.is_empty() {
        out.push((Finding::Extra, diff.extra.clone()));
    }
    if !diff.renamed.is_empty() {
        let pairs = diff
            .renamed
            .iter()
            .map(|p| format!("{} -> {}", p.from, p.to))
            .collect();
        out.push((Finding::Renamed, pairs));
    }
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders reports for one environment (the `BRANCH` label).
pub struct ReportFormatter<'a> {
    environment: &'a str,
}

impl<'a> ReportFormatter<'a> {
    pub fn new(environment: &'a str) -> Self {
        Self { environment }
    }

    pub fn subject(&self) -> String {
        format!("ES {} monitor status", self.environment)
    }

    pub fn render(&self, report: &ReconciliationReport, format: ReportFormat) -> ReconcileResult<String> {
        match format {
            ReportFormat::Text => Ok(self.text(report)),
            ReportFormat::Html => Ok(self.html(report)),
            ReportFormat::Json => serde_json::to_string_pretty(report)
                .map_err(|e| ReconcileError::Render(e.to_string())),
            ReportFormat::Toon => {
                toon_format::encode_default(report).map_err(|e| ReconcileError::Render(e.to_string()))
            }
        }
    }

    /// Plain text; empty when the report is clean.
    pub fn text(&self, report: &ReconciliationReport) -> String {
        let mut sections = Vec::new();
        for diff in [&report.indices, &report.aliases] {
            let lines: Vec<String> = findings(diff)
                .into_iter()
                .map(|(f, items)| format!("{}: {}", f.heading(diff.kind, items.len()), items.join(", ")))
                .collect();
            if lines.is_empty() {
                continue;
            }
            sections.push(format!(
                "{} status ({} environment):\n{RULE}\n{}\n{RULE}\n",
                capitalize(diff.kind.plural()),
                self.environment,
                lines.join("\n")
            ));
        }
        sections.join("\n\n")
    }

    /// HTML fragment for the mail body; empty when the report is clean.
    pub fn html(&self, report: &ReconciliationReport) -> String {
        let mut sections = Vec::new();
        for diff in [&report.indices, &report.aliases] {
            let mut body = String::new();
            for (f, items) in findings(diff) {
                if !body.is_empty() {
                    body.push('\n');
                }
                let _ = writeln!(
                    body,
                    "<b><p style=\"color:{}\">{}:</p></b> <small>{}</small>",
                    f.color(),
                    f.heading(diff.kind, items.len()),
                    escape_html(&items.join(", "))
                );
            }
            if body.is_empty() {
                continue;
            }
            sections.push(format!(
                "<b>{} status ({} environment):\n{RULE}</b>\n{body}<b>{RULE}</b>\n",
                capitalize(diff.kind.plural()),
                escape_html(self.environment),
            ));
        }
        sections.join("\n\n")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
