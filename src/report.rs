//! Deployment summaries and validation reports

use crate::definition::DefinitionType;
use crate::model::NodePath;
use assertion::ValidationResult;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Outcome of a completed deployment
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Paths of deployed nodes, in visit order
    pub deployed: Vec<String>,
    /// Number of deployed nodes per definition type
    pub by_type: BTreeMap<String, usize>,
}

impl DeploymentSummary {
    pub(crate) fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            deployed: Vec::new(),
            by_type: BTreeMap::new(),
        }
    }

    pub(crate) fn record(&mut self, path: &NodePath, definition_type: DefinitionType) {
        self.deployed.push(path.to_string());
        *self
            .by_type
            .entry(definition_type.name().to_string())
            .or_default() += 1;
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    /// Total number of nodes deployed
    pub fn total(&self) -> usize {
        self.deployed.len()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Validation results for one node
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub path: NodePath,
    pub definition_type: &'static str,
    pub results: Vec<ValidationResult>,
}

impl NodeReport {
    pub fn is_valid(&self) -> bool {
        assertion::all_valid(&self.results)
    }
}

/// Validation results for a whole tree, in visit order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub nodes: Vec<NodeReport>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.nodes.iter().all(NodeReport::is_valid)
    }

    /// Every failing result with the path of its node
    pub fn failures(&self) -> impl Iterator<Item = (&NodePath, &ValidationResult)> {
        self.nodes.iter().flat_map(|node| {
            assertion::failures(&node.results).map(move |result| (&node.path, result))
        })
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn result_count(&self) -> usize {
        self.nodes.iter().map(|n| n.results.len()).sum()
    }

    /// Report for the node at `path`
    pub fn node(&self, path: &str) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.path.to_string() == path)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Render a validation report for the terminal
pub fn format_report(report: &ValidationReport) -> String {
    let mut out = String::new();

    if report.is_valid() {
        let _ = writeln!(
            out,
            "  {} {} checks passed across {} nodes",
            "✓".green(),
            report.result_count(),
            report.nodes.len()
        );
        return out;
    }

    let _ = writeln!(
        out,
        "┌─ {} ─────────────────────────────────────────┐",
        "Validation Report".bold()
    );
    let _ = writeln!(out, "│");

    for node in report.nodes.iter().filter(|n| !n.is_valid()) {
        let _ = writeln!(out, "│ {}", node.path.to_string().bold());
        for result in assertion::failures(&node.results) {
            let _ = writeln!(out, "│   {} {}", "✗".red(), result.message);
        }
        let skipped = node.results.iter().filter(|r| r.skipped).count();
        if skipped > 0 {
            let _ = writeln!(out, "│   {}", format!("({skipped} skipped)").dimmed());
        }
        let _ = writeln!(out, "│");
    }

    let _ = writeln!(out, "├─────────────────────────────────────────────────────┤");
    let _ = writeln!(
        out,
        "│ {} failed, {} passed",
        report.failure_count().to_string().red(),
        (report.result_count() - report.failure_count())
            .to_string()
            .green()
    );
    let _ = writeln!(out, "└─────────────────────────────────────────────────────┘");
    out
}

/// Print a validation report to stdout
pub fn display_report(report: &ValidationReport) {
    println!();
    print!("{}", format_report(report));
}
