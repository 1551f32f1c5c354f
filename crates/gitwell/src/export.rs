//! Report exports
//!
//! Markdown and CSV renderings of analysis results. JSON goes straight
//! through serde.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use gitwell_core::{format, RepoSummary, TrendPoint};

use crate::analyzer::RepoAnalysis;
use crate::report::HealthReport;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "md" | "markdown" => Ok(Self::Markdown),
            other => Err(format!(
                "unknown format '{}' (expected json, csv or markdown)",
                other
            )),
        }
    }
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "md",
        }
    }
}

/// Everything that goes into a written report
pub struct ReportDocument<'a> {
    pub name: &'a str,
    pub summary: Option<&'a RepoSummary>,
    pub analysis: &'a RepoAnalysis,
    pub report: &'a HealthReport,
    pub generated_at: DateTime<Utc>,
}

/// Render a Markdown health report
pub fn markdown_report(doc: &ReportDocument<'_>) -> String {
    let mut out = String::new();
    let metrics = &doc.analysis.metrics;

    let _ = writeln!(out, "# {} - Health Report", doc.name);
    out.push('\n');

    if let Some(repo) = doc.summary {
        let description = if repo.description.is_empty() {
            "No description"
        } else {
            repo.description.as_str()
        };
        out.push_str("## Overview\n\n");
        let _ = writeln!(out, "- **Name**: {}", repo.name);
        let _ = writeln!(out, "- **Description**: {}", description);
        let _ = writeln!(out, "- **Language**: {}", repo.language);
        let _ = writeln!(out, "- **Stars**: {}", format::compact_number(repo.stars));
        let _ = writeln!(out, "- **Forks**: {}", format::compact_number(repo.forks));
        let _ = writeln!(out, "- **Watchers**: {}", format::compact_number(repo.watchers));
        let _ = writeln!(out, "- **Open issues**: {}", repo.open_issues);
        let _ = writeln!(out, "- **Open PRs**: {}", repo.open_prs);
        let _ = writeln!(out, "- **Created**: {}", repo.created_at.format("%Y-%m-%d"));
        let _ = writeln!(out, "- **Updated**: {}", repo.updated_at.format("%Y-%m-%d"));
        out.push('\n');
    }

    out.push_str("## Health Metrics\n\n");
    out.push_str("| Metric | Value |\n");
    out.push_str("|--------|-------|\n");
    let _ = writeln!(out, "| Overall health | {:.1}% |", doc.analysis.health_score);
    let _ = writeln!(out, "| Commit frequency (weekly) | {:.1} |", metrics.commit_frequency);
    let _ = writeln!(out, "| Contributor activity | {:.1} |", metrics.contributor_count);
    let _ = writeln!(out, "| Code quality | {:.1}% |", metrics.code_quality);
    let _ = writeln!(
        out,
        "| Issue resolution rate | {} |",
        format::percentage(metrics.issue_resolution_rate, Some(1))
    );
    let _ = writeln!(
        out,
        "| PR merge rate | {} |",
        format::percentage(metrics.pr_merge_rate, Some(1))
    );
    let _ = writeln!(out, "| Mean response time | {:.1} hours |", metrics.response_time);
    out.push('\n');

    out.push_str("## Assessment\n\n");
    let _ = writeln!(
        out,
        "**{}** - {}",
        doc.report.overall.label(),
        doc.report.overall.assessment()
    );
    out.push('\n');

    for (heading, items) in [
        ("Strengths", &doc.report.strengths),
        ("Weaknesses", &doc.report.weaknesses),
        ("Recommendations", &doc.report.recommendations),
    ] {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "### {}\n", heading);
        for item in items {
            let _ = writeln!(out, "- {}", item);
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
    let _ = writeln!(
        out,
        "*Generated {} by GitWell*",
        doc.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    out
}

/// Render a series as CSV with an RFC 3339 date column
pub fn trend_csv(points: &[TrendPoint], value_header: &str) -> String {
    let mut out = format!("date,{}\n", value_header);
    for point in points {
        let _ = writeln!(
            out,
            "{},{}",
            point.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            point.value
        );
    }
    out
}
