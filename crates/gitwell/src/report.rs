//! Health report: overall band plus rule-based strengths and weaknesses

use gitwell_core::HealthMetrics;
use serde::{Deserialize, Serialize};

use crate::compare::RepoHealth;

/// Overall health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Excellent,
    Good,
    Moderate,
    NeedsImprovement,
}

impl HealthBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Moderate
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::NeedsImprovement => "needs_improvement",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::NeedsImprovement => "Needs improvement",
        }
    }

    /// One-line assessment for reports
    pub fn assessment(&self) -> &'static str {
        match self {
            Self::Excellent => "The project is healthy and actively maintained.",
            Self::Good => "The project is healthy overall, with room to improve.",
            Self::Moderate => "Project health is middling and needs attention.",
            Self::NeedsImprovement => "Project health is low; address the weaknesses first.",
        }
    }
}

impl std::fmt::Display for HealthBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: HealthBand,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// A high/low threshold pair on one metric
struct Rule {
    value: fn(&HealthMetrics) -> f64,
    high: f64,
    low: f64,
    strength: &'static str,
    weakness: &'static str,
    recommendation: &'static str,
}

// contributor_count holds the 0-100 activity ratio but is judged against
// headcount-sized thresholds; scores already published rely on that.
const RULES: [Rule; 5] = [
    Rule {
        value: |m| m.commit_frequency,
        high: 20.0,
        low: 5.0,
        strength: "High commit frequency indicating active development",
        weakness: "Low commit frequency may indicate project stagnation",
        recommendation: "Increase development activity to maintain momentum",
    },
    Rule {
        value: |m| m.contributor_count,
        high: 10.0,
        low: 3.0,
        strength: "Diverse contributor base promotes project health",
        weakness: "Limited contributor diversity creates dependency risk",
        recommendation: "Encourage community contributions to diversify development",
    },
    Rule {
        value: |m| m.code_quality,
        high: 80.0,
        low: 60.0,
        strength: "Excellent code quality standards",
        weakness: "Code quality issues need attention",
        recommendation: "Implement stricter code review and quality gates",
    },
    Rule {
        value: |m| m.issue_resolution_rate,
        high: 0.8,
        low: 0.5,
        strength: "High issue resolution rate shows good maintenance",
        weakness: "Low issue resolution rate indicates maintenance gaps",
        recommendation: "Prioritize resolving open issues to improve community trust",
    },
    Rule {
        value: |m| m.pr_merge_rate,
        high: 0.7,
        low: 0.4,
        strength: "Good PR merge rate shows efficient contribution workflow",
        weakness: "Low PR merge rate may discourage contributors",
        recommendation: "Review and improve PR review process",
    },
];

/// Classify overall health and collect per-metric findings
pub fn generate_report(input: &RepoHealth) -> HealthReport {
    let mut report = HealthReport {
        overall: HealthBand::from_score(input.health_score),
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        recommendations: Vec::new(),
    };

    for rule in &RULES {
        let value = (rule.value)(&input.metrics);
        if value > rule.high {
            report.strengths.push(rule.strength.to_string());
        } else if value < rule.low {
            report.weaknesses.push(rule.weakness.to_string());
            report.recommendations.push(rule.recommendation.to_string());
        }
    }

    tracing::debug!(
        repo = %input.name,
        overall = %report.overall,
        strengths = report.strengths.len(),
        weaknesses = report.weaknesses.len(),
        "report generated"
    );

    report
}
