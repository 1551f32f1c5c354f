//! Head-to-head comparison of two analyzed repositories

use gitwell_core::HealthMetrics;
use serde::{Deserialize, Serialize};

use crate::analyzer::RepoAnalysis;

/// A named repository with its analysis results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoHealth {
    pub name: String,
    pub health_score: f64,
    pub metrics: HealthMetrics,
}

impl RepoHealth {
    pub fn new(name: impl Into<String>, analysis: &RepoAnalysis) -> Self {
        Self {
            name: name.into(),
            health_score: analysis.health_score,
            metrics: analysis.metrics,
        }
    }
}

/// Which side is ahead on one measure, and by how much
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub winner: String,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparisons {
    pub commit_frequency: MetricComparison,
    pub contributor_count: MetricComparison,
    pub code_quality: MetricComparison,
    pub issue_resolution_rate: MetricComparison,
    pub pr_merge_rate: MetricComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthComparison {
    pub overall: MetricComparison,
    pub metrics: MetricComparisons,
}

/// Compare the health score and five metrics of two repositories.
///
/// Ties go to `first` with a difference of 0. Response time is left out.
pub fn compare_health(first: &RepoHealth, second: &RepoHealth) -> HealthComparison {
    let side = |a: f64, b: f64| {
        if b > a {
            MetricComparison {
                winner: second.name.clone(),
                difference: b - a,
            }
        } else {
            MetricComparison {
                winner: first.name.clone(),
                difference: a - b,
            }
        }
    };

    let (m1, m2) = (&first.metrics, &second.metrics);
    HealthComparison {
        overall: side(first.health_score, second.health_score),
        metrics: MetricComparisons {
            commit_frequency: side(m1.commit_frequency, m2.commit_frequency),
            contributor_count: side(m1.contributor_count, m2.contributor_count),
            code_quality: side(m1.code_quality, m2.code_quality),
            issue_resolution_rate: side(m1.issue_resolution_rate, m2.issue_resolution_rate),
            pr_merge_rate: side(m1.pr_merge_rate, m2.pr_merge_rate),
        },
    }
}
