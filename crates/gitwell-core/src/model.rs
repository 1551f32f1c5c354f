//! Activity records and analysis output shapes
//!
//! Everything here is a plain value type. Platform sources produce the
//! records, the engine reads them and never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub date: DateTime<Utc>,
    /// Lines added
    #[serde(default)]
    pub additions: u64,
    /// Lines removed
    #[serde(default)]
    pub deletions: u64,
}

/// A contributor and their total contribution count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub id: String,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub contributions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// An issue on the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub number: u64,
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    /// Only present for closed issues whose closure time is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    pub author: String,
}

impl Issue {
    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }

    /// Hours from creation to closure, if the issue is closed and the
    /// closure time is known
    pub fn resolution_hours(&self) -> Option<f64> {
        if !self.is_closed() {
            return None;
        }
        self.closed_at.map(|closed| {
            closed.signed_duration_since(self.created_at).num_milliseconds() as f64 / 3_600_000.0
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

/// A pull (or merge) request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: String,
    pub title: String,
    pub number: u64,
    pub state: PullRequestState,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
    pub author: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.state == PullRequestState::Merged
    }
}

/// Repository summary as reported by the hosting platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub id: String,
    /// Full name, e.g. "owner/repo"
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub forks: u64,
    #[serde(default)]
    pub watchers: u64,
    #[serde(default = "default_language")]
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub open_issues: u64,
    #[serde(default, rename = "openPRs")]
    pub open_prs: u64,
    pub url: String,
}

fn default_language() -> String {
    "Unknown".to_string()
}

/// Everything a platform source knows about one repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<RepoSummary>,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default, alias = "prs")]
    pub pull_requests: Vec<PullRequest>,
}

impl ActivitySnapshot {
    /// Display name for this snapshot, falling back to the given default
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.repo.as_ref().map_or(fallback, |r| r.name.as_str())
    }

    /// Check the record-level contract the engine relies on.
    ///
    /// The engine itself never fails on bad data; this is an opt-in gate for
    /// callers that want to reject inconsistent exports up front.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for issue in &self.issues {
            if let Some(closed_at) = issue.closed_at {
                if !issue.is_closed() {
                    return Err(ValidationError::ClosedAtOnOpenIssue {
                        number: issue.number,
                    });
                }
                if closed_at < issue.created_at {
                    return Err(ValidationError::ClosedBeforeCreated {
                        number: issue.number,
                    });
                }
            }
        }

        for pr in &self.pull_requests {
            if let Some(merged_at) = pr.merged_at {
                if !pr.is_merged() {
                    return Err(ValidationError::MergedAtOnUnmergedPullRequest {
                        number: pr.number,
                    });
                }
                if merged_at < pr.created_at {
                    return Err(ValidationError::MergedBeforeCreated { number: pr.number });
                }
            }
        }

        Ok(())
    }
}

/// The six component health metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    /// Commits in the trailing 7 days
    pub commit_frequency: f64,
    /// Contributor activity ratio (0-100). Not a headcount despite the name.
    pub contributor_count: f64,
    /// Blended issue/PR closure score (0-100)
    pub code_quality: f64,
    /// Closed issues / all issues (0-1)
    pub issue_resolution_rate: f64,
    /// Merged PRs / all PRs (0-1)
    pub pr_merge_rate: f64,
    /// Mean hours to close an issue
    pub response_time: f64,
}

/// One sample of a day-bucketed series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

impl TrendPoint {
    pub fn new(date: DateTime<Utc>, value: f64) -> Self {
        Self { date, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn issue(number: u64, state: IssueState, closed_at: Option<DateTime<Utc>>) -> Issue {
        Issue {
            id: number.to_string(),
            title: format!("Issue {}", number),
            number,
            state,
            created_at: t0(),
            closed_at,
            author: "octocat".to_string(),
        }
    }

    #[test]
    fn test_resolution_hours() {
        let closed = issue(1, IssueState::Closed, Some(t0() + Duration::hours(36)));
        assert_eq!(closed.resolution_hours(), Some(36.0));

        let missing = issue(2, IssueState::Closed, None);
        assert_eq!(missing.resolution_hours(), None);

        let open = issue(3, IssueState::Open, None);
        assert_eq!(open.resolution_hours(), None);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = r#"{
            "commits": [{
                "sha": "abc123", "message": "Initial commit", "author": "John Doe",
                "date": "2024-01-01T00:00:00Z", "additions": 100, "deletions": 0
            }],
            "contributors": [{"id": "1", "login": "johndoe", "contributions": 10}],
            "issues": [{
                "id": "1", "title": "Bug", "number": 1, "state": "closed",
                "createdAt": "2024-01-01T00:00:00Z", "closedAt": "2024-01-02T00:00:00Z",
                "author": "johndoe"
            }],
            "prs": [{
                "id": "1", "title": "PR #1", "number": 1, "state": "merged",
                "createdAt": "2024-01-01T00:00:00Z", "mergedAt": "2024-01-02T00:00:00Z",
                "author": "johndoe", "additions": 100, "deletions": 20
            }]
        }"#;

        let snapshot: ActivitySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.commits.len(), 1);
        assert_eq!(snapshot.contributors[0].contributions, 10);
        assert_eq!(snapshot.issues[0].state, IssueState::Closed);
        assert!(snapshot.pull_requests[0].is_merged());
        assert!(snapshot.repo.is_none());
        assert_eq!(snapshot.name_or("local"), "local");
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_records() {
        let snapshot = ActivitySnapshot {
            issues: vec![issue(7, IssueState::Open, Some(t0()))],
            ..Default::default()
        };
        assert_eq!(
            snapshot.validate(),
            Err(ValidationError::ClosedAtOnOpenIssue { number: 7 })
        );

        let snapshot = ActivitySnapshot {
            issues: vec![issue(8, IssueState::Closed, Some(t0() - Duration::hours(1)))],
            ..Default::default()
        };
        assert_eq!(
            snapshot.validate(),
            Err(ValidationError::ClosedBeforeCreated { number: 8 })
        );

        let snapshot = ActivitySnapshot {
            pull_requests: vec![PullRequest {
                id: "9".to_string(),
                title: "PR".to_string(),
                number: 9,
                state: PullRequestState::Closed,
                created_at: t0(),
                merged_at: Some(t0()),
                author: "octocat".to_string(),
                additions: 0,
                deletions: 0,
            }],
            ..Default::default()
        };
        assert_eq!(
            snapshot.validate(),
            Err(ValidationError::MergedAtOnUnmergedPullRequest { number: 9 })
        );
    }
}
