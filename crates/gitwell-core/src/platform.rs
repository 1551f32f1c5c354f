//! Hosting platforms and the sources that supply activity records
//!
//! Network clients live outside this workspace. What ships here is the
//! [`PlatformClient`] seam they implement, URL parsing for repository
//! identities, and [`SnapshotFileClient`], which reads snapshots that an
//! external fetcher exported to disk.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::SourceError;
use crate::model::{ActivitySnapshot, Commit, Contributor, Issue, PullRequest};

/// Supported hosting platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    GitHub,
    GitLab,
}

impl Platform {
    pub fn host(&self) -> &'static str {
        match self {
            Platform::GitHub => "github.com",
            Platform::GitLab => "gitlab.com",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::GitHub => write!(f, "github"),
            Platform::GitLab => write!(f, "gitlab"),
        }
    }
}

/// A repository on a hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoIdentity {
    pub platform: Platform,
    pub owner: String,
    pub repo: String,
    pub url: String,
}

fn repo_url_pattern(platform: Platform) -> &'static Regex {
    static GITHUB: OnceLock<Regex> = OnceLock::new();
    static GITLAB: OnceLock<Regex> = OnceLock::new();

    let (cell, host) = match platform {
        Platform::GitHub => (&GITHUB, r"github\.com"),
        Platform::GitLab => (&GITLAB, r"gitlab\.com"),
    };
    cell.get_or_init(|| {
        Regex::new(&format!(r"(?i)^https?://(?:www\.)?{}/([^/]+)/([^/]+?)/?$", host))
            .expect("repository URL pattern is valid")
    })
}

impl RepoIdentity {
    /// Parse a repository URL for a specific platform
    pub fn parse_for(platform: Platform, url: &str) -> Option<Self> {
        let caps = repo_url_pattern(platform).captures(url.trim())?;
        let owner = caps.get(1)?.as_str();
        let repo = caps.get(2)?.as_str();
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if repo.is_empty() {
            return None;
        }

        Some(Self {
            platform,
            owner: owner.to_string(),
            repo: repo.to_string(),
            url: url.to_string(),
        })
    }

    /// Parse a repository URL, detecting the platform
    pub fn parse(url: &str) -> Option<Self> {
        Self::parse_for(Platform::GitHub, url).or_else(|| Self::parse_for(Platform::GitLab, url))
    }

    /// "owner/repo"
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Stable key for caches and lookups, e.g. "github:rust-lang/rust"
    pub fn key(&self) -> String {
        format!("{}:{}/{}", self.platform, self.owner, self.repo)
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform.host(), self.full_name())
    }
}

pub fn is_github_url(url: &str) -> bool {
    RepoIdentity::parse_for(Platform::GitHub, url).is_some()
}

pub fn is_gitlab_url(url: &str) -> bool {
    RepoIdentity::parse_for(Platform::GitLab, url).is_some()
}

pub fn is_valid_repo_url(url: &str) -> bool {
    is_github_url(url) || is_gitlab_url(url)
}

/// Capability set every activity source provides.
///
/// Implementors only have to supply [`parse_identity`](Self::parse_identity)
/// and [`fetch_snapshot`](Self::fetch_snapshot); the per-collection fetches
/// default to slicing the snapshot.
pub trait PlatformClient {
    fn parse_identity(&self, url: &str) -> Option<RepoIdentity>;

    fn fetch_snapshot(&self, repo: &RepoIdentity) -> Result<ActivitySnapshot, SourceError>;

    /// Parse a URL and fetch its snapshot in one step
    fn fetch_url(&self, url: &str) -> Result<(RepoIdentity, ActivitySnapshot), SourceError> {
        let repo = self
            .parse_identity(url)
            .ok_or_else(|| SourceError::UnsupportedUrl(url.to_string()))?;
        let snapshot = self.fetch_snapshot(&repo)?;
        Ok((repo, snapshot))
    }

    fn fetch_contributors(&self, repo: &RepoIdentity) -> Result<Vec<Contributor>, SourceError> {
        Ok(self.fetch_snapshot(repo)?.contributors)
    }

    fn fetch_commits(&self, repo: &RepoIdentity) -> Result<Vec<Commit>, SourceError> {
        Ok(self.fetch_snapshot(repo)?.commits)
    }

    fn fetch_issues(&self, repo: &RepoIdentity) -> Result<Vec<Issue>, SourceError> {
        Ok(self.fetch_snapshot(repo)?.issues)
    }

    fn fetch_pull_requests(&self, repo: &RepoIdentity) -> Result<Vec<PullRequest>, SourceError> {
        Ok(self.fetch_snapshot(repo)?.pull_requests)
    }
}

/// Reads snapshots exported as `<root>/<platform>/<owner>/<repo>.json`
#[derive(Debug, Clone)]
pub struct SnapshotFileClient {
    root: PathBuf,
}

impl SnapshotFileClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the snapshot for a repository is expected
    pub fn snapshot_path(&self, repo: &RepoIdentity) -> PathBuf {
        self.root
            .join(repo.platform.to_string())
            .join(&repo.owner)
            .join(format!("{}.json", repo.repo))
    }

    /// Load a snapshot straight from a file, bypassing the directory layout
    pub fn load_file(path: &Path) -> Result<ActivitySnapshot, SourceError> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: ActivitySnapshot = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            commits = snapshot.commits.len(),
            contributors = snapshot.contributors.len(),
            issues = snapshot.issues.len(),
            pull_requests = snapshot.pull_requests.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }
}

impl PlatformClient for SnapshotFileClient {
    fn parse_identity(&self, url: &str) -> Option<RepoIdentity> {
        RepoIdentity::parse(url)
    }

    fn fetch_snapshot(&self, repo: &RepoIdentity) -> Result<ActivitySnapshot, SourceError> {
        let path = self.snapshot_path(repo);
        if !path.exists() {
            return Err(SourceError::NotFound(repo.key()));
        }
        Self::load_file(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_github_url() {
        let id = RepoIdentity::parse("https://github.com/rust-lang/rust").unwrap();
        assert_eq!(id.platform, Platform::GitHub);
        assert_eq!(id.owner, "rust-lang");
        assert_eq!(id.repo, "rust");
        assert_eq!(id.key(), "github:rust-lang/rust");
    }

    #[test]
    fn test_parse_strips_git_suffix_and_trailing_slash() {
        let id = RepoIdentity::parse("https://www.GitHub.com/tokio-rs/tokio.git/").unwrap();
        assert_eq!(id.repo, "tokio");

        let id = RepoIdentity::parse("http://gitlab.com/gitlab-org/gitlab/").unwrap();
        assert_eq!(id.platform, Platform::GitLab);
        assert_eq!(id.full_name(), "gitlab-org/gitlab");
    }

    #[test]
    fn test_rejects_non_repo_urls() {
        assert!(!is_valid_repo_url("https://github.com/rust-lang"));
        assert!(!is_valid_repo_url("https://github.com/rust-lang/rust/issues"));
        assert!(!is_valid_repo_url("https://bitbucket.org/a/b"));
        assert!(is_github_url("https://github.com/a/b"));
        assert!(!is_gitlab_url("https://github.com/a/b"));
    }

    #[test]
    fn test_file_client_round_trip() {
        let dir = TempDir::new().unwrap();
        let client = SnapshotFileClient::new(dir.path());
        let id = client.parse_identity("https://github.com/acme/widget").unwrap();

        assert!(matches!(
            client.fetch_snapshot(&id),
            Err(SourceError::NotFound(_))
        ));

        let path = client.snapshot_path(&id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"contributors": [{"id": "1", "login": "alice", "contributions": 3}]}"#,
        )
        .unwrap();

        let contributors = client.fetch_contributors(&id).unwrap();
        assert_eq!(contributors.len(), 1);
        assert!(client.fetch_commits(&id).unwrap().is_empty());

        let (repo, snapshot) = client.fetch_url("https://github.com/acme/widget.git").unwrap();
        assert_eq!(repo.key(), id.key());
        assert_eq!(snapshot.contributors[0].login, "alice");
    }

    #[test]
    fn test_fetch_url_rejects_unknown_hosts() {
        let dir = TempDir::new().unwrap();
        let client = SnapshotFileClient::new(dir.path());
        assert!(matches!(
            client.fetch_url("https://bitbucket.org/acme/widget"),
            Err(SourceError::UnsupportedUrl(_))
        ));
    }

    #[test]
    fn test_file_client_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            SnapshotFileClient::load_file(&path),
            Err(SourceError::Parse(_))
        ));
    }
}
