//! Error types shared by GitWell crates

use thiserror::Error;

/// A snapshot that breaks the record contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Issue #{number} is open but has a closedAt timestamp")]
    ClosedAtOnOpenIssue { number: u64 },

    #[error("Issue #{number} was closed before it was created")]
    ClosedBeforeCreated { number: u64 },

    #[error("Pull request #{number} is not merged but has a mergedAt timestamp")]
    MergedAtOnUnmergedPullRequest { number: u64 },

    #[error("Pull request #{number} was merged before it was created")]
    MergedBeforeCreated { number: u64 },
}

/// Failures while loading activity from a platform source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Unsupported repository URL: {0}")]
    UnsupportedUrl(String),

    #[error("No snapshot available for {0}")]
    NotFound(String),

    #[error("Malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
