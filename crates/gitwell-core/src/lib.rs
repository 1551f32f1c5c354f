//! GitWell Core - Shared functionality for GitWell crates
//!
//! Activity records, the clock and cache seams, platform sources and
//! configuration. The analysis engine in the `gitwell` crate builds on these
//! without touching the network or disk itself.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod paths;
pub mod platform;

pub use cache::{Cache, CachedClient, MemoryCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ColorMode, Config};
pub use error::{SourceError, ValidationError};
pub use model::{
    ActivitySnapshot, Commit, Contributor, HealthMetrics, Issue, IssueState, PullRequest,
    PullRequestState, RepoSummary, TrendPoint,
};
pub use paths::Paths;
pub use platform::{Platform, PlatformClient, RepoIdentity, SnapshotFileClient};
