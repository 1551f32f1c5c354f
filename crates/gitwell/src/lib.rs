//! gitwell - Repository health analytics
//!
//! A healthy project is one people keep working on, and whose issues and
//! pull requests get answered.
//!
//! The engine turns a repository's activity (commits, contributors, issues,
//! pull requests) into component metrics, a composite 0-100 health score,
//! trend series, forecasts, comparisons and written reports. It is pure:
//! time comes from an injected clock and data from the caller.
//!
//! Modules:
//! - analyzer: component metrics, health score, daily commit series
//! - trend: regression, forecasting, smoothing, twelve-week commit trend
//! - compare: head-to-head comparison of two repositories
//! - report: health band with strengths, weaknesses and recommendations
//! - export: Markdown and CSV renderings
//! - display: terminal colors and charts

pub mod analyzer;
pub mod compare;
pub mod display;
pub mod export;
pub mod report;
pub mod trend;

pub use analyzer::{analyze_at, health_score, Analyzer, RepoAnalysis};
pub use compare::{compare_health, HealthComparison, MetricComparison, RepoHealth};
pub use export::{markdown_report, trend_csv, ExportFormat, ReportDocument};
pub use report::{generate_report, HealthBand, HealthReport};
pub use trend::{
    commit_trend, linear_regression, moving_average, predict_trend, standard_deviation,
    CommitTrend, DataPoint, Regression, TrendDirection,
};
