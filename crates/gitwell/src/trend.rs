//! Trend statistics
//!
//! Regression, forecasting and smoothing over numeric series, plus the
//! twelve-week commit trend classification.

use chrono::{DateTime, Duration, Utc};
use gitwell_core::{Commit, TrendPoint};
use serde::{Deserialize, Serialize};

/// Weeks covered by [`commit_trend`]
pub const TREND_WEEKS: usize = 12;

/// Percent change beyond which a trend stops being stable
pub const CHANGE_THRESHOLD: f64 = 10.0;

/// Default smoothing window
pub const DEFAULT_WINDOW: usize = 7;

/// Forecast values are clamped to this range
const FORECAST_MIN: f64 = 0.0;
const FORECAST_MAX: f64 = 100.0;

/// A sample for regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Fitted line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

impl Regression {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Classify a percentage change
    pub fn from_change_rate(change_rate: f64) -> Self {
        if change_rate > CHANGE_THRESHOLD {
            Self::Increasing
        } else if change_rate < -CHANGE_THRESHOLD {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Twelve-week commit trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitTrend {
    pub trend: TrendDirection,
    /// Percent change of the recent six-week mean over the older one
    pub change_rate: f64,
    /// Commits per week, oldest first
    pub weekly_commits: Vec<u64>,
}

/// Ordinary least squares fit.
///
/// Fewer than two points gives a zero line. When every x is identical the
/// slope is undefined, so the fit is the horizontal line through mean y.
pub fn linear_regression(points: &[DataPoint]) -> Regression {
    if points.len() < 2 {
        return Regression::default();
    }

    let n = points.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for p in points {
        sum_x += p.x;
        sum_y += p.y;
        sum_xy += p.x * p.y;
        sum_x2 += p.x * p.x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return Regression {
            slope: 0.0,
            intercept: sum_y / n,
        };
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Regression { slope, intercept }
}

/// Extrapolate a 0-100 series `days` days past `now`.
///
/// History is regressed against its index. The i-th prediction (1-based) is
/// dated `now + i days` and evaluated at `len + i - 1`, then clamped to
/// 0-100. Fewer than two history points yields nothing.
pub fn predict_trend(history: &[TrendPoint], days: u32, now: DateTime<Utc>) -> Vec<TrendPoint> {
    if history.len() < 2 {
        return Vec::new();
    }

    let points: Vec<DataPoint> = history
        .iter()
        .enumerate()
        .map(|(i, p)| DataPoint::new(i as f64, p.value))
        .collect();
    let fit = linear_regression(&points);
    let len = history.len() as f64;

    tracing::debug!(
        slope = fit.slope,
        intercept = fit.intercept,
        history = history.len(),
        days,
        "forecasting series"
    );

    // Stops early if the dates run past chrono's latest instant
    (1..=days)
        .map_while(|i| {
            let date = now.checked_add_signed(Duration::days(i64::from(i)))?;
            let value = fit
                .predict(len + f64::from(i) - 1.0)
                .clamp(FORECAST_MIN, FORECAST_MAX);
            Some(TrendPoint::new(date, value))
        })
        .collect()
}

/// Trailing simple moving average.
///
/// The first `window - 1` entries are passed through unchanged, so the output
/// is always as long as the input. A window of 0 behaves like 1.
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    series
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            if i + 1 < window {
                value
            } else {
                series[i + 1 - window..=i].iter().sum::<f64>() / window as f64
            }
        })
        .collect()
}

/// Population standard deviation; 0 for an empty series
pub fn standard_deviation(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Classify commit activity over the twelve weeks ending at `now`.
///
/// Week `i` (0 = most recent) covers `[now - (i+1)*7d, now - i*7d)`. The
/// mean of the newer six weeks is compared with the older six. An idle
/// older half counts as flat when the newer half is idle too and as a 100%
/// rise otherwise.
pub fn commit_trend(commits: &[Commit], now: DateTime<Utc>) -> CommitTrend {
    let weekly_commits: Vec<u64> = (0..TREND_WEEKS as i64)
        .rev()
        .map(|i| {
            let start = before(now, (i + 1) * 7);
            let end = before(now, i * 7);
            commits
                .iter()
                .filter(|c| c.date >= start && c.date < end)
                .count() as u64
        })
        .collect();

    let (older, newer) = weekly_commits.split_at(TREND_WEEKS / 2);
    let older_mean = mean(older);
    let newer_mean = mean(newer);

    let change_rate = if older_mean == 0.0 {
        if newer_mean == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        (newer_mean - older_mean) / older_mean * 100.0
    };

    CommitTrend {
        trend: TrendDirection::from_change_rate(change_rate),
        change_rate,
        weekly_commits,
    }
}

/// `now` minus whole days, saturating at chrono's earliest instant
fn before(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(days))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn mean(counts: &[u64]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().sum::<u64>() as f64 / counts.len() as f64
}
