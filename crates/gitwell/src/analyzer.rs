//! Repository health metrics
//!
//! Turns raw activity into the six component metrics, a composite 0-100
//! health score and a daily commit series. Every function here is total:
//! empty inputs have defined results and nothing returns an error.

use chrono::{DateTime, Days, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use gitwell_core::{
    ActivitySnapshot, Clock, Commit, Contributor, HealthMetrics, Issue, PullRequest,
    SystemClock, TrendPoint,
};
use serde::{Deserialize, Serialize};

/// Trailing window for commit frequency
pub const FREQUENCY_WINDOW_DAYS: i64 = 7;

/// Default length of the daily commit series
pub const DEFAULT_TREND_DAYS: u32 = 30;

/// Longest day series the command line accepts
pub const MAX_TREND_DAYS: u32 = 36_500;

/// Neutral code quality when there is nothing to judge
const NEUTRAL_QUALITY: f64 = 50.0;

/// Values at or above this saturate their health score component
const SATURATION: f64 = 50.0;

const WEIGHT_COMMITS: f64 = 0.25;
const WEIGHT_CONTRIBUTORS: f64 = 0.20;
const WEIGHT_QUALITY: f64 = 0.20;
const WEIGHT_ISSUES: f64 = 0.20;
const WEIGHT_PRS: f64 = 0.15;

/// Output of a full analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoAnalysis {
    pub metrics: HealthMetrics,
    pub health_score: f64,
    pub trend_data: Vec<TrendPoint>,
}

/// Commits in the trailing 7 days ending at `now`
pub fn commit_frequency(commits: &[Commit], now: DateTime<Utc>) -> f64 {
    let window_start = now
        .checked_sub_signed(Duration::days(FREQUENCY_WINDOW_DAYS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    commits
        .iter()
        .filter(|c| c.date >= window_start && c.date <= now)
        .count() as f64
}

/// Share of contributors at or above the mean contribution count (0-100)
pub fn contributor_activity(contributors: &[Contributor]) -> f64 {
    if contributors.is_empty() {
        return 0.0;
    }

    let total = contributors.len() as f64;
    let mean = contributors.iter().map(|c| c.contributions as f64).sum::<f64>() / total;
    let active = contributors
        .iter()
        .filter(|c| c.contributions as f64 >= mean)
        .count() as f64;

    active / total * 100.0
}

/// Blend of issue closure and PR merge ratios (0-100).
///
/// Each non-empty collection contributes up to 50 points. An empty collection
/// contributes nothing rather than being renormalized away, so a repository
/// with only issues tops out at 50. Both empty yields the neutral 50.
pub fn code_quality(issues: &[Issue], prs: &[PullRequest]) -> f64 {
    if issues.is_empty() && prs.is_empty() {
        return NEUTRAL_QUALITY;
    }

    let mut score = 0.0;
    if !issues.is_empty() {
        score += closed_ratio(issues) * 50.0;
    }
    if !prs.is_empty() {
        score += merged_ratio(prs) * 50.0;
    }
    score
}

/// Closed issues over all issues; no issues counts as fully resolved
pub fn issue_resolution_rate(issues: &[Issue]) -> f64 {
    if issues.is_empty() {
        return 1.0;
    }
    closed_ratio(issues)
}

/// Merged PRs over all PRs; no PRs counts as fully merged
pub fn pr_merge_rate(prs: &[PullRequest]) -> f64 {
    if prs.is_empty() {
        return 1.0;
    }
    merged_ratio(prs)
}

/// Mean hours from opening to closing, over closed issues with a known
/// closure time
pub fn response_time(issues: &[Issue]) -> f64 {
    let hours: Vec<f64> = issues.iter().filter_map(Issue::resolution_hours).collect();
    if hours.is_empty() {
        return 0.0;
    }
    hours.iter().sum::<f64>() / hours.len() as f64
}

/// Weighted 0-100 composite of the component metrics.
///
/// `contributor_count` is already a 0-100 ratio, yet it goes through the same
/// `/50, cap at 1` normalization as the raw commit count. Any ratio of 50% or
/// more therefore earns the full 20 points. Existing scores depend on this.
/// `response_time` does not take part.
pub fn health_score(metrics: &HealthMetrics) -> f64 {
    let commits = saturate(metrics.commit_frequency);
    let contributors = saturate(metrics.contributor_count);
    let quality = metrics.code_quality;
    let issues = metrics.issue_resolution_rate * 100.0;
    let prs = metrics.pr_merge_rate * 100.0;

    let score = commits * WEIGHT_COMMITS
        + contributors * WEIGHT_CONTRIBUTORS
        + quality * WEIGHT_QUALITY
        + issues * WEIGHT_ISSUES
        + prs * WEIGHT_PRS;
    score.clamp(0.0, 100.0)
}

/// Daily commit counts for the trailing `days` local calendar days, oldest
/// first, each dated at the start of its day
pub fn daily_trend(commits: &[Commit], days: u32, now: DateTime<Utc>) -> Vec<TrendPoint> {
    daily_trend_in(commits, days, now, &Local)
}

/// [`daily_trend`] with day boundaries taken in an explicit time zone
pub fn daily_trend_in<Tz: TimeZone>(
    commits: &[Commit],
    days: u32,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<TrendPoint> {
    let today = now.with_timezone(tz).date_naive();
    // Days before chrono's earliest date cannot be bucketed
    let reachable = today.signed_duration_since(NaiveDate::MIN).num_days() + 1;
    let days = i64::from(days).min(reachable);

    (0..days)
        .rev()
        .filter_map(|ago| today.checked_sub_days(Days::new(ago as u64)))
        .map(|day| {
            let start = day_start(tz, day);
            let end = day
                .succ_opt()
                .map_or(DateTime::<Utc>::MAX_UTC, |next| day_start(tz, next));
            let count = commits
                .iter()
                .filter(|c| c.date >= start && c.date < end)
                .count();
            TrendPoint::new(start, count as f64)
        })
        .collect()
}

/// Compute every metric, the health score and the daily series at `now`
pub fn analyze_at(
    commits: &[Commit],
    contributors: &[Contributor],
    issues: &[Issue],
    prs: &[PullRequest],
    trend_days: u32,
    now: DateTime<Utc>,
) -> RepoAnalysis {
    let metrics = HealthMetrics {
        commit_frequency: commit_frequency(commits, now),
        contributor_count: contributor_activity(contributors),
        code_quality: code_quality(issues, prs),
        issue_resolution_rate: issue_resolution_rate(issues),
        pr_merge_rate: pr_merge_rate(prs),
        response_time: response_time(issues),
    };
    let health_score = health_score(&metrics);
    let trend_data = daily_trend(commits, trend_days, now);

    tracing::debug!(
        commits = commits.len(),
        contributors = contributors.len(),
        issues = issues.len(),
        pull_requests = prs.len(),
        health_score,
        "analysis complete"
    );

    RepoAnalysis {
        metrics,
        health_score,
        trend_data,
    }
}

/// Stateless analyzer bound to a time source
#[derive(Debug, Clone)]
pub struct Analyzer<C = SystemClock> {
    clock: C,
    trend_days: u32,
}

impl Default for Analyzer<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> Analyzer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            trend_days: DEFAULT_TREND_DAYS,
        }
    }

    /// Change the length of the daily commit series
    pub fn with_trend_days(mut self, days: u32) -> Self {
        self.trend_days = days;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn analyze(
        &self,
        commits: &[Commit],
        contributors: &[Contributor],
        issues: &[Issue],
        prs: &[PullRequest],
    ) -> RepoAnalysis {
        analyze_at(
            commits,
            contributors,
            issues,
            prs,
            self.trend_days,
            self.clock.now(),
        )
    }

    pub fn analyze_snapshot(&self, snapshot: &ActivitySnapshot) -> RepoAnalysis {
        self.analyze(
            &snapshot.commits,
            &snapshot.contributors,
            &snapshot.issues,
            &snapshot.pull_requests,
        )
    }
}

fn closed_ratio(issues: &[Issue]) -> f64 {
    issues.iter().filter(|i| i.is_closed()).count() as f64 / issues.len() as f64
}

fn merged_ratio(prs: &[PullRequest]) -> f64 {
    prs.iter().filter(|p| p.is_merged()).count() as f64 / prs.len() as f64
}

fn saturate(value: f64) -> f64 {
    (value / SATURATION).min(1.0) * 100.0
}

fn day_start<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump
        None => tz.from_utc_datetime(&midnight).with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult, NaiveDateTime};
    use gitwell_core::{FixedClock, IssueState, PullRequestState};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn commit_at(date: DateTime<Utc>) -> Commit {
        Commit {
            sha: format!("{:x}", date.timestamp()),
            message: "Add feature".to_string(),
            author: "Jane Doe".to_string(),
            date,
            additions: 10,
            deletions: 5,
        }
    }

    fn contributor(login: &str, contributions: u64) -> Contributor {
        Contributor {
            id: login.to_string(),
            login: login.to_string(),
            avatar_url: None,
            contributions,
        }
    }

    fn issue(state: IssueState, open_hours: Option<i64>) -> Issue {
        let created_at = now() - Duration::days(10);
        Issue {
            id: "1".to_string(),
            title: "Bug".to_string(),
            number: 1,
            state,
            created_at,
            closed_at: open_hours.map(|h| created_at + Duration::hours(h)),
            author: "johndoe".to_string(),
        }
    }

    fn pr(state: PullRequestState) -> PullRequest {
        PullRequest {
            id: "1".to_string(),
            title: "PR".to_string(),
            number: 1,
            state,
            created_at: now() - Duration::days(3),
            merged_at: (state == PullRequestState::Merged).then(|| now() - Duration::days(2)),
            author: "janedoe".to_string(),
            additions: 100,
            deletions: 20,
        }
    }

    #[test]
    fn test_empty_input_defaults() {
        assert_eq!(commit_frequency(&[], now()), 0.0);
        assert_eq!(contributor_activity(&[]), 0.0);
        assert_eq!(code_quality(&[], &[]), 50.0);
        assert_eq!(issue_resolution_rate(&[]), 1.0);
        assert_eq!(pr_merge_rate(&[]), 1.0);
        assert_eq!(response_time(&[]), 0.0);
    }

    #[test]
    fn test_commit_frequency_window() {
        let commits = vec![
            commit_at(now() - Duration::days(7)), // window start is inclusive
            commit_at(now() - Duration::days(2)),
            commit_at(now()),
            commit_at(now() - Duration::days(7) - Duration::seconds(1)),
            commit_at(now() - Duration::days(30)),
        ];
        assert_eq!(commit_frequency(&commits, now()), 3.0);
    }

    #[test]
    fn test_contributor_activity_ratio() {
        // mean = 15/2 = 7.5, only the first is at or above it
        let contributors = vec![contributor("johndoe", 10), contributor("janedoe", 5)];
        assert_eq!(contributor_activity(&contributors), 50.0);

        // everyone equal means everyone is at the mean
        let contributors = vec![contributor("a", 3), contributor("b", 3), contributor("c", 3)];
        assert_eq!(contributor_activity(&contributors), 100.0);
    }

    #[test]
    fn test_code_quality_does_not_renormalize() {
        let issues = vec![issue(IssueState::Closed, Some(24)), issue(IssueState::Open, None)];
        let prs = vec![pr(PullRequestState::Merged), pr(PullRequestState::Open)];

        assert_eq!(code_quality(&issues, &prs), 50.0);

        // all issues closed, no PRs: only the issue half counts
        let closed = vec![issue(IssueState::Closed, Some(1))];
        assert_eq!(code_quality(&closed, &[]), 50.0);

        let merged = vec![pr(PullRequestState::Merged), pr(PullRequestState::Closed)];
        assert_eq!(code_quality(&[], &merged), 25.0);
    }

    #[test]
    fn test_resolution_and_merge_rates() {
        let issues = vec![
            issue(IssueState::Closed, Some(24)),
            issue(IssueState::Open, None),
            issue(IssueState::Open, None),
            issue(IssueState::Closed, None),
        ];
        assert_eq!(issue_resolution_rate(&issues), 0.5);

        let prs = vec![
            pr(PullRequestState::Merged),
            pr(PullRequestState::Closed),
            pr(PullRequestState::Open),
            pr(PullRequestState::Merged),
        ];
        assert_eq!(pr_merge_rate(&prs), 0.5);
    }

    #[test]
    fn test_response_time_skips_issues_without_closure_time() {
        let issues = vec![
            issue(IssueState::Closed, Some(24)),
            issue(IssueState::Closed, Some(48)),
            issue(IssueState::Closed, None),
            issue(IssueState::Open, None),
        ];
        assert_eq!(response_time(&issues), 36.0);
    }

    #[test]
    fn test_health_score_weights() {
        let perfect = HealthMetrics {
            commit_frequency: 120.0,
            contributor_count: 100.0,
            code_quality: 100.0,
            issue_resolution_rate: 1.0,
            pr_merge_rate: 1.0,
            response_time: 5.0,
        };
        assert!((health_score(&perfect) - 100.0).abs() < 1e-9);

        assert_eq!(health_score(&HealthMetrics::default()), 0.0);

        // 25 commits -> 50 * 0.25, ratio 25 -> 50 * 0.20, quality 50 -> 10,
        // resolution 0.5 -> 10, merge 0.5 -> 7.5
        let mixed = HealthMetrics {
            commit_frequency: 25.0,
            contributor_count: 25.0,
            code_quality: 50.0,
            issue_resolution_rate: 0.5,
            pr_merge_rate: 0.5,
            response_time: 0.0,
        };
        assert!((health_score(&mixed) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_contributor_ratio_saturates_at_fifty() {
        let base = HealthMetrics::default();
        let half = HealthMetrics {
            contributor_count: 50.0,
            ..base
        };
        let full = HealthMetrics {
            contributor_count: 100.0,
            ..base
        };
        assert_eq!(health_score(&half), health_score(&full));
        assert!((health_score(&full) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_health_score_stays_in_range() {
        for cf in [0.0, 3.0, 49.0, 500.0] {
            for ratio in [0.0, 0.3, 1.0] {
                let metrics = HealthMetrics {
                    commit_frequency: cf,
                    contributor_count: ratio * 100.0,
                    code_quality: ratio * 100.0,
                    issue_resolution_rate: ratio,
                    pr_merge_rate: ratio,
                    response_time: 0.0,
                };
                let score = health_score(&metrics);
                assert!((0.0..=100.0).contains(&score), "score {score} out of range");
            }
        }
    }

    #[test]
    fn test_daily_trend_buckets_by_calendar_day() {
        let commits = vec![
            commit_at(now()),
            commit_at(now() - Duration::hours(11)), // 01:00 today
            commit_at(now() - Duration::hours(13)), // 23:00 yesterday
            commit_at(now() - Duration::days(29)),
            commit_at(now() - Duration::days(30)), // outside the series
        ];

        let trend = daily_trend_in(&commits, 30, now(), &Utc);
        assert_eq!(trend.len(), 30);

        let today_start = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(trend[29].date, today_start);
        assert_eq!(trend[29].value, 2.0);
        assert_eq!(trend[28].value, 1.0);
        assert_eq!(trend[0].date, today_start - Duration::days(29));
        assert_eq!(trend[0].value, 1.0);

        let total: f64 = trend.iter().map(|p| p.value).sum();
        assert_eq!(total, 4.0);
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_daily_trend_zero_days() {
        assert!(daily_trend_in(&[commit_at(now())], 0, now(), &Utc).is_empty());
    }

    #[test]
    fn test_daily_trend_uses_local_midnight() {
        // 17:30 on March 15 in +05:30
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let local_midnight = Utc.with_ymd_and_hms(2024, 3, 14, 18, 30, 0).unwrap();
        let commits = vec![
            commit_at(local_midnight - Duration::seconds(1)), // 23:59:59 on the 14th
            commit_at(local_midnight),
            commit_at(now()),
        ];

        let trend = daily_trend_in(&commits, 2, now(), &ist);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[1].date, local_midnight);
        assert_eq!(trend[1].value, 2.0);
        assert_eq!(trend[0].date, local_midnight - Duration::days(1));
        assert_eq!(trend[0].value, 1.0);
    }

    /// +01:00 zone whose clocks skip from 23:59:59 straight to 01:00 on
    /// 2024-03-15
    #[derive(Debug, Clone, Copy)]
    struct MidnightGap;

    fn gap_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn plus_one() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    impl TimeZone for MidnightGap {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            MidnightGap
        }

        fn offset_from_local_date(&self, _: &NaiveDate) -> LocalResult<FixedOffset> {
            LocalResult::Single(plus_one())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let one_am = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
            if local.date() == gap_day() && local.time() < one_am {
                LocalResult::None
            } else {
                LocalResult::Single(plus_one())
            }
        }

        fn offset_from_utc_date(&self, _: &NaiveDate) -> FixedOffset {
            plus_one()
        }

        fn offset_from_utc_datetime(&self, _: &NaiveDateTime) -> FixedOffset {
            plus_one()
        }
    }

    #[test]
    fn test_daily_trend_survives_skipped_midnight() {
        let gap_start = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let commits = vec![
            commit_at(gap_start - Duration::minutes(30)),
            commit_at(gap_start + Duration::minutes(30)),
        ];

        let trend = daily_trend_in(&commits, 3, now(), &MidnightGap);
        assert_eq!(trend.len(), 3);
        // no local midnight on the 15th, so its bucket opens at 00:00 UTC
        assert_eq!(trend[2].date, gap_start);
        assert_eq!(trend[1].date, Utc.with_ymd_and_hms(2024, 3, 13, 23, 0, 0).unwrap());
        assert_eq!(trend[1].value, 1.0);
        assert_eq!(trend[2].value, 1.0);
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_daily_trend_stops_at_earliest_date() {
        let now = DateTime::<Utc>::MIN_UTC + Duration::days(10) + Duration::hours(12);
        let commits = vec![commit_at(DateTime::<Utc>::MIN_UTC + Duration::hours(1))];

        let trend = daily_trend_in(&commits, 200_000_000, now, &Utc);
        assert_eq!(trend.len(), 11);
        assert_eq!(trend[0].date, DateTime::<Utc>::MIN_UTC);
        assert_eq!(trend[0].value, 1.0);
        assert_eq!(commit_frequency(&commits, now), 1.0);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let clock = FixedClock::new(now());
        let analyzer = Analyzer::new(&clock).with_trend_days(14);
        let snapshot = ActivitySnapshot {
            commits: (0..20).map(|d| commit_at(now() - Duration::days(d))).collect(),
            contributors: vec![contributor("johndoe", 10), contributor("janedoe", 5)],
            issues: vec![issue(IssueState::Closed, Some(24)), issue(IssueState::Open, None)],
            pull_requests: vec![pr(PullRequestState::Merged), pr(PullRequestState::Open)],
            ..Default::default()
        };

        let first = analyzer.analyze_snapshot(&snapshot);
        let second = analyzer.analyze_snapshot(&snapshot);
        assert_eq!(first, second);

        assert_eq!(first.trend_data.len(), 14);
        assert_eq!(first.metrics.commit_frequency, 8.0);
        assert_eq!(first.metrics.contributor_count, 50.0);
        assert_eq!(first.metrics.code_quality, 50.0);
        assert_eq!(first.metrics.issue_resolution_rate, 0.5);
        assert_eq!(first.metrics.pr_merge_rate, 0.5);
        assert_eq!(first.metrics.response_time, 24.0);
        assert_eq!(first.health_score, health_score(&first.metrics));
    }
}
