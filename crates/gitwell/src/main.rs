//! gitwell - Repository health analytics
//!
//! A healthy project is one people keep working on, and whose issues and
//! pull requests get answered.
//!
//! Reads activity snapshots (JSON exports of commits, contributors, issues
//! and pull requests) and reports health scores, trends, forecasts and
//! comparisons.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitwell::analyzer::{analyze_at, Analyzer, RepoAnalysis, MAX_TREND_DAYS};
use gitwell::compare::{compare_health, HealthComparison, MetricComparison, RepoHealth};
use gitwell::display::{
    draw_bar, format_list, format_score, format_trend, score_color, section_header, title, Colors,
};
use gitwell::export::{markdown_report, trend_csv, ExportFormat, ReportDocument};
use gitwell::report::generate_report;
use gitwell::trend::{commit_trend, moving_average, predict_trend, standard_deviation};
use gitwell_core::platform::is_valid_repo_url;
use gitwell_core::{
    format, ActivitySnapshot, CachedClient, Clock, ColorMode, Config, MemoryCache, Paths,
    PlatformClient, SnapshotFileClient, SystemClock, TrendPoint,
};

#[derive(Parser)]
#[command(name = "gitwell")]
#[command(about = "Repository health analytics - is this project alive and well?")]
#[command(version)]
#[command(after_help = r#"SOURCES:
    A source is either a snapshot JSON file or a GitHub/GitLab repository URL.
    URLs resolve to <snapshots>/<platform>/<owner>/<repo>.json, where
    <snapshots> defaults to ~/.local/share/gitwell/snapshots.

HEALTH SCORE:
    0-100, weighted: commit frequency 25%, contributor activity 20%,
    code quality 20%, issue resolution 20%, PR merge rate 15%.

EXAMPLES:
    gitwell analyze snapshot.json                    # Metrics and score
    gitwell report https://github.com/owner/repo     # Strengths and weaknesses
    gitwell compare a.json b.json                    # Head to head
    gitwell forecast snapshot.json --days 14         # Extrapolate health
    gitwell trend snapshot.json --json               # Twelve-week commit trend
    gitwell export snapshot.json --format markdown -o report.md
"#)]
struct Cli {
    /// Config file (default: ~/.config/gitwell/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of exported snapshots used to resolve repository URLs
    #[arg(long, global = true)]
    snapshots: Option<PathBuf>,

    /// Color output: auto, always, never
    #[arg(long, global = true, value_parser = parse_color)]
    color: Option<ColorMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Component metrics, health score and daily commits
    Analyze {
        /// Snapshot file or repository URL
        source: String,

        /// Days in the daily commit series (default: from config)
        #[arg(long, value_parser = days_in_range)]
        days: Option<u32>,

        /// Reject snapshots with inconsistent records
        #[arg(long)]
        strict: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Health band with strengths, weaknesses and recommendations
    Report {
        /// Snapshot file or repository URL
        source: String,

        /// Reject snapshots with inconsistent records
        #[arg(long)]
        strict: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two repositories
    Compare {
        /// First snapshot file or repository URL (wins ties)
        first: String,

        /// Second snapshot file or repository URL
        second: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extrapolate the health score
    Forecast {
        /// Snapshot file or repository URL
        source: String,

        /// Days to predict (default: from config)
        #[arg(long, value_parser = days_in_range)]
        days: Option<u32>,

        /// Smoothing window for daily commits (default: from config)
        #[arg(long)]
        window: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Twelve-week commit trend
    Trend {
        /// Snapshot file or repository URL
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a report
    Export {
        /// Snapshot file or repository URL
        source: String,

        /// json, csv (daily commits) or markdown
        #[arg(long, short, default_value = "markdown")]
        format: ExportFormat,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show or initialize the configuration
    Config {
        /// Write a default config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn parse_color(s: &str) -> Result<ColorMode, String> {
    match s.to_lowercase().as_str() {
        "auto" => Ok(ColorMode::Auto),
        "always" => Ok(ColorMode::Always),
        "never" => Ok(ColorMode::Never),
        other => Err(format!("invalid color mode '{}' (auto, always, never)", other)),
    }
}

fn days_in_range(s: &str) -> Result<u32, String> {
    let days: u32 = s.parse().map_err(|e| format!("invalid day count '{}': {}", s, e))?;
    if days > MAX_TREND_DAYS {
        return Err(format!("day count {} exceeds the limit of {}", days, MAX_TREND_DAYS));
    }
    Ok(days)
}

/// Filter used when RUST_LOG is unset
const DEFAULT_LOG_LEVEL: &str = "warn";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Reject config day counts the command line would refuse
fn check_config_days(config: &Config) -> Result<()> {
    for (key, days) in [
        ("trend_days", config.trend_days),
        ("forecast_days", config.forecast_days),
    ] {
        if days > MAX_TREND_DAYS {
            bail!("{} = {} exceeds the limit of {}", key, days, MAX_TREND_DAYS);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = Paths::new();
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());

    if let Commands::Config { init, force } = cli.command {
        return cmd_config(&config_path, init, force);
    }

    let config = Config::load(&config_path)?;
    check_config_days(&config)
        .with_context(|| format!("Invalid config at {:?}", config_path))?;
    let app = App::new(&cli, config, &paths);

    match cli.command {
        Commands::Analyze {
            source,
            days,
            strict,
            json,
        } => cmd_analyze(&app, &source, days, strict, json),
        Commands::Report {
            source,
            strict,
            json,
        } => cmd_report(&app, &source, strict, json),
        Commands::Compare {
            first,
            second,
            json,
        } => cmd_compare(&app, &first, &second, json),
        Commands::Forecast {
            source,
            days,
            window,
            json,
        } => cmd_forecast(&app, &source, days, window, json),
        Commands::Trend { source, json } => cmd_trend(&app, &source, json),
        Commands::Export {
            source,
            format,
            output,
        } => cmd_export(&app, &source, format, output.as_deref()),
        Commands::Config { .. } => Ok(()),
    }
}

/// A snapshot with the name it is reported under
struct Loaded {
    name: String,
    snapshot: ActivitySnapshot,
}

/// Shared state for one invocation
struct App {
    config: Config,
    colors: Colors,
    analyzer: Analyzer<SystemClock>,
    client: CachedClient<SnapshotFileClient, MemoryCache<ActivitySnapshot>>,
}

impl App {
    fn new(cli: &Cli, config: Config, paths: &Paths) -> Self {
        let colors = Colors::for_mode(cli.color.unwrap_or(config.color));
        let root = cli.snapshots.clone().unwrap_or_else(|| paths.snapshots());
        let cache = MemoryCache::new(Duration::seconds(config.cache_ttl_secs));
        Self {
            config,
            colors,
            analyzer: Analyzer::default(),
            client: CachedClient::new(SnapshotFileClient::new(root), cache),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.analyzer.clock().now()
    }

    /// Load a snapshot from a repository URL or a file path
    fn load(&self, source: &str, strict: bool) -> Result<Loaded> {
        let loaded = if is_valid_repo_url(source) {
            let (repo, snapshot) = self
                .client
                .fetch_url(source)
                .with_context(|| format!("Failed to load snapshot for {}", source))?;
            Loaded {
                name: snapshot.name_or(&repo.full_name()).to_string(),
                snapshot,
            }
        } else {
            let path = Path::new(source);
            let snapshot = SnapshotFileClient::load_file(path)
                .with_context(|| format!("Failed to load snapshot from {:?}", path))?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(source);
            Loaded {
                name: snapshot.name_or(stem).to_string(),
                snapshot,
            }
        };

        if let Err(e) = loaded.snapshot.validate() {
            if strict {
                return Err(e).with_context(|| format!("Invalid snapshot for {}", loaded.name));
            }
            tracing::warn!(repo = %loaded.name, error = %e, "snapshot has inconsistent records");
        }

        Ok(loaded)
    }

    fn analyze(&self, loaded: &Loaded, trend_days: u32) -> RepoAnalysis {
        self.analyzer
            .clone()
            .with_trend_days(trend_days)
            .analyze_snapshot(&loaded.snapshot)
    }
}

/// Health score as it stood at the end of each of the last `days` days.
///
/// Only commit activity is time-resolved in a snapshot; issue and pull request
/// state is as of export, so it contributes the same amount to every point.
fn health_history(snapshot: &ActivitySnapshot, days: u32, now: DateTime<Utc>) -> Vec<TrendPoint> {
    (0..i64::from(days))
        .rev()
        .filter_map(|ago| now.checked_sub_signed(Duration::days(ago)))
        .map(|at| {
            let analysis = analyze_at(
                &snapshot.commits,
                &snapshot.contributors,
                &snapshot.issues,
                &snapshot.pull_requests,
                0,
                at,
            );
            TrendPoint::new(at, analysis.health_score)
        })
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Metrics, score and daily commits
fn cmd_analyze(app: &App, source: &str, days: Option<u32>, strict: bool, json: bool) -> Result<()> {
    let colors = &app.colors;
    let loaded = app.load(source, strict)?;
    let analysis = app.analyze(&loaded, days.unwrap_or(app.config.trend_days));

    if json {
        return print_json(&serde_json::json!({
            "name": loaded.name,
            "metrics": analysis.metrics,
            "healthScore": analysis.health_score,
            "trendData": analysis.trend_data,
        }));
    }

    let m = &analysis.metrics;
    println!("{}", title(&format!("Repository Health: {}", loaded.name), colors));
    if let Some(repo) = &loaded.snapshot.repo {
        println!(
            "{}{} | {} stars | {} forks | updated {}{}",
            colors.dim,
            repo.language,
            format::compact_number(repo.stars),
            format::compact_number(repo.forks),
            format::relative_time(repo.updated_at, app.now()),
            colors.reset
        );
    }
    println!();

    println!("{}", section_header("Metrics", colors));
    println!("  Commits (7 days):      {}", m.commit_frequency);
    println!("  Contributor activity:  {:.1}", m.contributor_count);
    println!("  Code quality:          {:.1}", m.code_quality);
    println!(
        "  Issue resolution:      {}",
        format::percentage(m.issue_resolution_rate, None)
    );
    println!(
        "  PR merge rate:         {}",
        format::percentage(m.pr_merge_rate, None)
    );
    println!("  Mean response time:    {:.1}h", m.response_time);
    println!();

    if !analysis.trend_data.is_empty() {
        println!(
            "{}",
            section_header(&format!("Daily Commits ({} days)", analysis.trend_data.len()), colors)
        );
        let max = analysis
            .trend_data
            .iter()
            .map(|p| p.value)
            .fold(0.0, f64::max);
        for point in &analysis.trend_data {
            println!(
                "  {}: {}{}{} {}",
                point.date.format("%m-%d"),
                colors.green,
                draw_bar(point.value, max, 20),
                colors.reset,
                point.value
            );
        }
        println!();
    }

    println!(
        "{}Health Score: {}{}",
        colors.bold,
        format_score(analysis.health_score, colors),
        colors.reset
    );

    Ok(())
}

/// Health band and findings
fn cmd_report(app: &App, source: &str, strict: bool, json: bool) -> Result<()> {
    let colors = &app.colors;
    let loaded = app.load(source, strict)?;
    let analysis = app.analyze(&loaded, 0);
    let report = generate_report(&RepoHealth::new(&loaded.name, &analysis));

    if json {
        return print_json(&serde_json::json!({
            "name": loaded.name,
            "healthScore": analysis.health_score,
            "report": report,
        }));
    }

    println!("{}", title(&format!("Health Report: {}", loaded.name), colors));
    println!();
    println!(
        "  {}{}{} ({})",
        score_color(analysis.health_score, colors),
        report.overall.label(),
        colors.reset,
        format_score(analysis.health_score, colors)
    );
    println!("  {}{}{}", colors.dim, report.overall.assessment(), colors.reset);
    println!();

    for (heading, items, color) in [
        ("Strengths", &report.strengths, colors.green),
        ("Weaknesses", &report.weaknesses, colors.red),
        ("Recommendations", &report.recommendations, colors.yellow),
    ] {
        if items.is_empty() {
            continue;
        }
        println!("{}", section_header(heading, colors));
        print!("{}", format_list(items, color, colors));
        println!();
    }

    Ok(())
}

/// Head to head
fn cmd_compare(app: &App, first: &str, second: &str, json: bool) -> Result<()> {
    let colors = &app.colors;
    let a = app.load(first, false)?;
    let b = app.load(second, false)?;
    if a.name == b.name {
        tracing::warn!(repo = %a.name, "comparing a repository with itself");
    }

    let health_a = RepoHealth::new(&a.name, &app.analyze(&a, 0));
    let health_b = RepoHealth::new(&b.name, &app.analyze(&b, 0));
    let result = compare_health(&health_a, &health_b);

    if json {
        return print_json(&serde_json::json!({
            "repositories": [health_a, health_b],
            "comparison": result,
        }));
    }

    println!(
        "{}",
        title(&format!("{} vs {}", health_a.name, health_b.name), colors)
    );
    println!();
    println!(
        "  {:<24} {}  {}",
        health_a.name,
        format_score(health_a.health_score, colors),
        draw_bar(health_a.health_score, 100.0, 25)
    );
    println!(
        "  {:<24} {}  {}",
        health_b.name,
        format_score(health_b.health_score, colors),
        draw_bar(health_b.health_score, 100.0, 25)
    );
    println!();

    println!("{}", section_header("Winners", colors));
    for (label, entry) in comparison_rows(&result) {
        println!(
            "  {:<22} {}{}{} (+{:.2})",
            label, colors.green, entry.winner, colors.reset, entry.difference
        );
    }

    Ok(())
}

fn comparison_rows(result: &HealthComparison) -> [(&'static str, &MetricComparison); 6] {
    [
        ("Overall", &result.overall),
        ("Commit frequency", &result.metrics.commit_frequency),
        ("Contributor activity", &result.metrics.contributor_count),
        ("Code quality", &result.metrics.code_quality),
        ("Issue resolution", &result.metrics.issue_resolution_rate),
        ("PR merge rate", &result.metrics.pr_merge_rate),
    ]
}

/// Extrapolate health and summarize daily commit volatility
fn cmd_forecast(
    app: &App,
    source: &str,
    days: Option<u32>,
    window: Option<usize>,
    json: bool,
) -> Result<()> {
    let colors = &app.colors;
    let now = app.now();
    let days = days.unwrap_or(app.config.forecast_days);
    let window = window.unwrap_or(app.config.moving_average_window);

    let loaded = app.load(source, false)?;
    let history = health_history(&loaded.snapshot, app.config.trend_days, now);
    let forecast = predict_trend(&history, days, now);

    let daily: Vec<f64> = app
        .analyze(&loaded, app.config.trend_days)
        .trend_data
        .iter()
        .map(|p| p.value)
        .collect();
    let smoothed = moving_average(&daily, window);
    let volatility = standard_deviation(&daily);

    if json {
        return print_json(&serde_json::json!({
            "name": loaded.name,
            "history": history,
            "forecast": forecast,
            "dailyCommits": {
                "values": daily,
                "movingAverage": smoothed,
                "window": window,
                "standardDeviation": volatility,
            },
        }));
    }

    println!("{}", title(&format!("Health Forecast: {}", loaded.name), colors));
    println!();

    if forecast.is_empty() {
        println!("  Not enough history to forecast.");
        return Ok(());
    }

    if let Some(current) = history.last() {
        println!("  Current:  {}", format_score(current.value, colors));
    }
    if let Some(last) = forecast.last() {
        println!(
            "  In {} days: {}",
            forecast.len(),
            format_score(last.value, colors)
        );
    }
    println!();

    println!("{}", section_header("Projected", colors));
    let step = (forecast.len() / 10).max(1);
    for point in forecast.iter().step_by(step) {
        println!(
            "  {}: {}{}{} {:.1}",
            point.date.format("%m-%d"),
            score_color(point.value, colors),
            draw_bar(point.value, 100.0, 25),
            colors.reset,
            point.value
        );
    }
    println!();

    println!("{}", section_header("Daily Commits", colors));
    if let Some(latest) = smoothed.last() {
        println!("  {}-day average: {:.1}", window.max(1), latest);
    }
    println!("  Std deviation:  {:.2}", volatility);

    Ok(())
}

/// Twelve-week commit trend
fn cmd_trend(app: &App, source: &str, json: bool) -> Result<()> {
    let colors = &app.colors;
    let loaded = app.load(source, false)?;
    let result = commit_trend(&loaded.snapshot.commits, app.now());

    if json {
        return print_json(&serde_json::json!({
            "name": loaded.name,
            "commitTrend": result,
        }));
    }

    println!("{}", title(&format!("Commit Trend: {}", loaded.name), colors));
    println!();

    println!("{}", section_header("Weekly Commits", colors));
    let max = result.weekly_commits.iter().copied().max().unwrap_or(0) as f64;
    let weeks = result.weekly_commits.len();
    for (i, count) in result.weekly_commits.iter().enumerate() {
        let label = match weeks - 1 - i {
            0 => "this week".to_string(),
            n => format!("{}w ago", n),
        };
        println!(
            "  {:>9}: {}{}{} {}",
            label,
            colors.green,
            draw_bar(*count as f64, max, 25),
            colors.reset,
            count
        );
    }
    println!();

    println!(
        "  Trend: {} {}",
        result.trend,
        format_trend(result.trend, result.change_rate, colors)
    );

    Ok(())
}

/// Write a report in the requested format
fn cmd_export(app: &App, source: &str, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let now = app.now();
    let loaded = app.load(source, false)?;
    let analysis = app.analyze(&loaded, app.config.trend_days);

    let content = match format {
        ExportFormat::Markdown => {
            let report = generate_report(&RepoHealth::new(&loaded.name, &analysis));
            markdown_report(&ReportDocument {
                name: &loaded.name,
                summary: loaded.snapshot.repo.as_ref(),
                analysis: &analysis,
                report: &report,
                generated_at: now,
            })
        }
        ExportFormat::Csv => trend_csv(&analysis.trend_data, "commits"),
        ExportFormat::Json => {
            let report = generate_report(&RepoHealth::new(&loaded.name, &analysis));
            let output = serde_json::json!({
                "name": loaded.name,
                "generated": now.to_rfc3339(),
                "repo": loaded.snapshot.repo,
                "analysis": analysis,
                "report": report,
                "commitTrend": commit_trend(&loaded.snapshot.commits, now),
            });
            serde_json::to_string_pretty(&output)? + "\n"
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, &content)
                .with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!(path = %path.display(), format = format.extension(), "report exported");
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}

/// Show or create the config file
fn cmd_config(path: &Path, init: bool, force: bool) -> Result<()> {
    if init {
        if path.exists() && !force {
            bail!(
                "Config already exists at {:?} (use --force to overwrite)",
                path
            );
        }
        Config::default().save(path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = Config::load(path)?;
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
