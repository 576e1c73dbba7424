use crate::charts::{
    contributor_chart, health_gauge, issue_trend, pull_request_trend, rank_contributors,
    IssuePoint, LabelValue, PullRequestPoint,
};
use crate::error::GatewayError;
use crate::github::GitHubClient;
use crate::health::{improvement_suggestions, GrowthForecast, HealthBand, HealthBreakdown};
use crate::summary::{format_count, generate_summary, SummaryInput, TextGenerator};
use crate::types::{Contributor, Issue, PullRequest, RepositoryMetadata};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const TOP_CONTRIBUTORS: usize = 10;
const RECENT_ISSUES: usize = 5;

#[derive(Serialize, Debug, Clone)]
pub struct ChartData {
    pub contributors: Vec<LabelValue>,
    pub issues: Vec<IssuePoint>,
    pub pull_requests: Vec<PullRequestPoint>,
    pub health_gauge: Vec<LabelValue>,
}

/// Everything one dashboard view shows for a repository.
#[derive(Serialize, Debug, Clone)]
pub struct DashboardReport {
    pub repository: RepositoryMetadata,
    pub health_score: u8,
    pub breakdown: HealthBreakdown,
    pub band: HealthBand,
    pub assessment: &'static str,
    pub suggestions: Vec<&'static str>,
    pub forecast: GrowthForecast,
    pub summary: String,
    pub top_contributors: Vec<Contributor>,
    pub recent_issues: Vec<Issue>,
    pub charts: ChartData,
}

/// The four raw inputs after fetching. Secondary lists may be empty because their fetch failed.
#[derive(Debug, Clone, Default)]
pub struct RepositoryData {
    pub repository: RepositoryMetadata,
    pub contributors: Vec<Contributor>,
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
}

/// Fetch all four resources at once.
///
/// A failed repository fetch fails the whole call. The other three degrade to
/// empty lists so the page still renders.
pub async fn fetch_repository_data(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
) -> Result<RepositoryData, GatewayError> {
    let (repository, contributors, issues, pull_requests) = tokio::join!(
        client.repository(owner, repo),
        client.contributors(owner, repo),
        client.issues(owner, repo),
        client.pull_requests(owner, repo),
    );

    Ok(RepositoryData {
        repository: repository?,
        contributors: or_empty(contributors, "contributors", owner, repo),
        issues: or_empty(issues, "issues", owner, repo),
        pull_requests: or_empty(pull_requests, "pull requests", owner, repo),
    })
}

fn or_empty<T>(result: Result<Vec<T>, GatewayError>, what: &str, owner: &str, repo: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(owner, repo, error = %e, detail = %e.message(), "failed to fetch {what}, continuing without them");
        Vec::new()
    })
}

/// Score, summarize and chart data that has already been fetched.
pub async fn build_report(
    data: RepositoryData,
    generator: Arc<dyn TextGenerator>,
    summary_timeout: Duration,
) -> DashboardReport {
    let RepositoryData {
        repository,
        contributors,
        issues,
        pull_requests,
    } = data;

    let breakdown = HealthBreakdown::compute(&repository, &contributors, &issues, &pull_requests);
    let health_score = breakdown.total();
    let band = HealthBand::from_score(health_score);

    let summary_input = SummaryInput::from_dashboard(&repository, &contributors, &issues, &pull_requests);
    let summary = generate_summary(generator, &summary_input, summary_timeout).await;

    DashboardReport {
        health_score,
        breakdown,
        band,
        assessment: band.description(),
        suggestions: improvement_suggestions(health_score, &contributors, &issues),
        forecast: GrowthForecast::project(&repository, &issues, &pull_requests),
        summary,
        top_contributors: rank_contributors(&contributors, TOP_CONTRIBUTORS),
        recent_issues: issues.iter().take(RECENT_ISSUES).cloned().collect(),
        charts: ChartData {
            contributors: contributor_chart(&contributors),
            issues: issue_trend(&issues),
            pull_requests: pull_request_trend(&pull_requests),
            health_gauge: health_gauge(health_score),
        },
        repository,
    }
}

pub async fn assemble(
    client: &GitHubClient,
    generator: Arc<dyn TextGenerator>,
    summary_timeout: Duration,
    owner: &str,
    repo: &str,
) -> Result<DashboardReport, GatewayError> {
    let data = fetch_repository_data(client, owner, repo).await?;
    let report = build_report(data, generator, summary_timeout).await;
    info!(owner, repo, score = report.health_score, "dashboard assembled");
    Ok(report)
}

/// Markdown rendition of a report, for `analyze --out`.
pub fn render_markdown(report: &DashboardReport) -> String {
    let repo = &report.repository;
    let mut output = String::new();

    let _ = writeln!(output, "# {} Repository Report", repo.display_name());
    if let Some(description) = repo.description.as_deref() {
        let _ = writeln!(output, "{}", description);
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Stars: {}", format_count(repo.stargazers_count));
    let _ = writeln!(output, "- Forks: {}", format_count(repo.forks_count));
    let _ = writeln!(output, "- Watchers: {}", format_count(repo.subscribers_count));
    let _ = writeln!(output, "- Open issues: {}", format_count(repo.open_issues_count));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Health Score: {}/100", report.health_score);
    let _ = writeln!(output, "- Stars: {:.1}/25", report.breakdown.stars);
    let _ = writeln!(output, "- Contributors: {:.1}/25", report.breakdown.contributors);
    let _ = writeln!(output, "- Issue resolution: {:.1}/25", report.breakdown.issues);
    let _ = writeln!(output, "- Pull requests merged: {:.1}/25", report.breakdown.pull_requests);
    let _ = writeln!(output);
    let _ = writeln!(output, "This repository shows {}", report.assessment);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "{}", report.summary);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Contributors");
    if report.top_contributors.is_empty() {
        let _ = writeln!(output, "No contributor data available.");
    } else {
        for (rank, contributor) in report.top_contributors.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({} contributions)",
                rank + 1,
                contributor.login,
                contributor.contributions
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Issue Trend");
    if report.charts.issues.is_empty() {
        let _ = writeln!(output, "No issues recorded.");
    } else {
        for point in &report.charts.issues {
            let _ = writeln!(output, "- {}: {} open, {} closed", point.month, point.open, point.closed);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pull Request Trend");
    if report.charts.pull_requests.is_empty() {
        let _ = writeln!(output, "No pull requests recorded.");
    } else {
        for point in &report.charts.pull_requests {
            let _ = writeln!(
                output,
                "- {}: {} opened, {} merged",
                point.month, point.opened, point.merged
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Issues");
    if report.recent_issues.is_empty() {
        let _ = writeln!(output, "No issues recorded.");
    } else {
        for issue in &report.recent_issues {
            let opened = issue
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown date".to_string());
            let _ = writeln!(
                output,
                "- #{} {} ({}, opened by {} on {})",
                issue.number,
                issue.title,
                if issue.is_open() { "open" } else { "closed" },
                issue.author(),
                opened
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## 30-Day Forecast");
    let _ = writeln!(output, "- Stars: +{}", report.forecast.stars);
    let _ = writeln!(output, "- Pull requests: {}", report.forecast.pull_requests);
    let _ = writeln!(output, "- Issues: {}", report.forecast.issues);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Suggestions");
    for suggestion in &report.suggestions {
        let _ = writeln!(output, "- {}", suggestion);
    }

    output
}
