use crate::config::GitVerseConfig;
use crate::dashboard::{self, DashboardReport};
use crate::github::{parse_repo_reference, GitHubClient};
use crate::summary::{format_count, generator_from_config};
use anyhow::Context;
use std::path::Path;

pub async fn analyze_repo(
    config: &GitVerseConfig,
    reference: &str,
    json: bool,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let (owner, repo) = parse_repo_reference(reference).with_context(|| {
        format!("'{}' is not a GitHub repository URL or owner/repo", reference)
    })?;

    let client = GitHubClient::new(config)?;
    let generator = generator_from_config(config);
    let report = dashboard::assemble(&client, generator, config.summary_timeout(), &owner, &repo)
        .await
        .with_context(|| format!("failed to analyze {}/{}", owner, repo))?;

    if let Some(path) = out {
        write_markdown(&report, path).await?;
        println!("Report written to {}.", path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

async fn write_markdown(report: &DashboardReport, path: &Path) -> anyhow::Result<()> {
    tokio::fs::write(path, dashboard::render_markdown(report))
        .await
        .with_context(|| format!("can't write report to {}", path.display()))
}

fn print_report(report: &DashboardReport) {
    let repo = &report.repository;

    println!("\n{}", "=".repeat(60));
    println!("{}", repo.display_name());
    println!("{}", "=".repeat(60));
    if let Some(desc) = &repo.description {
        println!("{}\n", desc);
    }
    println!(
        "  ⭐ {}   forks {}   watchers {}   open issues {}",
        format_count(repo.stargazers_count),
        format_count(repo.forks_count),
        format_count(repo.subscribers_count),
        format_count(repo.open_issues_count),
    );

    println!("\nHealth score: {}/100", report.health_score);
    println!("  stars         {:>5.1}/25", report.breakdown.stars);
    println!("  contributors  {:>5.1}/25", report.breakdown.contributors);
    println!("  issues        {:>5.1}/25", report.breakdown.issues);
    println!("  pull requests {:>5.1}/25", report.breakdown.pull_requests);
    println!("This repository shows {}", report.assessment);

    println!("\nSummary:\n  {}", report.summary);

    if !report.top_contributors.is_empty() {
        println!("\nTop contributors:");
        for contributor in &report.top_contributors {
            println!("  {:<24} {}", contributor.login, contributor.contributions);
        }
    }

    if !report.charts.issues.is_empty() {
        println!("\nIssues by month (open/closed):");
        for point in &report.charts.issues {
            println!("  {:>8}  {}/{}", point.month, point.open, point.closed);
        }
    }

    if !report.charts.pull_requests.is_empty() {
        println!("\nPull requests by month (opened/merged):");
        for point in &report.charts.pull_requests {
            println!("  {:>8}  {}/{}", point.month, point.opened, point.merged);
        }
    }

    println!("\nSuggestions:");
    for suggestion in &report.suggestions {
        println!("  - {}", suggestion);
    }
    println!();
}
