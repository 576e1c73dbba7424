//! Repository health score and the insight text derived from it.
//!
//! The score is four equally weighted sub-scores of 25 points each. Every
//! sub-score saturates on its own, so the rounded sum always lands in 0..=100.

use crate::types::{Contributor, Issue, PullRequest, RepositoryMetadata};
use serde::Serialize;

const SUB_SCORE_MAX: f64 = 25.0;
const STAR_SATURATION: f64 = 1000.0;
const CONTRIBUTOR_SATURATION: f64 = 20.0;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct HealthBreakdown {
    pub stars: f64,
    pub contributors: f64,
    pub issues: f64,
    pub pull_requests: f64,
}

impl HealthBreakdown {
    pub fn compute(
        repo: &RepositoryMetadata,
        contributors: &[Contributor],
        issues: &[Issue],
        pull_requests: &[PullRequest],
    ) -> Self {
        let closed_issues = issues.iter().filter(|i| i.is_closed()).count();
        let merged_prs = pull_requests.iter().filter(|pr| pr.is_merged()).count();

        HealthBreakdown {
            stars: ramp(repo.stargazers_count as f64, STAR_SATURATION),
            contributors: ramp(contributors.len() as f64, CONTRIBUTOR_SATURATION),
            issues: ratio_score(closed_issues, issues.len()),
            pull_requests: ratio_score(merged_prs, pull_requests.len()),
        }
    }

    pub fn total(&self) -> u8 {
        let sum = self.stars + self.contributors + self.issues + self.pull_requests;
        sum.round().clamp(0.0, 100.0) as u8
    }
}

fn ramp(value: f64, saturation: f64) -> f64 {
    (value / saturation).min(1.0) * SUB_SCORE_MAX
}

// Zero done (or zero total) scores nothing rather than dividing by zero.
fn ratio_score(done: usize, total: usize) -> f64 {
    if done == 0 || total == 0 {
        return 0.0;
    }
    (done as f64 / total as f64).min(1.0) * SUB_SCORE_MAX
}

pub fn compute_health_score(
    repo: &RepositoryMetadata,
    contributors: &[Contributor],
    issues: &[Issue],
    pull_requests: &[PullRequest],
) -> u8 {
    HealthBreakdown::compute(repo, contributors, issues, pull_requests).total()
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Excellent,
    Good,
    Concerning,
}

impl HealthBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => HealthBand::Excellent,
            60..=79 => HealthBand::Good,
            _ => HealthBand::Concerning,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            HealthBand::Excellent => {
                "excellent health with active development and a strong community."
            }
            HealthBand::Good => "good overall health, though some metrics could be improved.",
            HealthBand::Concerning => {
                "some concerning trends that should be addressed to improve repository health."
            }
        }
    }
}

pub fn improvement_suggestions(
    score: u8,
    contributors: &[Contributor],
    issues: &[Issue],
) -> Vec<&'static str> {
    let mut suggestions = Vec::new();
    if score < 90 {
        suggestions.push(
            "Consider improving documentation to attract more contributors and make onboarding easier.",
        );
    }
    if issues.iter().filter(|i| i.is_open()).count() > 10 {
        suggestions.push(
            "Address the backlog of open issues to improve user satisfaction and project stability.",
        );
    }
    if contributors.len() < 5 {
        suggestions.push(
            "Broaden the contributor base to ensure project sustainability and diverse perspectives.",
        );
    }
    suggestions.push("Implement automated testing to maintain code quality and reduce regression bugs.");
    suggestions
}

/// Naive 30-day projection: fixed fractions of what is visible today.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthForecast {
    pub stars: u64,
    pub pull_requests: u64,
    pub issues: u64,
}

impl GrowthForecast {
    pub fn project(repo: &RepositoryMetadata, issues: &[Issue], pull_requests: &[PullRequest]) -> Self {
        GrowthForecast {
            stars: (repo.stargazers_count as f64 * 0.05).round() as u64,
            pull_requests: (pull_requests.len() as f64 * 0.2).round() as u64,
            issues: (issues.len() as f64 * 0.15).round() as u64,
        }
    }
}
