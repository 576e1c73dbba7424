//! Natural-language repository summaries.
//!
//! The primary path asks an external text-generation API. That call is raced
//! against a timer; if it loses, errors, or comes back empty, a paragraph is
//! formatted from the same metrics instead. Callers always get text.

use crate::charts::rank_contributors;
use crate::config::GitVerseConfig;
use crate::error::SummaryError;
use crate::types::{Contributor, Issue, PullRequest, RepositoryMetadata};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const PROMPT_CONTRIBUTORS: usize = 5;
const FALLBACK_CONTRIBUTORS: usize = 3;

pub const APOLOGY: &str =
    "Unable to generate a summary for this repository at this time. Please try again later.";

/// Everything a summary is derived from.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SummaryInput {
    pub repository: RepositoryMetadata,
    pub contributors: Vec<Contributor>,
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
}

impl SummaryInput {
    /// Keeps only the top contributors; issues and PRs go in whole.
    pub fn from_dashboard(
        repository: &RepositoryMetadata,
        contributors: &[Contributor],
        issues: &[Issue],
        pull_requests: &[PullRequest],
    ) -> Self {
        SummaryInput {
            repository: repository.clone(),
            contributors: rank_contributors(contributors, PROMPT_CONTRIBUTORS),
            issues: issues.to_vec(),
            pull_requests: pull_requests.to_vec(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryMetrics {
    pub total_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    pub total_pull_requests: usize,
    pub open_pull_requests: usize,
    pub merged_pull_requests: usize,
    /// Percent of issues closed, 0 when there are none.
    pub issue_resolution_rate: u64,
    /// Percent of PRs merged, 0 when there are none.
    pub pr_merge_rate: u64,
}

impl SummaryMetrics {
    pub fn from_input(input: &SummaryInput) -> Self {
        let open_issues = input.issues.iter().filter(|i| i.is_open()).count();
        let closed_issues = input.issues.iter().filter(|i| i.is_closed()).count();
        let merged = input.pull_requests.iter().filter(|pr| pr.is_merged()).count();
        let open_prs = input.pull_requests.iter().filter(|pr| pr.is_open()).count();

        SummaryMetrics {
            total_issues: input.issues.len(),
            open_issues,
            closed_issues,
            total_pull_requests: input.pull_requests.len(),
            open_pull_requests: open_prs,
            merged_pull_requests: merged,
            issue_resolution_rate: percent(closed_issues, input.issues.len()),
            pr_merge_rate: percent(merged, input.pull_requests.len()),
        }
    }

    pub fn activity_level(&self) -> &'static str {
        if self.total_pull_requests > 20 || self.total_issues > 50 {
            "high"
        } else if self.total_pull_requests > 10 || self.total_issues > 20 {
            "moderate"
        } else {
            "low"
        }
    }

    pub fn health_status(&self) -> &'static str {
        if self.issue_resolution_rate > 70 && self.pr_merge_rate > 70 {
            "excellent"
        } else if self.issue_resolution_rate > 50 && self.pr_merge_rate > 50 {
            "good"
        } else {
            "needs improvement"
        }
    }
}

fn percent(part: usize, whole: usize) -> u64 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u64
}

/// `12400` -> `"12,400"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn build_prompt(input: &SummaryInput) -> String {
    let repo = &input.repository;
    let metrics = SummaryMetrics::from_input(input);
    let top = input
        .contributors
        .iter()
        .take(PROMPT_CONTRIBUTORS)
        .map(|c| format!("{} ({} commits)", c.login, c.contributions))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Analyze this GitHub repository and provide a concise summary (max 250 words):

Repository: {name}
Description: {description}

Key Metrics:
- Stars: {stars}
- Forks: {forks}
- Watchers: {watchers}
- Open Issues: {open_issues}
- Closed Issues: {closed_issues}
- Open PRs: {open_prs}
- Merged PRs: {merged_prs}
- Top Contributors: {top}

Please include:
1. A brief overview of what the repository does
2. Assessment of repository health based on activity metrics
3. Observations about contributor activity
4. 2-3 specific suggestions for improvement

Format the response as a single paragraph without bullet points or sections.
",
        name = repo.display_name(),
        description = repo
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description provided"),
        stars = repo.stargazers_count,
        forks = repo.forks_count,
        watchers = repo.subscribers_count,
        open_issues = metrics.open_issues,
        closed_issues = metrics.closed_issues,
        open_prs = metrics.open_pull_requests,
        merged_prs = metrics.merged_pull_requests,
    )
}

/// Deterministic paragraph built from the metrics alone.
pub fn fallback_summary(input: &SummaryInput) -> String {
    match write_fallback(input) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "fallback summary failed, returning apology");
            APOLOGY.to_string()
        }
    }
}

fn write_fallback(input: &SummaryInput) -> Result<String, std::fmt::Error> {
    let repo = &input.repository;
    let metrics = SummaryMetrics::from_input(input);
    let top = input
        .contributors
        .iter()
        .take(FALLBACK_CONTRIBUTORS)
        .map(|c| c.login.as_str())
        .collect::<Vec<_>>();
    let top = if top.is_empty() {
        "none listed".to_string()
    } else {
        top.join(", ")
    };

    let mut out = String::new();
    write!(
        out,
        "{} is a repository with {} stars and {} forks. ",
        repo.display_name(),
        format_count(repo.stargazers_count),
        format_count(repo.forks_count)
    )?;
    write!(
        out,
        "The repository shows {} activity with {} total issues ({} open, {} closed) and {} pull requests. ",
        metrics.activity_level(),
        metrics.total_issues,
        metrics.open_issues,
        metrics.closed_issues,
        metrics.total_pull_requests
    )?;
    write!(out, "Key contributors include {}. ", top)?;
    write!(
        out,
        "Based on metrics analysis, this repository appears to be in {} health with an issue resolution rate of {}% and PR merge rate of {}%. ",
        metrics.health_status(),
        metrics.issue_resolution_rate,
        metrics.pr_merge_rate
    )?;
    if let Some(description) = repo.description.as_deref().filter(|d| !d.trim().is_empty()) {
        write!(out, "The repository is described as: \"{}\" ", description)?;
    }
    write!(
        out,
        "Improvement areas could include {}, {}, and ensuring documentation remains up-to-date.",
        if metrics.open_issues > 10 {
            "addressing the backlog of open issues"
        } else {
            "maintaining the current pace of development"
        },
        if input.contributors.len() < 5 {
            "expanding the contributor base"
        } else {
            "continuing to engage the active community"
        }
    )?;
    Ok(out)
}

/// An external text-completion service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Stand-in when no API key is configured; every summary takes the fallback path.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, SummaryError> {
        Err(SummaryError::Disabled)
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidatePart {
    text: String,
}

impl GeminiClient {
    /// The key travels in the `x-goog-api-key` header, never in the URL.
    pub fn new(config: &GitVerseConfig, api_key: &str) -> Result<Self, SummaryError> {
        let mut key = HeaderValue::from_str(api_key).map_err(|_| SummaryError::InvalidApiKey)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;
        Ok(GeminiClient {
            http,
            api_url: config.gemini_api_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, SummaryError> {
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SummaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(text)
    }
}

/// Pick the generator for this process: Gemini when a key is configured.
pub fn generator_from_config(config: &GitVerseConfig) -> Arc<dyn TextGenerator> {
    match &config.gemini_api_key {
        Some(key) => match GeminiClient::new(config, key) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!(error = %e, "can't build Gemini client, summaries will use the fallback");
                Arc::new(DisabledGenerator)
            }
        },
        None => {
            debug!("GEMINI_API_KEY not set, summaries will use the fallback");
            Arc::new(DisabledGenerator)
        }
    }
}

/// Ask the generator, bounded by `limit`, and fall back on any failure.
pub async fn generate_summary(
    generator: Arc<dyn TextGenerator>,
    input: &SummaryInput,
    limit: Duration,
) -> String {
    let prompt = build_prompt(input);
    match request_summary(generator, prompt, limit).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, repo = input.repository.display_name(), "using fallback summary");
            fallback_summary(input)
        }
    }
}

async fn request_summary(
    generator: Arc<dyn TextGenerator>,
    prompt: String,
    limit: Duration,
) -> Result<String, SummaryError> {
    // Detached task: if the timer wins, the request runs to completion and its result is dropped.
    let task = tokio::spawn(async move { generator.generate(&prompt).await });

    let text = match tokio::time::timeout(limit, task).await {
        Err(_) => return Err(SummaryError::Timeout(limit)),
        Ok(Err(join)) => return Err(SummaryError::Aborted(join.to_string())),
        Ok(Ok(result)) => result?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(SummaryError::EmptyResponse);
    }
    Ok(text.to_string())
}
