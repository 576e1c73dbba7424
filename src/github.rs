use crate::config::GitVerseConfig;
use crate::error::GatewayError;
use crate::types::{decode_list, Contributor, Issue, PullRequest, RepositoryMetadata};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, error, warn};

/// The four upstream resources the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Repository,
    Contributors,
    Issues,
    PullRequests,
}

impl Resource {
    pub fn label(self) -> &'static str {
        match self {
            Resource::Repository => "repository",
            Resource::Contributors => "contributors",
            Resource::Issues => "issues",
            Resource::PullRequests => "pull requests",
        }
    }

    /// Path and query under the API base. Only the first page is requested.
    fn path(self, owner: &str, repo: &str, per_page: u32) -> String {
        let base = format!(
            "/repos/{}/{}",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        match self {
            Resource::Repository => base,
            Resource::Contributors => format!("{}/contributors?per_page={}", base, per_page),
            Resource::Issues => format!("{}/issues?state=all&per_page={}", base, per_page),
            Resource::PullRequests => format!("{}/pulls?state=all&per_page={}", base, per_page),
        }
    }
}

/// Check an owner/repo pair before it is spliced into a request path.
///
/// Blank values are missing. Anything outside GitHub's name charset
/// (`A-Z a-z 0-9 . _ -`), or made only of dots, is rejected so a name can
/// never act as a path segment of its own.
pub fn validate_identifiers(owner: &str, repo: &str) -> Result<(), GatewayError> {
    if owner.trim().is_empty() || repo.trim().is_empty() {
        return Err(GatewayError::MissingParameter);
    }
    for value in [owner, repo] {
        if !is_valid_name(value) {
            return Err(GatewayError::InvalidParameter(value.to_string()));
        }
    }
    Ok(())
}

fn is_valid_name(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && !value.chars().all(|c| c == '.')
}

/// Thin GitHub REST client. One round trip per call: no retries, caching or pagination.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    per_page: u32,
}

impl GitHubClient {
    pub fn new(config: &GitVerseConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        if let Some(token) = &config.github_token {
            let mut value = HeaderValue::from_str(&format!("token {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(GitHubClient {
            http,
            api_url: config.github_api_url.trim_end_matches('/').to_string(),
            per_page: config.per_page,
        })
    }

    /// Fetch one resource and hand back the upstream JSON untouched.
    pub async fn fetch_raw(
        &self,
        resource: Resource,
        owner: &str,
        repo: &str,
    ) -> Result<Value, GatewayError> {
        validate_identifiers(owner, repo)?;

        let url = format!("{}{}", self.api_url, resource.path(owner, repo, self.per_page));
        debug!(%url, "requesting GitHub resource");

        let transport = |source| GatewayError::Transport {
            resource: resource.label(),
            source,
        };

        let response = self.http.get(&url).send().await.map_err(|e| {
            error!(resource = resource.label(), owner, repo, error = %e, "GitHub request failed");
            transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or_else(|_| Value::Object(Default::default()));
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            warn!(resource = resource.label(), owner, repo, status = status.as_u16(), %message, "GitHub returned an error");
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(|e| {
            error!(resource = resource.label(), owner, repo, error = %e, "GitHub sent an unreadable body");
            transport(e)
        })
    }

    pub async fn repository(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata, GatewayError> {
        let raw = self.fetch_raw(Resource::Repository, owner, repo).await?;
        Ok(serde_json::from_value(raw).unwrap_or_else(|e| {
            warn!(owner, repo, error = %e, "repository payload did not match, using defaults");
            RepositoryMetadata::default()
        }))
    }

    pub async fn contributors(&self, owner: &str, repo: &str) -> Result<Vec<Contributor>, GatewayError> {
        let raw = self.fetch_raw(Resource::Contributors, owner, repo).await?;
        Ok(decode_list(raw))
    }

    pub async fn issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>, GatewayError> {
        let raw = self.fetch_raw(Resource::Issues, owner, repo).await?;
        Ok(decode_list(raw))
    }

    pub async fn pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>, GatewayError> {
        let raw = self.fetch_raw(Resource::PullRequests, owner, repo).await?;
        Ok(decode_list(raw))
    }
}

/// Split a repository reference into `(owner, repo)`.
///
/// Accepts anything containing `github.com/<owner>/<repo>` as well as the
/// `owner/repo` shorthand.
pub fn parse_repo_reference(input: &str) -> Option<(String, String)> {
    let input = input.trim();
    let path = match input.find("github.com/") {
        Some(idx) => &input[idx + "github.com/".len()..],
        None if !input.contains("://") && !input.contains(':') => input,
        None => return None,
    };

    let mut segments = path.split('/');
    let owner = segments.next()?.trim();
    let repo = segments.next()?.trim();
    let repo = repo
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or(repo)
        .trim_end_matches(".git");

    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
