use crate::config::GitVerseConfig;
use crate::dashboard;
use crate::error::GatewayError;
use crate::github::{validate_identifiers, GitHubClient, Resource};
use crate::summary::{generate_summary, generator_from_config, SummaryInput, TextGenerator};
use crate::types::{decode_list, RepositoryMetadata};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub client: GitHubClient,
    pub generator: Arc<dyn TextGenerator>,
    pub config: Arc<GitVerseConfig>,
}

impl AppState {
    pub fn from_config(config: GitVerseConfig) -> anyhow::Result<Self> {
        Ok(AppState {
            client: GitHubClient::new(&config)?,
            generator: generator_from_config(&config),
            config: Arc::new(config),
        })
    }
}

/// Both optional so a missing one becomes our own 400 rather than an extractor rejection.
#[derive(Deserialize, Debug, Default)]
pub struct RepoParams {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

impl RepoParams {
    fn require(&self) -> Result<(&str, &str), GatewayError> {
        match (self.owner.as_deref(), self.repo.as_deref()) {
            (Some(owner), Some(repo)) => {
                validate_identifiers(owner, repo)?;
                Ok((owner, repo))
            }
            _ => Err(GatewayError::MissingParameter),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/github/repo", get(proxy_repository))
        .route("/api/github/contributors", get(proxy_contributors))
        .route("/api/github/issues", get(proxy_issues))
        .route("/api/github/pull-requests", get(proxy_pull_requests))
        .route("/api/dashboard/{owner}/{repo}", get(dashboard))
        .route("/api/summary", post(summary))
        .with_state(state)
}

async fn relay(
    state: &AppState,
    resource: Resource,
    params: &RepoParams,
) -> Result<Json<Value>, GatewayError> {
    let (owner, repo) = params.require()?;
    let body = state.client.fetch_raw(resource, owner, repo).await?;
    info!(resource = resource.label(), owner, repo, "proxied GitHub resource");
    Ok(Json(body))
}

async fn proxy_repository(
    State(state): State<AppState>,
    Query(params): Query<RepoParams>,
) -> Result<Json<Value>, GatewayError> {
    relay(&state, Resource::Repository, &params).await
}

async fn proxy_contributors(
    State(state): State<AppState>,
    Query(params): Query<RepoParams>,
) -> Result<Json<Value>, GatewayError> {
    relay(&state, Resource::Contributors, &params).await
}

async fn proxy_issues(
    State(state): State<AppState>,
    Query(params): Query<RepoParams>,
) -> Result<Json<Value>, GatewayError> {
    relay(&state, Resource::Issues, &params).await
}

async fn proxy_pull_requests(
    State(state): State<AppState>,
    Query(params): Query<RepoParams>,
) -> Result<Json<Value>, GatewayError> {
    relay(&state, Resource::PullRequests, &params).await
}

async fn dashboard(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<dashboard::DashboardReport>, GatewayError> {
    let report = dashboard::assemble(
        &state.client,
        state.generator.clone(),
        state.config.summary_timeout(),
        &owner,
        &repo,
    )
    .await?;
    Ok(Json(report))
}

/// Body of `POST /api/summary`, shaped like the GitHub payloads the page already holds.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryRequest {
    pub repo_info: Value,
    pub contributors: Value,
    pub issues: Value,
    pub pull_requests: Value,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SummaryResponse {
    pub summary: String,
}

async fn summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Json<SummaryResponse> {
    let repository: RepositoryMetadata = serde_json::from_value(request.repo_info).unwrap_or_else(|e| {
        warn!(error = %e, "summary request carried an unusable repoInfo");
        RepositoryMetadata::default()
    });
    let contributors = decode_list(request.contributors);
    let issues = decode_list(request.issues);
    let pull_requests = decode_list(request.pull_requests);

    let input = SummaryInput::from_dashboard(&repository, &contributors, &issues, &pull_requests);
    let summary = generate_summary(state.generator.clone(), &input, state.config.summary_timeout()).await;
    Json(SummaryResponse { summary })
}

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "gitverse listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_require_both_values() {
        let full = RepoParams {
            owner: Some("o".to_string()),
            repo: Some("r".to_string()),
        };
        assert_eq!(full.require().unwrap(), ("o", "r"));

        let missing = RepoParams {
            owner: Some("o".to_string()),
            repo: None,
        };
        assert!(matches!(missing.require(), Err(GatewayError::MissingParameter)));

        let empty = RepoParams {
            owner: Some(String::new()),
            repo: Some("r".to_string()),
        };
        assert!(empty.require().is_err());

        let blank = RepoParams {
            owner: Some("o".to_string()),
            repo: Some("   ".to_string()),
        };
        assert!(matches!(blank.require(), Err(GatewayError::MissingParameter)));

        let dotted = RepoParams {
            owner: Some("..".to_string()),
            repo: Some("user".to_string()),
        };
        assert!(matches!(dotted.require(), Err(GatewayError::InvalidParameter(_))));
    }
}
