use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use gitverse::config::GitVerseConfig;
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("token {}", TOKEN))
        .unwrap_or(false)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response()
}

async fn repository(headers: HeaderMap, Path((owner, repo)): Path<(String, String)>) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Bad credentials" }))).into_response();
    }
    match (owner.as_str(), repo.as_str()) {
        ("acme", "rocket") | ("acme", "partial") => Json(json!({
            "full_name": format!("{}/{}", owner, repo),
            "name": repo,
            "description": "Rockets for coyotes",
            "html_url": format!("https://github.com/{}/{}", owner, repo),
            "stargazers_count": 12400,
            "forks_count": 300,
            "subscribers_count": 40,
            "open_issues_count": 10,
            "private": false
        }))
        .into_response(),
        ("acme", "broken") => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        _ => not_found(),
    }
}

async fn contributors(Path((_owner, repo)): Path<(String, String)>) -> Response {
    if repo == "partial" {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "message": "try later" }))).into_response();
    }
    let list: Vec<Value> = (0..20)
        .map(|i| {
            json!({
                "login": format!("dev{}", i),
                "avatar_url": format!("https://avatars.example/{}", i),
                "html_url": format!("https://github.com/dev{}", i),
                "contributions": 200 - i * 5
            })
        })
        .collect();
    Json(Value::Array(list)).into_response()
}

async fn issues(Path((_owner, repo)): Path<(String, String)>) -> Response {
    if repo == "partial" {
        return (StatusCode::FORBIDDEN, Json(json!({ "message": "rate limited" }))).into_response();
    }
    let list: Vec<Value> = (0..50)
        .map(|i| {
            let state = if i < 40 { "closed" } else { "open" };
            let created_at = if i % 2 == 0 {
                "2024-04-10T10:00:00Z"
            } else {
                "2024-03-05T10:00:00Z"
            };
            json!({
                "id": 1000 + i,
                "number": i + 1,
                "title": format!("Issue {}", i + 1),
                "state": state,
                "created_at": created_at,
                "user": { "login": "reporter" }
            })
        })
        .collect();
    Json(Value::Array(list)).into_response()
}

async fn pulls(Path((_owner, _repo)): Path<(String, String)>) -> Response {
    let list: Vec<Value> = (0..25)
        .map(|i| {
            let merged_at = if i < 20 {
                Value::from("2024-04-02T09:00:00Z")
            } else {
                Value::Null
            };
            json!({
                "id": 5000 + i,
                "number": 100 + i,
                "title": format!("PR {}", i),
                "state": "closed",
                "created_at": "2024-04-01T09:00:00Z",
                "merged_at": merged_at
            })
        })
        .collect();
    Json(Value::Array(list)).into_response()
}

/// Anything outside `/repos/{owner}/{repo}` answers as the token owner would.
async fn authenticated_user() -> Response {
    Json(json!({ "login": "token-owner", "private_repos": 7 })).into_response()
}

/// Start a fake GitHub API on an ephemeral port and return its base URL.
pub async fn spawn_fake_github() -> String {
    let app = Router::new()
        .route("/repos/{owner}/{repo}", get(repository))
        .route("/repos/{owner}/{repo}/contributors", get(contributors))
        .route("/repos/{owner}/{repo}/issues", get(issues))
        .route("/repos/{owner}/{repo}/pulls", get(pulls))
        .fallback(authenticated_user);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn config_for(api_url: &str) -> GitVerseConfig {
    GitVerseConfig {
        github_api_url: api_url.to_string(),
        github_token: Some(TOKEN.to_string()),
        gemini_api_key: None,
        summary_timeout_secs: 1,
        ..GitVerseConfig::default()
    }
}
