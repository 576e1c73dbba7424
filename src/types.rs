use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RepositoryMetadata {
    pub full_name: String,
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    /// GitHub reports "watchers" as subscribers; `watchers_count` mirrors stars.
    pub subscribers_count: u64,
    pub open_issues_count: u64,
}

impl RepositoryMetadata {
    /// Name used in prose: `owner/repo` when GitHub sent it, else the bare name.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.name
        } else {
            &self.full_name
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Contributor {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    pub contributions: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    #[default]
    Open,
    #[serde(other)]
    Closed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: ItemState,
    pub created_at: Option<DateTime<Utc>>,
    pub user: Option<GitHubUser>,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.state == ItemState::Open
    }

    pub fn is_closed(&self) -> bool {
        self.state == ItemState::Closed
    }

    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or("ghost")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: ItemState,
    pub created_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// Still open and not merged. A closed-but-unmerged PR is neither open nor merged.
    pub fn is_open(&self) -> bool {
        !self.is_merged() && self.state == ItemState::Open
    }
}

/// Decode a GitHub list payload one element at a time.
///
/// Elements that don't fit `T` are skipped instead of failing the whole list,
/// and anything that isn't a JSON array decodes to an empty list.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        warn!("expected a JSON array from GitHub, treating payload as empty");
        return Vec::new();
    };

    let mut decoded = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(entry) => decoded.push(entry),
            Err(e) => warn!(index, error = %e, "skipping malformed list entry"),
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repository_defaults_missing_fields() {
        let repo: RepositoryMetadata = serde_json::from_value(json!({
            "full_name": "rust-lang/rust",
            "stargazers_count": 12
        }))
        .unwrap();

        assert_eq!(repo.display_name(), "rust-lang/rust");
        assert_eq!(repo.stargazers_count, 12);
        assert_eq!(repo.forks_count, 0);
        assert!(repo.description.is_none());
    }

    #[test]
    fn unknown_issue_state_counts_as_closed() {
        let issue: Issue = serde_json::from_value(json!({ "state": "locked" })).unwrap();
        assert!(issue.is_closed());

        let issue: Issue = serde_json::from_value(json!({ "state": "open" })).unwrap();
        assert!(issue.is_open());
        assert_eq!(issue.author(), "ghost");
    }

    #[test]
    fn pull_request_open_excludes_merged_and_closed() {
        let merged: PullRequest = serde_json::from_value(json!({
            "state": "closed",
            "merged_at": "2024-03-01T12:00:00Z"
        }))
        .unwrap();
        let abandoned: PullRequest = serde_json::from_value(json!({ "state": "closed" })).unwrap();
        let open: PullRequest = serde_json::from_value(json!({ "state": "open" })).unwrap();

        assert!(merged.is_merged() && !merged.is_open());
        assert!(!abandoned.is_merged() && !abandoned.is_open());
        assert!(open.is_open());
    }

    #[test]
    fn decode_list_skips_bad_entries() {
        let contributors: Vec<Contributor> = decode_list(json!([
            { "login": "alice", "contributions": 40 },
            "not an object",
            { "login": "bob", "contributions": "many" },
            { "login": "carol" }
        ]));

        let logins: Vec<_> = contributors.iter().map(|c| c.login.as_str()).collect();
        assert_eq!(logins, ["alice", "carol"]);
        assert_eq!(contributors[1].contributions, 0);
    }

    #[test]
    fn decode_list_of_non_array_is_empty() {
        let issues: Vec<Issue> = decode_list(json!({ "message": "Not Found" }));
        assert!(issues.is_empty());
    }
}
