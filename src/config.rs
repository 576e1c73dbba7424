use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

/// Process-wide settings, loaded once at startup and shared read-only.
///
/// The two credentials are never written back to disk or echoed to clients.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GitVerseConfig {
    pub github_api_url: String,
    #[serde(skip_serializing)]
    pub github_token: Option<String>,
    pub per_page: u32,
    pub user_agent: String,
    pub gemini_api_url: String,
    pub gemini_model: String,
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
    pub summary_timeout_secs: u64,
    pub bind_addr: String,
}

impl Default for GitVerseConfig {
    fn default() -> Self {
        GitVerseConfig {
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
            per_page: 100,
            user_agent: format!("gitverse/{}", env!("CARGO_PKG_VERSION")),
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_key: None,
            summary_timeout_secs: 10,
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

/// What `gitverse config` prints: settings with secrets reduced to set/unset.
#[derive(Serialize, Debug)]
pub struct RedactedConfig<'a> {
    #[serde(flatten)]
    pub settings: &'a GitVerseConfig,
    pub github_token_set: bool,
    pub gemini_api_key_set: bool,
}

impl GitVerseConfig {
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn load_file() -> Self {
        let Some(config_path) = Self::config_path() else {
            return GitVerseConfig::default();
        };
        if !config_path.exists() {
            return GitVerseConfig::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %config_path.display(), error = %e, "ignoring malformed config file");
                GitVerseConfig::default()
            }),
            Err(e) => {
                warn!(path = %config_path.display(), error = %e, "can't read config file");
                GitVerseConfig::default()
            }
        }
    }

    /// Environment wins over the file. `lookup` is injectable so tests don't touch the real env.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("GITHUB_TOKEN") {
            self.github_token = Some(token);
        }
        if let Some(url) = non_empty("GITHUB_API_URL") {
            self.github_api_url = url;
        }
        if let Some(key) = non_empty("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = non_empty("GEMINI_MODEL") {
            self.gemini_model = model;
        }
        if let Some(bind) = non_empty("GITVERSE_BIND") {
            self.bind_addr = bind;
        }
        if let Some(raw) = non_empty("GITVERSE_SUMMARY_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => self.summary_timeout_secs = secs,
                Err(_) => warn!(value = %raw, "GITVERSE_SUMMARY_TIMEOUT_SECS is not a number"),
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let config_path =
            Self::config_path().ok_or_else(|| anyhow::anyhow!("HOME is not set"))?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;
        debug!(path = %config_path.display(), "config written");
        Ok(config_path)
    }

    pub fn config_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".config").join("gitverse").join("config.json"))
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_secs)
    }

    pub fn redacted(&self) -> RedactedConfig<'_> {
        RedactedConfig {
            settings: self,
            github_token_set: self.github_token.is_some(),
            gemini_api_key_set: self.gemini_api_key.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn secrets_never_serialize() {
        let config = GitVerseConfig {
            github_token: Some("ghp_secret".to_string()),
            gemini_api_key: Some("gemini_secret".to_string()),
            ..GitVerseConfig::default()
        };

        let written = serde_json::to_string(&config).unwrap();
        assert!(!written.contains("secret"));

        let shown = serde_json::to_value(config.redacted()).unwrap();
        assert_eq!(shown["github_token_set"], true);
        assert_eq!(shown["gemini_api_key_set"], true);
        assert!(!shown.to_string().contains("secret"));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("GITHUB_TOKEN", "ghp_abc"),
            ("GITHUB_API_URL", "http://127.0.0.1:9999"),
            ("GEMINI_API_KEY", "   "),
            ("GITVERSE_SUMMARY_TIMEOUT_SECS", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = GitVerseConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.github_token.as_deref(), Some("ghp_abc"));
        assert_eq!(config.github_api_url, "http://127.0.0.1:9999");
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.summary_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn bad_timeout_keeps_default() {
        let mut config = GitVerseConfig::default();
        config.apply_env(|key| {
            (key == "GITVERSE_SUMMARY_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.summary_timeout_secs, 10);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: GitVerseConfig =
            serde_json::from_str(r#"{ "bind_addr": "0.0.0.0:8080" }"#).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.per_page, 100);
        assert_eq!(config.github_api_url, DEFAULT_GITHUB_API_URL);
    }
}
