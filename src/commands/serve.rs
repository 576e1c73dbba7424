use crate::config::GitVerseConfig;
use crate::server::{self, AppState};

pub async fn serve(mut config: GitVerseConfig, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.bind_addr = bind;
    }
    if config.github_token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set, GitHub will apply anonymous rate limits");
    }

    let state = AppState::from_config(config)?;
    server::serve(state).await
}
