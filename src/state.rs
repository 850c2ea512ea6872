use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::UpstreamError;
use crate::github::{GitHubClient, ProfileFetcher};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: ServerConfig,
    pub fetcher: Arc<dyn ProfileFetcher>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, UpstreamError> {
        let fetcher = Arc::new(GitHubClient::new(config.github.clone())?);
        Ok(Self { config, fetcher })
    }

    /// Swap in another fetcher, e.g. a canned upstream in tests.
    pub fn with_fetcher(config: ServerConfig, fetcher: Arc<dyn ProfileFetcher>) -> Self {
        Self { config, fetcher }
    }
}
