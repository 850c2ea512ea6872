use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::GitHubConfig;
use crate::error::UpstreamError;
use crate::profile::{Profile, Username};

/// Looks up a single profile. Implementations classify every failure into
/// [`UpstreamError`] and never retry.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch_profile(&self, username: &Username) -> Result<Profile, UpstreamError>;
}

/// Error body GitHub sends alongside non-2xx statuses.
#[derive(Deserialize)]
struct GitHubErrorBody {
    message: String,
}

pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| UpstreamError::Other(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    /// `{api_base}/users/{username}` with the username as one encoded segment.
    pub fn profile_url(&self, username: &Username) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.config.api_base).map_err(|e| {
            UpstreamError::Other(format!(
                "invalid GitHub API base {:?}: {}",
                self.config.api_base, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                UpstreamError::Other(format!(
                    "GitHub API base {:?} cannot carry a path",
                    self.config.api_base
                ))
            })?
            .pop_if_empty()
            .push("users")
            .push(username.as_str());
        Ok(url)
    }
}

#[async_trait]
impl ProfileFetcher for GitHubClient {
    async fn fetch_profile(&self, username: &Username) -> Result<Profile, UpstreamError> {
        let Some(token) = self.config.token.as_deref() else {
            warn!("Profile lookup for {:?} refused: no GitHub token", username.as_str());
            return Err(UpstreamError::Other(
                "GitHub API token is not configured".to_string(),
            ));
        };

        let url = self.profile_url(username)?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header("X-GitHub-Api-Version", &self.config.api_version)
            .header(ACCEPT, crate::config::GITHUB_ACCEPT)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!("GitHub request for {:?} failed: {}", username.as_str(), e);
                if e.is_builder() {
                    // Only the token comes from outside; the other headers are fixed
                    UpstreamError::Other(
                        "configured GitHub API token is not a valid header value".to_string(),
                    )
                } else {
                    UpstreamError::Other(format!("request to GitHub failed: {}", e))
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("GitHub has no user {:?}", username.as_str());
            return Err(UpstreamError::NotFound);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<GitHubErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            warn!("GitHub responded {} for {:?}", status, username.as_str());
            return Err(UpstreamError::Other(describe_status(status, &reason)));
        }

        response.json::<Profile>().await.map_err(|e| {
            warn!("Undecodable profile for {:?}: {}", username.as_str(), e);
            UpstreamError::Other(format!("failed to decode GitHub profile: {}", e))
        })
    }
}

fn describe_status(status: StatusCode, reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        format!("GitHub API responded with {}", status)
    } else {
        format!("GitHub API responded with {}: {}", status, reason)
    }
}
