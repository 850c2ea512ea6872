use async_trait::async_trait;
use std::fmt;
use tracing::{debug, warn};

use crate::config::PROCEDURE_PATH;
use crate::error::ErrorEnvelope;
use crate::procedure::SuccessEnvelope;
use crate::profile::{Profile, ProfileInput, Username};

/// A failed procedure call as seen by the caller: the server's message, and
/// its error code when the server sent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureFailure {
    pub message: String,
    pub code: Option<String>,
}

impl ProcedureFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }
}

impl fmt::Display for ProcedureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProcedureFailure {}

/// Where the query state gets profiles from.
#[async_trait]
pub trait ProfileSource: Send + Sync + 'static {
    async fn get_profile(&self, username: &Username) -> Result<Profile, ProcedureFailure>;
}

/// Calls `profile.getProfileByUsername` on a running server.
pub struct ProcedureClient {
    http: reqwest::Client,
    url: String,
}

impl ProcedureClient {
    pub fn new(endpoint: &str) -> Result<Self, ProcedureFailure> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProcedureFailure::new(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: format!("{}{}", endpoint.trim_end_matches('/'), PROCEDURE_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ProfileSource for ProcedureClient {
    async fn get_profile(&self, username: &Username) -> Result<Profile, ProcedureFailure> {
        let input = ProfileInput {
            username: username.clone(),
        };
        debug!("POST {} {:?}", self.url, username.as_str());

        let response = self
            .http
            .post(&self.url)
            .json(&input)
            .send()
            .await
            .map_err(|e| ProcedureFailure::new(format!("failed to reach server: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProcedureFailure::new(format!("failed to read response: {}", e)))?;

        if status.is_success() {
            return serde_json::from_slice::<SuccessEnvelope<Profile>>(&body)
                .map(|envelope| envelope.result.data)
                .map_err(|e| ProcedureFailure::new(format!("malformed response: {}", e)));
        }

        match serde_json::from_slice::<ErrorEnvelope>(&body) {
            Ok(envelope) => Err(ProcedureFailure {
                message: envelope.error.message,
                code: envelope.error.code,
            }),
            Err(_) => {
                warn!("Server responded {} without an error envelope", status);
                Err(ProcedureFailure::new(format!("server responded with {}", status)))
            }
        }
    }
}
