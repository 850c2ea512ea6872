use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ProcedureError;
use crate::github::ProfileFetcher;
use crate::profile::{Profile, ProfileInput};

/// Body of a successful procedure response: `{"result": {"data": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    pub result: ResultData<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultData<T> {
    pub data: T,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            result: ResultData { data },
        }
    }
}

/// Check the raw input shape. Only "username is a string" is enforced; an
/// empty username is forwarded to the upstream as-is.
pub fn parse_input(raw: Value) -> Result<ProfileInput, ProcedureError> {
    let Value::Object(map) = raw else {
        return Err(ProcedureError::InvalidInput(
            "expected an object with a username".to_string(),
        ));
    };

    match map.get("username") {
        Some(Value::String(username)) => Ok(ProfileInput {
            username: username.as_str().into(),
        }),
        Some(other) => Err(ProcedureError::InvalidInput(format!(
            "username must be a string, got {}",
            json_type_name(other)
        ))),
        None => Err(ProcedureError::InvalidInput(
            "username is required".to_string(),
        )),
    }
}

/// `profile.getProfileByUsername`: validate, then make exactly one upstream call.
pub async fn get_profile_by_username(
    fetcher: &dyn ProfileFetcher,
    raw: Value,
) -> Result<Profile, ProcedureError> {
    let input = parse_input(raw)?;
    debug!("getProfileByUsername({:?})", input.username.as_str());

    let profile = fetcher.fetch_profile(&input.username).await?;
    info!("Resolved profile {}", profile.login);
    Ok(profile)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use crate::profile::Username;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
        outcome: Result<Profile, UpstreamError>,
    }

    #[async_trait]
    impl ProfileFetcher for CountingFetcher {
        async fn fetch_profile(&self, _username: &Username) -> Result<Profile, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn failing(err: UpstreamError) -> CountingFetcher {
        CountingFetcher {
            calls: AtomicUsize::new(0),
            outcome: Err(err),
        }
    }

    #[test]
    fn test_parse_accepts_empty_username() {
        let input = parse_input(json!({"username": ""})).unwrap();
        assert!(input.username.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_string_username() {
        let err = parse_input(json!({"username": 42})).unwrap_err();
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn test_parse_rejects_missing_username() {
        assert!(matches!(
            parse_input(json!({})),
            Err(ProcedureError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_input(json!("octocat")),
            Err(ProcedureError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_fetcher() {
        let fetcher = failing(UpstreamError::NotFound);
        let result = get_profile_by_username(&fetcher, json!({"username": null})).await;
        assert!(matches!(result, Err(ProcedureError::InvalidInput(_))));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_found_surfaces_literal_message() {
        let fetcher = failing(UpstreamError::NotFound);
        let err = get_profile_by_username(&fetcher, json!({"username": ""}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not Found");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(SuccessEnvelope::new(json!({"login": "octocat"}))).unwrap();
        assert_eq!(json, json!({"result": {"data": {"login": "octocat"}}}));
    }
}
