use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProcedureError;
use crate::procedure::{get_profile_by_username, SuccessEnvelope};
use crate::profile::Profile;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ProcedureQuery {
    /// URL-encoded JSON input, e.g. `?input={"username":"octocat"}`
    pub input: Option<String>,
}

/// GET /api/profile.getProfileByUsername?input=...
pub async fn get_profile_query(
    State(state): State<SharedState>,
    query: Result<Query<ProcedureQuery>, QueryRejection>,
) -> Result<Json<SuccessEnvelope<Profile>>, ProcedureError> {
    let Query(query) = query.map_err(|e| {
        ProcedureError::InvalidInput(format!("malformed query string: {}", e.body_text()))
    })?;
    let raw = match query.input {
        Some(input) => parse_json(input.as_bytes())?,
        None => Value::Null,
    };
    run(&state, raw).await
}

/// POST /api/profile.getProfileByUsername with a JSON body.
pub async fn get_profile_mutation(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<SuccessEnvelope<Profile>>, ProcedureError> {
    let raw = parse_json(&body)?;
    run(&state, raw).await
}

async fn run(
    state: &SharedState,
    raw: Value,
) -> Result<Json<SuccessEnvelope<Profile>>, ProcedureError> {
    let profile = get_profile_by_username(state.fetcher.as_ref(), raw).await?;
    Ok(Json(SuccessEnvelope::new(profile)))
}

fn parse_json(bytes: &[u8]) -> Result<Value, ProcedureError> {
    serde_json::from_slice(bytes)
        .map_err(|e| ProcedureError::InvalidInput(format!("input is not valid JSON: {}", e)))
}
