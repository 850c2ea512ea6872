// Shared fixtures: an in-process stand-in for the GitHub REST API.
#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const GOOD_TOKEN: &str = "ghp_test_token";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub username: String,
    pub authorization: Option<String>,
    pub api_version: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Default)]
pub struct Recorder {
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Recorder {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(&self, username: &str, headers: &HeaderMap) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            username: username.to_string(),
            authorization: header("authorization"),
            api_version: header("x-github-api-version"),
            user_agent: header("user-agent"),
        });
    }
}

pub fn octocat_json() -> Value {
    json!({
        "login": "octocat",
        "id": 583231,
        "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
        "html_url": "https://github.com/octocat",
        "type": "User",
        "site_admin": false,
        "name": "The Octocat",
        "company": "@github",
        "blog": "https://github.blog",
        "location": null,
        "email": null,
        "hireable": null,
        "bio": null,
        "twitter_username": null,
        "public_repos": 8,
        "public_gists": 8,
        "followers": 9999,
        "following": 9,
        "created_at": "2011-01-25T18:44:36Z",
        "updated_at": "2024-01-22T12:20:40Z"
    })
}

fn respond(username: &str, headers: &HeaderMap) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", GOOD_TOKEN))
        .unwrap_or(false);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Bad credentials"})),
        )
            .into_response();
    }

    match username {
        "octocat" => Json(octocat_json()).into_response(),
        "broken" => (StatusCode::OK, "<html>not json</html>").into_response(),
        "limited" => (
            StatusCode::FORBIDDEN,
            Json(json!({"message": "API rate limit exceeded"})),
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response(),
    }
}

async fn user(
    State(recorder): State<Arc<Recorder>>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Response {
    recorder.record(&username, &headers);
    respond(&username, &headers)
}

async fn empty_user(State(recorder): State<Arc<Recorder>>, headers: HeaderMap) -> Response {
    recorder.record("", &headers);
    respond("", &headers)
}

/// Bind a fake GitHub API on an ephemeral port and return its base URL.
pub async fn spawn_fake_github() -> (String, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let router = Router::new()
        .route("/users/{username}", get(user))
        .route("/users/", get(empty_user))
        .with_state(recorder.clone());
    let addr = serve(router).await;
    (format!("http://{}", addr), recorder)
}

pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
