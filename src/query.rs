//! Client-side lookup state.
//!
//! [`QueryMachine`] is the synchronous core: `submit` moves to `Loading` and
//! hands out a [`Submission`]; `settle` applies an outcome only when that
//! submission is still the most recent one. [`ProfileQuery`] drives it
//! against a [`ProfileSource`], adding the retry policy and failure
//! notifications, and publishes every state through a `watch` channel.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::client::{ProcedureFailure, ProfileSource};
use crate::config::{NOTIFICATION_DURATION_SECS, QUERY_MAX_RETRIES, QUERY_RETRY_DELAY_SECS};
use crate::error::NOT_FOUND_MESSAGE;
use crate::profile::{Profile, Username};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueryResult {
    NotAsked,
    Loading { username: Username },
    Success { username: Username, profile: Profile },
    Failure(QueryFailure),
}

impl QueryResult {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryResult::Loading { .. })
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            QueryResult::Success { profile, .. } => Some(profile),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Other,
}

impl ErrorKind {
    /// Exact match on the server's message; anything else is `Other`.
    pub fn classify(message: &str) -> Self {
        if message == NOT_FOUND_MESSAGE {
            ErrorKind::NotFound
        } else {
            ErrorKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFailure {
    pub username: Username,
    pub kind: ErrorKind,
    pub message: String,
}

impl QueryFailure {
    pub fn new(username: Username, failure: &ProcedureFailure) -> Self {
        Self {
            username,
            kind: ErrorKind::classify(&failure.message),
            message: failure.message.clone(),
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::NotFound => format!("User \"{}\" not found", self.username),
            ErrorKind::Other => format!("Error: {}", self.message),
        }
    }
}

/// Ticket for one submitted lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: u64,
    pub username: Username,
}

#[derive(Debug)]
pub struct QueryMachine {
    next_id: u64,
    latest: Option<u64>,
    result: QueryResult,
}

impl Default for QueryMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryMachine {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            latest: None,
            result: QueryResult::NotAsked,
        }
    }

    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    /// Enter `Loading` for `username`, superseding any earlier submission.
    pub fn submit(&mut self, username: Username) -> Submission {
        let id = self.next_id;
        self.next_id += 1;
        self.latest = Some(id);
        self.result = QueryResult::Loading {
            username: username.clone(),
        };
        Submission { id, username }
    }

    /// True while `submission` is the newest one and has not settled.
    pub fn is_current(&self, submission: &Submission) -> bool {
        self.latest == Some(submission.id) && self.result.is_loading()
    }

    /// Apply an outcome. Returns false, leaving the state untouched, when the
    /// submission has been superseded or already settled.
    pub fn settle(
        &mut self,
        submission: &Submission,
        outcome: Result<Profile, ProcedureFailure>,
    ) -> bool {
        if !self.is_current(submission) {
            return false;
        }
        let username = submission.username.clone();
        self.result = match outcome {
            Ok(profile) => QueryResult::Success { username, profile },
            Err(failure) => QueryResult::Failure(QueryFailure::new(username, &failure)),
        };
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: QUERY_MAX_RETRIES,
            delay: Duration::from_secs(QUERY_RETRY_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub seq: u64,
    pub text: String,
    pub duration: Duration,
}

/// Holds at most one notification; a new one replaces the current one.
#[derive(Clone)]
pub struct NotificationCenter {
    slot: Arc<watch::Sender<Option<Notification>>>,
    seq: Arc<AtomicU64>,
    duration: Duration,
}

impl NotificationCenter {
    pub fn new(duration: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
            seq: Arc::new(AtomicU64::new(0)),
            duration,
        }
    }

    pub fn notify(&self, text: impl Into<String>) -> Notification {
        let notification = Notification {
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            text: text.into(),
            duration: self.duration,
        };
        self.slot.send_replace(Some(notification.clone()));
        notification
    }

    /// Clear the slot if it still shows notification `seq`.
    pub fn dismiss(&self, seq: u64) -> bool {
        self.slot.send_if_modified(|current| match current {
            Some(n) if n.seq == seq => {
                *current = None;
                true
            }
            _ => false,
        })
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot.borrow().clone()
    }

    /// Number of notifications issued so far.
    pub fn issued(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.slot.subscribe()
    }
}

struct Shared {
    machine: Mutex<QueryMachine>,
    results: watch::Sender<QueryResult>,
    notifications: NotificationCenter,
}

impl Shared {
    fn machine(&self) -> MutexGuard<'_, QueryMachine> {
        // State is replaced wholesale, so a poisoned guard is still consistent
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_current(&self, submission: &Submission) -> bool {
        self.machine().is_current(submission)
    }

    fn settle(&self, submission: &Submission, outcome: Result<Profile, ProcedureFailure>) -> bool {
        let mut machine = self.machine();
        if !machine.settle(submission, outcome) {
            debug!(
                "Discarding stale result for {:?} (submission {})",
                submission.username.as_str(),
                submission.id
            );
            return false;
        }

        let result = machine.result().clone();
        self.results.send_replace(result.clone());

        if let QueryResult::Failure(failure) = &result {
            let notification = self.notifications.notify(failure.user_message());
            info!("Lookup failed: {}", notification.text);
            if !notification.duration.is_zero() {
                let center = self.notifications.clone();
                tokio::spawn(async move {
                    sleep(notification.duration).await;
                    center.dismiss(notification.seq);
                });
            }
        }
        true
    }
}

/// Observable lookup state for one search box.
pub struct ProfileQuery {
    source: Arc<dyn ProfileSource>,
    policy: RetryPolicy,
    shared: Arc<Shared>,
}

impl ProfileQuery {
    pub fn new(source: Arc<dyn ProfileSource>) -> Self {
        Self::with_policy(
            source,
            RetryPolicy::default(),
            Duration::from_secs(NOTIFICATION_DURATION_SECS),
        )
    }

    pub fn with_policy(
        source: Arc<dyn ProfileSource>,
        policy: RetryPolicy,
        notification_duration: Duration,
    ) -> Self {
        let (results, _) = watch::channel(QueryResult::NotAsked);
        Self {
            source,
            policy,
            shared: Arc::new(Shared {
                machine: Mutex::new(QueryMachine::new()),
                results,
                notifications: NotificationCenter::new(notification_duration),
            }),
        }
    }

    /// Start a lookup. The returned task resolves to whether its result was
    /// applied; a later `submit` makes it resolve to `false`.
    pub fn submit(&self, username: impl Into<Username>) -> JoinHandle<bool> {
        let submission = {
            let mut machine = self.shared.machine();
            let submission = machine.submit(username.into());
            self.shared.results.send_replace(machine.result().clone());
            submission
        };
        debug!(
            "Submitted {:?} as lookup {}",
            submission.username.as_str(),
            submission.id
        );

        let source = self.source.clone();
        let shared = self.shared.clone();
        let policy = self.policy;
        tokio::spawn(async move {
            let outcome = call_with_retry(source.as_ref(), &shared, &submission, policy).await;
            shared.settle(&submission, outcome)
        })
    }

    pub fn current(&self) -> QueryResult {
        self.shared.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryResult> {
        self.shared.results.subscribe()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.shared.notifications
    }
}

async fn call_with_retry(
    source: &dyn ProfileSource,
    shared: &Shared,
    submission: &Submission,
    policy: RetryPolicy,
) -> Result<Profile, ProcedureFailure> {
    let mut attempt = 1;
    loop {
        match source.get_profile(&submission.username).await {
            Ok(profile) => return Ok(profile),
            Err(failure) => {
                if attempt >= policy.max_attempts() || !shared.is_current(submission) {
                    return Err(failure);
                }
                debug!(
                    "Lookup {} attempt {} failed ({}), retrying",
                    submission.id, attempt, failure
                );
                attempt += 1;
                sleep(policy.delay).await;
            }
        }
    }
}
