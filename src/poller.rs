//! Status poller for asynchronous SCP operations.
//!
//! Every long-running create, update or delete is confirmed by repeatedly
//! fetching the remote state until it lands in a target state. A poll is
//! described by a [`PollDescriptor`] built fresh for each call and driven by
//! [`wait`], an explicit async loop owned by the calling handler.
//!
//! Consecutive 5xx answers are absorbed within a fixed budget. With
//! `error_on_not_found` off, a 403 or 404 counts as the synthetic
//! [`DELETED`] state so repeated deletes converge.

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::PollSettings;
use crate::error::{PollError, Result};

/// Synthetic state reported when the resource cannot be found.
pub const DELETED: &str = "DELETED";

/// Default budget for create, update and delete operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Polling cadence shared by every wait of a provider instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two state checks.
    pub interval: Duration,
    /// Consecutive transient failures tolerated per check, the last one
    /// included.
    pub transient_attempts: u32,
    /// Delay before re-fetching after a transient failure.
    pub transient_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_settings(&PollSettings::default())
    }
}

impl PollPolicy {
    /// Builds the policy from the provider settings.
    #[must_use]
    pub fn from_settings(settings: &PollSettings) -> Self {
        Self {
            interval: settings.interval(),
            transient_attempts: settings.transient_attempts.max(1),
            transient_backoff: settings.transient_backoff(),
        }
    }
}

/// One observation returned by a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed<T> {
    /// Snapshot of the resource, absent when it is gone.
    pub snapshot: Option<T>,
    /// Remote state string.
    pub state: String,
}

impl<T> Observed<T> {
    /// An observation carrying a snapshot.
    pub fn new(snapshot: T, state: impl Into<String>) -> Self {
        Self {
            snapshot: Some(snapshot),
            state: state.into(),
        }
    }

    /// An observation without a snapshot.
    pub fn state_only(state: impl Into<String>) -> Self {
        Self {
            snapshot: None,
            state: state.into(),
        }
    }

    /// The synthetic observation of a missing resource.
    #[must_use]
    pub fn deleted() -> Self {
        Self::state_only(DELETED)
    }
}

/// Describes a single wait: which states keep polling and which end it.
#[derive(Debug, Clone)]
pub struct PollDescriptor {
    resource: String,
    pending: &'static [&'static str],
    target: &'static [&'static str],
    error_on_not_found: bool,
    timeout: Duration,
}

impl PollDescriptor {
    /// Creates a descriptor. Not-found answers are errors and the timeout
    /// is [`DEFAULT_TIMEOUT`] until changed.
    pub fn new(
        resource: impl Into<String>,
        pending: &'static [&'static str],
        target: &'static [&'static str],
    ) -> Self {
        Self {
            resource: resource.into(),
            pending,
            target,
            error_on_not_found: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets whether 403 and 404 answers are errors (`true`) or the
    /// synthetic [`DELETED`] state (`false`).
    #[must_use]
    pub const fn error_on_not_found(mut self, value: bool) -> Self {
        self.error_on_not_found = value;
        self
    }

    /// Sets the overall budget.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Label used in logs and errors.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn is_target(&self, state: &str) -> bool {
        self.target.contains(&state)
    }

    fn is_pending(&self, state: &str) -> bool {
        self.pending.contains(&state)
    }

    fn states(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }
}

/// Polls `fetch` until the observed state is a target state.
///
/// Returns the snapshot of the matching observation. A state outside both
/// sets fails immediately with [`PollError::UnexpectedState`]; running past
/// the descriptor timeout fails with [`PollError::Timeout`]. Other fetch
/// errors propagate unchanged.
///
/// # Errors
///
/// Returns an error on timeout, unexpected state, or a fatal fetch error.
pub async fn wait<T, F, Fut>(
    descriptor: &PollDescriptor,
    policy: &PollPolicy,
    mut fetch: F,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Observed<T>>>,
{
    let start = Instant::now();

    loop {
        let observed = fetch_tolerant(descriptor, policy, &mut fetch).await?;

        if descriptor.is_target(&observed.state) {
            debug!(
                "{} reached {} after {:?}",
                descriptor.resource,
                observed.state,
                start.elapsed()
            );
            return Ok(observed.snapshot);
        }

        if !descriptor.is_pending(&observed.state) {
            return Err(PollError::UnexpectedState {
                resource: descriptor.resource.clone(),
                state: observed.state,
                pending: PollDescriptor::states(descriptor.pending),
                target: PollDescriptor::states(descriptor.target),
            }
            .into());
        }

        let elapsed = start.elapsed();
        if elapsed >= descriptor.timeout {
            return Err(PollError::Timeout {
                resource: descriptor.resource.clone(),
                target: PollDescriptor::states(descriptor.target),
                last_state: observed.state,
                elapsed_secs: elapsed.as_secs(),
            }
            .into());
        }

        debug!("{} is {}, polling again", descriptor.resource, observed.state);
        tokio::time::sleep(policy.interval).await;
    }
}

/// Runs one fetch, absorbing transient failures and mapping not-found.
async fn fetch_tolerant<T, F, Fut>(
    descriptor: &PollDescriptor,
    policy: &PollPolicy,
    fetch: &mut F,
) -> Result<Observed<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Observed<T>>>,
{
    let mut attempt = 1;

    loop {
        match fetch().await {
            Ok(observed) => return Ok(observed),
            Err(e) if e.is_transient() && attempt < policy.transient_attempts => {
                warn!(
                    "API temporarily unavailable. Status code: {} ({}, attempt {attempt} of {})",
                    e.api_status().unwrap_or_default(),
                    descriptor.resource,
                    policy.transient_attempts
                );
                attempt += 1;
                tokio::time::sleep(policy.transient_backoff).await;
            }
            Err(e) if !descriptor.error_on_not_found && e.is_not_found() => {
                debug!("{} not found, treating as {DELETED}", descriptor.resource);
                return Ok(Observed::deleted());
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ScpError};
    use std::collections::VecDeque;

    const PENDING: &[&str] = &["CREATING", "EDITING"];
    const RUNNING: &[&str] = &["RUNNING"];
    const GONE: &[&str] = &["DELETED"];
    const DELETING: &[&str] = &["DELETING"];

    fn fast() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            transient_attempts: 10,
            transient_backoff: Duration::from_millis(1),
        }
    }

    fn state(s: &str) -> Result<Observed<String>> {
        Ok(Observed::new(s.to_string(), s))
    }

    fn status(code: u16) -> Result<Observed<String>> {
        Err(ApiError::request_failed(code, "scripted").into())
    }

    /// Runs `wait` over a script and returns the result and fetch count.
    async fn run(
        descriptor: &PollDescriptor,
        script: Vec<Result<Observed<String>>>,
    ) -> (Result<Option<String>>, usize) {
        let mut script = VecDeque::from(script);
        let mut calls = 0;
        let result = wait(descriptor, &fast(), || {
            calls += 1;
            let next = script.pop_front().expect("script exhausted");
            async move { next }
        })
        .await;
        (result, calls)
    }

    #[tokio::test]
    async fn test_pending_then_target() {
        let desc = PollDescriptor::new("kafka cluster", PENDING, RUNNING);
        let (result, calls) = run(
            &desc,
            vec![state("CREATING"), state("CREATING"), state("RUNNING")],
        )
        .await;

        assert_eq!(result.expect("should succeed").as_deref(), Some("RUNNING"));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_target_on_first_fetch() {
        let desc = PollDescriptor::new("gateway", PENDING, RUNNING);
        let (result, calls) = run(&desc, vec![state("RUNNING")]).await;

        assert!(result.is_ok());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_not_found_is_deleted_when_tolerated() {
        let desc = PollDescriptor::new("certificate", &[], &["DELETED", "FREE"])
            .error_on_not_found(false);

        let (result, calls) = run(&desc, vec![status(404)]).await;
        assert_eq!(result.expect("404 should be deleted"), None);
        assert_eq!(calls, 1);

        let (result, _) = run(&desc, vec![status(403)]).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_not_found_is_fatal_when_not_tolerated() {
        let desc = PollDescriptor::new("kafka cluster", PENDING, RUNNING);
        let (result, calls) = run(&desc, vec![status(404)]).await;

        let err = result.expect_err("404 should fail");
        assert_eq!(err.api_status(), Some(404));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_nine_transient_failures_are_absorbed() {
        let desc = PollDescriptor::new("kafka cluster", PENDING, RUNNING);
        let mut script: Vec<_> = (0..9).map(|_| status(503)).collect();
        script.push(state("RUNNING"));

        let (result, calls) = run(&desc, script).await;
        assert!(result.is_ok());
        assert_eq!(calls, 10);
    }

    #[tokio::test]
    async fn test_tenth_transient_failure_is_fatal() {
        let desc = PollDescriptor::new("kafka cluster", PENDING, RUNNING);
        let script: Vec<_> = (0..10).map(|_| status(502)).collect();

        let (result, calls) = run(&desc, script).await;
        let err = result.expect_err("should fail");
        assert!(matches!(
            err,
            ScpError::Api(ApiError::RequestFailed { status: 502, .. })
        ));
        assert_eq!(calls, 10);
    }

    #[tokio::test]
    async fn test_transient_budget_resets_between_checks() {
        let desc = PollDescriptor::new("kafka cluster", PENDING, RUNNING);
        let mut script: Vec<_> = (0..9).map(|_| status(500)).collect();
        script.push(state("CREATING"));
        script.extend((0..9).map(|_| status(500)));
        script.push(state("RUNNING"));

        let (result, calls) = run(&desc, script).await;
        assert!(result.is_ok());
        assert_eq!(calls, 20);
    }

    #[tokio::test]
    async fn test_transient_then_not_found_is_deleted() {
        let desc = PollDescriptor::new("kafka cluster", PENDING, GONE).error_on_not_found(false);
        let (result, calls) = run(&desc, vec![status(503), status(404)]).await;

        assert!(result.is_ok());
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_unexpected_state_stops_polling() {
        let desc = PollDescriptor::new("kafka cluster", PENDING, RUNNING);
        let (result, calls) = run(
            &desc,
            vec![state("CREATING"), state("ERROR"), state("RUNNING")],
        )
        .await;

        match result.expect_err("should fail") {
            ScpError::Poll(PollError::UnexpectedState { state, target, .. }) => {
                assert_eq!(state, "ERROR");
                assert_eq!(target, vec![String::from("RUNNING")]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_other_client_errors_propagate() {
        let desc = PollDescriptor::new("peering", DELETING, GONE).error_on_not_found(false);
        let (result, calls) = run(&desc, vec![status(400)]).await;

        assert_eq!(result.expect_err("should fail").api_status(), Some(400));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_timeout_carries_last_state() {
        let desc = PollDescriptor::new("gateway", PENDING, RUNNING).timeout(Duration::ZERO);
        let (result, calls) = run(&desc, vec![state("EDITING")]).await;

        match result.expect_err("should time out") {
            ScpError::Poll(PollError::Timeout { last_state, .. }) => {
                assert_eq!(last_state, "EDITING");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_list_scan_deleted_is_target() {
        let desc = PollDescriptor::new("peering", DELETING, GONE).error_on_not_found(false);
        let mut script = VecDeque::from(vec!["DELETING", "DELETING", DELETED]);

        let result: Result<Option<String>> = wait(&desc, &fast(), || {
            let next = script.pop_front().expect("script exhausted");
            async move {
                if next == DELETED {
                    Ok(Observed::deleted())
                } else {
                    Ok(Observed::new(String::from("TGWP-1"), next))
                }
            }
        })
        .await;

        assert_eq!(result.expect("absent peering is deleted"), None);
        assert!(script.is_empty());
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.transient_attempts, 10);
        assert_eq!(policy.transient_backoff, Duration::from_secs(5));
    }
}
