//! Waiting for asynchronous processing requests (ingestion, SciCat update,
//! Google Drive transfer) to finish.
//!
//! A wait queries the request's status immediately, then again every
//! `poll_interval` until the status is terminal ("completed" or "failed").
//! A failed request is a normal result, not an error. Errors from the
//! [StatusProvider] stop the wait at once.

use crate::errors::WaitError;
use crate::models::RequestStatus;
use crate::types::{DatasetId, JobState, RequestId, RequestType};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

/// Smallest delay between two polls. Shorter intervals are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll interval of [WaitPolicy::default].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Timeout of [WaitPolicy::default].
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Identifies one processing request to poll.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestHandle {
    pub dataset_id: DatasetId,
    pub request_id: RequestId,
    pub request_type: RequestType,
}

impl RequestHandle {
    pub fn new(
        dataset_id: impl Into<DatasetId>,
        request_id: impl Into<RequestId>,
        request_type: RequestType,
    ) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            request_id: request_id.into(),
            request_type,
        }
    }
}

impl Display for RequestHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} request {} of dataset {}",
            self.request_type, self.request_id, self.dataset_id
        )
    }
}

/// Source of processing request status, e.g. [crate::CrucibleClient].
#[async_trait]
pub trait StatusProvider: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Get the current status of a request. Must not cache.
    async fn get_status(&self, handle: &RequestHandle) -> Result<RequestStatus, Self::Error>;
}

/// How long, how often, and how many times to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    poll_interval: Duration,
    timeout: Option<Duration>,
    max_polls: Option<u32>,
}

impl WaitPolicy {
    /// Poll forever until the request is terminal.
    pub fn unbounded(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            timeout: None,
            max_polls: None,
        }
    }

    /// Give up with [WaitError::Timeout] once this much time has passed.
    /// The last delay is cut short at the deadline, so a long poll interval
    /// cannot stretch the wait past it.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Give up with [WaitError::Timeout] after this many non-terminal polls.
    pub fn max_polls(self, max_polls: u32) -> Self {
        Self {
            max_polls: Some(max_polls),
            ..self
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn get_max_polls(&self) -> Option<u32> {
        self.max_polls
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_POLL_INTERVAL).timeout(DEFAULT_WAIT_TIMEOUT)
    }
}

/// Unrecognized statuses already warned about during one wait.
#[derive(Default)]
struct UnrecognizedStatuses(HashSet<String>);

impl UnrecognizedStatuses {
    /// `true` the first time an unrecognized status string is seen.
    fn first_sighting(&mut self, status: &RequestStatus) -> bool {
        status.is_unrecognized() && self.0.insert(status.status.clone())
    }
}

/// Polls a [StatusProvider] according to a [WaitPolicy].
pub struct RequestWaiter<'a, P: StatusProvider + ?Sized> {
    provider: &'a P,
    policy: WaitPolicy,
    cancel: Option<CancellationToken>,
}

impl<'a, P: StatusProvider + ?Sized> RequestWaiter<'a, P> {
    pub fn new(provider: &'a P, policy: WaitPolicy) -> Self {
        Self {
            provider,
            policy,
            cancel: None,
        }
    }

    /// Stop waiting with [WaitError::Cancelled] when the token is cancelled.
    ///
    /// Only the delay between polls is interrupted. A status query which is
    /// already in flight runs to completion first.
    pub fn cancel_on(self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self
        }
    }

    /// Poll until the request is terminal, then return its final status.
    pub async fn wait(&self, handle: &RequestHandle) -> Result<RequestStatus, WaitError<P::Error>> {
        let started = Instant::now();
        let deadline = self.policy.timeout.map(|t| started + t);
        let interval = self.policy.poll_interval();
        let mut polls: u32 = 0;
        let mut unrecognized = UnrecognizedStatuses::default();

        loop {
            let status = self
                .provider
                .get_status(handle)
                .await
                .map_err(WaitError::Status)?;
            polls += 1;
            debug!("poll #{polls} of {handle}: status=\"{}\"", status.status);

            match status.state() {
                JobState::Completed => {
                    info!("{handle} completed after {polls} polls");
                    return Ok(status);
                }
                JobState::Failed => {
                    info!(
                        "{handle} failed after {polls} polls: {}",
                        status.error_message.as_deref().unwrap_or("no error message")
                    );
                    return Ok(status);
                }
                JobState::Pending => {
                    if unrecognized.first_sighting(&status) {
                        warn!(
                            "{handle} has unrecognized status \"{}\", assuming it is still pending",
                            status.status
                        );
                    }
                }
            }

            if self.policy.max_polls.is_some_and(|max| polls >= max) {
                return Err(self.timed_out(handle, started, polls));
            }
            let delay = match deadline {
                Some(d) => {
                    let remaining = d.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(self.timed_out(handle, started, polls));
                    }
                    interval.min(remaining)
                }
                None => interval,
            };

            if let Some(token) = &self.cancel {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        return Err(WaitError::Cancelled { handle: handle.clone(), polls });
                    }
                    _ = sleep(delay) => {}
                }
            } else {
                sleep(delay).await;
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(self.timed_out(handle, started, polls));
            }
        }
    }

    fn timed_out(
        &self,
        handle: &RequestHandle,
        started: Instant,
        polls: u32,
    ) -> WaitError<P::Error> {
        WaitError::Timeout {
            handle: handle.clone(),
            elapsed: started.elapsed(),
            polls,
        }
    }
}

/// Poll `provider` for the status of `handle` every `poll_interval` until the
/// request is terminal. There is no timeout: use [RequestWaiter] with a bounded
/// [WaitPolicy] for that.
pub async fn wait_for_completion<P: StatusProvider + ?Sized>(
    provider: &P,
    handle: &RequestHandle,
    poll_interval: Duration,
) -> Result<RequestStatus, WaitError<P::Error>> {
    RequestWaiter::new(provider, WaitPolicy::unbounded(poll_interval))
        .wait(handle)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Extra;
    use rstest::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(thiserror::Error, Debug)]
    #[error("connection reset")]
    struct Flaky;

    /// Answers with "requested" forever after the script runs out.
    #[derive(Default)]
    struct Scripted {
        script: Mutex<VecDeque<&'static str>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl Scripted {
        fn new(script: impl IntoIterator<Item = &'static str>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
                calls: Default::default(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StatusProvider for Scripted {
        type Error = Flaky;

        async fn get_status(&self, _handle: &RequestHandle) -> Result<RequestStatus, Flaky> {
            self.calls.lock().unwrap().push(Instant::now());
            Ok(status(self.script.lock().unwrap().pop_front().unwrap_or("requested")))
        }
    }

    #[fixture]
    fn handle() -> RequestHandle {
        RequestHandle::new(
            DatasetId::from_static("ds-1"),
            RequestId::from_static("req-7"),
            RequestType::Ingest,
        )
    }

    #[rstest]
    #[case(Duration::ZERO, MIN_POLL_INTERVAL)]
    #[case(Duration::from_millis(1), MIN_POLL_INTERVAL)]
    #[case(Duration::from_secs(5), Duration::from_secs(5))]
    fn test_poll_interval_floor(#[case] given: Duration, #[case] expected: Duration) {
        assert_eq!(WaitPolicy::unbounded(given).poll_interval(), expected)
    }

    #[test]
    fn test_default_policy_is_bounded() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.poll_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(policy.get_timeout(), Some(DEFAULT_WAIT_TIMEOUT));
        assert_eq!(policy.get_max_polls(), None);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_timeout(handle: RequestHandle) {
        let provider = Scripted::new([]);
        let policy = WaitPolicy::unbounded(Duration::from_secs(5)).timeout(Duration::from_secs(12));
        let err = RequestWaiter::new(&provider, policy).wait(&handle).await.unwrap_err();
        assert!(matches!(err, WaitError::Timeout { polls: 3, .. }), "{err:?}");
        assert_eq!(provider.calls(), 3);
        if let WaitError::Timeout { elapsed, .. } = err {
            assert_eq!(elapsed, Duration::from_secs(12));
        }
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_timeout_shorter_than_interval(handle: RequestHandle) {
        let provider = Scripted::new([]);
        let policy =
            WaitPolicy::unbounded(Duration::from_secs(3600)).timeout(Duration::from_secs(5));
        let started = Instant::now();
        let err = RequestWaiter::new(&provider, policy).wait(&handle).await.unwrap_err();
        assert!(matches!(err, WaitError::Timeout { polls: 1, .. }), "{err:?}");
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert_eq!(provider.calls(), 1);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_polls_once(handle: RequestHandle) {
        let provider = Scripted::new([]);
        let policy = WaitPolicy::unbounded(Duration::from_secs(10)).timeout(Duration::ZERO);
        let err = RequestWaiter::new(&provider, policy).wait(&handle).await.unwrap_err();
        assert!(matches!(err, WaitError::Timeout { polls: 1, .. }), "{err:?}");
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_terminal_on_first_poll_ignores_zero_timeout(handle: RequestHandle) {
        let provider = Scripted::new(["completed"]);
        let policy = WaitPolicy::unbounded(Duration::from_secs(10)).timeout(Duration::ZERO);
        let status = RequestWaiter::new(&provider, policy).wait(&handle).await.unwrap();
        assert!(status.is_completed());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_max_polls(handle: RequestHandle) {
        let provider = Scripted::new([]);
        let policy = WaitPolicy::unbounded(Duration::from_secs(1)).max_polls(3);
        let err = RequestWaiter::new(&provider, policy).wait(&handle).await.unwrap_err();
        assert!(matches!(err, WaitError::Timeout { polls: 3, .. }));
        assert_eq!(err.request_id().map(|id| id.as_str()), Some("req-7"));
        assert_eq!(provider.calls(), 3);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_max_polls_not_hit_when_terminal_in_time(handle: RequestHandle) {
        let provider = Scripted::new(["requested", "completed"]);
        let policy = WaitPolicy::unbounded(Duration::from_secs(1)).max_polls(2);
        let status = RequestWaiter::new(&provider, policy).wait(&handle).await.unwrap();
        assert!(status.is_completed());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_sleep(handle: RequestHandle) {
        let provider = Scripted::new([]);
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(90)).await;
            canceller.cancel();
        });
        let started = Instant::now();
        let err = RequestWaiter::new(&provider, WaitPolicy::unbounded(Duration::from_secs(60)))
            .cancel_on(token)
            .wait(&handle)
            .await
            .unwrap_err();
        assert!(matches!(err, WaitError::Cancelled { polls: 2, .. }), "{err:?}");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(90));
        assert!(elapsed < Duration::from_secs(120));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_unrecognized_status_keeps_polling(handle: RequestHandle) {
        let provider = Scripted::new(["reticulating", "reticulating", "splining", "complete"]);
        let status = wait_for_completion(&provider, &handle, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(status.status, "complete");
        assert!(status.is_completed());
        assert_eq!(provider.calls(), 4);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_not_a_busy_loop(handle: RequestHandle) {
        let provider = Scripted::new(["requested", "requested", "completed"]);
        wait_for_completion(&provider, &handle, Duration::ZERO)
            .await
            .unwrap();
        let calls = provider.calls.lock().unwrap();
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= MIN_POLL_INTERVAL);
        }
    }

    fn status(s: &str) -> RequestStatus {
        RequestStatus {
            status: s.to_string(),
            time_requested: None,
            time_completed: None,
            error_message: None,
            extra: Extra::new(),
        }
    }

    #[test]
    fn test_unrecognized_status_warned_once_each() {
        let mut seen = UnrecognizedStatuses::default();
        assert!(seen.first_sighting(&status("reticulating")));
        assert!(!seen.first_sighting(&status("reticulating")));
        assert!(seen.first_sighting(&status("splining")));
        assert!(!seen.first_sighting(&status("requested")));
        assert!(!seen.first_sighting(&status("in_progress")));
        assert!(!seen.first_sighting(&status("splining")));
    }

    #[test]
    fn test_handle_display() {
        let handle = RequestHandle::new(
            DatasetId::from_static("ds-2"),
            RequestId::from_static("req-9"),
            RequestType::ScicatUpdate,
        );
        assert_eq!(
            handle.to_string(),
            "scicat_update request req-9 of dataset ds-2"
        );
    }
}
