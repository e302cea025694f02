use crucible::errors::WaitError;
use crucible::models::RequestStatus;
use crucible::types::RequestType;
use crucible::{
    wait_for_completion, CancellationToken, RequestHandle, RequestWaiter, StatusProvider,
    WaitPolicy,
};
use rstest::*;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("status query failed: {0}")]
struct QueryFailed(&'static str);

/// Replays a fixed list of responses and records when it was asked.
struct Replay {
    responses: Mutex<VecDeque<Result<Value, QueryFailed>>>,
    calls: Mutex<Vec<(RequestHandle, Instant)>>,
}

impl Replay {
    fn new(responses: impl IntoIterator<Item = Result<Value, QueryFailed>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Default::default(),
        }
    }

    fn statuses(statuses: &[&str]) -> Self {
        Self::new(statuses.iter().map(|s| Ok(json!({ "status": s }))))
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl StatusProvider for Replay {
    type Error = QueryFailed;

    async fn get_status(&self, handle: &RequestHandle) -> Result<RequestStatus, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push((handle.clone(), Instant::now()));
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("polled more times than expected");
        next.map(|v| serde_json::from_value(v).unwrap())
    }
}

#[fixture]
fn ingest_handle() -> RequestHandle {
    RequestHandle::new("ds-1", "req-7", RequestType::Ingest)
}

#[tokio::test(start_paused = true)]
async fn test_polls_until_completed() {
    let handle = ingest_handle();
    let provider = Replay::new([
        Ok(json!({"status": "requested"})),
        Ok(json!({"status": "in_progress"})),
        Ok(json!({"status": "completed", "time_completed": "2024-05-01T12:00:00Z"})),
    ]);
    let start = Instant::now();
    let status = wait_for_completion(&provider, &handle, Duration::from_secs(5))
        .await
        .unwrap();
    assert!(status.is_completed());
    assert_eq!(
        status.time_completed.as_ref().map(|t| t.as_str()),
        Some("2024-05-01T12:00:00Z")
    );
    assert_eq!(provider.call_count(), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(11));
    assert!(provider
        .calls
        .lock()
        .unwrap()
        .iter()
        .all(|(h, _)| h == &handle));
}

#[tokio::test(start_paused = true)]
async fn test_failed_request_is_a_result() {
    let handle = RequestHandle::new("ds-2", "req-9", RequestType::ScicatUpdate);
    let provider = Replay::new([Ok(json!({"status": "failed", "error_message": "disk full"}))]);
    let start = Instant::now();
    let status = wait_for_completion(&provider, &handle, Duration::from_secs(5))
        .await
        .unwrap();
    assert!(status.is_failed());
    assert_eq!(status.error_message.as_deref(), Some("disk full"));
    assert_eq!(provider.call_count(), 1);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_query_error_stops_polling() {
    let handle = ingest_handle();
    let provider = Replay::new([
        Ok(json!({"status": "requested"})),
        Err(QueryFailed("connection refused")),
        Ok(json!({"status": "completed"})),
    ]);
    let result = wait_for_completion(&provider, &handle, Duration::from_secs(1)).await;
    match result {
        Err(WaitError::Status(e)) => assert_eq!(e, QueryFailed("connection refused")),
        other => panic!("expected a status error, got {:?}", other),
    }
    assert_eq!(provider.call_count(), 2);
}

#[rstest]
#[case("completed")]
#[case("complete")]
#[case("failed")]
#[case("FAILED")]
#[tokio::test(start_paused = true)]
async fn test_terminal_on_first_poll(#[case] status: &'static str) {
    let provider = Replay::statuses(&[status]);
    let start = Instant::now();
    let result = wait_for_completion(&provider, &ingest_handle(), Duration::from_secs(60))
        .await
        .unwrap();
    assert!(result.is_terminal());
    assert_eq!(provider.call_count(), 1);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[rstest]
#[case(Duration::from_secs(1))]
#[case(Duration::from_secs(30))]
#[case(Duration::from_millis(250))]
#[tokio::test(start_paused = true)]
async fn test_interval_between_polls(#[case] interval: Duration) {
    let provider = Replay::statuses(&["requested", "started", "pending", "completed"]);
    wait_for_completion(&provider, &ingest_handle(), interval)
        .await
        .unwrap();
    let times = provider.call_times();
    assert_eq!(times.len(), 4);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= interval);
    }
}

#[tokio::test(start_paused = true)]
async fn test_bounded_policy_gives_up() {
    let handle = ingest_handle();
    let provider = Replay::statuses(&["requested"; 10]);
    let policy = WaitPolicy::unbounded(Duration::from_secs(2)).max_polls(3);
    let err = RequestWaiter::new(&provider, policy)
        .wait(&handle)
        .await
        .unwrap_err();
    assert!(matches!(err, WaitError::Timeout { polls: 3, .. }));
    assert_eq!(err.request_id().map(|id| id.as_str()), Some("req-7"));
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_between_polls() {
    let provider = Replay::statuses(&["requested"; 10]);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(25)).await;
        canceller.cancel();
    });
    let err = RequestWaiter::new(&provider, WaitPolicy::unbounded(Duration::from_secs(10)))
        .cancel_on(token)
        .wait(&ingest_handle())
        .await
        .unwrap_err();
    assert!(matches!(err, WaitError::Cancelled { polls: 3, .. }));
    assert_eq!(provider.call_count(), 3);
}
