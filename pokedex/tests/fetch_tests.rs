mod common;

use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use common::MockTransport;
use pokedex::error::FetchError;
use pokedex::fetch::{fetch_with_retry, RetryPolicy};

const URL: &str = "http://mock.test/api/v2/pokemon/1";

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1000),
    }
}

#[tokio::test(start_paused = true)]
async fn test_two_failures_then_success_backs_off_exponentially() {
    let transport = MockTransport::new();
    transport.script(
        URL,
        vec![
            Err(FetchError::Transport("connection reset".into())),
            Err(FetchError::Status(503)),
            Ok(json!({ "id": 1 })),
        ],
    );
    let started = Instant::now();

    let result = fetch_with_retry(transport.as_ref(), URL, policy(), || {}).await;

    assert_eq!(result, Ok(json!({ "id": 1 })));
    assert_eq!(transport.calls_to(URL), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_permanent_failure_surfaces_after_exactly_max_attempts() {
    let transport = MockTransport::new();
    transport.fail(URL, FetchError::Status(500));
    let mut attempts = 0;

    let result = fetch_with_retry(transport.as_ref(), URL, policy(), || attempts += 1).await;

    assert_eq!(result, Err(FetchError::Status(500)));
    assert_eq!(attempts, 3);
    assert_eq!(transport.calls_to(URL), 3);
}

#[tokio::test(start_paused = true)]
async fn test_success_on_first_attempt_does_not_sleep() {
    let transport = MockTransport::new();
    transport.respond(URL, json!({ "id": 1 }));
    let started = Instant::now();

    let result = fetch_with_retry(transport.as_ref(), URL, policy(), || {}).await;

    assert!(result.is_ok());
    assert_eq!(started.elapsed(), Duration::ZERO);
}
