mod common;

use common::{FakeTransport, Reply};
use std::sync::Arc;
use std::time::Duration;
use tempo_tarifs::error::TempoError;

#[tokio::test]
async fn starts_empty_and_commits_first_poll() {
    let fake = Arc::new(FakeTransport::healthy());
    let store = common::store(fake);

    assert!(!store.current().is_ready());
    assert!(store.snapshot().is_empty());

    let state = store.refresh().await.unwrap();
    assert_eq!(state.version, 1);
    assert_eq!(state.snapshot.len(), 7);
    assert!(state.last_success.is_some());
    assert!(state.failed_endpoints.is_empty());
    assert!(Arc::ptr_eq(&state, &store.current()));
}

#[tokio::test]
async fn total_failure_keeps_previous_snapshot() {
    let fake = Arc::new(FakeTransport::healthy());
    let store = common::store(fake.clone());
    store.refresh().await.unwrap();
    let before = store.current();

    fake.set_all(Reply::Fail);
    let err = store.refresh().await.unwrap_err();
    assert!(matches!(err, TempoError::AllEndpointsFailed { .. }));

    let after = store.current();
    assert!(Arc::ptr_eq(&before.snapshot, &after.snapshot));
    assert_eq!(after.version, before.version);
    assert_eq!(after.last_success, before.last_success);
    assert_eq!(after.polls_attempted, 2);
    assert!(after.last_failure.is_some());
}

#[tokio::test]
async fn failed_endpoints_are_not_carried_forward() {
    let fake = Arc::new(FakeTransport::healthy());
    let store = common::store(fake.clone());
    store.refresh().await.unwrap();
    assert!(store.snapshot().contains("tomorrow"));

    fake.set("tomorrow", Reply::Status(404));
    let state = store.refresh().await.unwrap();
    assert_eq!(state.version, 2);
    assert!(!state.snapshot.contains("tomorrow"));
    assert_eq!(state.failed_endpoints, vec!["tomorrow".to_string()]);
}

#[tokio::test]
async fn refresh_now_reports_not_ready_on_total_failure() {
    let fake = Arc::new(FakeTransport::healthy());
    fake.set_all(Reply::Status(502));
    let store = common::store(fake);

    let err = store.refresh_now().await.unwrap_err();
    assert!(matches!(err, TempoError::NotReady { .. }));
    assert!(!store.current().is_ready());
}

#[tokio::test(start_paused = true)]
async fn concurrent_refreshes_share_one_poll() {
    let fake = Arc::new(FakeTransport::healthy().with_latency(Duration::from_millis(500)));
    let store = common::store(fake.clone());

    let (a, b, c) = tokio::join!(store.refresh(), store.refresh(), store.refresh());
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_eq!(fake.calls(), 7);
    assert_eq!(a.version, 1);
    assert_eq!(b.version, 1);
    assert_eq!(c.version, 1);
    assert_eq!(store.current().polls_attempted, 1);
}

#[tokio::test]
async fn subscribers_see_each_commit() {
    let fake = Arc::new(FakeTransport::healthy());
    let store = common::store(fake);
    let mut rx = store.subscribe();

    store.refresh().await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().version, 1);
}

#[tokio::test(start_paused = true)]
async fn coalesced_refresh_reports_failed_poll() {
    let fake = Arc::new(FakeTransport::healthy().with_latency(Duration::from_millis(500)));
    let store = common::store(fake.clone());
    store.refresh().await.unwrap();

    fake.set_all(Reply::Status(503));
    let (a, b) = tokio::join!(store.refresh(), store.refresh());

    assert_eq!(fake.calls(), 14);
    for result in [a, b] {
        match result {
            Err(TempoError::AllEndpointsFailed { failed }) => assert_eq!(failed.len(), 7),
            other => panic!("unexpected result: {other:?}"),
        }
    }
    let state = store.current();
    assert_eq!(state.version, 1);
    assert_eq!(state.polls_attempted, 2);
    assert_eq!(state.last_failure.as_ref().map(|f| f.endpoints.len()), Some(7));
}
