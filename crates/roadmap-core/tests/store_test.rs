mod common;

use common::{greeting, store_for, wait_until, FakeChatbot, Post};
use roadmap_core::{ChatbotError, LoadOutcome, Message, Status, StoreEvent};

#[tokio::test]
async fn load_replaces_log_and_reports_success() {
    let fake = FakeChatbot::greeting();
    let store = store_for(&fake);
    assert_eq!(store.status(), Status::Initial);
    assert!(store.messages().is_empty());

    let outcome = store.load().await.unwrap();

    assert_eq!(outcome, LoadOutcome::Applied);
    assert_eq!(store.status(), Status::Success);
    assert_eq!(store.messages(), vec![greeting()]);
    assert!(store.snapshot().loaded);
}

#[tokio::test]
async fn failed_load_sets_error_status() {
    let fake = FakeChatbot::greeting();
    fake.fail_fetch(Some(ChatbotError::server(
        502,
        Some("Chatbot backend offline".to_string()),
    )));
    let store = store_for(&fake);

    let err = store.load().await.unwrap_err();

    assert_eq!(err, ChatbotError::server(502, Some("Chatbot backend offline".to_string())));
    assert_eq!(store.status(), Status::Error("Chatbot backend offline".to_string()));
    assert!(!store.snapshot().loaded);
}

#[tokio::test]
async fn failed_load_keeps_previous_messages_in_memory() {
    let fake = FakeChatbot::greeting();
    let store = store_for(&fake);
    store.load().await.unwrap();

    fake.fail_fetch(Some(ChatbotError::Network("offline".to_string())));
    assert!(store.load().await.is_err());

    assert_eq!(store.messages(), vec![greeting()]);
    assert!(matches!(store.status(), Status::Error(_)));
}

#[tokio::test]
async fn stale_load_does_not_clobber_newer_state() {
    let fake = FakeChatbot::greeting();
    fake.gate_fetches();
    let store = store_for(&fake);

    let old = vec![Message::bot("old")];
    let new = vec![Message::bot("old"), Message::user("new")];

    let driver = {
        let fake = fake.clone();
        let store = store.clone();
        let new = new.clone();
        let old = old.clone();
        async move {
            wait_until(|| fake.is_waiting(0) && fake.is_waiting(1)).await;
            // Second-issued load resolves first
            fake.release(1, Ok(new.clone()));
            wait_until(|| store.messages() == new).await;
            fake.release(0, Ok(old));
        }
    };

    let (first, second, ()) = tokio::join!(store.load(), store.load(), driver);
    let mut outcomes = vec![first.unwrap(), second.unwrap()];
    outcomes.sort_by_key(|o| format!("{o:?}"));

    assert_eq!(outcomes, vec![LoadOutcome::Applied, LoadOutcome::Superseded]);
    assert_eq!(store.messages(), new);
    assert_eq!(store.status(), Status::Success);
}

#[tokio::test]
async fn stale_error_does_not_override_newer_success() {
    let fake = FakeChatbot::greeting();
    fake.gate_fetches();
    let store = store_for(&fake);

    let driver = {
        let fake = fake.clone();
        let store = store.clone();
        async move {
            wait_until(|| fake.is_waiting(0) && fake.is_waiting(1)).await;
            fake.release(1, Ok(vec![greeting()]));
            wait_until(|| !store.messages().is_empty()).await;
            fake.release(0, Err(ChatbotError::Network("timed out".to_string())));
        }
    };

    let (first, second, ()) = tokio::join!(store.load(), store.load(), driver);

    assert!(first.is_ok() && second.is_ok());
    assert_eq!(store.status(), Status::Success);
    assert_eq!(store.messages(), vec![greeting()]);
}

#[tokio::test]
async fn status_is_loading_while_a_request_is_in_flight() {
    let fake = FakeChatbot::greeting();
    fake.gate_fetches();
    let store = store_for(&fake);

    let driver = {
        let fake = fake.clone();
        let store = store.clone();
        async move {
            wait_until(|| fake.is_waiting(0)).await;
            assert_eq!(store.status(), Status::Loading);
            fake.release(0, Ok(vec![greeting()]));
        }
    };

    let (outcome, ()) = tokio::join!(store.load(), driver);

    assert_eq!(outcome.unwrap(), LoadOutcome::Applied);
    assert_eq!(store.status(), Status::Success);
}

#[tokio::test]
async fn detached_store_ignores_late_responses() {
    let fake = FakeChatbot::greeting();
    fake.gate_fetches();
    let store = store_for(&fake);

    let driver = {
        let fake = fake.clone();
        let store = store.clone();
        async move {
            wait_until(|| fake.is_waiting(0)).await;
            store.detach();
            fake.release(0, Ok(vec![greeting()]));
        }
    };

    let (outcome, ()) = tokio::join!(store.load(), driver);

    assert_eq!(outcome.unwrap(), LoadOutcome::Detached);
    assert!(store.messages().is_empty());
    assert_eq!(store.status(), Status::Initial);
}

#[tokio::test]
async fn detached_store_issues_no_requests() {
    let fake = FakeChatbot::greeting();
    let store = store_for(&fake);
    store.detach();

    assert_eq!(store.load().await.unwrap(), LoadOutcome::Detached);
    assert_eq!(store.post("hello").await.unwrap(), LoadOutcome::Detached);
    assert_eq!(store.reset().await.unwrap(), LoadOutcome::Detached);

    assert_eq!(fake.fetch_calls(), 0);
    assert!(fake.sent().is_empty());
    assert_eq!(fake.reset_calls(), 0);
    assert!(store.is_detached());
}

#[tokio::test]
async fn failed_reset_leaves_messages_untouched() {
    let fake = FakeChatbot::greeting();
    let store = store_for(&fake);
    store.load().await.unwrap();
    store.post("Yes").await.unwrap();
    store.load().await.unwrap();
    let before = store.messages();
    assert_eq!(before.len(), 3);

    fake.fail_reset(Some(ChatbotError::server(500, None)));
    let err = store.reset().await.unwrap_err();

    assert_eq!(err, ChatbotError::server(500, None));
    assert_eq!(store.messages(), before);
    assert_eq!(store.status(), Status::Success);
    assert_eq!(fake.fetch_calls(), 2);
}

#[tokio::test]
async fn successful_reset_reloads_from_server() {
    let fake = FakeChatbot::greeting();
    let store = store_for(&fake);
    store.load().await.unwrap();
    store.post("Yes").await.unwrap();
    store.load().await.unwrap();
    assert_eq!(store.messages().len(), 3);

    let outcome = store.reset().await.unwrap();

    assert_eq!(outcome, LoadOutcome::Applied);
    assert_eq!(fake.reset_calls(), 1);
    assert_eq!(store.messages(), vec![greeting()]);
}

#[tokio::test]
async fn applied_loads_are_broadcast() {
    let fake = FakeChatbot::greeting();
    let store = store_for(&fake);
    let mut events = store.subscribe();

    store.load().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        StoreEvent::Replaced { count: 1, grew: true }
    );

    store.load().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        StoreEvent::Replaced { count: 1, grew: false }
    );

    fake.fail_fetch(Some(ChatbotError::server(503, Some("busy".to_string()))));
    let _ = store.load().await;
    assert_eq!(
        events.recv().await.unwrap(),
        StoreEvent::Failed { message: "busy".to_string() }
    );
}

#[tokio::test]
async fn post_in_flight_shows_loading_then_settles() {
    let fake = FakeChatbot::greeting();
    let store = store_for(&fake);
    store.load().await.unwrap();
    fake.gate_posts();

    let driver = {
        let fake = fake.clone();
        let store = store.clone();
        async move {
            wait_until(|| fake.is_post_waiting(Post::Send, 0)).await;
            assert_eq!(store.status(), Status::Loading);
            // Still the last good log while the post is out
            assert_eq!(store.messages(), vec![greeting()]);
            fake.release_post(Post::Send, 0, Ok(()));
        }
    };
    let (outcome, ()) = tokio::join!(store.post("Yes"), driver);

    assert_eq!(outcome.unwrap(), LoadOutcome::Applied);
    assert_eq!(store.status(), Status::Success);
}

#[tokio::test]
async fn post_finishing_after_detach_is_dropped() {
    let fake = FakeChatbot::greeting();
    let store = store_for(&fake);
    fake.gate_posts();

    let driver = {
        let fake = fake.clone();
        let store = store.clone();
        async move {
            wait_until(|| fake.is_post_waiting(Post::Send, 0)).await;
            store.detach();
            fake.release_post(
                Post::Send,
                0,
                Err(ChatbotError::server(500, Some("late failure".to_string()))),
            );
        }
    };
    let (outcome, ()) = tokio::join!(store.post("hello"), driver);

    assert_eq!(outcome.unwrap(), LoadOutcome::Detached);
    assert_eq!(store.status(), Status::Initial);
}

#[tokio::test]
async fn failed_reload_after_reset_lands_in_status() {
    let fake = FakeChatbot::greeting();
    let store = store_for(&fake);
    store.load().await.unwrap();
    store.post("Yes").await.unwrap();
    store.load().await.unwrap();

    fake.fail_fetch(Some(ChatbotError::Network("offline".to_string())));
    let outcome = store.reset().await.unwrap();

    assert_eq!(outcome, LoadOutcome::Applied);
    assert_eq!(fake.reset_calls(), 1);
    assert_eq!(fake.log(), vec![greeting()]);
    assert!(matches!(store.status(), Status::Error(_)));
}
