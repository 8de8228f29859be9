//! Integration tests for the feed controller against a mock API.

use std::sync::Arc;
use std::time::Duration;

use blog_feed_browser::api::ApiClient;
use blog_feed_browser::feed::{FeedController, FeedPhase, FeedQuery, FeedSnapshot};
use blog_feed_browser::scroll::{ScrollMode, SentinelBridge};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::with_base_url(
        Url::parse(&server.uri()).expect("mock server URI is a valid URL"),
        Duration::from_secs(5),
    )
    .expect("failed to build test client")
}

/// A page of generated posts starting at `start_id`.
fn page_body(start_id: u64, count: u64, total: u64, skip: u64, limit: u64) -> serde_json::Value {
    let posts: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "id": start_id + i,
                "title": format!("Post {}", start_id + i),
                "body": "body text",
                "tags": [format!("tag-{}", (start_id + i) % 3)],
                "reactions": {"likes": 1, "dislikes": 0},
                "userId": 1
            })
        })
        .collect();
    json!({"posts": posts, "total": total, "skip": skip, "limit": limit})
}

async fn mount_listing_page(server: &MockServer, skip: u64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("skip", skip.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Poll the controller until `predicate` holds or the deadline passes.
async fn wait_for(
    controller: &FeedController,
    predicate: impl Fn(&FeedSnapshot) -> bool,
) -> FeedSnapshot {
    for _ in 0..100 {
        let snapshot = controller.snapshot();
        if predicate(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached; last snapshot: {:?}", controller.snapshot());
}

#[tokio::test]
async fn test_pagination_accumulates_pages() {
    let server = MockServer::start().await;
    mount_listing_page(&server, 0, page_body(1, 10, 27, 0, 10)).await;
    mount_listing_page(&server, 10, page_body(11, 10, 27, 10, 10)).await;
    mount_listing_page(&server, 20, page_body(21, 7, 27, 20, 10)).await;

    let controller = FeedController::new(client_for(&server), FeedQuery::new("", "", 10));

    controller.refresh().await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.posts.len(), 10);
    assert_eq!(snapshot.skip, 10);
    assert!(snapshot.has_more);

    controller.load_more().await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.posts.len(), 20);
    assert_eq!(snapshot.skip, 20);
    assert!(snapshot.has_more);

    controller.load_more().await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.posts.len(), 27);
    assert_eq!(snapshot.skip, 27);
    assert!(!snapshot.has_more, "7 < 10 means the feed is drained");
    assert_eq!(snapshot.total, 27);
    assert_eq!(snapshot.phase, FeedPhase::Settled);

    // Accumulation preserved server order.
    let ids: Vec<u64> = snapshot.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, (1..=27).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_epoch_reset_discards_prior_accumulation() {
    let server = MockServer::start().await;
    mount_listing_page(&server, 0, page_body(1, 10, 20, 0, 10)).await;
    mount_listing_page(&server, 10, page_body(11, 10, 20, 10, 10)).await;
    Mock::given(method("GET"))
        .and(path("/posts/search"))
        .and(query_param("q", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(100, 4, 4, 0, 10)))
        .mount(&server)
        .await;

    let controller = FeedController::new(client_for(&server), FeedQuery::new("", "", 10));
    controller.refresh().await;
    controller.load_more().await;
    assert_eq!(controller.snapshot().posts.len(), 20);

    controller.set_query(FeedQuery::new("fresh", "", 10)).await;
    let snapshot = controller.snapshot();
    assert_eq!(
        snapshot.posts.len(),
        4,
        "a new epoch holds exactly the just-fetched page"
    );
    assert_eq!(snapshot.skip, 4);
    assert!(snapshot.posts.iter().all(|p| p.id >= 100));
}

#[tokio::test]
async fn test_stale_response_from_abandoned_epoch_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/search"))
        .and(query_param("q", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(900, 5, 5, 0, 10))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts/search"))
        .and(query_param("q", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 3, 3, 0, 10)))
        .mount(&server)
        .await;

    let controller = Arc::new(FeedController::new(
        client_for(&server),
        FeedQuery::new("", "", 10),
    ));

    // Epoch E1: a slow search that will land late.
    let slow = Arc::clone(&controller);
    let slow_task =
        tokio::spawn(async move { slow.set_query(FeedQuery::new("slow", "", 10)).await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Epoch E2 begins while E1 is still in flight.
    controller.set_query(FeedQuery::new("fast", "", 10)).await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.posts.len(), 3);

    // Let E1's response arrive; it must be suppressed.
    slow_task.await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.posts.len(), 3, "stale epoch must not be applied");
    assert!(snapshot.posts.iter().all(|p| p.id < 900));
    assert_eq!(snapshot.phase, FeedPhase::Settled);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_failed_fetch_keeps_posts_and_sets_error() {
    let server = MockServer::start().await;
    mount_listing_page(&server, 0, page_body(1, 10, 27, 0, 10)).await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("skip", "10"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_listing_page(&server, 10, page_body(11, 10, 27, 10, 10)).await;

    let controller = FeedController::new(client_for(&server), FeedQuery::new("", "", 10));
    controller.refresh().await;

    controller.load_more().await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, FeedPhase::Failed);
    assert_eq!(snapshot.posts.len(), 10, "failure must not destroy posts");
    assert_eq!(snapshot.skip, 10);
    let message = snapshot.error.as_ref().expect("error message must be set");
    assert!(!message.is_empty());
    assert!(!snapshot.loading());

    // The user retries the same action and the feed recovers.
    controller.load_more().await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, FeedPhase::Settled);
    assert_eq!(snapshot.posts.len(), 20);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_load_more_is_a_noop_while_loading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(1, 10, 27, 0, 10))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let controller = Arc::new(FeedController::new(
        client_for(&server),
        FeedQuery::new("", "", 10),
    ));

    let refreshing = Arc::clone(&controller);
    let refresh_task = tokio::spawn(async move { refreshing.refresh().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(controller.snapshot().loading());

    // Must return immediately without issuing a second request.
    controller.load_more().await;
    refresh_task.await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(controller.snapshot().posts.len(), 10);
}

#[tokio::test]
async fn test_empty_result_is_settled_not_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"posts": [], "total": 0})))
        .mount(&server)
        .await;

    let controller = FeedController::new(client_for(&server), FeedQuery::new("nothing", "", 10));
    controller.refresh().await;

    let snapshot = controller.snapshot();
    assert!(snapshot.is_empty_result());
    assert!(snapshot.error.is_none());
    assert!(!snapshot.has_more);
}

#[tokio::test]
async fn test_sentinel_bridge_drains_feed_in_infinite_mode() {
    let server = MockServer::start().await;
    mount_listing_page(&server, 0, page_body(1, 10, 17, 0, 10)).await;
    mount_listing_page(&server, 10, page_body(11, 7, 17, 10, 10)).await;

    let controller = Arc::new(FeedController::new(
        client_for(&server),
        FeedQuery::new("", "", 10),
    ));
    controller.refresh().await;

    let bridge = SentinelBridge::spawn(ScrollMode::Infinite, Arc::clone(&controller));
    bridge.notify_visible();

    let snapshot = wait_for(&controller, |s| s.posts.len() == 17).await;
    assert!(!snapshot.has_more);

    // The feed is drained; further sentinel events are ignored.
    bridge.notify_visible();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_sentinel_bridge_ignores_events_in_manual_mode() {
    let server = MockServer::start().await;
    mount_listing_page(&server, 0, page_body(1, 10, 20, 0, 10)).await;
    mount_listing_page(&server, 10, page_body(11, 10, 20, 10, 10)).await;

    let controller = Arc::new(FeedController::new(
        client_for(&server),
        FeedQuery::new("", "", 10),
    ));
    controller.refresh().await;

    let bridge = SentinelBridge::spawn(ScrollMode::Manual, Arc::clone(&controller));
    bridge.notify_visible();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(controller.snapshot().posts.len(), 10);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_tag_filter_wins_over_search_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/tag/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 2, 2, 0, 10)))
        .mount(&server)
        .await;

    let controller = FeedController::new(
        client_for(&server),
        FeedQuery::new("ignored search", "history", 10),
    );
    controller.refresh().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, FeedPhase::Settled);
    assert_eq!(snapshot.posts.len(), 2);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/posts/tag/history");
}

#[tokio::test]
async fn test_unique_tags_follow_the_loaded_posts() {
    let server = MockServer::start().await;
    let body = json!({
        "posts": [
            {"id": 1, "title": "A", "body": "", "tags": ["a", "b"], "userId": 1},
            {"id": 2, "title": "B", "body": "", "tags": ["b", "c"], "userId": 1}
        ],
        "total": 2, "skip": 0, "limit": 10
    });
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let controller = FeedController::new(client_for(&server), FeedQuery::new("", "", 10));
    controller.refresh().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.unique_tags.as_slice(), ["a", "b", "c"]);
}
