use std::sync::Arc;
use std::time::Duration;

use folio_core::{ApiClient, ErrorKind, Resource, ResourceCache};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    id: i64,
    name: String,
}

impl Resource for Item {
    type Id = i64;
    const ENDPOINT: &'static str = "/items";
    const LABEL: &'static str = "item";

    fn id(&self) -> &i64 {
        &self.id
    }
}

fn item(id: i64, name: &str) -> Item {
    Item {
        id,
        name: name.to_string(),
    }
}

fn cache_for(server: &MockServer) -> ResourceCache<Item> {
    let client = ApiClient::new(server.uri()).expect("Failed to build client");
    ResourceCache::new(client)
}

fn list_response(items: &[Item]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": items }))
}

fn record_response(item: &Item) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": item, "message": "ok" }))
}

async fn mount_list(server: &MockServer, items: &[Item]) {
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(list_response(items))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_concurrent_fetches_issue_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(list_response(&[item(1, "A")]).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let (first, second) = tokio::join!(cache.fetch(), cache.fetch());

    let first = first.expect("first fetch failed");
    let second = second.expect("second fetch failed");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, vec![item(1, "A")]);

    server.verify().await;
}

#[tokio::test]
async fn test_fetch_is_served_from_cache_once_present() {
    let server = MockServer::start().await;
    mount_list(&server, &[item(1, "A")]).await;

    let cache = cache_for(&server);
    assert!(cache.cached().await.is_none());

    let first = cache.fetch().await.unwrap();
    assert_eq!(*first, vec![item(1, "A")]);
    assert!(!cache.is_pending().await);

    let second = cache.fetch().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let snapshot = cache.snapshot().await.expect("collection should be cached");
    assert_eq!(snapshot.age_display(), "just now");

    server.verify().await;
}

#[tokio::test]
async fn test_create_appends_server_record() {
    let server = MockServer::start().await;
    mount_list(&server, &[item(1, "A"), item(2, "B")]).await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(body_json(json!({ "name": "C" })))
        .respond_with(record_response(&item(3, "C")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let before = cache.fetch().await.unwrap();

    let created = cache.create(&json!({ "name": "C" })).await.unwrap();
    assert_eq!(created, item(3, "C"));

    let after = cache.fetch().await.unwrap();
    assert_eq!(*after, vec![item(1, "A"), item(2, "B"), item(3, "C")]);
    assert_eq!(after.iter().filter(|i| i.id == 3).count(), 1);

    // Earlier readers keep the snapshot they were given
    assert_eq!(before.len(), 2);

    server.verify().await;
}

#[tokio::test]
async fn test_update_replaces_entry_in_place() {
    let server = MockServer::start().await;
    mount_list(&server, &[item(1, "A"), item(2, "X"), item(3, "Y")]).await;
    Mock::given(method("PATCH"))
        .and(path("/items/2"))
        .and(body_json(json!({ "name": "Z" })))
        .respond_with(record_response(&item(2, "Z")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    cache.fetch().await.unwrap();

    let updated = cache.update(&2, &json!({ "name": "Z" })).await.unwrap();
    assert_eq!(updated, item(2, "Z"));

    let items = cache.cached().await.unwrap();
    assert_eq!(*items, vec![item(1, "A"), item(2, "Z"), item(3, "Y")]);
    assert_eq!(cache.find(&2).await, Some(item(2, "Z")));

    server.verify().await;
}

#[tokio::test]
async fn test_update_scenario_single_record() {
    let server = MockServer::start().await;
    mount_list(&server, &[item(1, "A")]).await;
    Mock::given(method("PATCH"))
        .and(path("/items/1"))
        .respond_with(record_response(&item(1, "B")))
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    cache.fetch().await.unwrap();
    cache.update(&1, &json!({ "name": "B" })).await.unwrap();

    assert_eq!(*cache.fetch().await.unwrap(), vec![item(1, "B")]);
    server.verify().await;
}

#[tokio::test]
async fn test_delete_removes_entry() {
    let server = MockServer::start().await;
    mount_list(&server, &[item(1, "A"), item(2, "B"), item(3, "C")]).await;
    Mock::given(method("DELETE"))
        .and(path("/items/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Item deleted" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/items/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    cache.fetch().await.unwrap();

    cache.delete(&2).await.unwrap();
    let items = cache.cached().await.unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.id != 2));

    // Empty body is fine too
    cache.delete(&3).await.unwrap();
    assert_eq!(*cache.cached().await.unwrap(), vec![item(1, "A")]);

    server.verify().await;
}

#[tokio::test]
async fn test_rejected_create_surfaces_server_message() {
    let server = MockServer::start().await;
    mount_list(&server, &[item(1, "A")]).await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Title is required" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let before = cache.fetch().await.unwrap();

    let err = cache.create(&json!({ "name": "" })).await.unwrap_err();
    assert_eq!(err.message, "Title is required");
    assert_eq!(err.kind, ErrorKind::Validation);

    let after = cache.cached().await.unwrap();
    assert!(Arc::ptr_eq(&before, &after));

    server.verify().await;
}

#[tokio::test]
async fn test_create_error_message_comes_only_from_message_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream connect error or disconnect"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(410).set_body_json(json!({ "message": "Item archived" })))
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let body = json!({ "name": "X" });

    let err = cache.create(&body).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "Failed to create item");

    let err = cache.create(&body).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "Failed to create item");

    let err = cache.create(&body).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "Item archived");
}

#[tokio::test]
async fn test_failed_update_and_delete_leave_cache_unchanged() {
    let server = MockServer::start().await;
    mount_list(&server, &[item(1, "A")]).await;
    Mock::given(method("PATCH"))
        .and(path("/items/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Item not found" })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    cache.fetch().await.unwrap();

    let err = cache.update(&9, &json!({ "name": "Q" })).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Item not found");

    let err = cache.delete(&1).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "Failed to delete item");

    assert_eq!(*cache.cached().await.unwrap(), vec![item(1, "A")]);
}

#[tokio::test]
async fn test_failed_fetch_reaches_every_waiter_and_clears_pending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "Database unavailable" }))
                .set_delay(Duration::from_millis(150)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(list_response(&[item(1, "A")]))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let (first, second) = tokio::join!(cache.fetch(), cache.fetch());

    let first = first.unwrap_err();
    let second = second.unwrap_err();
    assert_eq!(first, second);
    assert_eq!(first.message, "Database unavailable");
    assert_eq!(first.kind, ErrorKind::Server);

    assert!(cache.cached().await.is_none());
    assert!(!cache.is_pending().await);

    // Nothing was cached, so the next call goes back to the server
    assert_eq!(*cache.fetch().await.unwrap(), vec![item(1, "A")]);

    server.verify().await;
}

#[tokio::test]
async fn test_network_failure_uses_fallback_message() {
    // Nothing listens on port 1
    let client = ApiClient::new("http://127.0.0.1:1").unwrap();
    let cache: ResourceCache<Item> = ResourceCache::new(client);

    let err = cache.fetch().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.message, "Failed to load item list");
    assert!(cache.cached().await.is_none());
}

#[tokio::test]
async fn test_invalidate_and_refresh_go_back_to_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(list_response(&[item(1, "A")]))
        .expect(3)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    cache.fetch().await.unwrap();

    cache.invalidate().await;
    assert!(cache.cached().await.is_none());
    cache.fetch().await.unwrap();

    let refreshed = cache.refresh().await.unwrap();
    assert_eq!(*refreshed, vec![item(1, "A")]);

    server.verify().await;
}

#[tokio::test]
async fn test_refresh_during_pending_fetch_joins_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(list_response(&[item(1, "A")]).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let background = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.fetch().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(cache.is_pending().await);

    let refreshed = cache.refresh().await.unwrap();
    let fetched = background.await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&refreshed, &fetched));
    assert_eq!(*cache.cached().await.unwrap(), vec![item(1, "A")]);

    server.verify().await;
}

#[tokio::test]
async fn test_invalidate_during_pending_fetch_keeps_one_request_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(list_response(&[item(1, "A")]).set_delay(Duration::from_millis(300)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(list_response(&[item(1, "A"), item(2, "B")]))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let first = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.fetch().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    cache.invalidate().await;
    assert!(cache.is_pending().await);

    // Joins the running request instead of starting another
    let joined = cache.fetch().await.unwrap();
    let first = first.await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&joined, &first));
    assert_eq!(*first, vec![item(1, "A")]);

    // The invalidated result was handed out but not kept
    assert!(cache.cached().await.is_none());
    assert!(!cache.is_pending().await);

    let fresh = cache.fetch().await.unwrap();
    assert_eq!(*fresh, vec![item(1, "A"), item(2, "B")]);

    server.verify().await;
}

#[tokio::test]
async fn test_fetch_completes_after_caller_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(list_response(&[item(7, "Late")]).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let timed_out = tokio::time::timeout(Duration::from_millis(20), cache.fetch()).await;
    assert!(timed_out.is_err());
    assert!(cache.is_pending().await);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(*cache.cached().await.expect("fetch should have finished"), vec![item(7, "Late")]);

    server.verify().await;
}

#[tokio::test]
async fn test_mutation_during_pending_fetch_leaves_fetch_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(list_response(&[item(1, "A")]).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(record_response(&item(2, "B")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let background = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.fetch().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(cache.is_pending().await);

    let created = cache.create(&json!({ "name": "B" })).await.unwrap();
    assert_eq!(created, item(2, "B"));
    assert!(cache.cached().await.is_none());

    let fetched = background.await.unwrap().unwrap();
    assert_eq!(*fetched, vec![item(1, "A")]);
    assert_eq!(*cache.cached().await.unwrap(), vec![item(1, "A")]);

    server.verify().await;
}

#[tokio::test]
async fn test_mutations_before_first_fetch_do_not_populate_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(record_response(&item(5, "E")))
        .mount(&server)
        .await;
    mount_list(&server, &[item(5, "E")]).await;

    let cache = cache_for(&server);
    cache.create(&json!({ "name": "E" })).await.unwrap();
    assert!(cache.cached().await.is_none());

    assert_eq!(*cache.fetch().await.unwrap(), vec![item(5, "E")]);
    server.verify().await;
}
