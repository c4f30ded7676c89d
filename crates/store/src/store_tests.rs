use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use workboard_api::{CollectionClient, StaticToken};
use workboard_core::{Record, SortOrder, ViewMode};

use crate::{AddressBar, ListStore, MemoryAddressBar, MemoryPrefs, PreferenceStore, StoreConfig};

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct JobRow {
    id: String,
    title: String,
}

impl Record for JobRow {
    fn id(&self) -> &str {
        &self.id
    }
}

fn page_body(ids: &[&str], total: u64, page: u32, limit: u32) -> serde_json::Value {
    json!({
        "data": ids.iter().map(|id| json!({"id": id, "title": format!("Job {id}")})).collect::<Vec<_>>(),
        "pagination": {
            "total": total,
            "page": page,
            "limit": limit,
            "total_pages": total.div_ceil(limit as u64),
        }
    })
}

fn test_config() -> StoreConfig {
    StoreConfig::new("jobs").with_debounce(Duration::from_millis(40))
}

fn store_for(server: &MockServer) -> ListStore<JobRow> {
    let client = CollectionClient::new(server.uri(), "jobs", Arc::new(StaticToken::new("t")))
        .expect("client builds");
    ListStore::builder(client, test_config()).build()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

async fn last_request_param(server: &MockServer, key: &str) -> Option<String> {
    let requests = server.received_requests().await.unwrap();
    let last = requests.last()?;
    last.url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned())
}

#[tokio::test]
async fn test_first_load_populates_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a", "b"], 2, 1, 25)))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert!(!store.snapshot().loaded_once);

    store.refresh();
    store.wait_settled().await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.items[0].id, "a");
    assert!(snapshot.loaded_once);
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
    assert!(snapshot.fetched_at.is_some());
}

#[tokio::test]
async fn test_rapid_search_edits_issue_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("search", "engineer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a"], 1, 1, 25)))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.set_search("eng");
    store.set_search("engineer");
    store.wait_settled().await;

    assert_eq!(request_count(&server).await, 1);
    assert_eq!(store.query().search, "engineer");
    assert_eq!(store.snapshot().items.len(), 1);
}

#[tokio::test]
async fn test_clearing_search_triggers_exactly_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a"], 1, 1, 25)))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.refresh();
    store.wait_settled().await;
    assert_eq!(request_count(&server).await, 1);

    store.set_search("");
    store.wait_settled().await;
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_reversed_arrival_keeps_latest_generation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("status", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(&["stale"], 1, 1, 25))
                .set_delay(Duration::from_millis(250)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("status", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["fresh"], 1, 1, 25)))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.set_filter("status", "slow");
    tokio::time::sleep(Duration::from_millis(20)).await;
    store.set_filter("status", "fast");
    store.wait_settled().await;

    // Give the slow response time to arrive; it must be dropped.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let snapshot = store.snapshot();
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].id, "fresh");
    assert!(snapshot.error.is_none());
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn test_filter_and_sort_mutations_reset_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a"], 137, 1, 25)))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.refresh();
    store.wait_settled().await;

    store.go_to_page(2);
    store.wait_settled().await;
    assert_eq!(last_request_param(&server, "page").await.as_deref(), Some("2"));

    store.set_sort("salary", SortOrder::Asc);
    store.wait_settled().await;
    assert_eq!(last_request_param(&server, "page").await.as_deref(), Some("1"));
    assert_eq!(last_request_param(&server, "sort_by").await.as_deref(), Some("salary"));

    store.go_to_page(4);
    store.wait_settled().await;
    store.set_filter("status", "open");
    store.wait_settled().await;
    assert_eq!(last_request_param(&server, "page").await.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_go_to_page_clamps_to_last_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a"], 137, 1, 25)))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.refresh();
    store.wait_settled().await;
    assert_eq!(store.snapshot().pagination.total_pages, 6);

    store.go_to_page(9);
    store.wait_settled().await;
    assert_eq!(last_request_param(&server, "page").await.as_deref(), Some("6"));
    assert_eq!(store.query().page, 6);
}

#[tokio::test]
async fn test_set_limit_repositions_to_keep_first_item_visible() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a"], 137, 1, 25)))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.refresh();
    store.wait_settled().await;
    store.go_to_page(2);
    store.wait_settled().await;

    // Page 2 at limit 25 starts at item index 25; at limit 10 that item
    // lives on page 3.
    store.set_limit(10);
    store.wait_settled().await;
    assert_eq!(last_request_param(&server, "page").await.as_deref(), Some("3"));
    assert_eq!(last_request_param(&server, "limit").await.as_deref(), Some("10"));
}

#[tokio::test]
async fn test_refresh_failure_keeps_last_known_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a", "b"], 2, 1, 25)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.refresh();
    store.wait_settled().await;
    assert_eq!(store.snapshot().items.len(), 2);

    store.refresh();
    store.wait_settled().await;
    let snapshot = store.snapshot();
    assert_eq!(snapshot.items.len(), 2, "stale rows must survive a failed refresh");
    assert!(snapshot.loaded_once);
    let failure = snapshot.error.expect("error recorded");
    assert!(failure.transient);
    assert!(failure.message.contains("503"));
}

#[tokio::test]
async fn test_first_load_failure_leaves_empty_error_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.refresh();
    store.wait_settled().await;

    let snapshot = store.snapshot();
    assert!(snapshot.items.is_empty());
    assert!(!snapshot.loaded_once);
    assert!(snapshot.error.is_some());
}

#[tokio::test]
async fn test_shrunken_dataset_reclamps_and_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a"], 137, 1, 25)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("page", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[], 10, 6, 25)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["x"], 10, 1, 25)))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.refresh();
    store.wait_settled().await;

    // Dataset shrank server-side since the first answer; page 6 is gone.
    store.go_to_page(6);
    store.wait_settled().await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.query.page, 1);
    assert_eq!(snapshot.pagination.total, 10);
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_selection_follows_result_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a", "b", "c"], 3, 1, 25)))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.refresh();
    store.wait_settled().await;

    store.select_visible();
    assert_eq!(store.selected_ids(), vec!["a", "b", "c"]);

    store.toggle_selected("b");
    assert_eq!(store.selected_ids(), vec!["a", "c"]);

    // Ids not on the current page are ignored.
    store.toggle_selected("zz");
    assert_eq!(store.selected_ids(), vec!["a", "c"]);

    store.refresh();
    store.wait_settled().await;
    assert!(store.selected_ids().is_empty(), "refresh must clear the selection");
    assert!(store.snapshot().selected.is_empty());
}

#[tokio::test]
async fn test_view_mode_persists_without_refetching() {
    let server = MockServer::start().await;
    let prefs = Arc::new(MemoryPrefs::new());
    prefs.set("jobs.view_mode", "table");

    let client = CollectionClient::new(server.uri(), "jobs", Arc::new(StaticToken::new("t")))
        .expect("client builds");
    let store: ListStore<JobRow> = ListStore::builder(client.clone(), test_config())
        .with_preferences(prefs.clone())
        .build();
    assert_eq!(store.snapshot().query.view_mode, ViewMode::Table);

    store.set_view_mode(ViewMode::Split);
    assert_eq!(prefs.get("jobs.view_mode").as_deref(), Some("split"));
    assert_eq!(request_count(&server).await, 0, "view mode change must not fetch");

    // A second mount of the same screen restores the persisted choice.
    let remounted: ListStore<JobRow> =
        ListStore::builder(client, test_config()).with_preferences(prefs).build();
    assert_eq!(remounted.snapshot().query.view_mode, ViewMode::Split);
}

#[tokio::test]
async fn test_stale_commit_is_discarded_even_on_success() {
    // Drives commit directly: even without proactive cancellation, a
    // response stamped with an older generation must never mutate state.
    let server = MockServer::start().await;
    let store = store_for(&server);
    store.force_generation(2);

    let fresh: Vec<JobRow> =
        serde_json::from_value(page_body(&["fresh"], 1, 1, 25)["data"].clone()).unwrap();
    let stale: Vec<JobRow> =
        serde_json::from_value(page_body(&["stale"], 1, 1, 25)["data"].clone()).unwrap();
    let meta = workboard_core::PageMeta { total: 1, page: 1, limit: 25, total_pages: 1 };

    store.commit_for_test(
        2,
        Ok(workboard_core::ListPage { items: fresh, pagination: meta }),
    );
    assert_eq!(store.snapshot().items[0].id, "fresh");

    store.commit_for_test(
        1,
        Ok(workboard_core::ListPage { items: stale, pagination: meta }),
    );
    assert_eq!(store.snapshot().items[0].id, "fresh", "stale success must not commit");

    store.commit_for_test(
        1,
        Err(workboard_api::ApiError::HttpStatus { code: 500, body: "late".to_owned() }),
    );
    assert!(store.snapshot().error.is_none(), "stale failure must not surface");
}

#[tokio::test]
async fn test_address_bar_seeds_and_mirrors_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a"], 137, 3, 25)))
        .mount(&server)
        .await;

    let address = Arc::new(MemoryAddressBar::from_query("?search=rust&page=3&status=open"));
    let client = CollectionClient::new(server.uri(), "jobs", Arc::new(StaticToken::new("t")))
        .expect("client builds");
    let store: ListStore<JobRow> =
        ListStore::builder(client, test_config()).with_address_bar(address.clone()).build();

    let query = store.query();
    assert_eq!(query.search, "rust");
    assert_eq!(query.page, 3);
    assert!(query.filters.contains_key("status"));

    store.set_search("go");
    store.wait_settled().await;

    let params = address.read();
    assert_eq!(params.get("search"), Some(&"go".to_owned()));
    assert_eq!(params.get("status"), Some(&"open".to_owned()));
    assert!(!params.contains_key("page"), "page reset to default is omitted");
    assert!(!params.contains_key("view_mode"));
}
