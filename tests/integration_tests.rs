//! Integration tests using mock HTTP server
//!
//! Tests the full flow: merge controller → GraphQL query client → HTTP → rendered list

use billing_customers::config::AppConfig;
use billing_customers::http::HttpClient;
use billing_customers::pagination::{
    ConsistencyViolation, LoadOutcome, LoadPhase, MergeController, SkipReason,
};
use billing_customers::query::GraphqlQueryClient;
use billing_customers::render::{render_view, LOAD_MORE_LABEL};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn node(id: &str, email: &str, plan: Option<(&str, &str)>) -> Value {
    let subscriptions = match plan {
        Some((name, status)) => json!({
            "total_count": 1,
            "data": [{
                "id": format!("sub_{id}"),
                "status": status,
                "items": {"total_count": 1, "data": [{
                    "id": format!("si_{id}"),
                    "plan": {"id": format!("plan_{name}"), "name": name, "currency": "usd"}
                }]}
            }]
        }),
        None => json!({"total_count": 0, "data": []}),
    };

    json!({
        "node": {
            "id": id,
            "email": email,
            "created": 1_500_000_000,
            "delinquent": false,
            "livemode": false,
            "subscriptions": subscriptions,
            "discount": null
        }
    })
}

fn connection(edges: Vec<Value>, end_cursor: Option<&str>, has_next_page: bool) -> Value {
    json!({
        "data": {
            "stripeCustomers": {
                "edges": edges,
                "pageInfo": {"endCursor": end_cursor, "hasNextPage": has_next_page}
            }
        }
    })
}

async fn mount_page(server: &MockServer, cursor: Option<&str>, body: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"variables": {"cursor": cursor}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn controller_for(server: &MockServer) -> MergeController<billing_customers::Customer, GraphqlQueryClient> {
    let config = AppConfig::default()
        .with_overrides(Some(format!("{}/graphql", server.uri())), Some(2));
    let endpoint = config.validate().unwrap().to_string();

    let mut http_config = config.http.to_client_config();
    http_config.max_retries = 0;
    let http = HttpClient::with_config(http_config).unwrap();

    MergeController::builder(GraphqlQueryClient::new(http, endpoint))
        .page_size(config.page_size)
        .build()
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[tokio::test]
async fn test_load_pages_until_exhausted() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        None,
        connection(
            vec![
                node("cus_1", "ada@example.com", Some(("Pro", "active"))),
                node("cus_2", "bob@example.com", None),
            ],
            Some("cus_2"),
            true,
        ),
    )
    .await;
    mount_page(
        &server,
        Some("cus_2"),
        connection(
            vec![node("cus_3", "cy@example.com", Some(("Starter", "trialing")))],
            Some("cus_3"),
            false,
        ),
    )
    .await;

    let controller = controller_for(&server);

    let outcome = controller.load_more().await;
    assert_eq!(
        outcome,
        LoadOutcome::Merged {
            appended: 2,
            has_next_page: true
        }
    );
    let rendered = render_view(&controller.view().await, chrono::Utc::now());
    assert!(rendered.contains("ada@example.com"));
    assert!(rendered.contains("Pro plan (active)"));
    assert!(rendered.contains("No plan"));
    assert!(rendered.ends_with(LOAD_MORE_LABEL));

    let outcome = controller.load_more().await;
    assert_eq!(
        outcome,
        LoadOutcome::Merged {
            appended: 1,
            has_next_page: false
        }
    );

    let view = controller.view().await;
    let ids: Vec<&str> = view.items.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["cus_1", "cus_2", "cus_3"]);
    assert_eq!(controller.snapshot().await.cursor.as_deref(), Some("cus_3"));
    assert_eq!(controller.phase().await, LoadPhase::Exhausted);

    let rendered = render_view(&view, chrono::Utc::now());
    assert!(rendered.contains("Starter plan (trialing)"));
    assert!(!rendered.contains(LOAD_MORE_LABEL));

    assert_eq!(
        controller.load_more().await,
        LoadOutcome::Skipped(SkipReason::Exhausted)
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_server_error_is_display_only_and_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        None,
        connection(vec![node("cus_1", "ada@example.com", None)], Some("cus_1"), false),
    )
    .await;

    let controller = controller_for(&server);

    let outcome = controller.load_more().await;
    assert_eq!(
        outcome,
        LoadOutcome::Failed("HTTP 503: maintenance".to_string())
    );
    let view = controller.view().await;
    assert!(view.items.is_empty());
    assert!(view.can_load_more());
    assert!(render_view(&view, chrono::Utc::now()).contains("Error :( HTTP 503: maintenance"));

    assert!(controller.load_more().await.is_merged());
    assert_eq!(controller.view().await.error, None);
}

#[tokio::test]
async fn test_overlapping_page_is_rejected() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        None,
        connection(
            vec![
                node("cus_1", "a@example.com", None),
                node("cus_2", "b@example.com", None),
            ],
            Some("cus_2"),
            true,
        ),
    )
    .await;
    mount_page(
        &server,
        Some("cus_2"),
        connection(
            vec![
                node("cus_2", "b@example.com", None),
                node("cus_3", "c@example.com", None),
            ],
            Some("cus_3"),
            true,
        ),
    )
    .await;

    let controller = controller_for(&server);
    controller.load_more().await;

    assert_eq!(
        controller.load_more().await,
        LoadOutcome::Rejected(ConsistencyViolation::DuplicateRecord {
            id: "cus_2".to_string()
        })
    );
    assert_eq!(controller.len().await, 2);
    assert_eq!(controller.snapshot().await.cursor.as_deref(), Some("cus_2"));
}

#[tokio::test]
async fn test_empty_page_leaves_list_unchanged() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        None,
        connection(vec![node("cus_1", "a@example.com", None)], Some("cus_1"), true),
    )
    .await;
    mount_page(&server, Some("cus_1"), connection(vec![], Some("cus_1"), true)).await;

    let controller = controller_for(&server);
    controller.load_more().await;

    assert_eq!(controller.load_more().await, LoadOutcome::EmptyPage);
    let view = controller.view().await;
    assert_eq!(view.items.len(), 1);
    assert!(view.has_next_page);
}

#[tokio::test]
async fn test_load_all_follows_cursors() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        None,
        connection(
            vec![
                node("cus_1", "a@example.com", None),
                node("cus_2", "b@example.com", None),
            ],
            Some("cus_2"),
            true,
        ),
    )
    .await;
    mount_page(
        &server,
        Some("cus_2"),
        connection(
            vec![
                node("cus_3", "c@example.com", None),
                node("cus_4", "d@example.com", None),
            ],
            Some("cus_4"),
            true,
        ),
    )
    .await;
    mount_page(
        &server,
        Some("cus_4"),
        connection(vec![node("cus_5", "e@example.com", None)], Some("cus_5"), false),
    )
    .await;

    let controller = controller_for(&server);
    let outcome = controller.load_all(None).await;

    assert_eq!(
        outcome,
        LoadOutcome::Merged {
            appended: 1,
            has_next_page: false
        }
    );
    assert_eq!(controller.len().await, 5);

    let requests = server.received_requests().await.unwrap();
    let limits: Vec<u64> = requests
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["variables"]["limit"].as_u64().unwrap()
        })
        .collect();
    assert_eq!(limits, vec![2, 2, 2]);
}
