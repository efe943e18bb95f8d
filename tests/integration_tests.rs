//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: catalog operation → HTTP requests → emitted items

use futures::StreamExt;
use omics_pager::config::Settings;
use omics_pager::http::HttpClient;
use omics_pager::operations::{
    builtin_catalog, execute, lookup, HttpPageFetcher, ListInvocation, OperationDefinition,
};
use omics_pager::pagination::{item_stream, PaginationPolicy, PaginationSummary};
use omics_pager::{Error, JsonValue, Result};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::from_yaml_str(
        r#"
http:
  max_retries: 0
  backoff:
    type: constant
    initial_delay_ms: 1
    max_delay_ms: 1
  rate_limit: null
"#,
    )
    .unwrap();
    settings.endpoint_url = Some(server.uri());
    settings
}

fn fetcher_for(settings: &Settings, operation: &str) -> (OperationDefinition, HttpPageFetcher) {
    let catalog = builtin_catalog().unwrap();
    let definition = lookup(&catalog, operation).unwrap().clone();
    let client =
        HttpClient::with_config(settings.http_client_config(settings.endpoint_for(&definition)))
            .unwrap();
    (definition.clone(), HttpPageFetcher::new(client, definition))
}

async fn run(
    settings: &Settings,
    operation: &str,
    invocation: &ListInvocation,
) -> (Result<PaginationSummary>, Vec<JsonValue>) {
    let (definition, fetcher) = fetcher_for(settings, operation);
    let mut out = Vec::new();
    let result = execute(
        &definition,
        invocation,
        &fetcher,
        &settings.pagination_policy(),
        &CancellationToken::new(),
        |value| {
            out.push(value);
            Ok(())
        },
    )
    .await;
    (result, out)
}

async fn mount_run_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/run"))
        .and(query_param_is_missing("startingToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "1"}, {"id": "2"}],
            "nextToken": "page-2"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/run"))
        .and(query_param("startingToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "3"}]
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Auto-pagination
// ============================================================================

#[tokio::test]
async fn test_list_runs_follows_starting_token() {
    let server = MockServer::start().await;
    mount_run_pages(&server).await;

    let (result, items) = run(&settings_for(&server), "ListRuns", &ListInvocation::new()).await;

    let summary = result.unwrap();
    assert_eq!(items, vec![json!({"id": "1"}), json!({"id": "2"}), json!({"id": "3"})]);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.next_token, None);
}

#[tokio::test]
async fn test_list_read_sets_posts_to_store_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sequencestore/1234567890/readsets"))
        .and(query_param("maxResults", "2"))
        .and(query_param_is_missing("nextToken"))
        .and(body_json(json!({"filter": {"status": "ACTIVE"}})))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "readSets": [{"id": "rs-1"}, {"id": "rs-2"}],
            "nextToken": "next"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sequencestore/1234567890/readsets"))
        .and(query_param("nextToken", "next"))
        .and(body_json(json!({"filter": {"status": "ACTIVE"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "readSets": [{"id": "rs-3"}],
            "nextToken": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let invocation = ListInvocation::new()
        .param("sequenceStoreId", "1234567890")
        .param("filter", r#"{"status": "ACTIVE"}"#)
        .max_results(2);
    let (result, items) = run(&settings_for(&server), "ListReadSets", &invocation).await;

    result.unwrap();
    assert_eq!(
        items,
        vec![json!({"id": "rs-1"}), json!({"id": "rs-2"}), json!({"id": "rs-3"})]
    );
}

// ============================================================================
// Caller-controlled paging
// ============================================================================

#[tokio::test]
async fn test_single_page_policy_stops_after_first_page() {
    let server = MockServer::start().await;
    mount_run_pages(&server).await;

    let mut settings = settings_for(&server);
    settings.iteration_mode = omics_pager::IterationMode::SinglePage;
    let (result, items) = run(&settings, "ListRuns", &ListInvocation::new()).await;

    let summary = result.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(summary.next_token.as_deref(), Some("page-2"));
    assert!(summary.has_more());
}

#[tokio::test]
async fn test_next_token_fetches_exactly_one_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/run"))
        .and(query_param_is_missing("startingToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/run"))
        .and(query_param("startingToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "3"}],
            "nextToken": "page-3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (result, items) = run(
        &settings_for(&server),
        "ListRuns",
        &ListInvocation::new().next_token("page-2"),
    )
    .await;

    let summary = result.unwrap();
    assert_eq!(items, vec![json!({"id": "3"})]);
    assert_eq!(summary.next_token.as_deref(), Some("page-3"));
}

#[tokio::test]
async fn test_raw_response_selector_emits_last_page() {
    let server = MockServer::start().await;
    mount_run_pages(&server).await;

    let (result, items) = run(
        &settings_for(&server),
        "ListRuns",
        &ListInvocation::new().select("*"),
    )
    .await;

    result.unwrap();
    assert_eq!(items, vec![json!({"items": [{"id": "3"}]})]);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_service_error_mid_stream_keeps_emitted_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/run"))
        .and(query_param_is_missing("startingToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "1"}, {"id": "2"}],
            "nextToken": "page-2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/run"))
        .and(query_param("startingToken", "page-2"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header(
                    "x-amzn-ErrorType",
                    "ValidationException:http://internal.amazon.com/coral/com.amazonaws.omics/",
                )
                .set_body_json(json!({"message": "startingToken is invalid"})),
        )
        .mount(&server)
        .await;

    let (result, items) = run(&settings_for(&server), "ListRuns", &ListInvocation::new()).await;

    assert_eq!(items.len(), 2);
    let err = result.unwrap_err();
    match &err {
        Error::Page { operation, .. } => assert_eq!(operation, "ListRuns"),
        other => panic!("expected page error, got {other:?}"),
    }
    match err.root() {
        Error::Service {
            status,
            code,
            message,
        } => {
            assert_eq!(*status, 400);
            assert_eq!(code, "ValidationException");
            assert_eq!(message, "startingToken is invalid");
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_invocation_sends_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"readSets": []})))
        .expect(0)
        .mount(&server)
        .await;

    let invocation = ListInvocation::new()
        .param("sequenceStoreId", "1234567890")
        .select("*")
        .pass_thru();
    let (result, items) = run(&settings_for(&server), "ListReadSets", &invocation).await;

    assert!(matches!(result, Err(Error::ConflictingParameters { .. })));
    assert!(items.is_empty());
}

// ============================================================================
// Lazy stream
// ============================================================================

#[tokio::test]
async fn test_item_stream_over_http() {
    let server = MockServer::start().await;
    mount_run_pages(&server).await;

    let settings = settings_for(&server);
    let (definition, fetcher) = fetcher_for(&settings, "ListRuns");
    let (request, _, _) = ListInvocation::new().prepare(&definition).unwrap();

    let items: Vec<JsonValue> = item_stream(
        &fetcher,
        request,
        false,
        PaginationPolicy::default(),
        CancellationToken::new(),
    )
    .map(|item| item.unwrap())
    .collect()
    .await;

    assert_eq!(items, vec![json!({"id": "1"}), json!({"id": "2"}), json!({"id": "3"})]);
}
