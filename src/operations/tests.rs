//! Tests for operations module

use super::*;
use crate::error::{Error, Result};
use crate::pagination::{PageFetcher, PagedResponse, PaginationPolicy};
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use test_case::test_case;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

fn catalog() -> OperationCatalog {
    builtin_catalog().unwrap()
}

fn definition(name: &str) -> OperationDefinition {
    lookup(&catalog(), name).unwrap().clone()
}

// ============================================================================
// Catalog
// ============================================================================

#[test]
fn test_builtin_catalog_loads() {
    let catalog = catalog();
    assert_eq!(catalog.kind, "operations");
    assert_eq!(catalog.service.as_deref(), Some("omics"));
    assert_eq!(catalog.len(), 19);
    assert!(catalog.get("ListAnnotationStores").is_some());
    assert!(catalog.get("ListRuns").is_some());
}

#[test]
fn test_builtin_list_runs_definition() {
    let op = definition("ListRuns");
    assert_eq!(op.endpoint_prefix, "workflows");
    assert_eq!(op.method, Method::GET);
    assert_eq!(op.path, "/run");
    assert_eq!(op.token_param, "startingToken");
    assert_eq!(op.max_results_param, "maxResults");
    assert_eq!(op.items_field, "items");
    assert_eq!(op.next_token_field, "nextToken");
}

#[test]
fn test_lookup_is_case_insensitive() {
    let catalog = catalog();
    assert_eq!(lookup(&catalog, "listreadsets").unwrap().name, "ListReadSets");
    assert!(matches!(
        lookup(&catalog, "ListNothing"),
        Err(Error::UnknownOperation { .. })
    ));
}

#[test]
fn test_path_placeholders() {
    assert_eq!(
        path_placeholders("/sequencestore/{sequenceStoreId}/upload/{uploadId}/parts"),
        vec!["sequenceStoreId", "uploadId"]
    );
    assert!(path_placeholders("/run").is_empty());
}

#[test_case(
    r#"
operations:
  - name: ListThings
    endpoint_prefix: x
    path: /things/{id}
    items_field: things
"#,
    "has no parameter" ; "placeholder without parameter"
)]
#[test_case(
    r#"
operations:
  - name: ListThings
    endpoint_prefix: x
    path: /things
    items_field: things
    params:
      - { name: id, location: path, required: true }
"#,
    "does not appear" ; "path parameter not in route"
)]
#[test_case(
    r#"
operations:
  - name: ListThings
    endpoint_prefix: x
    path: /things/{id}
    items_field: things
    params:
      - { name: id, location: query }
"#,
    "must be a required path parameter" ; "placeholder bound to query parameter"
)]
#[test_case(
    r#"
operations:
  - { name: ListThings, endpoint_prefix: x, path: /a, items_field: a }
  - { name: listthings, endpoint_prefix: x, path: /b, items_field: b }
"#,
    "Duplicate operation" ; "duplicate names"
)]
#[test_case(
    r#"
operations:
  - name: ListThings
    endpoint_prefix: x
    path: /things
    items_field: things
    pass_thru: owner
"#,
    "pass_thru 'owner'" ; "unknown pass thru"
)]
#[test_case(
    r#"
operations:
  - name: ListThings
    endpoint_prefix: x
    path: /things
    items_field: things
    params:
      - { name: nextToken, location: query }
"#,
    "clashes with the paging parameters" ; "parameter named like the token"
)]
#[test_case(
    r#"
operations:
  - { name: ListThings, endpoint_prefix: x, path: things, items_field: things }
"#,
    "must start with '/'" ; "relative path"
)]
#[test_case("kind: connector\noperations: []\n", "Expected kind" ; "wrong kind")]
fn test_catalog_validation(yaml: &str, expected: &str) {
    let err = load_catalog_from_str(yaml).unwrap_err();
    assert!(
        err.to_string().contains(expected),
        "'{err}' should contain '{expected}'"
    );
}

#[test]
fn test_load_catalog_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.yaml");
    std::fs::write(
        &path,
        "operations:\n  - { name: ListThings, endpoint_prefix: things, path: /things, items_field: things }\n",
    )
    .unwrap();

    let catalog = load_catalog(&path).unwrap();
    assert_eq!(catalog.len(), 1);
    // Defaults fill the paging fields
    let op = catalog.get("ListThings").unwrap();
    assert_eq!(op.token_param, "nextToken");
    assert_eq!(op.method, Method::GET);

    let missing = load_catalog(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(missing, Error::FileNotFound { .. }));
}

// ============================================================================
// Requests and pages
// ============================================================================

#[test]
fn test_build_request_substitutes_path_and_body() {
    let op = definition("ListReadSets");
    let params = ListInvocation::new()
        .param("sequenceStoreId", "1234567890")
        .param("filter", r#"{"status":"ACTIVE"}"#)
        .params;

    let request = OperationRequest::build(&op, &params, Some(50), None).unwrap();

    assert_eq!(request.path, "/sequencestore/1234567890/readsets");
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.body.clone().map(JsonValue::Object),
        Some(json!({"filter": {"status": "ACTIVE"}}))
    );
    assert!(request.query.is_empty());
    assert_eq!(request.max_results, Some(50));
}

#[test]
fn test_build_request_encodes_path_segments() {
    let op = definition("ListAnnotationStoreVersions");
    let params = ListInvocation::new().param("name", "my store/v1").params;

    let request = OperationRequest::build(&op, &params, None, None).unwrap();
    assert_eq!(request.path, "/annotationStore/my%20store%2Fv1/versions");
}

#[test]
fn test_build_request_string_body_param() {
    let op = definition("ListShares");
    let params = ListInvocation::new().param("resourceOwner", "SELF").params;

    let request = OperationRequest::build(&op, &params, None, None).unwrap();
    assert_eq!(
        request.body.clone().map(JsonValue::Object),
        Some(json!({"resourceOwner": "SELF"}))
    );
}

#[test]
fn test_build_request_validation() {
    let op = definition("ListRunTasks");

    let err = OperationRequest::build(&op, &Default::default(), None, None).unwrap_err();
    assert!(matches!(err, Error::MissingParameter { ref parameter, .. } if parameter == "id"));

    let empty = ListInvocation::new().param("id", "").params;
    let err = OperationRequest::build(&op, &empty, None, None).unwrap_err();
    assert!(matches!(err, Error::MissingParameter { .. }));

    let unknown = ListInvocation::new()
        .param("id", "123")
        .param("colour", "blue")
        .params;
    let err = OperationRequest::build(&op, &unknown, None, None).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { ref parameter, .. } if parameter == "colour"));

    let bad_json = ListInvocation::new().param("filter", "{status").params;
    let err = OperationRequest::build(&definition("ListSequenceStores"), &bad_json, None, None)
        .unwrap_err();
    assert!(err.to_string().contains("expected JSON"));
}

#[test]
fn test_request_config_uses_operation_token_param() {
    let op = definition("ListRuns");
    let params = ListInvocation::new().param("status", "COMPLETED").params;
    let mut request =
        OperationRequest::build(&op, &params, Some(10), Some("tok-1".to_string())).unwrap();

    let config = request.to_request_config();
    assert_eq!(config.query.get("status"), Some(&"COMPLETED".to_string()));
    assert_eq!(config.query.get("startingToken"), Some(&"tok-1".to_string()));
    assert_eq!(config.query.get("maxResults"), Some(&"10".to_string()));
    assert!(config.body.is_none());

    crate::pagination::PagedRequest::set_token(&mut request, None);
    let config = request.to_request_config();
    assert!(!config.query.contains_key("startingToken"));
}

#[test]
fn test_json_page_items_and_token() {
    let op = definition("ListSequenceStores");
    let mut page = JsonPage::from_body(
        json!({"sequenceStores": [{"id": "1"}, {"id": "2"}], "nextToken": "abc"}),
        &op,
    )
    .unwrap();

    assert_eq!(page.next_token(), Some("abc"));
    assert_eq!(page.take_items(), vec![json!({"id": "1"}), json!({"id": "2"})]);
}

#[test]
fn test_json_page_missing_items_is_empty() {
    let op = definition("ListSequenceStores");
    let mut page = JsonPage::from_body(json!({}), &op).unwrap();
    assert_eq!(page.next_token(), None);
    assert!(page.take_items().is_empty());

    let mut page = JsonPage::from_body(json!({"sequenceStores": null}), &op).unwrap();
    assert!(page.take_items().is_empty());
}

#[test_case(json!([1, 2]), "expected a JSON object" ; "array body")]
#[test_case(json!({"sequenceStores": {"id": "1"}}), "should be an array" ; "items not array")]
#[test_case(json!({"sequenceStores": [], "nextToken": 5}), "should be a string" ; "token not string")]
fn test_json_page_rejects_malformed(body: JsonValue, expected: &str) {
    let err = JsonPage::from_body(body, &definition("ListSequenceStores")).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains(expected));
}

// ============================================================================
// Selectors
// ============================================================================

#[test_case("*", Selector::RawResponse ; "whole response")]
#[test_case("readSets", Selector::Items ; "items field")]
#[test_case("ReadSets", Selector::Items ; "items field any case")]
#[test_case("^sequenceStoreId", Selector::Parameter("sequenceStoreId".to_string()) ; "parameter")]
fn test_selector_parse(input: &str, expected: Selector) {
    assert_eq!(
        Selector::parse(input, &definition("ListReadSets")).unwrap(),
        expected
    );
}

#[test_case("bogus" ; "unknown field")]
#[test_case("^nope" ; "unknown parameter")]
fn test_selector_parse_rejects(input: &str) {
    let err = Selector::parse(input, &definition("ListReadSets")).unwrap_err();
    assert!(matches!(err, Error::InvalidSelector { .. }));
}

#[test]
fn test_invocation_selector_rules() {
    let op = definition("ListReadSets");

    let both = ListInvocation::new().select("*").pass_thru();
    assert!(matches!(
        both.selector(&op),
        Err(Error::ConflictingParameters { .. })
    ));

    let pass_thru = ListInvocation::new().pass_thru();
    assert_eq!(
        pass_thru.selector(&op).unwrap(),
        Selector::Parameter("sequenceStoreId".to_string())
    );

    let no_pass_thru_param = ListInvocation::new().pass_thru();
    let err = no_pass_thru_param
        .selector(&definition("ListRuns"))
        .unwrap_err();
    assert!(err.is_invocation_error());

    assert_eq!(ListInvocation::new().selector(&op).unwrap(), Selector::Items);
}

// ============================================================================
// Execution
// ============================================================================

/// Serves canned response bodies and records the requests it receives
struct CannedFetcher {
    definition: OperationDefinition,
    bodies: Mutex<VecDeque<Result<JsonValue>>>,
    requests: Mutex<Vec<OperationRequest>>,
}

impl CannedFetcher {
    fn new(definition: OperationDefinition, bodies: Vec<Result<JsonValue>>) -> Self {
        Self {
            definition,
            bodies: Mutex::new(bodies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for CannedFetcher {
    type Request = OperationRequest;
    type Response = JsonPage;

    async fn fetch_page(&self, request: &OperationRequest) -> Result<JsonPage> {
        self.requests.lock().unwrap().push(request.clone());
        let body = self
            .bodies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no canned body".to_string())))?;
        JsonPage::from_body(body, &self.definition)
    }
}

async fn execute_collect(
    fetcher: &CannedFetcher,
    invocation: &ListInvocation,
    policy: PaginationPolicy,
) -> (Result<crate::pagination::PaginationSummary>, Vec<JsonValue>) {
    let mut out = Vec::new();
    let result = execute(
        &fetcher.definition,
        invocation,
        fetcher,
        &policy,
        &CancellationToken::new(),
        |value| {
            out.push(value);
            Ok(())
        },
    )
    .await;
    (result, out)
}

fn run_pages() -> Vec<Result<JsonValue>> {
    vec![
        Ok(json!({"items": [{"id": "1"}, {"id": "2"}], "nextToken": "t1"})),
        Ok(json!({"items": [{"id": "3"}]})),
    ]
}

#[tokio::test]
async fn test_execute_flattens_items() {
    let fetcher = CannedFetcher::new(definition("ListRuns"), run_pages());

    let (result, out) =
        execute_collect(&fetcher, &ListInvocation::new(), PaginationPolicy::default()).await;

    let summary = assert_ok!(result);
    assert_eq!(
        out,
        vec![json!({"id": "1"}), json!({"id": "2"}), json!({"id": "3"})]
    );
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.items_emitted, 3);
    let requests = fetcher.requests.lock().unwrap();
    assert_eq!(requests[0].token, None);
    assert_eq!(requests[1].token.as_deref(), Some("t1"));
}

#[tokio::test]
async fn test_execute_raw_response() {
    let fetcher = CannedFetcher::new(definition("ListRuns"), run_pages());

    let (result, out) = execute_collect(
        &fetcher,
        &ListInvocation::new().select("*"),
        PaginationPolicy::default(),
    )
    .await;

    let summary = assert_ok!(result);
    assert_eq!(out, vec![json!({"items": [{"id": "3"}]})]);
    assert_eq!(summary.items_emitted, 1);
}

#[tokio::test]
async fn test_execute_parameter_selector_emits_value_once() {
    let fetcher = CannedFetcher::new(definition("ListRunTasks"), run_pages());

    let (result, out) = execute_collect(
        &fetcher,
        &ListInvocation::new().param("id", "9876").pass_thru(),
        PaginationPolicy::default(),
    )
    .await;

    let summary = assert_ok!(result);
    assert_eq!(out, vec![json!("9876")]);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.items_emitted, 1);
}

#[tokio::test]
async fn test_execute_select_with_pass_thru_makes_no_calls() {
    let fetcher = CannedFetcher::new(definition("ListReadSets"), run_pages());

    let (result, out) = execute_collect(
        &fetcher,
        &ListInvocation::new()
            .param("sequenceStoreId", "123")
            .select("*")
            .pass_thru(),
        PaginationPolicy::default(),
    )
    .await;

    let err = assert_err!(result);
    assert!(matches!(err, Error::ConflictingParameters { .. }));
    assert!(out.is_empty());
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_execute_missing_required_makes_no_calls() {
    let fetcher = CannedFetcher::new(definition("ListReadSets"), run_pages());

    let (result, _) =
        execute_collect(&fetcher, &ListInvocation::new(), PaginationPolicy::default()).await;

    assert!(matches!(result, Err(Error::MissingParameter { .. })));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_execute_manual_paging_with_next_token() {
    let fetcher = CannedFetcher::new(definition("ListRuns"), run_pages());

    let (result, out) = execute_collect(
        &fetcher,
        &ListInvocation::new().next_token("t0").max_results(2),
        PaginationPolicy::default(),
    )
    .await;

    let summary = assert_ok!(result);
    assert_eq!(out.len(), 2);
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(summary.next_token.as_deref(), Some("t1"));
    let requests = fetcher.requests.lock().unwrap();
    assert_eq!(requests[0].token.as_deref(), Some("t0"));
    assert_eq!(requests[0].max_results, Some(2));
}

#[tokio::test]
async fn test_execute_single_page_policy() {
    let fetcher = CannedFetcher::new(definition("ListRuns"), run_pages());

    let (result, out) =
        execute_collect(&fetcher, &ListInvocation::new(), PaginationPolicy::single_page()).await;

    assert_ok!(result);
    assert_eq!(out.len(), 2);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_execute_error_after_first_page() {
    let fetcher = CannedFetcher::new(
        definition("ListRuns"),
        vec![
            Ok(json!({"items": [1, 2, 3, 4, 5], "nextToken": "t1"})),
            Err(Error::page("ListRuns", Error::http_status(500, "boom"))),
        ],
    );

    let (result, out) =
        execute_collect(&fetcher, &ListInvocation::new(), PaginationPolicy::default()).await;

    let err = assert_err!(result);
    assert!(matches!(err.root(), Error::HttpStatus { status: 500, .. }));
    assert_eq!(out, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
}
