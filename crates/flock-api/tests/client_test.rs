#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flock_api::{ApiClient, Error, ListQuery, TransportConfig};

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: i64,
    name: String,
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::with_client(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sends_range_and_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/members"))
        .and(query_param("rangeStart", "10"))
        .and(query_param("rangeEnd", "19"))
        .and(query_param("name", "Grace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 11, "name": "Grace Hopper" }],
            "total": 11
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = BTreeMap::new();
    params.insert("name".to_string(), "Grace".to_string());
    let query = ListQuery::new(10, 19).with_params(params);

    let page = client.list::<Row>("members", &query).await.unwrap();

    assert_eq!(page.total, 11);
    assert_eq!(
        page.results,
        vec![Row {
            id: 11,
            name: "Grace Hopper".into()
        }]
    );
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;
    let client =
        ApiClient::with_client(&format!("{}/api/v2", server.uri()), reqwest::Client::new())
            .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v2/fellowships"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [], "total": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .list::<Row>("fellowships", &ListQuery::new(0, 9))
        .await
        .unwrap();
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let token: secrecy::SecretString = "s3cret".to_string().into();
    let client = ApiClient::new(&server.uri(), &TransportConfig::default(), Some(&token)).unwrap();

    Mock::given(method("GET"))
        .and(path("/members"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [], "total": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .list::<Row>("members", &ListQuery::new(0, 9))
        .await
        .unwrap();
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_forbidden_maps_to_permission_denied() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "forbidden",
            "capability": "members:view"
        })))
        .mount(&server)
        .await;

    let result = client.list::<Row>("members", &ListQuery::new(0, 9)).await;

    match result {
        Err(Error::PermissionDenied { capability }) => assert_eq!(capability, "members:view"),
        other => panic!("expected PermissionDenied, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_maps_to_unauthenticated() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list::<Row>("members", &ListQuery::new(0, 9)).await;
    assert!(
        matches!(result, Err(Error::Unauthenticated)),
        "expected Unauthenticated, got: {result:?}"
    );
}

#[tokio::test]
async fn test_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client
        .list::<Row>("nope", &ListQuery::new(0, 9))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
}

#[tokio::test]
async fn test_server_error_carries_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "database offline" })),
        )
        .mount(&server)
        .await;

    let err = client
        .list::<Row>("members", &ListQuery::new(0, 9))
        .await
        .unwrap_err();

    match &err {
        Error::Server { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("expected Server error, got: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"rows\": []}"))
        .mount(&server)
        .await;

    let result = client.list::<Row>("members", &ListQuery::new(0, 9)).await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
