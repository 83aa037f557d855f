//! Generic resource and collection behaviour against a wiremock API.

use apify_client::{
    ApifyClient, ApifyError, DatasetUpdate, Delete, Get, GetOrCreate, List, StorageListQuery,
    Update,
};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApifyClient {
    ApifyClient::new(Some("test-token"), &server.uri()).unwrap()
}

fn not_found_body() -> serde_json::Value {
    json!({"error": {"type": "record-not-found", "message": "Dataset was not found"}})
}

#[tokio::test]
async fn test_get_dataset_unwraps_data_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/datasets/ds1"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "ds1",
                "name": "products",
                "itemCount": 12,
                "createdAt": "2019-12-12T07:34:14.202Z"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dataset = client(&mock_server)
        .dataset("ds1")
        .get()
        .await
        .unwrap()
        .expect("dataset should exist");

    assert_eq!(dataset.id, "ds1");
    assert_eq!(dataset.item_count, Some(12));
}

#[tokio::test]
async fn test_get_missing_resources_returns_none() {
    let mock_server = MockServer::start().await;

    for resource in ["datasets", "key-value-stores", "request-queues"] {
        Mock::given(method("GET"))
            .and(path(format!("/v2/{resource}/missing")))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
            .mount(&mock_server)
            .await;
    }

    let client = client(&mock_server);
    assert!(client.dataset("missing").get().await.unwrap().is_none());
    assert!(client.key_value_store("missing").get().await.unwrap().is_none());
    assert!(client
        .request_queue("missing", None)
        .get()
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_token_not_found_is_also_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/datasets/private"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"type": "record-or-token-not-found", "message": "Not found"}
        })))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).dataset("private").get().await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_other_404_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/datasets/ds1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"type": "page-not-found", "message": "No such endpoint"}
        })))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).dataset("ds1").get().await.unwrap_err();
    match err {
        ApifyError::Api {
            status_code,
            error_type,
            message,
            method,
            ..
        } => {
            assert_eq!(status_code, 404);
            assert_eq!(error_type.as_deref(), Some("page-not-found"));
            assert_eq!(message, "No such endpoint");
            assert_eq!(method, "GET");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_carries_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/datasets/ds1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).dataset("ds1").get().await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    assert!(!err.is_not_found());
    assert!(err.to_string().contains("Service Unavailable"));
}

#[tokio::test]
async fn test_missing_data_envelope_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/datasets/ds1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ds1"})))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).dataset("ds1").get().await.unwrap_err();
    assert!(matches!(err, ApifyError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_update_sends_only_set_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/datasets/ds1"))
        .and(body_json(json!({"name": "renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "ds1", "name": "renamed"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dataset = client(&mock_server)
        .dataset("ds1")
        .update(&DatasetUpdate {
            name: Some("renamed".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(dataset.name.as_deref(), Some("renamed"));
}

#[tokio::test]
async fn test_delete_ignores_missing_resource() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/datasets/ds1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/datasets/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client.dataset("ds1").delete().await.unwrap();
    client.dataset("gone").delete().await.unwrap();
}

#[tokio::test]
async fn test_list_datasets_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/datasets"))
        .and(query_param("unnamed", "1"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "total": 3,
                "offset": 0,
                "limit": 2,
                "count": 2,
                "desc": false,
                "items": [{"id": "a"}, {"id": "b"}]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = client(&mock_server)
        .datasets()
        .list(&StorageListQuery {
            unnamed: Some(true),
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.len(), 2);
    assert!(page.has_more());
    assert_eq!(page.items[1].id, "b");
}

#[tokio::test]
async fn test_list_all_fetches_every_page() {
    let mock_server = MockServer::start().await;

    let first: Vec<_> = (0..1000).map(|i| json!({"id": format!("ds{i}")})).collect();
    Mock::given(method("GET"))
        .and(path("/v2/webhooks"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"total": 1001, "offset": 0, "limit": 1000, "count": 1000, "items": first}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/webhooks"))
        .and(query_param("offset", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"total": 1001, "offset": 1000, "limit": 1000, "count": 1, "items": [{"id": "last"}]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let all = client(&mock_server).webhooks().list_all().await.unwrap();
    assert_eq!(all.len(), 1001);
    assert_eq!(all[1000].id, "last");
}

#[tokio::test]
async fn test_get_or_create_sends_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/key-value-stores"))
        .and(query_param("name", "cache"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "kvs1", "name": "cache"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = client(&mock_server)
        .key_value_stores()
        .get_or_create(Some("cache"))
        .await
        .unwrap();

    assert_eq!(store.id, "kvs1");
}

#[tokio::test]
async fn test_anonymous_client_sends_no_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/datasets/public"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/datasets/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "public"}})))
        .mount(&mock_server)
        .await;

    let client = ApifyClient::new(None, &mock_server.uri()).unwrap();
    let dataset = client.dataset("public").get().await.unwrap();
    assert!(dataset.is_some());
}
