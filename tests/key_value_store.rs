//! Key-value store records and keys against a wiremock API.

use apify_client::{ApifyClient, ApifyError, Delete, Get, ListKeysOptions};
use serde_json::json;
use wiremock::matchers::{any, body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApifyClient {
    ApifyClient::new(Some("test-token"), &server.uri()).unwrap()
}

#[tokio::test]
async fn test_get_json_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/key-value-stores/kvs1/records/INPUT"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"startUrls": ["https://example.com"]}"#, "application/json; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let record = client(&mock_server)
        .key_value_store("kvs1")
        .get_record("INPUT")
        .await
        .unwrap()
        .expect("record should exist");

    assert_eq!(record.key, "INPUT");
    assert_eq!(record.value["startUrls"][0], "https://example.com");
    assert!(record
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/json")));
}

#[tokio::test]
async fn test_get_binary_record_bytes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/key-value-stores/kvs1/records/screenshot"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"))
        .mount(&mock_server)
        .await;

    let store = client(&mock_server).key_value_store("kvs1");
    let record = store
        .get_record_bytes("screenshot")
        .await
        .unwrap()
        .expect("record should exist");
    assert_eq!(&record.value[..], &[0x89, 0x50, 0x4e, 0x47]);
    assert_eq!(record.content_type.as_deref(), Some("image/png"));

    // Not UTF-8, so the decoding accessor refuses it
    assert!(store.get_record("screenshot").await.is_err());
}

#[tokio::test]
async fn test_missing_record_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/key-value-stores/kvs1/records/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"type": "record-not-found", "message": "Record was not found"}
        })))
        .mount(&mock_server)
        .await;

    let record = client(&mock_server)
        .key_value_store("kvs1")
        .get_record("nope")
        .await
        .unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn test_set_record_sends_json_with_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/key-value-stores/kvs1/records/OUTPUT"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(body_json(json!({"ok": true})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .key_value_store("kvs1")
        .set_record("OUTPUT", &json!({"ok": true}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_record_bytes_keeps_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/key-value-stores/kvs1/records/notes.txt"))
        .and(header("content-type", "text/plain"))
        .and(body_string("hello"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .key_value_store("kvs1")
        .set_record_bytes("notes.txt", "hello", "text/plain")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/key-value-stores/kvs1/records/OUTPUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .key_value_store("kvs1")
        .delete_record("OUTPUT")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_keys_with_start_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/key-value-stores/kvs1/keys"))
        .and(query_param("limit", "1"))
        .and(query_param("exclusiveStartKey", "INPUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "items": [{"key": "OUTPUT", "size": 11}],
                "count": 1,
                "limit": 1,
                "exclusiveStartKey": "INPUT",
                "isTruncated": true,
                "nextExclusiveStartKey": "OUTPUT"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let keys = client(&mock_server)
        .key_value_store("kvs1")
        .list_keys(&ListKeysOptions {
            limit: Some(1),
            exclusive_start_key: Some("INPUT".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(keys.items[0].key, "OUTPUT");
    assert_eq!(keys.items[0].size, 11);
    assert!(keys.is_truncated);
}

#[tokio::test]
async fn test_dot_keys_never_leave_the_record_path() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let store = client.key_value_store("kvs1");
    for key in ["..", "."] {
        let err = store.delete_record(key).await.unwrap_err();
        assert!(matches!(err, ApifyError::InvalidArgument(_)), "key {key}");
        assert!(store.get_record(key).await.is_err(), "key {key}");
        assert!(store
            .set_record_bytes(key, "x", "text/plain")
            .await
            .is_err());
    }

    let parent = client.key_value_store("..");
    assert!(matches!(
        parent.delete().await.unwrap_err(),
        ApifyError::InvalidArgument(_)
    ));
    assert!(parent.get().await.is_err());
}

#[tokio::test]
async fn test_dotted_key_is_sent_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/key-value-stores/kvs1/records/.hidden..txt"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .key_value_store("kvs1")
        .delete_record(".hidden..txt")
        .await
        .unwrap();
}
