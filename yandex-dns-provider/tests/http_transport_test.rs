#![allow(clippy::unwrap_used)]
//! HTTP transport tests against a wiremock server.
//!
//! ```bash
//! cargo test -p yandex-dns-provider --test http_transport_test
//! ```

mod common;

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{FIXTURE_KEY_PATH, mock_config};
use yandex_dns_provider::{
    ClientConfig, CredentialSource, Operation, ProviderError, RecordSet, UpsertRequest,
    YandexDnsClient,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, YandexDnsClient) {
    let server = MockServer::start().await;
    let client = YandexDnsClient::connect(&mock_config(&server.uri()))
        .await
        .unwrap();
    (server, client)
}

fn zone_json(id: &str, zone: &str, private: bool) -> serde_json::Value {
    let mut z = json!({
        "id": id,
        "folderId": "b1gtestfolder",
        "zone": zone,
        "publicVisibility": {}
    });
    if private {
        z["privateVisibility"] = json!({ "networkIds": ["enp1"] });
    }
    z
}

fn key_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(
        "b1gtestfolder",
        CredentialSource::ServiceAccountKeyFile(FIXTURE_KEY_PATH.into()),
    )
    .endpoint(format!("{}/dns/v1", server.uri()))
    .iam_endpoint(format!("{}/iam/v1/tokens", server.uri()))
}

// ── Zone listing ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_zones_follows_page_tokens() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .and(query_param("folderId", "b1gtestfolder"))
        .and(query_param("pageSize", "1000"))
        .and(query_param_is_missing("pageToken"))
        .and(header("authorization", "Bearer t1.mock-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dnsZones": [
                zone_json("dns1", "example.com.", false),
                zone_json("dns2", "internal.", true)
            ],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dnsZones": [zone_json("dns3", "example.org.", false)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let zones = client.list_zones().await.unwrap();

    let ids: Vec<&str> = zones.iter().map(|z| z.id.as_str()).collect();
    assert_eq!(ids, ["dns1", "dns2", "dns3"]);
    assert_eq!(zones[0].name, "example.com.");
    assert!(!zones[0].is_private);
    assert!(zones[1].is_private);
    assert_eq!(zones[2].folder_id, "b1gtestfolder");
}

#[tokio::test]
async fn test_list_zones_empty_folder() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.list_zones().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_zones_second_page_failure_returns_nothing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dnsZones": [zone_json("dns1", "example.com.", false)],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "code": 13, "message": "internal error" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client.list_zones().await.unwrap_err();
    assert_eq!(err.operation, Operation::ListZones);
    assert!(
        matches!(err.kind(), ProviderError::Unknown { raw_code: Some(code), .. } if code == "INTERNAL"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_list_zones_unauthenticated() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "code": 16, "message": "The token has expired" })),
        )
        .mount(&server)
        .await;

    let err = client.list_zones().await.unwrap_err();
    assert!(
        matches!(err.kind(), ProviderError::InvalidCredentials { .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_list_zones_retries_transient_failure_when_enabled() {
    let server = MockServer::start().await;
    let client = YandexDnsClient::connect(&mock_config(&server.uri()).max_read_retries(2))
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dnsZones": [zone_json("dns1", "example.com.", false)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let zones = client.list_zones().await.unwrap();
    assert_eq!(zones.len(), 1);
}

#[tokio::test]
async fn test_list_zones_no_retry_by_default() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.list_zones().await.unwrap_err();
    assert!(err.is_retryable());
}

// ── Record set listing ──────────────────────────────────────────────

#[tokio::test]
async fn test_list_record_sets_maps_fields() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones/dns1:listRecordSets"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordSets": [
                { "name": "www.example.com.", "type": "A", "ttl": "300", "data": ["1.2.3.4"] },
                { "name": "example.com.", "type": "TXT", "ttl": "60", "data": ["\"b\"", "\"a\""] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record_sets = client.list_record_sets("dns1").await.unwrap();

    assert_eq!(
        record_sets,
        [
            RecordSet::new("www.example.com.", "A", 300, ["1.2.3.4"]),
            RecordSet::new("example.com.", "TXT", 60, ["\"b\"", "\"a\""]),
        ]
    );
}

#[tokio::test]
async fn test_list_record_sets_follows_page_tokens() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones/dns1:listRecordSets"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordSets": [{ "name": "a.example.com.", "type": "A", "ttl": "300", "data": ["10.0.0.1"] }],
            "nextPageToken": "rs-2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones/dns1:listRecordSets"))
        .and(query_param("pageToken", "rs-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordSets": [{ "name": "b.example.com.", "type": "A", "ttl": 300, "data": ["10.0.0.2"] }]
        })))
        .mount(&server)
        .await;

    let record_sets = client.list_record_sets("dns1").await.unwrap();
    let names: Vec<&str> = record_sets.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["a.example.com.", "b.example.com."]);
}

#[tokio::test]
async fn test_list_record_sets_unknown_zone() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones/nope:listRecordSets"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "code": 5, "message": "DNS zone nope not found" })),
        )
        .mount(&server)
        .await;

    let err = client.list_record_sets("nope").await.unwrap_err();
    assert_eq!(err.operation, Operation::ListRecordSets);
    assert!(
        matches!(err.kind(), ProviderError::ZoneNotFound { zone_id, .. } if zone_id == "nope"),
        "unexpected error: {err:?}"
    );
}

// ── Upsert ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upsert_sends_one_request_with_all_buckets() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dns/v1/zones/dns1:upsertRecordSets"))
        .and(header("authorization", "Bearer t1.mock-token"))
        .and(body_json(json!({
            "deletions": [
                { "name": "old.example.com.", "type": "A", "ttl": "300", "data": ["10.0.0.1"] }
            ],
            "replacements": [
                { "name": "www.example.com.", "type": "A", "ttl": "300", "data": ["10.0.0.2", "10.0.0.3"] },
                { "name": "api.example.com.", "type": "CNAME", "ttl": "600", "data": ["www.example.com."] }
            ],
            "merges": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "dnsop1",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = UpsertRequest::new("dns1")
        .delete(RecordSet::new("old.example.com.", "A", 300, ["10.0.0.1"]))
        .replace(RecordSet::new(
            "www.example.com.",
            "A",
            300,
            ["10.0.0.2", "10.0.0.3"],
        ))
        .replace(RecordSet::new(
            "api.example.com.",
            "CNAME",
            600,
            ["www.example.com."],
        ));

    client.upsert_record_sets(&request).await.unwrap();
}

#[tokio::test]
async fn test_upsert_empty_request_is_sent() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dns/v1/zones/dns1:upsertRecordSets"))
        .and(body_json(json!({ "deletions": [], "replacements": [], "merges": [] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "dnsop2" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .upsert_record_sets(&UpsertRequest::new("dns1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upsert_is_never_retried() {
    let server = MockServer::start().await;
    let client = YandexDnsClient::connect(&mock_config(&server.uri()).max_read_retries(3))
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/dns/v1/zones/dns1:upsertRecordSets"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .upsert_record_sets(
            &UpsertRequest::new("dns1").merge(RecordSet::new("a.", "A", 300, ["10.0.0.1"])),
        )
        .await
        .unwrap_err();

    assert_eq!(err.operation, Operation::UpsertRecordSets);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_upsert_operation_error_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dns/v1/zones/dns1:upsertRecordSets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "dnsop3",
            "done": true,
            "error": { "code": 3, "message": "invalid TTL" }
        })))
        .mount(&server)
        .await;

    let err = client
        .upsert_record_sets(
            &UpsertRequest::new("dns1").replace(RecordSet::new("a.", "A", 0, ["10.0.0.1"])),
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err.kind(), ProviderError::InvalidParameter { detail, .. } if detail == "invalid TTL"),
        "unexpected error: {err:?}"
    );
    assert!(err.to_string().starts_with("failed to upsert record sets: "));
}

#[tokio::test]
async fn test_upsert_conflicting_buckets_never_hits_the_wire() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let request = UpsertRequest::new("dns1")
        .replace(RecordSet::new("www.", "A", 300, ["10.0.0.1"]))
        .merge(RecordSet::new("www.", "A", 300, ["10.0.0.2"]));

    let err = client.upsert_record_sets(&request).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        ProviderError::ConflictingBuckets { .. }
    ));
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_service_account_key_is_exchanged_for_iam_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/iam/v1/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "iamToken": "t1.exchanged",
            "expiresAt": (Utc::now() + chrono::Duration::hours(12)).to_rfc3339()
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .and(header("authorization", "Bearer t1.exchanged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let client = YandexDnsClient::connect(&key_config(&server)).await.unwrap();
    client.list_zones().await.unwrap();
    client.list_zones().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let exchange = requests
        .iter()
        .find(|r| r.url.path() == "/iam/v1/tokens")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&exchange.body).unwrap();
    assert_eq!(body["jwt"].as_str().unwrap().split('.').count(), 3);
}

#[tokio::test]
async fn test_token_close_to_expiry_is_refreshed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/iam/v1/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "iamToken": "t1.short-lived",
            "expiresAt": (Utc::now() + chrono::Duration::seconds(60)).to_rfc3339()
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = YandexDnsClient::connect(&key_config(&server)).await.unwrap();
    client.list_zones().await.unwrap();
}

#[tokio::test]
async fn test_rejected_key_fails_construction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/iam/v1/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 16,
            "message": "Key not found"
        })))
        .mount(&server)
        .await;

    let err = YandexDnsClient::connect(&key_config(&server))
        .await
        .unwrap_err();

    assert_eq!(err.operation, Operation::Connect);
    assert!(matches!(
        err.kind(),
        ProviderError::InvalidCredentials { .. }
    ));
    assert!(err.to_string().starts_with("failed to build client: "));
}

#[tokio::test]
async fn test_missing_key_file_fails_before_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = ClientConfig::new(
        "b1gtestfolder",
        CredentialSource::ServiceAccountKeyFile("/nonexistent/authorized_key.json".into()),
    )
    .iam_endpoint(format!("{}/iam/v1/tokens", server.uri()));

    let err = YandexDnsClient::connect(&config).await.unwrap_err();
    assert!(matches!(err.kind(), ProviderError::Configuration { .. }));
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancellation_aborts_in_flight_listing() {
    let server = MockServer::start().await;
    let cancel = CancellationToken::new();
    let client =
        YandexDnsClient::connect_with_cancellation(&mock_config(&server.uri()), cancel.clone())
            .await
            .unwrap();

    Mock::given(method("GET"))
        .and(path("/dns/v1/zones"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "dnsZones": [zone_json("dns1", "example.com.", false)] }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let err = client.list_zones().await.unwrap_err();
    assert!(err.is_cancelled(), "unexpected error: {err:?}");
    assert_eq!(err.operation, Operation::ListZones);
}
