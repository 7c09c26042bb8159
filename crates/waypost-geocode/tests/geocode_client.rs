//! Integration tests for `GeocodeClient`.
//!
//! Uses `wiremock` so no real network traffic is made. Covers candidate
//! parsing, region disambiguation, the never-throws degradation contract,
//! and the process-lifetime cache (hits and misses both counted via
//! `expect(..)` on the mock).

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use waypost_geocode::GeocodeClient;

fn test_client(server: &MockServer) -> GeocodeClient {
    GeocodeClient::new(&server.uri(), Some("test-key".to_owned()), 5)
        .expect("failed to build test GeocodeClient")
}

fn suggestion(city: &str, region: &str, lat: &str, lon: &str) -> serde_json::Value {
    json!({
        "value": format!("{region}, {city}"),
        "data": {
            "city": city,
            "region_with_type": region,
            "postal_code": "170100",
            "city_fias_id": format!("fias-{city}"),
            "geo_lat": lat,
            "geo_lon": lon
        }
    })
}

#[tokio::test]
async fn resolve_extracts_fields_from_top_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .and(header("authorization", "Token test-key"))
        .and(body_partial_json(json!({"query": "Tver Sovetskaya 12", "count": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "suggestions": [
                suggestion("Tver", "Tverskaya oblast", "56.8587", "35.9176"),
                suggestion("Tver", "Somewhere else", "0.0", "0.0")
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let resolved = client
        .resolve("Tver Sovetskaya 12")
        .await
        .expect("top candidate should resolve");

    assert_eq!(resolved.city.as_deref(), Some("Tver"));
    assert_eq!(resolved.region.as_deref(), Some("Tverskaya oblast"));
    assert_eq!(resolved.postal_code.as_deref(), Some("170100"));
    assert_eq!(resolved.admin_id.as_deref(), Some("fias-Tver"));
    let point = resolved.point.expect("coordinates should parse");
    assert!((point.lat - 56.8587).abs() < 1e-9);
    assert!((point.lon - 35.9176).abs() < 1e-9);
}

#[tokio::test]
async fn region_hint_selects_matching_candidate_over_top_ranked() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "suggestions": [
                suggestion("Kirov", "Kirovskaya oblast", "58.60", "49.66"),
                suggestion("Kirov", "Kaluzhskaya oblast", "54.08", "34.30")
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let resolved = client
        .resolve_in_region("Kirov", "kaluzhskaya")
        .await
        .expect("hinted candidate should resolve");

    assert_eq!(resolved.region.as_deref(), Some("Kaluzhskaya oblast"));
}

#[tokio::test]
async fn repeated_query_is_served_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "suggestions": [suggestion("Tver", "Tverskaya oblast", "56.85", "35.91")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let first = client.resolve("Tver").await;
    let second = client.resolve("Tver").await;
    assert_eq!(first, second);
    assert!(first.is_some());
    // expect(1) verifies the second call never reached the server.
}

#[tokio::test]
async fn negative_results_are_cached_too() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"suggestions": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.resolve("Nowhereville").await.is_none());
    assert!(client.resolve("Nowhereville").await.is_none());
}

#[tokio::test]
async fn server_error_degrades_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.resolve("Tver").await.is_none());
}

#[tokio::test]
async fn missing_api_key_short_circuits_without_network_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = GeocodeClient::new(&server.uri(), None, 5)
        .expect("failed to build keyless GeocodeClient");
    assert!(!client.is_configured());
    assert!(client.resolve("Tver").await.is_none());
}

#[tokio::test]
async fn blank_query_resolves_to_none() {
    let server = MockServer::start().await;
    let client = test_client(&server);
    assert!(client.resolve("   ").await.is_none());
}
