//! Integration tests for `CarrierClient`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made. Covers token caching, auth rejection, and typed
//! parsing for each of the three business endpoints.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use waypost_carrier::{CarrierClient, CarrierError, CityQuery, DeliveryPointQuery, TariffRequest};

fn test_client(server: &MockServer) -> CarrierClient {
    CarrierClient::new(&server.uri(), "test-id", "test-secret", 5)
        .expect("failed to build test CarrierClient")
}

/// Mounts a token endpoint that expects to be hit exactly `expected_calls`
/// times over the test.
async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "access_token": "test-token",
            "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Token cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn two_calls_within_token_lifetime_issue_one_token_request() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/deliverypoints"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = DeliveryPointQuery::by_city_code(44, None);
    for _ in 0..2 {
        let points = client
            .delivery_points(&query)
            .await
            .expect("delivery point call should succeed");
        assert!(points.is_empty());
    }
    // expect(1) on the token mock is verified when the server drops.
}

#[tokio::test]
async fn rejected_credentials_surface_as_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(&json!({"error": "invalid_client"})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.search_cities(&CityQuery::default()).await;

    match result {
        Err(CarrierError::Auth { status, detail }) => {
            assert_eq!(status, 401);
            assert!(detail.contains("invalid_client"));
        }
        other => panic!("expected Auth error, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// City search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_cities_parses_typed_records() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/location/cities"))
        .and(query_param("city", "Tver"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([{
            "code": 437,
            "city": "Tver",
            "region": "Tverskaya oblast",
            "fias_guid": "c52ea942-555e-45c6-9751-58897717b02f",
            "latitude": 56.8587,
            "longitude": 35.9176
        }])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = CityQuery {
        name: Some("Tver".to_owned()),
        ..CityQuery::default()
    };
    let cities = client
        .search_cities(&query)
        .await
        .expect("city search should succeed");

    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].code, 437);
    assert_eq!(
        cities[0].fias_guid.as_deref(),
        Some("c52ea942-555e-45c6-9751-58897717b02f")
    );
    let point = cities[0].point().expect("coordinates should be present");
    assert!((point.lat - 56.8587).abs() < 1e-9);
}

#[tokio::test]
async fn server_error_surfaces_as_unexpected_status() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/location/cities"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.search_cities(&CityQuery::default()).await;
    assert!(
        matches!(result, Err(CarrierError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus(503), got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Delivery points
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delivery_points_tolerate_missing_coordinates() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/deliverypoints"))
        .and(query_param("city_code", "437"))
        .and(query_param("fias_guid", "abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([
            {
                "code": "TVR1",
                "name": "Tver Central",
                "location": {
                    "address_full": "Tver, Sovetskaya 12",
                    "latitude": 56.859,
                    "longitude": 35.911
                },
                "work_time": "09:00-20:00",
                "phones": [{"number": "+7 482 200-00-00"}],
                "have_cash": true,
                "is_dressing_room": true
            },
            {
                "code": "TVR2",
                "location": { "address": "Tver, Volokolamsky 10" }
            }
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = DeliveryPointQuery::by_city_code(437, Some("abc-123".to_owned()));
    let points = client
        .delivery_points(&query)
        .await
        .expect("delivery point call should succeed");

    assert_eq!(points.len(), 2);
    assert!(points[0].location.latitude.is_some());
    assert!(
        points[1].location.latitude.is_none(),
        "second point has no coordinates and must still parse"
    );
}

#[tokio::test]
async fn delivery_points_support_free_text_queries() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/deliverypoints"))
        .and(query_param("city", "Tver"))
        .and(query_param("address", "Sovetskaya 12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = DeliveryPointQuery::by_address(
        "Tver".to_owned(),
        None,
        "Sovetskaya 12".to_owned(),
    );
    let points = client
        .delivery_points(&query)
        .await
        .expect("free-text delivery point call should succeed");
    assert!(points.is_empty());
}

// ---------------------------------------------------------------------------
// Tariff calculator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn calculate_tariff_sends_placeholder_package_and_parses_periods() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/calculator/tariff"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "tariff_code": 136,
            "from_location": { "code": 44 },
            "to_location": { "code": 437 },
            "packages": [{ "weight": 1000 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "period_min": 2,
            "period_max": 4,
            "total_sum": "355.50"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let estimate = client
        .calculate_tariff(&TariffRequest {
            tariff_code: 136,
            from_city_code: 44,
            to_city_code: 437,
        })
        .await
        .expect("tariff calculation should succeed");

    assert_eq!(estimate.period_min, 2);
    assert_eq!(estimate.period_max, 4);
    assert!(estimate.total_sum.is_some());
}

#[tokio::test]
async fn tariff_failure_surfaces_as_unexpected_status() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/calculator/tariff"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client
        .calculate_tariff(&TariffRequest {
            tariff_code: 136,
            from_city_code: 44,
            to_city_code: 437,
        })
        .await;
    assert!(
        matches!(result, Err(CarrierError::UnexpectedStatus { status: 500, .. })),
        "expected UnexpectedStatus(500), got: {result:?}"
    );
}
