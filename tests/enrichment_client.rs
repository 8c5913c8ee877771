/// Integration tests for the HTTP enrichment client with mocked inference APIs
/// Exercises the lookup order, reduction rules and failure semantics without hitting real services
use std::time::Duration;
use user_enrichment_api::config::EnrichmentUrls;
use user_enrichment_api::enrichment::{Enricher, HttpEnricher};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to point all three templates at the mock server
fn create_test_enricher(base_url: &str) -> HttpEnricher {
    let urls = EnrichmentUrls {
        age: format!("{}/age?name={{name}}", base_url),
        gender: format!("{}/gender?name={{name}}", base_url),
        nationality: format!("{}/nationality?name={{name}}", base_url),
    };
    HttpEnricher::new(urls, Duration::from_secs(2)).unwrap()
}

async fn mount_json(server: &MockServer, route: &str, name: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_enrich_successful_response() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/age",
        "alice",
        serde_json::json!({"count": 1234, "name": "alice", "age": 34}),
    )
    .await;
    mount_json(
        &mock_server,
        "/gender",
        "alice",
        serde_json::json!({"count": 1234, "name": "alice", "gender": "female", "probability": 0.98}),
    )
    .await;
    mount_json(
        &mock_server,
        "/nationality",
        "alice",
        serde_json::json!({
            "count": 1234,
            "name": "alice",
            "country": [
                {"country_id": "US", "probability": 0.12},
                {"country_id": "GB", "probability": 0.09}
            ]
        }),
    )
    .await;

    let enricher = create_test_enricher(&mock_server.uri());
    let enriched = enricher.enrich("alice").await.unwrap();

    assert_eq!(enriched.age, 34);
    assert_eq!(enriched.gender, "female");
    assert_eq!(enriched.nationality, "US");
}

#[tokio::test]
async fn test_enrich_unknown_name_defaults() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/age",
        "zzqx",
        serde_json::json!({"count": 0, "name": "zzqx", "age": null}),
    )
    .await;
    mount_json(
        &mock_server,
        "/gender",
        "zzqx",
        serde_json::json!({"count": 0, "name": "zzqx", "gender": null, "probability": 0.0}),
    )
    .await;
    mount_json(
        &mock_server,
        "/nationality",
        "zzqx",
        serde_json::json!({"count": 0, "name": "zzqx", "country": []}),
    )
    .await;

    let enricher = create_test_enricher(&mock_server.uri());
    let enriched = enricher.enrich("zzqx").await.unwrap();

    assert_eq!(enriched.age, 0);
    assert_eq!(enriched.gender, "");
    assert_eq!(enriched.nationality, "");
}

#[tokio::test]
async fn test_first_failure_aborts_remaining_lookups() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/age",
        "alice",
        serde_json::json!({"age": 34}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/gender"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Must never be reached
    Mock::given(method("GET"))
        .and(path("/nationality"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"country": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let enricher = create_test_enricher(&mock_server.uri());
    let result = enricher.enrich("alice").await;

    let err = result.unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    assert!(err.to_string().contains("gender"));
}

#[tokio::test]
async fn test_decode_error_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/age"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gender"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"gender": "male"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let enricher = create_test_enricher(&mock_server.uri());
    let err = enricher.enrich("bob").await.unwrap_err();

    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    assert!(err.to_string().starts_with("Failed to parse age lookup response"));
}

#[tokio::test]
async fn test_timeout_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/age"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"age": 20}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let urls = EnrichmentUrls {
        age: format!("{}/age?name={{name}}", mock_server.uri()),
        gender: format!("{}/gender?name={{name}}", mock_server.uri()),
        nationality: format!("{}/nationality?name={{name}}", mock_server.uri()),
    };
    let enricher = HttpEnricher::new(urls, Duration::from_millis(100)).unwrap();

    let err = enricher.enrich("slow").await.unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    assert!(err.to_string().starts_with("age lookup request failed"));
}

#[tokio::test]
async fn test_name_is_url_encoded() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/age",
        "anne marie",
        serde_json::json!({"age": 51}),
    )
    .await;
    mount_json(
        &mock_server,
        "/gender",
        "anne marie",
        serde_json::json!({"gender": "female"}),
    )
    .await;
    mount_json(
        &mock_server,
        "/nationality",
        "anne marie",
        serde_json::json!({"country": [{"country_id": "FR", "probability": 0.3}]}),
    )
    .await;

    let enricher = create_test_enricher(&mock_server.uri());
    let enriched = enricher.enrich("anne marie").await.unwrap();

    assert_eq!(enriched.age, 51);
    assert_eq!(enriched.nationality, "FR");
}
