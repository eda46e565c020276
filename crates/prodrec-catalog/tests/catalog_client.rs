//! Integration tests for `CatalogClient` using wiremock HTTP mocks.
//!
//! The mock server plays the part of the catalog RPC service: `initialize`
//! hands out a session id in a response header, `tools/call` answers with
//! the double-wrapped envelope, and DELETE tears the session down. The
//! `.expect(..)` counts assert the session-cleanup invariant: exactly one
//! teardown whenever a session id was obtained, none otherwise.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prodrec_catalog::{CatalogClient, CatalogError, ErrorReport};
use prodrec_core::AppConfig;

const SESSION_ID: &str = "sess-123";

fn test_config() -> AppConfig {
    AppConfig {
        catalog_endpoint: String::new(),
        pdp_fetch_timeout_secs: 5,
        pdp_user_agent: "prodrec-test/0.1".to_owned(),
        catalog_init_timeout_secs: 5,
        catalog_query_timeout_secs: 5,
        catalog_variants_timeout_secs: 5,
        catalog_close_timeout_secs: 5,
    }
}

fn test_client(endpoint: &str) -> CatalogClient {
    CatalogClient::with_endpoint(endpoint, &test_config())
        .expect("client construction should not fail")
}

/// Wraps a payload the way the service does: a JSON-RPC result whose
/// content list carries the payload JSON-encoded inside a text item.
fn envelope(payload: &serde_json::Value) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": 3,
        "result": {
            "content": [
                {"type": "text", "text": serde_json::to_string(payload).unwrap()}
            ]
        }
    })
}

async fn mount_initialize(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "initialize"})))
        .respond_with(ResponseTemplate::new(200).insert_header("mcp-session-id", SESSION_ID))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_product_runs_the_full_session_lifecycle() {
    let server = MockServer::start().await;
    mount_initialize(&server).await;

    let product_data = json!({
        "message": "1 product found",
        "products": [{
            "sku": "ADB366",
            "name": "Logo Tee",
            "inStock": true,
            "attributes": [{"name": "material", "value": "cotton"}],
            "images": [{"url": "https://cdn.example.com/a.jpg"}],
            "priceRange": {
                "minimum": {"final": {"amount": {"value": 24.0, "currency": "USD"}}}
            }
        }]
    });
    let product_variants = json!({"data": {"items": [{"sku": "ADB366-S"}, {"sku": "ADB366-L"}]}});

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": {"name": "productData"}})))
        .and(header("mcp-session-id", SESSION_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&product_data)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": {"name": "productVariants"}})))
        .and(header("mcp-session-id", SESSION_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&product_variants)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(header("mcp-session-id", SESSION_ID))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let record = test_client(&server.uri())
        .fetch_product("ADB366")
        .await
        .expect("should fetch product");

    assert_eq!(record.sku, "ADB366");
    assert_eq!(
        record.product_data_message.as_deref(),
        Some("1 product found")
    );
    assert_eq!(record.products_count, 1);
    assert_eq!(record.products[0].sku.as_deref(), Some("ADB366"));
    assert_eq!(record.products[0].attributes["material"], json!("cotton"));
    assert_eq!(record.products[0].price.min_final, Some(24.0));
    assert_eq!(record.variants.count, 2);

    // No-data-loss invariant: both payloads land verbatim under raw.
    assert_eq!(record.raw.product_data, product_data);
    assert_eq!(record.raw.product_variants, product_variants);
}

#[tokio::test]
async fn missing_session_header_fails_without_further_calls() {
    let server = MockServer::start().await;

    // Initialize answers 200 but without the session header.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "initialize"})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    // Neither queries nor teardown may be attempted: no session exists.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "tools/call"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_product("ADB366")
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::MissingSessionId));

    let report = ErrorReport::from_catalog(&err, "ADB366");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["source"], "catalog-session-client");
    assert_eq!(json["sku"], "ADB366");
}

#[tokio::test]
async fn shape_error_still_tears_the_session_down_once() {
    let server = MockServer::start().await;
    mount_initialize(&server).await;

    // productData answers with an envelope that has no text item.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": {"name": "productData"}})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": {"content": [{"type": "image"}]}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // The state machine never reaches the variants query.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": {"name": "productVariants"}})))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(header("mcp-session-id", SESSION_ID))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_product("ADB366")
        .await
        .unwrap_err();
    assert!(
        matches!(err, CatalogError::ResponseShape { ref operation, .. } if operation == "productData"),
        "expected ResponseShape(productData), got: {err:?}"
    );
}

#[tokio::test]
async fn teardown_failure_does_not_mask_the_result() {
    let server = MockServer::start().await;
    mount_initialize(&server).await;

    let product_data = json!({"message": "ok", "products": []});
    let product_variants = json!({"variants": []});

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": {"name": "productData"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&product_data)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": {"name": "productVariants"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&product_variants)))
        .mount(&server)
        .await;

    // Teardown blows up server-side; the caller must never see it.
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let record = test_client(&server.uri())
        .fetch_product("ADB366")
        .await
        .expect("teardown failure must not surface");
    assert_eq!(record.products_count, 0);
    assert_eq!(record.variants.count, 0);
}

#[tokio::test]
async fn non_2xx_initialize_is_an_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "initialize"})))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_product("ADB366")
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            CatalogError::UnexpectedStatus { status: 502, ref operation } if operation == "initialize"
        ),
        "expected UnexpectedStatus(initialize), got: {err:?}"
    );
}

#[tokio::test]
async fn unparsable_query_body_names_the_operation() {
    let server = MockServer::start().await;
    mount_initialize(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": {"name": "productData"}})))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway error</html>"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_product("ADB366")
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("productData"), "got: {msg}");
}
