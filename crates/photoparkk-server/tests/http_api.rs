// crates/photoparkk-server/tests/http_api.rs
// ============================================================================
// Module: HTTP API Tests
// Description: End-to-end tests for the PhotoParkk HTTP surface.
// Purpose: Exercise routing, auth, checkout, uploads, and error envelopes.
// Dependencies: photoparkk-server, reqwest, tokio, tempfile
// ============================================================================

//! ## Overview
//! Each test binds a router on `127.0.0.1:0` with in-memory stores, a local
//! signing gateway, and a recording audit sink, then drives it with reqwest.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Cursor;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use image::DynamicImage;
use image::ImageFormat;
use image::Rgb;
use image::RgbImage;
use photoparkk_core::CheckoutConfig;
use photoparkk_core::GatewayOrder;
use photoparkk_core::GatewayOrderId;
use photoparkk_core::GatewayOrderRequest;
use photoparkk_core::InMemoryCatalogStore;
use photoparkk_core::InMemoryOrderStore;
use photoparkk_core::PaymentError;
use photoparkk_core::PaymentGateway;
use photoparkk_core::PaymentProof;
use photoparkk_core::SharedCatalogStore;
use photoparkk_core::SharedOrderStore;
use photoparkk_core::SharedPaymentGateway;
use photoparkk_imaging::CompressionOptions;
use photoparkk_payments::payment_signature;
use photoparkk_payments::verify_signature;
use photoparkk_server::AdminAuth;
use photoparkk_server::AppState;
use photoparkk_server::AppStateParts;
use photoparkk_server::AuditEvent;
use photoparkk_server::AuditSink;
use photoparkk_server::FileImageStore;
use photoparkk_server::ImageUploader;
use photoparkk_server::build_router;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const ADMIN_TOKEN: &str = "photoparkk-admin-token-0001";
const GATEWAY_SECRET: &str = "gateway-test-secret";

/// Gateway that signs locally with a fixed secret and remembers its orders.
#[derive(Default)]
struct SigningGateway {
    next_id: AtomicU64,
    opened: Mutex<Vec<GatewayOrder>>,
}

impl PaymentGateway for SigningGateway {
    fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, PaymentError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let order = GatewayOrder {
            gateway_order_id: GatewayOrderId::new(format!("order_{id}")),
            amount_minor: request.amount_minor,
            currency: request.currency.clone(),
            key_id: "rzp_test_key".to_string(),
        };
        self.opened.lock().unwrap().push(order.clone());
        Ok(order)
    }

    fn fetch_order(&self, id: &GatewayOrderId) -> Result<GatewayOrder, PaymentError> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .find(|order| order.gateway_order_id == *id)
            .cloned()
            .ok_or_else(|| PaymentError::Rejected(format!("unknown gateway order {id}")))
    }

    fn verify_payment(&self, proof: &PaymentProof) -> Result<(), PaymentError> {
        if verify_signature(GATEWAY_SECRET, proof) {
            Ok(())
        } else {
            Err(PaymentError::Rejected("payment signature mismatch".to_string()))
        }
    }
}

/// Audit sink that keeps events as JSON values.
#[derive(Default)]
struct RecordingAudit {
    events: Mutex<Vec<Value>>,
}

impl RecordingAudit {
    fn events_named(&self, name: &str) -> Vec<Value> {
        self.events.lock().unwrap().iter().filter(|event| event["event"] == name).cloned().collect()
    }
}

impl AuditSink for RecordingAudit {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(serde_json::to_value(event).unwrap());
    }
}

/// Running server handle.
struct TestServer {
    base: String,
    client: reqwest::Client,
    audit: Arc<RecordingAudit>,
    _dir: TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

async fn spawn_server(tokens: Vec<String>, max_body_bytes: usize) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let files = FileImageStore::new(dir.path().join("images"), "/images").unwrap();
    let uploader = ImageUploader::new(files, CompressionOptions::default(), 8 * 1024 * 1024);
    let audit = Arc::new(RecordingAudit::default());
    let state = AppState::new(AppStateParts {
        catalog: SharedCatalogStore::from_store(InMemoryCatalogStore::new()),
        orders: SharedOrderStore::from_store(InMemoryOrderStore::new()),
        gateway: SharedPaymentGateway::from_gateway(SigningGateway::default()),
        uploader,
        auth: AdminAuth::new(tokens),
        audit: audit.clone(),
        checkout: CheckoutConfig::default(),
    });
    let app = build_router(state, max_body_bytes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    TestServer {
        base: format!("http://{addr}"),
        client: reqwest::Client::new(),
        audit,
        _dir: dir,
    }
}

async fn admin_server() -> TestServer {
    spawn_server(vec![ADMIN_TOKEN.to_string()], 16 * 1024 * 1024).await
}

fn portrait_json() -> Value {
    json!({
        "name": "Portrait",
        "colorOptions": [{
            "name": "Black",
            "styles": [{
                "styleName": "Classic",
                "frameImages": [{
                    "title": "Floral Border",
                    "imageUrl": "https://cdn.photoparkk.test/floral.jpg",
                    "sizes": [
                        { "label": "8x10", "amount": 499 },
                        { "label": "12x16", "amount": 699 }
                    ]
                }]
            }]
        }]
    })
}

fn delivery_json() -> Value {
    json!({
        "name": "Asha Rao",
        "email": "asha@example.in",
        "phone": "+91 9876543210",
        "address": "12 MG Road",
        "state": "Karnataka",
        "city": "Bengaluru",
        "pincode": "560001"
    })
}

fn item_json() -> Value {
    json!({
        "shape": "Portrait",
        "color": "Black",
        "style": "Classic",
        "title": "Floral Border",
        "size": "12x16",
        "price": 699,
        "quantity": 2,
        "frameImageUrl": "https://cdn.photoparkk.test/floral.jpg"
    })
}

async fn create_portrait(server: &TestServer) -> Value {
    let response = server
        .client
        .post(server.url("/api/shapes"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&portrait_json())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbImage::from_fn(width, height, |x, y| {
        Rgb([u8::try_from(x % 256).unwrap(), u8::try_from(y % 256).unwrap(), 128])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(pixels).write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    out
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn catalog_writes_require_admin_token() {
    let server = admin_server().await;
    let anonymous =
        server.client.post(server.url("/api/shapes")).json(&portrait_json()).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    let body: Value = anonymous.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("unauthenticated"));

    let wrong = server
        .client
        .delete(server.url("/api/shapes/1"))
        .bearer_auth("not-the-admin-token-at-all")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let listed: Value =
        server.client.get(server.url("/api/shapes")).send().await.unwrap().json().await.unwrap();
    assert_eq!(listed, json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn catalog_create_replace_delete_round() {
    let server = admin_server().await;
    let created = create_portrait(&server).await;
    assert_eq!(created["id"], "1");
    assert_eq!(created["colorOptions"][0]["styles"][0]["styleName"], "Classic");

    let duplicate = server
        .client
        .post(server.url("/api/shapes"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({ "name": "  portrait " }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let mut edited = portrait_json();
    edited["colorOptions"][0]["styles"][0]["frameImages"][0]["sizes"][1]["amount"] = json!(749);
    let replaced = server
        .client
        .put(server.url("/api/shapes/1"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&edited)
        .send()
        .await
        .unwrap();
    assert_eq!(replaced.status(), StatusCode::OK);
    let fetched: Value =
        server.client.get(server.url("/api/shapes/1")).send().await.unwrap().json().await.unwrap();
    let sizes = &fetched["colorOptions"][0]["styles"][0]["frameImages"][0]["sizes"];
    assert_eq!(sizes[1]["amount"], 749);

    let deleted = server
        .client
        .delete(server.url("/api/shapes/1"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    let missing = server.client.get(server.url("/api/shapes/1")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let changes = server.audit.events_named("catalog_change");
    let actions: Vec<&str> =
        changes.iter().map(|event| event["action"].as_str().unwrap()).collect();
    assert_eq!(actions, ["create", "replace", "delete"]);
    assert!(changes.iter().all(|event| event["token_fingerprint"].as_str().is_some()));
    assert!(
        server
            .audit
            .events_named("api_request")
            .iter()
            .any(|event| event["route"] == "/api/shapes/{id}" && event["status"] == 204)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_shape_reports_the_first_violation() {
    let server = admin_server().await;
    let mut shape = portrait_json();
    shape["colorOptions"][0]["styles"][0]["frameImages"][0]["sizes"][0]["amount"] = json!(0);
    let response = server
        .client
        .post(server.url("/api/shapes"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&shape)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let malformed = server
        .client
        .post(server.url("/api/shapes"))
        .bearer_auth(ADMIN_TOKEN)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    let body: Value = malformed.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("invalid json"));
}

// ============================================================================
// SECTION: Checkout
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn cash_on_delivery_order_survives_catalog_deletion() {
    let server = admin_server().await;
    create_portrait(&server).await;

    let placed = server
        .client
        .post(server.url("/api/orders"))
        .json(&json!({
            "delivery": delivery_json(),
            "item": item_json(),
            "payment": { "method": "CASH_ON_DELIVERY" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(placed.status(), StatusCode::CREATED);
    let record: Value = placed.json().await.unwrap();
    assert_eq!(record["id"], "1");
    assert_eq!(record["status"], "placed");
    assert_eq!(record["totalAmount"], 1398);
    assert_eq!(record["currency"], "INR");

    server
        .client
        .delete(server.url("/api/shapes/1"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();

    let fetched: Value = server
        .client
        .get(server.url("/api/orders/1"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["item"], record["item"]);
    assert_eq!(fetched["item"]["price"], 699);

    let placed_events = server.audit.events_named("order_event");
    assert_eq!(placed_events[0]["action"], "placed");
    assert_eq!(placed_events[0]["amount"], 1398);
    let serialized = serde_json::to_string(&placed_events).unwrap();
    assert!(!serialized.contains("asha@example.in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_delivery_places_nothing() {
    let server = admin_server().await;
    let mut delivery = delivery_json();
    delivery["pincode"] = json!("5600");
    let response = server
        .client
        .post(server.url("/api/orders"))
        .json(&json!({
            "delivery": delivery,
            "item": item_json(),
            "payment": { "method": "CASH_ON_DELIVERY" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("pincode"));

    let orders: Value = server
        .client
        .get(server.url("/api/orders"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(orders, json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn online_order_requires_a_valid_signature() {
    let server = admin_server().await;
    let handle = server
        .client
        .post(server.url("/api/payments/orders"))
        .json(&json!({ "delivery": delivery_json(), "item": item_json() }))
        .send()
        .await
        .unwrap();
    assert_eq!(handle.status(), StatusCode::CREATED);
    let handle: Value = handle.json().await.unwrap();
    assert_eq!(handle["gatewayOrderId"], "order_1");
    assert_eq!(handle["amountMinor"], 139_800);
    assert_eq!(handle["keyId"], "rzp_test_key");

    let forged = server
        .client
        .post(server.url("/api/orders"))
        .json(&json!({
            "delivery": delivery_json(),
            "item": item_json(),
            "payment": {
                "method": "ONLINE",
                "gatewayOrderId": "order_1",
                "paymentId": "pay_1",
                "signature": "00ff"
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status(), StatusCode::PAYMENT_REQUIRED);

    let signature = payment_signature(GATEWAY_SECRET, "order_1", "pay_1");
    let paid = server
        .client
        .post(server.url("/api/orders"))
        .json(&json!({
            "delivery": delivery_json(),
            "item": item_json(),
            "payment": {
                "method": "ONLINE",
                "gatewayOrderId": "order_1",
                "paymentId": "pay_1",
                "signature": signature
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(paid.status(), StatusCode::CREATED);
    let record: Value = paid.json().await.unwrap();
    assert_eq!(record["payment"]["method"], "ONLINE");
    assert_eq!(record["payment"]["paymentId"], "pay_1");

    let actions: Vec<String> = server
        .audit
        .events_named("order_event")
        .iter()
        .map(|event| event["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, ["payment_started", "payment_rejected", "placed"]);
    let serialized = serde_json::to_string(&server.audit.events_named("order_event")).unwrap();
    assert!(!serialized.contains(&signature));
}

/// Submits an online order for `item` paid against `order_1`.
async fn submit_paid(server: &TestServer, item: Value) -> reqwest::Response {
    server
        .client
        .post(server.url("/api/orders"))
        .json(&json!({
            "delivery": delivery_json(),
            "item": item,
            "payment": {
                "method": "ONLINE",
                "gatewayOrderId": "order_1",
                "paymentId": "pay_1",
                "signature": payment_signature(GATEWAY_SECRET, "order_1", "pay_1")
            }
        }))
        .send()
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn payment_proof_is_bound_to_one_order_of_the_paid_amount() {
    let server = admin_server().await;
    let mut single = item_json();
    single["quantity"] = json!(1);
    let handle = server
        .client
        .post(server.url("/api/payments/orders"))
        .json(&json!({ "delivery": delivery_json(), "item": single }))
        .send()
        .await
        .unwrap();
    assert_eq!(handle.status(), StatusCode::CREATED);
    let handle: Value = handle.json().await.unwrap();
    assert_eq!(handle["amountMinor"], 69_900);

    let mut bulk = item_json();
    bulk["quantity"] = json!(50);
    let upgraded = submit_paid(&server, bulk).await;
    assert_eq!(upgraded.status(), StatusCode::PAYMENT_REQUIRED);

    let paid = submit_paid(&server, single.clone()).await;
    assert_eq!(paid.status(), StatusCode::CREATED);
    let record: Value = paid.json().await.unwrap();
    assert_eq!(record["totalAmount"], 699);

    let replayed = submit_paid(&server, single).await;
    assert_eq!(replayed.status(), StatusCode::CONFLICT);
    let body: Value = replayed.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("order_1"));

    let orders = server
        .client
        .get(server.url("/api/orders"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    let orders: Value = orders.json().await.unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let actions: Vec<String> = server
        .audit
        .events_named("order_event")
        .iter()
        .map(|event| event["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, ["payment_started", "payment_rejected", "placed", "payment_rejected"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn order_status_follows_the_lifecycle() {
    let server = admin_server().await;
    server
        .client
        .post(server.url("/api/orders"))
        .json(&json!({
            "delivery": delivery_json(),
            "item": item_json(),
            "payment": { "method": "CASH_ON_DELIVERY" }
        }))
        .send()
        .await
        .unwrap();

    let advance = |status: &'static str| {
        server
            .client
            .put(server.url("/api/orders/1/status"))
            .bearer_auth(ADMIN_TOKEN)
            .json(&json!({ "status": status }))
            .send()
    };
    let processing = advance("processing").await.unwrap();
    assert_eq!(processing.status(), StatusCode::OK);
    let record: Value = processing.json().await.unwrap();
    assert_eq!(record["status"], "processing");

    let backwards = advance("placed").await.unwrap();
    assert_eq!(backwards.status(), StatusCode::CONFLICT);

    let unknown = server
        .client
        .put(server.url("/api/orders/42/status"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let anonymous = server.client.get(server.url("/api/orders")).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// SECTION: Uploads and Limits
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn upload_is_compressed_stored_and_served() {
    let server = admin_server().await;
    let response = server
        .client
        .post(server.url("/api/uploads?slot=user-photo"))
        .header("content-type", "image/png")
        .body(png_bytes(1800, 1200))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded: Value = response.json().await.unwrap();
    assert_eq!(uploaded["width"], 1200);
    assert_eq!(uploaded["height"], 800);
    let url = uploaded["url"].as_str().unwrap();
    assert!(url.starts_with("/images/") && url.ends_with(".jpg"));

    let served = server.client.get(server.url(url)).send().await.unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.headers()["content-type"], "image/jpeg");
    let bytes = served.bytes().await.unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1200, 800));

    let absent = server.client.get(server.url("/images/deadbeef.jpg")).send().await.unwrap();
    assert_eq!(absent.status(), StatusCode::NOT_FOUND);
    let invalid = server.client.get(server.url("/images/not-an-image.txt")).send().await.unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_requires_slot_and_decodable_image() {
    let server = admin_server().await;
    let no_slot =
        server.client.post(server.url("/api/uploads")).body(png_bytes(4, 4)).send().await.unwrap();
    assert_eq!(no_slot.status(), StatusCode::BAD_REQUEST);
    let body: Value = no_slot.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("slot"));

    let garbage = server
        .client
        .post(server.url("/api/uploads?slot=user-photo"))
        .body(b"definitely not an image".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_body_gets_json_413() {
    let server = spawn_server(Vec::new(), 1024).await;
    let response = server
        .client
        .post(server.url("/api/orders"))
        .header("content-type", "application/json")
        .body(vec![b' '; 4096])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn open_gate_allows_admin_routes_without_token() {
    let server = spawn_server(Vec::new(), 1024 * 1024).await;
    let response =
        server.client.post(server.url("/api/shapes")).json(&portrait_json()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let changes = server.audit.events_named("catalog_change");
    assert!(changes[0]["token_fingerprint"].is_null());
}
