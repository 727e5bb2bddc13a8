// crates/photoparkk-server/src/server.rs
// ============================================================================
// Module: PhotoParkk HTTP Server
// Description: Router, handlers, and startup for the PhotoParkk API.
// Purpose: Serve the catalog, uploads, checkout, and order desk over HTTP.
// Dependencies: photoparkk-core, photoparkk-config, axum, tokio
// ============================================================================

//! ## Overview
//! [`build_router`] wires the routes below onto an [`AppState`]:
//!
//! | Route | Access |
//! | --- | --- |
//! | `GET /api/shapes`, `GET /api/shapes/{id}` | open |
//! | `POST /api/shapes`, `PUT`/`DELETE /api/shapes/{id}` | admin |
//! | `POST /api/uploads?slot=KEY`, `GET /images/{name}` | open |
//! | `POST /api/payments/orders`, `POST /api/orders` | open |
//! | `GET /api/orders`, `GET /api/orders/{id}`, `PUT /api/orders/{id}/status` | admin |
//!
//! Handlers parse bodies themselves so every failure, including malformed
//! JSON and oversized bodies, is answered with the JSON error envelope.
//! Store, compression, and gateway work runs on the blocking pool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use axum::extract::Path as UrlPath;
use axum::extract::RawQuery;
use axum::extract::Request;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_LENGTH;
use axum::http::header::CONTENT_TYPE;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use photoparkk_config::PaymentProvider;
use photoparkk_config::PhotoparkkConfig;
use photoparkk_config::StoreType;
use photoparkk_core::AdminCatalogService;
use photoparkk_core::CheckoutConfig;
use photoparkk_core::CheckoutError;
use photoparkk_core::CheckoutRequest;
use photoparkk_core::CheckoutService;
use photoparkk_core::DeliveryDetails;
use photoparkk_core::FulfillmentMethod;
use photoparkk_core::InMemoryCatalogStore;
use photoparkk_core::InMemoryOrderStore;
use photoparkk_core::OrderDesk;
use photoparkk_core::OrderDraft;
use photoparkk_core::OrderId;
use photoparkk_core::OrderItem;
use photoparkk_core::OrderRecord;
use photoparkk_core::OrderStatus;
use photoparkk_core::PaymentError;
use photoparkk_core::Shape;
use photoparkk_core::ShapeId;
use photoparkk_core::SharedCatalogStore;
use photoparkk_core::SharedImageStore;
use photoparkk_core::SharedOrderStore;
use photoparkk_core::SharedPaymentGateway;
use photoparkk_core::StoreError;
use photoparkk_core::Timestamp;
use photoparkk_payments::DisabledGateway;
use photoparkk_payments::RazorpayConfig;
use photoparkk_payments::RazorpayGateway;
use photoparkk_store_sqlite::SqliteStore;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::audit::ApiRequestEvent;
use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::audit::CatalogAction;
use crate::audit::CatalogChangeEvent;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::OrderAction;
use crate::audit::OrderAuditEvent;
use crate::audit::StderrAuditSink;
use crate::auth::AdminAuth;
use crate::auth::AdminContext;
use crate::error::ApiError;
use crate::images::FileImageStore;
use crate::images::ImageUploader;
use crate::images::UploadedImage;
use crate::images::content_type_for;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server construction and startup errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
    /// A backend failed to initialize.
    #[error("init error: {0}")]
    Init(String),
    /// Listener or transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Backends and policies the application state is built from.
pub struct AppStateParts {
    /// Catalog persistence.
    pub catalog: SharedCatalogStore,
    /// Order persistence.
    pub orders: SharedOrderStore,
    /// Payment gateway.
    pub gateway: SharedPaymentGateway,
    /// Image uploader.
    pub uploader: ImageUploader,
    /// Admin gate.
    pub auth: AdminAuth,
    /// Audit sink.
    pub audit: Arc<dyn AuditSink>,
    /// Checkout settings.
    pub checkout: CheckoutConfig,
}

/// Services shared by every handler.
struct AppServices {
    /// Catalog write path and reads.
    admin: AdminCatalogService<SharedCatalogStore, SharedImageStore>,
    /// Order submission.
    checkout: CheckoutService<SharedOrderStore, SharedPaymentGateway, SharedCatalogStore>,
    /// Order listing and lifecycle.
    desk: OrderDesk<SharedOrderStore>,
    /// Image uploads.
    uploader: ImageUploader,
    /// Admin gate.
    auth: AdminAuth,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
}

/// Cloneable application state.
#[derive(Clone)]
pub struct AppState {
    /// Shared services.
    services: Arc<AppServices>,
}

impl AppState {
    /// Builds state from explicit backends.
    #[must_use]
    pub fn new(parts: AppStateParts) -> Self {
        let images = SharedImageStore::from_store(parts.uploader.clone());
        let services = AppServices {
            admin: AdminCatalogService::new(parts.catalog.clone(), images),
            checkout: CheckoutService::new(
                parts.orders.clone(),
                parts.gateway,
                parts.catalog,
                parts.checkout,
            ),
            desk: OrderDesk::new(parts.orders),
            uploader: parts.uploader,
            auth: parts.auth,
            audit: parts.audit,
        };
        Self {
            services: Arc::new(services),
        }
    }

    /// Builds state from configuration.
    ///
    /// Call outside an async context: the payment client owns its own runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when a backend cannot be initialized.
    pub fn from_config(config: &PhotoparkkConfig) -> Result<Self, ServerError> {
        let (catalog, orders) = build_stores(config)?;
        let gateway = build_gateway(config)?;
        let files = FileImageStore::new(&config.uploads.dir, &config.uploads.public_base_url)
            .map_err(|err| ServerError::Init(err.to_string()))?;
        let uploader = ImageUploader::new(
            files,
            config.uploads.compression_options(),
            config.uploads.max_upload_bytes,
        );
        Ok(Self::new(AppStateParts {
            catalog,
            orders,
            gateway,
            uploader,
            auth: AdminAuth::new(config.server.admin_tokens.clone()),
            audit: build_audit_sink(config)?,
            checkout: config.checkout_config(),
        }))
    }

    /// Records an audit event.
    fn record(&self, event: impl Into<AuditEvent>) {
        self.services.audit.record(&event.into());
    }

    /// Authorizes an admin request.
    fn require_admin(&self, headers: &HeaderMap) -> Result<AdminContext, ApiError> {
        let header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
        Ok(self.services.auth.authorize(header)?)
    }
}

/// Builds the catalog and order stores.
fn build_stores(
    config: &PhotoparkkConfig,
) -> Result<(SharedCatalogStore, SharedOrderStore), ServerError> {
    match config.store.store_type {
        StoreType::Memory => Ok((
            SharedCatalogStore::from_store(InMemoryCatalogStore::new()),
            SharedOrderStore::from_store(InMemoryOrderStore::new()),
        )),
        StoreType::Sqlite => {
            let sqlite_config = config
                .store
                .sqlite_config()
                .ok_or_else(|| ServerError::Config("sqlite store requires path".to_string()))?;
            let store = SqliteStore::new(&sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            Ok((
                SharedCatalogStore::from_store(store.clone()),
                SharedOrderStore::from_store(store),
            ))
        }
    }
}

/// Builds the payment gateway.
fn build_gateway(config: &PhotoparkkConfig) -> Result<SharedPaymentGateway, ServerError> {
    let payments = &config.payments;
    match payments.provider {
        PaymentProvider::Disabled => Ok(SharedPaymentGateway::from_gateway(DisabledGateway)),
        PaymentProvider::Razorpay => {
            let key_id = payments.key_id.clone().ok_or_else(|| {
                ServerError::Config("razorpay provider requires key_id".to_string())
            })?;
            let secret =
                payments.resolve_key_secret().map_err(|err| ServerError::Config(err.to_string()))?;
            let mut gateway_config = RazorpayConfig::new(key_id, secret);
            if let Some(base_url) = &payments.api_base_url {
                gateway_config.base_url.clone_from(base_url);
            }
            gateway_config.timeout_ms = payments.timeout_ms;
            let gateway = RazorpayGateway::new(gateway_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            Ok(SharedPaymentGateway::from_gateway(gateway))
        }
    }
}

/// Builds the audit sink.
fn build_audit_sink(config: &PhotoparkkConfig) -> Result<Arc<dyn AuditSink>, ServerError> {
    let audit = &config.server.audit;
    if !audit.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &audit.path {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path))
                .map_err(|err| ServerError::Init(format!("audit log: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// PhotoParkk HTTP server instance.
pub struct PhotoparkkServer {
    /// Application state.
    state: AppState,
    /// Listen address.
    bind: SocketAddr,
    /// Maximum request body size.
    max_body_bytes: usize,
}

impl PhotoparkkServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration or initialization fails.
    pub fn from_config(mut config: PhotoparkkConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let bind = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let state = AppState::from_config(&config)?;
        Ok(Self {
            state,
            bind,
            max_body_bytes: config.server.max_body_bytes,
        })
    }

    /// Returns the configured listen address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Binds the configured address and serves until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_listener(listener).await
    }

    /// Serves on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when serving fails.
    pub async fn serve_listener(
        self,
        listener: tokio::net::TcpListener,
    ) -> Result<(), ServerError> {
        let app = build_router(self.state, self.max_body_bytes);
        axum::serve(listener, app)
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the API router.
#[must_use]
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/shapes", get(list_shapes).post(create_shape))
        .route("/api/shapes/{id}", get(get_shape).put(replace_shape).delete(delete_shape))
        .route("/api/uploads", post(upload_image))
        .route("/images/{name}", get(get_image))
        .route("/api/payments/orders", post(create_payment_order))
        .route("/api/orders", get(list_orders).post(submit_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", put(update_order_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), audit_requests))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Emits one `api_request` audit event per routed request.
async fn audit_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(String::new, |path| path.as_str().to_string());
    let request_bytes = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let response = next.run(request).await;
    state.record(ApiRequestEvent::new(
        method,
        route,
        response.status().as_u16(),
        request_bytes,
        started.elapsed().as_millis(),
    ));
    response
}

// ============================================================================
// SECTION: Catalog Handlers
// ============================================================================

/// Lists every shape, fully nested.
async fn list_shapes(State(state): State<AppState>) -> Result<Json<Vec<Shape>>, ApiError> {
    let services = Arc::clone(&state.services);
    let shapes = blocking(move || Ok(services.admin.list_shapes()?)).await?;
    Ok(Json(shapes))
}

/// Loads one shape.
async fn get_shape(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Shape>, ApiError> {
    let services = Arc::clone(&state.services);
    let shape = blocking(move || Ok(services.admin.get_shape(&ShapeId::new(id))?)).await?;
    Ok(Json(shape))
}

/// Creates a shape.
async fn create_shape(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Shape>), ApiError> {
    let admin = state.require_admin(&headers)?;
    let shape: Shape = parse_json(&body_bytes(body)?)?;
    let services = Arc::clone(&state.services);
    let created = blocking(move || Ok(services.admin.create_shape(shape)?)).await?;
    if let Some(id) = &created.id {
        state.record(CatalogChangeEvent::new(
            CatalogAction::Create,
            id.clone(),
            Some(created.name.clone()),
            admin.token_fingerprint,
        ));
    }
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replaces a whole shape.
async fn replace_shape(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Shape>, ApiError> {
    let admin = state.require_admin(&headers)?;
    let shape: Shape = parse_json(&body_bytes(body)?)?;
    let id = ShapeId::new(id);
    let services = Arc::clone(&state.services);
    let target = id.clone();
    let replaced = blocking(move || Ok(services.admin.replace_shape(&target, shape)?)).await?;
    state.record(CatalogChangeEvent::new(
        CatalogAction::Replace,
        id,
        Some(replaced.name.clone()),
        admin.token_fingerprint,
    ));
    Ok(Json(replaced))
}

/// Deletes a shape and everything below it.
async fn delete_shape(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let admin = state.require_admin(&headers)?;
    let id = ShapeId::new(id);
    let services = Arc::clone(&state.services);
    let target = id.clone();
    blocking(move || Ok(services.admin.delete_shape(&target)?)).await?;
    state.record(CatalogChangeEvent::new(CatalogAction::Delete, id, None, admin.token_fingerprint));
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// SECTION: Image Handlers
// ============================================================================

/// Compresses and stores one image under the caller's slot.
async fn upload_image(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<UploadedImage>), ApiError> {
    let slot = query
        .as_deref()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "slot")
                .map(|(_, value)| value.into_owned())
        })
        .ok_or_else(|| ApiError::BadRequest("slot query parameter is required".to_string()))?;
    let bytes = body_bytes(body)?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("image body is empty".to_string()));
    }
    let services = Arc::clone(&state.services);
    let uploaded = blocking(move || Ok(services.uploader.upload(&slot, &bytes)?)).await?;
    Ok((StatusCode::CREATED, Json(uploaded)))
}

/// Serves a stored image.
async fn get_image(
    State(state): State<AppState>,
    UrlPath(name): UrlPath<String>,
) -> Result<Response, ApiError> {
    let services = Arc::clone(&state.services);
    let lookup = name.clone();
    let bytes = blocking(move || Ok(services.uploader.files().read(&lookup)?))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("image not found: {name}")))?;
    let headers = [
        (CONTENT_TYPE, content_type_for(&name)),
        (CACHE_CONTROL, "public, max-age=31536000, immutable"),
    ];
    Ok((headers, bytes).into_response())
}

// ============================================================================
// SECTION: Checkout Handlers
// ============================================================================

/// Request for a gateway order handle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PaymentOrderRequest {
    /// Optional customer reference.
    #[serde(default)]
    customer_id: Option<String>,
    /// Delivery details, validated before the gateway is called.
    delivery: DeliveryDetails,
    /// Item snapshot being paid for.
    item: OrderItem,
}

/// Gateway order handle returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentOrderResponse {
    /// Gateway order identifier.
    gateway_order_id: String,
    /// Amount in minor units.
    amount_minor: u64,
    /// ISO currency code.
    currency: String,
    /// Public key the client opens the payment flow with.
    key_id: String,
}

/// Creates a gateway order handle for an online checkout.
async fn create_payment_order(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<PaymentOrderResponse>), ApiError> {
    let request: PaymentOrderRequest = parse_json(&body_bytes(body)?)?;
    let request = CheckoutRequest {
        customer_id: request.customer_id,
        delivery: request.delivery,
        item: request.item,
        method: FulfillmentMethod::Online,
    };
    let receipt = format!("rcpt_{}", now().as_unix_millis());
    let services = Arc::clone(&state.services);
    let pending =
        blocking(move || Ok(services.checkout.begin_online_payment(request, receipt)?)).await?;
    let mut event = OrderAuditEvent::new(OrderAction::PaymentStarted);
    event.method = Some(FulfillmentMethod::Online);
    event.amount = pending.request.item.line_total();
    state.record(event);
    let order = pending.gateway_order;
    Ok((
        StatusCode::CREATED,
        Json(PaymentOrderResponse {
            gateway_order_id: order.gateway_order_id.as_str().to_string(),
            amount_minor: order.amount_minor,
            currency: order.currency,
            key_id: order.key_id,
        }),
    ))
}

/// Places an order: cash on delivery, or online with a payment proof.
async fn submit_order(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<OrderRecord>), ApiError> {
    let draft: OrderDraft = parse_json(&body_bytes(body)?)?;
    let method = draft.payment.method();
    let services = Arc::clone(&state.services);
    let result = blocking(move || Ok(services.checkout.submit(draft, now()))).await?;
    let record = match result {
        Ok(record) => record,
        Err(err) => {
            if let CheckoutError::Payment(PaymentError::Rejected(reason))
            | CheckoutError::Store(StoreError::Conflict(reason)) = &err
            {
                let mut event = OrderAuditEvent::new(OrderAction::PaymentRejected);
                event.method = Some(method);
                event.reason = Some(reason.clone());
                state.record(event);
            }
            return Err(err.into());
        }
    };
    let mut event = OrderAuditEvent::new(OrderAction::Placed);
    event.order_id = Some(record.id.clone());
    event.method = Some(method);
    event.status = Some(record.status);
    event.amount = Some(record.total_amount);
    state.record(event);
    Ok((StatusCode::CREATED, Json(record)))
}

// ============================================================================
// SECTION: Order Desk Handlers
// ============================================================================

/// Requested status change.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StatusUpdate {
    /// Target status.
    status: OrderStatus,
}

/// Lists orders, newest first.
async fn list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderRecord>>, ApiError> {
    state.require_admin(&headers)?;
    let services = Arc::clone(&state.services);
    let orders = blocking(move || Ok(services.desk.list_orders()?)).await?;
    Ok(Json(orders))
}

/// Loads one order.
async fn get_order(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Result<Json<OrderRecord>, ApiError> {
    state.require_admin(&headers)?;
    let services = Arc::clone(&state.services);
    let order = blocking(move || Ok(services.desk.get_order(&OrderId::new(id))?)).await?;
    Ok(Json(order))
}

/// Advances an order along its lifecycle.
async fn update_order_status(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<OrderRecord>, ApiError> {
    state.require_admin(&headers)?;
    let update: StatusUpdate = parse_json(&body_bytes(body)?)?;
    let services = Arc::clone(&state.services);
    let record = blocking(move || {
        Ok(services.desk.advance_status(&OrderId::new(id), update.status)?)
    })
    .await?;
    let mut event = OrderAuditEvent::new(OrderAction::StatusChanged);
    event.order_id = Some(record.id.clone());
    event.status = Some(record.status);
    state.record(event);
    Ok(Json(record))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs synchronous service work on the blocking pool.
async fn blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|_| ApiError::Internal("worker task failed".to_string()))?
}

/// Maps body extraction failures into the JSON error envelope.
fn body_bytes(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ApiError> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("request body too large".to_string())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })
}

/// Parses a JSON request body.
fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes)
        .map_err(|err| ApiError::BadRequest(format!("invalid json: {err}")))
}

/// Current wall-clock time.
fn now() -> Timestamp {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    Timestamp::from_unix_millis(i64::try_from(millis).unwrap_or(i64::MAX))
}
