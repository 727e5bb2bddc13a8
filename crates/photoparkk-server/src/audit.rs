// crates/photoparkk-server/src/audit.rs
// ============================================================================
// Module: PhotoParkk Audit Logging
// Description: Structured audit events for HTTP requests, catalog edits, and orders.
// Purpose: Emit redacted JSON-line audit logs to a pluggable sink.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are JSON lines. Three kinds are emitted: one per HTTP request,
//! one per catalog change, and one per order event. Payloads carry identifiers
//! and outcomes only; delivery details, payment signatures, and gateway
//! secrets are never recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use photoparkk_core::FulfillmentMethod;
use photoparkk_core::OrderId;
use photoparkk_core::OrderStatus;
use photoparkk_core::ShapeId;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit event for one handled HTTP request.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRequestEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: String,
    /// Matched route template, not the concrete path.
    pub route: String,
    /// Response status code.
    pub status: u16,
    /// Declared request body size in bytes.
    pub request_bytes: Option<u64>,
    /// Handling latency in milliseconds.
    pub latency_ms: u128,
}

impl ApiRequestEvent {
    /// Builds a request event.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        route: impl Into<String>,
        status: u16,
        request_bytes: Option<u64>,
        latency_ms: u128,
    ) -> Self {
        Self {
            event: "api_request",
            timestamp_ms: now_ms(),
            method: method.into(),
            route: route.into(),
            status,
            request_bytes,
            latency_ms,
        }
    }
}

/// Catalog change action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogAction {
    /// Shape created.
    Create,
    /// Shape replaced whole.
    Replace,
    /// Shape deleted.
    Delete,
}

/// Audit event for one catalog change.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogChangeEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Change action.
    pub action: CatalogAction,
    /// Affected shape.
    pub shape_id: ShapeId,
    /// Shape name after the change, when it still exists.
    pub shape_name: Option<String>,
    /// Fingerprint of the admin token that made the change.
    pub token_fingerprint: Option<String>,
}

impl CatalogChangeEvent {
    /// Builds a catalog change event.
    #[must_use]
    pub fn new(
        action: CatalogAction,
        shape_id: ShapeId,
        shape_name: Option<String>,
        token_fingerprint: Option<String>,
    ) -> Self {
        Self {
            event: "catalog_change",
            timestamp_ms: now_ms(),
            action,
            shape_id,
            shape_name,
            token_fingerprint,
        }
    }
}

/// Order event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    /// Order persisted.
    Placed,
    /// Admin moved the order to a new status.
    StatusChanged,
    /// Gateway order handle created.
    PaymentStarted,
    /// Payment proof failed verification.
    PaymentRejected,
}

/// Audit event for one order event.
#[derive(Debug, Clone, Serialize)]
pub struct OrderAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Order event kind.
    pub action: OrderAction,
    /// Order identifier once assigned.
    pub order_id: Option<OrderId>,
    /// Fulfillment method.
    pub method: Option<FulfillmentMethod>,
    /// Order status after the event.
    pub status: Option<OrderStatus>,
    /// Order total or gateway amount in whole units.
    pub amount: Option<u64>,
    /// Failure reason.
    pub reason: Option<String>,
}

impl OrderAuditEvent {
    /// Builds an order event with only the action set.
    #[must_use]
    pub fn new(action: OrderAction) -> Self {
        Self {
            event: "order_event",
            timestamp_ms: now_ms(),
            action,
            order_id: None,
            method: None,
            status: None,
            amount: None,
            reason: None,
        }
    }
}

/// Any audit event.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AuditEvent {
    /// HTTP request event.
    Request(ApiRequestEvent),
    /// Catalog change event.
    Catalog(CatalogChangeEvent),
    /// Order event.
    Order(OrderAuditEvent),
}

impl From<ApiRequestEvent> for AuditEvent {
    fn from(event: ApiRequestEvent) -> Self {
        Self::Request(event)
    }
}

impl From<CatalogChangeEvent> for AuditEvent {
    fn from(event: CatalogChangeEvent) -> Self {
        Self::Catalog(event)
    }
}

impl From<OrderAuditEvent> for AuditEvent {
    fn from(event: OrderAuditEvent) -> Self {
        Self::Order(event)
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for server events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &AuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
