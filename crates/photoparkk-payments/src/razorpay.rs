// crates/photoparkk-payments/src/razorpay.rs
// ============================================================================
// Module: Razorpay Gateway
// Description: Blocking HTTP client for a Razorpay-compatible orders API.
// Purpose: Create gateway orders server-side and verify payment proofs.
// Dependencies: photoparkk-core, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! [`RazorpayGateway`] creates orders with `POST {base}/v1/orders` and reads
//! them back with `GET {base}/v1/orders/{id}`, both using HTTP basic auth
//! (key id and key secret). Payment proofs are verified locally with
//! [`crate::verify_signature`].
//! Invariants:
//! - Redirects are rejected.
//! - Response bodies are capped at [`MAX_RESPONSE_BYTES`].
//! - The key secret never appears in `Debug` output or error messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::time::Duration;

use photoparkk_core::GatewayOrder;
use photoparkk_core::GatewayOrderId;
use photoparkk_core::GatewayOrderRequest;
use photoparkk_core::PaymentError;
use photoparkk_core::PaymentGateway;
use photoparkk_core::PaymentProof;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::signature::verify_signature;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com/";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Maximum accepted response body size in bytes.
pub const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Razorpay gateway settings.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// API base URL.
    pub base_url: String,
    /// Public key identifier, also handed to the client.
    pub key_id: String,
    /// Merchant key secret.
    pub key_secret: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl RazorpayConfig {
    /// Creates settings for the production API.
    #[must_use]
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Gateway construction errors.
#[derive(Debug, Error)]
pub enum RazorpayConfigError {
    /// A setting is missing or malformed.
    #[error("invalid razorpay config: {0}")]
    Invalid(String),
    /// HTTP client could not be built.
    #[error("razorpay client error: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Order creation request body.
#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    /// Amount in minor units.
    amount: u64,
    /// ISO currency code.
    currency: &'a str,
    /// Merchant receipt reference.
    receipt: &'a str,
}

/// Order response body for creation and lookup.
#[derive(Debug, Deserialize)]
struct OrderEntity {
    /// Gateway order identifier.
    id: String,
    /// Amount in minor units.
    amount: u64,
    /// ISO currency code.
    currency: String,
}

/// Error response envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    /// Error details.
    error: ErrorBody,
}

/// Error response details.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    /// Machine-readable code.
    #[serde(default)]
    code: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    description: Option<String>,
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Razorpay-compatible payment gateway.
#[derive(Debug, Clone)]
pub struct RazorpayGateway {
    /// HTTP client for API calls.
    client: Client,
    /// Order creation endpoint.
    orders_url: Url,
    /// Gateway settings.
    config: RazorpayConfig,
}

impl RazorpayGateway {
    /// Builds a gateway from settings.
    ///
    /// # Errors
    ///
    /// Returns [`RazorpayConfigError`] when a setting is invalid or the client cannot be built.
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayConfigError> {
        if config.key_id.trim().is_empty() {
            return Err(RazorpayConfigError::Invalid("key_id must be set".to_string()));
        }
        if config.key_secret.is_empty() {
            return Err(RazorpayConfigError::Invalid("key_secret must be set".to_string()));
        }
        if config.timeout_ms == 0 {
            return Err(RazorpayConfigError::Invalid(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        let orders_url = orders_url(&config.base_url)?;
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| RazorpayConfigError::Client(err.to_string()))?;
        Ok(Self {
            client,
            orders_url,
            config,
        })
    }

    /// Returns the public key identifier.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// Reads an order entity from a response, mapping error envelopes.
    fn read_order(
        &self,
        response: reqwest::blocking::Response,
    ) -> Result<GatewayOrder, PaymentError> {
        let status = response.status();
        if status.is_redirection() {
            return Err(PaymentError::Gateway(format!("unexpected redirect: http status {status}")));
        }
        let bytes = read_limited(response)?;
        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .ok()
                .and_then(|envelope| {
                    let ErrorBody {
                        code,
                        description,
                    } = envelope.error;
                    match (code, description) {
                        (Some(code), Some(description)) => Some(format!("{code}: {description}")),
                        (code, description) => code.or(description),
                    }
                })
                .unwrap_or_else(|| "no error detail".to_string());
            return Err(PaymentError::Gateway(format!("http status {status}: {detail}")));
        }
        let entity: OrderEntity = serde_json::from_slice(&bytes)
            .map_err(|err| PaymentError::Gateway(format!("malformed order response: {err}")))?;
        if entity.id.trim().is_empty() {
            return Err(PaymentError::Gateway("order response is missing an id".to_string()));
        }
        Ok(GatewayOrder {
            gateway_order_id: GatewayOrderId::new(entity.id),
            amount_minor: entity.amount,
            currency: entity.currency,
            key_id: self.config.key_id.clone(),
        })
    }
}

impl PaymentGateway for RazorpayGateway {
    fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, PaymentError> {
        let body = serde_json::to_vec(&CreateOrderBody {
            amount: request.amount_minor,
            currency: &request.currency,
            receipt: &request.receipt,
        })
        .map_err(|err| PaymentError::Gateway(err.to_string()))?;
        let response = self
            .client
            .post(self.orders_url.as_str())
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| PaymentError::Transport(err.without_url().to_string()))?;
        self.read_order(response)
    }

    fn fetch_order(&self, id: &GatewayOrderId) -> Result<GatewayOrder, PaymentError> {
        let url = order_url(&self.orders_url, id)?;
        let response = self
            .client
            .get(url.as_str())
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .send()
            .map_err(|err| PaymentError::Transport(err.without_url().to_string()))?;
        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
            return Err(PaymentError::Rejected(format!("unknown gateway order {id}")));
        }
        let order = self.read_order(response)?;
        if order.gateway_order_id != *id {
            return Err(PaymentError::Gateway(format!(
                "order lookup for {id} returned {}",
                order.gateway_order_id
            )));
        }
        Ok(order)
    }

    fn verify_payment(&self, proof: &PaymentProof) -> Result<(), PaymentError> {
        if verify_signature(&self.config.key_secret, proof) {
            Ok(())
        } else {
            Err(PaymentError::Rejected("payment signature mismatch".to_string()))
        }
    }
}

/// Resolves the order endpoint beneath the base URL.
fn orders_url(base_url: &str) -> Result<Url, RazorpayConfigError> {
    let mut base =
        Url::parse(base_url).map_err(|err| RazorpayConfigError::Invalid(err.to_string()))?;
    match base.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RazorpayConfigError::Invalid(format!("unsupported scheme: {scheme}")));
        }
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("v1/orders").map_err(|err| RazorpayConfigError::Invalid(err.to_string()))
}

/// Resolves one order's endpoint; the identifier is percent-encoded as a
/// single path segment.
fn order_url(orders_url: &Url, id: &GatewayOrderId) -> Result<Url, PaymentError> {
    if id.as_str().trim().is_empty() {
        return Err(PaymentError::Rejected("gateway order id is empty".to_string()));
    }
    let mut url = orders_url.clone();
    url.path_segments_mut()
        .map_err(|()| PaymentError::Gateway("orders url cannot take a path".to_string()))?
        .push(id.as_str());
    Ok(url)
}

/// Reads a response body, failing when it exceeds [`MAX_RESPONSE_BYTES`].
fn read_limited(response: reqwest::blocking::Response) -> Result<Vec<u8>, PaymentError> {
    if let Some(length) = response.content_length()
        && length > MAX_RESPONSE_BYTES
    {
        return Err(PaymentError::Gateway(format!("response too large: {length} bytes")));
    }
    let mut bytes = Vec::new();
    response
        .take(MAX_RESPONSE_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|err| PaymentError::Transport(err.to_string()))?;
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_RESPONSE_BYTES {
        return Err(PaymentError::Gateway("response too large".to_string()));
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
