// crates/photoparkk-core/src/interfaces/mod.rs
// ============================================================================
// Module: PhotoParkk Interfaces
// Description: Backend-agnostic seams for persistence, images, and payments.
// Purpose: Let hosts plug in stores and gateways without touching core logic.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define the boundaries the core services depend on: catalog and
//! order persistence, image storage, the payment gateway, and session
//! snapshot storage. Implementations must be deterministic about failures and
//! must never return partially written state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::GatewayOrderId;
use crate::core::ImageUrl;
use crate::core::OrderDraft;
use crate::core::OrderId;
use crate::core::OrderRecord;
use crate::core::OrderStatus;
use crate::core::PaymentProof;
use crate::core::SessionSnapshot;
use crate::core::Shape;
use crate::core::ShapeId;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Catalog and order store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Addressed record does not exist.
    #[error("store record not found: {0}")]
    NotFound(String),
    /// Record collides with an existing one.
    #[error("store conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Catalog Store
// ============================================================================

/// Persistence for shape aggregates.
///
/// Shapes are stored and returned whole; there is no partial update of nested entities.
pub trait CatalogStore {
    /// Lists every shape in creation order, fully nested.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_shapes(&self) -> Result<Vec<Shape>, StoreError>;

    /// Loads one shape.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load_shape(&self, id: &ShapeId) -> Result<Option<Shape>, StoreError>;

    /// Persists a new shape and returns its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persisting fails.
    fn create_shape(&self, shape: &Shape) -> Result<ShapeId, StoreError>;

    /// Replaces a whole shape aggregate. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the shape does not exist.
    fn replace_shape(&self, id: &ShapeId, shape: &Shape) -> Result<(), StoreError>;

    /// Deletes a shape and everything below it. Returns false when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete_shape(&self, id: &ShapeId) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Order Store
// ============================================================================

/// Persistence for placed orders.
pub trait OrderStore {
    /// Assigns an identifier to a draft and persists it as a placed order.
    ///
    /// A gateway order handle backs at most one placed order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the draft's gateway order handle
    /// already has an order, or [`StoreError`] when the draft is invalid or
    /// persisting fails.
    fn insert_order(
        &self,
        draft: OrderDraft,
        placed_at: Timestamp,
        currency: &str,
    ) -> Result<OrderRecord, StoreError>;

    /// Loads one order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load_order(&self, id: &OrderId) -> Result<Option<OrderRecord>, StoreError>;

    /// Lists orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_orders(&self) -> Result<Vec<OrderRecord>, StoreError>;

    /// Persists a new status for an existing order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the order does not exist.
    fn save_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Image Store
// ============================================================================

/// Image storage errors.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// Payload is not an acceptable image.
    #[error("image rejected: {0}")]
    Rejected(String),
    /// Payload exceeds the configured limit.
    #[error("image too large: {actual} bytes (max {limit})")]
    TooLarge {
        /// Payload size in bytes.
        actual: usize,
        /// Configured maximum in bytes.
        limit: usize,
    },
    /// Another upload into the same slot is in flight.
    #[error("upload already in progress for slot {0}")]
    SlotBusy(String),
    /// Storage I/O failed.
    #[error("image store io error: {0}")]
    Io(String),
}

/// Binary image storage returning stable URLs.
pub trait ImageStore {
    /// Stores one image and returns its URL.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError`] when the image is rejected or cannot be stored.
    fn put_image(&self, bytes: &[u8], content_type: &str) -> Result<ImageUrl, ImageStoreError>;
}

// ============================================================================
// SECTION: Payment Gateway
// ============================================================================

/// Request for a gateway order handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrderRequest {
    /// Amount in minor currency units (paise for INR).
    pub amount_minor: u64,
    /// ISO currency code.
    pub currency: String,
    /// Merchant receipt reference.
    pub receipt: String,
}

/// Gateway order handle used to open the payment flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    /// Gateway-issued order identifier.
    pub gateway_order_id: GatewayOrderId,
    /// Amount in minor currency units.
    pub amount_minor: u64,
    /// ISO currency code.
    pub currency: String,
    /// Public key identifier the client needs to open the payment flow.
    pub key_id: String,
}

/// Payment gateway errors.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Online payments are not configured.
    #[error("online payments are disabled")]
    Disabled,
    /// Payment proof failed verification.
    #[error("payment verification failed: {0}")]
    Rejected(String),
    /// Gateway could not be reached.
    #[error("payment gateway unreachable: {0}")]
    Transport(String),
    /// Gateway returned an error response.
    #[error("payment gateway error: {0}")]
    Gateway(String),
}

/// Third-party payment gateway.
pub trait PaymentGateway {
    /// Creates a gateway order handle for an amount.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] when the gateway rejects or cannot serve the request.
    fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, PaymentError>;

    /// Loads a gateway order handle previously created by [`Self::create_order`].
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Rejected`] when the gateway does not know the
    /// order, or [`PaymentError`] when the gateway cannot serve the request.
    fn fetch_order(&self, id: &GatewayOrderId) -> Result<GatewayOrder, PaymentError>;

    /// Verifies a payment proof returned by the gateway's client flow.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Rejected`] when the proof does not verify.
    fn verify_payment(&self, proof: &PaymentProof) -> Result<(), PaymentError>;
}

// ============================================================================
// SECTION: Session Store
// ============================================================================

/// Load/save adapter for customization session snapshots.
pub trait SessionStore {
    /// Loads a snapshot by key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load_session(&self, key: &str) -> Result<Option<SessionSnapshot>, StoreError>;

    /// Saves a snapshot under a key, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save_session(&self, key: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError>;

    /// Removes a snapshot, typically after a successful checkout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when removal fails.
    fn clear_session(&self, key: &str) -> Result<(), StoreError>;
}
