// crates/photoparkk-core/src/runtime/store.rs
// ============================================================================
// Module: PhotoParkk In-Memory Stores
// Description: In-memory catalog, order, and session stores plus shared wrappers.
// Purpose: Provide deterministic store implementations without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of [`CatalogStore`],
//! [`OrderStore`], and [`SessionStore`] for tests and local runs, and the
//! `Arc`-backed shared wrappers hosts use to hand one backend to several
//! services.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

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
use crate::interfaces::CatalogStore;
use crate::interfaces::GatewayOrder;
use crate::interfaces::GatewayOrderRequest;
use crate::interfaces::ImageStore;
use crate::interfaces::ImageStoreError;
use crate::interfaces::OrderStore;
use crate::interfaces::PaymentError;
use crate::interfaces::PaymentGateway;
use crate::interfaces::SessionStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Catalog Store
// ============================================================================

/// Mutable state of the in-memory catalog.
#[derive(Debug, Default)]
struct CatalogState {
    /// Last assigned numeric identifier.
    last_id: u64,
    /// Shapes keyed by numeric identifier.
    shapes: BTreeMap<u64, Shape>,
}

/// In-memory catalog store for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogStore {
    /// Catalog state protected by a mutex.
    state: Arc<Mutex<CatalogState>>,
}

impl InMemoryCatalogStore {
    /// Creates an empty in-memory catalog store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the catalog state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CatalogState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Store("catalog store mutex poisoned".to_string()))
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn list_shapes(&self) -> Result<Vec<Shape>, StoreError> {
        Ok(self.lock()?.shapes.values().cloned().collect())
    }

    fn load_shape(&self, id: &ShapeId) -> Result<Option<Shape>, StoreError> {
        let Some(key) = parse_numeric_id(id.as_str()) else {
            return Ok(None);
        };
        Ok(self.lock()?.shapes.get(&key).cloned())
    }

    fn create_shape(&self, shape: &Shape) -> Result<ShapeId, StoreError> {
        ensure_no_pending_uploads(shape)?;
        let mut guard = self.lock()?;
        guard.last_id += 1;
        let key = guard.last_id;
        let id = ShapeId::new(key.to_string());
        let mut stored = shape.clone();
        stored.id = Some(id.clone());
        guard.shapes.insert(key, stored);
        drop(guard);
        Ok(id)
    }

    fn replace_shape(&self, id: &ShapeId, shape: &Shape) -> Result<(), StoreError> {
        ensure_no_pending_uploads(shape)?;
        let not_found = || StoreError::NotFound(format!("shape {id}"));
        let key = parse_numeric_id(id.as_str()).ok_or_else(not_found)?;
        let mut guard = self.lock()?;
        let slot = guard.shapes.get_mut(&key).ok_or_else(not_found)?;
        let mut stored = shape.clone();
        stored.id = Some(id.clone());
        *slot = stored;
        drop(guard);
        Ok(())
    }

    fn delete_shape(&self, id: &ShapeId) -> Result<bool, StoreError> {
        let Some(key) = parse_numeric_id(id.as_str()) else {
            return Ok(false);
        };
        Ok(self.lock()?.shapes.remove(&key).is_some())
    }
}

/// Rejects shapes that still carry local files.
fn ensure_no_pending_uploads(shape: &Shape) -> Result<(), StoreError> {
    if shape.pending_uploads().is_empty() {
        Ok(())
    } else {
        Err(StoreError::Invalid("shape has frame images awaiting upload".to_string()))
    }
}

/// Parses a store-assigned decimal identifier.
fn parse_numeric_id(value: &str) -> Option<u64> {
    value.parse::<u64>().ok().filter(|id| *id > 0)
}

// ============================================================================
// SECTION: In-Memory Order Store
// ============================================================================

/// Mutable state of the in-memory order book.
#[derive(Debug, Default)]
struct OrderState {
    /// Last assigned numeric identifier.
    last_id: u64,
    /// Orders keyed by numeric identifier.
    orders: BTreeMap<u64, OrderRecord>,
}

/// In-memory order store for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderStore {
    /// Order state protected by a mutex.
    state: Arc<Mutex<OrderState>>,
}

impl InMemoryOrderStore {
    /// Creates an empty in-memory order store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the order state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, OrderState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Store("order store mutex poisoned".to_string()))
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert_order(
        &self,
        draft: OrderDraft,
        placed_at: Timestamp,
        currency: &str,
    ) -> Result<OrderRecord, StoreError> {
        let mut guard = self.lock()?;
        if let Some(handle) = draft.payment.gateway_order_id()
            && guard.orders.values().any(|order| order.payment.gateway_order_id() == Some(handle))
        {
            return Err(StoreError::Conflict(format!(
                "gateway order {handle} already has an order"
            )));
        }
        let key = guard.last_id + 1;
        let record = OrderRecord::placed(OrderId::new(key.to_string()), draft, placed_at, currency)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        guard.last_id = key;
        guard.orders.insert(key, record.clone());
        drop(guard);
        Ok(record)
    }

    fn load_order(&self, id: &OrderId) -> Result<Option<OrderRecord>, StoreError> {
        let Some(key) = parse_numeric_id(id.as_str()) else {
            return Ok(None);
        };
        Ok(self.lock()?.orders.get(&key).cloned())
    }

    fn list_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self.lock()?.orders.values().rev().cloned().collect())
    }

    fn save_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), StoreError> {
        let not_found = || StoreError::NotFound(format!("order {id}"));
        let key = parse_numeric_id(id.as_str()).ok_or_else(not_found)?;
        let mut guard = self.lock()?;
        let record = guard.orders.get_mut(&key).ok_or_else(not_found)?;
        record.status = status;
        drop(guard);
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Session Store
// ============================================================================

/// In-memory session snapshot store.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionStore {
    /// Snapshots keyed by session key.
    sessions: Arc<Mutex<BTreeMap<String, SessionSnapshot>>>,
}

impl InMemorySessionStore {
    /// Creates an empty in-memory session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load_session(&self, key: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|_| StoreError::Store("session store mutex poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn save_session(&self, key: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Store("session store mutex poisoned".to_string()))?
            .insert(key.to_string(), snapshot.clone());
        Ok(())
    }

    fn clear_session(&self, key: &str) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Store("session store mutex poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Wrappers
// ============================================================================

/// Shared catalog store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedCatalogStore {
    /// Inner store implementation.
    inner: Arc<dyn CatalogStore + Send + Sync>,
}

impl SharedCatalogStore {
    /// Wraps a catalog store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl CatalogStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn CatalogStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl CatalogStore for SharedCatalogStore {
    fn list_shapes(&self) -> Result<Vec<Shape>, StoreError> {
        self.inner.list_shapes()
    }

    fn load_shape(&self, id: &ShapeId) -> Result<Option<Shape>, StoreError> {
        self.inner.load_shape(id)
    }

    fn create_shape(&self, shape: &Shape) -> Result<ShapeId, StoreError> {
        self.inner.create_shape(shape)
    }

    fn replace_shape(&self, id: &ShapeId, shape: &Shape) -> Result<(), StoreError> {
        self.inner.replace_shape(id, shape)
    }

    fn delete_shape(&self, id: &ShapeId) -> Result<bool, StoreError> {
        self.inner.delete_shape(id)
    }
}

/// Shared order store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedOrderStore {
    /// Inner store implementation.
    inner: Arc<dyn OrderStore + Send + Sync>,
}

impl SharedOrderStore {
    /// Wraps an order store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl OrderStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn OrderStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl OrderStore for SharedOrderStore {
    fn insert_order(
        &self,
        draft: OrderDraft,
        placed_at: Timestamp,
        currency: &str,
    ) -> Result<OrderRecord, StoreError> {
        self.inner.insert_order(draft, placed_at, currency)
    }

    fn load_order(&self, id: &OrderId) -> Result<Option<OrderRecord>, StoreError> {
        self.inner.load_order(id)
    }

    fn list_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        self.inner.list_orders()
    }

    fn save_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), StoreError> {
        self.inner.save_order_status(id, status)
    }
}

/// Shared image store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedImageStore {
    /// Inner store implementation.
    inner: Arc<dyn ImageStore + Send + Sync>,
}

impl SharedImageStore {
    /// Wraps an image store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl ImageStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }
}

impl ImageStore for SharedImageStore {
    fn put_image(&self, bytes: &[u8], content_type: &str) -> Result<ImageUrl, ImageStoreError> {
        self.inner.put_image(bytes, content_type)
    }
}

/// Shared payment gateway backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedPaymentGateway {
    /// Inner gateway implementation.
    inner: Arc<dyn PaymentGateway + Send + Sync>,
}

impl SharedPaymentGateway {
    /// Wraps a payment gateway in a shared, clonable wrapper.
    #[must_use]
    pub fn from_gateway(gateway: impl PaymentGateway + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(gateway),
        }
    }
}

impl PaymentGateway for SharedPaymentGateway {
    fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, PaymentError> {
        self.inner.create_order(request)
    }

    fn fetch_order(&self, id: &GatewayOrderId) -> Result<GatewayOrder, PaymentError> {
        self.inner.fetch_order(id)
    }

    fn verify_payment(&self, proof: &PaymentProof) -> Result<(), PaymentError> {
        self.inner.verify_payment(proof)
    }
}
