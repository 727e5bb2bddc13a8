// crates/photoparkk-core/src/runtime/orders.rs
// ============================================================================
// Module: PhotoParkk Order Desk
// Description: Admin listing and status lifecycle of placed orders.
// Purpose: Advance order status along allowed edges without touching snapshots.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! [`OrderDesk`] is the admin view over placed orders. Only the status of an
//! order changes after placement; the item snapshot, delivery details, and
//! payment annotation are never rewritten.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::OrderError;
use crate::core::OrderId;
use crate::core::OrderRecord;
use crate::core::OrderStatus;
use crate::interfaces::OrderStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Order Desk
// ============================================================================

/// Order desk errors.
#[derive(Debug, Error)]
pub enum OrderDeskError {
    /// Order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),
    /// Status change is not allowed.
    #[error(transparent)]
    Transition(#[from] OrderError),
    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Admin view over placed orders.
pub struct OrderDesk<O> {
    /// Order persistence.
    orders: O,
}

impl<O: OrderStore> OrderDesk<O> {
    /// Creates an order desk.
    #[must_use]
    pub const fn new(orders: O) -> Self {
        Self {
            orders,
        }
    }

    /// Lists orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDeskError::Store`] when listing fails.
    pub fn list_orders(&self) -> Result<Vec<OrderRecord>, OrderDeskError> {
        Ok(self.orders.list_orders()?)
    }

    /// Loads one order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDeskError::NotFound`] when the order does not exist.
    pub fn get_order(&self, id: &OrderId) -> Result<OrderRecord, OrderDeskError> {
        self.orders.load_order(id)?.ok_or_else(|| OrderDeskError::NotFound(id.clone()))
    }

    /// Moves an order to `next` and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDeskError`] when the order is missing or the edge is not allowed.
    pub fn advance_status(
        &self,
        id: &OrderId,
        next: OrderStatus,
    ) -> Result<OrderRecord, OrderDeskError> {
        let mut record = self.get_order(id)?;
        record.advance(next)?;
        self.orders.save_order_status(id, record.status)?;
        Ok(record)
    }
}
