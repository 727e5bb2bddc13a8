// crates/photoparkk-core/src/core/order.rs
// ============================================================================
// Module: PhotoParkk Orders
// Description: Order snapshots, delivery details, payment annotations, and status.
// Purpose: Capture a point-in-time copy of a customization as a persisted order.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! An order never references the live catalog. [`OrderItem`] is a
//! denormalized snapshot of the selected shape, color, style, frame title,
//! size label, unit price, and quantity, so later catalog edits or deletions
//! cannot change a placed order. Delivery details are validated before any
//! payment call is made. Once placed, only the [`OrderStatus`] changes, and
//! only along the allowed lifecycle edges.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::GatewayOrderId;
use crate::core::identifiers::ImageUrl;
use crate::core::identifiers::OrderId;
use crate::core::identifiers::PaymentId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Delivery Details
// ============================================================================

/// Fulfillment method selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentMethod {
    /// Pay through the payment gateway before the order is placed.
    Online,
    /// Pay the courier on delivery.
    #[serde(alias = "COD")]
    CashOnDelivery,
}

impl FulfillmentMethod {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::CashOnDelivery => "CASH_ON_DELIVERY",
        }
    }
}

impl fmt::Display for FulfillmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer delivery details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliveryDetails {
    /// Recipient name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Street address.
    pub address: String,
    /// State or region.
    pub state: String,
    /// City.
    pub city: String,
    /// Six-digit postal code.
    pub pincode: String,
}

/// Delivery detail validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The email address is malformed.
    #[error("email address is invalid")]
    InvalidEmail,
    /// The phone number is not a ten-digit number.
    #[error("phone number must have 10 digits")]
    InvalidPhone,
    /// The pincode is not six digits.
    #[error("pincode must have 6 digits")]
    InvalidPincode,
}

impl DeliveryDetails {
    /// Validates delivery details.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] for the first empty or malformed field.
    pub fn validate(&self) -> Result<(), DeliveryError> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("state", &self.state),
            ("city", &self.city),
            ("pincode", &self.pincode),
        ];
        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(DeliveryError::MissingField(label));
            }
        }
        if !is_valid_email(self.email.trim()) {
            return Err(DeliveryError::InvalidEmail);
        }
        if !is_valid_phone(self.phone.trim()) {
            return Err(DeliveryError::InvalidPhone);
        }
        let pincode = self.pincode.trim();
        if pincode.len() != 6 || !pincode.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DeliveryError::InvalidPincode);
        }
        Ok(())
    }
}

/// Checks for a local part, an `@`, and a dotted domain.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Accepts ten digits with an optional `+91` prefix.
fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix("+91").map_or(phone, str::trim_start);
    digits.len() == 10 && digits.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// SECTION: Order Snapshot
// ============================================================================

/// Denormalized snapshot of one customized frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Shape name.
    pub shape: String,
    /// Color name.
    pub color: String,
    /// Style name.
    pub style: String,
    /// Frame image title.
    pub title: String,
    /// Size label.
    pub size: String,
    /// Unit price in whole currency units.
    pub price: u64,
    /// Number of frames.
    pub quantity: u32,
    /// Preview of the selected frame design.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_image_url: Option<ImageUrl>,
    /// Customer photo to be framed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_image_url: Option<ImageUrl>,
}

impl OrderItem {
    /// Returns `price × quantity`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.price.checked_mul(u64::from(self.quantity))
    }

    /// Checks quantity and price, returning the line total.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] when the quantity or price is zero, or the total overflows.
    pub fn checked_total(&self) -> Result<u64, OrderError> {
        if self.quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }
        if self.price == 0 {
            return Err(OrderError::InvalidPrice);
        }
        self.line_total().ok_or(OrderError::TotalOverflow)
    }
}

/// Gateway-issued proof that an online payment succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    /// Gateway order handle the payment was made against.
    pub gateway_order_id: GatewayOrderId,
    /// Gateway payment identifier.
    pub payment_id: PaymentId,
    /// Gateway signature over the order and payment identifiers.
    pub signature: String,
}

/// Payment annotation carried by an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPayment {
    /// Cash on delivery; nothing collected yet.
    CashOnDelivery,
    /// Verified online payment.
    Online {
        /// Gateway order handle.
        #[serde(rename = "gatewayOrderId")]
        gateway_order_id: GatewayOrderId,
        /// Gateway payment identifier.
        #[serde(rename = "paymentId")]
        payment_id: PaymentId,
        /// Gateway signature.
        signature: String,
    },
}

impl OrderPayment {
    /// Returns the fulfillment method this payment corresponds to.
    #[must_use]
    pub const fn method(&self) -> FulfillmentMethod {
        match self {
            Self::CashOnDelivery => FulfillmentMethod::CashOnDelivery,
            Self::Online {
                ..
            } => FulfillmentMethod::Online,
        }
    }

    /// Returns the gateway order handle for online payments.
    #[must_use]
    pub const fn gateway_order_id(&self) -> Option<&GatewayOrderId> {
        match self {
            Self::CashOnDelivery => None,
            Self::Online {
                gateway_order_id,
                ..
            } => Some(gateway_order_id),
        }
    }
}

impl From<PaymentProof> for OrderPayment {
    fn from(proof: PaymentProof) -> Self {
        Self::Online {
            gateway_order_id: proof.gateway_order_id,
            payment_id: proof.payment_id,
            signature: proof.signature,
        }
    }
}

/// Order ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Optional customer reference supplied by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Delivery details.
    pub delivery: DeliveryDetails,
    /// Item snapshot.
    pub item: OrderItem,
    /// Payment annotation.
    pub payment: OrderPayment,
}

// ============================================================================
// SECTION: Order Lifecycle
// ============================================================================

/// Fulfillment status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted and awaiting processing.
    Placed,
    /// Being produced.
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}

impl OrderStatus {
    /// Returns true when `next` is an allowed successor.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Placed, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Returns true for statuses with no successor.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Returns the stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order construction and lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Quantity is zero.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    /// Unit price is zero.
    #[error("price must be greater than zero")]
    InvalidPrice,
    /// Order total does not fit in the amount type.
    #[error("order total overflows")]
    TotalOverflow,
    /// Status change is not an allowed lifecycle edge.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
}

/// Persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Order identifier.
    pub id: OrderId,
    /// Time the order was placed.
    pub placed_at: Timestamp,
    /// Current fulfillment status.
    pub status: OrderStatus,
    /// Optional customer reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Delivery details.
    pub delivery: DeliveryDetails,
    /// Item snapshot.
    pub item: OrderItem,
    /// `price × quantity` at placement time.
    pub total_amount: u64,
    /// ISO currency code of all amounts.
    pub currency: String,
    /// Payment annotation.
    pub payment: OrderPayment,
}

impl OrderRecord {
    /// Builds a freshly placed order from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] when the item has a zero quantity or price, or the total overflows.
    pub fn placed(
        id: OrderId,
        draft: OrderDraft,
        placed_at: Timestamp,
        currency: impl Into<String>,
    ) -> Result<Self, OrderError> {
        let total_amount = draft.item.checked_total()?;
        Ok(Self {
            id,
            placed_at,
            status: OrderStatus::Placed,
            customer_id: draft.customer_id,
            delivery: draft.delivery,
            item: draft.item,
            total_amount,
            currency: currency.into(),
            payment: draft.payment,
        })
    }

    /// Moves the order to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] when the edge is not allowed.
    pub const fn advance(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
