// crates/photoparkk-core/src/runtime/checkout.rs
// ============================================================================
// Module: PhotoParkk Checkout
// Description: Order submission over an order store and a payment gateway.
// Purpose: Turn a finished customization plus delivery details into a placed order.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! [`CheckoutService`] places orders for both fulfillment methods:
//! - Cash on delivery persists the snapshot immediately.
//! - Online payment first obtains a gateway order handle
//!   ([`CheckoutService::begin_online_payment`]), then the host runs the
//!   gateway's client flow and reports its outcome
//!   ([`CheckoutService::complete_online_payment`]). Success is verified and
//!   persisted; cancellation places nothing and is not an error; failure
//!   places nothing and is an error.
//!
//! Delivery details are validated before any gateway call. No step retries.
//! [`CheckoutService::submit`] accepts an online proof only when the gateway
//! order it names was opened for the item total in the configured currency,
//! and the order store refuses a second order for the same gateway order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Catalog;
use crate::core::CustomizationSession;
use crate::core::DeliveryDetails;
use crate::core::DeliveryError;
use crate::core::FulfillmentMethod;
use crate::core::OrderDraft;
use crate::core::OrderError;
use crate::core::OrderItem;
use crate::core::OrderPayment;
use crate::core::OrderRecord;
use crate::core::PaymentId;
use crate::core::PaymentProof;
use crate::core::SelectionError;
use crate::core::Timestamp;
use crate::interfaces::CatalogStore;
use crate::interfaces::GatewayOrder;
use crate::interfaces::GatewayOrderRequest;
use crate::interfaces::OrderStore;
use crate::interfaces::PaymentError;
use crate::interfaces::PaymentGateway;
use crate::interfaces::StoreError;
use crate::runtime::pricing::PriceCheckError;
use crate::runtime::pricing::PricePolicy;
use crate::runtime::pricing::reconcile_item;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default storefront currency.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Minor units per whole currency unit.
const MINOR_UNITS_PER_UNIT: u64 = 100;

// ============================================================================
// SECTION: Requests and Outcomes
// ============================================================================

/// Finished customization with delivery details, ready for checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Optional customer reference.
    pub customer_id: Option<String>,
    /// Delivery details.
    pub delivery: DeliveryDetails,
    /// Item snapshot.
    pub item: OrderItem,
    /// Chosen fulfillment method.
    pub method: FulfillmentMethod,
}

impl CheckoutRequest {
    /// Builds a request from a customization session.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when the session is not ready for checkout.
    pub fn from_session(
        session: &CustomizationSession<'_>,
        delivery: DeliveryDetails,
        method: FulfillmentMethod,
    ) -> Result<Self, SelectionError> {
        Ok(Self {
            customer_id: None,
            delivery,
            item: session.proceed_to_checkout()?,
            method,
        })
    }

    /// Attaches a customer reference.
    #[must_use]
    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }
}

/// Online payment awaiting the gateway's client-side outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPayment {
    /// Request being paid for.
    pub request: CheckoutRequest,
    /// Gateway order handle for the client flow.
    pub gateway_order: GatewayOrder,
}

/// Outcome reported by the gateway's client flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Customer paid; the gateway returned a payment id and signature.
    Succeeded {
        /// Gateway payment identifier.
        payment_id: PaymentId,
        /// Gateway signature.
        signature: String,
    },
    /// Customer dismissed the payment flow.
    Cancelled,
    /// Gateway reported a failed payment.
    Failed {
        /// Gateway-provided reason.
        reason: String,
    },
}

/// Result of completing an online payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Order was persisted.
    Placed(Box<OrderRecord>),
    /// Customer cancelled; nothing was persisted.
    Cancelled,
}

/// Checkout errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Session was incomplete.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// Delivery details were invalid.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    /// Item snapshot was invalid.
    #[error(transparent)]
    Order(#[from] OrderError),
    /// Submitted snapshot disagrees with the catalog.
    #[error(transparent)]
    PriceCheck(#[from] PriceCheckError),
    /// Gateway call or verification failed.
    #[error(transparent)]
    Payment(#[from] PaymentError),
    /// Gateway reported a failed payment.
    #[error("payment failed: {0}")]
    PaymentFailed(String),
    /// Request used the wrong entry point for its fulfillment method.
    #[error("checkout method mismatch: expected {expected}")]
    MethodMismatch {
        /// Method the entry point handles.
        expected: FulfillmentMethod,
    },
    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Checkout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// ISO currency code for all amounts.
    pub currency: String,
    /// Treatment of submitted prices.
    pub price_policy: PricePolicy,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            price_policy: PricePolicy::default(),
        }
    }
}

/// Order submission service.
pub struct CheckoutService<O, P, C> {
    /// Order persistence.
    orders: O,
    /// Payment gateway.
    gateway: P,
    /// Catalog consulted under [`PricePolicy::Catalog`].
    catalog: C,
    /// Checkout settings.
    config: CheckoutConfig,
}

impl<O, P, C> CheckoutService<O, P, C>
where
    O: OrderStore,
    P: PaymentGateway,
    C: CatalogStore,
{
    /// Creates a checkout service.
    #[must_use]
    pub const fn new(orders: O, gateway: P, catalog: C, config: CheckoutConfig) -> Self {
        Self {
            orders,
            gateway,
            catalog,
            config,
        }
    }

    /// Returns the checkout settings.
    #[must_use]
    pub const fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Places a cash-on-delivery order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] when validation or persistence fails.
    pub fn place_cash_on_delivery(
        &self,
        request: CheckoutRequest,
        placed_at: Timestamp,
    ) -> Result<OrderRecord, CheckoutError> {
        ensure_method(&request, FulfillmentMethod::CashOnDelivery)?;
        self.check_request(&request)?;
        self.persist(request, OrderPayment::CashOnDelivery, placed_at)
    }

    /// Obtains a gateway order handle for an online payment.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] when validation fails or the gateway refuses.
    pub fn begin_online_payment(
        &self,
        request: CheckoutRequest,
        receipt: impl Into<String>,
    ) -> Result<PendingPayment, CheckoutError> {
        ensure_method(&request, FulfillmentMethod::Online)?;
        let total = self.check_request(&request)?;
        let gateway_order = self.create_gateway_order(total, receipt.into())?;
        Ok(PendingPayment {
            request,
            gateway_order,
        })
    }

    /// Creates a gateway order handle for a whole-unit amount.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] when the amount overflows or the gateway refuses.
    pub fn create_gateway_order(
        &self,
        amount: u64,
        receipt: String,
    ) -> Result<GatewayOrder, CheckoutError> {
        let amount_minor = minor_units(amount)?;
        let order = self.gateway.create_order(&GatewayOrderRequest {
            amount_minor,
            currency: self.config.currency.clone(),
            receipt,
        })?;
        if order.amount_minor != amount_minor {
            return Err(PaymentError::Gateway(format!(
                "gateway order amount {} does not match requested {amount_minor}",
                order.amount_minor
            ))
            .into());
        }
        Ok(order)
    }

    /// Completes an online payment with the gateway's client-side outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::PaymentFailed`] for a failed payment, or an
    /// error when verification or persistence fails.
    pub fn complete_online_payment(
        &self,
        pending: PendingPayment,
        outcome: PaymentOutcome,
        placed_at: Timestamp,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        match outcome {
            PaymentOutcome::Cancelled => Ok(CheckoutOutcome::Cancelled),
            PaymentOutcome::Failed {
                reason,
            } => Err(CheckoutError::PaymentFailed(reason)),
            PaymentOutcome::Succeeded {
                payment_id,
                signature,
            } => {
                let total = pending.request.item.checked_total()?;
                ensure_paid_amount(&pending.gateway_order, total, &self.config.currency)?;
                let proof = PaymentProof {
                    gateway_order_id: pending.gateway_order.gateway_order_id,
                    payment_id,
                    signature,
                };
                self.gateway.verify_payment(&proof)?;
                let record = self.persist(pending.request, proof.into(), placed_at)?;
                Ok(CheckoutOutcome::Placed(Box::new(record)))
            }
        }
    }

    /// Places a fully formed draft, verifying any online payment proof first.
    ///
    /// An online proof must verify and its gateway order must have been opened
    /// for exactly the item total. Each gateway order places at most one order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Payment`] when the proof or the paid amount is
    /// rejected, [`CheckoutError::Store`] with [`StoreError::Conflict`] when the
    /// gateway order was already used, or another [`CheckoutError`] when
    /// validation or persistence fails.
    pub fn submit(
        &self,
        draft: OrderDraft,
        placed_at: Timestamp,
    ) -> Result<OrderRecord, CheckoutError> {
        let request = CheckoutRequest {
            customer_id: draft.customer_id,
            delivery: draft.delivery,
            item: draft.item,
            method: draft.payment.method(),
        };
        let total = self.check_request(&request)?;
        if let OrderPayment::Online {
            gateway_order_id,
            payment_id,
            signature,
        } = &draft.payment
        {
            self.gateway.verify_payment(&PaymentProof {
                gateway_order_id: gateway_order_id.clone(),
                payment_id: payment_id.clone(),
                signature: signature.clone(),
            })?;
            let paid = self.gateway.fetch_order(gateway_order_id)?;
            ensure_paid_amount(&paid, total, &self.config.currency)?;
        }
        self.persist(request, draft.payment, placed_at)
    }

    /// Validates delivery details, item totals, and the price policy.
    fn check_request(&self, request: &CheckoutRequest) -> Result<u64, CheckoutError> {
        request.delivery.validate()?;
        let total = request.item.checked_total()?;
        if self.config.price_policy.requires_catalog() {
            let catalog = Catalog::new(self.catalog.list_shapes()?);
            reconcile_item(&catalog, &request.item)?;
        }
        Ok(total)
    }

    /// Persists a validated request.
    fn persist(
        &self,
        request: CheckoutRequest,
        payment: OrderPayment,
        placed_at: Timestamp,
    ) -> Result<OrderRecord, CheckoutError> {
        let draft = OrderDraft {
            customer_id: request.customer_id,
            delivery: request.delivery,
            item: request.item,
            payment,
        };
        Ok(self.orders.insert_order(draft, placed_at, &self.config.currency)?)
    }
}

/// Converts a whole-unit amount into minor units.
fn minor_units(amount: u64) -> Result<u64, OrderError> {
    amount.checked_mul(MINOR_UNITS_PER_UNIT).ok_or(OrderError::TotalOverflow)
}

/// Rejects a gateway order that was not opened for the order total.
fn ensure_paid_amount(
    paid: &GatewayOrder,
    total: u64,
    currency: &str,
) -> Result<(), CheckoutError> {
    let amount_minor = minor_units(total)?;
    if paid.amount_minor == amount_minor && paid.currency == currency {
        return Ok(());
    }
    Err(PaymentError::Rejected(format!(
        "gateway order {} covers {} {} but the order totals {amount_minor} {currency}",
        paid.gateway_order_id, paid.amount_minor, paid.currency
    ))
    .into())
}

/// Rejects requests routed to the wrong entry point.
fn ensure_method(
    request: &CheckoutRequest,
    expected: FulfillmentMethod,
) -> Result<(), CheckoutError> {
    if request.method == expected {
        Ok(())
    } else {
        Err(CheckoutError::MethodMismatch {
            expected,
        })
    }
}
