// crates/photoparkk-core/src/runtime/mod.rs
// ============================================================================
// Module: PhotoParkk Runtime
// Description: Services over the core model and its interfaces.
// Purpose: Provide checkout, admin catalog, order desk, and in-memory stores.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime services wire the core model to the backend interfaces. They hold
//! no global state; hosts construct them with the stores and gateway they
//! need and call them synchronously.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod admin;
pub mod checkout;
pub mod orders;
pub mod pricing;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use admin::AdminCatalogService;
pub use admin::AdminError;
pub use checkout::CheckoutConfig;
pub use checkout::CheckoutError;
pub use checkout::CheckoutOutcome;
pub use checkout::CheckoutRequest;
pub use checkout::CheckoutService;
pub use checkout::DEFAULT_CURRENCY;
pub use checkout::PaymentOutcome;
pub use checkout::PendingPayment;
pub use orders::OrderDesk;
pub use orders::OrderDeskError;
pub use pricing::PriceCheckError;
pub use pricing::PricePolicy;
pub use pricing::reconcile_item;
pub use store::InMemoryCatalogStore;
pub use store::InMemoryOrderStore;
pub use store::InMemorySessionStore;
pub use store::SharedCatalogStore;
pub use store::SharedImageStore;
pub use store::SharedOrderStore;
pub use store::SharedPaymentGateway;
