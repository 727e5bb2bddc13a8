// crates/photoparkk-core/src/lib.rs
// ============================================================================
// Module: PhotoParkk Core Library
// Description: Public API surface for the PhotoParkk frame catalog core.
// Purpose: Expose catalog types, interfaces, and runtime services.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! PhotoParkk core models a storefront of custom photo frames as a nested
//! catalog (shape, color, style, frame image, size), drives the customer's
//! cascading selections over it, and turns a finished customization into an
//! order snapshot that later catalog edits cannot alter. It is
//! backend-agnostic and integrates through explicit interfaces for
//! persistence, image storage, and payments.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::CatalogStore;
pub use interfaces::GatewayOrder;
pub use interfaces::GatewayOrderRequest;
pub use interfaces::ImageStore;
pub use interfaces::ImageStoreError;
pub use interfaces::OrderStore;
pub use interfaces::PaymentError;
pub use interfaces::PaymentGateway;
pub use interfaces::SessionStore;
pub use interfaces::StoreError;
pub use runtime::AdminCatalogService;
pub use runtime::AdminError;
pub use runtime::CheckoutConfig;
pub use runtime::CheckoutError;
pub use runtime::CheckoutOutcome;
pub use runtime::CheckoutRequest;
pub use runtime::CheckoutService;
pub use runtime::DEFAULT_CURRENCY;
pub use runtime::InMemoryCatalogStore;
pub use runtime::InMemoryOrderStore;
pub use runtime::InMemorySessionStore;
pub use runtime::OrderDesk;
pub use runtime::OrderDeskError;
pub use runtime::PaymentOutcome;
pub use runtime::PendingPayment;
pub use runtime::PriceCheckError;
pub use runtime::PricePolicy;
pub use runtime::SharedCatalogStore;
pub use runtime::SharedImageStore;
pub use runtime::SharedOrderStore;
pub use runtime::SharedPaymentGateway;
