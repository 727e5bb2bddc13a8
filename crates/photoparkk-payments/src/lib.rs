// crates/photoparkk-payments/src/lib.rs
// ============================================================================
// Module: PhotoParkk Payments
// Description: Payment gateway adapters for online checkout.
// Purpose: Create gateway orders and verify client-returned payment proofs.
// Dependencies: photoparkk-core, reqwest, hmac, sha2, subtle, url
// ============================================================================

//! ## Overview
//! Implements [`photoparkk_core::PaymentGateway`] for a Razorpay-compatible
//! API ([`RazorpayGateway`]) and for deployments without online payments
//! ([`DisabledGateway`]).
//!
//! Invariants:
//! - Payment proofs are verified locally with HMAC-SHA256 over
//!   `"{order_id}|{payment_id}"` and compared in constant time.
//! - Gateway calls are single attempts with a fixed timeout; redirects are
//!   rejected.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod disabled;
pub mod razorpay;
pub mod signature;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use disabled::DisabledGateway;
pub use razorpay::RazorpayConfig;
pub use razorpay::RazorpayConfigError;
pub use razorpay::RazorpayGateway;
pub use signature::payment_signature;
pub use signature::verify_signature;
