// crates/photoparkk-payments/src/disabled.rs
// ============================================================================
// Module: Disabled Gateway
// Description: Gateway used when online payments are not configured.
// Purpose: Fail online checkout closed while cash on delivery keeps working.
// Dependencies: photoparkk-core
// ============================================================================

//! ## Overview
//! [`DisabledGateway`] answers every gateway call with
//! [`PaymentError::Disabled`], so hosts without gateway credentials still
//! serve cash-on-delivery checkout and report online payment as unavailable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use photoparkk_core::GatewayOrder;
use photoparkk_core::GatewayOrderId;
use photoparkk_core::GatewayOrderRequest;
use photoparkk_core::PaymentError;
use photoparkk_core::PaymentGateway;
use photoparkk_core::PaymentProof;

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Gateway that refuses every online payment operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

impl PaymentGateway for DisabledGateway {
    fn create_order(&self, _request: &GatewayOrderRequest) -> Result<GatewayOrder, PaymentError> {
        Err(PaymentError::Disabled)
    }

    fn fetch_order(&self, _id: &GatewayOrderId) -> Result<GatewayOrder, PaymentError> {
        Err(PaymentError::Disabled)
    }

    fn verify_payment(&self, _proof: &PaymentProof) -> Result<(), PaymentError> {
        Err(PaymentError::Disabled)
    }
}
