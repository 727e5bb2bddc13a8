// crates/photoparkk-payments/src/signature.rs
// ============================================================================
// Module: Payment Signatures
// Description: HMAC-SHA256 payment proof signatures.
// Purpose: Verify that a payment proof was issued by the gateway.
// Dependencies: hmac, sha2, hex, subtle
// ============================================================================

//! ## Overview
//! The gateway signs `"{order_id}|{payment_id}"` with the merchant key
//! secret and returns the lowercase hex digest to the client. The server
//! recomputes it and compares without early exit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hmac::Hmac;
use hmac::Mac;
use photoparkk_core::PaymentProof;
use sha2::Sha256;
use subtle::ConstantTimeEq;

// ============================================================================
// SECTION: Signatures
// ============================================================================

/// HMAC-SHA256 keyed with the merchant secret.
type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase hex signature for an order and payment pair.
#[must_use]
pub fn payment_signature(secret: &str, gateway_order_id: &str, payment_id: &str) -> String {
    // HMAC accepts keys of any length.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Returns true when the proof's signature matches the secret.
#[must_use]
pub fn verify_signature(secret: &str, proof: &PaymentProof) -> bool {
    if secret.is_empty() {
        return false;
    }
    let expected =
        payment_signature(secret, proof.gateway_order_id.as_str(), proof.payment_id.as_str());
    let provided = proof.signature.trim().to_ascii_lowercase();
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
