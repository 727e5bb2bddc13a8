// crates/photoparkk-server/src/auth.rs
// ============================================================================
// Module: PhotoParkk Admin Authentication
// Description: Bearer-token gate for admin routes.
// Purpose: Authorize catalog writes and order-desk access.
// Dependencies: sha2, hex, subtle, thiserror
// ============================================================================

//! ## Overview
//! Admin routes accept `Authorization: Bearer <token>` checked in constant
//! time against the configured token list. With no tokens configured the gate
//! is open; configuration refuses that posture on non-loopback binds.
//! Authorized callers are identified in audit logs by a SHA-256 fingerprint of
//! their token, never the token itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an Authorization header value.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or invalid authentication.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
}

/// Authenticated admin caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminContext {
    /// SHA-256 fingerprint of the presented token; `None` when the gate is open.
    pub token_fingerprint: Option<String>,
}

/// Admin bearer-token gate.
#[derive(Clone, Default)]
pub struct AdminAuth {
    /// Accepted bearer tokens.
    tokens: Vec<String>,
}

impl AdminAuth {
    /// Builds a gate accepting the given tokens.
    #[must_use]
    pub const fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
        }
    }

    /// Returns true when no tokens are configured.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Authorizes an admin request from its Authorization header.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`] when tokens are configured and
    /// the header is missing, malformed, or carries an unknown token.
    pub fn authorize(&self, auth_header: Option<&str>) -> Result<AdminContext, AuthError> {
        if self.is_open() {
            return Ok(AdminContext::default());
        }
        let token = parse_bearer_token(auth_header)?;
        let matched = self.tokens.iter().fold(false, |found, known| {
            found | bool::from(known.as_bytes().ct_eq(token.as_bytes()))
        });
        if !matched {
            return Err(AuthError::Unauthenticated("invalid bearer token".to_string()));
        }
        Ok(AdminContext {
            token_fingerprint: Some(hex::encode(Sha256::digest(token.as_bytes()))),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the token from a `Bearer` Authorization header.
fn parse_bearer_token(auth_header: Option<&str>) -> Result<String, AuthError> {
    let header = auth_header
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization".to_string()))?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated("authorization header too large".to_string()));
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok(token.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    const TOKEN: &str = "admin-token-0123456789";

    #[test]
    fn open_gate_accepts_anything() {
        let auth = AdminAuth::default();
        let ctx = auth.authorize(None).unwrap();
        assert!(ctx.token_fingerprint.is_none());
    }

    #[test]
    fn known_token_is_fingerprinted() {
        let auth = AdminAuth::new(vec![TOKEN.to_string()]);
        let ctx = auth.authorize(Some(&format!("bearer {TOKEN}"))).unwrap();
        let fingerprint = ctx.token_fingerprint.unwrap();
        assert_eq!(fingerprint.len(), 64);
        assert!(!fingerprint.contains(TOKEN));
    }

    #[test]
    fn rejects_missing_wrong_and_malformed_headers() {
        let auth = AdminAuth::new(vec![TOKEN.to_string()]);
        assert!(auth.authorize(None).is_err());
        assert!(auth.authorize(Some("Bearer nope-nope-nope-nope")).is_err());
        assert!(auth.authorize(Some(&format!("Basic {TOKEN}"))).is_err());
        assert!(auth.authorize(Some("Bearer ")).is_err());
        let oversized = format!("Bearer {}", "x".repeat(MAX_AUTH_HEADER_BYTES));
        assert!(auth.authorize(Some(&oversized)).is_err());
    }
}
