// crates/photoparkk-core/src/runtime/pricing.rs
// ============================================================================
// Module: PhotoParkk Price Policy
// Description: Order-time reconciliation of submitted snapshots with the catalog.
// Purpose: Make trust in client-submitted prices an explicit configuration choice.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The storefront computes prices from the catalog it fetched and submits a
//! denormalized [`OrderItem`]. Under [`PricePolicy::TrustClient`] that
//! snapshot is persisted as submitted. Under [`PricePolicy::Catalog`] the
//! snapshot's selection is replayed against the live catalog and the order is
//! refused when the unit price or frame preview no longer matches.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Catalog;
use crate::core::CustomizationSession;
use crate::core::OrderItem;
use crate::core::SelectionError;
use crate::core::SessionSnapshot;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// How submitted order prices are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// Persist the submitted snapshot verbatim.
    #[default]
    TrustClient,
    /// Re-derive the snapshot from the live catalog and reject mismatches.
    Catalog,
}

/// Price reconciliation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceCheckError {
    /// The submitted selection no longer resolves in the catalog.
    #[error("selection is no longer available: {0}")]
    Stale(SelectionError),
    /// A submitted field differs from the catalog.
    #[error("submitted {field} does not match the catalog")]
    Mismatch {
        /// Name of the differing field.
        field: &'static str,
    },
}

impl PricePolicy {
    /// Returns true when the policy needs the live catalog.
    #[must_use]
    pub const fn requires_catalog(self) -> bool {
        matches!(self, Self::Catalog)
    }
}

/// Replays a submitted item against the catalog and compares the result.
///
/// # Errors
///
/// Returns [`PriceCheckError`] when the selection is stale or a field differs.
pub fn reconcile_item(catalog: &Catalog, item: &OrderItem) -> Result<(), PriceCheckError> {
    let snapshot = SessionSnapshot {
        shape: Some(item.shape.clone()),
        color: Some(item.color.clone()),
        style: Some(item.style.clone()),
        frame_image: Some(item.title.clone()),
        size: Some(item.size.clone()),
        quantity: item.quantity,
        user_image_url: item.user_image_url.clone(),
    };
    let expected = CustomizationSession::restore(catalog, &snapshot)
        .and_then(|session| session.proceed_to_checkout())
        .map_err(PriceCheckError::Stale)?;
    if expected.price != item.price {
        return Err(PriceCheckError::Mismatch {
            field: "price",
        });
    }
    if expected.frame_image_url != item.frame_image_url {
        return Err(PriceCheckError::Mismatch {
            field: "frameImageUrl",
        });
    }
    Ok(())
}
