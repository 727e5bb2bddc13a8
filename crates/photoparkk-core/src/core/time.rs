// crates/photoparkk-core/src/core/time.rs
// ============================================================================
// Module: PhotoParkk Time Model
// Description: Timestamp representation for orders and catalog records.
// Purpose: Keep wall-clock reads at the host boundary.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The core never reads wall-clock time directly. Hosts supply timestamps
//! when placing orders or saving catalog records so that services stay
//! deterministic under test.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Unix epoch timestamp in milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(value: i64) -> Self {
        Self(value)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }
}
