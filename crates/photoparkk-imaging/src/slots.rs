// crates/photoparkk-imaging/src/slots.rs
// ============================================================================
// Module: Upload Slots
// Description: Per-slot exclusion for in-flight compressions.
// Purpose: Refuse a second upload into a slot whose first is still processing.
// Dependencies: crate::compress
// ============================================================================

//! ## Overview
//! An upload slot is a caller-chosen key, such as a customer session id or
//! the catalog path of a frame image. [`UploadSlots::acquire`] claims a slot
//! and returns a [`SlotGuard`] that frees it on drop. Claiming a busy slot
//! fails fast with [`CompressionError::SlotBusy`] instead of queueing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use crate::compress::CompressedImage;
use crate::compress::CompressionError;
use crate::compress::CompressionOptions;
use crate::compress::compress_image;

// ============================================================================
// SECTION: Slots
// ============================================================================

/// Registry of busy upload slots.
#[derive(Debug, Clone, Default)]
pub struct UploadSlots {
    /// Keys of slots with a compression in flight.
    busy: Arc<Mutex<BTreeSet<String>>>,
}

impl UploadSlots {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a slot.
    ///
    /// # Errors
    ///
    /// Returns [`CompressionError::SlotBusy`] when the slot is already claimed.
    pub fn acquire(&self, slot: impl Into<String>) -> Result<SlotGuard, CompressionError> {
        let slot = slot.into();
        let mut busy =
            self.busy.lock().map_err(|_| CompressionError::Slots("mutex poisoned".to_string()))?;
        if !busy.insert(slot.clone()) {
            return Err(CompressionError::SlotBusy(slot));
        }
        Ok(SlotGuard {
            busy: Arc::clone(&self.busy),
            slot,
        })
    }

    /// Returns true when the slot is claimed.
    #[must_use]
    pub fn is_busy(&self, slot: &str) -> bool {
        self.busy.lock().is_ok_and(|busy| busy.contains(slot))
    }

    /// Compresses an image while holding the slot.
    ///
    /// # Errors
    ///
    /// Returns [`CompressionError`] when the slot is busy or compression fails.
    pub fn compress(
        &self,
        slot: impl Into<String>,
        input: &[u8],
        options: &CompressionOptions,
    ) -> Result<CompressedImage, CompressionError> {
        let _guard = self.acquire(slot)?;
        compress_image(input, options)
    }
}

/// Claim on one upload slot, released on drop.
#[derive(Debug)]
pub struct SlotGuard {
    /// Registry the slot belongs to.
    busy: Arc<Mutex<BTreeSet<String>>>,
    /// Claimed slot key.
    slot: String,
}

impl SlotGuard {
    /// Returns the claimed slot key.
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if let Ok(mut busy) = self.busy.lock() {
            busy.remove(&self.slot);
        }
    }
}
