// crates/photoparkk-imaging/src/lib.rs
// ============================================================================
// Module: PhotoParkk Imaging
// Description: Image compression and upload slot guards.
// Purpose: Bound upload size and dimensions before images are stored.
// Dependencies: image, thiserror
// ============================================================================

//! ## Overview
//! Every image (admin frame preview or customer photo) is compressed before
//! it is stored: its longer side is capped at a maximum dimension and it is
//! re-encoded as JPEG. The byte target is best effort; see
//! [`compress_image`]. [`UploadSlots`] keeps at most one compression in
//! flight per upload slot.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod compress;
pub mod slots;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compress::CompressedImage;
pub use compress::CompressionError;
pub use compress::CompressionOptions;
pub use compress::OUTPUT_CONTENT_TYPE;
pub use compress::compress_image;
pub use compress::scaled_dimensions;
pub use slots::SlotGuard;
pub use slots::UploadSlots;
