// crates/photoparkk-config/src/lib.rs
// ============================================================================
// Module: PhotoParkk Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for photoparkk.toml semantics.
// Dependencies: photoparkk-core, photoparkk-imaging, photoparkk-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `photoparkk-config` defines the configuration model for the PhotoParkk
//! service and validates it strictly. Invalid or ambiguous configuration
//! fails closed.
//!
//! Security posture: config inputs are untrusted. Secrets are referenced by
//! environment variable name, never stored in the file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
