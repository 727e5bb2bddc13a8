// crates/photoparkk-cli/src/lib.rs
// ============================================================================
// Module: PhotoParkk CLI Library
// Description: Shared helpers for the PhotoParkk command-line interface.
// Purpose: Provide reusable components (i18n) for the CLI binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library houses the CLI message catalog. The binary entry point
//! (`src/main.rs`) routes every user-facing string through it so output stays
//! consistent between commands.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and formatting helpers.
pub mod i18n;
