// crates/photoparkk-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Catalog and Order Store
// Description: Durable CatalogStore and OrderStore backend using SQLite WAL.
// Purpose: Persist shape aggregates and order snapshots across restarts.
// Dependencies: photoparkk-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides [`SqliteStore`], one `SQLite` database implementing
//! both [`photoparkk_core::CatalogStore`] and [`photoparkk_core::OrderStore`].
//! Shapes and orders are stored as JSON documents with a SHA-256 digest that
//! is checked on every load. Order documents are immutable snapshots: deleting
//! or editing a shape never touches them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_DOCUMENT_BYTES;
pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
