// crates/photoparkk-server/src/lib.rs
// ============================================================================
// Module: PhotoParkk Server Library
// Description: HTTP API for the PhotoParkk storefront and admin desk.
// Purpose: Expose router construction, server startup, and server adapters.
// Dependencies: photoparkk-core, photoparkk-config, axum, tokio
// ============================================================================

//! ## Overview
//! The server exposes the catalog, image uploads, checkout, and the order desk
//! over JSON HTTP. Store and gateway calls are synchronous and run on Tokio's
//! blocking pool. Admin routes require a configured bearer token; customer
//! routes are open. Every request emits a structured audit line.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod error;
pub mod images;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ApiRequestEvent;
pub use audit::AuditEvent;
pub use audit::AuditSink;
pub use audit::CatalogAction;
pub use audit::CatalogChangeEvent;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::OrderAction;
pub use audit::OrderAuditEvent;
pub use audit::StderrAuditSink;
pub use auth::AdminAuth;
pub use auth::AdminContext;
pub use auth::AuthError;
pub use error::ApiError;
pub use images::FileImageStore;
pub use images::ImageUploader;
pub use images::UploadedImage;
pub use server::AppState;
pub use server::AppStateParts;
pub use server::PhotoparkkServer;
pub use server::ServerError;
pub use server::build_router;
