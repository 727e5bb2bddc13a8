// crates/photoparkk-core/src/core/mod.rs
// ============================================================================
// Module: PhotoParkk Core Types
// Description: Catalog model, validation, edits, selection, and order snapshots.
// Purpose: Provide the canonical serializable types shared by every surface.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types define the nested frame catalog, its submission-time
//! validation, copy-on-write admin edits, the cascading customization
//! session, and the order snapshot produced at checkout. These types are
//! the source of truth for the HTTP API and the persistence layers.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod edit;
pub mod identifiers;
pub mod order;
pub mod selection;
pub mod time;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::Catalog;
pub use catalog::Color;
pub use catalog::FrameImage;
pub use catalog::PendingUpload;
pub use catalog::Shape;
pub use catalog::Size;
pub use catalog::Style;
pub use edit::CatalogEdit;
pub use edit::EditError;
pub use edit::ShapeEditor;
pub use identifiers::GatewayOrderId;
pub use identifiers::ImageUrl;
pub use identifiers::OrderId;
pub use identifiers::PaymentId;
pub use identifiers::ShapeId;
pub use order::DeliveryDetails;
pub use order::DeliveryError;
pub use order::FulfillmentMethod;
pub use order::OrderDraft;
pub use order::OrderError;
pub use order::OrderItem;
pub use order::OrderPayment;
pub use order::OrderRecord;
pub use order::OrderStatus;
pub use order::PaymentProof;
pub use selection::CustomizationSession;
pub use selection::SelectionError;
pub use selection::SelectionLevel;
pub use selection::SelectionState;
pub use selection::SessionSnapshot;
pub use selection::UserImage;
pub use time::Timestamp;
pub use validation::CatalogLocation;
pub use validation::CatalogViolation;
pub use validation::ViolationReason;
pub use validation::validate_shape;
