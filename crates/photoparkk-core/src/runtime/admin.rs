// crates/photoparkk-core/src/runtime/admin.rs
// ============================================================================
// Module: PhotoParkk Admin Catalog Service
// Description: Validated create/replace/delete of shape aggregates.
// Purpose: Submit admin-edited shapes, uploading pending frame images first.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! [`AdminCatalogService`] is the write path for the catalog. A submitted
//! shape is validated, checked for a unique name (trimmed and
//! case-insensitive), has every pending frame image uploaded through the
//! [`ImageStore`] with the returned URL spliced back in, and is then created
//! or replaced whole. No shape is persisted when any step fails.
//!
//! Uploads run only after validation and the name check pass, one image at a
//! time. They are not rolled back: when a later upload or the final write
//! fails, images already stored stay in the [`ImageStore`] unreferenced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CatalogViolation;
use crate::core::EditError;
use crate::core::Shape;
use crate::core::ShapeId;
use crate::core::validate_shape;
use crate::interfaces::CatalogStore;
use crate::interfaces::ImageStore;
use crate::interfaces::ImageStoreError;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Admin catalog errors.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Shape failed validation.
    #[error(transparent)]
    Invalid(#[from] CatalogViolation),
    /// Edit addressed a missing node.
    #[error(transparent)]
    Edit(#[from] EditError),
    /// Another shape already uses the name.
    #[error("a shape named '{0}' already exists")]
    DuplicateShapeName(String),
    /// Shape does not exist.
    #[error("shape not found: {0}")]
    NotFound(ShapeId),
    /// Frame image upload failed.
    #[error(transparent)]
    Upload(#[from] ImageStoreError),
    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Catalog write service for the admin editor.
pub struct AdminCatalogService<C, I> {
    /// Catalog persistence.
    catalog: C,
    /// Frame image storage.
    images: I,
}

impl<C, I> AdminCatalogService<C, I>
where
    C: CatalogStore,
    I: ImageStore,
{
    /// Creates an admin catalog service.
    #[must_use]
    pub const fn new(catalog: C, images: I) -> Self {
        Self {
            catalog,
            images,
        }
    }

    /// Lists every shape.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when listing fails.
    pub fn list_shapes(&self) -> Result<Vec<Shape>, AdminError> {
        Ok(self.catalog.list_shapes()?)
    }

    /// Loads one shape.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] when the shape does not exist.
    pub fn get_shape(&self, id: &ShapeId) -> Result<Shape, AdminError> {
        self.catalog.load_shape(id)?.ok_or_else(|| AdminError::NotFound(id.clone()))
    }

    /// Creates a shape and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when validation, uniqueness, upload, or persistence fails.
    pub fn create_shape(&self, shape: Shape) -> Result<Shape, AdminError> {
        let mut prepared = self.prepare(shape, None)?;
        let id = self.catalog.create_shape(&prepared)?;
        prepared.id = Some(id);
        Ok(prepared)
    }

    /// Replaces a whole shape. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the shape is missing or any step fails.
    pub fn replace_shape(&self, id: &ShapeId, shape: Shape) -> Result<Shape, AdminError> {
        if self.catalog.load_shape(id)?.is_none() {
            return Err(AdminError::NotFound(id.clone()));
        }
        let mut prepared = self.prepare(shape, Some(id))?;
        prepared.id = Some(id.clone());
        self.catalog.replace_shape(id, &prepared)?;
        Ok(prepared)
    }

    /// Deletes a shape and everything below it.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] when the shape does not exist.
    pub fn delete_shape(&self, id: &ShapeId) -> Result<(), AdminError> {
        if self.catalog.delete_shape(id)? { Ok(()) } else { Err(AdminError::NotFound(id.clone())) }
    }

    /// Validates, checks the name, and only then uploads pending frame images.
    ///
    /// Images uploaded before a failure are left in the image store.
    fn prepare(&self, mut shape: Shape, existing: Option<&ShapeId>) -> Result<Shape, AdminError> {
        validate_shape(&shape)?;
        shape.name = shape.name.trim().to_string();
        let wanted = normalized_name(&shape.name);
        let taken = self.catalog.list_shapes()?.into_iter().any(|other| {
            other.id.as_ref() != existing && normalized_name(&other.name) == wanted
        });
        if taken {
            return Err(AdminError::DuplicateShapeName(shape.name));
        }
        for location in shape.pending_uploads() {
            let Some(upload) = shape.take_pending_upload(location) else {
                continue;
            };
            let url = self.images.put_image(&upload.bytes, &upload.content_type)?;
            shape.set_frame_image_url(location, url)?;
        }
        Ok(shape)
    }
}

/// Comparison key for shape-name uniqueness.
fn normalized_name(name: &str) -> String {
    name.trim().to_lowercase()
}
