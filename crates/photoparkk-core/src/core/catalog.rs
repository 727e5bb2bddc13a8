// crates/photoparkk-core/src/core/catalog.rs
// ============================================================================
// Module: PhotoParkk Catalog Model
// Description: Nested frame catalog aggregate (Shape → Color → Style → FrameImage → Size).
// Purpose: Define the canonical, serializable catalog tree shared by every surface.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The catalog is a strictly nested tree rooted at [`Shape`]. A shape owns its
//! color options, each color owns its styles, each style owns its frame
//! images, and each frame image owns its purchasable sizes. The aggregate is
//! created, replaced, and deleted as a unit; there are no cross-references
//! between shapes.
//!
//! Wire JSON uses camelCase field names (`colorOptions`, `styleName`,
//! `frameImages`, `imageUrl`). A frame image's pending upload is admin-editor
//! state only and is never serialized.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ImageUrl;
use crate::core::identifiers::ShapeId;

// ============================================================================
// SECTION: Catalog Tree
// ============================================================================

/// Root catalog entity: one frame shape with its color options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// Identifier assigned by the persistence layer; absent before creation.
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ShapeId>,
    /// Display name (for example "Portrait").
    pub name: String,
    /// Ordered color options. May be empty.
    #[serde(default)]
    pub color_options: Vec<Color>,
}

/// Color option of a shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    /// Display name (for example "Black").
    pub name: String,
    /// Ordered styles offered in this color.
    #[serde(default)]
    pub styles: Vec<Style>,
}

/// Frame style within a color.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Display name (for example "Classic").
    #[serde(rename = "styleName")]
    pub name: String,
    /// Ordered frame images for this style.
    #[serde(default)]
    pub frame_images: Vec<FrameImage>,
}

/// Frame design preview with its purchasable sizes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameImage {
    /// Display title (for example "Floral Border").
    pub title: String,
    /// Stored preview image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageUrl>,
    /// Local file chosen in the admin editor but not yet uploaded.
    #[serde(skip)]
    pub pending_upload: Option<PendingUpload>,
    /// Ordered purchasable sizes.
    #[serde(default)]
    pub sizes: Vec<Size>,
}

/// Purchasable size with its unit price.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Display label (for example "12x16").
    pub label: String,
    /// Unit price in whole currency units. Zero means unset.
    #[serde(default)]
    pub amount: u64,
}

/// Raw file held by the admin editor until submission uploads it.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct PendingUpload {
    /// Original file name supplied by the admin.
    pub file_name: String,
    /// Declared MIME type of the file.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FrameImage {
    /// Returns true when the frame image has a stored URL or a pending upload.
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image_url.is_some() || self.pending_upload.is_some()
    }
}

impl Shape {
    /// Finds a color option by exact name.
    #[must_use]
    pub fn color(&self, name: &str) -> Option<&Color> {
        self.color_options.iter().find(|color| color.name == name)
    }
}

impl Color {
    /// Finds a style by exact name.
    #[must_use]
    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.iter().find(|style| style.name == name)
    }
}

impl Style {
    /// Finds a frame image by exact title.
    #[must_use]
    pub fn frame_image(&self, title: &str) -> Option<&FrameImage> {
        self.frame_images.iter().find(|frame| frame.title == title)
    }
}

impl FrameImage {
    /// Finds a size by exact label.
    #[must_use]
    pub fn size(&self, label: &str) -> Option<&Size> {
        self.sizes.iter().find(|size| size.label == label)
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Ordered collection of shapes as returned by the catalog fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    /// Shapes in catalog order.
    pub shapes: Vec<Shape>,
}

impl Catalog {
    /// Creates a catalog from an ordered list of shapes.
    #[must_use]
    pub const fn new(shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
        }
    }

    /// Finds a shape by exact name.
    #[must_use]
    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.name == name)
    }

    /// Finds a shape by identifier.
    #[must_use]
    pub fn shape_by_id(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id.as_ref() == Some(id))
    }

    /// Returns true when the catalog holds no shapes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
