// crates/photoparkk-core/src/core/edit.rs
// ============================================================================
// Module: PhotoParkk Catalog Edits
// Description: Copy-on-write structural edits over a Shape aggregate.
// Purpose: Let the admin editor change any nested field without mutating shared state.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every change the admin form performs is a [`CatalogEdit`]. Applying an
//! edit with [`Shape::apply_edit`] produces a new aggregate and leaves the
//! original untouched, so a rendered view of the old value never observes a
//! half-applied change. [`ShapeEditor`] keeps the current root and swaps it
//! on each successful edit.
//!
//! Paths are flat zero-based indices. An index that does not address an
//! existing node yields [`EditError::PathNotFound`] and no new value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::catalog::Color;
use crate::core::catalog::FrameImage;
use crate::core::catalog::PendingUpload;
use crate::core::catalog::Shape;
use crate::core::catalog::Size;
use crate::core::catalog::Style;
use crate::core::identifiers::ImageUrl;
use crate::core::validation::CatalogLocation;

// ============================================================================
// SECTION: Edits
// ============================================================================

/// Structural edit applied to a shape aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEdit {
    /// Renames the shape.
    SetShapeName {
        /// New shape name.
        name: String,
    },
    /// Appends an empty color option.
    AddColor,
    /// Removes a color option and everything below it.
    RemoveColor {
        /// Color index.
        color: usize,
    },
    /// Renames a color option.
    SetColorName {
        /// Color index.
        color: usize,
        /// New color name.
        name: String,
    },
    /// Appends an empty style to a color.
    AddStyle {
        /// Color index.
        color: usize,
    },
    /// Removes a style and everything below it.
    RemoveStyle {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
    },
    /// Renames a style.
    SetStyleName {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
        /// New style name.
        name: String,
    },
    /// Appends a frame image with one blank size.
    AddFrameImage {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
    },
    /// Removes a frame image and its sizes.
    RemoveFrameImage {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
        /// Frame image index.
        frame_image: usize,
    },
    /// Sets a frame image title.
    SetFrameTitle {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
        /// Frame image index.
        frame_image: usize,
        /// New title.
        title: String,
    },
    /// Sets a stored image URL and discards any pending upload.
    SetFrameImageUrl {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
        /// Frame image index.
        frame_image: usize,
        /// Stored image URL.
        url: ImageUrl,
    },
    /// Attaches a local file to be uploaded on submit.
    AttachPendingUpload {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
        /// Frame image index.
        frame_image: usize,
        /// File awaiting upload.
        upload: PendingUpload,
    },
    /// Appends a blank size to a frame image.
    AddSize {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
        /// Frame image index.
        frame_image: usize,
    },
    /// Removes a size.
    RemoveSize {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
        /// Frame image index.
        frame_image: usize,
        /// Size index.
        size: usize,
    },
    /// Sets a size label.
    SetSizeLabel {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
        /// Frame image index.
        frame_image: usize,
        /// Size index.
        size: usize,
        /// New label.
        label: String,
    },
    /// Sets a size amount.
    SetSizeAmount {
        /// Color index.
        color: usize,
        /// Style index.
        style: usize,
        /// Frame image index.
        frame_image: usize,
        /// Size index.
        size: usize,
        /// New amount in whole currency units.
        amount: u64,
    },
}

/// Errors raised while applying an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The edit addresses a node that does not exist.
    #[error("no catalog node at {0}")]
    PathNotFound(CatalogLocation),
}

// ============================================================================
// SECTION: Copy-On-Write Application
// ============================================================================

impl Shape {
    /// Returns a new shape with `edit` applied; `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::PathNotFound`] when the edit's indices are out of range.
    pub fn apply_edit(&self, edit: &CatalogEdit) -> Result<Self, EditError> {
        let mut next = self.clone();
        next.apply_in_place(edit)?;
        Ok(next)
    }

    /// Applies an edit to an owned working copy.
    fn apply_in_place(&mut self, edit: &CatalogEdit) -> Result<(), EditError> {
        match edit {
            CatalogEdit::SetShapeName {
                name,
            } => self.name.clone_from(name),
            CatalogEdit::AddColor => self.color_options.push(Color::default()),
            CatalogEdit::RemoveColor {
                color,
            } => {
                remove_at(&mut self.color_options, *color, CatalogLocation::color(*color))?;
            }
            CatalogEdit::SetColorName {
                color,
                name,
            } => self.color_mut(*color)?.name.clone_from(name),
            CatalogEdit::AddStyle {
                color,
            } => self.color_mut(*color)?.styles.push(Style::default()),
            CatalogEdit::RemoveStyle {
                color,
                style,
            } => {
                let at = CatalogLocation::style(*color, *style);
                remove_at(&mut self.color_mut(*color)?.styles, *style, at)?;
            }
            CatalogEdit::SetStyleName {
                color,
                style,
                name,
            } => self.style_mut(*color, *style)?.name.clone_from(name),
            CatalogEdit::AddFrameImage {
                color,
                style,
            } => self.style_mut(*color, *style)?.frame_images.push(FrameImage {
                sizes: vec![Size::default()],
                ..FrameImage::default()
            }),
            CatalogEdit::RemoveFrameImage {
                color,
                style,
                frame_image,
            } => {
                let at = CatalogLocation::frame_image(*color, *style, *frame_image);
                remove_at(&mut self.style_mut(*color, *style)?.frame_images, *frame_image, at)?;
            }
            CatalogEdit::SetFrameTitle {
                color,
                style,
                frame_image,
                title,
            } => self.frame_mut(*color, *style, *frame_image)?.title.clone_from(title),
            CatalogEdit::SetFrameImageUrl {
                color,
                style,
                frame_image,
                url,
            } => {
                let frame = self.frame_mut(*color, *style, *frame_image)?;
                frame.image_url = Some(url.clone());
                frame.pending_upload = None;
            }
            CatalogEdit::AttachPendingUpload {
                color,
                style,
                frame_image,
                upload,
            } => {
                self.frame_mut(*color, *style, *frame_image)?.pending_upload =
                    Some(upload.clone());
            }
            CatalogEdit::AddSize {
                color,
                style,
                frame_image,
            } => self.frame_mut(*color, *style, *frame_image)?.sizes.push(Size::default()),
            CatalogEdit::RemoveSize {
                color,
                style,
                frame_image,
                size,
            } => {
                let at = CatalogLocation::size(*color, *style, *frame_image, *size);
                remove_at(&mut self.frame_mut(*color, *style, *frame_image)?.sizes, *size, at)?;
            }
            CatalogEdit::SetSizeLabel {
                color,
                style,
                frame_image,
                size,
                label,
            } => self.size_mut(*color, *style, *frame_image, *size)?.label.clone_from(label),
            CatalogEdit::SetSizeAmount {
                color,
                style,
                frame_image,
                size,
                amount,
            } => {
                self.size_mut(*color, *style, *frame_image, *size)?.amount = *amount;
            }
        }
        Ok(())
    }

    /// Resolves a mutable color.
    fn color_mut(&mut self, color: usize) -> Result<&mut Color, EditError> {
        self.color_options
            .get_mut(color)
            .ok_or(EditError::PathNotFound(CatalogLocation::color(color)))
    }

    /// Resolves a mutable style.
    fn style_mut(&mut self, color: usize, style: usize) -> Result<&mut Style, EditError> {
        self.color_mut(color)?
            .styles
            .get_mut(style)
            .ok_or(EditError::PathNotFound(CatalogLocation::style(color, style)))
    }

    /// Resolves a mutable frame image.
    fn frame_mut(
        &mut self,
        color: usize,
        style: usize,
        frame_image: usize,
    ) -> Result<&mut FrameImage, EditError> {
        self.style_mut(color, style)?
            .frame_images
            .get_mut(frame_image)
            .ok_or(EditError::PathNotFound(CatalogLocation::frame_image(color, style, frame_image)))
    }

    /// Resolves a mutable size.
    fn size_mut(
        &mut self,
        color: usize,
        style: usize,
        frame_image: usize,
        size: usize,
    ) -> Result<&mut Size, EditError> {
        self.frame_mut(color, style, frame_image)?
            .sizes
            .get_mut(size)
            .ok_or(EditError::PathNotFound(CatalogLocation::size(color, style, frame_image, size)))
    }

    /// Returns the locations of every frame image holding a pending upload.
    #[must_use]
    pub fn pending_uploads(&self) -> Vec<CatalogLocation> {
        let mut found = Vec::new();
        for (ci, color) in self.color_options.iter().enumerate() {
            for (si, style) in color.styles.iter().enumerate() {
                for (fi, frame) in style.frame_images.iter().enumerate() {
                    if frame.pending_upload.is_some() {
                        found.push(CatalogLocation::frame_image(ci, si, fi));
                    }
                }
            }
        }
        found
    }

    /// Takes the pending upload at a frame image location, leaving `None`.
    pub fn take_pending_upload(&mut self, location: CatalogLocation) -> Option<PendingUpload> {
        let (Some(color), Some(style), Some(frame_image)) =
            (location.color, location.style, location.frame_image)
        else {
            return None;
        };
        self.frame_mut(color, style, frame_image).ok()?.pending_upload.take()
    }

    /// Sets the stored URL of a frame image by location.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::PathNotFound`] when the location is not a frame image.
    pub fn set_frame_image_url(
        &mut self,
        location: CatalogLocation,
        url: ImageUrl,
    ) -> Result<(), EditError> {
        let (Some(color), Some(style), Some(frame_image)) =
            (location.color, location.style, location.frame_image)
        else {
            return Err(EditError::PathNotFound(location));
        };
        self.apply_in_place(&CatalogEdit::SetFrameImageUrl {
            color,
            style,
            frame_image,
            url,
        })
    }
}

/// Removes an element by index, reporting an out-of-range path.
fn remove_at<T>(items: &mut Vec<T>, index: usize, at: CatalogLocation) -> Result<(), EditError> {
    if index >= items.len() {
        return Err(EditError::PathNotFound(at));
    }
    items.remove(index);
    Ok(())
}

// ============================================================================
// SECTION: Editor
// ============================================================================

/// Admin editing session over one shape aggregate.
///
/// # Invariants
/// - `current` is replaced wholesale on each successful edit; it is never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct ShapeEditor {
    /// Current root value.
    current: Shape,
}

impl ShapeEditor {
    /// Starts a blank editor for a new shape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts an editor from an existing shape.
    #[must_use]
    pub const fn from_shape(shape: Shape) -> Self {
        Self {
            current: shape,
        }
    }

    /// Applies an edit and swaps in the new root.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] when the edit addresses a missing node; the current value is kept.
    pub fn apply(&mut self, edit: &CatalogEdit) -> Result<&Shape, EditError> {
        self.current = self.current.apply_edit(edit)?;
        Ok(&self.current)
    }

    /// Returns the current shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.current
    }

    /// Consumes the editor, returning the edited shape.
    #[must_use]
    pub fn into_shape(self) -> Shape {
        self.current
    }
}
