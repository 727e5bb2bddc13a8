// crates/photoparkk-core/src/core/validation.rs
// ============================================================================
// Module: PhotoParkk Catalog Validation
// Description: Submission-time validation of a Shape aggregate.
// Purpose: Reject incomplete catalog trees with the earliest violation and its location.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`validate_shape`] walks a [`Shape`] depth-first in display order and
//! returns the first violation it encounters. Checks run in this order:
//! shape name, then per color its name, then per style its name, then per
//! frame image its title, its image, and its sizes, then per size its label
//! and amount. Whitespace-only names count as empty. A shape with no color
//! options is valid.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::catalog::Shape;

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Reason a shape aggregate failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationReason {
    /// The shape name is empty.
    MissingShapeName,
    /// A color name is empty.
    MissingColorName,
    /// A style name is empty.
    MissingStyleName,
    /// A frame image title is empty.
    MissingFrameTitle,
    /// A frame image has neither a stored URL nor a pending upload.
    MissingFrameImage,
    /// A frame image has no sizes.
    MissingSizes,
    /// A size label is empty.
    MissingSizeLabel,
    /// A size amount is zero.
    MissingSizeAmount,
}

impl ViolationReason {
    /// Returns the user-facing message for the violation.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingShapeName => "shape name is required",
            Self::MissingColorName => "color name is required",
            Self::MissingStyleName => "style name is required",
            Self::MissingFrameTitle => "frame image title is required",
            Self::MissingFrameImage => "frame image must have an image",
            Self::MissingSizes => "frame image must have at least one size",
            Self::MissingSizeLabel => "size label is required",
            Self::MissingSizeAmount => "size amount must be greater than zero",
        }
    }
}

/// Zero-based position of a violation within the shape tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogLocation {
    /// Color index, when the violation is at or below a color.
    pub color: Option<usize>,
    /// Style index, when the violation is at or below a style.
    pub style: Option<usize>,
    /// Frame image index, when the violation is at or below a frame image.
    pub frame_image: Option<usize>,
    /// Size index, when the violation is on a size.
    pub size: Option<usize>,
}

impl CatalogLocation {
    /// Location of the shape root.
    pub const SHAPE: Self = Self {
        color: None,
        style: None,
        frame_image: None,
        size: None,
    };

    /// Location of a color.
    #[must_use]
    pub const fn color(color: usize) -> Self {
        Self {
            color: Some(color),
            ..Self::SHAPE
        }
    }

    /// Location of a style.
    #[must_use]
    pub const fn style(color: usize, style: usize) -> Self {
        Self {
            color: Some(color),
            style: Some(style),
            ..Self::SHAPE
        }
    }

    /// Location of a frame image.
    #[must_use]
    pub const fn frame_image(color: usize, style: usize, frame_image: usize) -> Self {
        Self {
            color: Some(color),
            style: Some(style),
            frame_image: Some(frame_image),
            size: None,
        }
    }

    /// Location of a size.
    #[must_use]
    pub const fn size(color: usize, style: usize, frame_image: usize, size: usize) -> Self {
        Self {
            color: Some(color),
            style: Some(style),
            frame_image: Some(frame_image),
            size: Some(size),
        }
    }
}

impl fmt::Display for CatalogLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("shape")?;
        let parts = [
            ("color", self.color),
            ("style", self.style),
            ("frame image", self.frame_image),
            ("size", self.size),
        ];
        for (label, index) in parts {
            if let Some(index) = index {
                write!(f, " > {label} {}", index + 1)?;
            }
        }
        Ok(())
    }
}

/// First validation failure found in a shape aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{} at {location}", reason.message())]
pub struct CatalogViolation {
    /// What is wrong.
    pub reason: ViolationReason,
    /// Where it is wrong.
    pub location: CatalogLocation,
}

impl CatalogViolation {
    /// Creates a violation at a location.
    #[must_use]
    pub const fn new(reason: ViolationReason, location: CatalogLocation) -> Self {
        Self {
            reason,
            location,
        }
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a shape aggregate, returning the earliest violation.
///
/// # Errors
///
/// Returns [`CatalogViolation`] describing the first failing check in display order.
pub fn validate_shape(shape: &Shape) -> Result<(), CatalogViolation> {
    if is_blank(&shape.name) {
        return Err(CatalogViolation::new(
            ViolationReason::MissingShapeName,
            CatalogLocation::SHAPE,
        ));
    }
    for (ci, color) in shape.color_options.iter().enumerate() {
        if is_blank(&color.name) {
            return Err(CatalogViolation::new(
                ViolationReason::MissingColorName,
                CatalogLocation::color(ci),
            ));
        }
        for (si, style) in color.styles.iter().enumerate() {
            if is_blank(&style.name) {
                return Err(CatalogViolation::new(
                    ViolationReason::MissingStyleName,
                    CatalogLocation::style(ci, si),
                ));
            }
            for (fi, frame) in style.frame_images.iter().enumerate() {
                let at_frame = CatalogLocation::frame_image(ci, si, fi);
                if is_blank(&frame.title) {
                    return Err(CatalogViolation::new(ViolationReason::MissingFrameTitle, at_frame));
                }
                if !frame.has_image() {
                    return Err(CatalogViolation::new(ViolationReason::MissingFrameImage, at_frame));
                }
                if frame.sizes.is_empty() {
                    return Err(CatalogViolation::new(ViolationReason::MissingSizes, at_frame));
                }
                for (zi, size) in frame.sizes.iter().enumerate() {
                    let at_size = CatalogLocation::size(ci, si, fi, zi);
                    if is_blank(&size.label) {
                        return Err(CatalogViolation::new(
                            ViolationReason::MissingSizeLabel,
                            at_size,
                        ));
                    }
                    if size.amount == 0 {
                        return Err(CatalogViolation::new(
                            ViolationReason::MissingSizeAmount,
                            at_size,
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

impl Shape {
    /// Validates this shape aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogViolation`] for the earliest failing check.
    pub fn validate(&self) -> Result<(), CatalogViolation> {
        validate_shape(self)
    }
}

/// Returns true when a name is empty after trimming.
fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
