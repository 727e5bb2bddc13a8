// crates/photoparkk-core/src/core/selection.rs
// ============================================================================
// Module: PhotoParkk Customization Session
// Description: Cascading selection state machine over a fetched catalog.
// Purpose: Keep shape/color/style/frame/size selections mutually consistent.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`CustomizationSession`] borrows a fetched [`Catalog`] and records the
//! customer's choices as an index path into it. Because each level is an
//! index into its parent's children, a selected size always belongs to the
//! selected frame image, which belongs to the selected style, and so on.
//!
//! Choosing an upstream level clears everything below it. Choosing a color
//! additionally auto-selects the first style, its first frame image, and that
//! frame image's first size, stopping at the first level with no options.
//! A transition that names an unknown option, or that skips a level, is
//! rejected and the session is left unchanged.
//!
//! [`SessionSnapshot`] is the serializable, name-based form of a session and
//! [`CustomizationSession::restore`] replays one against a catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::catalog::Catalog;
use crate::core::catalog::Color;
use crate::core::catalog::FrameImage;
use crate::core::catalog::Shape;
use crate::core::catalog::Size;
use crate::core::catalog::Style;
use crate::core::identifiers::ImageUrl;
use crate::core::order::OrderItem;

// ============================================================================
// SECTION: States
// ============================================================================

/// Level of the selection chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionLevel {
    /// Shape level.
    Shape,
    /// Color level.
    Color,
    /// Style level.
    Style,
    /// Frame image level.
    FrameImage,
    /// Size level.
    Size,
}

impl SelectionLevel {
    /// Returns the user-facing label of the level.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shape => "shape",
            Self::Color => "color",
            Self::Style => "style",
            Self::FrameImage => "frame design",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for SelectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Highest populated level of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectionState {
    /// Nothing selected.
    Empty,
    /// Shape selected.
    ShapeChosen,
    /// Shape and color selected.
    ColorChosen,
    /// Shape, color, and style selected.
    StyleChosen,
    /// Chain selected down to the frame image.
    FrameImageChosen,
    /// Chain fully selected.
    SizeChosen,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Selection transition and checkout errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Shape name not found in the catalog.
    #[error("unknown shape: {0}")]
    UnknownShape(String),
    /// Color name not found on the selected shape.
    #[error("unknown color: {0}")]
    UnknownColor(String),
    /// Style name not found on the selected color.
    #[error("unknown style: {0}")]
    UnknownStyle(String),
    /// Frame image title not found on the selected style.
    #[error("unknown frame design: {0}")]
    UnknownFrameImage(String),
    /// Size label not found on the selected frame image.
    #[error("unknown size: {0}")]
    UnknownSize(String),
    /// A level was chosen before its parent.
    #[error("choose a {missing} before choosing a {attempted}")]
    OutOfOrder {
        /// Level the caller tried to set.
        attempted: SelectionLevel,
        /// Parent level that is unset.
        missing: SelectionLevel,
    },
    /// Quantity below one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    /// Checkout attempted with an unset level.
    #[error("please select a {missing}")]
    Incomplete {
        /// First unset level.
        missing: SelectionLevel,
    },
    /// The customer photo is still local and has not been uploaded.
    #[error("your photo has not finished uploading")]
    UserImageNotUploaded,
    /// Line total does not fit in the amount type.
    #[error("order total overflows")]
    PriceOverflow,
}

// ============================================================================
// SECTION: User Image
// ============================================================================

/// Customer photo attached to a session.
#[derive(Clone, PartialEq, Eq)]
pub enum UserImage {
    /// Compressed locally; not yet uploaded.
    Local {
        /// Original file name.
        file_name: String,
        /// Compressed bytes.
        bytes: Vec<u8>,
    },
    /// Uploaded and addressable.
    Uploaded {
        /// Stored image URL.
        url: ImageUrl,
    },
}

impl fmt::Debug for UserImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local {
                file_name,
                bytes,
            } => f
                .debug_struct("Local")
                .field("file_name", file_name)
                .field("len", &bytes.len())
                .finish(),
            Self::Uploaded {
                url,
            } => f.debug_struct("Uploaded").field("url", url).finish(),
        }
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Index path of the current selections.
///
/// # Invariants
/// - A level is `Some` only when every level above it is `Some`.
/// - Each index is in range for its parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct SelectionPath {
    /// Shape index within the catalog.
    shape: Option<usize>,
    /// Color index within the shape.
    color: Option<usize>,
    /// Style index within the color.
    style: Option<usize>,
    /// Frame image index within the style.
    frame_image: Option<usize>,
    /// Size index within the frame image.
    size: Option<usize>,
}

/// Transient customization state for one order.
#[derive(Debug, Clone)]
pub struct CustomizationSession<'a> {
    /// Catalog the selections index into.
    catalog: &'a Catalog,
    /// Current selection path.
    path: SelectionPath,
    /// Number of frames.
    quantity: u32,
    /// Customer photo, if any.
    user_image: Option<UserImage>,
}

impl<'a> CustomizationSession<'a> {
    /// Creates an empty session over a catalog.
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            path: SelectionPath::default(),
            quantity: 1,
            user_image: None,
        }
    }

    /// Selects a shape and clears every level below it.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownShape`] when no shape has that name.
    pub fn choose_shape(&mut self, name: &str) -> Result<(), SelectionError> {
        let index = self
            .catalog
            .shapes
            .iter()
            .position(|shape| shape.name == name)
            .ok_or_else(|| SelectionError::UnknownShape(name.to_string()))?;
        self.path = SelectionPath {
            shape: Some(index),
            ..SelectionPath::default()
        };
        Ok(())
    }

    /// Selects a color, clears below it, then auto-selects the first style,
    /// frame image, and size where each exists.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when no shape is chosen or the color is unknown.
    pub fn choose_color(&mut self, name: &str) -> Result<(), SelectionError> {
        let shape = self.shape().ok_or(SelectionError::OutOfOrder {
            attempted: SelectionLevel::Color,
            missing: SelectionLevel::Shape,
        })?;
        let (index, color) = shape
            .color_options
            .iter()
            .enumerate()
            .find(|(_, color)| color.name == name)
            .ok_or_else(|| SelectionError::UnknownColor(name.to_string()))?;
        let first_style = color.styles.first();
        let first_frame = first_style.and_then(|style| style.frame_images.first());
        let first_size = first_frame.and_then(|frame| frame.sizes.first());
        self.path.color = Some(index);
        self.path.style = first_style.map(|_| 0);
        self.path.frame_image = first_frame.map(|_| 0);
        self.path.size = first_size.map(|_| 0);
        Ok(())
    }

    /// Selects a style and clears the frame image and size.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when no color is chosen or the style is unknown.
    pub fn choose_style(&mut self, name: &str) -> Result<(), SelectionError> {
        let color = self.color().ok_or_else(|| self.out_of_order(SelectionLevel::Style))?;
        let index = color
            .styles
            .iter()
            .position(|style| style.name == name)
            .ok_or_else(|| SelectionError::UnknownStyle(name.to_string()))?;
        self.path.style = Some(index);
        self.path.frame_image = None;
        self.path.size = None;
        Ok(())
    }

    /// Selects a frame image by title and clears the size.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when no style is chosen or the title is unknown.
    pub fn choose_frame_image(&mut self, title: &str) -> Result<(), SelectionError> {
        let style = self.style().ok_or_else(|| self.out_of_order(SelectionLevel::FrameImage))?;
        let index = style
            .frame_images
            .iter()
            .position(|frame| frame.title == title)
            .ok_or_else(|| SelectionError::UnknownFrameImage(title.to_string()))?;
        self.path.frame_image = Some(index);
        self.path.size = None;
        Ok(())
    }

    /// Selects a size of the current frame image by label.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when no frame image is chosen or the label is unknown.
    pub fn choose_size(&mut self, label: &str) -> Result<(), SelectionError> {
        let frame = self.frame_image().ok_or_else(|| self.out_of_order(SelectionLevel::Size))?;
        let index = frame
            .sizes
            .iter()
            .position(|size| size.label == label)
            .ok_or_else(|| SelectionError::UnknownSize(label.to_string()))?;
        self.path.size = Some(index);
        Ok(())
    }

    /// Sets the quantity; has no effect on the selection chain.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidQuantity`] for zero.
    pub const fn set_quantity(&mut self, quantity: u32) -> Result<(), SelectionError> {
        if quantity == 0 {
            return Err(SelectionError::InvalidQuantity);
        }
        self.quantity = quantity;
        Ok(())
    }

    /// Attaches or replaces the customer photo; has no effect on the selection chain.
    pub fn upload_user_image(&mut self, image: UserImage) {
        self.user_image = Some(image);
    }

    /// Removes the customer photo, leaving the slot empty.
    pub fn clear_user_image(&mut self) {
        self.user_image = None;
    }

    /// Builds the order item snapshot for checkout.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Incomplete`] naming the first unset level, or an
    /// error when the photo is not uploaded or the total overflows.
    pub fn proceed_to_checkout(&self) -> Result<OrderItem, SelectionError> {
        let missing = |level| SelectionError::Incomplete {
            missing: level,
        };
        let shape = self.shape().ok_or_else(|| missing(SelectionLevel::Shape))?;
        let color = self.color().ok_or_else(|| missing(SelectionLevel::Color))?;
        let style = self.style().ok_or_else(|| missing(SelectionLevel::Style))?;
        let frame = self.frame_image().ok_or_else(|| missing(SelectionLevel::FrameImage))?;
        let size = self.size().ok_or_else(|| missing(SelectionLevel::Size))?;
        let user_image_url = match &self.user_image {
            None => None,
            Some(UserImage::Uploaded {
                url,
            }) => Some(url.clone()),
            Some(UserImage::Local {
                ..
            }) => return Err(SelectionError::UserImageNotUploaded),
        };
        self.line_total()?;
        Ok(OrderItem {
            shape: shape.name.clone(),
            color: color.name.clone(),
            style: style.name.clone(),
            title: frame.title.clone(),
            size: size.label.clone(),
            price: size.amount,
            quantity: self.quantity,
            frame_image_url: frame.image_url.clone(),
            user_image_url,
        })
    }

    /// Returns the displayed total (`size amount × quantity`), zero without a size.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::PriceOverflow`] when the product overflows.
    pub fn line_total(&self) -> Result<u64, SelectionError> {
        self.size().map_or(Ok(0), |size| {
            size.amount.checked_mul(u64::from(self.quantity)).ok_or(SelectionError::PriceOverflow)
        })
    }

    /// Returns the highest populated state.
    #[must_use]
    pub const fn state(&self) -> SelectionState {
        let path = &self.path;
        if path.size.is_some() {
            SelectionState::SizeChosen
        } else if path.frame_image.is_some() {
            SelectionState::FrameImageChosen
        } else if path.style.is_some() {
            SelectionState::StyleChosen
        } else if path.color.is_some() {
            SelectionState::ColorChosen
        } else if path.shape.is_some() {
            SelectionState::ShapeChosen
        } else {
            SelectionState::Empty
        }
    }

    /// Returns true when the selected color offers more than one style.
    #[must_use]
    pub fn requires_style_choice(&self) -> bool {
        self.color().is_some_and(|color| color.styles.len() > 1)
    }

    /// Returns true when the selected style offers more than one frame image.
    #[must_use]
    pub fn requires_frame_image_choice(&self) -> bool {
        self.style().is_some_and(|style| style.frame_images.len() > 1)
    }

    /// Returns the catalog this session reads from.
    #[must_use]
    pub const fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Returns the selected shape.
    #[must_use]
    pub fn shape(&self) -> Option<&'a Shape> {
        self.catalog.shapes.get(self.path.shape?)
    }

    /// Returns the selected color.
    #[must_use]
    pub fn color(&self) -> Option<&'a Color> {
        self.shape()?.color_options.get(self.path.color?)
    }

    /// Returns the selected style.
    #[must_use]
    pub fn style(&self) -> Option<&'a Style> {
        self.color()?.styles.get(self.path.style?)
    }

    /// Returns the selected frame image.
    #[must_use]
    pub fn frame_image(&self) -> Option<&'a FrameImage> {
        self.style()?.frame_images.get(self.path.frame_image?)
    }

    /// Returns the selected size.
    #[must_use]
    pub fn size(&self) -> Option<&'a Size> {
        self.frame_image()?.sizes.get(self.path.size?)
    }

    /// Returns the quantity.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the customer photo.
    #[must_use]
    pub const fn user_image(&self) -> Option<&UserImage> {
        self.user_image.as_ref()
    }

    /// Builds the out-of-order error for a level whose parent is unset.
    fn out_of_order(&self, attempted: SelectionLevel) -> SelectionError {
        let missing = match self.state() {
            SelectionState::Empty => SelectionLevel::Shape,
            SelectionState::ShapeChosen => SelectionLevel::Color,
            SelectionState::ColorChosen => SelectionLevel::Style,
            SelectionState::StyleChosen
            | SelectionState::FrameImageChosen
            | SelectionState::SizeChosen => SelectionLevel::FrameImage,
        };
        SelectionError::OutOfOrder {
            attempted,
            missing,
        }
    }
}

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// Serializable, name-based form of a customization session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Selected shape name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    /// Selected color name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Selected style name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Selected frame image title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_image: Option<String>,
    /// Selected size label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Number of frames.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Uploaded customer photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_image_url: Option<ImageUrl>,
}

/// Default snapshot quantity.
const fn default_quantity() -> u32 {
    1
}

impl<'a> CustomizationSession<'a> {
    /// Captures the session as names. A local photo is not captured.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            shape: self.shape().map(|shape| shape.name.clone()),
            color: self.color().map(|color| color.name.clone()),
            style: self.style().map(|style| style.name.clone()),
            frame_image: self.frame_image().map(|frame| frame.title.clone()),
            size: self.size().map(|size| size.label.clone()),
            quantity: self.quantity,
            user_image_url: match &self.user_image {
                Some(UserImage::Uploaded {
                    url,
                }) => Some(url.clone()),
                _ => None,
            },
        }
    }

    /// Rebuilds a session from a snapshot without auto-advancing.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when a name no longer resolves, a level is set
    /// without its parent, or the quantity is zero.
    pub fn restore(
        catalog: &'a Catalog,
        snapshot: &SessionSnapshot,
    ) -> Result<Self, SelectionError> {
        let mut session = Self::new(catalog);
        session.set_quantity(snapshot.quantity)?;
        let levels = [
            (SelectionLevel::Shape, snapshot.shape.as_deref()),
            (SelectionLevel::Color, snapshot.color.as_deref()),
            (SelectionLevel::Style, snapshot.style.as_deref()),
            (SelectionLevel::FrameImage, snapshot.frame_image.as_deref()),
            (SelectionLevel::Size, snapshot.size.as_deref()),
        ];
        let mut unset: Option<SelectionLevel> = None;
        for (level, name) in levels {
            let Some(name) = name else {
                if unset.is_none() {
                    unset = Some(level);
                }
                continue;
            };
            if let Some(missing) = unset {
                return Err(SelectionError::OutOfOrder {
                    attempted: level,
                    missing,
                });
            }
            match level {
                SelectionLevel::Shape => session.choose_shape(name)?,
                SelectionLevel::Color => {
                    session.choose_color(name)?;
                    session.path.style = None;
                    session.path.frame_image = None;
                    session.path.size = None;
                }
                SelectionLevel::Style => session.choose_style(name)?,
                SelectionLevel::FrameImage => session.choose_frame_image(name)?,
                SelectionLevel::Size => session.choose_size(name)?,
            }
        }
        session.user_image = snapshot.user_image_url.clone().map(|url| UserImage::Uploaded {
            url,
        });
        Ok(session)
    }
}
