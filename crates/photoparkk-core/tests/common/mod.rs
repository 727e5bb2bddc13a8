// crates/photoparkk-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared catalog, delivery, and gateway fixtures for core tests.
// Purpose: Provide deterministic inputs for selection, checkout, and admin tests.
// Dependencies: photoparkk-core
// ============================================================================

//! ## Overview
//! Sample catalogs, delivery details, and recording fakes for the image
//! store and payment gateway.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use photoparkk_core::Catalog;
use photoparkk_core::Color;
use photoparkk_core::DeliveryDetails;
use photoparkk_core::FrameImage;
use photoparkk_core::GatewayOrder;
use photoparkk_core::GatewayOrderId;
use photoparkk_core::GatewayOrderRequest;
use photoparkk_core::ImageStore;
use photoparkk_core::ImageStoreError;
use photoparkk_core::ImageUrl;
use photoparkk_core::PaymentError;
use photoparkk_core::PaymentGateway;
use photoparkk_core::PaymentProof;
use photoparkk_core::Shape;
use photoparkk_core::ShapeId;
use photoparkk_core::Size;
use photoparkk_core::Style;

// ============================================================================
// SECTION: Catalog Fixtures
// ============================================================================

/// Builds a size.
pub fn size(label: &str, amount: u64) -> Size {
    Size {
        label: label.to_string(),
        amount,
    }
}

/// Builds a frame image with a stored URL.
pub fn frame(title: &str, url: &str, sizes: Vec<Size>) -> FrameImage {
    FrameImage {
        title: title.to_string(),
        image_url: Some(ImageUrl::new(url)),
        pending_upload: None,
        sizes,
    }
}

/// Builds a style.
pub fn style(name: &str, frame_images: Vec<FrameImage>) -> Style {
    Style {
        name: name.to_string(),
        frame_images,
    }
}

/// Builds a color.
pub fn color(name: &str, styles: Vec<Style>) -> Color {
    Color {
        name: name.to_string(),
        styles,
    }
}

/// Builds an unsaved shape.
pub fn shape(name: &str, color_options: Vec<Color>) -> Shape {
    Shape {
        id: None,
        name: name.to_string(),
        color_options,
    }
}

/// The Portrait shape from the storefront walkthrough.
pub fn portrait() -> Shape {
    shape(
        "Portrait",
        vec![color(
            "Black",
            vec![style(
                "Classic",
                vec![frame(
                    "Floral Border",
                    "https://cdn.photoparkk.test/floral.jpg",
                    vec![size("8x10", 499), size("12x16", 699)],
                )],
            )],
        )],
    )
}

/// A catalog with branching options at every level.
pub fn branching_catalog() -> Catalog {
    let mut portrait = portrait();
    portrait.id = Some(ShapeId::new("1"));
    portrait.color_options.push(color(
        "Walnut",
        vec![
            style(
                "Rustic",
                vec![
                    frame("Plain", "https://cdn.photoparkk.test/plain.jpg", vec![size("A4", 350)]),
                    frame(
                        "Carved",
                        "https://cdn.photoparkk.test/carved.jpg",
                        vec![size("A4", 550), size("A3", 850)],
                    ),
                ],
            ),
            style("Modern", vec![]),
        ],
    ));
    portrait.color_options.push(color("Gold", vec![]));
    let mut landscape = shape(
        "Landscape",
        vec![color(
            "White",
            vec![style(
                "Gallery",
                vec![frame(
                    "Matte",
                    "https://cdn.photoparkk.test/matte.jpg",
                    vec![size("16x12", 799)],
                )],
            )],
        )],
    );
    landscape.id = Some(ShapeId::new("2"));
    let mut square = shape("Square", vec![]);
    square.id = Some(ShapeId::new("3"));
    Catalog::new(vec![portrait, landscape, square])
}

/// Valid delivery details.
pub fn delivery() -> DeliveryDetails {
    DeliveryDetails {
        name: "Asha Rao".to_string(),
        email: "asha@example.in".to_string(),
        phone: "+91 9876543210".to_string(),
        address: "12 MG Road".to_string(),
        state: "Karnataka".to_string(),
        city: "Bengaluru".to_string(),
        pincode: "560001".to_string(),
    }
}

// ============================================================================
// SECTION: Fakes
// ============================================================================

/// Image store that records uploads and returns sequential URLs.
#[derive(Clone, Default)]
pub struct RecordingImageStore {
    /// Content types of stored images, in upload order.
    pub uploads: Arc<Mutex<Vec<String>>>,
    /// When set, every upload fails.
    pub fail: bool,
}

impl ImageStore for RecordingImageStore {
    fn put_image(&self, _bytes: &[u8], content_type: &str) -> Result<ImageUrl, ImageStoreError> {
        if self.fail {
            return Err(ImageStoreError::Io("disk full".to_string()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(content_type.to_string());
        Ok(ImageUrl::new(format!("https://cdn.photoparkk.test/uploads/{}.jpg", uploads.len())))
    }
}

/// Payment gateway fake that accepts the signature `valid`.
#[derive(Clone, Default)]
pub struct FakeGateway {
    /// Requests received by `create_order`.
    pub created: Arc<Mutex<Vec<GatewayOrderRequest>>>,
    /// Proofs received by `verify_payment`.
    pub verified: Arc<Mutex<Vec<PaymentProof>>>,
}

impl FakeGateway {
    /// Number of gateway order requests.
    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl PaymentGateway for FakeGateway {
    fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, PaymentError> {
        let mut created = self.created.lock().unwrap();
        created.push(request.clone());
        Ok(GatewayOrder {
            gateway_order_id: GatewayOrderId::new(format!("order_{}", created.len())),
            amount_minor: request.amount_minor,
            currency: request.currency.clone(),
            key_id: "rzp_test_key".to_string(),
        })
    }

    fn fetch_order(&self, id: &GatewayOrderId) -> Result<GatewayOrder, PaymentError> {
        let created = self.created.lock().unwrap();
        let request = id
            .as_str()
            .strip_prefix("order_")
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| created.get(index))
            .ok_or_else(|| PaymentError::Rejected(format!("unknown gateway order {id}")))?;
        Ok(GatewayOrder {
            gateway_order_id: id.clone(),
            amount_minor: request.amount_minor,
            currency: request.currency.clone(),
            key_id: "rzp_test_key".to_string(),
        })
    }

    fn verify_payment(&self, proof: &PaymentProof) -> Result<(), PaymentError> {
        self.verified.lock().unwrap().push(proof.clone());
        if proof.signature == "valid" {
            Ok(())
        } else {
            Err(PaymentError::Rejected("signature mismatch".to_string()))
        }
    }
}
