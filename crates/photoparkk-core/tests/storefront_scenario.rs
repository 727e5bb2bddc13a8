// crates/photoparkk-core/tests/storefront_scenario.rs
// ============================================================================
// Module: Storefront Scenario Tests
// Description: End-to-end customization and cash-on-delivery checkout.
// Purpose: Ensure placed orders are point-in-time copies of the catalog.
// ============================================================================

//! ## Overview
//! Walks the Portrait / Black / Classic / Floral Border example from catalog
//! creation to a placed order, then edits and deletes the shape and checks
//! that the order is unchanged.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use photoparkk_core::AdminCatalogService;
use photoparkk_core::Catalog;
use photoparkk_core::CatalogEdit;
use photoparkk_core::CheckoutConfig;
use photoparkk_core::CheckoutRequest;
use photoparkk_core::CheckoutService;
use photoparkk_core::CustomizationSession;
use photoparkk_core::FulfillmentMethod;
use photoparkk_core::InMemoryCatalogStore;
use photoparkk_core::InMemoryOrderStore;
use photoparkk_core::OrderItem;
use photoparkk_core::OrderStore;
use photoparkk_core::SelectionState;
use photoparkk_core::Timestamp;

use crate::common::FakeGateway;
use crate::common::RecordingImageStore;
use crate::common::delivery;
use crate::common::portrait;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// The storefront walkthrough produces the expected snapshot and survives catalog changes.
#[test]
fn portrait_cash_on_delivery_walkthrough() {
    let catalog_store = InMemoryCatalogStore::new();
    let admin = AdminCatalogService::new(catalog_store.clone(), RecordingImageStore::default());
    let created = admin.create_shape(portrait()).unwrap();
    let shape_id = created.id.clone().unwrap();

    let catalog = Catalog::new(admin.list_shapes().unwrap());
    let mut session = CustomizationSession::new(&catalog);
    session.choose_shape("Portrait").unwrap();
    assert_eq!(session.state(), SelectionState::ShapeChosen);
    assert!(session.color().is_none() && session.size().is_none());

    session.choose_color("Black").unwrap();
    assert_eq!(session.style().unwrap().name, "Classic");
    assert_eq!(session.frame_image().unwrap().title, "Floral Border");
    assert_eq!(session.size().unwrap().label, "8x10");
    assert_eq!(session.size().unwrap().amount, 499);

    session.choose_size("12x16").unwrap();
    session.set_quantity(2).unwrap();
    assert_eq!(session.line_total().unwrap(), 1398);

    let orders = InMemoryOrderStore::new();
    let checkout = CheckoutService::new(
        orders.clone(),
        FakeGateway::default(),
        catalog_store,
        CheckoutConfig::default(),
    );
    let request =
        CheckoutRequest::from_session(&session, delivery(), FulfillmentMethod::CashOnDelivery)
            .unwrap();
    let record = checkout
        .place_cash_on_delivery(request, Timestamp::from_unix_millis(1_760_000_000_000))
        .unwrap();
    let expected = OrderItem {
        shape: "Portrait".to_string(),
        color: "Black".to_string(),
        style: "Classic".to_string(),
        title: "Floral Border".to_string(),
        size: "12x16".to_string(),
        price: 699,
        quantity: 2,
        frame_image_url: Some("https://cdn.photoparkk.test/floral.jpg".into()),
        user_image_url: None,
    };
    assert_eq!(record.item, expected);
    assert_eq!(record.total_amount, 1398);

    let repriced = created
        .apply_edit(&CatalogEdit::SetSizeAmount {
            color: 0,
            style: 0,
            frame_image: 0,
            size: 1,
            amount: 999,
        })
        .unwrap()
        .apply_edit(&CatalogEdit::SetSizeLabel {
            color: 0,
            style: 0,
            frame_image: 0,
            size: 1,
            label: "12x18".to_string(),
        })
        .unwrap();
    admin.replace_shape(&shape_id, repriced).unwrap();
    let after_edit = orders.load_order(&record.id).unwrap().unwrap();
    assert_eq!(after_edit.item, expected);

    admin.delete_shape(&shape_id).unwrap();
    let after_delete = orders.load_order(&record.id).unwrap().unwrap();
    assert_eq!(after_delete.item.price, 699);
    assert_eq!(after_delete.item.size, "12x16");
    assert_eq!(after_delete.total_amount, 1398);
}
