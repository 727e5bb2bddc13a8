// crates/photoparkk-core/tests/selection.rs
// ============================================================================
// Module: Customization Session Tests
// Description: Cascading resets, auto-advance, and checkout readiness.
// Purpose: Ensure the selection chain stays consistent under any input order.
// ============================================================================

//! ## Overview
//! Covers every selection transition, the snapshot round trip through a
//! session store, and a property test over random transition sequences.

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

use photoparkk_core::Catalog;
use photoparkk_core::CustomizationSession;
use photoparkk_core::ImageUrl;
use photoparkk_core::InMemorySessionStore;
use photoparkk_core::SelectionError;
use photoparkk_core::SelectionLevel;
use photoparkk_core::SelectionState;
use photoparkk_core::SessionStore;
use photoparkk_core::UserImage;
use proptest::prelude::*;

use crate::common::branching_catalog;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Asserts that every selected level belongs to the level above it.
fn assert_chain_consistent(session: &CustomizationSession<'_>) {
    if let Some(size) = session.size() {
        assert!(session.frame_image().unwrap().sizes.contains(size));
    }
    if let Some(frame) = session.frame_image() {
        assert!(session.style().unwrap().frame_images.contains(frame));
    }
    if let Some(style) = session.style() {
        assert!(session.color().unwrap().styles.contains(style));
    }
    if let Some(color) = session.color() {
        assert!(session.shape().unwrap().color_options.contains(color));
    }
}

/// One random transition.
#[derive(Debug, Clone)]
enum Step {
    /// Choose a shape by name.
    Shape(String),
    /// Choose a color by name.
    Color(String),
    /// Choose a style by name.
    Style(String),
    /// Choose a frame image by title.
    Frame(String),
    /// Choose a size by label.
    Size(String),
    /// Set a quantity.
    Quantity(u32),
}

/// Strategy over transitions using names that exist somewhere in the catalog.
fn step_strategy() -> impl Strategy<Value = Step> {
    let shapes = prop::sample::select(vec!["Portrait", "Landscape", "Square", "Oval"]);
    let colors = prop::sample::select(vec!["Black", "Walnut", "Gold", "White"]);
    let styles = prop::sample::select(vec!["Classic", "Rustic", "Modern", "Gallery"]);
    let frames = prop::sample::select(vec!["Floral Border", "Plain", "Carved", "Matte"]);
    let sizes = prop::sample::select(vec!["8x10", "12x16", "A4", "A3", "16x12"]);
    prop_oneof![
        shapes.prop_map(|name| Step::Shape(name.to_string())),
        colors.prop_map(|name| Step::Color(name.to_string())),
        styles.prop_map(|name| Step::Style(name.to_string())),
        frames.prop_map(|name| Step::Frame(name.to_string())),
        sizes.prop_map(|name| Step::Size(name.to_string())),
        (0_u32 .. 5).prop_map(Step::Quantity),
    ]
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Choosing a shape clears everything below it.
#[test]
fn choose_shape_resets_downstream() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    session.choose_shape("Portrait").unwrap();
    session.choose_color("Walnut").unwrap();
    session.choose_frame_image("Carved").unwrap();
    session.choose_size("A3").unwrap();
    assert_eq!(session.state(), SelectionState::SizeChosen);

    session.choose_shape("Portrait").unwrap();
    assert_eq!(session.state(), SelectionState::ShapeChosen);
    assert!(session.color().is_none());
    assert!(session.style().is_none());
    assert!(session.frame_image().is_none());
    assert!(session.size().is_none());
}

/// A single-option chain is fully selected by choosing the color.
#[test]
fn choose_color_auto_advances_to_first_size() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    session.choose_shape("Landscape").unwrap();
    session.choose_color("White").unwrap();
    assert_eq!(session.state(), SelectionState::SizeChosen);
    assert_eq!(session.size().unwrap().label, "16x12");
    assert!(!session.requires_style_choice());
    assert!(!session.requires_frame_image_choice());
}

/// Auto-advance stops at the first level without options.
#[test]
fn auto_advance_stops_at_empty_level() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    session.choose_shape("Portrait").unwrap();
    session.choose_color("Gold").unwrap();
    assert_eq!(session.state(), SelectionState::ColorChosen);

    session.choose_color("Walnut").unwrap();
    assert_eq!(session.style().unwrap().name, "Rustic");
    assert_eq!(session.frame_image().unwrap().title, "Plain");
    assert_eq!(session.size().unwrap().label, "A4");
    assert!(session.requires_style_choice());
    assert!(session.requires_frame_image_choice());

    session.choose_style("Modern").unwrap();
    assert_eq!(session.state(), SelectionState::StyleChosen);
}

/// Choosing a style or frame image clears only the levels below it.
#[test]
fn style_and_frame_choices_clear_below() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    session.choose_shape("Portrait").unwrap();
    session.choose_color("Walnut").unwrap();
    session.choose_style("Rustic").unwrap();
    assert_eq!(session.state(), SelectionState::StyleChosen);
    session.choose_frame_image("Carved").unwrap();
    assert_eq!(session.state(), SelectionState::FrameImageChosen);
    session.choose_size("A3").unwrap();
    assert_eq!(session.line_total().unwrap(), 850);
    session.choose_frame_image("Plain").unwrap();
    assert!(session.size().is_none());
    assert_eq!(session.color().unwrap().name, "Walnut");
}

/// Unknown names are rejected and leave the session unchanged.
#[test]
fn unknown_option_leaves_session_unchanged() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    session.choose_shape("Portrait").unwrap();
    session.choose_color("Black").unwrap();
    let before = session.snapshot();
    assert_eq!(
        session.choose_size("A3"),
        Err(SelectionError::UnknownSize("A3".to_string()))
    );
    assert_eq!(
        session.choose_color("Mauve"),
        Err(SelectionError::UnknownColor("Mauve".to_string()))
    );
    assert_eq!(session.snapshot(), before);
}

/// Levels cannot be chosen before their parents.
#[test]
fn skipping_a_level_is_rejected() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    assert_eq!(
        session.choose_color("Black"),
        Err(SelectionError::OutOfOrder {
            attempted: SelectionLevel::Color,
            missing: SelectionLevel::Shape,
        })
    );
    session.choose_shape("Portrait").unwrap();
    assert_eq!(
        session.choose_style("Classic"),
        Err(SelectionError::OutOfOrder {
            attempted: SelectionLevel::Style,
            missing: SelectionLevel::Color,
        })
    );
    assert_eq!(session.state(), SelectionState::ShapeChosen);
}

/// Quantity must be at least one and never touches the chain.
#[test]
fn quantity_is_independent() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    assert_eq!(session.quantity(), 1);
    assert_eq!(session.set_quantity(0), Err(SelectionError::InvalidQuantity));
    assert_eq!(session.quantity(), 1);
    session.choose_shape("Landscape").unwrap();
    session.choose_color("White").unwrap();
    session.set_quantity(3).unwrap();
    assert_eq!(session.state(), SelectionState::SizeChosen);
    assert_eq!(session.line_total().unwrap(), 2397);
}

/// Checkout names the first unset level.
#[test]
fn checkout_rejects_incomplete_chain() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    let err = session.proceed_to_checkout().unwrap_err();
    assert_eq!(err.to_string(), "please select a shape");
    session.choose_shape("Portrait").unwrap();
    session.choose_color("Gold").unwrap();
    assert_eq!(
        session.proceed_to_checkout(),
        Err(SelectionError::Incomplete {
            missing: SelectionLevel::Style,
        })
    );
}

/// A local photo must be uploaded before checkout.
#[test]
fn checkout_requires_uploaded_user_image() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    session.choose_shape("Landscape").unwrap();
    session.choose_color("White").unwrap();
    session.upload_user_image(UserImage::Local {
        file_name: "me.jpg".to_string(),
        bytes: vec![0xFF, 0xD8],
    });
    assert_eq!(session.proceed_to_checkout(), Err(SelectionError::UserImageNotUploaded));
    assert_eq!(session.state(), SelectionState::SizeChosen);

    let url = ImageUrl::new("https://cdn.photoparkk.test/uploads/me.jpg");
    session.upload_user_image(UserImage::Uploaded {
        url: url.clone(),
    });
    let item = session.proceed_to_checkout().unwrap();
    assert_eq!(item.user_image_url, Some(url));
    assert_eq!(item.price, 799);
}

/// Snapshots survive a session store and replay without auto-advance.
#[test]
fn snapshot_round_trips_through_session_store() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    session.choose_shape("Portrait").unwrap();
    session.choose_color("Walnut").unwrap();
    session.choose_style("Rustic").unwrap();
    session.set_quantity(2).unwrap();

    let store = InMemorySessionStore::new();
    store.save_session("browser-1", &session.snapshot()).unwrap();
    let loaded = store.load_session("browser-1").unwrap().unwrap();
    let restored = CustomizationSession::restore(&catalog, &loaded).unwrap();
    assert_eq!(restored.state(), SelectionState::StyleChosen);
    assert_eq!(restored.quantity(), 2);
    assert_eq!(restored.snapshot(), session.snapshot());

    store.clear_session("browser-1").unwrap();
    assert!(store.load_session("browser-1").unwrap().is_none());
}

/// Snapshots that no longer resolve are rejected.
#[test]
fn restore_rejects_stale_or_gapped_snapshots() {
    let catalog = branching_catalog();
    let mut session = CustomizationSession::new(&catalog);
    session.choose_shape("Portrait").unwrap();
    session.choose_color("Black").unwrap();
    let mut snapshot = session.snapshot();

    let mut stale = snapshot.clone();
    stale.size = Some("30x40".to_string());
    assert_eq!(
        CustomizationSession::restore(&catalog, &stale).unwrap_err(),
        SelectionError::UnknownSize("30x40".to_string())
    );

    snapshot.style = None;
    assert_eq!(
        CustomizationSession::restore(&catalog, &snapshot).unwrap_err(),
        SelectionError::OutOfOrder {
            attempted: SelectionLevel::FrameImage,
            missing: SelectionLevel::Style,
        }
    );

    let empty = Catalog::default();
    assert!(CustomizationSession::restore(&empty, &session.snapshot()).is_err());
}

proptest! {
    /// The chain stays consistent after every transition, accepted or not.
    #[test]
    fn chain_is_consistent_after_any_sequence(
        steps in prop::collection::vec(step_strategy(), 0..40)
    ) {
        let catalog = branching_catalog();
        let mut session = CustomizationSession::new(&catalog);
        for step in steps {
            let _ = match step {
                Step::Shape(name) => session.choose_shape(&name),
                Step::Color(name) => session.choose_color(&name),
                Step::Style(name) => session.choose_style(&name),
                Step::Frame(title) => session.choose_frame_image(&title),
                Step::Size(label) => session.choose_size(&label),
                Step::Quantity(quantity) => session.set_quantity(quantity),
            };
            assert_chain_consistent(&session);
            prop_assert!(session.quantity() >= 1);
        }
    }

    /// Choosing a shape always clears every downstream level.
    #[test]
    fn choose_shape_always_clears(steps in prop::collection::vec(step_strategy(), 0..20)) {
        let catalog = branching_catalog();
        let mut session = CustomizationSession::new(&catalog);
        for step in steps {
            let _ = match step {
                Step::Shape(name) => session.choose_shape(&name),
                Step::Color(name) => session.choose_color(&name),
                Step::Style(name) => session.choose_style(&name),
                Step::Frame(title) => session.choose_frame_image(&title),
                Step::Size(label) => session.choose_size(&label),
                Step::Quantity(quantity) => session.set_quantity(quantity),
            };
        }
        session.choose_shape("Square").unwrap();
        prop_assert_eq!(session.state(), SelectionState::ShapeChosen);
        prop_assert!(session.color().is_none() && session.size().is_none());
    }
}
