// crates/photoparkk-core/tests/editor.rs
// ============================================================================
// Module: Admin Editor Tests
// Description: Copy-on-write edits and the admin catalog write path.
// Purpose: Ensure edits never mutate shared values and submissions are validated.
// ============================================================================

//! ## Overview
//! Exercises [`photoparkk_core::CatalogEdit`] application and
//! [`photoparkk_core::AdminCatalogService`] against the in-memory store.

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
use photoparkk_core::AdminError;
use photoparkk_core::CatalogEdit;
use photoparkk_core::CatalogLocation;
use photoparkk_core::CatalogStore;
use photoparkk_core::EditError;
use photoparkk_core::ImageUrl;
use photoparkk_core::InMemoryCatalogStore;
use photoparkk_core::PendingUpload;
use photoparkk_core::ShapeEditor;
use photoparkk_core::ShapeId;
use photoparkk_core::Size;
use photoparkk_core::ViolationReason;

use crate::common::RecordingImageStore;
use crate::common::portrait;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a pending upload.
fn pending(name: &str) -> PendingUpload {
    PendingUpload {
        file_name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    }
}

/// Builds a new shape through the editor the way the admin form does.
fn edited_landscape() -> ShapeEditor {
    let mut editor = ShapeEditor::new();
    let edits = [
        CatalogEdit::SetShapeName {
            name: "Landscape".to_string(),
        },
        CatalogEdit::AddColor,
        CatalogEdit::SetColorName {
            color: 0,
            name: "White".to_string(),
        },
        CatalogEdit::AddStyle {
            color: 0,
        },
        CatalogEdit::SetStyleName {
            color: 0,
            style: 0,
            name: "Gallery".to_string(),
        },
        CatalogEdit::AddFrameImage {
            color: 0,
            style: 0,
        },
        CatalogEdit::SetFrameTitle {
            color: 0,
            style: 0,
            frame_image: 0,
            title: "Matte".to_string(),
        },
        CatalogEdit::AttachPendingUpload {
            color: 0,
            style: 0,
            frame_image: 0,
            upload: pending("matte.jpg"),
        },
        CatalogEdit::SetSizeLabel {
            color: 0,
            style: 0,
            frame_image: 0,
            size: 0,
            label: "16x12".to_string(),
        },
        CatalogEdit::SetSizeAmount {
            color: 0,
            style: 0,
            frame_image: 0,
            size: 0,
            amount: 799,
        },
    ];
    for edit in &edits {
        editor.apply(edit).unwrap();
    }
    editor
}

// ============================================================================
// SECTION: Edit Tests
// ============================================================================

/// Applying an edit leaves the original value untouched.
#[test]
fn apply_edit_is_copy_on_write() {
    let original = portrait();
    let edited = original
        .apply_edit(&CatalogEdit::SetSizeAmount {
            color: 0,
            style: 0,
            frame_image: 0,
            size: 1,
            amount: 749,
        })
        .unwrap();
    assert_eq!(original.color_options[0].styles[0].frame_images[0].sizes[1].amount, 699);
    assert_eq!(edited.color_options[0].styles[0].frame_images[0].sizes[1].amount, 749);
}

/// New frame images start with one blank size.
#[test]
fn added_frame_image_has_one_blank_size() {
    let edited = portrait()
        .apply_edit(&CatalogEdit::AddFrameImage {
            color: 0,
            style: 0,
        })
        .unwrap();
    let frames = &edited.color_options[0].styles[0].frame_images;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].sizes, vec![Size::default()]);
}

/// Out-of-range paths are rejected and the editor keeps its value.
#[test]
fn missing_path_is_rejected() {
    let mut editor = ShapeEditor::from_shape(portrait());
    let err = editor
        .apply(&CatalogEdit::RemoveSize {
            color: 0,
            style: 0,
            frame_image: 3,
            size: 0,
        })
        .unwrap_err();
    assert_eq!(err, EditError::PathNotFound(CatalogLocation::frame_image(0, 0, 3)));
    assert_eq!(editor.shape(), &portrait());
}

/// Setting a URL discards a pending upload.
#[test]
fn set_image_url_clears_pending_upload() {
    let editor = edited_landscape();
    assert_eq!(editor.shape().pending_uploads(), vec![CatalogLocation::frame_image(0, 0, 0)]);
    let updated = editor
        .shape()
        .apply_edit(&CatalogEdit::SetFrameImageUrl {
            color: 0,
            style: 0,
            frame_image: 0,
            url: ImageUrl::new("https://cdn.photoparkk.test/matte.jpg"),
        })
        .unwrap();
    assert!(updated.pending_uploads().is_empty());
}

/// Removing a color removes everything beneath it.
#[test]
fn remove_color_cascades() {
    let edited = portrait()
        .apply_edit(&CatalogEdit::RemoveColor {
            color: 0,
        })
        .unwrap();
    assert!(edited.color_options.is_empty());
    assert!(edited.validate().is_ok());
}

// ============================================================================
// SECTION: Admin Service Tests
// ============================================================================

/// Creating a shape uploads pending files and splices their URLs in.
#[test]
fn create_uploads_pending_frame_images() {
    let store = InMemoryCatalogStore::new();
    let images = RecordingImageStore::default();
    let admin = AdminCatalogService::new(store.clone(), images.clone());
    let created = admin.create_shape(edited_landscape().into_shape()).unwrap();

    let id = created.id.clone().unwrap();
    let stored = store.load_shape(&id).unwrap().unwrap();
    let frame = &stored.color_options[0].styles[0].frame_images[0];
    assert_eq!(
        frame.image_url,
        Some(ImageUrl::new("https://cdn.photoparkk.test/uploads/1.jpg"))
    );
    assert!(frame.pending_upload.is_none());
    assert_eq!(images.uploads.lock().unwrap().as_slice(), ["image/jpeg".to_string()]);
}

/// Invalid shapes are rejected before any upload.
#[test]
fn invalid_shape_is_not_uploaded_or_stored() {
    let store = InMemoryCatalogStore::new();
    let images = RecordingImageStore::default();
    let admin = AdminCatalogService::new(store.clone(), images.clone());
    let mut editor = edited_landscape();
    editor
        .apply(&CatalogEdit::SetSizeAmount {
            color: 0,
            style: 0,
            frame_image: 0,
            size: 0,
            amount: 0,
        })
        .unwrap();
    let err = admin.create_shape(editor.into_shape()).unwrap_err();
    assert!(matches!(
        err,
        AdminError::Invalid(violation) if violation.reason == ViolationReason::MissingSizeAmount
    ));
    assert!(images.uploads.lock().unwrap().is_empty());
    assert!(store.list_shapes().unwrap().is_empty());
}

/// Shape names are unique ignoring case and surrounding whitespace.
#[test]
fn duplicate_shape_names_are_rejected() {
    let admin =
        AdminCatalogService::new(InMemoryCatalogStore::new(), RecordingImageStore::default());
    admin.create_shape(portrait()).unwrap();
    let mut twin = portrait();
    twin.name = "  portrait ".to_string();
    let err = admin.create_shape(twin).unwrap_err();
    assert!(matches!(err, AdminError::DuplicateShapeName(name) if name == "portrait"));
}

/// A name clash is detected before any pending image is uploaded.
#[test]
fn duplicate_name_uploads_nothing() {
    let images = RecordingImageStore::default();
    let admin = AdminCatalogService::new(InMemoryCatalogStore::new(), images.clone());
    admin.create_shape(edited_landscape().into_shape()).unwrap();
    let uploaded = images.uploads.lock().unwrap().len();
    assert!(uploaded > 0);

    let err = admin.create_shape(edited_landscape().into_shape()).unwrap_err();
    assert!(matches!(err, AdminError::DuplicateShapeName(_)));
    assert_eq!(images.uploads.lock().unwrap().len(), uploaded);
}

/// A failed upload persists nothing.
#[test]
fn upload_failure_persists_nothing() {
    let store = InMemoryCatalogStore::new();
    let images = RecordingImageStore {
        fail: true,
        ..RecordingImageStore::default()
    };
    let admin = AdminCatalogService::new(store.clone(), images);
    let err = admin.create_shape(edited_landscape().into_shape()).unwrap_err();
    assert!(matches!(err, AdminError::Upload(_)));
    assert!(store.list_shapes().unwrap().is_empty());
}

/// Replacing keeps the identifier and may keep the same name.
#[test]
fn replace_is_whole_aggregate_last_write_wins() {
    let admin =
        AdminCatalogService::new(InMemoryCatalogStore::new(), RecordingImageStore::default());
    let created = admin.create_shape(portrait()).unwrap();
    let id = created.id.clone().unwrap();

    let renamed = created
        .apply_edit(&CatalogEdit::SetColorName {
            color: 0,
            name: "Matte Black".to_string(),
        })
        .unwrap();
    admin.replace_shape(&id, renamed).unwrap();
    let stored = admin.get_shape(&id).unwrap();
    assert_eq!(stored.color_options[0].name, "Matte Black");
    assert_eq!(stored.id, Some(id.clone()));

    let missing = ShapeId::new("999");
    assert!(matches!(admin.replace_shape(&missing, portrait()), Err(AdminError::NotFound(_))));
}

/// Deleting removes the whole aggregate once.
#[test]
fn delete_removes_shape() {
    let admin =
        AdminCatalogService::new(InMemoryCatalogStore::new(), RecordingImageStore::default());
    let id = admin.create_shape(portrait()).unwrap().id.unwrap();
    admin.delete_shape(&id).unwrap();
    assert!(admin.list_shapes().unwrap().is_empty());
    assert!(matches!(admin.delete_shape(&id), Err(AdminError::NotFound(_))));
}
