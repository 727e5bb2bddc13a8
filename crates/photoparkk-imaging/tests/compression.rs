// crates/photoparkk-imaging/tests/compression.rs
// ============================================================================
// Module: Compression Tests
// Description: Dimension caps, fallback quality, and slot exclusion.
// Purpose: Validate compression output on generated bitmaps.
// Dependencies: photoparkk-imaging, image, proptest
// ============================================================================

//! ## Overview
//! Compresses synthetic images and checks the resulting JPEG.

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

use std::io::Cursor;

use image::DynamicImage;
use image::ImageFormat;
use image::Rgb;
use image::RgbImage;
use photoparkk_imaging::CompressionError;
use photoparkk_imaging::CompressionOptions;
use photoparkk_imaging::UploadSlots;
use photoparkk_imaging::compress_image;
use photoparkk_imaging::scaled_dimensions;
use proptest::prelude::*;

/// Encodes a gradient bitmap of the given size as PNG.
fn png(width: u32, height: u32) -> Vec<u8> {
    let bitmap = RgbImage::from_fn(width, height, |x, y| {
        let channel = |v: u32| u8::try_from(v % 256).unwrap();
        Rgb([channel(x), channel(y), channel(x + y)])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(bitmap).write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn large_landscape_is_capped_and_reencoded() {
    let compressed = compress_image(&png(2400, 1600), &CompressionOptions::default()).unwrap();
    assert_eq!((compressed.width, compressed.height), (1200, 800));
    assert_eq!(compressed.quality_used, 80);
    assert!(compressed.within_target);

    let decoded = image::load_from_memory(&compressed.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1200, 800));
    assert_eq!(image::guess_format(&compressed.bytes).unwrap(), ImageFormat::Jpeg);
}

#[test]
fn small_image_keeps_its_dimensions() {
    let compressed = compress_image(&png(320, 200), &CompressionOptions::default()).unwrap();
    assert_eq!((compressed.width, compressed.height), (320, 200));
}

#[test]
fn oversized_output_falls_back_once_and_is_accepted() {
    let options = CompressionOptions {
        target_bytes: 1,
        ..CompressionOptions::default()
    };
    let compressed = compress_image(&png(400, 300), &options).unwrap();
    assert_eq!(compressed.quality_used, 70);
    assert!(!compressed.within_target);
    assert!(!compressed.bytes.is_empty());
}

#[test]
fn undecodable_input_is_rejected() {
    let err = compress_image(b"not an image", &CompressionOptions::default()).unwrap_err();
    assert!(matches!(err, CompressionError::Decode(_)));
}

#[test]
fn busy_slot_refuses_second_upload_until_released() {
    let slots = UploadSlots::new();
    let guard = slots.acquire("session-1").unwrap();
    assert!(slots.is_busy("session-1"));

    let err =
        slots.compress("session-1", &png(10, 10), &CompressionOptions::default()).unwrap_err();
    assert_eq!(err, CompressionError::SlotBusy("session-1".to_string()));
    assert!(slots.acquire("session-2").is_ok());

    drop(guard);
    assert!(!slots.is_busy("session-1"));
    assert!(slots.compress("session-1", &png(10, 10), &CompressionOptions::default()).is_ok());
    assert!(!slots.is_busy("session-1"));
}

proptest! {
    #[test]
    fn longer_side_is_capped_and_aspect_kept(width in 1u32..6000, height in 1u32..6000) {
        let (w, h) = scaled_dimensions(width, height, 1200);
        let longer = width.max(height);
        if longer <= 1200 {
            prop_assert_eq!((w, h), (width, height));
        } else {
            prop_assert_eq!(w.max(h), 1200);
            prop_assert!(w >= 1 && h >= 1);
            let short_in = u64::from(width.min(height));
            let short_out = w.min(h);
            let diff = (u64::from(short_out) * u64::from(longer)).abs_diff(short_in * 1200);
            prop_assert!(short_out == 1 || diff * 2 <= u64::from(longer));
        }
    }
}
