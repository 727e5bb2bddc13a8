// crates/photoparkk-cli/tests/catalog_commands.rs
// ============================================================================
// Module: CLI Catalog Command Tests
// Description: Integration tests for offline catalog validation.
// Purpose: Ensure catalog files are checked with the same rules as the API.
// Dependencies: photoparkk binary
// ============================================================================

//! ## Overview
//! Runs `photoparkk catalog validate` against single shapes, shape arrays, and
//! broken files, checking exit status and the reported violation.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const PORTRAIT: &str = r#"{
  "name": "Portrait",
  "colorOptions": [{
    "name": "Black",
    "styles": [{
      "styleName": "Classic",
      "frameImages": [{
        "title": "Oak",
        "imageUrl": "https://cdn.example.com/oak.jpg",
        "sizes": [{ "label": "8x10", "amount": 699 }, { "label": "12x16", "amount": 1199 }]
      }]
    }]
  }]
}"#;

fn photoparkk_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_photoparkk"))
}

fn run_validate(root: &TempDir, content: &str) -> Output {
    let path = root.path().join("catalog.json");
    fs::write(&path, content).expect("write catalog");
    Command::new(photoparkk_bin())
        .args(["catalog", "validate", path.to_string_lossy().as_ref()])
        .output()
        .expect("catalog validate")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies a single valid shape object is accepted.
#[test]
fn cli_catalog_validate_accepts_single_shape() {
    let root = tempfile::tempdir().expect("temp dir");
    let output = run_validate(&root, PORTRAIT);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Catalog valid: 1 shape(s)"), "unexpected stdout: {stdout}");
}

/// Verifies an array is validated shape by shape and the first violation is named.
#[test]
fn cli_catalog_validate_reports_violation_location() {
    let root = tempfile::tempdir().expect("temp dir");
    let broken = PORTRAIT.replace("\"Portrait\"", "\"Landscape\"").replace("699", "0");
    let output = run_validate(&root, &format!("[{PORTRAIT}, {broken}]"));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(
            "Shape 2 (Landscape) is invalid: size amount must be greater than zero at shape > \
             color 1 > style 1 > frame image 1 > size 1"
        ),
        "unexpected stderr: {stderr}"
    );
    assert!(stderr.contains("1 shape(s) rejected"), "unexpected stderr: {stderr}");
}

/// Verifies duplicate shape names are flagged after trimming and case folding.
#[test]
fn cli_catalog_validate_flags_duplicate_names() {
    let root = tempfile::tempdir().expect("temp dir");
    let duplicate = PORTRAIT.replace("\"Portrait\"", "\" portrait \"");
    let output = run_validate(&root, &format!("[{PORTRAIT}, {duplicate}]"));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicates an earlier shape name"), "unexpected stderr: {stderr}");
}

/// Verifies malformed and empty catalogs fail.
#[test]
fn cli_catalog_validate_rejects_malformed_and_empty_files() {
    let root = tempfile::tempdir().expect("temp dir");

    let malformed = run_validate(&root, "{\"name\": ");
    assert!(!malformed.status.success());
    let stderr = String::from_utf8_lossy(&malformed.stderr);
    assert!(stderr.contains("Failed to parse catalog JSON"), "unexpected stderr: {stderr}");

    let empty = run_validate(&root, "[]");
    assert!(!empty.status.success());
    let stderr = String::from_utf8_lossy(&empty.stderr);
    assert!(stderr.contains("contains no shapes"), "unexpected stderr: {stderr}");
}
