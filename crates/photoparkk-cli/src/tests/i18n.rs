// crates/photoparkk-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI Message Catalog Tests
// Description: Unit tests for catalog lookup and placeholder substitution.
// Purpose: Ensure CLI messages format deterministically.
// Dependencies: photoparkk-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies catalog keys are unique, placeholders substitute, and unknown keys
//! fall back to the key itself.

use std::collections::BTreeSet;

use crate::i18n::CATALOG_ITEMS;
use crate::i18n::MessageArg;
use crate::i18n::catalog;
use crate::i18n::translate;

#[test]
fn catalog_keys_are_unique() {
    let keys: BTreeSet<&'static str> = catalog().keys().copied().collect();
    assert_eq!(keys.len(), CATALOG_ITEMS.len());
    assert!(keys.contains("config.validate.ok"));
}

#[test]
fn translate_substitutes_placeholders() {
    let output = translate(
        "catalog.validate.invalid",
        vec![
            MessageArg::new("index", "2"),
            MessageArg::new("name", "Portrait"),
            MessageArg::new("error", "size amount must be positive"),
        ],
    );
    assert_eq!(output, "Shape 2 (Portrait) is invalid: size amount must be positive");
}

#[test]
fn unknown_key_falls_back_to_key() {
    assert_eq!(translate("no.such.key", Vec::new()), "no.such.key");
}

#[test]
fn macro_formats_named_arguments() {
    let output = crate::t!("main.version", version = "1.2.3");
    assert_eq!(output, "photoparkk 1.2.3");
}
