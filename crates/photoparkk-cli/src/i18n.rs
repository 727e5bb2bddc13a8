// crates/photoparkk-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and formatting utilities for the CLI.
// Purpose: Centralize user-facing strings so every command words output alike.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! The PhotoParkk CLI keeps its user-facing strings in a small catalog. All
//! runtime output should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
pub(crate) const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "photoparkk {version}"),
    ("serve.config.load_failed", "Failed to load config: {error}"),
    ("serve.init_failed", "Failed to initialize server: {error}"),
    ("serve.failed", "Server failed: {error}"),
    ("serve.listening", "PhotoParkk listening on {bind}"),
    (
        "serve.warn.open_admin",
        "Warning: no admin tokens configured. Catalog and order routes are open to any \
         loopback caller.",
    ),
    (
        "serve.warn.payments_disabled",
        "Warning: payments.provider=disabled. Online checkout will be refused.",
    ),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("input.read_failed", "Failed to read {path}: {error}"),
    ("input.too_large", "{path} exceeds the {limit} byte input limit."),
    ("catalog.parse_failed", "Failed to parse catalog JSON at {path}: {error}"),
    ("catalog.validate.ok", "Catalog valid: {count} shape(s)."),
    ("catalog.validate.empty", "Catalog file {path} contains no shapes."),
    ("catalog.validate.invalid", "Shape {index} ({name}) is invalid: {error}"),
    ("catalog.validate.duplicate", "Shape {index} ({name}) duplicates an earlier shape name."),
    ("catalog.validate.failed", "Catalog invalid: {count} shape(s) rejected."),
    ("image.options_invalid", "Invalid compression options: {error}"),
    ("image.compress_failed", "Failed to compress {path}: {error}"),
    ("image.write_failed", "Failed to write {path}: {error}"),
    (
        "image.compress.ok",
        "Wrote {path}: {width}x{height}, {bytes} bytes at quality {quality}.",
    ),
    (
        "image.compress.over_target",
        "Warning: output is still above the {target} byte target after the fallback pass.",
    ),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` in the catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static catalog used by the CLI.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
