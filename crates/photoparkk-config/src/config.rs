// crates/photoparkk-config/src/config.rs
// ============================================================================
// Module: PhotoParkk Configuration
// Description: Configuration loading and validation for the PhotoParkk service.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: photoparkk-core, photoparkk-imaging, photoparkk-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path is taken from the caller, then `PHOTOPARKK_CONFIG`, then
//! `photoparkk.toml` in the working directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use photoparkk_core::CheckoutConfig;
use photoparkk_core::DEFAULT_CURRENCY;
use photoparkk_core::PricePolicy;
use photoparkk_imaging::CompressionOptions;
use photoparkk_store_sqlite::SqliteStoreConfig;
use photoparkk_store_sqlite::SqliteStoreMode;
use photoparkk_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "photoparkk.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PHOTOPARKK_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;
/// Maximum number of admin tokens.
const MAX_ADMIN_TOKENS: usize = 64;
/// Minimum length of an admin token.
const MIN_ADMIN_TOKEN_LENGTH: usize = 16;
/// Maximum length of an admin token.
const MAX_ADMIN_TOKEN_LENGTH: usize = 256;
/// Default SQLite busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default upload directory.
const DEFAULT_UPLOAD_DIR: &str = "uploads";
/// Default public URL prefix for stored images.
const DEFAULT_PUBLIC_BASE_URL: &str = "/images";
/// Default maximum upload size in bytes.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
/// Default environment variable holding the gateway key secret.
const DEFAULT_KEY_SECRET_ENV: &str = "PHOTOPARKK_RAZORPAY_KEY_SECRET";
/// Default gateway timeout in milliseconds.
const DEFAULT_PAYMENT_TIMEOUT_MS: u64 = 10_000;
/// Minimum gateway timeout in milliseconds.
const MIN_PAYMENT_TIMEOUT_MS: u64 = 100;
/// Maximum gateway timeout in milliseconds.
const MAX_PAYMENT_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// PhotoParkk service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoparkkConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog and order store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Image upload configuration.
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Payment gateway configuration.
    #[serde(default)]
    pub payments: PaymentsConfig,
    /// Checkout policy configuration.
    #[serde(default)]
    pub checkout: CheckoutSection,
    /// Path the configuration was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl PhotoparkkConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_path = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.uploads.validate()?;
        self.payments.validate()?;
        if self.uploads.max_upload_bytes > self.server.max_body_bytes {
            return Err(ConfigError::Invalid(
                "uploads.max_upload_bytes must not exceed server.max_body_bytes".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns checkout settings derived from the payments and checkout sections.
    #[must_use]
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            currency: self.payments.currency.clone(),
            price_policy: self.checkout.price_policy,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Bearer tokens accepted on admin routes.
    #[serde(default)]
    pub admin_tokens: Vec<String>,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            admin_tokens: Vec::new(),
            audit: ServerAuditConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.admin_tokens.len() > MAX_ADMIN_TOKENS {
            return Err(ConfigError::Invalid("too many admin tokens".to_string()));
        }
        for token in &self.admin_tokens {
            if token.len() < MIN_ADMIN_TOKEN_LENGTH || token.len() > MAX_ADMIN_TOKEN_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "admin token length must be between {MIN_ADMIN_TOKEN_LENGTH} and \
                     {MAX_ADMIN_TOKEN_LENGTH}"
                )));
            }
            if token.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(
                    "admin token must not contain whitespace".to_string(),
                ));
            }
        }
        let addr = self.bind_addr()?;
        if !addr.ip().is_loopback() && self.admin_tokens.is_empty() {
            return Err(ConfigError::Invalid(
                "non-loopback bind disallowed without admin tokens".to_string(),
            ));
        }
        self.audit.validate()
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerAuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("server.audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// In-memory store; data is lost on restart.
    #[default]
    Memory,
    /// SQLite-backed store.
    Sqlite,
}

/// Catalog and order store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// SQLite database path.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// SQLite journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// SQLite sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::Memory,
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Returns the SQLite settings when the SQLite backend is selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match (self.store_type, &self.path) {
            (StoreType::Sqlite, Some(path)) => Some(SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
            _ => None,
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory store does not accept a path".to_string(),
                    ));
                }
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_path_string("store.path", &path.to_string_lossy())?;
            }
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Uploads
// ============================================================================

/// Image upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Directory stored images are written to.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    /// URL prefix under which stored images are served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum accepted upload size in bytes, before compression.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Maximum length of the longer side after compression.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    /// Best-effort compressed size target in KB.
    #[serde(default = "default_target_kb")]
    pub target_kb: usize,
    /// First-pass JPEG quality.
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Second-pass JPEG quality.
    #[serde(default = "default_fallback_quality")]
    pub fallback_quality: u8,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            public_base_url: default_public_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
            max_dimension: default_max_dimension(),
            target_kb: default_target_kb(),
            quality: default_quality(),
            fallback_quality: default_fallback_quality(),
        }
    }
}

impl UploadsConfig {
    /// Returns compression options for these settings.
    #[must_use]
    pub fn compression_options(&self) -> CompressionOptions {
        CompressionOptions {
            max_dimension: self.max_dimension,
            target_bytes: self.target_kb.saturating_mul(1024),
            quality: self.quality,
            fallback_quality: self.fallback_quality,
        }
    }

    /// Validates upload configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("uploads.dir", &self.dir.to_string_lossy())?;
        let base = self.public_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Invalid(
                "uploads.public_base_url must be non-empty".to_string(),
            ));
        }
        if !(base.starts_with('/') || base.starts_with("http://") || base.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(
                "uploads.public_base_url must be an absolute path or http(s) url".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "uploads.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        self.compression_options()
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("uploads: {err}")))
    }
}

// ============================================================================
// SECTION: Payments
// ============================================================================

/// Payment gateway provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    /// Online payments disabled; cash on delivery only.
    #[default]
    Disabled,
    /// Razorpay-compatible gateway.
    Razorpay,
}

/// Payment gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    /// Gateway provider.
    #[serde(default)]
    pub provider: PaymentProvider,
    /// Public key identifier.
    #[serde(default)]
    pub key_id: Option<String>,
    /// Environment variable holding the key secret.
    #[serde(default = "default_key_secret_env")]
    pub key_secret_env: String,
    /// Optional API base URL override.
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Gateway request timeout in milliseconds.
    #[serde(default = "default_payment_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            provider: PaymentProvider::Disabled,
            key_id: None,
            key_secret_env: default_key_secret_env(),
            api_base_url: None,
            currency: default_currency(),
            timeout_ms: default_payment_timeout_ms(),
        }
    }
}

impl PaymentsConfig {
    /// Reads the key secret from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the variable is unset or empty.
    pub fn resolve_key_secret(&self) -> Result<String, ConfigError> {
        match env::var(&self.key_secret_env) {
            Ok(secret) if !secret.is_empty() => Ok(secret),
            _ => Err(ConfigError::Invalid(format!(
                "payment key secret not set in {}",
                self.key_secret_env
            ))),
        }
    }

    /// Validates payment configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let currency = self.currency.as_bytes();
        if currency.len() != 3 || !currency.iter().all(u8::is_ascii_uppercase) {
            return Err(ConfigError::Invalid(
                "payments.currency must be a three-letter uppercase code".to_string(),
            ));
        }
        if !(MIN_PAYMENT_TIMEOUT_MS ..= MAX_PAYMENT_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "payments.timeout_ms must be between {MIN_PAYMENT_TIMEOUT_MS} and \
                 {MAX_PAYMENT_TIMEOUT_MS}"
            )));
        }
        if self.provider == PaymentProvider::Razorpay {
            if self.key_id.as_deref().is_none_or(|key| key.trim().is_empty()) {
                return Err(ConfigError::Invalid("razorpay provider requires key_id".to_string()));
            }
            if self.key_secret_env.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "razorpay provider requires key_secret_env".to_string(),
                ));
            }
            if let Some(base) = &self.api_base_url
                && !(base.starts_with("https://") || base.starts_with("http://"))
            {
                return Err(ConfigError::Invalid(
                    "payments.api_base_url must be an http(s) url".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Checkout
// ============================================================================

/// Checkout policy configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CheckoutSection {
    /// Treatment of client-submitted prices.
    #[serde(default)]
    pub price_policy: PricePolicy,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

/// Default SQLite busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Default upload directory.
fn default_upload_dir() -> PathBuf {
    PathBuf::from(DEFAULT_UPLOAD_DIR)
}

/// Default public URL prefix for stored images.
fn default_public_base_url() -> String {
    DEFAULT_PUBLIC_BASE_URL.to_string()
}

/// Default maximum upload size.
const fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

/// Default longer-side cap.
fn default_max_dimension() -> u32 {
    CompressionOptions::default().max_dimension
}

/// Default compressed size target in KB.
fn default_target_kb() -> usize {
    CompressionOptions::default().target_bytes / 1024
}

/// Default first-pass quality.
fn default_quality() -> u8 {
    CompressionOptions::default().quality
}

/// Default second-pass quality.
fn default_fallback_quality() -> u8 {
    CompressionOptions::default().fallback_quality
}

/// Default key secret environment variable.
fn default_key_secret_env() -> String {
    DEFAULT_KEY_SECRET_ENV.to_string()
}

/// Default currency.
fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Default gateway timeout.
const fn default_payment_timeout_ms() -> u64 {
    DEFAULT_PAYMENT_TIMEOUT_MS
}
