// crates/photoparkk-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Catalog and Order Store
// Description: Shape and order documents in SQLite with integrity digests.
// Purpose: Persist catalog aggregates and immutable order snapshots.
// Dependencies: photoparkk-core, rusqlite, serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteStore`] keeps one row per shape and one row per order. Each row
//! carries the JSON document and its SHA-256 digest; loads recompute the
//! digest and fail closed on mismatch. Identifiers are the `SQLite` rowids,
//! rendered as decimal strings, and are never reused. Online orders also
//! record their gateway order handle under a unique index, so one handle
//! backs at most one order.
//! Security posture: database contents are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use photoparkk_core::CatalogStore;
use photoparkk_core::OrderDraft;
use photoparkk_core::OrderId;
use photoparkk_core::OrderRecord;
use photoparkk_core::OrderStatus;
use photoparkk_core::OrderStore;
use photoparkk_core::Shape;
use photoparkk_core::ShapeId;
use photoparkk_core::StoreError;
use photoparkk_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum size of a stored shape or order document.
pub const MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode.
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config with default modes for a database path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or digest mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Addressed row does not exist.
    #[error("sqlite store record not found: {0}")]
    NotFound(String),
    /// Row collides with a unique key.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// Document exceeded the size limit.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "document exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed catalog and order store.
#[derive(Clone)]
pub struct SqliteStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (creating if needed) an `SQLite`-backed store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Lists shapes in creation order.
    fn list_shape_rows(&self) -> Result<Vec<Shape>, SqliteStoreError> {
        let rows = {
            let guard = self.lock()?;
            let mut statement =
                guard.prepare("SELECT id, shape_json, shape_hash FROM shapes ORDER BY id ASC")?;
            let rows = statement
                .query_map(params![], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
                .collect::<Result<Vec<(i64, Vec<u8>, String)>, _>>()?;
            drop(statement);
            drop(guard);
            rows
        };
        rows.into_iter().map(|(id, bytes, hash)| decode_shape(id, &bytes, &hash)).collect()
    }

    /// Loads one shape row.
    fn load_shape_row(&self, key: i64) -> Result<Option<Shape>, SqliteStoreError> {
        let row: Option<(Vec<u8>, String)> = self
            .lock()?
            .query_row(
                "SELECT shape_json, shape_hash FROM shapes WHERE id = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        row.map(|(bytes, hash)| decode_shape(key, &bytes, &hash)).transpose()
    }

    /// Inserts a shape row and returns its rowid.
    fn insert_shape_row(&self, shape: &Shape) -> Result<i64, SqliteStoreError> {
        let (bytes, hash) = encode_shape(shape)?;
        let guard = self.lock()?;
        guard.execute(
            "INSERT INTO shapes (name, shape_json, shape_hash, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![shape.name, bytes, hash, unix_millis()],
        )?;
        let id = guard.last_insert_rowid();
        drop(guard);
        Ok(id)
    }

    /// Replaces a shape row.
    fn replace_shape_row(&self, key: i64, shape: &Shape) -> Result<(), SqliteStoreError> {
        let (bytes, hash) = encode_shape(shape)?;
        let changed = self.lock()?.execute(
            "UPDATE shapes SET name = ?1, shape_json = ?2, shape_hash = ?3, updated_at = ?4 \
             WHERE id = ?5",
            params![shape.name, bytes, hash, unix_millis(), key],
        )?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("shape {key}")));
        }
        Ok(())
    }

    /// Deletes a shape row.
    fn delete_shape_row(&self, key: i64) -> Result<bool, SqliteStoreError> {
        let changed = self.lock()?.execute("DELETE FROM shapes WHERE id = ?1", params![key])?;
        Ok(changed > 0)
    }

    /// Inserts an order row; the record is built inside the transaction.
    fn insert_order_row(
        &self,
        draft: OrderDraft,
        placed_at: Timestamp,
        currency: &str,
    ) -> Result<OrderRecord, SqliteStoreError> {
        let handle = draft.payment.gateway_order_id().map(|id| id.as_str().to_string());
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        if let Some(handle) = &handle {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM orders WHERE gateway_order_id = ?1",
                    params![handle],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(SqliteStoreError::Conflict(format!(
                    "gateway order {handle} already has an order"
                )));
            }
        }
        let next: i64 = tx.query_row(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM sqlite_sequence WHERE name = 'orders'",
            params![],
            |row| row.get(0),
        )?;
        let record = OrderRecord::placed(OrderId::new(next.to_string()), draft, placed_at, currency)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let (bytes, hash) = encode_document(&record)?;
        tx.execute(
            "INSERT INTO orders (id, placed_at, status, gateway_order_id, order_json, order_hash) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![next, placed_at.as_unix_millis(), record.status.as_str(), handle, bytes, hash],
        )?;
        tx.commit()?;
        drop(guard);
        Ok(record)
    }

    /// Loads one order row.
    fn load_order_row(&self, key: i64) -> Result<Option<OrderRecord>, SqliteStoreError> {
        let row: Option<(Vec<u8>, String)> = self
            .lock()?
            .query_row(
                "SELECT order_json, order_hash FROM orders WHERE id = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        row.map(|(bytes, hash)| decode_order(key, &bytes, &hash)).transpose()
    }

    /// Lists orders newest first.
    fn list_order_rows(&self) -> Result<Vec<OrderRecord>, SqliteStoreError> {
        let rows = {
            let guard = self.lock()?;
            let mut statement =
                guard.prepare("SELECT id, order_json, order_hash FROM orders ORDER BY id DESC")?;
            let rows = statement
                .query_map(params![], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
                .collect::<Result<Vec<(i64, Vec<u8>, String)>, _>>()?;
            drop(statement);
            drop(guard);
            rows
        };
        rows.into_iter().map(|(id, bytes, hash)| decode_order(id, &bytes, &hash)).collect()
    }

    /// Rewrites an order document with a new status.
    fn save_status_row(&self, key: i64, status: OrderStatus) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let row: Option<(Vec<u8>, String)> = tx
            .query_row(
                "SELECT order_json, order_hash FROM orders WHERE id = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((bytes, hash)) = row else {
            return Err(SqliteStoreError::NotFound(format!("order {key}")));
        };
        let mut record = decode_order(key, &bytes, &hash)?;
        record.status = status;
        let (bytes, hash) = encode_document(&record)?;
        tx.execute(
            "UPDATE orders SET status = ?1, order_json = ?2, order_hash = ?3 WHERE id = ?4",
            params![status.as_str(), bytes, hash, key],
        )?;
        tx.commit()?;
        drop(guard);
        Ok(())
    }
}

impl CatalogStore for SqliteStore {
    fn list_shapes(&self) -> Result<Vec<Shape>, StoreError> {
        Ok(self.list_shape_rows()?)
    }

    fn load_shape(&self, id: &ShapeId) -> Result<Option<Shape>, StoreError> {
        let Some(key) = parse_row_id(id.as_str()) else {
            return Ok(None);
        };
        Ok(self.load_shape_row(key)?)
    }

    fn create_shape(&self, shape: &Shape) -> Result<ShapeId, StoreError> {
        ensure_no_pending_uploads(shape)?;
        let id = self.insert_shape_row(shape)?;
        Ok(ShapeId::new(id.to_string()))
    }

    fn replace_shape(&self, id: &ShapeId, shape: &Shape) -> Result<(), StoreError> {
        ensure_no_pending_uploads(shape)?;
        let key =
            parse_row_id(id.as_str()).ok_or_else(|| StoreError::NotFound(format!("shape {id}")))?;
        Ok(self.replace_shape_row(key, shape)?)
    }

    fn delete_shape(&self, id: &ShapeId) -> Result<bool, StoreError> {
        let Some(key) = parse_row_id(id.as_str()) else {
            return Ok(false);
        };
        Ok(self.delete_shape_row(key)?)
    }
}

impl OrderStore for SqliteStore {
    fn insert_order(
        &self,
        draft: OrderDraft,
        placed_at: Timestamp,
        currency: &str,
    ) -> Result<OrderRecord, StoreError> {
        Ok(self.insert_order_row(draft, placed_at, currency)?)
    }

    fn load_order(&self, id: &OrderId) -> Result<Option<OrderRecord>, StoreError> {
        let Some(key) = parse_row_id(id.as_str()) else {
            return Ok(None);
        };
        Ok(self.load_order_row(key)?)
    }

    fn list_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self.list_order_rows()?)
    }

    fn save_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), StoreError> {
        let key =
            parse_row_id(id.as_str()).ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;
        Ok(self.save_status_row(key, status)?)
    }
}

// ============================================================================
// SECTION: Documents
// ============================================================================

/// Serializes a shape without its identifier.
fn encode_shape(shape: &Shape) -> Result<(Vec<u8>, String), SqliteStoreError> {
    let mut stored = shape.clone();
    stored.id = None;
    encode_document(&stored)
}

/// Serializes a document and computes its digest.
fn encode_document<T: serde::Serialize>(value: &T) -> Result<(Vec<u8>, String), SqliteStoreError> {
    let bytes =
        serde_json::to_vec(value).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_DOCUMENT_BYTES,
            actual_bytes: bytes.len(),
        });
    }
    let hash = digest_hex(&bytes);
    Ok((bytes, hash))
}

/// Verifies and decodes a shape row.
fn decode_shape(key: i64, bytes: &[u8], hash: &str) -> Result<Shape, SqliteStoreError> {
    verify_digest("shape", key, bytes, hash)?;
    let mut shape: Shape =
        serde_json::from_slice(bytes).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    shape.id = Some(ShapeId::new(key.to_string()));
    Ok(shape)
}

/// Verifies and decodes an order row.
fn decode_order(key: i64, bytes: &[u8], hash: &str) -> Result<OrderRecord, SqliteStoreError> {
    verify_digest("order", key, bytes, hash)?;
    let record: OrderRecord =
        serde_json::from_slice(bytes).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if record.id.as_str() != key.to_string() {
        return Err(SqliteStoreError::Invalid(format!(
            "order id mismatch between row {key} and payload"
        )));
    }
    Ok(record)
}

/// Fails closed when a stored document does not match its digest.
fn verify_digest(kind: &str, key: i64, bytes: &[u8], hash: &str) -> Result<(), SqliteStoreError> {
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_DOCUMENT_BYTES,
            actual_bytes: bytes.len(),
        });
    }
    if digest_hex(bytes) != hash {
        return Err(SqliteStoreError::Corrupt(format!("hash mismatch for {kind} {key}")));
    }
    Ok(())
}

/// Returns the lowercase hex SHA-256 digest.
fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a decimal rowid; non-numeric ids address nothing.
fn parse_row_id(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Rejects shapes that still carry unuploaded frame images.
fn ensure_no_pending_uploads(shape: &Shape) -> Result<(), StoreError> {
    if shape.pending_uploads().is_empty() {
        Ok(())
    } else {
        Err(StoreError::Invalid("shape has frame images awaiting upload".to_string()))
    }
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    connection.execute_batch(&format!(
        "PRAGMA foreign_keys = ON; PRAGMA journal_mode = {}; PRAGMA synchronous = {};",
        config.journal_mode.pragma_value(),
        config.sync_mode.pragma_value()
    ))?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS shapes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    shape_json BLOB NOT NULL,
                    shape_hash TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS orders (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    placed_at INTEGER NOT NULL,
                    status TEXT NOT NULL,
                    gateway_order_id TEXT,
                    order_json BLOB NOT NULL,
                    order_hash TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status);
                CREATE UNIQUE INDEX IF NOT EXISTS idx_orders_gateway_order
                    ON orders (gateway_order_id);",
            )?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit()?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
