// crates/photoparkk-server/src/images.rs
// ============================================================================
// Module: PhotoParkk Image Storage
// Description: Content-addressed file image store and compressing uploader.
// Purpose: Compress uploads, store them on disk, and hand back public URLs.
// Dependencies: photoparkk-core, photoparkk-imaging, sha2, hex
// ============================================================================

//! ## Overview
//! [`FileImageStore`] writes each image once under a name derived from its
//! SHA-256 digest, so repeated uploads of the same bytes share one file and
//! one URL. [`ImageUploader`] sits in front of it: it enforces the upload size
//! limit, compresses the payload to JPEG, and for customer uploads holds the
//! caller's slot for the whole compress-and-store step.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use photoparkk_core::ImageStore;
use photoparkk_core::ImageStoreError;
use photoparkk_core::ImageUrl;
use photoparkk_imaging::CompressedImage;
use photoparkk_imaging::CompressionError;
use photoparkk_imaging::CompressionOptions;
use photoparkk_imaging::OUTPUT_CONTENT_TYPE;
use photoparkk_imaging::UploadSlots;
use photoparkk_imaging::compress_image;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum length of a stored image file name.
const MAX_IMAGE_NAME_LENGTH: usize = 80;

/// Maximum length of an upload slot key.
pub const MAX_SLOT_KEY_LENGTH: usize = 128;

// ============================================================================
// SECTION: File Image Store
// ============================================================================

/// Image store writing content-addressed files to a directory.
#[derive(Debug, Clone)]
pub struct FileImageStore {
    /// Directory holding stored images.
    dir: PathBuf,
    /// URL prefix the directory is served under.
    public_base_url: String,
}

impl FileImageStore {
    /// Opens a store, creating the directory when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError::Io`] when the directory cannot be created.
    pub fn new(
        dir: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, ImageStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| ImageStoreError::Io(err.to_string()))?;
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            dir,
            public_base_url,
        })
    }

    /// Reads a stored image by file name. Returns `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError::Rejected`] for names that do not address a
    /// stored image, or [`ImageStoreError::Io`] when reading fails.
    pub fn read(&self, name: &str) -> Result<Option<Vec<u8>>, ImageStoreError> {
        if !is_valid_image_name(name) {
            return Err(ImageStoreError::Rejected("invalid image name".to_string()));
        }
        match fs::read(self.dir.join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ImageStoreError::Io(err.to_string())),
        }
    }

    /// Returns the public URL of a stored file name.
    fn url_for(&self, name: &str) -> ImageUrl {
        ImageUrl::new(format!("{}/{name}", self.public_base_url))
    }
}

impl ImageStore for FileImageStore {
    fn put_image(&self, bytes: &[u8], content_type: &str) -> Result<ImageUrl, ImageStoreError> {
        let extension = extension_for(content_type).ok_or_else(|| {
            ImageStoreError::Rejected(format!("unsupported content type {content_type}"))
        })?;
        let name = format!("{}.{extension}", hex::encode(Sha256::digest(bytes)));
        let path = self.dir.join(&name);
        if !path.exists() {
            let staging = self.dir.join(format!("{name}.part"));
            fs::write(&staging, bytes).map_err(|err| ImageStoreError::Io(err.to_string()))?;
            fs::rename(&staging, &path).map_err(|err| ImageStoreError::Io(err.to_string()))?;
        }
        Ok(self.url_for(&name))
    }
}

/// Maps an image content type to a file extension.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Returns the content type served for a stored file name.
#[must_use]
pub fn content_type_for(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => OUTPUT_CONTENT_TYPE,
    }
}

/// Accepts `<lowercase hex>.<ext>` names only.
fn is_valid_image_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_IMAGE_NAME_LENGTH {
        return false;
    }
    let Some((stem, ext)) = name.split_once('.') else {
        return false;
    };
    !stem.is_empty()
        && stem.bytes().all(|b| b.is_ascii_digit() || (b'a' ..= b'f').contains(&b))
        && matches!(ext, "jpg" | "png" | "webp")
}

// ============================================================================
// SECTION: Uploader
// ============================================================================

/// Stored upload returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Public URL of the stored image.
    pub url: ImageUrl,
    /// Stored width in pixels.
    pub width: u32,
    /// Stored height in pixels.
    pub height: u32,
    /// Stored size in bytes.
    pub bytes: usize,
    /// JPEG quality of the stored encoding.
    pub quality: u8,
    /// Whether the stored size met the configured target.
    pub within_target: bool,
}

/// Compressing front for the file image store.
#[derive(Debug, Clone)]
pub struct ImageUploader {
    /// Backing file store.
    files: FileImageStore,
    /// Per-slot upload serialization.
    slots: UploadSlots,
    /// Compression settings.
    options: CompressionOptions,
    /// Maximum accepted payload size before compression.
    max_upload_bytes: usize,
}

impl ImageUploader {
    /// Creates an uploader.
    #[must_use]
    pub fn new(
        files: FileImageStore,
        options: CompressionOptions,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            files,
            slots: UploadSlots::new(),
            options,
            max_upload_bytes,
        }
    }

    /// Returns the backing file store.
    #[must_use]
    pub const fn files(&self) -> &FileImageStore {
        &self.files
    }

    /// Compresses and stores an upload while holding `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError::SlotBusy`] when another upload holds the
    /// slot, [`ImageStoreError::TooLarge`] over the size limit,
    /// [`ImageStoreError::Rejected`] for undecodable input, or
    /// [`ImageStoreError::Io`] when storing fails.
    pub fn upload(&self, slot: &str, bytes: &[u8]) -> Result<UploadedImage, ImageStoreError> {
        let slot = slot.trim();
        if slot.is_empty() || slot.len() > MAX_SLOT_KEY_LENGTH {
            return Err(ImageStoreError::Rejected(format!(
                "slot key must be 1 to {MAX_SLOT_KEY_LENGTH} characters"
            )));
        }
        let _guard = self.slots.acquire(slot).map_err(map_compression_error)?;
        self.compress_and_store(bytes)
    }

    /// Checks the size limit, compresses, and stores.
    fn compress_and_store(&self, bytes: &[u8]) -> Result<UploadedImage, ImageStoreError> {
        if bytes.len() > self.max_upload_bytes {
            return Err(ImageStoreError::TooLarge {
                actual: bytes.len(),
                limit: self.max_upload_bytes,
            });
        }
        let compressed = compress_image(bytes, &self.options).map_err(map_compression_error)?;
        let url = self.files.put_image(&compressed.bytes, OUTPUT_CONTENT_TYPE)?;
        Ok(uploaded(url, &compressed))
    }
}

impl ImageStore for ImageUploader {
    fn put_image(&self, bytes: &[u8], _content_type: &str) -> Result<ImageUrl, ImageStoreError> {
        self.compress_and_store(bytes).map(|stored| stored.url)
    }
}

/// Builds the client-facing upload summary.
fn uploaded(url: ImageUrl, compressed: &CompressedImage) -> UploadedImage {
    UploadedImage {
        url,
        width: compressed.width,
        height: compressed.height,
        bytes: compressed.bytes.len(),
        quality: compressed.quality_used,
        within_target: compressed.within_target,
    }
}

/// Maps compression failures onto image store errors.
fn map_compression_error(err: CompressionError) -> ImageStoreError {
    match err {
        CompressionError::SlotBusy(slot) => ImageStoreError::SlotBusy(slot),
        CompressionError::Decode(message) => ImageStoreError::Rejected(message),
        CompressionError::InvalidOptions(message)
        | CompressionError::Encode(message)
        | CompressionError::Slots(message) => ImageStoreError::Io(message),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn same_bytes_share_one_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileImageStore::new(dir.path().join("images"), "/images/").unwrap();
        let first = store.put_image(b"jpeg-bytes", "image/jpeg").unwrap();
        let second = store.put_image(b"jpeg-bytes", "image/jpeg").unwrap();
        assert_eq!(first, second);
        assert!(first.as_str().starts_with("/images/"));
        assert!(first.as_str().ends_with(".jpg"));
        let name = first.as_str().trim_start_matches("/images/");
        assert_eq!(store.read(name).unwrap().unwrap(), b"jpeg-bytes");
    }

    #[test]
    fn unsupported_content_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileImageStore::new(dir.path(), "/images").unwrap();
        assert!(matches!(
            store.put_image(b"gif", "image/gif"),
            Err(ImageStoreError::Rejected(_))
        ));
    }

    #[test]
    fn read_refuses_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileImageStore::new(dir.path(), "/images").unwrap();
        for name in ["../secret.jpg", "abc/def.jpg", "ABC.jpg", "abc.exe", ".jpg", ""] {
            assert!(matches!(store.read(name), Err(ImageStoreError::Rejected(_))), "{name}");
        }
        assert!(store.read("abc123.jpg").unwrap().is_none());
    }

    #[test]
    fn oversized_upload_is_refused_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileImageStore::new(dir.path(), "/images").unwrap();
        let uploader = ImageUploader::new(files, CompressionOptions::default(), 4);
        assert!(matches!(
            uploader.upload("user-photo", b"12345"),
            Err(ImageStoreError::TooLarge {
                actual: 5,
                limit: 4
            })
        ));
        assert!(matches!(
            uploader.upload("user-photo", b"1234"),
            Err(ImageStoreError::Rejected(_))
        ));
    }
}
