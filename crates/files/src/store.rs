//! Content-addressed photo/signature storage implementation.
//!
//! Files are identified by the SHA-256 digest of their content and stored in
//! a two-level sharded directory under the storage root. Content addressing
//! gives deduplication (identical uploads share one file), integrity (bytes
//! can be re-verified against the hash) and deterministic, traversal-safe
//! paths (the hash is validated before it ever touches the filesystem).

use crate::StorageError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use suprident_types::NonEmptyText;

/// Directory under the storage root holding sha256-addressed files.
const HASH_DIR_NAME: &str = "sha256";

/// URL path prefix under which stored files are served.
const URL_PREFIX: &str = "/files/sha256";

/// Metadata for a stored evidence file.
///
/// Returned by [`PhotoStore::store`]; the `url_path` is what gets persisted
/// onto delivery confirmations as `photo_url`/`signature_url`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    /// Hexadecimal SHA-256 digest of the file content
    pub hash: String,

    /// Stable URL path the API serves this file under
    pub url_path: String,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Detected media type (e.g. `image/jpeg`)
    ///
    /// Best-effort sniffing of the magic bytes; not authoritative.
    pub media_type: NonEmptyText,

    /// Original filename supplied by the uploader, kept for audit only
    pub original_filename: NonEmptyText,

    /// When the file was stored (or re-offered, for deduplicated content)
    pub stored_at: DateTime<Utc>,
}

/// Content-addressed store for delivery evidence.
///
/// The store is stateless: the constructor only validates the root directory,
/// and shard directories are created lazily on first write.
#[derive(Debug)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    /// Creates a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRoot` if `root` does not exist or is not
    /// a directory.
    pub fn new(root: &Path) -> Result<Self, StorageError> {
        if !root.is_dir() {
            return Err(StorageError::InvalidRoot(root.display().to_string()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Stores `bytes` and returns the metadata of the stored file.
    ///
    /// Only image payloads are accepted; delivery evidence is always a photo
    /// or a signature capture. Storing the same content twice is not an
    /// error, the existing file is reused.
    ///
    /// # Errors
    ///
    /// - `StorageError::EmptyUpload` for a zero-length payload
    /// - `StorageError::UnsupportedMediaType` when the magic bytes are not a
    ///   known image format
    /// - `StorageError::Io` on filesystem failure
    pub fn store(&self, bytes: &[u8], original_filename: &str) -> Result<StoredFile, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyUpload);
        }

        let media_type = match infer::get(bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => kind.mime_type(),
            _ => {
                return Err(StorageError::UnsupportedMediaType(
                    original_filename.to_owned(),
                ))
            }
        };

        let hash = hex::encode(Sha256::digest(bytes));
        let shard_dir = self.root.join(HASH_DIR_NAME).join(&hash[..2]);
        let path = shard_dir.join(&hash);

        if !path.exists() {
            fs::create_dir_all(&shard_dir)?;

            // Write via a temp name then rename so a crashed upload never
            // leaves a half-written file under its final hash.
            let tmp = shard_dir.join(format!(".{hash}.tmp"));
            fs::write(&tmp, bytes)?;
            fs::rename(&tmp, &path)?;
        }

        let filename = if original_filename.trim().is_empty() {
            "upload"
        } else {
            original_filename
        };

        Ok(StoredFile {
            url_path: format!("{URL_PREFIX}/{hash}"),
            hash,
            size_bytes: bytes.len() as u64,
            media_type: NonEmptyText::new(media_type)
                .expect("infer never reports an empty mime type"),
            original_filename: NonEmptyText::new(filename)
                .expect("filename fallback is non-empty"),
            stored_at: Utc::now(),
        })
    }

    /// Loads the content stored under `hash`.
    ///
    /// # Errors
    ///
    /// - `StorageError::InvalidHash` when `hash` is not a 64-character
    ///   lowercase hex digest
    /// - `StorageError::NotFound` when no file exists for the hash
    pub fn load(&self, hash: &str) -> Result<Vec<u8>, StorageError> {
        validate_hash(hash)?;
        let path = self.path_for(hash);
        if !path.is_file() {
            return Err(StorageError::NotFound(hash.to_owned()));
        }
        Ok(fs::read(path)?)
    }

    /// Returns whether content is stored under `hash`.
    pub fn contains(&self, hash: &str) -> Result<bool, StorageError> {
        validate_hash(hash)?;
        Ok(self.path_for(hash).is_file())
    }

    fn path_for(&self, hash: &str) -> PathBuf {
        self.root.join(HASH_DIR_NAME).join(&hash[..2]).join(hash)
    }
}

fn validate_hash(hash: &str) -> Result<(), StorageError> {
    let valid = hash.len() == 64
        && hash
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if !valid {
        return Err(StorageError::InvalidHash(hash.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid PNG: signature + IHDR for a 1x1 image.
    fn tiny_png() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0, 0, 0]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes
    }

    fn store() -> (tempfile::TempDir, PhotoStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn rejects_missing_root() {
        assert!(matches!(
            PhotoStore::new(Path::new("/nonexistent/suprident-storage")),
            Err(StorageError::InvalidRoot(_))
        ));
    }

    #[test]
    fn stores_and_loads_round_trip() {
        let (_dir, store) = store();
        let bytes = tiny_png();

        let stored = store.store(&bytes, "entrega.png").unwrap();
        assert_eq!(stored.media_type.as_str(), "image/png");
        assert_eq!(stored.size_bytes, bytes.len() as u64);
        assert_eq!(stored.url_path, format!("/files/sha256/{}", stored.hash));

        let loaded = store.load(&stored.hash).unwrap();
        assert_eq!(loaded, bytes);
    }

    #[test]
    fn identical_content_shares_one_file() {
        let (dir, store) = store();
        let bytes = tiny_png();

        let first = store.store(&bytes, "a.png").unwrap();
        let second = store.store(&bytes, "b.png").unwrap();
        assert_eq!(first.hash, second.hash);

        let shard = dir.path().join("sha256").join(&first.hash[..2]);
        assert_eq!(fs::read_dir(shard).unwrap().count(), 1);
    }

    #[test]
    fn sharded_path_uses_hash_prefix() {
        let (dir, store) = store();
        let stored = store.store(&tiny_png(), "c.png").unwrap();

        let expected = dir
            .path()
            .join("sha256")
            .join(&stored.hash[..2])
            .join(&stored.hash);
        assert!(expected.is_file());
    }

    #[test]
    fn rejects_non_image_payloads() {
        let (_dir, store) = store();
        assert!(matches!(
            store.store(b"just some text", "notes.txt"),
            Err(StorageError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            store.store(b"", "empty.png"),
            Err(StorageError::EmptyUpload)
        ));
    }

    #[test]
    fn load_validates_hash_shape() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load("../../etc/passwd"),
            Err(StorageError::InvalidHash(_))
        ));
        assert!(matches!(
            store.load(&"ab".repeat(32)),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn metadata_serialises() {
        let (_dir, store) = store();
        let stored = store.store(&tiny_png(), "d.png").unwrap();
        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains(&stored.hash));
    }
}
