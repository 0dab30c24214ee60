//! Suprident evidence storage
//!
//! This crate stores the binary evidence attached to delivery confirmations
//! (photos and signatures) outside the relational database.
//!
//! ## Design principles
//!
//! - Structured data (lists, line items, confirmations) lives in the database;
//!   binary bytes live here, and confirmations reference them by URL path
//! - Files are immutable once stored (new content creates a new file)
//! - Identical content is stored once (content addressing deduplicates)
//! - The database remains valid even when a referenced file is absent
//!
//! ## Storage layout
//!
//! ```text
//! <storage_root>/
//! └── sha256/
//!     └── ab/
//!         └── ab3f9e…   # full hex digest as filename
//! ```
//!
//! ## Example usage
//!
//! ```no_run
//! use suprident_files::PhotoStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PhotoStore::new(Path::new("storage"))?;
//! let stored = store.store(&std::fs::read("foto.jpg")?, "foto.jpg")?;
//! println!("{}", stored.url_path);
//! # Ok(())
//! # }
//! ```

mod store;

pub use store::{PhotoStore, StoredFile};

/// Errors that can occur during evidence storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Storage root does not exist or is not a directory
    #[error("Invalid storage root: {0}")]
    InvalidRoot(String),

    /// Uploaded bytes are not a recognised image format
    #[error("Unsupported media type for {0:?} (expected an image)")]
    UnsupportedMediaType(String),

    /// Uploaded payload was empty
    #[error("Empty upload")]
    EmptyUpload,

    /// Hash is not a valid lowercase SHA-256 hex digest
    #[error("Invalid content hash: {0}")]
    InvalidHash(String),

    /// No file stored under the given hash
    #[error("No stored file with hash {0}")]
    NotFound(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
