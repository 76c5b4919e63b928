//! Byte-source abstraction for the mdcanon Markdown canonicalizer.
//!
//! This crate provides a [`Storage`] trait that supplies raw document bytes
//! for a path-like locator. The canonicalizer never touches the filesystem
//! directly, which enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Backend flexibility** (local directory, in-memory fixtures)
//! - **Clean separation** between rendering logic and I/O operations
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read()` and `exists()` methods
//! - [`FsStorage`] implementation rooted at a local directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use mdcanon_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("docs"));
//! let bytes = storage.read(Path::new("guide.md"))?;
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
