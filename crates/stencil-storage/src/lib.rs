//! Storage abstraction for stencil.
//!
//! This crate provides a [`Storage`] trait for reading source files and layouts
//! and writing rendered output, independent of the backend. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Clean separation** between the render pass and I/O
//!
//! # Architecture
//!
//! - [`Storage`] trait with `scan()`, `read()` and `write()` methods
//! - [`FsStorage`] implementation rooted at a project directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! All paths passed to a [`Storage`] are relative to its root.
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use stencil_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("site"));
//! for path in storage.scan(Path::new("src"))? {
//!     let bytes = storage.read(&Path::new("src").join(&path))?;
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
