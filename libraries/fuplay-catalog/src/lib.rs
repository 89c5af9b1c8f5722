//! Fuplay Catalog
//!
//! Filesystem-backed implementation of [`fuplay_core::MediaCatalog`].
//!
//! Scans one or more directories for video files, reads a duration hint for
//! each file and groups the result by parent folder, the way the feed's
//! folder picker presents it.
//!
//! ```rust,no_run
//! use fuplay_catalog::DirectoryCatalog;
//! use fuplay_core::{group_by_folder, MediaCatalog};
//!
//! let catalog = DirectoryCatalog::new(vec!["/home/me/Videos".into()]);
//! let folders = group_by_folder(catalog.query()?);
//! for folder in &folders {
//!     println!("{} ({} videos)", folder.name, folder.len());
//! }
//! # Ok::<(), fuplay_core::CoreError>(())
//! ```

mod catalog;
mod error;
mod scanner;

pub use catalog::{DirectoryCatalog, DirectoryPermissionGate};
pub use error::{CatalogError, Result};
pub use scanner::{get_video_extension, is_video_file, FileScanner};
