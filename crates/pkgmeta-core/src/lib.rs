//! Package metadata parsing and dependency matching.
//!
//! This crate reads a package-description XML document (identity,
//! licensing, authorship and inter-package relationships) and exposes it
//! as a validated, strongly-typed in-memory model, plus the version
//! matching needed to decide whether an installed package satisfies a
//! declared dependency.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use pkgmeta_core::{MetaResult, Metadata};
//!
//! fn installable(path: &Path, installed_base: &str) -> MetaResult<bool> {
//!     let meta = Metadata::from_path(path)?;
//!     for dep in meta.depends() {
//!         if dep.package == "base" && !dep.matches(installed_base)? {
//!             return Ok(false);
//!         }
//!     }
//!     Ok(true)
//! }
//! ```

use error::MetadataError;

pub mod condition;
pub mod error;
pub mod metadata;
pub mod records;
pub mod version;
pub mod xml;

pub use metadata::{Metadata, ROOT_TAG, SUPPORTED_FORMAT};
pub use records::{Contact, Dependency, GenericMetadata, License, Url, UrlKind};

pub type MetaResult<T> = std::result::Result<T, MetadataError>;
