//! Core domain models for nowpy
//!
//! This module contains the fundamental types used throughout the application:
//! - Package specifications and bare-name normalization
//! - Manifest kinds and their precedence
//! - Import, installed and missing package sets

mod manifest_kind;
mod package_sets;
mod package_spec;

pub use manifest_kind::ManifestKind;
pub use package_sets::{ImportSet, InstalledSet, MissingSet};
pub use package_spec::{normalize_name, PackageSpec, VersionReq};
