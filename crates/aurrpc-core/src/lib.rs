//! Core domain types for aurrpc: the package record model and the
//! in-memory catalog with its search indexes.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod catalog;
pub mod package;

pub use catalog::{Catalog, CatalogError};
pub use package::PackageRecord;
