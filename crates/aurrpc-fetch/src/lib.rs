//! Conditional snapshot loading for aurrpc: fetches the package metadata
//! archive from an HTTP source or a local file, skipping unchanged data.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod error;
pub mod source;

pub use error::FetchError;
pub use source::load;
