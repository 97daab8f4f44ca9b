//! defectdojo-cli - Command-line client for the DefectDojo products API
//!
//! Creates products through the DefectDojo REST API v2, optionally
//! skipping creation when a product with the same name already exists.

pub mod commands;
pub mod config;
pub mod dojo;
pub mod error;
pub mod format;

pub use config::Config;
pub use dojo::{CreationOutcome, LookupResult, NewProduct, ProductClient};
pub use error::DojoError;
