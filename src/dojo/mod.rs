//! DefectDojo API v2 modules for HTTP transport, data models, and products.

pub mod client;
pub mod models;
pub mod products;

pub use client::{ApiRequest, ApiTransport, HttpTransport, Method, TransportOptions};
pub use models::{split_tags, ApiResponse, CreationOutcome, LookupResult, NewProduct, ProductRecord};
pub use products::ProductClient;
