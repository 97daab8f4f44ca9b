//! CLI command implementations.

pub mod product;

pub use product::{ProductAction, ProductCommand};
