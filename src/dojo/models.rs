//! Data models for product payloads, lookups, and API responses.

use crate::error::DojoError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload for `POST /api/v2/products/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Product name, unique on the server
    pub name: String,
    /// Identifier of an existing product type
    pub prod_type: String,
    /// Free-form description
    pub description: String,
    /// Product tags, possibly empty
    pub tags: Vec<String>,
}

impl NewProduct {
    /// Builds a payload, splitting `tags` as a comma-separated list.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        prod_type: impl Into<String>,
        tags: &str,
    ) -> Self {
        Self {
            name: name.into(),
            prod_type: prod_type.into(),
            description: description.into(),
            tags: split_tags(tags),
        }
    }
}

/// Splits a comma-separated tag list, trimming entries and dropping blanks.
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned).collect()
}

/// One product as returned by the products endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: u64,
    /// All remaining server fields, kept verbatim
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Page returned by `GET /api/v2/products/?name_exact=...`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<ProductRecord>,
}

impl LookupResult {
    /// Returns the first matching product's id, if the lookup found one.
    ///
    /// A positive `count` with no listed results is treated as an error
    /// rather than "not found".
    pub fn first_id(&self) -> Result<Option<u64>, DojoError> {
        if self.count == 0 {
            return Ok(None);
        }
        match self.results.first() {
            Some(record) => Ok(Some(record.id)),
            None => Err(DojoError::InconsistentLookup { count: self.count }),
        }
    }
}

/// Result of a create-if-not-exists call.
#[derive(Debug, Clone, PartialEq)]
pub enum CreationOutcome {
    /// A product with the same name was found; nothing was created.
    AlreadyExists { id: u64 },
    /// The product was created; holds the server's record.
    Created(Value),
}

/// Raw HTTP response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Converts a non-2xx response into [`DojoError::Server`].
    pub fn error_for_status(self) -> Result<Self, DojoError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(DojoError::Server { status: self.status, body: self.body })
        }
    }

    /// Parses the body as arbitrary JSON.
    pub fn json(&self, context: &'static str) -> Result<Value, DojoError> {
        self.parse(context)
    }

    /// Parses the body into `T`.
    pub fn parse<T: serde::de::DeserializeOwned>(
        &self,
        context: &'static str,
    ) -> Result<T, DojoError> {
        serde_json::from_str(&self.body).map_err(|source| DojoError::Parse { context, source })
    }
}
