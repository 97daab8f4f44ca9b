//! Products command implementation.

use crate::config::ProductSettings;
use crate::dojo::{ApiTransport, HttpTransport, ProductClient};
use crate::format::{Formatter, OutputFormat};
use anyhow::Result;
use tracing::info;

/// Sub-commands of `products`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAction {
    /// Create a product unconditionally
    Create,
    /// Create a product unless one with the same name exists
    CreateIfNotExists,
}

impl ProductAction {
    /// Command-line name of the action.
    pub fn name(self) -> &'static str {
        match self {
            ProductAction::Create => "create",
            ProductAction::CreateIfNotExists => "create-if-not-exists",
        }
    }
}

/// Executes a products action against DefectDojo.
pub struct ProductCommand {
    settings: ProductSettings,
    format: OutputFormat,
}

impl ProductCommand {
    /// Creates a new products command.
    pub fn new(settings: ProductSettings, format: OutputFormat) -> Self {
        Self { settings, format }
    }

    /// Runs `action` over HTTP and returns formatted output.
    pub async fn execute(&self, action: ProductAction) -> Result<String> {
        let transport = HttpTransport::new(&self.settings.transport)?;
        self.execute_with_transport(transport, action).await
    }

    /// Runs `action` with a provided transport (for testing).
    pub async fn execute_with_transport(
        &self,
        transport: impl ApiTransport,
        action: ProductAction,
    ) -> Result<String> {
        info!("Running products {}", action.name());

        let client = ProductClient::new(transport, &self.settings.url, &self.settings.api_key);
        let product = &self.settings.product;
        let formatter = Formatter::new(self.format);

        match action {
            ProductAction::Create => {
                let response = client.create(product).await?.error_for_status()?;
                let created = response.json("create product response")?;
                Ok(formatter.format_response(&created))
            }
            ProductAction::CreateIfNotExists => {
                let outcome = client.create_if_not_exists(product).await?;
                Ok(formatter.format_outcome(&product.name, &outcome))
            }
        }
    }
}
