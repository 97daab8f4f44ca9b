//! Configuration management with TOML, environment variables, and CLI flags.
//!
//! Each setting resolves from its flag, then its environment variable,
//! then (for connection settings) the config file.

use crate::dojo::{NewProduct, TransportOptions};
use crate::error::DojoError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Contents of the optional config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// DefectDojo base URL
    #[serde(default)]
    pub url: Option<String>,

    /// API v2 key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self { url: None, api_key: None, proxy: None, timeout_secs: default_timeout_secs() }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DojoError> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let invalid =
            |message: String| DojoError::Config { path: path.display().to_string(), message };

        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        toml::from_str(&content).map_err(|e| invalid(e.to_string()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, DojoError> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("defectdojo.toml");
        if local_config.exists() {
            debug!("Found defectdojo.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("defectdojo-cli").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

/// A setting that can come from a flag or an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Url,
    ApiKey,
    Name,
    Description,
    ProdType,
    Tags,
    Proxy,
}

impl Setting {
    pub fn name(self) -> &'static str {
        match self {
            Setting::Url => "url",
            Setting::ApiKey => "api_key",
            Setting::Name => "name",
            Setting::Description => "description",
            Setting::ProdType => "prod_type",
            Setting::Tags => "tags",
            Setting::Proxy => "proxy",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Setting::Url => "--url",
            Setting::ApiKey => "--api_key",
            Setting::Name => "--name",
            Setting::Description => "--description",
            Setting::ProdType => "--prod_type",
            Setting::Tags => "--tags",
            Setting::Proxy => "--proxy",
        }
    }

    pub fn env(self) -> &'static str {
        match self {
            Setting::Url => "DEFECTDOJO_URL",
            Setting::ApiKey => "DEFECTDOJO_API_KEY",
            Setting::Name => "DEFECTDOJO_PRODUCT_NAME",
            Setting::Description => "DEFECTDOJO_PRODUCT_DESCRIPTION",
            Setting::ProdType => "DEFECTDOJO_PRODUCT_TYPE",
            Setting::Tags => "DEFECTDOJO_PRODUCT_TAGS",
            Setting::Proxy => "DEFECTDOJO_PROXY",
        }
    }

    fn missing(self) -> DojoError {
        DojoError::Configuration { setting: self.name(), flag: self.flag(), env: self.env() }
    }
}

/// Looks up a setting: flag first, then environment, then `fallback`.
///
/// Empty environment variables count as unset.
pub fn lookup(
    setting: Setting,
    flag: Option<String>,
    fallback: Option<String>,
    env: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    flag.or_else(|| env(setting.env()).filter(|v| !v.is_empty())).or(fallback)
}

/// Like [`lookup`], failing with a configuration error when nothing is set.
pub fn require(
    setting: Setting,
    flag: Option<String>,
    fallback: Option<String>,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<String, DojoError> {
    lookup(setting, flag, fallback, env).ok_or_else(|| setting.missing())
}

/// Reads a variable from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Raw flag values for a products command.
#[derive(Debug, Clone, Default)]
pub struct ProductFlags {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub prod_type: Option<String>,
    pub tags: Option<String>,
    pub proxy: Option<String>,
}

/// Fully resolved inputs for a products command.
#[derive(Debug, Clone)]
pub struct ProductSettings {
    pub url: String,
    pub api_key: String,
    pub product: NewProduct,
    pub transport: TransportOptions,
}

impl ProductSettings {
    /// Resolves every setting before any request is made.
    pub fn resolve(
        flags: ProductFlags,
        config: &Config,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DojoError> {
        let url = require(Setting::Url, flags.url, config.url.clone(), env)?;
        let api_key = require(Setting::ApiKey, flags.api_key, config.api_key.clone(), env)?;
        let name = require(Setting::Name, flags.name, None, env)?;
        let description = require(Setting::Description, flags.description, None, env)?;
        let prod_type = require(Setting::ProdType, flags.prod_type, None, env)?;
        let tags = lookup(Setting::Tags, flags.tags, None, env).unwrap_or_default();
        let proxy = lookup(Setting::Proxy, flags.proxy, config.proxy.clone(), env);

        Ok(Self {
            url,
            api_key,
            product: NewProduct::new(name, description, prod_type, &tags),
            transport: TransportOptions {
                proxy,
                timeout: Duration::from_secs(config.timeout_secs),
            },
        })
    }
}
