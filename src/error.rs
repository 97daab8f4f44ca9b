//! Error taxonomy for configuration, transport, and API response failures.

use thiserror::Error;

/// Errors produced while resolving settings or talking to DefectDojo.
#[derive(Debug, Error)]
pub enum DojoError {
    /// A required setting was given neither as a flag nor in the environment.
    #[error("Missing required setting '{setting}': pass {flag} or set {env}")]
    Configuration {
        /// Setting name as shown to the user.
        setting: &'static str,
        /// Command-line flag that supplies it.
        flag: &'static str,
        /// Environment variable that supplies it.
        env: &'static str,
    },

    /// The config file could not be read or parsed.
    #[error("Invalid config file {path}: {message}")]
    Config { path: String, message: String },

    /// A supplied setting has a value that cannot be used.
    #[error("Invalid {setting} '{value}': {message}")]
    InvalidSetting { setting: &'static str, value: String, message: String },

    /// Connection, TLS, DNS or timeout failure.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: wreq::Error,
    },

    /// A response body was expected to be JSON but was not.
    #[error("Failed to parse {context}: {source}")]
    Parse {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("Server returned HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// The lookup reported matches but listed none.
    #[error("Lookup reported {count} matching product(s) but returned no results")]
    InconsistentLookup { count: u64 },
}

impl DojoError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } | Self::Config { .. } | Self::InvalidSetting { .. } => 2,
            Self::Transport { .. } => 3,
            Self::Parse { .. } => 4,
            Self::Server { .. } | Self::InconsistentLookup { .. } => 5,
        }
    }
}
