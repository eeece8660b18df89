//! Typed errors
//!
//! The filter engine itself has no error surface: unknown or malformed
//! filters degrade to the neutral scope. Errors only arise when loading and
//! checking filter surface configuration.

use thiserror::Error;

/// Errors related to filter surface configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read filter configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid YAML for this schema
    #[error("invalid filter configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A domain name no registry answers to
    #[error("unknown filter domain: {0}")]
    UnknownDomain(String),

    /// A surface allows a topic its domain does not register
    #[error("surface '{surface}' allows unknown topic '{topic}' for domain '{domain}'")]
    UnknownTopic {
        surface: String,
        domain: String,
        topic: String,
    },

    /// No surface with this name is configured
    #[error("unknown filter surface: {0}")]
    UnknownSurface(String),
}

impl ConfigError {
    /// Error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "CONFIG_IO_ERROR",
            ConfigError::Yaml(_) => "CONFIG_PARSE_ERROR",
            ConfigError::UnknownDomain(_) => "CONFIG_UNKNOWN_DOMAIN",
            ConfigError::UnknownTopic { .. } => "CONFIG_UNKNOWN_TOPIC",
            ConfigError::UnknownSurface(_) => "CONFIG_UNKNOWN_SURFACE",
        }
    }
}
