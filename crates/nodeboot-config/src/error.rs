//! Error types for configuration synthesis

use std::path::PathBuf;
use thiserror::Error;

/// Error type for synthesis and artifact writing
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The cluster CA in the bootstrap document is not valid base64
    #[error("could not decode cluster CA certificate: {0}")]
    InvalidClusterCa(#[from] base64::DecodeError),

    /// A baseline template could not be read
    #[error("could not read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A baseline template is not valid YAML
    #[error("could not parse template {path}: {source}")]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An artifact could not be serialized
    #[error("could not serialize {artifact}: {source}")]
    Serialize {
        artifact: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    /// The CRI-O drop-in could not be rendered as TOML
    #[error("could not serialize CRI-O configuration: {0}")]
    RuntimeConfig(#[from] toml::ser::Error),

    /// An artifact could not be written to disk
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
