//! Error types for the consent banner.
//!
//! Two layers exist. [`StoreError`] is what a [`KeyValueStore`](crate::store::KeyValueStore)
//! backend reports. [`BannerError`] covers everything fallible at construction
//! time: loading configuration, generating markup, opening a store.
//!
//! The lifecycle controller itself never returns either of them. A visitor
//! never sees an error state; every anomaly at runtime degrades to a default.

use std::io;

/// Errors reported by a key-value store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The persistence medium is not available (disabled, quota, sandboxed).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed.
    #[error("store I/O failed: {0}")]
    Io(#[source] io::Error),

    /// The backing data could not be decoded.
    #[error("store data is corrupt: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// Errors raised while configuring or rendering a banner.
#[derive(Debug, thiserror::Error)]
pub enum BannerError {
    /// Configuration is structurally valid YAML but semantically wrong.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Markup template failed to compile or render.
    #[error("markup template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Rendered output could not be serialized for the template.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A store operation failed outside the lifecycle controller.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BannerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
