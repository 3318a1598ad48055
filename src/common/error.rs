//! Error types for cluster-peers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Relation Errors ===
    #[error("Peer relation already active: {0}")]
    RelationExists(String),

    #[error("No active peer relation on endpoint {0}")]
    NoRelation(String),

    #[error("Unknown peer unit: {0}")]
    UnknownUnit(String),

    // === Network Errors ===
    #[error("Address resolution failed: {0}")]
    AddressResolution(String),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    // === Generic ===
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Is this a retryable error?
    ///
    /// Only collaborator failures qualify; relation bookkeeping errors mean
    /// the host delivered an event out of sequence and retrying won't help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Io(_) | Error::AddressResolution(_))
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Other(e.to_string())
    }
}
