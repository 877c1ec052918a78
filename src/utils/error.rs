//! Error types for ldap-bench

use std::io;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A single request failed; counted as unsuccessful, never fatal
    #[error("Request failed: {0}")]
    Request(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Worker error: {0}")]
    Worker(String),
}

impl BenchmarkError {
    /// Whether this error only invalidates the current request
    pub fn is_request_failure(&self) -> bool {
        matches!(self, BenchmarkError::Request(_))
    }
}

/// Connection-related errors
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to connect to {url}: {source}")]
    ConnectFailed {
        url: String,
        source: ldap3::LdapError,
    },

    #[error("Bind as {dn} failed: rc={rc} {text}")]
    BindFailed { dn: String, rc: u32, text: String },

    #[error("Bind as {dn} failed: {source}")]
    BindError {
        dn: String,
        source: ldap3::LdapError,
    },

    #[error("Connection closed unexpectedly")]
    Closed,
}

pub type Result<T> = std::result::Result<T, BenchmarkError>;
