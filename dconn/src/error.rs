//! Error taxonomy for connectivity-file operations

use thiserror::Error;

pub use dconn_core::error::{ProtocolError, RangeError};

/// Failures surfaced by matrix sources and the file facade.
#[derive(Debug, Error)]
pub enum DconnError {
    /// Malformed discovery URL, fatal to open
    #[error("malformed XNAT URL: {0}")]
    UrlFormat(String),
    /// Malformed or mismatched wire payload, fatal to that request
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// Unparseable header or unreachable transport, fatal to open
    #[error("open failed: {0}")]
    Open(String),
    /// Operation attempted before a successful open
    #[error("no connectivity file is loaded")]
    NotLoaded,
    /// Row/column index outside the matrix bounds
    #[error(transparent)]
    Range(#[from] RangeError),
    /// Facade-level wrapper preserving the original failure message
    #[error("loading connectivity data failed: {0}")]
    Load(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "http")]
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, DconnError>;
