//! Error types shared by the connectivity-matrix model

use thiserror::Error;

/// Violations of the row/column wire protocol.
///
/// Every value-bearing response body is a 4-byte element count followed by
/// that many 32-bit floats. Anything else is a malformed payload and fatal
/// to the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Body shorter than the 4-byte count header
    #[error("response body is {len} bytes, shorter than the element-count header")]
    TruncatedBody { len: usize },
    /// Body length not a multiple of 4
    #[error("response body length {len} is not a multiple of 4")]
    UnalignedBody { len: usize },
    /// Declared element count inconsistent with the body length
    #[error("declared element count {declared} does not fit body length {len}")]
    CountMismatch { declared: u32, len: usize },
    /// Declared element count differs from what the caller asked for
    #[error("server returned {actual} elements where {expected} were expected")]
    UnexpectedCount { expected: usize, actual: usize },
    /// Server answered with a non-success HTTP status
    #[error("server responded with HTTP status {status}")]
    HttpStatus { status: u16 },
}

/// Row or column index outside the matrix bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("index {index} is outside [0, {count})")]
pub struct RangeError {
    pub index: i64,
    pub count: u64,
}

/// Failure to interpret a CIFTI XML header body.
///
/// The full XML grammar lives with the injected header reader; this type
/// only carries its message back to the open path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable CIFTI header: {0}")]
pub struct HeaderParseError(pub String);
