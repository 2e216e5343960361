//! The matrix contract shared by local and remote sources
//!
//! A source exposes fixed dimensions and uncached row/column reads; one
//! network round trip or file access per call. Caching lives with the
//! per-map content, never here.

use crate::error::{RangeError, Result};
use crate::local::LocalMatrixSource;
#[cfg(feature = "http")]
use crate::remote::RemoteMatrixSource;

/// Where a matrix handle gets its bytes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Local,
    Remote,
}

/// Uniform access to one opened connectivity matrix.
///
/// `buffer.len()` must equal the opposite dimension of the requested
/// vector: the column count for `get_row`, the row count for
/// `get_column`. Counts are fixed once the source is open.
pub trait MatrixSource {
    fn row_count(&self) -> u64;

    fn column_count(&self) -> u64;

    fn get_row(&self, buffer: &mut [f32], row_index: i64) -> Result<()>;

    fn get_column(&self, buffer: &mut [f32], column_index: i64) -> Result<()>;
}

/// Bounds check shared by source implementations.
pub(crate) fn check_index(index: i64, count: u64) -> Result<u64> {
    if index < 0 || index as u64 >= count {
        return Err(RangeError { index, count }.into());
    }
    Ok(index as u64)
}

/// Tagged union over the two source variants.
#[derive(Debug)]
pub enum MatrixHandle {
    Local(LocalMatrixSource),
    #[cfg(feature = "http")]
    Remote(RemoteMatrixSource),
}

impl MatrixHandle {
    pub fn kind(&self) -> SourceKind {
        match self {
            MatrixHandle::Local(_) => SourceKind::Local,
            #[cfg(feature = "http")]
            MatrixHandle::Remote(_) => SourceKind::Remote,
        }
    }
}

impl MatrixSource for MatrixHandle {
    fn row_count(&self) -> u64 {
        match self {
            MatrixHandle::Local(source) => source.row_count(),
            #[cfg(feature = "http")]
            MatrixHandle::Remote(source) => source.row_count(),
        }
    }

    fn column_count(&self) -> u64 {
        match self {
            MatrixHandle::Local(source) => source.column_count(),
            #[cfg(feature = "http")]
            MatrixHandle::Remote(source) => source.column_count(),
        }
    }

    fn get_row(&self, buffer: &mut [f32], row_index: i64) -> Result<()> {
        match self {
            MatrixHandle::Local(source) => source.get_row(buffer, row_index),
            #[cfg(feature = "http")]
            MatrixHandle::Remote(source) => source.get_row(buffer, row_index),
        }
    }

    fn get_column(&self, buffer: &mut [f32], column_index: i64) -> Result<()> {
        match self {
            MatrixHandle::Local(source) => source.get_column(buffer, column_index),
            #[cfg(feature = "http")]
            MatrixHandle::Remote(source) => source.get_column(buffer, column_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_bounds() {
        assert_eq!(check_index(0, 3).unwrap(), 0);
        assert_eq!(check_index(2, 3).unwrap(), 2);
        assert!(check_index(-1, 3).is_err());
        assert!(check_index(3, 3).is_err());
    }
}
