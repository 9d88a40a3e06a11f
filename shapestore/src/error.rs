//! Error types for shapestore operations.

use std::io;

use thiserror::Error;

use crate::shapefile::ShapeType;

/// Errors that can occur while opening or querying a shape store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file signature, magic number, or format version did not match.
    #[error("format mismatch: {0}")]
    FormatMismatch(String),

    /// The record carries a shape type the store does not decode.
    #[error("unsupported shape type: {0}")]
    UnsupportedShapeType(ShapeType),

    /// A record number outside the offset table bounds.
    #[error("record number {record_number} out of range (1..={count})")]
    OutOfRange { record_number: u32, count: u32 },

    /// The byte source ended before the structure was complete.
    #[error("truncated input")]
    Truncated,

    /// IO error from the underlying byte source.
    #[error("IO error: {0}")]
    Io(io::Error),

    /// Malformed internal structure, e.g. a negative count field.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// Attribute query on a store opened without a tabular source.
    #[error("store was opened without a tabular source")]
    NoTabularSource,
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        // An early EOF means the format promised more bytes than the
        // source holds, which is a truncation, not a transport failure.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            StoreError::Truncated
        } else {
            StoreError::Io(err)
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_eof_maps_to_truncated() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "early eof");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Truncated));
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_out_of_range_display() {
        let err = StoreError::OutOfRange {
            record_number: 9,
            count: 4,
        };
        assert_eq!(err.to_string(), "record number 9 out of range (1..=4)");
    }
}
