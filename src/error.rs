//! Error types for buffer operations.
//!
//! All contract violations are reported synchronously at the call site.
//! Bounds failures come in two flavors that callers can tell apart: an
//! absolute index outside the buffer ([`BufError::IndexOutOfBounds`]) and a
//! sequential read or write that found fewer bytes than it needed
//! ([`BufError::Underflow`] / [`BufError::Overflow`]). A codec probing a
//! partially received message sees `Underflow` and can wait for more input;
//! `IndexOutOfBounds` always indicates a programming error.

use std::io;
use thiserror::Error;

/// Errors produced by buffer operations.
#[derive(Debug, Error)]
pub enum BufError {
    /// An absolute index/length pair falls outside the buffer.
    #[error("index out of bounds: index={index}, length={length}, capacity={capacity}")]
    IndexOutOfBounds {
        /// The requested absolute index.
        index: usize,
        /// The requested length starting at `index`.
        length: usize,
        /// The buffer capacity the request was checked against.
        capacity: usize,
    },

    /// A sequential read needed more readable bytes than are available.
    #[error("buffer underflow: need {requested} bytes, have {available}")]
    Underflow {
        /// Bytes the operation needed.
        requested: usize,
        /// Readable bytes actually available.
        available: usize,
    },

    /// A sequential write needed more writable bytes than are available.
    #[error("buffer overflow: need {requested} writable bytes, have {writable} (capacity {capacity})")]
    Overflow {
        /// Bytes the operation needed.
        requested: usize,
        /// Writable bytes actually available.
        writable: usize,
        /// The fixed capacity of the buffer.
        capacity: usize,
    },

    /// A cursor update would violate `reader <= writer <= capacity`.
    #[error("invalid cursor indexes: reader={reader}, writer={writer}, capacity={capacity}")]
    InvalidIndex {
        /// Reader index the caller attempted to establish.
        reader: usize,
        /// Writer index the caller attempted to establish.
        writer: usize,
        /// Capacity the indexes were checked against.
        capacity: usize,
    },

    /// A mutating call was made on a read-only buffer.
    #[error("buffer is read-only")]
    ReadOnly,

    /// The operation is not supported by this buffer kind.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A structurally invalid argument (mismatched byte orders, a component
    /// that is not flattened, an empty component list).
    #[error("invalid argument: {0}")]
    InvalidInput(String),

    /// An underlying I/O error from a stream adapter.
    #[error("I/O error: {source}")]
    Io {
        /// The source I/O error.
        #[from]
        source: io::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BufError>;

/// Checks that `[index, index + length)` lies within `capacity`.
pub(crate) fn check_range(index: usize, length: usize, capacity: usize) -> Result<()> {
    match index.checked_add(length) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(BufError::IndexOutOfBounds {
            index,
            length,
            capacity,
        }),
    }
}

/// Checks that a sequential read of `requested` bytes is satisfiable.
pub(crate) fn check_readable(requested: usize, available: usize) -> Result<()> {
    if requested <= available {
        Ok(())
    } else {
        Err(BufError::Underflow {
            requested,
            available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_accepts_exact_fit() {
        assert!(check_range(3, 2, 5).is_ok());
        assert!(check_range(0, 0, 0).is_ok());
    }

    #[test]
    fn test_check_range_rejects_past_end() {
        let err = check_range(4, 2, 5).unwrap_err();
        assert!(matches!(err, BufError::IndexOutOfBounds { capacity: 5, .. }));
    }

    #[test]
    fn test_check_range_rejects_overflowing_sum() {
        assert!(check_range(usize::MAX, 2, 5).is_err());
    }

    #[test]
    fn test_check_readable_reports_shortfall() {
        let err = check_readable(4, 1).unwrap_err();
        assert!(matches!(
            err,
            BufError::Underflow {
                requested: 4,
                available: 1
            }
        ));
    }

    #[test]
    fn test_error_messages_name_the_bound() {
        let err = BufError::IndexOutOfBounds {
            index: 7,
            length: 4,
            capacity: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("index=7"));
        assert!(msg.contains("capacity=8"));
    }
}
