//! Error types for the B-tree index.

use thiserror::Error;

/// Result type for B-tree operations.
pub type BTreeResult<T> = Result<T, BTreeError>;

/// Errors that can occur constructing a B-tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BTreeError {
    /// The requested order is too small to split nodes.
    #[error("invalid B-tree order: {order} (min: {min})")]
    InvalidOrder {
        /// Requested order.
        order: usize,
        /// Minimum supported order.
        min: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BTreeError::InvalidOrder { order: 2, min: 4 };
        assert!(err.to_string().contains('2'));
        assert!(err.to_string().contains('4'));
    }
}
