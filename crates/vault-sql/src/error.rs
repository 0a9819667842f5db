//! Errors raised while tokenizing or parsing a statement.

use thiserror::Error;
use vault_common::ErrorCode;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur during SQL parsing.
///
/// Every variant tied to a position carries the byte offset into the
/// statement text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input with no statement in it.
    #[error("empty query")]
    Empty,

    /// A character that starts no token.
    #[error("unexpected character '{ch}' at byte {offset}")]
    UnexpectedChar {
        /// The character.
        ch: char,
        /// Byte offset.
        offset: usize,
    },

    /// A string literal with no closing quote.
    #[error("unterminated string literal starting at byte {offset}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        offset: usize,
    },

    /// An identifier longer than the limit.
    #[error("identifier at byte {offset} exceeds {max} bytes")]
    IdentifierTooLong {
        /// Byte offset.
        offset: usize,
        /// Maximum length.
        max: usize,
    },

    /// A string literal longer than the limit.
    #[error("string literal at byte {offset} exceeds {max} bytes")]
    StringTooLong {
        /// Byte offset.
        offset: usize,
        /// Maximum length.
        max: usize,
    },

    /// A number with too many digits or outside the u64 range.
    #[error("number at byte {offset} is out of range")]
    NumberOutOfRange {
        /// Byte offset.
        offset: usize,
    },

    /// The parser expected something else.
    #[error("expected {expected} at byte {offset}, found {found}")]
    Unexpected {
        /// What the grammar needed.
        expected: String,
        /// What was there.
        found: String,
        /// Byte offset.
        offset: usize,
    },

    /// A GRANT right that names no capability right.
    #[error("unknown right '{name}' at byte {offset}")]
    UnknownRight {
        /// The word used.
        name: String,
        /// Byte offset.
        offset: usize,
    },

    /// Too many AND-joined WHERE conditions.
    #[error("too many WHERE conditions (max {max})")]
    TooManyConditions {
        /// Configured limit.
        max: usize,
    },

    /// Too many INSERT columns, values or UPDATE assignments.
    #[error("too many values (max {max})")]
    TooManyValues {
        /// Configured limit.
        max: usize,
    },

    /// INSERT column and value counts differ.
    #[error("{columns} columns but {values} values")]
    ValueCountMismatch {
        /// Number of named columns.
        columns: usize,
        /// Number of values.
        values: usize,
    },
}

impl ParseError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Syntax
    }

    /// Byte offset the error points at, if positional.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnexpectedChar { offset, .. }
            | Self::UnterminatedString { offset }
            | Self::IdentifierTooLong { offset, .. }
            | Self::StringTooLong { offset, .. }
            | Self::NumberOutOfRange { offset }
            | Self::Unexpected { offset, .. }
            | Self::UnknownRight { offset, .. } => Some(*offset),
            Self::Empty
            | Self::TooManyConditions { .. }
            | Self::TooManyValues { .. }
            | Self::ValueCountMismatch { .. } => None,
        }
    }
}
