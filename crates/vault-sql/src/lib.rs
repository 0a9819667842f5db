//! # vault-sql
//!
//! SQL front-end for VaultDB.
//!
//! This crate turns statement text into a [`parser::Statement`]:
//! - [`lexer`]: tokenizer with byte-offset error reporting
//! - [`parser`]: recursive-descent parser for the supported SQL subset
//!
//! Execution lives with the engine, which owns the catalog, the tables and
//! the capability manager the statements act on.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod error;

/// SQL tokenizer
pub mod lexer;

/// SQL parser and statement types
pub mod parser;

/// Token types
pub mod token;

pub use error::{ParseError, ParseResult};
pub use parser::{Parser, Statement};
