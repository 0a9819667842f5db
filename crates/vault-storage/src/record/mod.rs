//! Typed rows and their binary encoding.
//!
//! # Encoding Format
//!
//! All integers are little-endian.
//!
//! ```text
//! ┌─────────────┬───────────────┬──────────────────┬─────────┐
//! │ row_id: u64 │ table_id: u32 │ field_count: u32 │ field*  │
//! └─────────────┴───────────────┴──────────────────┴─────────┘
//!
//! field := type_tag: u32 | payload
//!   U64 / I64   8 bytes
//!   U32         4 bytes
//!   U8 / BOOL   1 byte
//!   STR         len: u16 | bytes   (len <= 255)
//!   BLOB        len: u32 | bytes   (len <= 2048)
//! ```

mod codec;
mod value;

pub use codec::{decode, encode, encoded_len, CodecError, CodecResult};
pub use value::{ColumnType, FieldValue, Record};
