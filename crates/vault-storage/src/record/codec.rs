//! Binary record codec.
//!
//! Encoding validates the whole record before writing a byte, and decoding
//! checks every length against both the remaining input and the type's
//! maximum. Neither direction ever produces a partial result.

use thiserror::Error;
use vault_common::constants::{
    MAX_BLOB_LEN, MAX_COLUMNS, MAX_RECORD_SIZE, MAX_STR_LEN, RECORD_HEADER_SIZE,
};
use vault_common::types::{RowId, TableId};
use vault_common::ErrorCode;

use super::value::{ColumnType, FieldValue, Record};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// String field longer than the column maximum.
    #[error("string too long: {len} bytes (max: {max})")]
    StringTooLong {
        /// Actual length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Blob field longer than the column maximum.
    #[error("blob too long: {len} bytes (max: {max})")]
    BlobTooLong {
        /// Actual length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Encoded record exceeds the record size limit.
    #[error("record too large: {size} bytes (max: {max})")]
    RecordTooLarge {
        /// Encoded size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// More fields than a schema may declare.
    #[error("too many fields: {count} (max: {max})")]
    TooManyFields {
        /// Field count.
        count: usize,
        /// Maximum allowed count.
        max: usize,
    },

    /// Input ended before a complete value was read.
    #[error("truncated record: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes required by the next read.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// Unrecognized field type tag.
    #[error("unknown type tag: {0}")]
    UnknownTypeTag(u32),

    /// String payload is not valid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// Boolean payload other than 0 or 1.
    #[error("invalid boolean byte: {0}")]
    InvalidBool(u8),

    /// Bytes left over after the last field.
    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
}

impl CodecError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::StringTooLong { .. } | Self::BlobTooLong { .. } | Self::RecordTooLarge { .. } => {
                ErrorCode::Overflow
            }
            _ => ErrorCode::InvalidArgument,
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Returns the encoded size of `record`, validating every field.
pub fn encoded_len(record: &Record) -> CodecResult<usize> {
    if record.fields.len() > MAX_COLUMNS {
        return Err(CodecError::TooManyFields {
            count: record.fields.len(),
            max: MAX_COLUMNS,
        });
    }

    let mut size = RECORD_HEADER_SIZE;
    for field in &record.fields {
        size += 4 + payload_len(field)?;
    }

    if size > MAX_RECORD_SIZE {
        return Err(CodecError::RecordTooLarge {
            size,
            max: MAX_RECORD_SIZE,
        });
    }
    Ok(size)
}

fn payload_len(field: &FieldValue) -> CodecResult<usize> {
    Ok(match field {
        FieldValue::U64(_) | FieldValue::I64(_) => 8,
        FieldValue::U32(_) => 4,
        FieldValue::U8(_) | FieldValue::Bool(_) => 1,
        FieldValue::Str(s) => {
            if s.len() > MAX_STR_LEN {
                return Err(CodecError::StringTooLong {
                    len: s.len(),
                    max: MAX_STR_LEN,
                });
            }
            2 + s.len()
        }
        FieldValue::Blob(b) => {
            if b.len() > MAX_BLOB_LEN {
                return Err(CodecError::BlobTooLong {
                    len: b.len(),
                    max: MAX_BLOB_LEN,
                });
            }
            4 + b.len()
        }
    })
}

/// Serializes a record.
pub fn encode(record: &Record) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_len(record)?);

    buf.extend_from_slice(&record.row_id.as_u64().to_le_bytes());
    buf.extend_from_slice(&record.table_id.as_u32().to_le_bytes());
    buf.extend_from_slice(&(record.fields.len() as u32).to_le_bytes());

    for field in &record.fields {
        buf.extend_from_slice(&field.column_type().tag().to_le_bytes());
        match field {
            FieldValue::U64(v) => buf.extend_from_slice(&v.to_le_bytes()),
            FieldValue::I64(v) => buf.extend_from_slice(&v.to_le_bytes()),
            FieldValue::U32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            FieldValue::U8(v) => buf.push(*v),
            FieldValue::Bool(v) => buf.push(u8::from(*v)),
            FieldValue::Str(s) => {
                // Length checked by encoded_len.
                buf.extend_from_slice(&(s.len() as u16).to_le_bytes());
                buf.extend_from_slice(s.as_bytes());
            }
            FieldValue::Blob(b) => {
                buf.extend_from_slice(&(b.len() as u32).to_le_bytes());
                buf.extend_from_slice(b);
            }
        }
    }

    Ok(buf)
}

// =============================================================================
// Decoding
// =============================================================================

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> CodecResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> CodecResult<u16> {
        self.array().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> CodecResult<u32> {
        self.array().map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> CodecResult<u64> {
        self.array().map(u64::from_le_bytes)
    }
}

/// Deserializes a record.
pub fn decode(buf: &[u8]) -> CodecResult<Record> {
    if buf.len() > MAX_RECORD_SIZE {
        return Err(CodecError::RecordTooLarge {
            size: buf.len(),
            max: MAX_RECORD_SIZE,
        });
    }
    if buf.len() < RECORD_HEADER_SIZE {
        return Err(CodecError::Truncated {
            needed: RECORD_HEADER_SIZE,
            remaining: buf.len(),
        });
    }

    let mut reader = Reader { buf, pos: 0 };
    let row_id = RowId::new(reader.u64()?);
    let table_id = TableId::new(reader.u32()?);
    let field_count = reader.u32()? as usize;
    if field_count > MAX_COLUMNS {
        return Err(CodecError::TooManyFields {
            count: field_count,
            max: MAX_COLUMNS,
        });
    }

    let mut fields = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        fields.push(decode_field(&mut reader)?);
    }

    if reader.remaining() != 0 {
        return Err(CodecError::TrailingBytes(reader.remaining()));
    }

    Ok(Record::new(row_id, table_id, fields))
}

fn decode_field(reader: &mut Reader<'_>) -> CodecResult<FieldValue> {
    let tag = reader.u32()?;
    let ty = ColumnType::from_tag(tag).ok_or(CodecError::UnknownTypeTag(tag))?;

    Ok(match ty {
        ColumnType::U64 => FieldValue::U64(reader.u64()?),
        ColumnType::I64 => FieldValue::I64(reader.u64()? as i64),
        ColumnType::U32 => FieldValue::U32(reader.u32()?),
        ColumnType::U8 => FieldValue::U8(reader.u8()?),
        ColumnType::Bool => match reader.u8()? {
            0 => FieldValue::Bool(false),
            1 => FieldValue::Bool(true),
            other => return Err(CodecError::InvalidBool(other)),
        },
        ColumnType::Str => {
            let len = reader.u16()? as usize;
            if len > MAX_STR_LEN {
                return Err(CodecError::StringTooLong {
                    len,
                    max: MAX_STR_LEN,
                });
            }
            let bytes = reader.take(len)?;
            let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
            FieldValue::Str(s.to_owned())
        }
        ColumnType::Blob => {
            let len = reader.u32()? as usize;
            if len > MAX_BLOB_LEN {
                return Err(CodecError::BlobTooLong {
                    len,
                    max: MAX_BLOB_LEN,
                });
            }
            FieldValue::Blob(reader.take(len)?.to_vec())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new(
            RowId::new(7),
            TableId::new(3),
            vec![
                FieldValue::U64(7),
                FieldValue::I64(-42),
                FieldValue::Str("hello".into()),
                FieldValue::Blob(vec![0xde, 0xad, 0xbe, 0xef]),
                FieldValue::Bool(true),
                FieldValue::U32(0xfeed),
                FieldValue::U8(255),
            ],
        )
    }

    #[test]
    fn test_round_trip() {
        let record = sample();
        let bytes = encode(&record).unwrap();
        assert_eq!(bytes.len(), encoded_len(&record).unwrap());
        assert_eq!(decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_header_layout() {
        let record = Record::new(RowId::new(1), TableId::new(2), vec![FieldValue::U8(9)]);
        let bytes = encode(&record).unwrap();
        assert_eq!(&bytes[0..8], &1u64.to_le_bytes());
        assert_eq!(&bytes[8..12], &2u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &1u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &ColumnType::U8.tag().to_le_bytes());
        assert_eq!(bytes[20], 9);
        assert_eq!(bytes.len(), 21);
    }

    #[test]
    fn test_length_limits() {
        let at_limit = Record::new(
            RowId::new(1),
            TableId::new(0),
            vec![
                FieldValue::Str("s".repeat(MAX_STR_LEN)),
                FieldValue::Blob(vec![0; MAX_BLOB_LEN]),
            ],
        );
        assert!(encode(&at_limit).is_ok());

        let long_str = Record::new(
            RowId::new(1),
            TableId::new(0),
            vec![FieldValue::Str("s".repeat(MAX_STR_LEN + 1))],
        );
        assert_eq!(
            encode(&long_str),
            Err(CodecError::StringTooLong {
                len: MAX_STR_LEN + 1,
                max: MAX_STR_LEN
            })
        );

        let long_blob = Record::new(
            RowId::new(1),
            TableId::new(0),
            vec![FieldValue::Blob(vec![0; MAX_BLOB_LEN + 1])],
        );
        assert!(matches!(
            encode(&long_blob),
            Err(CodecError::BlobTooLong { .. })
        ));
    }

    #[test]
    fn test_record_too_large() {
        let record = Record::new(
            RowId::new(1),
            TableId::new(0),
            vec![
                FieldValue::Blob(vec![0; MAX_BLOB_LEN]),
                FieldValue::Blob(vec![0; MAX_BLOB_LEN]),
            ],
        );
        let err = encode(&record).unwrap_err();
        assert!(matches!(err, CodecError::RecordTooLarge { .. }));
        assert_eq!(err.code(), ErrorCode::Overflow);
    }

    #[test]
    fn test_too_many_fields() {
        let record = Record::new(
            RowId::new(1),
            TableId::new(0),
            vec![FieldValue::U8(0); MAX_COLUMNS + 1],
        );
        assert!(matches!(
            encode(&record),
            Err(CodecError::TooManyFields { .. })
        ));

        let mut bytes = encode(&Record::new(RowId::new(1), TableId::new(0), vec![])).unwrap();
        bytes[12..16].copy_from_slice(&17u32.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::TooManyFields { count: 17, .. })
        ));
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = encode(&sample()).unwrap();
        assert!(matches!(
            decode(&bytes[..10]),
            Err(CodecError::Truncated { needed: 16, .. })
        ));
        for cut in RECORD_HEADER_SIZE..bytes.len() {
            assert!(decode(&bytes[..cut]).is_err(), "prefix {cut} decoded");
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let record = Record::new(RowId::new(1), TableId::new(0), vec![FieldValue::Bool(true)]);
        let mut bytes = encode(&record).unwrap();

        bytes[20] = 2;
        assert_eq!(decode(&bytes), Err(CodecError::InvalidBool(2)));

        bytes[16..20].copy_from_slice(&99u32.to_le_bytes());
        assert_eq!(decode(&bytes), Err(CodecError::UnknownTypeTag(99)));

        let mut trailing = encode(&record).unwrap();
        trailing.push(0);
        assert_eq!(decode(&trailing), Err(CodecError::TrailingBytes(1)));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let record = Record::new(RowId::new(1), TableId::new(0), vec![FieldValue::Str("ab".into())]);
        let mut bytes = encode(&record).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 0xff;
        assert_eq!(decode(&bytes), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn test_decode_rejects_oversized_lengths() {
        let record = Record::new(RowId::new(1), TableId::new(0), vec![FieldValue::Str("ab".into())]);
        let mut bytes = encode(&record).unwrap();
        bytes[20..22].copy_from_slice(&300u16.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::StringTooLong { len: 300, .. })
        ));
    }
}
