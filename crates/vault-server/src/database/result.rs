//! Statement results.

use std::fmt;

use vault_common::ErrorCode;
use vault_storage::{ColumnDef, ColumnType, FieldValue};

use super::error::DatabaseError;

/// Result of executing one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Rows returned by SELECT, SHOW TABLES or DESCRIBE.
    Rows(ResultSet),
    /// Status message from a statement that returns no rows.
    Message(String),
    /// The statement failed.
    Error {
        /// Error code.
        code: ErrorCode,
        /// Human-readable message.
        message: String,
    },
}

impl QueryResult {
    /// Creates an error result.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    /// Returns true unless this is an error.
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// Returns the error code, [`ErrorCode::Ok`] on success.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Error { code, .. } => *code,
            _ => ErrorCode::Ok,
        }
    }

    /// Returns the row set, if any.
    pub fn rows(&self) -> Option<&ResultSet> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Returns the status or error message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Message(message) | Self::Error { message, .. } => Some(message),
            Self::Rows(_) => None,
        }
    }

    /// Number of rows returned (0 for messages and errors).
    pub fn row_count(&self) -> usize {
        self.rows().map_or(0, ResultSet::len)
    }
}

impl From<DatabaseError> for QueryResult {
    fn from(err: DatabaseError) -> Self {
        Self::error(err.code(), err.to_string())
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows(rows) => write!(f, "{rows}"),
            Self::Message(message) => f.write_str(message),
            Self::Error { code, message } => write!(f, "error {}: {}", code.as_i32(), message),
        }
    }
}

/// A result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    /// Column name.
    pub name: String,
    /// Column type.
    pub column_type: ColumnType,
}

impl ResultColumn {
    /// Creates a result column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

impl From<&ColumnDef> for ResultColumn {
    fn from(column: &ColumnDef) -> Self {
        Self::new(column.name.clone(), column.column_type)
    }
}

/// Rows plus the columns describing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// Output columns.
    pub columns: Vec<ResultColumn>,
    /// Rows, each with one value per column.
    pub rows: Vec<Vec<FieldValue>>,
}

impl ResultSet {
    /// Creates an empty result with the given columns.
    pub fn new(columns: Vec<ResultColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn push(&mut self, row: Vec<FieldValue>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name, ignoring ASCII case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns the value at (`row`, column `name`).
    pub fn value(&self, row: usize, name: &str) -> Option<&FieldValue> {
        self.rows.get(row)?.get(self.column_index(name)?)
    }
}

impl fmt::Display for ResultSet {
    /// Renders an ASCII table.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.name.len()).collect();
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{:width$}", column.name, width = widths[i])?;
        }
        writeln!(f)?;

        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                f.write_str("-+-")?;
            }
            f.write_str(&"-".repeat(*width))?;
        }
        writeln!(f)?;

        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(" | ")?;
                }
                write!(f, "{:width$}", cell, width = widths[i])?;
            }
            writeln!(f)?;
        }

        write!(f, "({} rows)", self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> ResultSet {
        let mut rows = ResultSet::new(vec![
            ResultColumn::new("id", ColumnType::U64),
            ResultColumn::new("name", ColumnType::Str),
        ]);
        rows.push(vec![FieldValue::U64(1), FieldValue::Str("alice\0\0".into())]);
        rows
    }

    #[test]
    fn test_result_accessors() {
        let result = QueryResult::Rows(users());
        assert!(result.is_ok());
        assert_eq!(result.code(), ErrorCode::Ok);
        assert_eq!(result.row_count(), 1);
        assert_eq!(
            result.rows().unwrap().value(0, "NAME"),
            Some(&FieldValue::Str("alice\0\0".into()))
        );
        assert!(result.message().is_none());

        let err = QueryResult::error(ErrorCode::Syntax, "bad");
        assert!(!err.is_ok());
        assert_eq!(err.code(), ErrorCode::Syntax);
        assert_eq!(err.message(), Some("bad"));
        assert_eq!(err.row_count(), 0);
    }

    #[test]
    fn test_render_table() {
        let text = users().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id | name ");
        assert_eq!(lines[1], "---+------");
        assert_eq!(lines[2], "1  | alice");
        assert_eq!(lines[3], "(1 rows)");
    }

    #[test]
    fn test_from_database_error() {
        let result: QueryResult = DatabaseError::UnknownColumn("x".into()).into();
        assert_eq!(result.code(), ErrorCode::InvalidArgument);
        assert_eq!(result.message(), Some("unknown column: x"));
    }
}
