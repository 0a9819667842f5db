//! SQL statement representation.
//!
//! This module defines every statement the engine accepts. Identifiers are
//! kept as written; table and column lookups are case-insensitive at
//! execution time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed SQL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// SELECT query.
    Select(SelectStatement),
    /// INSERT statement.
    Insert(InsertStatement),
    /// UPDATE statement.
    Update(UpdateStatement),
    /// DELETE statement.
    Delete(DeleteStatement),
    /// SHOW TABLES.
    ShowTables,
    /// DESCRIBE table.
    Describe(String),
    /// GRANT rights on an object to a process.
    Grant(GrantStatement),
    /// REVOKE a capability.
    Revoke(RevokeStatement),
}

impl Statement {
    /// Returns true for statements that change table contents or
    /// capabilities.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Insert(_) | Self::Update(_) | Self::Delete(_) | Self::Grant(_) | Self::Revoke(_)
        )
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
            Self::ShowTables => "SHOW TABLES",
            Self::Describe(_) => "DESCRIBE",
            Self::Grant(_) => "GRANT",
            Self::Revoke(_) => "REVOKE",
        }
    }
}

/// SELECT column list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// `*`
    All,
    /// Named columns, in output order.
    Columns(Vec<String>),
}

/// `SELECT cols FROM table [WHERE ...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectStatement {
    /// Columns to return.
    pub projection: Projection,
    /// Table name.
    pub table: String,
    /// AND-joined conditions; empty matches every row.
    pub conditions: Vec<Condition>,
}

/// `INSERT INTO table (cols) VALUES (lits)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertStatement {
    /// Table name.
    pub table: String,
    /// Named columns.
    pub columns: Vec<String>,
    /// One literal per named column.
    pub values: Vec<Literal>,
}

/// `UPDATE table SET col = lit, ... [WHERE ...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatement {
    /// Table name.
    pub table: String,
    /// Column assignments, in statement order.
    pub assignments: Vec<Assignment>,
    /// AND-joined conditions.
    pub conditions: Vec<Condition>,
}

/// `DELETE FROM table [WHERE ...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteStatement {
    /// Table name.
    pub table: String,
    /// AND-joined conditions.
    pub conditions: Vec<Condition>,
}

/// `GRANT rights ON object TO pid`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantStatement {
    /// Rights named in the statement.
    pub privileges: Vec<Privilege>,
    /// Object (table id) the rights apply to.
    pub object_id: u64,
    /// Receiving process.
    pub target_pid: u64,
}

/// `REVOKE cap_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeStatement {
    /// Capability to revoke.
    pub cap_id: u64,
}

/// A right named in a GRANT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Privilege {
    /// READ
    Read,
    /// WRITE
    Write,
    /// EXECUTE
    Execute,
    /// DELETE
    Delete,
    /// GRANT
    Grant,
    /// REVOKE
    Revoke,
    /// ALL
    All,
}

impl Privilege {
    /// Looks up a right by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Read,
            Self::Write,
            Self::Execute,
            Self::Delete,
            Self::Grant,
            Self::Revoke,
            Self::All,
        ]
        .into_iter()
        .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Upper-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Execute => "EXECUTE",
            Self::Delete => "DELETE",
            Self::Grant => "GRANT",
            Self::Revoke => "REVOKE",
            Self::All => "ALL",
        }
    }
}

/// `column = literal` in an UPDATE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Target column.
    pub column: String,
    /// New value.
    pub value: Literal,
}

/// `column op literal` in a WHERE clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Column compared.
    pub column: String,
    /// Comparison operator.
    pub op: CompareOp,
    /// Right-hand side.
    pub value: Literal,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
}

impl CompareOp {
    /// Applies the operator to an ordering of `field` relative to the literal.
    pub fn matches(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            Self::Eq => ordering == Equal,
            Self::NotEq => ordering != Equal,
            Self::Lt => ordering == Less,
            Self::Gt => ordering == Greater,
            Self::LtEq => ordering != Greater,
            Self::GtEq => ordering != Less,
        }
    }

    /// Returns true for `=` and `!=`.
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::NotEq)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
        })
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    /// Unsigned integer.
    Number(u64),
    /// Single-quoted string.
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "'{s}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_compare_op_matches() {
        assert!(CompareOp::Eq.matches(Ordering::Equal));
        assert!(!CompareOp::Eq.matches(Ordering::Less));
        assert!(CompareOp::NotEq.matches(Ordering::Greater));
        assert!(CompareOp::Lt.matches(Ordering::Less));
        assert!(CompareOp::LtEq.matches(Ordering::Equal));
        assert!(!CompareOp::LtEq.matches(Ordering::Greater));
        assert!(CompareOp::GtEq.matches(Ordering::Greater));
        assert!(!CompareOp::Gt.matches(Ordering::Equal));
    }

    #[test]
    fn test_privilege_names() {
        assert_eq!(Privilege::from_name("execute"), Some(Privilege::Execute));
        assert_eq!(Privilege::from_name("ALL"), Some(Privilege::All));
        assert_eq!(Privilege::from_name("fly"), None);
    }

    #[test]
    fn test_statement_kind() {
        assert!(Statement::Revoke(RevokeStatement { cap_id: 2 }).is_mutating());
        assert!(!Statement::ShowTables.is_mutating());
        assert_eq!(Statement::Describe("t".into()).kind(), "DESCRIBE");
    }
}
