//! WHERE clause evaluation.
//!
//! Conditions are bound to column indexes once per statement, then checked
//! against each decrypted record. Comparisons follow a fixed table of
//! field/literal pairings; any other pairing is simply not a match.
//!
//! | Field           | Literal                   | Operators |
//! |-----------------|---------------------------|-----------|
//! | STR             | string                    | all       |
//! | U64 / U32 / U8  | number                    | all       |
//! | U64             | numeric string            | `=` `!=`  |
//! | BOOL            | 0 / 1                     | `=` `!=`  |
//! | BOOL            | 'true' 'false' '1' '0'    | `=` `!=`  |

use vault_sql::parser::{CompareOp, Condition, Literal};
use vault_storage::{FieldValue, Record, TableSchema};

use super::error::{DatabaseError, DatabaseResult};

/// AND-joined conditions bound to a table's columns.
#[derive(Debug, Clone)]
pub(crate) struct Predicate {
    terms: Vec<Term>,
}

#[derive(Debug, Clone)]
struct Term {
    column: usize,
    op: CompareOp,
    value: Literal,
}

impl Predicate {
    /// Resolves column names against `schema`.
    pub fn bind(schema: &TableSchema, conditions: &[Condition]) -> DatabaseResult<Self> {
        let terms = conditions
            .iter()
            .map(|cond| {
                let column = schema
                    .column_index(&cond.column)
                    .ok_or_else(|| DatabaseError::UnknownColumn(cond.column.clone()))?;
                Ok(Term {
                    column,
                    op: cond.op,
                    value: cond.value.clone(),
                })
            })
            .collect::<DatabaseResult<Vec<_>>>()?;
        Ok(Self { terms })
    }

    /// Returns true if every condition holds. No conditions match every row.
    pub fn matches(&self, record: &Record) -> bool {
        self.terms.iter().all(|term| {
            record
                .get(term.column)
                .is_some_and(|field| compare(field, term.op, &term.value))
        })
    }
}

/// Compares a stored field with a literal.
pub(crate) fn compare(field: &FieldValue, op: CompareOp, literal: &Literal) -> bool {
    match (field, literal) {
        (FieldValue::Str(_), Literal::Str(s)) => {
            let stored = field.as_str().unwrap_or_default();
            op.matches(stored.as_bytes().cmp(s.trim_end_matches('\0').as_bytes()))
        }
        (FieldValue::U64(_) | FieldValue::U32(_) | FieldValue::U8(_), Literal::Number(n)) => field
            .as_unsigned()
            .is_some_and(|v| op.matches(v.cmp(n))),
        (FieldValue::U64(v), Literal::Str(s)) if op.is_equality() => s
            .trim()
            .parse::<u64>()
            .is_ok_and(|n| op.matches(v.cmp(&n))),
        (FieldValue::Bool(b), literal) if op.is_equality() => {
            bool_literal(literal).is_some_and(|want| op.matches(b.cmp(&want)))
        }
        _ => false,
    }
}

/// Interprets a literal compared with a BOOL field.
fn bool_literal(literal: &Literal) -> Option<bool> {
    match literal {
        Literal::Number(0) => Some(false),
        Literal::Number(1) => Some(true),
        Literal::Number(_) => None,
        Literal::Str(s) if s.eq_ignore_ascii_case("true") || s == "1" => Some(true),
        Literal::Str(s) if s.eq_ignore_ascii_case("false") || s == "0" => Some(false),
        Literal::Str(_) => None,
    }
}
