//! SQL parser for VaultDB.
//!
//! A hand-written recursive-descent parser over the tokens produced by
//! [`Lexer`]. One call parses exactly one statement; a trailing `;` is
//! optional.
//!
//! # Grammar
//!
//! ```text
//! stmt     := select | insert | delete | update | show | describe | grant | revoke [;]
//! select   := SELECT ( * | ident (, ident)* ) FROM ident [where]
//! insert   := INSERT INTO ident ( ident (, ident)* ) VALUES ( lit (, lit)* )
//! delete   := DELETE FROM ident [where]
//! update   := UPDATE ident SET ident = lit (, ident = lit)* [where]
//! show     := SHOW TABLES
//! describe := DESCRIBE ident
//! grant    := GRANT right (, right)* ON number TO number
//! revoke   := REVOKE number
//! where    := WHERE cond (AND cond)*
//! cond     := ident op lit
//! ```
//!
//! # Usage
//!
//! ```
//! use vault_common::config::QueryConfig;
//! use vault_sql::parser::{Parser, Statement};
//!
//! let stmt = Parser::parse("SELECT * FROM users WHERE id > 1", &QueryConfig::default()).unwrap();
//! assert!(matches!(stmt, Statement::Select(_)));
//! ```

use vault_common::config::QueryConfig;

use crate::error::{ParseError, ParseResult};
use crate::lexer::Lexer;
use crate::token::{Keyword, Token, TokenKind};

mod statement;

pub use statement::*;

/// SQL parser entry point.
pub struct Parser<'c> {
    tokens: Vec<Token>,
    pos: usize,
    limits: &'c QueryConfig,
}

impl<'c> Parser<'c> {
    /// Parses one statement, enforcing the configured statement limits.
    pub fn parse(sql: &str, limits: &'c QueryConfig) -> ParseResult<Statement> {
        let tokens = Lexer::tokenize(sql)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            limits,
        };
        parser.statement()
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn peek(&self) -> &Token {
        // The token stream always ends with Eof and `advance` never moves past it.
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn unexpected<T>(&self, expected: impl Into<String>) -> ParseResult<T> {
        let token = self.peek();
        Err(ParseError::Unexpected {
            expected: expected.into(),
            found: token.kind.to_string(),
            offset: token.offset,
        })
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        self.eat(&TokenKind::Keyword(keyword))
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            self.unexpected(kind.to_string())
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<()> {
        self.expect(TokenKind::Keyword(keyword))
    }

    fn ident(&mut self, what: &str) -> ParseResult<String> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => self.unexpected(what),
        }
    }

    fn number(&mut self, what: &str) -> ParseResult<u64> {
        match self.peek().kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(n)
            }
            _ => self.unexpected(what),
        }
    }

    fn literal(&mut self) -> ParseResult<Literal> {
        match &self.peek().kind {
            TokenKind::Number(n) => {
                let n = *n;
                self.advance();
                Ok(Literal::Number(n))
            }
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance();
                Ok(Literal::Str(s))
            }
            _ => self.unexpected("literal"),
        }
    }

    /// Parses `item (, item)*`, failing once more than `max` items appear.
    fn comma_list<T>(
        &mut self,
        max: usize,
        mut item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = vec![item(self)?];
        while self.eat(&TokenKind::Comma) {
            if items.len() == max {
                return Err(ParseError::TooManyValues { max });
            }
            items.push(item(self)?);
        }
        Ok(items)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn statement(&mut self) -> ParseResult<Statement> {
        let token = self.advance();
        let stmt = match token.kind {
            TokenKind::Keyword(Keyword::Select) => Statement::Select(self.select()?),
            TokenKind::Keyword(Keyword::Insert) => Statement::Insert(self.insert()?),
            TokenKind::Keyword(Keyword::Delete) => Statement::Delete(self.delete()?),
            TokenKind::Keyword(Keyword::Update) => Statement::Update(self.update()?),
            TokenKind::Keyword(Keyword::Show) => {
                self.expect_keyword(Keyword::Tables)?;
                Statement::ShowTables
            }
            TokenKind::Keyword(Keyword::Describe) => Statement::Describe(self.ident("table name")?),
            TokenKind::Keyword(Keyword::Grant) => Statement::Grant(self.grant()?),
            TokenKind::Keyword(Keyword::Revoke) => Statement::Revoke(RevokeStatement {
                cap_id: self.number("capability id")?,
            }),
            TokenKind::Eof => return Err(ParseError::Empty),
            TokenKind::Semicolon if self.peek().kind == TokenKind::Eof => {
                return Err(ParseError::Empty)
            }
            kind => {
                return Err(ParseError::Unexpected {
                    expected: "statement".to_string(),
                    found: kind.to_string(),
                    offset: token.offset,
                })
            }
        };

        self.eat(&TokenKind::Semicolon);
        if self.peek().kind != TokenKind::Eof {
            return self.unexpected("end of statement");
        }
        Ok(stmt)
    }

    fn select(&mut self) -> ParseResult<SelectStatement> {
        let projection = if self.eat(&TokenKind::Star) {
            Projection::All
        } else {
            let max = self.limits.max_insert_values;
            Projection::Columns(self.comma_list(max, |p| p.ident("column name"))?)
        };
        self.expect_keyword(Keyword::From)?;
        let table = self.ident("table name")?;
        let conditions = self.where_clause()?;
        Ok(SelectStatement {
            projection,
            table,
            conditions,
        })
    }

    fn insert(&mut self) -> ParseResult<InsertStatement> {
        let max = self.limits.max_insert_values;
        self.expect_keyword(Keyword::Into)?;
        let table = self.ident("table name")?;

        self.expect(TokenKind::LeftParen)?;
        let columns = self.comma_list(max, |p| p.ident("column name"))?;
        self.expect(TokenKind::RightParen)?;

        self.expect_keyword(Keyword::Values)?;
        self.expect(TokenKind::LeftParen)?;
        let values = self.comma_list(max, Self::literal)?;
        self.expect(TokenKind::RightParen)?;

        if columns.len() != values.len() {
            return Err(ParseError::ValueCountMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        Ok(InsertStatement {
            table,
            columns,
            values,
        })
    }

    fn delete(&mut self) -> ParseResult<DeleteStatement> {
        self.expect_keyword(Keyword::From)?;
        let table = self.ident("table name")?;
        let conditions = self.where_clause()?;
        Ok(DeleteStatement { table, conditions })
    }

    fn update(&mut self) -> ParseResult<UpdateStatement> {
        let table = self.ident("table name")?;
        self.expect_keyword(Keyword::Set)?;
        let max = self.limits.max_insert_values;
        let assignments = self.comma_list(max, |p| {
            let column = p.ident("column name")?;
            p.expect(TokenKind::Eq)?;
            let value = p.literal()?;
            Ok(Assignment { column, value })
        })?;
        let conditions = self.where_clause()?;
        Ok(UpdateStatement {
            table,
            assignments,
            conditions,
        })
    }

    fn grant(&mut self) -> ParseResult<GrantStatement> {
        let privileges = self.comma_list(usize::MAX, Self::privilege)?;
        self.expect_keyword(Keyword::On)?;
        let object_id = self.number("object id")?;
        self.expect_keyword(Keyword::To)?;
        let target_pid = self.number("process id")?;
        Ok(GrantStatement {
            privileges,
            object_id,
            target_pid,
        })
    }

    /// `READ | WRITE | ALL | ident`, where the identifier names another right.
    fn privilege(&mut self) -> ParseResult<Privilege> {
        let token = self.peek().clone();
        let privilege = match &token.kind {
            TokenKind::Keyword(Keyword::Read) => Privilege::Read,
            TokenKind::Keyword(Keyword::Write) => Privilege::Write,
            TokenKind::Keyword(Keyword::All) => Privilege::All,
            TokenKind::Keyword(Keyword::Delete) => Privilege::Delete,
            TokenKind::Keyword(Keyword::Grant) => Privilege::Grant,
            TokenKind::Keyword(Keyword::Revoke) => Privilege::Revoke,
            TokenKind::Ident(name) => {
                Privilege::from_name(name).ok_or_else(|| ParseError::UnknownRight {
                    name: name.clone(),
                    offset: token.offset,
                })?
            }
            _ => return self.unexpected("right"),
        };
        self.advance();
        Ok(privilege)
    }

    fn where_clause(&mut self) -> ParseResult<Vec<Condition>> {
        if !self.eat_keyword(Keyword::Where) {
            return Ok(Vec::new());
        }
        let max = self.limits.max_where_conditions;
        let mut conditions = vec![self.condition()?];
        while self.eat_keyword(Keyword::And) {
            if conditions.len() == max {
                return Err(ParseError::TooManyConditions { max });
            }
            conditions.push(self.condition()?);
        }
        Ok(conditions)
    }

    fn condition(&mut self) -> ParseResult<Condition> {
        let column = self.ident("column name")?;
        let op = match self.peek().kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::LtEq => CompareOp::LtEq,
            TokenKind::GtEq => CompareOp::GtEq,
            _ => return self.unexpected("comparison operator"),
        };
        self.advance();
        let value = self.literal()?;
        Ok(Condition { column, op, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> ParseResult<Statement> {
        Parser::parse(sql, &QueryConfig::default())
    }

    #[test]
    fn test_parse_select_star() {
        let stmt = parse("SELECT * FROM users").unwrap();
        assert_eq!(
            stmt,
            Statement::Select(SelectStatement {
                projection: Projection::All,
                table: "users".into(),
                conditions: vec![],
            })
        );
    }

    #[test]
    fn test_parse_select_columns_where() {
        let stmt = parse("select name, id from users where id >= 2 and name != 'bob';").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(
            select.projection,
            Projection::Columns(vec!["name".into(), "id".into()])
        );
        assert_eq!(
            select.conditions,
            vec![
                Condition {
                    column: "id".into(),
                    op: CompareOp::GtEq,
                    value: Literal::Number(2),
                },
                Condition {
                    column: "name".into(),
                    op: CompareOp::NotEq,
                    value: Literal::Str("bob".into()),
                },
            ]
        );
    }

    #[test]
    fn test_parse_insert() {
        let stmt = parse("INSERT INTO users (id, name) VALUES (1, 'Alice')").unwrap();
        let Statement::Insert(insert) = stmt else {
            panic!("expected INSERT");
        };
        assert_eq!(insert.table, "users");
        assert_eq!(insert.columns, vec!["id", "name"]);
        assert_eq!(
            insert.values,
            vec![Literal::Number(1), Literal::Str("Alice".into())]
        );
    }

    #[test]
    fn test_parse_insert_count_mismatch() {
        assert_eq!(
            parse("INSERT INTO t (a, b) VALUES (1)"),
            Err(ParseError::ValueCountMismatch {
                columns: 2,
                values: 1
            })
        );
    }

    #[test]
    fn test_parse_update_and_delete() {
        let stmt = parse("UPDATE t SET a = 1, b = 'x' WHERE id = 3").unwrap();
        let Statement::Update(update) = stmt else {
            panic!("expected UPDATE");
        };
        assert_eq!(update.assignments.len(), 2);
        assert_eq!(update.assignments[1].value, Literal::Str("x".into()));
        assert_eq!(update.conditions.len(), 1);

        let stmt = parse("DELETE FROM t").unwrap();
        assert_eq!(
            stmt,
            Statement::Delete(DeleteStatement {
                table: "t".into(),
                conditions: vec![],
            })
        );
    }

    #[test]
    fn test_parse_show_describe() {
        assert_eq!(parse("show tables").unwrap(), Statement::ShowTables);
        assert_eq!(
            parse("DESCRIBE users;").unwrap(),
            Statement::Describe("users".into())
        );
    }

    #[test]
    fn test_parse_grant_revoke() {
        let stmt = parse("GRANT READ, write, execute ON 6 TO 42").unwrap();
        assert_eq!(
            stmt,
            Statement::Grant(GrantStatement {
                privileges: vec![Privilege::Read, Privilege::Write, Privilege::Execute],
                object_id: 6,
                target_pid: 42,
            })
        );
        assert_eq!(
            parse("REVOKE 5").unwrap(),
            Statement::Revoke(RevokeStatement { cap_id: 5 })
        );
        assert!(matches!(
            parse("GRANT fly ON 1 TO 2"),
            Err(ParseError::UnknownRight { offset: 6, .. })
        ));
    }

    #[test]
    fn test_where_condition_limit() {
        let ok = format!(
            "SELECT * FROM t WHERE {}",
            vec!["a = 1"; 8].join(" AND ")
        );
        assert!(parse(&ok).is_ok());

        let too_many = format!(
            "SELECT * FROM t WHERE {}",
            vec!["a = 1"; 9].join(" AND ")
        );
        assert_eq!(
            parse(&too_many),
            Err(ParseError::TooManyConditions { max: 8 })
        );
    }

    #[test]
    fn test_value_limit() {
        let limits = QueryConfig {
            max_where_conditions: 8,
            max_insert_values: 2,
        };
        assert!(Parser::parse("INSERT INTO t (a, b) VALUES (1, 2)", &limits).is_ok());
        assert_eq!(
            Parser::parse("INSERT INTO t (a, b, c) VALUES (1, 2, 3)", &limits),
            Err(ParseError::TooManyValues { max: 2 })
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("  ; "), Err(ParseError::Empty));
        assert!(matches!(
            parse("SELECT FROM t"),
            Err(ParseError::Unexpected { offset: 7, .. })
        ));
        assert!(matches!(
            parse("SELECT * FROM t WHERE a"),
            Err(ParseError::Unexpected { .. })
        ));
        assert!(matches!(
            parse("SHOW TABLES extra"),
            Err(ParseError::Unexpected { offset: 12, .. })
        ));
        assert!(matches!(
            parse("DROP TABLE t"),
            Err(ParseError::Unexpected { offset: 0, .. })
        ));
        assert!(matches!(
            parse("SELECT * FROM t WHERE a = b"),
            Err(ParseError::Unexpected { offset: 26, .. })
        ));
    }
}
