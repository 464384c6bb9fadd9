use super::ast::{Plan, QueryType};
use super::Parser;
use crate::error::Result;
use crate::index::IndexKind;
use crate::lexer::Token;

impl Parser {
    /// `CREATE TABLE | CREATE INDEX`
    pub(super) fn parse_create(&mut self) -> Result<Plan> {
        self.advance(); // CREATE
        match self.peek() {
            Token::Table => self.parse_create_table(),
            Token::Index => self.parse_create_index(),
            _ => Err(self.error_with_context("expected TABLE or INDEX after CREATE".to_string())),
        }
    }

    /// `DROP TABLE | DROP INDEX`
    pub(super) fn parse_drop(&mut self) -> Result<Plan> {
        self.advance(); // DROP
        match self.peek() {
            Token::Table => self.parse_drop_table(),
            Token::Index => self.parse_drop_index(),
            _ => Err(self.error_with_context("expected TABLE or INDEX after DROP".to_string())),
        }
    }

    /// `CREATE TABLE t (c1 TYPE, c2 TYPE, ...)`
    fn parse_create_table(&mut self) -> Result<Plan> {
        self.push_context("CREATE TABLE statement");
        self.advance(); // TABLE
        let table = self.consume_identifier()?;
        self.expect(Token::LeftParen)?;

        let mut plan = Plan::new(QueryType::CreateTable, table);
        loop {
            let column = self.consume_identifier()?;
            let type_tag = self.consume_identifier()?;
            plan.schema.insert(column, type_tag.to_uppercase());
            if *self.peek() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RightParen)?;
        self.pop_context();
        Ok(plan)
    }

    /// `DROP TABLE t`
    fn parse_drop_table(&mut self) -> Result<Plan> {
        self.advance(); // TABLE
        let table = self.consume_identifier()?;
        Ok(Plan::new(QueryType::DropTable, table))
    }

    /// `CREATE INDEX name ON t (c1[, c2...]) [USING HASH|BTREE]`
    fn parse_create_index(&mut self) -> Result<Plan> {
        self.push_context("CREATE INDEX statement");
        self.advance(); // INDEX
        let index_name = self.consume_identifier()?;
        self.expect(Token::On)?;
        let table = self.consume_identifier()?;
        self.expect(Token::LeftParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.consume_identifier()?);
            if *self.peek() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RightParen)?;

        let kind = if *self.peek() == Token::Using {
            self.advance();
            match self.peek() {
                Token::Hash => {
                    self.advance();
                    IndexKind::Hash
                }
                Token::Btree => {
                    self.advance();
                    IndexKind::Btree
                }
                _ => return Err(self.error_with_context("expected HASH or BTREE after USING".to_string())),
            }
        } else {
            IndexKind::Btree
        };

        let mut plan = Plan::new(QueryType::CreateIndex, table);
        plan.index_name = index_name;
        plan.index_columns = columns;
        plan.index_kind = kind;
        self.pop_context();
        Ok(plan)
    }

    /// `DROP INDEX name [ON t]`
    fn parse_drop_index(&mut self) -> Result<Plan> {
        self.advance(); // INDEX
        let index_name = self.consume_identifier()?;
        let table = if *self.peek() == Token::On {
            self.advance();
            self.consume_identifier()?
        } else {
            String::new()
        };
        let mut plan = Plan::new(QueryType::DropIndex, table);
        plan.index_name = index_name;
        Ok(plan)
    }
}
