use super::ast::{Plan, QueryType};
use super::Parser;
use crate::error::Result;
use crate::lexer::Token;

impl Parser {
    /// `INSERT INTO t (c1, ...) VALUES (v1, ...)`
    pub(super) fn parse_insert(&mut self) -> Result<Plan> {
        self.push_context("INSERT statement");
        self.advance(); // INSERT
        self.expect(Token::Into)?;
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

        self.expect(Token::Values)?;
        self.expect(Token::LeftParen)?;
        let mut values = Vec::new();
        loop {
            values.push(self.parse_value()?);
            if *self.peek() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RightParen)?;

        if columns.len() != values.len() {
            self.pop_context();
            return Err(self.error_with_context(format!(
                "column list has {} entries but VALUES has {}",
                columns.len(),
                values.len()
            )));
        }

        let mut plan = Plan::new(QueryType::Insert, table);
        for (column, value) in columns.into_iter().zip(values) {
            plan.values.insert(column, value);
        }
        self.pop_context();
        Ok(plan)
    }

    /// `UPDATE t SET c = v [, ...] [WHERE ...]`
    pub(super) fn parse_update(&mut self) -> Result<Plan> {
        self.push_context("UPDATE statement");
        self.advance(); // UPDATE
        let table = self.consume_identifier()?;
        self.expect(Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.consume_identifier()?;
            self.expect(Token::Equal)?;
            let value = self.parse_value()?;
            assignments.push((column, value));
            if *self.peek() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        let conditions = self.parse_where_clause()?;

        let mut plan = Plan::new(QueryType::Update, table);
        plan.assignments = assignments;
        plan.conditions = conditions;
        self.pop_context();
        Ok(plan)
    }

    /// `DELETE FROM t [WHERE ...]`
    pub(super) fn parse_delete(&mut self) -> Result<Plan> {
        self.push_context("DELETE statement");
        self.advance(); // DELETE
        self.expect(Token::From)?;
        let table = self.consume_identifier()?;
        let conditions = self.parse_where_clause()?;

        let mut plan = Plan::new(QueryType::Delete, table);
        plan.conditions = conditions;
        self.pop_context();
        Ok(plan)
    }
}
