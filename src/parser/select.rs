use super::ast::{Plan, QueryType};
use super::Parser;
use crate::error::Result;
use crate::lexer::Token;

impl Parser {
    /// `SELECT (* | c1, c2, ...) FROM t [WHERE ...] [ORDER BY ...] [LIMIT n]`
    pub(super) fn parse_select(&mut self) -> Result<Plan> {
        self.push_context("SELECT statement");
        self.advance(); // SELECT

        let mut columns = Vec::new();
        if *self.peek() == Token::Star {
            self.advance();
        } else {
            loop {
                columns.push(self.consume_identifier()?);
                if *self.peek() == Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(Token::From)?;
        let table = self.consume_identifier()?;

        let conditions = self.parse_where_clause()?;
        let order_by = self.parse_order_by_clause()?;
        let limit = self.parse_limit_clause()?;

        let mut plan = Plan::new(QueryType::Select, table);
        plan.columns = columns;
        plan.conditions = conditions;
        plan.order_by = order_by;
        plan.limit = limit;
        self.pop_context();
        Ok(plan)
    }
}
