use super::ast::OrderByItem;
use super::Parser;
use crate::error::Result;
use crate::lexer::Token;
use crate::types::Value;
use std::collections::BTreeMap;

impl Parser {
    /// `value ::= NUMBER | STRING` — barewords are coerced integer, else float,
    /// else kept as a string; quoted tokens are always strings.
    pub(super) fn parse_value(&mut self) -> Result<Value> {
        match self.peek().clone() {
            Token::NumberLiteral(n) => {
                self.advance();
                if let Ok(i) = n.parse::<i64>() {
                    Ok(Value::Integer(i))
                } else if let Ok(f) = n.parse::<f64>() {
                    Ok(Value::Float(f))
                } else {
                    Ok(Value::String(n))
                }
            }
            Token::StringLiteral(s) => {
                self.advance();
                Ok(Value::String(s))
            }
            _ => Err(self.error_with_context("expected a value".to_string())),
        }
    }

    /// `WHERE col = value [AND col = value ...]`
    pub(super) fn parse_where_clause(&mut self) -> Result<BTreeMap<String, Value>> {
        let mut conditions = BTreeMap::new();
        if *self.peek() != Token::Where {
            return Ok(conditions);
        }
        self.push_context("WHERE clause");
        self.advance();
        loop {
            let column = self.consume_identifier()?;
            self.expect(Token::Equal)?;
            let value = self.parse_value()?;
            // A repeated column overrides its earlier binding.
            conditions.insert(column, value);
            if *self.peek() == Token::And {
                self.advance();
            } else {
                break;
            }
        }
        self.pop_context();
        Ok(conditions)
    }

    /// `ORDER BY col [ASC|DESC] [, col [ASC|DESC] ...]`
    pub(super) fn parse_order_by_clause(&mut self) -> Result<Vec<OrderByItem>> {
        let mut items = Vec::new();
        if *self.peek() != Token::Order {
            return Ok(items);
        }
        self.push_context("ORDER BY clause");
        self.advance();
        self.expect(Token::By)?;
        loop {
            let column = self.consume_identifier()?;
            let descending = match self.peek() {
                Token::Asc => {
                    self.advance();
                    false
                }
                Token::Desc => {
                    self.advance();
                    true
                }
                _ => false,
            };
            items.push(OrderByItem { column, descending });
            if *self.peek() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.pop_context();
        Ok(items)
    }

    /// `LIMIT n`
    pub(super) fn parse_limit_clause(&mut self) -> Result<Option<u64>> {
        if *self.peek() != Token::Limit {
            return Ok(None);
        }
        self.push_context("LIMIT clause");
        self.advance();
        let n = match self.peek().clone() {
            Token::NumberLiteral(n) => {
                self.advance();
                n.parse::<u64>()
                    .map_err(|_| self.error_with_context("invalid LIMIT value".to_string()))?
            }
            _ => return Err(self.error_with_context("expected a number after LIMIT".to_string())),
        };
        self.pop_context();
        Ok(Some(n))
    }
}
