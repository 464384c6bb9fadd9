//! SQL parser for the distdb statement subset
//!
//! A hand-written recursive-descent parser: one statement per call, no
//! semicolon-separated batch parsing. Produces a [`Plan`] the executor
//! dispatches on directly.

use crate::error::{DbError, Result};
use crate::lexer::{Lexer, Token};

pub mod ast;
pub use self::ast::*;

mod ddl;
mod dml;
mod select;

mod clauses;
mod utils;

pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) context_stack: Vec<utils::ParserContext>,
}

impl Parser {
    /// Parse a single SQL statement into a [`Plan`].
    pub fn parse(sql: &str) -> Result<Plan> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            context_stack: Vec::new(),
        };
        parser.parse_statement()
    }

    pub(super) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    pub(super) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(super) fn expect(&mut self, expected: Token) -> Result<()> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error_with_context(format!(
                "expected {}, found {}",
                self.token_brief(&expected),
                self.token_brief(self.peek())
            )))
        }
    }

    pub(super) fn consume_identifier(&mut self) -> Result<String> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error_with_context(format!(
                "expected identifier, found {}",
                self.token_brief(&other)
            ))),
        }
    }

    fn parse_statement(&mut self) -> Result<Plan> {
        let plan = match self.peek() {
            Token::Select => self.parse_select()?,
            Token::Insert => self.parse_insert()?,
            Token::Update => self.parse_update()?,
            Token::Delete => self.parse_delete()?,
            Token::Create => self.parse_create()?,
            Token::Drop => self.parse_drop()?,
            Token::Eof => {
                return Err(self.error_with_context("empty statement".to_string()))
            }
            other => {
                let brief = self.token_brief(&other.clone());
                return Err(DbError::UnsupportedStatement(format!(
                    "no statement begins with {}",
                    brief
                )));
            }
        };

        if *self.peek() == Token::Semicolon {
            self.advance();
        }
        if *self.peek() != Token::Eof {
            return Err(self.error_with_context(
                "unexpected trailing input after statement".to_string(),
            ));
        }

        Ok(plan)
    }
}

#[cfg(test)]
mod tests;
