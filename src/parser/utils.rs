use super::Parser;
use crate::error::DbError;
use crate::lexer::Token;

/// What the parser was doing when an error occurred, for diagnostic messages.
#[derive(Debug, Clone)]
pub(crate) struct ParserContext {
    pub(crate) context: String,
}

impl ParserContext {
    pub(crate) fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
        }
    }
}

fn human_token(t: &Token) -> String {
    match t {
        Token::Identifier(s) => format!("identifier '{}'", s),
        Token::StringLiteral(s) => format!("string literal '{}'", s),
        Token::NumberLiteral(n) => format!("number '{}'", n),
        Token::Star => "'*'".into(),
        Token::Comma => "','".into(),
        Token::LeftParen => "'('".into(),
        Token::RightParen => "')'".into(),
        Token::Semicolon => "';'".into(),
        Token::Equal => "'='".into(),
        Token::Eof => "end of input".into(),
        other => format!("{:?}", other),
    }
}

impl Parser {
    pub(super) fn push_context(&mut self, context: &str) {
        self.context_stack.push(ParserContext::new(context));
    }

    pub(super) fn pop_context(&mut self) {
        self.context_stack.pop();
    }

    /// Build a parse error naming the offending token and the surrounding context.
    pub(super) fn error_with_context(&self, msg: String) -> DbError {
        let found = human_token(self.peek());
        let prev = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .map(human_token)
            .unwrap_or_else(|| "start of input".into());
        let next = self
            .tokens
            .get(self.pos + 1)
            .map(human_token)
            .unwrap_or_else(|| "end of input".into());

        let context_info = if self.context_stack.is_empty() {
            String::new()
        } else {
            let contexts: Vec<_> = self.context_stack.iter().map(|c| c.context.as_str()).collect();
            format!(" while parsing {}", contexts.join(" > "))
        };

        DbError::Parse(format!(
            "{} (found {} at token position {}; prev: {}; next: {}){}",
            msg, found, self.pos, prev, next, context_info
        ))
    }

    pub(super) fn token_brief(&self, t: &Token) -> String {
        human_token(t)
    }
}
