use std::fmt::Display;

use thiserror::Error;

use crate::lexer::{Token, TokenKind};

/// Where in the source a syntax error was detected.
#[derive(Debug, PartialEq, Clone)]
pub enum Location {
    /// Lexical errors carry no token context.
    Unknown,
    End,
    Lexeme(std::rc::Rc<str>),
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Unknown => Ok(()),
            Location::End => write!(f, " at end"),
            Location::Lexeme(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

/// A diagnostic produced by the lexer or the parser.
#[derive(Debug, PartialEq, Clone, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub location: Location,
    pub message: String,
}

impl SyntaxError {
    pub fn lexical(line: usize, message: impl Into<String>) -> Self {
        SyntaxError {
            line,
            location: Location::Unknown,
            message: message.into(),
        }
    }

    pub fn at_token(token: &Token, message: impl Into<String>) -> Self {
        let location = match token.kind {
            TokenKind::Eof => Location::End,
            _ => Location::Lexeme(token.lexeme.clone()),
        };
        SyntaxError {
            line: token.line,
            location,
            message: message.into(),
        }
    }
}
