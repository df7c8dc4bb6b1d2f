use thiserror::Error;

use crate::diagnostic::SyntaxError;
use crate::lexer::{Token, TokenKind};

/// Signal raised when a declaration cannot be parsed.
///
/// It unwinds only as far as the enclosing declaration, which is dropped
/// while the parser resynchronizes on the next statement boundary.
#[derive(Debug, PartialEq, Clone, Error)]
pub enum ParseError {
    #[error("{message}")]
    UnexpectedToken {
        expected: TokenKind,
        got: Token,
        message: &'static str,
    },
    #[error("Expect expression.")]
    ExpectedExpression(Token),
    /// Reported without unwinding: the parser keeps the left-hand side.
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget(Token),
}

impl ParseError {
    pub fn unexpected_token(expected: TokenKind, got: Token, message: &'static str) -> Self {
        ParseError::UnexpectedToken {
            expected,
            got,
            message,
        }
    }

    /// The token the error is reported at.
    pub fn token(&self) -> &Token {
        match self {
            ParseError::UnexpectedToken { got, .. } => got,
            ParseError::ExpectedExpression(token) => token,
            ParseError::InvalidAssignmentTarget(token) => token,
        }
    }
}

impl From<ParseError> for SyntaxError {
    fn from(error: ParseError) -> Self {
        SyntaxError::at_token(error.token(), error.to_string())
    }
}
