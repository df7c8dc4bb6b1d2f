pub mod error;
pub mod expressions;
pub mod statements;

use tracing::{debug, trace};

use crate::ast::Program;
use crate::diagnostic::SyntaxError;
use crate::lexer::{Token, TokenKind};
pub use error::ParseError;
use statements::parse_declaration;

/// Recursive-descent parser over a scanned token list.
///
/// The parser looks at one token at a time and never backtracks. Errors are
/// collected rather than returned, so a single pass reports every malformed
/// declaration it can find.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<SyntaxError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(|token| token.line).unwrap_or(1);
            tokens.push(Token::eof(line));
        }
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    /// Consumes the current token if it has one of the given kinds.
    pub(crate) fn match_token(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|kind| self.check(*kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: TokenKind,
        message: &'static str,
    ) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(ParseError::unexpected_token(
                kind,
                self.peek().clone(),
                message,
            ))
        }
    }

    pub(crate) fn report(&mut self, error: ParseError) {
        trace!(%error, line = error.token().line, "syntax error");
        self.errors.push(error.into());
    }

    /// Discards tokens until the start of the next statement: just past a
    /// `;`, or right before a keyword that begins a declaration or statement.
    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::SemiColon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {}
            }

            self.advance();
        }
    }

    /// Parses every declaration up to the end of input.
    ///
    /// Declarations that fail to parse are left out of the program and
    /// described in the returned error list.
    pub fn parse_program(mut self) -> (Program, Vec<SyntaxError>) {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(statement) = parse_declaration(&mut self) {
                statements.push(statement);
            }
        }

        debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsing complete"
        );
        (Program { statements }, self.errors)
    }
}
