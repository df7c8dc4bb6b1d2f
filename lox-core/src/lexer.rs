use std::rc::Rc;

use tracing::{debug, trace};

use crate::diagnostic::SyntaxError;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    // Single-character tokens
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    SemiColon,
    Slash,
    Asterisk,

    // One or two character tokens
    Bang,
    NotEqual,
    Assign,
    Equal,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,

    // Literals
    Ident,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof,
}

/// Value carried by number and string tokens.
#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(f64),
    String(Rc<str>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Rc<str>,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: &str, literal: Option<Literal>, line: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenKind::Eof, "", None, line)
    }
}

fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "and" => Some(TokenKind::And),
        "class" => Some(TokenKind::Class),
        "else" => Some(TokenKind::Else),
        "false" => Some(TokenKind::False),
        "for" => Some(TokenKind::For),
        "fun" => Some(TokenKind::Fun),
        "if" => Some(TokenKind::If),
        "nil" => Some(TokenKind::Nil),
        "or" => Some(TokenKind::Or),
        "print" => Some(TokenKind::Print),
        "return" => Some(TokenKind::Return),
        "super" => Some(TokenKind::Super),
        "this" => Some(TokenKind::This),
        "true" => Some(TokenKind::True),
        "var" => Some(TokenKind::Var),
        "while" => Some(TokenKind::While),
        _ => None,
    }
}

/// Turns source text into tokens.
///
/// As an iterator it yields one item per token or lexical error, skipping
/// whitespace and comments, and stops at the end of the input without
/// yielding an end-of-input token. [`Lexer::scan_tokens`] drives it to
/// completion and appends that token.
#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self {
            input,
            iter,
            line: 1,
        }
    }

    /// Scans the whole input. The token list always ends with exactly one
    /// [`TokenKind::Eof`]; offending text is left out of it and reported in
    /// the error list instead.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<SyntaxError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for item in self.by_ref() {
            match item {
                Ok(token) => {
                    trace!(kind = ?token.kind, lexeme = %token.lexeme, line = token.line, "token");
                    tokens.push(token);
                }
                Err(error) => errors.push(error),
            }
        }
        tokens.push(Token::eof(self.line));

        debug!(
            tokens = tokens.len(),
            errors = errors.len(),
            "scanning complete"
        );
        (tokens, errors)
    }

    fn is_alpha(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_alphanumeric(ch: char) -> bool {
        Self::is_alpha(ch) || ch.is_ascii_digit()
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token {
        let end = self.next_idx();
        Token::new(kind, &self.input[start..end], None, self.line)
    }

    /// Maximal munch for the two-character operators.
    fn either(&mut self, expected: char, matched: TokenKind, otherwise: TokenKind) -> TokenKind {
        if self.iter.next_if(|(_, ch)| *ch == expected).is_some() {
            matched
        } else {
            otherwise
        }
    }

    fn skip_line_comment(&mut self) {
        while self.iter.next_if(|(_, ch)| *ch != '\n').is_some() {}
    }

    fn consume_digits(&mut self) {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while self
            .iter
            .next_if(|(_, ch)| Self::is_alphanumeric(*ch))
            .is_some()
        {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        Token::new(
            keywords(ident).unwrap_or(TokenKind::Ident),
            ident,
            None,
            self.line,
        )
    }

    fn read_number(&mut self, start: usize) -> Result<Token, SyntaxError> {
        self.consume_digits();

        // A fractional part needs at least one digit after the dot.
        if let Some(&(dot, '.')) = self.iter.peek() {
            if self.input[dot + 1..].starts_with(|ch: char| ch.is_ascii_digit()) {
                self.iter.next();
                self.consume_digits();
            }
        }

        let end = self.next_idx();
        let lexeme = &self.input[start..end];
        let value = lexeme
            .parse::<f64>()
            .map_err(|_| SyntaxError::lexical(self.line, "Invalid number literal."))?;

        Ok(Token::new(
            TokenKind::Number,
            lexeme,
            Some(Literal::Number(value)),
            self.line,
        ))
    }

    fn read_string(&mut self, start: usize) -> Result<Token, SyntaxError> {
        loop {
            match self.iter.next() {
                Some((_, '"')) => break,
                Some((_, '\n')) => self.line += 1,
                Some(_) => {}
                None => return Err(SyntaxError::lexical(self.line, "Unterminated string.")),
            }
        }

        let end = self.next_idx();
        let value: Rc<str> = self.input[start + 1..end - 1].into();
        Ok(Token::new(
            TokenKind::String,
            &self.input[start..end],
            Some(Literal::String(value)),
            self.line,
        ))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (start, ch) = self.iter.next()?;

            let kind = match ch {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                '-' => TokenKind::Minus,
                '+' => TokenKind::Plus,
                ';' => TokenKind::SemiColon,
                '*' => TokenKind::Asterisk,
                '!' => self.either('=', TokenKind::NotEqual, TokenKind::Bang),
                '=' => self.either('=', TokenKind::Equal, TokenKind::Assign),
                '<' => self.either('=', TokenKind::LessEqual, TokenKind::LessThan),
                '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::GreaterThan),
                '/' => {
                    if self.iter.next_if(|(_, ch)| *ch == '/').is_some() {
                        self.skip_line_comment();
                        continue;
                    }
                    TokenKind::Slash
                }
                ' ' | '\r' | '\t' => continue,
                '\n' => {
                    self.line += 1;
                    continue;
                }
                '"' => return Some(self.read_string(start)),
                c if c.is_ascii_digit() => return Some(self.read_number(start)),
                c if Self::is_alpha(c) => return Some(Ok(self.read_identifier(start))),
                _ => {
                    return Some(Err(SyntaxError::lexical(
                        self.line,
                        "Unexpected character.",
                    )))
                }
            };

            return Some(Ok(self.token(kind, start)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let (tokens, errors) = Lexer::new(input).scan_tokens();
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        tokens.into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn test_punctuation() {
        let input = "(){},.-+;*/";
        let (tokens, errors) = Lexer::new(input).scan_tokens();

        assert!(errors.is_empty());
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::LParen, "(", None, 1),
                Token::new(TokenKind::RParen, ")", None, 1),
                Token::new(TokenKind::LBrace, "{", None, 1),
                Token::new(TokenKind::RBrace, "}", None, 1),
                Token::new(TokenKind::Comma, ",", None, 1),
                Token::new(TokenKind::Dot, ".", None, 1),
                Token::new(TokenKind::Minus, "-", None, 1),
                Token::new(TokenKind::Plus, "+", None, 1),
                Token::new(TokenKind::SemiColon, ";", None, 1),
                Token::new(TokenKind::Asterisk, "*", None, 1),
                Token::new(TokenKind::Slash, "/", None, 1),
                Token::eof(1),
            ]
        );
    }

    #[test]
    fn test_maximal_munch() {
        let tests = vec![
            (
                "!= == <= >=",
                vec![
                    TokenKind::NotEqual,
                    TokenKind::Equal,
                    TokenKind::LessEqual,
                    TokenKind::GreaterEqual,
                ],
            ),
            (
                "! = < >",
                vec![
                    TokenKind::Bang,
                    TokenKind::Assign,
                    TokenKind::LessThan,
                    TokenKind::GreaterThan,
                ],
            ),
            ("!!=", vec![TokenKind::Bang, TokenKind::NotEqual]),
            ("===", vec![TokenKind::Equal, TokenKind::Assign]),
        ];

        for (input, mut expected) in tests {
            expected.push(TokenKind::Eof);
            assert_eq!(kinds(input), expected);
        }
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let input =
            "and class else false for fun if nil or print return super this true var while _x y2 whiles";
        let expected = vec![
            TokenKind::And,
            TokenKind::Class,
            TokenKind::Else,
            TokenKind::False,
            TokenKind::For,
            TokenKind::Fun,
            TokenKind::If,
            TokenKind::Nil,
            TokenKind::Or,
            TokenKind::Print,
            TokenKind::Return,
            TokenKind::Super,
            TokenKind::This,
            TokenKind::True,
            TokenKind::Var,
            TokenKind::While,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Eof,
        ];

        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn test_numbers() {
        let (tokens, _) = Lexer::new("123 4.5 6.").scan_tokens();
        let literals = tokens
            .iter()
            .map(|token| (token.kind, token.literal.clone()))
            .collect::<Vec<_>>();

        assert_eq!(
            literals,
            vec![
                (TokenKind::Number, Some(Literal::Number(123.0))),
                (TokenKind::Number, Some(Literal::Number(4.5))),
                (TokenKind::Number, Some(Literal::Number(6.0))),
                (TokenKind::Dot, None),
                (TokenKind::Eof, None),
            ]
        );

        assert_eq!(
            kinds(".5"),
            vec![TokenKind::Dot, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn test_strings() {
        let (tokens, errors) = Lexer::new("\"hello\" \"multi\nline\" x").scan_tokens();
        assert!(errors.is_empty());

        assert_eq!(tokens[0].lexeme.as_ref(), "\"hello\"");
        assert_eq!(tokens[0].literal, Some(Literal::String("hello".into())));
        assert_eq!(tokens[1].literal, Some(Literal::String("multi\nline".into())));
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn test_comments_and_lines() {
        let input = "// a comment\nvar a; // trailing\n\n  a";
        let (tokens, errors) = Lexer::new(input).scan_tokens();

        assert!(errors.is_empty());
        let lines = tokens
            .iter()
            .map(|token| (token.kind, token.line))
            .collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                (TokenKind::Var, 2),
                (TokenKind::Ident, 2),
                (TokenKind::SemiColon, 2),
                (TokenKind::Ident, 4),
                (TokenKind::Eof, 4),
            ]
        );
    }

    #[test]
    fn test_unexpected_character_continues() {
        let (tokens, errors) = Lexer::new("1 @ 2\n#").scan_tokens();

        assert_eq!(
            tokens.iter().map(|token| token.kind).collect::<Vec<_>>(),
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
        assert_eq!(
            errors,
            vec![
                SyntaxError::lexical(1, "Unexpected character."),
                SyntaxError::lexical(2, "Unexpected character."),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = Lexer::new("print \"oops\n").scan_tokens();

        assert_eq!(
            tokens.iter().map(|token| token.kind).collect::<Vec<_>>(),
            vec![TokenKind::Print, TokenKind::Eof]
        );
        assert_eq!(errors, vec![SyntaxError::lexical(2, "Unterminated string.")]);
    }

    #[test]
    fn test_single_eof() {
        for input in ["", "   \n", "// only a comment", "\"unterminated"] {
            let (tokens, _) = Lexer::new(input).scan_tokens();
            let eofs = tokens
                .iter()
                .filter(|token| token.kind == TokenKind::Eof)
                .count();
            assert_eq!(eofs, 1);
            assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::Eof));
        }
    }
}
