pub mod ast;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod stack;

use diagnostic::SyntaxError;

/// Scans and parses `source` in one go.
///
/// Lexical errors are listed before syntax errors. The returned program only
/// holds the statements that parsed cleanly, so callers must check the error
/// list before executing it.
pub fn parse(source: &str) -> (ast::Program, Vec<SyntaxError>) {
    let (tokens, mut errors) = lexer::Lexer::new(source).scan_tokens();
    let (program, parse_errors) = parser::Parser::new(tokens).parse_program();
    errors.extend(parse_errors);
    (program, errors)
}
