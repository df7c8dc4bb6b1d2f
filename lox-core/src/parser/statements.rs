use tracing::trace;

use crate::ast::{IfStatement, PrintStatement, Stmt, VarStatement};
use crate::lexer::TokenKind;
use crate::parser::expressions::parse_expression;
use crate::parser::{ParseError, Parser};
use crate::stack::ensure_sufficient_stack;

/// Parses one declaration, recovering from any error inside it.
///
/// Returns `None` when the declaration was malformed; the error has then
/// been recorded and the parser sits at the next statement boundary.
pub fn parse_declaration(parser: &mut Parser) -> Option<Stmt> {
    let result = ensure_sufficient_stack(|| {
        if parser.match_token(&[TokenKind::Var]) {
            parse_var_declaration(parser)
        } else {
            parse_statement(parser)
        }
    });

    match result {
        Ok(statement) => Some(statement),
        Err(error) => {
            parser.report(error);
            parser.synchronize();
            trace!(line = parser.peek().line, "resynchronized");
            None
        }
    }
}

fn parse_var_declaration(parser: &mut Parser) -> Result<Stmt, ParseError> {
    let name = parser.expect_token(TokenKind::Ident, "Expect variable name.")?;

    let initializer = if parser.match_token(&[TokenKind::Assign]) {
        Some(parse_expression(parser)?)
    } else {
        None
    };

    parser.expect_token(
        TokenKind::SemiColon,
        "Expect ';' after variable declaration.",
    )?;
    Ok(Stmt::Var(VarStatement { name, initializer }))
}

pub fn parse_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
    let kind = parser.peek().kind;
    match kind {
        TokenKind::If => {
            parser.advance();
            parse_if_statement(parser)
        }
        TokenKind::Print => {
            parser.advance();
            parse_print_statement(parser)
        }
        TokenKind::LBrace => {
            parser.advance();
            Ok(Stmt::Block(parse_block(parser)?))
        }
        _ => parse_expression_statement(parser),
    }
}

fn parse_if_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
    parser.expect_token(TokenKind::LParen, "Expect '(' after 'if'.")?;
    let condition = parse_expression(parser)?;
    parser.expect_token(TokenKind::RParen, "Expect ')' after if condition.")?;

    let then_branch = Box::new(ensure_sufficient_stack(|| parse_statement(parser))?);
    // An `else` binds to the closest `if`.
    let else_branch = if parser.match_token(&[TokenKind::Else]) {
        Some(Box::new(ensure_sufficient_stack(|| parse_statement(parser))?))
    } else {
        None
    };

    Ok(Stmt::If(IfStatement {
        condition,
        then_branch,
        else_branch,
    }))
}

fn parse_print_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
    let keyword = parser.previous().clone();
    let expression = parse_expression(parser)?;
    parser.expect_token(TokenKind::SemiColon, "Expect ';' after value.")?;

    Ok(Stmt::Print(PrintStatement {
        keyword,
        expression,
    }))
}

/// Parses the statements after an opening `{`, up to and including the `}`.
fn parse_block(parser: &mut Parser) -> Result<Vec<Stmt>, ParseError> {
    let mut statements = Vec::new();

    while !parser.check(TokenKind::RBrace) && !parser.is_at_end() {
        if let Some(statement) = parse_declaration(parser) {
            statements.push(statement);
        }
    }

    parser.expect_token(TokenKind::RBrace, "Expect '}' after block.")?;
    Ok(statements)
}

fn parse_expression_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
    let expression = parse_expression(parser)?;
    parser.expect_token(TokenKind::SemiColon, "Expect ';' after expression.")?;
    Ok(Stmt::Expression(expression))
}
