use crate::ast::{Expr, LiteralValue};
use crate::lexer::{Token, TokenKind};
use crate::parser::{ParseError, Parser};
use crate::stack::ensure_sufficient_stack;

pub fn parse_expression(parser: &mut Parser) -> Result<Expr, ParseError> {
    ensure_sufficient_stack(|| parse_assignment(parser))
}

fn parse_assignment(parser: &mut Parser) -> Result<Expr, ParseError> {
    let expression = parse_or(parser)?;

    if !parser.match_token(&[TokenKind::Assign]) {
        return Ok(expression);
    }

    let equals = parser.previous().clone();
    // Right-associative: `a = b = c` assigns `c` to `b` first.
    let value = parse_expression(parser)?;

    if let Expr::Variable(name) = &expression {
        return Ok(Expr::Assign {
            name: name.clone(),
            value: Box::new(value),
        });
    }

    parser.report(ParseError::InvalidAssignmentTarget(equals));
    Ok(expression)
}

/// Folds `operand (operator operand)*` to the left.
fn parse_left_associative(
    parser: &mut Parser,
    operators: &[TokenKind],
    parse_operand: fn(&mut Parser) -> Result<Expr, ParseError>,
    make: fn(Expr, Token, Expr) -> Expr,
) -> Result<Expr, ParseError> {
    let mut expression = parse_operand(parser)?;

    while parser.match_token(operators) {
        let operator = parser.previous().clone();
        let right = parse_operand(parser)?;
        expression = make(expression, operator, right);
    }

    Ok(expression)
}

fn parse_or(parser: &mut Parser) -> Result<Expr, ParseError> {
    parse_left_associative(parser, &[TokenKind::Or], parse_and, Expr::logical)
}

fn parse_and(parser: &mut Parser) -> Result<Expr, ParseError> {
    parse_left_associative(parser, &[TokenKind::And], parse_equality, Expr::logical)
}

fn parse_equality(parser: &mut Parser) -> Result<Expr, ParseError> {
    parse_left_associative(
        parser,
        &[TokenKind::NotEqual, TokenKind::Equal],
        parse_comparison,
        Expr::binary,
    )
}

fn parse_comparison(parser: &mut Parser) -> Result<Expr, ParseError> {
    parse_left_associative(
        parser,
        &[
            TokenKind::GreaterThan,
            TokenKind::GreaterEqual,
            TokenKind::LessThan,
            TokenKind::LessEqual,
        ],
        parse_term,
        Expr::binary,
    )
}

fn parse_term(parser: &mut Parser) -> Result<Expr, ParseError> {
    parse_left_associative(
        parser,
        &[TokenKind::Minus, TokenKind::Plus],
        parse_factor,
        Expr::binary,
    )
}

fn parse_factor(parser: &mut Parser) -> Result<Expr, ParseError> {
    parse_left_associative(
        parser,
        &[TokenKind::Slash, TokenKind::Asterisk],
        parse_unary,
        Expr::binary,
    )
}

fn parse_unary(parser: &mut Parser) -> Result<Expr, ParseError> {
    if parser.match_token(&[TokenKind::Bang, TokenKind::Minus]) {
        let operator = parser.previous().clone();
        let right = ensure_sufficient_stack(|| parse_unary(parser))?;
        return Ok(Expr::Unary {
            operator,
            right: Box::new(right),
        });
    }

    parse_primary(parser)
}

fn parse_primary(parser: &mut Parser) -> Result<Expr, ParseError> {
    let token = parser.peek().clone();
    let kind = token.kind;
    let expression = match kind {
        TokenKind::False => Expr::Literal(LiteralValue::Boolean(false)),
        TokenKind::True => Expr::Literal(LiteralValue::Boolean(true)),
        TokenKind::Nil => Expr::Literal(LiteralValue::Nil),
        TokenKind::Number | TokenKind::String => {
            match token.literal.as_ref().map(LiteralValue::from) {
                Some(value) => Expr::Literal(value),
                None => return Err(ParseError::ExpectedExpression(token)),
            }
        }
        TokenKind::Ident => Expr::Variable(token),
        TokenKind::LParen => {
            parser.advance();
            let expression = parse_expression(parser)?;
            parser.expect_token(TokenKind::RParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expression)));
        }
        _ => return Err(ParseError::ExpectedExpression(token)),
    };

    parser.advance();
    Ok(expression)
}
