use std::fmt::Display;
use std::rc::Rc;

use crate::lexer::{Literal, Token};
use crate::stack::ensure_sufficient_stack;

#[derive(Debug)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Expression(Expr),
    If(IfStatement),
    Print(PrintStatement),
    Var(VarStatement),
}

#[derive(Debug, PartialEq)]
pub struct IfStatement {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

#[derive(Debug, PartialEq)]
pub struct PrintStatement {
    /// The `print` keyword, kept for error attribution.
    pub keyword: Token,
    pub expression: Expr,
}

#[derive(Debug, PartialEq)]
pub struct VarStatement {
    pub name: Token,
    pub initializer: Option<Expr>,
}

#[derive(Debug)]
pub enum Expr {
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Grouping(Box<Expr>),
    Literal(LiteralValue),
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Variable(Token),
}

#[derive(Debug, PartialEq, Clone)]
pub enum LiteralValue {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
}

impl From<&Literal> for LiteralValue {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(value) => LiteralValue::Number(*value),
            Literal::String(value) => LiteralValue::String(value.clone()),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Expr {
    pub fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn logical(left: Expr, operator: Token, right: Expr) -> Expr {
        Expr::Logical {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    /// Fully parenthesized prefix form, e.g. `(* (- 1) (group (+ 2 3)))`.
    ///
    /// Unlike [`Display`], which reproduces source text, this makes the shape
    /// of the tree visible.
    pub fn to_sexpr(&self) -> String {
        ensure_sufficient_stack(|| match self {
            Expr::Assign { name, value } => format!("(= {} {})", name.lexeme, value.to_sexpr()),
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                left.to_sexpr(),
                right.to_sexpr()
            ),
            Expr::Grouping(expression) => format!("(group {})", expression.to_sexpr()),
            Expr::Literal(value) => value.to_string(),
            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, right.to_sexpr())
            }
            Expr::Variable(name) => name.lexeme.to_string(),
        })
    }
}

// Trees can nest as deeply as the parser allows, so every impl that recurses
// over `Expr` or `Stmt` runs each level under `ensure_sufficient_stack`.

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        ensure_sufficient_stack(|| match (self, other) {
            (
                Expr::Assign { name, value },
                Expr::Assign {
                    name: other_name,
                    value: other_value,
                },
            ) => name == other_name && value == other_value,
            (
                Expr::Binary {
                    left,
                    operator,
                    right,
                },
                Expr::Binary {
                    left: other_left,
                    operator: other_operator,
                    right: other_right,
                },
            )
            | (
                Expr::Logical {
                    left,
                    operator,
                    right,
                },
                Expr::Logical {
                    left: other_left,
                    operator: other_operator,
                    right: other_right,
                },
            ) => operator == other_operator && left == other_left && right == other_right,
            (Expr::Grouping(expression), Expr::Grouping(other)) => expression == other,
            (Expr::Literal(value), Expr::Literal(other)) => value == other,
            (
                Expr::Unary { operator, right },
                Expr::Unary {
                    operator: other_operator,
                    right: other_right,
                },
            ) => operator == other_operator && right == other_right,
            (Expr::Variable(name), Expr::Variable(other)) => name == other,
            _ => false,
        })
    }
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        ensure_sufficient_stack(|| match (self, other) {
            (Stmt::Block(statements), Stmt::Block(other)) => statements == other,
            (Stmt::Expression(expression), Stmt::Expression(other)) => expression == other,
            (Stmt::If(statement), Stmt::If(other)) => statement == other,
            (Stmt::Print(statement), Stmt::Print(other)) => statement == other,
            (Stmt::Var(statement), Stmt::Var(other)) => statement == other,
            _ => false,
        })
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        match self {
            Expr::Assign { value: child, .. }
            | Expr::Grouping(child)
            | Expr::Unary { right: child, .. } => release_expr(child),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                release_expr(left);
                release_expr(right);
            }
            Expr::Literal(_) | Expr::Variable(_) => {}
        }
    }
}

/// Moves the subtree out of `child`, leaving a leaf behind, and drops it on a
/// guarded stack.
fn release_expr(child: &mut Expr) {
    if matches!(child, Expr::Literal(_) | Expr::Variable(_)) {
        return;
    }
    let subtree = std::mem::replace(child, Expr::Literal(LiteralValue::Nil));
    ensure_sufficient_stack(move || drop(subtree));
}

impl Drop for Stmt {
    fn drop(&mut self) {
        match self {
            Stmt::Block(statements) => {
                let statements = std::mem::take(statements);
                ensure_sufficient_stack(move || drop(statements));
            }
            Stmt::If(statement) => {
                let then_branch = std::mem::replace(
                    statement.then_branch.as_mut(),
                    Stmt::Block(Vec::new()),
                );
                let else_branch = statement.else_branch.take();
                ensure_sufficient_stack(move || drop((then_branch, else_branch)));
            }
            Stmt::Expression(_) | Stmt::Print(_) | Stmt::Var(_) => {}
        }
    }
}

// The Display impls below print canonical source text: parsing the output
// yields the same tree again.

impl Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiteralValue::Nil => write!(f, "nil"),
            LiteralValue::Boolean(value) => write!(f, "{}", value),
            LiteralValue::Number(value) => write!(f, "{}", value),
            LiteralValue::String(value) => write!(f, "\"{}\"", value),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ensure_sufficient_stack(|| match self {
            Expr::Assign { name, value } => write!(f, "{} = {}", name.lexeme, value),
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => write!(f, "{} {} {}", left, operator.lexeme, right),
            Expr::Grouping(expression) => write!(f, "({})", expression),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Unary { operator, right } => write!(f, "{}{}", operator.lexeme, right),
            Expr::Variable(name) => write!(f, "{}", name.lexeme),
        })
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ensure_sufficient_stack(|| match self {
            Stmt::Block(statements) => {
                write!(f, "{{")?;
                for statement in statements {
                    write!(f, " {}", statement)?;
                }
                if !statements.is_empty() {
                    write!(f, " ")?;
                }
                write!(f, "}}")
            }
            Stmt::Expression(expression) => write!(f, "{};", expression),
            Stmt::If(statement) => {
                write!(
                    f,
                    "if ({}) {}",
                    statement.condition, statement.then_branch
                )?;
                if let Some(else_branch) = &statement.else_branch {
                    write!(f, " else {}", else_branch)?;
                }
                Ok(())
            }
            Stmt::Print(statement) => write!(f, "print {};", statement.expression),
            Stmt::Var(statement) => match &statement.initializer {
                Some(initializer) => write!(f, "var {} = {};", statement.name.lexeme, initializer),
                None => write!(f, "var {};", statement.name.lexeme),
            },
        })
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DEPTH: usize = 300_000;

    fn deep_negation() -> String {
        format!("print {}1;", "-".repeat(DEPTH))
    }

    #[test]
    fn test_drop_deeply_nested_expression() {
        let (program, errors) = crate::parse(&deep_negation());

        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 1);
        drop(program);
    }

    #[test]
    fn test_drop_deeply_nested_blocks() {
        let input = format!("{}{}", "{".repeat(DEPTH), "}".repeat(DEPTH));
        let (program, errors) = crate::parse(&input);

        assert!(errors.is_empty());
        drop(program);
    }

    #[test]
    fn test_display_and_compare_deeply_nested_expression() {
        let input = deep_negation();
        let (first, _) = crate::parse(&input);
        let (second, _) = crate::parse(&input);

        assert!(first == second);
        assert_eq!(first.to_string(), format!("{input}\n"));
    }

    #[test]
    fn test_sexpr() {
        let (program, _) = crate::parse("a = -(1 + 2) * b or nil;");
        let Stmt::Expression(expression) = &program.statements[0] else {
            panic!("expected expression statement");
        };

        assert_eq!(expression.to_sexpr(), "(= a (or (* (- (group (+ 1 2))) b) nil))");
    }
}
