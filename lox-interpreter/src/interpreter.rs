use std::io::Write;

use lox_core::ast::{Expr, IfStatement, PrintStatement, Stmt, VarStatement};
use lox_core::lexer::{Token, TokenKind};
use lox_core::stack::ensure_sufficient_stack;
use tracing::debug;

use crate::environment::Environment;
use crate::value::{RuntimeError, RuntimeErrorKind, Value};

/// Tree-walking evaluator.
///
/// `print` output goes to `out`. The global scope lives as long as the
/// interpreter, so successive calls to [`Interpreter::interpret`] see each
/// other's definitions.
pub struct Interpreter<W: Write> {
    environment: Environment,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self {
            environment: Environment::new(),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Executes `statements` in order, stopping at the first runtime error.
    /// Output already written by earlier statements is kept.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        statements
            .iter()
            .try_for_each(|statement| self.execute(statement))
    }

    fn execute(&mut self, statement: &Stmt) -> Result<(), RuntimeError> {
        ensure_sufficient_stack(|| match statement {
            Stmt::Expression(expression) => self.evaluate(expression).map(|_| ()),
            Stmt::Print(statement) => self.execute_print(statement),
            Stmt::Var(statement) => self.execute_var(statement),
            Stmt::Block(statements) => {
                let environment = Environment::new_enclosed(&self.environment);
                self.execute_block(statements, environment)
            }
            Stmt::If(statement) => self.execute_if(statement),
        })
    }

    fn execute_print(&mut self, statement: &PrintStatement) -> Result<(), RuntimeError> {
        let value = self.evaluate(&statement.expression)?;
        writeln!(self.out, "{}", value).map_err(|error| {
            RuntimeError::new(
                &statement.keyword,
                RuntimeErrorKind::Io(error.to_string()),
            )
        })
    }

    fn execute_var(&mut self, statement: &VarStatement) -> Result<(), RuntimeError> {
        let value = match &statement.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Value::Nil,
        };
        self.environment.define(statement.name.lexeme.clone(), value);
        Ok(())
    }

    fn execute_if(&mut self, statement: &IfStatement) -> Result<(), RuntimeError> {
        if self.evaluate(&statement.condition)?.is_truthy() {
            self.execute(&statement.then_branch)
        } else if let Some(else_branch) = &statement.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    /// Runs `statements` with `environment` as the current scope, then puts
    /// the previous scope back whether or not a statement failed.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Environment,
    ) -> Result<(), RuntimeError> {
        debug!(statements = statements.len(), "entering block");
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        debug!(ok = result.is_ok(), "leaving block");
        result
    }

    pub fn evaluate(&mut self, expression: &Expr) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| match expression {
            Expr::Literal(value) => Ok(value.into()),
            Expr::Grouping(expression) => self.evaluate(expression),
            Expr::Variable(name) => self.environment.get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                eval_unary(operator, right)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                eval_binary(operator, left, right)
            }
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                match operator.kind {
                    TokenKind::Or if left.is_truthy() => Ok(left),
                    TokenKind::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate(right),
                }
            }
        })
    }
}

// The parser only builds unary nodes for `!` and `-`.
fn eval_unary(operator: &Token, right: Value) -> Result<Value, RuntimeError> {
    match (operator.kind, &right) {
        (TokenKind::Bang, _) => Ok(Value::Boolean(!right.is_truthy())),
        (_, Value::Number(value)) => Ok(Value::Number(-value)),
        _ => Err(RuntimeError::new(
            operator,
            RuntimeErrorKind::OperandMustBeNumber,
        )),
    }
}

// Binary nodes only carry arithmetic, comparison and equality operators.
fn eval_binary(operator: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (operator.kind, &left, &right) {
        (TokenKind::Equal, _, _) => Ok(Value::Boolean(left.is_equal(&right))),
        (TokenKind::NotEqual, _, _) => Ok(Value::Boolean(!left.is_equal(&right))),
        (TokenKind::Plus, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Number(left + right))
        }
        (TokenKind::Plus, Value::String(left), Value::String(right)) => {
            Ok(Value::String(format!("{}{}", left, right).into()))
        }
        (TokenKind::Plus, _, _) => Err(RuntimeError::new(
            operator,
            RuntimeErrorKind::OperandsMustBeNumbersOrStrings,
        )),
        (TokenKind::Minus, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Number(left - right))
        }
        (TokenKind::Asterisk, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Number(left * right))
        }
        (TokenKind::Slash, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Number(left / right))
        }
        (TokenKind::GreaterThan, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Boolean(left > right))
        }
        (TokenKind::GreaterEqual, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Boolean(left >= right))
        }
        (TokenKind::LessThan, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Boolean(left < right))
        }
        (TokenKind::LessEqual, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Boolean(left <= right))
        }
        _ => Err(RuntimeError::new(
            operator,
            RuntimeErrorKind::OperandsMustBeNumbers,
        )),
    }
}
