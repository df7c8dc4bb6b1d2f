use std::io::{Stdout, Write};

use lox_core::ast::Program;
use lox_core::diagnostic::SyntaxError;
use tracing::{debug, instrument};

use crate::interpreter::Interpreter;
use crate::value::RuntimeError;

/// Diagnostics collected by one call to [`Lox::run`].
#[derive(Debug, Default, PartialEq)]
pub struct RunReport {
    /// Lexical errors first, then parse errors, each in source order.
    pub syntax_errors: Vec<SyntaxError>,
    pub runtime_error: Option<RuntimeError>,
}

impl RunReport {
    pub fn syntax(syntax_errors: Vec<SyntaxError>) -> Self {
        RunReport {
            syntax_errors,
            runtime_error: None,
        }
    }

    pub fn had_error(&self) -> bool {
        !self.syntax_errors.is_empty()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.runtime_error.is_some()
    }

    pub fn is_ok(&self) -> bool {
        !self.had_error() && !self.had_runtime_error()
    }
}

/// An interpreter session.
///
/// Global definitions persist across runs, which is what a REPL needs:
/// every line is a separate run against the same globals.
pub struct Lox<W: Write = Stdout> {
    interpreter: Interpreter<W>,
}

impl Lox<Stdout> {
    pub fn new() -> Self {
        Self::with_output(std::io::stdout())
    }
}

impl Default for Lox<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Lox<W> {
    pub fn with_output(out: W) -> Self {
        Self {
            interpreter: Interpreter::new(out),
        }
    }

    /// Scans, parses and, if both succeeded, executes `source`.
    #[instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn run(&mut self, source: &str) -> RunReport {
        let (program, syntax_errors) = lox_core::parse(source);
        if !syntax_errors.is_empty() {
            debug!(errors = syntax_errors.len(), "skipping execution");
            return RunReport::syntax(syntax_errors);
        }
        self.execute(&program)
    }

    /// Executes an already parsed program.
    pub fn execute(&mut self, program: &Program) -> RunReport {
        let runtime_error = self.interpreter.interpret(&program.statements).err();
        if let Some(error) = &runtime_error {
            debug!(%error, "run aborted");
        }
        RunReport {
            syntax_errors: Vec::new(),
            runtime_error,
        }
    }

    pub fn output(&self) -> &W {
        self.interpreter.output()
    }

    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }
}
