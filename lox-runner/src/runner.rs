use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use lox_interpreter::{Lox, RunReport};
use tracing::info;

// Exit statuses from sysexits.h.
pub const EX_DATAERR: u8 = 65;
pub const EX_SOFTWARE: u8 = 70;
pub const EX_IOERR: u8 = 74;

pub fn execute_file(path: &Path, print_ast: bool) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Could not read {}: {}", path.display(), err);
            return ExitCode::from(EX_IOERR);
        }
    };
    info!(path = %path.display(), "running script");

    let mut lox = Lox::new();
    let report = run_source(&mut lox, &source, print_ast);
    report_diagnostics(&report);

    match exit_status(&report) {
        0 => ExitCode::SUCCESS,
        status => ExitCode::from(status),
    }
}

/// Runs `source`, optionally echoing the parsed program to stderr first.
pub fn run_source<W: Write>(lox: &mut Lox<W>, source: &str, print_ast: bool) -> RunReport {
    if !print_ast {
        return lox.run(source);
    }

    let (program, syntax_errors) = lox_core::parse(source);
    if !syntax_errors.is_empty() {
        return RunReport::syntax(syntax_errors);
    }
    eprint!("{}", program);
    lox.execute(&program)
}

pub fn report_diagnostics(report: &RunReport) {
    for error in &report.syntax_errors {
        eprintln!("{}", error);
    }
    if let Some(error) = &report.runtime_error {
        eprintln!("{}", error);
    }
}

/// Syntax errors take precedence: a program that failed to parse never ran.
pub fn exit_status(report: &RunReport) -> u8 {
    if report.had_error() {
        EX_DATAERR
    } else if report.had_runtime_error() {
        EX_SOFTWARE
    } else {
        0
    }
}
