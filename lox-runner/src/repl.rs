mod reader;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lox_interpreter::Lox;
use reader::{ReadOutput, Reader};

use crate::runner;

struct Repl {
    reader: Reader,
    lox: Lox,
    print_ast: bool,
}

impl Repl {
    fn run(mut self) {
        loop {
            match self.reader.read() {
                ReadOutput::Exit => break,
                ReadOutput::Clear => continue,
                ReadOutput::Line(line) => {
                    // Each line gets a fresh report, so an error on one line
                    // does not poison the next.
                    let report = runner::run_source(&mut self.lox, &line, self.print_ast);
                    runner::report_diagnostics(&report);
                }
            }
        }
    }
}

pub fn start(print_ast: bool) -> Result<(), ReadlineError> {
    let rl = DefaultEditor::new()?;

    Repl {
        reader: Reader::new(rl),
        lox: Lox::new(),
        print_ast,
    }
    .run();
    Ok(())
}
