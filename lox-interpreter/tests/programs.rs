use lox_interpreter::{Lox, RunReport};
use pretty_assertions::assert_eq;

fn run(source: &str) -> (String, RunReport) {
    let mut lox = Lox::with_output(Vec::new());
    let report = lox.run(source);
    let output = String::from_utf8(lox.into_output()).expect("output is utf-8");
    (output, report)
}

fn test_programs(tests: Vec<(&str, &str)>) {
    for (source, expected) in tests {
        let (output, report) = run(source);
        assert!(report.is_ok(), "{source}: {report:?}");
        assert_eq!(output, expected, "{source}");
    }
}

#[test]
fn test_shadowing() {
    let source = r#"
        var x = 1;
        {
            var x = 2;
            print x;
        }
        print x;
    "#;

    test_programs(vec![(source, "2\n1\n")]);
}

#[test]
fn test_scopes() {
    let source = r#"
        var a = "global a";
        var b = "global b";
        var c = "global c";
        {
          var a = "outer a";
          var b = "outer b";
          {
            var a = "inner a";
            print a;
            print b;
            print c;
          }
          print a;
          print b;
          print c;
        }
        print a;
        print b;
        print c;
    "#;
    let expected = "inner a\nouter b\nglobal c\nouter a\nouter b\nglobal c\nglobal a\nglobal b\nglobal c\n";

    test_programs(vec![(source, expected)]);
}

#[test]
fn test_print_formatting() {
    test_programs(vec![
        ("print 6 / 2;", "3\n"),
        ("print 1 / 3;", "0.3333333333333333\n"),
        ("print 1 == 1.0;", "true\n"),
        ("print \"a\" + \"b\";", "ab\n"),
        ("print 1 + 2;", "3\n"),
        ("print !nil;", "true\n"),
        ("print !0;", "false\n"),
    ]);
}

#[test]
fn test_multiline_string_and_comments() {
    let source = "// greeting\nprint \"hello\nworld\"; // trailing\n";

    test_programs(vec![(source, "hello\nworld\n")]);
}

#[test]
fn test_assignment_chain_and_conditionals() {
    let source = r#"
        var a;
        var b;
        a = b = 10;
        if (a == b and a > 5) {
            print "big";
        } else {
            print "small";
        }
        if (nil or false) print "unreachable"; else print a + b;
    "#;

    test_programs(vec![(source, "big\n20\n")]);
}

#[test]
fn test_string_plus_number_is_runtime_error() {
    let (output, report) = run("print \"before\";\nprint \"a\" + 1;\nprint \"after\";");

    assert_eq!(output, "before\n");
    assert!(!report.had_error());
    let error = report.runtime_error.expect("runtime error");
    assert_eq!(
        error.to_string(),
        "Operands must be two numbers or two strings.\n[line 2]"
    );
}

#[test]
fn test_assignment_to_undefined_name() {
    let mut lox = Lox::with_output(Vec::new());

    let report = lox.run("undefinedName = 1;");
    assert_eq!(
        report.runtime_error.map(|e| e.to_string()),
        Some("Undefined variable 'undefinedName'.\n[line 1]".to_owned())
    );

    let report = lox.run("print undefinedName;");
    assert!(report.had_runtime_error());
}

#[test]
fn test_syntax_errors_suppress_execution() {
    let (output, report) = run("print 1;\nvar = 3;\nprint 2;\n\"unterminated");

    assert_eq!(output, "");
    assert!(report.runtime_error.is_none());
    assert_eq!(
        report
            .syntax_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>(),
        vec![
            "[line 4] Error: Unterminated string.",
            "[line 2] Error at '=': Expect variable name.",
        ]
    );
}
