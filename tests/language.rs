//! End-to-end language tests driving the public interpreter API.

use treelox::eval::RuntimeError;
use treelox::interpreter::{Interpreter, LoxError};
use treelox::{parser, scanner};

fn run(src: &str) -> Result<String, LoxError> {
    let mut raw_output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut raw_output);
    interp.eval(src.as_bytes())?;
    Ok(String::from_utf8(raw_output).expect("output is not UTF-8"))
}

fn assert_output(src: &str, expected: &str) {
    match run(src) {
        Ok(output) => assert_eq!(output, expected, "program: {}", src),
        Err(e) => panic!("program failed: {}\nerror: {}", src, e),
    }
}

fn assert_runtime_error(src: &str) -> RuntimeError {
    match run(src) {
        Err(LoxError::Runtime(e)) => e,
        r => panic!("expected runtime error for: {}\ngot: {:?}", src, r),
    }
}

#[test]
fn arithmetic_with_precedence() {
    assert_output("print 1 + 2 * 3;", "7\n");
    assert_output("print (1 + 2) * 3;", "9\n");
    assert_output("print 10 / 2 - 3;", "2\n");
    assert_output("print -2 * -3;", "6\n");
}

#[test]
fn number_printing_drops_integral_decimals() {
    assert_output("print 123;", "123\n");
    assert_output("print 123.45;", "123.45\n");
    assert_output("print 2.5 + 2.5;", "5\n");
}

#[test]
fn string_operations() {
    assert_output("print \"hello\" + \" \" + \"world\";", "hello world\n");
    assert_output("print \"\" == \"\";", "true\n");
    assert_output("print \"1\" == 1;", "false\n");
}

#[test]
fn boolean_logic() {
    assert_output("print true and false;", "false\n");
    assert_output("print true or false;", "true\n");
    assert_output("print !nil;", "true\n");
    assert_output("print nil or \"fallback\";", "fallback\n");
}

#[test]
fn block_scoping() {
    assert_output(
        "var a = 1; { var a = 2; print a; } print a;",
        "2\n1\n",
    );
}

#[test]
fn while_loop_counts() {
    assert_output(
        "var i = 0; while (i < 3) { print i; i = i + 1; }",
        "0\n1\n2\n",
    );
}

#[test]
fn for_loop_counts() {
    assert_output("for (var i = 0; i < 2; i = i + 1) { print i; }", "0\n1\n");
}

#[test]
fn for_initializer_does_not_leak() {
    match run("for (var i = 0; i < 2; i = i + 1) { print i; } print i;") {
        Err(LoxError::Runtime(RuntimeError::UndefinedVariable(name))) => {
            assert_eq!(name, "i")
        }
        r => panic!("unexpected output: {:?}", r),
    }
}

#[test]
fn functions_and_closures() {
    assert_output(
        "fun make(n) { fun g() { return n; } return g; } var c = make(42); print c();",
        "42\n",
    );
    assert_output(
        "var x = 1; fun f() { print x; } x = 2; f();",
        "2\n",
    );
}

#[test]
fn recursion_works() {
    assert_output(
        r#"
            fun fib(n) {
                if (n < 2) {
                    return n;
                }
                return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
        "#,
        "55\n",
    );
}

#[test]
fn counter_closures_keep_private_state() {
    assert_output(
        r#"
            fun counter() {
                var n = 0;
                fun bump() {
                    n = n + 1;
                    return n;
                }
                return bump;
            }
            var a = counter();
            var b = counter();
            print a();
            print a();
            print b();
        "#,
        "1\n2\n1\n",
    );
}

#[test]
fn runtime_error_kinds() {
    assert!(matches!(
        assert_runtime_error("\"a\" + 1;"),
        RuntimeError::AddMismatch
    ));
    assert!(matches!(
        assert_runtime_error("print 1 / 0;"),
        RuntimeError::DivisionByZero
    ));
    assert!(matches!(
        assert_runtime_error("print -\"a\";"),
        RuntimeError::ExpectedNumber
    ));
    assert!(matches!(
        assert_runtime_error("var f = 1; f();"),
        RuntimeError::NotCallable
    ));
    assert!(matches!(
        assert_runtime_error("fun f(a) {} f();"),
        RuntimeError::WrongArgumentCount
    ));
    assert!(matches!(
        assert_runtime_error("return 1;"),
        RuntimeError::TopLevelReturn
    ));
}

#[test]
fn runtime_error_messages() {
    assert_eq!(
        assert_runtime_error("print x;").to_string(),
        "Undefined variable: \"x\""
    );
    assert_eq!(
        assert_runtime_error("print 1 / 0;").to_string(),
        "Division by zero"
    );
    assert_eq!(
        assert_runtime_error("\"a\" + 1;").to_string(),
        "Can only add numbers or strings"
    );
}

#[test]
fn lex_errors_cover_the_whole_input() {
    match run("var a = 1;\n@#\nprint a;") {
        Err(LoxError::Lex(errors)) => {
            let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            assert_eq!(
                rendered,
                vec![
                    "[line 2] Error: Unexpected character: @",
                    "[line 2] Error: Unexpected character: #",
                ]
            );
        }
        r => panic!("unexpected output: {:?}", r),
    }
}

#[test]
fn parse_error_is_fail_fast() {
    match run("print 1;\nvar = 2;\nvar = 3;") {
        Err(LoxError::Parse(e)) => assert_eq!(e.pos, 2),
        r => panic!("unexpected output: {:?}", r),
    }
}

#[test]
fn ast_printing_is_stable() {
    let src = "var a = 1; if (a < 2) { print a and true; } else { a = a + 1; }";
    let (tokens, errors) = scanner::tokenize(src.as_bytes()).expect("read failed");
    assert!(errors.is_empty());
    let stmts = parser::parse(tokens).expect("parse failed");
    let rendered: Vec<String> = stmts.iter().map(|s| s.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "var a = 1.0",
            "if ((< a 2.0)) then (block print (and a true)) else (block (expr (= a (+ a 1.0))))",
        ]
    );
}

#[test]
fn tokenize_reports_literals() {
    let (tokens, errors) = scanner::tokenize("var x = 12.50;".as_bytes()).expect("read failed");
    assert!(errors.is_empty());
    let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "VAR var null",
            "IDENTIFIER x null",
            "EQUAL = null",
            "NUMBER 12.50 12.5",
            "SEMICOLON ; null",
            "EOF  null",
        ]
    );
}

#[test]
fn repl_style_incremental_evaluation() {
    let mut raw_output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut raw_output);
    interp.eval("var total = 0;".as_bytes()).expect("line 1");
    interp
        .eval("fun add(n) { total = total + n; }".as_bytes())
        .expect("line 2");
    interp.eval("add(40); add(2);".as_bytes()).expect("line 3");
    interp.eval("print total;".as_bytes()).expect("line 4");
    assert_eq!(raw_output, b"42\n");
}
