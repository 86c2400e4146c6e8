mod common;

use common::run;

#[test]
fn function_with_no_return_yields_nil() {
    let source = r#"
        fun procedure() { print "don't return anything"; }
        var result = procedure();
        print result;
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "don't return anything\nnil\n");
}

#[test]
fn recursive_function_computes_fibonacci() {
    let source = r#"
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(10);
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "55\n");
}

#[test]
fn functions_are_first_class_values() {
    let source = r#"
        fun add(a, b) { return a + b; }
        var op = add;
        print op(1, 2);
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "3\n");
}

#[test]
fn calling_with_the_wrong_number_of_arguments_is_a_runtime_error() {
    let source = r#"
        fun add(a, b) { return a + b; }
        add(1);
    "#;
    let (_, diagnostics) = run(source);
    assert!(diagnostics.had_runtime_error());
}

#[test]
fn calling_a_non_callable_value_is_a_runtime_error() {
    let source = r#"
        var notAFunction = "totally not a function";
        notAFunction();
    "#;
    let (_, diagnostics) = run(source);
    assert!(diagnostics.had_runtime_error());
}

#[test]
fn stringifying_a_function_shows_its_name() {
    let source = "fun add(a, b) { return a + b; } print add;";
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "<fn add>\n");
}

#[test]
fn clock_native_returns_a_number() {
    let (_, diagnostics) = run("print clock() >= 0;");
    assert!(!diagnostics.had_error());
}
