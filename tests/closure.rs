mod common;

use common::run;

#[test]
fn counter_keeps_private_state_across_calls() {
    let source = r#"
        fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                print i;
            }
            return count;
        }
        var counter = makeCounter();
        counter();
        counter();
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "1\n2\n");
}

#[test]
fn nested_function_closes_over_an_outer_parameter() {
    let source = r#"
        fun outer(param) {
            fun inner() { print param; }
            inner();
        }
        outer("param");
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "param\n");
}

#[test]
fn shadowing_a_variable_does_not_disturb_the_original_closure() {
    let source = r#"
        var a = "outer";
        {
            fun showA() { print a; }
            showA();
            var a = "inner";
            showA();
        }
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "outer\nouter\n");
}

#[test]
fn closure_captures_loop_variable_by_scope_not_by_final_value() {
    let source = r#"
        var globalOne;
        var globalTwo;
        fun main() {
            for (var a = 1; a <= 2; a = a + 1) {
                fun captured() { print a; }
                if (a == 1) globalOne = captured;
                else globalTwo = captured;
            }
        }
        main();
        globalOne();
        globalTwo();
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "1\n2\n");
}
