mod common;

use common::run;

#[test]
fn if_else_picks_the_matching_branch() {
    let (output, diagnostics) = run(r#"if (true) print "yes"; else print "no";"#);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "yes\n");
}

#[test]
fn while_loop_counts_down() {
    let source = r#"
        var n = 3;
        while (n > 0) {
            print n;
            n = n - 1;
        }
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "3\n2\n1\n");
}

#[test]
fn for_loop_desugars_to_a_while_loop() {
    let source = r#"
        for (var i = 0; i < 3; i = i + 1) {
            print i;
        }
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn logical_and_short_circuits_and_returns_an_operand_value() {
    let (output, diagnostics) = run(r#"print false and "unreached"; print "left" and "right";"#);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "false\nright\n");
}

#[test]
fn logical_or_short_circuits_and_returns_an_operand_value() {
    let (output, diagnostics) = run(r#"print "left" or "unreached"; print false or "right";"#);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "left\nright\n");
}

#[test]
fn nil_and_false_are_the_only_falsey_values() {
    let source = r#"
        if (nil) print "nil is truthy"; else print "nil is falsey";
        if (0) print "zero is truthy"; else print "zero is falsey";
        if ("") print "empty string is truthy"; else print "empty string is falsey";
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "nil is falsey\nzero is truthy\nempty string is truthy\n");
}
