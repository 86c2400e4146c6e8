mod common;

use common::run;

#[test]
fn block_scoped_variable_shadows_the_outer_one() {
    let source = r#"
        var a = "global";
        {
            var a = "block";
            print a;
        }
        print a;
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "block\nglobal\n");
}

#[test]
fn redeclaring_a_global_is_allowed() {
    let source = r#"
        var a = 1;
        var a = 2;
        print a;
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "2\n");
}

#[test]
fn redeclaring_a_local_in_the_same_scope_is_a_compile_error() {
    let source = "{ var a = 1; var a = 2; }";
    let (_, diagnostics) = run(source);
    assert!(diagnostics.had_error());
    assert!(!diagnostics.had_runtime_error());
}

#[test]
fn reading_a_local_in_its_own_initializer_is_a_compile_error() {
    let source = "{ var a = a; }";
    let (_, diagnostics) = run(source);
    assert!(diagnostics.had_error());
    assert!(!diagnostics.had_runtime_error());
}

#[test]
fn reading_an_undefined_global_is_a_runtime_error() {
    let (_, diagnostics) = run("print notDefined;");
    assert!(diagnostics.had_runtime_error());
}

#[test]
fn assigning_to_an_undeclared_variable_is_a_runtime_error() {
    let (_, diagnostics) = run("notDeclared = 1;");
    assert!(diagnostics.had_runtime_error());
}

#[test]
fn assignment_is_an_expression_that_yields_the_assigned_value() {
    let (output, diagnostics) = run("var a = 1; print a = 2;");
    assert!(!diagnostics.had_error());
    assert_eq!(output, "2\n");
}
