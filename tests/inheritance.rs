mod common;

use common::run;

#[test]
fn subclass_inherits_superclass_methods() {
    let source = r#"
        class Doughnut {
            cook() { print "Fry until golden brown."; }
        }
        class BostonCream < Doughnut {}
        BostonCream().cook();
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "Fry until golden brown.\n");
}

#[test]
fn overridden_method_can_still_reach_superclass_via_super() {
    let source = r#"
        class Doughnut {
            cook() { print "Fry until golden brown."; }
        }
        class BostonCream < Doughnut {
            cook() {
                super.cook();
                print "Pipe full of custard and coat with chocolate.";
            }
        }
        BostonCream().cook();
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "Fry until golden brown.\nPipe full of custard and coat with chocolate.\n");
}

#[test]
fn super_resolves_against_the_definition_site_not_the_call_site() {
    let source = r#"
        class A {
            method() { print "A method"; }
        }
        class B < A {
            method() {
                print "B method";
                super.method();
            }
        }
        class C < B {}
        C().method();
    "#;
    let (output, diagnostics) = run(source);
    assert!(!diagnostics.had_error());
    assert_eq!(output, "B method\nA method\n");
}

#[test]
fn inheriting_from_a_non_class_is_a_runtime_error() {
    let source = r#"
        var NotAClass = "just a string";
        class Sub < NotAClass {}
    "#;
    let (_, diagnostics) = run(source);
    assert!(diagnostics.had_error());
    assert!(diagnostics.had_runtime_error());
}

#[test]
fn class_cannot_inherit_from_itself() {
    let source = "class Oops < Oops {}";
    let (_, diagnostics) = run(source);
    assert!(diagnostics.had_error());
    assert!(!diagnostics.had_runtime_error());
}
