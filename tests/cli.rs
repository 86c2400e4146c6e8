use std::fs;

use assert_cmd::Command;

fn write_script(name: &str, source: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("loxwalk_cli_test_{name}_{}.lox", std::process::id()));
    fs::write(&path, source).expect("able to write a script to the temp directory");
    path
}

#[test]
fn running_a_valid_script_exits_zero_and_prints_its_output() {
    let path = write_script("valid", "print 1 + 2;");
    Command::cargo_bin("loxwalk")
        .unwrap()
        .arg(&path)
        .assert()
        .success()
        .stdout("3\n");
    fs::remove_file(path).ok();
}

#[test]
fn a_parse_error_exits_64() {
    let path = write_script("parse_error", "print;");
    Command::cargo_bin("loxwalk")
        .unwrap()
        .arg(&path)
        .assert()
        .code(64);
    fs::remove_file(path).ok();
}

#[test]
fn a_runtime_error_exits_70() {
    let path = write_script("runtime_error", r#"print "a" + 1;"#);
    Command::cargo_bin("loxwalk")
        .unwrap()
        .arg(&path)
        .assert()
        .code(70);
    fs::remove_file(path).ok();
}

#[test]
fn a_missing_script_exits_74() {
    Command::cargo_bin("loxwalk")
        .unwrap()
        .arg("/nonexistent/path/does_not_exist.lox")
        .assert()
        .code(74);
}

#[test]
fn too_many_arguments_prints_usage_and_exits_64() {
    Command::cargo_bin("loxwalk")
        .unwrap()
        .arg("one.lox")
        .arg("two.lox")
        .assert()
        .code(64)
        .stdout("Usage: loxwalk [script]\n");
}
