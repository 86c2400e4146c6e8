use std::{env, process};

use loxwalk::Lox;

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => Lox::run_prompt(),
        2 => Lox::run_file(&args[1]),
        _ => {
            println!("Usage: loxwalk [script]");
            process::exit(64);
        }
    }
}
