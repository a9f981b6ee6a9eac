extern crate rustyline;

use std::fs::File;
use std::io::prelude::*;

use minischeme::{dump_sexp, eval, parse, Environment, Result};

fn main() -> Result<()> {
    let mut env = Environment::new();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] != "--" {
        let mut buffer = String::new();
        File::open(&args[1]).unwrap().read_to_string(&mut buffer).unwrap();
        for form in parse(&buffer, &mut env)? {
            eval(&form, &mut env)?;
        }
        return Ok(());
    }

    let mut rl = rustyline::DefaultEditor::new().unwrap();
    loop {
        let Ok(line) = rl.readline("> ") else {
            // eof
            break Ok(());
        };
        rl.add_history_entry(&line).unwrap();
        match parse(&line, &mut env) {
            Ok(forms) => {
                for form in forms {
                    match eval(&form, &mut env) {
                        Ok(out) => println!("{}", dump_sexp(&out, &env)),
                        Err(err) => println!("Err: {}", err),
                    }
                }
            }
            Err(err) => println!("Err: {}", err),
        }
    }
}
