//! Reading and checking a command stream

pub mod error;
pub mod parse;

use std::io::Read;

/// Read the whole input, from standard input if there is no `path`
///
/// Failure is recorded in `errs`.
pub fn read_input(path: Option<&str>, errs: &mut error::Record) -> Option<String> {
    let contents = match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut contents = String::new();
            std::io::stdin()
                .read_to_string(&mut contents)
                .map(|_| contents)
        }
    };
    match contents {
        Ok(contents) => Some(contents),
        Err(e) => {
            errs.make("Cannot read input")
                .text(format!(
                    "Commands are read from '{}'",
                    path.unwrap_or("<stdin>")
                ))
                .text(e)
                .hint("check that the file exists and is readable");
            None
        }
    }
}
