use std::io;
use std::process;

use tracing::{error, info};

use bilan::cli::{logging, session::Session, settings::Settings};
use bilan::load::{self, error::Record, parse};

fn main() {
    let settings = Settings::from_args(std::env::args_os()).unwrap_or_else(|e| e.exit());
    logging::init(settings.verbosity);

    let mut errs = Record::new();
    let path = settings.input.as_deref().unwrap_or("<stdin>");
    let contents = match load::read_input(settings.input.as_deref(), &mut errs) {
        Some(contents) => contents,
        None => {
            eprint!("{}", errs);
            process::exit(2);
        }
    };
    let commands = parse::extract(path, &mut errs, &contents);
    info!(path, commands = commands.len(), "loaded commands");

    let stdout = io::stdout();
    let mut session = Session::new(&settings, stdout.lock());
    if let Err(e) = session.run(&commands, &mut errs) {
        error!(%e, "cannot write results");
        process::exit(2);
    }

    eprint!("{}", errs);
    if errs.is_fatal() {
        process::exit(1);
    }
}
