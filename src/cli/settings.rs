//! Command-line configuration

use std::ffi::OsString;

use clap::{App, Arg, ArgMatches};

use crate::util::budget::RangePolicy;

/// Tax rate applied by `PayTax` when the command does not give one
pub const DEFAULT_TAX: u32 = 13;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// file to read commands from, standard input if `None`
    pub input: Option<String>,
    /// rate used by `PayTax` without an explicit percentage
    pub tax: u32,
    /// treatment of ranges that end before they start
    pub policy: RangePolicy,
    /// number of decimals to print, shortest exact representation if `None`
    pub precision: Option<usize>,
    /// how many times `-v` was given
    pub verbosity: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: None,
            tax: DEFAULT_TAX,
            policy: RangePolicy::Ignore,
            precision: None,
            verbosity: 0,
        }
    }
}

fn is_percentage(s: String) -> Result<(), String> {
    match s.parse::<u32>() {
        Ok(n) if n <= 100 => Ok(()),
        _ => Err(format!("'{}' is not an integer in 0 ..= 100", s)),
    }
}

fn is_count(s: String) -> Result<(), String> {
    s.parse::<usize>()
        .map(|_| ())
        .map_err(|_| format!("'{}' is not a non-negative integer", s))
}

impl Settings {
    pub fn app() -> App<'static, 'static> {
        App::new("bilan")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Records earnings, spendings and taxes over day ranges and answers income queries")
            .arg(
                Arg::with_name("INPUT")
                    .help("File of commands, one per line ('-' or nothing for standard input)")
                    .index(1),
            )
            .arg(
                Arg::with_name("tax")
                    .long("tax")
                    .value_name("PERCENT")
                    .help("Rate used by PayTax commands that do not give one")
                    .takes_value(true)
                    .default_value("13")
                    .validator(is_percentage),
            )
            .arg(
                Arg::with_name("inverted")
                    .long("inverted")
                    .value_name("POLICY")
                    .help("What to do with a range that ends before it starts")
                    .takes_value(true)
                    .possible_values(&["ignore", "swap"])
                    .default_value("ignore"),
            )
            .arg(
                Arg::with_name("precision")
                    .long("precision")
                    .value_name("DIGITS")
                    .help("Print incomes with a fixed number of decimals")
                    .takes_value(true)
                    .validator(is_count),
            )
            .arg(
                Arg::with_name("verbose")
                    .short("v")
                    .long("verbose")
                    .multiple(true)
                    .help("Log more (repeat for more detail, RUST_LOG takes precedence)"),
            )
    }

    /// Read settings from command-line arguments, program name included
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::app().get_matches_from_safe(args)?;
        Ok(Self::from_matches(&matches))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let input = matches
            .value_of("INPUT")
            .filter(|path| *path != "-")
            .map(String::from);
        let tax = matches
            .value_of("tax")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TAX);
        let policy = match matches.value_of("inverted") {
            Some("swap") => RangePolicy::Swap,
            _ => RangePolicy::Ignore,
        };
        let precision = matches.value_of("precision").and_then(|s| s.parse().ok());
        Self {
            input,
            tax,
            policy,
            precision,
            verbosity: matches.occurrences_of("verbose"),
        }
    }
}
