//! Convert a command stream into validated commands
//!
//! The grammar only splits the stream into lines of whitespace-separated
//! words. Each line is then checked here: known operation, number of
//! arguments, dates, amounts. Invalid lines are reported in the error
//! record and dropped, the others are kept in order.

use std::ops::RangeInclusive;
use std::str::FromStr;

use pest::Parser;
use pest_derive::*;

/// Wrapper around Pest's `Pair`
type Pair<'i> = pest::iterators::Pair<'i, Rule>;

use crate::load::error::{self, Loc};
use crate::util::date::{Date, DateError};

/// Pest-generated parser
#[derive(Parser)]
#[grammar = "load/commands.pest"]
pub struct CommandParser;

/// A well-formed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ComputeIncome { from: Date, to: Date },
    Earn { from: Date, to: Date, value: u64 },
    Spend { from: Date, to: Date, value: u64 },
    /// `percent` is left out to use the default rate
    PayTax { from: Date, to: Date, percent: Option<u32> },
    /// any operation name that is not one of the above
    Unsupported(String),
}

/// A command and the line it was read from
#[derive(Debug)]
pub struct Located<'i> {
    pub loc: Loc<'i>,
    pub command: Command,
}

/// Operations that are understood
#[derive(Debug, Clone, Copy)]
enum Op {
    ComputeIncome,
    Earn,
    Spend,
    PayTax,
}

impl Op {
    fn from(name: &str) -> Option<Self> {
        match name {
            "ComputeIncome" => Some(Op::ComputeIncome),
            "Earn" => Some(Op::Earn),
            "Spend" => Some(Op::Spend),
            "PayTax" => Some(Op::PayTax),
            _ => None,
        }
    }

    fn arity(self) -> RangeInclusive<usize> {
        match self {
            Op::ComputeIncome => 2..=2,
            Op::Earn | Op::Spend => 3..=3,
            Op::PayTax => 2..=3,
        }
    }

    fn usage(self) -> &'static str {
        match self {
            Op::ComputeIncome => "ComputeIncome FROM TO",
            Op::Earn => "Earn FROM TO AMOUNT",
            Op::Spend => "Spend FROM TO AMOUNT",
            Op::PayTax => "PayTax FROM TO [PERCENT]",
        }
    }
}

// get first and rest of inner
macro_rules! decapitate {
    ( $node:expr ) => {{
        let mut items = $node.into_inner().into_iter();
        let fst = items.next().unwrap_or_else(|| panic!("No head"));
        (fst, items)
    }};
}

/// Get the commands of `contents`, read from `path`
///
/// The return value may be non-empty even if some errors occured:
/// it contains all commands that are valid, in order.
///
/// If the first line is a single integer, it is the number of commands
/// that follow. Only that many lines are read.
pub fn extract<'i>(path: &'i str, errs: &mut error::Record, contents: &'i str) -> Vec<Located<'i>> {
    match CommandParser::parse(Rule::program, contents) {
        Ok(mut pairs) => match pairs.next() {
            Some(program) => validate(path, errs, program),
            None => Vec::new(),
        },
        Err(e) => {
            errs.make("Parsing failure").from(e.with_path(path));
            Vec::new()
        }
    }
}

/// Check all lines of a `program`
fn validate<'i>(path: &'i str, errs: &mut error::Record, program: Pair<'i>) -> Vec<Located<'i>> {
    let lines = program
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::line)
        .collect::<Vec<_>>();
    let (header, body) = match lines.first().and_then(count_header) {
        Some(count) => (Some((count, lines[0].as_span())), &lines[1..]),
        None => (None, &lines[..]),
    };
    let (kept, extra) = match header {
        Some((count, _)) if count < body.len() => body.split_at(count),
        _ => (body, &[][..]),
    };
    if let Some((count, span)) = header {
        if let Some(first_extra) = extra.first() {
            errs.make("Unexpected commands")
                .nonfatal()
                .span(&(path, first_extra.as_span()), "first ignored command")
                .text(format!(
                    "The header announces {} command{} but {} follow",
                    count,
                    if count == 1 { "" } else { "s" },
                    body.len(),
                ))
                .hint("update the command count or remove the trailing commands");
        } else if body.len() < count {
            errs.make("Missing commands")
                .nonfatal()
                .span(&(path, span), "announced here")
                .text(format!(
                    "The header announces {} commands but only {} follow",
                    count,
                    body.len(),
                ))
                .hint("update the command count");
        }
    }
    let mut commands = Vec::new();
    for line in kept {
        if let Some(command) = validate_line(path, errs, line.clone()) {
            commands.push(command);
        }
    }
    commands
}

/// A line made of a single integer
fn count_header(line: &Pair) -> Option<usize> {
    let mut inner = line.clone().into_inner();
    let first = inner.next()?;
    if inner.next().is_some() {
        return None;
    }
    first.as_str().parse::<usize>().ok()
}

fn validate_line<'i>(path: &'i str, errs: &mut error::Record, line: Pair<'i>) -> Option<Located<'i>> {
    let loc = (path, line.as_span());
    let (name, args) = decapitate!(line);
    let args = args.collect::<Vec<_>>();
    let op = match Op::from(name.as_str()) {
        Some(op) => op,
        None => {
            return Some(Located {
                loc,
                command: Command::Unsupported(name.as_str().to_string()),
            })
        }
    };
    let arity = op.arity();
    if !arity.contains(&args.len()) {
        errs.make("Wrong number of arguments")
            .span(
                &loc,
                format!("{} argument{} provided", args.len(), if args.len() == 1 { "" } else { "s" }),
            )
            .text(if arity.start() == arity.end() {
                format!("'{}' takes {} arguments", name.as_str(), arity.start())
            } else {
                format!("'{}' takes {} or {} arguments", name.as_str(), arity.start(), arity.end())
            })
            .hint(format!("usage: {}", op.usage()));
        return None;
    }
    // check both dates before giving up so that all mistakes are reported
    let from = validate_date(path, errs, &args[0]);
    let to = validate_date(path, errs, &args[1]);
    let command = match op {
        Op::ComputeIncome => Command::ComputeIncome { from: from?, to: to? },
        Op::Earn => {
            let value = validate_number(path, errs, &args[2], "amount")?;
            Command::Earn { from: from?, to: to?, value }
        }
        Op::Spend => {
            let value = validate_number(path, errs, &args[2], "amount")?;
            Command::Spend { from: from?, to: to?, value }
        }
        Op::PayTax => {
            let percent = match args.get(2) {
                Some(arg) => Some(validate_number(path, errs, arg, "tax rate")?),
                None => None,
            };
            Command::PayTax { from: from?, to: to?, percent }
        }
    };
    Some(Located { loc, command })
}

fn validate_date<'i>(path: &'i str, errs: &mut error::Record, arg: &Pair<'i>) -> Option<Date> {
    let loc = (path, arg.as_span());
    match arg.as_str().parse::<Date>() {
        Ok(date) => Some(date),
        Err(e) => {
            let label = match e {
                DateError::Malformed(_) => "Malformed date",
                _ => "Invalid date",
            };
            errs.make(label)
                .span(&loc, "provided here")
                .text(&e)
                .hint("choose a date that exists, written YYYY-MM-DD")
                .hint(e.fix_hint());
            None
        }
    }
}

fn validate_number<'i, T>(path: &'i str, errs: &mut error::Record, arg: &Pair<'i>, what: &str) -> Option<T>
where
    T: FromStr,
{
    let loc = (path, arg.as_span());
    let problem = if arg.as_rule() != Rule::number {
        format!("'{}' is not a non-negative integer", arg.as_str())
    } else {
        match arg.as_str().parse::<T>() {
            Ok(n) => return Some(n),
            Err(_) => format!("{} is too large", arg.as_str()),
        }
    };
    errs.make(format!("Invalid {}", what))
        .span(&loc, "provided here")
        .text(problem)
        .hint(format!("the {} is a whole number, e.g. 100", what));
    None
}
