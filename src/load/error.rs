//! Pretty-printing facility for diagnostics on a command stream
//!
//! In fairness, this is mostly a wrapper around `pest::error::Error::new_from_span`,
//! the difficult part of the formatting is handled and `Error` only adds aggregation
//! of messages as well as colored output.
//!
//! # Example
//!
//! ```txt
//! errs.make("Invalid date")
//!     .span(&loc, "provided here")
//!     .text("2021 is not bissextile, Feb 29 does not exist")
//!     .hint("choose a date that exists")
//!     .hint("did you mean 2021-02-28 or 2021-03-01 ?");
//! ```
//!
//! ```txt
//! --> Error: Invalid date
//!  |   --> input.txt:3:6
//!  |    |
//!  |  3 | Earn 2021-02-29 2021-03-10 100
//!  |    |      ^--------^
//!  |    |
//!  |    = provided here
//!  |  2021 is not bissextile, Feb 29 does not exist
//!  |      ? hint: choose a date that exists
//!  |      ? hint: did you mean 2021-02-28 or 2021-03-01 ?
//! ```

use std::fmt;

use crate::load::parse::Rule;

/// Location of an error
///
/// Contains information on the input in which the error
/// occured and the precise span within that input
pub type Loc<'i> = (&'i str, pest::Span<'i>);

/// Report for a single error
///
/// All messages (`label` passed with `make`, arguments of `hint`
/// and `text`) should fit in a single line.
#[derive(Debug)]
pub struct Error {
    /// determines the error label (warning/error) and the color (yellow/red)
    fatal: bool,
    /// name of the error
    label: String,
    /// contents of the report, in order
    items: Vec<Item>,
}

/// Kinds of items that can be added to an error report
#[derive(Debug)]
enum Item {
    /// code block
    Block(Box<pest::error::Error<Rule>>),
    /// important message
    Text(String),
    /// recommendations for fixes
    Hint(String),
}

/// A collection of errors
///
/// Typically to keep record of all errors detected in one input,
/// but the structure itself makes no assumption regarding the
/// spatial or semantic relationship between these errors
#[must_use]
#[derive(Debug, Default)]
pub struct Record {
    /// how many are errors, the rest are warnings
    /// counts only `contents[..contents.len()-1]`
    fatal: usize,
    contents: Vec<Error>,
}

impl Error {
    fn new<S>(msg: S) -> Self
    where
        S: ToString,
    {
        Self {
            fatal: true,
            label: msg.to_string(),
            items: Vec::new(),
        }
    }

    /// Add a pre-existing error (e.g. to build from a parsing error)
    pub fn from(&mut self, err: pest::error::Error<Rule>) -> &mut Self {
        self.items
            .push(Item::Block(Box::new(err.renamed_rules(rule_rename))));
        self
    }

    /// Mark as a warning rather that a fatal error
    pub fn nonfatal(&mut self) -> &mut Self {
        self.fatal = false;
        self
    }

    /// Add a code block and its associated message
    pub fn span<S>(&mut self, loc: &Loc, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Block(Box::new(
            pest::error::Error::new_from_span(
                pest::error::ErrorVariant::CustomError {
                    message: msg.to_string(),
                },
                loc.1.clone(),
            )
            .with_path(loc.0),
        )));
        self
    }

    /// Add an important note
    pub fn text<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Text(msg.to_string()));
        self
    }

    /// Add a hint on how to fix
    pub fn hint<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Hint(msg.to_string()));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

impl Record {
    /// Initialize a new pool of errors (e.g. to record errors from another input)
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if any of the recorded errors are fatal
    pub fn is_fatal(&self) -> bool {
        self.fatal > 0 || self.last_is_fatal()
    }

    fn last_is_fatal(&self) -> bool {
        self.contents.last().map(|e| e.fatal).unwrap_or(false)
    }

    /// Number of fatal errors
    pub fn count_errors(&self) -> usize {
        self.fatal + if self.last_is_fatal() { 1 } else { 0 }
    }

    /// Number of nonfatal errors
    pub fn count_warnings(&self) -> usize {
        self.contents.len() - self.count_errors()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Recorded errors in order of appearance
    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.contents.iter()
    }

    /// Add a new error to the pool
    pub fn make<S>(&mut self, msg: S) -> &mut Error
    where
        S: ToString,
    {
        if self.last_is_fatal() {
            self.fatal += 1;
        }
        self.contents.push(Error::new(msg));
        let last = self.contents.len() - 1;
        &mut self.contents[last]
    }
}

const RED: &str = "\x1b[0;91;1m";
const YELLOW: &str = "\x1b[0;93;1m";
const BLUE: &str = "\x1b[0;96;1m";
const WHITE: &str = "\x1b[0;1m";
const NONE: &str = "\x1b[0m";

/// How many reports are printed in full before the rest is summarized
const SHOWN: usize = 10;

impl Error {
    fn color(&self) -> &'static str {
        if self.fatal {
            RED
        } else {
            YELLOW
        }
    }
}

/// Write one line of a pest code block with its markup highlighted
fn write_block_line(f: &mut fmt::Formatter<'_>, color: &str, line: &str) -> fmt::Result {
    write!(f, " {}|  {}", color, BLUE)?;
    for c in line.chars() {
        match c {
            '|' | '=' => write!(f, "{}{}", c, NONE)?,
            '^' => write!(f, "{}^", color)?,
            // pest shows line endings as a visible symbol
            '␊' => (),
            _ => write!(f, "{}", c)?,
        }
    }
    writeln!(f, "{}", NONE)
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = self.color();
        let kind = if self.fatal { "Error" } else { "Warning" };
        writeln!(f, "{}--> {}:{} {}{}", color, kind, WHITE, self.label, NONE)?;
        for item in &self.items {
            match item {
                Item::Block(block) => {
                    for line in block.to_string().lines() {
                        write_block_line(f, color, line)?;
                    }
                }
                Item::Text(txt) => writeln!(f, " {}|  {}{}{}", color, WHITE, txt, NONE)?,
                Item::Hint(txt) => writeln!(f, " {}|      {}? hint: {}{}", color, BLUE, NONE, txt)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    /// Only reports of the highest severity present are printed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let fatal = self.is_fatal();
        let (color, severity, kind, count) = if fatal {
            (RED, "Fatal", "error", self.count_errors())
        } else {
            (YELLOW, "Nonfatal", "warning", self.count_warnings())
        };
        let mut reports = self.iter().filter(|err| err.fatal == fatal);
        for err in reports.by_ref().take(SHOWN) {
            writeln!(f, "{}", err)?;
        }
        let hidden = reports.count();
        if hidden > 0 {
            writeln!(f, "{} And {} more.", color, hidden)?;
        }
        writeln!(
            f,
            "{}{}: {}{} {}{} emitted{}",
            color,
            severity,
            WHITE,
            count,
            kind,
            if count == 1 { "" } else { "s" },
            NONE,
        )
    }
}

fn rule_rename(r: &Rule) -> String {
    String::from(match r {
        Rule::EOI => "end of input",
        Rule::number => "a non-negative integer",
        Rule::word => "an argument",
        Rule::operation => "an operation name (ComputeIncome, Earn, Spend, PayTax)",
        Rule::line => "a command 'Operation FROM TO [VALUE]'",
        Rule::program => "a sequence of commands, one per line",
        #[allow(unreachable_patterns)]
        _ => "a separator",
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn loc(input: &str) -> Loc<'_> {
        ("test", pest::Span::new(input, 0, input.len()).unwrap())
    }

    #[test]
    fn counts_fatality() {
        let input = "Earn 2000-01-01";
        let mut errs = Record::new();
        assert!(!errs.is_fatal());
        assert!(errs.is_empty());
        errs.make("Missing commands").nonfatal().span(&loc(input), "here");
        assert!(!errs.is_fatal());
        assert_eq!(errs.count_warnings(), 1);
        errs.make("Invalid date").text("bad").hint("fix it");
        assert!(errs.is_fatal());
        errs.make("Another").nonfatal();
        assert_eq!(errs.count_errors(), 1);
        assert_eq!(errs.count_warnings(), 2);
        let labels = errs.iter().map(|e| e.label()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["Missing commands", "Invalid date", "Another"]);
    }

    #[test]
    fn display_mentions_everything() {
        let input = "Earn 2021-02-29 2021-03-10 100";
        let mut errs = Record::new();
        errs.make("Invalid date")
            .span(&loc(input), "provided here")
            .text("2021 is not bissextile")
            .hint("choose a date that exists");
        let shown = format!("{}", errs);
        assert!(shown.contains("Invalid date"));
        assert!(shown.contains("provided here"));
        assert!(shown.contains("2021 is not bissextile"));
        assert!(shown.contains("hint:"));
        assert!(shown.contains("1 error emitted"));
    }

    #[test]
    fn display_keeps_highest_severity() {
        let mut errs = Record::new();
        errs.make("Missing commands").nonfatal();
        for i in 0..12 {
            errs.make(format!("Invalid amount #{}", i));
        }
        let shown = format!("{}", errs);
        assert!(!shown.contains("Missing commands"));
        assert!(shown.contains("Invalid amount #9"));
        assert!(!shown.contains("Invalid amount #10"));
        assert!(shown.contains("And 2 more."));
        assert!(shown.contains("12 errors emitted"));
    }

    #[test]
    fn display_warnings_only() {
        let mut errs = Record::new();
        errs.make("Unexpected commands").nonfatal().hint("update the count");
        let shown = format!("{}", errs);
        assert!(shown.contains("--> Warning:"));
        assert!(shown.contains("1 warning emitted"));
        assert_eq!(format!("{}", Record::new()), "");
    }
}
