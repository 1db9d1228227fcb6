//! Execution of commands against a budget

use std::io::{self, Write};

use tracing::{info, warn};

use crate::cli::settings::Settings;
use crate::load::{
    error,
    parse::{Command, Located},
};
use crate::util::budget::Budget;

/// Printed for every operation that is not understood
pub const UNSUPPORTED: &str = "Operation is not supported";

/// A budget and where to print query results
pub struct Session<W> {
    budget: Budget,
    tax: u32,
    precision: Option<usize>,
    out: W,
}

impl<W> Session<W>
where
    W: Write,
{
    pub fn new(settings: &Settings, out: W) -> Self {
        Self {
            budget: Budget::with_policy(settings.policy),
            tax: settings.tax,
            precision: settings.precision,
            out,
        }
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Execute all commands in order
    ///
    /// Commands that fail are recorded in `errs` and do not stop the
    /// others. Only failing to write output interrupts the session.
    pub fn run(&mut self, commands: &[Located], errs: &mut error::Record) -> io::Result<()> {
        for command in commands {
            self.execute(command, errs)?;
        }
        info!(
            commands = commands.len(),
            earnings = self.budget.earnings().len(),
            spendings = self.budget.spendings().len(),
            "session done, breakpoints in use",
        );
        self.out.flush()
    }

    pub fn execute(&mut self, located: &Located, errs: &mut error::Record) -> io::Result<()> {
        match &located.command {
            Command::ComputeIncome { from, to } => {
                let income = self.budget.compute_income(*from, *to);
                match self.precision {
                    Some(digits) => writeln!(self.out, "{:.*}", digits, income)?,
                    None => writeln!(self.out, "{}", income)?,
                }
            }
            Command::Earn { from, to, value } => self.budget.earn(*from, *to, *value as f64),
            Command::Spend { from, to, value } => self.budget.spend(*from, *to, *value as f64),
            Command::PayTax { from, to, percent } => {
                let percent = percent.unwrap_or(self.tax);
                if let Err(e) = self.budget.pay_tax(*from, *to, percent) {
                    errs.make("Invalid tax rate")
                        .span(&located.loc, "provided here")
                        .text(&e)
                        .hint(e.fix_hint());
                }
            }
            Command::Unsupported(name) => {
                warn!(operation = %name, "unsupported operation");
                writeln!(self.out, "{}", UNSUPPORTED)?;
            }
        }
        Ok(())
    }
}
