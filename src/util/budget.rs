//! Earnings and spendings over time
//!
//! `Budget` keeps two independent ledgers. Taxes only ever apply to
//! earnings, the income of a period is what was earned minus what was
//! spent during it.
//!
//! # Inverted ranges
//!
//! A range whose start is after its end is, by default, silently ignored:
//! `earn`, `spend` and `pay_tax` do nothing and report no error, and
//! `compute_income` returns zero. A caller cannot tell such a no-op apart
//! from a successful operation without checking the range itself.
//! `RangePolicy::Swap` reads these ranges backwards instead.

use thiserror::Error;
use tracing::debug;

use crate::util::{date::Date, ledger::Ledger};

/// What to do with a range `from ..= to` where `from > to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePolicy {
    /// do nothing
    #[default]
    Ignore,
    /// operate on `to ..= from`
    Swap,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BudgetError {
    #[error("{0}% is not a valid tax rate")]
    InvalidPercentage(u32),
}

impl BudgetError {
    /// What message to show to help fix the error
    pub fn fix_hint(&self) -> String {
        match self {
            BudgetError::InvalidPercentage(_) => "tax rates are between 0 and 100 inclusive".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Budget {
    earnings: Ledger,
    spendings: Ledger,
    policy: RangePolicy,
}

impl Budget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RangePolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    pub fn earnings(&self) -> &Ledger {
        &self.earnings
    }

    pub fn spendings(&self) -> &Ledger {
        &self.spendings
    }

    /// Apply the range policy, `None` if there is nothing to do
    fn range(&self, from: Date, to: Date) -> Option<(Date, Date)> {
        if from <= to {
            Some((from, to))
        } else {
            match self.policy {
                RangePolicy::Ignore => {
                    debug!(%from, %to, "ignoring inverted range");
                    None
                }
                RangePolicy::Swap => Some((to, from)),
            }
        }
    }

    /// Record `value` earned uniformly over `from ..= to`
    ///
    /// No-op on an inverted range under `RangePolicy::Ignore`.
    pub fn earn(&mut self, from: Date, to: Date, value: f64) {
        if let Some((from, to)) = self.range(from, to) {
            self.earnings.distribute_over(from, to, value);
        }
    }

    /// Record `value` spent uniformly over `from ..= to`
    ///
    /// No-op on an inverted range under `RangePolicy::Ignore`.
    pub fn spend(&mut self, from: Date, to: Date, value: f64) {
        if let Some((from, to)) = self.range(from, to) {
            self.spendings.distribute_over(from, to, value);
        }
    }

    /// Remove `percent`% of everything earned during `from ..= to`
    ///
    /// Fails if `percent > 100`, whatever the range. No-op on an inverted
    /// range under `RangePolicy::Ignore`.
    pub fn pay_tax(&mut self, from: Date, to: Date, percent: u32) -> Result<(), BudgetError> {
        let multiplier = Self::after_tax(1.0, percent)?;
        if let Some((from, to)) = self.range(from, to) {
            self.earnings.scale_range(from, to, multiplier);
        }
        Ok(())
    }

    /// Earnings minus spendings over `from ..= to`
    ///
    /// Zero on an inverted range under `RangePolicy::Ignore`.
    pub fn compute_income(&self, from: Date, to: Date) -> f64 {
        match self.range(from, to) {
            Some((from, to)) => {
                self.earnings.range_sum(from, to) - self.spendings.range_sum(from, to)
            }
            None => 0.0,
        }
    }

    /// What remains of `income` once taxed at `percent`%
    pub fn after_tax(income: f64, percent: u32) -> Result<f64, BudgetError> {
        if percent > 100 {
            return Err(BudgetError::InvalidPercentage(percent));
        }
        Ok((100 - percent) as f64 / 100.0 * income)
    }
}
