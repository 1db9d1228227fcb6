//! Amounts attributed to day ranges, stored as a step function
//!
//! A `Ledger` is an ordered set of breakpoints. The value stored at a
//! breakpoint `k` whose predecessor is `p` is the total amount attributed
//! to the days `p ..< k` (not a per-day rate). Reading the ledger at a
//! finer granularity than its breakpoints prorates a span by its number
//! of days.
//!
//! Two sentinels, `Date::MIN` and `Date::END`, are present from the start
//! and bound every span. Breakpoints are only ever added, so the ledger
//! grows with the number of distinct range edges it has seen (at most one
//! per day of the supported range).

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};

use tracing::{debug, trace};

use crate::util::date::Date;

/// Relative error tolerated when checking that a split conserves its span
const SPLIT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    breakpoints: BTreeMap<Date, f64>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Ledger holding only the two zero-valued sentinels
    pub fn new() -> Self {
        let mut breakpoints = BTreeMap::new();
        breakpoints.insert(Date::MIN, 0.0);
        breakpoints.insert(Date::END, 0.0);
        Self { breakpoints }
    }

    /// Number of breakpoints, sentinels included
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    /// Sum of all lump values
    pub fn total(&self) -> f64 {
        self.breakpoints.values().sum()
    }

    /// Breakpoints in increasing order with their lump value
    pub fn breakpoints(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.breakpoints.iter().map(|(date, value)| (*date, *value))
    }

    /// First breakpoint strictly after `date`
    fn after(&self, date: Date) -> Option<(Date, f64)> {
        self.breakpoints
            .range((Excluded(date), Unbounded))
            .next()
            .map(|(date, value)| (*date, *value))
    }

    /// Last breakpoint not after `date`
    fn not_after(&self, date: Date) -> Date {
        self.breakpoints
            .range(..=date)
            .next_back()
            .map(|(date, _)| *date)
            .unwrap_or_else(|| panic!("No breakpoint before {}: lower sentinel is missing", date))
    }

    /// Portion of the span enclosing `date` that is attributed to
    /// `date` and the days after it
    ///
    /// Nothing lies after the terminal sentinel, so its share is zero.
    fn share_after(&self, date: Date) -> f64 {
        match self.after(date) {
            None => 0.0,
            Some((next, value)) => {
                let prev = self.not_after(date);
                value * Date::days_between(next, date) as f64
                    / Date::days_between(next, prev) as f64
            }
        }
    }

    /// Make `date` a breakpoint
    ///
    /// If the date is already a breakpoint nothing changes. Otherwise the
    /// span `prev ..< next` that contains it is split in two, and its lump
    /// value is shared between `date` and `next` in proportion to the number
    /// of days on each side. No other breakpoint is affected and the total
    /// value of the ledger is unchanged.
    pub fn ensure_boundary(&mut self, date: Date) -> Date {
        if self.breakpoints.contains_key(&date) {
            return date;
        }
        let (next, value) = self
            .after(date)
            .unwrap_or_else(|| panic!("No breakpoint after {}: upper sentinel is missing", date));
        let prev = self.not_after(date);
        debug_assert!(
            Date::days_between(date, prev) > 0 && Date::days_between(next, date) > 0,
            "{} is not strictly inside the span {} ..< {}",
            date,
            prev,
            next,
        );
        let span = Date::days_between(next, prev) as f64;
        let before = value * Date::days_between(date, prev) as f64 / span;
        let after = value * Date::days_between(next, date) as f64 / span;
        debug_assert!(
            (before + after - value).abs() <= SPLIT_TOLERANCE * value.abs().max(1.0),
            "splitting {} at {} does not conserve value: {} + {} != {}",
            next,
            date,
            before,
            after,
            value,
        );
        trace!(%date, %prev, %next, before, after, "split span");
        self.breakpoints.insert(next, after);
        self.breakpoints.insert(date, before);
        date
    }

    /// Add `amount` to the days `from ..= to`, spread uniformly per day
    ///
    /// Does nothing if `from > to`.
    pub fn distribute_over(&mut self, from: Date, to: Date, amount: f64) {
        if from > to {
            return;
        }
        let begin = self.ensure_boundary(from);
        let end = self.ensure_boundary(to.next());
        let days = Date::days_between(end, begin) as f64;
        let mut cur = begin;
        let mut touched = 0;
        for (&date, value) in self.breakpoints.range_mut((Excluded(begin), Included(end))) {
            *value += amount * Date::days_between(date, cur) as f64 / days;
            cur = date;
            touched += 1;
        }
        debug!(%from, %to, amount, touched, "distributed amount");
    }

    /// Multiply everything attributed to the days `from ..= to` by `multiplier`
    ///
    /// Does nothing if `from > to`.
    pub fn scale_range(&mut self, from: Date, to: Date, multiplier: f64) {
        if from > to {
            return;
        }
        let begin = self.ensure_boundary(from);
        let end = self.ensure_boundary(to.next());
        let mut touched = 0;
        for (_, value) in self.breakpoints.range_mut((Excluded(begin), Included(end))) {
            *value *= multiplier;
            touched += 1;
        }
        debug!(%from, %to, multiplier, touched, "scaled range");
    }

    /// Total attributed to the days `from ..= to`
    ///
    /// Read-only: partial spans at both ends are prorated on the fly,
    /// no breakpoint is inserted. An inverted range sums to zero.
    pub fn range_sum(&self, from: Date, to: Date) -> f64 {
        if from > to {
            return 0.0;
        }
        let end = to.next();
        let mut sum = self.share_after(from);
        if let Some((first, _)) = self.after(from) {
            let upper = match self.after(end) {
                Some((last, _)) => Included(last),
                None => Unbounded,
            };
            sum += self
                .breakpoints
                .range((Excluded(first), upper))
                .map(|(_, value)| value)
                .sum::<f64>();
        }
        sum - self.share_after(end)
    }
}
