//! Day-precise calendar dates over a bounded range
//!
//! Dates are `YYYY-MM-DD` in the range `2000-01-01 ..= 2099-12-31`,
//! not a number of seconds. Arithmetic goes through `index`, a bijection
//! between dates and integers, so that leap years never need to be
//! special-cased by callers.
//!
//! One extra date exists outside of the supported range: `Date::END`,
//! the day after `Date::MAX`. It cannot be constructed from user input,
//! it is only reachable through `Date::next` and serves as the upper
//! bound of every ledger.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use pest::Parser;
use pest_derive::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A date with day-precision
///
/// All methods execute in constant time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: u16,
    month: Month,
    day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month.number(), self.day)
    }
}

/// Twelve months in the year, identified by their 3-letter abbreviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan = 0,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// Month from its number in the year (`1` is January)
    pub fn from_number(n: i32) -> Option<Self> {
        n.checked_sub(1).and_then(Self::from_i32)
    }

    /// Number of the month in the year (`1` is January)
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Month directly succeeding the current one with wrapping
    pub fn next(self) -> Self {
        Self::from_u8((self as u8 + 1) % 12).unwrap_or(Month::Jan)
    }

    /// Number of days in this month of the given year
    pub fn count(self, year: u16) -> u8 {
        use Month::*;
        match self {
            Jan | Mar | May | Jul | Aug | Oct | Dec => 31,
            Apr | Jun | Sep | Nov => 30,
            Feb => {
                if is_leap(year) {
                    29
                } else {
                    28
                }
            }
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Ways in which a date taken from user input can be wrong
///
/// All variants but `Malformed` describe a well-shaped date that
/// does not exist (or is outside the supported range).
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DateError {
    /// year is outside of 2000..=2099
    #[error("{0} is outside of the supported range for years")]
    UnsupportedYear(i32),
    /// month outside of 1..=12
    #[error("{0} is not a valid month")]
    InvalidMonth(i32),
    /// Feb 29 of a non-leap year
    #[error("{0} is not bissextile, Feb 29 does not exist")]
    NotBissextile(i32),
    /// Feb 30 or Feb 31 or 31st day of a 30-day month
    #[error("{0} is a short month, it does not have a {1}th day")]
    MonthTooShort(Month, i32),
    /// day outside of 1..=31
    #[error("{0} is not a valid day")]
    InvalidDay(i32),
    /// text is not of the form `YYYY-MM-DD`
    #[error("'{0}' is not a date of the form YYYY-MM-DD")]
    Malformed(String),
}

impl DateError {
    /// What message to show to help fix the date error
    pub fn fix_hint(&self) -> String {
        use DateError::*;
        match self {
            UnsupportedYear(_) => "year should be between 2000 and 2099 inclusive".to_string(),
            InvalidMonth(m) => format!("{} is not in the range 1 ..= 12", m),
            NotBissextile(y) => format!("did you mean {y}-02-28 or {y}-03-01 ?", y = y),
            MonthTooShort(m, _) => format!(
                "{} is only {} days long",
                m,
                if *m == Month::Feb { "28 or 29" } else { "30" }
            ),
            InvalidDay(d) => format!("{} is not in the range 1 ..= 31", d),
            Malformed(_) => "write dates as four-digit year, two-digit month, two-digit day, e.g. 2000-01-31".to_string(),
        }
    }
}

#[derive(Parser)]
#[grammar = "util/date.pest"]
struct DateParser;

impl Date {
    /// First supported date
    pub const MIN: Date = Date { year: 2000, month: Month::Jan, day: 1 };
    /// Last supported date
    pub const MAX: Date = Date { year: 2099, month: Month::Dec, day: 31 };
    /// Day after `MAX`, not constructible from user input
    pub const END: Date = Date { year: 2100, month: Month::Jan, day: 1 };

    /// Validate year-month-day into date
    pub fn from(year: i32, month: i32, day: i32) -> Result<Self, DateError> {
        if !(2000..=2099).contains(&year) {
            return Err(DateError::UnsupportedYear(year));
        }
        let month = Month::from_number(month).ok_or(DateError::InvalidMonth(month))?;
        let year = year as u16;
        if !(1..=31).contains(&day) {
            Err(DateError::InvalidDay(day))
        } else if day <= month.count(year) as i32 {
            Ok(Self { year, month, day: day as u8 })
        } else if day >= 30 {
            Err(DateError::MonthTooShort(month, day))
        } else {
            Err(DateError::NotBissextile(year as i32))
        }
    }

    /// Whether `Date::from` would succeed
    pub fn validate(year: i32, month: i32, day: i32) -> bool {
        Self::from(year, month, day).is_ok()
    }

    /// `self.day` accessor
    pub fn day(&self) -> u8 {
        self.day
    }

    /// `self.month` accessor
    pub fn month(&self) -> Month {
        self.month
    }

    /// `self.year` accessor
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Biject the dates with integers
    ///
    /// This indexing is guaranteed consistent in the sense that
    /// for any date `d` before `Date::END`,
    ///
    /// ```
    /// # use bilan::util::date::Date;
    /// let d = Date::from(2024, 2, 28).unwrap();
    /// assert_eq!(d.index() + 1, d.next().index());
    /// assert_eq!(d.next().index() + 1, d.next().next().index());
    /// ```
    pub fn index(self) -> usize {
        let leaps = {
            let years = if self.month <= Month::Feb {
                self.year as usize - 1
            } else {
                self.year as usize
            };
            // count leap years before current
            (years / 4) - (years / 100) + (years / 400)
        };
        let mut n = self.year as usize * 365 + self.day as usize;
        // partially elapsed current year
        n += [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334][self.month as usize];
        n += leaps; // each leap year adds one day
        n
    }

    /// Signed number of days from `from` to `to`
    ///
    /// Positive when `to` is later than `from`.
    pub fn days_between(to: Date, from: Date) -> i64 {
        to.index() as i64 - from.index() as i64
    }

    /// The following day
    ///
    /// Saturates at `Date::END`: there is no day after it.
    pub fn next(self) -> Self {
        if self >= Self::END {
            Self::END
        } else if self.month.count(self.year) == self.day {
            if self.month == Month::Dec {
                Self { year: self.year + 1, month: Month::Jan, day: 1 }
            } else {
                Self { month: self.month.next(), day: 1, ..self }
            }
        } else {
            Self { day: self.day + 1, ..self }
        }
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        let malformed = || DateError::Malformed(s.to_string());
        let date = DateParser::parse(Rule::date, s)
            .map_err(|_| malformed())?
            .next()
            .ok_or_else(malformed)?;
        let mut fields = date
            .into_inner()
            .filter(|pair| pair.as_rule() != Rule::EOI)
            .map(|pair| pair.as_str().parse::<i32>());
        match (fields.next(), fields.next(), fields.next()) {
            (Some(Ok(year)), Some(Ok(month)), Some(Ok(day))) => Date::from(year, month, day),
            _ => Err(malformed()),
        }
    }
}

fn is_leap(year: u16) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

#[cfg(test)]
mod test {
    use super::{Month::*, *};

    #[test]
    fn bissextile_check() {
        macro_rules! yes {
            ( $y:expr ) => { assert!(is_leap($y)); }
        }
        macro_rules! no {
            ( $y:expr ) => { assert!(!is_leap($y)); }
        }
        yes!(2004);
        no!(2100);
        yes!(2000);
        no!(2001);
        no!(2010);
        yes!(2012);
    }

    macro_rules! ok {
        ( $y:tt - $m:tt - $d:tt ) => {
            let date = Date::from($y, $m, $d).unwrap();
            assert_eq!((date.year() as i32, date.month().number() as i32, date.day() as i32), ($y, $m, $d));
        }
    }
    macro_rules! short {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(
                Date::from($y, $m, $d),
                Err(DateError::MonthTooShort(Month::from_number($m).unwrap(), $d)),
            );
        }
    }
    macro_rules! nbiss {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Err(DateError::NotBissextile($y)));
        }
    }
    macro_rules! invalid {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Err(DateError::InvalidDay($d)));
        }
    }

    macro_rules! dt {
        ( $y:tt - $m:tt - $d:tt ) => {
            Date::from($y, $m, $d).unwrap()
        }
    }

    #[test]
    fn supported_bounds() {
        ok!(2000-1-1);
        ok!(2099-12-31);
        assert_eq!(dt!(2000-1-1), Date::MIN);
        assert_eq!(dt!(2099-12-31), Date::MAX);
        assert_eq!(Date::from(2100, 1, 1), Err(DateError::UnsupportedYear(2100)));
        assert_eq!(Date::from(1999, 12, 31), Err(DateError::UnsupportedYear(1999)));
    }

    #[test]
    fn negative_fields() {
        assert_eq!(Date::from(-1, 1, 1), Err(DateError::UnsupportedYear(-1)));
        assert_eq!(Date::from(2000, -1, 1), Err(DateError::InvalidMonth(-1)));
        assert_eq!(Date::from(2000, 1, -1), Err(DateError::InvalidDay(-1)));
        assert!(!Date::validate(-1, 1, 1));
        assert!(!Date::validate(2000, -1, 1));
        assert!(!Date::validate(2000, 1, -1));
        assert_eq!(Date::from(2000, 13, 1), Err(DateError::InvalidMonth(13)));
        assert_eq!(Date::from(2000, 0, 1), Err(DateError::InvalidMonth(0)));
    }

    #[test]
    fn long_months() {
        ok!(2020-1-31);
        ok!(2020-3-31);
        short!(2020-4-31);
        ok!(2020-5-31);
        short!(2020-6-31);
        ok!(2020-7-31);
        ok!(2020-8-31);
        short!(2020-9-31);
        ok!(2020-10-31);
        short!(2020-11-31);
        ok!(2020-12-31);
    }

    #[test]
    fn normal_days() {
        invalid!(2020-12-45);
        invalid!(2020-1-32);
        invalid!(2020-1-0);
        ok!(2020-3-20);
        ok!(2020-4-10);
    }

    #[test]
    fn february() {
        short!(2020-2-31);
        short!(2020-2-30);
        ok!(2020-2-29);
        ok!(2020-2-28);
        short!(2021-2-31);
        short!(2021-2-30);
        nbiss!(2021-2-29);
        ok!(2021-2-28);
    }

    #[test]
    fn leap_days_in_range() {
        for year in 2000..=2099 {
            assert_eq!(Date::validate(year, 2, 29), year % 4 == 0, "year {}", year);
        }
    }

    #[test]
    fn parse_exact_format() {
        assert_eq!("2000-01-01".parse::<Date>(), Ok(Date::MIN));
        assert_eq!("2099-12-31".parse::<Date>(), Ok(Date::MAX));
        assert_eq!("2020-02-29".parse::<Date>(), Ok(dt!(2020-2-29)));
    }

    #[test]
    fn parse_rejects_shape() {
        macro_rules! malformed {
            ( $s:expr ) => {
                assert_eq!($s.parse::<Date>(), Err(DateError::Malformed($s.to_string())));
            }
        }
        malformed!("20000101");
        malformed!("200001-01");
        malformed!("2000-0101");
        malformed!("2000-1-01");
        malformed!("2000-01-1");
        malformed!("02000-01-01");
        malformed!("2000-01-01 ");
        malformed!(" 2000-01-01");
        malformed!("2000-01-01x");
        malformed!("2000/01/01");
        malformed!("");
    }

    #[test]
    fn parse_rejects_impossible() {
        assert_eq!("2021-02-29".parse::<Date>(), Err(DateError::NotBissextile(2021)));
        assert_eq!("2100-01-01".parse::<Date>(), Err(DateError::UnsupportedYear(2100)));
        assert_eq!("2000-13-01".parse::<Date>(), Err(DateError::InvalidMonth(13)));
        assert_eq!("2000-04-31".parse::<Date>(), Err(DateError::MonthTooShort(Apr, 31)));
    }

    #[test]
    fn display_roundtrip() {
        for s in ["2000-01-01", "2004-02-29", "2099-12-31", "2050-10-05"] {
            assert_eq!(&format!("{}", s.parse::<Date>().unwrap()), s);
        }
        assert_eq!(&format!("{}", Date::END), "2100-01-01");
    }

    #[test]
    fn days_between() {
        assert_eq!(Date::days_between(dt!(2000-1-1), dt!(2000-1-1)), 0);
        assert_eq!(Date::days_between(dt!(2000-1-2), dt!(2000-1-1)), 1);
        assert_eq!(Date::days_between(dt!(2000-1-1), dt!(2000-1-2)), -1);
        assert_eq!(Date::days_between(dt!(2002-1-1), dt!(2001-1-1)), 365);
        assert_eq!(Date::days_between(dt!(2001-1-1), dt!(2000-1-1)), 366);
        assert_eq!(Date::days_between(Date::END, Date::MIN), 36525);
    }

    #[test]
    fn next_day() {
        assert_eq!(dt!(2020-1-1).next(), dt!(2020-1-2));
        assert_eq!(dt!(2020-1-31).next(), dt!(2020-2-1));
        assert_eq!(dt!(2020-2-28).next(), dt!(2020-2-29));
        assert_eq!(dt!(2021-2-28).next(), dt!(2021-3-1));
        assert_eq!(dt!(2020-4-30).next(), dt!(2020-5-1));
        assert_eq!(dt!(2020-12-31).next(), dt!(2021-1-1));
        assert_eq!(Date::MAX.next(), Date::END);
        assert_eq!(Date::END.next(), Date::END);
    }

    #[test]
    fn index_consistent() {
        let mut d = Date::MIN;
        while d < Date::END {
            let ds = d.next();
            let n = d.index() + 1;
            let ns = ds.index();
            if n != ns {
                panic!("date {}, successor {}, expected {} == {}", d, ds, n, ns);
            }
            d = ds;
        }
    }

    #[test]
    fn agrees_with_chrono() {
        let naive = |d: Date| {
            chrono::NaiveDate::from_ymd_opt(d.year() as i32, d.month().number() as u32, d.day() as u32)
                .unwrap()
        };
        let origin = naive(Date::MIN);
        let mut d = Date::MIN;
        let mut expected = naive(d);
        while d < Date::END {
            assert_eq!(naive(d), expected);
            assert_eq!(Date::days_between(d, Date::MIN), (expected - origin).num_days());
            d = d.next();
            expected = expected.succ_opt().unwrap();
        }
        assert_eq!(naive(Date::END), expected);
    }
}
