// Day numbering inside the reference year.
//
// All series share one time axis: a 1-based day count from January 1st of
// `REFERENCE_YEAR`. Rows from the year before are accepted but land on a
// single `Day::PriorYear` slot that is never plotted.
use crate::error::{FeedError, Result};
use serde::Serialize;

pub const REFERENCE_YEAR: i32 = 2020;

// Fixed month lengths, February included at 28 days. Day ordinals after
// February are therefore one behind the real 2020 calendar, and 29 February
// rows are invalid dates: they are skipped and excluded from every total.
const MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Position of a record on the series time axis.
///
/// `PriorYear` sorts before every in-year ordinal, so day-indexed maps keep
/// last year's contributions at the front where series building skips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Day {
    PriorYear,
    Ordinal(u32),
}

impl Day {
    pub fn ordinal(self) -> Option<u32> {
        match self {
            Day::PriorYear => None,
            Day::Ordinal(n) => Some(n),
        }
    }

    pub fn week(self) -> u32 {
        match self {
            Day::PriorYear => 0,
            Day::Ordinal(n) => week_index(n),
        }
    }
}

/// Map a calendar date onto the reference-year time axis.
///
/// The prior year short-circuits to `Day::PriorYear` before month and day are
/// looked at. Anything older, any later year, or a month/day outside the fixed
/// table is an `InvalidDate`.
pub fn day_ordinal(year: i32, month: u32, day: u32) -> Result<Day> {
    if year == REFERENCE_YEAR - 1 {
        return Ok(Day::PriorYear);
    }
    let invalid = || FeedError::InvalidDate { year, month, day };
    if year != REFERENCE_YEAR {
        return Err(invalid());
    }
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    let idx = (month - 1) as usize;
    if day < 1 || day > MONTH_DAYS[idx] {
        return Err(invalid());
    }
    let before: u32 = MONTH_DAYS[..idx].iter().sum();
    Ok(Day::Ordinal(before + day))
}

/// Week number for a day ordinal. January 1st 2020 was a Tuesday, so the
/// first partial week (days 1 to 5) is week 0 and weeks start on Mondays.
pub fn week_index(ordinal: u32) -> u32 {
    if ordinal < 6 {
        return 0;
    }
    1 + (ordinal - 6) / 7
}
