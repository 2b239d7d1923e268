//! Simulation year range and the per-day frame sequence.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// The frame count for a year span deliberately ignores leap days: a span
/// of N years is exactly N * 365 frames.
pub const DAYS_PER_YEAR: i64 = 365;

/// Days-from-CE offset of the Julian day number (JDN of 0001-01-01 is
/// 1721426, chrono counts that date as day 1).
const JD_CE_OFFSET: f64 = 1_721_425.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("end year {end} must be after start year {start}")]
    EndNotAfterStart { start: i32, end: i32 },

    #[error("step must be at least one day")]
    ZeroStep,

    #[error("year {0} is outside the supported calendar")]
    BadYear(i32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimRange {
    pub start_year: i32,
    pub end_year: i32,
    pub step_days: i64,
}

impl SimRange {
    pub fn new(start_year: i32, end_year: i32, step_days: i64) -> Result<Self, RangeError> {
        if end_year <= start_year {
            return Err(RangeError::EndNotAfterStart {
                start: start_year,
                end: end_year,
            });
        }
        if step_days < 1 {
            return Err(RangeError::ZeroStep);
        }
        Ok(SimRange {
            start_year,
            end_year,
            step_days,
        })
    }
}

/// Julian date of January 1 of `year` at 00:00 UTC.
pub fn year_start_jd(year: i32) -> Result<f64, RangeError> {
    let date = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(RangeError::BadYear(year))?;
    Ok(date.num_days_from_ce() as f64 + JD_CE_OFFSET - 0.5)
}

/// Civil date containing the given Julian date instant.
pub fn jd_to_date(jd: f64) -> Option<NaiveDate> {
    let days = (jd + 0.5).floor() - JD_CE_OFFSET;
    NaiveDate::from_num_days_from_ce_opt(days as i32)
}

/// A finite, restartable sequence of frame epochs. Regenerated from the
/// current range on every simulation start, never reused across runs.
pub struct TimeSequence {
    jds: Vec<f64>,
    step_days: i64,
}

impl TimeSequence {
    pub fn generate(range: SimRange) -> Result<Self, RangeError> {
        // Fields are public; re-validate in case the range was built literally.
        let range = SimRange::new(range.start_year, range.end_year, range.step_days)?;
        let base = year_start_jd(range.start_year)?;
        let total_days = (range.end_year - range.start_year) as i64 * DAYS_PER_YEAR;
        let jds = (0..total_days)
            .step_by(range.step_days as usize)
            .map(|day| base + day as f64)
            .collect();
        Ok(TimeSequence {
            jds,
            step_days: range.step_days,
        })
    }

    pub fn empty() -> Self {
        TimeSequence {
            jds: Vec::new(),
            step_days: 1,
        }
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.jds.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.jds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jds.is_empty()
    }

    pub fn step_days(&self) -> i64 {
        self.step_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_year_is_365_frames() {
        let seq = TimeSequence::generate(SimRange::new(2000, 2001, 1).unwrap()).unwrap();
        assert_eq!(seq.len(), 365);
        assert_eq!(seq.get(0), Some(2_451_544.5)); // 2000-01-01 00:00
        assert_eq!(seq.get(1), Some(2_451_545.5));
        assert_eq!(seq.get(365), None);
    }

    #[test]
    fn step_thins_the_sequence() {
        let seq = TimeSequence::generate(SimRange::new(2000, 2001, 7).unwrap()).unwrap();
        assert_eq!(seq.len(), 53); // ceil(365 / 7)
        assert_eq!(seq.get(1), Some(2_451_544.5 + 7.0));
        assert_eq!(seq.step_days(), 7);
    }

    #[test]
    fn regeneration_honors_new_years() {
        let first = TimeSequence::generate(SimRange::new(2000, 2001, 1).unwrap()).unwrap();
        let second = TimeSequence::generate(SimRange::new(1900, 1902, 1).unwrap()).unwrap();
        assert_ne!(first.get(0), second.get(0));
        assert_eq!(second.len(), 730);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert_eq!(
            SimRange::new(2001, 2000, 1),
            Err(RangeError::EndNotAfterStart {
                start: 2001,
                end: 2000
            })
        );
        assert_eq!(
            SimRange::new(2000, 2000, 1),
            Err(RangeError::EndNotAfterStart {
                start: 2000,
                end: 2000
            })
        );
        assert_eq!(SimRange::new(2000, 2001, 0), Err(RangeError::ZeroStep));
    }

    #[test]
    fn calendar_conversions() {
        assert_eq!(year_start_jd(2000), Ok(2_451_544.5));
        assert_eq!(year_start_jd(1900), Ok(2_415_020.5));

        let date = jd_to_date(2_451_544.5).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2000, 1, 1));
        let date = jd_to_date(2_440_422.5).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (1969, 7, 20));
    }

    #[test]
    fn year_zero_is_a_valid_start() {
        // DE422 coverage begins before year 1; proleptic Gregorian handles it.
        let seq = TimeSequence::generate(SimRange::new(0, 1, 1).unwrap()).unwrap();
        assert_eq!(seq.len(), 365);
        assert_eq!(jd_to_date(seq.get(0).unwrap()).unwrap().year(), 0);
    }
}
