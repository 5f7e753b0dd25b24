//! Clock arithmetic on minute offsets and hour tenths.

use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Hours multiplied by ten. Keeps solver arithmetic integral.
pub type Tenths = i64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("malformed time {0:?}, expected HH:MM")]
    Malformed(String),
    #[error("time {0:?} is out of range")]
    OutOfRange(String),
}

/// Parses `HH:MM` (one or two digits each) into minutes after midnight.
pub fn time_to_minutes(value: &str) -> Result<u32, TimeError> {
    let malformed = || TimeError::Malformed(value.to_owned());
    let (hours, minutes) = value.split_once(':').ok_or_else(malformed)?;
    let parse = |part: &str| {
        if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        part.parse::<u32>().map_err(|_| malformed())
    };
    let (hours, minutes) = (parse(hours)?, parse(minutes)?);
    if hours > 23 || minutes > 59 {
        return Err(TimeError::OutOfRange(value.to_owned()));
    }
    Ok(hours * 60 + minutes)
}

/// Strict wire syntax: exactly two digits, a colon, two digits.
#[must_use]
pub fn is_hh_mm(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[2] == b':'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit)
}

/// End of an interval on its own day: an end at or before the start means the
/// interval runs past midnight, so it is cut at 24:00. `00:00-00:00` stays empty.
const fn effective_end(start: u32, end: u32) -> u32 {
    if end <= start && !(start == 0 && end == 0) {
        MINUTES_PER_DAY
    } else {
        end
    }
}

/// Whether a shift and an unavailability window intersect, or the window
/// covers the whole shift. Both may be cross-day, in which case only their
/// part before midnight is considered.
#[must_use]
pub const fn intervals_overlap_or_cover(
    shift_start: u32,
    shift_end: u32,
    unavailable_start: u32,
    unavailable_end: u32,
) -> bool {
    let shift_end = effective_end(shift_start, shift_end);
    let unavailable_end = effective_end(unavailable_start, unavailable_end);
    if unavailable_end == 0 || shift_end <= shift_start {
        return false;
    }
    let overlap = shift_start < unavailable_end && unavailable_start < shift_end;
    let covers = unavailable_start <= shift_start && unavailable_end >= shift_end;
    overlap || covers
}

/// A clock interval. `end <= start` (other than `00:00-00:00`) wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start: u32,
    pub end: u32,
}

impl TimeWindow {
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeError> {
        Ok(Self {
            start: time_to_minutes(start)?,
            end: time_to_minutes(end)?,
        })
    }

    #[must_use]
    pub const fn is_cross_day(&self) -> bool {
        self.end <= self.start && !(self.start == 0 && self.end == 0)
    }

    /// Length in minutes, following the wrap for cross-day windows.
    #[must_use]
    pub const fn duration_minutes(&self) -> u32 {
        if self.end > self.start {
            self.end - self.start
        } else {
            self.end + MINUTES_PER_DAY - self.start
        }
    }

    /// The part after midnight, expressed on the following day.
    #[must_use]
    pub const fn spill_over(&self) -> Option<Self> {
        if self.is_cross_day() && self.end > 0 {
            Some(Self {
                start: 0,
                end: self.end,
            })
        } else {
            None
        }
    }

    /// Treats `self` as a shift and `unavailable` as an unavailability window.
    #[must_use]
    pub const fn is_blocked_by(&self, unavailable: &Self) -> bool {
        intervals_overlap_or_cover(self.start, self.end, unavailable.start, unavailable.end)
    }
}

/// Rounds to the nearest tenth, for shift durations.
#[must_use]
pub fn hours_to_tenths(hours: f64) -> Tenths {
    (hours * 10.0).round() as Tenths
}

/// Rounds down, so a configured maximum is never exceeded.
#[must_use]
pub fn hours_to_tenths_floor(hours: f64) -> Tenths {
    (hours * 10.0 + 1e-9).floor() as Tenths
}

/// Rounds up, so a configured minimum is fully covered.
#[must_use]
pub fn hours_to_tenths_ceil(hours: f64) -> Tenths {
    (hours * 10.0 - 1e-9).ceil() as Tenths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(time_to_minutes("00:00"), Ok(0));
        assert_eq!(time_to_minutes("19:00"), Ok(1140));
        assert_eq!(time_to_minutes("23:59"), Ok(1439));
        assert_eq!(time_to_minutes("9:05"), Ok(545));
    }

    #[test]
    fn rejects_invalid_times() {
        assert!(matches!(time_to_minutes("24:00"), Err(TimeError::OutOfRange(_))));
        assert!(matches!(time_to_minutes("12:60"), Err(TimeError::OutOfRange(_))));
        assert!(matches!(time_to_minutes("1200"), Err(TimeError::Malformed(_))));
        assert!(matches!(time_to_minutes("ab:cd"), Err(TimeError::Malformed(_))));
        assert!(matches!(time_to_minutes(""), Err(TimeError::Malformed(_))));
        assert!(matches!(time_to_minutes("-1:30"), Err(TimeError::Malformed(_))));
    }

    #[test]
    fn strict_format() {
        assert!(is_hh_mm("07:30"));
        assert!(!is_hh_mm("7:30"));
        assert!(!is_hh_mm("07-30"));
    }

    #[test]
    fn same_day_overlap() {
        // 12:00-19:00 vs 18:00-20:00
        assert!(intervals_overlap_or_cover(720, 1140, 1080, 1200));
        // touching intervals do not overlap
        assert!(!intervals_overlap_or_cover(720, 1140, 1140, 1200));
        assert!(!intervals_overlap_or_cover(720, 1140, 600, 720));
    }

    #[test]
    fn cross_day_unavailability_runs_to_midnight() {
        // unavailable 23:00-03:00 blocks an evening shift 19:00-23:30
        assert!(intervals_overlap_or_cover(1140, 1410, 1380, 180));
        // but not a morning shift on the same day
        assert!(!intervals_overlap_or_cover(360, 720, 1380, 180));
    }

    #[test]
    fn cross_day_shift_and_window() {
        // shift 19:00-02:00 and unavailable 19:00-02:00
        assert!(intervals_overlap_or_cover(1140, 120, 1140, 120));
        // shift 19:00-02:00 and unavailable 12:00-19:00
        assert!(!intervals_overlap_or_cover(1140, 120, 720, 1140));
    }

    #[test]
    fn degenerate_window_blocks_nothing() {
        assert!(!intervals_overlap_or_cover(0, 600, 0, 0));
    }

    #[test]
    fn spill_over_part() {
        let window = TimeWindow::parse("23:00", "03:00").unwrap();
        assert!(window.is_cross_day());
        assert_eq!(window.duration_minutes(), 240);
        assert_eq!(window.spill_over(), Some(TimeWindow { start: 0, end: 180 }));
        let until_midnight = TimeWindow::parse("19:00", "00:00").unwrap();
        assert_eq!(until_midnight.spill_over(), None);
    }

    #[test]
    fn tenths_rounding() {
        assert_eq!(hours_to_tenths(7.0), 70);
        assert_eq!(hours_to_tenths(5.25), 53);
        assert_eq!(hours_to_tenths_floor(10.05), 100);
        assert_eq!(hours_to_tenths_floor(10.0), 100);
        assert_eq!(hours_to_tenths_ceil(10.01), 101);
        assert_eq!(hours_to_tenths_ceil(30.0), 300);
    }
}
