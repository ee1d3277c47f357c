//! # Timezone
//! The UTC offset of the device, held in half-hour steps between -12 h and +12 h.

use crate::time::TimeSource;
use core::fmt::Write;
use heapless::String;

/// Seconds per half-hour step
const SECONDS_PER_STEP: i32 = 1800;

/// Lowest offset, -12 h
const MIN_HALF_HOURS: i8 = -24;

/// Highest offset, +12 h
const MAX_HALF_HOURS: i8 = 24;

/// The UTC offset in half hours, always within `-24..=24`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timezone {
    /// Offset in half-hour units, `7` meaning +3:30
    half_hours: i8,
}

impl Timezone {
    /// UTC
    pub const UTC: Self = Self { half_hours: 0 };

    /// Create a timezone from half-hour units, `None` when outside ±12 h
    pub const fn from_half_hours(half_hours: i8) -> Option<Self> {
        if half_hours < MIN_HALF_HOURS || half_hours > MAX_HALF_HOURS {
            None
        } else {
            Some(Self { half_hours })
        }
    }

    /// The offset in half-hour units
    pub const fn half_hours(&self) -> i8 {
        self.half_hours
    }

    /// The offset in seconds, as pushed to the time source
    pub const fn offset_seconds(&self) -> i32 {
        self.half_hours as i32 * SECONDS_PER_STEP
    }

    /// Move half an hour east. Returns `false` and leaves the offset alone at +12 h.
    pub const fn increment(&mut self) -> bool {
        if self.half_hours >= MAX_HALF_HOURS {
            return false;
        }
        self.half_hours += 1;
        true
    }

    /// Move half an hour west. Returns `false` and leaves the offset alone at -12 h.
    pub const fn decrement(&mut self) -> bool {
        if self.half_hours <= MIN_HALF_HOURS {
            return false;
        }
        self.half_hours -= 1;
        true
    }

    /// Push the offset to the time source
    pub fn apply<T: TimeSource>(&self, clock: &mut T) {
        clock.set_utc_offset(self.offset_seconds());
    }

    /// Render as `+HH` or `+HH:30`, with `-` for negative offsets
    pub fn format(&self) -> String<8> {
        let sign = if self.half_hours < 0 { '-' } else { '+' };
        let magnitude = self.half_hours.unsigned_abs();
        let hours = magnitude / 2;

        let mut s = String::new();
        let _ = if magnitude % 2 == 0 {
            write!(s, "{sign}{hours:02}")
        } else {
            write!(s, "{sign}{hours:02}:30")
        };
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{LocalTime, TimeSource};
    use crate::Error;

    struct RecordingClock {
        offset: Option<i32>,
    }

    impl TimeSource for RecordingClock {
        fn set_utc_offset(&mut self, seconds: i32) {
            self.offset = Some(seconds);
        }

        fn now(&mut self) -> Result<LocalTime, Error> {
            Err(Error::TimeUnavailable)
        }
    }

    #[test]
    fn increments_saturate_at_plus_twelve() {
        let mut tz = Timezone::UTC;
        for _ in 0..30 {
            tz.increment();
        }
        assert_eq!(tz.half_hours(), 24);
        assert!(!tz.increment());
        assert_eq!(tz.format().as_str(), "+12");
    }

    #[test]
    fn decrements_saturate_at_minus_twelve() {
        let mut tz = Timezone::UTC;
        for _ in 0..30 {
            tz.decrement();
        }
        assert_eq!(tz.half_hours(), -24);
        assert!(!tz.decrement());
        assert_eq!(tz.format().as_str(), "-12");
    }

    #[test]
    fn offset_stays_in_range_for_any_walk() {
        let mut tz = Timezone::UTC;
        let walk = [3_i32, -40, 17, 9, -2, 50, -11];
        for steps in walk {
            for _ in 0..steps.unsigned_abs() {
                if steps > 0 {
                    tz.increment();
                } else {
                    tz.decrement();
                }
                assert!((-24..=24).contains(&tz.half_hours()));
                assert_eq!(tz.offset_seconds() % 1800, 0);
            }
        }
    }

    #[test]
    fn formats_half_hour_offsets() {
        let cases = [
            (15, "+07:30"),
            (0, "+00"),
            (-1, "-00:30"),
            (-7, "-03:30"),
            (10, "+05"),
            (11, "+05:30"),
        ];
        for (half_hours, expected) in cases {
            let tz = Timezone::from_half_hours(half_hours).unwrap();
            assert_eq!(tz.format().as_str(), expected);
        }
    }

    #[test]
    fn rejects_out_of_range_construction() {
        assert!(Timezone::from_half_hours(25).is_none());
        assert!(Timezone::from_half_hours(-25).is_none());
    }

    #[test]
    fn apply_pushes_seconds() {
        let mut clock = RecordingClock { offset: None };
        Timezone::from_half_hours(11).unwrap().apply(&mut clock);
        assert_eq!(clock.offset, Some(19_800));
    }
}
