//! # Wall-clock time
//! Broken-down local time, the [`TimeSource`] seam the firmware implements, and the
//! civil-date arithmetic needed to shift a UTC reading by the configured offset.

use crate::Error;

/// Seconds per day
const SECONDS_PER_DAY: i64 = 86_400;

/// Days from 0000-03-01 to 1970-01-01 in the proleptic Gregorian calendar
const DAYS_TO_UNIX_EPOCH: i64 = 719_468;

/// Days in one 400-year Gregorian cycle
const DAYS_PER_ERA: i64 = 146_097;

/// Supplies the current time, already adjusted by the pushed UTC offset
pub trait TimeSource {
    /// Set the offset, in seconds, that `now` adds to UTC
    fn set_utc_offset(&mut self, seconds: i32);

    /// The current adjusted time, or [`Error::TimeUnavailable`]
    fn now(&mut self) -> Result<LocalTime, Error>;
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Weekdays starting on Monday
    const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// The English name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Weekday of a day counted from 1970-01-01, which was a Thursday
    fn from_unix_days(days: i64) -> Self {
        // rem_euclid keeps the index in 0..7
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = (days + 3).rem_euclid(7) as usize;
        Self::ALL[index]
    }
}

/// Broken-down wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalTime {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
    pub weekday: Weekday,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// 0-59
    pub second: u8,
}

impl LocalTime {
    /// Break down seconds since 1970-01-01T00:00:00
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_unix(seconds: i64) -> Self {
        let days = seconds.div_euclid(SECONDS_PER_DAY);
        let secs_of_day = seconds.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = civil_from_days(days);

        Self {
            year: u16::try_from(year).unwrap_or(0),
            month,
            day,
            weekday: Weekday::from_unix_days(days),
            hour: (secs_of_day / 3600) as u8,
            minute: (secs_of_day % 3600 / 60) as u8,
            second: (secs_of_day % 60) as u8,
        }
    }

    /// Seconds since 1970-01-01T00:00:00, the weekday is not consulted
    pub fn to_unix(&self) -> i64 {
        let days = days_from_civil(i64::from(self.year), self.month, self.day);
        days * SECONDS_PER_DAY
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    /// The same instant shifted by `seconds`, with date rollover in both directions
    pub fn offset_by(&self, seconds: i32) -> Self {
        Self::from_unix(self.to_unix() + i64::from(seconds))
    }

    /// Minutes since the epoch. Two readings share a stamp exactly when they fall into the
    /// same occurrence of the same wall-clock minute.
    pub fn minute_stamp(&self) -> i64 {
        self.to_unix().div_euclid(60)
    }

    /// The English month name
    pub const fn month_name(&self) -> &'static str {
        match self.month {
            1 => "January",
            2 => "February",
            3 => "March",
            4 => "April",
            5 => "May",
            6 => "June",
            7 => "July",
            8 => "August",
            9 => "September",
            10 => "October",
            11 => "November",
            12 => "December",
            _ => "",
        }
    }
}

/// Days since 1970-01-01 of a proleptic Gregorian date
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let month = i64::from(month);
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let shifted_month = if month > 2 { month - 3 } else { month + 9 };
    let day_of_year = (153 * shifted_month + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * DAYS_PER_ERA + day_of_era - DAYS_TO_UNIX_EPOCH
}

/// Proleptic Gregorian `(year, month, day)` of a day counted from 1970-01-01
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let days = days + DAYS_TO_UNIX_EPOCH;
    let era = days.div_euclid(DAYS_PER_ERA);
    let day_of_era = days - era * DAYS_PER_ERA;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * shifted_month + 2) / 5 + 1) as u8;
    let month = (if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    }) as u8;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
