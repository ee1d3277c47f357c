//! # Clock
//! The RP2040 RTC as the [`TimeSource`] of the control loop.
//!
//! The RTC always holds UTC. The time sync task writes it, the control loop reads it and
//! adds the offset the timezone menu pushed. Both go through [`RTC_MUTEX`].
use crate::task::resources::RtcResources;
use defmt::{Debug2Format, info, warn};
use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime, DayOfWeek, Rtc, RtcError};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use medibox_core::Error;
use medibox_core::time::{LocalTime, TimeSource, Weekday};

/// Type alias for the RTC mutex.
type RtcType = Mutex<CriticalSectionRawMutex, Option<Rtc<'static, RTC>>>;

/// The RTC, shared between the control loop and the time sync task
pub static RTC_MUTEX: RtcType = Mutex::new(None);

/// Put the RTC into [`RTC_MUTEX`]
pub async fn init_rtc(r: RtcResources) {
    info!("init rtc");
    *(RTC_MUTEX.lock().await) = Some(Rtc::new(r.rtc_inst));
}

/// Write `unix` seconds (UTC) to the RTC
pub async fn set_utc(unix: i64) -> Result<(), RtcError> {
    let dt = to_datetime(&LocalTime::from_unix(unix));
    let mut rtc_guard = RTC_MUTEX.lock().await;
    let Some(rtc) = rtc_guard.as_mut() else {
        warn!("RTC not initialized");
        return Err(RtcError::NotRunning);
    };
    rtc.set_datetime(dt)
}

/// Reads the RTC without waiting, so the control loop never blocks on the time sync task
pub struct RtcClock {
    /// Seconds added to UTC
    offset: i32,
}

impl RtcClock {
    /// A clock showing UTC
    pub const fn new() -> Self {
        Self { offset: 0 }
    }
}

impl Default for RtcClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for RtcClock {
    fn set_utc_offset(&mut self, seconds: i32) {
        info!("utc offset set to {} s", seconds);
        self.offset = seconds;
    }

    fn now(&mut self) -> Result<LocalTime, Error> {
        let Ok(rtc_guard) = RTC_MUTEX.try_lock() else {
            return Err(Error::TimeUnavailable);
        };
        let rtc = rtc_guard.as_ref().ok_or(Error::TimeUnavailable)?;
        match rtc.now() {
            Ok(dt) => Ok(from_datetime(&dt).offset_by(self.offset)),
            Err(e) => {
                defmt::trace!("rtc read failed: {}", Debug2Format(&e));
                Err(Error::TimeUnavailable)
            }
        }
    }
}

/// RTC representation of a UTC time
fn to_datetime(t: &LocalTime) -> DateTime {
    DateTime {
        year: t.year,
        month: t.month,
        day: t.day,
        day_of_week: match t.weekday {
            Weekday::Monday => DayOfWeek::Monday,
            Weekday::Tuesday => DayOfWeek::Tuesday,
            Weekday::Wednesday => DayOfWeek::Wednesday,
            Weekday::Thursday => DayOfWeek::Thursday,
            Weekday::Friday => DayOfWeek::Friday,
            Weekday::Saturday => DayOfWeek::Saturday,
            Weekday::Sunday => DayOfWeek::Sunday,
        },
        hour: t.hour,
        minute: t.minute,
        second: t.second,
    }
}

/// UTC time read from the RTC. The weekday is recomputed from the date.
fn from_datetime(dt: &DateTime) -> LocalTime {
    let raw = LocalTime {
        year: dt.year,
        month: dt.month,
        day: dt.day,
        weekday: Weekday::Monday,
        hour: dt.hour,
        minute: dt.minute,
        second: dt.second,
    };
    LocalTime::from_unix(raw.to_unix())
}
