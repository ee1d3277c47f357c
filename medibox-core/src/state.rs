//! # System state
//! The single context the control loop owns. Every component lives here and is reached
//! through it, so one writer per tick is the only discipline needed.

use crate::alarm::{AlarmId, AlarmRegistry};
use crate::config::Settings;
use crate::environment::EnvMonitor;
use crate::input::Debouncer;
use crate::menu::Navigator;
use crate::ring::RingController;
use crate::timezone::Timezone;
use embassy_time::Instant;

/// A short confirmation that overlays the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NoticeKind {
    /// "Alarm n set for HH:MM"
    AlarmSet {
        alarm: AlarmId,
        hour: u8,
        minute: u8,
    },
    /// "Alarm n deleted"
    AlarmDeleted(AlarmId),
    /// "Alarm Snoozed"
    AlarmSnoozed,
    /// "Alarm Stopped"
    AlarmStopped,
}

/// A notice and the moment it disappears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notice {
    pub kind: NoticeKind,
    /// Shown while `now < until`
    pub until: Instant,
}

/// Everything the control loop owns
#[derive(Debug, Clone)]
pub struct SystemState {
    /// Static settings the components were built from
    pub settings: Settings,
    pub debouncer: Debouncer,
    pub navigator: Navigator,
    pub alarms: AlarmRegistry,
    pub timezone: Timezone,
    pub ring: RingController,
    pub environment: EnvMonitor,
    /// The confirmation currently shown, if any
    pub notice: Option<Notice>,
    /// Deadline of the climate warning screen
    pub warning_until: Option<Instant>,
}

impl SystemState {
    /// Fresh state: clock face, no alarms, UTC
    pub const fn new(settings: Settings) -> Self {
        Self {
            settings,
            debouncer: Debouncer::new(settings.debounce_window),
            navigator: Navigator::new(),
            alarms: AlarmRegistry::new(),
            timezone: Timezone::UTC,
            ring: RingController::new(settings.snooze_duration, settings.ring_duration),
            environment: EnvMonitor::new(settings.thresholds),
            notice: None,
            warning_until: None,
        }
    }

    /// The notice still visible at `now`
    pub fn active_notice(&self, now: Instant) -> Option<NoticeKind> {
        self.notice
            .filter(|notice| now < notice.until)
            .map(|notice| notice.kind)
    }

    /// Whether the climate warning screen is still up at `now`
    pub fn warning_visible(&self, now: Instant) -> bool {
        self.warning_until.is_some_and(|until| now < until)
    }

    /// Show `kind` for the notice duration
    pub(crate) fn show_notice(&mut self, kind: NoticeKind, now: Instant) {
        self.notice = Some(Notice {
            kind,
            until: now + self.settings.notice_duration,
        });
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new(Settings::DEFAULT)
    }
}
