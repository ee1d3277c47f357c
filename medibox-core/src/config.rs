//! # Static device settings
//! Healthy climate ranges and every duration the state machines use. None of this is
//! editable at runtime; the firmware builds its state from [`Settings::DEFAULT`].

use embassy_time::Duration;

/// Healthy band for the medicine storage climate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    /// Lowest healthy temperature in °C
    pub min_temp: f32,
    /// Highest healthy temperature in °C
    pub max_temp: f32,
    /// Lowest healthy relative humidity in %
    pub min_humidity: f32,
    /// Highest healthy relative humidity in %
    pub max_humidity: f32,
}

impl Thresholds {
    /// 24–32 °C and 65–80 %RH
    pub const HEALTHY: Self = Self {
        min_temp: 24.0,
        max_temp: 32.0,
        min_humidity: 65.0,
        max_humidity: 80.0,
    };
}

/// All static settings of the device
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Healthy climate band
    pub thresholds: Thresholds,
    /// Minimum spacing between two accepted button events, shared by all buttons
    pub debounce_window: Duration,
    /// Pause the loop takes after an accepted event so contact chatter cannot leak through
    pub settle_delay: Duration,
    /// How long a snoozed alarm stays silent
    pub snooze_duration: Duration,
    /// How long an alarm rings unattended before it snoozes itself
    pub ring_duration: Duration,
    /// How long a confirmation notice stays on screen
    pub notice_duration: Duration,
    /// How long the climate warning screen is shown after a bad sample
    pub warning_display: Duration,
    /// Length of the LED/buzzer pulse that accompanies a climate warning
    pub warning_pulse: Duration,
    /// Cadence of the climate sensor
    pub sample_interval: Duration,
}

impl Settings {
    /// The settings the device ships with
    pub const DEFAULT: Self = Self {
        thresholds: Thresholds::HEALTHY,
        debounce_window: Duration::from_millis(250),
        settle_delay: Duration::from_millis(50),
        snooze_duration: Duration::from_secs(5 * 60),
        ring_duration: Duration::from_secs(60),
        notice_duration: Duration::from_secs(2),
        warning_display: Duration::from_secs(5),
        warning_pulse: Duration::from_millis(500),
        sample_interval: Duration::from_secs(10),
    };
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}
