//! # Environmental monitor
//! Classifies temperature/humidity samples against the healthy [`Thresholds`].

use crate::config::Thresholds;
use crate::Error;

/// One reading of the climate sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// °C
    pub temperature: f32,
    /// %RH
    pub humidity: f32,
}

impl Sample {
    /// What the sensor adapter reports when the measurement failed
    pub const FAILED: Self = Self {
        temperature: f32::NAN,
        humidity: f32::NAN,
    };

    /// Whether either value is not a number
    pub const fn is_failed(&self) -> bool {
        self.temperature.is_nan() || self.humidity.is_nan()
    }
}

/// Which quantities are outside their healthy band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Classification {
    #[default]
    None,
    TempOnly,
    HumidityOnly,
    Both,
}

impl Classification {
    /// Combine the two independent checks
    const fn from_flags(temp_warning: bool, humidity_warning: bool) -> Self {
        match (temp_warning, humidity_warning) {
            (false, false) => Self::None,
            (true, false) => Self::TempOnly,
            (false, true) => Self::HumidityOnly,
            (true, true) => Self::Both,
        }
    }

    /// Whether anything is out of range
    pub const fn is_warning(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether the temperature is out of range
    pub const fn temperature(self) -> bool {
        matches!(self, Self::TempOnly | Self::Both)
    }

    /// Whether the humidity is out of range
    pub const fn humidity(self) -> bool {
        matches!(self, Self::HumidityOnly | Self::Both)
    }
}

/// Keeps the latest good sample and its classification
#[derive(Debug, Clone)]
pub struct EnvMonitor {
    /// The healthy band samples are checked against
    thresholds: Thresholds,
    /// Classification of the last good sample
    classification: Classification,
    /// The last good sample
    last_sample: Option<Sample>,
}

impl EnvMonitor {
    /// A monitor with no sample yet, classified healthy
    pub const fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            classification: Classification::None,
            last_sample: None,
        }
    }

    /// The healthy band
    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classification of the last good sample
    pub const fn classification(&self) -> Classification {
        self.classification
    }

    /// The last good sample, `None` before the first one
    pub const fn last_sample(&self) -> Option<Sample> {
        self.last_sample
    }

    /// Classify `sample` and keep it. A sample with a NaN value is rejected with
    /// [`Error::SensorReadFailure`] and leaves the monitor untouched.
    pub fn evaluate(&mut self, sample: Sample) -> Result<Classification, Error> {
        if sample.is_failed() {
            return Err(Error::SensorReadFailure);
        }

        let t = &self.thresholds;
        let temp_warning = sample.temperature < t.min_temp || sample.temperature > t.max_temp;
        let humidity_warning =
            sample.humidity < t.min_humidity || sample.humidity > t.max_humidity;

        self.classification = Classification::from_flags(temp_warning, humidity_warning);
        self.last_sample = Some(sample);
        Ok(self.classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> EnvMonitor {
        EnvMonitor::new(Thresholds::HEALTHY)
    }

    fn sample(temperature: f32, humidity: f32) -> Sample {
        Sample {
            temperature,
            humidity,
        }
    }

    #[test]
    fn healthy_sample_has_no_warning() {
        let mut m = monitor();
        assert_eq!(m.evaluate(sample(28.0, 70.0)), Ok(Classification::None));
        assert!(!m.classification().is_warning());
    }

    #[test]
    fn band_edges_are_healthy() {
        let mut m = monitor();
        assert_eq!(m.evaluate(sample(24.0, 65.0)), Ok(Classification::None));
        assert_eq!(m.evaluate(sample(32.0, 80.0)), Ok(Classification::None));
    }

    #[test]
    fn classifies_each_quantity_independently() {
        let mut m = monitor();
        assert_eq!(m.evaluate(sample(33.5, 70.0)), Ok(Classification::TempOnly));
        assert_eq!(m.evaluate(sample(25.0, 40.0)), Ok(Classification::HumidityOnly));
        assert_eq!(m.evaluate(sample(10.0, 95.0)), Ok(Classification::Both));
        assert!(Classification::Both.temperature());
        assert!(Classification::Both.humidity());
        assert!(!Classification::TempOnly.humidity());
    }

    #[test]
    fn nan_reading_leaves_state_unchanged() {
        let mut m = monitor();
        m.evaluate(sample(35.0, 70.0)).unwrap();

        for bad in [Sample::FAILED, sample(f32::NAN, 70.0), sample(25.0, f32::NAN)] {
            assert_eq!(m.evaluate(bad), Err(Error::SensorReadFailure));
            assert_eq!(m.classification(), Classification::TempOnly);
            assert_eq!(m.last_sample(), Some(sample(35.0, 70.0)));
        }
    }
}
