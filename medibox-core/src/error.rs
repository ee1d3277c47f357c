//! Recoverable faults of the core.
//!
//! None of these halt the control loop. The affected subsystem is skipped for the current
//! tick and the rest of the state stays as it was.

/// Faults reported by the external collaborators and surfaced by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The sensor delivered a not-a-number temperature or humidity
    #[error("sensor read failed")]
    SensorReadFailure,
    /// The time source could not produce a reading
    #[error("time unavailable")]
    TimeUnavailable,
}
