//! # Medibox core
//! Hardware-independent logic of the Medibox medicine reminder.
//!
//! Everything that decides *what* the device does lives here, everything that touches pins,
//! buses or the network lives in the firmware crate:
//!
//! - debouncing of the four buttons into edge-triggered events
//! - the timezone offset and its formatting
//! - the alarm registry and the ring/snooze lifecycle
//! - classification of temperature and humidity samples
//! - the menu state machine
//! - the per-tick orchestration over one context object
//! - the text frames handed to the display
//!
//! The crate never reads a clock on its own. The control loop passes the current
//! [`embassy_time::Instant`] and a [`time::TimeSource`] into every tick.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod alarm;
pub mod config;
pub mod environment;
pub mod error;
pub mod input;
pub mod menu;
pub mod orchestrate;
pub mod ring;
pub mod state;
pub mod time;
pub mod timezone;
pub mod view;

pub use error::Error;
pub use state::SystemState;
