//! Tasks that make up the firmware as well as the resources they use.
#[macro_use]
pub mod resources;

pub mod alerts;
pub mod clock;
pub mod display;
pub mod orchestrate;
pub mod sensor;
pub mod time_sync;
