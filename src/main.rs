//! # Medibox
//! Firmware of the medicine reminder: a Raspberry Pi Pico W with four buttons, an SSD1306
//! OLED, an SHT4x climate sensor, a buzzer and an LED. All decisions are made by
//! `medibox-core`; the tasks here only move data between it and the hardware.

// we are in an environment with constrained resources, so we do not use the standard library and we define a different entry point.
#![no_std]
#![no_main]

use crate::task::alerts::alerts;
use crate::task::clock::init_rtc;
use crate::task::display::display;
use crate::task::orchestrate::orchestrator;
use crate::task::sensor::sensor;
use crate::task::time_sync::time_sync;
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

#[macro_use]
mod task;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Program start");

    // Initialize the peripherals for the RP2040
    let p = embassy_rp::init(Default::default());
    let r = split_resources!(p);

    // the clock must exist before the control loop reads it
    init_rtc(r.rtc).await;

    unwrap!(spawner.spawn(orchestrator(r.buttons)));
    unwrap!(spawner.spawn(display(r.display)));
    unwrap!(spawner.spawn(sensor(r.sensor)));
    unwrap!(spawner.spawn(alerts(r.alerts)));
    unwrap!(spawner.spawn(time_sync(spawner, r.wifi)));
}
