//! # Display task
//! This module contains the task that draws on the SSD1306 OLED display.
//!
//! The control loop renders a [`Frame`] and signals it here whenever it changed. The task
//! only turns the lines into text on a 128x64 buffer and flushes it.
use crate::task::resources::{DisplayResources, Irqs};
use defmt::{Debug2Format, error, info, warn};
use embassy_rp::i2c::{Config, I2c};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embedded_graphics::{
    mono_font::{
        MonoTextStyle, MonoTextStyleBuilder,
        ascii::{FONT_5X8, FONT_9X18_BOLD},
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use medibox_core::view::{Frame, LineStyle};
use ssd1306_async::{I2CDisplayInterface, Ssd1306, prelude::*};

/// Signal carrying the next frame to draw
static DISPLAY_SIGNAL: Signal<CriticalSectionRawMutex, Frame> = Signal::new();

/// Signals the display to draw `frame`. A frame not yet drawn is replaced.
pub fn signal_display(frame: Frame) {
    DISPLAY_SIGNAL.signal(frame);
}

/// Waits for the next frame
async fn wait_for_frame() -> Frame {
    DISPLAY_SIGNAL.wait().await
}

/// Row height of small text
const SMALL_LINE_HEIGHT: i32 = 9;

/// Row height of large text
const LARGE_LINE_HEIGHT: i32 = 18;

#[embassy_executor::task]
pub async fn display(r: DisplayResources) {
    info!("Display task started");

    let mut config = Config::default();
    config.frequency = 400_000;
    let i2c = I2c::new_async(r.i2c0, r.scl, r.sda, Irqs, config);

    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    if let Err(e) = display.init().await {
        error!("Failed to initialize display: {}", Debug2Format(&e));
        return;
    }
    if let Err(e) = display.set_brightness(Brightness::DIM).await {
        warn!("Failed to set display brightness: {}", Debug2Format(&e));
    }

    let small: MonoTextStyle<'static, BinaryColor> = MonoTextStyleBuilder::new()
        .font(&FONT_5X8)
        .text_color(BinaryColor::On)
        .build();
    let large: MonoTextStyle<'static, BinaryColor> = MonoTextStyleBuilder::new()
        .font(&FONT_9X18_BOLD)
        .text_color(BinaryColor::On)
        .build();

    loop {
        let frame = wait_for_frame().await;

        // nothing is sent to the display before flush()
        display.clear();

        let mut y = 0;
        for line in frame.lines() {
            let (style, height) = match line.style {
                LineStyle::Small => (small, SMALL_LINE_HEIGHT),
                LineStyle::Large => (large, LARGE_LINE_HEIGHT),
            };
            // drawing into the buffer cannot fail
            let _ = Text::with_baseline(&line.text, Point::new(0, y), style, Baseline::Top)
                .draw(&mut display);
            y += height;
        }

        if let Err(e) = display.flush().await {
            warn!("Failed to flush display: {}", Debug2Format(&e));
        }
    }
}
