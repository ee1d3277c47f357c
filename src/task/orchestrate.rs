//! # Orchestrate Task
//! The control loop of the device.
//!
//! Every 10 ms it samples the buttons, runs one tick of the [`SystemState`] and forwards
//! what changed to the alerts and display tasks. It owns the whole state, so no other task
//! needs a lock on it.
use defmt::{info, warn};
use embassy_rp::gpio::{Input, Pull};
use embassy_time::{Duration, Instant, Ticker, Timer};
use medibox_core::config::Settings;
use medibox_core::input::ButtonLevels;
use medibox_core::menu::MenuAction;
use medibox_core::orchestrate::Outcome;
use medibox_core::ring::RingTransition;
use medibox_core::view::{Frame, render};
use medibox_core::{Error, SystemState};

use crate::task::{
    alerts::{AlertCommand, signal_alert},
    clock::RtcClock,
    display::signal_display,
    resources::ButtonResources,
    sensor::take_sample,
};

/// Period of the control loop
const TICK: Duration = Duration::from_millis(10);

/// The four buttons, wired to ground with the internal pull-ups enabled
struct Buttons {
    up: Input<'static>,
    down: Input<'static>,
    select: Input<'static>,
    cancel: Input<'static>,
}

impl Buttons {
    fn new(r: ButtonResources) -> Self {
        Self {
            up: Input::new(r.up, Pull::Up),
            down: Input::new(r.down, Pull::Up),
            select: Input::new(r.select, Pull::Up),
            cancel: Input::new(r.cancel, Pull::Up),
        }
    }

    /// Pressed means pulled low
    fn levels(&self) -> ButtonLevels {
        ButtonLevels::new(
            self.up.is_low(),
            self.down.is_low(),
            self.select.is_low(),
            self.cancel.is_low(),
        )
    }
}

#[embassy_executor::task]
pub async fn orchestrator(r: ButtonResources) {
    info!("Orchestrate task started");

    let buttons = Buttons::new(r);
    let mut state = SystemState::new(Settings::DEFAULT);
    let mut clock = RtcClock::new();
    let mut last_frame = Frame::new();
    let mut time_available = true;

    let mut ticker = Ticker::every(TICK);
    loop {
        let now = Instant::now();

        if let Some(sample) = take_sample() {
            match state.on_sample(sample, now) {
                Ok(classification) if classification.is_warning() => {
                    warn!("climate out of range: {} ({})", sample, classification);
                    signal_alert(AlertCommand::WarningPulse);
                }
                Ok(_) => {}
                Err(e) => warn!("climate sample ignored: {}", e),
            }
        }

        let outcome = state.tick(buttons.levels(), now, &mut clock);
        log_outcome(&outcome, &mut time_available);

        for transition in outcome.transitions() {
            match transition {
                t if t.starts_ringing() => signal_alert(AlertCommand::Ring),
                RingTransition::Snoozed(_)
                | RingTransition::AutoSnoozed(_)
                | RingTransition::Stopped(_) => signal_alert(AlertCommand::Silence),
                _ => {}
            }
        }

        let frame = render(&state, outcome.time.as_ref().ok(), now);
        if frame != last_frame {
            signal_display(frame.clone());
            last_frame = frame;
        }

        if outcome.button.is_some() {
            Timer::after(state.settings.settle_delay).await;
            ticker.reset();
        } else {
            ticker.next().await;
        }
    }
}

/// Log what a tick changed. A clock that cannot be read is only reported when that starts
/// or ends.
fn log_outcome(outcome: &Outcome, time_available: &mut bool) {
    if let Some(event) = outcome.button {
        info!("button: {}", event.source);
    }
    for transition in outcome.transitions() {
        info!("ring: {}", transition);
    }
    if outcome.menu != MenuAction::None {
        info!("menu: {}", outcome.menu);
    }
    match outcome.time {
        Ok(_) if !*time_available => {
            info!("time available again");
            *time_available = true;
        }
        Err(Error::TimeUnavailable) if *time_available => {
            warn!("time unavailable, alarms cannot fire");
            *time_available = false;
        }
        _ => {}
    }
}
