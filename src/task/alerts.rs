//! # Alerts task
//! Drives the buzzer and the LED.
//!
//! The control loop decides when to ring and when to stop. This task only turns an
//! [`AlertCommand`] into pin levels, following [`RingPattern::DEFAULT`] while ringing.
use crate::task::resources::AlertResources;
use defmt::{Format, debug, info};
use embassy_futures::select::{Either, select};
use embassy_rp::gpio::{Level, Output};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Instant, Timer};
use medibox_core::config::Settings;
use medibox_core::ring::RingPattern;

/// What the buzzer and LED should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum AlertCommand {
    /// Start the ring pattern from its first burst
    Ring,
    /// Buzzer and LED off
    Silence,
    /// One short climate warning pulse, ignored while ringing
    WarningPulse,
}

static ALERT_SIGNAL: Signal<CriticalSectionRawMutex, AlertCommand> = Signal::new();

/// Send a command to the alerts task. A command not yet seen is replaced.
pub fn signal_alert(command: AlertCommand) {
    ALERT_SIGNAL.signal(command);
}

async fn wait_for_alert() -> AlertCommand {
    ALERT_SIGNAL.wait().await
}

/// Buzzer and LED outputs
struct Alerts {
    led: Output<'static>,
    buzzer: Output<'static>,
}

impl Alerts {
    fn off(&mut self) {
        self.led.set_low();
        self.buzzer.set_low();
    }

    /// Ring until a command other than [`AlertCommand::WarningPulse`] arrives, which is returned
    async fn ring(&mut self, pattern: &RingPattern) -> AlertCommand {
        let started = Instant::now();
        self.led.set_high();
        loop {
            let elapsed = started.elapsed();
            self.buzzer.set_level(Level::from(pattern.buzzer_on(elapsed)));
            let change = started + pattern.next_change(elapsed);
            match select(Timer::at(change), wait_for_alert()).await {
                Either::First(()) => {}
                Either::Second(AlertCommand::WarningPulse) => {}
                Either::Second(command) => return command,
            }
        }
    }

    /// One warning pulse. A command arriving meanwhile cuts it short and is returned.
    async fn pulse(&mut self) -> Option<AlertCommand> {
        self.led.set_high();
        self.buzzer.set_high();
        let interrupted = match select(
            Timer::after(Settings::DEFAULT.warning_pulse),
            wait_for_alert(),
        )
        .await
        {
            Either::First(()) => None,
            Either::Second(command) => Some(command),
        };
        self.off();
        interrupted
    }
}

#[embassy_executor::task]
pub async fn alerts(r: AlertResources) {
    info!("Alerts task started");

    let mut alerts = Alerts {
        led: Output::new(r.led, Level::Low),
        buzzer: Output::new(r.buzzer, Level::Low),
    };
    let pattern = RingPattern::DEFAULT;

    let mut next = None;
    loop {
        let command = match next.take() {
            Some(command) => command,
            None => wait_for_alert().await,
        };
        debug!("alert command: {}", command);
        match command {
            AlertCommand::Ring => {
                let command = alerts.ring(&pattern).await;
                alerts.off();
                if command == AlertCommand::Ring {
                    next = Some(command);
                }
            }
            AlertCommand::Silence => alerts.off(),
            AlertCommand::WarningPulse => next = alerts.pulse().await,
        }
    }
}
