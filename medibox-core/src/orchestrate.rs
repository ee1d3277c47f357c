//! # Orchestrate
//! One tick of the control loop over the [`SystemState`].
//!
//! Per tick: debounce the buttons, check the ring and snooze deadlines, then hand the
//! button to exactly one owner. While an alarm rings or is snoozed that owner is the ring
//! controller and the menu sees nothing; otherwise the navigator gets it and the alarms
//! are matched against the clock. Climate samples arrive on their own cadence through
//! [`SystemState::on_sample`].

use crate::environment::{Classification, Sample};
use crate::input::{ButtonEvent, ButtonLevels};
use crate::menu::MenuAction;
use crate::ring::RingTransition;
use crate::state::{NoticeKind, SystemState};
use crate::time::{LocalTime, TimeSource};
use crate::Error;
use embassy_time::Instant;

/// Everything one tick did, for the caller to log and forward to the outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outcome {
    /// The accepted button press
    pub button: Option<ButtonEvent>,
    /// Transition caused by the ring or snooze deadline
    pub timer: Option<RingTransition>,
    /// Transition caused by the button or by an alarm match
    pub ring: Option<RingTransition>,
    /// What the navigator changed
    pub menu: MenuAction,
    /// The clock reading of this tick
    pub time: Result<LocalTime, Error>,
}

impl Outcome {
    /// Transitions of this tick in the order they happened
    pub fn transitions(&self) -> impl Iterator<Item = RingTransition> {
        self.timer.into_iter().chain(self.ring)
    }
}

impl SystemState {
    /// Run one tick at `now` with the sampled button `levels`
    pub fn tick<T: TimeSource>(
        &mut self,
        levels: ButtonLevels,
        now: Instant,
        clock: &mut T,
    ) -> Outcome {
        let button = self.debouncer.sample(levels, now);
        let dismissing = button.is_some() && self.active_notice(now).is_some();
        if button.is_some() || self.active_notice(now).is_none() {
            self.notice = None;
        }

        let timer = self.ring.check_timers(now);
        if let Some(transition) = timer {
            self.on_ring_transition(transition, now);
        }

        let mut ring = None;
        let mut menu = MenuAction::None;
        if self.ring.is_active() {
            if let Some(event) = button {
                ring = self.ring.handle_button(event.source, now);
            }
        } else if let Some(event) = button.filter(|_| !dismissing) {
            menu = self.navigator.handle(
                event.source,
                &mut self.alarms,
                &mut self.timezone,
                clock,
            );
            self.on_menu_action(menu, now);
        }

        let time = clock.now();
        if ring.is_none() && !self.ring.is_active() {
            if let Ok(local) = &time {
                ring = self.ring.check_alarms(local, &self.alarms, now);
            }
        }
        if let Some(transition) = ring {
            self.on_ring_transition(transition, now);
        }

        Outcome {
            button,
            timer,
            ring,
            menu,
            time,
        }
    }

    /// Classify a climate sample taken at `now`. A warning keeps the warning screen up for
    /// the warning display duration, a healthy sample takes it down. A failed sample changes
    /// nothing.
    pub fn on_sample(&mut self, sample: Sample, now: Instant) -> Result<Classification, Error> {
        let classification = self.environment.evaluate(sample)?;
        self.warning_until = classification
            .is_warning()
            .then(|| now + self.settings.warning_display);
        Ok(classification)
    }

    /// Side effects of a ring transition on the rest of the state
    fn on_ring_transition(&mut self, transition: RingTransition, now: Instant) {
        match transition {
            RingTransition::Started(_) | RingTransition::Resumed(_) => {
                self.navigator.reset();
                self.notice = None;
            }
            RingTransition::Snoozed(_) => self.show_notice(NoticeKind::AlarmSnoozed, now),
            RingTransition::Stopped(_) => self.show_notice(NoticeKind::AlarmStopped, now),
            RingTransition::AutoSnoozed(_) => {}
        }
    }

    /// Confirmation notices for menu actions
    fn on_menu_action(&mut self, action: MenuAction, now: Instant) {
        match action {
            MenuAction::AlarmSet {
                alarm,
                hour,
                minute,
            } => self.show_notice(
                NoticeKind::AlarmSet {
                    alarm,
                    hour,
                    minute,
                },
                now,
            ),
            MenuAction::AlarmDeleted(alarm) => {
                self.show_notice(NoticeKind::AlarmDeleted(alarm), now);
            }
            MenuAction::None | MenuAction::TimezoneApplied(_) => {}
        }
    }
}
