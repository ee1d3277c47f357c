//! Shared harness for the workflow tests: a fake wall clock and a loop that ticks the
//! state the way the firmware does.

#![allow(dead_code)]

use embassy_time::{Duration, Instant};
use medibox_core::input::{Button, ButtonLevels};
use medibox_core::orchestrate::Outcome;
use medibox_core::ring::RingTransition;
use medibox_core::time::{LocalTime, TimeSource};
use medibox_core::{Error, SystemState};

/// Poll interval of the control loop
pub const TICK: Duration = Duration::from_millis(10);

/// 2025-10-16T07:58:00Z, a Thursday
pub const START_UTC: i64 = 1_760_601_480;

/// A wall clock following the simulated monotonic time
pub struct FakeClock {
    /// UTC at monotonic zero
    pub base_utc: i64,
    /// Offset pushed by the timezone
    pub offset: i32,
    /// Milliseconds since monotonic zero
    pub elapsed_ms: u64,
    /// Whether `now` fails
    pub unavailable: bool,
}

impl FakeClock {
    pub fn new(base_utc: i64) -> Self {
        Self {
            base_utc,
            offset: 0,
            elapsed_ms: 0,
            unavailable: false,
        }
    }
}

impl TimeSource for FakeClock {
    fn set_utc_offset(&mut self, seconds: i32) {
        self.offset = seconds;
    }

    fn now(&mut self) -> Result<LocalTime, Error> {
        if self.unavailable {
            return Err(Error::TimeUnavailable);
        }
        let utc = self.base_utc + i64::try_from(self.elapsed_ms / 1000).unwrap();
        Ok(LocalTime::from_unix(utc).offset_by(self.offset))
    }
}

/// The state, its clock and the monotonic time, ticked together
pub struct Sim {
    pub state: SystemState,
    pub clock: FakeClock,
    pub now: Instant,
    /// Every ring transition seen so far
    pub transitions: Vec<RingTransition>,
}

impl Sim {
    pub fn new() -> Self {
        Self::starting_at(START_UTC)
    }

    pub fn starting_at(base_utc: i64) -> Self {
        Self {
            state: SystemState::default(),
            clock: FakeClock::new(base_utc),
            now: Instant::from_millis(0),
            transitions: Vec::new(),
        }
    }

    /// One loop iteration, then advance by one tick
    pub fn tick(&mut self, levels: ButtonLevels) -> Outcome {
        self.clock.elapsed_ms = self.now.as_millis();
        let outcome = self.state.tick(levels, self.now, &mut self.clock);
        self.transitions.extend(outcome.transitions());
        self.now += TICK;
        outcome
    }

    /// Tick with no button held for `duration`
    pub fn idle(&mut self, duration: Duration) {
        let until = self.now + duration;
        while self.now < until {
            self.tick(ButtonLevels::RELEASED);
        }
    }

    /// Tick with no button held until the monotonic time reaches `ms`
    pub fn run_until(&mut self, ms: u64) {
        while self.now.as_millis() < ms {
            self.tick(ButtonLevels::RELEASED);
        }
    }

    /// Press and release `button`, then wait out the debounce window
    pub fn press(&mut self, button: Button) -> Outcome {
        let outcome = self.tick(ButtonLevels::only(button));
        self.idle(Duration::from_millis(300));
        outcome
    }

    pub fn press_all(&mut self, buttons: &[Button]) {
        for &button in buttons {
            self.press(button);
        }
    }

    /// Transitions that started an alarm
    pub fn starts(&self) -> usize {
        self.transitions
            .iter()
            .filter(|t| matches!(t, RingTransition::Started(_)))
            .count()
    }
}
