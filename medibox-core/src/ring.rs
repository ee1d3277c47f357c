//! # Ring/snooze controller
//! Owns the alarm-active lifecycle: matching the adjusted time against the
//! [`AlarmRegistry`], the `Idle → Ringing ⇄ Snoozed → Idle` transitions, and the ring and
//! snooze timers. Timers are deadlines checked by polling, the caller passes `now` in.
//!
//! The control loop polls far more often than once per second, so the `second == 0` guard
//! alone would fire an alarm on every tick of that second. Each alarm therefore remembers
//! the minute stamp it last fired on and never fires twice for the same occurrence.

use crate::alarm::{AlarmId, AlarmRegistry};
use crate::input::Button;
use crate::time::LocalTime;
use embassy_time::{Duration, Instant};

/// Lifecycle state of the alarm output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingState {
    /// No alarm is active
    #[default]
    Idle,
    /// `alarm` rings since `since`
    Ringing {
        /// The ringing alarm
        alarm: AlarmId,
        /// When ringing started or resumed
        since: Instant,
    },
    /// `alarm` was snoozed at `since`
    Snoozed {
        /// The snoozed alarm
        alarm: AlarmId,
        /// When the snooze started
        since: Instant,
    },
}

/// The mode of a [`RingState`] without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingMode {
    Idle,
    Ringing,
    Snoozed,
}

impl RingState {
    /// The mode of this state
    pub const fn mode(&self) -> RingMode {
        match self {
            Self::Idle => RingMode::Idle,
            Self::Ringing { .. } => RingMode::Ringing,
            Self::Snoozed { .. } => RingMode::Snoozed,
        }
    }

    /// The alarm this state belongs to, `None` while idle
    pub const fn alarm(&self) -> Option<AlarmId> {
        match self {
            Self::Idle => None,
            Self::Ringing { alarm, .. } | Self::Snoozed { alarm, .. } => Some(*alarm),
        }
    }
}

/// A state change the controller made, for the caller to log and act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingTransition {
    /// Idle → Ringing on an alarm match
    Started(AlarmId),
    /// Ringing → Snoozed on the snooze button
    Snoozed(AlarmId),
    /// Ringing → Snoozed because nobody reacted within the ring duration
    AutoSnoozed(AlarmId),
    /// Snoozed → Ringing after the snooze duration
    Resumed(AlarmId),
    /// Ringing or Snoozed → Idle on the stop button
    Stopped(AlarmId),
}

impl RingTransition {
    /// The alarm the transition belongs to
    pub const fn alarm(&self) -> AlarmId {
        match *self {
            Self::Started(alarm)
            | Self::Snoozed(alarm)
            | Self::AutoSnoozed(alarm)
            | Self::Resumed(alarm)
            | Self::Stopped(alarm) => alarm,
        }
    }

    /// Whether the outputs must start ringing after this transition
    pub const fn starts_ringing(&self) -> bool {
        matches!(self, Self::Started(_) | Self::Resumed(_))
    }
}

/// The ring/snooze state machine
#[derive(Debug, Clone)]
pub struct RingController {
    /// Current state
    state: RingState,
    /// Minute stamp each alarm last fired on
    last_fired: [Option<i64>; 2],
    /// How long a snooze lasts
    snooze_duration: Duration,
    /// How long an alarm rings before it snoozes itself
    ring_duration: Duration,
}

impl RingController {
    /// An idle controller
    pub const fn new(snooze_duration: Duration, ring_duration: Duration) -> Self {
        Self {
            state: RingState::Idle,
            last_fired: [None; 2],
            snooze_duration,
            ring_duration,
        }
    }

    /// The current state
    pub const fn state(&self) -> RingState {
        self.state
    }

    /// Whether an alarm is ringing or snoozed. The menu only runs while this is `false`.
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, RingState::Idle)
    }

    /// Whether the outputs should be ringing right now
    pub const fn is_ringing(&self) -> bool {
        matches!(self.state, RingState::Ringing { .. })
    }

    /// Time left until a snoozed alarm rings again
    pub fn snooze_remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            RingState::Snoozed { since, .. } => Some(
                self.snooze_duration
                    .checked_sub(elapsed(since, now))
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Evaluate the snooze and ring deadlines. Run before any button dispatch so an expired
    /// snooze is ringing again before the tick's event is routed.
    pub fn check_timers(&mut self, now: Instant) -> Option<RingTransition> {
        match self.state {
            RingState::Snoozed { alarm, since } if elapsed(since, now) >= self.snooze_duration => {
                self.state = RingState::Ringing { alarm, since: now };
                Some(RingTransition::Resumed(alarm))
            }
            RingState::Ringing { alarm, since } if elapsed(since, now) >= self.ring_duration => {
                self.state = RingState::Snoozed { alarm, since: now };
                Some(RingTransition::AutoSnoozed(alarm))
            }
            _ => None,
        }
    }

    /// Start ringing when `time` is exactly on an active alarm's minute. Only runs while
    /// idle. When both alarms match, alarm 1 rings and both record the minute as fired.
    pub fn check_alarms(
        &mut self,
        time: &LocalTime,
        alarms: &AlarmRegistry,
        now: Instant,
    ) -> Option<RingTransition> {
        if self.is_active() || time.second != 0 {
            return None;
        }

        let stamp = time.minute_stamp();
        let mut started = None;
        for (id, entry) in alarms.active() {
            if !entry.matches(time.hour, time.minute) {
                continue;
            }
            let fired = &mut self.last_fired[id.index()];
            if *fired == Some(stamp) {
                continue;
            }
            *fired = Some(stamp);
            started.get_or_insert(id);
        }

        let alarm = started?;
        self.state = RingState::Ringing { alarm, since: now };
        Some(RingTransition::Started(alarm))
    }

    /// Route a button while an alarm is active. Cancel snoozes a ringing alarm, Select stops
    /// a ringing or snoozed one, everything else is ignored.
    pub fn handle_button(&mut self, button: Button, now: Instant) -> Option<RingTransition> {
        match (self.state, button) {
            (RingState::Ringing { .. }, Button::Cancel) => self.snooze(now),
            (RingState::Ringing { .. } | RingState::Snoozed { .. }, Button::Select) => self.stop(),
            _ => None,
        }
    }

    /// Ringing → Snoozed
    pub fn snooze(&mut self, now: Instant) -> Option<RingTransition> {
        let RingState::Ringing { alarm, .. } = self.state else {
            return None;
        };
        self.state = RingState::Snoozed { alarm, since: now };
        Some(RingTransition::Snoozed(alarm))
    }

    /// Ringing or Snoozed → Idle
    pub fn stop(&mut self) -> Option<RingTransition> {
        let alarm = self.state.alarm()?;
        self.state = RingState::Idle;
        Some(RingTransition::Stopped(alarm))
    }
}

/// Time from `since` to `now`, zero if the clock went backwards
fn elapsed(since: Instant, now: Instant) -> Duration {
    now.checked_duration_since(since).unwrap_or_default()
}

/// Buzzer timing while an alarm rings: a short burst, then a steady on/off alternation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingPattern {
    /// On phase of each burst beep
    pub burst_on: Duration,
    /// Off phase after each burst beep
    pub burst_off: Duration,
    /// Number of burst beeps
    pub burst_count: u32,
    /// On phase after the burst
    pub pulse_on: Duration,
    /// Off phase after the burst
    pub pulse_off: Duration,
}

impl RingPattern {
    /// 3 × (200 ms on, 100 ms off), then 200 ms on / 200 ms off
    pub const DEFAULT: Self = Self {
        burst_on: Duration::from_millis(200),
        burst_off: Duration::from_millis(100),
        burst_count: 3,
        pulse_on: Duration::from_millis(200),
        pulse_off: Duration::from_millis(200),
    };

    /// Length of the whole initial burst
    fn burst_len(&self) -> Duration {
        (self.burst_on + self.burst_off) * self.burst_count
    }

    /// Buzzer level `elapsed` after ringing started
    pub fn buzzer_on(&self, elapsed: Duration) -> bool {
        let (phase, on, _) = self.phase_at(elapsed);
        phase < on
    }

    /// Elapsed time at which the buzzer level changes next, always later than `elapsed`
    pub fn next_change(&self, elapsed: Duration) -> Duration {
        let (phase, on, period) = self.phase_at(elapsed);
        let phase_start = elapsed - phase;
        if phase < on {
            phase_start + on
        } else {
            phase_start + period
        }
    }

    /// Position inside the current on/off period, with that period's on length and total
    /// length
    fn phase_at(&self, elapsed: Duration) -> (Duration, Duration, Duration) {
        let burst_len = self.burst_len();
        let (offset, on, period) = if elapsed < burst_len {
            (elapsed, self.burst_on, self.burst_on + self.burst_off)
        } else {
            (
                elapsed - burst_len,
                self.pulse_on,
                self.pulse_on + self.pulse_off,
            )
        };
        let period_ticks = period.as_ticks().max(1);
        let phase = Duration::from_ticks(offset.as_ticks() % period_ticks);
        (phase, on, period)
    }
}

impl Default for RingPattern {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Weekday;

    const SNOOZE: Duration = Duration::from_secs(300);
    const RING: Duration = Duration::from_secs(60);

    fn controller() -> RingController {
        RingController::new(SNOOZE, RING)
    }

    fn at(secs: u64) -> Instant {
        Instant::from_secs(secs)
    }

    fn clock(hour: u8, minute: u8, second: u8) -> LocalTime {
        LocalTime {
            year: 2025,
            month: 10,
            day: 16,
            weekday: Weekday::Thursday,
            hour,
            minute,
            second,
        }
    }

    fn registry(alarms: &[(AlarmId, u8, u8)]) -> AlarmRegistry {
        let mut registry = AlarmRegistry::new();
        for &(id, hour, minute) in alarms {
            registry.set(id, hour, minute);
        }
        registry
    }

    #[test]
    fn matching_minute_starts_ringing_once() {
        let mut ring = controller();
        let alarms = registry(&[(AlarmId::First, 8, 0)]);

        assert_eq!(
            ring.check_alarms(&clock(8, 0, 0), &alarms, at(10)),
            Some(RingTransition::Started(AlarmId::First))
        );
        assert_eq!(ring.stop(), Some(RingTransition::Stopped(AlarmId::First)));

        // still inside the same second on the next poll
        assert_eq!(ring.check_alarms(&clock(8, 0, 0), &alarms, at(10)), None);
        assert_eq!(ring.state(), RingState::Idle);
    }

    #[test]
    fn only_second_zero_matches() {
        let mut ring = controller();
        let alarms = registry(&[(AlarmId::First, 8, 0)]);
        assert_eq!(ring.check_alarms(&clock(8, 0, 1), &alarms, at(0)), None);
        assert_eq!(ring.check_alarms(&clock(7, 59, 0), &alarms, at(0)), None);
    }

    #[test]
    fn inactive_alarm_never_rings() {
        let mut ring = controller();
        let mut alarms = registry(&[(AlarmId::Second, 6, 30)]);
        alarms.clear(AlarmId::Second);
        assert_eq!(ring.check_alarms(&clock(6, 30, 0), &alarms, at(0)), None);
    }

    #[test]
    fn alarm_one_wins_a_tie_and_both_are_consumed() {
        let mut ring = controller();
        let alarms = registry(&[(AlarmId::First, 9, 15), (AlarmId::Second, 9, 15)]);

        assert_eq!(
            ring.check_alarms(&clock(9, 15, 0), &alarms, at(0)),
            Some(RingTransition::Started(AlarmId::First))
        );
        ring.stop();
        assert_eq!(ring.check_alarms(&clock(9, 15, 0), &alarms, at(0)), None);
    }

    #[test]
    fn same_minute_next_day_fires_again() {
        let mut ring = controller();
        let alarms = registry(&[(AlarmId::First, 8, 0)]);
        let today = clock(8, 0, 0);
        let tomorrow = today.offset_by(86_400);

        assert!(ring.check_alarms(&today, &alarms, at(0)).is_some());
        ring.stop();
        assert_eq!(
            ring.check_alarms(&tomorrow, &alarms, at(86_400)),
            Some(RingTransition::Started(AlarmId::First))
        );
    }

    #[test]
    fn no_match_while_snoozed() {
        let mut ring = controller();
        let alarms = registry(&[(AlarmId::First, 8, 0), (AlarmId::Second, 8, 1)]);
        ring.check_alarms(&clock(8, 0, 0), &alarms, at(0));
        ring.snooze(at(5));
        assert_eq!(ring.check_alarms(&clock(8, 1, 0), &alarms, at(60)), None);
        assert_eq!(ring.state().alarm(), Some(AlarmId::First));
    }

    #[test]
    fn snooze_resumes_after_five_minutes() {
        let mut ring = controller();
        let alarms = registry(&[(AlarmId::Second, 22, 0)]);
        ring.check_alarms(&clock(22, 0, 0), &alarms, at(0));

        assert_eq!(
            ring.handle_button(Button::Cancel, at(10)),
            Some(RingTransition::Snoozed(AlarmId::Second))
        );
        assert_eq!(ring.state().mode(), RingMode::Snoozed);
        assert_eq!(ring.check_timers(at(309)), None);
        assert_eq!(ring.snooze_remaining(at(309)), Some(Duration::from_secs(1)));
        assert_eq!(
            ring.check_timers(at(310)),
            Some(RingTransition::Resumed(AlarmId::Second))
        );
        assert_eq!(
            ring.state(),
            RingState::Ringing {
                alarm: AlarmId::Second,
                since: at(310)
            }
        );
    }

    #[test]
    fn unattended_ring_snoozes_itself() {
        let mut ring = controller();
        let alarms = registry(&[(AlarmId::First, 12, 0)]);
        ring.check_alarms(&clock(12, 0, 0), &alarms, at(100));

        assert_eq!(ring.check_timers(at(159)), None);
        assert_eq!(
            ring.check_timers(at(160)),
            Some(RingTransition::AutoSnoozed(AlarmId::First))
        );
        assert_eq!(
            ring.check_timers(at(460)),
            Some(RingTransition::Resumed(AlarmId::First))
        );
    }

    #[test]
    fn select_stops_ringing_and_snoozed() {
        let mut ring = controller();
        let alarms = registry(&[(AlarmId::First, 7, 0)]);

        ring.check_alarms(&clock(7, 0, 0), &alarms, at(0));
        assert_eq!(
            ring.handle_button(Button::Select, at(1)),
            Some(RingTransition::Stopped(AlarmId::First))
        );
        assert!(!ring.is_active());

        let mut ring = controller();
        ring.check_alarms(&clock(7, 0, 0), &alarms, at(0));
        ring.snooze(at(1));
        assert_eq!(
            ring.handle_button(Button::Select, at(2)),
            Some(RingTransition::Stopped(AlarmId::First))
        );
        assert_eq!(ring.state().alarm(), None);
    }

    #[test]
    fn other_buttons_are_ignored_while_active() {
        let mut ring = controller();
        let alarms = registry(&[(AlarmId::First, 7, 0)]);
        ring.check_alarms(&clock(7, 0, 0), &alarms, at(0));

        assert_eq!(ring.handle_button(Button::Up, at(1)), None);
        assert_eq!(ring.handle_button(Button::Down, at(1)), None);
        ring.snooze(at(1));
        assert_eq!(ring.handle_button(Button::Cancel, at(2)), None);
        assert_eq!(ring.state().mode(), RingMode::Snoozed);
    }

    #[test]
    fn idle_controller_ignores_buttons() {
        let mut ring = controller();
        assert_eq!(ring.handle_button(Button::Select, at(0)), None);
        assert_eq!(ring.snooze(at(0)), None);
        assert_eq!(ring.stop(), None);
    }

    #[test]
    fn pattern_starts_with_three_short_beeps() {
        let pattern = RingPattern::DEFAULT;
        let on_at = |ms| pattern.buzzer_on(Duration::from_millis(ms));

        for beep in 0..3 {
            let start = beep * 300;
            assert!(on_at(start));
            assert!(on_at(start + 199));
            assert!(!on_at(start + 200));
            assert!(!on_at(start + 299));
        }
        // steady alternation after the burst
        assert!(on_at(900));
        assert!(!on_at(1100));
        assert!(on_at(1300));
        assert!(!on_at(1550));
    }

    #[test]
    fn next_change_follows_the_pattern() {
        let pattern = RingPattern::DEFAULT;
        let next = |ms| pattern.next_change(Duration::from_millis(ms)).as_millis();

        assert_eq!(next(0), 200);
        assert_eq!(next(200), 300);
        assert_eq!(next(850), 900);
        assert_eq!(next(900), 1100);
        assert_eq!(next(1150), 1300);
    }
}
