//! # View
//! Turns the [`SystemState`] into the lines of text the display draws. The display task
//! knows nothing about screens; it only draws [`Frame`]s, and only when they change.
//!
//! Precedence, highest first: a pending notice, the ring/snooze screens, the climate
//! warning (clock face only), then the navigator's screen.

use crate::alarm::{AlarmEntry, AlarmId};
use crate::environment::{Classification, Sample};
use crate::menu::{delete_slot_alarm, AlarmField, Screen, DELETE_BACK_SLOT, MAIN_MENU_ITEMS};
use crate::ring::RingState;
use crate::state::{NoticeKind, SystemState};
use crate::time::LocalTime;
use core::fmt::{self, Write};
use embassy_time::Instant;
use heapless::{String, Vec};

/// Characters per line; longer text is cut off
pub const LINE_CAPACITY: usize = 32;

/// Lines per frame
pub const MAX_LINES: usize = 8;

/// Font size of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineStyle {
    Small,
    Large,
}

/// One line of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String<LINE_CAPACITY>,
    pub style: LineStyle,
}

/// The full content of the display, top to bottom
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    lines: Vec<Line, MAX_LINES>,
}

impl Frame {
    /// An empty frame
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines, top to bottom
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.text.contains(needle))
    }

    /// Append a small line
    fn small(&mut self, args: fmt::Arguments<'_>) {
        self.push(LineStyle::Small, args);
    }

    /// Append a large line
    fn large(&mut self, args: fmt::Arguments<'_>) {
        self.push(LineStyle::Large, args);
    }

    /// Append a line; text past the capacity and lines past the frame are dropped
    fn push(&mut self, style: LineStyle, args: fmt::Arguments<'_>) {
        let mut text = String::new();
        let _ = text.write_fmt(args);
        let _ = self.lines.push(Line { text, style });
    }
}

/// Render the state at `now`. `time` is this tick's clock reading, `None` when the clock
/// could not be read.
pub fn render(state: &SystemState, time: Option<&LocalTime>, now: Instant) -> Frame {
    let mut frame = Frame::new();

    if let Some(notice) = state.active_notice(now) {
        render_notice(&mut frame, state, notice);
        return frame;
    }

    match state.ring.state() {
        RingState::Ringing { alarm, .. } => {
            frame.large(format_args!("MEDICINE TIME!"));
            frame.small(format_args!("Alarm {}", alarm.number()));
            frame.small(format_args!(""));
            frame.small(format_args!("CANCEL=Snooze OK=Stop"));
            return frame;
        }
        RingState::Snoozed { alarm, .. } => {
            let remaining = state.ring.snooze_remaining(now).unwrap_or_default().as_secs();
            frame.small(format_args!("Alarm {} snoozed", alarm.number()));
            frame.small(format_args!(""));
            frame.large(format_args!(
                "Rings in {}:{:02}",
                remaining / 60,
                remaining % 60
            ));
            frame.small(format_args!(""));
            frame.small(format_args!("OK=Stop"));
            return frame;
        }
        RingState::Idle => {}
    }

    match state.navigator.screen() {
        Screen::NormalDisplay => {
            let sample = state.environment.last_sample();
            let classification = state.environment.classification();
            match (sample, issue_label(classification)) {
                (Some(sample), Some(issue)) if state.warning_visible(now) => {
                    render_warning(&mut frame, state, classification, issue, sample);
                }
                _ => render_clock(&mut frame, state, time, sample),
            }
        }
        Screen::MainMenu => {
            frame.small(format_args!("MENU:"));
            for (index, item) in MAIN_MENU_ITEMS.iter().enumerate() {
                let marker = cursor_marker(index == usize::from(state.navigator.cursor()));
                frame.small(format_args!("{marker}{}", item.label()));
            }
        }
        Screen::SetTimezone => {
            frame.small(format_args!("SET TIME ZONE"));
            frame.small(format_args!("Current: UTC{}", state.timezone.format()));
            frame.small(format_args!(""));
            frame.small(format_args!("UP/DOWN to change"));
            frame.small(format_args!("OK to confirm"));
            frame.small(format_args!("CANCEL to go back"));
        }
        Screen::SetAlarm {
            alarm,
            field,
            hour,
            minute,
        } => {
            let (label, help) = match field {
                AlarmField::Hour => ("hour", "OK next"),
                AlarmField::Minute => ("minute", "OK to set"),
            };
            frame.small(format_args!("SET ALARM {}", alarm.number()));
            frame.small(format_args!("Setting {label}:"));
            frame.large(format_args!("{hour:02}:{minute:02}"));
            frame.small(format_args!("UP/DOWN to change"));
            frame.small(format_args!("{help}"));
        }
        Screen::ViewAlarms => {
            frame.small(format_args!("ACTIVE ALARMS"));
            frame.small(format_args!(""));
            if state.alarms.any_active() {
                for (id, entry) in state.alarms.active() {
                    frame.small(format_args!(
                        "Alarm {}: {:02}:{:02}",
                        id.number(),
                        entry.hour,
                        entry.minute
                    ));
                }
            } else {
                frame.small(format_args!("No active alarms"));
            }
            frame.small(format_args!(""));
            frame.small(format_args!("OK/CANCEL to go back"));
        }
        Screen::DeleteAlarmMenu => {
            frame.small(format_args!("DELETE ALARM"));
            frame.small(format_args!(""));
            for slot in 0..=DELETE_BACK_SLOT {
                let marker = cursor_marker(slot == state.navigator.cursor());
                match delete_slot_alarm(slot) {
                    Some(id) => render_delete_row(&mut frame, marker, id, state.alarms.get(id)),
                    None => frame.small(format_args!("{marker}Back")),
                }
            }
            if !state.alarms.any_active() {
                frame.small(format_args!("No active alarms"));
            }
        }
        Screen::DeleteConfirm(alarm) => {
            let entry = state.alarms.get(alarm);
            frame.small(format_args!("DELETE ALARM {}?", alarm.number()));
            frame.small(format_args!(""));
            frame.large(format_args!("{:02}:{:02}", entry.hour, entry.minute));
            frame.small(format_args!(""));
            frame.small(format_args!("OK=Delete CANCEL=Back"));
        }
    }

    frame
}

/// `"> "` for the row under the cursor, two spaces otherwise
const fn cursor_marker(selected: bool) -> &'static str {
    if selected { "> " } else { "  " }
}

/// One alarm row of the delete screen
fn render_delete_row(frame: &mut Frame, marker: &str, id: AlarmId, entry: AlarmEntry) {
    if entry.active {
        frame.small(format_args!(
            "{marker}Alarm {} {:02}:{:02}",
            id.number(),
            entry.hour,
            entry.minute
        ));
    } else {
        frame.small(format_args!("{marker}Alarm {} (off)", id.number()));
    }
}

/// Confirmation notices
fn render_notice(frame: &mut Frame, state: &SystemState, notice: NoticeKind) {
    match notice {
        NoticeKind::AlarmSet {
            alarm,
            hour,
            minute,
        } => {
            frame.small(format_args!("Alarm {} set for", alarm.number()));
            frame.small(format_args!(""));
            frame.large(format_args!("{hour:02}:{minute:02}"));
        }
        NoticeKind::AlarmDeleted(alarm) => {
            frame.small(format_args!("Alarm {} deleted", alarm.number()));
        }
        NoticeKind::AlarmSnoozed => {
            frame.large(format_args!("Alarm Snoozed"));
            frame.small(format_args!("Will ring again"));
            frame.small(format_args!(
                "in {} min",
                state.settings.snooze_duration.as_secs() / 60
            ));
        }
        NoticeKind::AlarmStopped => {
            frame.large(format_args!("Alarm Stopped"));
        }
    }
}

/// The clock face
fn render_clock(
    frame: &mut Frame,
    state: &SystemState,
    time: Option<&LocalTime>,
    sample: Option<Sample>,
) {
    match time {
        Some(t) => {
            frame.small(format_args!("{}", t.weekday.name()));
            frame.small(format_args!("{} {} {}", t.day, t.month_name(), t.year));
            frame.large(format_args!("{:02}:{:02}:{:02}", t.hour, t.minute, t.second));
        }
        None => {
            frame.small(format_args!("Failed to get time"));
            frame.small(format_args!(""));
        }
    }

    let mut active = state.alarms.active();
    match (active.next(), active.next()) {
        (Some((_, a)), Some((_, b))) => frame.small(format_args!(
            "Alarms {:02}:{:02} {:02}:{:02}",
            a.hour, a.minute, b.hour, b.minute
        )),
        (Some((id, a)), None) => frame.small(format_args!(
            "Alarm {} {:02}:{:02}",
            id.number(),
            a.hour,
            a.minute
        )),
        _ => frame.small(format_args!("No alarms set")),
    }

    if let Some(s) = sample {
        frame.small(format_args!("{:.1} C  {:.1}%", s.temperature, s.humidity));
    }
}

/// Headline of the warning screen, `None` when the climate is healthy
const fn issue_label(classification: Classification) -> Option<&'static str> {
    match classification {
        Classification::Both => Some("Temp & Humidity Issues"),
        Classification::HumidityOnly => Some("Humidity Issue"),
        Classification::TempOnly => Some("Temperature Issue"),
        Classification::None => None,
    }
}

/// The climate warning screen
fn render_warning(
    frame: &mut Frame,
    state: &SystemState,
    classification: Classification,
    issue: &str,
    sample: Sample,
) {
    let t = state.environment.thresholds();

    frame.small(format_args!("WARNING!"));
    frame.small(format_args!("{issue}"));
    frame.small(format_args!("Temp: {:.1} C", sample.temperature));
    frame.small(format_args!("Humidity: {:.1}%", sample.humidity));
    if classification.temperature() {
        frame.small(format_args!(
            "Healthy temp: {:.0}-{:.0}C",
            t.min_temp, t.max_temp
        ));
    }
    if classification.humidity() {
        frame.small(format_args!(
            "Healthy hum: {:.0}-{:.0}%",
            t.min_humidity, t.max_humidity
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, ButtonLevels};
    use crate::time::{TimeSource, Weekday};
    use crate::Error;

    struct Clock;

    impl TimeSource for Clock {
        fn set_utc_offset(&mut self, _seconds: i32) {}

        fn now(&mut self) -> Result<LocalTime, Error> {
            Err(Error::TimeUnavailable)
        }
    }

    fn thursday_morning() -> LocalTime {
        LocalTime {
            year: 2025,
            month: 10,
            day: 16,
            weekday: Weekday::Thursday,
            hour: 8,
            minute: 5,
            second: 9,
        }
    }

    fn ms(value: u64) -> Instant {
        Instant::from_millis(value)
    }

    fn texts(frame: &Frame) -> std::vec::Vec<&str> {
        frame.lines().iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn clock_face_shows_date_time_and_alarms() {
        let mut state = SystemState::default();
        state.alarms.set(AlarmId::Second, 21, 30);
        let frame = render(&state, Some(&thursday_morning()), ms(0));

        assert_eq!(
            texts(&frame),
            ["Thursday", "16 October 2025", "08:05:09", "Alarm 2 21:30"]
        );
        assert_eq!(frame.lines()[2].style, LineStyle::Large);
    }

    #[test]
    fn clock_face_falls_back_without_time() {
        let state = SystemState::default();
        let frame = render(&state, None, ms(0));
        assert_eq!(texts(&frame)[0], "Failed to get time");
        assert!(frame.contains("No alarms set"));
    }

    #[test]
    fn main_menu_marks_cursor() {
        let mut state = SystemState::default();
        let mut clock = Clock;
        state.tick(ButtonLevels::only(Button::Select), ms(0), &mut clock);
        state.tick(ButtonLevels::RELEASED, ms(10), &mut clock);
        state.tick(ButtonLevels::only(Button::Down), ms(300), &mut clock);

        let frame = render(&state, None, ms(300));
        assert_eq!(
            texts(&frame),
            [
                "MENU:",
                "  Set Time Zone",
                "> Set Alarm 1",
                "  Set Alarm 2",
                "  View Alarms",
                "  Delete Alarm",
                "  Back"
            ]
        );
    }

    #[test]
    fn warning_screen_lists_offending_ranges() {
        let mut state = SystemState::default();
        let sample = Sample {
            temperature: 33.46,
            humidity: 70.0,
        };
        state.on_sample(sample, ms(0)).unwrap();

        let frame = render(&state, Some(&thursday_morning()), ms(1000));
        assert_eq!(
            texts(&frame),
            [
                "WARNING!",
                "Temperature Issue",
                "Temp: 33.5 C",
                "Humidity: 70.0%",
                "Healthy temp: 24-32C"
            ]
        );

        let later = render(&state, Some(&thursday_morning()), ms(6000));
        assert!(later.contains("08:05:09"));
        assert!(later.contains("33.5 C  70.0%"));
    }

    #[test]
    fn healthy_sample_replaces_the_warning_with_the_clock() {
        let mut state = SystemState::default();
        let hot = Sample {
            temperature: 40.0,
            humidity: 70.0,
        };
        let fine = Sample {
            temperature: 28.0,
            humidity: 70.0,
        };
        state.on_sample(hot, ms(0)).unwrap();
        state.on_sample(fine, ms(1000)).unwrap();

        let frame = render(&state, Some(&thursday_morning()), ms(1500));
        assert!(!frame.contains("WARNING!"));
        assert!(!frame.contains("Temperature Issue"));
        assert!(frame.contains("28.0 C  70.0%"));
        assert_eq!(issue_label(Classification::None), None);
    }

    #[test]
    fn timezone_screen_shows_offset() {
        let mut state = SystemState::default();
        state.timezone = crate::timezone::Timezone::from_half_hours(-7).unwrap();
        let mut clock = Clock;
        state.tick(ButtonLevels::only(Button::Select), ms(0), &mut clock);
        state.tick(ButtonLevels::RELEASED, ms(10), &mut clock);
        state.tick(ButtonLevels::only(Button::Select), ms(300), &mut clock);

        let frame = render(&state, None, ms(300));
        assert!(frame.contains("Current: UTC-03:30"));
    }

    #[test]
    fn delete_menu_marks_inactive_rows() {
        let mut state = SystemState::default();
        state.alarms.set(AlarmId::Second, 9, 0);
        let mut clock = Clock;
        let presses = [Button::Select, Button::Down, Button::Down, Button::Down, Button::Down];
        let mut t = 0;
        for button in presses {
            state.tick(ButtonLevels::only(button), ms(t), &mut clock);
            state.tick(ButtonLevels::RELEASED, ms(t + 10), &mut clock);
            t += 300;
        }
        state.tick(ButtonLevels::only(Button::Select), ms(t), &mut clock);

        let frame = render(&state, None, ms(t));
        assert_eq!(
            texts(&frame),
            ["DELETE ALARM", "", "  Alarm 1 (off)", "> Alarm 2 09:00", "  Back"]
        );
    }

    #[test]
    fn snoozed_screen_counts_down() {
        let mut state = SystemState::default();
        state.alarms.set(AlarmId::First, 8, 5);
        let time = LocalTime {
            second: 0,
            ..thursday_morning()
        };
        state.ring.check_alarms(&time, &state.alarms, ms(0));
        let frame = render(&state, Some(&time), ms(100));
        assert_eq!(frame.lines()[0].text.as_str(), "MEDICINE TIME!");

        state.ring.snooze(ms(1000));
        let frame = render(&state, Some(&time), ms(1000 + 61_000));
        assert_eq!(texts(&frame)[0], "Alarm 1 snoozed");
        assert!(frame.contains("Rings in 3:59"));
    }

    #[test]
    fn notice_overrides_screen() {
        let mut state = SystemState::default();
        state.show_notice(
            NoticeKind::AlarmSet {
                alarm: AlarmId::First,
                hour: 7,
                minute: 5,
            },
            ms(0),
        );
        let frame = render(&state, None, ms(1999));
        assert_eq!(texts(&frame), ["Alarm 1 set for", "", "07:05"]);
        assert!(render(&state, None, ms(2000)).contains("Failed to get time"));
    }
}
