//! # Button input
//! Turns the sampled levels of the four buttons into edge-triggered [`ButtonEvent`]s.
//!
//! Only the press edge is an event, releases are never reported. One debounce window is
//! shared by all four buttons: after an accepted event, no button can produce another one
//! until the window has passed. A press that starts inside the window stays pending and is
//! accepted on the first sample after the window if the button is still down. Accepted
//! presses latch their button until release, so a held button yields exactly one event and
//! never auto-repeats.

use embassy_time::{Duration, Instant};

/// The buttons of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Up, increments values and moves the cursor up
    Up,
    /// Down, decrements values and moves the cursor down
    Down,
    /// Select (OK), confirms; stops a ringing or snoozed alarm
    Select,
    /// Cancel, goes back; snoozes a ringing alarm
    Cancel,
}

impl Button {
    /// All buttons in sampling priority order
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Select, Self::Cancel];

    /// Position of this button in [`Self::ALL`] and in [`ButtonLevels`]
    const fn index(self) -> usize {
        self as usize
    }
}

/// A debounced press of one button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    /// The button that was pressed
    pub source: Button,
}

/// Logical level of every button for one sample, `true` meaning pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonLevels([bool; 4]);

impl ButtonLevels {
    /// No button pressed
    pub const RELEASED: Self = Self([false; 4]);

    /// Build the levels from the four pressed flags
    pub const fn new(up: bool, down: bool, select: bool, cancel: bool) -> Self {
        Self([up, down, select, cancel])
    }

    /// Only `button` pressed
    pub const fn only(button: Button) -> Self {
        let mut levels = [false; 4];
        levels[button.index()] = true;
        Self(levels)
    }

    /// Whether `button` is pressed in this sample
    pub const fn is_pressed(&self, button: Button) -> bool {
        self.0[button.index()]
    }
}

/// Where one button is between press and release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    /// Not pressed
    Released,
    /// Pressed inside the debounce window, waiting for it to pass
    Pending,
    /// Press consumed, ignored until release
    Latched,
}

/// Debouncer for the four buttons
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Minimum spacing between accepted events
    window: Duration,
    /// Press state per button, indexed like [`Button::ALL`]
    contacts: [Contact; 4],
    /// When the last event was accepted
    last_accepted: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given window
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            contacts: [Contact::Released; 4],
            last_accepted: None,
        }
    }

    /// Feed one sample. Returns the accepted event, if any.
    ///
    /// When several buttons are ready in the same sample, the first in [`Button::ALL`]
    /// order wins and the others are swallowed.
    pub fn sample(&mut self, levels: ButtonLevels, now: Instant) -> Option<ButtonEvent> {
        let open = self.window_elapsed(now);
        let mut accepted = None;

        for button in Button::ALL {
            let contact = &mut self.contacts[button.index()];
            if !levels.is_pressed(button) {
                *contact = Contact::Released;
                continue;
            }
            if *contact == Contact::Latched {
                continue;
            }

            if !open {
                *contact = Contact::Pending;
                continue;
            }
            if accepted.is_none() {
                accepted = Some(ButtonEvent { source: button });
            }
            *contact = Contact::Latched;
        }

        if accepted.is_some() {
            self.last_accepted = Some(now);
        }
        accepted
    }

    /// Whether a new event may be accepted at `now`
    fn window_elapsed(&self, now: Instant) -> bool {
        self.last_accepted.is_none_or(|last| {
            now.checked_duration_since(last)
                .is_some_and(|elapsed| elapsed >= self.window)
        })
    }
}
