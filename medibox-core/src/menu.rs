//! # Menu navigator
//! The screen state machine driven by debounced button events. It mutates the
//! [`AlarmRegistry`] and the [`Timezone`] and reports what it did as a [`MenuAction`].
//!
//! The navigator only runs while no alarm rings or is snoozed; the orchestrator routes
//! buttons to the ring controller otherwise. Confirmation steps are screens of their own,
//! so nothing here ever waits.

use crate::alarm::{AlarmId, AlarmRegistry};
use crate::input::Button;
use crate::time::TimeSource;
use crate::timezone::Timezone;

/// Entries of the main menu, in cursor order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MainMenuItem {
    SetTimezone,
    SetAlarm(AlarmId),
    ViewAlarms,
    DeleteAlarm,
    Back,
}

impl MainMenuItem {
    /// The label shown in the menu
    pub const fn label(self) -> &'static str {
        match self {
            Self::SetTimezone => "Set Time Zone",
            Self::SetAlarm(AlarmId::First) => "Set Alarm 1",
            Self::SetAlarm(AlarmId::Second) => "Set Alarm 2",
            Self::ViewAlarms => "View Alarms",
            Self::DeleteAlarm => "Delete Alarm",
            Self::Back => "Back",
        }
    }
}

/// The main menu, cursor 0 first
pub const MAIN_MENU_ITEMS: [MainMenuItem; 6] = [
    MainMenuItem::SetTimezone,
    MainMenuItem::SetAlarm(AlarmId::First),
    MainMenuItem::SetAlarm(AlarmId::Second),
    MainMenuItem::ViewAlarms,
    MainMenuItem::DeleteAlarm,
    MainMenuItem::Back,
];

/// Highest main menu cursor
const MAIN_MENU_LAST: u8 = 5;

/// Cursor of the "Back" row on the delete screen; rows 0 and 1 are the alarms
pub const DELETE_BACK_SLOT: u8 = 2;

/// The part of an alarm time being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmField {
    Hour,
    Minute,
}

/// One node of the menu state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    /// Clock face, the idle screen
    #[default]
    NormalDisplay,
    MainMenu,
    SetTimezone,
    /// Editing `alarm`; `hour` and `minute` are the uncommitted draft
    SetAlarm {
        alarm: AlarmId,
        field: AlarmField,
        hour: u8,
        minute: u8,
    },
    /// Read-only list of the active alarms
    ViewAlarms,
    DeleteAlarmMenu,
    /// Waiting for the user to confirm deleting the alarm
    DeleteConfirm(AlarmId),
}

/// What a button press changed outside the navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    /// Only the screen or cursor moved, if anything
    #[default]
    None,
    /// The offset was pushed to the time source
    TimezoneApplied(Timezone),
    /// An alarm was stored and activated
    AlarmSet {
        alarm: AlarmId,
        hour: u8,
        minute: u8,
    },
    /// An alarm was deactivated
    AlarmDeleted(AlarmId),
}

/// Current screen and cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Navigator {
    /// Current screen
    screen: Screen,
    /// Cursor on the main menu or the delete screen, unused elsewhere
    cursor: u8,
}

impl Navigator {
    /// A navigator on the clock face
    pub const fn new() -> Self {
        Self {
            screen: Screen::NormalDisplay,
            cursor: 0,
        }
    }

    /// The current screen
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// The cursor of the current list screen
    pub const fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Drop whatever is being edited and go back to the clock face
    pub const fn reset(&mut self) {
        *self = Self::new();
    }

    /// Handle one debounced button press. Pairs of screen and button without a meaning
    /// are ignored.
    pub fn handle<T: TimeSource>(
        &mut self,
        button: Button,
        alarms: &mut AlarmRegistry,
        timezone: &mut Timezone,
        clock: &mut T,
    ) -> MenuAction {
        match self.screen {
            Screen::NormalDisplay => {
                if button == Button::Select {
                    self.enter_main_menu();
                }
                MenuAction::None
            }
            Screen::MainMenu => {
                self.handle_main_menu(button, alarms);
                MenuAction::None
            }
            Screen::SetTimezone => match button {
                Button::Up => {
                    timezone.increment();
                    MenuAction::None
                }
                Button::Down => {
                    timezone.decrement();
                    MenuAction::None
                }
                Button::Select => {
                    timezone.apply(clock);
                    self.enter_main_menu();
                    MenuAction::TimezoneApplied(*timezone)
                }
                Button::Cancel => {
                    self.enter_main_menu();
                    MenuAction::None
                }
            },
            Screen::SetAlarm {
                alarm,
                field,
                hour,
                minute,
            } => self.handle_set_alarm(button, alarms, alarm, field, hour, minute),
            Screen::ViewAlarms => {
                if matches!(button, Button::Select | Button::Cancel) {
                    self.enter_main_menu();
                }
                MenuAction::None
            }
            Screen::DeleteAlarmMenu => {
                self.handle_delete_menu(button, alarms);
                MenuAction::None
            }
            Screen::DeleteConfirm(alarm) => match button {
                Button::Select => {
                    alarms.clear(alarm);
                    self.enter_delete_menu(alarms);
                    MenuAction::AlarmDeleted(alarm)
                }
                Button::Cancel => {
                    self.enter_delete_menu(alarms);
                    MenuAction::None
                }
                Button::Up | Button::Down => MenuAction::None,
            },
        }
    }

    /// Show the main menu with the cursor on the first entry
    const fn enter_main_menu(&mut self) {
        self.screen = Screen::MainMenu;
        self.cursor = 0;
    }

    /// Show the delete screen with the cursor on the first selectable row
    fn enter_delete_menu(&mut self, alarms: &AlarmRegistry) {
        self.screen = Screen::DeleteAlarmMenu;
        self.cursor = first_delete_slot(alarms);
    }

    /// Main menu: move the cursor without wrapping, dispatch on Select
    fn handle_main_menu(&mut self, button: Button, alarms: &AlarmRegistry) {
        match button {
            Button::Up => self.cursor = self.cursor.saturating_sub(1),
            Button::Down => self.cursor = (self.cursor + 1).min(MAIN_MENU_LAST),
            Button::Cancel => self.reset(),
            Button::Select => match MAIN_MENU_ITEMS[usize::from(self.cursor)] {
                MainMenuItem::SetTimezone => self.screen = Screen::SetTimezone,
                MainMenuItem::SetAlarm(alarm) => {
                    let stored = alarms.get(alarm);
                    self.screen = Screen::SetAlarm {
                        alarm,
                        field: AlarmField::Hour,
                        hour: stored.hour,
                        minute: stored.minute,
                    };
                }
                MainMenuItem::ViewAlarms => self.screen = Screen::ViewAlarms,
                MainMenuItem::DeleteAlarm => self.enter_delete_menu(alarms),
                MainMenuItem::Back => self.reset(),
            },
        }
    }

    /// Alarm editor: hour first, then minute, both wrapping
    fn handle_set_alarm(
        &mut self,
        button: Button,
        alarms: &mut AlarmRegistry,
        alarm: AlarmId,
        field: AlarmField,
        mut hour: u8,
        mut minute: u8,
    ) -> MenuAction {
        match (field, button) {
            (AlarmField::Hour, Button::Up) => hour = (hour + 1) % 24,
            (AlarmField::Hour, Button::Down) => hour = (hour + 23) % 24,
            (AlarmField::Minute, Button::Up) => minute = (minute + 1) % 60,
            (AlarmField::Minute, Button::Down) => minute = (minute + 59) % 60,
            (AlarmField::Hour, Button::Select) => {
                self.screen = Screen::SetAlarm {
                    alarm,
                    field: AlarmField::Minute,
                    hour,
                    minute,
                };
                return MenuAction::None;
            }
            (AlarmField::Minute, Button::Select) => {
                alarms.set(alarm, hour, minute);
                self.enter_main_menu();
                return MenuAction::AlarmSet {
                    alarm,
                    hour,
                    minute,
                };
            }
            (_, Button::Cancel) => {
                self.enter_main_menu();
                return MenuAction::None;
            }
        }

        self.screen = Screen::SetAlarm {
            alarm,
            field,
            hour,
            minute,
        };
        MenuAction::None
    }

    /// Delete screen: the cursor only rests on active alarms and on "Back"
    fn handle_delete_menu(&mut self, button: Button, alarms: &AlarmRegistry) {
        match button {
            Button::Up => self.cursor = step_delete_slot(self.cursor, alarms, false),
            Button::Down => self.cursor = step_delete_slot(self.cursor, alarms, true),
            Button::Select => match delete_slot_alarm(self.cursor) {
                Some(alarm) if alarms.is_active(alarm) => {
                    self.screen = Screen::DeleteConfirm(alarm);
                }
                Some(_) => {}
                None => self.enter_main_menu(),
            },
            Button::Cancel => self.enter_main_menu(),
        }
    }
}

/// The alarm on delete-screen row `slot`, `None` for "Back"
pub const fn delete_slot_alarm(slot: u8) -> Option<AlarmId> {
    match slot {
        0 => Some(AlarmId::First),
        1 => Some(AlarmId::Second),
        _ => None,
    }
}

/// Whether the cursor may rest on delete-screen row `slot`
fn delete_slot_selectable(slot: u8, alarms: &AlarmRegistry) -> bool {
    delete_slot_alarm(slot).is_none_or(|alarm| alarms.is_active(alarm))
}

/// The first selectable delete-screen row, "Back" when no alarm is active
fn first_delete_slot(alarms: &AlarmRegistry) -> u8 {
    (0..=DELETE_BACK_SLOT)
        .find(|&slot| delete_slot_selectable(slot, alarms))
        .unwrap_or(DELETE_BACK_SLOT)
}

/// The next selectable delete-screen row from `cursor`, wrapping around
fn step_delete_slot(cursor: u8, alarms: &AlarmRegistry, forward: bool) -> u8 {
    let rows = DELETE_BACK_SLOT + 1;
    let mut slot = cursor;
    for _ in 0..rows {
        slot = if forward {
            (slot + 1) % rows
        } else {
            (slot + rows - 1) % rows
        };
        if delete_slot_selectable(slot, alarms) {
            return slot;
        }
    }
    DELETE_BACK_SLOT
}
