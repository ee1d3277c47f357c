//! # Alarm registry
//! The two medicine alarms. The registry only stores them; matching against the clock is
//! done by the ring controller.

/// Identifies one of the two alarms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmId {
    /// Alarm 1, wins when both alarms match the same minute
    First,
    /// Alarm 2
    Second,
}

impl AlarmId {
    /// Both alarms in priority order
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    /// The number shown to the user, 1 or 2
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }

    /// Storage slot of this alarm
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One alarm time and whether it is armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmEntry {
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// Whether the alarm takes part in matching
    pub active: bool,
}

impl AlarmEntry {
    /// Whether the alarm is active and set to `hour:minute`
    pub const fn matches(&self, hour: u8, minute: u8) -> bool {
        self.active && self.hour == hour && self.minute == minute
    }
}

/// Storage for the two alarms
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmRegistry {
    /// Alarm 1 and alarm 2
    entries: [AlarmEntry; 2],
}

impl AlarmRegistry {
    /// Both alarms at 00:00 and inactive
    pub const fn new() -> Self {
        Self {
            entries: [
                AlarmEntry {
                    hour: 0,
                    minute: 0,
                    active: false,
                },
                AlarmEntry {
                    hour: 0,
                    minute: 0,
                    active: false,
                },
            ],
        }
    }

    /// The entry of alarm `id`
    pub const fn get(&self, id: AlarmId) -> AlarmEntry {
        self.entries[id.index()]
    }

    /// Store `hour:minute` for alarm `id` and activate it
    pub const fn set(&mut self, id: AlarmId, hour: u8, minute: u8) {
        self.entries[id.index()] = AlarmEntry {
            hour,
            minute,
            active: true,
        };
    }

    /// Deactivate alarm `id`, keeping its time
    pub const fn clear(&mut self, id: AlarmId) {
        self.entries[id.index()].active = false;
    }

    /// Whether alarm `id` is active
    pub const fn is_active(&self, id: AlarmId) -> bool {
        self.entries[id.index()].active
    }

    /// Whether at least one alarm is active
    pub const fn any_active(&self) -> bool {
        self.entries[0].active || self.entries[1].active
    }

    /// All active alarms in priority order
    pub fn active(&self) -> impl Iterator<Item = (AlarmId, AlarmEntry)> + '_ {
        AlarmId::ALL
            .into_iter()
            .map(|id| (id, self.get(id)))
            .filter(|(_, entry)| entry.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registry_is_empty() {
        let registry = AlarmRegistry::new();
        assert!(!registry.any_active());
        assert_eq!(registry.active().count(), 0);
    }

    #[test]
    fn set_activates_and_clear_keeps_time() {
        let mut registry = AlarmRegistry::new();
        registry.set(AlarmId::Second, 7, 45);
        assert!(registry.is_active(AlarmId::Second));
        assert!(!registry.is_active(AlarmId::First));

        registry.clear(AlarmId::Second);
        let entry = registry.get(AlarmId::Second);
        assert!(!entry.active);
        assert_eq!((entry.hour, entry.minute), (7, 45));
    }

    #[test]
    fn inactive_entry_never_matches() {
        let entry = AlarmEntry {
            hour: 8,
            minute: 0,
            active: false,
        };
        assert!(!entry.matches(8, 0));
    }

    #[test]
    fn active_lists_in_priority_order() {
        let mut registry = AlarmRegistry::new();
        registry.set(AlarmId::Second, 9, 0);
        registry.set(AlarmId::First, 21, 30);
        let ids: Vec<AlarmId> = registry.active().map(|(id, _)| id).collect();
        assert_eq!(ids, [AlarmId::First, AlarmId::Second]);
    }
}
