use crate::timespan::TimeSpan;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;

pub mod working_hours;

pub use working_hours::{DayHours, MinuteRange, WorkingHours};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStyle {
    /// A transient desktop notification.
    #[default]
    Notification,
    /// The full-screen break view.
    Popup,
}

impl Display for NotificationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationStyle::Notification => write!(f, "notification"),
            NotificationStyle::Popup => write!(f, "popup"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakConfig {
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub frequency: TimeSpan,
    pub length: TimeSpan,
    pub postpone_length: TimeSpan,
    #[serde(default)]
    pub postpone_limit: u32,
    #[serde(default)]
    pub notification: NotificationStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_before: Option<TimeSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ideas: Vec<String>,
}

fn enabled_by_default() -> bool {
    true
}

impl BreakConfig {
    pub fn micro() -> Self {
        Self {
            name: "micro".to_string(),
            enabled: true,
            frequency: TimeSpan::from_mins(10),
            length: TimeSpan::from_secs(20),
            postpone_length: TimeSpan::from_mins(2),
            postpone_limit: 1,
            notification: NotificationStyle::Notification,
            sound: None,
            notify_before: Some(TimeSpan::from_secs(10)),
            ideas: vec![
                "Look at something at least 20 feet away.".to_string(),
                "Roll your shoulders back a few times.".to_string(),
                "Close your eyes and take a slow breath.".to_string(),
            ],
        }
    }

    pub fn long() -> Self {
        Self {
            name: "long".to_string(),
            enabled: true,
            frequency: TimeSpan::from_mins(30),
            length: TimeSpan::from_mins(5),
            postpone_length: TimeSpan::from_mins(5),
            postpone_limit: 2,
            notification: NotificationStyle::Popup,
            sound: None,
            notify_before: Some(TimeSpan::from_secs(30)),
            ideas: vec![
                "Stand up and walk around for a bit.".to_string(),
                "Get a glass of water.".to_string(),
                "Stretch your back and your legs.".to_string(),
            ],
        }
    }
}

/// Next due time for every scheduled break type.
///
/// Entries are removed while a break is being shown or while scheduling is
/// suspended, so a present entry always lies in the future once the clock has
/// finished processing a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleState {
    next_due: BTreeMap<String, NaiveDateTime>,
}

impl ScheduleState {
    /// Schedules every break at `now + frequency`, replacing previous entries.
    pub fn reseed<'a>(&mut self, breaks: impl IntoIterator<Item = &'a BreakConfig>, now: NaiveDateTime) {
        self.next_due = breaks
            .into_iter()
            .map(|config| (config.name.clone(), now + config.frequency.as_delta()))
            .collect();
    }

    pub fn clear(&mut self) {
        self.next_due.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.next_due.is_empty()
    }

    pub fn set(&mut self, name: &str, at: NaiveDateTime) {
        self.next_due.insert(name.to_string(), at);
    }

    pub fn remove(&mut self, name: &str) -> Option<NaiveDateTime> {
        self.next_due.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<NaiveDateTime> {
        self.next_due.get(name).copied()
    }

    /// Names of every entry due at or before `now`.
    pub fn due(&self, now: NaiveDateTime) -> Vec<String> {
        self.next_due
            .iter()
            .filter(|(_, due)| **due <= now)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Earliest entry first.
    pub fn upcoming(&self) -> Vec<(String, NaiveDateTime)> {
        let mut entries: Vec<_> = self
            .next_due
            .iter()
            .map(|(name, due)| (name.clone(), *due))
            .collect();
        entries.sort_by_key(|(_, due)| *due);
        entries
    }
}
