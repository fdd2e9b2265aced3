use crate::schedule::{BreakConfig, WorkingHours};
use crate::timespan::TimeSpan;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const APP_DIR: &str = "respite";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "respite.log";

pub const MIN_TICK_INTERVAL_MS: u64 = 100;
pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;
pub const MAX_FREQUENCY: TimeSpan = TimeSpan::from_mins(24 * 60);
/// A break frequency must span more than this many ticks.
pub const MIN_TICKS_PER_FREQUENCY: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaturalBreaks {
    pub enabled: bool,
    /// Idle time after which the user counts as away.
    pub inactivity_reset: TimeSpan,
}

impl Default for NaturalBreaks {
    fn default() -> Self {
        Self {
            enabled: true,
            inactivity_reset: TimeSpan::from_mins(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub breaks: Vec<BreakConfig>,
    pub working_hours: WorkingHours,
    pub natural_breaks: NaturalBreaks,
    pub reset_on_lock: bool,
    pub volume: f32,
    pub tick_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            breaks: vec![BreakConfig::micro(), BreakConfig::long()],
            working_hours: WorkingHours::default(),
            natural_breaks: NaturalBreaks::default(),
            reset_on_lock: true,
            volume: 1.0,
            tick_interval_ms: 1000,
        }
    }
}

impl Settings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn enabled_breaks(&self) -> impl Iterator<Item = &BreakConfig> {
        self.breaks.iter().filter(|config| config.enabled)
    }

    pub fn idle_reset(&self) -> Option<TimeSpan> {
        self.natural_breaks
            .enabled
            .then_some(self.natural_breaks.inactivity_reset)
    }

    /// Reads settings from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!("no settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(SettingsError::Read(path.to_path_buf(), err)),
        };

        let settings: Settings = serde_json::from_str(&raw)
            .map_err(|e| SettingsError::Parse(path.to_path_buf(), e))?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Write(path.to_path_buf(), e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(SettingsError::Serialize)?;
        fs::write(path, json + "\n").map_err(|e| SettingsError::Write(path.to_path_buf(), e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut names = HashSet::new();

        for config in &self.breaks {
            let name = config.name.trim();
            if name.is_empty() {
                return Err(ValidationError::EmptyBreakName);
            }
            if !names.insert(name) {
                return Err(ValidationError::DuplicateBreakName(name.to_string()));
            }
            if config.frequency.is_zero() {
                return Err(ValidationError::ZeroFrequency(name.to_string()));
            }
            if config.frequency > MAX_FREQUENCY {
                return Err(ValidationError::FrequencyTooLong(name.to_string(), MAX_FREQUENCY));
            }
            if config.length.is_zero() {
                return Err(ValidationError::ZeroLength(name.to_string()));
            }
            if config.length >= config.frequency {
                return Err(ValidationError::LengthNotShorterThanFrequency(name.to_string()));
            }
            if config.postpone_limit > 0 && config.postpone_length.is_zero() {
                return Err(ValidationError::ZeroPostponeLength(name.to_string()));
            }
            if let Some(lead) = config.notify_before {
                if lead >= config.frequency {
                    return Err(ValidationError::WarningNotShorterThanFrequency(name.to_string()));
                }
            }
        }

        for (weekday, day) in self.working_hours.days() {
            if let Some(range) = day.ranges.iter().find(|range| !range.is_well_formed()) {
                return Err(ValidationError::MalformedRange {
                    day: weekday.to_string(),
                    from: range.from,
                    to: range.to,
                });
            }
        }

        if self.natural_breaks.enabled && self.natural_breaks.inactivity_reset.is_zero() {
            return Err(ValidationError::ZeroInactivityReset);
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ValidationError::Volume(self.volume));
        }
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&self.tick_interval_ms) {
            return Err(ValidationError::TickInterval(self.tick_interval_ms));
        }
        let min_frequency = self.tick_interval() * MIN_TICKS_PER_FREQUENCY;
        if let Some(config) = self.breaks.iter().find(|config| *config.frequency <= min_frequency) {
            return Err(ValidationError::FrequencyNotAboveTicks(
                config.name.trim().to_string(),
                TimeSpan::from(min_frequency),
            ));
        }

        Ok(())
    }

    /// Writes the default settings to `path` unless a file is already there.
    pub fn write_defaults(path: &Path, force: bool) -> Result<(), SettingsError> {
        if !force && path.exists() {
            return Err(SettingsError::AlreadyExists(path.to_path_buf()));
        }
        Self::default().save(path)
    }

    /// Human readable overview of the breaks and working hours.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        for config in &self.breaks {
            let mut line = format!(
                "{}: {} every {} ({}",
                config.name, config.length, config.frequency, config.notification
            );
            if config.postpone_limit > 0 {
                line += &format!(
                    ", postpone {}x by {}",
                    config.postpone_limit, config.postpone_length
                );
            }
            if let Some(lead) = config.notify_before {
                line += &format!(", warn {lead} ahead");
            }
            if !config.enabled {
                line += ", disabled";
            }
            lines.push(line + ")");
        }

        if self.working_hours.enabled {
            for (weekday, day) in self.working_hours.days() {
                let hours = if day.enabled && !day.ranges.is_empty() {
                    day.ranges.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
                } else {
                    "off".to_string()
                };
                lines.push(format!("{weekday}: {hours}"));
            }
        } else {
            lines.push("working hours: always".to_string());
        }

        match self.idle_reset() {
            Some(after) => lines.push(format!("natural breaks after {after} idle")),
            None => lines.push("natural breaks: off".to_string()),
        }

        lines.join("\n")
    }
}

pub fn default_settings_path() -> Result<PathBuf, SettingsError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
        .ok_or(SettingsError::NoConfigDir)
}

pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(LOG_FILE)
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {0}: {1}")]
    Read(PathBuf, io::Error),
    #[error("failed to parse settings in {0}: {1}")]
    Parse(PathBuf, serde_json::Error),
    #[error("failed to write settings to {0}: {1}")]
    Write(PathBuf, io::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(serde_json::Error),
    #[error("settings file {0} already exists")]
    AlreadyExists(PathBuf),
    #[error("could not determine the configuration directory")]
    NoConfigDir,
    #[error("invalid settings: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("break names must not be empty")]
    EmptyBreakName,
    #[error("break \"{0}\" is defined more than once")]
    DuplicateBreakName(String),
    #[error("break \"{0}\" must have a non-zero frequency")]
    ZeroFrequency(String),
    #[error("break \"{0}\" must not be more than {1} apart")]
    FrequencyTooLong(String, TimeSpan),
    #[error("break \"{0}\" must have a non-zero length")]
    ZeroLength(String),
    #[error("break \"{0}\" must be shorter than its frequency")]
    LengthNotShorterThanFrequency(String),
    #[error("break \"{0}\" can be postponed but has no postpone length")]
    ZeroPostponeLength(String),
    #[error("the warning for break \"{0}\" must come less than one frequency ahead")]
    WarningNotShorterThanFrequency(String),
    #[error("working hours on {day} contain the malformed range {from}-{to}")]
    MalformedRange { day: String, from: u16, to: u16 },
    #[error("the inactivity reset time must be non-zero")]
    ZeroInactivityReset,
    #[error("volume must be between 0.0 and 1.0, got {0}")]
    Volume(f32),
    #[error("tick interval must be between {MIN_TICK_INTERVAL_MS} and {MAX_TICK_INTERVAL_MS} ms, got {0}")]
    TickInterval(u64),
    #[error("break \"{0}\" must be more than {1} apart at the configured tick interval")]
    FrequencyNotAboveTicks(String, TimeSpan),
}
