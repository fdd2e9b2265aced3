use crate::idle::IdleStatus;
use crate::schedule::{BreakConfig, NotificationStyle, ScheduleState, WorkingHours};
use crate::settings::Settings;
use crate::timespan::TimeSpan;
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};
use std::iter::once;
use thiserror::Error;

/// Gaps longer than this many tick intervals are logged as missed ticks.
const MISSED_TICKS_LOGGED_AFTER: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBreak {
    pub name: String,
    pub style: NotificationStyle,
    pub started_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub length: TimeSpan,
    pub postpones_used: u32,
    pub postpone_limit: u32,
    /// Other breaks that fell due together with this one and are taken with it.
    pub covers: Vec<String>,
}

impl ActiveBreak {
    pub fn remaining(&self, now: NaiveDateTime) -> TimeSpan {
        TimeSpan::from_delta(self.ends_at - now)
    }

    /// Fraction of the break already taken, between 0.0 and 1.0.
    pub fn progress(&self, now: NaiveDateTime) -> f64 {
        let total = (self.ends_at - self.started_at).num_milliseconds();
        if total <= 0 {
            return 1.0;
        }
        let elapsed = (now - self.started_at).num_milliseconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn can_postpone(&self) -> bool {
        self.postpones_used < self.postpone_limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    Running,
    Paused { until: Option<NaiveDateTime> },
    Away { since: NaiveDateTime },
    OutsideWorkingHours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    /// The wall clock jumped forward by more than a break interval.
    Sleep { gap: TimeSpan },
    ClockMovedBackwards,
    /// The session was locked for longer than a break interval.
    LongLock { locked_for: TimeSpan },
    WorkingHours,
    Resumed,
    SettingsChanged,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    OutsideWorkingHours,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEvent {
    BreakUpcoming { name: String, starts_in: TimeSpan },
    BreakStarted(ActiveBreak),
    BreakFinished { name: String, early: bool },
    BreakPostponed { name: String, until: NaiveDateTime, postpones_used: u32 },
    BreakSkipped { name: String, next_due: NaiveDateTime },
    NaturalBreakStarted { idle_for: TimeSpan, locked: bool },
    /// The user came back from a natural break; the schedule starts over.
    NaturalBreakEnded { away_for: TimeSpan },
    ScheduleCleared { reason: ClearReason },
    ScheduleReset { reason: ResetReason },
}

#[derive(Debug, Clone, Copy)]
struct Away {
    since: NaiveDateTime,
    locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PauseState {
    Running,
    Until(NaiveDateTime),
    Indefinitely,
}

/// Decides when breaks are due.
///
/// The clock never reads the time itself: every operation receives the
/// current local wall-clock time, so the whole state machine can be driven
/// with synthetic timestamps.
pub struct BreakClock {
    breaks: Vec<BreakConfig>,
    working_hours: WorkingHours,
    idle_reset: Option<TimeSpan>,
    reset_on_lock: bool,
    tick_interval: chrono::Duration,
    schedule: ScheduleState,
    active: Option<ActiveBreak>,
    postpones: HashMap<String, u32>,
    warned: HashSet<String>,
    away: Option<Away>,
    paused: PauseState,
    outside_hours: bool,
    last_tick: NaiveDateTime,
}

impl BreakClock {
    pub fn new(settings: &Settings, now: NaiveDateTime) -> Self {
        let mut clock = Self {
            breaks: Vec::new(),
            working_hours: WorkingHours::default(),
            idle_reset: None,
            reset_on_lock: false,
            tick_interval: chrono::Duration::zero(),
            schedule: ScheduleState::default(),
            active: None,
            postpones: HashMap::new(),
            warned: HashSet::new(),
            away: None,
            paused: PauseState::Running,
            outside_hours: false,
            last_tick: now,
        };
        clock.load(settings);
        clock.restart(now);
        clock
    }

    fn load(&mut self, settings: &Settings) {
        self.breaks = settings.enabled_breaks().cloned().collect();
        self.working_hours = settings.working_hours.clone();
        self.idle_reset = settings.idle_reset();
        self.reset_on_lock = settings.reset_on_lock;
        self.tick_interval = chrono::Duration::milliseconds(settings.tick_interval_ms as i64);
    }

    /// Drops all transient state and schedules from scratch.
    fn restart(&mut self, now: NaiveDateTime) {
        self.active = None;
        self.away = None;
        self.paused = PauseState::Running;
        self.outside_hours = !self.working_hours.contains(now);
        if self.outside_hours {
            self.clear_schedule();
        } else {
            self.reseed(now);
        }
    }

    fn reseed(&mut self, now: NaiveDateTime) {
        self.schedule.reseed(&self.breaks, now);
        self.postpones.clear();
        self.warned.clear();
    }

    fn clear_schedule(&mut self) {
        self.schedule.clear();
        self.postpones.clear();
        self.warned.clear();
    }

    /// Advances the state machine to `now`.
    pub fn tick(&mut self, now: NaiveDateTime, idle: IdleStatus) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        let gap = now - self.last_tick;
        self.last_tick = now;

        if let Some(reason) = self.detect_time_jump(gap) {
            // Paused, away or outside working hours there is nothing left to reset.
            if self.active.is_some() || !self.schedule.is_empty() {
                tracing::info!(?reason, "wall clock jumped, resetting schedule");
                self.active = None;
                if self.paused == PauseState::Running && !self.outside_hours && self.away.is_none() {
                    self.reseed(now);
                }
                events.push(ClockEvent::ScheduleReset { reason });
            } else {
                tracing::debug!(?reason, "wall clock jumped while suspended");
            }
        }

        match self.paused {
            PauseState::Indefinitely => return events,
            PauseState::Until(until) if now < until => return events,
            PauseState::Until(_) => events.push(self.resume_at(now)),
            PauseState::Running => (),
        }

        if self.active.as_ref().is_some_and(|active| now >= active.ends_at) {
            if let Some(active) = self.active.take() {
                events.push(self.complete(active, now, false));
            }
        }
        if let Some(ends_at) = self.active.as_ref().map(|active| active.ends_at) {
            for name in self.schedule.due(now) {
                self.schedule.set(&name, ends_at);
            }
            return events;
        }

        if !self.working_hours.contains(now) {
            if !self.outside_hours {
                tracing::info!("outside working hours, breaks suspended");
                self.outside_hours = true;
                self.away = None;
                self.clear_schedule();
                events.push(ClockEvent::ScheduleCleared {
                    reason: ClearReason::OutsideWorkingHours,
                });
            }
            return events;
        }
        if self.outside_hours {
            tracing::info!("working hours started");
            self.outside_hours = false;
            self.reseed(now);
            events.push(ClockEvent::ScheduleReset {
                reason: ResetReason::WorkingHours,
            });
        }

        if let Some(event) = self.track_presence(now, idle) {
            events.push(event);
        }
        if self.away.is_some() {
            return events;
        }

        events.extend(self.upcoming_warnings(now));
        if let Some(active) = self.activate_due(now) {
            events.push(ClockEvent::BreakStarted(active));
        }

        events
    }

    fn detect_time_jump(&self, gap: chrono::Duration) -> Option<ResetReason> {
        if gap < -self.tick_interval {
            return Some(ResetReason::ClockMovedBackwards);
        }
        if gap > self.tick_interval * MISSED_TICKS_LOGGED_AFTER {
            tracing::debug!(gap_ms = gap.num_milliseconds(), "missed clock ticks");
        }

        // A late tick is not a sleep, however short the breaks are.
        let threshold = self
            .shortest_frequency()?
            .as_delta()
            .max(self.tick_interval * MISSED_TICKS_LOGGED_AFTER);
        (gap >= threshold).then(|| ResetReason::Sleep {
            gap: TimeSpan::from_delta(gap),
        })
    }

    fn track_presence(&mut self, now: NaiveDateTime, idle: IdleStatus) -> Option<ClockEvent> {
        let locked = idle.locked && self.reset_on_lock;
        let idle_too_long = self
            .idle_reset
            .is_some_and(|threshold| idle.idle_for >= *threshold);
        let away_now = locked || idle_too_long;

        match (self.away.as_mut(), away_now) {
            (None, true) => {
                let since = chrono::Duration::from_std(idle.idle_for)
                    .ok()
                    .and_then(|idle_for| now.checked_sub_signed(idle_for))
                    .unwrap_or(now);
                let idle_for = now - since;
                tracing::info!(locked = idle.locked, "user is away, breaks suspended");
                self.away = Some(Away {
                    since,
                    locked: idle.locked,
                });
                self.clear_schedule();
                Some(ClockEvent::NaturalBreakStarted {
                    idle_for: TimeSpan::from_delta(idle_for),
                    locked: idle.locked,
                })
            }
            (Some(away), true) => {
                away.locked |= idle.locked;
                None
            }
            (Some(_), false) => {
                let away = self.away.take()?;
                let away_for = now - away.since;
                self.reseed(now);

                let outlasted_interval = self
                    .shortest_frequency()
                    .is_some_and(|frequency| away_for > frequency.as_delta());
                if away.locked && outlasted_interval {
                    tracing::info!("session was locked for a long time, schedule reset");
                    Some(ClockEvent::ScheduleReset {
                        reason: ResetReason::LongLock {
                            locked_for: TimeSpan::from_delta(away_for),
                        },
                    })
                } else {
                    tracing::info!("natural break ended, schedule reset");
                    Some(ClockEvent::NaturalBreakEnded {
                        away_for: TimeSpan::from_delta(away_for),
                    })
                }
            }
            (None, false) => None,
        }
    }

    fn upcoming_warnings(&mut self, now: NaiveDateTime) -> Vec<ClockEvent> {
        let mut events = Vec::new();

        for config in &self.breaks {
            let (Some(lead), Some(due)) = (config.notify_before, self.schedule.get(&config.name))
            else {
                continue;
            };
            if due > now && due - now <= lead.as_delta() && !self.warned.contains(&config.name) {
                self.warned.insert(config.name.clone());
                events.push(ClockEvent::BreakUpcoming {
                    name: config.name.clone(),
                    starts_in: TimeSpan::from_delta(due - now),
                });
            }
        }

        events
    }

    /// Starts the longest of the breaks due at `now`; the others are taken with it.
    fn activate_due(&mut self, now: NaiveDateTime) -> Option<ActiveBreak> {
        let due = self.schedule.due(now);
        if due.is_empty() {
            return None;
        }
        for name in &due {
            self.schedule.remove(name);
        }

        let chosen = self
            .breaks
            .iter()
            .filter(|config| due.contains(&config.name))
            .reduce(|best, config| if config.length > best.length { config } else { best })?
            .clone();
        let covers = due.into_iter().filter(|name| *name != chosen.name).collect();

        Some(self.activate(&chosen, now, covers))
    }

    fn activate(&mut self, config: &BreakConfig, now: NaiveDateTime, covers: Vec<String>) -> ActiveBreak {
        let active = ActiveBreak {
            name: config.name.clone(),
            style: config.notification,
            started_at: now,
            ends_at: now + config.length.as_delta(),
            length: config.length,
            postpones_used: self.postpones_used(&config.name),
            postpone_limit: config.postpone_limit,
            covers,
        };
        self.warned.remove(&config.name);
        tracing::info!(name = %config.name, length = %config.length, "break started");

        self.active = Some(active.clone());
        active
    }

    /// Bookkeeping for a break that was taken, fully or partially.
    fn complete(&mut self, active: ActiveBreak, now: NaiveDateTime, early: bool) -> ClockEvent {
        let taken: Vec<String> = self
            .breaks
            .iter()
            .filter(|config| config.length <= active.length)
            .map(|config| config.name.clone())
            .chain(once(active.name.clone()))
            .chain(active.covers.iter().cloned())
            .collect();
        for name in &taken {
            self.reschedule(name, now);
        }
        tracing::info!(name = %active.name, early, "break finished");

        ClockEvent::BreakFinished {
            name: active.name,
            early,
        }
    }

    /// Schedules `name` one full frequency after `now` and forgets its postponements.
    fn reschedule(&mut self, name: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let next_due = now + self.config(name)?.frequency.as_delta();
        self.schedule.set(name, next_due);
        self.postpones.remove(name);
        self.warned.remove(name);
        Some(next_due)
    }

    pub fn postpone(&mut self, now: NaiveDateTime) -> Result<ClockEvent, ClockError> {
        let active = self.active.as_ref().ok_or(ClockError::NoActiveBreak)?;
        if !active.can_postpone() {
            return Err(ClockError::PostponeLimitReached {
                name: active.name.clone(),
                limit: active.postpone_limit,
            });
        }
        let postpone_length = self
            .config(&active.name)
            .ok_or_else(|| ClockError::UnknownBreak(active.name.clone()))?
            .postpone_length;

        let active = self.active.take().ok_or(ClockError::NoActiveBreak)?;
        let until = now + postpone_length.as_delta();
        let postpones_used = active.postpones_used + 1;
        self.postpones.insert(active.name.clone(), postpones_used);
        for name in once(&active.name).chain(&active.covers) {
            self.schedule.set(name, until);
        }
        tracing::info!(name = %active.name, postpones_used, "break postponed");

        Ok(ClockEvent::BreakPostponed {
            name: active.name,
            until,
            postpones_used,
        })
    }

    /// Skips the active break, or the next scheduled one if none is active.
    pub fn skip(&mut self, now: NaiveDateTime) -> Result<ClockEvent, ClockError> {
        let name = match self.active.take() {
            Some(active) => {
                for covered in &active.covers {
                    self.reschedule(covered, now);
                }
                active.name
            }
            None => self
                .schedule
                .upcoming()
                .into_iter()
                .next()
                .map(|(name, _)| name)
                .ok_or(ClockError::NothingScheduled)?,
        };

        let next_due = self
            .reschedule(&name, now)
            .ok_or_else(|| ClockError::UnknownBreak(name.clone()))?;
        tracing::info!(%name, "break skipped");

        Ok(ClockEvent::BreakSkipped { name, next_due })
    }

    /// Ends the active break before its time is up.
    pub fn finish(&mut self, now: NaiveDateTime) -> Result<ClockEvent, ClockError> {
        let active = self.active.take().ok_or(ClockError::NoActiveBreak)?;
        Ok(self.complete(active, now, true))
    }

    /// Starts the named break, or the one due soonest, right away.
    pub fn start_now(&mut self, now: NaiveDateTime, name: Option<&str>) -> Result<ClockEvent, ClockError> {
        if let Some(active) = &self.active {
            return Err(ClockError::BreakAlreadyActive(active.name.clone()));
        }
        if self.status() != ClockStatus::Running {
            return Err(ClockError::NotRunning);
        }

        let name = match name {
            Some(name) => name.to_string(),
            None => self
                .schedule
                .upcoming()
                .into_iter()
                .next()
                .map(|(name, _)| name)
                .ok_or(ClockError::NothingScheduled)?,
        };
        let config = self
            .config(&name)
            .cloned()
            .ok_or_else(|| ClockError::UnknownBreak(name.clone()))?;

        self.schedule.remove(&config.name);
        Ok(ClockEvent::BreakStarted(self.activate(&config, now, Vec::new())))
    }

    /// Suspends scheduling until `until`, or until resumed if `None`.
    pub fn pause(&mut self, until: Option<NaiveDateTime>) -> ClockEvent {
        self.active = None;
        self.away = None;
        self.clear_schedule();
        self.paused = until.map_or(PauseState::Indefinitely, PauseState::Until);
        tracing::info!(?until, "breaks paused");

        ClockEvent::ScheduleCleared {
            reason: ClearReason::Paused,
        }
    }

    pub fn resume(&mut self, now: NaiveDateTime) -> Result<ClockEvent, ClockError> {
        if self.paused == PauseState::Running {
            return Err(ClockError::NotPaused);
        }
        Ok(self.resume_at(now))
    }

    fn resume_at(&mut self, now: NaiveDateTime) -> ClockEvent {
        tracing::info!("breaks resumed");
        self.restart(now);
        ClockEvent::ScheduleReset {
            reason: ResetReason::Resumed,
        }
    }

    pub fn reset(&mut self, now: NaiveDateTime) -> ClockEvent {
        self.restart(now);
        ClockEvent::ScheduleReset {
            reason: ResetReason::Manual,
        }
    }

    /// Replaces the break configuration and schedules from scratch.
    pub fn apply_settings(&mut self, settings: &Settings, now: NaiveDateTime) -> ClockEvent {
        self.load(settings);
        self.restart(now);
        ClockEvent::ScheduleReset {
            reason: ResetReason::SettingsChanged,
        }
    }

    pub fn active(&self) -> Option<&ActiveBreak> {
        self.active.as_ref()
    }

    pub fn can_postpone(&self) -> bool {
        self.active.as_ref().is_some_and(ActiveBreak::can_postpone)
    }

    pub fn status(&self) -> ClockStatus {
        match self.paused {
            PauseState::Indefinitely => return ClockStatus::Paused { until: None },
            PauseState::Until(until) => return ClockStatus::Paused { until: Some(until) },
            PauseState::Running => (),
        }
        if self.outside_hours {
            return ClockStatus::OutsideWorkingHours;
        }
        match self.away {
            Some(away) => ClockStatus::Away { since: away.since },
            None => ClockStatus::Running,
        }
    }

    pub fn next_break(&self) -> Option<(&BreakConfig, NaiveDateTime)> {
        self.schedule
            .upcoming()
            .into_iter()
            .find_map(|(name, due)| Some((self.config(&name)?, due)))
    }

    /// Every configured break with its next due time, in configuration order.
    pub fn upcoming(&self) -> Vec<(&BreakConfig, Option<NaiveDateTime>)> {
        self.breaks
            .iter()
            .map(|config| (config, self.schedule.get(&config.name)))
            .collect()
    }

    pub fn postpones_used(&self, name: &str) -> u32 {
        self.postpones.get(name).copied().unwrap_or(0)
    }

    pub fn config(&self, name: &str) -> Option<&BreakConfig> {
        self.breaks.iter().find(|config| config.name == name)
    }

    pub fn breaks(&self) -> &[BreakConfig] {
        &self.breaks
    }

    pub fn shortest_frequency(&self) -> Option<TimeSpan> {
        self.breaks.iter().map(|config| config.frequency).min()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("no break is active")]
    NoActiveBreak,
    #[error("break \"{0}\" is already active")]
    BreakAlreadyActive(String),
    #[error("break \"{name}\" cannot be postponed more than {limit} times")]
    PostponeLimitReached { name: String, limit: u32 },
    #[error("no break named \"{0}\" is configured")]
    UnknownBreak(String),
    #[error("no break is scheduled")]
    NothingScheduled,
    #[error("breaks are not paused")]
    NotPaused,
    #[error("breaks are currently suspended")]
    NotRunning,
}

#[cfg(test)]
mod tests;
