use crate::clock::{BreakClock, ClockEvent, ClockStatus};
use crate::dispatch::{Dispatcher, Presentation};
use crate::event::Event;
use crate::idle::{self, IdleMonitor, IdleStatus};
use crate::logging::LoggingError;
use crate::notification::{play_sound, show_desktop_notification};
use crate::settings::{Settings, SettingsError};
use crate::timespan::TimeSpan;
use crate::tui::{BreakScreen, Countdown, DisplayData, ScheduleRow, Tui, TuiError};
use chrono::NaiveDateTime;
use std::io;
use std::ops::Deref;
use std::path::PathBuf;
use std::task::Poll;
use thiserror::Error;
use tokio::select;
use tokio::time::{interval, Interval, MissedTickBehavior};

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// The full-screen break view currently requested by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenScreen {
    name: String,
    idea: Option<String>,
}

pub struct App {
    clock: BreakClock,
    dispatcher: Dispatcher,
    idle_monitor: Box<dyn IdleMonitor>,
    settings: Settings,
    settings_path: PathBuf,
    tui: Option<Tui>,
    break_screen: Option<OpenScreen>,
    message: Option<String>,
    idle_failure_logged: bool,
}

impl App {
    /// A headless app has no terminal ui and shows every break as a desktop notification.
    pub fn new(
        settings: Settings,
        settings_path: PathBuf,
        headless: bool,
    ) -> Result<Self, UnrecoverableError> {
        let tui = if headless { None } else { Some(Tui::new()?) };

        Ok(Self {
            clock: BreakClock::new(&settings, local_now()),
            dispatcher: Dispatcher::new(tui.is_some()),
            idle_monitor: idle::monitor_for(&settings),
            settings,
            settings_path,
            tui,
            break_screen: None,
            message: None,
            idle_failure_logged: false,
        })
    }

    pub async fn run(&mut self) -> Result<(), UnrecoverableError> {
        if let Some(tui) = &mut self.tui {
            tui.enable()?;
        }
        let maybe_err = self.run_inner().await;
        if let Some(tui) = &mut self.tui {
            tui.disable()?;
        }

        maybe_err
    }

    fn ticker(settings: &Settings) -> Interval {
        let mut ticker = interval(settings.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    }

    async fn run_inner(&mut self) -> Result<(), UnrecoverableError> {
        let mut ticker = Self::ticker(&self.settings);
        let headless = self.tui.is_none();
        tracing::info!(headless, breaks = self.clock.breaks().len(), "break clock started");

        loop {
            let display_data = self.display_data(local_now());
            if let Some(tui) = &mut self.tui {
                tui.render(&display_data)?;
            }

            select! {
                _ = ticker.tick() => self.on_tick(),
                tui_event = async {
                    match &mut self.tui {
                        Some(tui) => tui.read_event().await,
                        None => ForeverPending.await.forever(),
                    }
                } => {
                    let event = tui_event?;
                    if *self.handle_event(event, &mut ticker) {
                        break;
                    }
                }
                signal = async {
                    if headless {
                        tokio::signal::ctrl_c().await
                    } else {
                        ForeverPending.await.forever()
                    }
                } => {
                    signal.map_err(UnrecoverableError::Signal)?;
                    tracing::info!("interrupted, shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    fn on_tick(&mut self) {
        let now = local_now();
        let idle = match self.idle_monitor.query() {
            Ok(status) => status,
            Err(err) => {
                if !self.idle_failure_logged {
                    tracing::warn!("idle detection unavailable, treating the user as active: {err}");
                    self.idle_failure_logged = true;
                }
                IdleStatus::active()
            }
        };

        for event in self.clock.tick(now, idle) {
            self.process(&event);
        }
    }

    fn process(&mut self, event: &ClockEvent) {
        tracing::debug!(?event, "clock event");
        for presentation in self.dispatcher.present(event, &self.clock) {
            self.present(presentation);
        }
    }

    fn present(&mut self, presentation: Presentation) {
        match presentation {
            Presentation::Notification { title, body } => {
                if let Err(err) = show_desktop_notification(&title, &body) {
                    tracing::warn!("{err}");
                }
                if self.tui.is_some() {
                    self.message = Some(format!("{title}: {body}"));
                }
            }
            Presentation::Sound(path) => play_sound(path, self.settings.volume),
            Presentation::OpenBreakScreen { name, idea } => {
                self.break_screen = Some(OpenScreen { name, idea });
            }
            Presentation::CloseBreakScreen => self.break_screen = None,
        }
    }

    fn handle_event(&mut self, event: Event, ticker: &mut Interval) -> AppShouldQuit {
        match event {
            Event::Quit => return AppShouldQuit(true),
            Event::Action(action) => {
                match self.dispatcher.resolve(action, &mut self.clock, local_now()) {
                    Ok(clock_event) => {
                        self.message = None;
                        self.process(&clock_event);
                    }
                    Err(err) => {
                        tracing::debug!(?action, "action rejected: {err}");
                        self.message = Some(err.to_string());
                    }
                }
            }
            Event::ReloadSettings => self.reload_settings(ticker),
            Event::ToggleSchedule => {
                if let Some(tui) = &mut self.tui {
                    tui.toggle_schedule();
                }
            }
            Event::ToggleTimer => {
                if let Some(tui) = &mut self.tui {
                    tui.toggle_timer();
                }
            }
            Event::Redraw => (),
        };

        AppShouldQuit(false)
    }

    fn reload_settings(&mut self, ticker: &mut Interval) {
        let settings = match Settings::load(&self.settings_path) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("keeping previous settings: {err}");
                self.message = Some(err.to_string());
                return;
            }
        };

        if settings.tick_interval() != self.settings.tick_interval() {
            *ticker = Self::ticker(&settings);
        }
        self.idle_monitor = idle::monitor_for(&settings);
        self.idle_failure_logged = false;
        self.settings = settings;
        let event = self.clock.apply_settings(&self.settings, local_now());
        self.process(&event);

        tracing::info!(path = %self.settings_path.display(), "settings reloaded");
        self.message = Some(format!("settings reloaded from {}", self.settings_path.display()));
    }

    fn display_data(&self, now: NaiveDateTime) -> DisplayData {
        display_data(&self.clock, self.break_screen.as_ref(), self.message.as_deref(), now)
    }
}

fn status_text(clock: &BreakClock) -> String {
    if let Some(active) = clock.active() {
        return format!("on a {} break", active.name);
    }
    match clock.status() {
        ClockStatus::Running => "running".to_string(),
        ClockStatus::Paused { until: Some(until) } => {
            format!("paused until {}", until.format("%H:%M"))
        }
        ClockStatus::Paused { until: None } => "paused".to_string(),
        ClockStatus::Away { since } => format!("away since {}", since.format("%H:%M")),
        ClockStatus::OutsideWorkingHours => "outside working hours".to_string(),
    }
}

fn display_data(
    clock: &BreakClock,
    screen: Option<&OpenScreen>,
    message: Option<&str>,
    now: NaiveDateTime,
) -> DisplayData {
    let status = status_text(clock);

    let schedule = clock
        .upcoming()
        .into_iter()
        .map(|(config, due)| ScheduleRow {
            name: config.name.clone(),
            every: config.frequency,
            due_in: due.map(|due| TimeSpan::from_delta(due - now)),
        })
        .collect();

    let countdown = match (clock.active(), clock.next_break()) {
        (Some(active), _) => Countdown {
            label: format!("{} break", active.name),
            remaining: active.remaining(now),
            remaining_fraction: 1.0 - active.progress(now),
            is_paused: false,
        },
        (None, Some((config, due))) => {
            let remaining = TimeSpan::from_delta(due - now);
            let frequency = config.frequency.as_secs_f64();
            Countdown {
                label: format!("next: {}", config.name),
                remaining,
                remaining_fraction: if frequency > 0.0 {
                    remaining.as_secs_f64() / frequency
                } else {
                    0.0
                },
                is_paused: false,
            }
        }
        (None, None) => Countdown {
            label: status.clone(),
            remaining: TimeSpan::default(),
            remaining_fraction: 0.0,
            is_paused: matches!(clock.status(), ClockStatus::Paused { .. }),
        },
    };

    let break_screen = clock
        .active()
        .zip(screen)
        .filter(|(active, screen)| active.name == screen.name)
        .map(|(active, screen)| BreakScreen {
            name: active.name.clone(),
            idea: screen.idea.clone(),
            remaining: active.remaining(now),
            remaining_fraction: 1.0 - active.progress(now),
            postpones_used: active.postpones_used,
            postpone_limit: active.postpone_limit,
            can_postpone: clock.can_postpone(),
        });

    DisplayData {
        status,
        schedule,
        countdown,
        break_screen,
        message: message.map(str::to_string),
    }
}

struct AppShouldQuit(bool);

impl Deref for AppShouldQuit {
    type Target = bool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Represents errors the app has no control over.
#[derive(Debug, Error)]
pub enum UnrecoverableError {
    #[error("error while interfacing with the terminal: {0}")]
    Tui(#[from] TuiError),
    #[error("failed to listen for ctrl-c: {0}")]
    Signal(io::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

struct ForeverPending;

impl ForeverPending {
    /// This function only exists to produce the never type.
    /// It is used to make the compiler happy when awaiting `ForeverPending` in a `select!` block as an alternative to another future,
    /// if that other future does not exist.
    /// This function should only be used on the result of an await on `ForeverPending`, as then it is never called.
    /// # Panics
    /// Always panics.
    fn forever(&self) -> ! {
        panic!("ForeverPending::forever() was called, which should never happen")
    }
}

impl std::future::Future for ForeverPending {
    type Output = ForeverPending;

    fn poll(self: std::pin::Pin<&mut Self>, _: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        Poll::Pending
    }
}
