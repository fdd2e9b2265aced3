use crate::dispatch::BreakAction;
use crate::event::Event;
use crate::timespan::TimeSpan;
use crossterm::event::{Event as CrosstermEvent, EventStream, KeyCode, KeyModifiers};
use futures::StreamExt;
use render::render_ui;
use std::io;
use thiserror::Error;
use tui::{backend::CrosstermBackend, Terminal};

mod animation;
mod render;
mod widgets;

/// How long `h` pauses the breaks for.
const HOLD_FOR: TimeSpan = TimeSpan::from_mins(60);

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    events: EventStream,
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
    show_schedule: bool,
    show_timer: bool,
}

impl Tui {
    pub fn new() -> Result<Self, TuiError> {
        let backend = CrosstermBackend::new(io::stdout());

        Ok(Tui {
            terminal: Terminal::new(backend).map_err(TuiError::Creation)?,
            events: EventStream::new(),
            alternate_screen_enabled: false,
            raw_mode_enabled: false,
            show_schedule: true,
            show_timer: true,
        })
    }

    /// Has to be explicitly disabled, because disabling can cause errors that have to be catched.
    /// Is not disabled by dropping.
    pub fn enable(&mut self) -> Result<(), TuiError> {
        crossterm::terminal::enable_raw_mode().map_err(TuiError::RawModeToggle)?;
        self.raw_mode_enabled = true;

        crossterm::execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
        )
        .map_err(TuiError::AlternateScreenToggle)?;
        self.alternate_screen_enabled = true;
        self.terminal.hide_cursor().map_err(TuiError::Rendering)?;

        Ok(())
    }

    pub fn disable(&mut self) -> Result<(), TuiError> {
        if self.alternate_screen_enabled {
            crossterm::execute!(
                self.terminal.backend_mut(),
                crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
                crossterm::terminal::LeaveAlternateScreen,
            )
            .map_err(TuiError::AlternateScreenToggle)?;
            self.alternate_screen_enabled = false;
        }
        if self.raw_mode_enabled {
            crossterm::terminal::disable_raw_mode().map_err(TuiError::RawModeToggle)?;
            self.raw_mode_enabled = false;
        }
        self.terminal.show_cursor().map_err(TuiError::Rendering)?;

        Ok(())
    }

    pub fn render(&mut self, display_data: &DisplayData) -> Result<(), TuiError> {
        let (show_schedule, show_timer) = (self.show_schedule, self.show_timer);
        self.terminal
            .draw(|f| render_ui(f, display_data, show_schedule, show_timer))
            .map_err(TuiError::Rendering)?;

        Ok(())
    }

    /// Waits for the next terminal event that maps to an [`Event`].
    pub async fn read_event(&mut self) -> Result<Event, TuiError> {
        loop {
            match self.events.next().await {
                Some(Ok(crossterm_event)) => {
                    if let Ok(event) = Event::try_from(crossterm_event) {
                        return Ok(event);
                    }
                }
                Some(Err(err)) => return Err(TuiError::ReadInputEvent(err)),
                None => return Err(TuiError::InputClosed),
            }
        }
    }

    pub fn toggle_schedule(&mut self) {
        self.show_schedule = !self.show_schedule;
    }

    pub fn toggle_timer(&mut self) {
        self.show_timer = !self.show_timer;
    }
}

/// Everything the terminal ui shows, detached from the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayData {
    pub status: String,
    pub schedule: Vec<ScheduleRow>,
    pub countdown: Countdown,
    pub break_screen: Option<BreakScreen>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    pub name: String,
    pub every: TimeSpan,
    /// Time until the break is due, `None` while nothing is scheduled.
    pub due_in: Option<TimeSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    pub label: String,
    pub remaining: TimeSpan,
    pub remaining_fraction: f64,
    pub is_paused: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakScreen {
    pub name: String,
    pub idea: Option<String>,
    pub remaining: TimeSpan,
    pub remaining_fraction: f64,
    pub postpones_used: u32,
    pub postpone_limit: u32,
    pub can_postpone: bool,
}

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("failed to initialize terminal ui: {0}")]
    Creation(io::Error),
    #[error("failed to toggle terminal raw mode: {0}")]
    RawModeToggle(io::Error),
    #[error("failed to toggle alternate terminal screen: {0}")]
    AlternateScreenToggle(io::Error),
    #[error("failed to render terminal ui: {0}")]
    Rendering(io::Error),
    #[error("failed to read input event from terminal: {0}")]
    ReadInputEvent(io::Error),
    #[error("terminal input was closed")]
    InputClosed,
}

pub struct EventConversionUndefinedError;

impl TryFrom<CrosstermEvent> for Event {
    type Error = EventConversionUndefinedError;

    fn try_from(value: CrosstermEvent) -> Result<Self, Self::Error> {
        match value {
            CrosstermEvent::Key(key_event)
                if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                match key_event.code {
                    KeyCode::Char('c') => Some(Event::Quit),
                    _ => None,
                }
            }
            CrosstermEvent::Key(key_event) => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => Some(Event::Quit),
                KeyCode::Char('p') => Some(Event::Action(BreakAction::Postpone)),
                KeyCode::Char('s') => Some(Event::Action(BreakAction::Skip)),
                KeyCode::Char('e') => Some(Event::Action(BreakAction::End)),
                KeyCode::Char('n') => Some(Event::Action(BreakAction::StartNow)),
                KeyCode::Char(' ') => Some(Event::Action(BreakAction::TogglePause)),
                KeyCode::Char('h') => Some(Event::Action(BreakAction::PauseFor(HOLD_FOR))),
                KeyCode::Char('x') => Some(Event::Action(BreakAction::Reset)),
                KeyCode::Char('r') => Some(Event::ReloadSettings),
                KeyCode::Char('1') => Some(Event::ToggleSchedule),
                KeyCode::Char('2') => Some(Event::ToggleTimer),
                _ => None,
            },
            CrosstermEvent::Resize(_, _) => Some(Event::Redraw),
            _ => None,
        }
        .ok_or(EventConversionUndefinedError)
    }
}
