use crate::clock::{BreakClock, ClockError, ClockEvent, ClockStatus};
use crate::schedule::{BreakConfig, NotificationStyle};
use crate::timespan::TimeSpan;
use chrono::NaiveDateTime;
use rand::seq::SliceRandom;
use std::path::PathBuf;

/// Something the user should see or hear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Notification { title: String, body: String },
    Sound(PathBuf),
    OpenBreakScreen { name: String, idea: Option<String> },
    CloseBreakScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakAction {
    Postpone,
    Skip,
    End,
    StartNow,
    TogglePause,
    PauseFor(TimeSpan),
    Reset,
}

/// Turns clock events into presentations and user actions into clock operations.
pub struct Dispatcher {
    popups_available: bool,
}

impl Dispatcher {
    /// Without popups, full-screen breaks fall back to desktop notifications.
    pub fn new(popups_available: bool) -> Self {
        Self { popups_available }
    }

    fn shows_popup(&self, config: Option<&BreakConfig>) -> bool {
        self.popups_available
            && config.is_some_and(|config| config.notification == NotificationStyle::Popup)
    }

    pub fn present(&self, event: &ClockEvent, clock: &BreakClock) -> Vec<Presentation> {
        match event {
            ClockEvent::BreakUpcoming { name, starts_in } => vec![Presentation::Notification {
                title: "Break coming up".to_string(),
                body: format!("Your {name} break starts in {starts_in}."),
            }],
            ClockEvent::BreakStarted(active) => {
                let config = clock.config(&active.name);
                let idea = config.and_then(|config| {
                    config.ideas.choose(&mut rand::thread_rng()).cloned()
                });

                let mut presentations = Vec::new();
                if let Some(sound) = config.and_then(|config| config.sound.clone()) {
                    presentations.push(Presentation::Sound(sound));
                }
                if self.shows_popup(config) {
                    presentations.push(Presentation::OpenBreakScreen {
                        name: active.name.clone(),
                        idea,
                    });
                } else {
                    let mut body = format!("Rest for {}.", active.length);
                    if let Some(idea) = idea {
                        body = format!("{body} {idea}");
                    }
                    presentations.push(Presentation::Notification {
                        title: format!("Time for a {} break", active.name),
                        body,
                    });
                }
                presentations
            }
            ClockEvent::BreakFinished { name, early } => {
                if self.shows_popup(clock.config(name)) {
                    vec![Presentation::CloseBreakScreen]
                } else if *early {
                    vec![]
                } else {
                    vec![Presentation::Notification {
                        title: format!("{name} break is over"),
                        body: "Back to work.".to_string(),
                    }]
                }
            }
            ClockEvent::BreakPostponed { .. } | ClockEvent::BreakSkipped { .. } => {
                vec![Presentation::CloseBreakScreen]
            }
            ClockEvent::NaturalBreakStarted { .. } => vec![],
            ClockEvent::NaturalBreakEnded { away_for } => vec![Presentation::Notification {
                title: "Welcome back".to_string(),
                body: format!("You were away for {away_for}, so your breaks start over."),
            }],
            ClockEvent::ScheduleCleared { .. } | ClockEvent::ScheduleReset { .. } => {
                vec![Presentation::CloseBreakScreen]
            }
        }
    }

    pub fn resolve(
        &self,
        action: BreakAction,
        clock: &mut BreakClock,
        now: NaiveDateTime,
    ) -> Result<ClockEvent, ClockError> {
        match action {
            BreakAction::Postpone => clock.postpone(now),
            BreakAction::Skip => clock.skip(now),
            BreakAction::End => clock.finish(now),
            BreakAction::StartNow => clock.start_now(now, None),
            BreakAction::TogglePause => match clock.status() {
                ClockStatus::Paused { .. } => clock.resume(now),
                _ => Ok(clock.pause(None)),
            },
            BreakAction::PauseFor(span) => Ok(clock.pause(Some(now + span.as_delta()))),
            BreakAction::Reset => Ok(clock.reset(now)),
        }
    }
}
