use crate::dispatch::BreakAction;

/// Input from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Quit,
    Action(BreakAction),
    ReloadSettings,
    ToggleSchedule,
    ToggleTimer,
    Redraw,
}
