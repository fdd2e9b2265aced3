use crate::settings::Settings;
use std::io;
use std::process::Command;
use std::time::Duration;
use thiserror::Error;

/// What the OS reports about user presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleStatus {
    pub idle_for: Duration,
    pub locked: bool,
}

impl IdleStatus {
    pub fn active() -> Self {
        Self::default()
    }

    pub fn idle(idle_for: Duration) -> Self {
        Self {
            idle_for,
            locked: false,
        }
    }

    pub fn locked(idle_for: Duration) -> Self {
        Self {
            idle_for,
            locked: true,
        }
    }
}

pub trait IdleMonitor {
    fn query(&mut self) -> Result<IdleStatus, IdleError>;
}

/// Reports the user as always present.
pub struct NullIdleMonitor;

impl IdleMonitor for NullIdleMonitor {
    fn query(&mut self) -> Result<IdleStatus, IdleError> {
        Ok(IdleStatus::active())
    }
}

/// Picks a monitor for `settings`; the system is only queried if presence matters.
pub fn monitor_for(settings: &Settings) -> Box<dyn IdleMonitor> {
    if settings.idle_reset().is_none() && !settings.reset_on_lock {
        Box::new(NullIdleMonitor)
    } else {
        Box::new(SystemIdleMonitor::new())
    }
}

/// Queries idle time and lock state through the platform's command line tools.
pub struct SystemIdleMonitor {
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    session_id: Option<String>,
}

impl SystemIdleMonitor {
    pub fn new() -> Self {
        Self {
            session_id: std::env::var("XDG_SESSION_ID").ok(),
        }
    }

    #[cfg(target_os = "linux")]
    fn idle_time(&self) -> Result<Duration, IdleError> {
        let output = run("xprintidle", &[])?;
        parse_xprintidle(&output)
    }

    #[cfg(target_os = "macos")]
    fn idle_time(&self) -> Result<Duration, IdleError> {
        let output = run("ioreg", &["-c", "IOHIDSystem", "-d", "4"])?;
        parse_ioreg_idle(&output)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn idle_time(&self) -> Result<Duration, IdleError> {
        Err(IdleError::Unsupported)
    }

    #[cfg(target_os = "linux")]
    fn is_locked(&self) -> Result<bool, IdleError> {
        let Some(session_id) = &self.session_id else {
            return Ok(false);
        };
        let output = run(
            "loginctl",
            &["show-session", session_id, "-p", "LockedHint", "--value"],
        )?;
        parse_locked_hint(&output)
    }

    #[cfg(not(target_os = "linux"))]
    fn is_locked(&self) -> Result<bool, IdleError> {
        Ok(false)
    }
}

impl Default for SystemIdleMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleMonitor for SystemIdleMonitor {
    fn query(&mut self) -> Result<IdleStatus, IdleError> {
        let idle_for = self.idle_time()?;
        if self.is_locked()? {
            Ok(IdleStatus::locked(idle_for))
        } else {
            Ok(IdleStatus::idle(idle_for))
        }
    }
}

#[allow(dead_code)]
fn run(program: &'static str, args: &[&str]) -> Result<String, IdleError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| IdleError::Spawn(program, e))?;

    if !output.status.success() {
        return Err(IdleError::Failed(
            program,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `xprintidle` prints the idle time in milliseconds.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub fn parse_xprintidle(output: &str) -> Result<Duration, IdleError> {
    let millis = output
        .trim()
        .parse::<u64>()
        .map_err(|_| IdleError::Unparsable("xprintidle", output.trim().to_string()))?;
    Ok(Duration::from_millis(millis))
}

/// Extracts `"HIDIdleTime" = <nanoseconds>` from `ioreg` output.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub fn parse_ioreg_idle(output: &str) -> Result<Duration, IdleError> {
    output
        .lines()
        .find(|line| line.contains("\"HIDIdleTime\""))
        .and_then(|line| line.split('=').nth(1))
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_nanos)
        .ok_or_else(|| IdleError::Unparsable("ioreg", "no HIDIdleTime entry".to_string()))
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub fn parse_locked_hint(output: &str) -> Result<bool, IdleError> {
    match output.trim() {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(IdleError::Unparsable("loginctl", other.to_string())),
    }
}

#[derive(Debug, Error)]
pub enum IdleError {
    #[error("idle detection is not supported on this platform")]
    #[cfg_attr(any(target_os = "linux", target_os = "macos"), allow(dead_code))]
    Unsupported,
    #[error("failed to run {0}: {1}")]
    Spawn(&'static str, io::Error),
    #[error("{0} failed: {1}")]
    Failed(&'static str, String),
    #[error("unexpected output from {0}: {1:?}")]
    Unparsable(&'static str, String),
}
