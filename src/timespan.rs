use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A whole-second duration written as `minutes` or `minutes:ss`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSpan(pub Duration);

impl TimeSpan {
    pub const fn from_secs(secs: u64) -> Self {
        TimeSpan(Duration::from_secs(secs))
    }

    pub const fn from_mins(mins: u64) -> Self {
        TimeSpan(Duration::from_secs(mins * 60))
    }

    /// Converts to a signed delta for wall-clock arithmetic.
    pub fn as_delta(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.0.as_secs() as i64)
    }

    /// Rounds a signed delta up to whole seconds; negative deltas become zero.
    pub fn from_delta(delta: chrono::Duration) -> Self {
        let millis = delta.num_milliseconds().max(0) as u64;
        TimeSpan(Duration::from_secs((millis + 999) / 1000))
    }
}

impl Deref for TimeSpan {
    type Target = Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for TimeSpan {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Duration> for TimeSpan {
    fn from(duration: Duration) -> Self {
        TimeSpan(duration)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseTimeSpanError {
    #[error("expected \"minutes\" or \"minutes:seconds\"")]
    InvalidFormat,
    #[error("seconds must be less than 60")]
    TooManySeconds,
    #[error("seconds must be two digits")]
    NotTwoDigitsForSeconds,
    #[error("duration is too long")]
    Overflow,
    #[error("failed to parse integer: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl FromStr for TimeSpan {
    type Err = ParseTimeSpanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let minutes = parts[0].parse::<u64>()?;
        let minute_secs = minutes
            .checked_mul(60)
            .ok_or(ParseTimeSpanError::Overflow)?;

        match parts.len() {
            1 => Ok(TimeSpan::from_secs(minute_secs)),
            2 => {
                if parts[1].len() != 2 {
                    return Err(ParseTimeSpanError::NotTwoDigitsForSeconds);
                }
                let seconds = parts[1].parse::<u64>()?;
                if seconds > 59 {
                    return Err(ParseTimeSpanError::TooManySeconds);
                }

                Ok(TimeSpan::from_secs(minute_secs + seconds))
            }
            _ => Err(ParseTimeSpanError::InvalidFormat),
        }
    }
}

impl TryFrom<String> for TimeSpan {
    type Error = ParseTimeSpanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSpan> for String {
    fn from(span: TimeSpan) -> Self {
        span.to_string()
    }
}

impl std::fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let minutes = self.0.as_secs() / 60;
        let seconds = self.0.as_secs() % 60;
        write!(f, "{minutes}:{seconds:02}")
    }
}
