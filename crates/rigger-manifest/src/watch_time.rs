use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WatchTimeError {
    #[error("malformed watch time '{expression}': '{part}' is not a non-negative integer")]
    Malformed { expression: String, part: String },
    #[error("malformed watch time '{expression}': expected '<end>' or '<start>-<end>'")]
    TooManyBounds { expression: String },
    #[error("invalid watch time interval: start {start} is greater than end {end}")]
    InvalidInterval { start: u64, end: u64 },
}

/// Interval in milliseconds during which an update step watches a job's health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTime {
    pub start: u64,
    pub end: u64,
}

impl WatchTime {
    /// Interval used when a manifest does not specify one.
    pub const DEFAULT: WatchTime = WatchTime {
        start: 0,
        end: 300_000,
    };

    /// Parse `"<end>"` (start is 0) or `"<start>-<end>"`.
    pub fn parse(expression: &str) -> Result<Self, WatchTimeError> {
        let parts: Vec<&str> = expression.split('-').collect();
        let bound = |part: &str| {
            let part = part.trim();
            part.parse::<u64>().map_err(|_| WatchTimeError::Malformed {
                expression: expression.to_owned(),
                // An empty bound comes from a stray '-', as in "-5".
                part: if part.is_empty() {
                    expression.trim().to_owned()
                } else {
                    part.to_owned()
                },
            })
        };

        match parts.as_slice() {
            [end] => Ok(Self {
                start: 0,
                end: bound(*end)?,
            }),
            [start, end] => {
                let (start, end) = (bound(*start)?, bound(*end)?);
                if start > end {
                    return Err(WatchTimeError::InvalidInterval { start, end });
                }
                Ok(Self { start, end })
            }
            _ => Err(WatchTimeError::TooManyBounds {
                expression: expression.to_owned(),
            }),
        }
    }
}

impl Default for WatchTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for WatchTime {
    type Err = WatchTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WatchTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
