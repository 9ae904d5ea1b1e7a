use core::fmt;

use crate::drivers::encoder::events::EdgeEvent;

// Rejected configuration values
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    ZeroNotches,
    InvalidCircumference,
    InvertedBounds,
    NonFiniteGain,
    InvalidIntegralLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroNotches => {
                write!(f, "encoder needs at least one notch per revolution")
            }
            ConfigError::InvalidCircumference => {
                write!(f, "wheel circumference must be finite and positive")
            }
            ConfigError::InvertedBounds => {
                write!(f, "output bounds must be finite with min <= max")
            }
            ConfigError::NonFiniteGain => write!(f, "pid gains must be finite"),
            ConfigError::InvalidIntegralLimit => {
                write!(f, "integral limit must be finite and non-negative")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QueueError {
    // the rejected event is handed back to the caller
    Full(EdgeEvent),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Full(event) => write!(
                f,
                "edge queue full, dropped {:?} edge on {:?} wheel at {} ms",
                event.kind, event.wheel, event.timestamp_ms
            ),
        }
    }
}
