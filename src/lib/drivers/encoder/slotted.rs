// Slotted-disc wheel encoder fed by edge interrupts.
//
// Each notch on the disc produces a falling edge followed by a rising edge.
// Speed is derived from the time between successive rising edges, distance
// from the number of falling edges. Timestamps are milliseconds since boot
// and are compared with wrapping arithmetic.

use crate::drivers::encoder::events::EdgeKind;
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderConfig {
    pub notches_per_rev: u8,
    pub circumference_cm: f32,
    pub debounce_ms: u32,
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notches_per_rev == 0 {
            return Err(ConfigError::ZeroNotches);
        }
        if !self.circumference_cm.is_finite() || self.circumference_cm <= 0.0 {
            return Err(ConfigError::InvalidCircumference);
        }
        Ok(())
    }

    pub fn distance_per_notch_cm(&self) -> f32 {
        self.circumference_cm / self.notches_per_rev as f32
    }

    /// Speed in cm/s for one notch travelled in `period_ms`.
    /// `None` for a zero period, which has no defined speed.
    pub fn speed_cm_s(&self, period_ms: u32) -> Option<f32> {
        if period_ms == 0 {
            return None;
        }
        Some(self.distance_per_notch_cm() / (period_ms as f32 / 1000.0))
    }
}

/// What an accepted or rejected edge did to the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOutcome {
    Debounced,
    Rising { speed_updated: bool },
    Falling { revolution_complete: bool },
}

pub struct EncoderChannel {
    config: EncoderConfig,
    last_event_time_ms: Option<u32>,
    last_rising_time_ms: Option<u32>,
    last_falling_time_ms: u32,
    measuring: bool,
    notch_count: u8,
    revolutions: u32,
    notch_period_ms: u32,
    total_period_ms: u32,
    // falling edges since boot, distance is derived from this
    notches_traveled: u32,
    current_speed_cm_s: f32,
}

impl EncoderChannel {
    pub fn new(config: EncoderConfig) -> Result<EncoderChannel, ConfigError> {
        config.validate()?;
        Ok(EncoderChannel {
            config,
            last_event_time_ms: None,
            last_rising_time_ms: None,
            last_falling_time_ms: 0,
            measuring: false,
            notch_count: 0,
            revolutions: 0,
            notch_period_ms: 0,
            total_period_ms: 0,
            notches_traveled: 0,
            current_speed_cm_s: 0.0,
        })
    }

    /// Apply one edge seen at `timestamp_ms`. Never blocks, never fails.
    ///
    /// Edges closer than the debounce window to the previously accepted edge
    /// are dropped without touching any state. Edges out of the expected
    /// fall/rise alternation are applied as-is; a missed edge only leaves a
    /// stale period behind.
    pub fn on_edge(&mut self, kind: EdgeKind, timestamp_ms: u32) -> EdgeOutcome {
        if let Some(last) = self.last_event_time_ms {
            if timestamp_ms.wrapping_sub(last) < self.config.debounce_ms {
                return EdgeOutcome::Debounced;
            }
        }
        self.last_event_time_ms = Some(timestamp_ms);

        match kind {
            EdgeKind::Rising => self.on_rising(timestamp_ms),
            EdgeKind::Falling => self.on_falling(timestamp_ms),
        }
    }

    fn on_rising(&mut self, timestamp_ms: u32) -> EdgeOutcome {
        if self.measuring {
            self.notch_period_ms = timestamp_ms.wrapping_sub(self.last_falling_time_ms);
            self.measuring = false;
        }

        let mut speed_updated = false;
        if let Some(last_rising) = self.last_rising_time_ms {
            self.total_period_ms = timestamp_ms.wrapping_sub(last_rising);
            // zero period keeps the previous estimate
            if let Some(speed) = self.config.speed_cm_s(self.total_period_ms) {
                self.current_speed_cm_s = speed;
                speed_updated = true;
            }
        }
        self.last_rising_time_ms = Some(timestamp_ms);

        EdgeOutcome::Rising { speed_updated }
    }

    fn on_falling(&mut self, timestamp_ms: u32) -> EdgeOutcome {
        self.notch_count += 1;
        let revolution_complete = self.notch_count >= self.config.notches_per_rev;
        if revolution_complete {
            self.notch_count = 0;
            self.revolutions = self.revolutions.wrapping_add(1);
        }

        self.measuring = true;
        self.last_falling_time_ms = timestamp_ms;
        self.notches_traveled = self.notches_traveled.wrapping_add(1);

        EdgeOutcome::Falling {
            revolution_complete,
        }
    }

    pub fn current_speed_cm_s(&self) -> f32 {
        self.current_speed_cm_s
    }

    /// Latest speed, or zero once no rising edge has been accepted for
    /// `timeout_ms`. A wheel that never produced a rising edge reads zero.
    pub fn speed_or_stalled(&self, now_ms: u32, timeout_ms: u32) -> f32 {
        match self.last_rising_time_ms {
            Some(last) if now_ms.wrapping_sub(last) < timeout_ms => self.current_speed_cm_s,
            _ => 0.0,
        }
    }

    /// Odometer in cm. Computed from the notch total in f64 so long runs
    /// do not accumulate rounding error.
    pub fn distance_traveled_cm(&self) -> f32 {
        let notches = self.notches_traveled as f64;
        let per_rev = self.config.notches_per_rev as f64;
        (notches * self.config.circumference_cm as f64 / per_rev) as f32
    }

    pub fn notches_traveled(&self) -> u32 {
        self.notches_traveled
    }

    pub fn notch_count(&self) -> u8 {
        self.notch_count
    }

    pub fn revolutions(&self) -> u32 {
        self.revolutions
    }

    pub fn notch_period_ms(&self) -> u32 {
        self.notch_period_ms
    }

    pub fn total_period_ms(&self) -> u32 {
        self.total_period_ms
    }

    pub fn measuring(&self) -> bool {
        self.measuring
    }

    pub fn last_event_time_ms(&self) -> Option<u32> {
        self.last_event_time_ms
    }

    pub fn last_rising_time_ms(&self) -> Option<u32> {
        self.last_rising_time_ms
    }

    pub fn last_falling_time_ms(&self) -> u32 {
        self.last_falling_time_ms
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}
