//! Wheel speed PID controller.
//!
//! The controller is not internally timed: every call is one step, so the
//! gains are tuned against the control loop's cadence. The derivative term is
//! subtracted from the output, and the stored gains and bounds were tuned
//! against that sign.

use crate::controller::pid_params::TuningParams;
use crate::error::ConfigError;

/// Contribution of each term to one controller step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlOutput {
    pub p: f32,
    pub i: f32,
    pub d: f32,
    /// `p + i - d`, clamped to the output bounds
    pub output: f32,
}

/// Controller memory for one wheel.
#[derive(Clone, Debug, PartialEq)]
pub struct PidState {
    pub error: f32,
    pub integral: f32,
    pub derivative: f32,
    pub last_error: f32,
    tune: TuningParams,
    target_speed_cm_s: f32,
}

impl PidState {
    pub fn new(tune: TuningParams, target_speed_cm_s: f32) -> Result<PidState, ConfigError> {
        tune.validate()?;
        Ok(PidState {
            error: 0.0,
            integral: 0.0,
            derivative: 0.0,
            last_error: 0.0,
            tune,
            target_speed_cm_s,
        })
    }

    /// One controller step. `current_speed_cm_s` is expected to be finite;
    /// the encoder never produces anything else.
    pub fn next_control_output(&mut self, current_speed_cm_s: f32) -> ControlOutput {
        self.error = self.target_speed_cm_s - current_speed_cm_s;

        self.integral += self.error;
        if let Some(lim) = self.tune.i_lim {
            self.integral = self.integral.clamp(-lim, lim);
        }

        self.derivative = self.error - self.last_error;
        self.last_error = self.error;

        let p = self.tune.kp * self.error;
        let i = self.tune.ki * self.integral;
        let d = self.tune.kd * self.derivative;

        let mut output = p + i - d;
        if output > self.tune.out_max {
            output = self.tune.out_max;
        } else if output < self.tune.out_min {
            output = self.tune.out_min;
        }

        ControlOutput { p, i, d, output }
    }

    pub fn tick(&mut self, current_speed_cm_s: f32) -> f32 {
        self.next_control_output(current_speed_cm_s).output
    }

    pub fn set_target(&mut self, target_speed_cm_s: f32) {
        self.target_speed_cm_s = target_speed_cm_s;
    }

    pub fn target(&self) -> f32 {
        self.target_speed_cm_s
    }

    pub fn tune(&self) -> &TuningParams {
        &self.tune
    }

    /// Zero the accumulated error history. Gains and target are kept.
    pub fn reset(&mut self) {
        self.error = 0.0;
        self.integral = 0.0;
        self.derivative = 0.0;
        self.last_error = 0.0;
    }
}
