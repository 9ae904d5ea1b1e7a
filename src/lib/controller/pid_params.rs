use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TuningParams {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    // output clamp, usually a duty cycle percentage
    pub out_min: f32,
    pub out_max: f32,
    // anti-windup clamp on the accumulated error, None leaves it unbounded
    pub i_lim: Option<f32>,
}

impl TuningParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()) {
            return Err(ConfigError::NonFiniteGain);
        }
        if !(self.out_min.is_finite() && self.out_max.is_finite()) || self.out_min > self.out_max {
            return Err(ConfigError::InvertedBounds);
        }
        if let Some(lim) = self.i_lim {
            if !lim.is_finite() || lim < 0.0 {
                return Err(ConfigError::InvalidIntegralLimit);
            }
        }
        Ok(())
    }
}
