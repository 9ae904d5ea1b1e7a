use crate::config::sys_config;
use wheelbot::controller::motor::WheelConfig;
use wheelbot::controller::pid_params::TuningParams;

// The two wheels need different duty ranges for the same speed.
pub const RIGHT_WHEEL: WheelConfig = WheelConfig {
    encoder: sys_config::ENCODER,
    tune: TuningParams {
        kp: 1.0,
        ki: 0.01,
        kd: 0.05,
        out_min: 40.0,
        out_max: 70.0,
        i_lim: None,
    },
    target_speed_cm_s: 20.0,
    stall_timeout_ms: None,
};

pub const LEFT_WHEEL: WheelConfig = WheelConfig {
    encoder: sys_config::ENCODER,
    tune: TuningParams {
        kp: 0.1,
        ki: 0.01,
        kd: 0.05,
        out_min: 15.0,
        out_max: 30.0,
        i_lim: None,
    },
    target_speed_cm_s: 20.0,
    stall_timeout_ms: None,
};
