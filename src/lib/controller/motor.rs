use crate::controller::pid::PidState;
use crate::controller::pid_params::TuningParams;
use crate::drivers::encoder::events::{EdgeEvent, EdgeKind, WheelId};
use crate::drivers::encoder::slotted::{EdgeOutcome, EncoderChannel, EncoderConfig};
use crate::drivers::motor::hbridge::{SetDirection, SetPower, Start};
use crate::error::ConfigError;
use crate::filtering::sma::SmaFilter;

// number of speed estimates averaged for telemetry
pub const SPEED_AVG_SIZE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelConfig {
    pub encoder: EncoderConfig,
    pub tune: TuningParams,
    pub target_speed_cm_s: f32,
    // feed zero speed to the controller once the wheel has been silent this long
    pub stall_timeout_ms: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelMode {
    SpeedControl,
    // motor coasting, controller not stepped
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drive {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Stop,
}

pub struct Wheels<ML, MR> {
    left: WheelController<ML>,
    right: WheelController<MR>,
}

impl<ML, MR> Wheels<ML, MR>
where
    ML: Start + SetPower + SetDirection,
    MR: Start + SetPower + SetDirection,
{
    pub fn new(
        left: ML,
        right: MR,
        left_config: WheelConfig,
        right_config: WheelConfig,
    ) -> Result<Wheels<ML, MR>, ConfigError> {
        let mut wheels = Wheels {
            left: WheelController::new(left, left_config)?,
            right: WheelController::new(right, right_config)?,
        };
        wheels.left.start();
        wheels.right.start();
        Ok(wheels)
    }

    /// Route an edge event to the wheel it came from.
    pub fn apply(&mut self, event: EdgeEvent) -> EdgeOutcome {
        match event.wheel {
            WheelId::Left => self.left.on_edge(event.kind, event.timestamp_ms),
            WheelId::Right => self.right.on_edge(event.kind, event.timestamp_ms),
        }
    }

    pub fn set_speed_targets(&mut self, targets: &MotorSetPoints) {
        self.left.set_speed_target(targets.left);
        self.right.set_speed_target(targets.right);
    }

    pub fn drive(&mut self, drive: Drive) {
        match drive {
            Drive::Forward => {
                self.left.forward();
                self.right.forward();
            }
            Drive::Backward => {
                self.left.backward();
                self.right.backward();
            }
            Drive::TurnLeft => {
                self.left.stop();
                self.right.forward();
            }
            Drive::TurnRight => {
                self.left.forward();
                self.right.stop();
            }
            Drive::Stop => {
                self.left.stop();
                self.right.stop();
            }
        }
    }

    /// One control tick for both wheels, returns the applied (left, right) duty.
    pub fn step(&mut self, now_ms: u32) -> (f32, f32) {
        (self.left.step(now_ms), self.right.step(now_ms))
    }

    pub fn stop(&mut self) {
        self.drive(Drive::Stop);
    }

    pub fn left(&self) -> &WheelController<ML> {
        &self.left
    }

    pub fn right(&self) -> &WheelController<MR> {
        &self.right
    }
}

pub struct WheelController<MotorT> {
    motor: MotorT,
    encoder: EncoderChannel,
    pid: PidState,
    mode: WheelMode,
    stall_timeout_ms: Option<u32>,
    speed_avg: SmaFilter<f32, SPEED_AVG_SIZE>,
    duty: f32,
}

impl<MotorT> WheelController<MotorT>
where
    MotorT: Start + SetPower + SetDirection,
{
    pub fn new(motor: MotorT, config: WheelConfig) -> Result<WheelController<MotorT>, ConfigError> {
        Ok(WheelController {
            motor,
            encoder: EncoderChannel::new(config.encoder)?,
            pid: PidState::new(config.tune, config.target_speed_cm_s)?,
            mode: WheelMode::Disabled,
            stall_timeout_ms: config.stall_timeout_ms,
            speed_avg: SmaFilter::new(),
            duty: 0.0,
        })
    }

    fn start(&mut self) {
        self.motor.start();
    }

    pub fn on_edge(&mut self, kind: EdgeKind, timestamp_ms: u32) -> EdgeOutcome {
        let outcome = self.encoder.on_edge(kind, timestamp_ms);
        if let EdgeOutcome::Rising {
            speed_updated: true,
        } = outcome
        {
            self.speed_avg.insert(self.encoder.current_speed_cm_s());
        }
        outcome
    }

    fn set_speed_target(&mut self, target: f32) {
        self.pid.set_target(target);
    }

    fn forward(&mut self) {
        self.motor.forward();
        self.mode = WheelMode::SpeedControl;
    }

    fn backward(&mut self) {
        self.motor.backward();
        self.mode = WheelMode::SpeedControl;
    }

    fn stop(&mut self) {
        self.motor.coast();
        self.motor.set_power(0.0);
        self.duty = 0.0;
        self.mode = WheelMode::Disabled;
    }

    /// Speed handed to the controller on the next step.
    pub fn measured_speed_cm_s(&self, now_ms: u32) -> f32 {
        match self.stall_timeout_ms {
            Some(timeout) => self.encoder.speed_or_stalled(now_ms, timeout),
            None => self.encoder.current_speed_cm_s(),
        }
    }

    fn step(&mut self, now_ms: u32) -> f32 {
        match self.mode {
            WheelMode::Disabled => 0.0,
            WheelMode::SpeedControl => {
                let speed = self.measured_speed_cm_s(now_ms);
                self.duty = self.pid.tick(speed);
                self.motor.set_power(self.duty);
                self.duty
            }
        }
    }

    pub fn encoder(&self) -> &EncoderChannel {
        &self.encoder
    }

    pub fn pid(&self) -> &PidState {
        &self.pid
    }

    pub fn mode(&self) -> WheelMode {
        self.mode
    }

    pub fn duty(&self) -> f32 {
        self.duty
    }

    pub fn average_speed_cm_s(&self) -> Option<f32> {
        self.speed_avg.filtered()
    }

    pub fn motor(&self) -> &MotorT {
        &self.motor
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorSetPoints {
    pub left: f32,
    pub right: f32,
}

impl Default for MotorSetPoints {
    fn default() -> MotorSetPoints {
        MotorSetPoints {
            left: 0.0,
            right: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::motor::hbridge::fakes::{pins, FakePin, FakePwm};
    use crate::drivers::motor::hbridge::HBridge;
    use libm::fabsf;
    use rstest::rstest;

    type Motor = HBridge<FakePwm, FakePin, FakePin>;

    const ENCODER: EncoderConfig = EncoderConfig {
        notches_per_rev: 20,
        circumference_cm: 21.0,
        debounce_ms: 10,
    };

    const RIGHT: WheelConfig = WheelConfig {
        encoder: ENCODER,
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

    const LEFT: WheelConfig = WheelConfig {
        tune: TuningParams {
            kp: 0.1,
            ki: 0.01,
            kd: 0.05,
            out_min: 15.0,
            out_max: 30.0,
            i_lim: None,
        },
        ..RIGHT
    };

    // far above anything the wheels reach, saturates both controllers
    const FAST: MotorSetPoints = MotorSetPoints {
        left: 1000.0,
        right: 1000.0,
    };

    fn motor() -> Motor {
        HBridge::new(FakePwm::new(12500), FakePin::default(), FakePin::default())
    }

    fn wheels() -> Wheels<Motor, Motor> {
        Wheels::new(motor(), motor(), LEFT, RIGHT).unwrap()
    }

    fn edge(wheel: WheelId, kind: EdgeKind, timestamp_ms: u32) -> EdgeEvent {
        EdgeEvent {
            wheel,
            kind,
            timestamp_ms,
        }
    }

    #[test]
    fn starts_disabled_and_coasting() {
        let mut w = wheels();
        assert_eq!(w.left().mode(), WheelMode::Disabled);
        assert_eq!(w.step(0), (0.0, 0.0));
        assert_eq!(w.right().motor().get_duty(), 0);
    }

    #[test]
    fn events_reach_only_their_wheel() {
        let mut w = wheels();
        w.apply(edge(WheelId::Right, EdgeKind::Falling, 100));
        w.apply(edge(WheelId::Left, EdgeKind::Falling, 102));
        w.apply(edge(WheelId::Left, EdgeKind::Falling, 300));

        assert_eq!(w.right().encoder().notch_count(), 1);
        assert_eq!(w.left().encoder().notch_count(), 2);
        // no debounce across wheels
        assert_eq!(w.left().encoder().last_event_time_ms(), Some(300));
    }

    #[test]
    fn forward_applies_asymmetric_bounds() {
        let mut w = wheels();
        w.set_speed_targets(&FAST);
        w.drive(Drive::Forward);
        let (left, right) = w.step(0);
        assert_eq!(left, 30.0);
        assert_eq!(right, 70.0);
        assert_eq!(w.left().motor().get_duty(), 3750);
        assert_eq!(w.right().motor().get_duty(), 8750);
    }

    #[test]
    fn turning_disables_inner_wheel() {
        let mut w = wheels();
        w.set_speed_targets(&FAST);
        w.drive(Drive::TurnLeft);
        assert_eq!(w.left().mode(), WheelMode::Disabled);
        assert_eq!(w.right().mode(), WheelMode::SpeedControl);
        let (left, right) = w.step(0);
        assert_eq!(left, 0.0);
        assert_eq!(right, 70.0);
        assert_eq!(w.left().pid().integral, 0.0);

        w.stop();
        assert_eq!(w.right().duty(), 0.0);
        assert_eq!(w.right().motor().get_duty(), 0);
        assert_eq!(w.step(10), (0.0, 0.0));
    }

    // (in1, in2) per wheel: forward drives in1, backward in2, coast neither
    const FWD: (bool, bool) = (true, false);
    const BWD: (bool, bool) = (false, true);
    const COAST: (bool, bool) = (false, false);

    #[rstest]
    #[case(Drive::Forward, WheelMode::SpeedControl, WheelMode::SpeedControl, FWD, FWD)]
    #[case(Drive::Backward, WheelMode::SpeedControl, WheelMode::SpeedControl, BWD, BWD)]
    #[case(Drive::TurnLeft, WheelMode::Disabled, WheelMode::SpeedControl, COAST, FWD)]
    #[case(Drive::TurnRight, WheelMode::SpeedControl, WheelMode::Disabled, FWD, COAST)]
    #[case(Drive::Stop, WheelMode::Disabled, WheelMode::Disabled, COAST, COAST)]
    fn drive_sets_mode_and_direction(
        #[case] drive: Drive,
        #[case] left_mode: WheelMode,
        #[case] right_mode: WheelMode,
        #[case] left_pins: (bool, bool),
        #[case] right_pins: (bool, bool),
    ) {
        let mut w = wheels();
        w.set_speed_targets(&FAST);
        w.drive(drive);
        assert_eq!(w.left().mode(), left_mode);
        assert_eq!(w.right().mode(), right_mode);
        assert_eq!(pins(w.left().motor()), left_pins);
        assert_eq!(pins(w.right().motor()), right_pins);

        // only wheels under speed control get a duty
        let (left, right) = w.step(0);
        let expected = |mode: WheelMode, saturated: f32| match mode {
            WheelMode::SpeedControl => saturated,
            WheelMode::Disabled => 0.0,
        };
        assert_eq!(left, expected(left_mode, 30.0));
        assert_eq!(right, expected(right_mode, 70.0));
    }

    #[test]
    fn turn_right_leaves_right_controller_idle() {
        let mut w = wheels();
        w.set_speed_targets(&FAST);
        w.drive(Drive::TurnRight);
        for t in 0..5u32 {
            w.step(t * 10);
        }
        assert_eq!(w.right().pid().integral, 0.0);
        assert_eq!(w.right().motor().get_duty(), 0);
        assert_eq!(w.left().motor().get_duty(), 3750);
    }

    #[test]
    fn backward_after_forward_keeps_controlling() {
        let mut w = wheels();
        w.set_speed_targets(&FAST);
        w.drive(Drive::Forward);
        w.step(0);
        w.drive(Drive::Backward);
        assert_eq!(w.step(10), (30.0, 70.0));
        assert_eq!(pins(w.right().motor()), BWD);
        assert_eq!(w.right().motor().get_duty(), 8750);
    }

    #[test]
    fn encoder_speed_feeds_controller() {
        let mut w = wheels();
        w.set_speed_targets(&MotorSetPoints {
            left: 1.05,
            right: 1.05,
        });
        w.drive(Drive::Forward);
        for k in 0..3u32 {
            w.apply(edge(WheelId::Right, EdgeKind::Rising, k * 1000));
            w.apply(edge(WheelId::Right, EdgeKind::Falling, k * 1000 + 500));
        }
        assert!(fabsf(w.right().measured_speed_cm_s(2600) - 1.05) < 1e-4);
        w.step(2600);
        assert!(fabsf(w.right().pid().error) < 1e-4);
        assert!(fabsf(w.right().average_speed_cm_s().unwrap() - 1.05) < 1e-4);
    }

    #[test]
    fn stall_timeout_zeroes_measured_speed() {
        let config = WheelConfig {
            stall_timeout_ms: Some(1500),
            ..RIGHT
        };
        let mut wheel = WheelController::new(motor(), config).unwrap();
        wheel.on_edge(EdgeKind::Rising, 0);
        wheel.on_edge(EdgeKind::Rising, 1000);
        assert!(fabsf(wheel.measured_speed_cm_s(2000) - 1.05) < 1e-4);
        assert_eq!(wheel.measured_speed_cm_s(2500), 0.0);
        // without a timeout the stale estimate is used
        let mut stale = WheelController::new(motor(), RIGHT).unwrap();
        stale.on_edge(EdgeKind::Rising, 0);
        stale.on_edge(EdgeKind::Rising, 1000);
        assert!(fabsf(stale.measured_speed_cm_s(60_000) - 1.05) < 1e-4);
    }

    #[test]
    fn rejects_bad_wheel_config() {
        let config = WheelConfig {
            encoder: EncoderConfig {
                notches_per_rev: 0,
                ..ENCODER
            },
            ..RIGHT
        };
        assert_eq!(
            Wheels::new(motor(), motor(), LEFT, config).err(),
            Some(ConfigError::ZeroNotches)
        );
    }
}
