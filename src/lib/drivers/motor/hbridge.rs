use embedded_hal::digital::v2::OutputPin;
use embedded_hal::PwmPin;

/*
Helper Function
input: controller output in percent, nominally 0 < float < 100
out: hardware compare level in 0..=wrap
Decription: level = wrap * output / 100, saturating at both ends, NaN maps to 0
*/
pub fn duty_level(output: f32, wrap: u16) -> u16 {
    if output.is_nan() || output <= 0.0 {
        return 0;
    }
    let level = wrap as f32 * output / 100.0;
    if level >= wrap as f32 {
        wrap
    } else {
        level as u16 //truncate
    }
}

pub trait Start {
    fn start(&mut self);
}

pub trait SetPower {
    // percent of full duty
    fn set_power(&mut self, percent: f32);
}

pub trait SetDirection {
    fn forward(&mut self);
    fn backward(&mut self);
    fn coast(&mut self);
}

/// One motor channel of an L298-style dual H-bridge: two direction inputs and
/// an enable pin driven by PWM.
pub struct HBridge<PWM, IN1, IN2> {
    pwm: PWM,
    in1: IN1,
    in2: IN2,
}

impl<PWM, IN1, IN2> HBridge<PWM, IN1, IN2>
where
    PWM: PwmPin<Duty = u16>,
    IN1: OutputPin,
    IN2: OutputPin,
{
    pub fn new(pwm: PWM, in1: IN1, in2: IN2) -> Self {
        Self { pwm, in1, in2 }
    }

    pub fn get_duty(&self) -> u16 {
        self.pwm.get_duty()
    }

    pub fn get_max_duty(&self) -> u16 {
        self.pwm.get_max_duty()
    }
}

impl<PWM, IN1, IN2> Start for HBridge<PWM, IN1, IN2>
where
    PWM: PwmPin<Duty = u16>,
    IN1: OutputPin,
    IN2: OutputPin,
{
    fn start(&mut self) {
        self.coast();
        self.pwm.set_duty(0);
        self.pwm.enable();
    }
}

impl<PWM, IN1, IN2> SetPower for HBridge<PWM, IN1, IN2>
where
    PWM: PwmPin<Duty = u16>,
    IN1: OutputPin,
    IN2: OutputPin,
{
    fn set_power(&mut self, percent: f32) {
        let level = duty_level(percent, self.pwm.get_max_duty());
        self.pwm.set_duty(level);
    }
}

impl<PWM, IN1, IN2> SetDirection for HBridge<PWM, IN1, IN2>
where
    PWM: PwmPin<Duty = u16>,
    IN1: OutputPin,
    IN2: OutputPin,
{
    fn forward(&mut self) {
        let _ = self.in1.set_high();
        let _ = self.in2.set_low();
    }

    fn backward(&mut self) {
        let _ = self.in1.set_low();
        let _ = self.in2.set_high();
    }

    fn coast(&mut self) {
        let _ = self.in1.set_low();
        let _ = self.in2.set_low();
    }
}
