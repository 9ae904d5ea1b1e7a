#![cfg_attr(not(test), no_std)]

//! Wheel speed measurement and closed-loop speed control for a two-wheeled
//! robot with slotted-disc encoders and H-bridge motor drivers.
//!
//! Edge interrupts are pushed into an [`drivers::encoder::events`] queue,
//! drained by the control loop into a per-wheel
//! [`drivers::encoder::slotted::EncoderChannel`], whose speed estimate feeds a
//! [`controller::pid::PidState`] that drives the motor duty cycle.

pub mod error;
pub mod telemetry;

pub mod controller {
    pub mod motor;
    pub mod pid;
    pub mod pid_params;
}

pub mod drivers {
    pub mod encoder {
        pub mod events;
        pub mod slotted;
    }
    pub mod motor {
        pub mod hbridge;
    }
}

pub mod filtering {
    pub mod sma;
}
