use wheelbot::drivers::encoder::slotted::EncoderConfig;

pub const SYSCLK_HZ: u32 = 48_000_000;
pub const SERIAL_BAUD: u32 = 115_200;

// 20-slot disc on a 21 cm wheel
pub const ENCODER: EncoderConfig = EncoderConfig {
    notches_per_rev: 20,
    circumference_cm: 21.0,
    debounce_ms: 10,
};

// spsc queue holds EDGE_QUEUE_LEN - 1 events per wheel
pub const EDGE_QUEUE_LEN: usize = 16;

pub const CONTROL_PERIOD_MS: u64 = 10;
pub const REPORT_PERIOD_MS: u64 = 1000;
pub const STARTUP_DELAY_MS: u64 = 3000;

pub const PWM_FREQ_KHZ: u32 = 20;
