use crate::app::{monotonics, speed_control};
use crate::config::sys_config;
use rtic::Mutex;
use systick_monotonic::fugit::Duration;
use wheelbot::drivers::encoder::events;

pub fn speed_control(mut cx: speed_control::Context) {
    let now_ms = monotonics::now().ticks() as u32;
    let left_rx = cx.local.left_rx;
    let right_rx = cx.local.right_rx;

    cx.shared.wheels.lock(|wheels| {
        events::drain(left_rx, |event| {
            wheels.apply(event);
        });
        events::drain(right_rx, |event| {
            wheels.apply(event);
        });
        wheels.step(now_ms);
    });

    speed_control::spawn_after(Duration::<u64, 1, 1000>::millis(sys_config::CONTROL_PERIOD_MS))
        .unwrap();
}
