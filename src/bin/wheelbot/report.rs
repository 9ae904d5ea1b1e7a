use crate::app::report;
use crate::config::sys_config;
use core::fmt::Write;
use heapless::String;
use rtic::Mutex;
use systick_monotonic::fugit::Duration;
use wheelbot::drivers::encoder::events::WheelId;
use wheelbot::telemetry;

pub fn report(mut cx: report::Context) {
    // format under the lock, write to the uart after releasing it
    let mut lines: String<192> = String::new();
    cx.shared.wheels.lock(|wheels| {
        let _ = telemetry::write_wheel(&mut lines, WheelId::Left, wheels.left());
        let _ = telemetry::write_wheel(&mut lines, WheelId::Right, wheels.right());
    });

    let left_dropped = cx.shared.left_dropped.lock(|d| *d);
    let right_dropped = cx.shared.right_dropped.lock(|d| *d);
    let dropped = left_dropped.wrapping_add(right_dropped);
    if dropped > 0 {
        let _ = telemetry::write_dropped(&mut lines, dropped);
    }

    let _ = cx.local.tx.write_str(&lines);

    // run at 1 Hz
    report::spawn_after(Duration::<u64, 1, 1000>::millis(sys_config::REPORT_PERIOD_MS)).unwrap();
}
