// Serial report lines for speed, distance and duty.
// Writers are anything implementing core::fmt::Write, normally the USART tx.

use core::fmt::{Result, Write};

use crate::controller::motor::WheelController;
use crate::drivers::encoder::events::WheelId;
use crate::drivers::motor::hbridge::{SetDirection, SetPower, Start};

pub fn write_wheel<W, M>(w: &mut W, id: WheelId, wheel: &WheelController<M>) -> Result
where
    W: Write,
    M: Start + SetPower + SetDirection,
{
    let encoder = wheel.encoder();
    writeln!(
        w,
        "{} speed {:.2} cm/s avg {:.2} dist {:.2} cm duty {:.1}\r",
        id.name(),
        encoder.current_speed_cm_s(),
        wheel.average_speed_cm_s().unwrap_or(0.0),
        encoder.distance_traveled_cm(),
        wheel.duty()
    )
}

pub fn write_dropped<W: Write>(w: &mut W, dropped: u32) -> Result {
    writeln!(w, "edge queue dropped {dropped}\r")
}
