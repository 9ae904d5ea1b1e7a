#![no_main]
#![no_std]

mod config;
mod motors;
mod report;

#[rtic::app(device = stm32f4xx_hal::pac, peripherals = true, dispatchers = [SPI1, SPI2])]
mod app {
    use crate::config::{sys_config, tuning};
    use crate::motors::speed_control;
    use crate::report::report;
    use core::fmt::Write;
    use cortex_m::asm;
    use heapless::spsc::{Consumer, Queue};
    use panic_write::PanicHandler;
    use stm32f4xx_hal::{
        gpio::{Edge, ExtiPin, Input, Output, Pin, PushPull, PA0, PA1},
        pac::{TIM1, USART2},
        prelude::*,
        serial::{Config, Serial, Tx},
        timer::pwm::PwmChannel,
    };
    use systick_monotonic::{fugit::Duration, Systick};
    use wheelbot::controller::motor::{Drive, Wheels};
    use wheelbot::drivers::encoder::events::{EdgeEvent, EdgeKind, EdgeSender, WheelId};
    use wheelbot::drivers::motor::hbridge::HBridge;

    type LeftMotor =
        HBridge<PwmChannel<TIM1, 1>, Pin<'C', 2, Output<PushPull>>, Pin<'C', 3, Output<PushPull>>>;
    type RightMotor =
        HBridge<PwmChannel<TIM1, 0>, Pin<'C', 0, Output<PushPull>>, Pin<'C', 1, Output<PushPull>>>;
    type EdgeQueue = Queue<EdgeEvent, { sys_config::EDGE_QUEUE_LEN }>;

    #[shared]
    struct Shared {
        wheels: Wheels<LeftMotor, RightMotor>,
        left_dropped: u32,
        right_dropped: u32,
    }

    #[local]
    struct Local {
        tx: core::pin::Pin<panic_write::PanicHandler<Tx<USART2>>>,
        encoder_left: PA1<Input>,
        encoder_right: PA0<Input>,
        left_edges: EdgeSender<'static, { sys_config::EDGE_QUEUE_LEN }>,
        right_edges: EdgeSender<'static, { sys_config::EDGE_QUEUE_LEN }>,
        left_rx: Consumer<'static, EdgeEvent, { sys_config::EDGE_QUEUE_LEN }>,
        right_rx: Consumer<'static, EdgeEvent, { sys_config::EDGE_QUEUE_LEN }>,
    }

    #[monotonic(binds = SysTick, default = true)]
    type MonoTimer = Systick<1000>;

    #[init(local = [left_queue: EdgeQueue = Queue::new(), right_queue: EdgeQueue = Queue::new()])]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        // configure clocks
        let rcc = ctx.device.RCC.constrain();
        let mono = Systick::new(ctx.core.SYST, sys_config::SYSCLK_HZ);
        let clocks = rcc.cfgr.sysclk(sys_config::SYSCLK_HZ.Hz()).freeze();

        let gpioa = ctx.device.GPIOA.split();
        let gpioc = ctx.device.GPIOC.split();

        // set up uart tx
        let tx_pin = gpioa.pa2.into_alternate();
        let serial = Serial::tx(
            ctx.device.USART2,
            tx_pin,
            Config::default()
                .baudrate(sys_config::SERIAL_BAUD.bps())
                .wordlength_8()
                .parity_none(),
            &clocks,
        )
        .unwrap();
        let mut tx = PanicHandler::new(serial);

        // encoder inputs interrupt on both edges
        let mut syscfg = ctx.device.SYSCFG.constrain();
        let mut exti = ctx.device.EXTI;
        let mut encoder_right = gpioa.pa0.into_pull_up_input();
        encoder_right.make_interrupt_source(&mut syscfg);
        encoder_right.trigger_on_edge(&mut exti, Edge::RisingFalling);
        encoder_right.enable_interrupt(&mut exti);
        let mut encoder_left = gpioa.pa1.into_pull_up_input();
        encoder_left.make_interrupt_source(&mut syscfg);
        encoder_left.trigger_on_edge(&mut exti, Edge::RisingFalling);
        encoder_left.enable_interrupt(&mut exti);

        let (left_producer, left_rx) = ctx.local.left_queue.split();
        let (right_producer, right_rx) = ctx.local.right_queue.split();

        // set up PWM, right motor on CH1, left on CH2
        let channels = (gpioa.pa8.into_alternate(), gpioa.pa9.into_alternate());
        let (pwm_right, pwm_left) = ctx
            .device
            .TIM1
            .pwm_hz(channels, sys_config::PWM_FREQ_KHZ.kHz(), &clocks)
            .split();

        let right_motor = HBridge::new(
            pwm_right,
            gpioc.pc0.into_push_pull_output(),
            gpioc.pc1.into_push_pull_output(),
        );
        let left_motor = HBridge::new(
            pwm_left,
            gpioc.pc2.into_push_pull_output(),
            gpioc.pc3.into_push_pull_output(),
        );

        let mut wheels = match Wheels::new(
            left_motor,
            right_motor,
            tuning::LEFT_WHEEL,
            tuning::RIGHT_WHEEL,
        ) {
            Ok(val) => val,
            Err(e) => {
                writeln!(tx, "wheel configuration rejected: {}\r", e).unwrap();
                panic!("wheel configuration rejected");
            }
        };
        wheels.drive(Drive::Forward);

        writeln!(tx, "system initialized\r").unwrap();

        speed_control::spawn_after(Duration::<u64, 1, 1000>::millis(
            sys_config::STARTUP_DELAY_MS,
        ))
        .unwrap();
        report::spawn_after(Duration::<u64, 1, 1000>::millis(sys_config::STARTUP_DELAY_MS))
            .unwrap();

        (
            Shared {
                wheels,
                left_dropped: 0,
                right_dropped: 0,
            },
            Local {
                tx,
                encoder_left,
                encoder_right,
                left_edges: EdgeSender::new(left_producer),
                right_edges: EdgeSender::new(right_producer),
                left_rx,
                right_rx,
            },
            init::Monotonics(mono),
        )
    }

    // Edge interrupts only timestamp and enqueue, the control task applies them.
    #[task(
        binds = EXTI0,
        priority = 2,
        local = [encoder_right, right_edges],
        shared = [right_dropped]
    )]
    fn right_encoder(mut cx: right_encoder::Context) {
        let timestamp_ms = monotonics::now().ticks() as u32;
        let kind = EdgeKind::from_level(cx.local.encoder_right.is_high());
        cx.local.encoder_right.clear_interrupt_pending_bit();

        let event = EdgeEvent {
            wheel: WheelId::Right,
            kind,
            timestamp_ms,
        };
        if cx.local.right_edges.send(event).is_err() {
            let dropped = cx.local.right_edges.dropped();
            cx.shared.right_dropped.lock(|d| *d = dropped);
        }
    }

    #[task(
        binds = EXTI1,
        priority = 2,
        local = [encoder_left, left_edges],
        shared = [left_dropped]
    )]
    fn left_encoder(mut cx: left_encoder::Context) {
        let timestamp_ms = monotonics::now().ticks() as u32;
        let kind = EdgeKind::from_level(cx.local.encoder_left.is_high());
        cx.local.encoder_left.clear_interrupt_pending_bit();

        let event = EdgeEvent {
            wheel: WheelId::Left,
            kind,
            timestamp_ms,
        };
        if cx.local.left_edges.send(event).is_err() {
            let dropped = cx.local.left_edges.dropped();
            cx.shared.left_dropped.lock(|d| *d = dropped);
        }
    }

    extern "Rust" {
        #[task(local = [left_rx, right_rx], shared = [wheels])]
        fn speed_control(cx: speed_control::Context);

        #[task(local = [tx], shared = [wheels, left_dropped, right_dropped])]
        fn report(cx: report::Context);
    }

    #[idle]
    fn idle(_ctx: idle::Context) -> ! {
        loop {
            asm::nop();
        }
    }
}
