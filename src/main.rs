// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Nucleo-F767ZI firmware.
//!
//! Default build: SysTick runs the timed execution dispatcher. The periodic callback toggles the
//! green LED, the main loop blinks the blue LED using the millisecond clock, and every user-button
//! press toggles the red LED.
//!
//! `--features servo`: SysTick runs the servo PWM on PD14 instead. The servo sweeps between 0° and
//! 180°; each button press nudges it 10° further along the sweep.

#![no_main]
#![no_std]

use cortex_m_rt::{entry, exception};
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use servotick::hw::{self, pins::BoardPins, Button, ButtonEvent, Led, Usart};
use servotick::{SharedTickDriver, TickDriver};

#[cfg(not(feature = "servo"))]
type ServoPin = servotick::NoPin;
#[cfg(feature = "servo")]
type ServoPin = hw::pins::BoardOutput<'D', 14>;

static TICK: SharedTickDriver<hw::SysTick, ServoPin> = SharedTickDriver::new();

#[exception]
fn SysTick() {
    TICK.on_interrupt();
}

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let core_hz = clocks.sysclk().raw();

    let pins = BoardPins::new(dp.GPIOB, dp.GPIOC, dp.GPIOD);

    // USART3 (ST-LINK VCP)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART3,
        (pins.usart3.tx, pins.usart3.rx),
        &clocks,
        usart_cfg,
    );
    let mut usart = Usart::new(serial);

    usart.println("servotick");
    usart.print_field("core clock Hz", u64::from(core_hz));

    let button = Button::active_high(pins.user_button);
    let timer = hw::SysTick::new(cp.SYST);

    #[cfg(not(feature = "servo"))]
    demo::run(timer, core_hz, pins.leds, button, &mut usart);

    #[cfg(feature = "servo")]
    demo::run(timer, core_hz, pins.servo, pins.leds, button, &mut usart);
}

#[cfg(not(feature = "servo"))]
mod demo {
    use core::cell::RefCell;

    use critical_section::Mutex;

    use super::*;
    use servotick::hw::pins::{BoardInput, BoardOutput, Leds};

    const HEARTBEAT_MS: u32 = 250;
    const BLINK_MS: u32 = 1_000;
    const POLL_MS: u32 = 10;

    type HeartbeatLed = Led<BoardOutput<'B', 0>>;

    static HEARTBEAT: Mutex<RefCell<Option<HeartbeatLed>>> = Mutex::new(RefCell::new(None));

    /// Periodic callback, runs in the SysTick handler.
    fn heartbeat() {
        critical_section::with(|cs| {
            if let Some(led) = HEARTBEAT.borrow_ref_mut(cs).as_mut() {
                led.toggle();
            }
        });
    }

    pub fn run<U: hal::serial::Instance>(
        timer: hw::SysTick,
        core_hz: u32,
        leds: Leds,
        mut button: Button<BoardInput<'C', 13>>,
        usart: &mut Usart<U>,
    ) -> ! {
        critical_section::with(|cs| {
            HEARTBEAT.borrow_ref_mut(cs).replace(Led::active_high(leds.green));
        });
        let mut blink = Led::active_high(leds.blue);
        let mut press = Led::active_high(leds.red);

        TICK.install(TickDriver::timed_exec(timer, core_hz, Some(heartbeat)));
        TICK.set_exec_period(HEARTBEAT_MS);

        let mut presses = 0u32;
        let mut since_blink = 0;
        loop {
            TICK.wait_millis(POLL_MS);

            if button.poll() == Some(ButtonEvent::Pressed) {
                press.toggle();
                presses += 1;
                usart.print_field("presses", u64::from(presses));
            }

            since_blink += POLL_MS;
            if since_blink >= BLINK_MS {
                since_blink = 0;
                blink.toggle();
                usart.print_field("uptime ms", TICK.elapsed_millis().unwrap_or(0));
            }
        }
    }
}

#[cfg(feature = "servo")]
mod demo {
    use super::*;
    use servotick::drivers::servo::{ServoTiming, ANGLE_MAX, ANGLE_MIN};
    use servotick::hw::pins::{BoardInput, Leds};

    const SWEEP_STEP: i32 = 1;
    /// Two PWM frames, so each step is latched before the next one is computed.
    const STEP_MS: u32 = 40;
    const NUDGE_DEG: i32 = 10;

    pub fn run<U: hal::serial::Instance>(
        timer: hw::SysTick,
        core_hz: u32,
        servo_pin: ServoPin,
        leds: Leds,
        mut button: Button<BoardInput<'C', 13>>,
        usart: &mut Usart<U>,
    ) -> ! {
        let mut at_end = Led::active_high(leds.red);
        let mut moving = Led::active_high(leds.green);

        let timing = ServoTiming::from_clock_hz(core_hz);
        TICK.install(TickDriver::servo(timer, servo_pin, timing));
        moving.on();

        // The servo owns SysTick, so pacing is done by cycle counting.
        let step_cycles = core_hz / 1000 * STEP_MS;
        let mut direction = SWEEP_STEP;
        loop {
            cortex_m::asm::delay(step_cycles);

            let mut delta = direction;
            if button.poll() == Some(ButtonEvent::Pressed) {
                delta = direction * NUDGE_DEG;
            }

            let angle = TICK.set_relative_position(delta).unwrap_or(ANGLE_MIN);
            if delta != direction {
                usart.print_field("angle", u64::from(angle));
            }

            if angle == ANGLE_MAX || angle == ANGLE_MIN {
                direction = -direction;
                at_end.toggle();
            }
        }
    }
}
