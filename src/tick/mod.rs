// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Timer ownership
//!
//! The countdown timer has a single interrupt and can serve exactly one consumer at a time: the
//! millisecond clock, the timed execution dispatcher (which embeds that clock), or the servo PWM
//! generator. [`TickDriver`] owns the timer together with that one consumer, so two consumers can
//! never reprogram the same timer.
//!
//! [`SharedTickDriver`] puts a driver behind a critical-section mutex so a `static` can be reached
//! both from the SysTick exception handler and from mainline code:
//!
//! ```ignore
//! static TICK: SharedTickDriver<SysTick> = SharedTickDriver::new();
//!
//! #[exception]
//! fn SysTick() {
//!     TICK.on_interrupt();
//! }
//!
//! TICK.install(TickDriver::millis_clock(SysTick::new(cp.SYST), 16_000_000));
//! TICK.wait_millis(500);
//! ```
//!
//! Calls that the installed consumer does not support (reading milliseconds while the servo owns
//! the timer, for instance) return `None` or `false` instead of touching the timer.

use core::cell::RefCell;
use core::convert::Infallible;

use critical_section::Mutex;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::clock::{self, ExecCallback, MillisClock, TimedExec};
use crate::drivers::servo::{ServoPwm, ServoTiming};
use crate::hw::CountdownTimer;

/// Output that goes nowhere. Fills the servo pin slot of drivers that never own a servo.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// The consumer currently served by the timer interrupt.
pub enum TickSink<PIN: OutputPin = NoPin> {
    Millis(MillisClock),
    TimedExec(TimedExec),
    Servo(ServoPwm<PIN>),
}

impl<PIN: OutputPin> TickSink<PIN> {
    pub fn name(&self) -> &'static str {
        match self {
            TickSink::Millis(_) => "millis",
            TickSink::TimedExec(_) => "timed exec",
            TickSink::Servo(_) => "servo",
        }
    }
}

/// A countdown timer and the one consumer its interrupt drives.
pub struct TickDriver<T: CountdownTimer, PIN: OutputPin = NoPin> {
    timer: T,
    sink: TickSink<PIN>,
}

impl<T: CountdownTimer, PIN: OutputPin> TickDriver<T, PIN> {
    /// Run the timer as a 1 kHz millisecond clock from a `clock_hz` source.
    pub fn millis_clock(mut timer: T, clock_hz: u32) -> Self {
        let clock = MillisClock::init(&mut timer, clock_hz);
        Self {
            timer,
            sink: TickSink::Millis(clock),
        }
    }

    /// Run the timer as a millisecond clock with periodic dispatch, initially disabled.
    pub fn timed_exec(mut timer: T, clock_hz: u32, callback: Option<ExecCallback>) -> Self {
        let mut exec = TimedExec::init(&mut timer, clock_hz);
        if let Some(callback) = callback {
            exec = exec.with_callback(callback);
        }
        Self {
            timer,
            sink: TickSink::TimedExec(exec),
        }
    }

    /// Run the timer as a servo PWM generator on `pin`, starting centred.
    pub fn servo(mut timer: T, pin: PIN, timing: ServoTiming) -> Self {
        let servo = ServoPwm::init(pin, &mut timer, timing);
        Self {
            timer,
            sink: TickSink::Servo(servo),
        }
    }

    /// Interrupt handler body: acknowledge the expiry, then run the consumer.
    pub fn on_interrupt(&mut self) {
        self.timer.clear_interrupt_flag();

        match &mut self.sink {
            TickSink::Millis(clock) => clock.on_tick(),
            TickSink::TimedExec(exec) => exec.on_tick(),
            TickSink::Servo(servo) => servo.on_tick(&mut self.timer),
        }
    }

    /// Milliseconds since the clock was started, if the timer is running a clock.
    pub fn elapsed_millis(&mut self) -> Option<u64> {
        match &self.sink {
            TickSink::Millis(clock) => Some(clock.elapsed_millis(&mut self.timer)),
            TickSink::TimedExec(exec) => Some(exec.elapsed_millis(&mut self.timer)),
            TickSink::Servo(_) => self.unsupported("elapsed_millis"),
        }
    }

    /// Set the dispatch period in milliseconds (0 disables). `false` unless the dispatcher owns
    /// the timer.
    pub fn set_exec_period(&mut self, millis: u32) -> bool {
        match &mut self.sink {
            TickSink::TimedExec(exec) => {
                exec.set_exec_period(&mut self.timer, millis);
                true
            }
            _ => self.unsupported::<()>("set_exec_period").is_some(),
        }
    }

    /// Command an absolute servo angle. Returns the angle stored after clamping.
    pub fn set_absolute_position(&mut self, angle: u32) -> Option<u32> {
        match &mut self.sink {
            TickSink::Servo(servo) => Some(servo.set_absolute_position(angle)),
            _ => self.unsupported("set_absolute_position"),
        }
    }

    /// Command a servo move relative to the angle being played. Returns the stored angle.
    pub fn set_relative_position(&mut self, delta: i32) -> Option<u32> {
        match &mut self.sink {
            TickSink::Servo(servo) => Some(servo.set_relative_position(delta)),
            _ => self.unsupported("set_relative_position"),
        }
    }

    /// Angle of the pulse currently being generated.
    pub fn servo_angle(&self) -> Option<u32> {
        match &self.sink {
            TickSink::Servo(servo) => Some(servo.current_angle()),
            _ => None,
        }
    }

    #[inline]
    pub fn sink(&self) -> &TickSink<PIN> {
        &self.sink
    }

    #[inline]
    pub fn timer(&self) -> &T {
        &self.timer
    }

    #[inline]
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Stop the timer and release it. The consumer is dropped.
    pub fn free(mut self) -> T {
        self.timer.disable_interrupt();
        self.timer.stop();
        self.timer
    }

    fn unsupported<R>(&self, op: &'static str) -> Option<R> {
        warn!("{} is not supported while {} owns the timer", op, self.sink.name());
        None
    }
}

/// A [`TickDriver`] slot that mainline code and the timer exception handler can share.
pub struct SharedTickDriver<T: CountdownTimer, PIN: OutputPin = NoPin> {
    inner: Mutex<RefCell<Option<TickDriver<T, PIN>>>>,
}

impl<T: CountdownTimer, PIN: OutputPin> SharedTickDriver<T, PIN> {
    /// Empty slot, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Hand the timer and its consumer to the slot. Returns the driver previously installed.
    pub fn install(&self, driver: TickDriver<T, PIN>) -> Option<TickDriver<T, PIN>> {
        info!("tick: {} owns the timer", driver.sink().name());
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(driver))
    }

    /// Remove the installed driver, e.g. to give the timer to another consumer.
    pub fn take(&self) -> Option<TickDriver<T, PIN>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_some())
    }

    /// Call from the timer exception handler. Does nothing until a driver is installed.
    pub fn on_interrupt(&self) {
        critical_section::with(|cs| {
            if let Some(driver) = self.inner.borrow_ref_mut(cs).as_mut() {
                driver.on_interrupt();
            }
        });
    }

    /// Run `f` on the installed driver inside a critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut TickDriver<T, PIN>) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Elapsed milliseconds, if a clock owns the timer.
    ///
    /// The read runs inside the critical section and also gates the timer interrupt, so a wrap in
    /// that window is dropped rather than deferred. See [`MillisClock::elapsed_millis`].
    pub fn elapsed_millis(&self) -> Option<u64> {
        self.with(|driver| driver.elapsed_millis()).flatten()
    }

    /// Busy-wait `millis` milliseconds.
    ///
    /// Returns `false` if no clock owns the timer, either at the start or at any point during the
    /// wait (the slot was emptied or handed to the servo). The wait then ends early.
    ///
    /// Each poll takes the critical section only briefly, so the exception handler keeps ticking
    /// between reads.
    pub fn wait_millis(&self, millis: u32) -> bool {
        let mut clock_lost = false;
        clock::wait_millis(
            || {
                self.elapsed_millis().unwrap_or_else(|| {
                    clock_lost = true;
                    u64::MAX
                })
            },
            millis,
        );
        !clock_lost
    }

    pub fn set_exec_period(&self, millis: u32) -> bool {
        self.with(|driver| driver.set_exec_period(millis))
            .unwrap_or(false)
    }

    pub fn set_absolute_position(&self, angle: u32) -> Option<u32> {
        self.with(|driver| driver.set_absolute_position(angle))
            .flatten()
    }

    pub fn set_relative_position(&self, delta: i32) -> Option<u32> {
        self.with(|driver| driver.set_relative_position(delta))
            .flatten()
    }

    pub fn servo_angle(&self) -> Option<u32> {
        self.with(|driver| driver.servo_angle()).flatten()
    }
}

impl<T: CountdownTimer, PIN: OutputPin> Default for SharedTickDriver<T, PIN> {
    fn default() -> Self {
        Self::new()
    }
}
