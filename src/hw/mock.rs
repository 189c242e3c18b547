// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side stand-ins for the countdown timer and GPIO pins, used by the unit tests.

use core::convert::Infallible;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::vec::Vec;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};

use crate::hw::countdown::{period_for_reload, reload_for_period, CountdownTimer};

/// Register writes and interrupt gating seen by a [`MockTimer`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TimerEvent {
    Start,
    Stop,
    EnableInterrupt,
    DisableInterrupt,
    SetPeriod(u32),
    ClearFlag,
}

/// Behavioural model of a SysTick-like countdown timer.
///
/// Enabling the counter reloads it, expiry sets the count flag, and any control register read
/// clears that flag.
#[derive(Debug)]
pub struct MockTimer {
    reload: u32,
    current: u32,
    started: bool,
    interrupt_enabled: bool,
    count_flag: bool,
    core_clock: bool,
    events: Vec<TimerEvent>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self {
            reload: 0,
            current: 0,
            started: false,
            interrupt_enabled: false,
            count_flag: false,
            core_clock: false,
            events: Vec::new(),
        }
    }

    /// Simulate the counter reaching zero and reloading.
    pub fn expire(&mut self) {
        self.count_flag = true;
        self.current = self.reload;
    }

    pub fn events(&self) -> &[TimerEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn running(&self) -> bool {
        self.started
    }

    pub fn interrupt_gate(&self) -> bool {
        self.interrupt_enabled
    }

    pub fn uses_core_clock(&self) -> bool {
        self.core_clock
    }

    fn read_control(&mut self) {
        self.count_flag = false;
    }
}

impl Default for MockTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownTimer for MockTimer {
    fn start(&mut self) {
        self.core_clock = true;
        self.started = true;
        self.current = self.reload;
        self.events.push(TimerEvent::Start);
    }

    fn stop(&mut self) {
        self.started = false;
        self.events.push(TimerEvent::Stop);
    }

    fn is_started(&mut self) -> bool {
        self.read_control();
        self.started
    }

    fn enable_interrupt(&mut self) {
        self.interrupt_enabled = true;
        self.events.push(TimerEvent::EnableInterrupt);
    }

    fn disable_interrupt(&mut self) {
        self.interrupt_enabled = false;
        self.events.push(TimerEvent::DisableInterrupt);
    }

    fn is_interrupt_enabled(&mut self) -> bool {
        self.read_control();
        self.interrupt_enabled
    }

    fn set_period(&mut self, period: u32) {
        self.reload = reload_for_period(period);
        self.events.push(TimerEvent::SetPeriod(period));
    }

    fn period(&self) -> u32 {
        period_for_reload(self.reload)
    }

    fn count(&self) -> u32 {
        self.current
    }

    fn clear_interrupt_flag(&mut self) {
        self.read_control();
        self.events.push(TimerEvent::ClearFlag);
    }

    fn is_interrupt_flag_active(&mut self) -> bool {
        let flag = self.count_flag;
        self.read_control();
        flag
    }
}

/// GPIO pin whose level is shared between clones, so a test can keep a probe after handing the
/// pin to a driver.
#[derive(Clone, Debug, Default)]
pub struct MockPin {
    level: Arc<AtomicBool>,
}

impl MockPin {
    pub fn new(high: bool) -> Self {
        Self {
            level: Arc::new(AtomicBool::new(high)),
        }
    }

    pub fn level(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }

    /// Drive the level from outside, as an external circuit would.
    pub fn drive(&self, high: bool) {
        self.level.store(high, Ordering::SeqCst);
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level())
    }
}

/// Error of a [`BrokenPin`].
#[derive(Copy, Clone, Debug)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Input pin whose every read fails.
#[derive(Debug, Default)]
pub struct BrokenPin;

impl ErrorType for BrokenPin {
    type Error = PinFault;
}

impl InputPin for BrokenPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(PinFault)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(PinFault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_reloads_the_counter_from_the_period() {
        let mut timer = MockTimer::new();
        timer.set_period(18_000);
        timer.start();
        assert_eq!(timer.count(), 17_999);
        assert!(timer.uses_core_clock());
    }

    #[test]
    fn count_flag_is_one_shot() {
        let mut timer = MockTimer::new();
        timer.set_period(10);
        timer.expire();
        assert!(timer.is_interrupt_flag_active());
        assert!(!timer.is_interrupt_flag_active());
    }

    #[test]
    fn pin_clones_share_their_level() {
        let probe = MockPin::new(false);
        let mut pin = probe.clone();
        pin.set_high().unwrap();
        assert!(probe.level());
    }
}
