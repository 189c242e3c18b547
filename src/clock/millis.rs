// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Millisecond software clock driven by a 1 kHz countdown timer interrupt.

use crate::hw::CountdownTimer;

/// Milliseconds elapsed since [`MillisClock::init`], advanced once per timer tick.
#[derive(Debug)]
pub struct MillisClock {
    millis: u64,
}

impl MillisClock {
    /// Reset the count and program `timer` to expire every millisecond of a `clock_hz` source.
    ///
    /// The period is `clock_hz / 1000` cycles; the rounding error of the integer division is not
    /// corrected.
    pub fn init<T: CountdownTimer>(timer: &mut T, clock_hz: u32) -> Self {
        let period = clock_hz / 1000;

        timer.stop();
        timer.clear_interrupt_flag();
        timer.set_period(period);
        timer.enable_interrupt();
        timer.start();

        debug!("millis clock: {} cycles per tick", period);

        Self { millis: 0 }
    }

    /// Tick handler. Runs in interrupt context.
    #[inline]
    pub fn on_tick(&mut self) {
        self.millis = self.millis.wrapping_add(1);
    }

    /// Elapsed milliseconds, read with the tick interrupt masked.
    ///
    /// While the timer's interrupt enable is clear, a counter wrap does not pend the exception.
    /// A wrap that lands inside the masked window is lost and the clock falls one tick behind.
    /// The window is a handful of instructions, so this only matters over long uptimes with
    /// frequent reads.
    pub fn elapsed_millis<T: CountdownTimer>(&self, timer: &mut T) -> u64 {
        timer.disable_interrupt();
        let millis = self.millis;
        timer.enable_interrupt();
        millis
    }
}

/// Busy-wait until `elapsed` has advanced by at least `millis`.
///
/// `elapsed` is polled continuously, so the tick interrupt must stay enabled while waiting.
pub fn wait_millis<F: FnMut() -> u64>(mut elapsed: F, millis: u32) {
    let deadline = elapsed().saturating_add(u64::from(millis));
    while elapsed() < deadline {
        core::hint::spin_loop();
    }
}
