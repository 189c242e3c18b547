// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Periodic callback dispatch layered on the millisecond clock.
//!
//! Every tick advances the clock first, then the dispatch counter. When the counter reaches the
//! configured period the callback runs synchronously, in interrupt context, and the counter
//! restarts. A period of 0 disables dispatch.

use crate::clock::MillisClock;
use crate::hw::CountdownTimer;

/// Callback run from the tick interrupt. Keep it short.
pub type ExecCallback = fn();

fn no_callback() {}

pub struct TimedExec {
    clock: MillisClock,
    period: u32,
    count: u32,
    callback: ExecCallback,
}

impl TimedExec {
    /// Start the millisecond clock with dispatch disabled and a no-op callback.
    pub fn init<T: CountdownTimer>(timer: &mut T, clock_hz: u32) -> Self {
        Self {
            clock: MillisClock::init(timer, clock_hz),
            period: 0,
            count: 0,
            callback: no_callback,
        }
    }

    /// Replace the periodic callback.
    pub fn with_callback(mut self, callback: ExecCallback) -> Self {
        self.callback = callback;
        self
    }

    pub fn clock(&self) -> &MillisClock {
        &self.clock
    }

    /// Tick handler. Runs in interrupt context.
    pub fn on_tick(&mut self) {
        self.clock.on_tick();

        if self.period == 0 {
            self.count = 0;
            return;
        }

        self.count += 1;
        if self.count == self.period {
            self.count = 0;
            (self.callback)();
        }
    }

    /// Run the callback every `millis` ticks from now on; 0 disables dispatch.
    ///
    /// The change is made with the tick interrupt masked, so the handler never sees a new period
    /// with a stale count. A tick that expires inside that window is lost, as for
    /// [`MillisClock::elapsed_millis`].
    pub fn set_exec_period<T: CountdownTimer>(&mut self, timer: &mut T, millis: u32) {
        timer.disable_interrupt();
        self.period = millis;
        self.count = 0;
        timer.enable_interrupt();

        debug!("timed exec: period {} ms", millis);
    }

    #[inline]
    pub fn exec_period(&self) -> u32 {
        self.period
    }

    pub fn elapsed_millis<T: CountdownTimer>(&self, timer: &mut T) -> u64 {
        self.clock.elapsed_millis(timer)
    }
}
