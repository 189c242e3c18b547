// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! [`CountdownTimer`] over the Cortex-M SysTick peripheral.
//!
//! SysTick is a 24-bit down counter clocked from the core clock. Reading its control/status
//! register clears `COUNTFLAG`, which is how the interrupt flag is cleared.

use cortex_m::peripheral::{syst::SystClkSource, SYST};

use crate::hw::countdown::{period_for_reload, reload_for_period, CountdownTimer};

/// SysTick wrapper implementing [`CountdownTimer`].
pub struct SysTick {
    syst: SYST,
}

impl SysTick {
    /// Take ownership of SysTick. The counter and its interrupt are left disabled.
    pub fn new(mut syst: SYST) -> Self {
        syst.disable_interrupt();
        syst.disable_counter();
        Self { syst }
    }

    /// Consume the wrapper and return the underlying peripheral.
    #[inline]
    pub fn free(self) -> SYST {
        self.syst
    }
}

impl CountdownTimer for SysTick {
    #[inline]
    fn start(&mut self) {
        self.syst.set_clock_source(SystClkSource::Core);
        // Writing CVR forces a reload from RVR on the first clock.
        self.syst.clear_current();
        self.syst.enable_counter();
    }

    #[inline]
    fn stop(&mut self) {
        self.syst.disable_counter();
    }

    #[inline]
    fn is_started(&mut self) -> bool {
        self.syst.is_counter_enabled()
    }

    #[inline]
    fn enable_interrupt(&mut self) {
        self.syst.enable_interrupt();
    }

    #[inline]
    fn disable_interrupt(&mut self) {
        self.syst.disable_interrupt();
    }

    #[inline]
    fn is_interrupt_enabled(&mut self) -> bool {
        self.syst.is_interrupt_enabled()
    }

    #[inline]
    fn set_period(&mut self, period: u32) {
        self.syst.set_reload(reload_for_period(period));
    }

    #[inline]
    fn period(&self) -> u32 {
        period_for_reload(SYST::get_reload())
    }

    #[inline]
    fn count(&self) -> u32 {
        SYST::get_current()
    }

    #[inline]
    fn clear_interrupt_flag(&mut self) {
        // COUNTFLAG is cleared by the read.
        let _ = self.syst.has_wrapped();
    }

    #[inline]
    fn is_interrupt_flag_active(&mut self) -> bool {
        self.syst.has_wrapped()
    }
}
