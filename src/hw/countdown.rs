// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Register-level contract of a free-running, auto-reloading countdown timer.
//!
//! The timer decrements from its reload value to zero, raises its interrupt line (when enabled),
//! sets a one-shot count flag and reloads. Only the low 24 bits of the reload register exist, so
//! periods are truncated, never rejected.

/// Mask of the implemented reload register bits.
pub const RELOAD_MASK: u32 = 0x00FF_FFFF;

/// Largest period (in clock cycles) the reload register can express.
pub const MAX_PERIOD: u32 = RELOAD_MASK + 1;

/// Reload register value for a period of `period` cycles.
///
/// `period = 0` wraps to the maximum reload value.
#[inline]
pub const fn reload_for_period(period: u32) -> u32 {
    period.wrapping_sub(1) & RELOAD_MASK
}

/// Period (in clock cycles) encoded by a reload register value.
#[inline]
pub const fn period_for_reload(reload: u32) -> u32 {
    (reload & RELOAD_MASK) + 1
}

/// A single hardware countdown timer with one interrupt line.
///
/// Status queries take `&mut self` because on real hardware reading the control register clears
/// the count flag.
pub trait CountdownTimer {
    /// Start counting. Also selects the processor clock as the timer source.
    fn start(&mut self);

    /// Stop counting.
    fn stop(&mut self);

    /// Whether the counter is running.
    fn is_started(&mut self) -> bool;

    /// Let the timer raise its interrupt when it reaches zero.
    fn enable_interrupt(&mut self);

    /// Stop the timer from raising its interrupt.
    ///
    /// Masking the interrupt is how mainline code gets a torn-free view of state the interrupt
    /// handler mutates.
    fn disable_interrupt(&mut self);

    /// Whether reaching zero raises the interrupt.
    fn is_interrupt_enabled(&mut self) -> bool;

    /// Program a new period in clock cycles. Only the low 24 bits of `period - 1` are kept.
    fn set_period(&mut self, period: u32);

    /// Currently programmed period in clock cycles.
    fn period(&self) -> u32;

    /// Current countdown value. Informational only.
    fn count(&self) -> u32;

    /// Clear the count flag. Must run first in the interrupt handler.
    fn clear_interrupt_flag(&mut self);

    /// Whether the count flag is set.
    fn is_interrupt_flag_active(&mut self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_survives_the_reload_encoding() {
        for p in [1, 2, 1_000, 3_000, 18_000, 342_000, 360_000, RELOAD_MASK, MAX_PERIOD] {
            assert_eq!(period_for_reload(reload_for_period(p)), p);
        }
    }

    #[test]
    fn out_of_range_periods_are_truncated() {
        assert_eq!(reload_for_period(0), RELOAD_MASK);
        assert_eq!(period_for_reload(reload_for_period(0)), MAX_PERIOD);

        // Bit 24 and above are dropped, not saturated.
        assert_eq!(period_for_reload(reload_for_period(MAX_PERIOD + 5)), 5);
        assert_eq!(reload_for_period(u32::MAX), RELOAD_MASK - 1);
    }
}
