// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hobby servo (0° to 180°) driven by a single countdown timer.
//!
//! The timer interrupt alternates between two phases of a fixed 50 Hz (20 ms) frame:
//!
//! - start of the HIGH phase: latch the pending angle, raise the line, time `on_time` cycles;
//! - start of the LOW phase: drop the line, time `off_time = period - on_time` cycles.
//!
//! The pulse width is `min_pulse + angle * one_degree`, i.e. 1 ms at 0° and 2 ms at 180° with the
//! default calibration. New angles are only latched at the start of a HIGH phase, so a pulse in
//! flight is never cut short or stretched.
//!
//! Inputs are saturated, never rejected. Absolute angles are unsigned and clamp at 180°; relative
//! moves clamp at both ends.

use embedded_hal::digital::OutputPin;

use crate::hw::countdown::MAX_PERIOD;
use crate::hw::CountdownTimer;

/// Smallest commanded angle, in degrees.
pub const ANGLE_MIN: u32 = 0;
/// Centre position used at start-up, in degrees.
pub const ANGLE_MED: u32 = 90;
/// Largest commanded angle, in degrees.
pub const ANGLE_MAX: u32 = 180;

/// PWM calibration in timer clock cycles.
///
/// A full-scale pulse always fits in the frame, and the frame always fits in the timer's 24-bit
/// reload register.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ServoTiming {
    period: u32,
    min_pulse: u32,
    one_degree: u32,
}

impl ServoTiming {
    /// Calibration for an 18 MHz timer clock: 20 ms frame, 1 ms to 2 ms pulse.
    pub const DEFAULT: Self = Self {
        period: 360_000,
        min_pulse: 18_000,
        one_degree: 100,
    };

    /// `period` is the whole frame, `min_pulse` the HIGH width at 0° and `one_degree` the extra
    /// width per degree. `None` if the 180° pulse is longer than the frame or the frame exceeds
    /// [`MAX_PERIOD`].
    pub const fn new(period: u32, min_pulse: u32, one_degree: u32) -> Option<Self> {
        let max_pulse = match one_degree.checked_mul(ANGLE_MAX) {
            Some(span) => min_pulse.checked_add(span),
            None => None,
        };
        match max_pulse {
            Some(max_pulse) if max_pulse <= period && period <= MAX_PERIOD => Some(Self {
                period,
                min_pulse,
                one_degree,
            }),
            _ => None,
        }
    }

    /// Calibration for an arbitrary timer clock, rounded down.
    ///
    /// Above 838.86 MHz the 20 ms frame no longer fits in the reload register; the frame is then
    /// clamped to [`MAX_PERIOD`] cycles and the refresh rate rises above 50 Hz. Pulse widths are
    /// unaffected.
    pub const fn from_clock_hz(clock_hz: u32) -> Self {
        let min_pulse = clock_hz / 1000;
        let period = clock_hz / 50;
        Self {
            period: if period > MAX_PERIOD { MAX_PERIOD } else { period },
            min_pulse,
            one_degree: min_pulse / ANGLE_MAX,
        }
    }

    /// Whole frame (HIGH + LOW).
    #[inline]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// HIGH width at 0°.
    #[inline]
    pub const fn min_pulse(&self) -> u32 {
        self.min_pulse
    }

    #[inline]
    pub const fn one_degree(&self) -> u32 {
        self.one_degree
    }

    /// HIGH width for `angle`, saturated at [`ANGLE_MAX`].
    #[inline]
    pub const fn pulse_cycles(&self, angle: u32) -> u32 {
        let angle = if angle > ANGLE_MAX { ANGLE_MAX } else { angle };
        self.min_pulse + angle * self.one_degree
    }

    #[inline]
    pub const fn max_pulse(&self) -> u32 {
        self.pulse_cycles(ANGLE_MAX)
    }
}

impl Default for ServoTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What the next timer expiry starts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// The LOW remainder just ended; next expiry starts a pulse.
    HighPending,
    /// A pulse is in flight; next expiry ends it.
    LowPending,
}

/// Two-phase PWM generator that owns the servo signal line.
pub struct ServoPwm<PIN: OutputPin> {
    pin: PIN,
    timing: ServoTiming,
    on_time: u32,
    off_time: u32,
    new_pos: u32,
    current_pos: u32,
    phase: Phase,
}

impl<PIN: OutputPin> ServoPwm<PIN> {
    /// Centre the servo and start the first pulse.
    ///
    /// The line is driven low, then raised as the timer starts timing the first HIGH phase, so the
    /// next expiry ends that pulse.
    pub fn init<T: CountdownTimer>(mut pin: PIN, timer: &mut T, timing: ServoTiming) -> Self {
        pin.set_low().ok();

        let mut servo = Self {
            pin,
            timing,
            on_time: 0,
            off_time: 0,
            new_pos: ANGLE_MED,
            current_pos: ANGLE_MED,
            phase: Phase::HighPending,
        };
        servo.latch();

        servo.pin.set_high().ok();
        timer.stop();
        timer.enable_interrupt();
        timer.set_period(servo.on_time);
        timer.start();
        servo.phase = Phase::LowPending;

        info!(
            "servo: frame {} cycles, pulse {}..{} cycles",
            timing.period,
            timing.min_pulse,
            timing.max_pulse()
        );

        servo
    }

    /// Command an absolute angle, effective from the next pulse. Returns the stored angle.
    pub fn set_absolute_position(&mut self, angle: u32) -> u32 {
        let applied = angle.min(ANGLE_MAX);
        if applied != angle {
            debug!("servo: {} deg saturated to {}", angle, applied);
        }
        self.new_pos = applied;
        applied
    }

    /// Command a move relative to the angle currently being played (not a pending one),
    /// effective from the next pulse. Returns the stored angle.
    pub fn set_relative_position(&mut self, delta: i32) -> u32 {
        let target = i64::from(self.current_pos) + i64::from(delta);
        let applied = target.clamp(i64::from(ANGLE_MIN), i64::from(ANGLE_MAX)) as u32;
        if i64::from(applied) != target {
            debug!("servo: {} deg saturated to {}", target, applied);
        }
        self.new_pos = applied;
        applied
    }

    /// Timer expiry handler. Runs in interrupt context.
    pub fn on_tick<T: CountdownTimer>(&mut self, timer: &mut T) {
        match self.phase {
            Phase::HighPending => {
                self.latch();
                self.pin.set_high().ok();
                restart(timer, self.on_time);
                self.phase = Phase::LowPending;
            }
            Phase::LowPending => {
                self.pin.set_low().ok();
                restart(timer, self.off_time);
                self.phase = Phase::HighPending;
            }
        }
    }

    /// Angle encoded in the current pulse width.
    #[inline]
    pub fn current_angle(&self) -> u32 {
        self.current_pos
    }

    /// Angle that the next pulse will use.
    #[inline]
    pub fn pending_angle(&self) -> u32 {
        self.new_pos
    }

    #[inline]
    pub fn on_time(&self) -> u32 {
        self.on_time
    }

    #[inline]
    pub fn off_time(&self) -> u32 {
        self.off_time
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn timing(&self) -> ServoTiming {
        self.timing
    }

    pub fn free(self) -> PIN {
        self.pin
    }

    fn latch(&mut self) {
        self.current_pos = self.new_pos;
        self.on_time = self.timing.pulse_cycles(self.current_pos);
        self.off_time = self.timing.period - self.on_time;
    }
}

/// Time one phase of `cycles`. Re-enabling the counter reloads it from the new period.
fn restart<T: CountdownTimer>(timer: &mut T, cycles: u32) {
    timer.stop();
    timer.set_period(cycles);
    timer.start();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::{MockPin, MockTimer, TimerEvent};

    const PERIOD: u32 = ServoTiming::DEFAULT.period();

    fn started() -> (ServoPwm<MockPin>, MockTimer, MockPin) {
        let probe = MockPin::new(false);
        let mut timer = MockTimer::new();
        let servo = ServoPwm::init(probe.clone(), &mut timer, ServoTiming::DEFAULT);
        (servo, timer, probe)
    }

    /// Level and timed width of the phase started by one expiry.
    fn expire(servo: &mut ServoPwm<MockPin>, timer: &mut MockTimer, probe: &MockPin) -> (bool, u32) {
        timer.expire();
        servo.on_tick(timer);
        (probe.level(), timer.period())
    }

    #[test]
    fn default_calibration_spans_one_to_two_milliseconds() {
        let timing = ServoTiming::DEFAULT;
        assert_eq!(timing.pulse_cycles(0), 18_000);
        assert_eq!(timing.max_pulse(), 36_000);
        assert_eq!(ServoTiming::from_clock_hz(18_000_000), timing);
        assert_eq!(timing.pulse_cycles(500), timing.max_pulse());
    }

    #[test]
    fn derived_calibration_keeps_the_pulse_inside_the_frame() {
        for hz in [1_000_000, 16_000_000, 48_000_000, 216_000_000, 1_000_000_000, u32::MAX] {
            let timing = ServoTiming::from_clock_hz(hz);
            assert!(timing.max_pulse() <= timing.period());
            assert!(timing.period() <= MAX_PERIOD);
        }
    }

    #[test]
    fn calibration_rejects_pulses_longer_than_the_frame() {
        assert_eq!(ServoTiming::new(20_000, 18_000, 100), None);
        assert_eq!(ServoTiming::new(36_000, 18_000, 100).map(|t| t.max_pulse()), Some(36_000));
        assert_eq!(ServoTiming::new(360_000, 18_000, 100), Some(ServoTiming::DEFAULT));
        assert_eq!(ServoTiming::new(MAX_PERIOD + 1, 18_000, 100), None);
        assert_eq!(ServoTiming::new(MAX_PERIOD, u32::MAX, 1), None);
        assert_eq!(ServoTiming::new(MAX_PERIOD, 0, u32::MAX), None);
    }

    #[test]
    fn fast_clock_frame_is_clamped_to_the_reload_register() {
        let timing = ServoTiming::from_clock_hz(1_000_000_000);
        assert_eq!(timing.period(), MAX_PERIOD);
        assert_eq!(timing.min_pulse(), 1_000_000);

        let probe = MockPin::new(false);
        let mut timer = MockTimer::new();
        let mut servo = ServoPwm::init(probe.clone(), &mut timer, timing);
        let high = timer.period();

        let (_, low) = expire(&mut servo, &mut timer, &probe);
        assert_eq!(low, servo.off_time());
        assert_eq!(high + low, MAX_PERIOD);
    }

    #[test]
    fn init_centres_and_starts_the_first_pulse() {
        let (servo, mut timer, probe) = started();

        assert_eq!(servo.pending_angle(), ANGLE_MED);
        assert_eq!(servo.current_angle(), ANGLE_MED);
        assert_eq!(servo.phase(), Phase::LowPending);
        assert!(probe.level());
        assert_eq!(timer.period(), 27_000);
        assert!(timer.is_started());
        assert!(timer.is_interrupt_enabled());
    }

    #[test]
    fn first_frame_splits_into_centre_pulse_and_remainder() {
        let (mut servo, mut timer, probe) = started();
        let high = timer.period();

        let (level, low) = expire(&mut servo, &mut timer, &probe);
        assert!(!level);
        assert_eq!(high, ServoTiming::DEFAULT.pulse_cycles(ANGLE_MED));
        assert_eq!(low, PERIOD - high);

        let (level, next_high) = expire(&mut servo, &mut timer, &probe);
        assert!(level);
        assert_eq!(next_high, high);
    }

    #[test]
    fn every_angle_partitions_the_frame_exactly() {
        let (mut servo, mut timer, probe) = started();
        let mut previous_high = timer.period();
        for angle in ANGLE_MIN..=ANGLE_MAX {
            servo.set_absolute_position(angle);
            let (_, low) = expire(&mut servo, &mut timer, &probe);
            let (_, high) = expire(&mut servo, &mut timer, &probe);

            assert_eq!(previous_high + low, PERIOD);
            assert_eq!(servo.current_angle(), angle);
            assert_eq!(servo.on_time() + servo.off_time(), PERIOD);
            assert_eq!(high, ServoTiming::DEFAULT.pulse_cycles(angle));
            previous_high = high;
        }
    }

    #[test]
    fn new_angle_waits_for_the_next_pulse() {
        let (mut servo, mut timer, probe) = started();
        let centre = ServoTiming::DEFAULT.pulse_cycles(ANGLE_MED);

        // Pulse for 90° is in flight.
        servo.set_absolute_position(ANGLE_MAX);
        assert_eq!(timer.period(), centre);
        assert_eq!(servo.current_angle(), ANGLE_MED);

        // Its LOW remainder still belongs to the 90° frame.
        let (level, low) = expire(&mut servo, &mut timer, &probe);
        assert!(!level);
        assert_eq!(low, PERIOD - centre);

        let (level, high) = expire(&mut servo, &mut timer, &probe);
        assert!(level);
        assert_eq!(high, ServoTiming::DEFAULT.max_pulse());
        assert_eq!(servo.current_angle(), ANGLE_MAX);
    }

    #[test]
    fn later_commands_supersede_unlatched_ones() {
        let (mut servo, mut timer, probe) = started();
        servo.set_absolute_position(10);
        servo.set_absolute_position(170);

        expire(&mut servo, &mut timer, &probe);
        expire(&mut servo, &mut timer, &probe);
        assert_eq!(servo.current_angle(), 170);
    }

    #[test]
    fn absolute_position_clamps_at_the_top() {
        let (mut servo, _, _) = started();
        assert_eq!(servo.set_absolute_position(200), ANGLE_MAX);
        assert_eq!(servo.set_absolute_position(u32::MAX), ANGLE_MAX);
        assert_eq!(servo.set_absolute_position(0), ANGLE_MIN);
        assert_eq!(servo.pending_angle(), ANGLE_MIN);
    }

    #[test]
    fn relative_position_clamps_at_both_ends() {
        for start in [0, 45, 90, 180] {
            let (mut servo, mut timer, probe) = started();
            servo.set_absolute_position(start);
            expire(&mut servo, &mut timer, &probe);
            expire(&mut servo, &mut timer, &probe);

            assert_eq!(servo.set_relative_position(1_000), ANGLE_MAX);
            assert_eq!(servo.set_relative_position(-1_000), ANGLE_MIN);
            assert_eq!(servo.set_relative_position(i32::MIN), ANGLE_MIN);
            assert_eq!(servo.set_relative_position(i32::MAX), ANGLE_MAX);
        }
    }

    #[test]
    fn relative_moves_compose_against_the_latched_angle() {
        let (mut servo, _, _) = started();
        servo.set_absolute_position(10);
        assert_eq!(servo.set_relative_position(5), ANGLE_MED + 5);
        assert_eq!(servo.set_relative_position(-30), ANGLE_MED - 30);
    }

    #[test]
    fn each_phase_restarts_the_timer_with_its_width() {
        let (mut servo, mut timer, probe) = started();
        timer.clear_events();

        expire(&mut servo, &mut timer, &probe);
        assert_eq!(
            timer.events(),
            &[
                TimerEvent::Stop,
                TimerEvent::SetPeriod(PERIOD - 27_000),
                TimerEvent::Start,
            ]
        );
        assert_eq!(timer.count(), PERIOD - 27_000 - 1);
    }
}
