// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Software Clocks
//!
//! Time keeping built on the countdown timer's tick interrupt.
//!
//! ## Modules
//!
//! - [`millis`] - Millisecond counter and busy-wait.
//! - [`timed_exec`] - Periodic callback dispatch on top of the millisecond counter.

pub mod millis;
pub mod timed_exec;

pub use millis::{wait_millis, MillisClock};
pub use timed_exec::{ExecCallback, TimedExec};
