// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! Drivers that sit above the raw `hw/` layer and below the application logic.
//!
//! ## Existing drivers
//!
//! - [`servo`] – hobby servo driven by a two-phase PWM on a countdown timer interrupt

pub mod servo;

pub use servo::{Phase, ServoPwm, ServoTiming};
