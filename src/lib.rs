// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Servotick Firmware
//!
//! A minimal bare-metal timing stack for Cortex-M, written in Rust and targeting an STM32F767ZI
//! Nucleo board. A single SysTick interrupt drives one of three consumers: a millisecond clock, a
//! periodic callback dispatcher, or a servo PWM generator.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | Countdown timer abstraction, SysTick backing, LED and button wrappers |
//! | [`clock`] | Millisecond clock, blocking waits, timed execution dispatcher |
//! | [`drivers`] | Device-level drivers (servo PWM) |
//! | [`tick`] | Single-owner timer interrupt routing shared with the exception handler |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board (add `--features board,servo` for the servo demo):
//!
//! ```bash
//! cargo run --release --features board
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod drivers;
pub mod hw;
pub mod tick;

pub use tick::{NoPin, SharedTickDriver, TickDriver, TickSink};
