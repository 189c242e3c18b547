// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hardware-facing layer: the countdown timer abstraction, its SysTick backing, and GPIO wrappers.

pub mod button;
pub mod countdown;
pub mod led;
pub mod systick;

#[cfg(feature = "board")]
pub mod pins;
#[cfg(feature = "board")]
pub mod usart;

#[cfg(test)]
pub mod mock;

pub use button::{Button, ButtonEvent, ButtonState};
pub use countdown::CountdownTimer;
pub use led::Led;
pub use systick::SysTick;

/// Electrical level that corresponds to a logically asserted signal.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// Map a logical state to a pin level (`true` = high), or a pin level back to a logical state.
    #[inline]
    pub fn level_for(self, asserted: bool) -> bool {
        match self {
            ActiveLevel::High => asserted,
            ActiveLevel::Low => !asserted,
        }
    }
}
