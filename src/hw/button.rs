// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Push-button input with press/release edge polling.
//!
//! The level is read raw: there is no debouncing. A failed pin read reports the button as
//! released.

use embedded_hal::digital::InputPin;

use crate::hw::ActiveLevel;

/// Debounce-free logical state of a button.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Edge observed between two polls.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonEvent {
    Pressed,
    Released,
}

pub struct Button<PIN: InputPin> {
    pin: PIN,
    active: ActiveLevel,
    last: ButtonState,
}

impl<PIN: InputPin> Button<PIN> {
    /// Wrap an input pin. The current level becomes the reference for the first [`Button::poll`].
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut button = Self {
            pin,
            active,
            last: ButtonState::Released,
        };
        button.last = button.state();
        button
    }

    /// Button to ground with a pull-up: pressed reads low.
    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Button to the supply with a pull-down: pressed reads high.
    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    /// Read the pin now.
    pub fn state(&mut self) -> ButtonState {
        match self.pin.is_high() {
            Ok(high) if self.active.level_for(high) => ButtonState::Pressed,
            _ => ButtonState::Released,
        }
    }

    #[inline]
    pub fn is_pressed(&mut self) -> bool {
        self.state() == ButtonState::Pressed
    }

    /// Read the pin and report an edge relative to the previous poll.
    pub fn poll(&mut self) -> Option<ButtonEvent> {
        let now = self.state();
        let previous = core::mem::replace(&mut self.last, now);
        match (previous, now) {
            (ButtonState::Released, ButtonState::Pressed) => Some(ButtonEvent::Pressed),
            (ButtonState::Pressed, ButtonState::Released) => Some(ButtonEvent::Released),
            _ => None,
        }
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}
