// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F767ZI Nucleo-144 devboard.
//!
//! HAL pins are wrapped in [`BoardOutput`] and [`BoardInput`], which expose the `embedded-hal` 1.0
//! digital traits that [`Led`](crate::hw::Led), [`Button`](crate::hw::Button) and the servo
//! driver are written against.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stm32f7xx_hal::{
    gpio::{self, gpiod, Alternate, Floating, Input, Output, PushPull},
    pac,
    prelude::*,
};

/// Push-pull output on any GPIO pin.
pub struct BoardOutput<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Output<PushPull>>,
}

impl<const P: char, const N: u8> BoardOutput<P, N> {
    /// Reconfigure `pin` as a push-pull output, driven low.
    pub fn new<MODE>(pin: gpio::Pin<P, N, MODE>) -> Self {
        let mut pin = pin.into_push_pull_output();
        pin.set_low();
        Self { pin }
    }
}

impl<const P: char, const N: u8> ErrorType for BoardOutput<P, N> {
    type Error = Infallible;
}

impl<const P: char, const N: u8> OutputPin for BoardOutput<P, N> {
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low();
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high();
        Ok(())
    }
}

/// Floating input on any GPIO pin. External pull resistors set the idle level.
pub struct BoardInput<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Input<Floating>>,
}

impl<const P: char, const N: u8> BoardInput<P, N> {
    pub fn new<MODE>(pin: gpio::Pin<P, N, MODE>) -> Self {
        Self {
            pin: pin.into_floating_input(),
        }
    }
}

impl<const P: char, const N: u8> ErrorType for BoardInput<P, N> {
    type Error = Infallible;
}

impl<const P: char, const N: u8> InputPin for BoardInput<P, N> {
    #[inline]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pin.is_high())
    }

    #[inline]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pin.is_low())
    }
}

pub struct BoardPins {
    pub leds: Leds,
    /// B1 (blue user button), pulled down on the board: pressed reads high.
    pub user_button: BoardInput<'C', 13>,
    /// Servo signal, CN7 D10.
    pub servo: BoardOutput<'D', 14>,
    pub usart3: Usart3Pins,
}

pub struct Leds {
    pub green: BoardOutput<'B', 0>, // LD1
    pub blue: BoardOutput<'B', 7>,  // LD2
    pub red: BoardOutput<'B', 14>,  // LD3
}

/// USART3 is routed to the ST-LINK virtual COM port.
pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

impl BoardPins {
    pub fn new(gpiob: pac::GPIOB, gpioc: pac::GPIOC, gpiod: pac::GPIOD) -> Self {
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();

        Self {
            leds: Leds {
                green: BoardOutput::new(gpiob.pb0),
                blue: BoardOutput::new(gpiob.pb7),
                red: BoardOutput::new(gpiob.pb14),
            },

            user_button: BoardInput::new(gpioc.pc13),

            servo: BoardOutput::new(gpiod.pd14),

            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },
        }
    }
}
