// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Blocking USART console for status output. Lines end in CRLF.
//!
//! On the Nucleo board USART3 is bridged to the ST-LINK virtual COM port:
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```

use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

/// Transmit half of a HAL serial port. The receive half is dropped.
pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        s.bytes().for_each(|b| self.write_byte(b));
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Decimal, no padding.
    pub fn print_u64(&mut self, mut n: u64) {
        let mut buf = [0u8; 20];
        let mut i = buf.len();
        loop {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        buf[i..].iter().for_each(|&b| self.write_byte(b));
    }

    /// `label` followed by a decimal value and CRLF, e.g. `uptime ms: 1500`.
    pub fn print_field(&mut self, label: &str, value: u64) {
        self.write_str(label);
        self.write_str(": ");
        self.print_u64(value);
        self.write_str("\r\n");
    }
}
