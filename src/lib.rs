/*!
# HC-SR04 + LCD1602 distance display

Basic Usage:

1. Initialize a "sender" <br/>
    This crate include an I2C driver for the common PCF8574 adapter board [`sender::I2cSender`],
    or you can use any driver implemented [`sender::SendCommand`].
<br/>
<br/>
2. Use [`lcd::Lcd::new()`] to create a [`lcd::Lcd`], and initialize LCD1602 hardware
<br/>
<br/>
3. Wire up a [`sensor::HcSr04`] from a TRIG output pin, an ECHO input pin and a
    [`sensor::Monotonic`] microsecond counter
<br/>
<br/>
4. Hand both to a [`monitor::Monitor`] and call [`monitor::Monitor::run()`],
    or use [`lcd::Lcd`] and [`sensor::HcSr04`] on their own
*/

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod command;
pub mod lcd;
pub mod monitor;
pub mod reading;
pub mod sender;
pub mod sensor;
mod state;
pub mod utils;

#[cfg(test)]
mod testing;
