//! Built-in sender  
//! If you want to create a new sender, you will need to implement [`SendCommand`] trait

use embedded_hal::delay::DelayNs;

use crate::command::{Command, State};

mod i2c_sender;

pub use i2c_sender::I2cSender;

/// [`SendCommand`] is the trait a sender should implement to communicate with the hardware
pub trait SendCommand {
    /// Error raised by the underlying bus
    type Error;

    /// Parse a [`Command`] and put it on the wire
    ///
    /// The sender owns the bus timing of a single transfer (enable pulse width and the like),
    /// so it borrows the delayer for the duration of the call
    fn send(&mut self, command: Command, delayer: &mut impl DelayNs) -> Result<(), Self::Error>;

    /// Send command, then wait until the controller is done with it
    ///
    /// Senders built on write-only adapters can't poll the busy flag,
    /// so the execution time from the datasheet is waited out instead
    fn send_and_settle(
        &mut self,
        command: Command,
        delayer: &mut impl DelayNs,
        settle_us: u32,
    ) -> Result<(), Self::Error> {
        self.send(command, delayer)?;
        delayer.delay_us(settle_us);
        Ok(())
    }

    /// Get the current backlight
    ///
    /// Note:
    /// If a driver doesn't support read backlight state, just silently bypass it
    fn get_backlight(&self) -> State {
        State::default()
    }

    /// Set the backlight
    ///
    /// Note:
    /// If a driver doesn't support change backlight, just silently bypass it
    #[allow(unused_variables)]
    fn set_backlight(&mut self, backlight: State) -> Result<(), Self::Error> {
        Ok(())
    }
}
