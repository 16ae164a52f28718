use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::{
    command::{Bits, Command, RegisterSelection, State},
    sender::SendCommand,
    utils::BitOps,
};

// I2C to parallel:
// P7 -> P0
// DB7/DB6/DB5/DB4/BL/EN/RW/RS

const RS_BIT: u8 = 0;
const EN_BIT: u8 = 2;
const BL_BIT: u8 = 3;

/// how long EN stays high for one nibble
const ENABLE_PULSE_US: u32 = 500;
/// how long to wait after EN falls, before next nibble
const NIBBLE_SETTLE_US: u32 = 100;

/// Drive a LCD1602 through a PCF8574(A) I2C adapter board, in 4 bit mode
///
/// Every expander write is a single byte I2C transaction,
/// each nibble is latched by one high-then-low pulse on EN.
pub struct I2cSender<'a, I2cLcd: I2c> {
    i2c: &'a mut I2cLcd,
    addr: u8,
    backlight: State,
}

impl<'a, I2cLcd: I2c> I2cSender<'a, I2cLcd> {
    /// Most common PCF8574T strapping
    pub const DEFAULT_ADDR: u8 = 0x27;
    /// PCF8574AT strapping
    pub const ALTERNATE_ADDR: u8 = 0x3F;

    /// Create a sender talking to the adapter at `addr`, backlight starts on
    pub fn new(i2c: &'a mut I2cLcd, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            backlight: State::On,
        }
    }

    /// 7 bit address of the adapter
    pub fn get_addr(&self) -> u8 {
        self.addr
    }

    // data nibble goes to P7..P4, the backlight bit rides along on every byte
    fn expander_byte(&self, rs: RegisterSelection, nibble: u8) -> u8 {
        let mut byte = (nibble & 0b1111) << 4;
        byte.put_bit(RS_BIT, rs == RegisterSelection::Data);
        byte.put_bit(BL_BIT, self.backlight);
        byte
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), I2cLcd::Error> {
        self.i2c.write(self.addr, &[byte])
    }

    fn pulse_enable(
        &mut self,
        mut byte: u8,
        delayer: &mut impl DelayNs,
    ) -> Result<(), I2cLcd::Error> {
        self.write_byte(byte.set_bit(EN_BIT))?;
        delayer.delay_us(ENABLE_PULSE_US);
        self.write_byte(byte.clear_bit(EN_BIT))?;
        delayer.delay_us(NIBBLE_SETTLE_US);
        Ok(())
    }
}

impl<'a, I2cLcd: I2c> SendCommand for I2cSender<'a, I2cLcd> {
    type Error = I2cLcd::Error;

    fn send(&mut self, command: Command, delayer: &mut impl DelayNs) -> Result<(), Self::Error> {
        let rs = command.get_register_selection();

        match command.get_data() {
            Bits::Bit4(nibble) => {
                let byte = self.expander_byte(rs, nibble);
                self.pulse_enable(byte, delayer)
            }
            // high nibble first
            Bits::Bit8(raw_data) => {
                let high = self.expander_byte(rs, raw_data >> 4);
                let low = self.expander_byte(rs, raw_data & 0b1111);
                self.pulse_enable(high, delayer)?;
                self.pulse_enable(low, delayer)
            }
        }
    }

    fn get_backlight(&self) -> State {
        self.backlight
    }

    fn set_backlight(&mut self, backlight: State) -> Result<(), Self::Error> {
        self.backlight = backlight;

        // the PCF8574 holds its outputs, a byte with EN low is enough to switch the LED
        let idle = self.expander_byte(RegisterSelection::Command, 0);
        self.write_byte(idle)
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };

    use super::*;
    use crate::command::CommandSet;

    const ADDR: u8 = 0x27;

    fn writes(bytes: &[u8]) -> Vec<I2cTransaction> {
        bytes
            .iter()
            .map(|&byte| I2cTransaction::write(ADDR, vec![byte]))
            .collect()
    }

    #[test]
    fn data_byte_is_two_enable_pulses_high_nibble_first() {
        // 'E' = 0x45, RS set, backlight on
        let mut i2c = I2cMock::new(&writes(&[0x4D, 0x49, 0x5D, 0x59]));
        let mut delayer = NoopDelay::new();

        let mut sender = I2cSender::new(&mut i2c, ADDR);
        sender
            .send(CommandSet::WriteDataToRAM(b'E').into(), &mut delayer)
            .unwrap();

        i2c.done();
    }

    #[test]
    fn lone_nibble_is_one_enable_pulse() {
        let mut i2c = I2cMock::new(&writes(&[0x3C, 0x38]));
        let mut delayer = NoopDelay::new();

        let mut sender = I2cSender::new(&mut i2c, ADDR);
        assert_eq!(sender.get_addr(), ADDR);
        sender
            .send(
                CommandSet::HalfFunctionSet(crate::command::DataWidth::Bit8).into(),
                &mut delayer,
            )
            .unwrap();

        i2c.done();
    }

    #[test]
    fn backlight_only_touches_bit_3() {
        // SetDDRAM(0x40) = 0xC0, sent once with backlight on, once with it off
        let mut expected = writes(&[0xCC, 0xC8, 0x0C, 0x08]);
        expected.extend(writes(&[0x00]));
        expected.extend(writes(&[0xC4, 0xC0, 0x04, 0x00]));
        let mut i2c = I2cMock::new(&expected);
        let mut delayer = NoopDelay::new();

        let mut sender = I2cSender::new(&mut i2c, ADDR);
        sender
            .send(CommandSet::SetDDRAM(0x40).into(), &mut delayer)
            .unwrap();
        sender.set_backlight(State::Off).unwrap();
        sender
            .send(CommandSet::SetDDRAM(0x40).into(), &mut delayer)
            .unwrap();
        assert_eq!(sender.get_backlight(), State::Off);

        i2c.done();
    }

    #[test]
    fn bus_error_is_propagated() {
        use embedded_hal::i2c::ErrorKind;

        let mut i2c = I2cMock::new(&[I2cTransaction::write(ADDR, vec![0x0C])
            .with_error(ErrorKind::Other)]);
        let mut delayer = NoopDelay::new();

        let mut sender = I2cSender::new(&mut i2c, ADDR);
        let result = sender.send(CommandSet::ClearDisplay.into(), &mut delayer);
        assert_eq!(result, Err(ErrorKind::Other));

        i2c.done();
    }
}
