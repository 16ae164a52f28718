use embedded_hal::delay::DelayNs;

use crate::{
    command::{CommandSet, DataWidth, Font, LineMode, MoveDirection, ShiftType, State},
    lcd::Lcd,
    sender::SendCommand,
    state::LcdState,
};

/// controller needs > 40 ms after Vcc rises to 2.7 V
const POWER_ON_WAIT_MS: u32 = 50;
/// after each of the "reset" nibbles
const RESET_SETTLE_US: u32 = 5_000;
/// after the nibble that commits 4 bit mode
const MODE_SETTLE_US: u32 = 1_000;

/// [`Config`] is the init config of a [`Lcd`]
///
/// The default is what a LCD1602 usually runs with:
/// two lines, 5x8 font, display on, no cursor, left to right, backlight on
#[derive(Default)]
pub struct Config {
    state: LcdState,
}

#[allow(missing_docs)]
impl Config {
    pub fn get_backlight(&self) -> State {
        self.state.get_backlight()
    }

    pub fn set_backlight(mut self, backlight: State) -> Self {
        self.state.set_backlight(backlight);
        self
    }

    pub fn get_line_mode(&self) -> LineMode {
        self.state.get_line_mode()
    }

    pub fn set_line_mode(mut self, line: LineMode) -> Self {
        self.state.set_line_mode(line);
        self
    }

    pub fn get_font(&self) -> Font {
        self.state.get_font()
    }

    pub fn set_font(mut self, font: Font) -> Self {
        self.state.set_font(font);
        self
    }

    pub fn get_display_state(&self) -> State {
        self.state.get_display_state()
    }

    pub fn set_display_state(mut self, display: State) -> Self {
        self.state.set_display_state(display);
        self
    }

    pub fn get_cursor_state(&self) -> State {
        self.state.get_cursor_state()
    }

    pub fn set_cursor_state(mut self, cursor: State) -> Self {
        self.state.set_cursor_state(cursor);
        self
    }

    pub fn get_cursor_blink(&self) -> State {
        self.state.get_cursor_blink()
    }

    pub fn set_cursor_blink(mut self, blink: State) -> Self {
        self.state.set_cursor_blink(blink);
        self
    }

    pub fn get_direction(&self) -> MoveDirection {
        self.state.get_direction()
    }

    pub fn set_direction(mut self, dir: MoveDirection) -> Self {
        self.state.set_direction(dir);
        self
    }

    pub fn get_shift_type(&self) -> ShiftType {
        self.state.get_shift_type()
    }

    pub fn set_shift_type(mut self, shift: ShiftType) -> Self {
        self.state.set_shift_type(shift);
        self
    }
}

impl<'a, 'b, Sender, Delayer> Lcd<'a, 'b, Sender, Delayer>
where
    Sender: SendCommand,
    Delayer: DelayNs,
{
    /// Create a [`Lcd`] driver, and run the power-on handshake of 4 bit mode
    pub fn new(
        sender: &'a mut Sender,
        delayer: &'b mut Delayer,
        config: Config,
    ) -> Result<Self, Sender::Error> {
        let state = config.state;

        // every expander byte carries the backlight bit, so settle it before the first one
        if sender.get_backlight() != state.get_backlight() {
            sender.set_backlight(state.get_backlight())?;
        }

        // in initialization process, we'd better use "raw command", to strictly follow datasheet

        // whatever bus width the controller woke up in,
        // 3 times of 8 bit function set bring it to a known state
        delayer.delay_ms(POWER_ON_WAIT_MS);
        for _ in 0..3 {
            sender.send_and_settle(
                CommandSet::HalfFunctionSet(DataWidth::Bit8).into(),
                delayer,
                RESET_SETTLE_US,
            )?;
        }

        sender.send_and_settle(
            CommandSet::HalfFunctionSet(DataWidth::Bit4).into(),
            delayer,
            MODE_SETTLE_US,
        )?;

        // from here on, every command is 8 bit long, sent as 2 nibbles
        sender.send(
            CommandSet::FunctionSet(DataWidth::Bit4, state.get_line_mode(), state.get_font())
                .into(),
            delayer,
        )?;

        sender.send(
            CommandSet::DisplayOnOff {
                display: state.get_display_state(),
                cursor: state.get_cursor_state(),
                cursor_blink: state.get_cursor_blink(),
            }
            .into(),
            delayer,
        )?;

        sender.send(
            CommandSet::EntryModeSet(state.get_direction(), state.get_shift_type()).into(),
            delayer,
        )?;

        let mut lcd = Lcd {
            sender,
            delayer,
            state,
        };
        lcd.clear()?;

        Ok(lcd)
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };

    use super::*;
    use crate::{
        sender::I2cSender,
        testing::{Hd44780, Latched},
    };

    #[test]
    fn handshake_on_the_wire() {
        let bytes: [u8; 24] = [
            // 3 reset nibbles
            0x3C, 0x38, 0x3C, 0x38, 0x3C, 0x38, //
            // commit 4 bit mode
            0x2C, 0x28, //
            // 0x28: 2 lines, 5x8
            0x2C, 0x28, 0x8C, 0x88, //
            // 0x0C: display on, cursor off
            0x0C, 0x08, 0xCC, 0xC8, //
            // 0x06: auto increment
            0x0C, 0x08, 0x6C, 0x68, //
            // 0x01: clear
            0x0C, 0x08, 0x1C, 0x18,
        ];
        let expected: Vec<_> = bytes
            .iter()
            .map(|&byte| I2cTransaction::write(0x27, vec![byte]))
            .collect();

        let mut i2c = I2cMock::new(&expected);
        let mut delayer = NoopDelay::new();
        let mut sender = I2cSender::new(&mut i2c, 0x27);
        Lcd::new(&mut sender, &mut delayer, Config::default()).unwrap();

        i2c.done();
    }

    #[test]
    fn controller_ends_up_in_4_bit_mode() {
        let mut bus = Hd44780::new();
        let mut delayer = NoopDelay::new();
        let mut sender = I2cSender::new(&mut bus, 0x27);
        Lcd::new(&mut sender, &mut delayer, Config::default()).unwrap();

        assert!(bus.four_bit_mode());
        assert!(bus.display_on());
        assert_eq!(
            bus.take_latched(),
            vec![
                Latched::Nibble(0x3),
                Latched::Nibble(0x3),
                Latched::Nibble(0x3),
                Latched::Nibble(0x2),
                Latched::Instruction(0x28),
                Latched::Instruction(0x0C),
                Latched::Instruction(0x06),
                Latched::Instruction(0x01),
            ]
        );
    }

    #[test]
    fn dark_start_switches_backlight_first() {
        let mut bus = Hd44780::new();
        let mut delayer = NoopDelay::new();
        let mut sender = I2cSender::new(&mut bus, 0x27);
        let lcd = Lcd::new(
            &mut sender,
            &mut delayer,
            Config::default().set_backlight(State::Off),
        )
        .unwrap();
        assert_eq!(lcd.get_backlight(), State::Off);
        drop(lcd);

        let bytes = bus.take_bytes();
        assert_eq!(bytes[0], 0x00);
        assert!(bytes.iter().all(|byte| byte & 0x08 == 0));
    }
}
