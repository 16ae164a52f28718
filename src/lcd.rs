//! The [`Lcd`] driver, what user code talks to

use embedded_hal::delay::DelayNs;

use crate::{
    command::{CommandSet, MoveDirection, State},
    sender::SendCommand,
    state::{LcdState, COLUMNS},
};

mod init;

pub use init::Config;

/// how long the controller needs for ClearDisplay / ReturnHome
const CLEAR_SETTLE_US: u32 = 2_000;

/// A LCD1602 behind a [`SendCommand`] sender
///
/// Positions are `(row, column)`, row is 0 or 1, column counts DDRAM cells from the left edge.
/// Only columns 0..16 are visible, anything written further right lands in controller memory off screen.
pub struct Lcd<'a, 'b, Sender: SendCommand, Delayer: DelayNs> {
    sender: &'a mut Sender,
    delayer: &'b mut Delayer,
    state: LcdState,
}

impl<'a, 'b, Sender: SendCommand, Delayer: DelayNs> Lcd<'a, 'b, Sender, Delayer> {
    /// Note:
    /// Due to driver implementation, this function may have actual effect, or not
    pub fn set_backlight(&mut self, backlight: State) -> Result<(), Sender::Error> {
        self.sender.set_backlight(backlight)?;
        self.state.set_backlight(backlight);
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn get_backlight(&self) -> State {
        self.state.get_backlight()
    }

    /// Wipe the whole DDRAM and put cursor back to (0, 0)
    pub fn clear(&mut self) -> Result<(), Sender::Error> {
        self.sender.send_and_settle(
            CommandSet::ClearDisplay.into(),
            self.delayer,
            CLEAR_SETTLE_US,
        )?;
        self.state.clear_cells();
        Ok(())
    }

    /// Put cursor back to (0, 0), DDRAM is kept
    pub fn return_home(&mut self) -> Result<(), Sender::Error> {
        self.sender.send_and_settle(
            CommandSet::ReturnHome.into(),
            self.delayer,
            CLEAR_SETTLE_US,
        )?;
        self.state.set_cursor_pos((0, 0));
        Ok(())
    }

    /// Move cursor to `(row, col)`
    ///
    /// # Panics
    ///
    /// row larger than 1, or col outside the 40 DDRAM cells of a line
    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Sender::Error> {
        self.state.check_cursor_pos((row, col));
        let addr = self.state.ddram_addr((row, col));

        self.sender
            .send(CommandSet::SetDDRAM(addr).into(), self.delayer)?;

        // only follow the controller once it took the address
        self.state.set_cursor_pos((row, col));
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn get_cursor_pos(&self) -> (u8, u8) {
        self.state.get_cursor_pos()
    }

    /// Write a raw character code at cursor, cursor then moves as the entry mode says
    pub fn write_u8_to_cur(&mut self, byte: u8) -> Result<(), Sender::Error> {
        self.sender
            .send(CommandSet::WriteDataToRAM(byte).into(), self.delayer)?;

        // the address counter of the controller moves by itself, we only need to follow it
        self.state.put_byte(byte);
        Ok(())
    }

    /// write [char] to current position
    /// character only support
    /// from ASCII 0x20 (white space) to ASCII 0x7D (`}`)
    pub fn write_char_to_cur(&mut self, char: char) -> Result<(), Sender::Error> {
        // map char out side of ASCII 0x20 and 0x7D to full rectangle
        let out_byte = match char.is_ascii() {
            true if (0x20 <= char as u8) && (char as u8 <= 0x7D) => char as u8,
            _ => 0xFF,
        };

        self.write_u8_to_cur(out_byte)
    }

    /// write string to current position, there is no wrapping nor bounds check
    pub fn write_str_to_cur(&mut self, str: &str) -> Result<(), Sender::Error> {
        str.chars()
            .try_for_each(|char| self.write_char_to_cur(char))
    }

    /// write string to specific position
    pub fn write_str_to_pos(&mut self, str: &str, pos: (u8, u8)) -> Result<(), Sender::Error> {
        self.set_cursor(pos.0, pos.1)?;
        self.write_str_to_cur(str)
    }

    /// Replace a whole visible line: `text` is left-justified,
    /// cut at 16 characters, and padded with spaces to the right edge
    pub fn write_line(&mut self, row: u8, text: &str) -> Result<(), Sender::Error> {
        self.set_cursor(row, 0)?;

        let mut written = 0;
        for char in text.chars().take(COLUMNS) {
            self.write_char_to_cur(char)?;
            written += 1;
        }
        (written..COLUMNS).try_for_each(|_| self.write_u8_to_cur(b' '))
    }

    /// Character code shown at a visible cell
    pub fn cell(&self, row: u8, col: u8) -> u8 {
        self.state.get_cell(row, col)
    }

    /// The 16 visible character codes of a row
    pub fn line(&self, row: u8) -> &[u8; COLUMNS] {
        self.state.get_line(row)
    }

    #[allow(missing_docs)]
    pub fn set_display_state(&mut self, display: State) -> Result<(), Sender::Error> {
        self.state.set_display_state(display);
        self.send_display_on_off()
    }

    #[allow(missing_docs)]
    pub fn get_display_state(&self) -> State {
        self.state.get_display_state()
    }

    #[allow(missing_docs)]
    pub fn set_cursor_state(&mut self, cursor: State) -> Result<(), Sender::Error> {
        self.state.set_cursor_state(cursor);
        self.send_display_on_off()
    }

    #[allow(missing_docs)]
    pub fn get_cursor_state(&self) -> State {
        self.state.get_cursor_state()
    }

    #[allow(missing_docs)]
    pub fn set_cursor_blink_state(&mut self, blink: State) -> Result<(), Sender::Error> {
        self.state.set_cursor_blink(blink);
        self.send_display_on_off()
    }

    #[allow(missing_docs)]
    pub fn get_cursor_blink_state(&self) -> State {
        self.state.get_cursor_blink()
    }

    #[allow(missing_docs)]
    pub fn set_direction(&mut self, dir: MoveDirection) -> Result<(), Sender::Error> {
        self.state.set_direction(dir);

        self.sender.send(
            CommandSet::EntryModeSet(self.state.get_direction(), self.state.get_shift_type())
                .into(),
            self.delayer,
        )
    }

    #[allow(missing_docs)]
    pub fn get_direction(&self) -> MoveDirection {
        self.state.get_direction()
    }

    #[allow(missing_docs)]
    pub fn delay_ms(&mut self, ms: u32) {
        self.delayer.delay_ms(ms);
    }

    #[allow(missing_docs)]
    pub fn delay_us(&mut self, us: u32) {
        self.delayer.delay_us(us);
    }

    pub(crate) fn delayer(&mut self) -> &mut Delayer {
        self.delayer
    }

    fn send_display_on_off(&mut self) -> Result<(), Sender::Error> {
        self.sender.send(
            CommandSet::DisplayOnOff {
                display: self.state.get_display_state(),
                cursor: self.state.get_cursor_state(),
                cursor_blink: self.state.get_cursor_blink(),
            }
            .into(),
            self.delayer,
        )
    }
}
