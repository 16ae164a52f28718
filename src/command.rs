//! HD44780 instruction set, and the raw form a sender puts on the wire

use crate::utils::BitOps;

/// Instructions understood by the LCD1602 controller.
///
/// Only the write side of the instruction set is listed,
/// the PCF8574 adapter is driven write-only.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandSet {
    /// Clear DDRAM and move cursor to (0, 0)
    ClearDisplay,
    /// Move cursor to (0, 0), without touching DDRAM
    ReturnHome,
    /// Cursor move direction and display shift on write
    EntryModeSet(MoveDirection, ShiftType),
    /// Display, cursor and blinking switches
    DisplayOnOff {
        /// whole display on/off
        display: State,
        /// underline cursor on/off
        cursor: State,
        /// blinking block cursor on/off
        cursor_blink: State,
    },
    // this is not a command from datasheet,
    // it's the upper half of a FunctionSet, latched before the controller knows its bus width.
    // DataWidth::Bit8 is the "reset" nibble, DataWidth::Bit4 commits 4 bit mode
    /// Upper nibble of a function set, send alone during power-on handshake
    HalfFunctionSet(DataWidth),
    /// Bus width, line count and font
    FunctionSet(DataWidth, LineMode, Font),
    /// Move address counter to DDRAM address
    SetDDRAM(u8),
    /// Write one byte into the RAM the address counter points at
    WriteDataToRAM(u8),
}

/// Direction the address counter moves after a write
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveDirection {
    #[allow(missing_docs)]
    RightToLeft,
    #[allow(missing_docs)]
    #[default]
    LeftToRight,
}

/// What moves after a write
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftType {
    #[allow(missing_docs)]
    #[default]
    CursorOnly,
    #[allow(missing_docs)]
    CursorAndDisplay,
}

/// On / Off switch
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    #[allow(missing_docs)]
    Off,
    #[allow(missing_docs)]
    #[default]
    On,
}

/// Controller bus width
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataWidth {
    #[allow(missing_docs)]
    #[default]
    Bit4,
    #[allow(missing_docs)]
    Bit8,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineMode {
    OneLine,
    #[default]
    TwoLine,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    #[default]
    Font5x8,
    Font5x11,
}

/// A [`CommandSet`] lowered to register selection and raw bits
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    rs: RegisterSelection,
    data: Bits,
}

/// Which controller register a [`Command`] targets
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterSelection {
    /// instruction register, RS low
    Command,
    /// data register, RS high
    Data,
}

/// Payload of a [`Command`]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bits {
    /// a lone nibble, in the lower 4 bits
    Bit4(u8),
    /// a full byte, sent as 2 nibbles in 4 bit mode
    Bit8(u8),
}

impl Command {
    pub(crate) fn new(rs: RegisterSelection, data: Bits) -> Self {
        if let Bits::Bit4(nibble) = data {
            assert!(nibble < (1 << 4), "data is overflow 4 bit");
        }

        Self { rs, data }
    }

    /// register this command goes to
    pub fn get_register_selection(&self) -> RegisterSelection {
        self.rs
    }

    /// raw payload
    pub fn get_data(&self) -> Bits {
        self.data
    }
}

impl From<CommandSet> for Command {
    fn from(command: CommandSet) -> Self {
        match command {
            CommandSet::ClearDisplay => {
                Self::new(RegisterSelection::Command, Bits::Bit8(0b0000_0001))
            }

            CommandSet::ReturnHome => {
                Self::new(RegisterSelection::Command, Bits::Bit8(0b0000_0010))
            }

            CommandSet::EntryModeSet(dir, st) => {
                let mut raw_bits: u8 = 0b0000_0100;

                raw_bits.put_bit(1, dir == MoveDirection::LeftToRight);
                raw_bits.put_bit(0, st == ShiftType::CursorAndDisplay);

                Self::new(RegisterSelection::Command, Bits::Bit8(raw_bits))
            }

            CommandSet::DisplayOnOff {
                display,
                cursor,
                cursor_blink,
            } => {
                let mut raw_bits: u8 = 0b0000_1000;

                raw_bits.put_bit(2, display);
                raw_bits.put_bit(1, cursor);
                raw_bits.put_bit(0, cursor_blink);

                Self::new(RegisterSelection::Command, Bits::Bit8(raw_bits))
            }

            CommandSet::HalfFunctionSet(width) => {
                let mut raw_bits: u8 = 0b0010;

                raw_bits.put_bit(0, width == DataWidth::Bit8);

                Self::new(RegisterSelection::Command, Bits::Bit4(raw_bits))
            }

            CommandSet::FunctionSet(width, line, font) => {
                let mut raw_bits: u8 = 0b0010_0000;

                raw_bits.put_bit(4, width == DataWidth::Bit8);
                raw_bits.put_bit(3, line == LineMode::TwoLine);
                raw_bits.put_bit(2, font == Font::Font5x11);

                Self::new(RegisterSelection::Command, Bits::Bit8(raw_bits))
            }

            CommandSet::SetDDRAM(addr) => {
                assert!(addr < 2u8.pow(7), "DDRAM address out of range");

                Self::new(RegisterSelection::Command, Bits::Bit8(0b1000_0000 | addr))
            }

            CommandSet::WriteDataToRAM(data) => {
                Self::new(RegisterSelection::Data, Bits::Bit8(data))
            }
        }
    }
}
