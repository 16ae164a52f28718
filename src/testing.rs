//! Host side stand-ins for the hardware

use core::{cell::Cell, convert::Infallible};
use std::rc::Rc;

use embedded_hal::{
    digital::{self, InputPin, OutputPin},
    i2c::{self, I2c, NoAcknowledgeSource, Operation},
};

use crate::sensor::{HcSr04, Monotonic};

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BL: u8 = 0x08;

/// what [`crate::lcd::Lcd::new`] latches: 4 lone nibbles, then 0x28 0x0C 0x06 0x01
pub(crate) const INIT_LEN: usize = 8;

/// Something the controller took in on a falling edge of EN
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Latched {
    /// a nibble taken while still in 8 bit mode
    Nibble(u8),
    Instruction(u8),
    Data(u8),
}

/// A PCF8574 with a HD44780 behind it, two line mode
///
/// Decodes the expander bytes back into what the controller would execute.
pub(crate) struct Hd44780 {
    bytes: Vec<u8>,
    latched: Vec<Latched>,
    last: u8,
    four_bit: bool,
    pending: Option<u8>,
    ddram: [u8; 0x80],
    ac: u8,
    increment: bool,
    display_on: bool,
    fail_from: Option<usize>,
    written: usize,
}

impl Hd44780 {
    pub(crate) fn new() -> Self {
        Self {
            bytes: Vec::new(),
            latched: Vec::new(),
            // PCF8574 powers up with all outputs high
            last: 0xFF & !EN,
            four_bit: false,
            pending: None,
            ddram: [b' '; 0x80],
            ac: 0,
            increment: true,
            display_on: false,
            fail_from: None,
            written: 0,
        }
    }

    /// every write from the `n`th byte on is not acknowledged
    pub(crate) fn failing_after(mut self, n: usize) -> Self {
        self.fail_from = Some(n);
        self
    }

    pub(crate) fn take_bytes(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.bytes)
    }

    pub(crate) fn take_latched(&mut self) -> Vec<Latched> {
        core::mem::take(&mut self.latched)
    }

    pub(crate) fn visible_line(&self, row: u8) -> String {
        let start = usize::from(row) * 0x40;
        self.ddram[start..start + 16]
            .iter()
            .map(|&byte| byte as char)
            .collect()
    }

    pub(crate) fn ddram(&self, addr: u8) -> u8 {
        self.ddram[usize::from(addr)]
    }

    pub(crate) fn address_counter(&self) -> u8 {
        self.ac
    }

    pub(crate) fn backlight(&self) -> bool {
        self.last & BL != 0
    }

    pub(crate) fn four_bit_mode(&self) -> bool {
        self.four_bit
    }

    pub(crate) fn display_on(&self) -> bool {
        self.display_on
    }

    fn feed(&mut self, byte: u8) -> Result<(), i2c::ErrorKind> {
        if self.fail_from.is_some_and(|n| self.written >= n) {
            return Err(i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        }
        self.written += 1;
        self.bytes.push(byte);

        if self.last & EN != 0 && byte & EN == 0 {
            self.latch(self.last);
        }
        self.last = byte;
        Ok(())
    }

    fn latch(&mut self, byte: u8) {
        let rs = byte & RS != 0;
        let nibble = byte >> 4;

        if !self.four_bit {
            self.latched.push(Latched::Nibble(nibble));
            if nibble == 0x2 {
                self.four_bit = true;
            }
            return;
        }

        match self.pending.take() {
            None => self.pending = Some(nibble),
            Some(high) => self.execute(rs, (high << 4) | nibble),
        }
    }

    fn execute(&mut self, rs: bool, byte: u8) {
        if rs {
            self.latched.push(Latched::Data(byte));
            self.ddram[usize::from(self.ac)] = byte;
            self.step_ac();
            return;
        }

        self.latched.push(Latched::Instruction(byte));
        match byte {
            0x01 => {
                self.ddram = [b' '; 0x80];
                self.ac = 0;
                self.increment = true;
            }
            0x02..=0x03 => self.ac = 0,
            0x04..=0x07 => self.increment = byte & 0x02 != 0,
            0x08..=0x0F => self.display_on = byte & 0x04 != 0,
            0x80..=0xFF => self.ac = byte & 0x7F,
            _ => {}
        }
    }

    fn step_ac(&mut self) {
        self.ac = match (self.increment, self.ac) {
            (true, 0x27) => 0x40,
            (true, 0x67) => 0x00,
            (true, ac) => ac + 1,
            (false, 0x00) => 0x67,
            (false, 0x40) => 0x27,
            (false, ac) => ac - 1,
        };
    }
}

impl i2c::ErrorType for Hd44780 {
    type Error = i2c::ErrorKind;
}

impl I2c for Hd44780 {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::Write(bytes) => bytes.iter().try_for_each(|&byte| self.feed(byte))?,
                // the driver never reads back
                Operation::Read(_) => return Err(i2c::ErrorKind::Other),
            }
        }
        Ok(())
    }
}

/// Shared simulated time, the clock advances by a fixed step each time it is read
pub(crate) struct Timeline {
    now: Cell<u32>,
    fired_at: Cell<Option<u32>>,
    step: u32,
}

impl Timeline {
    pub(crate) fn new(start: u32, step: u32) -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(start),
            fired_at: Cell::new(None),
            step,
        })
    }

    pub(crate) fn now(&self) -> u32 {
        self.now.get()
    }
}

pub(crate) struct SimClock(Rc<Timeline>);

impl Monotonic for SimClock {
    fn now_us(&mut self) -> u32 {
        let now = self.0.now.get();
        self.0.now.set(now.wrapping_add(self.0.step));
        now
    }
}

/// TRIG, remembers every level it was driven to
pub(crate) struct SimTrigger {
    timeline: Rc<Timeline>,
    levels: Vec<bool>,
}

impl SimTrigger {
    pub(crate) fn levels(&self) -> &[bool] {
        &self.levels
    }
}

impl digital::ErrorType for SimTrigger {
    type Error = Infallible;
}

impl OutputPin for SimTrigger {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        // burst goes out on the falling edge
        if self.levels.last() == Some(&true) {
            self.timeline.fired_at.set(Some(self.timeline.now()));
        }
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

/// ECHO, high from `rise` to `rise + width` µs after the trigger fired
pub(crate) struct SimEcho {
    timeline: Rc<Timeline>,
    pulse: Option<(u32, Option<u32>)>,
}

impl digital::ErrorType for SimEcho {
    type Error = Infallible;
}

impl InputPin for SimEcho {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let Some(fired_at) = self.timeline.fired_at.get() else {
            return Ok(false);
        };
        let elapsed = self.timeline.now().wrapping_sub(fired_at);

        Ok(match self.pulse {
            None => false,
            Some((rise, None)) => elapsed >= rise,
            Some((rise, Some(width))) => elapsed >= rise && elapsed < rise + width,
        })
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// A HC-SR04 on simulated pins
///
/// `pulse` is `(rise, width)` in µs after the trigger, `None` width keeps echo high forever,
/// `None` pulse never raises echo.
pub(crate) fn sim_sensor(
    timeline: &Rc<Timeline>,
    pulse: Option<(u32, Option<u32>)>,
) -> HcSr04<SimTrigger, SimEcho, SimClock> {
    HcSr04::new(
        SimTrigger {
            timeline: Rc::clone(timeline),
            levels: Vec::new(),
        },
        SimEcho {
            timeline: Rc::clone(timeline),
            pulse,
        },
        SimClock(Rc::clone(timeline)),
    )
}

/// An input pin that can't be read
pub(crate) struct FailingPin;

impl digital::ErrorType for FailingPin {
    type Error = digital::ErrorKind;
}

impl InputPin for FailingPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(digital::ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(digital::ErrorKind::Other)
    }
}
