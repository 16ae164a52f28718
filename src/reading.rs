//! What a [`Measurement`] means to the person looking at the display

use core::fmt::{self, Write};

use heapless::String;

use crate::sensor::{Centimeters, Measurement};

/// Nominal reach of a HC-SR04, anything further is not trusted
pub const RANGE_LIMIT: Centimeters = Centimeters::from_deci(4_000);

/// visible width of one LCD line
const LINE_WIDTH: usize = 16;

/// A [`Measurement`] sorted into what the display should say about it
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// the echo never came back
    NoSignal,
    /// further than [`RANGE_LIMIT`]
    OutOfRange(Centimeters),
    #[allow(missing_docs)]
    InRange(Centimeters),
}

impl Reading {
    #[allow(missing_docs)]
    pub fn classify(measurement: Measurement) -> Self {
        match measurement {
            Measurement::Timeout => Reading::NoSignal,
            Measurement::Distance(cm) if cm > RANGE_LIMIT => Reading::OutOfRange(cm),
            Measurement::Distance(cm) => Reading::InRange(cm),
        }
    }

    /// Classify a distance given as plain centimeters, negative means no signal
    pub fn from_cm_f32(cm: f32) -> Self {
        Self::classify(Measurement::from_cm_f32(cm))
    }

    /// Text for the second LCD line, before fitting it to the display width
    pub fn lcd_text(&self) -> String<20> {
        let mut text = String::new();
        // the longest text is 17 characters ("Ausser Reichweite"), it always fits
        let written = match self {
            Reading::NoSignal => text.write_str("Kein Signal!"),
            Reading::OutOfRange(_) => text.write_str("Ausser Reichweite"),
            Reading::InRange(cm) => write!(text, "{cm} cm"),
        };
        debug_assert!(written.is_ok(), "reading text overflows its buffer");
        text
    }

    /// [`Reading::lcd_text`], left-justified in exactly 16 columns
    ///
    /// Longer text is cut, "Ausser Reichweite" shows as "Ausser Reichweit".
    pub fn lcd_line(&self) -> String<LINE_WIDTH> {
        fit_line(&self.lcd_text())
    }
}

/// Console wording, `Messung: {reading}`
impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::NoSignal => f.write_str("Kein Signal"),
            Reading::OutOfRange(cm) | Reading::InRange(cm) => write!(f, "{cm} cm"),
        }
    }
}

/// Cut or pad `text` to one full LCD line
pub fn fit_line(text: &str) -> String<LINE_WIDTH> {
    let mut line = String::new();
    for char in text.chars().take(LINE_WIDTH) {
        if line.push(char).is_err() {
            break;
        }
    }
    while line.push(' ').is_ok() {}
    line
}
