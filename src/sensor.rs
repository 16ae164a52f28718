//! HC-SR04 ultrasonic ranging
//!
//! The sensor is started by a 10 µs high pulse on TRIG, it then holds ECHO high
//! for as long as the sound burst took to come back. The echo is timed by busy-polling
//! the pin against a [`Monotonic`] clock, there is no interrupt involved.

use core::fmt;

use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, ErrorKind, InputPin, OutputPin},
};

/// width of the pulse on TRIG
pub const TRIGGER_PULSE_US: u32 = 10;
/// longest wait for each echo edge
pub const ECHO_TIMEOUT_US: u32 = 100_000;
/// cm/s in air at about 20 °C
pub const SPEED_OF_SOUND_CM_S: u32 = 34_300;

/// A free running microsecond counter
///
/// The counter is allowed to wrap at `u32::MAX`, elapsed time is taken with wrapping subtraction.
pub trait Monotonic {
    /// current counter value, in microseconds
    fn now_us(&mut self) -> u32;
}

/// A distance with a resolution of 0.1 cm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Centimeters {
    deci: u32,
}

impl Centimeters {
    /// from tenths of a centimeter
    pub const fn from_deci(deci: u32) -> Self {
        Self { deci }
    }

    /// Distance to the obstacle for an echo that stayed high for `us` microseconds
    ///
    /// `us × 34300 cm/s / 2`, rounded half up to one decimal place
    pub fn from_echo_us(us: u32) -> Self {
        // deci = us / 1e6 × 34300 / 2 × 10
        let scaled = u64::from(us) * u64::from(SPEED_OF_SOUND_CM_S);
        let deci = (scaled + 100_000) / 200_000;
        Self { deci: deci as u32 }
    }

    /// Round a non-negative float to one decimal place, negative and NaN give `None`
    pub fn from_f32(cm: f32) -> Option<Self> {
        // `!(cm >= 0.0)` also catches NaN
        if !(cm >= 0.0) {
            return None;
        }
        // float to int `as` saturates, so out of range values stick at u32::MAX
        Some(Self {
            deci: (cm * 10.0 + 0.5) as u32,
        })
    }

    /// tenths of a centimeter
    pub fn deci(&self) -> u32 {
        self.deci
    }

    #[allow(missing_docs)]
    pub fn as_f32(&self) -> f32 {
        self.deci as f32 / 10.0
    }
}

impl fmt::Display for Centimeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.deci / 10, self.deci % 10)
    }
}

/// Outcome of one [`HcSr04::measure`]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Measurement {
    /// both echo edges were seen in time
    Distance(Centimeters),
    /// one of the echo edges didn't show up within [`ECHO_TIMEOUT_US`]
    Timeout,
}

impl Measurement {
    /// how a timeout reads when a measurement is flattened to a number
    pub const TIMEOUT_SENTINEL: f32 = -1.0;

    /// Distance in centimeters, or [`Measurement::TIMEOUT_SENTINEL`]
    pub fn as_cm_f32(&self) -> f32 {
        match self {
            Measurement::Distance(cm) => cm.as_f32(),
            Measurement::Timeout => Self::TIMEOUT_SENTINEL,
        }
    }

    /// Inverse of [`Measurement::as_cm_f32`], any negative value is a timeout
    pub fn from_cm_f32(cm: f32) -> Self {
        match Centimeters::from_f32(cm) {
            Some(cm) => Measurement::Distance(cm),
            None => Measurement::Timeout,
        }
    }

    #[allow(missing_docs)]
    pub fn distance(&self) -> Option<Centimeters> {
        match self {
            Measurement::Distance(cm) => Some(*cm),
            Measurement::Timeout => None,
        }
    }
}

/// A pin of the sensor failed
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// driving TRIG failed
    Trigger(ErrorKind),
    /// reading ECHO failed
    Echo(ErrorKind),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Trigger(kind) => write!(f, "trigger pin: {kind}"),
            Error::Echo(kind) => write!(f, "echo pin: {kind}"),
        }
    }
}

/// HC-SR04 on a TRIG output, an ECHO input and a microsecond clock
pub struct HcSr04<Trig, Echo, Clock> {
    trigger: Trig,
    echo: Echo,
    clock: Clock,
}

impl<Trig, Echo, Clock> HcSr04<Trig, Echo, Clock>
where
    Trig: OutputPin,
    Echo: InputPin,
    Clock: Monotonic,
{
    #[allow(missing_docs)]
    pub fn new(trigger: Trig, echo: Echo, clock: Clock) -> Self {
        Self {
            trigger,
            echo,
            clock,
        }
    }

    /// Give pins and clock back
    pub fn release(self) -> (Trig, Echo, Clock) {
        (self.trigger, self.echo, self.clock)
    }

    /// Fire one burst and time its echo
    ///
    /// Blocks for at most 2 × [`ECHO_TIMEOUT_US`] plus the trigger pulse.
    /// A missing echo is not an error, it is reported as [`Measurement::Timeout`].
    pub fn measure(&mut self, delayer: &mut impl DelayNs) -> Result<Measurement, Error> {
        self.trigger
            .set_high()
            .map_err(|e| Error::Trigger(e.kind()))?;
        delayer.delay_us(TRIGGER_PULSE_US);
        self.trigger
            .set_low()
            .map_err(|e| Error::Trigger(e.kind()))?;

        let wait_start = self.clock.now_us();
        let mut rise = wait_start;
        while !self.echo_is_high()? {
            rise = self.clock.now_us();
            if rise.wrapping_sub(wait_start) > ECHO_TIMEOUT_US {
                #[cfg(feature = "defmt")]
                defmt::debug!("hc-sr04: no rising edge on echo");
                return Ok(Measurement::Timeout);
            }
        }

        let mut fall = rise;
        while self.echo_is_high()? {
            fall = self.clock.now_us();
            if fall.wrapping_sub(rise) > ECHO_TIMEOUT_US {
                #[cfg(feature = "defmt")]
                defmt::debug!("hc-sr04: echo stuck high");
                return Ok(Measurement::Timeout);
            }
        }

        Ok(Measurement::Distance(Centimeters::from_echo_us(
            fall.wrapping_sub(rise),
        )))
    }

    fn echo_is_high(&mut self) -> Result<bool, Error> {
        self.echo.is_high().map_err(|e| Error::Echo(e.kind()))
    }
}
