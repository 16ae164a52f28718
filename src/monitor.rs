//! Sample, show, repeat
//!
//! [`Monitor`] owns a [`Lcd`] and a [`HcSr04`], and runs the measuring loop:
//! a greeting, a headline on line 1, then one reading on line 2 per cycle.
//! Leaving the loop always goes through the farewell screen, also when a cycle failed.

use core::{
    fmt,
    ops::{Deref, DerefMut},
};

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::{
    command::State,
    lcd::Lcd,
    reading::Reading,
    sender::SendCommand,
    sensor::{self, HcSr04, Monotonic},
};

/// Timing of the measuring loop
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorConfig {
    /// pause between two measurements
    pub interval_ms: u32,
    /// how long the greeting stays before the first measurement
    pub greeting_ms: u32,
    /// how long the farewell stays before the display goes dark
    pub farewell_ms: u32,
    /// the pause between measurements is cut in slices of this length,
    /// a stop request is checked after each of them
    pub poll_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            greeting_ms: 2_000,
            farewell_ms: 1_000,
            poll_ms: 50,
        }
    }
}

/// Why the measuring loop stopped early
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<BusE> {
    /// the display bus failed
    Display(BusE),
    /// a sensor pin failed
    Sensor(sensor::Error),
}

impl<BusE> From<sensor::Error> for Error<BusE> {
    fn from(e: sensor::Error) -> Self {
        Error::Sensor(e)
    }
}

impl<BusE: fmt::Debug> fmt::Display for Error<BusE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Display(e) => write!(f, "display bus: {e:?}"),
            Error::Sensor(e) => write!(f, "sensor: {e}"),
        }
    }
}

const HEADLINE: &str = "Entfernung:";
const GREETING: [&str; 2] = ["Entfernungs-", "messung aktiv!"];
const FAREWELL: [&str; 2] = ["Programm", "beendet!"];

/// The distance display
pub struct Monitor<'a, 'b, Sender, Delayer, Trig, Echo, Clock>
where
    Sender: SendCommand,
    Delayer: DelayNs,
{
    lcd: Lcd<'a, 'b, Sender, Delayer>,
    sensor: HcSr04<Trig, Echo, Clock>,
    config: MonitorConfig,
}

impl<'a, 'b, Sender, Delayer, Trig, Echo, Clock> Monitor<'a, 'b, Sender, Delayer, Trig, Echo, Clock>
where
    Sender: SendCommand,
    Delayer: DelayNs,
    Trig: OutputPin,
    Echo: InputPin,
    Clock: Monotonic,
{
    /// `lcd` should be freshly initialized, [`Monitor::run`] takes over the whole screen
    pub fn new(
        lcd: Lcd<'a, 'b, Sender, Delayer>,
        sensor: HcSr04<Trig, Echo, Clock>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            lcd,
            sensor,
            config,
        }
    }

    /// Give display and sensor back
    pub fn release(self) -> (Lcd<'a, 'b, Sender, Delayer>, HcSr04<Trig, Echo, Clock>) {
        (self.lcd, self.sensor)
    }

    #[allow(missing_docs)]
    pub fn lcd(&self) -> &Lcd<'a, 'b, Sender, Delayer> {
        &self.lcd
    }

    /// Measure until `stop_requested` says so
    ///
    /// `stop_requested` is polled before each cycle, and every [`MonitorConfig::poll_ms`]
    /// of the pause that follows it, a stop during the pause skips the rest of it.
    /// `on_reading` sees every reading right after it is on the display.
    ///
    /// The farewell screen is shown on the way out, even when a cycle failed.
    /// In that case the farewell is best effort, and the error of the cycle is returned.
    pub fn run(
        &mut self,
        mut stop_requested: impl FnMut() -> bool,
        mut on_reading: impl FnMut(&Reading),
    ) -> Result<(), Error<Sender::Error>> {
        let mut session = ShutdownGuard::new(&mut *self, |monitor: &mut Self| {
            let _ = monitor.farewell();
        });

        session.greet()?;
        while !stop_requested() {
            let reading = session.refresh()?;
            on_reading(&reading);
            if session.pause(&mut stop_requested) {
                break;
            }
        }

        session.disarm();
        drop(session);
        self.farewell()
    }

    /// Greeting, then the headline and an empty line 2
    pub fn greet(&mut self) -> Result<(), Error<Sender::Error>> {
        self.show(GREETING)?;
        self.lcd.delay_ms(self.config.greeting_ms);

        self.lcd
            .write_line(0, HEADLINE)
            .map_err(Error::Display)?;
        self.lcd.write_line(1, "").map_err(Error::Display)
    }

    /// One cycle: measure, and put the result on line 2
    pub fn refresh(&mut self) -> Result<Reading, Error<Sender::Error>> {
        let measurement = self.sensor.measure(self.lcd.delayer())?;
        let reading = Reading::classify(measurement);

        self.lcd
            .write_line(1, &reading.lcd_line())
            .map_err(Error::Display)?;

        Ok(reading)
    }

    /// Farewell screen, then blank and dark
    pub fn farewell(&mut self) -> Result<(), Error<Sender::Error>> {
        self.show(FAREWELL)?;
        self.lcd.delay_ms(self.config.farewell_ms);

        self.lcd.clear().map_err(Error::Display)?;
        self.lcd
            .set_backlight(State::Off)
            .map_err(Error::Display)
    }

    // true when a stop came in before the interval was over
    fn pause(&mut self, stop_requested: &mut impl FnMut() -> bool) -> bool {
        let slice_ms = self.config.poll_ms.max(1);
        let mut left_ms = self.config.interval_ms;

        while left_ms > 0 {
            let step_ms = left_ms.min(slice_ms);
            self.lcd.delay_ms(step_ms);
            left_ms -= step_ms;

            // the loop head polls once the whole interval is over
            if left_ms > 0 && stop_requested() {
                return true;
            }
        }
        false
    }

    fn show(&mut self, lines: [&str; 2]) -> Result<(), Error<Sender::Error>> {
        self.lcd.clear().map_err(Error::Display)?;
        self.lcd
            .write_str_to_pos(lines[0], (0, 0))
            .map_err(Error::Display)?;
        self.lcd
            .write_str_to_pos(lines[1], (1, 0))
            .map_err(Error::Display)
    }
}

/// Runs `on_exit` on the borrowed value when dropped, unless disarmed
struct ShutdownGuard<'g, T, F: FnMut(&mut T)> {
    target: &'g mut T,
    on_exit: Option<F>,
}

impl<'g, T, F: FnMut(&mut T)> ShutdownGuard<'g, T, F> {
    fn new(target: &'g mut T, on_exit: F) -> Self {
        Self {
            target,
            on_exit: Some(on_exit),
        }
    }

    fn disarm(&mut self) {
        self.on_exit = None;
    }
}

impl<T, F: FnMut(&mut T)> Deref for ShutdownGuard<'_, T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        self.target
    }
}

impl<T, F: FnMut(&mut T)> DerefMut for ShutdownGuard<'_, T, F> {
    fn deref_mut(&mut self) -> &mut T {
        self.target
    }
}

impl<T, F: FnMut(&mut T)> Drop for ShutdownGuard<'_, T, F> {
    fn drop(&mut self) {
        if let Some(mut on_exit) = self.on_exit.take() {
            on_exit(self.target);
        }
    }
}
