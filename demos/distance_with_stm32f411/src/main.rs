//! Show the distance measured by a HC-SR04 on a LCD1602 behind a PCF8574 adapter,
//! with a STM32F411RET6
//!
//! Press KEY to end the measuring, the display says goodbye and goes dark.

//! Wiring diagram
//!
//! LCD1602 (PCF8574 adapter) <-> STM32F411RET6
//!                       GND <-> GND
//!                       VCC <-> 5V
//!                       SDA <-> PB7
//!                       SCL <-> PB6
//!
//!                   HC-SR04 <-> STM32F411RET6
//!                       GND <-> GND
//!                       VCC <-> 5V
//!                      TRIG <-> PB4
//!                      ECHO <-> PB5 (through a divider, ECHO swings to 5V)
//!
//!                       KEY <-> PA0 (to GND when pressed)

#![no_std]
#![no_main]

use panic_rtt_target as _;
use rtt_target::{rprintln, rtt_init_print};
use stm32f4xx_hal::{
    gpio::{Edge, ExtiPin},
    i2c::{self, I2c},
    pac,
    prelude::*,
    timer::CounterUs,
};

use hcsr04_lcd1602::{
    lcd::{Config, Lcd},
    monitor::{Monitor, MonitorConfig},
    sender::I2cSender,
    sensor::{HcSr04, Monotonic},
};

const RULE: &str = "========================================";

/// TIM2 is 32 bit, free running at 1 MHz
struct Tim2Clock(CounterUs<pac::TIM2>);

impl Monotonic for Tim2Clock {
    fn now_us(&mut self) -> u32 {
        self.0.now().ticks()
    }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    rtt_init_print!();

    let dp = pac::Peripherals::take().expect("Cannot take device peripherals");
    let cp = pac::CorePeripherals::take().expect("Cannot take core peripherals");

    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.use_hse(12.MHz()).freeze();

    let mut delayer = cp.SYST.delay(&clocks);

    // the counter reloads at u32::MAX - 1, one tick short of a full wrap, which costs at most 1 µs
    let mut counter = dp.TIM2.counter_us(&clocks);
    counter
        .start(u32::MAX.micros())
        .expect("Cannot start TIM2");

    let gpioa = dp.GPIOA.split();
    let gpiob = dp.GPIOB.split();

    let mut i2c = I2c::new(
        dp.I2C1,
        (gpiob.pb6, gpiob.pb7),
        i2c::Mode::standard(100.kHz()), // The PCF8574T max I2C speed
        &clocks,
    );

    let trigger = gpiob.pb4.into_push_pull_output();
    let echo = gpiob.pb5.into_pull_down_input();
    let mut key = gpioa.pa0.into_pull_up_input();

    // latch presses in the EXTI pending bit, the NVIC line stays masked,
    // so a press is kept until the loop gets around to look at it
    let mut syscfg = dp.SYSCFG.constrain();
    let mut exti = dp.EXTI;
    key.make_interrupt_source(&mut syscfg);
    key.trigger_on_edge(&mut exti, Edge::Falling);
    key.enable_interrupt(&mut exti);

    rprintln!("{}", RULE);
    rprintln!("Ultraschall-Entfernungsmessung");
    rprintln!("HC-SR04 + 1602 I2C LCD");
    rprintln!("Taste KEY druecken zum Beenden");
    rprintln!("{}", RULE);

    let mut sender = I2cSender::new(&mut i2c, 0x27);

    // init LCD1602
    let lcd = Lcd::new(&mut sender, &mut delayer, Config::default()).expect("Cannot init LCD1602");

    let sensor = HcSr04::new(trigger, echo, Tim2Clock(counter));

    let mut monitor = Monitor::new(lcd, sensor, MonitorConfig::default());
    monitor
        .run(
            || {
                let pressed = key.check_interrupt();
                if pressed {
                    key.clear_interrupt_pending_bit();
                }
                pressed
            },
            |reading| rprintln!("Messung: {}", reading),
        )
        .expect("Measuring stopped on error");

    rprintln!("Programm beendet.");

    #[allow(clippy::empty_loop)]
    loop {}
}
