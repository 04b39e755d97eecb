#![no_main]
#![no_std]

use core::sync::atomic::{AtomicU32, Ordering};
use cortex_m;
use cortex_m_rt::{entry, exception};
use log::{info, LevelFilter};
use panic_halt as _;

use stm32f0xx_hal as hal;

use touch::{ChannelConfig, PollDriver, TouchConfig};

use crate::hal::pac;
use crate::hal::pac::interrupt;
use crate::hal::prelude::*;

use sampler::{TouchSampler, TscSample};
use serial::SerialSink;

mod logger;
mod sampler;
mod serial;

const NUM_KEYS: usize = 8;

static KEYS: [ChannelConfig; NUM_KEYS] = [
    ChannelConfig::new("c4_on", "c4_off"),
    ChannelConfig::new("d4_on", "d4_off"),
    ChannelConfig::new("e4_on", "e4_off"),
    ChannelConfig::new("f4_on", "f4_off"),
    ChannelConfig::new("g4_on", "g4_off"),
    ChannelConfig::new("a4_on", "a4_off"),
    ChannelConfig::new("b4_on", "b4_off"),
    ChannelConfig::new("c5_on", "c5_off"),
];

const PAD_IDLE: u16 = 1200;
const PAD_TOUCHED: u16 = 900;

/// Electrode for each entry in KEYS
///
/// Idle and touched counts are nominal levels for the pad size and TSC setup used here. Tune
/// them per board: the detect threshold sits halfway between the two.
static PADS: [TscSample; NUM_KEYS] = [
    TscSample { group: 1, sample: 2, channel: 1, idle: PAD_IDLE, touched: PAD_TOUCHED }, // C4, PA0
    TscSample { group: 1, sample: 2, channel: 3, idle: PAD_IDLE, touched: PAD_TOUCHED }, // D4, PA2
    TscSample { group: 2, sample: 3, channel: 1, idle: PAD_IDLE, touched: PAD_TOUCHED }, // E4, PA4
    TscSample { group: 2, sample: 3, channel: 2, idle: PAD_IDLE, touched: PAD_TOUCHED }, // F4, PA5
    TscSample { group: 3, sample: 4, channel: 2, idle: PAD_IDLE, touched: PAD_TOUCHED }, // G4, PB0
    TscSample { group: 3, sample: 4, channel: 3, idle: PAD_IDLE, touched: PAD_TOUCHED }, // A4, PB1
    TscSample { group: 6, sample: 2, channel: 1, idle: PAD_IDLE, touched: PAD_TOUCHED }, // B4, PB11
    TscSample { group: 6, sample: 2, channel: 3, idle: PAD_IDLE, touched: PAD_TOUCHED }, // C5, PB13
];

static TOUCH_CONFIG: TouchConfig = TouchConfig {
    detect_threshold: 50,
    debounce_delay: 100,
    poll_period: 10,
};

/// Milliseconds since boot
static TIME: AtomicU32 = AtomicU32::new(0);

#[entry]
fn main() -> ! {
    logger::init(LevelFilter::Info);

    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let mut flash = dp.FLASH;
    let mut rcc = dp.RCC.configure().sysclk(48.mhz()).freeze(&mut flash);
    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);

    // A library requiring a critical section to set a gpio AF register is bad and I just won't.
    let fake_cs = unsafe { cortex_m::interrupt::CriticalSection::new() };

    // Initialize touch pins
    let _c4 = gpioa.pa0.into_alternate_af3(&fake_cs);
    let _d4 = gpioa.pa2.into_alternate_af3(&fake_cs);
    let _e4 = gpioa.pa4.into_alternate_af3(&fake_cs);
    let _f4 = gpioa.pa5.into_alternate_af3(&fake_cs);
    let _g4 = gpiob.pb0.into_alternate_af3(&fake_cs);
    let _a4 = gpiob.pb1.into_alternate_af3(&fake_cs);
    let _b4 = gpiob.pb11.into_alternate_af3(&fake_cs);
    let _c5 = gpiob.pb13.into_alternate_af3(&fake_cs);
    let _g1_cap = gpioa.pa1.into_alternate_af3(&fake_cs);
    let _g2_cap = gpioa.pa6.into_alternate_af3(&fake_cs);
    let _g3_cap = gpiob.pb2.into_alternate_af3(&fake_cs);
    let _g6_cap = gpiob.pb12.into_alternate_af3(&fake_cs);

    let sampler = TouchSampler::new(dp.TSC, &mut rcc, &PADS);

    let tx_pin = gpiob.pb6.into_alternate_af0(&fake_cs);
    let rx_pin = gpiob.pb7.into_alternate_af0(&fake_cs);
    let uart = hal::serial::Serial::usart1(dp.USART1, (tx_pin, rx_pin), 115200.bps(), &mut rcc);
    serial::uart1::init(uart, 4);

    let mut syst = hal::timers::Timer::syst(cp.SYST, 1000.hz(), &mut rcc);
    syst.listen(&hal::timers::Event::TimeOut);

    let mut keys = PollDriver::new(&KEYS, Some(&TOUCH_CONFIG), sampler, SerialSink::new());
    for (i, key) in keys.detector.channels().iter().enumerate() {
        info!("key {}: {} / {}", i, key.on_label, key.off_label);
    }
    info!("{} touch keys ready", NUM_KEYS);

    let mut reported_drops = 0;
    loop {
        let time = TIME.load(Ordering::Relaxed);
        if keys.poll_if_due(time).is_some() && keys.sink.dropped() != reported_drops {
            reported_drops = keys.sink.dropped();
            info!("{} events dropped on full uart queue", reported_drops);
        }
    }
}

#[exception]
fn SysTick() {
    let time = TIME.load(Ordering::Relaxed);
    TIME.store(time.wrapping_add(1), Ordering::Relaxed);
}
