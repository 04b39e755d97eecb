use log::{LevelFilter, Metadata, Record};
use rtt_target::rprintln;

/// Routes `log` records to the RTT up channel, keeping the UART free for note events
struct RttLogger;

static LOGGER: RttLogger = RttLogger;

impl log::Log for RttLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        rprintln!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Must be called once, before interrupts that might log are unmasked
pub fn init(level: LevelFilter) {
    rtt_target::rtt_init_print!();
    // No compare-and-swap on the M0, so the racy setters are the only option
    unsafe {
        log::set_logger_racy(&LOGGER).ok();
        log::set_max_level_racy(level);
    }
}
