#![cfg_attr(not(test), no_std)]

pub mod channel;
pub mod detector;
pub mod driver;
pub mod scale;

pub use channel::{ChannelConfig, ChannelState, Edge, TransitionEvent};
pub use detector::EdgeDetector;
pub use driver::{EventSink, PollDriver, Sampler};
pub use scale::proximity;

/// Configuration shared by all touch channels
#[derive(Clone, Copy, Debug)]
pub struct TouchConfig {
    /// Readings strictly below this value are classified as touched
    pub detect_threshold: u16,
    /// Minimum milliseconds between two accepted transitions of one channel. A transition is
    /// accepted only once strictly more than this much time has elapsed.
    pub debounce_delay: u32,
    /// Milliseconds between poll cycles
    pub poll_period: u32,
}

impl TouchConfig {
    const fn default() -> Self {
        Self {
            detect_threshold: 50,
            debounce_delay: 100,
            poll_period: 10,
        }
    }
}

pub const DEFAULT_TOUCH_CONFIG: TouchConfig = TouchConfig::default();

/// Top of the reading scale produced by [scale::proximity], reported by an untouched pad
pub const READING_SCALE: u16 = 100;
