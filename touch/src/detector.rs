use log::trace;

use crate::channel::{labels_unique, ChannelConfig, ChannelState, Edge, TransitionEvent};
use crate::{TouchConfig, DEFAULT_TOUCH_CONFIG};

/// Debounced press/release detector for a fixed set of touch channels
pub struct EdgeDetector<'a, const N: usize> {
    states: [ChannelState; N],
    channels: &'a [ChannelConfig; N],
    config: &'a TouchConfig,
}

impl<'a, const N: usize> EdgeDetector<'a, N> {
    pub fn new(channels: &'a [ChannelConfig; N], config: Option<&'a TouchConfig>) -> Self {
        debug_assert!(labels_unique(channels), "Channel labels must be unique");
        Self {
            states: [ChannelState::new(); N],
            channels,
            config: config.unwrap_or(&DEFAULT_TOUCH_CONFIG),
        }
    }

    /// Process a new reading for one channel
    ///
    /// `now` is a millisecond tick, non-decreasing between calls for the same channel. Returns
    /// the transition if the channel's debounced state changed.
    pub fn evaluate(&mut self, channel: usize, reading: u16, now: u32) -> Option<TransitionEvent> {
        let touched = reading < self.config.detect_threshold;
        let state = &mut self.states[channel];

        if touched == state.pressed {
            return None;
        }

        if let Some(last) = state.last_transition {
            // Wrapping so a channel keeps working across tick counter rollover
            let elapsed = now.wrapping_sub(last);
            if elapsed <= self.config.debounce_delay {
                trace!("ch{} held off, {} ms since last edge", channel, elapsed);
                return None;
            }
        }

        state.pressed = touched;
        state.last_transition = Some(now);

        let edge = if touched { Edge::Press } else { Edge::Release };
        Some(TransitionEvent {
            channel,
            edge,
            label: self.channels[channel].label(edge),
        })
    }

    pub fn is_pressed(&self, channel: usize) -> bool {
        self.states[channel].pressed
    }

    pub fn state(&self, channel: usize) -> &ChannelState {
        &self.states[channel]
    }

    /// Bit i is set when channel i is pressed. Channels past 31 are not represented.
    pub fn pressed_mask(&self) -> u32 {
        self.states
            .iter()
            .take(32)
            .enumerate()
            .fold(0, |mask, (i, s)| {
                if s.pressed {
                    mask | (1 << i)
                } else {
                    mask
                }
            })
    }

    pub fn channels(&self) -> &'a [ChannelConfig; N] {
        self.channels
    }

    pub fn config(&self) -> &'a TouchConfig {
        self.config
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    static CHANNELS: [ChannelConfig; 3] = [
        ChannelConfig::new("c4_on", "c4_off"),
        ChannelConfig::new("d4_on", "d4_off"),
        ChannelConfig::new("e4_on", "e4_off"),
    ];

    const TOUCHED: u16 = 30;
    const RELEASED: u16 = 80;

    #[test]
    fn test_scenario() {
        let mut d = EdgeDetector::new(&CHANNELS, None);

        let ev = d.evaluate(0, TOUCHED, 0).expect("First touch should be accepted immediately");
        assert_eq!(ev.channel, 0);
        assert_eq!(ev.edge, Edge::Press);
        assert_eq!(ev.label, "c4_on");
        assert!(d.is_pressed(0));

        assert!(d.evaluate(0, TOUCHED, 50).is_none(), "Already pressed");
        assert!(d.evaluate(0, RELEASED, 60).is_none(), "Release inside debounce window");
        assert!(d.is_pressed(0));

        let ev = d.evaluate(0, RELEASED, 150).expect("Release after debounce window");
        assert_eq!(ev.edge, Edge::Release);
        assert_eq!(ev.label, "c4_off");
        assert!(!d.is_pressed(0));
        assert_eq!(d.state(0).last_transition, Some(150));
    }

    #[test]
    fn test_threshold_boundary() {
        let threshold = DEFAULT_TOUCH_CONFIG.detect_threshold;
        let mut d = EdgeDetector::new(&CHANNELS, None);

        assert!(d.evaluate(0, threshold, 1000).is_none(), "Exactly at threshold is not touched");
        assert!(!d.is_pressed(0));
        assert!(d.state(0).last_transition.is_none(), "Rejected reading mutated state");

        let ev = d.evaluate(0, threshold - 1, 1010);
        assert_eq!(ev.map(|e| e.edge), Some(Edge::Press));
    }

    #[test]
    fn test_debounce_boundary() {
        let delay = DEFAULT_TOUCH_CONFIG.debounce_delay;
        let mut d = EdgeDetector::new(&CHANNELS, None);

        assert!(d.evaluate(1, TOUCHED, 500).is_some());
        // Exactly at the delay is still held off
        assert!(d.evaluate(1, RELEASED, 500 + delay).is_none());
        assert!(d.is_pressed(1));
        let ev = d.evaluate(1, RELEASED, 500 + delay + 1);
        assert_eq!(ev.map(|e| e.label), Some("d4_off"));
    }

    #[test]
    fn test_debounce_enforcement() {
        let delay = DEFAULT_TOUCH_CONFIG.debounce_delay;

        for gap in [1, delay / 2, delay] {
            let mut d = EdgeDetector::new(&CHANNELS, None);
            let t1 = 2000;
            let mut count = 0;
            count += d.evaluate(2, TOUCHED, t1).is_some() as u32;
            count += d.evaluate(2, RELEASED, t1 + gap).is_some() as u32;
            assert_eq!(count, 1, "Two transitions accepted {} ms apart", gap);
        }
    }

    #[test]
    fn test_bouncing_input_is_ignored() {
        let mut d = EdgeDetector::new(&CHANNELS, None);
        assert!(d.evaluate(0, TOUCHED, 0).is_some());

        // Chatter inside the window never produces an edge
        for t in (10..=100).step_by(10) {
            let reading = if t % 20 == 0 { RELEASED } else { TOUCHED };
            assert!(d.evaluate(0, reading, t).is_none(), "Unexpected edge at {}", t);
        }
        assert!(d.is_pressed(0));
    }

    #[test]
    fn test_no_spurious_events() {
        let mut d = EdgeDetector::new(&CHANNELS, None);
        // Released channel seeing released readings, for a long time
        for t in [0, 1, 10_000, 1_000_000, u32::MAX] {
            assert!(d.evaluate(0, RELEASED, t).is_none());
        }
        assert!(d.evaluate(0, TOUCHED, 5).is_some());
        for t in [1_000, 1_000_000] {
            assert!(d.evaluate(0, TOUCHED, t).is_none());
        }
        assert!(d.evaluate(0, 0, 2_000_000).is_none());
    }

    #[test]
    fn test_channel_independence() {
        let mut d = EdgeDetector::new(&CHANNELS, None);

        assert!(d.evaluate(0, TOUCHED, 0).is_some());
        // Channel 1 is not held off by channel 0's recent edge
        let ev = d.evaluate(1, TOUCHED, 1).expect("Channel 1 should press");
        assert_eq!(ev.label, "d4_on");
        assert_eq!(*d.state(2), ChannelState::new());

        // Interleave releases; each channel follows its own window
        assert!(d.evaluate(1, RELEASED, 101).is_none());
        assert!(d.evaluate(0, RELEASED, 101).is_some());
        assert!(d.evaluate(1, RELEASED, 102).is_some());
        assert!(!d.is_pressed(0));
        assert!(!d.is_pressed(1));
        assert!(!d.is_pressed(2));
    }

    #[test]
    fn test_pressed_mask() {
        let mut d = EdgeDetector::new(&CHANNELS, None);
        assert_eq!(d.pressed_mask(), 0);
        d.evaluate(0, TOUCHED, 0);
        d.evaluate(2, TOUCHED, 0);
        assert_eq!(d.pressed_mask(), 0b101);
    }

    #[test]
    fn test_tick_rollover() {
        let mut d = EdgeDetector::new(&CHANNELS, None);
        let start = u32::MAX - 20;
        assert!(d.evaluate(0, TOUCHED, start).is_some());
        // 60 ms elapsed across the wrap
        assert!(d.evaluate(0, RELEASED, 39).is_none());
        // 121 ms elapsed across the wrap
        assert!(d.evaluate(0, RELEASED, 100).is_some());
    }

    #[test]
    fn test_custom_config() {
        let config = TouchConfig {
            detect_threshold: 1000,
            debounce_delay: 5,
            poll_period: 1,
        };
        let mut d = EdgeDetector::new(&CHANNELS, Some(&config));
        assert!(d.evaluate(0, 999, 0).is_some());
        assert!(d.evaluate(0, 1000, 5).is_none());
        assert!(d.evaluate(0, 1000, 6).is_some());
        assert_eq!(d.config().debounce_delay, 5);
    }

    #[test]
    fn test_channels_table() {
        let d = EdgeDetector::new(&CHANNELS, None);
        assert_eq!(d.channels().len(), 3);
        assert_eq!(d.channels()[2].on_label, "e4_on");
    }
}
