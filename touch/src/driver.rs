use log::info;

use crate::channel::ChannelConfig;
use crate::detector::EdgeDetector;
use crate::TouchConfig;

/// Source of raw touch readings. Lower readings mean firmer contact.
pub trait Sampler {
    fn read(&mut self, channel: usize) -> u16;
}

/// Destination for transition labels
///
/// Delivery is fire-and-forget: an implementation that cannot deliver a label drops it.
pub trait EventSink {
    fn broadcast(&mut self, label: &str);
}

/// Drives an [EdgeDetector] from a sampler, once per poll cycle, and forwards every transition
/// to an event sink
pub struct PollDriver<'a, S, E, const N: usize> {
    pub detector: EdgeDetector<'a, N>,
    pub sampler: S,
    pub sink: E,
    next_poll: Option<u32>,
}

impl<'a, S: Sampler, E: EventSink, const N: usize> PollDriver<'a, S, E, N> {
    pub fn new(
        channels: &'a [ChannelConfig; N],
        config: Option<&'a TouchConfig>,
        sampler: S,
        sink: E,
    ) -> Self {
        Self {
            detector: EdgeDetector::new(channels, config),
            sampler,
            sink,
            next_poll: None,
        }
    }

    /// Run one poll cycle over all channels in ascending order
    ///
    /// Returns the number of events broadcast
    pub fn poll(&mut self, now: u32) -> usize {
        let mut count = 0;
        for ch in 0..N {
            let reading = self.sampler.read(ch);
            if let Some(event) = self.detector.evaluate(ch, reading, now) {
                info!("{}", event.label);
                self.sink.broadcast(event.label);
                count += 1;
            }
        }
        count
    }

    /// True once `now` has reached the next scheduled cycle
    pub fn due(&self, now: u32) -> bool {
        match self.next_poll {
            None => true,
            // Signed difference so the schedule survives tick rollover
            Some(next) => (now.wrapping_sub(next) as i32) >= 0,
        }
    }

    /// Run a poll cycle if one is due, and schedule the next one a poll period later
    pub fn poll_if_due(&mut self, now: u32) -> Option<usize> {
        if !self.due(now) {
            return None;
        }
        let period = self.detector.config().poll_period;
        let next = self.next_poll.unwrap_or(now).wrapping_add(period);
        // Don't try to catch up on missed cycles after a long stall
        self.next_poll = if (now.wrapping_sub(next) as i32) >= 0 {
            Some(now.wrapping_add(period))
        } else {
            Some(next)
        };
        Some(self.poll(now))
    }
}
