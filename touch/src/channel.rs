/// Static description of one touch channel.
///
/// The channel's position in the table is its id, and doubles as the handle
/// the sampler uses to find the electrode.
#[derive(Clone, Copy, Debug)]
pub struct ChannelConfig {
    /// Label broadcast on the released -> pressed edge
    pub on_label: &'static str,
    /// Label broadcast on the pressed -> released edge
    pub off_label: &'static str,
}

impl ChannelConfig {
    pub const fn new(on_label: &'static str, off_label: &'static str) -> Self {
        Self { on_label, off_label }
    }

    pub fn label(&self, edge: Edge) -> &'static str {
        match edge {
            Edge::Press => self.on_label,
            Edge::Release => self.off_label,
        }
    }
}

/// Check that no two labels in a channel table are the same, including the on/off pair of a
/// single channel.
pub fn labels_unique(channels: &[ChannelConfig]) -> bool {
    // Label k is the on label of channel k/2 when k is even, the off label otherwise
    let label_at = |k: usize| {
        let ch = &channels[k / 2];
        if k % 2 == 0 {
            ch.on_label
        } else {
            ch.off_label
        }
    };

    let n = channels.len() * 2;
    for i in 0..n {
        for j in i + 1..n {
            if label_at(i) == label_at(j) {
                return false;
            }
        }
    }
    true
}

/// Runtime state of one channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// Debounced logical state
    pub pressed: bool,
    /// Tick of the last accepted transition, or None if the channel never changed
    pub last_transition: Option<u32>,
}

impl ChannelState {
    pub const fn new() -> Self {
        Self {
            pressed: false,
            last_transition: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Press,
    Release,
}

/// A debounced state change on one channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionEvent {
    pub channel: usize,
    pub edge: Edge,
    pub label: &'static str,
}
