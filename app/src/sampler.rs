use crate::hal;
use crate::hal::pac;
use crate::hal::rcc::Rcc;
use crate::hal::tsc::Tsc;

/// Location of one electrode on the touch sensing controller
#[derive(Clone, Copy, Debug)]
pub struct TscSample {
    pub group: u8,
    /// IO in the group wired to the sampling capacitor
    pub sample: u8,
    /// IO in the group wired to the electrode
    pub channel: u8,
    /// Count with nothing near the electrode
    pub idle: u16,
    /// Count under a firm touch
    pub touched: u16,
}

/// Sampler reading one TSC electrode per touch channel
///
/// Touching an electrode adds capacitance, so fewer charge transfers are needed to fill the
/// sampling cap and the count drops. Readings are reported on the `touch::READING_SCALE`
/// scale between the pad's touched and idle counts, so the detect threshold doesn't depend on
/// the electrode size or the TSC clock setup.
pub struct TouchSampler<const N: usize> {
    tsc: Tsc,
    pads: &'static [TscSample; N],
    max_count: u16,
}

impl<const N: usize> TouchSampler<N> {
    pub fn new(tsc: pac::TSC, rcc: &mut Rcc, pads: &'static [TscSample; N]) -> Self {
        let config = hal::tsc::Config {
            clock_prescale: None,
            max_count: Some(hal::tsc::MaxCount::U8191),
            charge_transfer_high: None,
            charge_transfer_low: None,
        };
        Self {
            tsc: Tsc::tsc(tsc, rcc, Some(config)),
            pads,
            max_count: 8191,
        }
    }

    /// Run one acquisition on a single electrode and return its count
    ///
    /// A group which hits max count before the sampling cap charges reads as `max_count + 1`,
    /// i.e. well clear of any touch threshold.
    pub fn sample(&mut self, pad: TscSample) -> u16 {
        // The HAL driver has no per-group setup, so drive the group registers directly
        let regs = unsafe { pac::Peripherals::steal().TSC };

        let iogcsr: u32 = 1 << (pad.group - 1);
        let ioscr: u32 = 1 << ((pad.group - 1) * 4 + pad.sample - 1);
        let ioccr: u32 = 1 << ((pad.group - 1) * 4 + pad.channel - 1);

        regs.iogcsr.write(|w| unsafe { w.bits(iogcsr) });
        regs.ioscr.write(|w| unsafe { w.bits(ioscr) });
        regs.ioccr.write(|w| unsafe { w.bits(ioccr) });

        self.tsc.acquire().ok();

        // Status bits indicate if the group completed successfully. A group not completed
        // when MAX COUNT is reached will not be set.
        let group_status = regs.iogcsr.read().bits() >> 16;

        if group_status & (1 << (pad.group - 1)) != 0 {
            self.tsc.read_unchecked(pad.group)
        } else {
            self.max_count + 1
        }
    }
}

impl<const N: usize> touch::Sampler for TouchSampler<N> {
    fn read(&mut self, channel: usize) -> u16 {
        let pad = self.pads[channel];
        touch::proximity(self.sample(pad), pad.idle, pad.touched)
    }
}
