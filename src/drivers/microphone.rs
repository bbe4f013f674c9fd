//! Analog microphone / sound-sensor driver.
//!
//! Reads a short burst of ADC samples per call and reports the mean of the
//! samples at or above the caller's threshold, or 0 when none reach it.
//! Averaging only the loud samples keeps a single clap from being diluted
//! by the quiet samples around it.
//!
//! The ADC is reached through [`AnalogInput`], so the same driver runs on
//! the Linux IIO adapter and on the in-memory test source.

use log::trace;

/// One analog channel.
pub trait AnalogInput {
    /// One raw conversion, or `None` when the converter has nothing to
    /// report (device busy, read error, not yet ready).
    fn read_raw(&mut self) -> Option<u16>;
}

impl<A: AnalogInput + ?Sized> AnalogInput for Box<A> {
    fn read_raw(&mut self) -> Option<u16> {
        (**self).read_raw()
    }
}

pub struct Microphone<A> {
    adc: A,
    burst: u16,
}

impl<A: AnalogInput> Microphone<A> {
    /// `burst` samples are read per [`sample`](Self::sample); at least one.
    pub fn new(adc: A, burst: u16) -> Self {
        Self {
            adc,
            burst: burst.max(1),
        }
    }

    /// Take one windowed reading against `threshold`.
    ///
    /// Returns `None` only when the ADC produced no samples at all.
    pub fn sample(&mut self, threshold: u32) -> Option<u32> {
        let mut taken = 0u32;
        let mut loud_sum = 0u64;
        let mut loud_count = 0u32;

        for _ in 0..self.burst {
            let Some(raw) = self.adc.read_raw() else {
                continue;
            };
            taken += 1;
            if u32::from(raw) >= threshold {
                loud_sum += u64::from(raw);
                loud_count += 1;
            }
        }

        if taken == 0 {
            return None;
        }
        let level = if loud_count == 0 {
            0
        } else {
            (loud_sum / u64::from(loud_count)) as u32
        };
        trace!("mic: {taken} samples, {loud_count} loud, level {level}");
        Some(level)
    }
}
