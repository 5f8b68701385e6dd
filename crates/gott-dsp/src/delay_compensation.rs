//! Lookahead Delay Compensation
//!
//! Keeps every band on one timeline:
//! - The main path of each channel is delayed by the largest band lookahead
//! - Each band's detector input is delayed by (largest - own) lookahead
//! - Reported latency = largest lookahead + splitter latency
//!
//! All buffers are sized once from the configured maximum, so changing
//! lookahead never allocates on the audio thread.

use gott_core::{Sample, millis_to_samples, samples_to_millis};

use crate::{MonoProcessor, Processor};

/// Latency in samples
pub type LatencySamples = usize;

// ============ Delay Line ============

/// Circular buffer delay line
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<Sample>,
    write_pos: usize,
    delay_samples: usize,
}

impl DelayLine {
    /// Create new delay line with maximum capacity
    pub fn new(max_delay: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay + 1],
            write_pos: 0,
            delay_samples: 0,
        }
    }

    /// Create a delay line with a fixed delay
    pub fn with_delay(delay: usize) -> Self {
        let mut line = Self::new(delay);
        line.set_delay(delay);
        line
    }

    /// Set delay amount, limited to the capacity given at construction
    pub fn set_delay(&mut self, samples: usize) {
        let max = self.capacity();
        if samples > max {
            log::warn!("delay of {} samples exceeds capacity {}, clamped", samples, max);
        }
        self.delay_samples = samples.min(max);
    }

    /// Get current delay
    #[inline]
    pub fn delay(&self) -> usize {
        self.delay_samples
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }
}

impl Processor for DelayLine {
    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    fn latency(&self) -> usize {
        self.delay_samples
    }
}

impl MonoProcessor for DelayLine {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        if self.delay_samples == 0 {
            return input;
        }

        let buffer_len = self.buffer.len();
        let read_pos = (self.write_pos + buffer_len - self.delay_samples) % buffer_len;

        self.buffer[self.write_pos] = input;
        let output = self.buffer[read_pos];
        self.write_pos = (self.write_pos + 1) % buffer_len;

        output
    }

    fn process_block(&mut self, buffer: &mut [Sample]) {
        if self.delay_samples == 0 {
            return;
        }

        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

// ============ Lookahead Plan ============

/// Per-band lookahead and the compensation delays derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookaheadPlan {
    band_lookahead: Vec<LatencySamples>,
    max_lookahead: LatencySamples,
    splitter_latency: LatencySamples,
}

impl LookaheadPlan {
    /// Build the plan from per-band lookahead times
    pub fn new(lookahead_ms: &[f64], sample_rate: f64, splitter_latency: LatencySamples) -> Self {
        let band_lookahead: Vec<LatencySamples> = lookahead_ms
            .iter()
            .map(|&ms| millis_to_samples(ms, sample_rate))
            .collect();
        let max_lookahead = band_lookahead.iter().copied().max().unwrap_or(0);

        log::debug!(
            "LookaheadPlan: max_lookahead={}samples ({:.2}ms), splitter={}samples",
            max_lookahead,
            samples_to_millis(max_lookahead, sample_rate),
            splitter_latency
        );

        Self {
            band_lookahead,
            max_lookahead,
            splitter_latency,
        }
    }

    /// Lookahead of one band in samples
    #[inline]
    pub fn lookahead(&self, band: usize) -> LatencySamples {
        self.band_lookahead.get(band).copied().unwrap_or(0)
    }

    /// Delay applied to a band's detector input
    #[inline]
    pub fn compensation(&self, band: usize) -> LatencySamples {
        self.max_lookahead.saturating_sub(self.lookahead(band))
    }

    /// Delay applied to the main path
    #[inline]
    pub fn max_lookahead(&self) -> LatencySamples {
        self.max_lookahead
    }

    /// Latency the host has to compensate
    #[inline]
    pub fn total_latency(&self) -> LatencySamples {
        self.max_lookahead + self.splitter_latency
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_line_zero_delay() {
        let mut line = DelayLine::new(100);
        assert_eq!(line.process_sample(1.0), 1.0);
        assert_eq!(line.process_sample(2.0), 2.0);
    }

    #[test]
    fn test_delay_line_fixed_delay() {
        let mut line = DelayLine::with_delay(3);

        let mut out = Vec::new();
        for i in 1..=6 {
            out.push(line.process_sample(i as f64));
        }
        assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_delay_line_full_capacity() {
        let mut line = DelayLine::new(4);
        line.set_delay(4);
        let mut block = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        line.process_block(&mut block);
        assert_eq!(block, [0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_delay_clamped_to_capacity() {
        let mut line = DelayLine::new(10);
        line.set_delay(50);
        assert_eq!(line.delay(), 10);
    }

    #[test]
    fn test_delay_line_reset() {
        let mut line = DelayLine::with_delay(2);
        line.process_sample(5.0);
        line.reset();
        assert_eq!(line.process_sample(0.0), 0.0);
        assert_eq!(line.process_sample(0.0), 0.0);
    }

    #[test]
    fn test_lookahead_plan() {
        let plan = LookaheadPlan::new(&[0.0, 5.0, 2.0], 48000.0, 0);
        assert_eq!(plan.max_lookahead(), 240);
        assert_eq!(plan.compensation(0), 240);
        assert_eq!(plan.compensation(1), 0);
        assert_eq!(plan.compensation(2), 144);
        assert_eq!(plan.total_latency(), 240);

        let plan = LookaheadPlan::new(&[1.0], 48000.0, 4096);
        assert_eq!(plan.total_latency(), 48 + 4096);
    }
}
