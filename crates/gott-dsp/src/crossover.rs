//! Band-splitting primitives
//!
//! - Linkwitz-Riley 24 dB/oct crossovers (two cascaded Butterworth biquads)
//! - All-pass filters matching a crossover's summed phase
//! - Dynamic shelving filters whose gain changes every sample

use gott_core::Sample;
use rustfft::num_complex::Complex64;

use crate::biquad::{BUTTERWORTH_Q, BiquadCoeffs, BiquadTDF2, ShelfPrototype};
use crate::{MonoProcessor, Processor};

/// Shelf gains are limited to +/- this many dB
pub const SHELF_GAIN_LIMIT_DB: f64 = 72.0;

// ============ Linkwitz-Riley Filter ============

/// Linkwitz-Riley 24 dB/oct filter (lowpass or highpass)
#[derive(Debug, Clone)]
pub struct LinkwitzRiley {
    stages: [BiquadTDF2; 2],
}

impl LinkwitzRiley {
    pub fn lowpass(freq: f64, sample_rate: f64) -> Self {
        let coeffs = BiquadCoeffs::lowpass(freq, BUTTERWORTH_Q, sample_rate);
        Self::from_coeffs(coeffs, sample_rate)
    }

    pub fn highpass(freq: f64, sample_rate: f64) -> Self {
        let coeffs = BiquadCoeffs::highpass(freq, BUTTERWORTH_Q, sample_rate);
        Self::from_coeffs(coeffs, sample_rate)
    }

    fn from_coeffs(coeffs: BiquadCoeffs, sample_rate: f64) -> Self {
        Self {
            stages: [
                BiquadTDF2::with_coeffs(coeffs, sample_rate),
                BiquadTDF2::with_coeffs(coeffs, sample_rate),
            ],
        }
    }

    pub fn frequency_response(&self, freq: f64) -> Complex64 {
        let stage = self.stages[0].frequency_response(freq);
        stage * stage
    }
}

impl Processor for LinkwitzRiley {
    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

impl MonoProcessor for LinkwitzRiley {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        let mid = self.stages[0].process_sample(input);
        self.stages[1].process_sample(mid)
    }
}

// ============ Crossover ============

/// Single crossover point (splits signal into low and high)
#[derive(Debug, Clone)]
pub struct Crossover {
    lowpass: LinkwitzRiley,
    highpass: LinkwitzRiley,
    frequency: f64,
}

impl Crossover {
    pub fn new(freq: f64, sample_rate: f64) -> Self {
        Self {
            lowpass: LinkwitzRiley::lowpass(freq, sample_rate),
            highpass: LinkwitzRiley::highpass(freq, sample_rate),
            frequency: freq,
        }
    }

    #[inline]
    pub fn split(&mut self, input: Sample) -> (Sample, Sample) {
        (
            self.lowpass.process_sample(input),
            self.highpass.process_sample(input),
        )
    }

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn lowpass_response(&self, freq: f64) -> Complex64 {
        self.lowpass.frequency_response(freq)
    }

    pub fn highpass_response(&self, freq: f64) -> Complex64 {
        self.highpass.frequency_response(freq)
    }

    pub fn reset(&mut self) {
        self.lowpass.reset();
        self.highpass.reset();
    }
}

// ============ All-pass ============

/// Second-order all-pass with the phase of an LR4 crossover at the same frequency
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    filter: BiquadTDF2,
}

impl AllpassFilter {
    pub fn new(freq: f64, sample_rate: f64) -> Self {
        let mut filter = BiquadTDF2::new(sample_rate);
        filter.set_allpass(freq, BUTTERWORTH_Q);
        Self { filter }
    }

    pub fn frequency_response(&self, freq: f64) -> Complex64 {
        self.filter.frequency_response(freq)
    }
}

impl Processor for AllpassFilter {
    fn reset(&mut self) {
        self.filter.reset();
    }
}

impl MonoProcessor for AllpassFilter {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        self.filter.process_sample(input)
    }
}

// ============ Dynamic Shelf ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfKind {
    Low,
    High,
}

/// RBJ shelf (S = 1) whose linear gain may change every sample.
///
/// The trigonometric terms are cached; only the gain-dependent part of the
/// coefficients is recomputed, and only when the gain actually changes.
#[derive(Debug, Clone)]
pub struct ShelvingFilter {
    kind: ShelfKind,
    proto: ShelfPrototype,
    filter: BiquadTDF2,
    gain: f64,
    frequency: f64,
}

impl ShelvingFilter {
    pub fn new(kind: ShelfKind, freq: f64, sample_rate: f64) -> Self {
        let proto = ShelfPrototype::new(freq, BUTTERWORTH_Q, sample_rate);
        let mut shelf = Self {
            kind,
            proto,
            filter: BiquadTDF2::new(sample_rate),
            gain: f64::NAN,
            frequency: freq,
        };
        shelf.set_gain(1.0);
        shelf
    }

    /// Limit a linear gain to the shelf range
    #[inline]
    pub fn limit_gain(gain: f64) -> f64 {
        let limit = 10.0_f64.powf(SHELF_GAIN_LIMIT_DB / 20.0);
        gain.clamp(1.0 / limit, limit)
    }

    /// Set the shelf gain (linear)
    #[inline]
    pub fn set_gain(&mut self, gain: f64) {
        if gain == self.gain {
            return;
        }
        self.gain = gain;
        let coeffs = self.coeffs_for(gain);
        self.filter.set_coeffs(coeffs);
    }

    #[inline]
    fn coeffs_for(&self, gain: f64) -> BiquadCoeffs {
        let a = gain.sqrt();
        match self.kind {
            ShelfKind::Low => BiquadCoeffs::low_shelf_from(self.proto, a),
            ShelfKind::High => BiquadCoeffs::high_shelf_from(self.proto, a),
        }
    }

    /// Response the shelf would have at `gain`, without touching its state
    pub fn response_at(&self, gain: f64, freq: f64) -> Complex64 {
        self.coeffs_for(gain)
            .frequency_response(freq, self.filter.sample_rate())
    }

    #[inline]
    pub fn gain(&self) -> f64 {
        self.gain
    }

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn frequency_response(&self, freq: f64) -> Complex64 {
        self.filter.frequency_response(freq)
    }
}

impl Processor for ShelvingFilter {
    fn reset(&mut self) {
        self.filter.reset();
    }
}

impl MonoProcessor for ShelvingFilter {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        self.filter.process_sample(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lr4_sum_is_allpass() {
        let fs = 48000.0;
        let xover = Crossover::new(1000.0, fs);
        let ap = AllpassFilter::new(1000.0, fs);

        for freq in [50.0, 500.0, 1000.0, 2000.0, 15000.0] {
            let sum = xover.lowpass_response(freq) + xover.highpass_response(freq);
            let diff = (sum - ap.frequency_response(freq)).norm();
            assert!(diff < 1e-9, "{} Hz: {}", freq, diff);
        }
    }

    #[test]
    fn test_lr4_crossover_point() {
        let xover = Crossover::new(1000.0, 48000.0);
        let low = xover.lowpass_response(1000.0).norm();
        let high = xover.highpass_response(1000.0).norm();
        // LR4 is -6 dB at the crossover
        assert!((low - 0.5).abs() < 1e-6);
        assert!((high - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_split_time_domain_sum() {
        let fs = 44100.0;
        let mut xover = Crossover::new(800.0, fs);
        let mut ap = AllpassFilter::new(800.0, fs);

        for i in 0..2000 {
            let x = if i == 0 { 1.0 } else { ((i as f64) * 0.05).sin() * 0.3 };
            let (low, high) = xover.split(x);
            let reference = ap.process_sample(x);
            assert!((low + high - reference).abs() < 1e-9);
        }
    }

    #[test]
    fn test_shelf_gain_update() {
        let fs = 48000.0;
        let mut shelf = ShelvingFilter::new(ShelfKind::Low, 200.0, fs);
        assert_eq!(shelf.gain(), 1.0);

        shelf.set_gain(4.0);
        let dc = shelf.frequency_response(1.0).norm();
        assert!((dc - 4.0).abs() < 1e-3);
        let top = shelf.frequency_response(20000.0).norm();
        assert!((top - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_high_shelf_pair_cancels() {
        let fs = 48000.0;
        let mut up = ShelvingFilter::new(ShelfKind::High, 1000.0, fs);
        let mut down = ShelvingFilter::new(ShelfKind::High, 1000.0, fs);
        up.set_gain(8.0);
        down.set_gain(1.0 / 8.0);

        for freq in [30.0, 1000.0, 10000.0] {
            let product = up.frequency_response(freq) * down.frequency_response(freq);
            assert!((product.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_limit_gain() {
        assert_eq!(ShelvingFilter::limit_gain(1.0), 1.0);
        let max = ShelvingFilter::limit_gain(1e9);
        assert!((20.0 * max.log10() - SHELF_GAIN_LIMIT_DB).abs() < 1e-9);
    }
}
