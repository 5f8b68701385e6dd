//! Sidechain boost: spectral tilt applied to the detector input
//!
//! Pink (+3 dB/oct) is approximated by alternating first-order zeros and poles
//! half an octave apart from 20 Hz upwards. Brown (+6 dB/oct) is a single
//! zero at 20 Hz with a pole at the top of the band. Both are normalized to
//! unity gain at 1 kHz.

use std::f64::consts::{PI, SQRT_2};

use gott_core::{BoostConfig, BoostTransform, Sample};
use rustfft::num_complex::Complex64;

use crate::{MonoProcessor, Processor, ProcessorConfig};

/// Lowest zero of the tilt
const TILT_START_HZ: f64 = 20.0;
/// Upper end of the tilt (further limited by the sample rate)
const TILT_END_HZ: f64 = 20000.0;
/// Frequency at which the boost has 0 dB gain
const NORMALIZE_HZ: f64 = 1000.0;

// ============ First-order section ============

/// First-order IIR section, transposed direct form II
#[derive(Debug, Clone, Copy, PartialEq)]
struct FirstOrder {
    b0: f64,
    b1: f64,
    a1: f64,
    s: f64,
}

impl FirstOrder {
    /// Digital version of `H(s) = (s + wz) / (s + wp)`
    fn design(zero_hz: f64, pole_hz: f64, sample_rate: f64, transform: BoostTransform) -> Self {
        match transform {
            BoostTransform::Bilinear => {
                let k = 2.0 * sample_rate;
                let prewarp = |f: f64| k * (PI * f / sample_rate).tan();
                let (wz, wp) = (prewarp(zero_hz), prewarp(pole_hz));
                let norm = 1.0 / (k + wp);
                Self {
                    b0: (k + wz) * norm,
                    b1: (wz - k) * norm,
                    a1: (wp - k) * norm,
                    s: 0.0,
                }
            }
            BoostTransform::Matched => {
                let (wz, wp) = (2.0 * PI * zero_hz, 2.0 * PI * pole_hz);
                let ez = (-wz / sample_rate).exp();
                let ep = (-wp / sample_rate).exp();
                // DC gain matches the analog prototype
                let g = (wz / wp) * (1.0 - ep) / (1.0 - ez);
                Self {
                    b0: g,
                    b1: -g * ez,
                    a1: -ep,
                    s: 0.0,
                }
            }
        }
    }

    #[inline(always)]
    fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.s;
        self.s = self.b1 * x - self.a1 * y;
        y
    }

    fn response(&self, freq: f64, sample_rate: f64) -> Complex64 {
        let z_inv = Complex64::from_polar(1.0, -2.0 * PI * freq / sample_rate);
        (self.b0 + self.b1 * z_inv) / (1.0 + self.a1 * z_inv)
    }
}

// ============ Booster ============

/// Tilt filter for one sidechain channel
#[derive(Debug, Clone)]
pub struct SidechainBooster {
    config: BoostConfig,
    sections: Vec<FirstOrder>,
    gain: f64,
    sample_rate: f64,
}

impl SidechainBooster {
    pub fn new(config: BoostConfig, sample_rate: f64) -> Self {
        let mut booster = Self {
            config,
            sections: Vec::new(),
            gain: 1.0,
            sample_rate,
        };
        booster.design();
        booster
    }

    fn design(&mut self) {
        self.sections.clear();
        self.gain = 1.0;

        let Some(transform) = self.config.transform() else {
            return;
        };
        let fs = self.sample_rate;
        let top = TILT_END_HZ.min(0.45 * fs);

        if self.config.slope_db_per_octave() >= 6.0 {
            self.sections
                .push(FirstOrder::design(TILT_START_HZ, top, fs, transform));
        } else {
            let mut zero = TILT_START_HZ;
            while zero * SQRT_2 <= top {
                self.sections
                    .push(FirstOrder::design(zero, zero * SQRT_2, fs, transform));
                zero *= 2.0;
            }
        }

        let at_norm = self.raw_response(NORMALIZE_HZ).norm();
        if at_norm > 0.0 && at_norm.is_finite() {
            self.gain = 1.0 / at_norm;
        }
    }

    fn raw_response(&self, freq: f64) -> Complex64 {
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| {
                acc * s.response(freq, self.sample_rate)
            })
    }

    pub fn config(&self) -> BoostConfig {
        self.config
    }

    /// Whether the booster passes the signal unchanged
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.sections.is_empty()
    }

    /// Complex response at `freq`
    pub fn response(&self, freq: f64) -> Complex64 {
        self.raw_response(freq) * self.gain
    }
}

impl Processor for SidechainBooster {
    fn reset(&mut self) {
        for section in &mut self.sections {
            section.s = 0.0;
        }
    }
}

impl MonoProcessor for SidechainBooster {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        if self.sections.is_empty() {
            return input;
        }
        let mut x = input * self.gain;
        for section in &mut self.sections {
            x = section.process(x);
        }
        x
    }
}

impl ProcessorConfig for SidechainBooster {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.design();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_db(booster: &SidechainBooster, freq: f64) -> f64 {
        20.0 * booster.response(freq).norm().log10()
    }

    #[test]
    fn test_none_is_identity() {
        let mut booster = SidechainBooster::new(BoostConfig::None, 48000.0);
        assert!(booster.is_identity());
        for x in [0.5, -0.25, 1.0] {
            assert_eq!(booster.process_sample(x), x);
        }
    }

    #[test]
    fn test_normalized_at_1k() {
        for config in [
            BoostConfig::PinkBt,
            BoostConfig::PinkMt,
            BoostConfig::BrownBt,
            BoostConfig::BrownMt,
        ] {
            let booster = SidechainBooster::new(config, 48000.0);
            assert!(level_db(&booster, NORMALIZE_HZ).abs() < 1e-9, "{:?}", config);
        }
    }

    #[test]
    fn test_pink_slope() {
        for config in [BoostConfig::PinkBt, BoostConfig::PinkMt] {
            let booster = SidechainBooster::new(config, 48000.0);
            // Four octaves at +3 dB/oct
            let rise = level_db(&booster, 1600.0) - level_db(&booster, 100.0);
            assert!((rise - 12.0).abs() < 1.5, "{:?}: {}", config, rise);
        }
    }

    #[test]
    fn test_brown_slope() {
        for config in [BoostConfig::BrownBt, BoostConfig::BrownMt] {
            let booster = SidechainBooster::new(config, 48000.0);
            let rise = level_db(&booster, 1600.0) - level_db(&booster, 100.0);
            assert!((rise - 24.0).abs() < 1.0, "{:?}: {}", config, rise);
        }
    }

    #[test]
    fn test_time_domain_matches_response() {
        let fs = 48000.0;
        // 32 samples per period
        let freq = 1500.0;
        let mut booster = SidechainBooster::new(BoostConfig::PinkBt, fs);
        let expected = booster.response(freq).norm();

        let mut sum_sq = 0.0;
        for i in 0..48000 {
            let y = booster.process_sample((2.0 * PI * freq * i as f64 / fs).sin());
            if i >= 24000 {
                sum_sq += y * y;
            }
        }
        let amplitude = (2.0 * sum_sq / 24000.0).sqrt();
        assert!((amplitude - expected).abs() < 1e-3 * expected);
    }

    #[test]
    fn test_low_sample_rate_stays_stable() {
        let mut booster = SidechainBooster::new(BoostConfig::PinkMt, 8000.0);
        let mut last = 0.0;
        for _ in 0..8000 {
            last = booster.process_sample(1.0);
        }
        assert!(last.is_finite());
        booster.reset();
        booster.set_sample_rate(96000.0);
        assert!(level_db(&booster, NORMALIZE_HZ).abs() < 1e-9);
    }
}
