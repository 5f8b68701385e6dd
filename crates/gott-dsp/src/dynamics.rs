//! Band dynamics: envelope follower and the upward/downward band compressor
//!
//! The static curve works in the dB domain:
//! - above the downward threshold the level is pulled down by the downward ratio
//! - between bottom and the upward threshold it is pushed up by the upward ratio
//! - between the two thresholds, and below bottom, gain is unity
//!
//! Both thresholds use a quadratic soft knee of the same width, so the gain
//! curve is continuous with a continuous first derivative.

use gott_core::{CompressorCurve, Sample, db_to_gain, gain_to_db, time_constant_coeff};

use crate::{Processor, ProcessorConfig};

/// Envelope follower for dynamics processing
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    attack_coeff: f64,
    release_coeff: f64,
    envelope: f64,
    sample_rate: f64,
}

impl EnvelopeFollower {
    pub fn new(sample_rate: f64) -> Self {
        let mut follower = Self {
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope: 0.0,
            sample_rate,
        };
        follower.set_times(10.0, 100.0);
        follower
    }

    /// Set attack and release times in milliseconds (0 = instant)
    pub fn set_times(&mut self, attack_ms: f64, release_ms: f64) {
        self.attack_coeff = time_constant_coeff(attack_ms, self.sample_rate);
        self.release_coeff = time_constant_coeff(release_ms, self.sample_rate);
    }

    #[inline(always)]
    pub fn process(&mut self, input: Sample) -> f64 {
        let abs_input = input.abs();
        let coeff = if abs_input > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = abs_input + coeff * (self.envelope - abs_input);
        self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

// ============ Static Curve ============

/// Static gain law of one band, knees resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainComputer {
    curve: CompressorCurve,
    /// Knee width used at both thresholds
    knee: f64,
    /// Width of the fade-in above bottom
    bottom_knee: f64,
    up_slope: f64,
    down_slope: f64,
}

impl GainComputer {
    pub fn new(curve: CompressorCurve) -> Self {
        let gap = (curve.down_threshold_db - curve.up_threshold_db).max(0.0);
        let knee = curve.knee_db.clamp(0.0, gap);
        let room = (curve.up_threshold_db - knee * 0.5 - curve.bottom_db).max(0.0);
        let bottom_knee = curve.knee_db.max(0.0).min(room);

        Self {
            curve,
            knee,
            bottom_knee,
            up_slope: 1.0 - 1.0 / curve.up_ratio.max(1.0),
            down_slope: 1.0 - 1.0 / curve.down_ratio.max(1.0),
        }
    }

    #[inline]
    pub fn curve(&self) -> &CompressorCurve {
        &self.curve
    }

    /// Downward gain change in dB (<= 0)
    #[inline]
    fn downward_db(&self, level_db: f64) -> f64 {
        let over = level_db - self.curve.down_threshold_db;
        let half_knee = self.knee * 0.5;

        if over <= -half_knee {
            0.0
        } else if over >= half_knee {
            -over * self.down_slope
        } else {
            let x = over + half_knee;
            -self.down_slope * x * x / (2.0 * self.knee)
        }
    }

    /// Upward gain change in dB (>= 0), before the bottom fade
    #[inline]
    fn upward_db(&self, level_db: f64) -> f64 {
        let under = self.curve.up_threshold_db - level_db;
        let half_knee = self.knee * 0.5;

        if under <= -half_knee {
            0.0
        } else if under >= half_knee {
            under * self.up_slope
        } else {
            let x = under + half_knee;
            self.up_slope * x * x / (2.0 * self.knee)
        }
    }

    /// Fade of the upward stage: 0 below bottom, smoothstep over the bottom knee
    #[inline]
    fn bottom_fade(&self, level_db: f64) -> f64 {
        let above = level_db - self.curve.bottom_db;
        if above < 0.0 {
            0.0
        } else if above >= self.bottom_knee {
            1.0
        } else {
            let t = above / self.bottom_knee;
            t * t * (3.0 - 2.0 * t)
        }
    }

    /// Static gain in dB for an envelope level in dB (makeup not included)
    #[inline]
    pub fn gain_db(&self, level_db: f64) -> f64 {
        let up = self.upward_db(level_db);
        let up = if up > 0.0 { up * self.bottom_fade(level_db) } else { 0.0 };
        self.downward_db(level_db) + up
    }

    /// Output level in dB for an input level in dB, makeup included
    #[inline]
    pub fn output_db(&self, level_db: f64) -> f64 {
        level_db + self.gain_db(level_db) + self.curve.makeup_db
    }
}

// ============ Band Compressor ============

/// Upward/downward compressor driven by an external envelope
#[derive(Debug, Clone)]
pub struct BandCompressor {
    computer: GainComputer,
    attack_coeff: f64,
    release_coeff: f64,
    /// Smoothed gain in dB, makeup not included
    gain_db: f64,
    makeup: f64,
    sample_rate: f64,
}

impl BandCompressor {
    pub fn new(curve: CompressorCurve, sample_rate: f64) -> Self {
        let mut comp = Self {
            computer: GainComputer::new(curve),
            attack_coeff: 0.0,
            release_coeff: 0.0,
            gain_db: 0.0,
            makeup: 1.0,
            sample_rate,
        };
        comp.set_curve(curve);
        comp
    }

    /// Replace the curve, keeping the current gain state
    pub fn set_curve(&mut self, curve: CompressorCurve) {
        self.computer = GainComputer::new(curve);
        self.attack_coeff = time_constant_coeff(curve.attack_ms, self.sample_rate);
        self.release_coeff = time_constant_coeff(curve.release_ms, self.sample_rate);
        self.makeup = db_to_gain(curve.makeup_db);
    }

    #[inline]
    pub fn computer(&self) -> &GainComputer {
        &self.computer
    }

    /// Map an envelope (linear) to the gain to apply (linear, makeup included)
    #[inline]
    pub fn process(&mut self, envelope: f64) -> f64 {
        let target = self.computer.gain_db(gain_to_db(envelope));
        // Falling gain is the attack phase
        let coeff = if target < self.gain_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.gain_db = target + coeff * (self.gain_db - target);
        db_to_gain(self.gain_db) * self.makeup
    }

    /// Current smoothed gain change in dB (negative = reduction)
    #[inline]
    pub fn gain_reduction_db(&self) -> f64 {
        self.gain_db
    }

    /// Current gain in dB including makeup
    #[inline]
    pub fn gain_db(&self) -> f64 {
        self.gain_db + self.computer.curve().makeup_db
    }
}

impl Processor for BandCompressor {
    fn reset(&mut self) {
        self.gain_db = 0.0;
    }
}

impl ProcessorConfig for BandCompressor {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        let curve = *self.computer.curve();
        self.set_curve(curve);
    }
}
