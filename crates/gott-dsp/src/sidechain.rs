//! Sidechain: detector channel selection and envelope detection
//!
//! Detection laws:
//! - Peak: instant attack, release over the reactivity time
//! - RMS: root of the mean square over a reactivity-long window
//! - LPF: one-pole lowpass of the rectified signal
//! - SMA: mean of the rectified signal over a reactivity-long window

use gott_core::{
    DetectionLaw, Sample, SidechainConfig, SidechainSource, db_to_gain, millis_to_samples,
    time_constant_coeff,
};

use crate::dynamics::EnvelopeFollower;
use crate::{MonoProcessor, Processor};

/// Derive the detector input of `lane` from a stereo pair of samples.
///
/// For mono material pass the same sample twice.
#[inline]
pub fn select(source: SidechainSource, left: Sample, right: Sample, lane: usize) -> Sample {
    let mid = (left + right) * 0.5;
    let side = (left - right) * 0.5;
    match source {
        SidechainSource::Middle => mid,
        SidechainSource::Side => side,
        SidechainSource::Left => left,
        SidechainSource::Right => right,
        SidechainSource::Min => {
            if left.abs() <= right.abs() {
                left
            } else {
                right
            }
        }
        SidechainSource::Max => {
            if left.abs() >= right.abs() {
                left
            } else {
                right
            }
        }
        SidechainSource::LeftRight => pick(lane, left, right),
        SidechainSource::RightLeft => pick(lane, right, left),
        SidechainSource::MidSide => pick(lane, mid, side),
        SidechainSource::SideMid => pick(lane, side, mid),
    }
}

#[inline(always)]
fn pick(lane: usize, first: Sample, second: Sample) -> Sample {
    if lane == 0 { first } else { second }
}

/// Ring buffer with a running sum
#[derive(Debug, Clone)]
struct MovingWindow {
    buffer: Vec<f64>,
    pos: usize,
    sum: f64,
}

impl MovingWindow {
    fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            pos: 0,
            sum: 0.0,
        }
    }

    /// Push a value, return the window mean
    #[inline]
    fn push(&mut self, value: f64) -> f64 {
        self.sum += value - self.buffer[self.pos];
        self.buffer[self.pos] = value;
        self.pos += 1;
        if self.pos == self.buffer.len() {
            self.pos = 0;
            // Re-sum once per lap so rounding error can not accumulate
            self.sum = self.buffer.iter().sum();
        }
        (self.sum / self.buffer.len() as f64).max(0.0)
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
        self.sum = 0.0;
    }
}

#[derive(Debug, Clone)]
enum DetectorState {
    Peak(EnvelopeFollower),
    Rms(MovingWindow),
    Lpf { coeff: f64, state: f64 },
    Sma(MovingWindow),
}

/// Turns a signal into a non-negative, preamp-scaled envelope
#[derive(Debug, Clone)]
pub struct SidechainDetector {
    state: DetectorState,
    preamp: f64,
}

impl SidechainDetector {
    pub fn new(config: &SidechainConfig, sample_rate: f64) -> Self {
        let window = millis_to_samples(config.reactivity_ms, sample_rate).max(1);
        let state = match config.law {
            DetectionLaw::Peak => {
                let mut follower = EnvelopeFollower::new(sample_rate);
                follower.set_times(0.0, config.reactivity_ms);
                DetectorState::Peak(follower)
            }
            DetectionLaw::Rms => DetectorState::Rms(MovingWindow::new(window)),
            DetectionLaw::Lpf => DetectorState::Lpf {
                coeff: time_constant_coeff(config.reactivity_ms, sample_rate),
                state: 0.0,
            },
            DetectionLaw::Sma => DetectorState::Sma(MovingWindow::new(window)),
        };

        Self {
            state,
            preamp: db_to_gain(config.preamp_db),
        }
    }

    /// Change the preamp without touching the detector state
    pub fn set_preamp_db(&mut self, preamp_db: f64) {
        self.preamp = db_to_gain(preamp_db);
    }

    /// Detection law in use
    pub fn law(&self) -> DetectionLaw {
        match self.state {
            DetectorState::Peak(_) => DetectionLaw::Peak,
            DetectorState::Rms(_) => DetectionLaw::Rms,
            DetectorState::Lpf { .. } => DetectionLaw::Lpf,
            DetectorState::Sma(_) => DetectionLaw::Sma,
        }
    }
}

impl Processor for SidechainDetector {
    fn reset(&mut self) {
        match &mut self.state {
            DetectorState::Peak(follower) => follower.reset(),
            DetectorState::Rms(window) | DetectorState::Sma(window) => window.reset(),
            DetectorState::Lpf { state, .. } => *state = 0.0,
        }
    }
}

impl MonoProcessor for SidechainDetector {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        let envelope = match &mut self.state {
            DetectorState::Peak(follower) => follower.process(input),
            DetectorState::Rms(window) => window.push(input * input).sqrt(),
            DetectorState::Lpf { coeff, state } => {
                let rectified = input.abs();
                *state = rectified + *coeff * (*state - rectified);
                *state
            }
            DetectorState::Sma(window) => window.push(input.abs()),
        };
        envelope * self.preamp
    }
}
