//! Audio analysis: FFT spectrum and peak metering
//!
//! All analyzers include input validation for sample rates and FFT sizes.

use std::sync::Arc;

use gott_core::{SILENCE_DB, Sample, gain_to_db};
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;

// ============================================================================
// VALIDATION CONSTANTS
// ============================================================================

/// Default sample rate for fallback
const DEFAULT_SAMPLE_RATE: f64 = 48000.0;
/// Minimum FFT size
const MIN_FFT_SIZE: usize = 64;
/// Maximum FFT size
const MAX_FFT_SIZE: usize = 65536;
/// Spectrum FFT size (2^13)
pub const DEFAULT_FFT_SIZE: usize = 8192;
/// Points of the log-spaced spectrum mesh
pub const SPECTRUM_MESH_POINTS: usize = 640;
/// Lowest frequency of the spectrum mesh
pub const SPECTRUM_MIN_HZ: f64 = 20.0;

/// FFT analyzer for spectrum display
pub struct FftAnalyzer {
    fft: Arc<dyn RealToComplex<f64>>,
    fft_size: usize,
    input_buffer: Vec<f64>,
    output_buffer: Vec<Complex<f64>>,
    window: Vec<f64>,
    magnitudes: Vec<f64>,
    write_pos: usize,
    /// Samples pushed since the last analysis
    pending: usize,
    /// Pre-allocated scratch buffer for windowed samples (zero-allocation hot path)
    scratch_windowed: Vec<f64>,
}

impl FftAnalyzer {
    pub fn new(fft_size: usize) -> Self {
        // Must be a power of 2 within range
        let fft_size =
            if (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) && fft_size.is_power_of_two() {
                fft_size
            } else {
                DEFAULT_FFT_SIZE
            };

        let mut planner = RealFftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let output_len = fft_size / 2 + 1;

        // Hann window
        let window: Vec<f64> = (0..fft_size)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (fft_size - 1) as f64).cos())
            })
            .collect();

        Self {
            fft,
            fft_size,
            input_buffer: vec![0.0; fft_size],
            output_buffer: vec![Complex::new(0.0, 0.0); output_len],
            window,
            magnitudes: vec![SILENCE_DB; output_len],
            write_pos: 0,
            pending: 0,
            scratch_windowed: vec![0.0; fft_size],
        }
    }

    /// Add samples to the analyzer
    pub fn push_samples(&mut self, samples: &[Sample]) {
        for &sample in samples {
            self.input_buffer[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.fft_size;
        }
        self.pending = self.pending.saturating_add(samples.len());
    }

    /// Whether half a frame of new samples has arrived since the last analysis
    #[inline]
    pub fn frame_ready(&self) -> bool {
        self.pending >= self.fft_size / 2
    }

    /// Perform FFT and update magnitudes
    pub fn analyze(&mut self) {
        self.pending = 0;

        for (i, (&input, &win)) in self.input_buffer.iter().zip(&self.window).enumerate() {
            self.scratch_windowed[i] = input * win;
        }

        // Oldest sample first
        self.scratch_windowed.rotate_left(self.write_pos);

        if self
            .fft
            .process(&mut self.scratch_windowed, &mut self.output_buffer)
            .is_err()
        {
            for c in &mut self.output_buffer {
                *c = Complex::new(0.0, 0.0);
            }
            return;
        }

        let scale = 2.0 / self.fft_size as f64;
        for (i, c) in self.output_buffer.iter().enumerate() {
            let db = gain_to_db(c.norm() * scale);
            // Smooth with previous value
            self.magnitudes[i] = self.magnitudes[i] * 0.8 + db * 0.2;
        }
    }

    /// Get magnitude at a specific bin
    pub fn magnitude(&self, bin: usize) -> f64 {
        self.magnitudes.get(bin).copied().unwrap_or(SILENCE_DB)
    }

    /// Get all magnitudes
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// Get bin index for a frequency
    pub fn freq_to_bin(&self, freq: f64, sample_rate: f64) -> usize {
        ((freq * self.fft_size as f64) / sample_rate).round() as usize
    }

    /// Magnitudes (dB) sampled at each mesh frequency, linear interpolation between bins
    pub fn fill_mesh(&self, freqs: &[f64], sample_rate: f64, out: &mut [f64]) {
        let last = self.magnitudes.len() - 1;
        for (value, &freq) in out.iter_mut().zip(freqs) {
            let pos = (freq * self.fft_size as f64 / sample_rate).clamp(0.0, last as f64);
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(last);
            let frac = pos - lo as f64;
            *value = self.magnitudes[lo] * (1.0 - frac) + self.magnitudes[hi] * frac;
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn reset(&mut self) {
        self.input_buffer.fill(0.0);
        self.magnitudes.fill(SILENCE_DB);
        self.write_pos = 0;
        self.pending = 0;
    }
}

/// Log-spaced frequencies from [`SPECTRUM_MIN_HZ`] to Nyquist
pub fn log_mesh(points: usize, sample_rate: f64) -> Vec<f64> {
    let top = (sample_rate * 0.5).max(SPECTRUM_MIN_HZ * 2.0);
    let span = (top / SPECTRUM_MIN_HZ).ln();
    let steps = points.saturating_sub(1).max(1) as f64;
    (0..points)
        .map(|i| SPECTRUM_MIN_HZ * (span * i as f64 / steps).exp())
        .collect()
}

/// Peak meter with hold
#[derive(Debug, Clone)]
pub struct PeakMeter {
    current_peak: f64,
    held_peak: f64,
    hold_samples: usize,
    hold_counter: usize,
    release_coeff: f64,
}

impl PeakMeter {
    pub fn new(sample_rate: f64) -> Self {
        let sr = if sample_rate > 0.0 && sample_rate.is_finite() {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        Self {
            current_peak: 0.0,
            held_peak: 0.0,
            hold_samples: (sr * 2.0) as usize, // 2 second hold
            hold_counter: 0,
            release_coeff: (-1.0 / (0.3 * sr)).exp(), // 300ms release
        }
    }

    #[inline]
    pub fn process(&mut self, sample: Sample) {
        let abs = sample.abs();

        if abs > self.current_peak {
            self.current_peak = abs;
        } else {
            self.current_peak *= self.release_coeff;
        }

        if abs > self.held_peak {
            self.held_peak = abs;
            self.hold_counter = 0;
        } else {
            self.hold_counter += 1;
            if self.hold_counter >= self.hold_samples {
                self.held_peak *= self.release_coeff;
            }
        }
    }

    pub fn process_block(&mut self, samples: &[Sample]) {
        for &sample in samples {
            self.process(sample);
        }
    }

    pub fn current_db(&self) -> f64 {
        gain_to_db(self.current_peak)
    }

    pub fn held_db(&self) -> f64 {
        gain_to_db(self.held_peak)
    }

    pub fn reset(&mut self) {
        self.current_peak = 0.0;
        self.held_peak = 0.0;
        self.hold_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_meter() {
        let mut meter = PeakMeter::new(48000.0);

        meter.process(0.5);
        assert!(meter.current_db() > -7.0); // ~-6dB

        meter.process(1.0);
        assert!(meter.current_db() > -0.1); // ~0dB

        meter.process_block(&[0.0; 480]);
        assert!(meter.current_db() < 0.0);
        assert!(meter.held_db() > -0.1);
    }

    #[test]
    fn test_fft_analyzer() {
        let mut analyzer = FftAnalyzer::new(1024);

        let freq = 1000.0;
        let sample_rate = 48000.0;
        for i in 0..1024 {
            let sample = (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate).sin();
            analyzer.push_samples(&[sample]);
        }
        assert!(analyzer.frame_ready());

        analyzer.analyze();
        assert!(!analyzer.frame_ready());

        // Should have a peak near 1kHz
        let peak_bin = analyzer.freq_to_bin(freq, sample_rate);
        assert!(analyzer.magnitude(peak_bin) > analyzer.magnitude(peak_bin + 10));
    }

    #[test]
    fn test_invalid_size_falls_back() {
        assert_eq!(FftAnalyzer::new(1000).fft_size(), DEFAULT_FFT_SIZE);
        assert_eq!(FftAnalyzer::new(16).fft_size(), DEFAULT_FFT_SIZE);
    }

    #[test]
    fn test_log_mesh() {
        let mesh = log_mesh(SPECTRUM_MESH_POINTS, 48000.0);
        assert_eq!(mesh.len(), SPECTRUM_MESH_POINTS);
        assert!((mesh[0] - SPECTRUM_MIN_HZ).abs() < 1e-9);
        assert!((mesh[SPECTRUM_MESH_POINTS - 1] - 24000.0).abs() < 1e-6);
        assert!(mesh.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_fill_mesh_interpolates() {
        let mut analyzer = FftAnalyzer::new(64);
        analyzer.magnitudes[1] = -10.0;
        analyzer.magnitudes[2] = -20.0;
        let mut out = [0.0];
        // Bin spacing is 750 Hz at 48 kHz
        analyzer.fill_mesh(&[1125.0], 48000.0, &mut out);
        assert!((out[0] + 15.0).abs() < 1e-12);
    }
}
