//! Linear Phase Band Splitter
//!
//! FFT-designed FIR band filters:
//! - Complementary band masks (raised-cosine or brick-wall transitions)
//! - Symmetric, Hann-windowed kernels (constant group delay)
//! - Overlap-save convolution, one forward FFT per hop shared by all bands
//!
//! The kernels of all bands sum to a single centred impulse, so the
//! recombined signal is the input delayed by [`FirSplitter::latency`].

use std::f64::consts::PI;
use std::sync::Arc;

use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex64;

use gott_core::Sample;

use crate::Processor;

// ============ Mask Design ============

/// Low-side weight of a crossover at `split_hz` for frequency `freq`.
///
/// 1 below the transition, 0 above, raised cosine over `width_octaves`
/// centred on the split in log-frequency. Width 0 gives a brick-wall.
pub fn crossover_weight(freq: f64, split_hz: f64, width_octaves: f64) -> f64 {
    if freq <= 0.0 {
        return 1.0;
    }
    let octaves = (freq / split_hz).log2();
    if width_octaves <= 0.0 {
        return if octaves < 0.0 {
            1.0
        } else if octaves > 0.0 {
            0.0
        } else {
            0.5
        };
    }
    let t = (octaves / width_octaves + 0.5).clamp(0.0, 1.0);
    0.5 * (1.0 + (PI * t).cos())
}

/// Magnitude of `band` at `freq` for a complementary tree split.
///
/// Band 0 takes the low side of split 0; band k takes whatever splits
/// 0..k left over and keeps the low side of split k; the last band keeps
/// the remainder. The masks of all bands sum to exactly 1.
pub fn band_mask(band: usize, freq: f64, splits: &[f64], width_octaves: f64) -> f64 {
    let mut remainder = 1.0;
    for split in splits.iter().take(band) {
        remainder *= 1.0 - crossover_weight(freq, *split, width_octaves);
    }
    match splits.get(band) {
        Some(split) => remainder * crossover_weight(freq, *split, width_octaves),
        None => remainder,
    }
}

// ============ FIR Designer ============

/// Designs the per-band linear-phase kernels and returns their spectra
/// zero-padded to the convolution size
struct FirDesigner {
    inverse: Arc<dyn ComplexToReal<f64>>,
    forward: Arc<dyn RealToComplex<f64>>,
    fir_length: usize,
    fft_size: usize,
}

impl FirDesigner {
    fn new(planner: &mut RealFftPlanner<f64>, fir_length: usize, fft_size: usize) -> Self {
        Self {
            inverse: planner.plan_fft_inverse(fir_length),
            forward: planner.plan_fft_forward(fft_size),
            fir_length,
            fft_size,
        }
    }

    /// Windowed, centred impulse response for a zero-phase magnitude
    fn design_kernel(&self, magnitude: &[f64]) -> Vec<f64> {
        let n = self.fir_length;
        let mut spectrum: Vec<Complex64> =
            magnitude.iter().map(|&m| Complex64::new(m, 0.0)).collect();
        let mut impulse = vec![0.0; n];
        fft_ok(self.inverse.process(&mut spectrum, &mut impulse));

        let norm = 1.0 / n as f64;
        let half = n / 2;
        let mut kernel = vec![0.0; n];
        for (i, tap) in kernel.iter_mut().enumerate() {
            // Periodic Hann keeps the centre tap at exactly 1
            let window = 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos();
            *tap = impulse[(i + half) % n] * norm * window;
        }
        kernel
    }

    /// Spectrum of a kernel padded to the convolution size, with the inverse
    /// FFT normalization folded in
    fn kernel_spectrum(&self, kernel: &[f64]) -> Vec<Complex64> {
        let mut padded = vec![0.0; self.fft_size];
        padded[..kernel.len()].copy_from_slice(kernel);
        let mut spectrum = vec![Complex64::new(0.0, 0.0); self.fft_size / 2 + 1];
        fft_ok(self.forward.process(&mut padded, &mut spectrum));

        let norm = 1.0 / self.fft_size as f64;
        for bin in &mut spectrum {
            *bin *= norm;
        }
        spectrum
    }
}

// ============ Overlap-Save Engine ============

/// Per-channel streaming state
#[derive(Clone)]
struct FirChannel {
    /// Last `fft_size` input samples; the newest hop fills the tail
    history: Vec<f64>,
    /// Band outputs of the previous hop, read out while the next hop fills
    outputs: Vec<Vec<f64>>,
    pos: usize,
}

/// Shared plans, kernels and scratch
struct FirEngine {
    forward: Arc<dyn RealToComplex<f64>>,
    inverse: Arc<dyn ComplexToReal<f64>>,
    kernels: Vec<Vec<Complex64>>,
    time: Vec<f64>,
    input_spectrum: Vec<Complex64>,
    product: Vec<Complex64>,
    forward_scratch: Vec<Complex64>,
    inverse_scratch: Vec<Complex64>,
    fft_size: usize,
    hop: usize,
}

impl FirEngine {
    fn run_hop(&mut self, channel: &mut FirChannel) {
        self.time.copy_from_slice(&channel.history);
        fft_ok(self.forward.process_with_scratch(
            &mut self.time,
            &mut self.input_spectrum,
            &mut self.forward_scratch,
        ));

        let valid = self.fft_size - self.hop;
        for (kernel, output) in self.kernels.iter().zip(channel.outputs.iter_mut()) {
            for ((dst, x), h) in self
                .product
                .iter_mut()
                .zip(&self.input_spectrum)
                .zip(kernel)
            {
                *dst = x * h;
            }
            // DC and Nyquist bins of a real signal carry no imaginary part
            self.product[0].im = 0.0;
            if let Some(last) = self.product.last_mut() {
                last.im = 0.0;
            }

            if fft_ok(self.inverse.process_with_scratch(
                &mut self.product,
                &mut self.time,
                &mut self.inverse_scratch,
            )) {
                output.copy_from_slice(&self.time[valid..]);
            } else {
                output.fill(0.0);
            }
        }

        channel.history.copy_within(self.hop.., 0);
    }
}

/// Buffer sizes are fixed at construction, so a failing transform is a bug
#[inline]
fn fft_ok<E: std::fmt::Display>(result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::error!("FIR splitter FFT failed: {}", err);
            false
        }
    }
}

// ============ FIR Splitter ============

/// Linear-phase FIR band splitter
///
/// Latency is exactly the FIR length: half a kernel of group delay plus one
/// hop (half a kernel) of buffering.
pub struct FirSplitter {
    engine: FirEngine,
    channels: Vec<FirChannel>,
    masks: Vec<Vec<f64>>,
    fir_length: usize,
    sample_rate: f64,
}

impl FirSplitter {
    /// Build a splitter for `splits.len() + 1` bands.
    ///
    /// `fir_length` must be a power of two (see `LinearPhaseConfig::fir_length`).
    pub fn new(
        splits: &[f64],
        sample_rate: f64,
        fir_length: usize,
        transition_octaves: f64,
        channels: usize,
    ) -> Self {
        let band_count = splits.len() + 1;
        let hop = fir_length / 2;
        let fft_size = fir_length * 2;
        let bins = fir_length / 2 + 1;

        let masks: Vec<Vec<f64>> = (0..band_count)
            .map(|band| {
                (0..bins)
                    .map(|bin| {
                        let freq = bin as f64 * sample_rate / fir_length as f64;
                        band_mask(band, freq, splits, transition_octaves)
                    })
                    .collect()
            })
            .collect();

        let mut planner = RealFftPlanner::<f64>::new();
        let designer = FirDesigner::new(&mut planner, fir_length, fft_size);
        let kernels = masks
            .iter()
            .map(|mask| designer.kernel_spectrum(&designer.design_kernel(mask)))
            .collect();

        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let forward_scratch = forward.make_scratch_vec();
        let inverse_scratch = inverse.make_scratch_vec();

        let engine = FirEngine {
            input_spectrum: forward.make_output_vec(),
            product: inverse.make_input_vec(),
            time: vec![0.0; fft_size],
            forward,
            inverse,
            kernels,
            forward_scratch,
            inverse_scratch,
            fft_size,
            hop,
        };

        let channel = FirChannel {
            history: vec![0.0; fft_size],
            outputs: vec![vec![0.0; hop]; band_count],
            pos: 0,
        };

        log::debug!(
            "linear-phase splitter: {} bands, FIR length {}, hop {}",
            band_count,
            fir_length,
            hop
        );

        Self {
            engine,
            channels: vec![channel; channels],
            masks,
            fir_length,
            sample_rate,
        }
    }

    #[inline]
    pub fn band_count(&self) -> usize {
        self.masks.len()
    }

    /// Split one channel's block into band signals
    pub fn split(&mut self, channel: usize, input: &[Sample], bands: &mut [Vec<Sample>]) {
        let Some(state) = self.channels.get_mut(channel) else {
            return;
        };
        let hop = self.engine.hop;
        let tail = self.engine.fft_size - hop;

        for (i, &x) in input.iter().enumerate() {
            state.history[tail + state.pos] = x;
            for (band, output) in bands.iter_mut().zip(&state.outputs) {
                band[i] = output[state.pos];
            }
            state.pos += 1;
            if state.pos == hop {
                self.engine.run_hop(state);
                state.pos = 0;
            }
        }
    }

    /// Designed magnitude of `band` at `freq` (nearest design bin)
    pub fn band_magnitude(&self, band: usize, freq: f64) -> f64 {
        let Some(mask) = self.masks.get(band) else {
            return 0.0;
        };
        let bin = (freq * self.fir_length as f64 / self.sample_rate).round();
        let bin = (bin.max(0.0) as usize).min(mask.len() - 1);
        mask[bin]
    }
}

impl Processor for FirSplitter {
    fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.history.fill(0.0);
            for output in &mut channel.outputs {
                output.fill(0.0);
            }
            channel.pos = 0;
        }
    }

    fn latency(&self) -> usize {
        self.fir_length
    }
}

// ============ Tests ============
