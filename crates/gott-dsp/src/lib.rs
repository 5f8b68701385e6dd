//! gott-dsp: Signal-processing core of the GOTT multiband compressor
//!
//! ## Modules
//! - `biquad` - TDF-II biquad filters (lowpass, highpass, allpass, shelving)
//! - `crossover` - Linkwitz-Riley crossovers, phase-compensating allpasses, dynamic shelves
//! - `linear_phase` - FFT-designed linear-phase FIR band splitter
//! - `splitter` - the three band-splitting topologies behind one type
//! - `sidechain` - channel selection and envelope detection
//! - `boost` - pink/brown sidechain tilt filters
//! - `delay_compensation` - delay lines and lookahead alignment
//! - `dynamics` - upward/downward band compressor
//! - `surge` - startup transient protection
//! - `recombiner` - solo/mute gating and dry/wet mixing
//! - `analysis` - peak meters and FFT spectrum
//! - `telemetry` - read-only snapshots for a UI layer
//! - `multiband` - the complete `GottCompressor` processor

pub mod analysis;
pub mod biquad;
pub mod boost;
pub mod crossover;
pub mod delay_compensation;
pub mod dynamics;
pub mod linear_phase;
pub mod multiband;
pub mod recombiner;
pub mod sidechain;
pub mod splitter;
pub mod surge;
pub mod telemetry;

pub use multiband::GottCompressor;
pub use telemetry::Telemetry;

use gott_core::Sample;

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);

    /// Get latency in samples
    fn latency(&self) -> usize {
        0
    }
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples
    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Processor configuration for sample rate changes
pub trait ProcessorConfig {
    fn set_sample_rate(&mut self, sample_rate: f64);
}
