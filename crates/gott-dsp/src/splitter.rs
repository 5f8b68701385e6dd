//! Band Splitting Topologies
//!
//! Three interchangeable ways to turn one signal into gain-controlled bands:
//! - Classic: LR4 crossover cascade, lower bands all-pass compensated
//! - Modern: one signal path through shelving filters driven by band gains
//! - LinearPhase: FFT-designed FIR band filters
//!
//! Each variant owns its own filter state. Switching topology means building a
//! new [`BandSplitter`]; nothing is shared between variants.

use gott_core::{LinearPhaseConfig, Sample, SplitTopology};
use rustfft::num_complex::Complex64;

use crate::crossover::{AllpassFilter, Crossover, ShelfKind, ShelvingFilter};
use crate::delay_compensation::DelayLine;
use crate::linear_phase::FirSplitter;
use crate::recombiner::BandGates;
use crate::{MonoProcessor, Processor};

// ============ Crossover Cascade ============

/// Crossover cascade of one channel
#[derive(Debug, Clone)]
struct CrossoverChain {
    crossovers: Vec<Crossover>,
    /// All-passes applied to each band (those of the higher crossovers)
    compensation: Vec<Vec<AllpassFilter>>,
}

/// Linkwitz-Riley band splitter
///
/// Band k is the lowpass of crossover k applied to what the lower crossovers
/// passed up. With compensation enabled band k also runs through the
/// all-passes of crossovers k+1.., so the bands sum to the input filtered by
/// one all-pass per crossover.
#[derive(Debug, Clone)]
pub struct CrossoverSplitter {
    chains: Vec<CrossoverChain>,
}

impl CrossoverSplitter {
    pub fn new(splits: &[f64], sample_rate: f64, channels: usize, compensated: bool) -> Self {
        let chain = CrossoverChain {
            crossovers: splits.iter().map(|&f| Crossover::new(f, sample_rate)).collect(),
            compensation: (0..splits.len())
                .map(|band| {
                    if compensated {
                        splits[band + 1..]
                            .iter()
                            .map(|&f| AllpassFilter::new(f, sample_rate))
                            .collect()
                    } else {
                        Vec::new()
                    }
                })
                .collect(),
        };

        Self {
            chains: vec![chain; channels],
        }
    }

    #[inline]
    pub fn band_count(&self) -> usize {
        self.chains.first().map_or(1, |c| c.crossovers.len() + 1)
    }

    /// Split one channel's block into band signals
    pub fn split(&mut self, channel: usize, input: &[Sample], bands: &mut [Vec<Sample>]) {
        let Some(chain) = self.chains.get_mut(channel) else {
            return;
        };
        let last = chain.crossovers.len();

        for (i, &x) in input.iter().enumerate() {
            let mut rest = x;
            for (k, (xover, allpasses)) in chain
                .crossovers
                .iter_mut()
                .zip(chain.compensation.iter_mut())
                .enumerate()
            {
                let (low, high) = xover.split(rest);
                let mut band = low;
                for ap in allpasses.iter_mut() {
                    band = ap.process_sample(band);
                }
                bands[k][i] = band;
                rest = high;
            }
            bands[last][i] = rest;
        }
    }

    /// Complex response of one band (channel 0 design)
    pub fn band_response(&self, band: usize, freq: f64) -> Complex64 {
        let Some(chain) = self.chains.first() else {
            return Complex64::new(1.0, 0.0);
        };
        let mut response = Complex64::new(1.0, 0.0);
        for xover in chain.crossovers.iter().take(band) {
            response *= xover.highpass_response(freq);
        }
        if let Some(xover) = chain.crossovers.get(band) {
            response *= xover.lowpass_response(freq);
        }
        if let Some(allpasses) = chain.compensation.get(band) {
            for ap in allpasses {
                response *= ap.frequency_response(freq);
            }
        }
        response
    }

    pub fn reset(&mut self) {
        for chain in &mut self.chains {
            for xover in &mut chain.crossovers {
                xover.reset();
            }
            for ap in chain.compensation.iter_mut().flatten() {
                ap.reset();
            }
        }
    }
}

// ============ Shelving Chain ============

#[derive(Debug, Clone)]
struct ShelfStage {
    filter: ShelvingFilter,
    band: usize,
    /// Stage undoes the band gain above the band's upper edge
    inverse: bool,
}

/// Modern topology: all band gains applied on a single path.
///
/// Band 0 is a low shelf at split 0. Every higher band lifts a high shelf at
/// its lower edge and, unless it is the last band, undoes it with an inverse
/// high shelf at its upper edge.
#[derive(Debug, Clone)]
pub struct ShelvingSplitter {
    chains: Vec<Vec<ShelfStage>>,
    band_count: usize,
}

impl ShelvingSplitter {
    pub fn new(splits: &[f64], sample_rate: f64, channels: usize) -> Self {
        let band_count = splits.len() + 1;
        let mut stages = Vec::with_capacity(2 * splits.len());

        if let Some(&first) = splits.first() {
            stages.push(ShelfStage {
                filter: ShelvingFilter::new(ShelfKind::Low, first, sample_rate),
                band: 0,
                inverse: false,
            });
        }
        for band in 1..band_count {
            stages.push(ShelfStage {
                filter: ShelvingFilter::new(ShelfKind::High, splits[band - 1], sample_rate),
                band,
                inverse: false,
            });
            if band < band_count - 1 {
                stages.push(ShelfStage {
                    filter: ShelvingFilter::new(ShelfKind::High, splits[band], sample_rate),
                    band,
                    inverse: true,
                });
            }
        }

        Self {
            chains: vec![stages; channels],
            band_count,
        }
    }

    #[inline]
    fn stage_gain(stage: &ShelfStage, gain: f64) -> f64 {
        if stage.inverse { 1.0 / gain } else { gain }
    }

    /// Run one channel through the shelves, gains read per sample
    pub fn render(
        &mut self,
        channel: usize,
        input: &[Sample],
        gains: &[Vec<Sample>],
        gates: &BandGates,
        output: &mut [Sample],
    ) {
        let Some(stages) = self.chains.get_mut(channel) else {
            return;
        };

        if stages.is_empty() {
            for (i, (out, &x)) in output.iter_mut().zip(input).enumerate() {
                let gain = ShelvingFilter::limit_gain(gates.gate_shelf_gain(0, gains[0][i]));
                *out = x * gain;
            }
            return;
        }

        for (i, (out, &x)) in output.iter_mut().zip(input).enumerate() {
            let mut y = x;
            for stage in stages.iter_mut() {
                let gain =
                    ShelvingFilter::limit_gain(gates.gate_shelf_gain(stage.band, gains[stage.band][i]));
                let target = Self::stage_gain(stage, gain);
                stage.filter.set_gain(target);
                y = stage.filter.process_sample(y);
            }
            *out = y;
        }
    }

    /// Response of the chain for the given band gains
    pub fn response(&self, gains: &[f64], gates: &BandGates, freq: f64) -> Complex64 {
        let limited = |band: usize| {
            ShelvingFilter::limit_gain(gates.gate_shelf_gain(band, gains.get(band).copied().unwrap_or(1.0)))
        };
        let Some(stages) = self.chains.first() else {
            return Complex64::new(1.0, 0.0);
        };
        if stages.is_empty() {
            return Complex64::new(limited(0), 0.0);
        }
        stages.iter().fold(Complex64::new(1.0, 0.0), |acc, stage| {
            acc * stage.filter.response_at(Self::stage_gain(stage, limited(stage.band)), freq)
        })
    }

    pub fn reset(&mut self) {
        for stage in self.chains.iter_mut().flatten() {
            stage.filter.reset();
        }
    }
}

// ============ Band Splitter ============

/// Main-path band splitter, one variant per topology
pub enum BandSplitter {
    Classic(CrossoverSplitter),
    Modern(ShelvingSplitter),
    LinearPhase(FirSplitter),
}

impl BandSplitter {
    pub fn new(
        topology: SplitTopology,
        splits: &[f64],
        sample_rate: f64,
        linear_phase: &LinearPhaseConfig,
        channels: usize,
    ) -> Self {
        log::debug!(
            "BandSplitter: {:?}, {} bands, {} channel(s)",
            topology,
            splits.len() + 1,
            channels
        );
        match topology {
            SplitTopology::Classic => {
                Self::Classic(CrossoverSplitter::new(splits, sample_rate, channels, true))
            }
            SplitTopology::Modern => Self::Modern(ShelvingSplitter::new(splits, sample_rate, channels)),
            SplitTopology::LinearPhase => Self::LinearPhase(FirSplitter::new(
                splits,
                sample_rate,
                linear_phase.fir_length(),
                linear_phase.transition_octaves,
                channels,
            )),
        }
    }

    pub fn topology(&self) -> SplitTopology {
        match self {
            Self::Classic(_) => SplitTopology::Classic,
            Self::Modern(_) => SplitTopology::Modern,
            Self::LinearPhase(_) => SplitTopology::LinearPhase,
        }
    }

    pub fn band_count(&self) -> usize {
        match self {
            Self::Classic(s) => s.band_count(),
            Self::Modern(s) => s.band_count,
            Self::LinearPhase(s) => s.band_count(),
        }
    }

    /// Split `input`, apply per-sample band gains, and sum the gated bands.
    ///
    /// `scratch` must hold one buffer per band, each at least `input.len()`.
    pub fn render(
        &mut self,
        channel: usize,
        input: &[Sample],
        gains: &[Vec<Sample>],
        gates: &BandGates,
        scratch: &mut [Vec<Sample>],
        output: &mut [Sample],
    ) {
        match self {
            Self::Modern(s) => s.render(channel, input, gains, gates, output),
            Self::Classic(s) => {
                s.split(channel, input, scratch);
                sum_bands(scratch, gains, gates, output);
            }
            Self::LinearPhase(s) => {
                s.split(channel, input, scratch);
                sum_bands(scratch, gains, gates, output);
            }
        }
    }

    /// Magnitude of the recombined path at `freq` for the given band gains
    pub fn magnitude(&self, gains: &[f64], gates: &BandGates, freq: f64) -> f64 {
        let gain = |band: usize| gates.gate(band) * gains.get(band).copied().unwrap_or(1.0);
        match self {
            Self::Classic(s) => (0..s.band_count())
                .map(|band| s.band_response(band, freq) * gain(band))
                .sum::<Complex64>()
                .norm(),
            Self::Modern(s) => s.response(gains, gates, freq).norm(),
            Self::LinearPhase(s) => (0..s.band_count())
                .map(|band| s.band_magnitude(band, freq) * gain(band))
                .sum::<f64>()
                .abs(),
        }
    }

    /// Matching dry-path aligner
    pub fn dry_aligner(&self, splits: &[f64], sample_rate: f64, channels: usize) -> DryAligner {
        match self {
            Self::Classic(_) => DryAligner::Allpass(
                (0..channels)
                    .map(|_| splits.iter().map(|&f| AllpassFilter::new(f, sample_rate)).collect())
                    .collect(),
            ),
            Self::Modern(_) => DryAligner::Identity,
            Self::LinearPhase(s) => {
                DryAligner::Delay((0..channels).map(|_| DelayLine::with_delay(s.latency())).collect())
            }
        }
    }
}

impl Processor for BandSplitter {
    fn reset(&mut self) {
        match self {
            Self::Classic(s) => s.reset(),
            Self::Modern(s) => s.reset(),
            Self::LinearPhase(s) => s.reset(),
        }
    }

    fn latency(&self) -> usize {
        match self {
            Self::LinearPhase(s) => s.latency(),
            _ => 0,
        }
    }
}

fn sum_bands(bands: &[Vec<Sample>], gains: &[Vec<Sample>], gates: &BandGates, output: &mut [Sample]) {
    output.fill(0.0);
    for (band, (signal, gain)) in bands.iter().zip(gains).enumerate() {
        let gate = gates.gate(band);
        if gate == 0.0 {
            continue;
        }
        for ((out, &x), &g) in output.iter_mut().zip(signal).zip(gain) {
            *out += x * g * gate;
        }
    }
}

// ============ Sidechain Splitter ============

/// Splitter for the detector feed.
///
/// IIR topologies use plain LR4 crossovers (no compensation, phase does not
/// matter to a level detector); LinearPhase uses the same FIR design so the
/// detector sees the same latency as the main path.
pub enum SidechainSplitter {
    Crossover(CrossoverSplitter),
    Fir(FirSplitter),
}

impl SidechainSplitter {
    pub fn new(
        topology: SplitTopology,
        splits: &[f64],
        sample_rate: f64,
        linear_phase: &LinearPhaseConfig,
        channels: usize,
    ) -> Self {
        match topology {
            SplitTopology::LinearPhase => Self::Fir(FirSplitter::new(
                splits,
                sample_rate,
                linear_phase.fir_length(),
                linear_phase.transition_octaves,
                channels,
            )),
            _ => Self::Crossover(CrossoverSplitter::new(splits, sample_rate, channels, false)),
        }
    }

    pub fn split(&mut self, channel: usize, input: &[Sample], bands: &mut [Vec<Sample>]) {
        match self {
            Self::Crossover(s) => s.split(channel, input, bands),
            Self::Fir(s) => s.split(channel, input, bands),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Crossover(s) => s.reset(),
            Self::Fir(s) => s.reset(),
        }
    }
}

// ============ Dry Path ============

/// Brings the dry signal onto the same phase/latency as the recombined bands
pub enum DryAligner {
    Identity,
    Allpass(Vec<Vec<AllpassFilter>>),
    Delay(Vec<DelayLine>),
}

impl DryAligner {
    pub fn process(&mut self, channel: usize, block: &mut [Sample]) {
        match self {
            Self::Identity => {}
            Self::Allpass(chains) => {
                if let Some(chain) = chains.get_mut(channel) {
                    for ap in chain.iter_mut() {
                        ap.process_block(block);
                    }
                }
            }
            Self::Delay(lines) => {
                if let Some(line) = lines.get_mut(channel) {
                    line.process_block(block);
                }
            }
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Identity => {}
            Self::Allpass(chains) => chains.iter_mut().flatten().for_each(|ap| ap.reset()),
            Self::Delay(lines) => lines.iter_mut().for_each(|line| line.reset()),
        }
    }
}
