//! GOTT multiband upward/downward compressor
//!
//! Per processing chunk:
//! 1. input gain, mid/side encode (MidSide mode), input metering
//! 2. sidechain source: external input or a copy of the main input
//! 3. sidechain boost, then the sidechain band split
//! 4. per lane and band: source selection, lookahead compensation,
//!    envelope detection, gain computation
//! 5. surge ceiling
//! 6. main path delayed by the largest lookahead, split, gained and summed
//! 7. dry path aligned to the wet path, mid/side decode, dry/wet mix
//! 8. output metering, spectra and telemetry
//!
//! Host blocks of any length are processed in chunks of at most
//! [`MAX_BLOCK_SIZE`] samples. All buffers are allocated at configuration.

use gott_core::{
    Band, ChannelMode, GottConfig, GottError, GottResult, MAX_BLOCK_SIZE, Sample, SplitTopology,
    db_to_gain, decode_mid_side, encode_mid_side, gain_to_db,
};

use crate::analysis::{DEFAULT_FFT_SIZE, FftAnalyzer, PeakMeter, SPECTRUM_MESH_POINTS, log_mesh};
use crate::boost::SidechainBooster;
use crate::delay_compensation::{DelayLine, LookaheadPlan};
use crate::dynamics::{BandCompressor, GainComputer};
use crate::recombiner::{BandGates, Mixer};
use crate::sidechain::{SidechainDetector, select};
use crate::splitter::{BandSplitter, DryAligner, SidechainSplitter};
use crate::surge::SurgeLimiter;
use crate::telemetry::Telemetry;
use crate::{MonoProcessor, Processor};

// ============ Per-lane state ============

/// Detection and gain state of one band on one lane
#[derive(Debug, Clone)]
struct BandChannel {
    /// Detector delay: largest lookahead minus this band's lookahead
    delay: DelayLine,
    detector: SidechainDetector,
    compressor: BandCompressor,
    envelope: f64,
}

impl BandChannel {
    fn reset(&mut self) {
        self.delay.reset();
        self.detector.reset();
        self.compressor.reset();
        self.envelope = 0.0;
    }
}

#[derive(Debug, Clone)]
struct Lane {
    bands: Vec<BandChannel>,
    surge: SurgeLimiter,
}

/// Chunk buffers, each [`MAX_BLOCK_SIZE`] long
struct Buffers {
    /// `[channel]`
    main: Vec<Vec<Sample>>,
    dry: Vec<Vec<Sample>>,
    wet: Vec<Vec<Sample>>,
    /// `[channel]`, detector source before the split
    sidechain: Vec<Vec<Sample>>,
    external: Vec<Vec<Sample>>,
    /// `[channel][band]`
    sidechain_bands: Vec<Vec<Vec<Sample>>>,
    external_bands: Vec<Vec<Vec<Sample>>>,
    /// `[lane][band]`, linear gain per sample
    gains: Vec<Vec<Vec<Sample>>>,
    /// `[band]`, main-path split
    band_scratch: Vec<Vec<Sample>>,
}

impl Buffers {
    fn new(channels: usize, lanes: usize, bands: usize, external: bool) -> Self {
        let block = || vec![0.0; MAX_BLOCK_SIZE];
        let per_channel = |count: usize| (0..count).map(|_| block()).collect::<Vec<_>>();
        let per_band = |count: usize| (0..count).map(|_| per_channel(bands)).collect::<Vec<_>>();
        let external_channels = if external { channels } else { 0 };

        Self {
            main: per_channel(channels),
            dry: per_channel(channels),
            wet: per_channel(channels),
            sidechain: per_channel(channels),
            external: per_channel(external_channels),
            sidechain_bands: per_band(channels),
            external_bands: per_band(external_channels),
            gains: (0..lanes).map(|_| vec![vec![1.0; MAX_BLOCK_SIZE]; bands]).collect(),
            band_scratch: per_channel(bands),
        }
    }
}

// ============ Processor ============

/// Multiband upward/downward compressor
pub struct GottCompressor {
    config: GottConfig,
    layout: Vec<Band>,
    gates: BandGates,
    input_gain: f64,
    mixer: Mixer,
    splitter: BandSplitter,
    sidechain_splitter: SidechainSplitter,
    external_splitter: Option<SidechainSplitter>,
    dry_aligner: DryAligner,
    plan: LookaheadPlan,
    main_delays: Vec<DelayLine>,
    dry_delays: Vec<DelayLine>,
    boosters: Vec<SidechainBooster>,
    external_boosters: Vec<SidechainBooster>,
    lanes: Vec<Lane>,
    input_meters: Vec<PeakMeter>,
    output_meters: Vec<PeakMeter>,
    input_analyzers: Vec<FftAnalyzer>,
    output_analyzers: Vec<FftAnalyzer>,
    telemetry: Telemetry,
    buffers: Buffers,
}

impl GottCompressor {
    /// Build a processor. Out-of-range values are clamped; settings that need
    /// resources the processor can not provide are rejected.
    pub fn new(config: GottConfig) -> GottResult<Self> {
        let config = config.prepare()?;
        let fs = config.sample_rate;
        let channels = config.channel_mode.channels();
        let lane_count = config.channel_mode.detection_lanes();
        let band_count = config.band_count;
        let external = config.uses_external_sidechain();

        let splitter = BandSplitter::new(
            config.topology,
            &config.splits,
            fs,
            &config.linear_phase,
            channels,
        );
        let dry_aligner = splitter.dry_aligner(&config.splits, fs, channels);
        let sidechain_splitter =
            SidechainSplitter::new(config.topology, &config.splits, fs, &config.linear_phase, channels);
        let external_splitter = external.then(|| {
            SidechainSplitter::new(config.topology, &config.splits, fs, &config.linear_phase, channels)
        });

        let lookahead: Vec<f64> = config.bands.iter().map(|b| b.sidechain.lookahead_ms).collect();
        let plan = LookaheadPlan::new(&lookahead, fs, splitter.latency());
        let delays = || -> Vec<DelayLine> {
            (0..channels)
                .map(|_| DelayLine::with_delay(plan.max_lookahead()))
                .collect()
        };

        let lanes: Vec<Lane> = (0..lane_count)
            .map(|_| Lane {
                bands: config
                    .bands
                    .iter()
                    .enumerate()
                    .map(|(band, settings)| BandChannel {
                        delay: DelayLine::with_delay(plan.compensation(band)),
                        detector: SidechainDetector::new(&settings.sidechain, fs),
                        compressor: BandCompressor::new(settings.curve, fs),
                        envelope: 0.0,
                    })
                    .collect(),
                surge: SurgeLimiter::new(&config.surge, fs),
            })
            .collect();

        let boosters = |count: usize| -> Vec<SidechainBooster> {
            (0..count).map(|_| SidechainBooster::new(config.boost, fs)).collect()
        };

        let (input_analyzers, output_analyzers, spectrum_hz) = if config.analyzer {
            let analyzers = || -> Vec<FftAnalyzer> {
                (0..channels).map(|_| FftAnalyzer::new(DEFAULT_FFT_SIZE)).collect()
            };
            (analyzers(), analyzers(), log_mesh(SPECTRUM_MESH_POINTS, fs))
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };

        let computers: Vec<GainComputer> =
            config.bands.iter().map(|b| GainComputer::new(b.curve)).collect();
        let mut telemetry = Telemetry::new(lane_count, channels, &computers, spectrum_hz);
        telemetry.latency = plan.total_latency();

        let layout = config.layout();
        let gates = BandGates::from_bands(&layout);

        log::debug!(
            "GottCompressor: {:?}/{:?}, {} bands at {} Hz, latency {} samples",
            config.topology,
            config.channel_mode,
            band_count,
            fs,
            plan.total_latency()
        );

        Ok(Self {
            input_gain: db_to_gain(config.input_gain_db),
            mixer: Mixer::new(config.output_gain_db, config.dry_wet),
            main_delays: delays(),
            dry_delays: delays(),
            boosters: boosters(channels),
            external_boosters: boosters(if external { channels } else { 0 }),
            input_meters: (0..channels).map(|_| PeakMeter::new(fs)).collect(),
            output_meters: (0..channels).map(|_| PeakMeter::new(fs)).collect(),
            buffers: Buffers::new(channels, lane_count, band_count, external),
            config,
            layout,
            gates,
            splitter,
            sidechain_splitter,
            external_splitter,
            dry_aligner,
            plan,
            lanes,
            input_analyzers,
            output_analyzers,
            telemetry,
        })
    }

    /// Apply a new configuration. On error the current one stays in place.
    ///
    /// Changes to the sample rate, channel mode, topology, band layout, FIR
    /// settings, lookahead, external routing or analyzer rebuild the signal
    /// path from a reset state. Anything else is applied in place: filter,
    /// delay, envelope and gain state carry on across the change.
    pub fn configure(&mut self, config: GottConfig) -> GottResult<()> {
        let config = config.prepare()?;
        if !needs_rebuild(&self.config, &config) {
            self.update(config);
            return Ok(());
        }

        let next = Self::new(config)?;

        if next.config.topology != self.config.topology {
            log::debug!(
                "topology switched: {:?} -> {:?}",
                self.config.topology,
                next.config.topology
            );
        }
        if next.latency() != self.latency() {
            log::debug!("latency changed: {} -> {} samples", self.latency(), next.latency());
        }

        *self = next;
        Ok(())
    }

    /// Apply settings that leave the signal path intact
    fn update(&mut self, config: GottConfig) {
        let fs = config.sample_rate;

        self.input_gain = db_to_gain(config.input_gain_db);
        self.mixer = Mixer::new(config.output_gain_db, config.dry_wet);
        self.layout = config.layout();
        self.gates = BandGates::from_bands(&self.layout);

        if config.boost != self.config.boost {
            for booster in self.boosters.iter_mut().chain(self.external_boosters.iter_mut()) {
                *booster = SidechainBooster::new(config.boost, fs);
            }
        }

        for lane in &mut self.lanes {
            lane.surge.set_config(&config.surge, fs);
            for ((band, old), new) in lane.bands.iter_mut().zip(&self.config.bands).zip(&config.bands) {
                if new.curve != old.curve {
                    band.compressor.set_curve(new.curve);
                }
                if new.sidechain.law != old.sidechain.law
                    || new.sidechain.reactivity_ms != old.sidechain.reactivity_ms
                {
                    band.detector = SidechainDetector::new(&new.sidechain, fs);
                } else {
                    band.detector.set_preamp_db(new.sidechain.preamp_db);
                }
            }
        }

        let computers: Vec<GainComputer> =
            config.bands.iter().map(|b| GainComputer::new(b.curve)).collect();
        self.telemetry.set_transfer_curves(&computers);

        log::debug!("GottCompressor: settings updated in place");
        self.config = config;
    }

    /// Rebuild for a new sample rate, keeping every other setting
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> GottResult<()> {
        let mut config = self.config.clone();
        config.sample_rate = sample_rate;
        self.configure(config)
    }

    /// Active (sanitized) configuration
    pub fn config(&self) -> &GottConfig {
        &self.config
    }

    pub fn topology(&self) -> SplitTopology {
        self.splitter.topology()
    }

    pub fn bands(&self) -> &[Band] {
        &self.layout
    }

    pub fn channels(&self) -> usize {
        self.config.channel_mode.channels()
    }

    /// Snapshot of the last processed block
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Magnitude (dB) of the band path of `lane` at each frequency, using the
    /// band gains of the last processed sample
    pub fn filter_response(&self, lane: usize, freqs: &[f64]) -> Vec<f64> {
        let gains: Vec<f64> = self
            .telemetry
            .bands
            .get(lane)
            .map(|bands| bands.iter().map(|b| db_to_gain(b.gain_db)).collect())
            .unwrap_or_default();

        freqs
            .iter()
            .map(|&freq| gain_to_db(self.splitter.magnitude(&gains, &self.gates, freq)))
            .collect()
    }

    /// Process one host block.
    ///
    /// `inputs` and `outputs` hold one slice per channel, `sidechain` (if any)
    /// as many channels as the input. Returns the latency in samples.
    pub fn process(
        &mut self,
        inputs: &[&[Sample]],
        sidechain: Option<&[&[Sample]]>,
        outputs: &mut [&mut [Sample]],
    ) -> GottResult<usize> {
        let channels = self.channels();
        for count in [inputs.len(), outputs.len()] {
            if count != channels {
                return Err(GottError::ChannelMismatch {
                    expected: channels,
                    got: count,
                });
            }
        }
        if let Some(sc) = sidechain {
            if sc.len() != channels {
                return Err(GottError::ChannelMismatch {
                    expected: channels,
                    got: sc.len(),
                });
            }
        }

        let len = inputs[0].len();
        let lengths = inputs
            .iter()
            .map(|b| b.len())
            .chain(outputs.iter().map(|b| b.len()))
            .chain(sidechain.into_iter().flatten().map(|b| b.len()));
        for got in lengths {
            if got != len {
                return Err(GottError::BufferMismatch { expected: len, got });
            }
        }

        let mut offset = 0;
        while offset < len {
            let count = (len - offset).min(MAX_BLOCK_SIZE);
            self.process_chunk(inputs, sidechain, outputs, offset, count);
            offset += count;
        }

        Ok(self.latency())
    }

    fn process_chunk(
        &mut self,
        inputs: &[&[Sample]],
        sidechain: Option<&[&[Sample]]>,
        outputs: &mut [&mut [Sample]],
        offset: usize,
        n: usize,
    ) {
        let mode = self.config.channel_mode;
        let channels = inputs.len();
        let last = channels - 1;
        let range = offset..offset + n;
        let external = sidechain.filter(|_| self.external_splitter.is_some());
        let buffers = &mut self.buffers;

        // Input stage
        for (c, input) in inputs.iter().enumerate() {
            let main = &mut buffers.main[c][..n];
            for (dst, &x) in main.iter_mut().zip(&input[range.clone()]) {
                *dst = x * self.input_gain;
            }
            self.input_meters[c].process_block(main);
            if let Some(analyzer) = self.input_analyzers.get_mut(c) {
                analyzer.push_samples(main);
            }
            buffers.sidechain[c][..n].copy_from_slice(main);
        }
        if mode == ChannelMode::MidSide {
            let (mid, side) = buffers.main.split_at_mut(1);
            encode_mid_side(&mut mid[0][..n], &mut side[0][..n]);
        }

        // Sidechain boost and split
        for c in 0..channels {
            let block = &mut buffers.sidechain[c][..n];
            self.boosters[c].process_block(block);
            self.sidechain_splitter.split(c, block, &mut buffers.sidechain_bands[c]);
        }
        if let (Some(ext), Some(splitter)) = (external, self.external_splitter.as_mut()) {
            for c in 0..channels {
                let block = &mut buffers.external[c][..n];
                for (dst, &x) in block.iter_mut().zip(&ext[c][range.clone()]) {
                    *dst = x * self.input_gain;
                }
                self.external_boosters[c].process_block(block);
                splitter.split(c, block, &mut buffers.external_bands[c]);
            }
        }

        // Detection and gain computation
        for (lane, state) in self.lanes.iter_mut().enumerate() {
            for (b, (band, settings)) in state.bands.iter_mut().zip(&self.config.bands).enumerate() {
                let source = if external.is_some() && settings.sidechain.external {
                    &buffers.external_bands
                } else {
                    &buffers.sidechain_bands
                };
                let left = &source[0][b][..n];
                let right = &source[last][b][..n];
                let gains = &mut buffers.gains[lane][b][..n];

                for ((gain, &l), &r) in gains.iter_mut().zip(left).zip(right) {
                    let x = band
                        .delay
                        .process_sample(select(settings.sidechain.source, l, r, lane));
                    band.envelope = band.detector.process_sample(x);
                    *gain = if settings.enabled {
                        band.compressor.process(band.envelope)
                    } else {
                        1.0
                    };
                }
            }
        }

        // Surge protection
        if self.config.surge.enabled && external.is_none() {
            for (lane, state) in self.lanes.iter_mut().enumerate() {
                let was_armed = state.surge.is_armed();
                let gains = &mut buffers.gains[lane];
                for i in 0..n {
                    let level = lane_level(mode, &buffers.main, lane, i);
                    let max_gain = gains.iter().fold(0.0, |acc: f64, g| acc.max(g[i]));
                    let ceiling = state.surge.process(level, max_gain);
                    if ceiling.is_finite() {
                        for band in gains.iter_mut() {
                            band[i] = band[i].min(ceiling);
                        }
                    }
                }
                if state.surge.is_armed() != was_armed {
                    log::debug!(
                        "surge protection {} on lane {}",
                        if was_armed { "triggered" } else { "armed" },
                        lane
                    );
                }
            }
        }

        // Main and dry paths
        for c in 0..channels {
            let lane = mode.lane_for_channel(c);
            buffers.dry[c][..n].copy_from_slice(&buffers.main[c][..n]);
            self.dry_delays[c].process_block(&mut buffers.dry[c][..n]);
            self.dry_aligner.process(c, &mut buffers.dry[c][..n]);

            self.main_delays[c].process_block(&mut buffers.main[c][..n]);
            self.splitter.render(
                c,
                &buffers.main[c][..n],
                &buffers.gains[lane],
                &self.gates,
                &mut buffers.band_scratch,
                &mut buffers.wet[c][..n],
            );
        }
        if mode == ChannelMode::MidSide {
            let (mid, side) = buffers.wet.split_at_mut(1);
            decode_mid_side(&mut mid[0][..n], &mut side[0][..n]);
            let (mid, side) = buffers.dry.split_at_mut(1);
            decode_mid_side(&mut mid[0][..n], &mut side[0][..n]);
        }

        // Output stage
        for (c, output) in outputs.iter_mut().enumerate() {
            let wet = &mut buffers.wet[c][..n];
            self.mixer.mix_block(wet, &buffers.dry[c][..n]);
            output[range.clone()].copy_from_slice(wet);
            self.output_meters[c].process_block(wet);
            if let Some(analyzer) = self.output_analyzers.get_mut(c) {
                analyzer.push_samples(wet);
            }
        }

        // Telemetry
        let telemetry = &mut self.telemetry;
        for (lane, state) in self.lanes.iter().enumerate() {
            for (b, band) in state.bands.iter().enumerate() {
                telemetry.bands[lane][b].update(
                    band.compressor.computer(),
                    band.envelope,
                    buffers.gains[lane][b][n - 1],
                    band.compressor.gain_reduction_db(),
                );
            }
        }
        telemetry.surge_active = self.lanes.iter().any(|l| l.surge.is_active());
        for c in 0..channels {
            telemetry.input_peak_db[c] = self.input_meters[c].current_db();
            telemetry.output_peak_db[c] = self.output_meters[c].current_db();
        }
        let fs = self.config.sample_rate;
        for (c, analyzer) in self.input_analyzers.iter_mut().enumerate() {
            if analyzer.frame_ready() {
                analyzer.analyze();
                analyzer.fill_mesh(&telemetry.spectrum_hz, fs, &mut telemetry.input_spectrum[c]);
            }
        }
        for (c, analyzer) in self.output_analyzers.iter_mut().enumerate() {
            if analyzer.frame_ready() {
                analyzer.analyze();
                analyzer.fill_mesh(&telemetry.spectrum_hz, fs, &mut telemetry.output_spectrum[c]);
            }
        }
    }
}

/// Whether moving from `current` to `next` changes the signal path itself
fn needs_rebuild(current: &GottConfig, next: &GottConfig) -> bool {
    let lookahead_changed = current
        .bands
        .iter()
        .zip(&next.bands)
        .any(|(a, b)| a.sidechain.lookahead_ms != b.sidechain.lookahead_ms);

    current.sample_rate != next.sample_rate
        || current.channel_mode != next.channel_mode
        || current.topology != next.topology
        || current.band_count != next.band_count
        || current.splits != next.splits
        || current.linear_phase != next.linear_phase
        || current.analyzer != next.analyzer
        || current.uses_external_sidechain() != next.uses_external_sidechain()
        || lookahead_changed
}

/// Input level seen by the surge limiter of `lane`
#[inline]
fn lane_level(mode: ChannelMode, main: &[Vec<Sample>], lane: usize, i: usize) -> f64 {
    match mode {
        ChannelMode::Stereo => main[0][i].abs().max(main[1][i].abs()),
        _ => main[lane][i].abs(),
    }
}

impl Processor for GottCompressor {
    fn reset(&mut self) {
        self.splitter.reset();
        self.sidechain_splitter.reset();
        if let Some(splitter) = self.external_splitter.as_mut() {
            splitter.reset();
        }
        self.dry_aligner.reset();
        for line in self.main_delays.iter_mut().chain(self.dry_delays.iter_mut()) {
            line.reset();
        }
        for booster in self.boosters.iter_mut().chain(self.external_boosters.iter_mut()) {
            booster.reset();
        }
        for lane in &mut self.lanes {
            lane.surge.reset();
            for band in &mut lane.bands {
                band.reset();
            }
        }
        for meter in self.input_meters.iter_mut().chain(self.output_meters.iter_mut()) {
            meter.reset();
        }
        for analyzer in self.input_analyzers.iter_mut().chain(self.output_analyzers.iter_mut()) {
            analyzer.reset();
        }
    }

    fn latency(&self) -> usize {
        self.plan.total_latency()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gott_core::{BandConfig, CompressorCurve};

    fn pass_through(mut config: GottConfig) -> GottConfig {
        for band in &mut config.bands {
            band.curve = CompressorCurve::pass_through();
        }
        config
    }

    fn run(comp: &mut GottCompressor, input: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let mut output = vec![vec![0.0; input[0].len()]; input.len()];
        let ins: Vec<&[f64]> = input.iter().map(|c| c.as_slice()).collect();
        let mut outs: Vec<&mut [f64]> = output.iter_mut().map(|c| c.as_mut_slice()).collect();
        comp.process(&ins, None, &mut outs).unwrap();
        output
    }

    fn noise(len: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_modern_pass_through_is_exact() {
        let config = pass_through(GottConfig {
            topology: SplitTopology::Modern,
            ..GottConfig::with_bands(48000.0, 4)
        });
        let mut comp = GottCompressor::new(config).unwrap();
        let input = vec![noise(5000, 1), noise(5000, 2)];
        let output = run(&mut comp, &input);
        assert_eq!(output, input);
        assert_eq!(comp.latency(), 0);
    }

    #[test]
    fn test_chunking_is_transparent() {
        let config = GottConfig {
            channel_mode: ChannelMode::LeftRight,
            ..GottConfig::with_bands(48000.0, 3)
        };
        let input = vec![noise(9000, 3), noise(9000, 4)];

        let mut whole = GottCompressor::new(config.clone()).unwrap();
        let expected = run(&mut whole, &input);

        let mut pieces = GottCompressor::new(config).unwrap();
        let mut output = vec![Vec::new(), Vec::new()];
        for start in (0..9000).step_by(700) {
            let end = (start + 700).min(9000);
            let part: Vec<Vec<f64>> = input.iter().map(|c| c[start..end].to_vec()).collect();
            for (out, chunk) in output.iter_mut().zip(run(&mut pieces, &part)) {
                out.extend(chunk);
            }
        }
        assert_eq!(output, expected);
    }

    #[test]
    fn test_channel_mismatch() {
        let mut comp = GottCompressor::new(GottConfig::default()).unwrap();
        let input = vec![0.0; 16];
        let mut out = vec![0.0; 16];
        let result = comp.process(&[&input[..]], None, &mut [&mut out[..]]);
        assert_eq!(result, Err(GottError::ChannelMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn test_buffer_mismatch_leaves_output() {
        let mut comp = GottCompressor::new(GottConfig::default()).unwrap();
        let (l, r) = (vec![0.5; 16], vec![0.5; 8]);
        let (mut ol, mut or) = (vec![7.0; 16], vec![7.0; 16]);
        let result = comp.process(&[&l[..], &r[..]], None, &mut [&mut ol[..], &mut or[..]]);
        assert_eq!(result, Err(GottError::BufferMismatch { expected: 16, got: 8 }));
        assert!(ol.iter().all(|&x| x == 7.0));
    }

    #[test]
    fn test_muted_band_is_silent() {
        let mut config = pass_through(GottConfig {
            channel_mode: ChannelMode::Mono,
            splits: vec![1000.0],
            ..GottConfig::with_bands(48000.0, 2)
        });
        config.bands[1].mute = true;
        let mut comp = GottCompressor::new(config).unwrap();

        // 10 kHz sits far inside the muted upper band
        let input = vec![
            (0..9600)
                .map(|i| (2.0 * std::f64::consts::PI * 10000.0 * i as f64 / 48000.0).sin())
                .collect::<Vec<_>>(),
        ];
        let output = run(&mut comp, &input);
        let peak = output[0][4800..].iter().fold(0.0_f64, |a, &x| a.max(x.abs()));
        assert!(peak < 0.01, "peak {}", peak);
    }

    #[test]
    fn test_disabled_band_is_unity() {
        let mut config = GottConfig {
            channel_mode: ChannelMode::Mono,
            topology: SplitTopology::Modern,
            ..GottConfig::with_bands(48000.0, 1)
        };
        config.bands[0] = BandConfig {
            enabled: false,
            curve: CompressorCurve {
                down_threshold_db: -40.0,
                down_ratio: 10.0,
                ..CompressorCurve::default()
            },
            ..BandConfig::default()
        };
        let mut comp = GottCompressor::new(config).unwrap();
        let input = vec![vec![0.5; 2000]];
        let output = run(&mut comp, &input);
        assert_eq!(output, input);
        assert_eq!(comp.telemetry().bands[0][0].gain_db, 0.0);
    }

    #[test]
    fn test_configure_switches_topology() {
        let mut comp = GottCompressor::new(GottConfig::default()).unwrap();
        let mut config = comp.config().clone();
        config.topology = SplitTopology::LinearPhase;
        comp.configure(config).unwrap();
        assert_eq!(comp.topology(), SplitTopology::LinearPhase);
        assert_eq!(comp.latency(), comp.config().linear_phase.fir_length());

        let mut bad = comp.config().clone();
        bad.sample_rate = 0.0;
        assert!(comp.configure(bad).is_err());
        assert_eq!(comp.topology(), SplitTopology::LinearPhase);
    }

    #[test]
    fn test_filter_response_flat_at_unity() {
        let config = pass_through(GottConfig {
            topology: SplitTopology::Modern,
            ..GottConfig::default()
        });
        let comp = GottCompressor::new(config).unwrap();
        for db in comp.filter_response(0, &[50.0, 1000.0, 12000.0]) {
            assert!(db.abs() < 1e-9);
        }
    }
}
