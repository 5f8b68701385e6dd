//! Configuration model for the GOTT compressor
//!
//! Everything the host (or a UI layer) can change lives here. Types are plain
//! data with serde derives; the DSP crate reads them at configuration
//! boundaries only.
//!
//! Two kinds of problems are handled differently:
//! - [`GottConfig::validate`] rejects settings that would need buffers the
//!   processor can not provide (sample rate, band count, lookahead, FIR size).
//! - [`GottConfig::sanitize`] clamps everything else to the nearest safe value
//!   (thresholds, ratios, crossover ordering) and logs what it touched.

use serde::{Deserialize, Serialize};

use crate::{GottError, GottResult, db_to_gain, gain_to_db};

// ============ Limits ============

/// Maximum number of bands
pub const MAX_BANDS: usize = 8;

/// Band count of a fresh instance; bands above this index are "extra" bands
pub const DEFAULT_BAND_COUNT: usize = 3;

/// Default crossover frequencies (Hz)
pub const DEFAULT_SPLITS: [f64; MAX_BANDS - 1] =
    [120.0, 2000.0, 7000.0, 9000.0, 11000.0, 13000.0, 15000.0];

/// Lowest crossover frequency (Hz)
pub const SPLIT_MIN_HZ: f64 = 10.0;

/// Highest crossover frequency as a fraction of the sample rate
pub const SPLIT_MAX_FRACTION: f64 = 0.45;

/// Minimum ratio between neighbouring crossover frequencies
pub const MIN_SPLIT_RATIO: f64 = 1.05;

pub const SAMPLE_RATE_MIN: f64 = 8000.0;
pub const SAMPLE_RATE_MAX: f64 = 768000.0;

pub const THRESH_MIN_DB: f64 = -72.0;
pub const THRESH_MAX_DB: f64 = 0.0;

pub const RATIO_MIN: f64 = 1.0;
pub const RATIO_MAX: f64 = 100.0;

pub const ATTACK_MAX_MS: f64 = 2000.0;
pub const RELEASE_MAX_MS: f64 = 5000.0;

pub const MAKEUP_LIMIT_DB: f64 = 60.0;
pub const KNEE_MAX_DB: f64 = 24.0;

/// Longest lookahead the delay buffers are sized for
pub const LOOKAHEAD_MAX_MS: f64 = 20.0;

pub const REACTIVITY_MAX_MS: f64 = 250.0;
pub const PREAMP_LIMIT_DB: f64 = 60.0;

pub const GAIN_LIMIT_DB: f64 = 60.0;

/// FIR length of the linear-phase splitter is `1 << fir_rank`
pub const FIR_RANK_MIN: usize = 8;
pub const FIR_RANK_MAX: usize = 15;

/// Thresholds are kept at least this far apart (gain domain factor)
const THRESHOLD_SEPARATION: f64 = 0.999;

// ============ Enumerations ============

/// Channel layout and how the two channels share detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelMode {
    Mono,
    /// Both channels share one gain per band
    #[default]
    Stereo,
    /// Left and right are detected and compressed independently
    LeftRight,
    /// Input is matrixed to mid/side, processed independently, matrixed back
    MidSide,
}

impl ChannelMode {
    /// Number of audio channels
    pub fn channels(self) -> usize {
        match self {
            Self::Mono => 1,
            _ => 2,
        }
    }

    /// Number of independent gain computations per band
    pub fn detection_lanes(self) -> usize {
        match self {
            Self::Mono | Self::Stereo => 1,
            Self::LeftRight | Self::MidSide => 2,
        }
    }

    /// Detection lane that drives a given audio channel
    #[inline]
    pub fn lane_for_channel(self, channel: usize) -> usize {
        match self {
            Self::Mono | Self::Stereo => 0,
            Self::LeftRight | Self::MidSide => channel,
        }
    }
}

/// Band-splitting topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplitTopology {
    /// Linkwitz-Riley crossovers with all-pass phase compensation
    #[default]
    Classic,
    /// Dynamic shelving filters driven by the band gains
    Modern,
    /// FFT-designed linear-phase FIR band filters
    LinearPhase,
}

/// Envelope detection law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DetectionLaw {
    Peak,
    #[default]
    Rms,
    Lpf,
    Sma,
}

/// Which channel (or combination) feeds the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SidechainSource {
    #[default]
    Middle,
    Side,
    Left,
    Right,
    Min,
    Max,
    /// Stereo-split pairing: lane 0 reads left, lane 1 reads right
    LeftRight,
    /// Stereo-split pairing: lane 0 reads right, lane 1 reads left
    RightLeft,
    /// Stereo-split pairing: lane 0 reads mid, lane 1 reads side
    MidSide,
    /// Stereo-split pairing: lane 0 reads side, lane 1 reads mid
    SideMid,
}

/// Filter design method of the sidechain boost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostTransform {
    /// Bilinear transform: exact at low frequencies, warps near Nyquist
    Bilinear,
    /// Matched-Z transform: no warping, approximates the impulse response
    Matched,
}

/// Sidechain spectral tilt compensation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoostConfig {
    None,
    /// +3 dB/oct, bilinear transform
    #[default]
    PinkBt,
    /// +3 dB/oct, matched transform
    PinkMt,
    /// +6 dB/oct, bilinear transform
    BrownBt,
    /// +6 dB/oct, matched transform
    BrownMt,
}

impl BoostConfig {
    /// Slope of the boost in dB per octave
    pub fn slope_db_per_octave(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::PinkBt | Self::PinkMt => 3.0,
            Self::BrownBt | Self::BrownMt => 6.0,
        }
    }

    pub fn transform(self) -> Option<BoostTransform> {
        match self {
            Self::None => None,
            Self::PinkBt | Self::BrownBt => Some(BoostTransform::Bilinear),
            Self::PinkMt | Self::BrownMt => Some(BoostTransform::Matched),
        }
    }
}

// ============ Per-band settings ============

/// Sidechain setup of one band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidechainConfig {
    pub law: DetectionLaw,
    pub source: SidechainSource,
    /// Read the external sidechain input instead of the main input
    pub external: bool,
    pub preamp_db: f64,
    /// Detector time constant / window (ms)
    pub reactivity_ms: f64,
    pub lookahead_ms: f64,
}

impl Default for SidechainConfig {
    fn default() -> Self {
        Self {
            law: DetectionLaw::Rms,
            source: SidechainSource::Middle,
            external: false,
            preamp_db: 0.0,
            reactivity_ms: 10.0,
            lookahead_ms: 0.0,
        }
    }
}

/// Upward/downward transfer curve and ballistics of one band
///
/// Invariant after sanitizing: `bottom_db <= up_threshold_db <= down_threshold_db`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorCurve {
    /// Upward compression is disabled below this level
    pub bottom_db: f64,
    pub up_threshold_db: f64,
    pub up_ratio: f64,
    pub down_threshold_db: f64,
    pub down_ratio: f64,
    pub knee_db: f64,
    pub attack_ms: f64,
    pub release_ms: f64,
    pub makeup_db: f64,
}

impl Default for CompressorCurve {
    fn default() -> Self {
        Self {
            bottom_db: -60.0,
            up_threshold_db: -36.0,
            up_ratio: 50.0,
            down_threshold_db: -12.0,
            down_ratio: 50.0,
            knee_db: 6.0,
            attack_ms: 20.0,
            release_ms: 100.0,
            makeup_db: 0.0,
        }
    }
}

impl CompressorCurve {
    /// Curve that leaves the signal untouched (both ratios 1:1)
    pub fn pass_through() -> Self {
        Self {
            up_ratio: 1.0,
            down_ratio: 1.0,
            ..Self::default()
        }
    }

    /// Clamp every field into range and restore threshold ordering.
    /// Returns the number of fields that were changed.
    pub fn sanitize(&mut self) -> usize {
        let mut changed = 0;
        changed += clamp_field("down threshold", &mut self.down_threshold_db, THRESH_MIN_DB, THRESH_MAX_DB);
        changed += clamp_field("up threshold", &mut self.up_threshold_db, THRESH_MIN_DB, THRESH_MAX_DB);
        changed += clamp_field("bottom", &mut self.bottom_db, THRESH_MIN_DB, THRESH_MAX_DB);
        changed += clamp_field("up ratio", &mut self.up_ratio, RATIO_MIN, RATIO_MAX);
        changed += clamp_field("down ratio", &mut self.down_ratio, RATIO_MIN, RATIO_MAX);
        changed += clamp_field("knee", &mut self.knee_db, 0.0, KNEE_MAX_DB);
        changed += clamp_field("attack", &mut self.attack_ms, 0.0, ATTACK_MAX_MS);
        changed += clamp_field("release", &mut self.release_ms, 0.0, RELEASE_MAX_MS);
        changed += clamp_field("makeup", &mut self.makeup_db, -MAKEUP_LIMIT_DB, MAKEUP_LIMIT_DB);

        let max_up = gain_to_db(db_to_gain(self.down_threshold_db) * THRESHOLD_SEPARATION);
        if self.up_threshold_db > max_up {
            log::warn!(
                "up threshold {:.2} dB above down threshold, clamped to {:.2} dB",
                self.up_threshold_db,
                max_up
            );
            self.up_threshold_db = max_up;
            changed += 1;
        }

        let max_bottom = gain_to_db(db_to_gain(self.up_threshold_db) * THRESHOLD_SEPARATION);
        if self.bottom_db > max_bottom {
            log::warn!(
                "bottom {:.2} dB above up threshold, clamped to {:.2} dB",
                self.bottom_db,
                max_bottom
            );
            self.bottom_db = max_bottom;
            changed += 1;
        }

        changed
    }
}

impl SidechainConfig {
    /// Clamp preamp and reactivity. Lookahead is checked by
    /// [`GottConfig::validate`] since it sizes the delay buffers.
    pub fn sanitize(&mut self) -> usize {
        let mut changed = 0;
        changed += clamp_field("sidechain preamp", &mut self.preamp_db, -PREAMP_LIMIT_DB, PREAMP_LIMIT_DB);
        changed += clamp_field("reactivity", &mut self.reactivity_ms, 0.0, REACTIVITY_MAX_MS);
        changed += clamp_field("lookahead", &mut self.lookahead_ms, 0.0, LOOKAHEAD_MAX_MS);
        changed
    }
}

/// Full per-band settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub enabled: bool,
    pub solo: bool,
    pub mute: bool,
    pub curve: CompressorCurve,
    pub sidechain: SidechainConfig,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            solo: false,
            mute: false,
            curve: CompressorCurve::default(),
            sidechain: SidechainConfig::default(),
        }
    }
}

// ============ Global settings ============

/// Startup transient protection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurgeConfig {
    pub enabled: bool,
    /// Input level regarded as silence
    pub silence_threshold_db: f64,
    /// How long the input must stay silent before protection re-arms
    pub silence_hold_ms: f64,
    /// Gain ceiling applied to the first sample after wake-up
    pub start_db: f64,
    /// Rate at which the ceiling rises afterwards
    pub max_ramp_db_per_ms: f64,
}

impl Default for SurgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            silence_threshold_db: -72.0,
            silence_hold_ms: 100.0,
            start_db: -24.0,
            max_ramp_db_per_ms: 1.0,
        }
    }
}

impl SurgeConfig {
    pub fn sanitize(&mut self) -> usize {
        let mut changed = 0;
        changed += clamp_field("surge silence threshold", &mut self.silence_threshold_db, -144.0, 0.0);
        changed += clamp_field("surge hold", &mut self.silence_hold_ms, 0.0, 5000.0);
        changed += clamp_field("surge start", &mut self.start_db, -GAIN_LIMIT_DB, 0.0);
        changed += clamp_field("surge ramp", &mut self.max_ramp_db_per_ms, 0.001, 1000.0);
        changed
    }
}

/// Linear-phase splitter design
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearPhaseConfig {
    /// FIR length (and reported latency) is `1 << fir_rank` samples
    pub fir_rank: usize,
    /// Width of the raised-cosine crossover transition; 0 = brick-wall
    pub transition_octaves: f64,
}

impl Default for LinearPhaseConfig {
    fn default() -> Self {
        Self {
            fir_rank: 12,
            transition_octaves: 0.5,
        }
    }
}

impl LinearPhaseConfig {
    #[inline]
    pub fn fir_length(&self) -> usize {
        1 << self.fir_rank
    }
}

/// Static description of one band at the current configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub index: usize,
    pub low_hz: f64,
    pub high_hz: f64,
    pub enabled: bool,
    pub solo: bool,
    pub mute: bool,
    pub is_extra: bool,
}

/// Complete processor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GottConfig {
    pub sample_rate: f64,
    pub channel_mode: ChannelMode,
    pub topology: SplitTopology,
    pub band_count: usize,
    /// Crossover frequencies, `band_count - 1` of them, strictly increasing
    pub splits: Vec<f64>,
    pub input_gain_db: f64,
    pub output_gain_db: f64,
    /// 0 = dry only, 1 = wet only
    pub dry_wet: f64,
    pub boost: BoostConfig,
    pub surge: SurgeConfig,
    pub linear_phase: LinearPhaseConfig,
    /// Compute input/output FFT spectra for telemetry
    pub analyzer: bool,
    pub bands: Vec<BandConfig>,
}

impl Default for GottConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            channel_mode: ChannelMode::Stereo,
            topology: SplitTopology::Classic,
            band_count: DEFAULT_BAND_COUNT,
            splits: DEFAULT_SPLITS[..DEFAULT_BAND_COUNT - 1].to_vec(),
            input_gain_db: 0.0,
            output_gain_db: 0.0,
            dry_wet: 1.0,
            boost: BoostConfig::default(),
            surge: SurgeConfig::default(),
            linear_phase: LinearPhaseConfig::default(),
            analyzer: false,
            bands: vec![BandConfig::default(); DEFAULT_BAND_COUNT],
        }
    }
}

impl GottConfig {
    /// Configuration with `band_count` default bands
    pub fn with_bands(sample_rate: f64, band_count: usize) -> Self {
        let band_count = band_count.clamp(1, MAX_BANDS);
        Self {
            sample_rate,
            band_count,
            splits: DEFAULT_SPLITS[..band_count - 1].to_vec(),
            bands: vec![BandConfig::default(); band_count],
            ..Self::default()
        }
    }

    /// Reject settings that need resources the processor can not provide
    pub fn validate(&self) -> GottResult<()> {
        if !self.sample_rate.is_finite()
            || !(SAMPLE_RATE_MIN..=SAMPLE_RATE_MAX).contains(&self.sample_rate)
        {
            return Err(GottError::InvalidSampleRate(self.sample_rate));
        }

        if self.band_count == 0 || self.band_count > MAX_BANDS {
            return Err(GottError::InvalidBandCount(self.band_count));
        }

        if !(FIR_RANK_MIN..=FIR_RANK_MAX).contains(&self.linear_phase.fir_rank) {
            return Err(GottError::InvalidFftRank(self.linear_phase.fir_rank));
        }

        for band in self.bands.iter().take(self.band_count) {
            let requested = band.sidechain.lookahead_ms;
            if requested > LOOKAHEAD_MAX_MS {
                return Err(GottError::LookaheadTooLong {
                    requested_ms: requested,
                    max_ms: LOOKAHEAD_MAX_MS,
                });
            }
        }

        Ok(())
    }

    /// Clamp everything into its valid range. Returns the number of changes.
    pub fn sanitize(&mut self) -> usize {
        let mut changed = 0;

        self.bands.resize(self.band_count, BandConfig::default());
        let split_count = self.band_count.saturating_sub(1);
        if self.splits.len() != split_count {
            let have = self.splits.len().min(split_count);
            self.splits.truncate(have);
            self.splits.extend_from_slice(&DEFAULT_SPLITS[have..split_count]);
        }
        changed += sanitize_splits(&mut self.splits, self.sample_rate);

        changed += clamp_field("input gain", &mut self.input_gain_db, -GAIN_LIMIT_DB, GAIN_LIMIT_DB);
        changed += clamp_field("output gain", &mut self.output_gain_db, -GAIN_LIMIT_DB, GAIN_LIMIT_DB);
        changed += clamp_field("dry/wet", &mut self.dry_wet, 0.0, 1.0);
        changed += clamp_field("transition", &mut self.linear_phase.transition_octaves, 0.0, 4.0);
        changed += self.surge.sanitize();

        for band in &mut self.bands {
            changed += band.curve.sanitize();
            changed += band.sidechain.sanitize();
        }

        changed
    }

    /// Validate, then sanitize
    pub fn prepare(mut self) -> GottResult<Self> {
        self.validate()?;
        let changed = self.sanitize();
        if changed > 0 {
            log::debug!("configuration prepared, {} value(s) clamped", changed);
        }
        Ok(self)
    }

    /// Whether any active band is routed to the external sidechain
    pub fn uses_external_sidechain(&self) -> bool {
        self.bands
            .iter()
            .take(self.band_count)
            .any(|b| b.sidechain.external)
    }

    /// Frequency layout of the active bands
    pub fn layout(&self) -> Vec<Band> {
        let nyquist = self.sample_rate * 0.5;
        (0..self.band_count)
            .map(|index| {
                let band = self.bands.get(index).copied().unwrap_or_default();
                Band {
                    index,
                    low_hz: if index == 0 { 0.0 } else { self.splits[index - 1] },
                    high_hz: self.splits.get(index).copied().unwrap_or(nyquist),
                    enabled: band.enabled,
                    solo: band.solo,
                    mute: band.mute,
                    is_extra: index >= DEFAULT_BAND_COUNT,
                }
            })
            .collect()
    }
}

// ============ Helpers ============

/// Force crossover frequencies into `[SPLIT_MIN_HZ, SPLIT_MAX_FRACTION * fs]`,
/// strictly increasing by at least [`MIN_SPLIT_RATIO`]. Invalid points move to
/// the nearest valid neighbour. Returns the number of points moved.
pub fn sanitize_splits(splits: &mut [f64], sample_rate: f64) -> usize {
    let upper = sample_rate * SPLIT_MAX_FRACTION;
    let count = splits.len();
    let mut changed = 0;
    let mut prev = SPLIT_MIN_HZ / MIN_SPLIT_RATIO;

    for (i, split) in splits.iter_mut().enumerate() {
        let remaining = (count - 1 - i) as i32;
        let lo = prev * MIN_SPLIT_RATIO;
        let hi = (upper / MIN_SPLIT_RATIO.powi(remaining)).max(lo);
        let value = if split.is_finite() { *split } else { lo };
        let clamped = value.clamp(lo, hi);

        if clamped != *split {
            log::warn!("split {} at {:.1} Hz clamped to {:.1} Hz", i, *split, clamped);
            *split = clamped;
            changed += 1;
        }
        prev = clamped;
    }

    changed
}

fn clamp_field(name: &str, value: &mut f64, min: f64, max: f64) -> usize {
    let clamped = if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    };
    if clamped != *value {
        log::warn!("{} {} out of range, clamped to {}", name, *value, clamped);
        *value = clamped;
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GottConfig::default();
        assert!(config.validate().is_ok());
        let mut copy = config.clone();
        assert_eq!(copy.sanitize(), 0);
        assert_eq!(copy, config);
    }

    #[test]
    fn test_threshold_ordering_restored() {
        let mut curve = CompressorCurve {
            bottom_db: -10.0,
            up_threshold_db: -5.0,
            down_threshold_db: -20.0,
            ..CompressorCurve::default()
        };
        assert!(curve.sanitize() >= 2);
        assert!(curve.bottom_db <= curve.up_threshold_db);
        assert!(curve.up_threshold_db <= curve.down_threshold_db);
        assert!((curve.down_threshold_db + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_and_knee_clamped() {
        let mut curve = CompressorCurve {
            up_ratio: 0.2,
            down_ratio: 1000.0,
            knee_db: -3.0,
            ..CompressorCurve::default()
        };
        curve.sanitize();
        assert_eq!(curve.up_ratio, RATIO_MIN);
        assert_eq!(curve.down_ratio, RATIO_MAX);
        assert_eq!(curve.knee_db, 0.0);
    }

    #[test]
    fn test_splits_clamped_to_neighbours() {
        let mut splits = vec![3000.0, 300.0, 30000.0];
        sanitize_splits(&mut splits, 44100.0);

        assert!(splits[0] >= SPLIT_MIN_HZ);
        for pair in splits.windows(2) {
            assert!(pair[1] >= pair[0] * MIN_SPLIT_RATIO * 0.999_999);
        }
        assert!(splits[2] <= 44100.0 * SPLIT_MAX_FRACTION);
        // The out-of-order point snaps up against its lower neighbour
        assert!((splits[1] - splits[0] * MIN_SPLIT_RATIO).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_split_recovers() {
        let mut splits = vec![f64::NAN, 2000.0];
        sanitize_splits(&mut splits, 48000.0);
        assert!(splits[0].is_finite());
        assert!(splits[0] < splits[1]);
    }

    #[test]
    fn test_validate_rejects_resources() {
        let mut config = GottConfig::default();
        config.bands[1].sidechain.lookahead_ms = 50.0;
        assert_eq!(
            config.validate(),
            Err(GottError::LookaheadTooLong {
                requested_ms: 50.0,
                max_ms: LOOKAHEAD_MAX_MS
            })
        );

        let config = GottConfig {
            sample_rate: 100.0,
            ..GottConfig::default()
        };
        assert_eq!(config.validate(), Err(GottError::InvalidSampleRate(100.0)));

        let config = GottConfig {
            band_count: 0,
            ..GottConfig::default()
        };
        assert_eq!(config.validate(), Err(GottError::InvalidBandCount(0)));

        let mut config = GottConfig::default();
        config.linear_phase.fir_rank = 20;
        assert_eq!(config.validate(), Err(GottError::InvalidFftRank(20)));
    }

    #[test]
    fn test_sanitize_resizes_bands_and_splits() {
        let mut config = GottConfig {
            band_count: 5,
            ..GottConfig::default()
        };
        config.sanitize();
        assert_eq!(config.bands.len(), 5);
        assert_eq!(config.splits.len(), 4);

        let layout = config.layout();
        assert_eq!(layout.len(), 5);
        assert!(!layout[2].is_extra);
        assert!(layout[3].is_extra);
        assert_eq!(layout[0].low_hz, 0.0);
        assert_eq!(layout[4].high_hz, 24000.0);
        assert_eq!(layout[1].low_hz, config.splits[0]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "sample_rate": 44100.0,
            "topology": "LinearPhase",
            "bands": [{ "solo": true }, { "curve": { "down_ratio": 4.0 } }, {}]
        }"#;
        let config: GottConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sample_rate, 44100.0);
        assert_eq!(config.topology, SplitTopology::LinearPhase);
        assert!(config.bands[0].solo);
        assert!(config.bands[0].enabled);
        assert_eq!(config.bands[1].curve.down_ratio, 4.0);
        assert_eq!(config.bands[1].curve.up_ratio, 50.0);
        assert_eq!(config.linear_phase.fir_rank, 12);
    }

    #[test]
    fn test_channel_mode_lanes() {
        assert_eq!(ChannelMode::Mono.channels(), 1);
        assert_eq!(ChannelMode::Stereo.detection_lanes(), 1);
        assert_eq!(ChannelMode::MidSide.detection_lanes(), 2);
        assert_eq!(ChannelMode::Stereo.lane_for_channel(1), 0);
        assert_eq!(ChannelMode::LeftRight.lane_for_channel(1), 1);
    }

    #[test]
    fn test_boost_properties() {
        assert_eq!(BoostConfig::None.transform(), None);
        assert_eq!(BoostConfig::PinkMt.transform(), Some(BoostTransform::Matched));
        assert_eq!(BoostConfig::BrownBt.slope_db_per_octave(), 6.0);
    }
}
