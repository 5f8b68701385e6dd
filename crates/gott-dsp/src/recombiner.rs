//! Band recombination: solo/mute gating and the dry/wet output mixer

use gott_core::{Band, MAX_BANDS, Sample, db_to_gain};

/// Gain a silenced band keeps in Modern mode, where bands share one signal path
pub const MODERN_MUTE_DB: f64 = -36.0;

/// Per-band contribution factors (1 = audible, 0 = silenced)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandGates {
    gates: [f64; MAX_BANDS],
    count: usize,
}

impl BandGates {
    /// All bands audible
    pub fn open(count: usize) -> Self {
        Self {
            gates: [1.0; MAX_BANDS],
            count: count.min(MAX_BANDS),
        }
    }

    /// Gates from the band layout: muted bands are silenced, and if any band
    /// is soloed every band without solo is silenced too
    pub fn from_bands(bands: &[Band]) -> Self {
        let any_solo = bands.iter().any(|b| b.solo);
        let mut gates = Self::open(bands.len());
        for band in bands.iter().take(MAX_BANDS) {
            let audible = !band.mute && (!any_solo || band.solo);
            gates.gates[band.index] = if audible { 1.0 } else { 0.0 };
        }
        gates
    }

    #[inline]
    pub fn gate(&self, band: usize) -> f64 {
        if band < self.count { self.gates[band] } else { 0.0 }
    }

    #[inline]
    pub fn is_audible(&self, band: usize) -> bool {
        self.gate(band) > 0.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Gate applied to a Modern-mode shelf gain
    #[inline]
    pub fn gate_shelf_gain(&self, band: usize, gain: f64) -> f64 {
        if self.is_audible(band) {
            gain
        } else {
            db_to_gain(MODERN_MUTE_DB)
        }
    }
}

/// Output gain and dry/wet blend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    output_gain: f64,
    dry_wet: f64,
}

impl Mixer {
    pub fn new(output_gain_db: f64, dry_wet: f64) -> Self {
        Self {
            output_gain: db_to_gain(output_gain_db),
            dry_wet: dry_wet.clamp(0.0, 1.0),
        }
    }

    /// `wet = mix * (wet * output_gain) + (1 - mix) * dry`, in place
    pub fn mix_block(&self, wet: &mut [Sample], dry: &[Sample]) {
        let wet_gain = self.dry_wet * self.output_gain;
        let dry_gain = 1.0 - self.dry_wet;
        for (w, &d) in wet.iter_mut().zip(dry) {
            *w = *w * wet_gain + d * dry_gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(index: usize, solo: bool, mute: bool) -> Band {
        Band {
            index,
            low_hz: 0.0,
            high_hz: 0.0,
            enabled: true,
            solo,
            mute,
            is_extra: false,
        }
    }

    #[test]
    fn test_mute_gates() {
        let gates = BandGates::from_bands(&[band(0, false, false), band(1, false, true)]);
        assert_eq!(gates.gate(0), 1.0);
        assert_eq!(gates.gate(1), 0.0);
        assert_eq!(gates.gate(5), 0.0);
    }

    #[test]
    fn test_solo_silences_others() {
        let gates = BandGates::from_bands(&[
            band(0, false, false),
            band(1, true, false),
            band(2, true, true),
        ]);
        assert!(!gates.is_audible(0));
        assert!(gates.is_audible(1));
        // Mute wins over solo
        assert!(!gates.is_audible(2));
    }

    #[test]
    fn test_modern_mute_keeps_floor() {
        let gates = BandGates::from_bands(&[band(0, false, true)]);
        let gain = gates.gate_shelf_gain(0, 2.0);
        assert!((gain - db_to_gain(MODERN_MUTE_DB)).abs() < 1e-15);
        // -36 dB
        assert!((gain - 0.015_848_931_924_611_134).abs() < 1e-12);
    }

    #[test]
    fn test_mixer_wet_only_is_exact() {
        let mixer = Mixer::new(0.0, 1.0);
        let mut wet = [0.25, -0.5, 0.125];
        mixer.mix_block(&mut wet, &[1.0, 1.0, 1.0]);
        assert_eq!(wet, [0.25, -0.5, 0.125]);
    }

    #[test]
    fn test_mixer_blend() {
        let mixer = Mixer::new(6.020_599_913_279_624, 0.5);
        let mut wet = [1.0];
        mixer.mix_block(&mut wet, &[1.0]);
        assert!((wet[0] - 1.5).abs() < 1e-12);
    }
}
