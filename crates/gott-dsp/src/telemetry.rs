//! Read-only snapshots for a metering/UI layer
//!
//! Every buffer is sized when the processor is configured; updating a
//! snapshot after a block never allocates.

use gott_core::{SILENCE_DB, gain_to_db};
use serde::Serialize;

use crate::dynamics::GainComputer;

/// Points of the transfer-curve mesh
pub const TRANSFER_MESH_POINTS: usize = 256;
pub const TRANSFER_MIN_DB: f64 = -72.0;
pub const TRANSFER_MAX_DB: f64 = 24.0;

/// State of one band on one detection lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandTelemetry {
    /// Detector envelope
    pub envelope_db: f64,
    /// Static curve output at the envelope level
    pub curve_db: f64,
    /// Gain applied to the band (makeup and surge ceiling included)
    pub gain_db: f64,
    /// Smoothed compressor gain change, makeup excluded
    pub gain_reduction_db: f64,
}

impl Default for BandTelemetry {
    fn default() -> Self {
        Self {
            envelope_db: SILENCE_DB,
            curve_db: SILENCE_DB,
            gain_db: 0.0,
            gain_reduction_db: 0.0,
        }
    }
}

impl BandTelemetry {
    #[inline]
    pub fn update(&mut self, computer: &GainComputer, envelope: f64, applied_gain: f64, reduction_db: f64) {
        self.envelope_db = gain_to_db(envelope);
        self.curve_db = computer.output_db(self.envelope_db);
        self.gain_db = gain_to_db(applied_gain);
        self.gain_reduction_db = reduction_db;
    }
}

/// Snapshot taken after each processed block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    /// Latency reported to the host (samples)
    pub latency: usize,
    /// `[lane][band]`
    pub bands: Vec<Vec<BandTelemetry>>,
    /// Per channel, dBFS
    pub input_peak_db: Vec<f64>,
    pub output_peak_db: Vec<f64>,
    pub surge_active: bool,
    /// Input levels of the transfer-curve mesh
    pub curve_input_db: Vec<f64>,
    /// `[band][point]`, output level at each mesh input level
    pub transfer_curves: Vec<Vec<f64>>,
    /// Mesh frequencies of the spectra (empty when the analyzer is off)
    pub spectrum_hz: Vec<f64>,
    /// `[channel][point]`, dB
    pub input_spectrum: Vec<Vec<f64>>,
    pub output_spectrum: Vec<Vec<f64>>,
}

impl Telemetry {
    pub fn new(lanes: usize, channels: usize, computers: &[GainComputer], spectrum_hz: Vec<f64>) -> Self {
        let curve_input_db = transfer_mesh();
        let transfer_curves = vec![vec![0.0; curve_input_db.len()]; computers.len()];
        let spectrum = vec![vec![SILENCE_DB; spectrum_hz.len()]; channels];

        let mut telemetry = Self {
            latency: 0,
            bands: vec![vec![BandTelemetry::default(); computers.len()]; lanes],
            input_peak_db: vec![SILENCE_DB; channels],
            output_peak_db: vec![SILENCE_DB; channels],
            surge_active: false,
            curve_input_db,
            transfer_curves,
            spectrum_hz,
            input_spectrum: spectrum.clone(),
            output_spectrum: spectrum,
        };
        telemetry.set_transfer_curves(computers);
        telemetry
    }

    /// Recompute the transfer curves after a curve change
    pub fn set_transfer_curves(&mut self, computers: &[GainComputer]) {
        for (points, computer) in self.transfer_curves.iter_mut().zip(computers) {
            for (point, &db) in points.iter_mut().zip(&self.curve_input_db) {
                *point = computer.output_db(db);
            }
        }
    }

    /// Gain reduction of one band on lane 0
    pub fn gain_reduction_db(&self, band: usize) -> f64 {
        self.bands
            .first()
            .and_then(|lane| lane.get(band))
            .map_or(0.0, |b| b.gain_reduction_db)
    }
}

/// Evenly spaced input levels from [`TRANSFER_MIN_DB`] to [`TRANSFER_MAX_DB`]
pub fn transfer_mesh() -> Vec<f64> {
    let step = (TRANSFER_MAX_DB - TRANSFER_MIN_DB) / (TRANSFER_MESH_POINTS - 1) as f64;
    (0..TRANSFER_MESH_POINTS)
        .map(|i| TRANSFER_MIN_DB + step * i as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gott_core::CompressorCurve;

    #[test]
    fn test_transfer_mesh_bounds() {
        let mesh = transfer_mesh();
        assert_eq!(mesh.len(), TRANSFER_MESH_POINTS);
        assert_eq!(mesh[0], TRANSFER_MIN_DB);
        assert!((mesh[TRANSFER_MESH_POINTS - 1] - TRANSFER_MAX_DB).abs() < 1e-9);
    }

    #[test]
    fn test_pass_through_curve_is_identity() {
        let computers = [GainComputer::new(CompressorCurve::pass_through())];
        let telemetry = Telemetry::new(1, 2, &computers, Vec::new());
        for (&input, &output) in telemetry.curve_input_db.iter().zip(&telemetry.transfer_curves[0]) {
            assert!((input - output).abs() < 1e-12);
        }
        assert_eq!(telemetry.input_peak_db.len(), 2);
        assert!(telemetry.input_spectrum[0].is_empty());
    }

    #[test]
    fn test_band_update() {
        let computer = GainComputer::new(CompressorCurve {
            down_threshold_db: -20.0,
            down_ratio: 4.0,
            knee_db: 0.0,
            ..CompressorCurve::default()
        });
        let mut band = BandTelemetry::default();
        band.update(&computer, 1.0, 0.5, -6.0);
        assert!(band.envelope_db.abs() < 1e-12);
        assert!((band.curve_db + 15.0).abs() < 1e-12);
        assert!((band.gain_db + 6.0206).abs() < 1e-3);
        assert_eq!(band.gain_reduction_db, -6.0);
    }

    #[test]
    fn test_set_transfer_curves_follows_makeup() {
        let flat = CompressorCurve::pass_through();
        let mut telemetry = Telemetry::new(1, 1, &[GainComputer::new(flat)], Vec::new());
        telemetry.set_transfer_curves(&[GainComputer::new(CompressorCurve {
            makeup_db: 6.0,
            ..flat
        })]);
        for (&input, &output) in telemetry.curve_input_db.iter().zip(&telemetry.transfer_curves[0]) {
            assert!((output - input - 6.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_serializes() {
        let telemetry = Telemetry::new(2, 2, &[GainComputer::new(CompressorCurve::default())], vec![100.0]);
        let json = serde_json::to_string(&telemetry).unwrap();
        assert!(json.contains("\"transfer_curves\""));
        assert!(json.contains("\"gain_reduction_db\""));
    }
}
