//! Surge protection: a gain ceiling that ramps in after silence
//!
//! After the input has been silent for the hold time the limiter arms. The
//! first sample above the silence threshold activates it: band gains are then
//! capped by a ceiling that starts at `start_db` and rises at the configured
//! rate until it no longer constrains any band.

use gott_core::{SurgeConfig, db_to_gain, gain_to_db, millis_to_samples};

use crate::Processor;

#[derive(Debug, Clone)]
pub struct SurgeLimiter {
    silence_threshold: f64,
    hold_samples: usize,
    start_db: f64,
    ramp_db_per_sample: f64,
    silent_for: usize,
    armed: bool,
    active: bool,
    ceiling_db: f64,
}

impl SurgeLimiter {
    pub fn new(config: &SurgeConfig, sample_rate: f64) -> Self {
        Self {
            silence_threshold: db_to_gain(config.silence_threshold_db),
            hold_samples: millis_to_samples(config.silence_hold_ms, sample_rate),
            start_db: config.start_db,
            ramp_db_per_sample: config.max_ramp_db_per_ms * 1000.0 / sample_rate,
            silent_for: 0,
            armed: true,
            active: false,
            ceiling_db: config.start_db,
        }
    }

    /// Apply new settings; arming and an active ramp carry over
    pub fn set_config(&mut self, config: &SurgeConfig, sample_rate: f64) {
        self.silence_threshold = db_to_gain(config.silence_threshold_db);
        self.hold_samples = millis_to_samples(config.silence_hold_ms, sample_rate);
        self.start_db = config.start_db;
        self.ramp_db_per_sample = config.max_ramp_db_per_ms * 1000.0 / sample_rate;
    }

    /// Feed one input level (linear, non-negative) and the largest band gain
    /// of this sample. Returns the gain ceiling, infinite while inactive.
    #[inline]
    pub fn process(&mut self, level: f64, max_gain: f64) -> f64 {
        if level < self.silence_threshold {
            self.silent_for = self.silent_for.saturating_add(1);
            if self.silent_for >= self.hold_samples && !self.active {
                self.armed = true;
            }
        } else {
            self.silent_for = 0;
            if self.armed {
                self.armed = false;
                self.active = true;
                self.ceiling_db = self.start_db;
            }
        }

        if !self.active {
            return f64::INFINITY;
        }

        let ceiling = db_to_gain(self.ceiling_db);
        if self.ceiling_db >= gain_to_db(max_gain) {
            self.active = false;
        } else {
            self.ceiling_db += self.ramp_db_per_sample;
        }
        ceiling
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current ceiling in dB (meaningful while active)
    #[inline]
    pub fn ceiling_db(&self) -> f64 {
        self.ceiling_db
    }
}

impl Processor for SurgeLimiter {
    fn reset(&mut self) {
        self.silent_for = 0;
        self.armed = true;
        self.active = false;
        self.ceiling_db = self.start_db;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> SurgeLimiter {
        SurgeLimiter::new(
            &SurgeConfig {
                enabled: true,
                silence_threshold_db: -60.0,
                silence_hold_ms: 10.0,
                start_db: -20.0,
                max_ramp_db_per_ms: 2.0,
            },
            48000.0,
        )
    }

    #[test]
    fn test_starts_armed() {
        let mut surge = limiter();
        assert!(surge.is_armed());
        // Silence keeps it idle
        assert_eq!(surge.process(0.0, 1.0), f64::INFINITY);
        let ceiling = surge.process(0.5, 1.0);
        assert!((ceiling - db_to_gain(-20.0)).abs() < 1e-12);
        assert!(surge.is_active());
        assert!(!surge.is_armed());
    }

    #[test]
    fn test_ramp_rate() {
        let mut surge = limiter();
        let mut previous = gain_to_db(surge.process(0.5, 4.0));
        for _ in 0..100 {
            let ceiling = gain_to_db(surge.process(0.5, 4.0));
            // 2 dB/ms at 48 kHz
            assert!((ceiling - previous - 2.0 / 48.0).abs() < 1e-9);
            previous = ceiling;
        }
    }

    #[test]
    fn test_releases_once_ceiling_reaches_gain() {
        let mut surge = limiter();
        // 20 dB at 2 dB/ms is 10 ms
        let mut released_at = None;
        for i in 0..1000 {
            if surge.process(0.5, 1.0).is_infinite() {
                released_at = Some(i);
                break;
            }
        }
        let released_at = released_at.expect("ceiling never released");
        assert!((480..=482).contains(&released_at));
        assert!(!surge.is_active());
    }

    #[test]
    fn test_rearms_after_hold() {
        let mut surge = limiter();
        surge.process(0.5, 1.0);
        for _ in 0..2000 {
            surge.process(0.5, 1.0);
        }
        assert!(!surge.is_active());

        // Shorter than the hold: stays disarmed
        for _ in 0..100 {
            surge.process(0.0, 1.0);
        }
        assert_eq!(surge.process(0.5, 1.0), f64::INFINITY);

        for _ in 0..480 {
            surge.process(0.0, 1.0);
        }
        assert!(surge.is_armed());
        assert!(surge.process(0.5, 1.0).is_finite());
    }

    #[test]
    fn test_set_config_keeps_ramp() {
        let mut surge = limiter();
        surge.process(0.5, 4.0);
        let before = surge.ceiling_db();
        surge.set_config(
            &SurgeConfig {
                enabled: true,
                silence_threshold_db: -60.0,
                silence_hold_ms: 10.0,
                start_db: -30.0,
                max_ramp_db_per_ms: 1.0,
            },
            48000.0,
        );
        assert!(surge.is_active());
        surge.process(0.5, 4.0);
        assert!((surge.ceiling_db() - before - 1.0 / 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_rearms() {
        let mut surge = limiter();
        surge.process(0.5, 1.0);
        surge.reset();
        assert!(surge.is_armed());
        assert!(!surge.is_active());
    }
}
