//! gott-core: Shared types, configuration, and utilities for the GOTT compressor
//!
//! This crate provides the foundational types used by the DSP crate and by any
//! host or UI layer that edits parameters.

mod config;
mod error;
mod sample;
mod time;

pub use config::*;
pub use error::*;
pub use sample::*;
pub use time::*;

/// Level floor; anything quieter is treated as silence
pub const SILENCE_DB: f64 = -144.0;

/// Largest block processed in one pass; longer host blocks are chunked
pub const MAX_BLOCK_SIZE: usize = 4096;

/// Decibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub f64);

impl Decibels {
    pub const ZERO: Self = Self(0.0);
    pub const SILENCE: Self = Self(SILENCE_DB);

    #[inline]
    pub fn from_gain(gain: f64) -> Self {
        Self(gain_to_db(gain))
    }

    #[inline]
    pub fn to_gain(self) -> f64 {
        db_to_gain(self.0)
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Convert decibels to linear gain; levels at or below [`SILENCE_DB`] map to 0
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    if db <= SILENCE_DB {
        0.0
    } else {
        10.0_f64.powf(db / 20.0)
    }
}

/// Convert linear gain to decibels, floored at [`SILENCE_DB`]
#[inline]
pub fn gain_to_db(gain: f64) -> f64 {
    if gain <= 0.0 {
        SILENCE_DB
    } else {
        (20.0 * gain.log10()).max(SILENCE_DB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_db_gain_conversion() {
        assert_relative_eq!(db_to_gain(0.0), 1.0);
        assert_relative_eq!(db_to_gain(-6.0), 0.501_187_233_627, epsilon = 1e-9);
        assert_relative_eq!(gain_to_db(2.0), 6.020_599_913_28, epsilon = 1e-9);
        assert_eq!(gain_to_db(0.0), SILENCE_DB);
        assert_eq!(gain_to_db(1e-12), SILENCE_DB);
        assert_eq!(db_to_gain(-200.0), 0.0);
    }

    #[test]
    fn test_decibels_wrapper() {
        let db = Decibels::from_gain(0.5);
        assert_relative_eq!(db.to_gain(), 0.5, epsilon = 1e-12);
        assert_eq!(Decibels::default(), Decibels::ZERO);
        assert!(Decibels::SILENCE < Decibels::ZERO);
    }
}
