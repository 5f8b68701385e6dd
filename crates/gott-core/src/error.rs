//! Error types for the GOTT compressor

use thiserror::Error;

/// Core error type
///
/// Only resource problems and malformed host blocks surface here. Out-of-range
/// parameters are clamped by [`crate::GottConfig::sanitize`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GottError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Invalid band count: {0}")]
    InvalidBandCount(usize),

    #[error("Lookahead of {requested_ms} ms exceeds the {max_ms} ms delay buffer")]
    LookaheadTooLong { requested_ms: f64, max_ms: f64 },

    #[error("Invalid FIR rank: {0}")]
    InvalidFftRank(usize),

    #[error("Channel count mismatch: expected {expected}, got {got}")]
    ChannelMismatch { expected: usize, got: usize },

    #[error("Buffer size mismatch: expected {expected}, got {got}")]
    BufferMismatch { expected: usize, got: usize },
}

/// Result type alias
pub type GottResult<T> = Result<T, GottError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GottError::LookaheadTooLong {
            requested_ms: 30.0,
            max_ms: 20.0,
        };
        assert_eq!(
            err.to_string(),
            "Lookahead of 30 ms exceeds the 20 ms delay buffer"
        );

        let err = GottError::ChannelMismatch { expected: 2, got: 1 };
        assert_eq!(err.to_string(), "Channel count mismatch: expected 2, got 1");
    }
}
