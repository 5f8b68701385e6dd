//! Time conversions for audio processing

/// Convert milliseconds to a whole number of samples (rounded to nearest)
#[inline]
pub fn millis_to_samples(ms: f64, sample_rate: f64) -> usize {
    if ms <= 0.0 || sample_rate <= 0.0 {
        return 0;
    }
    (ms * 0.001 * sample_rate).round() as usize
}

/// Convert a sample count to milliseconds
#[inline]
pub fn samples_to_millis(samples: usize, sample_rate: f64) -> f64 {
    if sample_rate <= 0.0 {
        return 0.0;
    }
    samples as f64 * 1000.0 / sample_rate
}

/// One-pole smoothing coefficient for a time constant in milliseconds.
///
/// Zero time yields `0.0` (instant response).
#[inline]
pub fn time_constant_coeff(ms: f64, sample_rate: f64) -> f64 {
    if ms <= 0.0 {
        0.0
    } else {
        (-1.0 / (ms * 0.001 * sample_rate)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_samples() {
        assert_eq!(millis_to_samples(20.0, 48000.0), 960);
        assert_eq!(millis_to_samples(0.0, 48000.0), 0);
        assert_eq!(millis_to_samples(-5.0, 48000.0), 0);
        assert_eq!(millis_to_samples(1.0, 44100.0), 44);
    }

    #[test]
    fn test_samples_to_millis() {
        assert!((samples_to_millis(480, 48000.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_time_constant() {
        assert_eq!(time_constant_coeff(0.0, 48000.0), 0.0);
        let c = time_constant_coeff(10.0, 48000.0);
        assert!(c > 0.99 && c < 1.0);
    }
}
