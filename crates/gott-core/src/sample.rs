//! Sample types and stereo matrixing

/// Type alias for audio samples (always f64 for maximum precision)
pub type Sample = f64;

/// Stereo sample pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    #[inline]
    pub const fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    #[inline]
    pub const fn mono(value: Sample) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    #[inline]
    pub fn to_mid_side(self) -> MidSideSample {
        MidSideSample {
            mid: (self.left + self.right) * 0.5,
            side: (self.left - self.right) * 0.5,
        }
    }
}

/// Mid/Side sample pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct MidSideSample {
    pub mid: Sample,
    pub side: Sample,
}

impl MidSideSample {
    #[inline]
    pub fn to_stereo(self) -> StereoSample {
        StereoSample {
            left: self.mid + self.side,
            right: self.mid - self.side,
        }
    }
}

/// Encode a left/right block pair into mid/side in place
pub fn encode_mid_side(left: &mut [Sample], right: &mut [Sample]) {
    debug_assert_eq!(left.len(), right.len());
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let ms = StereoSample::new(*l, *r).to_mid_side();
        *l = ms.mid;
        *r = ms.side;
    }
}

/// Decode a mid/side block pair back into left/right in place
pub fn decode_mid_side(mid: &mut [Sample], side: &mut [Sample]) {
    debug_assert_eq!(mid.len(), side.len());
    for (m, s) in mid.iter_mut().zip(side.iter_mut()) {
        let lr = MidSideSample { mid: *m, side: *s }.to_stereo();
        *m = lr.left;
        *s = lr.right;
    }
}

/// Absolute peak of a block
#[inline]
pub fn abs_max(block: &[Sample]) -> Sample {
    block.iter().fold(0.0, |acc: Sample, &x| acc.max(x.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mid_side_roundtrip() {
        let mut left = vec![0.5, -0.25, 1.0];
        let mut right = vec![0.1, 0.75, -1.0];
        let (orig_l, orig_r) = (left.clone(), right.clone());

        encode_mid_side(&mut left, &mut right);
        assert!((left[0] - 0.3).abs() < 1e-12);
        assert!((right[0] - 0.2).abs() < 1e-12);

        decode_mid_side(&mut left, &mut right);
        for i in 0..3 {
            assert!((left[i] - orig_l[i]).abs() < 1e-12);
            assert!((right[i] - orig_r[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_abs_max() {
        assert_eq!(abs_max(&[0.1, -0.7, 0.3]), 0.7);
        assert_eq!(abs_max(&[]), 0.0);
    }
}
