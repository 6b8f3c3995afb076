use num_traits::Float;

/// Sigma OpenCV derives from the kernel size when none is given.
#[inline]
pub fn default_sigma(ksize: usize) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

#[inline]
pub fn lerp<F: Float>(a: F, b: F, t: F) -> F {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opencv_sigma_for_31() {
        assert!((default_sigma(31) - 5.0).abs() < 1e-6);
        assert!((default_sigma(3) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn lerp_midpoint() {
        assert_eq!(lerp(15.0f32, 75.0, 0.5), 45.0);
    }
}
