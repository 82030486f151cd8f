//! Basic numerical concepts used throughout the crate

#![allow(missing_docs)]

// Event features are always processed in double precision, so that pass/fail
// decisions are reproducible against tables produced elsewhere
pub type Float = f64;
pub use std::f64 as reals;

/// Mathematical functions
pub mod functions {
    use super::Float;

    /// Clamp a value into [lo, hi], letting NaN through untouched
    pub fn clip(x: Float, lo: Float, hi: Float) -> Float {
        x.clamp(lo, hi)
    }

    /// Euclidean norm of a 2D position
    pub fn hypot2(x: Float, y: Float) -> Float {
        (x * x + y * y).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::{functions::*, reals};

    #[test]
    fn clip_keeps_nan() {
        assert_eq!(clip(10., 150., 7000.), 150.);
        assert_eq!(clip(1e5, 150., 7000.), 7000.);
        assert!(clip(reals::NAN, 150., 7000.).is_nan());
    }

    #[test]
    fn radius() {
        assert_eq!(hypot2(3., 4.), 5.);
        assert_eq!(hypot2(0., -2.), 2.);
    }
}
