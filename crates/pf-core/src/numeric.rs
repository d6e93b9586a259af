use crate::PfError;

/// Floating point type used throughout the system (micrometres, degrees).
pub type Real = f64;

/// Manufacturing grid in micrometres (1 nm).
pub const GRID: Real = 1e-3;

/// Decimal digits kept when floats are canonicalized for hashing.
pub const FINGERPRINT_DIGITS: i32 = 9;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PfError::NonFinite { what, value: v })
    }
}

/// Round to a fixed number of decimal digits, folding `-0.0` into `0.0`.
pub fn round_to_digits(value: Real, digits: i32) -> Real {
    let factor = 10f64.powi(digits);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn rounding_folds_negative_zero() {
        let r = round_to_digits(-1e-12, FINGERPRINT_DIGITS);
        assert_eq!(r.to_bits(), 0.0f64.to_bits());
        assert_eq!(round_to_digits(0.1 + 0.2, FINGERPRINT_DIGITS), 0.3);
    }
}
