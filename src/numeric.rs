//! Floating-point helpers shared by objectives and search drivers.

/// Tolerance under which two objective values are treated as equal.
pub const EPSILON: f64 = 1e-4;

/// `|x - y| <= epsilon`.
#[inline]
pub fn is_close(x: f64, y: f64, epsilon: f64) -> bool {
    (x - y).abs() <= epsilon
}

/// Whether `x` lies within `epsilon` of the nearest integer.
#[inline]
pub fn is_integral(x: f64, epsilon: f64) -> bool {
    is_close(x, x.round(), epsilon)
}

/// Whether `low <= x <= high`.
#[inline]
pub fn is_between(x: f64, low: f64, high: f64) -> bool {
    low <= x && x <= high
}

/// Maps `value` from `[min, max]` onto `[0, 1]`.
#[inline]
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    (value - min) / (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_close() {
        assert!(is_close(1.0, 1.00005, EPSILON));
        assert!(!is_close(1.0, 1.001, EPSILON));
    }

    #[test]
    fn test_is_integral() {
        assert!(is_integral(2.0 + 1e-9, 1e-8));
        assert!(is_integral(-3.0, 1e-8));
        assert!(!is_integral(0.5, 1e-8));
    }

    #[test]
    fn test_normalize() {
        assert!((normalize(5.0, 0.0, 10.0) - 0.5).abs() < 1e-12);
        assert!((normalize(2.0, 2.0, 4.0)).abs() < 1e-12);
    }
}
