//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit a value to the closed range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Limit a value to `[-limit, limit]`, returning the limited value and whether the limit was hit.
pub fn saturate<T>(value: T, limit: T) -> (T, bool)
where
    T: Float,
{
    let limited = clamp(value, -limit.abs(), limit.abs());
    (limited, limited != value)
}

/// Round a value to the given number of decimal places.
pub fn round_dp<T>(value: T, decimal_places: i32) -> T
where
    T: Float,
{
    let scale = T::from(10).unwrap().powi(decimal_places);
    (value * scale).round() / scale
}

/// Wrap an angle into the range `(-pi, pi]`.
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    // rem_euclid gives [0, 2pi), shift so that pi maps to pi rather than -pi
    let wrapped = pi_t - rem_euclid(pi_t - angle, tau_t);

    if wrapped <= -pi_t {
        wrapped + tau_t
    } else {
        wrapped
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_clamp_and_saturate() {
        assert_eq!(clamp(5.0, 0.0, 2.0), 2.0);
        assert_eq!(clamp(-5.0, 0.0, 2.0), 0.0);
        assert_eq!(clamp(1.0, 0.0, 2.0), 1.0);

        assert_eq!(saturate(7.5, 2.0), (2.0, true));
        assert_eq!(saturate(-7.5, 2.0), (-2.0, true));
        assert_eq!(saturate(1.5, 2.0), (1.5, false));
    }

    #[test]
    fn test_round_dp() {
        assert_relative_eq!(round_dp(5.544445_f64, 4), 5.5444);
        assert_relative_eq!(round_dp(1.23456_f64, 4), 1.2346);
        assert_relative_eq!(round_dp(-0.00004_f64, 4), 0.0);
    }

    #[test]
    fn test_wrap_pi() {
        assert_relative_eq!(wrap_pi(0.5), 0.5);
        assert_relative_eq!(wrap_pi(PI), PI);
        assert_relative_eq!(wrap_pi(-PI), PI);
        assert_relative_eq!(wrap_pi(1.5 * PI), -0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_pi(-1.5 * PI), 0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_pi(5.0 * PI + 0.25), -PI + 0.25, epsilon = 1e-12);
    }
}
