//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Linearly interpolate between `start` and `end` by the fraction `t`.
///
/// `t` is clamped to [0, 1].
pub fn lerp<T>(start: T, end: T, t: T) -> T
where
    T: Float,
{
    start + (end - start) * clamp(&t, &T::zero(), &T::one())
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
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

/// Wrap an angle into the range [-pi, pi).
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t = pi_t + pi_t;

    rem_euclid(angle + pi_t, tau_t) - pi_t
}

/// Get the signed shortest angular distance to travel from `a` to `b`, in the
/// range [-pi, pi).
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float,
{
    wrap_pi(b - a)
}

/// Return the largest absolute value in the slice, or zero if it's empty.
pub fn max_abs<T>(values: &[T]) -> T
where
    T: Float,
{
    values.iter().fold(T::zero(), |acc, v| acc.max(v.abs()))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.25), 2.5);
        assert_eq!(lerp(2.0, -2.0, 0.5), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.5), 10.0);
    }

    #[test]
    fn test_get_ang_dist() {
        assert!((get_ang_dist(0.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((get_ang_dist(1.0, 0.0) + 1.0).abs() < 1e-12);
        assert!((get_ang_dist(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-12);
        assert!((get_ang_dist(-PI + 0.1, PI - 0.1) + 0.2).abs() < 1e-12);
        assert!(get_ang_dist(0.0, 2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_max_abs() {
        assert_eq!(max_abs(&[1.0, -3.0, 2.0]), 3.0);
        assert_eq!(max_abs::<f64>(&[]), 0.0);
    }
}
