//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Limit a value to the range `[min, max]`.
///
/// Unlike `f64::clamp` a NaN input is mapped onto `min` so the result is
/// always inside the range.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    if value.is_nan() {
        return min
    }

    value.max(min).min(max)
}

/// Get the direction (-1, 0 or +1) of a value.
///
/// Unlike `signum` zero (and NaN) map to 0.
pub fn direction<T>(value: T) -> i8
where
    T: Float
{
    if value > T::zero() {
        1
    }
    else if value < T::zero() {
        -1
    }
    else {
        0
    }
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_360<T>(value: T) -> T
where
    T: Float
{
    let full = T::from(360.0).unwrap_or_else(T::zero);
    let r = rem_euclid(value, full);

    // Round-off can return the modulus itself for tiny negative inputs
    if r >= full { T::zero() } else { r }
}

/// Get the signed angular distance from `a` to `b` in degrees.
///
/// This function returns the shortest signed distance accounting for wrapping
/// at 360, in the range (-180, 180].
pub fn get_ang_dist_deg<T>(a: T, b: T) -> T
where
    T: Float
{
    let half = T::from(180.0).unwrap_or_else(T::zero);
    let full = half + half;

    let mut d = rem_euclid(b - a, full);
    if d > half {
        d = d - full;
    }

    d
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `self` is much smaller than `rhs.abs()` in
/// magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}
