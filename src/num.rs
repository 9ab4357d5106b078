//! Utilities related to numbers.

use num;
use std::fmt;

/// Floating-point precision to use for grid coordinates.
#[allow(non_camel_case_types)]
pub type fgr = f64;

/// Floating point marker trait for easier control over trait bounds.
pub trait BFloat:
    Sync + Send + num::Float + num::cast::FromPrimitive + Default + fmt::Debug + fmt::Display
{
}

impl BFloat for f32 {}
impl BFloat for f64 {}

/// How close a scaled offset must be to an integer to be treated as lying on it.
pub const SNAP_TOLERANCE: fgr = 1e-9;

/// Converts a stored value to grid coordinate precision.
pub fn to_fgr<F: BFloat>(value: F) -> fgr {
    value.to_f64().unwrap_or(fgr::NAN)
}

/// Converts a value in grid coordinate precision to the stored precision.
pub fn from_fgr<F: BFloat>(value: fgr) -> F {
    F::from_f64(value).unwrap_or_else(F::nan)
}

/// Wraps an offset from the lower bound of a periodic interval into `[0, extent)`.
pub fn wrap_periodic_offset(offset: fgr, extent: fgr) -> fgr {
    let wrapped = offset.rem_euclid(extent);
    // `rem_euclid` can return `extent` itself for tiny negative offsets
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// Rounds the given value to the nearest integer if it lies within
/// `SNAP_TOLERANCE` of it, and leaves it unchanged otherwise.
pub fn snap_to_integer(value: fgr) -> fgr {
    let nearest = value.round();
    if (value - nearest).abs() < SNAP_TOLERANCE {
        nearest
    } else {
        value
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn periodic_wrapping_stays_in_range() {
        assert_eq!(wrap_periodic_offset(13.0, 10.0), 3.0);
        assert_eq!(wrap_periodic_offset(-1.0, 10.0), 9.0);
        assert_eq!(wrap_periodic_offset(10.0, 10.0), 0.0);
        assert_eq!(wrap_periodic_offset(-1e-18, 10.0), 0.0);
    }

    #[test]
    fn snapping_only_affects_near_integers() {
        assert_eq!(snap_to_integer(2.999_999_999_999), 3.0);
        assert_eq!(snap_to_integer(2.5), 2.5);
        assert_eq!(snap_to_integer(-0.000_000_000_01), 0.0);
    }
}
