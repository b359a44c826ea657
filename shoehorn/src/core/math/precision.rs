use super::Vector2;
use crate::core::traits::Real;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer grid key of a rounded coordinate.
///
/// Two coordinates are the same node exactly when their keys are equal. Ordering is by x then y,
/// giving a deterministic iteration order for maps keyed by position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoordKey {
    pub x: i64,
    pub y: i64,
}

/// Fixed decimal precision derived from the linear resolution of a layer.
///
/// # Examples
///
/// ```
/// # use shoehorn::core::math::*;
/// # use shoehorn::core::traits::*;
/// let precision = Precision::<f64>::from_resolution(0.0001);
/// assert_eq!(precision.decimals(), 4);
/// assert!(precision.unit().fuzzy_eq(0.0001));
/// assert!(precision.round(1.234567).fuzzy_eq(1.2346));
///
/// let a = precision.key(Vector2::new(10.00001, 5.0)).unwrap();
/// let b = precision.key(Vector2::new(9.99999, 5.00002)).unwrap();
/// assert_eq!(a, b);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Precision<T = f64> {
    decimals: i32,
    scale: T,
}

impl<T> Precision<T>
where
    T: Real,
{
    /// Precision for a layer resolution, `decimals = floor(-log10(resolution))`.
    ///
    /// `resolution` must be finite and positive (validated by the options).
    pub fn from_resolution(resolution: T) -> Self {
        let decimals = (-resolution.as_f64().log10() + 1e-9).floor() as i32;
        Self::with_decimals(decimals)
    }

    /// Precision rounding to `decimals` decimal places.
    pub fn with_decimals(decimals: i32) -> Self {
        Self {
            decimals,
            scale: T::ten().powi(decimals),
        }
    }

    #[inline]
    pub fn decimals(&self) -> i32 {
        self.decimals
    }

    /// One rounding unit, `10^-decimals`.
    #[inline]
    pub fn unit(&self) -> T {
        T::one() / self.scale
    }

    #[inline]
    pub fn round(&self, value: T) -> T {
        (value * self.scale).round() / self.scale
    }

    #[inline]
    pub fn round_vec(&self, v: Vector2<T>) -> Vector2<T> {
        Vector2::new(self.round(v.x), self.round(v.y))
    }

    /// Grid key of `v`, `None` if a component is not finite or does not fit an `i64`.
    #[inline]
    pub fn key(&self, v: Vector2<T>) -> Option<CoordKey> {
        let x = (v.x * self.scale).round().to_i64()?;
        let y = (v.y * self.scale).round().to_i64()?;
        Some(CoordKey { x, y })
    }

    /// Coordinate a key stands for.
    #[inline]
    pub fn coord(&self, key: CoordKey) -> Vector2<T> {
        let x = T::from(key.x).unwrap_or_else(T::zero);
        let y = T::from(key.y).unwrap_or_else(T::zero);
        Vector2::new(x / self.scale, y / self.scale)
    }
}
