use super::FuzzyEq;
use static_aabb2d_index::IndexableNum;

/// Trait representing a real number coordinate value (e.g. 1.1, -3.5, etc.) that can be fuzzy
/// compared, stored in a spatial index, and shared across worker threads.
///
/// Implemented for `f32` and `f64`, all layer coordinates, tolerances, and angles use this trait.
pub trait Real:
    num_traits::real::Real
    + num_traits::Bounded
    + FuzzyEq
    + std::default::Default
    + std::fmt::Debug
    + std::fmt::Display
    + IndexableNum
    + Send
    + Sync
    + 'static
{
    #[inline]
    fn pi() -> Self {
        Self::from(std::f64::consts::PI).unwrap()
    }

    #[inline]
    fn two() -> Self {
        Self::one() + Self::one()
    }

    #[inline]
    fn ten() -> Self {
        Self::from(10.0).unwrap()
    }

    #[inline]
    fn sqrt_two() -> Self {
        Self::from(std::f64::consts::SQRT_2).unwrap()
    }

    /// Convert a literal `f64` value into `Self`.
    ///
    /// Used for configuration constants, both implementing types can represent every literal used.
    #[inline]
    fn lit(value: f64) -> Self {
        Self::from(value).unwrap()
    }

    /// Lossy conversion to `f64` for reporting (audit records, errors, and logging).
    #[inline]
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl Real for f32 {
    #[inline]
    fn pi() -> Self {
        std::f32::consts::PI
    }

    #[inline]
    fn two() -> Self {
        2.0f32
    }

    #[inline]
    fn ten() -> Self {
        10.0f32
    }

    #[inline]
    fn sqrt_two() -> Self {
        std::f32::consts::SQRT_2
    }

    #[inline]
    fn lit(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Real for f64 {
    #[inline]
    fn pi() -> Self {
        std::f64::consts::PI
    }

    #[inline]
    fn two() -> Self {
        2.0f64
    }

    #[inline]
    fn ten() -> Self {
        10.0f64
    }

    #[inline]
    fn sqrt_two() -> Self {
        std::f64::consts::SQRT_2
    }

    #[inline]
    fn lit(value: f64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}
