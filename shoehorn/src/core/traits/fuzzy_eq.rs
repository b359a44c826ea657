use num_traits::Float;

/// Approximate equality for floating point values.
///
/// Layer coordinates are rounded to a fixed decimal precision and compared exactly through their
/// grid keys. Derived values (distances, angles, areas) still carry floating point error and are
/// compared through this trait instead.
///
/// The default epsilon is the square root of the machine epsilon of the type, about `1.5e-8` for
/// `f64` and `3.5e-4` for `f32`.
///
/// # Examples
///
/// ```
/// # use shoehorn::core::traits::*;
/// let a = 0.1f64 + 0.2;
/// assert_ne!(a, 0.3);
/// assert!(a.fuzzy_eq(0.3));
/// assert!((a - 0.3).fuzzy_eq_zero());
/// assert!(!1.0e-6f64.fuzzy_eq_zero());
/// ```
pub trait FuzzyEq: Sized + Copy {
    fn fuzzy_epsilon() -> Self;

    /// True if `|self| < fuzzy_epsilon`.
    fn fuzzy_eq_zero_eps(&self, fuzzy_epsilon: Self) -> bool;

    /// True if `|self - other| < fuzzy_epsilon`.
    fn fuzzy_eq_eps(&self, other: Self, fuzzy_epsilon: Self) -> bool;

    #[inline]
    fn fuzzy_eq_zero(&self) -> bool {
        self.fuzzy_eq_zero_eps(Self::fuzzy_epsilon())
    }

    #[inline]
    fn fuzzy_eq(&self, other: Self) -> bool {
        self.fuzzy_eq_eps(other, Self::fuzzy_epsilon())
    }
}

impl<T> FuzzyEq for T
where
    T: Float,
{
    #[inline]
    fn fuzzy_epsilon() -> Self {
        T::epsilon().sqrt()
    }

    #[inline]
    fn fuzzy_eq_zero_eps(&self, fuzzy_epsilon: Self) -> bool {
        self.abs() < fuzzy_epsilon
    }

    #[inline]
    fn fuzzy_eq_eps(&self, other: Self, fuzzy_epsilon: Self) -> bool {
        (*self - other).fuzzy_eq_zero_eps(fuzzy_epsilon)
    }
}
