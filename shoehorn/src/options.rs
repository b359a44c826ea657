use crate::{
    core::{math::Precision, traits::Real},
    error::ShoehornError,
    reassemble::OuterRingRule,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration of a [Shoehorn](crate::Shoehorn) run.
///
/// # Examples
///
/// ```
/// # use shoehorn::*;
/// # use shoehorn::core::traits::*;
/// let options = ShoehornOptions::<f64>::new(10.0);
/// assert!(options.validate().is_ok());
/// assert_eq!(options.precision().decimals(), 4);
/// assert!(options.effective_simplify_tolerance().fuzzy_eq(0.0001));
/// assert!(options.effective_boundary_tolerance().fuzzy_eq(0.001 * 2f64.sqrt()));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ShoehornOptions<T = f64> {
    /// Vertices and node arc pairs with a smaller angle are removed or realigned.
    pub min_angle_degrees: T,
    /// Linear resolution of the layer, coordinates are rounded to
    /// `floor(-log10(xy_resolution))` decimals.
    pub xy_resolution: T,
    /// Douglas-Peucker tolerance, one rounding unit if `None`.
    pub simplify_tolerance: Option<T>,
    /// Distance within which two boundary points are the same node, `10 * xy_resolution * sqrt(2)`
    /// if `None`.
    pub boundary_tolerance: Option<T>,
    /// Arcs with an outside polygon are never simplified or tweezed.
    pub freeze_outer_boundary: bool,
    pub outer_ring_rule: OuterRingRule,
    /// Worker pool size, derived from the available parallelism and area count if `None`.
    pub worker_threads: Option<usize>,
}

impl<T> Default for ShoehornOptions<T>
where
    T: Real,
{
    fn default() -> Self {
        Self::new(T::ten())
    }
}

impl<T> ShoehornOptions<T>
where
    T: Real,
{
    pub fn new(min_angle_degrees: T) -> Self {
        Self {
            min_angle_degrees,
            xy_resolution: T::lit(0.0001),
            simplify_tolerance: None,
            boundary_tolerance: None,
            freeze_outer_boundary: true,
            outer_ring_rule: OuterRingRule::default(),
            worker_threads: None,
        }
    }

    /// Check every setting, returns the first invalid one.
    pub fn validate(&self) -> Result<(), ShoehornError> {
        let invalid = |name: &'static str, reason: String| {
            Err(ShoehornError::InvalidOption { name, reason })
        };

        if !self.min_angle_degrees.as_f64().is_finite()
            || self.min_angle_degrees < T::zero()
            || self.min_angle_degrees >= T::lit(180.0)
        {
            return invalid(
                "min_angle_degrees",
                format!("{} is not in [0, 180)", self.min_angle_degrees),
            );
        }

        if !self.xy_resolution.as_f64().is_finite() || self.xy_resolution <= T::zero() {
            return invalid(
                "xy_resolution",
                format!("{} is not a positive length", self.xy_resolution),
            );
        }

        for (name, value) in [
            ("simplify_tolerance", self.simplify_tolerance),
            ("boundary_tolerance", self.boundary_tolerance),
        ] {
            if let Some(v) = value {
                if !v.as_f64().is_finite() || v < T::zero() {
                    return invalid(name, format!("{v} is not a non negative length"));
                }
            }
        }

        if self.worker_threads == Some(0) {
            return invalid("worker_threads", "must be at least 1".to_string());
        }

        Ok(())
    }

    #[inline]
    pub fn precision(&self) -> Precision<T> {
        Precision::from_resolution(self.xy_resolution)
    }

    #[inline]
    pub fn effective_simplify_tolerance(&self) -> T {
        self.simplify_tolerance
            .unwrap_or_else(|| self.precision().unit())
    }

    #[inline]
    pub fn effective_boundary_tolerance(&self) -> T {
        self.boundary_tolerance
            .unwrap_or_else(|| T::ten() * self.xy_resolution * T::sqrt_two())
    }

    #[inline]
    pub fn min_angle_radians(&self) -> T {
        self.min_angle_degrees.to_radians()
    }

    /// Worker threads for a batch of `areas` survey areas,
    /// `max(1, min(available_parallelism - 1, areas))` unless set explicitly.
    pub fn worker_count(&self, areas: usize) -> usize {
        if let Some(n) = self.worker_threads {
            return n.max(1);
        }

        let available = std::thread::available_parallelism().map_or(1, |n| n.get());
        available.saturating_sub(1).min(areas).max(1)
    }
}
