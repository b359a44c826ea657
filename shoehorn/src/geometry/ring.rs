use crate::core::{
    math::{signed_area, winding_number, Vector2},
    traits::Real,
};
use static_aabb2d_index::AABB;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents the orientation of a ring.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RingOrientation {
    /// Ring is directionally clockwise (polygon on the right when traversed).
    Clockwise,
    /// Ring is directionally counter clockwise.
    CounterClockwise,
    /// Ring has zero signed area.
    Degenerate,
}

/// Closed ring of vertices, the first vertex is repeated as the last vertex.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Ring<T = f64> {
    vertices: Vec<Vector2<T>>,
}

impl<T> Ring<T>
where
    T: Real,
{
    /// Create a ring from `vertices`, appending the closing vertex if it is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shoehorn::core::math::*;
    /// # use shoehorn::geometry::*;
    /// let ring = Ring::new(vec![
    ///     Vector2::new(0.0, 0.0),
    ///     Vector2::new(0.0, 2.0),
    ///     Vector2::new(3.0, 2.0),
    ///     Vector2::new(3.0, 0.0),
    /// ]);
    /// assert_eq!(ring.vertices().len(), 5);
    /// assert_eq!(ring.vertex_count(), 4);
    /// assert_eq!(ring.signed_area(), -6.0);
    /// assert_eq!(ring.orientation(), RingOrientation::Clockwise);
    /// ```
    pub fn new(mut vertices: Vec<Vector2<T>>) -> Self {
        if let (Some(&first), Some(&last)) = (vertices.first(), vertices.last()) {
            if first != last || vertices.len() == 1 {
                vertices.push(first);
            }
        }

        Self { vertices }
    }

    /// All vertices including the closing vertex.
    #[inline]
    pub fn vertices(&self) -> &[Vector2<T>] {
        &self.vertices
    }

    /// Number of distinct vertices (closing vertex not counted).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True if the first and last vertex are exactly equal.
    #[inline]
    pub fn is_closed(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) => self.vertices.len() > 1 && first == last,
            _ => false,
        }
    }

    /// Signed area, negative for clockwise rings.
    #[inline]
    pub fn signed_area(&self) -> T {
        signed_area(&self.vertices)
    }

    #[inline]
    pub fn area(&self) -> T {
        self.signed_area().abs()
    }

    pub fn orientation(&self) -> RingOrientation {
        let a = self.signed_area();
        if a.fuzzy_eq_zero() {
            RingOrientation::Degenerate
        } else if a < T::zero() {
            RingOrientation::Clockwise
        } else {
            RingOrientation::CounterClockwise
        }
    }

    /// Axis aligned bounding box, `None` for an empty ring.
    pub fn extents(&self) -> Option<AABB<T>> {
        let first = self.vertices.first()?;
        let mut result = AABB::new(first.x, first.y, first.x, first.y);
        for v in self.vertices.iter().skip(1) {
            if v.x < result.min_x {
                result.min_x = v.x;
            } else if v.x > result.max_x {
                result.max_x = v.x;
            }

            if v.y < result.min_y {
                result.min_y = v.y;
            } else if v.y > result.max_y {
                result.max_y = v.y;
            }
        }

        Some(result)
    }

    /// Bounding box area, `(max_x - min_x) * (max_y - min_y)`.
    pub fn bounding_box_area(&self) -> T {
        self.extents()
            .map(|e| (e.max_x - e.min_x) * (e.max_y - e.min_y))
            .unwrap_or_else(T::zero)
    }

    /// Winding number of this ring around `point`, zero if `point` is outside.
    #[inline]
    pub fn winding_number(&self, point: Vector2<T>) -> i32 {
        winding_number(&self.vertices, point)
    }
}
