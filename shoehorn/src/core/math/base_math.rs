use super::Vector2;
use crate::core::traits::Real;

/// Returns the (min, max) values from `v1` and `v2`.
///
/// # Examples
///
/// ```
/// # use shoehorn::core::math::*;
/// let (min_val, max_val) = min_max(8, 4);
/// assert_eq!(min_val, 4);
/// assert_eq!(max_val, 8);
/// ```
#[inline]
pub fn min_max<T>(v1: T, v2: T) -> (T, T)
where
    T: PartialOrd,
{
    if v1 < v2 {
        (v1, v2)
    } else {
        (v2, v1)
    }
}

/// Distance squared between the points `p0` and `p1`.
#[inline]
pub fn dist_squared<T>(p0: Vector2<T>, p1: Vector2<T>) -> T
where
    T: Real,
{
    let d = p0 - p1;
    d.dot(d)
}

/// Perpendicular distance from `point` to the infinite line through `p0` and `p1`.
///
/// This is the Douglas-Peucker distance measure. If `p0` and `p1` coincide (the chord of a closed
/// loop) the plain distance from `point` to `p0` is returned.
///
/// # Examples
///
/// ```
/// # use shoehorn::core::math::*;
/// # use shoehorn::core::traits::*;
/// let p0 = Vector2::new(0.0f64, 0.0);
/// let p1 = Vector2::new(2.0, 0.0);
/// assert!(perpendicular_distance(p0, p1, Vector2::new(1.0, 0.001)).fuzzy_eq(0.001));
/// // measured to the line, not the segment
/// assert!(perpendicular_distance(p0, p1, Vector2::new(5.0, -3.0)).fuzzy_eq(3.0));
/// // degenerate chord
/// assert!(perpendicular_distance(p0, p0, Vector2::new(3.0, 4.0)).fuzzy_eq(5.0));
/// ```
#[inline]
pub fn perpendicular_distance<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> T
where
    T: Real,
{
    let v = p1 - p0;
    let len = v.length();
    if len == T::zero() {
        return (point - p0).length();
    }

    v.perp_dot(point - p0).abs() / len
}

/// Returns the closest point on the line segment from `p0` to `p1` to the `point` given.
#[inline]
pub fn line_seg_closest_point<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> Vector2<T>
where
    T: Real,
{
    // Dot product used to find angles
    // See: http://geomalgorithms.com/a02-_lines.html
    let v = p1 - p0;
    let w = point - p0;
    let c1 = w.dot(v);
    if c1 < T::fuzzy_epsilon() {
        return p0;
    }

    let c2 = v.length_squared();
    if c2 < c1 + T::fuzzy_epsilon() {
        return p1;
    }

    let b = c1 / c2;
    p0 + v.scale(b)
}

/// Parametric position (`0..=1`) of the projection of `point` onto the segment `p0` to `p1`.
///
/// Used to order split points along an edge. Returns zero for a zero length segment.
#[inline]
pub fn seg_parametric<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> T
where
    T: Real,
{
    let v = p1 - p0;
    let c2 = v.length_squared();
    if c2 == T::zero() {
        return T::zero();
    }

    num_traits::clamp((point - p0).dot(v) / c2, T::zero(), T::one())
}

/// Turning angle in radians at `vertex` formed by the edges to `prev` and `next`.
///
/// `PI` is a straight continuation, values near zero are spikes that fold back on themselves.
///
/// # Examples
///
/// ```
/// # use shoehorn::core::math::*;
/// # use shoehorn::core::traits::*;
/// use std::f64::consts::PI;
/// let straight = vertex_angle(
///     Vector2::new(0.0f64, 0.0),
///     Vector2::new(1.0, 0.0),
///     Vector2::new(2.0, 0.0),
/// );
/// assert!(straight.fuzzy_eq(PI));
///
/// let corner = vertex_angle(
///     Vector2::new(0.0f64, 0.0),
///     Vector2::new(1.0, 0.0),
///     Vector2::new(1.0, 1.0),
/// );
/// assert!(corner.fuzzy_eq(PI / 2.0));
/// ```
#[inline]
pub fn vertex_angle<T>(prev: Vector2<T>, vertex: Vector2<T>, next: Vector2<T>) -> T
where
    T: Real,
{
    (prev - vertex).angle_to(next - vertex)
}

/// Helper function to avoid repeating code for is_left checks.
#[inline]
fn perp_dot_test_value<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> T
where
    T: Real,
{
    (p1.x - p0.x) * (point.y - p0.y) - (p1.y - p0.y) * (point.x - p0.x)
}

/// Returns true if `point` is left of a direction vector.
///
/// Direction vector is defined as `p1 - p0`.
///
/// # Examples
///
/// ```
/// # use shoehorn::core::math::*;
/// let p0 = Vector2::new(1.0, 1.0);
/// let p1 = Vector2::new(2.0, 2.0);
/// assert!(is_left(p0, p1, Vector2::new(0.0, 1.0)));
/// assert!(!is_left(p0, p1, Vector2::new(1.0, 0.0)));
/// ```
#[inline]
pub fn is_left<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> bool
where
    T: Real,
{
    perp_dot_test_value(p0, p1, point) > T::zero()
}

/// Winding number of the closed vertex loop `points` around `point`.
///
/// `points` is a closed ring (first vertex equal to last). Counter clockwise loops give positive
/// winding numbers, clockwise loops negative, zero means `point` is outside.
///
/// # Examples
///
/// ```
/// # use shoehorn::core::math::*;
/// let square = [
///     Vector2::new(0.0, 0.0),
///     Vector2::new(4.0, 0.0),
///     Vector2::new(4.0, 4.0),
///     Vector2::new(0.0, 4.0),
///     Vector2::new(0.0, 0.0),
/// ];
/// assert_eq!(winding_number(&square, Vector2::new(2.0, 2.0)), 1);
/// assert_eq!(winding_number(&square, Vector2::new(5.0, 2.0)), 0);
/// let mut cw = square;
/// cw.reverse();
/// assert_eq!(winding_number(&cw, Vector2::new(2.0, 2.0)), -1);
/// ```
pub fn winding_number<T>(points: &[Vector2<T>], point: Vector2<T>) -> i32
where
    T: Real,
{
    let mut winding = 0;
    for w in points.windows(2) {
        let (v1, v2) = (w[0], w[1]);
        if v1.y <= point.y {
            if v2.y > point.y && is_left(v1, v2, point) {
                // left and upward crossing
                winding += 1;
            }
        } else if v2.y <= point.y && !is_left(v1, v2, point) {
            // right and downward crossing
            winding -= 1;
        }
    }

    winding
}

/// Signed shoelace area of a closed vertex loop (first vertex equal to last).
///
/// Positive for counter clockwise loops, negative for clockwise loops.
pub fn signed_area<T>(points: &[Vector2<T>]) -> T
where
    T: Real,
{
    let double_area = points
        .windows(2)
        .fold(T::zero(), |acc, w| acc + w[0].perp_dot(w[1]));

    double_area / T::two()
}
