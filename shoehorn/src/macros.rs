/// Macro used for test assertions.
#[doc(hidden)]
#[macro_export]
macro_rules! assert_fuzzy_eq {
    ($left:expr, $right:expr) => {{
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(left_val.fuzzy_eq(*right_val)) {
                    panic!(
                        r#"assertion failed: `left.fuzzy_eq(right)`
  left: `{:?}`,
 right: `{:?}`"#,
                        &*left_val, &*right_val
                    )
                }
            }
        }
    }};
    ($left:expr, $right:expr, $eps:expr) => {{
        match (&$left, &$right, &$eps) {
            (left_val, right_val, eps_val) => {
                if !(left_val.fuzzy_eq_eps(*right_val, *eps_val)) {
                    panic!(
                        r#"assertion failed: `left.fuzzy_eq_eps(right, eps)`
  left: `{:?}`,
 right: `{:?}`
 eps: `{:?}`"#,
                        &*left_val, &*right_val, &*eps_val
                    )
                }
            }
        }
    }};
}

/// Macro used for implementing the construction macros. Used for extracting macro repetition
/// count for reserving capacity up front.
#[doc(hidden)]
#[macro_export]
macro_rules! replace_expr {
    ($_t:tt $sub:expr) => {
        $sub
    };
}

/// Construct a vertex chain (`Vec<Vector2<_>>`) from a list of (x, y) tuples.
///
/// # Examples
///
/// ```
/// # use shoehorn::chain;
/// # use shoehorn::core::math::*;
/// let c = chain![(0.0, 0.0), (1.0, 0.001), (2.0, 0.0)];
/// assert_eq!(c.len(), 3);
/// assert_eq!(c[1], Vector2::new(1.0, 0.001));
/// ```
#[macro_export]
macro_rules! chain {
    ($( $x:expr ),* $(,)?) => {
        {
            let size = <[()]>::len(&[$($crate::replace_expr!(($x) ())),*]);
            let mut c = ::std::vec::Vec::with_capacity(size);
            $(
                c.push($crate::core::math::Vector2::new($x.0, $x.1));
            )*
            c
        }
    };
}

/// Construct a closed [Ring](crate::geometry::Ring) from a list of (x, y) tuples, the closing
/// vertex is added automatically.
///
/// # Examples
///
/// ```
/// # use shoehorn::ring;
/// let r = ring![(0.0, 0.0), (4.0, 0.0), (4.0, 3.0)];
/// assert!(r.is_closed());
/// assert_eq!(r.vertex_count(), 3);
/// assert_eq!(r.area(), 6.0);
/// ```
#[macro_export]
macro_rules! ring {
    ($( $x:expr ),* $(,)?) => {
        $crate::geometry::Ring::new($crate::chain![$($x),*])
    };
}
