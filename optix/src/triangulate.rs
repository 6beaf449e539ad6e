//! Splitting polygon outlines into triangles, to build meshes for walls and obstacles.
//!
//! Triangles are returned as triples of indices into the input outline.

use super::*;

/// Why a [`Triangulation`] doesn't cover its whole polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TriangulationWarning {
    #[error("a polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("no ear found with {remaining} vertices left, the polygon might be self-intersecting or degenerate")]
    NoEar { remaining: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Triangulation {
    pub triangles: Vec<[usize; 3]>,
    /// Set if the triangulation stopped early, `triangles` then only covers part of the polygon.
    pub warning: Option<TriangulationWarning>,
}

impl Triangulation {
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.warning.is_none()
    }

    /// The total area of the triangles, whose vertices are taken from `polygon`.
    #[must_use]
    pub fn area(&self, polygon: &[Vector<2>]) -> Float {
        self.triangles
            .iter()
            .map(|&[a, b, c]| triangle_area(&polygon[a], &polygon[b], &polygon[c]))
            .sum()
    }

    fn stopped(mut self, warning: TriangulationWarning) -> Self {
        log::warn!("{warning}");
        self.warning = Some(warning);
        self
    }
}

/// Positive if `polygon` winds counter-clockwise, negative if clockwise.
#[must_use]
pub fn signed_area(polygon: &[Vector<2>]) -> Float {
    let Some(last) = polygon.last() else {
        return 0.0;
    };

    let mut prev = last;
    let mut twice_area = 0.0;
    for p in polygon {
        twice_area += prev.perp(p);
        prev = p;
    }

    twice_area / 2.0
}

#[inline]
#[must_use]
pub fn triangle_area(a: &Vector<2>, b: &Vector<2>, c: &Vector<2>) -> Float {
    (b - a).perp(&(c - a)).abs() / 2.0
}

#[inline]
fn sign(p: &Vector<2>, a: &Vector<2>, b: &Vector<2>) -> Float {
    (p - b).perp(&(a - b))
}

/// Whether `p` lies inside the triangle `abc`, or on its boundary.
fn in_triangle(p: &Vector<2>, a: &Vector<2>, b: &Vector<2>, c: &Vector<2>) -> bool {
    let d = [sign(p, a, b), sign(p, b, c), sign(p, c, a)];

    let has_neg = d.iter().any(|&d| d < 0.0);
    let has_pos = d.iter().any(|&d| d > 0.0);

    !(has_neg && has_pos)
}

/// Triangulates a simple polygon by ear clipping.
///
/// `polygon` is implicitly closed, and may wind either way.
/// Degenerate inputs give a partial (possibly empty) result, with a [`TriangulationWarning`].
#[must_use]
pub fn triangulate(polygon: &[Vector<2>]) -> Triangulation {
    let n = polygon.len();
    let mut result = Triangulation {
        triangles: Vec::with_capacity(n.saturating_sub(2)),
        warning: None,
    };

    if n < 3 {
        return result.stopped(TriangulationWarning::TooFewVertices(n));
    }

    // convex corners turn clockwise in clockwise polygons, counter-clockwise otherwise
    let orientation = if signed_area(polygon) > 0.0 { -1.0 } else { 1.0 };

    let mut remaining: Vec<usize> = (0..n).collect();

    while remaining.len() > 3 {
        let len = remaining.len();

        let ear = (0..len).find_map(|i| {
            let (prev, curr, next) = (
                remaining[(i + len - 1) % len],
                remaining[i],
                remaining[(i + 1) % len],
            );
            let (a, b, c) = (&polygon[prev], &polygon[curr], &polygon[next]);

            let convex = orientation * (b - a).perp(&(c - a)) < 0.0;

            let empty = || {
                remaining
                    .iter()
                    .filter(|&&j| j != prev && j != curr && j != next)
                    .all(|&j| !in_triangle(&polygon[j], a, b, c))
            };

            (convex && empty()).then_some((i, [prev, curr, next]))
        });

        let Some((i, triangle)) = ear else {
            return result.stopped(TriangulationWarning::NoEar { remaining: len });
        };

        result.triangles.push(triangle);
        remaining.remove(i);
    }

    result
        .triangles
        .push([remaining[0], remaining[1], remaining[2]]);

    result
}

/// Triangulates a convex polygon of `n` vertices, as a fan around its first vertex.
#[must_use]
pub fn fan_triangulate(n: usize) -> Vec<[usize; 3]> {
    (1..n.saturating_sub(1)).map(|i| [0, i, i + 1]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn polygon(points: &[[Float; 2]]) -> Vec<Vector<2>> {
        points.iter().copied().map(Vector2::from).collect()
    }

    fn regular(n: usize, radius: Float) -> Vec<Vector<2>> {
        (0..n)
            .map(|i| {
                let angle = core::f64::consts::TAU * i as Float / n as Float;
                Vector2::new(angle.cos(), angle.sin()) * radius
            })
            .collect()
    }

    #[rstest]
    #[case::counter_clockwise(&[[0., 0.], [1., 0.], [1., 1.], [0., 1.]])]
    #[case::clockwise(&[[0., 0.], [0., 1.], [1., 1.], [1., 0.]])]
    fn unit_square(#[case] points: &[[Float; 2]]) {
        let square = polygon(points);
        let result = triangulate(&square);

        assert!(result.is_complete());
        assert_eq!(result.triangles.len(), 2);
        assert!((result.area(&square) - 1.).abs() < 1e-12);

        // every vertex is used
        let mut used: Vec<usize> = result.triangles.iter().flatten().copied().collect();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, vec![0, 1, 2, 3]);
    }

    #[rstest]
    fn convex_polygons(#[values(3, 5, 8, 17)] n: usize) {
        let outline = regular(n, 2.);
        let result = triangulate(&outline);

        assert!(result.is_complete());
        assert_eq!(result.triangles.len(), n - 2);
        assert!((result.area(&outline) - signed_area(&outline).abs()).abs() < 1e-9);

        let fan = Triangulation {
            triangles: fan_triangulate(n),
            warning: None,
        };
        assert!((fan.area(&outline) - result.area(&outline)).abs() < 1e-9);
    }

    #[test]
    fn concave_polygon() {
        // an arrow head, with a reflex vertex at index 2
        let arrow = polygon(&[[0., 0.], [4., 2.], [1., 2.], [0., 4.]]);
        let result = triangulate(&arrow);

        assert!(result.is_complete());
        assert_eq!(result.triangles.len(), 2);
        assert!((result.area(&arrow) - signed_area(&arrow).abs()).abs() < 1e-12);
    }

    #[test]
    fn too_few_vertices() {
        let result = triangulate(&polygon(&[[0., 0.], [1., 0.]]));

        assert!(result.triangles.is_empty());
        assert_eq!(result.warning, Some(TriangulationWarning::TooFewVertices(2)));
    }

    #[test]
    fn collinear_points_have_no_ear() {
        let line = polygon(&[[0., 0.], [1., 0.], [2., 0.], [3., 0.]]);
        let result = triangulate(&line);

        assert!(result.triangles.is_empty());
        assert_eq!(
            result.warning,
            Some(TriangulationWarning::NoEar { remaining: 4 })
        );
    }

    #[test]
    fn areas() {
        let square = polygon(&[[0., 0.], [2., 0.], [2., 2.], [0., 2.]]);
        assert_eq!(signed_area(&square), 4.);
        let reversed: Vec<_> = square.iter().rev().copied().collect();
        assert_eq!(signed_area(&reversed), -4.);
        assert_eq!(triangle_area(&square[0], &square[1], &square[2]), 2.);
        assert!(fan_triangulate(2).is_empty());
    }
}
