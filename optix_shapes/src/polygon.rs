use super::*;

use optix::triangulate::{triangulate, Triangulation};

/// A closed polygonal outline, made of line segments.
///
/// Only meaningful in 2D: [`Polygon::try_new`] refuses any other dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon<const D: usize> {
    vertices: Vec<Vector<D>>,
    edges: Vec<Simplex<D>>,
}

impl<const D: usize> Polygon<D> {
    /// Returns `None` if `D != 2`, if there are fewer than 3 vertices,
    /// or if two consecutive vertices are equal.
    #[must_use]
    pub fn try_new(vertices: impl IntoIterator<Item = impl Into<Vector<D>>>) -> Option<Self> {
        if D != 2 {
            return None;
        }

        let vertices: Vec<Vector<D>> = vertices.into_iter().map(Into::into).collect();

        if vertices.len() < 3 {
            return None;
        }

        let next = vertices.iter().cycle().skip(1);
        let edges: Vec<Simplex<D>> = vertices
            .iter()
            .zip(next)
            .map(|(&a, &b)| Simplex::try_new(core::array::from_fn(|i| if i == 0 { a } else { b })))
            .collect::<Option<_>>()?;

        Some(Self { vertices, edges })
    }

    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Vector<D>] {
        &self.vertices
    }

    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[Simplex<D>] {
        &self.edges
    }

    /// Splits the inside of this outline into triangles, to build a mesh.
    ///
    /// Check [`Triangulation::warning`] for outlines that couldn't be fully split.
    #[must_use]
    pub fn triangulate(&self) -> Triangulation {
        let outline: Vec<Vector<2>> = self
            .vertices
            .iter()
            .map(|v| Vector::<2>::new(v[0], v[1]))
            .collect();

        triangulate(&outline)
    }
}

impl<const D: usize> Shape<D> for Polygon<D> {
    fn for_each_intersection(&self, ray: &Ray<D>, f: &mut dyn FnMut(Float, Direction<D>)) {
        for edge in &self.edges {
            edge.for_each_intersection(ray, f);
        }
    }
}
