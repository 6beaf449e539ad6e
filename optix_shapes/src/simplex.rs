use super::*;

/// A (D-1)-simplex in D-dimensional (euclidean) space
/// (A line segment in 2D space, a triangle in 3D space, etc...)
#[derive(Clone, Debug, PartialEq)]
pub struct Simplex<const D: usize> {
    /// The plane this simplex belongs to, its starting point is the first vertex.
    plane: HyperplaneBasis<D>,
    normal: Direction<D>,
}

pub type Triangle = Simplex<3>;
pub type LineSegment = Simplex<2>;

impl<const D: usize> Simplex<D> {
    /// Attempts to create a `D-1`-simplex using an array of `D` affinely independent points.
    ///
    /// Returns `None` if they are affinely dependent.
    ///
    /// # Panics
    ///
    /// if `D == 0`
    #[must_use]
    pub fn try_new(points: [impl Into<Vector<D>>; D]) -> Option<Self> {
        let mut vectors: [Vector<D>; D] = points.map(Into::into);
        let (v0, basis) = vectors.split_first_mut()?;

        basis.iter_mut().for_each(|v| *v -= *v0);

        HyperplaneBasis::try_new(vectors).map(|(plane, orthonormalised)| Self {
            plane,
            normal: orthonormalised.normal(),
        })
    }

    #[inline]
    #[must_use]
    pub const fn inner_plane(&self) -> &HyperplaneBasis<D> {
        &self.plane
    }

    #[inline]
    #[must_use]
    pub const fn normal(&self) -> &Direction<D> {
        &self.normal
    }

    /// Returns the vertices of this simplex.
    #[must_use]
    pub fn vertices(&self) -> [Vector<D>; D] {
        let mut vertices = *self.plane.vectors_raw();

        if let Some((v0, vectors)) = vertices.split_first_mut() {
            vectors.iter_mut().for_each(|v| *v += *v0);
        }

        vertices
    }

    /// Returns the distance `t` such that [`ray.at(t)`](Ray::at) lies in `self`.
    #[must_use]
    pub fn intersection(&self, ray: &Ray<D>) -> Option<Float> {
        let coords = self.plane.intersection_coordinates(ray)?;
        let (&distance, plane_coords) = coords.as_slice().split_first()?;

        let mut sum = 0.0;
        for &coord in plane_coords {
            if coord < 0.0 {
                return None;
            }
            sum += coord;
        }

        (sum <= 1.0).then_some(distance)
    }
}

impl<const D: usize> Shape<D> for Simplex<D> {
    fn for_each_intersection(&self, ray: &Ray<D>, f: &mut dyn FnMut(Float, Direction<D>)) {
        if let Some(t) = self.intersection(ray) {
            f(t, self.normal);
        }
    }
}
