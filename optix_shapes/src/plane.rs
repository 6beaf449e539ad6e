use super::*;

/// A parallelotope-shaped (hyper)plane: a line segment in 2D, a parallelogram in 3D...
///
/// It's made of the points `center + sum mu_k * v_k` with `|mu_k| <= 1`, where `v_k` is
/// one of the `D - 1` half-extent vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct Parallelotope<const D: usize> {
    plane: HyperplaneBasis<D>,
    normal: Direction<D>,
}

impl<const D: usize> Parallelotope<D> {
    /// The first vector of `vectors` is the center, the remaining ones the half-extents.
    ///
    /// Returns `None` if the half-extents aren't linearly independent.
    #[must_use]
    pub fn try_new(vectors: [Vector<D>; D]) -> Option<Self> {
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

    /// The `2^(D-1)` corners of this parallelotope.
    pub fn vertices(&self) -> impl Iterator<Item = Vector<D>> + '_ {
        let basis = self.plane.basis();
        let v0 = *self.plane.v0();

        (0..1usize << (D - 1)).map(move |i| {
            let mut acc = [Vector::zeros(); 2];

            basis
                .iter()
                .enumerate()
                // `v` goes in the `minus` slot if the `j`th bit of `i` is set
                .for_each(|(j, v)| acc[i >> j & 1] += v);

            let [plus, minus] = acc;

            v0 + plus - minus
        })
    }

    #[must_use]
    pub fn intersection(&self, ray: &Ray<D>) -> Option<Float> {
        let coords = self.plane.intersection_coordinates(ray)?;
        let (&distance, plane_coords) = coords.as_slice().split_first()?;

        plane_coords
            .iter()
            .all(|mu| mu.abs() <= 1.0)
            .then_some(distance)
    }
}

impl<const D: usize> Shape<D> for Parallelotope<D> {
    fn for_each_intersection(&self, ray: &Ray<D>, f: &mut dyn FnMut(Float, Direction<D>)) {
        if let Some(t) = self.intersection(ray) {
            f(t, self.normal);
        }
    }
}
