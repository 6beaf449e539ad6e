use super::*;

use core::ops::Deref;

use nalgebra::SMatrix;

/// Relative size under which a Gram-Schmidt residual counts as zero.
const FREE_FAMILY_EPSILON: Float = 1e-9;

/// An affine hyperplane, stored as a starting point and a basis of `D - 1` vectors.
///
/// `D` must be non-zero, or unexpected panics could happen.
#[derive(Clone, Debug, PartialEq)]
pub struct HyperplaneBasis<const D: usize> {
    /// See [`Self::try_new`] for info on the layout of this field.
    vectors: [Vector<D>; D],
}

impl<const D: usize> HyperplaneBasis<D> {
    /// The first element of `vectors` is the plane's starting point.
    ///
    /// The remaining `D - 1` vectors are a free family spanning the plane's direction.
    ///
    /// Returns `None` if the family isn't free, otherwise, the plane along with
    /// the same plane, but with an orthonormal basis.
    #[must_use]
    pub fn try_new(vectors: [Vector<D>; D]) -> Option<(Self, HyperplaneBasisOrtho<D>)> {
        let mut orthonormalized = vectors;

        // Gram-Schmidt, a residual that small relative to its vector
        // is roundoff, the family isn't free.
        for i in 1..D {
            let (done, rest) = orthonormalized.split_at_mut(i);
            let v = &mut rest[0];

            for e in &done[1..] {
                let projection = e * e.dot(&*v);
                *v -= projection;
            }

            *v = Unit::try_new(*v, vectors[i].norm() * FREE_FAMILY_EPSILON)?.into_inner();
        }

        Some((
            Self { vectors },
            HyperplaneBasisOrtho {
                plane: Self {
                    vectors: orthonormalized,
                },
            },
        ))
    }

    /// Returns a vector `[t, mu_1, ..., mu_(d-1)]` such that
    ///
    /// `ray.at(t) = v0 + sum for k in [1 ; d-1] mu_k * v_k`
    ///
    /// where `[v_1, ..., v_(d-1)]` is [`self.basis()`](Self::basis), if `ray` isn't
    /// parallel to this plane.
    #[must_use]
    pub fn intersection_coordinates(&self, ray: &Ray<D>) -> Option<Vector<D>> {
        let mut a = SMatrix::<Float, D, D>::from_columns(&self.vectors);
        a.set_column(0, ray.dir.as_ref());

        // a now contains a^-1
        a.try_inverse_mut().then(|| {
            let mut v = a * (ray.origin - self.v0());
            v[0] = -v[0];
            v
        })
    }

    /// The starting point of the plane.
    ///
    /// # Panics
    ///
    /// if `D == 0`
    #[inline]
    #[must_use]
    pub const fn v0(&self) -> &Vector<D> {
        &self.vectors[0]
    }

    /// The basis of the plane's direction, of length `D - 1`.
    ///
    /// # Panics
    ///
    /// if `D == 0`
    #[inline]
    #[must_use]
    pub fn basis(&self) -> &[Vector<D>] {
        &self.vectors[1..]
    }

    #[inline]
    #[must_use]
    pub const fn vectors_raw(&self) -> &[Vector<D>; D] {
        &self.vectors
    }
}

/// A hyperplane, like [`HyperplaneBasis`], but the basis stored is guaranteed
/// to be orthonormal, enabling projections.
#[derive(Clone, Debug, PartialEq)]
pub struct HyperplaneBasisOrtho<const D: usize> {
    plane: HyperplaneBasis<D>,
}

impl<const D: usize> Deref for HyperplaneBasisOrtho<D> {
    type Target = HyperplaneBasis<D>;

    fn deref(&self) -> &Self::Target {
        &self.plane
    }
}

impl<const D: usize> HyperplaneBasisOrtho<D> {
    /// Returns the orthogonal projection of `v` onto the plane's direction.
    #[inline]
    #[must_use]
    pub fn project(&self, v: &Vector<D>) -> Vector<D> {
        self.basis().iter().map(|e| e * v.dot(e)).sum()
    }

    /// A unit vector orthogonal to the plane.
    ///
    /// Among the canonical basis vectors, the one furthest from the plane's direction
    /// is orthogonalized, so the result is well conditioned.
    #[must_use]
    pub fn normal(&self) -> Direction<D> {
        let (normal, _) = (0..D)
            .map(|i| {
                let e = Vector::<D>::from_fn(|r, _| if r == i { 1.0 } else { 0.0 });
                let n = e - self.project(&e);
                let norm = n.norm_squared();
                (n, norm)
            })
            .fold((Vector::zeros(), 0.0), |best, current| {
                if current.1 > best.1 {
                    current
                } else {
                    best
                }
            });

        Unit::new_normalize(normal)
    }
}
