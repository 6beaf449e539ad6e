use super::*;

use arrayvec::ArrayVec;

/// All points at a certain distance (`radius`) from a certain point (`center`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere<const D: usize> {
    pub center: Vector<D>,
    radius: Float,
    radius_sq: Float,
}

impl<const D: usize> Sphere<D> {
    /// Returns `None` if `radius` isn't a positive, finite number.
    #[must_use]
    pub fn try_new(center: impl Into<Vector<D>>, radius: Float) -> Option<Self> {
        (radius.is_finite() && radius > 0.0).then(|| Self {
            center: center.into(),
            radius,
            radius_sq: radius * radius,
        })
    }

    #[inline]
    #[must_use]
    pub const fn radius(&self) -> Float {
        self.radius
    }

    /// Returns up to two pairs `(t, n)` (`t` may be negative) such that [`ray.at(t)`](Ray::at)
    /// lies on `self`, and `n` is the outward normal there.
    #[must_use]
    pub fn intersections(&self, ray: &Ray<D>) -> ArrayVec<(Float, Direction<D>), 2> {
        // substituting `V` for `P + t * D` in the sphere equation:
        // `||V - C||^2 = r^2` results in a quadratic equation in `t`.
        let v = ray.origin - self.center;

        let b = v.dot(ray.dir.as_ref());
        let c = v.norm_squared() - self.radius_sq;

        let delta = b.mul_add(b, -c);

        if delta < 0.0 {
            return ArrayVec::new();
        }

        let root = delta.sqrt();

        [-b - root, -b + root]
            .into_iter()
            .map(|t| {
                // `ray.at(t)` is on the sphere, `||ray.at(t) - center|| = radius`
                let n = Unit::new_unchecked((ray.at(t) - self.center).unscale(self.radius));
                (t, n)
            })
            .collect()
    }
}

impl<const D: usize> Shape<D> for Sphere<D> {
    fn for_each_intersection(&self, ray: &Ray<D>, f: &mut dyn FnMut(Float, Direction<D>)) {
        for (t, n) in self.intersections(ray) {
            f(t, n);
        }
    }
}
