//! Geometry for `optix` simulations that don't run inside a host with its own
//! collision system. Every [`Body`] pairs a [`Shape`] with the surface it is made of,
//! and a [`Scene`] finds the closest one by testing them all.

mod hyperplane;
mod plane;
mod polygon;
mod simplex;
mod sphere;

pub use hyperplane::*;
pub use plane::*;
pub use polygon::*;
pub use simplex::*;
pub use sphere::*;

use nalgebra::Unit;
use optix::*;

/// Anything a laser can hit.
pub trait Shape<const D: usize> {
    /// Calls `f` with the distance along `ray`, and the normal to `self`, of every
    /// intersection between the two.
    ///
    /// Intersections behind the ray's origin may be reported. Normals may face either way.
    fn for_each_intersection(&self, ray: &Ray<D>, f: &mut dyn FnMut(Float, Direction<D>));
}

impl<const D: usize, T: Shape<D> + ?Sized> Shape<D> for Box<T> {
    #[inline]
    fn for_each_intersection(&self, ray: &Ray<D>, f: &mut dyn FnMut(Float, Direction<D>)) {
        (**self).for_each_intersection(ray, f);
    }
}

impl<const D: usize, T: Shape<D> + ?Sized> Shape<D> for &T {
    #[inline]
    fn for_each_intersection(&self, ray: &Ray<D>, f: &mut dyn FnMut(Float, Direction<D>)) {
        (**self).for_each_intersection(ray, f);
    }
}

/// A shape made of a certain surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Body<S> {
    pub shape: S,
    pub surface: SurfaceId,
}

impl<S> Body<S> {
    #[inline]
    #[must_use]
    pub const fn new(shape: S, surface: SurfaceId) -> Self {
        Self { shape, surface }
    }
}

impl<const D: usize, S: Shape<D>> Collider<D> for Body<S> {
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        let ray = *ctx.ray();
        self.shape
            .for_each_intersection(&ray, &mut |t, n| ctx.add_hit(t, n, self.surface));
    }
}

pub type DynShape<const D: usize> = Box<dyn Shape<D>>;

/// A set of bodies of any shape.
pub type Scene<const D: usize> = BruteForce<Vec<Body<DynShape<D>>>>;

/// Builds a [`Scene`] where the `i`th shape is made of surface `SurfaceId(i)`.
#[must_use]
pub fn scene<const D: usize>(shapes: impl IntoIterator<Item = DynShape<D>>) -> Scene<D> {
    BruteForce(
        shapes
            .into_iter()
            .enumerate()
            .map(|(i, shape)| Body::new(shape, SurfaceId(i)))
            .collect(),
    )
}
