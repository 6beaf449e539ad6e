use super::*;

use std::{rc::Rc, sync::Arc};

use core::{fmt, ops::Deref};

use either::Either;

/// Identifies an optical [`Surface`] of a simulation.
///
/// This is the tag a [`Raycast`] implementation attaches to every [`Hit`],
/// it indexes the simulation's surface table.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SurfaceId(pub usize);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closest intersection between a ray and the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit<const D: usize> {
    pub point: Vector<D>,
    /// Normal to the struck surface at `point`, facing against the incident ray.
    pub normal: Direction<D>,
    /// Distance travelled along the ray to reach `point`.
    pub distance: Float,
    pub surface: SurfaceId,
}

/// The collision query the tracer needs from its host.
///
/// Implementations must be read only: casting never alters the scene.
pub trait Raycast<const D: usize> {
    /// Returns the nearest hit along the half-line starting at `origin`, directed by `direction`,
    /// no farther than `max_distance`, if any.
    fn cast(&self, origin: &Vector<D>, direction: &Direction<D>, max_distance: Float)
        -> Option<Hit<D>>;
}

impl<const D: usize, T: Raycast<D> + ?Sized> Raycast<D> for &T {
    #[inline]
    fn cast(
        &self,
        origin: &Vector<D>,
        direction: &Direction<D>,
        max_distance: Float,
    ) -> Option<Hit<D>> {
        (**self).cast(origin, direction, max_distance)
    }
}

impl<const D: usize, T: Raycast<D> + ?Sized> Raycast<D> for Box<T> {
    #[inline]
    fn cast(
        &self,
        origin: &Vector<D>,
        direction: &Direction<D>,
        max_distance: Float,
    ) -> Option<Hit<D>> {
        self.deref().cast(origin, direction, max_distance)
    }
}

/// Collects the intersections reported by [`Collider`]s, keeping the closest one.
#[derive(Debug)]
pub struct RaycastCtx<'a, const D: usize> {
    ray: &'a Ray<D>,
    max_distance: Float,
    closest: Option<(Float, Direction<D>, SurfaceId)>,
}

impl<'a, const D: usize> RaycastCtx<'a, D> {
    #[inline]
    #[must_use]
    pub fn new(ray: &'a Ray<D>, max_distance: Float) -> Self {
        Self {
            ray,
            max_distance,
            closest: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn ray(&self) -> &Ray<D> {
        self.ray
    }

    #[inline]
    #[must_use]
    pub const fn max_distance(&self) -> Float {
        self.max_distance
    }

    /// Stores the intersection at `distance` along the ray, with the given surface `normal`,
    /// if it lies within `0..=max_distance` and is closer than the one stored so far.
    ///
    /// `normal` may face either way, it is flipped to face against the ray.
    pub fn add_hit(&mut self, distance: Float, normal: Direction<D>, surface: SurfaceId) {
        if !(0.0..=self.max_distance).contains(&distance)
            || self
                .closest
                .as_ref()
                .is_some_and(|(t, _, _)| *t <= distance)
        {
            return;
        }

        let normal = if normal.dot(self.ray.dir.as_ref()) > 0.0 {
            -normal
        } else {
            normal
        };

        self.closest = Some((distance, normal, surface));
    }

    #[inline]
    #[must_use]
    pub fn into_hit(self) -> Option<Hit<D>> {
        let ray = self.ray;
        self.closest.map(|(distance, normal, surface)| Hit {
            point: ray.at(distance),
            normal,
            distance,
            surface,
        })
    }
}

/// Geometry able to report its intersections with a ray.
///
/// This is the building block for hosts that don't have a collision system of their own:
/// wrap any collider in [`BruteForce`] to get a [`Raycast`] implementation.
pub trait Collider<const D: usize> {
    /// Reports the intersections between `self` and [`ctx.ray()`](RaycastCtx::ray)
    /// with [`ctx.add_hit(...)`](RaycastCtx::add_hit), in no particular order.
    ///
    /// Intersections behind the ray's origin, or too far away, may be reported,
    /// they are discarded by `ctx`.
    ///
    /// Must be deterministic: for a given ray, the same intersections are reported
    /// every time.
    fn add_hits(&self, ctx: &mut RaycastCtx<D>);
}

/// Returns the closest intersection between `collider` and the given ray,
/// within `max_distance`.
#[inline]
#[must_use]
pub fn closest_hit<const D: usize>(
    collider: &(impl Collider<D> + ?Sized),
    origin: &Vector<D>,
    direction: &Direction<D>,
    max_distance: Float,
) -> Option<Hit<D>> {
    let ray = Ray::new_unit_dir(*origin, *direction);
    let mut ctx = RaycastCtx::new(&ray, max_distance);
    collider.add_hits(&mut ctx);
    ctx.into_hit()
}

/// A [`Raycast`] implementation testing every collider for every cast.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BruteForce<C>(pub C);

impl<const D: usize, C: Collider<D>> Raycast<D> for BruteForce<C> {
    #[inline]
    fn cast(
        &self,
        origin: &Vector<D>,
        direction: &Direction<D>,
        max_distance: Float,
    ) -> Option<Hit<D>> {
        closest_hit(&self.0, origin, direction, max_distance)
    }
}

use impl_trait_for_tuples::impl_for_tuples;

#[impl_for_tuples(1, 16)]
impl<const D: usize> Collider<D> for T {
    for_tuples!( where #( T: Collider<D> )* );

    #[inline]
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        for_tuples!( #( T.add_hits(ctx); )* );
    }
}

impl<const D: usize, T: Collider<D>> Collider<D> for [T] {
    #[inline]
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        self.iter().for_each(|collider| collider.add_hits(ctx));
    }
}

impl<const N: usize, const D: usize, T: Collider<D>> Collider<D> for [T; N] {
    #[inline]
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        self.as_slice().add_hits(ctx);
    }
}

impl<const D: usize, T: Collider<D>> Collider<D> for Vec<T> {
    #[inline]
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        self.as_slice().add_hits(ctx);
    }
}

// All of these go through `Deref`, but a blanket impl over `Deref` types
// would forbid implementing `Collider` for new types downstream.

impl<const D: usize, T: Collider<D> + ?Sized> Collider<D> for Box<T> {
    #[inline]
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        self.deref().add_hits(ctx);
    }
}

impl<const D: usize, T: Collider<D> + ?Sized> Collider<D> for Arc<T> {
    #[inline]
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        self.deref().add_hits(ctx);
    }
}

impl<const D: usize, T: Collider<D> + ?Sized> Collider<D> for Rc<T> {
    #[inline]
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        self.deref().add_hits(ctx);
    }
}

impl<const D: usize, T: Collider<D> + ?Sized> Collider<D> for &T {
    #[inline]
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        (**self).add_hits(ctx);
    }
}

impl<const D: usize, L: Collider<D>, R: Collider<D>> Collider<D> for Either<L, R> {
    #[inline]
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        match self {
            Either::Left(c) => c.add_hits(ctx),
            Either::Right(c) => c.add_hits(ctx),
        }
    }
}
