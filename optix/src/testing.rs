//! Helpers shared by the unit tests of this crate.

use super::*;

pub(crate) fn assert_close<const D: usize>(actual: &Vector<D>, expected: &Vector<D>) {
    assert!(
        (actual - expected).norm() < 1e-9,
        "expected {expected:?}, got {actual:?}"
    );
}

/// An infinite plane, used to stand in for a host's collision system.
#[derive(Clone, Debug)]
pub(crate) struct TestPlane<const D: usize> {
    pub point: Vector<D>,
    pub normal: Direction<D>,
    pub surface: SurfaceId,
}

impl<const D: usize> TestPlane<D> {
    pub fn new(point: impl Into<Vector<D>>, normal: impl Into<Vector<D>>, surface: usize) -> Self {
        Self {
            point: point.into(),
            normal: Unit::new_normalize(normal.into()),
            surface: SurfaceId(surface),
        }
    }
}

impl<const D: usize> Collider<D> for TestPlane<D> {
    fn add_hits(&self, ctx: &mut RaycastCtx<D>) {
        let ray = ctx.ray();
        let u = ray.dir.dot(self.normal.as_ref());

        if u.abs() > Float::EPSILON {
            let t = (self.point - ray.origin).dot(self.normal.as_ref()) / u;
            ctx.add_hit(t, self.normal, self.surface);
        }
    }
}

/// A host raycaster backed by a list of planes.
pub(crate) fn planes<const D: usize>(planes: Vec<TestPlane<D>>) -> BruteForce<Vec<TestPlane<D>>> {
    BruteForce(planes)
}
