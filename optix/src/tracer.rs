use super::*;

/// How far lasers may travel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LengthBudget {
    /// Each segment looks this far ahead, there is no bound on the total length.
    PerSegment(Float),
    /// Bound on the cumulative length of the whole path.
    Total(Float),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceConfig {
    /// Maximum number of raycasts (segments) per laser.
    pub max_segments: usize,
    pub length: LengthBudget,
    /// Distance a ray moves forward before each raycast, so it doesn't
    /// hit the surface it just left again.
    pub offset: Float,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_segments: 5,
            length: LengthBudget::PerSegment(10.0),
            offset: 0.01,
        }
    }
}

/// Where, and in which color, a laser starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaserSource<const D: usize> {
    pub ray: Ray<D>,
    pub color: LaserColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("laser direction must be non-zero")]
pub struct ZeroDirection;

impl<const D: usize> LaserSource<D> {
    /// `direction` doesn't need to be normalized, but must be non-zero.
    pub fn new(
        origin: impl Into<Vector<D>>,
        direction: impl Into<Vector<D>>,
        color: LaserColor,
    ) -> Result<Self, ZeroDirection> {
        let ray = Ray::try_new(origin, direction).ok_or(ZeroDirection)?;
        Ok(Self { ray, color })
    }

    /// `rays` lasers spread evenly over an angle of `fov` radians, centered on `direction`.
    ///
    /// The fan opens in the plane spanned by `direction` and `towards`, the last laser
    /// leaning towards `towards`. A single laser points straight along `direction`.
    pub fn fan(
        origin: impl Into<Vector<D>>,
        direction: impl Into<Vector<D>>,
        towards: impl Into<Vector<D>>,
        fov: Float,
        rays: usize,
        color: LaserColor,
    ) -> Result<Vec<Self>, FanError> {
        let center = Self::new(origin, direction, color)?;
        let forward = center.ray.dir;

        let towards = towards.into();
        let side = towards - forward.into_inner() * forward.dot(&towards);
        let side = Unit::try_new(side, towards.norm() * FLAT_FAN_EPSILON).ok_or(FanError::Flat)?;

        (0..rays)
            .map(|i| {
                let angle = if rays > 1 {
                    fov * (i as Float / (rays - 1) as Float - 0.5)
                } else {
                    0.0
                };
                let dir = forward.into_inner() * angle.cos() + side.into_inner() * angle.sin();
                Self::new(center.ray.origin, dir, color).map_err(FanError::from)
            })
            .collect()
    }
}

const FLAT_FAN_EPSILON: Float = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FanError {
    #[error(transparent)]
    ZeroDirection(#[from] ZeroDirection),
    #[error("a fan must open towards a direction not parallel to its center")]
    Flat,
}

/// Iterates over the points where a laser interacts with the scene,
/// the last one being where it stopped.
///
/// Does not yield the laser's origin.
#[derive(Debug)]
pub struct Tracer<'a, const D: usize, R: ?Sized> {
    raycaster: &'a R,
    surfaces: &'a [Surface],
    config: &'a TraceConfig,
    segment: Segment<D>,
    travelled: Float,
    casts: usize,
    termination: Option<Termination>,
}

impl<'a, const D: usize, R: Raycast<D> + ?Sized> Tracer<'a, D, R> {
    #[must_use]
    pub fn new(
        raycaster: &'a R,
        surfaces: &'a [Surface],
        config: &'a TraceConfig,
        source: &LaserSource<D>,
    ) -> Self {
        Self {
            raycaster,
            surfaces,
            config,
            segment: Segment {
                ray: source.ray,
                color: source.color,
                medium: Medium::AIR,
            },
            travelled: 0.0,
            casts: 0,
            termination: None,
        }
    }

    /// Why the laser stopped, once this iterator is exhausted.
    #[inline]
    #[must_use]
    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// How far ahead the next raycast may look, measured from the segment's origin.
    fn reach(&self) -> Float {
        match self.config.length {
            LengthBudget::PerSegment(l) => l,
            LengthBudget::Total(l) => l - self.travelled,
        }
    }

    fn stop(&mut self, termination: Termination) {
        log::trace!("laser stopped: {termination}");
        self.termination = Some(termination);
    }
}

impl<const D: usize, R: Raycast<D> + ?Sized> Iterator for Tracer<'_, D, R> {
    type Item = Vector<D>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.termination.is_some() {
            return None;
        }

        if self.casts >= self.config.max_segments {
            self.stop(Termination::IterationCap);
            return None;
        }

        let reach = self.reach();
        if reach <= 0.0 {
            self.stop(Termination::Exhausted);
            return None;
        }

        self.casts += 1;

        let ray = &self.segment.ray;
        let offset = self.config.offset.min(reach);
        let start = ray.at(offset);

        let Some(hit) = self.raycaster.cast(&start, &ray.dir, reach - offset) else {
            let end = ray.at(reach);
            self.travelled += reach;
            self.stop(Termination::Exhausted);
            return Some(end);
        };

        self.travelled += offset + hit.distance;

        let surface = self.surfaces.get(hit.surface.0).unwrap_or_else(|| {
            log::warn!("laser hit unknown surface {}, treating it as a wall", hit.surface);
            &Surface::Wall
        });

        log::trace!(
            "{} laser hit {:?} at {:?}",
            self.segment.color,
            surface,
            hit.point.as_slice()
        );

        match surface.on_hit(&self.segment, &hit) {
            Outcome::Terminate { deposit: None } => self.stop(Termination::HitWall(hit.surface)),
            Outcome::Terminate {
                deposit: Some(color),
            } => self.stop(Termination::HitTarget {
                surface: hit.surface,
                color,
            }),
            Outcome::Continue(segment) => self.segment = segment,
        }

        Some(hit.point)
    }
}

/// Traces the whole path of the laser emitted by `source`.
///
/// `surfaces` is indexed by the [`SurfaceId`]s attached to the hits `raycaster` reports.
/// This never mutates anything: the same inputs always give the same path.
#[must_use]
pub fn trace<const D: usize, R: Raycast<D> + ?Sized>(
    raycaster: &R,
    surfaces: &[Surface],
    source: &LaserSource<D>,
    config: &TraceConfig,
) -> LaserPath<D> {
    let mut tracer = Tracer::new(raycaster, surfaces, config, source);

    let mut points = Vec::with_capacity(config.max_segments + 1);
    points.push(source.ray.origin);
    points.extend(tracer.by_ref());

    LaserPath {
        points,
        color: source.color,
        // the tracer only stops yielding points once it has terminated
        termination: tracer.termination.unwrap_or(Termination::IterationCap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_close, planes, TestPlane};
    use nalgebra::{Vector2, Vector3};
    use pretty_assertions::assert_eq;

    #[test]
    fn nothing_in_range() {
        let scene = planes::<3>(vec![]);
        let source = LaserSource::new([1., 2., 3.], [0., 0., 2.], LaserColor::RED).unwrap();

        let path = trace(&scene, &[], &source, &TraceConfig::default());

        assert_eq!(path.points().len(), 2);
        assert_eq!(path.points()[0], Vector3::new(1., 2., 3.));
        assert_close(&path.points()[1], &Vector3::new(1., 2., 13.));
        assert_eq!(path.termination(), Termination::Exhausted);
    }

    #[test]
    fn single_mirror() {
        let scene = planes(vec![TestPlane::new([0., 5., 0.], [0., 1., 0.], 0)]);
        let surfaces = [Surface::Mirror];
        let source = LaserSource::new([2., 12., -1.], [0., -1., 0.], LaserColor::GREEN).unwrap();

        let path = trace(&scene, &surfaces, &source, &TraceConfig::default());
        let points = path.points();

        assert_eq!(points.len(), 3);
        assert_close(&points[1], &Vector3::new(2., 5., -1.));
        // the reflected laser goes straight back up, into the void
        assert_close(&points[2], &Vector3::new(2., 15., -1.));
        assert_eq!(path.termination(), Termination::Exhausted);
    }

    #[test]
    fn parallel_mirrors_stop_at_the_cap() {
        let scene = planes(vec![
            TestPlane::new([0., 0.], [0., 1.], 0),
            TestPlane::new([0., 5.], [0., -1.], 1),
        ]);
        let surfaces = [Surface::Mirror, Surface::Mirror];
        let source = LaserSource::new([1., 2.], [0., 1.], LaserColor::BLUE).unwrap();

        for max_segments in [1, 6, 50] {
            let config = TraceConfig {
                max_segments,
                ..Default::default()
            };
            let path = trace(&scene, &surfaces, &source, &config);

            assert_eq!(path.points().len(), max_segments + 1);
            assert_eq!(path.termination(), Termination::IterationCap);
        }
    }

    #[test]
    fn wall_and_target_terminate() {
        let scene = planes(vec![
            TestPlane::new([0., 5.], [0., 1.], 0),
            TestPlane::new([0., 0.], [1., 0.], 1),
        ]);
        let source = LaserSource::new([7., 0.], [-1., 1.], LaserColor::YELLOW).unwrap();
        let config = TraceConfig::default();

        // bounces off the mirror at y = 5, ends on x = 0
        let surfaces = [Surface::Mirror, Surface::Wall];
        let path = trace(&scene, &surfaces, &source, &config);
        assert_eq!(path.points().len(), 3);
        assert_close(&path.points()[1], &Vector2::new(2., 5.));
        assert_close(&path.points()[2], &Vector2::new(0., 3.));
        assert_eq!(path.termination(), Termination::HitWall(SurfaceId(1)));
        assert_eq!(path.deposit(), None);

        let surfaces = [Surface::Mirror, Surface::Target(Target::new(LaserColor::RED))];
        let path = trace(&scene, &surfaces, &source, &config);
        assert_eq!(
            path.deposit(),
            Some((SurfaceId(1), LaserColor::YELLOW))
        );
    }

    #[test]
    fn total_length_budget() {
        let scene = planes(vec![
            TestPlane::new([0., 0.], [0., 1.], 0),
            TestPlane::new([0., 4.], [0., -1.], 1),
        ]);
        let surfaces = [Surface::Mirror, Surface::Mirror];
        let source = LaserSource::new([0., 2.], [0., 1.], LaserColor::RED).unwrap();
        let config = TraceConfig {
            max_segments: 100,
            length: LengthBudget::Total(9.),
            offset: 0.01,
        };

        let path = trace(&scene, &surfaces, &source, &config);

        // 2 up, 4 down, 3 up
        assert_eq!(path.points().len(), 4);
        assert_close(&path.points()[3], &Vector2::new(0., 3.));
        assert!((path.length() - 9.).abs() < 1e-9);
        assert_eq!(path.termination(), Termination::Exhausted);
    }

    #[test]
    fn unknown_surfaces_are_walls() {
        let scene = planes(vec![TestPlane::new([0., 5.], [0., 1.], 7)]);
        let source = LaserSource::new([0., 0.], [0., 1.], LaserColor::RED).unwrap();

        let path = trace(&scene, &[Surface::Mirror], &source, &TraceConfig::default());
        assert_eq!(path.termination(), Termination::HitWall(SurfaceId(7)));
    }

    #[test]
    fn slab_of_glass_shifts_the_laser() {
        // a horizontal slab between y = 0 and y = 1
        let scene = planes(vec![
            TestPlane::new([0., 1.], [0., 1.], 0),
            TestPlane::new([0., 0.], [0., 1.], 0),
            TestPlane::new([0., -5.], [0., 1.], 1),
        ]);
        let surfaces = [Surface::Refractive(RefractiveIndices::default()), Surface::Wall];
        let source = LaserSource::new([-3., 4.], [1., -1.], LaserColor::RED).unwrap();

        let path = trace(&scene, &surfaces, &source, &TraceConfig::default());
        let points = path.points();

        assert_eq!(points.len(), 4);
        assert_eq!(path.termination(), Termination::HitWall(SurfaceId(1)));

        // same direction on both sides of the slab
        let before = (points[1] - points[0]).normalize();
        let after = (points[3] - points[2]).normalize();
        assert_close(&before, &after);

        // but bent towards the normal inside
        let inside = (points[2] - points[1]).normalize();
        assert!(inside.x < before.x);
    }

    #[test]
    fn laser_leaves_nested_slabs_unbent() {
        // slab #1 (y in [4, 6]) inside slab #0 (y in [0, 10]), then a wall
        let scene = planes(vec![
            TestPlane::new([0., 10.], [0., 1.], 0),
            TestPlane::new([0., 0.], [0., 1.], 0),
            TestPlane::new([0., 6.], [0., 1.], 1),
            TestPlane::new([0., 4.], [0., 1.], 1),
            TestPlane::new([0., -5.], [0., 1.], 2),
        ]);
        let surfaces = [
            Surface::Refractive(RefractiveIndices::default()),
            Surface::Refractive(RefractiveIndices {
                red: 1.8,
                ..Default::default()
            }),
            Surface::Wall,
        ];
        let source = LaserSource::new([-12., 12.], [1., -1.], LaserColor::RED).unwrap();
        let config = TraceConfig {
            max_segments: 8,
            ..Default::default()
        };

        let path = trace(&scene, &surfaces, &source, &config);
        let points = path.points();

        assert_eq!(points.len(), 6);
        assert_eq!(path.termination(), Termination::HitWall(SurfaceId(2)));

        let dir = |i: usize| (points[i + 1] - points[i]).normalize();
        // the outer slab bends the laser the same way on both sides of the inner one
        assert_close(&dir(1), &dir(3));
        assert!(dir(2).x < dir(1).x);
        // and it comes out going the way it went in
        assert_close(&dir(0), &dir(4));
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert_eq!(
            LaserSource::<2>::new([0., 0.], [0., 0.], LaserColor::RED),
            Err(ZeroDirection)
        );
    }

    #[test]
    fn fan_spreads_over_its_field_of_view() {
        let fov = Float::to_radians(30.0);
        let fan = LaserSource::<3>::fan(
            [1., 2., 3.],
            [0., 0., 2.],
            [1., 0., 1.],
            fov,
            5,
            LaserColor::GREEN,
        )
        .unwrap();

        assert_eq!(fan.len(), 5);
        assert!(fan.iter().all(|s| s.ray.origin == Vector3::new(1., 2., 3.)));
        assert!(fan.iter().all(|s| s.color == LaserColor::GREEN));

        let half = fov / 2.0;
        assert_close(&fan[0].ray.dir.into_inner(), &Vector3::new(-half.sin(), 0., half.cos()));
        assert_close(&fan[2].ray.dir.into_inner(), &Vector3::z());
        assert_close(&fan[4].ray.dir.into_inner(), &Vector3::new(half.sin(), 0., half.cos()));
        let spread = fan[0].ray.dir.into_inner().angle(&fan[4].ray.dir.into_inner());
        assert!((spread - fov).abs() < 1e-12);
    }

    #[test]
    fn fan_edge_cases() {
        let single = LaserSource::<2>::fan([0., 0.], [3., 0.], [0., 1.], 1.0, 1, LaserColor::RED);
        assert_eq!(
            single,
            Ok(vec![LaserSource::new([0., 0.], [1., 0.], LaserColor::RED).unwrap()])
        );

        assert_eq!(
            LaserSource::<2>::fan([0., 0.], [1., 0.], [0., 1.], 1.0, 0, LaserColor::RED),
            Ok(vec![])
        );
        assert_eq!(
            LaserSource::<2>::fan([0., 0.], [1., 0.], [-2., 0.], 1.0, 3, LaserColor::RED),
            Err(FanError::Flat)
        );
        assert_eq!(
            LaserSource::<2>::fan([0., 0.], [0., 0.], [0., 1.], 1.0, 3, LaserColor::RED),
            Err(FanError::ZeroDirection(ZeroDirection))
        );
    }

    #[test]
    fn tracing_is_deterministic() {
        let scene = planes(vec![
            TestPlane::new([0., 0.], [1., 2.], 0),
            TestPlane::new([0., 5.], [0., -1.], 1),
            TestPlane::new([7., 0.], [1., 0.], 2),
        ]);
        let surfaces = [
            Surface::Mirror,
            Surface::Refractive(RefractiveIndices::default()),
            Surface::Target(Target::new(LaserColor::BLUE)),
        ];
        let source = LaserSource::new([1., 2.], [0.3, 1.], LaserColor::BLUE).unwrap();
        let config = TraceConfig::default();

        assert_eq!(
            trace(&scene, &surfaces, &source, &config),
            trace(&scene, &surfaces, &source, &config)
        );
    }
}
