use super::*;

/// The optical behavior of a surface.
///
/// The geometry lives with the [`Raycast`] implementation, which tags
/// its hits with the [`SurfaceId`] of the matching `Surface`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Surface {
    /// Absorbs lasers.
    Wall,
    /// Reflects lasers.
    Mirror,
    /// A transparent medium, bends lasers according to Snell's law.
    Refractive(RefractiveIndices),
    /// Absorbs lasers, recording their color.
    Target(Target),
}

/// A laser, between two interactions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment<const D: usize> {
    pub ray: Ray<D>,
    pub color: LaserColor,
    pub medium: Medium,
}

/// What a surface does to the laser that hit it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome<const D: usize> {
    /// The laser stops here. Targets leave `deposit`, the color to be recorded.
    Terminate { deposit: Option<LaserColor> },
    /// The laser goes on along a new segment.
    Continue(Segment<D>),
}

impl Surface {
    /// Applies the physics of this surface to `segment`, which ended at `hit`.
    ///
    /// Pure, the caller is responsible for depositing colors into targets.
    #[must_use]
    pub fn on_hit<const D: usize>(&self, segment: &Segment<D>, hit: &Hit<D>) -> Outcome<D> {
        let incident = &segment.ray.dir;

        match self {
            Self::Wall => Outcome::Terminate { deposit: None },
            Self::Target(_) => Outcome::Terminate {
                deposit: Some(segment.color),
            },
            Self::Mirror => Outcome::Continue(Segment {
                ray: Ray::new_unit_dir(hit.point, reflect_unit(incident, &hit.normal)),
                ..*segment
            }),
            Self::Refractive(indices) => {
                let index = indices.index_for(segment.color);

                let medium_after = if segment.medium.is_inside(hit.surface) {
                    segment.medium.exiting(hit.surface)
                } else {
                    segment.medium.entering(hit.surface, index)
                };
                let (n1, n2) = (segment.medium.index(), medium_after.index());

                let (dir, medium) = match refract(incident, &hit.normal, n1, n2) {
                    Refraction::Transmitted(dir) => (dir, medium_after),
                    Refraction::TotalInternalReflection(dir) => {
                        log::trace!("total internal reflection at {}", hit.surface);
                        (dir, segment.medium)
                    }
                };

                Outcome::Continue(Segment {
                    ray: Ray::new_unit_dir(hit.point, dir),
                    color: segment.color,
                    medium,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_close;
    use nalgebra::Vector2;
    use pretty_assertions::assert_eq;

    fn segment(dir: [Float; 2], color: LaserColor, medium: Medium) -> Segment<2> {
        Segment {
            ray: Ray::new([0., 0.], dir),
            color,
            medium,
        }
    }

    fn hit(surface: usize) -> Hit<2> {
        Hit {
            point: Vector2::new(1., 1.),
            normal: Unit::new_normalize(Vector2::new(0., 1.)),
            distance: 2f64.sqrt(),
            surface: SurfaceId(surface),
        }
    }

    fn continued(outcome: Outcome<2>) -> Segment<2> {
        match outcome {
            Outcome::Continue(segment) => segment,
            Outcome::Terminate { .. } => panic!("expected the laser to go on"),
        }
    }

    #[test]
    fn walls_and_targets_stop() {
        let s = segment([1., -1.], LaserColor::CYAN, Medium::AIR);

        assert_eq!(
            Surface::Wall.on_hit(&s, &hit(0)),
            Outcome::Terminate { deposit: None }
        );
        assert_eq!(
            Surface::Target(Target::new(LaserColor::BLUE)).on_hit(&s, &hit(0)),
            Outcome::Terminate {
                deposit: Some(LaserColor::CYAN)
            }
        );
    }

    #[test]
    fn mirror_reflects_and_keeps_color() {
        let s = segment([1., -1.], LaserColor::RED, Medium::AIR);
        let next = continued(Surface::Mirror.on_hit(&s, &hit(0)));

        assert_close(&next.ray.origin, &Vector2::new(1., 1.));
        assert_close(next.ray.dir.as_ref(), &Vector2::new(1., 1.).normalize());
        assert_eq!(next.color, LaserColor::RED);
    }

    #[test]
    fn entering_then_exiting_a_medium() {
        let glass = Surface::Refractive(RefractiveIndices::default());
        let s = segment([1., -1.], LaserColor::GREEN, Medium::AIR);

        let inside = continued(glass.on_hit(&s, &hit(3)));
        assert_eq!(inside.medium.layers(), &[(SurfaceId(3), 1.6)]);
        assert!(inside.ray.dir.x < s.ray.dir.x);

        let outside = continued(glass.on_hit(&inside, &hit(3)));
        assert_eq!(outside.medium, Medium::AIR);
        assert_close(outside.ray.dir.as_ref(), s.ray.dir.as_ref());
    }

    #[test]
    fn total_internal_reflection_keeps_medium() {
        let glass = Surface::Refractive(RefractiveIndices::default());
        let medium = Medium::AIR.entering(SurfaceId(3), 1.5);
        // 60 degrees of incidence, beyond the critical angle of ~41.8 degrees
        let s = segment([3f64.sqrt(), -1.], LaserColor::RED, medium);

        let next = continued(glass.on_hit(&s, &hit(3)));
        assert_eq!(next.medium, medium);
        assert_close(
            next.ray.dir.as_ref(),
            &Vector2::new(3f64.sqrt(), 1.).normalize(),
        );
    }

    #[test]
    fn entering_another_medium_from_inside_one() {
        let water = Medium::AIR.entering(SurfaceId(1), 1.33);
        let glass = Surface::Refractive(RefractiveIndices {
            red: 1.33,
            ..Default::default()
        });
        let s = segment([1., -1.], LaserColor::RED, water);

        let next = continued(glass.on_hit(&s, &hit(2)));
        // matched indices: no bending
        assert_close(next.ray.dir.as_ref(), s.ray.dir.as_ref());
        assert_eq!(
            next.medium.layers(),
            &[(SurfaceId(1), 1.33), (SurfaceId(2), 1.33)]
        );
    }

    #[test]
    fn nested_media_restore_the_enclosing_index() {
        let outer = Surface::Refractive(RefractiveIndices {
            red: 1.5,
            ..Default::default()
        });
        let inner = Surface::Refractive(RefractiveIndices {
            red: 1.8,
            ..Default::default()
        });
        let s = segment([1., -1.], LaserColor::RED, Medium::AIR);

        let in_outer = continued(outer.on_hit(&s, &hit(0)));
        let in_inner = continued(inner.on_hit(&in_outer, &hit(1)));
        assert_eq!(in_inner.medium.layers(), &[(SurfaceId(0), 1.5), (SurfaceId(1), 1.8)]);

        // leaving the inner medium goes back to the outer one, not to air
        let back = continued(inner.on_hit(&in_inner, &hit(1)));
        assert_eq!(back.medium.layers(), &[(SurfaceId(0), 1.5)]);
        assert_close(back.ray.dir.as_ref(), in_outer.ray.dir.as_ref());

        let out = continued(outer.on_hit(&back, &hit(0)));
        assert_eq!(out.medium, Medium::AIR);
        assert_close(out.ray.dir.as_ref(), s.ray.dir.as_ref());
    }
}
