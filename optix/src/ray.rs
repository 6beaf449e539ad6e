use super::*;

/// Refractive index of the space between surfaces.
pub const AIR_REFRACTIVE_INDEX: Float = 1.0;

/// Index used for colors that aren't exactly one primary.
pub const DEFAULT_REFRACTIVE_INDEX: Float = 1.5;

/// A light ray, represented as a half-line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray<const D: usize> {
    /// The starting point of the half-line
    pub origin: Vector<D>,
    /// The direction of the half-line
    pub dir: Direction<D>,
}

impl<const D: usize> Ray<D> {
    #[inline]
    #[must_use]
    pub fn new_unit_dir(origin: impl Into<Vector<D>>, dir: Direction<D>) -> Self {
        Self {
            origin: origin.into(),
            dir,
        }
    }

    /// Returns `None` if `dir` is (nearly) the zero vector.
    #[inline]
    #[must_use]
    pub fn try_new(origin: impl Into<Vector<D>>, dir: impl Into<Vector<D>>) -> Option<Self> {
        Unit::try_new(dir.into(), Float::EPSILON).map(|dir| Self::new_unit_dir(origin, dir))
    }

    /// # Panics
    ///
    /// If `dir` is the zero vector.
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<Vector<D>>, dir: impl Into<Vector<D>>) -> Self {
        Self::try_new(origin, dir).expect("direction must be non-zero")
    }

    /// Translates [`self.origin`](Self::origin) by [`self.dir`](Self::dir)`* t`.
    #[inline]
    pub fn advance(&mut self, t: Float) {
        self.origin += self.dir.as_ref() * t;
    }

    /// Returns [`self.origin`](Self::origin), translated by [`self.dir`](Self::dir)`* t`.
    #[inline]
    #[must_use]
    pub fn at(&self, t: Float) -> Vector<D> {
        self.origin + self.dir.as_ref() * t
    }
}

/// Mirror `v` with respect to the hyperplane orthogonal to `normal`.
///
/// Preserves norms, so unit vectors stay unit vectors (up to roundoff).
#[inline]
#[must_use]
pub fn reflect<const D: usize>(v: &Vector<D>, normal: &Direction<D>) -> Vector<D> {
    let n = normal.as_ref();
    v - n * (2.0 * v.dot(n))
}

/// Like [`reflect`], but renormalizes the result.
#[inline]
#[must_use]
pub fn reflect_unit<const D: usize>(v: &Direction<D>, normal: &Direction<D>) -> Direction<D> {
    Unit::new_normalize(reflect(v.as_ref(), normal))
}

/// What happened to a ray crossing the boundary between two media.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Refraction<const D: usize> {
    /// The ray crossed the boundary.
    Transmitted(Direction<D>),
    /// The incidence angle was beyond the critical angle, the ray bounced back.
    TotalInternalReflection(Direction<D>),
}

impl<const D: usize> Refraction<D> {
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> &Direction<D> {
        match self {
            Self::Transmitted(d) | Self::TotalInternalReflection(d) => d,
        }
    }
}

/// Bend `incident` through a boundary from a medium of index `n1` into one of index `n2`,
/// following Snell's law.
///
/// `normal` must face against `incident` (`dot(normal, incident) <= 0`).
#[must_use]
pub fn refract<const D: usize>(
    incident: &Direction<D>,
    normal: &Direction<D>,
    n1: Float,
    n2: Float,
) -> Refraction<D> {
    let (i, n) = (incident.as_ref(), normal.as_ref());

    let eta = n1 / n2;
    let cos_i = -n.dot(i);
    let sin_t2 = eta * eta * (1.0 - cos_i * cos_i);

    if sin_t2 > 1.0 {
        return Refraction::TotalInternalReflection(reflect_unit(incident, normal));
    }

    let cos_t = (1.0 - sin_t2).sqrt();
    Refraction::Transmitted(Unit::new_normalize(i * eta + n * (eta * cos_i - cos_t)))
}

/// Per color refractive indices of a transparent medium.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefractiveIndices {
    pub red: Float,
    pub green: Float,
    pub blue: Float,
}

impl Default for RefractiveIndices {
    fn default() -> Self {
        Self {
            red: 1.5,
            green: 1.6,
            blue: 1.7,
        }
    }
}

impl RefractiveIndices {
    /// Only the three primaries have their own index, everything else
    /// (composites, [`LaserColor::NONE`]) gets [`DEFAULT_REFRACTIVE_INDEX`].
    #[must_use]
    pub fn index_for(&self, color: LaserColor) -> Float {
        if color == LaserColor::RED {
            self.red
        } else if color == LaserColor::GREEN {
            self.green
        } else if color == LaserColor::BLUE {
            self.blue
        } else {
            DEFAULT_REFRACTIVE_INDEX
        }
    }
}

/// How many refractive media a laser can be nested in at once.
pub const MAX_NESTED_MEDIA: usize = 4;

/// The media a ray segment is currently travelling through, innermost last.
///
/// Carried along the path instead of being stored on the surfaces,
/// so tracing one laser never affects another.
#[derive(Clone, Copy, Debug)]
pub struct Medium {
    layers: [(SurfaceId, Float); MAX_NESTED_MEDIA],
    depth: usize,
}

impl Default for Medium {
    fn default() -> Self {
        Self::AIR
    }
}

impl PartialEq for Medium {
    fn eq(&self, other: &Self) -> bool {
        self.layers() == other.layers()
    }
}

impl Medium {
    pub const AIR: Self = Self {
        layers: [(SurfaceId(0), AIR_REFRACTIVE_INDEX); MAX_NESTED_MEDIA],
        depth: 0,
    };

    /// The surfaces this ray is inside of, with their indices, outermost first.
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[(SurfaceId, Float)] {
        &self.layers[..self.depth]
    }

    /// The refractive index of the innermost medium.
    #[inline]
    #[must_use]
    pub fn index(&self) -> Float {
        self.layers()
            .last()
            .map_or(AIR_REFRACTIVE_INDEX, |&(_, index)| index)
    }

    #[inline]
    #[must_use]
    pub fn is_inside(&self, surface: SurfaceId) -> bool {
        self.layers().iter().any(|&(s, _)| s == surface)
    }

    /// `self`, after crossing into `surface`, of index `index`.
    ///
    /// Past [`MAX_NESTED_MEDIA`], the outermost medium is forgotten.
    #[must_use]
    pub fn entering(mut self, surface: SurfaceId, index: Float) -> Self {
        if self.depth == MAX_NESTED_MEDIA {
            log::warn!("more than {MAX_NESTED_MEDIA} nested media, forgetting the outermost");
            self.layers.rotate_left(1);
            self.depth -= 1;
        }

        self.layers[self.depth] = (surface, index);
        self.depth += 1;
        self
    }

    /// `self`, after crossing out of `surface`.
    ///
    /// Media need not be properly nested, `surface` doesn't have to be the innermost one.
    #[must_use]
    pub fn exiting(mut self, surface: SurfaceId) -> Self {
        if let Some(i) = self.layers().iter().rposition(|&(s, _)| s == surface) {
            self.layers[i..self.depth].rotate_left(1);
            self.depth -= 1;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_close;
    use nalgebra::{Vector2, Vector3};

    #[test]
    fn reflection_flips_normal_component() {
        let normals = [
            Vector3::new(0., 1., 0.),
            Vector3::new(1., 1., 0.),
            Vector3::new(-0.3, 2., 5.),
        ];
        let dirs = [
            Vector3::new(0., -1., 0.),
            Vector3::new(1., -1., 1.),
            Vector3::new(0.2, 0.1, -3.),
        ];

        for n in normals {
            let n = Unit::new_normalize(n);
            for d in dirs {
                let d = Unit::new_normalize(d);
                let r = reflect(d.as_ref(), &n);

                assert!((r.norm() - 1.0).abs() < 1e-12);
                assert!((r.dot(n.as_ref()) + d.dot(n.as_ref())).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn normal_incidence_round_trip() {
        let glass = RefractiveIndices::default().index_for(LaserColor::RED);
        let i = Unit::new_normalize(Vector3::new(0., -1., 0.));
        let n = Unit::new_normalize(Vector3::new(0., 1., 0.));

        let Refraction::Transmitted(inside) = refract(&i, &n, AIR_REFRACTIVE_INDEX, glass) else {
            panic!("expected transmission");
        };
        assert_close(inside.as_ref(), i.as_ref());

        let Refraction::Transmitted(out) = refract(&inside, &n, glass, AIR_REFRACTIVE_INDEX) else {
            panic!("expected transmission");
        };
        assert_close(out.as_ref(), i.as_ref());
    }

    #[test]
    fn oblique_round_trip_through_slab() {
        let glass = 1.6;
        let i = Unit::new_normalize(Vector2::new(1., -1.));
        let n = Unit::new_normalize(Vector2::new(0., 1.));

        let inside = *refract(&i, &n, AIR_REFRACTIVE_INDEX, glass).direction();
        // bent towards the normal
        assert!(inside.x.abs() < i.x.abs());

        let out = *refract(&inside, &n, glass, AIR_REFRACTIVE_INDEX).direction();
        assert_close(out.as_ref(), i.as_ref());
    }

    #[test]
    fn total_internal_reflection_beyond_critical_angle() {
        let (n1, n2): (Float, Float) = (1.5, 1.0);
        let critical = (n2 / n1).asin();
        let n = Unit::new_normalize(Vector2::new(0., 1.));

        let at = |angle: Float| {
            let i = Unit::new_normalize(Vector2::new(angle.sin(), -angle.cos()));
            (i, refract(&i, &n, n1, n2))
        };

        let (_, below) = at(critical - 0.01);
        assert!(matches!(below, Refraction::Transmitted(_)));

        let (i, beyond) = at(critical + 0.01);
        let Refraction::TotalInternalReflection(r) = beyond else {
            panic!("expected total internal reflection");
        };
        assert_close(&r.into_inner(), &reflect(i.as_ref(), &n));
    }

    #[test]
    fn index_lookup_falls_back() {
        let indices = RefractiveIndices::default();
        assert_eq!(indices.index_for(LaserColor::GREEN), 1.6);
        assert_eq!(indices.index_for(LaserColor::BLUE), 1.7);
        assert_eq!(indices.index_for(LaserColor::YELLOW), DEFAULT_REFRACTIVE_INDEX);
        assert_eq!(indices.index_for(LaserColor::NONE), DEFAULT_REFRACTIVE_INDEX);
    }

    #[test]
    fn grazing_incidence_is_finite() {
        let i = Unit::new_normalize(Vector2::new(1., -1e-9));
        let n = Unit::new_normalize(Vector2::new(0., 1.));
        let r = refract(&i, &n, AIR_REFRACTIVE_INDEX, 1.5);
        assert!(r.direction().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn media_stack_up() {
        let medium = Medium::AIR
            .entering(SurfaceId(0), 1.5)
            .entering(SurfaceId(1), 1.8);

        assert_eq!(medium.index(), 1.8);
        assert!(medium.is_inside(SurfaceId(0)) && medium.is_inside(SurfaceId(1)));

        assert_eq!(medium.exiting(SurfaceId(1)).index(), 1.5);
        // overlapping, not nested: leaving the outer one keeps the inner one
        assert_eq!(
            medium.exiting(SurfaceId(0)).layers(),
            &[(SurfaceId(1), 1.8)]
        );
        assert_eq!(medium.exiting(SurfaceId(7)), medium);
        assert_eq!(
            medium.exiting(SurfaceId(1)).exiting(SurfaceId(0)),
            Medium::default()
        );
        assert_eq!(Medium::AIR.index(), AIR_REFRACTIVE_INDEX);
    }

    #[test]
    fn deepest_media_forget_the_outermost() {
        let medium = (0..=MAX_NESTED_MEDIA).fold(Medium::AIR, |m, i| {
            m.entering(SurfaceId(i), 1.0 + i as Float)
        });

        assert_eq!(medium.layers().len(), MAX_NESTED_MEDIA);
        assert!(!medium.is_inside(SurfaceId(0)));
        assert_eq!(medium.layers().last(), Some(&(SurfaceId(MAX_NESTED_MEDIA), 5.0)));
    }
}
