use optix::*;
use optix_shapes::{Parallelotope, Polygon, Simplex, Sphere};

use core::{array, f64::consts::TAU, iter};
pub use rand;

/// Half the side of the cube random scenes are generated in.
pub const SCENE_EXTENT: Float = 7.0;

pub trait Random: Sized {
    /// Generate a randomized version of this object using the provided `rng`
    ///
    /// This method must not fail. If creating the object is faillible, keep trying until success
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self;
}

impl Random for LaserColor {
    /// Never [`LaserColor::NONE`].
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::from_bits_truncate(rng.gen_range(1..=Self::WHITE.bits()))
    }
}

impl Random for RefractiveIndices {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self {
            red: rng.gen_range(1.2..2.0),
            green: rng.gen_range(1.2..2.0),
            blue: rng.gen_range(1.2..2.0),
        }
    }
}

impl Random for Surface {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        match rng.gen_range(0usize..4) {
            0 => Self::Wall,
            1 => Self::Mirror,
            2 => Self::Refractive(RefractiveIndices::random(rng)),
            _ => Self::Target(Target::new(LaserColor::random(rng))),
        }
    }
}

impl<const D: usize> Random for LaserSource<D> {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        let origin = rand_vect(rng, SCENE_EXTENT);
        let color = LaserColor::random(rng);

        loop {
            if let Ok(source) = Self::new(origin, rand_vect(rng, 1.0), color) {
                break source;
            }
        }
    }
}

impl<const D: usize> Random for Sphere<D> {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let radius = rng.gen_range(0.25..3.0);
            if let Some(sphere) = Self::try_new(rand_vect(rng, SCENE_EXTENT), radius) {
                break sphere;
            }
        }
    }
}

impl<const D: usize> Random for Simplex<D> {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let points: [Vector<D>; D] = array::from_fn(|_| rand_vect(rng, SCENE_EXTENT));
            if let Some(simplex) = Self::try_new(points) {
                break simplex;
            }
        }
    }
}

impl<const D: usize> Random for Parallelotope<D> {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            // the center, then the half-extents
            let vectors = array::from_fn(|i| {
                rand_vect(rng, if i == 0 { SCENE_EXTENT } else { 3.0 })
            });

            if let Some(plane) = Self::try_new(vectors) {
                break plane;
            }
        }
    }
}

impl Random for Polygon<2> {
    /// A star-shaped, and thus simple, outline of 3 to 8 vertices.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let center = rand_vect::<2>(rng, SCENE_EXTENT);
            let n = rng.gen_range(3usize..=8);

            let phase = rng.gen_range(0.0..TAU);

            // jittered, but increasing angles, less than half a turn apart,
            // so `center` stays inside the outline
            let vertices: Vec<_> = (0..n)
                .map(|k| {
                    let a = phase + (k as Float + rng.gen_range(0.0..0.4)) * TAU / n as Float;
                    let r = rng.gen_range(0.5..3.0);
                    center + Vector::<2>::new(a.cos(), a.sin()) * r
                })
                .collect();

            if let Some(polygon) = Self::try_new(vertices) {
                break polygon;
            }
        }
    }
}

pub fn gen_random<T: Random>(n: usize, rng: &mut (impl rand::Rng + ?Sized)) -> Vec<T> {
    iter::repeat_with(|| T::random(rng)).take(n).collect()
}

/// `num_surfaces` random surfaces, at least one of them a target,
/// and `num_sources` random lasers.
pub fn random_puzzle<const D: usize>(
    num_surfaces: usize,
    num_sources: usize,
    rng: &mut (impl rand::Rng + ?Sized),
) -> (Vec<Surface>, Vec<LaserSource<D>>) {
    let mut surfaces = gen_random::<Surface>(num_surfaces, rng);

    if !surfaces.iter().any(|s| matches!(s, Surface::Target(_))) {
        if let Some(surface) = surfaces.last_mut() {
            *surface = Surface::Target(Target::new(LaserColor::random(rng)));
        }
    }

    (surfaces, gen_random(num_sources, rng))
}

pub fn rand_vect<const D: usize>(
    rng: &mut (impl rand::Rng + ?Sized),
    max_coord_mag: Float,
) -> Vector<D> {
    // the rng generates floats in 0.0..1.0, scale and translate the range accordingly

    Vector::<D>::from_fn(|_, _| (rng.gen::<Float>() - 0.5) * (max_coord_mag.abs() * 2.0))
}
