//! Laser propagation through a scene of optical surfaces.
//!
//! Rays are emitted by [`LaserSource`]s and traced through a host supplied [`Raycast`]
//! implementation. Every hit is dispatched to the struck [`Surface`], which either ends
//! the path (walls, targets) or bends it (mirrors, refractive media). Targets collect
//! the colors that reached them and are classified once per [`Simulation::tick`].

pub use nalgebra;

use nalgebra::{SVector, Unit};

pub mod camera;
mod color;
mod path;
mod ray;
mod raycast;
mod simulation;
mod surface;
mod target;
mod tracer;
pub mod triangulate;

pub use color::*;
pub use path::*;
pub use ray::*;
pub use raycast::*;
pub use simulation::*;
pub use surface::*;
pub use target::*;
pub use tracer::*;

pub type Float = f64;

/// A point, or a displacement, in `D`-dimensional space.
pub type Vector<const D: usize> = SVector<Float, D>;

/// A unit length [`Vector`].
pub type Direction<const D: usize> = Unit<SVector<Float, D>>;

#[cfg(test)]
mod testing;
