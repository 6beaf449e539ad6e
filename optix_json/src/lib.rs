//! The JSON scene format: surfaces, shapes, laser sources and trace settings.
//!
//! ```json
//! {
//!     "dim": 2,
//!     "config": { "max_segments": 6, "length": { "per_segment": 10.0 }, "offset": 0.01 },
//!     "bodies": [
//!         {
//!             "surface": { "type": "target", "data": { "required": "yellow" } },
//!             "shape": { "type": "sphere", "data": { "center": [0, 0], "radius": 1 } }
//!         }
//!     ],
//!     "sources": [ { "origin": [-5, 0], "direction": [1, 0], "color": "red" } ]
//! }
//! ```
//!
//! The `i`th body is made of the surface `SurfaceId(i)`.

use std::io;

use optix::{
    FanError, Float, LaserColor, LaserSource, LengthBudget, RefractiveIndices, Simulation,
    Surface, SurfaceId, Target, TraceConfig, UnknownColor, Vector,
};
use optix_shapes::{DynShape, Parallelotope, Polygon, Scene, Simplex, Sphere};
use serde::{Deserialize, Serialize};

pub use serde_json;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("invalid scene json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a {expected}-dimensional scene, found dim = {found}")]
    Dimension { expected: usize, found: usize },
    #[error("expected {expected} coordinates, got {found}")]
    Coordinates { expected: usize, found: usize },
    #[error("body {body}: a {shape} needs {expected} vectors, got {found}")]
    VectorCount {
        body: usize,
        shape: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("body {body}: {shape}s only exist in 2D")]
    Unsupported { body: usize, shape: &'static str },
    #[error("body {body}: degenerate {shape}")]
    Degenerate { body: usize, shape: &'static str },
    #[error(transparent)]
    UnknownColor(#[from] UnknownColor),
    #[error("source {0}: direction must be non-zero")]
    ZeroDirection(usize),
    #[error("source {0}: a fan must open towards a direction not parallel to its center")]
    FlatFan(usize),
}

/// A whole simulation, as stored in a file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub dim: usize,
    #[serde(default)]
    pub config: ConfigDesc,
    #[serde(default)]
    pub bodies: Vec<BodyDesc>,
    #[serde(default)]
    pub sources: Vec<SourceDesc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDesc {
    pub max_segments: usize,
    pub length: LengthDesc,
    pub offset: Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthDesc {
    PerSegment(Float),
    Total(Float),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub surface: SurfaceDesc,
    pub shape: ShapeDesc,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SurfaceDesc {
    Wall,
    Mirror,
    /// `data` may be left out, for the default indices.
    Refractive(Option<IndicesDesc>),
    Target { required: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicesDesc {
    pub red: Float,
    pub green: Float,
    pub blue: Float,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ShapeDesc {
    /// `dim` points: a line segment in 2D, a triangle in 3D.
    Simplex { points: Vec<Vec<Float>> },
    /// A parallelotope: a center, and `dim - 1` half-extent vectors.
    Plane {
        center: Vec<Float>,
        basis: Vec<Vec<Float>>,
    },
    Sphere { center: Vec<Float>, radius: Float },
    /// A closed 2D outline.
    Polygon { points: Vec<Vec<Float>> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDesc {
    pub origin: Vec<Float>,
    pub direction: Vec<Float>,
    pub color: String,
    /// Turns this source into several lasers, spread around `direction`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan: Option<FanDesc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FanDesc {
    pub rays: usize,
    pub fov_degrees: Float,
    /// The side of `direction` the fan opens towards.
    pub towards: Vec<Float>,
}

impl Default for ConfigDesc {
    fn default() -> Self {
        TraceConfig::default().into()
    }
}

impl Default for LengthDesc {
    fn default() -> Self {
        TraceConfig::default().length.into()
    }
}

impl Default for IndicesDesc {
    fn default() -> Self {
        RefractiveIndices::default().into()
    }
}

impl From<LengthBudget> for LengthDesc {
    fn from(length: LengthBudget) -> Self {
        match length {
            LengthBudget::PerSegment(l) => Self::PerSegment(l),
            LengthBudget::Total(l) => Self::Total(l),
        }
    }
}

impl From<LengthDesc> for LengthBudget {
    fn from(length: LengthDesc) -> Self {
        match length {
            LengthDesc::PerSegment(l) => Self::PerSegment(l),
            LengthDesc::Total(l) => Self::Total(l),
        }
    }
}

impl From<TraceConfig> for ConfigDesc {
    fn from(config: TraceConfig) -> Self {
        Self {
            max_segments: config.max_segments,
            length: config.length.into(),
            offset: config.offset,
        }
    }
}

impl From<ConfigDesc> for TraceConfig {
    fn from(config: ConfigDesc) -> Self {
        Self {
            max_segments: config.max_segments,
            length: config.length.into(),
            offset: config.offset,
        }
    }
}

impl From<RefractiveIndices> for IndicesDesc {
    fn from(RefractiveIndices { red, green, blue }: RefractiveIndices) -> Self {
        Self { red, green, blue }
    }
}

impl From<IndicesDesc> for RefractiveIndices {
    fn from(IndicesDesc { red, green, blue }: IndicesDesc) -> Self {
        Self { red, green, blue }
    }
}

impl From<&Surface> for SurfaceDesc {
    fn from(surface: &Surface) -> Self {
        match surface {
            Surface::Wall => Self::Wall,
            Surface::Mirror => Self::Mirror,
            Surface::Refractive(indices) => Self::Refractive(Some((*indices).into())),
            Surface::Target(target) => Self::Target {
                required: target.required.to_string(),
            },
        }
    }
}

impl SurfaceDesc {
    pub fn build(&self) -> Result<Surface, SceneError> {
        Ok(match self {
            Self::Wall => Surface::Wall,
            Self::Mirror => Surface::Mirror,
            Self::Refractive(indices) => Surface::Refractive(indices.unwrap_or_default().into()),
            Self::Target { required } => Surface::Target(Target::new(required.parse()?)),
        })
    }
}

fn coords<const D: usize>(v: &Vector<D>) -> Vec<Float> {
    v.as_slice().to_vec()
}

fn vector<const D: usize>(coords: &[Float]) -> Result<Vector<D>, SceneError> {
    <[Float; D]>::try_from(coords)
        .map(Vector::from)
        .map_err(|_| SceneError::Coordinates {
            expected: D,
            found: coords.len(),
        })
}

fn vectors<const D: usize>(points: &[Vec<Float>]) -> Result<Vec<Vector<D>>, SceneError> {
    points.iter().map(|p| vector(p)).collect()
}

impl<const D: usize> From<&Simplex<D>> for ShapeDesc {
    fn from(simplex: &Simplex<D>) -> Self {
        Self::Simplex {
            points: simplex.vertices().iter().map(coords).collect(),
        }
    }
}

impl<const D: usize> From<&Parallelotope<D>> for ShapeDesc {
    fn from(plane: &Parallelotope<D>) -> Self {
        let p = plane.inner_plane();
        Self::Plane {
            center: coords(p.v0()),
            basis: p.basis().iter().map(coords).collect(),
        }
    }
}

impl<const D: usize> From<&Sphere<D>> for ShapeDesc {
    fn from(sphere: &Sphere<D>) -> Self {
        Self::Sphere {
            center: coords(&sphere.center),
            radius: sphere.radius(),
        }
    }
}

impl<const D: usize> From<&Polygon<D>> for ShapeDesc {
    fn from(polygon: &Polygon<D>) -> Self {
        Self::Polygon {
            points: polygon.vertices().iter().map(coords).collect(),
        }
    }
}

impl ShapeDesc {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Simplex { .. } => "simplex",
            Self::Plane { .. } => "plane",
            Self::Sphere { .. } => "sphere",
            Self::Polygon { .. } => "polygon",
        }
    }

    /// `body` is the index of the body this shape belongs to, for error reporting.
    pub fn build<const D: usize>(&self, body: usize) -> Result<DynShape<D>, SceneError> {
        let shape = self.kind();
        let degenerate = || SceneError::Degenerate { body, shape };
        let exactly_d = |vectors: Vec<Vector<D>>| {
            <[Vector<D>; D]>::try_from(vectors).map_err(|v| SceneError::VectorCount {
                body,
                shape,
                expected: D,
                found: v.len(),
            })
        };

        Ok(match self {
            Self::Simplex { points } => {
                let points = exactly_d(vectors(points)?)?;
                Box::new(Simplex::try_new(points).ok_or_else(degenerate)?)
            }
            Self::Plane { center, basis } => {
                let mut all = vec![vector(center)?];
                all.extend(vectors(basis)?);
                Box::new(Parallelotope::try_new(exactly_d(all)?).ok_or_else(degenerate)?)
            }
            Self::Sphere { center, radius } => {
                Box::new(Sphere::try_new(vector(center)?, *radius).ok_or_else(degenerate)?)
            }
            Self::Polygon { points } => {
                if D != 2 {
                    return Err(SceneError::Unsupported { body, shape });
                }
                Box::new(Polygon::try_new(vectors::<D>(points)?).ok_or_else(degenerate)?)
            }
        })
    }
}

impl<const D: usize> From<&LaserSource<D>> for SourceDesc {
    fn from(source: &LaserSource<D>) -> Self {
        Self {
            origin: coords(&source.ray.origin),
            direction: coords(source.ray.dir.as_ref()),
            color: source.color.to_string(),
            fan: None,
        }
    }
}

impl SourceDesc {
    /// `index` is the index of this source in the scene, for error reporting.
    ///
    /// A single laser, or all the lasers of the fan.
    pub fn build<const D: usize>(&self, index: usize) -> Result<Vec<LaserSource<D>>, SceneError> {
        let color: LaserColor = self.color.parse()?;
        let origin = vector::<D>(&self.origin)?;
        let direction = vector::<D>(&self.direction)?;

        let Some(fan) = &self.fan else {
            return LaserSource::new(origin, direction, color)
                .map(|source| vec![source])
                .map_err(|_| SceneError::ZeroDirection(index));
        };

        LaserSource::fan(
            origin,
            direction,
            vector::<D>(&fan.towards)?,
            fan.fov_degrees.to_radians(),
            fan.rays,
            color,
        )
        .map_err(|e| match e {
            FanError::ZeroDirection(_) => SceneError::ZeroDirection(index),
            FanError::Flat => SceneError::FlatFan(index),
        })
    }
}

impl SceneFile {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            config: ConfigDesc::default(),
            bodies: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self, SceneError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn push_body(&mut self, surface: &Surface, shape: impl Into<ShapeDesc>) -> SurfaceId {
        let id = SurfaceId(self.bodies.len());
        self.bodies.push(BodyDesc {
            surface: surface.into(),
            shape: shape.into(),
        });
        id
    }

    /// Builds the simulation this file describes.
    ///
    /// Fails if the file's `dim` isn't `D`.
    pub fn build<const D: usize>(&self) -> Result<Simulation<Scene<D>, D>, SceneError> {
        if self.dim != D {
            return Err(SceneError::Dimension {
                expected: D,
                found: self.dim,
            });
        }

        let mut surfaces = Vec::with_capacity(self.bodies.len());
        let mut shapes = Vec::with_capacity(self.bodies.len());

        for (i, body) in self.bodies.iter().enumerate() {
            surfaces.push(body.surface.build()?);
            shapes.push(body.shape.build::<D>(i)?);
        }

        let sources = self
            .sources
            .iter()
            .enumerate()
            .map(|(i, source)| source.build(i))
            .collect::<Result<Vec<_>, _>>()?
            .concat();

        log::debug!(
            "loaded a {D}D scene of {} bodies and {} sources",
            shapes.len(),
            sources.len()
        );

        Ok(Simulation::new(optix_shapes::scene(shapes), surfaces)
            .with_config(self.config.into())
            .with_sources(sources))
    }
}
