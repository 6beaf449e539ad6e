use super::*;

/// The evaluation of one target at the end of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetReport {
    pub surface: SurfaceId,
    pub required: LaserColor,
    pub accumulated: LaserColor,
    pub status: TargetStatus,
}

/// Everything that happened during one [`Simulation::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport<const D: usize> {
    /// One path per source, in the order of [`Simulation::sources`].
    pub paths: Vec<LaserPath<D>>,
    /// One report per target, in the order of the surface table.
    pub targets: Vec<TargetReport>,
}

impl<const D: usize> TickReport<D> {
    /// Whether every target of the scene got exactly the colors it wanted.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.targets.iter().all(|t| t.status.is_completed())
    }
}

/// A scene of laser sources and optical surfaces.
///
/// `R` finds which surface a laser hits, the [`SurfaceId`]s it reports index
/// the surface table given to [`Simulation::new`].
#[derive(Clone, Debug)]
pub struct Simulation<R, const D: usize> {
    pub raycaster: R,
    surfaces: Vec<Surface>,
    pub sources: Vec<LaserSource<D>>,
    pub config: TraceConfig,
}

impl<R: Raycast<D>, const D: usize> Simulation<R, D> {
    #[must_use]
    pub fn new(raycaster: R, surfaces: Vec<Surface>) -> Self {
        Self {
            raycaster,
            surfaces,
            sources: Vec::new(),
            config: TraceConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TraceConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = LaserSource<D>>) -> Self {
        self.sources.extend(sources);
        self
    }

    #[inline]
    #[must_use]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Can be used to change a surface between ticks, e.g. a target's requirement.
    #[inline]
    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(id.0)
    }

    /// Traces the lasers of all sources, without touching the targets.
    #[must_use]
    pub fn trace_all(&self) -> Vec<LaserPath<D>> {
        self.sources
            .iter()
            .map(|source| trace(&self.raycaster, &self.surfaces, source, &self.config))
            .collect()
    }

    /// Runs one step of the simulation: every source is traced, the colors of the lasers
    /// that ended on targets are deposited there, then every target is evaluated and reset.
    pub fn tick(&mut self) -> TickReport<D> {
        let paths = self.trace_all();

        for (surface, color) in paths.iter().filter_map(LaserPath::deposit) {
            if let Some(Surface::Target(target)) = self.surfaces.get_mut(surface.0) {
                target.deposit(color);
            }
        }

        let targets = self
            .surfaces
            .iter_mut()
            .enumerate()
            .filter_map(|(i, surface)| match surface {
                Surface::Target(target) => Some(evaluate(SurfaceId(i), target)),
                _ => None,
            })
            .collect();

        TickReport { paths, targets }
    }
}

fn evaluate(surface: SurfaceId, target: &mut Target) -> TargetReport {
    let accumulated = target.accumulated();
    let status = target.evaluate();

    if status.is_completed() {
        log::info!("target {surface} completed with {accumulated}");
    } else if accumulated.is_empty() {
        log::debug!("target {surface}: no colors detected");
    } else {
        log::debug!("target {surface}: {status}");
    }

    TargetReport {
        surface,
        required: target.required,
        accumulated,
        status,
    }
}
