use super::*;

use core::fmt;

/// Why a laser stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Absorbed by a [`Surface::Wall`].
    HitWall(SurfaceId),
    /// Absorbed by a [`Surface::Target`], leaving its color there.
    HitTarget {
        surface: SurfaceId,
        color: LaserColor,
    },
    /// Nothing was hit within the remaining length budget.
    Exhausted,
    /// Still going after the maximum number of segments.
    IterationCap,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HitWall(surface) => write!(f, "hit wall {surface}"),
            Self::HitTarget { surface, color } => write!(f, "hit target {surface} with {color}"),
            Self::Exhausted => f.write_str("exhausted"),
            Self::IterationCap => f.write_str("iteration cap reached"),
        }
    }
}

/// The full route of one laser, from its source to where it stopped.
#[derive(Clone, Debug, PartialEq)]
pub struct LaserPath<const D: usize> {
    pub(crate) points: Vec<Vector<D>>,
    pub(crate) color: LaserColor,
    pub(crate) termination: Termination,
}

impl<const D: usize> LaserPath<D> {
    /// The vertices of the path, starting with the source's origin.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Vector<D>] {
        &self.points
    }

    #[inline]
    #[must_use]
    pub const fn color(&self) -> LaserColor {
        self.color
    }

    #[inline]
    #[must_use]
    pub const fn termination(&self) -> Termination {
        self.termination
    }

    /// The target this laser left its color in, if any.
    #[inline]
    #[must_use]
    pub const fn deposit(&self) -> Option<(SurfaceId, LaserColor)> {
        match self.termination {
            Termination::HitTarget { surface, color } => Some((surface, color)),
            _ => None,
        }
    }

    #[must_use]
    pub fn length(&self) -> Float {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// If the last segment of this path retraces an earlier one, returns the index of that
    /// earlier segment's starting point, meaning the laser is caught in a loop.
    ///
    /// `eps` is used for comparisons.
    #[must_use]
    pub fn find_loop(&self, eps: Float) -> Option<usize> {
        let (new_pt, path) = self.points.split_last()?;
        loop_index(path, new_pt, eps)
    }
}

/// Checks if adding `new_pt` to `path` results in a laser doing an infinite loop.
/// `eps` is used for comparisons.
#[must_use]
pub fn loop_index<const D: usize>(
    path: &[Vector<D>],
    new_pt: &Vector<D>,
    eps: Float,
) -> Option<usize> {
    path.split_last().and_then(|(last_pt, points)| {
        let current_dir = Unit::try_new(new_pt - last_pt, eps)?.into_inner();

        points.windows(2).enumerate().find_map(|(i, window)| {
            let [this_pt, next_pt] = window else {
                // `windows(2)` always yields two points
                unreachable!()
            };

            let impact_dir = Unit::try_new(next_pt - this_pt, eps)?.into_inner();

            ((new_pt - next_pt).norm() <= eps && (impact_dir - current_dir).norm() <= eps)
                .then_some(i)
        })
    })
}
