use super::*;

use core::fmt;

/// How well the colors that reached a target during one tick match its requirement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetStatus {
    /// Exactly the required colors arrived.
    Completed,
    /// Some required colors are missing, nothing unwanted arrived.
    Partial { missing: LaserColor },
    /// Unwanted colors arrived, possibly along with missing ones.
    Wrong {
        missing: LaserColor,
        extra: LaserColor,
    },
}

impl TargetStatus {
    #[must_use]
    pub fn classify(accumulated: LaserColor, required: LaserColor) -> Self {
        let missing = required & !accumulated;
        let extra = accumulated & !required;

        if accumulated == required {
            Self::Completed
        } else if extra.is_empty() {
            Self::Partial { missing }
        } else {
            Self::Wrong { missing, extra }
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Partial { missing } => write!(f, "partially correct, missing {missing}"),
            Self::Wrong { missing, extra } if missing.is_empty() => {
                write!(f, "wrong, extra {extra}")
            }
            Self::Wrong { missing, extra } => {
                write!(f, "wrong, missing {missing}, extra {extra}")
            }
        }
    }
}

/// A surface that absorbs lasers, and wants to be hit by a specific set of colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Target {
    pub required: LaserColor,
    accumulated: LaserColor,
}

impl Target {
    #[inline]
    #[must_use]
    pub const fn new(required: LaserColor) -> Self {
        Self {
            required,
            accumulated: LaserColor::NONE,
        }
    }

    /// The colors received since the last [`evaluate`](Self::evaluate).
    #[inline]
    #[must_use]
    pub const fn accumulated(&self) -> LaserColor {
        self.accumulated
    }

    /// Records that a laser of color `color` hit this target.
    #[inline]
    pub fn deposit(&mut self, color: LaserColor) {
        self.accumulated |= color;
    }

    /// Classifies the colors received so far, then forgets them.
    pub fn evaluate(&mut self) -> TargetStatus {
        let status = TargetStatus::classify(self.accumulated, self.required);
        self.accumulated = LaserColor::NONE;
        status
    }
}
