use core::{fmt, str::FromStr};

bitflags::bitflags! {
    /// The set of primary colors a laser carries, or a target requires.
    ///
    /// Composite colors are plain unions of the primaries, so equality, subset and
    /// superset checks are all bitwise. Only the 8 combinations of the three primaries
    /// are representable.
    #[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
    pub struct LaserColor: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;

        const YELLOW = Self::RED.bits() | Self::GREEN.bits();
        const CYAN = Self::GREEN.bits() | Self::BLUE.bits();
        const PURPLE = Self::RED.bits() | Self::BLUE.bits();
        const WHITE = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits();
    }
}

impl LaserColor {
    pub const NONE: Self = Self::empty();

    /// Every representable color, from [`NONE`](Self::NONE) to [`WHITE`](Self::WHITE).
    #[inline]
    pub fn combinations() -> impl Iterator<Item = Self> + Clone {
        (0..=Self::WHITE.bits()).map(Self::from_bits_truncate)
    }

    /// The lowercase name of this color.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.bits() {
            0 => "none",
            1 => "red",
            2 => "green",
            3 => "yellow",
            4 => "blue",
            5 => "purple",
            6 => "cyan",
            _ => "white",
        }
    }
}

impl fmt::Display for LaserColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown laser color: {0:?}")]
pub struct UnknownColor(pub String);

impl FromStr for LaserColor {
    type Err = UnknownColor;

    /// Parses one of the names returned by [`LaserColor::name`], ignoring case.
    /// `"magenta"` is accepted as an alias of `"purple"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();

        if name == "magenta" {
            return Ok(Self::PURPLE);
        }

        Self::combinations()
            .find(|c| c.name() == name)
            .ok_or_else(|| UnknownColor(s.into()))
    }
}
